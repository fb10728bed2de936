//! Router: applies guard decisions and tracks the current screen

use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::api::Navigator;
use crate::router::guard::{Decision, NavigationGuard};
use crate::router::routes::{Route, RouteTable, LOGIN_PATH};

/// Outcome of one `Router::navigate` call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Navigation {
    /// Path the caller asked for
    pub requested: String,
    /// Path of the matched route, after `/` and catch-all redirects
    pub target: String,
    /// Where the router ended up
    pub location: String,
    pub decision: Decision,
}

#[derive(Clone)]
pub struct Router {
    table: Arc<RouteTable>,
    guard: NavigationGuard,
    location: Arc<RwLock<String>>,
    default_route: String,
}

impl Router {
    pub fn new(table: RouteTable, guard: NavigationGuard, default_route: impl Into<String>) -> Self {
        Self {
            table: Arc::new(table),
            guard,
            location: Arc::new(RwLock::new(String::new())),
            default_route: default_route.into(),
        }
    }

    pub fn routes(&self) -> &RouteTable {
        &self.table
    }

    pub fn guard(&self) -> &NavigationGuard {
        &self.guard
    }

    /// Attempt a transition to `path`.
    ///
    /// The guard runs once. A redirect sets the location directly; it is not
    /// itself guarded.
    pub async fn navigate(&self, path: &str) -> Navigation {
        let route = self.table.resolve(path);
        let decision = self.guard.evaluate(route).await;

        let location = match decision {
            Decision::Admit => route.path.to_string(),
            Decision::RedirectLogin => LOGIN_PATH.to_string(),
            Decision::RedirectDefault => self.default_route.clone(),
        };

        tracing::debug!(requested = path, location = %location, ?decision, "Navigation settled");
        *self.location.write().await = location.clone();

        Navigation {
            requested: path.to_string(),
            target: route.path.to_string(),
            location,
            decision,
        }
    }

    /// Route for the current location, if any screen is shown
    pub async fn current_route(&self) -> Option<Route> {
        let location = self.location.read().await;
        self.table.find(&location).cloned()
    }
}

#[async_trait]
impl Navigator for Router {
    async fn location(&self) -> String {
        self.location.read().await.clone()
    }

    async fn redirect(&self, path: &str) {
        tracing::debug!(path, "Forced redirect");
        *self.location.write().await = path.to_string();
    }
}
