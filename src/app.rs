//! Application wiring
//!
//! One `App` corresponds to one console session: a single session store
//! shared by the guard and the request pipeline, and a router the pipeline
//! can push back to the login screen.

use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;

use crate::api::{Notifier, RequestPipeline};
use crate::auth::{FileStorage, HttpIdentityProbe, IdentityProbe, SessionStore, SnapshotStorage};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::router::{Decision, Navigation, NavigationGuard, RouteTable, Router, LOGIN_PATH};
use crate::screens;

/// A navigation plus whatever the admitted screen loaded
#[derive(Debug, Clone, Serialize)]
pub struct ScreenView {
    pub navigation: Navigation,
    pub title: String,
    /// Present only when the screen was admitted and loaded
    pub data: Option<Value>,
}

#[derive(Clone)]
pub struct App {
    config: Config,
    session: SessionStore,
    router: Router,
    api: RequestPipeline,
}

impl App {
    /// Wire the app against the configured backend and snapshot directory
    pub fn new(config: Config, notifier: Arc<dyn Notifier>) -> Result<Self> {
        let storage = Arc::new(FileStorage::new(&config.storage.dir));
        let probe = Arc::new(HttpIdentityProbe::new(&config.api)?);
        Self::with_parts(config, storage, probe, notifier)
    }

    pub fn with_parts(
        config: Config,
        storage: Arc<dyn SnapshotStorage>,
        probe: Arc<dyn IdentityProbe>,
        notifier: Arc<dyn Notifier>,
    ) -> Result<Self> {
        let session = SessionStore::new(storage, probe);
        let guard = NavigationGuard::new(session.clone());
        let router = Router::new(
            RouteTable::standard(),
            guard,
            config.ui.default_route.clone(),
        );
        let api = RequestPipeline::new(
            config.api.clone(),
            session.clone(),
            Arc::new(router.clone()),
            notifier,
            LOGIN_PATH,
        )?;

        Ok(Self {
            config,
            session,
            router,
            api,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn api(&self) -> &RequestPipeline {
        &self.api
    }

    /// Navigate to `path` and load the screen if admitted
    pub async fn open(&self, path: &str) -> Result<ScreenView> {
        let navigation = self.router.navigate(path).await;
        let route = self.router.routes().resolve(&navigation.location).clone();

        let data = if navigation.decision.is_admit() {
            Some(screens::load(route.screen, &self.api).await?)
        } else {
            None
        };

        Ok(ScreenView {
            navigation,
            title: route.title.to_string(),
            data,
        })
    }

    /// Run the guard for `path` and fail unless it admits.
    ///
    /// Used by commands that act on a screen's resources without rendering it.
    pub async fn require(&self, path: &str) -> Result<Navigation> {
        let navigation = self.router.navigate(path).await;
        match navigation.decision {
            Decision::Admit => Ok(navigation),
            Decision::RedirectLogin => Err(Error::Other(
                "Not logged in. Run 'snapconsole login' first.".to_string(),
            )),
            Decision::RedirectDefault => Err(Error::Other(format!(
                "Access to {} is not permitted for this account",
                navigation.target
            ))),
        }
    }
}
