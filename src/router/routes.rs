//! Static route table

use serde::Serialize;

pub const LOGIN_PATH: &str = "/login";
pub const DASHBOARD_PATH: &str = "/dashboard";

/// What a route demands before its screen may be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteRequirement {
    pub requires_auth: bool,
    pub requires_admin: bool,
}

impl RouteRequirement {
    pub const PUBLIC: Self = Self {
        requires_auth: false,
        requires_admin: false,
    };

    pub const AUTHENTICATED: Self = Self {
        requires_auth: true,
        requires_admin: false,
    };

    pub const ADMIN: Self = Self {
        requires_auth: true,
        requires_admin: true,
    };
}

impl Default for RouteRequirement {
    fn default() -> Self {
        Self::AUTHENTICATED
    }
}

/// Screens the console can show
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Screen {
    Login,
    Dashboard,
    SnapshotClasses,
    Snapshots,
    ScheduledTasks,
    Pvcs,
    CephCluster,
    UserManagement,
    ClusterManagement,
}

#[derive(Debug, Clone, Serialize)]
pub struct Route {
    pub path: &'static str,
    pub name: &'static str,
    pub title: &'static str,
    pub screen: Screen,
    pub requirement: RouteRequirement,
}

impl Route {
    pub fn is_login(&self) -> bool {
        self.screen == Screen::Login
    }
}

const STANDARD_ROUTES: &[Route] = &[
    Route {
        path: LOGIN_PATH,
        name: "Login",
        title: "Login",
        screen: Screen::Login,
        requirement: RouteRequirement::PUBLIC,
    },
    Route {
        path: DASHBOARD_PATH,
        name: "Dashboard",
        title: "Dashboard",
        screen: Screen::Dashboard,
        requirement: RouteRequirement::AUTHENTICATED,
    },
    Route {
        path: "/snapshot-classes",
        name: "SnapshotClasses",
        title: "Snapshot Classes",
        screen: Screen::SnapshotClasses,
        requirement: RouteRequirement::AUTHENTICATED,
    },
    Route {
        path: "/snapshots",
        name: "Snapshots",
        title: "Snapshots",
        screen: Screen::Snapshots,
        requirement: RouteRequirement::AUTHENTICATED,
    },
    Route {
        path: "/scheduled",
        name: "ScheduledTasks",
        title: "Scheduled Tasks",
        screen: Screen::ScheduledTasks,
        requirement: RouteRequirement::AUTHENTICATED,
    },
    Route {
        path: "/pvcs",
        name: "PVCs",
        title: "PVC Management",
        screen: Screen::Pvcs,
        requirement: RouteRequirement::AUTHENTICATED,
    },
    Route {
        path: "/ceph",
        name: "CephCluster",
        title: "Ceph Cluster",
        screen: Screen::CephCluster,
        requirement: RouteRequirement::AUTHENTICATED,
    },
    Route {
        path: "/users",
        name: "UserManagement",
        title: "User Management",
        screen: Screen::UserManagement,
        requirement: RouteRequirement::ADMIN,
    },
    Route {
        path: "/clusters",
        name: "ClusterManagement",
        title: "Cluster Management",
        screen: Screen::ClusterManagement,
        requirement: RouteRequirement::AUTHENTICATED,
    },
];

/// Declared routes plus the redirect rules for `/` and unknown paths
#[derive(Debug, Clone)]
pub struct RouteTable {
    routes: Vec<Route>,
    fallback: &'static str,
}

impl RouteTable {
    /// The console's screens, with `/` and unknown paths sent to the dashboard
    pub fn standard() -> Self {
        Self {
            routes: STANDARD_ROUTES.to_vec(),
            fallback: DASHBOARD_PATH,
        }
    }

    /// Exact lookup, ignoring a query string and trailing slash
    pub fn find(&self, path: &str) -> Option<&Route> {
        let path = normalize(path);
        self.routes.iter().find(|route| route.path == path)
    }

    /// Lookup that never fails: `/` and unknown paths resolve to the fallback
    pub fn resolve(&self, path: &str) -> &Route {
        if let Some(route) = self.find(path) {
            return route;
        }
        tracing::debug!(path, fallback = self.fallback, "No route matched, redirecting");
        self.find(self.fallback)
            .unwrap_or_else(|| &self.routes[0])
    }

    pub fn login(&self) -> Option<&Route> {
        self.routes.iter().find(|route| route.is_login())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Route> {
        self.routes.iter()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::standard()
    }
}

fn normalize(path: &str) -> &str {
    let path = path.split(|c: char| c == '?' || c == '#').next().unwrap_or(path);
    match path.trim_end_matches('/') {
        "" => "/",
        trimmed => trimmed,
    }
}
