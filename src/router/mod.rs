//! Screen routing and navigation admission

pub mod guard;
pub mod navigator;
pub mod routes;

pub use guard::{Decision, NavigationGuard};
pub use navigator::{Navigation, Router};
pub use routes::{Route, RouteRequirement, RouteTable, Screen, DASHBOARD_PATH, LOGIN_PATH};
