//! snapconsole - console for the Kubernetes volume snapshot manager
//!
//! The library holds the client-side session core: the session store and its
//! persisted snapshot, the request pipeline that attaches credentials and
//! reacts to 401s, and the navigation guard that admits or redirects every
//! screen transition.

pub mod api;
pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod error;
pub mod router;
pub mod screens;

pub use app::App;
pub use auth::SessionStore;
pub use config::Config;
pub use error::Error;
pub use router::{Decision, NavigationGuard};
