//! Authentication and session management

pub mod models;
pub mod probe;
pub mod service;
pub mod session;
pub mod storage;
pub mod token;

pub use models::{Identity, Role};
pub use probe::{HttpIdentityProbe, IdentityProbe, ProbeOutcome};
pub use session::{Session, SessionStore};
pub use storage::{FileStorage, MemoryStorage, SnapshotStorage};
pub use token::TokenInfo;
