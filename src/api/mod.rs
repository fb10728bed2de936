//! Backend API client

pub mod endpoints;
pub mod envelope;
pub mod pipeline;

pub use envelope::{Envelope, SUCCESS_CODE};
pub use pipeline::{LogNotifier, Navigator, Notifier, RequestPipeline};
