//! Call dispatch: resolve each queued call to a registered handler, run it,
//! and requeue temporary failures up to a retry ceiling.

mod dispatcher;
mod handler;
mod thread;

pub use dispatcher::{DispatchOutcome, Dispatcher};
pub use handler::{Handler, HandlerError, HandlerRegistry, RegistryError};
pub use thread::{DispatchStats, DispatcherThread};
