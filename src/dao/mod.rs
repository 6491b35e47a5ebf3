//! Generic persistence with pluggable index drivers.
//!
//! A [`Dao`] owns one primary collection. Every write goes to the primary
//! store first, then through each attached [`IndexDriver`] so derived views
//! (recency feeds, charts) stay in step with the source of truth.

mod config;
mod driver;
mod manager;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use config::DaoConfig;
pub use driver::IndexDriver;
pub use manager::{id_fn, Dao};

/// Anything a Dao can persist.
pub trait Record: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

impl<T> Record for T where T: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {}

/// Extracts a record's identifier.
pub type IdFn<T> = Arc<dyn Fn(&T) -> String + Send + Sync>;
