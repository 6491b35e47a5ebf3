use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;

use crate::queue::HandlerRef;

/// How a handler failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HandlerError {
    /// Temporary failure; the call should be retried.
    #[error("retry requested: {0}")]
    Retry(String),
    /// Failure that retrying will not fix.
    #[error("{0}")]
    Permanent(String),
}

impl HandlerError {
    pub fn retry(reason: impl Into<String>) -> Self {
        Self::Retry(reason.into())
    }

    pub fn permanent(reason: impl Into<String>) -> Self {
        Self::Permanent(reason.into())
    }

    pub fn is_retry(&self) -> bool {
        matches!(self, Self::Retry(_))
    }
}

/// A unit of work addressable by module and function name.
pub trait Handler: Send + Sync {
    fn call(&self, run_id: &str, options: &Value) -> Result<(), HandlerError>;
}

impl<F> Handler for F
where
    F: Fn(&str, &Value) -> Result<(), HandlerError> + Send + Sync,
{
    fn call(&self, run_id: &str, options: &Value) -> Result<(), HandlerError> {
        self(run_id, options)
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("handler {0} is already registered")]
    Duplicate(HandlerRef),
}

/// Static table of handlers, fixed before dispatching starts.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<HandlerRef, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(
        &mut self,
        module: impl Into<String>,
        exec: impl Into<String>,
        handler: H,
    ) -> Result<&mut Self, RegistryError>
    where
        H: Handler + 'static,
    {
        let key = HandlerRef::new(module, exec);
        if self.handlers.contains_key(&key) {
            return Err(RegistryError::Duplicate(key));
        }
        self.handlers.insert(key, Arc::new(handler));
        Ok(self)
    }

    pub fn get(&self, handler: &HandlerRef) -> Option<Arc<dyn Handler>> {
        self.handlers.get(handler).cloned()
    }

    pub fn contains(&self, handler: &HandlerRef) -> bool {
        self.handlers.contains_key(handler)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
