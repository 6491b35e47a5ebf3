mod lifecycle;
mod scheduling;

use std::sync::{Arc, Mutex};

use serde_json::Value;
use speedrun_ingest::{HandlerError, HandlerRegistry};

/// Records every `(run_id, options)` a handler is called with.
#[derive(Clone, Default)]
pub struct Recorder {
    calls: Arc<Mutex<Vec<(String, Value)>>>,
}

impl Recorder {
    pub fn handler(&self) -> impl Fn(&str, &Value) -> Result<(), HandlerError> + Send + Sync {
        let calls = self.calls.clone();
        move |run_id: &str, options: &Value| {
            calls
                .lock()
                .unwrap()
                .push((run_id.to_string(), options.clone()));
            Ok(())
        }
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }
}

pub fn registry_with(module: &str, exec: &str, recorder: &Recorder) -> Arc<HandlerRegistry> {
    let mut registry = HandlerRegistry::new();
    registry
        .register(module, exec, recorder.handler())
        .expect("fresh registry");
    Arc::new(registry)
}
