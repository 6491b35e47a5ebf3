//! Calls - the unit of work carried by the queue - and their wire format.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::QueueError;

const DELIMITER: char = ':';
const RETRY_MARKER: char = '#';

/// Names a handler by module and function.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct HandlerRef {
    pub module: String,
    pub exec: String,
}

impl HandlerRef {
    pub fn new(module: impl Into<String>, exec: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            exec: exec.into(),
        }
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.module, self.exec)
    }
}

/// One unit of scheduled work.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    pub run_id: String,
    pub handler: HandlerRef,
    /// How many times this call has already been retried.
    pub retry: u32,
    pub options: Value,
}

impl Call {
    /// Create a first-attempt call.
    pub fn new(run_id: impl Into<String>, handler: HandlerRef, options: Value) -> Self {
        Self {
            run_id: run_id.into(),
            handler,
            retry: 0,
            options,
        }
    }

    /// Encode as `run_id:module:exec:json_options`.
    ///
    /// A retried call carries its count on the run id segment (`abc#2`).
    pub fn encode(&self) -> Result<String, QueueError> {
        for (field, value) in [
            ("run id", self.run_id.as_str()),
            ("module", self.handler.module.as_str()),
            ("exec", self.handler.exec.as_str()),
        ] {
            if value.is_empty() || value.contains(DELIMITER) || value.contains(RETRY_MARKER) {
                return Err(QueueError::InvalidCall(format!(
                    "{field} {value:?} is empty or contains a reserved character"
                )));
            }
        }

        let options = match &self.options {
            Value::Null => "{}".to_string(),
            other => serde_json::to_string(other)
                .map_err(|e| QueueError::InvalidCall(e.to_string()))?,
        };

        let run = if self.retry > 0 {
            format!("{}{}{}", self.run_id, RETRY_MARKER, self.retry)
        } else {
            self.run_id.clone()
        };

        Ok(format!(
            "{run}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{options}",
            self.handler.module, self.handler.exec
        ))
    }

    /// Decode a wire record. Everything after the third delimiter is the
    /// options JSON, which may itself contain the delimiter.
    pub fn decode(raw: &str) -> Result<Self, QueueError> {
        let mut parts = raw.splitn(4, DELIMITER);
        let (Some(run), Some(module), Some(exec), Some(options)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(QueueError::Decode {
                raw: raw.to_string(),
                reason: "expected 4 delimited fields".into(),
            });
        };

        let (run_id, retry) = match run.rsplit_once(RETRY_MARKER) {
            Some((id, count)) => {
                let retry = count.parse::<u32>().map_err(|e| QueueError::Decode {
                    raw: raw.to_string(),
                    reason: format!("bad retry count: {e}"),
                })?;
                (id, retry)
            }
            None => (run, 0),
        };

        if run_id.is_empty() || module.is_empty() || exec.is_empty() {
            return Err(QueueError::Decode {
                raw: raw.to_string(),
                reason: "empty run id or handler name".into(),
            });
        }

        let options: Value = serde_json::from_str(options).map_err(|e| QueueError::Decode {
            raw: raw.to_string(),
            reason: format!("options are not JSON: {e}"),
        })?;

        Ok(Self {
            run_id: run_id.to_string(),
            handler: HandlerRef::new(module, exec),
            retry,
            options,
        })
    }
}
