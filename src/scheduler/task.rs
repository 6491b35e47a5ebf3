use std::time::Duration;

use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde_json::Value;

use super::SchedulerError;
use crate::queue::HandlerRef;

/// A named, statically declared unit of recurring or one-shot work.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub name: String,
    pub handler: HandlerRef,
    /// Period between fires; `None` for one-shot tasks.
    pub repeat: Option<Duration>,
    pub options: Value,
}

impl Task {
    pub fn once(name: impl Into<String>, handler: HandlerRef) -> Self {
        Self {
            name: name.into(),
            handler,
            repeat: None,
            options: Value::Object(Default::default()),
        }
    }

    pub fn every(name: impl Into<String>, handler: HandlerRef, repeat: Duration) -> Self {
        Self {
            repeat: Some(repeat),
            ..Self::once(name, handler)
        }
    }

    pub fn with_options(mut self, options: Value) -> Self {
        self.options = options;
        self
    }

    pub fn is_recurring(&self) -> bool {
        self.repeat.is_some()
    }
}

/// Live state of a task: the run id of its latest fire and when it fires next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskState {
    pub run_id: String,
    pub next_fire: Option<DateTime<Utc>>,
}

impl TaskState {
    /// `run_id:next_fire` with an RFC 3339 timestamp, or nothing after the
    /// colon for one-shot tasks.
    pub fn encode(&self) -> String {
        let next = self
            .next_fire
            .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_default();
        format!("{}:{}", self.run_id, next)
    }

    pub fn decode(raw: &str) -> Result<Self, SchedulerError> {
        let (run_id, next) = raw
            .split_once(':')
            .ok_or_else(|| SchedulerError::BadState(raw.to_string()))?;
        if run_id.is_empty() {
            return Err(SchedulerError::BadState(raw.to_string()));
        }
        let next_fire = if next.is_empty() {
            None
        } else {
            let parsed = DateTime::parse_from_rfc3339(next)
                .map_err(|_| SchedulerError::BadState(raw.to_string()))?;
            Some(parsed.with_timezone(&Utc))
        };
        Ok(Self {
            run_id: run_id.to_string(),
            next_fire,
        })
    }
}

/// Next fire time for a task fired at `now`.
pub fn next_fire_after(now: DateTime<Utc>, repeat: Option<Duration>) -> Option<DateTime<Utc>> {
    repeat
        .and_then(|r| TimeDelta::from_std(r).ok())
        .and_then(|delta| now.checked_add_signed(delta))
}

/// What a recurring task should do when the scheduler starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartPlan {
    FireNow,
    /// Wait out the remainder of the persisted period.
    Arm(Duration),
}

/// Decide how to resume a recurring task from its persisted state.
///
/// A future next-fire time arms a timer for exactly the remaining delay, so
/// the task fires at the persisted time. Anything else fires immediately.
pub fn plan_start(state: Option<&TaskState>, now: DateTime<Utc>) -> StartPlan {
    let Some(next) = state.and_then(|s| s.next_fire) else {
        return StartPlan::FireNow;
    };
    match (next - now).to_std() {
        Ok(remaining) if !remaining.is_zero() => StartPlan::Arm(remaining),
        _ => StartPlan::FireNow,
    }
}
