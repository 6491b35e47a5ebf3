use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A reference to another entity, optionally carrying its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl EntityRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RunTimes {
    pub primary: String,
    /// Primary time in seconds. Placeholder runs carry `0`.
    pub primary_t: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realtime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realtime_t: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realtime_noloads: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realtime_noloads_t: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingame: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ingame_t: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunSystem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platform: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emulated: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verification {
    #[default]
    New,
    Verified,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunStatus {
    pub status: Verification,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub examiner: Option<EntityRef>,
    #[serde(
        rename = "verify-date",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub verify_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weblink: Option<String>,
    pub game: EntityRef,
    pub category: EntityRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<EntityRef>,
    /// Date the run was performed, `YYYY-MM-DD`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// When the run was submitted, RFC 3339.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted: Option<String>,
    #[serde(default)]
    pub players: Vec<EntityRef>,
    pub times: RunTimes,
    #[serde(default)]
    pub system: RunSystem,
    #[serde(default)]
    pub status: RunStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default)]
    pub values: BTreeMap<String, String>,
}

/// A run as it appears on a leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderboardRunEntry {
    #[serde(default)]
    pub place: Option<u32>,
    pub run: Run,
}

impl LeaderboardRunEntry {
    pub fn id(&self) -> &str {
        &self.run.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub abbreviation: Option<String>,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

/// Tidy a run before it is stored: empty level references are dropped and
/// duplicate players collapsed.
pub fn normalize_run(mut entry: LeaderboardRunEntry) -> LeaderboardRunEntry {
    if entry.run.level.as_ref().is_some_and(|l| l.id.is_empty()) {
        entry.run.level = None;
    }
    let mut seen = std::collections::HashSet::new();
    entry.run.players.retain(|p| seen.insert(p.id.clone()));
    entry
}
