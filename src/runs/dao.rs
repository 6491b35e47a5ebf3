use std::ops::Deref;

use super::{normalize_run, LeaderboardRunEntry, GAMES_COLLECTION};
use crate::chart::{Chart, ChartKind};
use crate::config::FeedConfig;
use crate::dao::{id_fn, Dao};
use crate::error::DaoError;
use crate::index::{ChartIndex, ChartQuery, ChartShape, ForeignKeyGroups, RecencyIndex};
use crate::store::{Filter, Stores};

pub const RUNS_COLLECTION: &str = "runs";

pub const LATEST_NEW_RUNS_INDEX: &str = "latest_new_runs";
pub const LATEST_VERIFIED_RUNS_INDEX: &str = "latest_verified_runs";
pub const LATEST_NEW_RUNS_KEY: &str = "latest_new_runs";
pub const LATEST_VERIFIED_RUNS_KEY: &str = "verified_runs";

pub const LEADERBOARD_VOLUME_INDEX: &str = "leaderboard_submission_volume";
pub const GAME_VOLUME_INDEX: &str = "game_submission_volume";
pub const PLAYER_FAVORITES_INDEX: &str = "player_favorite_games";
pub const PLAYER_PB_INDEX: &str = "player_pb_chart";

/// First year covered by submission volume charts.
pub const SUBMISSION_START_YEAR: i32 = 2010;

const METRIC_PATH: &str = "run.times.primary_t";
const RUN_DATE_PATH: &str = "run.date";

fn genre_groups() -> ForeignKeyGroups {
    ForeignKeyGroups::new("run.game.id", GAMES_COLLECTION, "genres.id")
}

fn verified() -> Filter {
    Filter::new().eq("run.status.status", "verified")
}

fn monthly_volume() -> ChartShape {
    ChartShape::MonthlyVolume {
        date_path: RUN_DATE_PATH.into(),
        start_year: SUBMISSION_START_YEAR,
    }
}

/// Leaderboard runs with their recency feeds and charts.
pub struct RunDao {
    dao: Dao<LeaderboardRunEntry>,
}

impl RunDao {
    pub fn new(stores: Stores, feeds: &FeedConfig) -> Self {
        let recent = |name: &str, date_path: &str, key: &str| -> RecencyIndex<LeaderboardRunEntry> {
            RecencyIndex::new(
                name,
                date_path,
                METRIC_PATH,
                key,
                feeds.history_length,
                feeds.max_items,
            )
            .grouped_by(genre_groups())
        };

        let dao = Dao::new(
            RUNS_COLLECTION,
            stores,
            id_fn(|e: &LeaderboardRunEntry| e.run.id.clone()),
        )
        .with_transform(normalize_run)
        .with_index(recent(
            LATEST_NEW_RUNS_INDEX,
            "run.submitted",
            LATEST_NEW_RUNS_KEY,
        ))
        .with_index(recent(
            LATEST_VERIFIED_RUNS_INDEX,
            "run.status.verify-date",
            LATEST_VERIFIED_RUNS_KEY,
        ))
        // Key: `<category>` or `<category>:<level>`.
        .with_index(ChartIndex::new(
            LEADERBOARD_VOLUME_INDEX,
            RUNS_COLLECTION,
            ChartKind::Bar,
            monthly_volume(),
            |key: &str| {
                let (category, level) = match key.split_once(':') {
                    Some((category, level)) => (category, Some(level)),
                    None => (key, None),
                };
                if category.is_empty() {
                    return None;
                }
                let mut filter = verified().eq("run.category.id", category);
                let mut item_id = category.to_string();
                if let Some(level) = level.filter(|l| !l.is_empty()) {
                    filter = filter.eq("run.level.id", level);
                    item_id = format!("{category}_{level}");
                }
                Some(ChartQuery { item_id, filter })
            },
        ))
        .with_index(ChartIndex::new(
            GAME_VOLUME_INDEX,
            RUNS_COLLECTION,
            ChartKind::Bar,
            monthly_volume(),
            |game: &str| {
                (!game.is_empty()).then(|| ChartQuery {
                    item_id: game.to_string(),
                    filter: verified().eq("run.game.id", game),
                })
            },
        ))
        .with_index(ChartIndex::new(
            PLAYER_FAVORITES_INDEX,
            GAMES_COLLECTION,
            ChartKind::Pie,
            ChartShape::Distribution {
                group_path: "run.game.id".into(),
            },
            |player: &str| {
                (!player.is_empty()).then(|| ChartQuery {
                    item_id: player.to_string(),
                    filter: Filter::new().eq("run.players.id", player),
                })
            },
        ))
        // Key: `<player>:<game>`.
        .with_index(ChartIndex::new(
            PLAYER_PB_INDEX,
            RUNS_COLLECTION,
            ChartKind::Line,
            ChartShape::Series {
                series_paths: vec!["run.category.id".into(), "run.level.id".into()],
                date_path: RUN_DATE_PATH.into(),
                value_path: METRIC_PATH.into(),
            },
            |key: &str| {
                let (player, game) = key.split_once(':')?;
                if player.is_empty() || game.is_empty() {
                    return None;
                }
                Some(ChartQuery {
                    item_id: format!("{player}_{game}"),
                    filter: Filter::new()
                        .eq("run.players.id", player)
                        .eq("run.game.id", game),
                })
            },
        ));

        Self { dao }
    }

    /// A page of the latest runs, newest first, optionally limited to a genre.
    pub fn load_latest_runs(
        &self,
        offset: usize,
        genre: Option<&str>,
        verified: bool,
    ) -> Result<Vec<Option<LeaderboardRunEntry>>, DaoError> {
        let index = if verified {
            LATEST_VERIFIED_RUNS_INDEX
        } else {
            LATEST_NEW_RUNS_INDEX
        };
        let key = format!("{}:{}", genre.unwrap_or_default(), offset);
        self.dao.load_by_index(index, &key)
    }

    /// Verified submissions per month for one leaderboard.
    pub fn leaderboard_submission_volume(
        &self,
        category_id: &str,
        level_id: Option<&str>,
    ) -> Result<Chart, DaoError> {
        let key = match level_id {
            Some(level) => format!("{category_id}:{level}"),
            None => category_id.to_string(),
        };
        self.dao.load_chart(LEADERBOARD_VOLUME_INDEX, &key)
    }

    /// Verified submissions per month across a game.
    pub fn game_submission_volume(&self, game_id: &str) -> Result<Chart, DaoError> {
        self.dao.load_chart(GAME_VOLUME_INDEX, game_id)
    }

    /// Games a player has submitted to, by number of runs.
    pub fn player_favorite_games(&self, player_id: &str) -> Result<Chart, DaoError> {
        self.dao.load_chart(PLAYER_FAVORITES_INDEX, player_id)
    }

    /// A player's run times in one game, one series per leaderboard
    /// (`<category>` or `<category>_<level>`), in date order.
    pub fn player_pb_chart(&self, player_id: &str, game_id: &str) -> Result<Chart, DaoError> {
        self.dao
            .load_chart(PLAYER_PB_INDEX, &format!("{player_id}:{game_id}"))
    }
}

impl Deref for RunDao {
    type Target = Dao<LeaderboardRunEntry>;

    fn deref(&self) -> &Self::Target {
        &self.dao
    }
}
