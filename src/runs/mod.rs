//! Speedrun records and the Daos that persist them.

mod dao;
mod games;
mod types;

pub use dao::{
    RunDao, GAME_VOLUME_INDEX, LATEST_NEW_RUNS_INDEX, LATEST_NEW_RUNS_KEY,
    LATEST_VERIFIED_RUNS_INDEX, LATEST_VERIFIED_RUNS_KEY, LEADERBOARD_VOLUME_INDEX,
    PLAYER_FAVORITES_INDEX, PLAYER_PB_INDEX, RUNS_COLLECTION, SUBMISSION_START_YEAR,
};
pub use games::{GameDao, GAMES_COLLECTION};
pub use types::{
    normalize_run, EntityRef, Game, Genre, LeaderboardRunEntry, Run, RunStatus, RunSystem,
    RunTimes, Verification,
};
