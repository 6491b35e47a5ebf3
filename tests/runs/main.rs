mod charts;
mod feeds;
mod fixtures;

use speedrun_ingest::runs::{GameDao, RunDao};
use speedrun_ingest::{FeedConfig, Stores};

/// A run Dao over fresh in-memory stores with the given games stored.
pub fn setup(feeds: FeedConfig, games: Vec<speedrun_ingest::runs::Game>) -> (Stores, RunDao) {
    let stores = Stores::in_memory();
    GameDao::new(stores.clone())
        .store(games)
        .expect("games should store");
    let runs = RunDao::new(stores.clone(), &feeds);
    (stores, runs)
}
