use std::ops::Deref;

use super::Game;
use crate::dao::{id_fn, Dao};
use crate::store::Stores;

pub const GAMES_COLLECTION: &str = "games";

/// Games, the parents whose genres partition the run feeds.
pub struct GameDao {
    dao: Dao<Game>,
}

impl GameDao {
    pub fn new(stores: Stores) -> Self {
        Self {
            dao: Dao::new(GAMES_COLLECTION, stores, id_fn(|g: &Game| g.id.clone())),
        }
    }
}

impl Deref for GameDao {
    type Target = Dao<Game>;

    fn deref(&self) -> &Self::Target {
        &self.dao
    }
}
