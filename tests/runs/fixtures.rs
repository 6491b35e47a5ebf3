use speedrun_ingest::runs::{
    EntityRef, Game, Genre, LeaderboardRunEntry, Run, RunStatus, RunSystem, RunTimes,
    Verification,
};

pub fn game(id: &str, genres: &[&str]) -> Game {
    Game {
        id: id.to_string(),
        name: format!("Game {id}"),
        abbreviation: None,
        genres: genres
            .iter()
            .map(|g| Genre {
                id: g.to_string(),
                name: g.to_uppercase(),
            })
            .collect(),
    }
}

/// Builder for leaderboard entries with sensible defaults.
pub struct RunBuilder {
    run: Run,
}

pub fn run(id: &str) -> RunBuilder {
    RunBuilder {
        run: Run {
            id: id.to_string(),
            weblink: None,
            game: EntityRef::new("g1"),
            category: EntityRef::new("any%"),
            level: None,
            date: Some("2015-01-01".to_string()),
            submitted: Some("2015-01-01T00:00:00Z".to_string()),
            players: vec![EntityRef::new("p1")],
            times: RunTimes {
                primary: "PT1M".to_string(),
                primary_t: 60.0,
                ..RunTimes::default()
            },
            system: RunSystem::default(),
            status: RunStatus::default(),
            comment: None,
            values: Default::default(),
        },
    }
}

impl RunBuilder {
    pub fn game(mut self, id: &str) -> Self {
        self.run.game = EntityRef::new(id);
        self
    }

    pub fn category(mut self, id: &str) -> Self {
        self.run.category = EntityRef::new(id);
        self
    }

    pub fn level(mut self, id: &str) -> Self {
        self.run.level = Some(EntityRef::new(id));
        self
    }

    pub fn player(mut self, id: &str) -> Self {
        self.run.players = vec![EntityRef::new(id)];
        self
    }

    pub fn date(mut self, date: &str) -> Self {
        self.run.date = Some(date.to_string());
        self
    }

    pub fn submitted(mut self, at: &str) -> Self {
        self.run.submitted = Some(at.to_string());
        self
    }

    pub fn verified(mut self, at: &str) -> Self {
        self.run.status = RunStatus {
            status: Verification::Verified,
            examiner: None,
            verify_date: Some(at.to_string()),
        };
        self
    }

    pub fn time(mut self, seconds: f64) -> Self {
        self.run.times.primary_t = seconds;
        self
    }

    pub fn build(self) -> LeaderboardRunEntry {
        LeaderboardRunEntry {
            place: None,
            run: self.run,
        }
    }
}

/// Run ids of a feed page, skipping missing records.
pub fn ids(page: Vec<Option<LeaderboardRunEntry>>) -> Vec<String> {
    page.into_iter().flatten().map(|e| e.run.id).collect()
}
