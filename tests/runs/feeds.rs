use pretty_assertions::assert_eq;
use speedrun_ingest::runs::{
    LATEST_NEW_RUNS_INDEX, LATEST_NEW_RUNS_KEY, LATEST_VERIFIED_RUNS_KEY,
};
use speedrun_ingest::store::InMemoryOrderedStore;
use speedrun_ingest::{DaoError, FeedConfig, RunDao, Stores};
use std::sync::Arc;

use crate::fixtures::{game, ids, run};
use crate::setup;

fn default_games() -> Vec<speedrun_ingest::runs::Game> {
    vec![game("g1", &["rpg"]), game("g2", &["action", "rpg"]), game("g3", &[])]
}

#[test]
fn new_runs_feed_is_newest_first() {
    let (_, runs) = setup(FeedConfig::default(), default_games());
    runs.store(vec![
        run("a").submitted("2020-01-01T00:00:00Z").build(),
        run("b").submitted("2020-03-01T00:00:00Z").build(),
        run("c").submitted("2020-02-01T00:00:00Z").build(),
    ])
    .unwrap();

    assert_eq!(ids(runs.load_latest_runs(0, None, false).unwrap()), vec!["b", "c", "a"]);
}

#[test]
fn verified_feed_orders_by_verify_date() {
    let (_, runs) = setup(FeedConfig::default(), default_games());
    runs.store(vec![
        run("a").submitted("2020-01-05T00:00:00Z").verified("2020-02-01T00:00:00Z").build(),
        run("b").submitted("2020-01-06T00:00:00Z").verified("2020-01-10T00:00:00Z").build(),
    ])
    .unwrap();

    assert_eq!(ids(runs.load_latest_runs(0, None, true).unwrap()), vec!["a", "b"]);
    assert_eq!(ids(runs.load_latest_runs(0, None, false).unwrap()), vec!["b", "a"]);
}

#[test]
fn genre_feeds_follow_game_genres() {
    let (_, runs) = setup(FeedConfig::default(), default_games());
    runs.store(vec![
        run("a").game("g1").submitted("2020-01-01T00:00:00Z").build(),
        run("b").game("g2").submitted("2020-01-02T00:00:00Z").build(),
        run("c").game("g3").submitted("2020-01-03T00:00:00Z").build(),
    ])
    .unwrap();

    assert_eq!(ids(runs.load_latest_runs(0, Some("rpg"), false).unwrap()), vec!["b", "a"]);
    assert_eq!(ids(runs.load_latest_runs(0, Some("action"), false).unwrap()), vec!["b"]);
    assert_eq!(ids(runs.load_latest_runs(0, None, false).unwrap()), vec!["c", "b", "a"]);
    assert!(runs.load_latest_runs(0, Some("puzzle"), false).unwrap().is_empty());
}

#[test]
fn feeds_are_bounded_and_paged() {
    let feeds = FeedConfig {
        history_length: 3,
        max_items: 2,
    };
    let (stores, runs) = setup(feeds, default_games());

    for day in 1..=5 {
        runs.save(
            run(&format!("r{day}"))
                .submitted(&format!("2020-01-0{day}T00:00:00Z"))
                .build(),
        )
        .unwrap();
    }

    assert_eq!(stores.ordered.card(LATEST_NEW_RUNS_KEY).unwrap(), 3);
    assert_eq!(stores.ordered.card(&format!("{LATEST_NEW_RUNS_KEY}:rpg")).unwrap(), 3);
    assert_eq!(ids(runs.load_latest_runs(0, None, false).unwrap()), vec!["r5", "r4"]);
    assert_eq!(ids(runs.load_latest_runs(2, None, false).unwrap()), vec!["r3"]);
}

#[test]
fn placeholder_runs_never_enter_feeds() {
    let (stores, runs) = setup(FeedConfig::default(), default_games());
    runs.store(vec![
        run("real").build(),
        run("dummy").time(0.0).verified("2020-01-01T00:00:00Z").build(),
    ])
    .unwrap();

    assert_eq!(stores.ordered.score(LATEST_NEW_RUNS_KEY, "dummy").unwrap(), None);
    assert_eq!(stores.ordered.score(LATEST_VERIFIED_RUNS_KEY, "dummy").unwrap(), None);
    assert_eq!(ids(runs.load_latest_runs(0, None, false).unwrap()), vec!["real"]);
}

#[test]
fn placeholder_without_game_is_tolerated() {
    let (_, runs) = setup(FeedConfig::default(), default_games());
    runs.save(run("dummy").game("unknown").time(0.0).build()).unwrap();
    assert!(runs.load_latest_runs(0, None, false).unwrap().is_empty());
}

#[test]
fn missing_game_fails_the_batch_but_keeps_primary_write() {
    let (_, runs) = setup(FeedConfig::default(), default_games());

    let err = runs
        .store(vec![run("ok").build(), run("orphan").game("unknown").build()])
        .unwrap_err();

    assert!(matches!(err, DaoError::Index { ref index, .. } if index == LATEST_NEW_RUNS_INDEX));
    assert!(matches!(
        err.root(),
        DaoError::MissingDependency { id, .. } if id == "unknown"
    ));
    assert!(runs.load_one("orphan").unwrap().is_some());
    assert!(runs.load_latest_runs(0, None, false).unwrap().is_empty());
}

#[test]
fn resubmission_moves_run_to_the_top() {
    let (_, runs) = setup(FeedConfig::default(), default_games());
    runs.store(vec![
        run("a").submitted("2020-01-01T00:00:00Z").build(),
        run("b").submitted("2020-01-02T00:00:00Z").build(),
    ])
    .unwrap();

    runs.save(run("a").submitted("2020-01-03T00:00:00Z").build()).unwrap();

    assert_eq!(ids(runs.load_latest_runs(0, None, false).unwrap()), vec!["a", "b"]);
}

#[test]
fn removed_runs_leave_the_feed() {
    let (_, runs) = setup(FeedConfig::default(), default_games());
    runs.store(vec![run("a").build(), run("b").build()]).unwrap();

    assert_eq!(runs.remove(&["a".to_string()]).unwrap(), 1);
    assert_eq!(ids(runs.load_latest_runs(0, None, false).unwrap()), vec!["b"]);
}

#[test]
fn vanished_records_surface_as_none() {
    let (stores, runs) = setup(FeedConfig::default(), default_games());
    runs.store(vec![
        run("a").submitted("2020-01-01T00:00:00Z").build(),
        run("b").submitted("2020-01-02T00:00:00Z").build(),
    ])
    .unwrap();
    stores.primary.delete_many("runs", &["b".to_string()]).unwrap();

    let page = runs.load_latest_runs(0, None, false).unwrap();
    assert_eq!(page.len(), 2);
    assert!(page[0].is_none());
    assert_eq!(page[1].as_ref().map(|e| e.id()), Some("a"));
}

#[test]
fn feeds_rebuild_from_primary() {
    let (stores, runs) = setup(FeedConfig::default(), default_games());
    runs.store(vec![
        run("a").submitted("2020-01-01T00:00:00Z").build(),
        run("b").submitted("2020-01-02T00:00:00Z").build(),
    ])
    .unwrap();

    let fresh = Stores::new(stores.primary.clone(), Arc::new(InMemoryOrderedStore::new()));
    let rebuilt = RunDao::new(fresh, &FeedConfig::default());
    assert!(rebuilt.load_latest_runs(0, None, false).unwrap().is_empty());

    assert_eq!(rebuilt.rebuild_index(LATEST_NEW_RUNS_INDEX).unwrap(), 2);
    assert_eq!(ids(rebuilt.load_latest_runs(0, None, false).unwrap()), vec!["b", "a"]);
}

#[test]
fn offsets_past_the_end_read_empty_pages() {
    let (_, runs) = setup(FeedConfig::default(), default_games());
    runs.store(vec![run("a").build()]).unwrap();

    assert!(runs.load_latest_runs(usize::MAX, None, false).unwrap().is_empty());
    assert!(runs
        .load_by_index(LATEST_NEW_RUNS_INDEX, &format!("rpg:{}", usize::MAX))
        .unwrap()
        .is_empty());
}
