use std::sync::{mpsc, Arc};
use std::time::Duration;

use serde_json::{json, Value};
use speedrun_ingest::queue::InMemoryCallQueue;
use speedrun_ingest::store::InMemoryTaskStateStore;
use speedrun_ingest::{HandlerError, HandlerRef, Scraper, ScraperConfig};

fn config() -> ScraperConfig {
    ScraperConfig {
        rate: 200.0,
        poll_timeout: Duration::from_millis(10),
        ..ScraperConfig::default()
    }
}

#[test]
fn scraper_loads_gamelist_on_first_start() {
    let (tx, rx) = mpsc::channel();
    let mut scraper = Scraper::new(
        config(),
        Arc::new(InMemoryCallQueue::new()),
        Arc::new(InMemoryTaskStateStore::new()),
    );
    scraper
        .register("gamelist", "list_all_games", move |run_id: &str, _: &Value| -> Result<(), HandlerError> {
            let _ = tx.send(run_id.to_string());
            Ok(())
        })
        .unwrap();

    let handle = scraper.start().unwrap();
    let run_id = rx.recv_timeout(Duration::from_secs(5)).unwrap();
    let state = handle.scheduler().state("load_gamelist").unwrap().unwrap();
    let stats = handle.stop();

    assert_eq!(state.run_id, run_id);
    assert!(state.next_fire.is_some());
    assert_eq!(stats.completed, 1);
}

#[test]
fn restarted_scraper_does_not_refire_within_period() {
    let queue = InMemoryCallQueue::new();
    let state = InMemoryTaskStateStore::new();
    let (tx, rx) = mpsc::channel::<String>();

    let start = |tx: mpsc::Sender<String>| {
        let mut scraper = Scraper::new(config(), Arc::new(queue.clone()), Arc::new(state.clone()));
        scraper
            .register("gamelist", "list_all_games", move |run_id: &str, _: &Value| -> Result<(), HandlerError> {
                let _ = tx.send(run_id.to_string());
                Ok(())
            })
            .unwrap();
        scraper.start().unwrap()
    };

    let first = start(tx.clone());
    rx.recv_timeout(Duration::from_secs(5)).unwrap();
    first.stop();

    let second = start(tx);
    assert!(rx.recv_timeout(Duration::from_millis(300)).is_err());
    second.stop();
}

#[test]
fn handle_accepts_ad_hoc_work() {
    let (tx, rx) = mpsc::channel();
    let mut scraper = Scraper::new(
        config(),
        Arc::new(InMemoryCallQueue::new()),
        Arc::new(InMemoryTaskStateStore::new()),
    )
    .with_tasks(vec![]);
    scraper
        .register("games", "load_game", move |_: &str, options: &Value| -> Result<(), HandlerError> {
            let _ = tx.send(options.clone());
            Ok(())
        })
        .unwrap();

    let handle = scraper.start().unwrap();
    handle
        .scheduler()
        .submit(HandlerRef::new("games", "load_game"), json!({"id": "g1"}))
        .unwrap();

    assert_eq!(
        rx.recv_timeout(Duration::from_secs(5)).unwrap(),
        json!({"id": "g1"})
    );
    handle.stop();
}
