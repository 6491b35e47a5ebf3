use std::sync::Arc;
use std::thread;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use serde_json::json;
use speedrun_ingest::queue::{FIRST_ATTEMPT_BAND, InMemoryCallQueue};
use speedrun_ingest::store::{InMemoryTaskStateStore, TaskStateStore};
use speedrun_ingest::{
    join_run_id, Call, CallBus, CallQueue, Dispatcher, DispatchOutcome, HandlerRef, Scheduler,
    Task, TaskState,
};

use crate::{registry_with, Recorder};

fn handler() -> HandlerRef {
    HandlerRef::new("gamelist", "list_all_games")
}

struct Rig {
    queue: InMemoryCallQueue,
    state: InMemoryTaskStateStore,
    recorder: Recorder,
    scheduler: Scheduler,
    dispatcher: Dispatcher,
}

fn rig(tasks: Vec<Task>) -> Rig {
    rig_with_state(tasks, InMemoryTaskStateStore::new())
}

fn rig_with_state(tasks: Vec<Task>, state: InMemoryTaskStateStore) -> Rig {
    let queue = InMemoryCallQueue::new();
    let recorder = Recorder::default();
    let registry = registry_with("gamelist", "list_all_games", &recorder);
    let bus = CallBus::new(Arc::new(queue.clone()));
    let scheduler =
        Scheduler::new(tasks, registry.clone(), bus.clone(), Arc::new(state.clone())).unwrap();
    let dispatcher = Dispatcher::new(bus, registry).with_poll_timeout(Duration::from_millis(10));
    Rig {
        queue,
        state,
        recorder,
        scheduler,
        dispatcher,
    }
}

fn decoded(queue: &InMemoryCallQueue) -> Vec<Call> {
    queue
        .pending(FIRST_ATTEMPT_BAND)
        .unwrap()
        .iter()
        .map(|raw| Call::decode(raw).unwrap())
        .collect()
}

#[test]
fn scheduled_task_reaches_its_handler() {
    let rig = rig(vec![
        Task::once("load", handler()).with_options(json!({"offset": 40}))
    ]);

    let run_id = rig.scheduler.schedule("load").unwrap();
    let outcome = rig.dispatcher.dispatch_one().unwrap();

    assert_eq!(outcome, DispatchOutcome::Completed { run_id: run_id.clone() });
    assert_eq!(rig.recorder.calls(), vec![(run_id, json!({"offset": 40}))]);
}

#[test]
fn start_fires_tasks_without_state() {
    let rig = rig(vec![Task::every("daily", handler(), Duration::from_secs(86_400))]);
    let before = Utc::now();

    rig.scheduler.start().unwrap();

    let calls = decoded(&rig.queue);
    assert_eq!(calls.len(), 1);
    let state = TaskState::decode(&rig.state.get("daily").unwrap().unwrap()).unwrap();
    assert_eq!(state.run_id, calls[0].run_id);
    assert!(state.next_fire.unwrap() >= before + TimeDelta::hours(23));
    rig.scheduler.shutdown();
}

#[test]
fn start_fires_overdue_tasks() {
    let state = InMemoryTaskStateStore::new();
    let overdue = TaskState {
        run_id: "old".into(),
        next_fire: Some(Utc::now() - TimeDelta::minutes(5)),
    };
    state.set("daily", overdue.encode()).unwrap();
    let rig = rig_with_state(
        vec![Task::every("daily", handler(), Duration::from_secs(86_400))],
        state,
    );

    rig.scheduler.start().unwrap();

    let calls = decoded(&rig.queue);
    assert_eq!(calls.len(), 1);
    assert_ne!(calls[0].run_id, "old");
    rig.scheduler.shutdown();
}

#[test]
fn start_waits_out_remaining_period() {
    let state = InMemoryTaskStateStore::new();
    let pending = TaskState {
        run_id: "current".into(),
        next_fire: Some(Utc::now() + TimeDelta::milliseconds(150)),
    };
    state.set("daily", pending.encode()).unwrap();
    let rig = rig_with_state(
        vec![Task::every("daily", handler(), Duration::from_secs(86_400))],
        state,
    );

    rig.scheduler.start().unwrap();
    assert!(decoded(&rig.queue).is_empty());
    assert_eq!(rig.scheduler.state("daily").unwrap().unwrap().run_id, "current");

    thread::sleep(Duration::from_millis(600));
    assert_eq!(decoded(&rig.queue).len(), 1);
    rig.scheduler.shutdown();
}

#[test]
fn one_shot_tasks_do_not_fire_on_start() {
    let rig = rig(vec![Task::once("once", handler())]);
    rig.scheduler.start().unwrap();
    assert!(rig.queue.is_empty().unwrap());
}

#[test]
fn recurring_tasks_rearm_after_each_fire() {
    let rig = rig(vec![Task::every("fast", handler(), Duration::from_millis(60))]);

    rig.scheduler.schedule("fast").unwrap();
    thread::sleep(Duration::from_millis(400));
    rig.scheduler.shutdown();
    thread::sleep(Duration::from_millis(100));

    let calls = decoded(&rig.queue);
    assert!(calls.len() >= 3, "expected repeated fires, got {}", calls.len());
    let mut run_ids: Vec<&str> = calls.iter().map(|c| c.run_id.as_str()).collect();
    run_ids.dedup();
    assert_eq!(run_ids.len(), calls.len());

    // Nothing fires after shutdown.
    let settled = calls.len();
    thread::sleep(Duration::from_millis(200));
    assert_eq!(decoded(&rig.queue).len(), settled);
}

#[test]
fn rescheduling_supersedes_the_armed_timer() {
    let rig = rig(vec![Task::every("slow", handler(), Duration::from_millis(200))]);

    // Three manual fires in quick succession leave a single armed timer.
    for _ in 0..3 {
        rig.scheduler.schedule("slow").unwrap();
    }
    thread::sleep(Duration::from_millis(300));
    rig.scheduler.shutdown();

    assert_eq!(decoded(&rig.queue).len(), 4);
}

#[test]
fn submitted_work_is_dispatched() {
    let rig = rig(vec![]);
    let run_id = rig
        .scheduler
        .submit(handler(), json!({"game": "g1"}))
        .unwrap();
    let sub_run = join_run_id(&[run_id.as_str(), "g1"]);

    assert_eq!(
        rig.dispatcher.dispatch_one().unwrap(),
        DispatchOutcome::Completed { run_id: run_id.clone() }
    );
    assert_eq!(sub_run, format!("{run_id}/g1"));
}
