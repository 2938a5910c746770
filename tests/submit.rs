mod common;

use common::Gate;
use solo::{Error, Executor, TaskFailure, TaskState, interrupt};

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::time::{Duration, Instant};

#[test]
fn test_submit_returns_value() {
    common::init_tracing();
    let executor = Executor::new();

    let handle = executor.submit(|| Ok::<_, Error>(42)).unwrap();

    assert_eq!(handle.get().unwrap(), 42);
    assert_eq!(handle.get().unwrap(), 42, "result is stable");
    assert_eq!(handle.state(), TaskState::Completed);
}

#[test]
fn test_failing_task_reports_cause() {
    common::init_tracing();
    let executor = Executor::new();

    let handle = executor
        .submit(|| Err::<u32, _>(io::Error::other("bad")))
        .unwrap();

    let err = handle.get().unwrap_err();
    let failure = err.failure().expect("execution error");
    assert_eq!(failure.cause().unwrap().to_string(), "bad");
    assert_eq!(handle.state(), TaskState::Failed);

    let again = handle.get().unwrap_err();
    assert_eq!(again.failure().unwrap().to_string(), "bad");
}

#[test]
fn test_panicking_task_fails_without_killing_the_worker() {
    common::init_tracing();
    let executor = Executor::new();

    let bad = executor.spawn(|| panic!("worker must survive")).unwrap();
    let good = executor.submit(|| Ok::<_, Error>("still alive")).unwrap();

    match bad.get() {
        Err(Error::Execution(TaskFailure::Panic(msg))) => assert_eq!(msg, "worker must survive"),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert_eq!(good.get().unwrap(), "still alive");
}

#[test]
fn test_get_timeout_leaves_task_running() {
    common::init_tracing();
    let executor = Executor::new();
    let gate = Gate::new();

    let blocker = gate.clone();
    let handle = executor
        .submit(move || {
            blocker.wait();
            Ok::<_, Error>(5)
        })
        .unwrap();

    let err = handle.get_timeout(Duration::from_millis(20)).unwrap_err();
    assert!(err.is_timeout());
    assert!(!handle.is_done());

    gate.open();
    assert_eq!(handle.get().unwrap(), 5);
}

#[test]
fn test_wait_timeout_reports_timeout_then_completion() {
    common::init_tracing();
    let executor = Executor::new();
    let gate = Gate::new();

    let blocker = gate.clone();
    let handle = executor.spawn(move || blocker.wait()).unwrap();

    assert!(matches!(
        handle.wait_timeout(Duration::from_millis(10)),
        Err(Error::TimedOut(_))
    ));

    gate.open();
    handle.wait().unwrap();
    assert!(handle.is_done());
}

#[test]
fn test_join_moves_non_clone_result() {
    struct Unique(u32);

    common::init_tracing();
    let executor = Executor::new();

    let handle = executor.submit(|| Ok::<_, Error>(Unique(9))).unwrap();

    assert_eq!(handle.join().unwrap().0, 9);
}

#[test]
fn test_cancelled_pending_task_never_runs() {
    common::init_tracing();
    let executor = Executor::new();
    let gate = Gate::new();
    let ran = Arc::new(AtomicBool::new(false));

    let blocker = gate.clone();
    let first = executor.spawn(move || blocker.wait()).unwrap();

    let flag = ran.clone();
    let second = executor
        .spawn(move || flag.store(true, Ordering::SeqCst))
        .unwrap();

    assert!(second.cancel(false));
    assert!(!second.cancel(true), "already cancelled");
    assert!(second.is_cancelled());
    assert!(matches!(second.get(), Err(Error::Cancelled)));

    gate.open();
    first.get().unwrap();
    executor.shutdown().unwrap();
    assert!(executor.await_termination(Duration::from_secs(5)).unwrap());

    assert!(!ran.load(Ordering::SeqCst));
}

#[test]
fn test_cancel_with_interrupt_stops_running_task() {
    common::init_tracing();
    let executor = Executor::new();
    let (started_tx, started_rx) = mpsc::channel();

    let handle = executor
        .submit(move || {
            started_tx.send(()).unwrap();
            interrupt::sleep(Duration::from_secs(30))?;
            Ok::<_, Error>("slept")
        })
        .unwrap();

    started_rx.recv().unwrap();
    let start = Instant::now();

    assert!(handle.cancel(true));
    assert!(handle.is_cancelled());
    assert!(matches!(handle.get(), Err(Error::Cancelled)));

    // The interrupt must not leak into the next task.
    let next = executor
        .submit(|| Ok::<_, Error>(interrupt::is_interrupted()))
        .unwrap();
    assert!(!next.get().unwrap());
    assert!(start.elapsed() < Duration::from_secs(10));
}

#[test]
fn test_cancel_without_interrupt_lets_body_finish() {
    common::init_tracing();
    let executor = Executor::new();
    let gate = Gate::new();
    let finished = Arc::new(AtomicBool::new(false));
    let (started_tx, started_rx) = mpsc::channel();

    let (blocker, flag) = (gate.clone(), finished.clone());
    let handle = executor
        .spawn(move || {
            started_tx.send(()).unwrap();
            blocker.wait();
            flag.store(true, Ordering::SeqCst);
        })
        .unwrap();

    started_rx.recv().unwrap();
    assert!(handle.cancel(false));
    assert_eq!(handle.state(), TaskState::Cancelled);

    gate.open();
    let after = executor.submit(|| Ok::<_, Error>(())).unwrap();
    after.get().unwrap();

    assert!(finished.load(Ordering::SeqCst));
    assert_eq!(handle.state(), TaskState::Cancelled, "outcome discarded");
}

#[test]
fn test_finished_task_cannot_be_cancelled() {
    common::init_tracing();
    let executor = Executor::new();

    let handle = executor.submit(|| Ok::<_, Error>(1)).unwrap();
    handle.wait().unwrap();

    assert!(!handle.cancel(true));
    assert_eq!(handle.get().unwrap(), 1);
}

#[test]
fn test_submission_after_shutdown_is_rejected() {
    common::init_tracing();
    let executor = Executor::new();
    executor.shutdown().unwrap();

    assert!(matches!(executor.submit(|| Ok::<_, Error>(1)), Err(Error::Rejected)));
    assert!(matches!(executor.spawn(|| {}), Err(Error::Rejected)));
    assert!(matches!(executor.spawn_with(|| {}, 1), Err(Error::Rejected)));
    assert!(matches!(executor.execute(|| {}), Err(Error::Rejected)));
}

#[test]
fn test_join_timeout_gives_up_without_touching_the_task() {
    common::init_tracing();
    let executor = Executor::new();
    let gate = Gate::new();

    let blocker = gate.clone();
    let slow = executor
        .submit(move || {
            blocker.wait();
            Ok::<_, Error>(String::from("late"))
        })
        .unwrap();
    let after = executor.submit(|| Ok::<_, Error>(String::from("after"))).unwrap();

    assert!(slow.join_timeout(Duration::from_millis(10)).unwrap_err().is_timeout());

    gate.open();
    assert_eq!(after.join_timeout(Duration::from_secs(5)).unwrap(), "after");
}
