mod common;

use solo::{Error, Executor, interrupt};

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

fn squares() -> impl Iterator<Item = impl FnOnce() -> Result<u64, Error> + Send + 'static> {
    (1..=4u64).map(|i| {
        move || {
            interrupt::sleep(Duration::from_millis(100 * i))?;
            Ok::<_, Error>(i * i)
        }
    })
}

#[test]
fn test_invoke_all_waits_for_every_task() {
    common::init_tracing();
    let executor = Executor::new();

    let handles = executor.invoke_all(squares()).unwrap();

    assert!(handles.iter().all(|h| h.is_done()));
    let values: Vec<u64> = handles.iter().map(|h| h.get().unwrap()).collect();
    assert_eq!(values, vec![1, 4, 9, 16]);
}

#[test]
fn test_invoke_all_timeout_cancels_unfinished_tasks() {
    common::init_tracing();
    let executor = Executor::new();
    let start = Instant::now();

    let handles = executor
        .invoke_all_timeout(squares(), Duration::from_millis(10))
        .unwrap();

    assert_eq!(handles.len(), 4);
    assert!(handles.iter().all(|h| h.is_done()));
    assert!(handles.iter().all(|h| h.is_cancelled()));
    assert!(start.elapsed() < Duration::from_secs(2));

    // The interrupted task does not hold the worker up.
    let next = executor.submit(|| Ok::<_, Error>(1)).unwrap();
    assert_eq!(next.get_timeout(Duration::from_secs(5)).unwrap(), 1);
}

#[test]
fn test_invoke_all_timeout_returns_results_in_time() {
    common::init_tracing();
    let executor = Executor::new();

    let handles = executor
        .invoke_all_timeout(
            (0..3).map(|i| move || Ok::<_, Error>(i)),
            Duration::from_secs(5),
        )
        .unwrap();

    let values: Vec<i32> = handles.iter().map(|h| h.get().unwrap()).collect();
    assert_eq!(values, vec![0, 1, 2]);
}

#[test]
fn test_invoke_all_reports_failures_through_handles() {
    common::init_tracing();
    let executor = Executor::new();

    let handles = executor
        .invoke_all((0..3).map(|i| {
            move || {
                if i == 1 {
                    Err(io::Error::other("second failed"))
                } else {
                    Ok(i)
                }
            }
        }))
        .unwrap();

    assert_eq!(handles[0].get().unwrap(), 0);
    assert_eq!(
        handles[1].get().unwrap_err().failure().unwrap().to_string(),
        "second failed"
    );
    assert_eq!(handles[2].get().unwrap(), 2);
}

#[test]
fn test_invoke_all_with_no_tasks_is_empty() {
    common::init_tracing();
    let executor = Executor::new();

    let handles = executor.invoke_all(Vec::<solo::Callable<u8>>::new()).unwrap();

    assert!(handles.is_empty());
}

#[test]
fn test_invoke_all_after_shutdown_enqueues_nothing() {
    common::init_tracing();
    let executor = Executor::new();
    let runs = Arc::new(AtomicUsize::new(0));
    executor.shutdown().unwrap();

    let result = executor.invoke_all((0..3).map(|_| {
        let runs = runs.clone();
        move || {
            runs.fetch_add(1, Ordering::SeqCst);
            Ok::<_, Error>(())
        }
    }));

    assert!(matches!(result, Err(Error::Rejected)));
    assert!(executor.await_termination(Duration::from_secs(5)).unwrap());
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_invoke_all_timeout_after_shutdown_enqueues_nothing() {
    common::init_tracing();
    let executor = Executor::new();
    let runs = Arc::new(AtomicUsize::new(0));
    executor.shutdown().unwrap();

    let result = executor.invoke_all_timeout(
        (0..3).map(|_| {
            let runs = runs.clone();
            move || {
                runs.fetch_add(1, Ordering::SeqCst);
                Ok::<_, Error>(())
            }
        }),
        Duration::from_secs(1),
    );

    assert!(matches!(result, Err(Error::Rejected)));
    assert!(executor.await_termination(Duration::from_secs(5)).unwrap());
    assert_eq!(runs.load(Ordering::SeqCst), 0);
}

#[test]
fn test_interrupted_invoke_all_cancels_its_tasks() {
    common::init_tracing();
    let executor = Arc::new(Executor::new());
    let (tx, rx) = mpsc::channel();

    let caller = {
        let executor = executor.clone();
        thread::spawn(move || {
            tx.send(interrupt::current()).unwrap();
            executor.invoke_all((0..3).map(|_| {
                || {
                    interrupt::sleep(Duration::from_secs(30))?;
                    Ok::<_, Error>(())
                }
            }))
        })
    };

    let interrupter = rx.recv().unwrap();
    thread::sleep(Duration::from_millis(50));
    interrupter.interrupt();

    assert!(matches!(caller.join().unwrap(), Err(Error::Interrupted)));

    let next = executor.submit(|| Ok::<_, Error>("free")).unwrap();
    assert_eq!(next.get_timeout(Duration::from_secs(5)).unwrap(), "free");
}
