//! Example: a tour of the executor API

use solo::{Error, ExecutorBuilder, interrupt, tasks};
use std::time::{Duration, Instant};

fn main() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    let executor = ExecutorBuilder::new()
        .thread_name("demo-worker")
        .on_thread_start(|| tracing::info!("worker online"))
        .on_thread_stop(|| tracing::info!("worker offline"))
        .build()?;

    // Single submission
    let answer = executor.submit(|| Ok::<_, Error>(6 * 7))?;
    println!("answer = {}", answer.get()?);

    // Bulk: wait for every task
    let squares = executor.invoke_all((1..=4u64).map(|i| {
        move || {
            interrupt::sleep(Duration::from_millis(50 * i))?;
            Ok::<_, Error>(i * i)
        }
    }))?;
    let values: Vec<u64> = squares.iter().map(|h| h.get()).collect::<Result<_, _>>()?;
    println!("squares = {values:?}");

    // Bulk: first success wins, the rest is cancelled
    let start = Instant::now();
    let winner: &str = executor.invoke_any(tasks![
        || Err::<&str, _>(std::io::Error::other("primary unavailable")),
        || Ok::<_, Error>("fallback"),
        || {
            interrupt::sleep(Duration::from_secs(10))?;
            Ok::<_, Error>("too slow")
        },
    ])?;
    println!("winner = {winner} after {:?}", start.elapsed());

    // A long task, stopped by an immediate shutdown
    let long = executor.submit(|| {
        interrupt::sleep(Duration::from_secs(10))?;
        Ok::<_, Error>(())
    })?;
    let queued = executor.spawn(|| println!("never printed"))?;

    interrupt::sleep(Duration::from_millis(20))?;
    let pending = executor.shutdown_now()?;
    println!("{} task(s) never started", pending.len());
    drop(pending);

    executor.await_termination(Duration::from_secs(1))?;
    println!("long task: {:?}", long.get().map_err(|e| e.to_string()));
    println!("queued task cancelled: {}", queued.is_cancelled());

    Ok(())
}
