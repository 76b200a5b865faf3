//! Example: retrying a flaky operation
//!
//! This example demonstrates:
//! 1. Simple retry with the default zero-delay backoff
//! 2. Caller-side classification (only retry network errors)
//! 3. Jittered exponential backoff, scaled down so it finishes quickly
//! 4. The async loop
//!
//! Run with:
//! ```bash
//! RUST_LOG=tryagain=debug cargo run -p tryagain --example retry_example --features tracing
//! ```

use std::error::Error;
use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;
use tryagain::backoff::jitter;
use tryagain::prelude::*;

/// A simulated API that fails the first few times
struct UnreliableApi {
    attempts: Arc<AtomicU32>,
    fail_count: u32,
}

impl UnreliableApi {
    fn new(fail_count: u32) -> Self {
        Self {
            attempts: Arc::new(AtomicU32::new(0)),
            fail_count,
        }
    }

    fn call(&self) -> Result<String, io::Error> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst);

        if attempt < self.fail_count {
            println!("  Attempt {}: FAILED (simulating network error)", attempt + 1);
            Err(io::Error::new(
                io::ErrorKind::ConnectionReset,
                format!("network error on attempt {}", attempt + 1),
            ))
        } else {
            println!("  Attempt {}: SUCCESS", attempt + 1);
            Ok("API response data".to_string())
        }
    }

    fn total_attempts(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

/// Example 1: Simple retry
fn example_simple_retry() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 1: Simple Retry ===\n");

    let api = UnreliableApi::new(2);
    let result = retry(|_| api.call().map_err(Failure::retry))?;

    println!("\nResult: {}", result);
    println!("Total attempts: {}", api.total_attempts());

    Ok(())
}

/// Example 2: Only network errors are worth another attempt
fn example_classification() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 2: Caller-Side Classification ===\n");

    let classify = |err: io::Error| {
        let transient = matches!(
            err.kind(),
            io::ErrorKind::ConnectionReset | io::ErrorKind::TimedOut
        );
        Failure::new(err, transient)
    };

    println!("Test 1: Permission error (should NOT retry)");
    let result: Result<(), _> = Retry::new(RetryConfig::new(3)).run(|attempt| {
        println!("  Attempt {}", attempt);
        Err(classify(io::Error::new(
            io::ErrorKind::PermissionDenied,
            "auth failed",
        )))
    });
    let err = result.unwrap_err();
    println!("  Gave up with: {} (exhausted: {})", err, is_budget_exhausted(&err));

    println!("\nTest 2: Network error (should retry until the budget runs out)");
    let api = UnreliableApi::new(u32::MAX);
    let result = Retry::new(RetryConfig::new(3)).run(|_| api.call().map_err(classify));
    let err = result.unwrap_err();
    println!("  Gave up with: {} (exhausted: {})", err, is_budget_exhausted(&err));

    Ok(())
}

/// Example 3: Jittered exponential backoff
fn example_jitter() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 3: Jittered Exponential Backoff ===\n");

    let backoff = ExponentialJitter::new();
    for attempt in 2..=5 {
        println!("  Delay before attempt {}: {:?}", attempt, backoff.delay(attempt));
    }

    println!("\n  jitter(1) x5:");
    for _ in 0..5 {
        println!("    {:?}", jitter(1));
    }

    // Same shape, in hundredths, so the demo does not wait for seconds
    let scaled = |attempt: u32| backoff.delay(attempt) / 100;

    let api = UnreliableApi::new(3);
    let start = Instant::now();
    let result = Retry::new(RetryConfig::default())
        .with_backoff(scaled)
        .run(|_| api.call().map_err(Failure::retry))?;

    println!("\nResult: {}", result);
    println!("Total attempts: {}", api.total_attempts());
    println!("Total time: {:?}", start.elapsed());
    println!("Expected delays: ~40ms + ~80ms + ~160ms = ~280ms (±33%)");

    Ok(())
}

/// Example 4: Async loop
async fn example_async() -> Result<(), Box<dyn Error>> {
    println!("\n=== Example 4: Async Retry ===\n");

    let attempts = Arc::new(AtomicU32::new(0));
    let value = Retry::new(RetryConfig::new(5))
        .with_backoff(|_: u32| Duration::from_millis(50))
        .run_async(|attempt| {
            let attempts = Arc::clone(&attempts);
            async move {
                attempts.fetch_add(1, Ordering::SeqCst);
                if attempt < 3 {
                    println!("  Attempt {}: not ready", attempt);
                    Err(Failure::retry(io::Error::other("not ready")))
                } else {
                    println!("  Attempt {}: ready", attempt);
                    Ok(attempt)
                }
            }
        })
        .await?;

    println!("\nSucceeded on attempt {}", value);
    println!("Total attempts: {}", attempts.load(Ordering::SeqCst));

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("tryagain Examples");
    println!("=================");

    example_simple_retry()?;
    example_classification()?;
    example_jitter()?;
    example_async().await?;

    println!("\n=== All examples completed successfully! ===\n");

    Ok(())
}
