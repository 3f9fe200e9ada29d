//! Cooperative yielding for long calculations
//!
//! Planning is CPU-bound and runs on the shared runtime; a plan over many
//! servers and shards must not hold a worker thread hostage. Construct a
//! [`CalculationYielder`] at the start of the calculation and call
//! `maybe_yield` from every loop. It only actually suspends after the task
//! has held the CPU for a while, so calling it from a tight inner loop is
//! fine. Every call also checks the interruptor.

use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use super::error::PlanError;

/// How long the task may hold the CPU between yields.
const YIELD_INTERVAL: Duration = Duration::from_millis(10);

/// Tracks when the surrounding calculation last gave up the CPU.
#[derive(Debug)]
pub(crate) struct CalculationYielder {
    last_yield: Instant,
}

impl CalculationYielder {
    pub(crate) fn new() -> Self {
        Self {
            last_yield: Instant::now(),
        }
    }

    /// Yield if the task has run for at least [`YIELD_INTERVAL`], then check
    /// for cancellation.
    pub(crate) async fn maybe_yield(
        &mut self,
        interruptor: &CancellationToken,
    ) -> Result<(), PlanError> {
        if self.last_yield.elapsed() >= YIELD_INTERVAL {
            tokio::task::yield_now().await;
            self.last_yield = Instant::now();
        }
        if interruptor.is_cancelled() {
            return Err(PlanError::Interrupted);
        }
        Ok(())
    }
}
