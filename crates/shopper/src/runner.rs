//! Independent concurrent runs.
//!
//! Each run gets its own driver (one browser per run) and its own session;
//! runs share nothing but the configuration.

use crate::config::ShopperConfig;
use crate::driver::BrowserDriver;
use crate::result::ShopperResult;
use crate::workflow::{RunOutcome, Workflow};
use futures::future::join_all;
use std::future::Future;
use tracing::{info, warn};

/// Run one workflow on `driver`, then close the driver.
///
/// A failure to close is logged; it does not change the run's outcome.
pub async fn run_once<D: BrowserDriver>(mut driver: D, config: &ShopperConfig) -> RunOutcome {
    let outcome = Workflow::new(&mut driver, config).run().await;
    if let Err(e) = driver.close().await {
        warn!(run_id = %outcome.report.run_id, error = %e, "driver close failed");
    }
    outcome
}

/// Run `runs` workflows concurrently.
///
/// `launch(index)` provides the driver for run `index`. A launch failure is
/// reported for that run only. Results come back in run order.
pub async fn run_many<D, F, Fut>(
    runs: usize,
    launch: F,
    config: &ShopperConfig,
) -> Vec<ShopperResult<RunOutcome>>
where
    D: BrowserDriver,
    F: Fn(usize) -> Fut,
    Fut: Future<Output = ShopperResult<D>>,
{
    info!(runs, "starting runs");
    let launch = &launch;
    let results = join_all((0..runs).map(|index| async move {
        match launch(index).await {
            Ok(driver) => Ok(run_once(driver, config).await),
            Err(e) => {
                warn!(index, error = %e, "browser launch failed");
                Err(e)
            }
        }
    }))
    .await;

    let passed = results
        .iter()
        .filter(|r| r.as_ref().is_ok_and(RunOutcome::is_success))
        .count();
    info!(runs, passed, failed = runs - passed, "runs finished");
    results
}
