//! The five-stage shopping workflow.
//!
//! ```text
//! Init ─Load─▶ Loaded ─▶ TemperatureKnown
//!      ─Select─▶ CategorySelected
//!      ─AddToCart─▶ ItemsAdded ─▶ CartReached
//!      ─VerifyCart─▶ CartVerified
//!      ─Pay─▶ PaymentFormOpen ─▶ Submitted ─▶ Done
//! ```
//!
//! Any stage error moves the run to `Failed`; no later stage runs and
//! nothing is retried.
//!
//! # Example
//!
//! ```ignore
//! let config = ShopperConfig::load(None)?;
//! let mut driver = ChromiumDriver::launch(&config.browser).await?;
//! let outcome = Workflow::new(&mut driver, &config).run().await;
//! println!("{}", outcome.report.to_json()?);
//! ```

use crate::artifacts::{ArtifactCapture, Artifacts};
use crate::config::{PaymentDetails, ShopperConfig};
use crate::criteria::{select_category, ProductCategory};
use crate::driver::BrowserDriver;
use crate::pages::Pages;
use crate::report::{FailureReport, Outcome, RunReport};
use crate::result::{ShopperError, ShopperResult};
use crate::state::SessionState;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

/// Pipeline stages in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Open the site and read the temperature
    Load,
    /// Choose the category and open its listing
    Select,
    /// Add the two cheapest matching products and open the cart
    AddToCart,
    /// Check cart contents and total
    VerifyCart,
    /// Fill and submit the payment form, confirm success
    Pay,
}

impl Stage {
    /// Declared order
    pub const ALL: [Self; 5] = [
        Self::Load,
        Self::Select,
        Self::AddToCart,
        Self::VerifyCart,
        Self::Pay,
    ];

    /// Display name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Load => "Load",
            Self::Select => "Select",
            Self::AddToCart => "AddToCart",
            Self::VerifyCart => "VerifyCart",
            Self::Pay => "Pay",
        }
    }

    /// File name stem for failure artifacts
    #[must_use]
    pub const fn artifact_name(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Select => "select",
            Self::AddToCart => "add_to_cart",
            Self::VerifyCart => "verify_cart",
            Self::Pay => "pay",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Workflow states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowState {
    /// Nothing done yet
    Init,
    /// Home page shown
    Loaded,
    /// Temperature read
    TemperatureKnown,
    /// Category listing shown
    CategorySelected,
    /// Both products added
    ItemsAdded,
    /// Cart page shown
    CartReached,
    /// Contents and total checked
    CartVerified,
    /// Card form shown
    PaymentFormOpen,
    /// Card form submitted
    Submitted,
    /// Payment confirmed
    Done,
    /// A stage failed
    Failed,
}

impl WorkflowState {
    const fn successor(self) -> Option<Self> {
        match self {
            Self::Init => Some(Self::Loaded),
            Self::Loaded => Some(Self::TemperatureKnown),
            Self::TemperatureKnown => Some(Self::CategorySelected),
            Self::CategorySelected => Some(Self::ItemsAdded),
            Self::ItemsAdded => Some(Self::CartReached),
            Self::CartReached => Some(Self::CartVerified),
            Self::CartVerified => Some(Self::PaymentFormOpen),
            Self::PaymentFormOpen => Some(Self::Submitted),
            Self::Submitted => Some(Self::Done),
            Self::Done | Self::Failed => None,
        }
    }

    /// Whether no further transition is possible
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Validate a transition to `to`.
    ///
    /// Only the direct successor, or `Failed` from any non-terminal state,
    /// is allowed.
    pub fn next(self, to: Self) -> ShopperResult<Self> {
        let allowed = match to {
            Self::Failed => !self.is_terminal(),
            _ => self.successor() == Some(to),
        };
        if allowed {
            Ok(to)
        } else {
            Err(ShopperError::invariant(format!(
                "illegal transition {self:?} -> {to:?}"
            )))
        }
    }
}

/// Report plus the typed error of a run
#[derive(Debug)]
pub struct RunOutcome {
    /// Serializable summary
    pub report: RunReport,
    /// `Err` with the original stage error when the run failed
    pub result: ShopperResult<()>,
}

impl RunOutcome {
    /// Whether the run reached `Done`
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.report.is_success()
    }
}

/// States reached so far in one run
#[derive(Debug, Clone, PartialEq, Eq)]
struct Progress {
    current: WorkflowState,
    transitions: Vec<WorkflowState>,
}

impl Progress {
    fn new() -> Self {
        Self {
            current: WorkflowState::Init,
            transitions: vec![WorkflowState::Init],
        }
    }

    fn advance(&mut self, to: WorkflowState) -> ShopperResult<()> {
        self.current = self.current.next(to)?;
        self.transitions.push(to);
        Ok(())
    }

    fn fail(&mut self) {
        if !self.current.is_terminal() {
            self.current = WorkflowState::Failed;
            self.transitions.push(WorkflowState::Failed);
        }
    }
}

/// One run of the workflow over a borrowed driver
pub struct Workflow<'a, D: BrowserDriver + ?Sized> {
    driver: &'a mut D,
    config: &'a ShopperConfig,
    pages: Pages,
    state: SessionState,
    progress: Progress,
    run_id: Uuid,
}

impl<D: BrowserDriver + ?Sized> fmt::Debug for Workflow<'_, D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Workflow")
            .field("run_id", &self.run_id)
            .field("current", &self.progress.current)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

impl<'a, D: BrowserDriver + ?Sized> Workflow<'a, D> {
    /// Fresh run with a random id
    pub fn new(driver: &'a mut D, config: &'a ShopperConfig) -> Self {
        Self {
            driver,
            config,
            pages: Pages::new(config),
            state: SessionState::new(),
            progress: Progress::new(),
            run_id: Uuid::new_v4(),
        }
    }

    /// Current state
    #[must_use]
    pub const fn current(&self) -> WorkflowState {
        self.progress.current
    }

    /// Session values published so far
    #[must_use]
    pub const fn session(&self) -> &SessionState {
        &self.state
    }

    /// Run every stage in order, stopping at the first failure
    pub async fn run(mut self) -> RunOutcome {
        let started_at = Utc::now();
        let clock = Instant::now();
        info!(run_id = %self.run_id, base_url = %self.config.site.base_url, "workflow started");

        let mut failure = None;
        let mut result = Ok(());
        for stage in Stage::ALL {
            let span = info_span!("stage", run_id = %self.run_id, stage = stage.name());
            if let Err(error) = self.run_stage(stage).instrument(span).await {
                error!(
                    run_id = %self.run_id,
                    stage = stage.name(),
                    kind = error.kind(),
                    error = %error,
                    "stage failed"
                );
                let artifacts = self.capture_artifacts(stage).await;
                self.progress.fail();
                failure = Some(FailureReport {
                    stage,
                    kind: error.kind().to_string(),
                    message: error.to_string(),
                    artifacts,
                });
                result = Err(error);
                break;
            }
            info!(run_id = %self.run_id, stage = stage.name(), state = ?self.progress.current, "stage passed");
        }

        let report = RunReport {
            run_id: self.run_id,
            started_at,
            duration_ms: u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX),
            outcome: if failure.is_none() {
                Outcome::Done
            } else {
                Outcome::Failed
            },
            transitions: self.progress.transitions,
            session: self.state.snapshot(),
            failure,
        };
        info!(run_id = %report.run_id, outcome = ?report.outcome, duration_ms = report.duration_ms, "workflow finished");
        RunOutcome { report, result }
    }

    /// Run a single stage against the current session.
    ///
    /// The stage's inputs are read from the session first, so running one
    /// before its producer fails with `MissingState` without touching the
    /// browser. Its output is published once it returns, then the stage's
    /// closing state is recorded.
    pub async fn run_stage(&mut self, stage: Stage) -> ShopperResult<()> {
        let driver = &mut *self.driver;
        let pages = &self.pages;
        let progress = &mut self.progress;
        match stage {
            Stage::Load => {
                let temperature = load(pages, driver, progress).await?;
                self.state.temperature.set(temperature)?;
                progress.advance(WorkflowState::TemperatureKnown)
            }
            Stage::Select => {
                let temperature = *self.state.temperature.require(stage.name())?;
                let category = select(pages, driver, temperature).await?;
                self.state.product_category.set(category)?;
                progress.advance(WorkflowState::CategorySelected)
            }
            Stage::AddToCart => {
                let category = *self.state.product_category.require(stage.name())?;
                let added = add_to_cart(pages, driver, progress, category).await?;
                self.state.added_items.set(added)?;
                progress.advance(WorkflowState::CartReached)
            }
            Stage::VerifyCart => {
                let added = self.state.added_items.require(stage.name())?;
                let total = verify_cart(pages, driver, added).await?;
                self.state.verified_total.set(total)?;
                progress.advance(WorkflowState::CartVerified)
            }
            Stage::Pay => {
                let total = *self.state.verified_total.require(stage.name())?;
                pay(pages, driver, progress, &self.config.payment, total).await?;
                progress.advance(WorkflowState::Done)
            }
        }
    }

    async fn capture_artifacts(&mut self, stage: Stage) -> Artifacts {
        let capture = ArtifactCapture::new(self.config.artifacts_dir.join(self.run_id.to_string()));
        capture
            .capture(&mut *self.driver, stage.artifact_name())
            .await
    }
}

// ============================================================================
// Stages
// ============================================================================

/// Open the home page and read the temperature
async fn load<D: BrowserDriver + ?Sized>(
    pages: &Pages,
    driver: &mut D,
    progress: &mut Progress,
) -> ShopperResult<i32> {
    pages.home.load(driver).await?;
    progress.advance(WorkflowState::Loaded)?;

    let temperature = pages.home.read_temperature(driver).await?;
    info!(temperature, "temperature known");
    Ok(temperature)
}

/// Pick the category for `temperature` and open its listing
async fn select<D: BrowserDriver + ?Sized>(
    pages: &Pages,
    driver: &mut D,
    temperature: i32,
) -> ShopperResult<ProductCategory> {
    let category = select_category(temperature);
    info!(temperature, %category, "category selected");
    pages.home.go_to_category(driver, category).await?;
    Ok(category)
}

/// Add the cheapest match for each of the category's needles, then open
/// the cart. Returns the added names in order.
async fn add_to_cart<D: BrowserDriver + ?Sized>(
    pages: &Pages,
    driver: &mut D,
    progress: &mut Progress,
    category: ProductCategory,
) -> ShopperResult<Vec<String>> {
    let product = &pages.product;
    let mut added = Vec::with_capacity(2);
    for needle in category.acquisitions() {
        let entry = product.cheapest(driver, needle).await?;
        product.add_to_cart(driver, &entry).await?;
        added.push(entry.name);
    }
    progress.advance(WorkflowState::ItemsAdded)?;

    product.go_to_cart(driver).await?;
    Ok(added)
}

async fn verify_cart<D: BrowserDriver + ?Sized>(
    pages: &Pages,
    driver: &mut D,
    added: &[String],
) -> ShopperResult<u32> {
    pages.cart.verify_contains(driver, added).await?;
    pages.cart.verify_total(driver).await
}

async fn pay<D: BrowserDriver + ?Sized>(
    pages: &Pages,
    driver: &mut D,
    progress: &mut Progress,
    details: &PaymentDetails,
    total: u32,
) -> ShopperResult<()> {
    info!(total, "paying");
    pages.cart.proceed_to_payment(driver).await?;
    progress.advance(WorkflowState::PaymentFormOpen)?;

    pages.payment.fill_and_submit(driver, details).await?;
    progress.advance(WorkflowState::Submitted)?;

    pages.payment.verify_success(driver).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    mod transition_tests {
        use super::*;

        #[test]
        fn test_happy_path_chain() {
            let mut state = WorkflowState::Init;
            let mut steps = 0;
            while let Some(next) = state.successor() {
                state = state.next(next).unwrap();
                steps += 1;
            }
            assert_eq!(state, WorkflowState::Done);
            assert_eq!(steps, 9);
        }

        #[test]
        fn test_skipping_a_state_is_rejected() {
            let err = WorkflowState::Loaded
                .next(WorkflowState::CategorySelected)
                .unwrap_err();
            assert_eq!(err.kind(), "invariant_violation");
        }

        #[test]
        fn test_failed_from_any_non_terminal() {
            assert!(WorkflowState::Init.next(WorkflowState::Failed).is_ok());
            assert!(WorkflowState::Submitted.next(WorkflowState::Failed).is_ok());
            assert!(WorkflowState::Done.next(WorkflowState::Failed).is_err());
            assert!(WorkflowState::Failed.next(WorkflowState::Failed).is_err());
        }
    }

    mod progress_tests {
        use super::*;

        #[test]
        fn test_rejected_advance_leaves_record_untouched() {
            let mut progress = Progress::new();
            progress.advance(WorkflowState::Loaded).unwrap();
            progress.advance(WorkflowState::TemperatureKnown).unwrap();
            let before = progress.clone();

            let err = progress.advance(WorkflowState::Loaded).unwrap_err();
            assert_eq!(err.kind(), "invariant_violation");
            assert_eq!(progress, before);
        }

        #[test]
        fn test_fail_is_recorded_once() {
            let mut progress = Progress::new();
            progress.fail();
            progress.fail();
            assert_eq!(progress.current, WorkflowState::Failed);
            assert_eq!(
                progress.transitions,
                vec![WorkflowState::Init, WorkflowState::Failed]
            );
        }
    }

    mod stage_tests {
        use super::*;

        #[test]
        fn test_declared_order() {
            let names: Vec<&str> = Stage::ALL.iter().map(|s| s.name()).collect();
            assert_eq!(names, ["Load", "Select", "AddToCart", "VerifyCart", "Pay"]);
        }

        #[test]
        fn test_artifact_names_are_file_safe() {
            for stage in Stage::ALL {
                assert!(stage
                    .artifact_name()
                    .chars()
                    .all(|c| c.is_ascii_lowercase() || c == '_'));
            }
        }
    }
}
