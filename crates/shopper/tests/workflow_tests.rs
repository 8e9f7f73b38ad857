//! End-to-end workflow runs against the scripted fake site.
//!
//! Every scenario drives the full five-stage pipeline through `MockDriver`
//! and checks the report, the typed error and what the fake browser saw.

#![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

use tempfile::TempDir;
use weather_shopper::prelude::*;

fn config(dir: &TempDir) -> ShopperConfig {
    ShopperConfig::new()
        .with_timeouts(Timeouts::uniform(200, 5))
        .with_artifacts_dir(dir.path())
}

async fn run(site: MockSite, config: &ShopperConfig) -> (RunOutcome, MockDriver) {
    let mut driver = MockDriver::new(site);
    let outcome = Workflow::new(&mut driver, config).run().await;
    (outcome, driver)
}

// ============================================================================
// Happy paths
// ============================================================================

#[tokio::test]
async fn cold_day_buys_moisturizers_and_pays() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let (outcome, driver) = run(MockSite::new().with_temperature("10 ℃"), &config).await;

    assert!(outcome.is_success(), "{:?}", outcome.result);
    let report = &outcome.report;
    assert_eq!(report.outcome, Outcome::Done);
    assert_eq!(
        report.transitions,
        vec![
            WorkflowState::Init,
            WorkflowState::Loaded,
            WorkflowState::TemperatureKnown,
            WorkflowState::CategorySelected,
            WorkflowState::ItemsAdded,
            WorkflowState::CartReached,
            WorkflowState::CartVerified,
            WorkflowState::PaymentFormOpen,
            WorkflowState::Submitted,
            WorkflowState::Done,
        ]
    );
    assert_eq!(report.session.temperature, Some(10));
    assert_eq!(
        report.session.product_category,
        Some(ProductCategory::Moisturizer)
    );
    assert_eq!(
        report.session.added_items,
        Some(vec![
            "Aloe Vera Gel".to_string(),
            "Vassily Almond Moisturizer".to_string()
        ])
    );
    assert_eq!(report.session.verified_total, Some(215));
    assert!(report.failure.is_none());

    assert!(driver.url().ends_with("/confirmation"));
    assert_eq!(driver.filled("input[placeholder='MM / YY']"), Some("1230"));
    assert_eq!(driver.filled("input[type='email']"), Some("test@example.com"));
    assert!(!driver.was_called("screenshot"));
}

#[tokio::test]
async fn hot_day_buys_sunscreens() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let (outcome, _) = run(MockSite::new().with_temperature("36 ℃"), &config).await;

    assert!(outcome.is_success(), "{:?}", outcome.result);
    let session = &outcome.report.session;
    assert_eq!(session.product_category, Some(ProductCategory::Sunscreen));
    assert_eq!(
        session.added_items,
        Some(vec![
            "Nivea SPF-50 Lotion".to_string(),
            "Jeff SPF-30".to_string()
        ])
    );
    assert_eq!(session.verified_total, Some(360));
}

#[tokio::test]
async fn mild_and_freezing_days_default_to_moisturizers() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    for (text, expected) in [("25 ℃", 25), ("34 ℃", 34), ("-3 ℃", 3)] {
        let (outcome, _) = run(MockSite::new().with_temperature(text), &config).await;
        assert!(outcome.is_success(), "{text}: {:?}", outcome.result);
        assert_eq!(outcome.report.session.temperature, Some(expected));
        assert_eq!(
            outcome.report.session.product_category,
            Some(ProductCategory::Moisturizer)
        );
    }
}

#[tokio::test]
async fn sign_is_not_part_of_the_reading() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let (outcome, _) = run(MockSite::new().with_temperature("-40 ℃"), &config).await;

    assert!(outcome.is_success(), "{:?}", outcome.result);
    assert_eq!(outcome.report.session.temperature, Some(40));
    assert_eq!(
        outcome.report.session.product_category,
        Some(ProductCategory::Sunscreen)
    );
}

#[tokio::test]
async fn missing_zip_field_is_skipped() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let (outcome, driver) = run(MockSite::new().without_zip(), &config).await;

    assert!(outcome.is_success(), "{:?}", outcome.result);
    assert_eq!(driver.filled("input[placeholder='ZIP Code']"), None);
    assert_eq!(driver.filled("input[placeholder='CVC']"), Some("123"));
}

#[tokio::test]
async fn incomplete_product_cards_are_ignored() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let site = MockSite::new().with_moisturizers(vec![
        MockProduct::without_price("Aloe Mystery Jar"),
        MockProduct::new("Aloe Cream", 140),
        MockProduct::new("Almond Milk Lotion", 90),
    ]);
    let (outcome, _) = run(site, &config).await;

    assert!(outcome.is_success(), "{:?}", outcome.result);
    assert_eq!(
        outcome.report.session.added_items,
        Some(vec!["Aloe Cream".to_string(), "Almond Milk Lotion".to_string()])
    );
    assert_eq!(outcome.report.session.verified_total, Some(230));
}

#[tokio::test]
async fn tied_prices_pick_first_listed() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let site = MockSite::new().with_moisturizers(vec![
        MockProduct::new("Aloe First", 100),
        MockProduct::new("Aloe Second", 100),
        MockProduct::new("Almond", 50),
    ]);
    let (outcome, _) = run(site, &config).await;

    let added = outcome.report.session.added_items.unwrap();
    assert_eq!(added[0], "Aloe First");
}

#[tokio::test]
async fn configured_success_text_is_honoured() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir).with_success_text("THANK YOU");
    let (outcome, _) = run(MockSite::new().with_success_text("THANK YOU"), &config).await;
    assert!(outcome.is_success(), "{:?}", outcome.result);
}

#[tokio::test]
async fn driver_errors_while_pages_settle_are_retried() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let (outcome, driver) = run(MockSite::new().with_unsettled_lookups(2), &config).await;

    assert!(outcome.is_success(), "{:?}", outcome.result);
    assert_eq!(outcome.report.session.verified_total, Some(215));
    assert!(driver.url().ends_with("/confirmation"));
}

// ============================================================================
// Failure propagation
// ============================================================================

#[tokio::test]
async fn unmatched_criterion_fails_add_to_cart_and_stops() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let site = MockSite::new().with_moisturizers(vec![
        MockProduct::new("Almond Cream", 180),
        MockProduct::new("Shea Butter", 120),
    ]);
    let (outcome, driver) = run(site, &config).await;

    match &outcome.result {
        Err(ShopperError::NotFound { criterion }) => assert_eq!(criterion, "Aloe"),
        other => panic!("expected NotFound, got {other:?}"),
    }
    let report = &outcome.report;
    assert_eq!(report.outcome, Outcome::Failed);
    assert_eq!(report.final_state(), WorkflowState::Failed);
    assert!(!report.transitions.contains(&WorkflowState::ItemsAdded));
    assert!(report.session.added_items.is_none());
    assert!(report.session.verified_total.is_none());

    // The cart total is never read once AddToCart has failed.
    assert!(!driver.history().iter().any(|call| call.contains("p#total")));
    assert!(driver.cart_names().is_empty());

    let failure = report.failure.as_ref().unwrap();
    assert_eq!(failure.stage, Stage::AddToCart);
    assert_eq!(failure.kind, "not_found");
    let expected_dir = dir.path().join(report.run_id.to_string());
    assert_eq!(
        failure.artifacts.screenshot,
        Some(expected_dir.join("add_to_cart_error.png"))
    );
    assert!(expected_dir.join("add_to_cart_error.png").exists());
    assert!(expected_dir.join("add_to_cart_error.html").exists());
}

#[tokio::test]
async fn empty_listing_is_not_found() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let (outcome, driver) = run(MockSite::new().with_moisturizers(Vec::new()), &config).await;

    match &outcome.result {
        Err(ShopperError::NotFound { criterion }) => assert_eq!(criterion, "Aloe"),
        other => panic!("expected NotFound, got {other:?}"),
    }
    let failure = outcome.report.failure.as_ref().unwrap();
    assert_eq!(failure.stage, Stage::AddToCart);
    assert_eq!(failure.kind, "not_found");
    assert!(driver.cart_names().is_empty());
}

#[tokio::test]
async fn ignored_add_click_reports_add_failed() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let (outcome, _) = run(MockSite::new().dropping_add_clicks(), &config).await;

    match outcome.result {
        Err(ShopperError::AddFailed {
            product,
            before,
            after,
        }) => {
            assert_eq!(product, "Aloe Vera Gel");
            assert_eq!(before, 0);
            assert_eq!(after, 0);
        }
        other => panic!("expected AddFailed, got {other:?}"),
    }
    assert_eq!(
        outcome.report.failure.unwrap().stage,
        Stage::AddToCart
    );
}

#[tokio::test]
async fn wrong_displayed_total_fails_verification() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let (outcome, driver) = run(MockSite::new().with_total_offset(10), &config).await;

    match outcome.result {
        Err(ShopperError::TotalMismatch { expected, actual }) => {
            assert_eq!(expected, 215);
            assert_eq!(actual, 225);
        }
        other => panic!("expected TotalMismatch, got {other:?}"),
    }
    assert!(outcome.report.session.added_items.is_some());
    assert!(outcome.report.session.verified_total.is_none());
    assert!(!driver.was_called("fill"));
}

#[tokio::test]
async fn broken_screenshots_do_not_mask_the_stage_error() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let site = MockSite::new()
        .with_total_offset(-15)
        .failing_screenshots();
    let (outcome, _) = run(site, &config).await;

    assert!(matches!(
        outcome.result,
        Err(ShopperError::TotalMismatch { .. })
    ));
    let failure = outcome.report.failure.unwrap();
    assert_eq!(failure.kind, "total_mismatch");
    assert_eq!(failure.artifacts.screenshot, None);
    assert!(failure.artifacts.html.is_some());
}

#[tokio::test]
async fn unreachable_site_fails_load() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let (outcome, _) = run(MockSite::new().offline(), &config).await;

    assert!(matches!(outcome.result, Err(ShopperError::Load { .. })));
    assert_eq!(
        outcome.report.transitions,
        vec![WorkflowState::Init, WorkflowState::Failed]
    );
}

#[tokio::test]
async fn unreadable_temperature_is_an_extract_error() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let (outcome, _) = run(MockSite::new().with_temperature("-- ℃"), &config).await;

    match outcome.result {
        Err(ShopperError::Extract { text, .. }) => assert_eq!(text, "-- ℃"),
        other => panic!("expected Extract, got {other:?}"),
    }
    assert_eq!(
        outcome.report.transitions,
        vec![
            WorkflowState::Init,
            WorkflowState::Loaded,
            WorkflowState::Failed
        ]
    );
}

#[tokio::test]
async fn missing_banner_is_payment_not_confirmed() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let (outcome, _) = run(MockSite::new().with_success_text("PAYMENT FAILED"), &config).await;

    assert!(matches!(
        outcome.result,
        Err(ShopperError::PaymentNotConfirmed { .. })
    ));
    let transitions = &outcome.report.transitions;
    assert_eq!(transitions[transitions.len() - 2], WorkflowState::Submitted);
    assert_eq!(outcome.report.failure.unwrap().stage, Stage::Pay);
}

// ============================================================================
// Stage inputs
// ============================================================================

#[tokio::test]
async fn stage_without_its_input_fails_fast() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let mut driver = MockDriver::default();
    let mut workflow = Workflow::new(&mut driver, &config);

    match workflow.run_stage(Stage::VerifyCart).await {
        Err(ShopperError::MissingState { field, stage }) => {
            assert_eq!(field, "added_items");
            assert_eq!(stage, "VerifyCart");
        }
        other => panic!("expected MissingState, got {other:?}"),
    }
    assert_eq!(workflow.current(), WorkflowState::Init);
    drop(workflow);
    assert!(driver.history().is_empty());
}

#[tokio::test]
async fn stages_can_be_stepped_individually() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let mut driver = MockDriver::new(MockSite::new().with_temperature("40 ℃"));
    let mut workflow = Workflow::new(&mut driver, &config);

    workflow.run_stage(Stage::Load).await.unwrap();
    workflow.run_stage(Stage::Select).await.unwrap();
    assert_eq!(workflow.current(), WorkflowState::CategorySelected);
    assert_eq!(
        workflow.session().product_category.get(),
        Some(&ProductCategory::Sunscreen)
    );

    // Going back to an earlier stage is an illegal transition.
    let err = workflow.run_stage(Stage::Load).await.unwrap_err();
    assert_eq!(err.kind(), "invariant_violation");
    assert_eq!(workflow.current(), WorkflowState::CategorySelected);
    assert_eq!(workflow.session().temperature.write_count(), 1);
}

// ============================================================================
// Concurrent runs
// ============================================================================

#[tokio::test]
async fn concurrent_runs_are_independent() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let results = run_many(
        3,
        |index| async move {
            let temperature = if index == 1 { "38 ℃" } else { "12 ℃" };
            Ok::<_, ShopperError>(MockDriver::new(MockSite::new().with_temperature(temperature)))
        },
        &config,
    )
    .await;

    assert_eq!(results.len(), 3);
    let reports: Vec<&RunReport> = results
        .iter()
        .map(|r| &r.as_ref().unwrap().report)
        .collect();
    assert!(reports.iter().all(|r| r.is_success()));
    assert_eq!(
        reports[1].session.product_category,
        Some(ProductCategory::Sunscreen)
    );
    assert_eq!(
        reports[0].session.product_category,
        Some(ProductCategory::Moisturizer)
    );
    assert_ne!(reports[0].run_id, reports[2].run_id);
}

#[tokio::test]
async fn launch_failure_only_affects_its_run() {
    let dir = TempDir::new().unwrap();
    let config = config(&dir);
    let results = run_many(
        2,
        |index| async move {
            if index == 0 {
                Err(ShopperError::BrowserLaunch {
                    message: "no chromium".into(),
                })
            } else {
                Ok(MockDriver::default())
            }
        },
        &config,
    )
    .await;

    assert!(matches!(
        results[0],
        Err(ShopperError::BrowserLaunch { .. })
    ));
    assert!(results[1].as_ref().unwrap().is_success());
}
