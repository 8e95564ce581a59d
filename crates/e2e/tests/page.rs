//! Main page, challenge handling and the scenario runner against the scripted driver

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{fast_session, healthy_site, test_config, FakeDriver, FakeElement, BASE_URL, FILM_URL};
use kinoprobe_common::{RecordingReporter, UiConfig};
use kinoprobe_e2e::{
    ChallengeGuard, ChallengeOutcome, ChallengeState, E2eError, MainPage, UiRunner, UiScenario,
};

fn main_page(driver: FakeDriver, config: &UiConfig) -> (MainPage<FakeDriver>, Arc<RecordingReporter>) {
    let reporter = Arc::new(RecordingReporter::new());
    let page = MainPage::new(fast_session(driver, 200), config.clone(), reporter.clone())
        .with_wait(Duration::from_millis(200))
        .with_challenge(ChallengeGuard::new(
            config.selector_challenge_button.clone(),
            Duration::from_millis(100),
        ));
    (page, reporter)
}

fn challenged_site(config: &UiConfig, trigger: FakeElement) -> FakeDriver {
    FakeDriver::new().page(
        BASE_URL,
        "Вы не робот?",
        vec![
            (config.selector_challenge_button.as_str(), trigger),
            (config.selector_logo.as_str(), FakeElement::at(24.0, 12.0)),
        ],
    )
}

#[tokio::test]
async fn is_loaded_is_false_before_open_and_true_after() {
    let config = test_config();
    let (page, reporter) = main_page(healthy_site(&config), &config);

    assert!(!page.is_loaded().await);

    let outcome = page.open().await.unwrap();
    assert_eq!(outcome, ChallengeOutcome::Absent);
    assert!(page.is_loaded().await);

    let steps = reporter.steps();
    assert_eq!(steps.first().map(String::as_str), Some("Check main page is loaded"));
    assert!(steps.contains(&"Open main page".to_string()));
}

#[tokio::test]
async fn is_loaded_is_false_when_logo_stays_hidden() {
    let config = test_config();
    let driver = FakeDriver::new().page(
        BASE_URL,
        "Кинопоиск",
        vec![(config.selector_logo.as_str(), FakeElement::at(24.0, 12.0).hidden())],
    );
    let (page, _) = main_page(driver, &config);

    page.open().await.unwrap();
    assert!(!page.is_loaded().await);
}

#[tokio::test]
async fn detail_page_defaults_to_configured_film() {
    let config = test_config();
    let driver = healthy_site(&config);
    let (page, _) = main_page(driver.clone(), &config);

    page.open_detail_page(None).await.unwrap();
    page.open_detail_page(Some(435)).await.unwrap();

    assert_eq!(
        driver.visits(),
        vec![FILM_URL.to_string(), "https://kino.test/film/435".to_string()]
    );
}

#[tokio::test]
async fn rating_is_displayed_inside_the_viewport() {
    let config = test_config();
    let (page, _) = main_page(healthy_site(&config), &config);

    page.open().await.unwrap();
    page.open_detail_page(Some(config.film_id)).await.unwrap();
    let rating = page.rating_element().await.unwrap();

    assert!(rating.is_displayed());
    assert!(rating.location().x > 0.0 && rating.location().y > 0.0);
}

#[tokio::test]
async fn rating_lookup_times_out_on_main_page() {
    let config = test_config();
    let (page, _) = main_page(healthy_site(&config), &config);

    page.open().await.unwrap();
    let err = page.rating_element().await.unwrap_err();
    assert!(err.is_timeout(), "{err}");
}

#[tokio::test]
async fn navigation_menu_reports_location_and_size() {
    let config = test_config();
    let (page, _) = main_page(healthy_site(&config), &config);

    page.open().await.unwrap();
    let (location, size) = page.navigation_menu_location_and_size().await.unwrap();

    assert_eq!(location.x, 16.0);
    assert_eq!(location.y, 88.0);
    assert!(size.width > 0.0);
}

#[tokio::test]
async fn hovering_logo_yields_pointer_cursor() {
    let config = test_config();
    let driver = healthy_site(&config);
    let (page, _) = main_page(driver.clone(), &config);

    page.open().await.unwrap();
    let logo = page.logo().await.unwrap();
    assert_eq!(page.cursor_style_of(&logo).await.unwrap(), "auto");

    page.hover(&logo).await.unwrap();
    assert_eq!(driver.hovered().as_deref(), Some(config.selector_logo.as_str()));
    assert_eq!(page.cursor_style_of(&logo).await.unwrap(), "pointer");
    assert!(driver.clicks().is_empty());
}

#[tokio::test]
async fn challenge_is_dismissed() {
    let config = test_config();
    let driver = challenged_site(&config, FakeElement::at(300.0, 300.0).vanishes_on_click());
    let (page, _) = main_page(driver.clone(), &config);

    let outcome = page.open().await.unwrap();

    assert_eq!(outcome, ChallengeOutcome::Dismissed);
    assert_eq!(driver.clicks(), vec![config.selector_challenge_button.clone()]);
    assert!(page.is_loaded().await);
}

#[tokio::test]
async fn challenge_gives_up_when_trigger_never_clickable() {
    let config = test_config();
    let driver = challenged_site(&config, FakeElement::at(300.0, 300.0).disabled());
    let (page, _) = main_page(driver.clone(), &config);

    let outcome = page.open().await.unwrap();

    assert!(matches!(outcome, ChallengeOutcome::GaveUp { .. }), "{outcome}");
    assert!(driver.clicks().is_empty());
}

#[tokio::test]
async fn challenge_gives_up_when_trigger_stays_after_click() {
    let config = test_config();
    let driver = challenged_site(&config, FakeElement::at(300.0, 300.0));
    let (page, _) = main_page(driver.clone(), &config);

    let outcome = page.open().await.unwrap();

    assert!(matches!(outcome, ChallengeOutcome::GaveUp { .. }), "{outcome}");
    assert_eq!(driver.clicks().len(), 1);
}

#[tokio::test]
async fn challenge_click_failure_propagates() {
    let config = test_config();
    let driver = challenged_site(&config, FakeElement::at(300.0, 300.0).click_fails());
    let (page, _) = main_page(driver, &config);

    let err = page.open().await.unwrap_err();
    assert!(matches!(err, E2eError::Input(_)), "{err}");
}

#[tokio::test]
async fn challenge_state_is_a_single_probe() {
    let config = test_config();
    let guard = ChallengeGuard::new(config.selector_challenge_button.clone(), Duration::from_millis(50));

    let session = fast_session(challenged_site(&config, FakeElement::at(1.0, 1.0)), 50);
    session.navigate(BASE_URL).await.unwrap();
    assert_eq!(guard.state(&session).await, ChallengeState::Challenged);

    let session = fast_session(healthy_site(&config), 50);
    session.navigate(BASE_URL).await.unwrap();
    assert_eq!(guard.state(&session).await, ChallengeState::Normal);
}

#[tokio::test]
async fn every_scenario_passes_on_a_healthy_site() {
    let config = test_config();
    let reporter = Arc::new(RecordingReporter::new());
    let runner = UiRunner::new(config.clone(), reporter.clone());

    for scenario in UiScenario::ALL {
        let driver = healthy_site(&config);
        runner
            .run_on(scenario, driver.clone())
            .await
            .unwrap_or_else(|e| panic!("{scenario}: {e}"));
        assert!(driver.is_closed(), "{scenario} left the browser open");
    }

    assert!(reporter
        .steps()
        .contains(&UiScenario::RatingDisplayed.title().to_string()));
}

#[tokio::test]
async fn cursor_scenario_fails_with_observed_cursor() {
    let config = test_config();
    let driver = FakeDriver::new().page(
        BASE_URL,
        "Кинопоиск",
        vec![(config.selector_logo.as_str(), FakeElement::at(24.0, 12.0).cursor("default"))],
    );
    let runner = UiRunner::new(config.clone(), Arc::new(RecordingReporter::new()));

    let err = runner
        .run_on(UiScenario::CursorPointerOnLogo, driver.clone())
        .await
        .unwrap_err();

    match err {
        E2eError::AssertionFailed(msg) => {
            assert!(msg.contains("'default'"), "{msg}");
            assert!(msg.starts_with(UiScenario::CursorPointerOnLogo.title()));
        }
        other => panic!("expected assertion failure, got {other}"),
    }
    assert!(driver.is_closed());
}

#[tokio::test]
async fn navigation_scenario_rejects_right_hand_menu() {
    let config = test_config();
    let driver = FakeDriver::new().page(
        BASE_URL,
        "Кинопоиск",
        vec![
            (config.selector_logo.as_str(), FakeElement::at(24.0, 12.0)),
            (config.selector_navigation_menu.as_str(), FakeElement::at(1700.0, 88.0)),
        ],
    );
    let runner = UiRunner::new(config, Arc::new(RecordingReporter::new()));

    let err = runner
        .run_on(UiScenario::NavigationMenuLeft, driver)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("x = 1700"), "{err}");
}

#[tokio::test]
async fn suite_records_launch_failures_and_passes() {
    let config = test_config();
    let runner = UiRunner::new(config.clone(), Arc::new(RecordingReporter::new()));

    let report = runner
        .run_scenarios_with(&[UiScenario::MainPageLoads, UiScenario::BrowserBack], |config| async move {
            Ok(healthy_site(&config))
        })
        .await;
    assert_eq!(report.suite, "ui");
    assert_eq!((report.total, report.passed, report.failed), (2, 2, 0));
    assert!(report.is_success());

    let report = runner
        .run_scenarios_with(&[UiScenario::MainPageLoads], |_| async {
            Err::<FakeDriver, _>(E2eError::Launch("no chrome".to_string()))
        })
        .await;
    assert_eq!(report.failed, 1);
    let error = report.results[0].error.as_deref().unwrap();
    assert!(error.contains("no chrome"));
}

#[tokio::test]
async fn back_scenario_fails_when_history_does_not_move() {
    let config = test_config();
    let driver = healthy_site(&config).ignores_back();
    let runner = UiRunner::new(config.clone(), Arc::new(RecordingReporter::new()));

    let err = runner
        .run_on(UiScenario::BrowserBack, driver.clone())
        .await
        .unwrap_err();

    assert!(err.is_timeout(), "{err}");
    assert!(err.to_string().contains(BASE_URL), "{err}");
    assert_eq!(driver.current_url().as_deref(), Some(FILM_URL));
    assert!(driver.is_closed());
}

#[tokio::test]
async fn back_scenario_lands_on_main_page() {
    let config = test_config();
    let driver = healthy_site(&config);
    let runner = UiRunner::new(config.clone(), Arc::new(RecordingReporter::new()));

    runner
        .run_on(UiScenario::BrowserBack, driver.clone())
        .await
        .unwrap();

    assert_eq!(driver.visits(), vec![BASE_URL.to_string(), FILM_URL.to_string()]);
    assert_eq!(driver.current_url().as_deref(), Some(BASE_URL));
}

#[tokio::test]
async fn suite_results_carry_step_records() {
    let config = test_config();
    let runner = UiRunner::new(config.clone(), Arc::new(RecordingReporter::new()));

    let report = runner
        .run_scenarios_with(&[UiScenario::MainPageLoads, UiScenario::RatingDisplayed], |config| async move {
            Ok(healthy_site(&config))
        })
        .await;

    for result in &report.results {
        assert!(!result.records.is_empty(), "{} has no records", result.name);
    }
    let first = serde_json::to_string(&report.results[0].records).unwrap();
    assert!(first.contains(UiScenario::MainPageLoads.title()));
    assert!(!first.contains(UiScenario::RatingDisplayed.title()));
}
