//! Verification scenarios for the trip planner.
//!
//! Each scenario is a unit struct implementing [`Scenario`] for any driver,
//! so the same checks run against Chromium and against [`MockDriver`] in
//! unit tests.
//!
//! [`MockDriver`]: crate::driver::MockDriver

pub mod app;
pub mod confirmation;
pub mod drag;
pub mod sidebar;
pub mod sticky_header;
pub mod validation;
pub mod visuals;

use crate::driver::{MockDriver, PageDriver};
use crate::harness::Scenario;

pub use confirmation::{DiscardConfirmation, SaveConfirmation};
pub use drag::{DragStyles, PlanDrag};
pub use sidebar::SidebarScrollLock;
pub use sticky_header::StickyHeader;
pub use validation::ModalValidation;
pub use visuals::{CardRadius, FontCheck, HeaderSnapshot};

/// Every scenario, in suite order
#[must_use]
pub fn catalog<D: PageDriver + 'static>() -> Vec<Box<dyn Scenario<D>>> {
    vec![
        Box::new(SaveConfirmation),
        Box::new(DiscardConfirmation),
        Box::new(SidebarScrollLock),
        Box::new(PlanDrag),
        Box::new(DragStyles),
        Box::new(StickyHeader),
        Box::new(CardRadius),
        Box::new(ModalValidation),
        Box::new(HeaderSnapshot),
        Box::new(FontCheck),
    ]
}

/// Look up a scenario by name
#[must_use]
pub fn find<D: PageDriver + 'static>(name: &str) -> Option<Box<dyn Scenario<D>>> {
    catalog::<D>().into_iter().find(|s| s.name() == name)
}

/// `(name, description)` of every scenario
#[must_use]
pub fn describe() -> Vec<(&'static str, &'static str)> {
    catalog::<MockDriver>()
        .iter()
        .map(|s| (s.name(), s.description()))
        .collect()
}

/// Names of every scenario
#[must_use]
pub fn names() -> Vec<&'static str> {
    describe().into_iter().map(|(name, _)| name).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::config::HarnessConfig;
    use crate::driver::{ElementSnapshot, MockPage, StyleQuery};
    use crate::harness::{MockLauncher, ScenarioRunner};
    use crate::locator::{BoundingBox, Locator};

    fn fast_config(dir: &std::path::Path) -> HarnessConfig {
        HarnessConfig {
            navigation_timeout_ms: 300,
            action_timeout_ms: 300,
            probe_timeout_ms: 300,
            poll_interval_ms: 10,
            settle_ms: 30,
            artifact_dir: dir.to_path_buf(),
            ..HarnessConfig::default()
        }
    }

    fn el(text: &str, x: f64, y: f64) -> ElementSnapshot {
        ElementSnapshot::new("div")
            .with_text(text)
            .at(BoundingBox::new(x, y, 80.0, 30.0))
    }

    fn show(page: &mut MockPage, locator: &Locator, element: ElementSnapshot) {
        page.set_elements(locator, vec![element]);
    }

    mod catalog_tests {
        use super::*;

        #[test]
        fn test_names_are_unique() {
            let names = names();
            assert_eq!(names.len(), 10);
            let mut sorted = names.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), names.len());
        }

        #[test]
        fn test_find() {
            assert!(find::<MockDriver>("plan-drag").is_some());
            assert!(find::<MockDriver>("no-such-scenario").is_none());
        }

        #[test]
        fn test_every_scenario_has_an_anchor() {
            for scenario in catalog::<MockDriver>() {
                assert!(scenario.anchor().is_some(), "{}", scenario.name());
            }
        }

        #[test]
        fn test_viewport_overrides() {
            let phone = find::<MockDriver>("modal-validation").unwrap();
            assert_eq!(phone.viewport(), Some((375, 812)));
            let drag = find::<MockDriver>("plan-drag").unwrap();
            assert_eq!(drag.viewport(), Some((1280, 800)));
            assert!(drag.user_agent().is_some());
        }
    }

    mod sidebar_tests {
        use super::*;

        fn fake_app() -> MockDriver {
            let overflow = StyleQuery::body_inline("overflow");
            let driver = MockDriver::new()
                .with_element(&app::sidebar_toggle(), el("", 10.0, 10.0))
                .with_element(&app::sidebar_close(), el("", 300.0, 10.0));
            driver.page().set_style(&overflow, Some(""));

            let q = overflow.clone();
            driver.on_click(&app::sidebar_toggle(), move |page| {
                page.set_style(&q, Some("hidden"));
            });
            driver.on_click(&app::sidebar_close(), move |page| {
                page.set_style(&overflow, Some(""));
            });
            driver
        }

        #[tokio::test]
        async fn test_scroll_lock_passes() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = fake_app();
            let runner = ScenarioRunner::new(MockLauncher::new(driver.clone()), fast_config(tmp.path()));

            let report = runner.run(&SidebarScrollLock).await;
            assert!(report.passed, "{:?}", report.error);
            assert_eq!(report.record.artifacts.len(), 2);
            assert_eq!(driver.close_calls(), 1);
        }

        #[tokio::test]
        async fn test_lock_never_applied_times_out() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = MockDriver::new()
                .with_element(&app::sidebar_toggle(), el("", 10.0, 10.0));
            driver
                .page()
                .set_style(&StyleQuery::body_inline("overflow"), Some(""));
            let runner = ScenarioRunner::new(MockLauncher::new(driver.clone()), fast_config(tmp.path()));

            let report = runner.run(&SidebarScrollLock).await;
            assert!(!report.passed);
            assert_eq!(report.error_kind.as_deref(), Some("Timeout"));
            // failure capture
            assert_eq!(report.record.artifacts.len(), 1);
            assert_eq!(driver.close_calls(), 1);
        }
    }

    mod validation_tests {
        use super::*;

        fn fake_app() -> MockDriver {
            let driver = MockDriver::new()
                .with_element(&app::sidebar_toggle(), el("", 10.0, 10.0));

            driver.on_click(&app::sidebar_toggle(), |page| {
                show(page, &app::sidebar_title(), el("My Journeys", 10.0, 60.0));
                show(page, &app::new_expedition(), el("New Expedition", 10.0, 100.0));
            });
            driver.on_click(&app::new_expedition(), |page| {
                show(page, &app::title("New Journey"), el("New Journey", 150.0, 200.0));
                show(page, &app::modal_button("Save"), el("Save", 150.0, 400.0));
            });
            driver.on_click(&app::modal_button("Save"), |page| {
                show(page, &app::modal_button("OK"), el("OK", 250.0, 500.0));
            });
            driver.on_click(&app::modal_button("OK"), |page| {
                page.clear_elements(&app::modal_button("OK"));
            });
            driver
        }

        #[tokio::test]
        async fn test_validation_alert_flow() {
            let tmp = tempfile::tempdir().unwrap();
            let launcher = MockLauncher::new(fake_app());
            let runner = ScenarioRunner::new(launcher.clone(), fast_config(tmp.path()));

            let report = runner.run(&ModalValidation).await;
            assert!(report.passed, "{:?}", report.error);
            assert_eq!(launcher.configs()[0].viewport_width, 375);
            assert!(report.record.outcomes.iter().all(|o| o.passed));
        }

        #[tokio::test]
        async fn test_missing_anchor_is_element_not_found() {
            let tmp = tempfile::tempdir().unwrap();
            let runner = ScenarioRunner::new(MockLauncher::new(MockDriver::new()), fast_config(tmp.path()));

            let report = runner.run(&ModalValidation).await;
            assert_eq!(report.error_kind.as_deref(), Some("ElementNotFound"));
            // the page that never showed its anchor is still captured
            assert_eq!(report.record.artifacts.len(), 1);
            assert!(report.record.artifacts[0]
                .path
                .ends_with("modal-validation/01-failure.png"));
        }
    }

    mod confirmation_tests {
        use super::*;
        use confirmation::TRIP_NAME;

        const FORM_TITLES: [&str; 2] = ["New Journey", "Edit Journey"];
        const CALENDAR_DAYS: [(&str, f64); 3] = [("10", 300.0), ("15", 400.0), ("20", 500.0)];

        fn show_form(page: &mut MockPage, title: &str) {
            show(page, &app::title(title), el(title, 300.0, 200.0));
            show(page, &app::trip_name_input(), el("", 300.0, 250.0));
            for (day, x) in CALENDAR_DAYS {
                show(page, &app::calendar_day(day), el(day, x, 300.0));
            }
            show(page, &app::modal_button("Save"), el("Save", 300.0, 400.0));
            show(page, &app::modal_button("Cancel"), el("Cancel", 400.0, 400.0));
        }

        fn close_form(page: &mut MockPage) {
            for title in FORM_TITLES {
                page.clear_elements(&app::title(title));
            }
            page.clear_elements(&app::trip_name_input());
            for (day, _) in CALENDAR_DAYS {
                page.clear_elements(&app::calendar_day(day));
            }
            page.clear_elements(&app::modal_button("Save"));
            page.clear_elements(&app::modal_button("Cancel"));
        }

        /// Trip form with its save and discard confirmations
        pub(super) fn trip_form_app(asks_before_discard: bool, confirm_closes: bool) -> MockDriver {
            let driver = MockDriver::new()
                .with_element(&app::header(), el("", 0.0, 0.0))
                .with_element(&app::sidebar_toggle(), el("", 10.0, 10.0));

            driver.on_click(&app::sidebar_toggle(), |page| {
                show(page, &app::sidebar_title(), el("My Journeys", 10.0, 60.0));
                show(page, &app::new_expedition(), el("New Expedition", 10.0, 100.0));
            });
            driver.on_click(&app::new_expedition(), |page| show_form(page, "New Journey"));
            driver.on_click(&app::trip_row_edit(TRIP_NAME), |page| {
                show_form(page, "Edit Journey");
            });
            driver.on_click(&app::modal_button("Save"), move |page| {
                if page.shows(&app::title("NEW PLAN")) {
                    return;
                }
                if !page.shows(&app::title("Save Changes?")) {
                    show(page, &app::title("Save Changes?"), el("Save Changes?", 600.0, 200.0));
                } else if confirm_closes {
                    page.clear_elements(&app::title("Save Changes?"));
                    close_form(page);
                    show(page, &app::trip_row_edit(TRIP_NAME), el("", 10.0, 140.0));
                }
            });
            driver.on_click(&app::modal_button("Cancel"), move |page| {
                if asks_before_discard {
                    show(page, &app::title("Discard Changes?"), el("Discard Changes?", 600.0, 200.0));
                    show(page, &app::modal_button("Keep Editing"), el("Keep Editing", 600.0, 400.0));
                } else {
                    close_form(page);
                }
            });
            driver.on_click(&app::modal_button("Keep Editing"), |page| {
                page.clear_elements(&app::title("Discard Changes?"));
                page.clear_elements(&app::modal_button("Keep Editing"));
            });
            driver
        }

        #[tokio::test]
        async fn test_save_confirmation_closes_both_modals() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = trip_form_app(true, true);
            let runner = ScenarioRunner::new(MockLauncher::new(driver.clone()), fast_config(tmp.path()));

            let report = runner.run(&SaveConfirmation).await;
            assert!(report.passed, "{:?}", report.error);
            assert_eq!(report.record.artifacts.len(), 1);
            assert!(report.record.artifacts[0]
                .path
                .ends_with("save-confirmation/01-save-confirmation.png"));
            assert_eq!(report.record.artifacts[0].step, "click topmost(css=.fixed.inset-0) >> role=button[name=\"Save\"]");

            let page = driver.page();
            assert!(page.typed.iter().any(|(_, text)| text == TRIP_NAME));
            assert!(!page.shows(&app::title("New Journey")));
        }

        #[tokio::test]
        async fn test_confirm_that_keeps_dialog_open_times_out() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = trip_form_app(true, false);
            let runner = ScenarioRunner::new(MockLauncher::new(driver.clone()), fast_config(tmp.path()));

            let report = runner.run(&SaveConfirmation).await;
            assert!(!report.passed);
            assert_eq!(report.error_kind.as_deref(), Some("Timeout"));
            assert!(report.error.as_deref().unwrap().contains("Save Changes?"));
            // checkpoint plus failure capture
            assert_eq!(report.record.artifacts.len(), 2);
            assert!(report.record.artifacts[1]
                .path
                .ends_with("save-confirmation/02-failure.png"));
            assert_eq!(driver.close_calls(), 1);
        }

        #[tokio::test]
        async fn test_keep_editing_returns_to_form_then_saves() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = trip_form_app(true, true);
            let runner = ScenarioRunner::new(MockLauncher::new(driver.clone()), fast_config(tmp.path()));

            let report = runner.run(&DiscardConfirmation).await;
            assert!(report.passed, "{:?}", report.error);
            assert_eq!(report.record.artifacts.len(), 1);
            assert!(report.record.artifacts[0]
                .path
                .ends_with("discard-confirmation/01-discard-confirmation.png"));

            let page = driver.page();
            let modified = format!("{TRIP_NAME} Modified");
            assert!(page.typed.iter().any(|(_, text)| *text == modified));
            assert!(!page.shows(&app::title("Edit Journey")));
            assert!(!page.shows(&app::title("Discard Changes?")));
        }

        #[tokio::test]
        async fn test_cancel_without_discard_prompt_times_out() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = trip_form_app(false, true);
            let runner = ScenarioRunner::new(MockLauncher::new(driver.clone()), fast_config(tmp.path()));

            let report = runner.run(&DiscardConfirmation).await;
            assert_eq!(report.error_kind.as_deref(), Some("Timeout"));
            assert!(report.error.as_deref().unwrap().contains("Discard Changes?"));
            assert_eq!(report.record.artifacts.len(), 1);
            assert_eq!(driver.close_calls(), 1);
        }
    }

    mod visuals_tests {
        use super::*;
        use visuals::{RADIUS_PLAN, RADIUS_TRIP};

        fn card_app(saves_plan: bool) -> MockDriver {
            let driver = confirmation_tests::trip_form_app(true, true)
                .with_element(&Locator::text(RADIUS_TRIP), el(RADIUS_TRIP, 10.0, 180.0))
                .with_element(&app::add_plan_prompt(0), el("Tap here to add new plan", 100.0, 600.0));

            driver.on_click(&app::add_plan_prompt(0), |page| {
                show(page, &app::title("NEW PLAN"), el("NEW PLAN", 300.0, 200.0));
                show(page, &app::first_modal_input(), el("", 300.0, 250.0));
                show(page, &app::modal_button("Save"), el("Save", 300.0, 400.0));
            });
            if saves_plan {
                driver.on_click(&app::modal_button("Save"), |page| {
                    if page.shows(&app::title("NEW PLAN")) {
                        page.clear_elements(&app::title("NEW PLAN"));
                        page.clear_elements(&app::first_modal_input());
                        page.clear_elements(&app::modal_button("Save"));
                        show(
                            page,
                            &app::plan_item(RADIUS_PLAN),
                            ElementSnapshot::new("div")
                                .with_class("touch-manipulation")
                                .with_text(RADIUS_PLAN)
                                .at(BoundingBox::new(100.0, 650.0, 360.0, 72.0)),
                        );
                    }
                });
            }
            driver
        }

        #[tokio::test]
        async fn test_card_radius_captures_page_and_card() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = card_app(true);
            let runner = ScenarioRunner::new(MockLauncher::new(driver.clone()), fast_config(tmp.path()));

            let report = runner.run(&CardRadius).await;
            assert!(report.passed, "{:?}", report.error);
            let artifacts = &report.record.artifacts;
            assert_eq!(artifacts.len(), 2);
            assert!(artifacts[0].path.ends_with("card-radius/01-full-page.png"));
            assert!(artifacts[1].path.ends_with("card-radius/02-plan-card.png"));
            assert_eq!((artifacts[1].width, artifacts[1].height), (360, 72));
            assert!(report.record.skipped.is_empty());
            assert!(driver.was_called("scroll_into_view:css=.touch-manipulation"));
        }

        #[tokio::test]
        async fn test_plan_never_saved_times_out() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = card_app(false);
            let runner = ScenarioRunner::new(MockLauncher::new(driver.clone()), fast_config(tmp.path()));

            let report = runner.run(&CardRadius).await;
            assert_eq!(report.error_kind.as_deref(), Some("Timeout"));
            assert!(report.error.as_deref().unwrap().contains(RADIUS_PLAN));
            assert_eq!(report.record.artifacts.len(), 1);
            assert_eq!(driver.close_calls(), 1);
        }

        #[tokio::test]
        async fn test_header_snapshot_at_desktop_size() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = MockDriver::new()
                .with_element(&app::header(), el("", 0.0, 0.0))
                .with_element(&app::day_group(0), el("Day 1", 10.0, 100.0));
            let launcher = MockLauncher::new(driver);
            let runner = ScenarioRunner::new(launcher.clone(), fast_config(tmp.path()));

            let report = runner.run(&HeaderSnapshot).await;
            assert!(report.passed, "{:?}", report.error);
            let shot = &report.record.artifacts[0];
            assert!(shot.path.ends_with("header-snapshot/01-header.png"));
            assert_eq!((shot.width, shot.height), (1280, 800));
            assert_eq!(launcher.configs()[0].viewport_height, 800);
        }

        #[tokio::test]
        async fn test_header_snapshot_without_days_times_out() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = MockDriver::new().with_element(&app::header(), el("", 0.0, 0.0));
            let runner = ScenarioRunner::new(MockLauncher::new(driver), fast_config(tmp.path()));

            let report = runner.run(&HeaderSnapshot).await;
            assert_eq!(report.error_kind.as_deref(), Some("Timeout"));
            assert_eq!(report.record.artifacts.len(), 1);
            assert!(report.record.artifacts[0]
                .path
                .ends_with("header-snapshot/01-failure.png"));
        }
    }

    mod drag_tests {
        use super::*;

        const DAY_TWO: BoundingBox = BoundingBox::new(100.0, 450.0, 400.0, 300.0);

        fn fake_app(sensor_works: bool) -> MockDriver {
            let day = |text: &str, bbox: BoundingBox| {
                ElementSnapshot::new("div")
                    .with_class("day-group")
                    .with_text(text)
                    .at(bbox)
            };
            let driver = MockDriver::new()
                .with_element(
                    &app::day_group(0),
                    day("Day 1 Land at HKIA", BoundingBox::new(100.0, 100.0, 400.0, 300.0)),
                )
                .with_element(&app::day_group(1), day("Day 2 Hotel", DAY_TWO))
                .with_element(
                    &app::plan_item(drag::DRAGGED_PLAN),
                    el(drag::DRAGGED_PLAN, 120.0, 150.0),
                );

            if sensor_works {
                driver.on_release(move |trace, page| {
                    if trace.moves.len() >= 5 && DAY_TWO.contains(&trace.up) {
                        show(page, &app::day_group(1), day("Day 2 Hotel Land at HKIA", DAY_TWO));
                    }
                });
            }
            driver
        }

        #[tokio::test]
        async fn test_incremental_drag_relocates_plan() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = fake_app(true);
            let launcher = MockLauncher::new(driver.clone());
            let runner = ScenarioRunner::new(launcher.clone(), fast_config(tmp.path()));

            let report = runner.run(&PlanDrag).await;
            assert!(report.passed, "{:?}", report.error);
            assert!(launcher.configs()[0].user_agent.is_some());

            let moves = driver
                .page()
                .history
                .iter()
                .filter(|c| c.as_str() == "pointer:move")
                .count();
            // hover plus 20 steps
            assert!(moves >= 20);
        }

        #[tokio::test]
        async fn test_ignored_gesture_times_out() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = fake_app(false);
            let runner = ScenarioRunner::new(MockLauncher::new(driver.clone()), fast_config(tmp.path()));

            let report = runner.run(&PlanDrag).await;
            assert!(!report.passed);
            assert_eq!(report.error_kind.as_deref(), Some("Timeout"));
            assert!(driver.was_called("pointer:up"));
            assert_eq!(driver.close_calls(), 1);
        }
    }

    mod drag_style_tests {
        use super::*;

        const DAY_ONE: BoundingBox = BoundingBox::new(100.0, 100.0, 400.0, 300.0);
        const DAY_ONE_HEADER: BoundingBox = BoundingBox::new(110.0, 105.0, 80.0, 30.0);
        const DAY_TWO: BoundingBox = BoundingBox::new(100.0, 450.0, 400.0, 300.0);

        fn day_two(class_name: &str) -> ElementSnapshot {
            ElementSnapshot::new("div")
                .with_class(class_name)
                .with_text("Day 2")
                .at(DAY_TWO)
        }

        /// Marks day 2 as a swap target while something is held over it;
        /// `days_only` restricts that to drags started on a day header
        fn styled_app(days_only: bool) -> MockDriver {
            let driver = MockDriver::new()
                .with_element(
                    &app::day_group(0),
                    ElementSnapshot::new("div").with_class("day-group").at(DAY_ONE),
                )
                .with_element(&app::day_group(1), day_two("day-group"))
                .with_element(&app::day_header(0), el("Day 1", DAY_ONE_HEADER.x, DAY_ONE_HEADER.y))
                .with_element(&app::first_plan_in(0), el(drag::DRAGGED_PLAN, 120.0, 150.0));

            driver.on_drag(move |trace, page| {
                let day_drag = DAY_ONE_HEADER.contains(&trace.down);
                if DAY_TWO.contains(&trace.up) && (day_drag || !days_only) {
                    show(page, &app::day_group(1), day_two("day-group border-dashed"));
                }
            });
            driver.on_release(|_, page| {
                show(page, &app::day_group(1), day_two("day-group"));
            });
            driver
        }

        #[tokio::test]
        async fn test_only_day_drags_mark_swap_target() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = styled_app(true);
            let runner = ScenarioRunner::new(MockLauncher::new(driver.clone()), fast_config(tmp.path()));

            let report = runner.run(&DragStyles).await;
            assert!(report.passed, "{:?}", report.error);
            let artifacts = &report.record.artifacts;
            assert_eq!(artifacts.len(), 2);
            assert!(artifacts[0].path.ends_with("drag-styles/01-plan-over-day-2.png"));
            assert!(artifacts[1].path.ends_with("drag-styles/02-day-over-day-2.png"));

            let page = driver.page();
            let presses = page.history.iter().filter(|c| *c == "pointer:down").count();
            let releases = page.history.iter().filter(|c| *c == "pointer:up").count();
            assert_eq!((presses, releases), (2, 2));
        }

        #[tokio::test]
        async fn test_plan_drag_marking_day_times_out() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = styled_app(false);
            let runner = ScenarioRunner::new(MockLauncher::new(driver.clone()), fast_config(tmp.path()));

            let report = runner.run(&DragStyles).await;
            assert_eq!(report.error_kind.as_deref(), Some("Timeout"));
            assert!(report.error.as_deref().unwrap().contains(app::DAY_SWAP_CLASS));
            // only the failure capture
            assert_eq!(report.record.artifacts.len(), 1);
            assert_eq!(driver.close_calls(), 1);
        }
    }

    mod style_tests {
        use super::*;

        #[tokio::test]
        async fn test_fonts_applied() {
            let tmp = tempfile::tempdir().unwrap();
            let driver = MockDriver::new()
                .with_element(&app::calendar_icon(), el("", 10.0, 10.0));
            {
                let mut page = driver.page();
                page.set_style(
                    &StyleQuery::body_computed("font-family"),
                    Some("Inter, sans-serif"),
                );
                page.set_style(
                    &StyleQuery::computed(&app::calendar_icon(), "font-family"),
                    Some("\"Font Awesome 6 Free\""),
                );
            }
            let runner = ScenarioRunner::new(MockLauncher::new(driver), fast_config(tmp.path()));

            let report = runner.run(&FontCheck).await;
            assert!(report.passed, "{:?}", report.error);
        }

        #[tokio::test]
        async fn test_sticky_header_soft_check_warns() {
            let tmp = tempfile::tempdir().unwrap();
            let sticky = app::sticky_day_header();
            let driver = MockDriver::new()
                .with_element(&app::day_group(0), el("Day 1", 10.0, 100.0));
            // hidden for the first few polls, visible after
            let mut frames = vec![Vec::new(); 8];
            frames.push(vec![el("Day 1", 0.0, 0.0)]);
            driver.page().script_elements(&sticky, frames);

            let runner = ScenarioRunner::new(MockLauncher::new(driver.clone()), fast_config(tmp.path()));
            let report = runner.run(&StickyHeader).await;

            assert!(report.passed, "{:?}", report.error);
            assert!(driver.was_called("scroll_into_view:"));
            assert!(driver.was_called("pointer:wheel"));
        }
    }
}
