//! Visual snapshots: plan card corners, header layout, fonts.

use super::app;
use crate::capture::CaptureScope;
use crate::driver::{PageDriver, StyleQuery};
use crate::harness::Scenario;
use crate::locator::Locator;
use crate::result::HarnessResult;
use crate::session::Session;
use crate::wait::Condition;
use async_trait::async_trait;
use std::time::Duration;

/// Trip created by [`CardRadius`]
pub const RADIUS_TRIP: &str = "Radius Test Trip";

/// Plan added by [`CardRadius`]
pub const RADIUS_PLAN: &str = "Round Corner Activity";

/// Full-page and card-only captures of a freshly added plan
#[derive(Debug, Clone, Copy, Default)]
pub struct CardRadius;

#[async_trait]
impl<D: PageDriver> Scenario<D> for CardRadius {
    fn name(&self) -> &'static str {
        "card-radius"
    }

    fn description(&self) -> &'static str {
        "Capture a new plan card to review its corner radius"
    }

    fn anchor(&self) -> Option<Locator> {
        Some(app::sidebar_toggle())
    }

    async fn run(&self, session: &mut Session<D>) -> HarnessResult<()> {
        app::create_trip(session, RADIUS_TRIP, "10", "15").await?;
        session
            .expect(Condition::Visible(
                Locator::text(RADIUS_TRIP).with_strict(false),
            ))
            .await?;

        session.click(&app::add_plan_prompt(0)).await?;
        session
            .expect(Condition::Visible(app::title("NEW PLAN")))
            .await?;
        session.fill(&app::first_modal_input(), RADIUS_PLAN).await?;
        session.click(&app::modal_button("Save")).await?;
        session
            .expect(Condition::Visible(app::plan_item(RADIUS_PLAN)))
            .await?;
        session.pause(Duration::from_secs(1)).await?;

        session.capture("full page", CaptureScope::FullPage).await?;
        session
            .checkpoint("plan card", CaptureScope::Element(app::plan_item(RADIUS_PLAN)))
            .await?;
        Ok(())
    }
}

/// Header and day groups render at desktop width
#[derive(Debug, Clone, Copy, Default)]
pub struct HeaderSnapshot;

#[async_trait]
impl<D: PageDriver> Scenario<D> for HeaderSnapshot {
    fn name(&self) -> &'static str {
        "header-snapshot"
    }

    fn description(&self) -> &'static str {
        "Full-page capture of the header and day groups at 1280x800"
    }

    fn viewport(&self) -> Option<(u32, u32)> {
        Some((1280, 800))
    }

    fn anchor(&self) -> Option<Locator> {
        Some(app::header())
    }

    async fn run(&self, session: &mut Session<D>) -> HarnessResult<()> {
        session
            .expect(Condition::Visible(app::day_group(0)))
            .await?;
        session.capture("header", CaptureScope::FullPage).await?;
        Ok(())
    }
}

/// Bundled fonts are applied to text and icons
#[derive(Debug, Clone, Copy, Default)]
pub struct FontCheck;

#[async_trait]
impl<D: PageDriver> Scenario<D> for FontCheck {
    fn name(&self) -> &'static str {
        "font-check"
    }

    fn description(&self) -> &'static str {
        "Body uses Inter and header icons use Font Awesome"
    }

    fn anchor(&self) -> Option<Locator> {
        Some(app::calendar_icon())
    }

    async fn run(&self, session: &mut Session<D>) -> HarnessResult<()> {
        session
            .expect(Condition::StyleContains(
                StyleQuery::body_computed("font-family"),
                "Inter".to_string(),
            ))
            .await?;
        session
            .expect(Condition::StyleContains(
                StyleQuery::computed(&app::calendar_icon(), "font-family"),
                "Font Awesome".to_string(),
            ))
            .await?;
        session.capture("fonts", CaptureScope::Viewport).await?;
        Ok(())
    }
}
