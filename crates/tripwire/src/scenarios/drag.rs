//! Drag and drop in the itinerary.
//!
//! The app's drag sensors need a press delay and real intermediate pointer
//! moves, so both scenarios use held, incremental gestures.

use super::app;
use crate::action::{DragGesture, DragTarget};
use crate::browser::DESKTOP_USER_AGENT;
use crate::capture::CaptureScope;
use crate::driver::PageDriver;
use crate::harness::Scenario;
use crate::locator::Locator;
use crate::result::HarnessResult;
use crate::session::Session;
use crate::wait::Condition;
use async_trait::async_trait;
use std::time::Duration;

/// Plan moved by [`PlanDrag`]
pub const DRAGGED_PLAN: &str = "Land at HKIA";

/// A plan dragged into the second day ends up in that day
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanDrag;

impl PlanDrag {
    /// Press, hold, 20 moves, settle, release
    pub fn gesture() -> DragGesture {
        DragGesture::new(
            app::plan_item(DRAGGED_PLAN),
            DragTarget::Inset(app::day_group(1), 150.0),
        )
        .with_hold(Duration::from_millis(200))
        .with_steps(20)
        .with_settle(Duration::from_millis(500))
    }
}

#[async_trait]
impl<D: PageDriver> Scenario<D> for PlanDrag {
    fn name(&self) -> &'static str {
        "plan-drag"
    }

    fn description(&self) -> &'static str {
        "Incremental drag moves \"Land at HKIA\" into day 2"
    }

    fn viewport(&self) -> Option<(u32, u32)> {
        Some((1280, 800))
    }

    fn user_agent(&self) -> Option<&'static str> {
        Some(DESKTOP_USER_AGENT)
    }

    fn anchor(&self) -> Option<Locator> {
        Some(app::day_group(0))
    }

    async fn run(&self, session: &mut Session<D>) -> HarnessResult<()> {
        let report = session.drag(&Self::gesture()).await?;
        session
            .expect_relocated(
                &report,
                Condition::TextContains(app::day_group(1), DRAGGED_PLAN.to_string()),
            )
            .await?;
        session.capture("after drop", CaptureScope::Viewport).await?;
        Ok(())
    }
}

/// Only day drags mark another day as a swap target
#[derive(Debug, Clone, Copy, Default)]
pub struct DragStyles;

impl DragStyles {
    fn over_day_two(source: Locator) -> DragGesture {
        DragGesture::new(source, DragTarget::Offset(app::day_group(1), 50.0, 50.0))
            .with_hold(Duration::from_millis(600))
            .with_steps(10)
    }
}

#[async_trait]
impl<D: PageDriver> Scenario<D> for DragStyles {
    fn name(&self) -> &'static str {
        "drag-styles"
    }

    fn description(&self) -> &'static str {
        "Day 2 gets a dashed border during a day drag but not during a plan drag"
    }

    fn anchor(&self) -> Option<Locator> {
        Some(app::day_group(0))
    }

    async fn run(&self, session: &mut Session<D>) -> HarnessResult<()> {
        let held = session
            .drag_hold(&Self::over_day_two(app::first_plan_in(0)))
            .await?;
        session.pause(Duration::from_millis(200)).await?;
        session
            .expect(Condition::LacksClass(
                app::day_group(1),
                app::DAY_SWAP_CLASS.to_string(),
            ))
            .await?;
        session
            .capture("plan over day 2", CaptureScope::Viewport)
            .await?;
        session.drag_release(held).await?;
        session.pause(Duration::from_secs(1)).await?;

        let held = session
            .drag_hold(&Self::over_day_two(app::day_header(0)))
            .await?;
        session.pause(Duration::from_millis(200)).await?;
        session
            .expect(Condition::HasClass(
                app::day_group(1),
                app::DAY_SWAP_CLASS.to_string(),
            ))
            .await?;
        session
            .capture("day over day 2", CaptureScope::Viewport)
            .await?;
        session.drag_release(held).await?;
        Ok(())
    }
}
