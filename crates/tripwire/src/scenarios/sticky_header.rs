//! Sticky day header visibility while scrolling.

use super::app;
use crate::capture::CaptureScope;
use crate::driver::PageDriver;
use crate::harness::Scenario;
use crate::locator::Locator;
use crate::result::HarnessResult;
use crate::session::Session;
use crate::wait::Condition;
use async_trait::async_trait;
use std::time::Duration;

/// Sticky header stays hidden at the top and shows once the list scrolls
#[derive(Debug, Clone, Copy, Default)]
pub struct StickyHeader;

#[async_trait]
impl<D: PageDriver> Scenario<D> for StickyHeader {
    fn name(&self) -> &'static str {
        "sticky-header"
    }

    fn description(&self) -> &'static str {
        "Sticky day header is hidden at the top and visible deep in the list"
    }

    fn anchor(&self) -> Option<Locator> {
        Some(app::day_group(0))
    }

    async fn run(&self, session: &mut Session<D>) -> HarnessResult<()> {
        let sticky = app::sticky_day_header();
        session.expect(Condition::Hidden(sticky.clone())).await?;

        session.scroll_into_view(&app::day_group(0)).await?;
        session.pause(Duration::from_millis(500)).await?;
        // scrollIntoView may leave day 1 stuck at the very top
        session.check(Condition::Hidden(sticky.clone())).await?;

        session.scroll_by(0.0, 500.0).await?;
        session.expect(Condition::Visible(sticky)).await?;
        session.capture("deep scroll", CaptureScope::Viewport).await?;
        Ok(())
    }
}
