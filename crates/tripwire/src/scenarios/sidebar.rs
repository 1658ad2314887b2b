//! Navigation panel scroll lock.

use super::app;
use crate::capture::CaptureScope;
use crate::driver::{PageDriver, StyleQuery};
use crate::harness::Scenario;
use crate::locator::Locator;
use crate::result::HarnessResult;
use crate::session::Session;
use crate::wait::Condition;
use async_trait::async_trait;
use tracing::info;

/// Opening the panel locks body scrolling; closing restores the old value
#[derive(Debug, Clone, Copy, Default)]
pub struct SidebarScrollLock;

#[async_trait]
impl<D: PageDriver> Scenario<D> for SidebarScrollLock {
    fn name(&self) -> &'static str {
        "sidebar-scroll-lock"
    }

    fn description(&self) -> &'static str {
        "Body overflow is locked while the navigation panel is open and restored after"
    }

    fn anchor(&self) -> Option<Locator> {
        Some(app::sidebar_toggle())
    }

    async fn run(&self, session: &mut Session<D>) -> HarnessResult<()> {
        let overflow = StyleQuery::body_inline("overflow");
        let before = session.style_value(&overflow).await?.unwrap_or_default();
        info!(target: "tripwire::scenario", before = %before, "body overflow before open");

        session.click(&app::sidebar_toggle()).await?;
        session.expect(Condition::StyleNotEmpty(overflow.clone())).await?;
        session
            .expect(Condition::StyleEquals(overflow.clone(), "hidden".to_string()))
            .await?;
        session.capture("sidebar open", CaptureScope::Viewport).await?;

        session.click(&app::sidebar_close()).await?;
        session
            .expect(Condition::StyleEquals(overflow, before))
            .await?;
        session.capture("sidebar closed", CaptureScope::Viewport).await?;
        Ok(())
    }
}
