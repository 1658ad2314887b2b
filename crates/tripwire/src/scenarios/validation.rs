//! Form validation on a phone-sized viewport.

use super::app;
use crate::capture::CaptureScope;
use crate::driver::PageDriver;
use crate::harness::Scenario;
use crate::result::HarnessResult;
use crate::session::Session;
use crate::wait::Condition;
use async_trait::async_trait;

/// Saving an empty trip form shows an alert that OK dismisses
#[derive(Debug, Clone, Copy, Default)]
pub struct ModalValidation;

#[async_trait]
impl<D: PageDriver> Scenario<D> for ModalValidation {
    fn name(&self) -> &'static str {
        "modal-validation"
    }

    fn description(&self) -> &'static str {
        "Empty trip form shows a validation alert at 375x812"
    }

    fn viewport(&self) -> Option<(u32, u32)> {
        Some((375, 812))
    }

    fn anchor(&self) -> Option<crate::locator::Locator> {
        Some(app::sidebar_toggle())
    }

    async fn run(&self, session: &mut Session<D>) -> HarnessResult<()> {
        app::open_sidebar(session).await?;
        session.click(&app::new_expedition()).await?;
        session
            .expect(Condition::Visible(app::title("New Journey")))
            .await?;

        session.click(&app::modal_button("Save")).await?;
        session
            .expect(Condition::Visible(app::modal_button("OK")))
            .await?;
        session
            .capture("trip validation", CaptureScope::Viewport)
            .await?;

        session.click(&app::modal_button("OK")).await?;
        session
            .expect(Condition::Detached(app::modal_button("OK")))
            .await?;
        session
            .expect(Condition::Visible(app::title("New Journey")))
            .await?;
        Ok(())
    }
}
