//! Save / discard confirmation dialogs of the trip form.

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

/// Trip created by both confirmation scenarios
pub const TRIP_NAME: &str = "Test Confirmation Trip";

/// Saving a new trip asks for confirmation, and confirming closes both modals
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveConfirmation;

#[async_trait]
impl<D: PageDriver> Scenario<D> for SaveConfirmation {
    fn name(&self) -> &'static str {
        "save-confirmation"
    }

    fn description(&self) -> &'static str {
        "Save on a new trip shows \"Save Changes?\"; confirming closes both modals"
    }

    fn anchor(&self) -> Option<Locator> {
        Some(app::header())
    }

    async fn run(&self, session: &mut Session<D>) -> HarnessResult<()> {
        app::start_new_trip(session, TRIP_NAME, "15", "20").await?;

        session.click(&app::modal_button("Save")).await?;
        session
            .expect_within(
                Condition::Visible(app::title("Save Changes?")),
                Duration::from_secs(5),
            )
            .await?;
        session
            .capture("save confirmation", CaptureScope::FullPage)
            .await?;

        session.click(&app::modal_button("Save")).await?;
        session
            .expect(Condition::Hidden(app::title("Save Changes?")))
            .await?;
        session
            .expect(Condition::Hidden(app::title("New Journey")))
            .await?;
        Ok(())
    }
}

/// Cancelling an edited trip asks before discarding; keep editing then save
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardConfirmation;

#[async_trait]
impl<D: PageDriver> Scenario<D> for DiscardConfirmation {
    fn name(&self) -> &'static str {
        "discard-confirmation"
    }

    fn description(&self) -> &'static str {
        "Cancel on an edited trip shows \"Discard Changes?\"; Keep Editing returns to the form"
    }

    fn anchor(&self) -> Option<Locator> {
        Some(app::header())
    }

    async fn run(&self, session: &mut Session<D>) -> HarnessResult<()> {
        app::create_trip(session, TRIP_NAME, "15", "20").await?;

        app::open_sidebar(session).await?;
        session.click(&app::trip_row_edit(TRIP_NAME)).await?;
        session
            .expect(Condition::Visible(app::title("Edit Journey")))
            .await?;
        session
            .fill(&app::trip_name_input(), &format!("{TRIP_NAME} Modified"))
            .await?;

        session.click(&app::modal_button("Cancel")).await?;
        session
            .expect(Condition::Visible(app::title("Discard Changes?")))
            .await?;
        session
            .capture("discard confirmation", CaptureScope::FullPage)
            .await?;

        session.click(&app::modal_button("Keep Editing")).await?;
        session
            .expect(Condition::Hidden(app::title("Discard Changes?")))
            .await?;

        app::save_and_confirm(session, "Edit Journey").await
    }
}
