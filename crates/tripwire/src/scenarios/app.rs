//! Markup contract of the trip planner and the flows shared by scenarios.
//!
//! Every selector the scenarios depend on lives here, so a markup change in
//! the app is a one-file change in the harness.

use crate::driver::PageDriver;
use crate::locator::Locator;
use crate::result::HarnessResult;
use crate::session::Session;
use crate::wait::Condition;

/// Fixed app header
pub fn header() -> Locator {
    Locator::css("header")
}

/// Header button that opens the navigation panel
pub fn sidebar_toggle() -> Locator {
    Locator::css("button:has(.fa-bars-staggered)")
}

/// Navigation panel close icon
pub fn sidebar_close() -> Locator {
    Locator::css(".fa-xmark")
}

/// Navigation panel title
pub fn sidebar_title() -> Locator {
    Locator::text("My Journeys")
}

/// "New Expedition" button in the navigation panel
pub fn new_expedition() -> Locator {
    Locator::role("button").name("New Expedition")
}

/// Portaled modal container
pub fn modal_overlay() -> Locator {
    Locator::css(".fixed.inset-0")
}

/// Button with exactly this name inside the modal on top
pub fn modal_button(name: &str) -> Locator {
    Locator::role("button")
        .name(name)
        .exact()
        .within_topmost(modal_overlay())
}

/// Title text of a modal or dialog
pub fn title(text: &str) -> Locator {
    Locator::exact_text(text)
}

/// Trip name field of the trip form
pub fn trip_name_input() -> Locator {
    Locator::css("input[type='text']").within_topmost(modal_overlay())
}

/// First input of the modal on top
pub fn first_modal_input() -> Locator {
    Locator::css("input").nth(0).within_topmost(modal_overlay())
}

/// Day cell in the trip form calendar
pub fn calendar_day(day: &str) -> Locator {
    Locator::css("div.grid.grid-cols-7.content-start")
        .locate(Locator::exact_text(day))
        .within_topmost(modal_overlay())
}

/// Trip row in the navigation panel
pub fn trip_row(name: &str) -> Locator {
    Locator::css(".cursor-pointer").has_text(name)
}

/// Edit button on a trip row
pub fn trip_row_edit(name: &str) -> Locator {
    trip_row(name).locate(Locator::css("button"))
}

/// Every day container, in itinerary order
pub fn day_groups() -> Locator {
    Locator::css(".day-group")
}

/// Day container by zero-based position
pub fn day_group(index: usize) -> Locator {
    day_groups().nth(index)
}

/// Drag handle header of a day
pub fn day_header(index: usize) -> Locator {
    day_group(index).locate(Locator::css(".day-header"))
}

/// Draggable plan item by title
pub fn plan_item(title: &str) -> Locator {
    Locator::css(".touch-manipulation").has_text(title)
}

/// First plan item of a day
pub fn first_plan_in(day: usize) -> Locator {
    day_group(day).locate(Locator::css(".touch-manipulation").nth(0))
}

/// Class a day container carries while it is a day-swap drop target
pub const DAY_SWAP_CLASS: &str = "border-dashed";

/// Portaled sticky day header
pub fn sticky_day_header() -> Locator {
    Locator::css(r".fixed.z-\[45\]")
}

/// "Tap here to add new plan" prompt of a day
pub fn add_plan_prompt(day: usize) -> Locator {
    day_group(day).locate(Locator::text("Tap here to add new plan"))
}

/// Calendar icon in the header
pub fn calendar_icon() -> Locator {
    Locator::css(".fa-calendar-days")
}

/// Open the navigation panel and wait for it
pub async fn open_sidebar<D: PageDriver>(session: &mut Session<D>) -> HarnessResult<()> {
    session.click(&sidebar_toggle()).await?;
    session.expect(Condition::Visible(sidebar_title())).await?;
    Ok(())
}

/// Open the trip form from the navigation panel and fill name and dates
pub async fn start_new_trip<D: PageDriver>(
    session: &mut Session<D>,
    name: &str,
    start_day: &str,
    end_day: &str,
) -> HarnessResult<()> {
    open_sidebar(session).await?;
    session.click(&new_expedition()).await?;
    session.expect(Condition::Visible(title("New Journey"))).await?;
    session.fill(&trip_name_input(), name).await?;
    session.click(&calendar_day(start_day)).await?;
    session.click(&calendar_day(end_day)).await?;
    Ok(())
}

/// Press Save on the top form, confirm, and wait for both modals to go
pub async fn save_and_confirm<D: PageDriver>(
    session: &mut Session<D>,
    form_title: &str,
) -> HarnessResult<()> {
    session.click(&modal_button("Save")).await?;
    session.expect(Condition::Visible(title("Save Changes?"))).await?;
    session.click(&modal_button("Save")).await?;
    session.expect(Condition::Hidden(title("Save Changes?"))).await?;
    session.expect(Condition::Hidden(title(form_title))).await?;
    Ok(())
}

/// Create a trip through the full confirm flow
pub async fn create_trip<D: PageDriver>(
    session: &mut Session<D>,
    name: &str,
    start_day: &str,
    end_day: &str,
) -> HarnessResult<()> {
    start_new_trip(session, name, start_day, end_day).await?;
    save_and_confirm(session, "New Journey").await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modal_button_is_scoped_to_top_overlay() {
        assert_eq!(
            modal_button("Save").to_string(),
            "topmost(css=.fixed.inset-0) >> role=button[name=\"Save\"]"
        );
    }

    #[test]
    fn test_nth_only_on_ordered_lists() {
        assert_eq!(day_group(1).to_string(), "css=.day-group >> nth=1");
        assert!(calendar_day("15").to_string().starts_with("topmost("));
    }

    #[test]
    fn test_sticky_header_selector_escapes_brackets() {
        assert_eq!(sticky_day_header().to_string(), r"css=.fixed.z-\[45\]");
    }
}
