//! Evidence Capture
//!
//! Screenshots are written once to
//! `<artifact_dir>/<scenario>/<NN>-<checkpoint>.png`, where `NN` counts the
//! captures written so far in the scenario.

use crate::driver::{PageDriver, ScreenshotScope};
use crate::locator::{BoundingBox, Locator};
use crate::result::{HarnessError, HarnessResult};
use std::path::{Path, PathBuf};
use tracing::info;

/// What part of the page to capture
#[derive(Debug, Clone, PartialEq)]
pub enum CaptureScope {
    /// Whole scrollable page
    FullPage,
    /// Current viewport
    Viewport,
    /// A single visible element
    Element(Locator),
}

/// A written screenshot
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// File path
    pub path: PathBuf,
    /// Checkpoint name as given
    pub checkpoint: String,
    /// Scenario step that was current when the capture was taken
    pub step: String,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

/// Turn a checkpoint name into a file-name-safe slug
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "capture".to_string()
    } else {
        slug.to_string()
    }
}

/// Box of the single visible match, or why there is none
async fn visible_box<D: PageDriver + ?Sized>(
    driver: &D,
    locator: &Locator,
) -> HarnessResult<Result<BoundingBox, String>> {
    let elements = driver.query(locator.selector()).await?;
    Ok(match elements.as_slice() {
        [] => Err(format!("{locator} matched nothing")),
        [el] => el
            .bbox
            .filter(|b| el.visible && b.has_area())
            .ok_or_else(|| format!("{locator} is not visible")),
        many => Err(format!("{locator} matched {} elements", many.len())),
    })
}

/// Per-scenario artifact directory with a running sequence number
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    dir: PathBuf,
    sequence: u32,
    written: Vec<Artifact>,
}

impl ArtifactStore {
    /// Store for `scenario` below `root`
    #[must_use]
    pub fn new(root: impl AsRef<Path>, scenario: &str) -> Self {
        Self {
            dir: root.as_ref().join(slugify(scenario)),
            sequence: 0,
            written: Vec::new(),
        }
    }

    /// Scenario directory
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the next capture of `checkpoint` will use
    #[must_use]
    pub fn next_path(&self, checkpoint: &str) -> PathBuf {
        self.dir
            .join(format!("{:02}-{}.png", self.sequence + 1, slugify(checkpoint)))
    }

    /// Artifacts written so far
    #[must_use]
    pub fn artifacts(&self) -> &[Artifact] {
        &self.written
    }

    /// Consume the store, returning its artifacts
    #[must_use]
    pub fn into_artifacts(self) -> Vec<Artifact> {
        self.written
    }

    /// Take a screenshot of `scope` and write it
    ///
    /// Element scopes are scrolled into view first and clipped to the box
    /// measured afterwards.
    ///
    /// # Errors
    ///
    /// `CaptureSkipped` when an element scope is missing, ambiguous or
    /// invisible; screenshot and I/O errors otherwise.
    pub async fn capture<D: PageDriver + ?Sized>(
        &mut self,
        driver: &mut D,
        checkpoint: &str,
        scope: &CaptureScope,
        step: &str,
    ) -> HarnessResult<Artifact> {
        let shot_scope = match scope {
            CaptureScope::FullPage => ScreenshotScope::FullPage,
            CaptureScope::Viewport => ScreenshotScope::Viewport,
            CaptureScope::Element(locator) => {
                let skipped = |reason: String| HarnessError::CaptureSkipped {
                    checkpoint: checkpoint.to_string(),
                    reason,
                };
                visible_box(&*driver, locator).await?.map_err(skipped)?;
                driver.scroll_into_view(locator.selector(), 0).await?;
                let bbox = visible_box(&*driver, locator).await?.map_err(skipped)?;
                ScreenshotScope::Clip(bbox)
            }
        };

        let shot = driver.screenshot(shot_scope).await?;
        let path = self.next_path(checkpoint);
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, &shot.data).await?;
        self.sequence += 1;

        let artifact = Artifact {
            path,
            checkpoint: checkpoint.to_string(),
            step: step.to_string(),
            width: shot.width,
            height: shot.height,
        };
        info!(
            target: "tripwire::capture",
            path = %artifact.path.display(),
            width = artifact.width,
            height = artifact.height,
            "captured {checkpoint}"
        );
        self.written.push(artifact.clone());
        Ok(artifact)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::driver::{ElementSnapshot, MockDriver};
    use crate::locator::BoundingBox;

    mod slug_tests {
        use super::*;

        #[test]
        fn test_slugify() {
            assert_eq!(slugify("Save Changes?"), "save-changes");
            assert_eq!(slugify("  card / radius  "), "card-radius");
            assert_eq!(slugify("plan-drag"), "plan-drag");
            assert_eq!(slugify("???"), "capture");
        }
    }

    mod store_tests {
        use super::*;

        #[tokio::test]
        async fn test_paths_are_sequential_and_deterministic() {
            let tmp = tempfile::tempdir().unwrap();
            let mut driver = MockDriver::new().with_viewport(320, 200);
            let mut store = ArtifactStore::new(tmp.path(), "save-confirmation");

            let first = store
                .capture(&mut driver, "Save Changes?", &CaptureScope::FullPage, "click Save")
                .await
                .unwrap();
            let second = store
                .capture(&mut driver, "after confirm", &CaptureScope::Viewport, "confirm")
                .await
                .unwrap();

            assert_eq!(
                first.path,
                tmp.path().join("save-confirmation").join("01-save-changes.png")
            );
            assert_eq!(
                second.path,
                tmp.path().join("save-confirmation").join("02-after-confirm.png")
            );
            assert_eq!((first.width, first.height), (320, 200));
            assert_eq!(first.step, "click Save");
            assert!(first.path.exists());
            assert_eq!(store.artifacts().len(), 2);
        }

        #[tokio::test]
        async fn test_element_capture_clips_to_box() {
            let tmp = tempfile::tempdir().unwrap();
            let card = Locator::css(".touch-manipulation").has_text("Round Corner Activity");
            let mut driver = MockDriver::new().with_element(
                &card,
                ElementSnapshot::new("div").at(BoundingBox::new(10.0, 10.0, 300.0, 60.0)),
            );
            let mut store = ArtifactStore::new(tmp.path(), "card-radius");
            let artifact = store
                .capture(&mut driver, "card", &CaptureScope::Element(card), "add plan")
                .await
                .unwrap();
            assert_eq!((artifact.width, artifact.height), (300, 60));
        }

        #[tokio::test]
        async fn test_element_capture_scrolls_then_measures() {
            let tmp = tempfile::tempdir().unwrap();
            let header = Locator::css(".sticky");
            let mut driver = MockDriver::new();
            // below the fold before scrolling, 120px tall once in view
            driver.page().script_elements(
                &header,
                vec![
                    vec![ElementSnapshot::new("div").at(BoundingBox::new(0.0, 1500.0, 400.0, 40.0))],
                    vec![ElementSnapshot::new("div").at(BoundingBox::new(0.0, 300.0, 400.0, 120.0))],
                ],
            );
            let mut store = ArtifactStore::new(tmp.path(), "sticky-header");
            let artifact = store
                .capture(&mut driver, "header", &CaptureScope::Element(header), "scroll")
                .await
                .unwrap();

            assert_eq!((artifact.width, artifact.height), (400, 120));
            let history = driver.page().history.clone();
            let scrolled = history
                .iter()
                .position(|c| c.starts_with("scroll_into_view:css=.sticky"))
                .unwrap();
            let shot = history.iter().position(|c| c == "screenshot").unwrap();
            assert!(scrolled < shot);
        }

        #[tokio::test]
        async fn test_missing_element_is_skipped_without_consuming_number() {
            let tmp = tempfile::tempdir().unwrap();
            let mut driver = MockDriver::new();
            let mut store = ArtifactStore::new(tmp.path(), "card-radius");
            let err = store
                .capture(
                    &mut driver,
                    "card",
                    &CaptureScope::Element(Locator::css(".missing")),
                    "add plan",
                )
                .await
                .unwrap_err();
            assert!(matches!(err, HarnessError::CaptureSkipped { .. }));
            assert!(!err.is_fatal());
            assert!(store.next_path("full").ends_with("01-full.png"));
            assert!(!driver.was_called("screenshot"));
        }

        #[tokio::test]
        async fn test_ambiguous_element_is_skipped() {
            let tmp = tempfile::tempdir().unwrap();
            let loc = Locator::css(".day-group");
            let el = ElementSnapshot::new("div").at(BoundingBox::new(0.0, 0.0, 10.0, 10.0));
            let mut driver = MockDriver::new();
            driver.page().set_elements(&loc, vec![el.clone(), el]);
            let mut store = ArtifactStore::new(tmp.path(), "x");
            let err = store
                .capture(&mut driver, "days", &CaptureScope::Element(loc), "")
                .await
                .unwrap_err();
            assert!(err.to_string().contains("2 elements"));
        }
    }
}
