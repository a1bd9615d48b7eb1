//! Wallpaper export: lay a note out, rasterize it, encode a PNG and hand it
//! to a delivery strategy.
//!
//! [`WallpaperExporter::export`] is the single entry point. It never returns
//! an error to the caller; every outcome is reported through the
//! [`Notifier`] and summarized as an [`ExportOutcome`].

mod delivery;
mod raster;
mod surface;

pub use delivery::{
    build_delivery, DeliveredArtifact, Delivery, DeliveryKind, DeliveryMethod, DirectDownload,
    HostPlatform, OpenInViewer, Platform, StagedArtifact,
};
pub use raster::{PixelRasterizer, RasterImage, RasterOptions, Rasterizer, MAX_SCALE};
pub use surface::{
    text_width_px, wrap_text, PaintCommand, Surface, FOOTER_TEXT, PREVIEW_HEIGHT, PREVIEW_WIDTH,
};

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::entity::Note;
use crate::error::ExportError;
use crate::notify::{Notice, Notifier};

pub const MISSING_TARGET_MESSAGE: &str = "Could not find preview element to capture.";
pub const FAILURE_MESSAGE: &str = "Failed to generate wallpaper. Please try again.";

/// `notewall-<slug>-<millis>.png`, with `wallpaper` standing in for an empty title.
pub fn wallpaper_filename(title: &str, millis: i64) -> String {
    let slug = slugify(title);
    let base = if slug.is_empty() { "wallpaper" } else { &slug };
    format!("notewall-{}-{}.png", base, millis)
}

/// Lower-case, every whitespace run becomes one hyphen. Path separators are
/// hyphenated too so the name stays inside the output directory.
fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut in_space = false;
    for ch in title.chars() {
        if ch.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        match ch {
            '/' | '\\' => slug.push('-'),
            _ => slug.extend(ch.to_lowercase()),
        }
    }
    slug
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportSettings {
    pub scale: u32,
    /// How long the staged file outlives a successful delivery.
    pub release_delay: Duration,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            scale: 2,
            release_delay: Duration::from_millis(100),
        }
    }
}

#[derive(Debug)]
pub enum ExportOutcome {
    Delivered(DeliveredArtifact),
    /// Another export was still running; this call did nothing.
    AlreadyRunning,
    Failed(ExportError),
}

impl ExportOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, ExportOutcome::Delivered(_))
    }
}

/// Clears the in-flight flag when the export settles, however it settles.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct WallpaperExporter<R: Rasterizer> {
    rasterizer: R,
    delivery: Box<dyn Delivery>,
    notifier: Arc<dyn Notifier>,
    settings: ExportSettings,
    in_flight: AtomicBool,
}

impl<R: Rasterizer> WallpaperExporter<R> {
    pub fn new(
        rasterizer: R,
        delivery: Box<dyn Delivery>,
        notifier: Arc<dyn Notifier>,
        settings: ExportSettings,
    ) -> Self {
        Self {
            rasterizer,
            delivery,
            notifier,
            settings,
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn is_running(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn settings(&self) -> &ExportSettings {
        &self.settings
    }

    /// Export the preview `target` of `note` as a PNG wallpaper.
    ///
    /// A call made while another is in flight is ignored, not queued.
    pub async fn export(&self, target: Option<&Surface>, note: &Note) -> ExportOutcome {
        let Some(surface) = target else {
            error!("Export of note {} has no preview surface", note.id);
            self.notifier.notify(Notice::error(MISSING_TARGET_MESSAGE));
            return ExportOutcome::Failed(ExportError::MissingTarget);
        };

        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Export already running, ignoring request for {}", note.id);
            return ExportOutcome::AlreadyRunning;
        }
        let _guard = InFlight(&self.in_flight);

        self.notifier
            .notify(Notice::progress("Generating your wallpaper..."));

        match self.run(surface, note).await {
            Ok(delivered) => {
                info!(
                    "Exported note {} to {} ({})",
                    note.id,
                    delivered.path.display(),
                    delivered.method
                );
                self.notifier.notify(Notice::success(format!(
                    "Your wallpaper has been saved to {}",
                    delivered.path.display()
                )));
                ExportOutcome::Delivered(delivered)
            }
            Err(e) => {
                error!("Error generating wallpaper for {}: {}", note.id, e);
                self.notifier.notify(Notice::error(FAILURE_MESSAGE));
                ExportOutcome::Failed(e)
            }
        }
    }

    async fn run(&self, surface: &Surface, note: &Note) -> Result<DeliveredArtifact, ExportError> {
        let options = RasterOptions {
            scale: self.settings.scale,
            background: note.background_color.clone(),
        };
        let image = self.rasterizer.rasterize(surface, &options).await?;
        let bytes = image.encode_png()?;
        let staged = StagedArtifact::stage(&bytes)?;

        let file_name = wallpaper_filename(&note.title, chrono::Utc::now().timestamp_millis());
        let delivered = self.delivery.deliver(&staged, &file_name)?;
        release_later(staged, self.settings.release_delay);
        Ok(delivered)
    }
}

/// Drop the staged file after `delay`. Without a runtime it goes right away,
/// which is still after delivery returned.
fn release_later(staged: StagedArtifact, delay: Duration) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(async move {
                tokio::time::sleep(delay).await;
                debug!("Released staged artifact {}", staged.path().display());
                drop(staged);
            });
        }
        Err(_) => drop(staged),
    }
}
