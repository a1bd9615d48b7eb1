//! Handing a finished wallpaper to the user.
//!
//! The encoded PNG is first staged in a temporary file (the transient handle
//! the strategies read from). A [`Delivery`] strategy then makes it available:
//! [`DirectDownload`] saves it into the output directory, [`OpenInViewer`]
//! saves it and opens it in an image viewer for environments where a plain
//! save is not enough. Which one runs is decided by [`DeliveryKind`] and an
//! injected [`Platform`].

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::config::env_vars;
use crate::error::ExportError;

/// PNG bytes parked in a temporary file until released.
#[derive(Debug)]
pub struct StagedArtifact {
    file: NamedTempFile,
    len: usize,
}

impl StagedArtifact {
    pub fn stage(bytes: &[u8]) -> Result<Self, ExportError> {
        let mut file = tempfile::Builder::new()
            .prefix("notewall-")
            .suffix(".png")
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;
        Ok(Self {
            file,
            len: bytes.len(),
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMethod {
    Download,
    Open,
}

impl std::fmt::Display for DeliveryMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryMethod::Download => write!(f, "download"),
            DeliveryMethod::Open => write!(f, "open"),
        }
    }
}

/// Where the wallpaper ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveredArtifact {
    pub path: PathBuf,
    pub method: DeliveryMethod,
}

pub trait Delivery: Send + Sync {
    fn method(&self) -> DeliveryMethod;
    fn deliver(
        &self,
        staged: &StagedArtifact,
        file_name: &str,
    ) -> Result<DeliveredArtifact, ExportError>;
}

/// Copy the staged file into `output_dir` under `file_name`. A failed copy
/// removes whatever was partially written.
fn save_into(
    output_dir: &Path,
    staged: &StagedArtifact,
    file_name: &str,
) -> Result<PathBuf, ExportError> {
    fs::create_dir_all(output_dir)?;
    let target = output_dir.join(file_name);
    if let Err(e) = fs::copy(staged.path(), &target) {
        let _ = fs::remove_file(&target);
        return Err(ExportError::Delivery(format!(
            "could not write {}: {}",
            target.display(),
            e
        )));
    }
    Ok(target)
}

#[derive(Debug, Clone)]
pub struct DirectDownload {
    output_dir: PathBuf,
}

impl DirectDownload {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }
}

impl Delivery for DirectDownload {
    fn method(&self) -> DeliveryMethod {
        DeliveryMethod::Download
    }

    fn deliver(
        &self,
        staged: &StagedArtifact,
        file_name: &str,
    ) -> Result<DeliveredArtifact, ExportError> {
        let path = save_into(&self.output_dir, staged, file_name)?;
        debug!("Saved wallpaper to {}", path.display());
        Ok(DeliveredArtifact {
            path,
            method: DeliveryMethod::Download,
        })
    }
}

type Opener = Box<dyn Fn(&Path) -> std::io::Result<()> + Send + Sync>;

pub struct OpenInViewer {
    output_dir: PathBuf,
    opener: Opener,
}

impl OpenInViewer {
    /// Open with `viewer` if given, else the platform's default opener.
    pub fn new(output_dir: impl Into<PathBuf>, viewer: Option<String>) -> Self {
        Self::with_opener(
            output_dir,
            Box::new(move |path: &Path| launch_viewer(viewer.as_deref(), path)),
        )
    }

    pub fn with_opener(output_dir: impl Into<PathBuf>, opener: Opener) -> Self {
        Self {
            output_dir: output_dir.into(),
            opener,
        }
    }
}

impl Delivery for OpenInViewer {
    fn method(&self) -> DeliveryMethod {
        DeliveryMethod::Open
    }

    fn deliver(
        &self,
        staged: &StagedArtifact,
        file_name: &str,
    ) -> Result<DeliveredArtifact, ExportError> {
        let path = save_into(&self.output_dir, staged, file_name)?;
        if let Err(e) = (self.opener)(&path) {
            let _ = fs::remove_file(&path);
            return Err(ExportError::Delivery(format!("could not open viewer: {}", e)));
        }
        debug!("Opened wallpaper {} in viewer", path.display());
        Ok(DeliveredArtifact {
            path,
            method: DeliveryMethod::Open,
        })
    }
}

fn default_viewer() -> &'static str {
    if cfg!(target_os = "macos") || cfg!(target_os = "ios") {
        "open"
    } else if cfg!(target_os = "windows") {
        "explorer"
    } else if cfg!(target_os = "android") {
        "termux-open"
    } else {
        "xdg-open"
    }
}

/// Start the viewer on `path`. The viewer runs detached; a background thread
/// reaps it when it exits.
fn launch_viewer(viewer: Option<&str>, path: &Path) -> std::io::Result<()> {
    let command = viewer.unwrap_or(default_viewer());
    let mut parts = command.split_whitespace();
    let program = parts.next().unwrap_or(default_viewer());
    let mut child = std::process::Command::new(program)
        .args(parts)
        .arg(path)
        .spawn()?;
    std::thread::spawn(move || {
        if let Err(e) = child.wait() {
            warn!("Could not wait for viewer: {}", e);
        }
    });
    Ok(())
}

/// The capability the export path asks about its environment.
pub trait Platform: Send + Sync {
    /// True where plain saving is unreliable and the image should be opened instead.
    fn is_mobile(&self) -> bool;
}

/// Decides from the build target and the `NOTEWALL_MOBILE` override.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostPlatform;

impl Platform for HostPlatform {
    fn is_mobile(&self) -> bool {
        match std::env::var(env_vars::MOBILE) {
            Ok(v) => matches!(v.trim().to_lowercase().as_str(), "1" | "true" | "yes"),
            Err(_) => cfg!(any(target_os = "android", target_os = "ios")),
        }
    }
}

/// Configured delivery preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryKind {
    #[default]
    Auto,
    Download,
    Open,
}

impl DeliveryKind {
    pub fn resolve(self, platform: &dyn Platform) -> DeliveryMethod {
        match self {
            DeliveryKind::Download => DeliveryMethod::Download,
            DeliveryKind::Open => DeliveryMethod::Open,
            DeliveryKind::Auto if platform.is_mobile() => DeliveryMethod::Open,
            DeliveryKind::Auto => DeliveryMethod::Download,
        }
    }
}

impl std::fmt::Display for DeliveryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DeliveryKind::Auto => write!(f, "auto"),
            DeliveryKind::Download => write!(f, "download"),
            DeliveryKind::Open => write!(f, "open"),
        }
    }
}

impl std::str::FromStr for DeliveryKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(DeliveryKind::Auto),
            "download" | "save" => Ok(DeliveryKind::Download),
            "open" | "view" => Ok(DeliveryKind::Open),
            _ => Err(format!("Invalid delivery: {}", s)),
        }
    }
}

/// Build the strategy for `kind` on `platform`.
pub fn build_delivery(
    kind: DeliveryKind,
    platform: &dyn Platform,
    output_dir: &Path,
    viewer: Option<String>,
) -> Box<dyn Delivery> {
    match kind.resolve(platform) {
        DeliveryMethod::Download => Box::new(DirectDownload::new(output_dir)),
        DeliveryMethod::Open => {
            if viewer.is_none() {
                warn!("No viewer configured, using {}", default_viewer());
            }
            Box::new(OpenInViewer::new(output_dir, viewer))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tempfile::TempDir;

    struct FixedPlatform(bool);

    impl Platform for FixedPlatform {
        fn is_mobile(&self) -> bool {
            self.0
        }
    }

    #[test]
    fn test_staged_artifact_holds_bytes() {
        let staged = StagedArtifact::stage(b"not really a png").unwrap();
        assert_eq!(staged.len(), 16);
        assert_eq!(fs::read(staged.path()).unwrap(), b"not really a png");

        let path = staged.path().to_path_buf();
        drop(staged);
        assert!(!path.exists());
    }

    #[test]
    fn test_direct_download_writes_file() {
        let tmp = TempDir::new().unwrap();
        let out = tmp.path().join("downloads");
        let staged = StagedArtifact::stage(b"png bytes").unwrap();

        let delivered = DirectDownload::new(&out).deliver(&staged, "notewall-a-1.png").unwrap();
        assert_eq!(delivered.method, DeliveryMethod::Download);
        assert_eq!(delivered.path, out.join("notewall-a-1.png"));
        assert_eq!(fs::read(&delivered.path).unwrap(), b"png bytes");
    }

    #[test]
    fn test_open_in_viewer_saves_then_opens() {
        let tmp = TempDir::new().unwrap();
        let opened = Arc::new(AtomicUsize::new(0));
        let counter = opened.clone();
        let delivery = OpenInViewer::with_opener(
            tmp.path(),
            Box::new(move |path: &Path| {
                assert!(path.exists());
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }),
        );
        let staged = StagedArtifact::stage(b"png").unwrap();

        let delivered = delivery.deliver(&staged, "w.png").unwrap();
        assert_eq!(delivered.method, DeliveryMethod::Open);
        assert_eq!(opened.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_open_failure_leaves_no_file() {
        let tmp = TempDir::new().unwrap();
        let delivery = OpenInViewer::with_opener(
            tmp.path(),
            Box::new(|_: &Path| {
                Err(std::io::Error::new(std::io::ErrorKind::NotFound, "no viewer"))
            }),
        );
        let staged = StagedArtifact::stage(b"png").unwrap();

        let result = delivery.deliver(&staged, "w.png");
        assert!(matches!(result, Err(ExportError::Delivery(_))));
        assert!(!tmp.path().join("w.png").exists());
    }

    #[test]
    fn test_delivery_kind_resolution() {
        let desktop = FixedPlatform(false);
        let phone = FixedPlatform(true);

        assert_eq!(DeliveryKind::Auto.resolve(&desktop), DeliveryMethod::Download);
        assert_eq!(DeliveryKind::Auto.resolve(&phone), DeliveryMethod::Open);
        assert_eq!(DeliveryKind::Download.resolve(&phone), DeliveryMethod::Download);
        assert_eq!(DeliveryKind::Open.resolve(&desktop), DeliveryMethod::Open);

        let tmp = TempDir::new().unwrap();
        let delivery = build_delivery(DeliveryKind::Auto, &phone, tmp.path(), Some("true".into()));
        assert_eq!(delivery.method(), DeliveryMethod::Open);
    }

    #[cfg(unix)]
    #[test]
    fn test_configured_viewer_command_is_launched() {
        let tmp = TempDir::new().unwrap();
        let staged = StagedArtifact::stage(b"png").unwrap();

        let delivery = OpenInViewer::new(tmp.path(), Some("true --ignored".to_string()));
        let delivered = delivery.deliver(&staged, "w.png").unwrap();
        assert_eq!(delivered.method, DeliveryMethod::Open);
        assert!(delivered.path.exists());

        let missing = OpenInViewer::new(tmp.path(), Some("notewall-no-such-viewer".to_string()));
        assert!(matches!(
            missing.deliver(&staged, "x.png"),
            Err(ExportError::Delivery(_))
        ));
        assert!(!tmp.path().join("x.png").exists());
    }

    #[test]
    fn test_delivery_kind_parse() {
        assert_eq!("Download".parse::<DeliveryKind>(), Ok(DeliveryKind::Download));
        assert_eq!("view".parse::<DeliveryKind>(), Ok(DeliveryKind::Open));
        assert!("email".parse::<DeliveryKind>().is_err());
    }
}
