pub mod cli;
pub mod config;
pub mod editor;
pub mod entity;
pub mod error;
pub mod export;
pub mod gallery;
pub mod notify;
pub mod storage;

pub use config::NotewallConfig;
pub use editor::{NoteEditor, SaveOutcome};
pub use entity::{BackgroundType, Note, NoteDraft, NoteUpdate};
pub use error::{ExportError, NotewallError, Result};
pub use export::{ExportOutcome, WallpaperExporter};
pub use gallery::{Gallery, WallpaperBrowser};
pub use storage::{FileStorage, MemoryStorage, NoteStore};
