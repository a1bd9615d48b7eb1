mod palette;

pub use palette::{
    resolve_color, ColorOption, Rgba, BACKGROUND_COLORS, DEFAULT_BACKGROUND_COLOR,
    DEFAULT_TEXT_COLOR, TEXT_COLORS,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How the wallpaper background is rendered. Only `Color` is produced today;
/// the other variants are kept so stored data using them still loads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    #[default]
    Color,
    Gradient,
    Image,
}

impl std::fmt::Display for BackgroundType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackgroundType::Color => write!(f, "color"),
            BackgroundType::Gradient => write!(f, "gradient"),
            BackgroundType::Image => write!(f, "image"),
        }
    }
}

impl std::str::FromStr for BackgroundType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "color" | "colour" => Ok(BackgroundType::Color),
            "gradient" => Ok(BackgroundType::Gradient),
            "image" => Ok(BackgroundType::Image),
            _ => Err(format!("Invalid background type: {}", s)),
        }
    }
}

/// A task-list note as persisted under the `notes` storage key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Note {
    pub id: String,
    pub title: String,
    pub tasks: Vec<String>,
    pub background_color: String,
    pub text_color: String,
    #[serde(default)]
    pub background_type: BackgroundType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Note {
    /// Short id used in listings.
    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(7) {
            Some((end, _)) => &self.id[..end],
            None => &self.id,
        }
    }

    /// Title or a placeholder when the note only has tasks.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "(untitled)"
        } else {
            &self.title
        }
    }
}

/// Everything a caller supplies to create a note: the store assigns the id
/// and both timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteDraft {
    pub title: String,
    pub tasks: Vec<String>,
    pub background_color: String,
    pub text_color: String,
    pub background_type: BackgroundType,
}

impl Default for NoteDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            tasks: Vec::new(),
            background_color: DEFAULT_BACKGROUND_COLOR.to_string(),
            text_color: DEFAULT_TEXT_COLOR.to_string(),
            background_type: BackgroundType::default(),
        }
    }
}

impl NoteDraft {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    /// Seed a draft from an existing note.
    pub fn from_note(note: &Note) -> Self {
        Self {
            title: note.title.clone(),
            tasks: note.tasks.clone(),
            background_color: note.background_color.clone(),
            text_color: note.text_color.clone(),
            background_type: note.background_type,
        }
    }
}

/// Partial field overrides for `NoteStore::update`. `None` leaves a field alone.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteUpdate {
    pub title: Option<String>,
    pub tasks: Option<Vec<String>>,
    pub background_color: Option<String>,
    pub text_color: Option<String>,
    pub background_type: Option<BackgroundType>,
}

impl NoteUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.tasks.is_none()
            && self.background_color.is_none()
            && self.text_color.is_none()
            && self.background_type.is_none()
    }

    /// Merge the overrides into `note`. Does not touch `id`, `created_at` or
    /// `updated_at`; the store owns those.
    pub fn apply_to(self, note: &mut Note) {
        if let Some(title) = self.title {
            note.title = title;
        }
        if let Some(tasks) = self.tasks {
            note.tasks = tasks;
        }
        if let Some(background_color) = self.background_color {
            note.background_color = background_color;
        }
        if let Some(text_color) = self.text_color {
            note.text_color = text_color;
        }
        if let Some(background_type) = self.background_type {
            note.background_type = background_type;
        }
    }
}

impl From<NoteDraft> for NoteUpdate {
    fn from(draft: NoteDraft) -> Self {
        Self {
            title: Some(draft.title),
            tasks: Some(draft.tasks),
            background_color: Some(draft.background_color),
            text_color: Some(draft.text_color),
            background_type: Some(draft.background_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_note() -> Note {
        let now = Utc::now();
        Note {
            id: "0f1e2d3c-aaaa-bbbb-cccc-000000000000".to_string(),
            title: "Groceries".to_string(),
            tasks: vec!["Milk".to_string(), "Eggs".to_string()],
            background_color: "#FFF8E1".to_string(),
            text_color: "#333333".to_string(),
            background_type: BackgroundType::Color,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_note_serializes_camel_case() {
        let json = serde_json::to_value(sample_note()).unwrap();
        assert_eq!(json["backgroundColor"], "#FFF8E1");
        assert_eq!(json["textColor"], "#333333");
        assert_eq!(json["backgroundType"], "color");
        assert!(json["createdAt"].is_string());
        assert!(json["updatedAt"].is_string());
    }

    #[test]
    fn test_note_accepts_iso_millis_and_missing_background_type() {
        let raw = r##"{
            "id": "1712345678901",
            "title": "Old",
            "tasks": ["a"],
            "backgroundColor": "#FFFFFF",
            "textColor": "#333333",
            "createdAt": "2024-04-05T19:34:38.901Z",
            "updatedAt": "2024-04-05T19:34:38.901Z"
        }"##;
        let note: Note = serde_json::from_str(raw).unwrap();
        assert_eq!(note.id, "1712345678901");
        assert_eq!(note.background_type, BackgroundType::Color);
        assert_eq!(note.created_at, note.updated_at);
    }

    #[test]
    fn test_draft_defaults() {
        let draft = NoteDraft::default();
        assert_eq!(draft.title, "");
        assert!(draft.tasks.is_empty());
        assert_eq!(draft.background_color, "#FFFFFF");
        assert_eq!(draft.text_color, "#333333");
        assert_eq!(draft.background_type, BackgroundType::Color);
    }

    #[test]
    fn test_update_only_touches_given_fields() {
        let mut note = sample_note();
        let before = note.clone();
        NoteUpdate::title("Errands").apply_to(&mut note);

        assert_eq!(note.title, "Errands");
        assert_eq!(note.tasks, before.tasks);
        assert_eq!(note.background_color, before.background_color);
        assert_eq!(note.text_color, before.text_color);
        assert_eq!(note.updated_at, before.updated_at);
    }

    #[test]
    fn test_background_type_parse() {
        assert_eq!("Gradient".parse::<BackgroundType>(), Ok(BackgroundType::Gradient));
        assert!("plaid".parse::<BackgroundType>().is_err());
        assert_eq!(BackgroundType::Image.to_string(), "image");
    }

    #[test]
    fn test_short_id_and_display_title() {
        let mut note = sample_note();
        assert_eq!(note.short_id(), "0f1e2d3");
        note.title.clear();
        assert_eq!(note.display_title(), "(untitled)");
        note.id = "42".to_string();
        assert_eq!(note.short_id(), "42");
    }
}
