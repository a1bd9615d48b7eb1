use chrono::Utc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use super::{KeyValueStorage, NOTES_KEY, SELECTED_KEY};
use crate::entity::{Note, NoteDraft, NoteUpdate};
use crate::error::{NotewallError, Result};

/// The authoritative note collection plus the currently selected note.
///
/// Every mutation rewrites the whole collection to the backing storage before
/// returning. Storage failures are logged and swallowed: the in-memory state
/// stays the source of truth for the rest of the session.
pub struct NoteStore<S: KeyValueStorage> {
    storage: S,
    notes: Vec<Note>,
    selected: Option<String>,
}

impl<S: KeyValueStorage> NoteStore<S> {
    /// Load the persisted collection. Absent or malformed data yields an
    /// empty store; a selection pointing at a missing note is dropped.
    pub fn load_all(storage: S) -> Self {
        let notes = match storage.get(NOTES_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<Note>>(&raw) {
                Ok(notes) => notes,
                Err(e) => {
                    warn!("Discarding malformed saved notes: {}", e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                error!("Failed to read saved notes: {}", e);
                Vec::new()
            }
        };

        let selected = match storage.get(SELECTED_KEY) {
            Ok(Some(raw)) => serde_json::from_str::<Option<String>>(&raw).unwrap_or_else(|e| {
                warn!("Discarding malformed selection: {}", e);
                None
            }),
            Ok(None) => None,
            Err(e) => {
                error!("Failed to read selection: {}", e);
                None
            }
        }
        .filter(|id| notes.iter().any(|n| &n.id == id));

        debug!("Loaded {} notes", notes.len());
        Self {
            storage,
            notes,
            selected,
        }
    }

    /// Create a note from `draft`, append it and persist. Returns the stored note.
    pub fn add(&mut self, draft: NoteDraft) -> Note {
        let now = Utc::now();
        let note = Note {
            id: self.fresh_id(),
            title: draft.title,
            tasks: draft.tasks,
            background_color: draft.background_color,
            text_color: draft.text_color,
            background_type: draft.background_type,
            created_at: now,
            updated_at: now,
        };

        self.notes.push(note.clone());
        self.persist_notes();
        debug!("Added note {}", note.id);
        note
    }

    /// Merge `update` into the note with `id` and refresh `updated_at`.
    /// Unknown ids are a silent no-op and return `None`.
    pub fn update(&mut self, id: &str, update: NoteUpdate) -> Option<Note> {
        let note = self.notes.iter_mut().find(|n| n.id == id)?;
        update.apply_to(note);
        note.updated_at = Utc::now();
        let updated = note.clone();

        self.persist_notes();
        debug!("Updated note {}", id);
        Some(updated)
    }

    /// Remove the note with `id`, clearing the selection if it pointed there.
    /// Unknown ids are a silent no-op and return `None`.
    pub fn delete(&mut self, id: &str) -> Option<Note> {
        let index = self.notes.iter().position(|n| n.id == id)?;
        let removed = self.notes.remove(index);
        self.persist_notes();

        if self.selected.as_deref() == Some(id) {
            self.clear_selection();
        }

        debug!("Deleted note {}", id);
        Some(removed)
    }

    pub fn get(&self, id: &str) -> Option<&Note> {
        self.notes.iter().find(|n| n.id == id)
    }

    /// All notes in insertion order.
    pub fn list(&self) -> &[Note] {
        &self.notes
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// Find a note by exact id, 1-based list position, or unique id prefix.
    pub fn resolve(&self, query: &str) -> Result<&Note> {
        if let Some(note) = self.get(query) {
            return Ok(note);
        }

        if let Ok(position) = query.parse::<usize>() {
            if let Some(note) = position.checked_sub(1).and_then(|i| self.notes.get(i)) {
                return Ok(note);
            }
        }

        let mut matches = self.notes.iter().filter(|n| n.id.starts_with(query));
        match (matches.next(), matches.next()) {
            (Some(note), None) if !query.is_empty() => Ok(note),
            (Some(_), Some(_)) => Err(NotewallError::AmbiguousId(query.to_string())),
            _ => Err(NotewallError::NoteNotFound(query.to_string())),
        }
    }

    /// Point the selection at `id`. Unknown ids leave the selection unchanged.
    pub fn select(&mut self, id: &str) -> Option<&Note> {
        let index = self.notes.iter().position(|n| n.id == id)?;
        self.selected = Some(id.to_string());
        self.persist_selection();
        self.notes.get(index)
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
        self.persist_selection();
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// The selected note as it currently stands in the collection.
    pub fn current(&self) -> Option<&Note> {
        self.selected.as_deref().and_then(|id| self.get(id))
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn persist_notes(&self) {
        let result = serde_json::to_string(&self.notes)
            .map_err(NotewallError::from)
            .and_then(|json| self.storage.set(NOTES_KEY, &json));
        if let Err(e) = result {
            error!("Failed to persist notes: {}", e);
        }
    }

    fn persist_selection(&self) {
        let result = match &self.selected {
            Some(id) => serde_json::to_string(id)
                .map_err(NotewallError::from)
                .and_then(|json| self.storage.set(SELECTED_KEY, &json)),
            None => self.storage.remove(SELECTED_KEY),
        };
        if let Err(e) = result {
            error!("Failed to persist selection: {}", e);
        }
    }
}
