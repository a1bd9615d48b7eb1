use crate::editor::NoteEditor;
use crate::entity::Note;
use crate::storage::{KeyValueStorage, NoteStore};

/// How many tasks a gallery card shows before collapsing the rest.
pub const CARD_TASK_LIMIT: usize = 5;

/// Summary of one note as shown in the gallery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteCard {
    pub id: String,
    pub title: String,
    pub preview_tasks: Vec<String>,
    /// Tasks hidden behind the "+N more" marker.
    pub more_tasks: usize,
    pub background_color: String,
    pub text_color: String,
}

impl NoteCard {
    pub fn from_note(note: &Note) -> Self {
        Self {
            id: note.id.clone(),
            title: note.title.clone(),
            preview_tasks: note.tasks.iter().take(CARD_TASK_LIMIT).cloned().collect(),
            more_tasks: note.tasks.len().saturating_sub(CARD_TASK_LIMIT),
            background_color: note.background_color.clone(),
            text_color: note.text_color.clone(),
        }
    }
}

/// Read/dispatch layer over the store. The only state it keeps is which note
/// is open in the editor right now.
#[derive(Debug, Default)]
pub struct Gallery {
    editing: Option<String>,
}

impl Gallery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cards<S: KeyValueStorage>(&self, store: &NoteStore<S>) -> Vec<NoteCard> {
        store.list().iter().map(NoteCard::from_note).collect()
    }

    /// Pick a note for the wallpaper view by making it the current note.
    pub fn open_for_export<S: KeyValueStorage>(
        &self,
        store: &mut NoteStore<S>,
        id: &str,
    ) -> Option<Note> {
        store.select(id).cloned()
    }

    /// Open a note in an editor seeded from its current state.
    pub fn begin_edit<S: KeyValueStorage>(
        &mut self,
        store: &NoteStore<S>,
        id: &str,
    ) -> Option<NoteEditor> {
        let note = store.get(id)?;
        self.editing = Some(note.id.clone());
        Some(NoteEditor::edit(note))
    }

    pub fn finish_edit(&mut self) {
        self.editing = None;
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn delete<S: KeyValueStorage>(
        &mut self,
        store: &mut NoteStore<S>,
        id: &str,
    ) -> Option<Note> {
        if self.editing.as_deref() == Some(id) {
            self.editing = None;
        }
        store.delete(id)
    }
}

/// Position while paging through notes one wallpaper at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallpaperBrowser {
    index: usize,
    total: usize,
}

impl WallpaperBrowser {
    /// Start at the current note if there is one, else at the first note.
    /// Returns `None` for an empty store.
    pub fn start<S: KeyValueStorage>(store: &NoteStore<S>) -> Option<Self> {
        if store.is_empty() {
            return None;
        }
        let index = store
            .selected_id()
            .and_then(|id| store.list().iter().position(|n| n.id == id))
            .unwrap_or(0);
        Some(Self {
            index,
            total: store.len(),
        })
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn has_prev(&self) -> bool {
        self.index > 0
    }

    pub fn has_next(&self) -> bool {
        self.index + 1 < self.total
    }

    /// Move back one note, selecting it. Stays put at the first note.
    pub fn prev<S: KeyValueStorage>(&mut self, store: &mut NoteStore<S>) -> bool {
        if !self.has_prev() {
            return false;
        }
        self.index -= 1;
        self.select_current(store);
        true
    }

    /// Move forward one note, selecting it. Stays put at the last note.
    pub fn next<S: KeyValueStorage>(&mut self, store: &mut NoteStore<S>) -> bool {
        if !self.has_next() {
            return false;
        }
        self.index += 1;
        self.select_current(store);
        true
    }

    pub fn current<'a, S: KeyValueStorage>(&self, store: &'a NoteStore<S>) -> Option<&'a Note> {
        store.list().get(self.index)
    }

    fn select_current<S: KeyValueStorage>(&self, store: &mut NoteStore<S>) {
        if let Some(id) = store.list().get(self.index).map(|n| n.id.clone()) {
            store.select(&id);
        }
    }
}

impl std::fmt::Display for WallpaperBrowser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} of {}", self.index + 1, self.total)
    }
}
