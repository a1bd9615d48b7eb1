//! Staged editing of a single note.
//!
//! A [`NoteEditor`] holds a draft (title, ordered tasks, colours) seeded from
//! defaults or from an existing note, and commits it to a [`NoteStore`] in one
//! step. Tasks are addressed by position; removing one shifts the ones after
//! it down by one.

use tracing::debug;

use crate::entity::{
    resolve_color, BackgroundType, Note, NoteDraft, NoteUpdate, BACKGROUND_COLORS, TEXT_COLORS,
};
use crate::storage::{KeyValueStorage, NoteStore};

/// Result of [`NoteEditor::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(Note),
    Updated(Note),
    /// Empty title and no non-blank tasks: nothing was written.
    Rejected,
}

#[derive(Debug, Clone, Default)]
pub struct NoteEditor {
    draft: NoteDraft,
    editing: Option<String>,
}

impl NoteEditor {
    /// Editor for a brand new note, seeded with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Editor seeded from an existing note; `save` updates it in place.
    pub fn edit(note: &Note) -> Self {
        Self {
            draft: NoteDraft::from_note(note),
            editing: Some(note.id.clone()),
        }
    }

    pub fn draft(&self) -> &NoteDraft {
        &self.draft
    }

    /// Id of the note being edited, `None` when creating.
    pub fn editing_id(&self) -> Option<&str> {
        self.editing.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.draft.title = title.into();
    }

    /// Set the background colour. Palette labels resolve to their hex value.
    pub fn set_background_color(&mut self, color: &str) {
        self.draft.background_color = resolve_color(color, BACKGROUND_COLORS);
    }

    /// Set the text colour. Palette labels resolve to their hex value.
    pub fn set_text_color(&mut self, color: &str) {
        self.draft.text_color = resolve_color(color, TEXT_COLORS);
    }

    pub fn set_background_type(&mut self, background_type: BackgroundType) {
        self.draft.background_type = background_type;
    }

    pub fn tasks(&self) -> &[String] {
        &self.draft.tasks
    }

    /// Append an empty task slot and return its position.
    pub fn add_task(&mut self) -> usize {
        self.draft.tasks.push(String::new());
        self.draft.tasks.len() - 1
    }

    /// Replace the text at `index`. Out-of-range positions are ignored.
    pub fn update_task(&mut self, index: usize, text: impl Into<String>) {
        if let Some(slot) = self.draft.tasks.get_mut(index) {
            *slot = text.into();
        }
    }

    /// Remove the task at `index`. Out-of-range positions are ignored.
    pub fn remove_task(&mut self, index: usize) -> Option<String> {
        if index < self.draft.tasks.len() {
            Some(self.draft.tasks.remove(index))
        } else {
            None
        }
    }

    /// Finish inline editing of one task: blank text removes the task,
    /// anything else replaces it.
    pub fn commit_task(&mut self, index: usize, text: &str) {
        if text.trim().is_empty() {
            self.remove_task(index);
        } else {
            self.update_task(index, text);
        }
    }

    pub fn clear_tasks(&mut self) {
        self.draft.tasks.clear();
    }

    /// Append a task with the given text in one go.
    pub fn push_task(&mut self, text: impl Into<String>) {
        let index = self.add_task();
        self.update_task(index, text);
    }

    /// Commit the draft. Blank tasks are dropped first; a draft with an empty
    /// title and no remaining tasks is refused without touching the store.
    /// After a successful create the draft resets to defaults; after an update
    /// it is left as is.
    pub fn save<S: KeyValueStorage>(&mut self, store: &mut NoteStore<S>) -> SaveOutcome {
        let tasks: Vec<String> = self
            .draft
            .tasks
            .iter()
            .filter(|t| !t.trim().is_empty())
            .cloned()
            .collect();

        if self.draft.title.trim().is_empty() && tasks.is_empty() {
            debug!("Refusing to save an empty note");
            return SaveOutcome::Rejected;
        }

        let draft = NoteDraft {
            tasks,
            ..self.draft.clone()
        };

        match &self.editing {
            Some(id) => match store.update(id, NoteUpdate::from(draft)) {
                Some(note) => SaveOutcome::Updated(note),
                // The note vanished underneath us; the store treats that as a no-op.
                None => SaveOutcome::Rejected,
            },
            None => {
                let note = store.add(draft);
                self.draft = NoteDraft::default();
                SaveOutcome::Created(note)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;

    fn store() -> NoteStore<MemoryStorage> {
        NoteStore::load_all(MemoryStorage::new())
    }

    #[test]
    fn test_groceries_blank_task_filtered() {
        let mut store = store();
        let mut editor = NoteEditor::new();
        editor.set_title("Groceries");
        editor.push_task("Milk");
        editor.push_task("Eggs");
        editor.add_task();

        let note = match editor.save(&mut store) {
            SaveOutcome::Created(note) => note,
            other => panic!("expected Created, got {:?}", other),
        };

        assert_eq!(note.title, "Groceries");
        assert_eq!(note.tasks, vec!["Milk", "Eggs"]);
        assert_eq!(note.created_at, note.updated_at);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_empty_draft_rejected() {
        let mut store = store();
        let mut editor = NoteEditor::new();
        editor.set_title("   ");
        editor.add_task();
        editor.push_task("  \t");

        assert_eq!(editor.save(&mut store), SaveOutcome::Rejected);
        assert!(store.is_empty());
    }

    #[test]
    fn test_tasks_only_note_is_saved() {
        let mut store = store();
        let mut editor = NoteEditor::new();
        editor.push_task("Just a task");

        assert!(matches!(editor.save(&mut store), SaveOutcome::Created(_)));
        assert_eq!(store.list()[0].title, "");
    }

    #[test]
    fn test_create_resets_draft() {
        let mut store = store();
        let mut editor = NoteEditor::new();
        editor.set_title("Plan");
        editor.set_background_color("cream");
        editor.set_text_color("#0D47A1");
        editor.save(&mut store);

        assert_eq!(editor.draft(), &NoteDraft::default());
    }

    #[test]
    fn test_edit_updates_existing_and_keeps_draft() {
        let mut store = store();
        let mut creator = NoteEditor::new();
        creator.set_title("Week");
        creator.push_task("Mon");
        let original = match creator.save(&mut store) {
            SaveOutcome::Created(note) => note,
            other => panic!("expected Created, got {:?}", other),
        };

        let mut editor = NoteEditor::edit(&original);
        assert_eq!(editor.editing_id(), Some(original.id.as_str()));
        editor.push_task("Tue");
        editor.set_background_color("Black");
        editor.set_text_color("white");

        let updated = match editor.save(&mut store) {
            SaveOutcome::Updated(note) => note,
            other => panic!("expected Updated, got {:?}", other),
        };

        assert_eq!(updated.id, original.id);
        assert_eq!(updated.created_at, original.created_at);
        assert_eq!(updated.tasks, vec!["Mon", "Tue"]);
        assert_eq!(updated.background_color, "#111111");
        assert_eq!(updated.text_color, "#FFFFFF");
        assert_eq!(store.len(), 1);
        assert_eq!(editor.draft().title, "Week");
    }

    #[test]
    fn test_remove_task_shifts_positions() {
        let mut editor = NoteEditor::new();
        editor.push_task("a");
        editor.push_task("b");
        editor.push_task("c");

        assert_eq!(editor.remove_task(0).as_deref(), Some("a"));
        assert_eq!(editor.tasks(), &["b", "c"]);
        editor.update_task(0, "B");
        assert_eq!(editor.tasks(), &["B", "c"]);

        assert!(editor.remove_task(5).is_none());
        editor.update_task(9, "ignored");
        assert_eq!(editor.tasks().len(), 2);
    }

    #[test]
    fn test_commit_blank_task_removes_it() {
        let mut editor = NoteEditor::new();
        editor.push_task("keep");
        editor.push_task("drop");

        editor.commit_task(1, "  ");
        editor.commit_task(0, "kept");
        assert_eq!(editor.tasks(), &["kept"]);
    }

    #[test]
    fn test_save_after_note_deleted_is_noop() {
        let mut store = store();
        let mut creator = NoteEditor::new();
        creator.set_title("Ghost");
        let note = match creator.save(&mut store) {
            SaveOutcome::Created(note) => note,
            other => panic!("expected Created, got {:?}", other),
        };

        let mut editor = NoteEditor::edit(&note);
        store.delete(&note.id);
        editor.set_title("Boo");

        assert_eq!(editor.save(&mut store), SaveOutcome::Rejected);
        assert!(store.is_empty());
    }
}
