use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use crate::config::NotewallConfig;
use crate::editor::{NoteEditor, SaveOutcome};
use crate::entity::{BackgroundType, Note, BACKGROUND_COLORS, TEXT_COLORS};
use crate::error::{NotewallError, Result};
use crate::export::{
    build_delivery, DeliveryKind, ExportOutcome, HostPlatform, PixelRasterizer, Surface,
    WallpaperExporter,
};
use crate::gallery::{Gallery, NoteCard, WallpaperBrowser};
use crate::notify::ConsoleNotifier;
use crate::storage::{FileStorage, NoteStore, NOTEWALL_DIR};

const NOTHING_TO_SAVE: &str = "Nothing to save: give the note a title or at least one task.";

/// Find the project root by looking for .notewall/ in the current directory
/// and its ancestors.
fn find_project_root() -> PathBuf {
    let cwd = env::current_dir().unwrap_or_else(|_| PathBuf::from("."));

    let mut current = cwd.as_path();
    loop {
        if current.join(NOTEWALL_DIR).is_dir() {
            return current.to_path_buf();
        }
        match current.parent() {
            Some(parent) => current = parent,
            None => return cwd,
        }
    }
}

fn open_store() -> Result<(PathBuf, NoteStore<FileStorage>)> {
    let root = find_project_root();
    let storage = FileStorage::open(&root)?;
    debug!("Opened notewall project at {}", root.display());
    Ok((root, NoteStore::load_all(storage)))
}

fn parse_background_type(value: &str) -> Result<BackgroundType> {
    value.parse().map_err(NotewallError::InvalidValue)
}

fn note_line(position: usize, note: &Note, selected: bool) -> String {
    let marker = if selected { "*" } else { " " };
    format!(
        "{} {:>3} ({}) {} [{} task{}]",
        marker,
        position,
        note.short_id(),
        note.display_title(),
        note.tasks.len(),
        if note.tasks.len() == 1 { "" } else { "s" }
    )
}

fn position_of<S: crate::storage::KeyValueStorage>(store: &NoteStore<S>, id: &str) -> usize {
    store
        .list()
        .iter()
        .position(|n| n.id == id)
        .map(|i| i + 1)
        .unwrap_or(0)
}

pub fn handle_init() -> Result<()> {
    let root = env::current_dir()?;

    let storage = FileStorage::init(&root)?;
    NotewallConfig::default().save(storage.dir())?;

    println!("Initialized notewall project in {}", root.display());
    Ok(())
}

pub fn handle_add(
    title: Option<String>,
    tasks: Vec<String>,
    background: Option<String>,
    text: Option<String>,
    background_type: Option<String>,
    json: bool,
) -> Result<()> {
    let (_, mut store) = open_store()?;

    let mut editor = NoteEditor::new();
    if let Some(title) = title {
        editor.set_title(title);
    }
    for task in tasks {
        editor.push_task(task);
    }
    if let Some(color) = background {
        editor.set_background_color(&color);
    }
    if let Some(color) = text {
        editor.set_text_color(&color);
    }
    if let Some(kind) = background_type {
        editor.set_background_type(parse_background_type(&kind)?);
    }

    match editor.save(&mut store) {
        SaveOutcome::Created(note) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&note)?);
            } else {
                println!(
                    "Created note {} ({}) - {}",
                    store.len(),
                    note.short_id(),
                    note.display_title()
                );
            }
        }
        SaveOutcome::Updated(_) | SaveOutcome::Rejected => {
            eprintln!("{}", NOTHING_TO_SAVE);
        }
    }

    Ok(())
}

pub fn handle_list(json: bool) -> Result<()> {
    let (_, store) = open_store()?;

    if json {
        println!("{}", serde_json::to_string_pretty(store.list())?);
        return Ok(());
    }

    let cards = Gallery::new().cards(&store);
    if cards.is_empty() {
        println!("No notes found.");
        return Ok(());
    }

    println!("Notes:\n");
    for (i, (note, card)) in store.list().iter().zip(cards.iter()).enumerate() {
        let selected = store.selected_id() == Some(note.id.as_str());
        println!("{}", note_line(i + 1, note, selected));
        print_card_tasks(card);
    }

    Ok(())
}

fn print_card_tasks(card: &NoteCard) {
    for task in &card.preview_tasks {
        println!("        ○ {}", task);
    }
    if card.more_tasks > 0 {
        println!("        +{} more", card.more_tasks);
    }
}

pub fn handle_show(id: String, json: bool) -> Result<()> {
    let (_, store) = open_store()?;
    let note = store.resolve(&id)?;

    if json {
        println!("{}", serde_json::to_string_pretty(note)?);
        return Ok(());
    }

    println!("Note {} ({})", position_of(&store, &note.id), note.id);
    println!("Title: {}", note.display_title());
    println!(
        "Background: {} ({})",
        note.background_color, note.background_type
    );
    println!("Text: {}", note.text_color);
    println!("Created: {}", note.created_at.format("%Y-%m-%d %H:%M"));
    println!("Updated: {}", note.updated_at.format("%Y-%m-%d %H:%M"));
    if store.selected_id() == Some(note.id.as_str()) {
        println!("Selected for export");
    }
    if !note.tasks.is_empty() {
        println!();
        for (i, task) in note.tasks.iter().enumerate() {
            println!("  {}. {}", i + 1, task);
        }
    }

    Ok(())
}

/// Parse `N=TEXT` into a 0-based position and its text.
fn parse_task_assignment(value: &str) -> Result<(usize, String)> {
    let (n, text) = value
        .split_once('=')
        .ok_or_else(|| NotewallError::InvalidValue(format!("expected N=TEXT, got '{}'", value)))?;
    let n: usize = n
        .trim()
        .parse()
        .map_err(|_| NotewallError::InvalidValue(format!("invalid task number '{}'", n)))?;
    match n.checked_sub(1) {
        Some(index) => Ok((index, text.to_string())),
        None => Err(NotewallError::InvalidValue(
            "task numbers start at 1".to_string(),
        )),
    }
}

/// Apply `--set-task` and `--remove-task` edits, all addressed by 1-based
/// positions in the task list as it was before this edit. Non-blank texts are
/// written first; blank texts and removals are then dropped together, highest
/// position first. Returns the positions that did not exist.
fn apply_task_edits(
    editor: &mut NoteEditor,
    assignments: Vec<(usize, String)>,
    removals: Vec<usize>,
) -> Vec<usize> {
    let len = editor.tasks().len();
    let mut skipped = Vec::new();
    let mut doomed = Vec::new();

    for (index, text) in assignments {
        if index >= len {
            skipped.push(index + 1);
        } else if text.trim().is_empty() {
            doomed.push(index);
        } else {
            editor.update_task(index, text);
        }
    }
    for n in removals {
        match n.checked_sub(1).filter(|i| *i < len) {
            Some(index) => doomed.push(index),
            None => skipped.push(n),
        }
    }

    doomed.sort_unstable_by(|a, b| b.cmp(a));
    doomed.dedup();
    for index in doomed {
        editor.remove_task(index);
    }
    skipped
}

#[allow(clippy::too_many_arguments)]
pub fn handle_edit(
    id: String,
    title: Option<String>,
    tasks: Vec<String>,
    set_tasks: Vec<String>,
    add_tasks: Vec<String>,
    remove_tasks: Vec<usize>,
    background: Option<String>,
    text: Option<String>,
    background_type: Option<String>,
    json: bool,
) -> Result<()> {
    let (_, mut store) = open_store()?;
    let note_id = store.resolve(&id)?.id.clone();

    let mut gallery = Gallery::new();
    let mut editor = gallery
        .begin_edit(&store, &note_id)
        .ok_or_else(|| NotewallError::NoteNotFound(id.clone()))?;

    if let Some(title) = title {
        editor.set_title(title);
    }
    if !tasks.is_empty() {
        editor.clear_tasks();
        for task in tasks {
            editor.push_task(task);
        }
    }
    let assignments = set_tasks
        .iter()
        .map(|a| parse_task_assignment(a))
        .collect::<Result<Vec<_>>>()?;
    for n in apply_task_edits(&mut editor, assignments, remove_tasks) {
        eprintln!("Warning: no task {}, skipping", n);
    }

    for task in add_tasks {
        editor.push_task(task);
    }
    if let Some(color) = background {
        editor.set_background_color(&color);
    }
    if let Some(color) = text {
        editor.set_text_color(&color);
    }
    if let Some(kind) = background_type {
        editor.set_background_type(parse_background_type(&kind)?);
    }

    let outcome = editor.save(&mut store);
    gallery.finish_edit();

    match outcome {
        SaveOutcome::Updated(note) | SaveOutcome::Created(note) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&note)?);
            } else {
                println!(
                    "Updated note {} ({}) - {}",
                    position_of(&store, &note.id),
                    note.short_id(),
                    note.display_title()
                );
            }
        }
        SaveOutcome::Rejected => eprintln!("{}", NOTHING_TO_SAVE),
    }

    Ok(())
}

pub fn handle_delete(id: String, force: bool) -> Result<()> {
    let (_, mut store) = open_store()?;
    let note = store.resolve(&id)?.clone();
    let position = position_of(&store, &note.id);

    // Confirm deletion unless --force is used
    if !force {
        eprintln!(
            "Delete note {} ({}) - {}? [y/N] ",
            position,
            note.short_id(),
            note.display_title()
        );

        if atty::is(atty::Stream::Stdin) {
            let mut input = String::new();
            io::stdin().read_line(&mut input)?;
            if !input.trim().eq_ignore_ascii_case("y") {
                println!("Cancelled.");
                return Ok(());
            }
        } else {
            return Err(NotewallError::InvalidValue(
                "Use --force to delete in non-interactive mode".to_string(),
            ));
        }
    }

    Gallery::new().delete(&mut store, &note.id);

    println!(
        "Deleted note {} ({}) - {}",
        position,
        note.short_id(),
        note.display_title()
    );

    Ok(())
}

pub fn handle_select(id: Option<String>, clear: bool) -> Result<()> {
    let (_, mut store) = open_store()?;

    if clear {
        store.clear_selection();
        println!("Selection cleared.");
        return Ok(());
    }

    let Some(id) = id else {
        return Err(NotewallError::InvalidValue(
            "a note id or --clear is required".to_string(),
        ));
    };
    let note_id = store.resolve(&id)?.id.clone();
    let position = position_of(&store, &note_id);
    let note = Gallery::new()
        .open_for_export(&mut store, &note_id)
        .ok_or(NotewallError::NoteNotFound(id))?;

    println!(
        "Selected note {} ({}) - {}",
        position,
        note.short_id(),
        note.display_title()
    );
    Ok(())
}

/// The explicit note, else the current one, else the first.
fn export_target(store: &mut NoteStore<FileStorage>, id: Option<&str>) -> Result<Note> {
    if let Some(id) = id {
        let note_id = store.resolve(id)?.id.clone();
        return Gallery::new()
            .open_for_export(store, &note_id)
            .ok_or_else(|| NotewallError::NoteNotFound(id.to_string()));
    }
    store
        .current()
        .or_else(|| store.list().first())
        .cloned()
        .ok_or_else(|| {
            NotewallError::InvalidValue(
                "No notes to export. Create one with 'notewall add'.".to_string(),
            )
        })
}

fn export_output_dir(root: &Path, config: &NotewallConfig, output: Option<PathBuf>) -> PathBuf {
    output.unwrap_or_else(|| config.output_path(root))
}

pub fn handle_export(
    id: Option<String>,
    download: bool,
    open: bool,
    output: Option<PathBuf>,
    scale: Option<u32>,
    json: bool,
    quiet: bool,
) -> Result<()> {
    let (root, mut store) = open_store()?;
    let config = NotewallConfig::load(store.storage().dir()).apply_env();

    let note = export_target(&mut store, id.as_deref())?;

    let kind = if download {
        DeliveryKind::Download
    } else if open {
        DeliveryKind::Open
    } else {
        config.delivery
    };
    let output_dir = export_output_dir(&root, &config, output);
    let mut settings = config.export_settings();
    if let Some(scale) = scale {
        settings.scale = scale;
    }

    let delivery = build_delivery(kind, &HostPlatform, &output_dir, config.viewer.clone());
    let notifier = Arc::new(ConsoleNotifier {
        quiet: quiet || json,
    });
    let exporter = WallpaperExporter::new(PixelRasterizer, delivery, notifier, settings);
    let surface = Surface::for_note(&note);

    let runtime = tokio::runtime::Runtime::new()?;
    let outcome = runtime.block_on(async {
        let outcome = exporter.export(Some(&surface), &note).await;
        // Let the staged file's delayed release run before the runtime goes away.
        tokio::time::sleep(settings.release_delay).await;
        outcome
    });

    match outcome {
        ExportOutcome::Delivered(delivered) => {
            if json {
                let value = serde_json::json!({
                    "id": note.id,
                    "path": delivered.path,
                    "method": delivered.method,
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
            Ok(())
        }
        ExportOutcome::AlreadyRunning => Ok(()),
        ExportOutcome::Failed(e) => Err(e.into()),
    }
}

pub fn handle_browse(id: Option<String>, next: bool, prev: bool, json: bool) -> Result<()> {
    let (_, mut store) = open_store()?;

    if let Some(id) = id {
        let note_id = store.resolve(&id)?.id.clone();
        store.select(&note_id);
    }

    let Some(mut browser) = WallpaperBrowser::start(&store) else {
        if json {
            println!("null");
        } else {
            println!("No notes found.");
        }
        return Ok(());
    };

    if next && !browser.next(&mut store) {
        eprintln!("Already at the last note.");
    }
    if prev && !browser.prev(&mut store) {
        eprintln!("Already at the first note.");
    }

    let notes = store.list();
    let Some(note) = browser.current(&store) else {
        return Ok(());
    };
    let prev_note = browser.index().checked_sub(1).and_then(|i| notes.get(i));
    let next_note = notes.get(browser.index() + 1);

    if json {
        let value = serde_json::json!({
            "position": browser.index() + 1,
            "total": browser.total(),
            "note": note,
            "prev": prev_note.map(|n| n.id.as_str()),
            "next": next_note.map(|n| n.id.as_str()),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Wallpaper {}", browser);
    println!();
    println!("  {}", note.display_title());
    for task in &note.tasks {
        println!("    ○ {}", task);
    }
    println!();
    if let Some(p) = prev_note {
        println!("  prev: {} ({})", p.short_id(), p.display_title());
    }
    if let Some(n) = next_note {
        println!("  next: {} ({})", n.short_id(), n.display_title());
    }

    Ok(())
}

pub fn handle_palette(json: bool) -> Result<()> {
    if json {
        let swatches = |palette: &[crate::entity::ColorOption]| {
            palette
                .iter()
                .map(|c| serde_json::json!({ "label": c.label, "value": c.value }))
                .collect::<Vec<_>>()
        };
        let value = serde_json::json!({
            "background": swatches(BACKGROUND_COLORS),
            "text": swatches(TEXT_COLORS),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!("Background colours:");
    for c in BACKGROUND_COLORS {
        println!("  {:<14} {}", c.label, c.value);
    }
    println!("\nText colours:");
    for c in TEXT_COLORS {
        println!("  {:<14} {}", c.label, c.value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_task_assignment() {
        assert_eq!(parse_task_assignment("2=Buy milk").unwrap(), (1, "Buy milk".to_string()));
        assert_eq!(parse_task_assignment("1=").unwrap(), (0, String::new()));
        assert!(parse_task_assignment("0=x").is_err());
        assert!(parse_task_assignment("two=x").is_err());
        assert!(parse_task_assignment("no separator").is_err());
    }

    fn editor_with(tasks: &[&str]) -> NoteEditor {
        let mut editor = NoteEditor::new();
        for task in tasks {
            editor.push_task(*task);
        }
        editor
    }

    #[test]
    fn test_task_edits_use_positions_before_the_edit() {
        let mut editor = editor_with(&["a", "b", "c"]);
        let skipped = apply_task_edits(
            &mut editor,
            vec![(0, String::new()), (1, "B".to_string())],
            Vec::new(),
        );
        assert!(skipped.is_empty());
        assert_eq!(editor.tasks(), ["B", "c"]);

        let mut editor = editor_with(&["a", "b", "c"]);
        apply_task_edits(&mut editor, vec![(0, "  ".to_string())], vec![2]);
        assert_eq!(editor.tasks(), ["c"]);
    }

    #[test]
    fn test_task_edits_dedup_and_report_missing() {
        let mut editor = editor_with(&["a", "b", "c"]);
        let skipped = apply_task_edits(
            &mut editor,
            vec![(1, String::new()), (7, "x".to_string())],
            vec![2, 2, 0, 4],
        );
        assert_eq!(editor.tasks(), ["a", "c"]);
        assert_eq!(skipped, vec![8, 0, 4]);
    }

    #[test]
    fn test_note_line_marks_selection() {
        let mut store = NoteStore::load_all(crate::storage::MemoryStorage::new());
        let mut draft = crate::entity::NoteDraft::new("Groceries");
        draft.tasks = vec!["Milk".to_string()];
        let note = store.add(draft);

        let line = note_line(1, &note, true);
        assert!(line.starts_with("*   1 ("));
        assert!(line.ends_with("Groceries [1 task]"));
    }
}
