//! Layout of the phone-shaped wallpaper preview for one note.
//!
//! Coordinates are logical pixels; the rasterizer multiplies by its scale.

use crate::entity::Note;

pub const PREVIEW_WIDTH: u32 = 320;
/// 9:19.5 aspect ratio at the preview width.
pub const PREVIEW_HEIGHT: u32 = 693;
pub const FOOTER_TEXT: &str = "NoteWall · Daily Tasks";

const PADDING: u32 = 24;
const TITLE_SIZE: u32 = 24;
const TITLE_LINE: u32 = 32;
const TITLE_GAP: u32 = 24;
const TASK_SIZE: u32 = 18;
const TASK_LINE: u32 = 28;
const TASK_GAP: u32 = 16;
const BULLET: u32 = 20;
const BULLET_STROKE: u32 = 2;
const BULLET_GAP: u32 = 12;
const FOOTER_SIZE: u32 = 14;
const FOOTER_LINE: u32 = 20;
const FOOTER_OPACITY: f32 = 0.6;

/// Average glyph advance as a fraction of the font size.
const ADVANCE: f32 = 0.55;

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        x: i32,
        y: i32,
        width: u32,
        height: u32,
        color: String,
        opacity: f32,
    },
    /// Circle outline inscribed in the `diameter` square at (x, y).
    Ring {
        x: i32,
        y: i32,
        diameter: u32,
        stroke: u32,
        color: String,
        opacity: f32,
    },
    /// One line of text; `y` is the top of the line box.
    Text {
        x: i32,
        y: i32,
        size: u32,
        text: String,
        color: String,
        opacity: f32,
    },
}

/// A rendered visual surface: fixed size plus paint commands in draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
    pub commands: Vec<PaintCommand>,
}

impl Surface {
    /// Lay out the wallpaper preview of `note`. The background is not painted
    /// here; it is the fill the rasterizer applies behind the capture.
    pub fn for_note(note: &Note) -> Self {
        let color = note.text_color.clone();
        let content_width = PREVIEW_WIDTH - PADDING * 2;
        let mut commands = Vec::new();
        let mut y = PADDING;

        if !note.title.is_empty() {
            for line in wrap_text(&note.title, content_width, TITLE_SIZE) {
                commands.push(PaintCommand::Text {
                    x: PADDING as i32,
                    y: y as i32,
                    size: TITLE_SIZE,
                    text: line,
                    color: color.clone(),
                    opacity: 1.0,
                });
                y += TITLE_LINE;
            }
            y += TITLE_GAP;
        }

        let text_x = PADDING + BULLET + BULLET_GAP;
        let text_width = PREVIEW_WIDTH - text_x - PADDING;
        for task in &note.tasks {
            commands.push(PaintCommand::Ring {
                x: PADDING as i32,
                y: (y + (TASK_LINE - BULLET) / 2) as i32,
                diameter: BULLET,
                stroke: BULLET_STROKE,
                color: color.clone(),
                opacity: 1.0,
            });
            for line in wrap_text(task, text_width, TASK_SIZE) {
                commands.push(PaintCommand::Text {
                    x: text_x as i32,
                    y: y as i32,
                    size: TASK_SIZE,
                    text: line,
                    color: color.clone(),
                    opacity: 1.0,
                });
                y += TASK_LINE;
            }
            y += TASK_GAP;
        }

        let footer_width = text_width_px(FOOTER_TEXT, FOOTER_SIZE);
        commands.push(PaintCommand::Text {
            x: (PREVIEW_WIDTH.saturating_sub(footer_width) / 2) as i32,
            y: (PREVIEW_HEIGHT - PADDING - FOOTER_LINE) as i32,
            size: FOOTER_SIZE,
            text: FOOTER_TEXT.to_string(),
            color,
            opacity: FOOTER_OPACITY,
        });

        Self {
            width: PREVIEW_WIDTH,
            height: PREVIEW_HEIGHT,
            commands,
        }
    }
}

/// Width in logical pixels of `text` at `size`.
pub fn text_width_px(text: &str, size: u32) -> u32 {
    (text.chars().count() as f32 * size as f32 * ADVANCE).ceil() as u32
}

/// Greedy word wrap into lines no wider than `width` at `size`.
/// A single word longer than a line is kept whole and clipped when painted.
pub fn wrap_text(text: &str, width: u32, size: u32) -> Vec<String> {
    let per_line = ((width as f32 / (size as f32 * ADVANCE)).floor() as usize).max(1);
    let mut lines = Vec::new();
    let mut cur = String::new();

    for word in text.split_whitespace() {
        let needed = cur.chars().count() + word.chars().count() + usize::from(!cur.is_empty());
        if needed > per_line && !cur.is_empty() {
            lines.push(std::mem::take(&mut cur));
        }
        if !cur.is_empty() {
            cur.push(' ');
        }
        cur.push_str(word);
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::BackgroundType;
    use chrono::Utc;

    fn note(title: &str, tasks: &[&str]) -> Note {
        let now = Utc::now();
        Note {
            id: "n1".to_string(),
            title: title.to_string(),
            tasks: tasks.iter().map(|t| t.to_string()).collect(),
            background_color: "#FFFFFF".to_string(),
            text_color: "#333333".to_string(),
            background_type: BackgroundType::Color,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_wrap_text_breaks_on_words() {
        let lines = wrap_text("buy milk and eggs and bread", 60, 10);
        // 60 / 5.5 -> 10 chars per line
        assert_eq!(lines, vec!["buy milk", "and eggs", "and bread"]);
    }

    #[test]
    fn test_wrap_text_keeps_long_word_whole() {
        let lines = wrap_text("supercalifragilistic", 30, 10);
        assert_eq!(lines, vec!["supercalifragilistic"]);
        assert!(wrap_text("   ", 100, 10).is_empty());
    }

    #[test]
    fn test_layout_has_title_bullets_and_footer() {
        let surface = Surface::for_note(&note("Groceries", &["Milk", "Eggs"]));
        assert_eq!((surface.width, surface.height), (320, 693));

        let rings = surface
            .commands
            .iter()
            .filter(|c| matches!(c, PaintCommand::Ring { .. }))
            .count();
        assert_eq!(rings, 2);

        match surface.commands.first() {
            Some(PaintCommand::Text { text, size, .. }) => {
                assert_eq!(text, "Groceries");
                assert_eq!(*size, TITLE_SIZE);
            }
            other => panic!("expected title text, got {:?}", other),
        }
        match surface.commands.last() {
            Some(PaintCommand::Text { text, opacity, .. }) => {
                assert_eq!(text, FOOTER_TEXT);
                assert!((*opacity - 0.6).abs() < f32::EPSILON);
            }
            other => panic!("expected footer text, got {:?}", other),
        }
    }

    #[test]
    fn test_layout_without_title_starts_with_task() {
        let surface = Surface::for_note(&note("", &["Only task"]));
        assert!(matches!(
            surface.commands.first(),
            Some(PaintCommand::Ring { y, .. }) if *y == (PADDING + 4) as i32
        ));
    }
}
