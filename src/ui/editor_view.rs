use eframe::egui::{self, FontId, Pos2, Rect, Sense, Stroke, Vec2};

use crate::editor::{Document, INDENT_WIDTH, LINE_HEIGHT};
use crate::syntax::{Lexer, Token};
use crate::theme::Theme;
use crate::ui::minimap::Viewport;
use arboard::Clipboard;

const FONT_SIZE: f32 = 14.0;
const GUTTER_PADDING: f32 = 16.0;
const TEXT_LEFT_PAD: f32 = 4.0;

/// Per-tab classification cache. The classifier is pure, so tokens only
/// need recomputing when the document revision moves. Refreshed after input
/// handling and before painting, keeping offsets and text in step.
pub struct HighlightCache {
    doc_index: usize,
    revision: u64,
    lines: Vec<Vec<Token>>,
}

impl HighlightCache {
    pub fn new() -> Self {
        Self {
            doc_index: usize::MAX,
            revision: 0,
            lines: Vec::new(),
        }
    }

    pub fn refresh(&mut self, doc_index: usize, doc: &Document, lexer: &Lexer) {
        if self.doc_index == doc_index && self.revision == doc.revision() {
            return;
        }
        self.lines = (0..doc.line_count())
            .map(|i| lexer.classify_line(&doc.line_text(i), 0))
            .collect();
        self.doc_index = doc_index;
        self.revision = doc.revision();
    }

    pub fn lines(&self) -> &[Vec<Token>] {
        &self.lines
    }
}

pub struct EditorMetrics {
    pub char_width: f32,
    pub line_height: f32,
    pub gutter_width: f32,
    pub font_id: FontId,
}

impl EditorMetrics {
    pub fn compute(ui: &egui::Ui, line_count: usize) -> Self {
        let font_id = FontId::monospace(FONT_SIZE);
        let char_width = ui.fonts(|f| {
            let galley = f.layout_no_wrap("M".to_string(), font_id.clone(), egui::Color32::WHITE);
            galley.size().x
        });
        let digits = format!("{}", line_count).len().max(3);
        let gutter_width = char_width * digits as f32 + GUTTER_PADDING * 2.0;

        Self {
            char_width,
            line_height: LINE_HEIGHT,
            gutter_width,
            font_id,
        }
    }
}

/// Render the editor area and handle its input. Returns whether the content
/// changed and the viewport (for the minimap thumb).
#[allow(clippy::too_many_arguments)]
pub fn show(
    ui: &mut egui::Ui,
    doc: &mut Document,
    doc_index: usize,
    clipboard: &mut Option<Clipboard>,
    lexer: &Lexer,
    cache: &mut HighlightCache,
    theme: &Theme,
    auto_focus: bool,
) -> (bool, Viewport) {
    let mut changed = false;
    let metrics = EditorMetrics::compute(ui, doc.line_count());
    let available = ui.available_rect_before_wrap();

    ui.painter().rect_filled(available, 0.0, theme.bg_dark.color());

    let response = ui.allocate_rect(available, Sense::click_and_drag());
    if response.clicked() || response.dragged() || auto_focus {
        ui.memory_mut(|m| m.request_focus(response.id));
    }
    let has_focus = ui.memory(|m| m.has_focus(response.id));

    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let (line, col) = screen_to_editor_pos(pos, &available, &metrics, doc);
            doc.set_cursor(line, col);
        }
    }
    if response.dragged() {
        if let Some(pos) = response.interact_pointer_pos() {
            let (line, col) = screen_to_editor_pos(pos, &available, &metrics, doc);
            doc.drag_cursor_to(line, col);
        }
    }

    let scroll_delta = ui.input(|i| i.smooth_scroll_delta.y);
    if scroll_delta != 0.0 {
        doc.scroll_y = (doc.scroll_y - scroll_delta).max(0.0);
        let max_scroll =
            (doc.line_count() as f32 * metrics.line_height - available.height()).max(0.0);
        doc.scroll_y = doc.scroll_y.min(max_scroll);
    }

    if has_focus {
        changed = handle_keyboard(ui, doc, clipboard);
    }

    cache.refresh(doc_index, doc, lexer);
    render_lines(ui, &available, doc, &metrics, cache.lines(), theme);

    // Keep the cursor on screen after movement or edits.
    let cursor_y = doc.cursor.pos.line as f32 * metrics.line_height;
    if cursor_y < doc.scroll_y {
        doc.scroll_y = cursor_y;
    } else if cursor_y + metrics.line_height > doc.scroll_y + available.height() {
        doc.scroll_y = cursor_y + metrics.line_height - available.height();
    }

    let first_line = (doc.scroll_y / metrics.line_height).floor() as usize;
    let visible_lines = ((available.height() / metrics.line_height).floor() as usize).max(1);
    (
        changed,
        Viewport {
            first_line,
            visible_lines,
        },
    )
}

fn screen_to_editor_pos(
    screen_pos: Pos2,
    rect: &Rect,
    metrics: &EditorMetrics,
    doc: &Document,
) -> (usize, usize) {
    let rel_y = screen_pos.y - rect.top() + doc.scroll_y;
    let rel_x = screen_pos.x - rect.left() - metrics.gutter_width - TEXT_LEFT_PAD + doc.scroll_x;

    let line = (rel_y / metrics.line_height).floor().max(0.0) as usize;
    let line = line.min(doc.line_count().saturating_sub(1));

    let col = (rel_x / metrics.char_width).round().max(0.0) as usize;
    let col = col.min(doc.line_text(line).chars().count());

    (line, col)
}

fn handle_keyboard(ui: &mut egui::Ui, doc: &mut Document, clipboard: &mut Option<Clipboard>) -> bool {
    let mut changed = false;
    let events: Vec<egui::Event> = ui.input(|i| i.events.clone());
    let time = ui.input(|i| i.time);

    for event in &events {
        match event {
            egui::Event::Text(text) => {
                let ctrl = ui.input(|i| i.modifiers.command);
                if !ctrl {
                    doc.insert_text(text);
                    changed = true;
                }
            }
            egui::Event::Key {
                key,
                pressed: true,
                modifiers,
                ..
            } => {
                let shift = modifiers.shift;
                let ctrl = modifiers.command;

                match key {
                    egui::Key::Backspace => {
                        doc.backspace();
                        changed = true;
                    }
                    egui::Key::Delete => {
                        doc.delete_forward();
                        changed = true;
                    }
                    egui::Key::Enter => {
                        doc.insert_newline();
                        changed = true;
                    }
                    egui::Key::Tab => {
                        doc.insert_tab();
                        changed = true;
                    }
                    egui::Key::ArrowLeft => doc.move_left(shift),
                    egui::Key::ArrowRight => doc.move_right(shift),
                    egui::Key::ArrowUp => doc.move_up(shift),
                    egui::Key::ArrowDown => doc.move_down(shift),
                    egui::Key::Home if ctrl => doc.move_to_start(shift),
                    egui::Key::End if ctrl => doc.move_to_end(shift),
                    egui::Key::Home => doc.move_home(shift),
                    egui::Key::End => doc.move_end(shift),
                    egui::Key::PageUp | egui::Key::PageDown => {
                        let visible = (ui.available_height() / LINE_HEIGHT) as usize;
                        doc.move_page(shift, visible.max(1), *key == egui::Key::PageDown);
                    }
                    egui::Key::A if ctrl => doc.select_all(),
                    egui::Key::C if ctrl => {
                        if let Some(cb) = clipboard.as_mut() {
                            let _ = cb.set_text(doc.copy_text());
                        }
                    }
                    egui::Key::X if ctrl => {
                        if let Some(cb) = clipboard.as_mut() {
                            let _ = cb.set_text(doc.cut_text());
                            changed = true;
                        }
                    }
                    egui::Key::V if ctrl => {
                        if let Some(cb) = clipboard.as_mut() {
                            if let Ok(text) = cb.get_text() {
                                doc.insert_text(&text);
                                changed = true;
                            }
                        }
                    }
                    egui::Key::Z if ctrl && shift => {
                        doc.redo();
                        changed = true;
                    }
                    egui::Key::Z if ctrl => {
                        doc.undo();
                        changed = true;
                    }
                    egui::Key::Y if ctrl => {
                        doc.redo();
                        changed = true;
                    }
                    egui::Key::Escape => doc.clear_selection(),
                    _ => {}
                }
            }
            _ => {}
        }
    }

    if changed {
        doc.last_edit_time = time;
    }

    changed
}

fn render_lines(
    ui: &egui::Ui,
    rect: &Rect,
    doc: &Document,
    metrics: &EditorMetrics,
    line_tokens: &[Vec<Token>],
    theme: &Theme,
) {
    let painter = ui.painter_at(*rect);
    let time = ui.input(|i| i.time);

    let since_edit = time - doc.last_edit_time;
    let cursor_visible = since_edit < 0.5 || ((since_edit * 2.0) as u64 % 2 == 0);

    let first_line = (doc.scroll_y / metrics.line_height).floor() as usize;
    let visible_count = (rect.height() / metrics.line_height).ceil() as usize + 1;
    let last_line = (first_line + visible_count).min(doc.line_count());

    let active_line = doc.cursor.pos.line;

    // Gutter background and separator.
    let gutter_rect = Rect::from_min_size(
        rect.left_top(),
        Vec2::new(metrics.gutter_width, rect.height()),
    );
    painter.rect_filled(gutter_rect, 0.0, theme.gutter_bg.color());
    painter.line_segment(
        [
            Pos2::new(rect.left() + metrics.gutter_width, rect.top()),
            Pos2::new(rect.left() + metrics.gutter_width, rect.bottom()),
        ],
        Stroke::new(1.0, theme.bg_light.color()),
    );

    let text_x_base = rect.left() + metrics.gutter_width + TEXT_LEFT_PAD - doc.scroll_x;

    for line_idx in first_line..last_line {
        let y = rect.top() + (line_idx as f32) * metrics.line_height - doc.scroll_y;

        if line_idx == active_line {
            let line_rect = Rect::from_min_size(
                Pos2::new(rect.left() + metrics.gutter_width, y),
                Vec2::new(rect.width() - metrics.gutter_width, metrics.line_height),
            );
            painter.rect_filled(line_rect, 0.0, theme.active_line_bg.color());
        }

        let ln_color = if line_idx == active_line {
            theme.line_number_active.color()
        } else {
            theme.line_number.color()
        };
        painter.text(
            Pos2::new(
                rect.left() + metrics.gutter_width - GUTTER_PADDING / 2.0,
                y + metrics.line_height / 2.0,
            ),
            egui::Align2::RIGHT_CENTER,
            format!("{}", line_idx + 1),
            metrics.font_id.clone(),
            ln_color,
        );

        let line_text = doc.line_text(line_idx);

        // Indent guides: one faint line per full indent step below the
        // line's own indentation.
        let indent = line_text.chars().take_while(|c| c.is_whitespace()).count();
        let mut guide = INDENT_WIDTH;
        while guide < indent {
            let gx = text_x_base + guide as f32 * metrics.char_width;
            painter.line_segment(
                [Pos2::new(gx, y), Pos2::new(gx, y + metrics.line_height)],
                Stroke::new(1.0, theme.indent_guide.color()),
            );
            guide += INDENT_WIDTH;
        }

        if let Some((sel_start, sel_end)) = doc.cursor.selection() {
            draw_selection(&painter, rect, line_idx, sel_start, sel_end, metrics, doc, theme);
        }

        // Line text, one paint call per classified token.
        match line_tokens.get(line_idx) {
            Some(tokens) if !tokens.is_empty() => {
                let mut col = 0usize;
                for token in tokens {
                    let run = &line_text[token.start..token.end()];
                    let width = run.chars().count();
                    if !run.trim().is_empty() {
                        painter.text(
                            Pos2::new(
                                text_x_base + col as f32 * metrics.char_width,
                                y + metrics.line_height / 2.0,
                            ),
                            egui::Align2::LEFT_CENTER,
                            run,
                            metrics.font_id.clone(),
                            theme.token_color(token.kind),
                        );
                    }
                    col += width;
                }
            }
            _ => {
                if !line_text.is_empty() {
                    painter.text(
                        Pos2::new(text_x_base, y + metrics.line_height / 2.0),
                        egui::Align2::LEFT_CENTER,
                        &line_text,
                        metrics.font_id.clone(),
                        theme.text.color(),
                    );
                }
            }
        }

        if cursor_visible && doc.cursor.pos.line == line_idx {
            let cx = text_x_base + doc.cursor.pos.col as f32 * metrics.char_width;
            let cursor_rect = Rect::from_min_size(
                Pos2::new(cx, y + 1.0),
                Vec2::new(2.0, metrics.line_height - 2.0),
            );
            painter.rect_filled(cursor_rect, 0.0, theme.cursor.color());
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn draw_selection(
    painter: &egui::Painter,
    rect: &Rect,
    line_idx: usize,
    sel_start: crate::editor::Position,
    sel_end: crate::editor::Position,
    metrics: &EditorMetrics,
    doc: &Document,
    theme: &Theme,
) {
    if line_idx < sel_start.line || line_idx > sel_end.line {
        return;
    }

    let y = rect.top() + line_idx as f32 * metrics.line_height - doc.scroll_y;
    let text_x = rect.left() + metrics.gutter_width + TEXT_LEFT_PAD;

    let start_col = if line_idx == sel_start.line {
        sel_start.col
    } else {
        0
    };
    let end_col = if line_idx == sel_end.line {
        sel_end.col
    } else {
        doc.line_text(line_idx).chars().count()
    };

    if start_col >= end_col && line_idx == sel_start.line && line_idx == sel_end.line {
        return;
    }

    let x1 = text_x + start_col as f32 * metrics.char_width - doc.scroll_x;
    let x2 = text_x + end_col as f32 * metrics.char_width - doc.scroll_x;

    painter.rect_filled(
        Rect::from_min_size(Pos2::new(x1, y), Vec2::new(x2 - x1, metrics.line_height)),
        0.0,
        theme.selection_bg(),
    );
}
