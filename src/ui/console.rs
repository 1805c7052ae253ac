use eframe::egui::{self, RichText};

use crate::theme::Theme;

const HEADER_HEIGHT: f32 = 28.0;
const EXPANDED_HEIGHT: f32 = 150.0;
const MAX_LINES: usize = 500;

/// Collapsible bottom panel holding the in-app message log.
pub struct Console {
    expanded: bool,
    lines: Vec<String>,
}

impl Console {
    pub fn new() -> Self {
        Self {
            expanded: false,
            lines: Vec::new(),
        }
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
        if self.lines.len() > MAX_LINES {
            self.lines.remove(0);
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Current panel height, used by the layout pass above.
    pub fn height(&self) -> f32 {
        if self.expanded {
            HEADER_HEIGHT + EXPANDED_HEIGHT
        } else {
            HEADER_HEIGHT
        }
    }

    pub fn show(&mut self, ui: &mut egui::Ui, rect: egui::Rect, theme: &Theme) {
        let painter = ui.painter_at(rect);
        painter.rect_filled(rect, 0.0, theme.bg_medium.color());

        let header = egui::Rect::from_min_size(
            rect.left_top(),
            egui::Vec2::new(rect.width(), HEADER_HEIGHT),
        );
        let response = ui.allocate_rect(header, egui::Sense::click());
        if response.clicked() {
            self.expanded = !self.expanded;
        }

        painter.text(
            egui::Pos2::new(header.left() + 12.0, header.center().y),
            egui::Align2::LEFT_CENTER,
            "\u{25A3} Console",
            egui::FontId::proportional(12.0),
            theme.text_dim.color(),
        );
        let arrow = if self.expanded { "\u{25B2}" } else { "\u{25BC}" };
        painter.text(
            egui::Pos2::new(header.right() - 16.0, header.center().y),
            egui::Align2::RIGHT_CENTER,
            arrow,
            egui::FontId::proportional(12.0),
            theme.text_dim.color(),
        );

        if !self.expanded {
            return;
        }

        let body = egui::Rect::from_min_max(
            egui::Pos2::new(rect.left(), rect.top() + HEADER_HEIGHT),
            rect.right_bottom(),
        );
        let mut body_ui = ui.new_child(
            egui::UiBuilder::new()
                .max_rect(body.shrink(8.0))
                .layout(egui::Layout::top_down(egui::Align::LEFT)),
        );
        egui::ScrollArea::vertical()
            .stick_to_bottom(true)
            .show(&mut body_ui, |ui| {
                for line in &self.lines {
                    ui.label(
                        RichText::new(line)
                            .color(theme.text.color())
                            .monospace()
                            .size(12.0),
                    );
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_is_bounded() {
        let mut console = Console::new();
        for i in 0..(MAX_LINES + 50) {
            console.push(format!("line {i}"));
        }
        assert_eq!(console.lines().len(), MAX_LINES);
        assert_eq!(console.lines()[0], "line 50");
    }

    #[test]
    fn collapsed_by_default() {
        let console = Console::new();
        assert!(!console.is_expanded());
        assert_eq!(console.height(), HEADER_HEIGHT);
    }
}
