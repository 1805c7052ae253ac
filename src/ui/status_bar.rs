use eframe::egui;

use crate::editor::Document;
use crate::theme::Theme;

pub const BAR_HEIGHT: f32 = 24.0;

pub fn show(ui: &mut egui::Ui, rect: egui::Rect, doc: &Document, theme: &Theme) {
    ui.painter().rect_filled(rect, 0.0, theme.bg_light.color());
    ui.allocate_rect(rect, egui::Sense::hover());

    let file_info = match &doc.file_path {
        Some(path) => path.to_string_lossy().to_string(),
        None => doc.title.clone(),
    };
    let modified_marker = if doc.modified { " \u{25CF}" } else { "" };

    ui.painter().text(
        egui::Pos2::new(rect.left() + 12.0, rect.center().y),
        egui::Align2::LEFT_CENTER,
        format!("{file_info}{modified_marker}"),
        egui::FontId::proportional(12.0),
        theme.text.color(),
    );

    ui.painter().text(
        egui::Pos2::new(rect.right() - 12.0, rect.center().y),
        egui::Align2::RIGHT_CENTER,
        format!(
            "Ln {}, Col {}",
            doc.cursor.pos.line + 1,
            doc.cursor.pos.col + 1
        ),
        egui::FontId::proportional(12.0),
        theme.accent.color(),
    );
}
