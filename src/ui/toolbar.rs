use eframe::egui::{self, RichText};

use crate::theme::Theme;

/// Toolbar buttons in left-to-right order. Execute, Attach and Kill never
/// reach an external process; the app only reports them to the console.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolbarAction {
    Execute,
    Clear,
    Open,
    Save,
    Attach,
    Kill,
}

impl ToolbarAction {
    fn label(self) -> &'static str {
        match self {
            Self::Execute => "\u{25B6} Execute",
            Self::Clear => "\u{2715} Clear",
            Self::Open => "\u{1F4C1} Open",
            Self::Save => "\u{1F4BE} Save",
            Self::Attach => "\u{1F4CE} Attach",
            Self::Kill => "\u{2B1B} Kill",
        }
    }
}

pub fn show(ui: &mut egui::Ui, theme: &Theme) -> Option<ToolbarAction> {
    let mut clicked = None;

    ui.horizontal(|ui| {
        ui.add_space(4.0);
        for action in [
            ToolbarAction::Execute,
            ToolbarAction::Clear,
            ToolbarAction::Open,
            ToolbarAction::Save,
        ] {
            if tool_button(ui, theme, action) {
                clicked = Some(action);
            }
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            ui.add_space(4.0);
            for action in [ToolbarAction::Kill, ToolbarAction::Attach] {
                if tool_button(ui, theme, action) {
                    clicked = Some(action);
                }
            }
        });
    });

    clicked
}

fn tool_button(ui: &mut egui::Ui, theme: &Theme, action: ToolbarAction) -> bool {
    ui.add(
        egui::Button::new(
            RichText::new(action.label())
                .color(theme.text_dim.color())
                .size(12.0),
        )
        .fill(egui::Color32::TRANSPARENT)
        .rounding(egui::Rounding::same(4.0))
        .stroke(egui::Stroke::NONE),
    )
    .clicked()
}
