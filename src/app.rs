use arboard::Clipboard;
use eframe::egui;
use tracing::{info, warn};

use crate::config::Config;
use crate::editor::Document;
use crate::syntax::Lexer;
use crate::theme::Theme;
use crate::ui::console::Console;
use crate::ui::editor_view::{self, HighlightCache};
use crate::ui::minimap;
use crate::ui::toolbar::{self, ToolbarAction};
use crate::ui::status_bar;

const DEFAULT_CONTENT: &str = "print(\"Hello World\")";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum NavView {
    Editor,
    Scripts,
    Settings,
    Profile,
}

impl NavView {
    const ALL: [NavView; 4] = [
        NavView::Editor,
        NavView::Scripts,
        NavView::Settings,
        NavView::Profile,
    ];

    fn label(self) -> &'static str {
        match self {
            NavView::Editor => "</> Editor",
            NavView::Scripts => "\u{25C7} Scripts",
            NavView::Settings => "\u{2699} Settings",
            NavView::Profile => "\u{1F464} Profile",
        }
    }
}

pub struct VertexApp {
    docs: Vec<Document>,
    active: usize,
    file_counter: usize,
    lexer: Lexer,
    theme: Theme,
    console: Console,
    clipboard: Option<Clipboard>,
    nav: NavView,
    cache: HighlightCache,
    /// If Some, show a "save before closing?" dialog for this tab index.
    confirm_close: Option<usize>,
}

impl VertexApp {
    pub fn new(config: Config) -> Self {
        let mut doc = Document::with_text("untitled1.lua", DEFAULT_CONTENT);
        doc.move_to_end(false);
        Self {
            docs: vec![doc],
            active: 0,
            file_counter: 2,
            lexer: Lexer::new(config.language.to_spec()),
            theme: config.theme,
            console: Console::new(),
            clipboard: Clipboard::new().ok(),
            nav: NavView::Editor,
            cache: HighlightCache::new(),
            confirm_close: None,
        }
    }

    fn active_doc(&mut self) -> &mut Document {
        &mut self.docs[self.active]
    }

    fn new_tab(&mut self) {
        let title = format!("untitled{}.lua", self.file_counter);
        self.file_counter += 1;
        self.docs.push(Document::new(title));
        self.active = self.docs.len() - 1;
    }

    /// Close a tab. The last remaining tab is never removed: its content is
    /// cleared instead, so the strip never reaches zero tabs.
    fn close_tab(&mut self, idx: usize) {
        if self.docs.len() <= 1 {
            self.docs[0].clear();
            return;
        }
        if self.docs[idx].modified {
            self.confirm_close = Some(idx);
        } else {
            self.force_close_tab(idx);
        }
    }

    fn force_close_tab(&mut self, idx: usize) {
        if self.docs.len() > 1 {
            self.docs.remove(idx);
            if self.active >= self.docs.len() {
                self.active = self.docs.len() - 1;
            }
        }
        self.confirm_close = None;
    }

    fn open_file(&mut self) {
        if let Some(path) = rfd::FileDialog::new().pick_file() {
            match Document::from_file(path) {
                Ok(doc) => {
                    info!(title = %doc.title, "opened file");
                    self.console.push(format!("opened {}", doc.title));
                    self.docs.push(doc);
                    self.active = self.docs.len() - 1;
                }
                Err(e) => {
                    warn!(error = %e, "failed to open file");
                    self.console.push(format!("open failed: {e}"));
                }
            }
        }
    }

    fn save_file(&mut self) {
        if self.docs[self.active].file_path.is_none() {
            self.save_file_as();
            return;
        }
        let title = self.docs[self.active].title.clone();
        match self.docs[self.active].save() {
            Ok(()) => self.console.push(format!("saved {title}")),
            Err(e) => {
                warn!(error = %e, "failed to save file");
                self.console.push(format!("save failed: {e}"));
            }
        }
    }

    fn save_file_as(&mut self) {
        if let Some(path) = rfd::FileDialog::new().save_file() {
            match self.docs[self.active].save_as(path) {
                Ok(()) => {
                    let title = self.docs[self.active].title.clone();
                    self.console.push(format!("saved {title}"));
                }
                Err(e) => {
                    warn!(error = %e, "failed to save file");
                    self.console.push(format!("save failed: {e}"));
                }
            }
        }
    }

    fn handle_action(&mut self, action: ToolbarAction) {
        match action {
            ToolbarAction::Clear => {
                self.active_doc().clear();
                self.console.push("buffer cleared");
            }
            ToolbarAction::Open => self.open_file(),
            ToolbarAction::Save => self.save_file(),
            // The domain vocabulary suggests a process-injection tool, but
            // no execution engine exists; these only report themselves.
            ToolbarAction::Execute => self.console.push("execute: no process attached"),
            ToolbarAction::Attach => self.console.push("attach: no target process"),
            ToolbarAction::Kill => self.console.push("kill: nothing running"),
        }
    }

    fn handle_global_shortcuts(&mut self, ctx: &egui::Context) {
        let (new_tab, close_tab) = ctx.input(|i| {
            let ctrl = i.modifiers.command;
            (
                ctrl && i.key_pressed(egui::Key::N),
                ctrl && i.key_pressed(egui::Key::W),
            )
        });
        if new_tab {
            self.new_tab();
        }
        if close_tab {
            self.close_tab(self.active);
        }

        // File dialogs run outside the input closure to avoid borrow issues.
        let should_open = ctx.input(|i| i.modifiers.command && i.key_pressed(egui::Key::O));
        let should_save = ctx.input(|i| {
            i.modifiers.command && !i.modifiers.shift && i.key_pressed(egui::Key::S)
        });
        let should_save_as = ctx.input(|i| {
            i.modifiers.command && i.modifiers.shift && i.key_pressed(egui::Key::S)
        });

        if should_open {
            self.open_file();
        }
        if should_save {
            self.save_file();
        }
        if should_save_as {
            self.save_file_as();
        }
    }

    fn show_nav_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.add_space(8.0);
            for view in NavView::ALL {
                let selected = view == self.nav;
                let bg = if selected {
                    self.theme.bg_light.color()
                } else {
                    egui::Color32::TRANSPARENT
                };
                let fg = if selected {
                    self.theme.accent.color()
                } else {
                    self.theme.text_dim.color()
                };
                let response = ui.add(
                    egui::Button::new(egui::RichText::new(view.label()).color(fg).size(12.0))
                        .fill(bg)
                        .rounding(egui::Rounding::same(6.0))
                        .stroke(egui::Stroke::NONE),
                );
                if response.clicked() {
                    self.nav = view;
                }
                ui.add_space(5.0);
            }
        });
    }

    fn show_tab_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.style_mut().spacing.item_spacing.x = 0.0;
            ui.add_space(8.0);

            for i in 0..self.docs.len() {
                let title = &self.docs[i].title;
                let modified = self.docs[i].modified;
                let is_active = i == self.active;

                let label = if modified {
                    format!(" \u{2630} {} \u{25CF}", title)
                } else {
                    format!(" \u{2630} {}", title)
                };

                let bg = if is_active {
                    self.theme.bg_light.color()
                } else {
                    self.theme.bg_medium.color()
                };
                let text_color = if is_active {
                    self.theme.accent.color()
                } else {
                    self.theme.text_dim.color()
                };

                let response = ui.add(
                    egui::Button::new(egui::RichText::new(&label).color(text_color).size(12.0))
                        .fill(bg)
                        .rounding(egui::Rounding {
                            nw: 4.0,
                            ne: 4.0,
                            sw: 0.0,
                            se: 0.0,
                        })
                        .stroke(egui::Stroke::new(1.0, self.theme.bg_light.color())),
                );
                if response.clicked() {
                    self.active = i;
                }
                if response.middle_clicked() {
                    self.close_tab(i);
                    break;
                }

                let x_resp = ui.add(
                    egui::Button::new(
                        egui::RichText::new("\u{00D7}")
                            .color(self.theme.text_dim.color())
                            .size(12.0),
                    )
                    .fill(bg)
                    .rounding(egui::Rounding::ZERO)
                    .stroke(egui::Stroke::NONE),
                );
                if x_resp.clicked() {
                    self.close_tab(i);
                    break;
                }

                ui.add_space(4.0);
            }

            if ui
                .add(
                    egui::Button::new(
                        egui::RichText::new(" + ")
                            .color(self.theme.text_dim.color())
                            .size(12.0),
                    )
                    .fill(self.theme.bg_medium.color())
                    .rounding(egui::Rounding::same(4.0)),
                )
                .clicked()
            {
                self.new_tab();
            }
        });
    }

    fn show_workspace(&mut self, ui: &mut egui::Ui) {
        let available = ui.available_rect_before_wrap();
        let console_height = self.console.height();
        let content_bottom = available.bottom() - status_bar::BAR_HEIGHT - console_height;

        let editor_rect = egui::Rect::from_min_max(
            available.min,
            egui::Pos2::new(available.max.x - minimap::PANEL_WIDTH, content_bottom),
        );
        let minimap_rect = egui::Rect::from_min_max(
            egui::Pos2::new(editor_rect.max.x, available.min.y),
            egui::Pos2::new(available.max.x, content_bottom),
        );
        let console_rect = egui::Rect::from_min_max(
            egui::Pos2::new(available.min.x, content_bottom),
            egui::Pos2::new(available.max.x, content_bottom + console_height),
        );
        let status_rect = egui::Rect::from_min_max(
            egui::Pos2::new(available.min.x, console_rect.max.y),
            available.max,
        );

        let mut editor_ui = ui.new_child(
            egui::UiBuilder::new()
                .max_rect(editor_rect)
                .layout(egui::Layout::top_down(egui::Align::LEFT)),
        );
        let auto_focus = self.confirm_close.is_none();
        let (_, viewport) = editor_view::show(
            &mut editor_ui,
            &mut self.docs[self.active],
            self.active,
            &mut self.clipboard,
            &self.lexer,
            &mut self.cache,
            &self.theme,
            auto_focus,
        );

        minimap::show(
            ui,
            minimap_rect,
            &self.docs[self.active],
            &self.lexer,
            &self.theme,
            viewport,
        );

        self.console.show(ui, console_rect, &self.theme);
        status_bar::show(ui, status_rect, &self.docs[self.active], &self.theme);
    }

    fn show_placeholder(&self, ui: &mut egui::Ui, view: NavView) {
        let rect = ui.available_rect_before_wrap();
        ui.painter().text(
            rect.center(),
            egui::Align2::CENTER_CENTER,
            format!("{} has nothing to show yet", view.label()),
            egui::FontId::proportional(14.0),
            self.theme.text_dim.color(),
        );
    }
}

impl eframe::App for VertexApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        ctx.set_visuals(egui::Visuals::dark());

        self.handle_global_shortcuts(ctx);

        egui::CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_dark.color())
                    .inner_margin(egui::Margin::same(0.0)),
            )
            .show(ctx, |ui| {
                self.show_nav_bar(ui);
                self.show_tab_bar(ui);
                if let Some(action) = toolbar::show(ui, &self.theme) {
                    self.handle_action(action);
                }

                match self.nav {
                    NavView::Editor => self.show_workspace(ui),
                    other => self.show_placeholder(ui, other),
                }
            });

        if let Some(tab_idx) = self.confirm_close {
            let title = self
                .docs
                .get(tab_idx)
                .map(|d| d.title.clone())
                .unwrap_or_else(|| "file".into());
            let mut close_action: Option<bool> = None;

            egui::Window::new("Unsaved Changes")
                .collapsible(false)
                .resizable(false)
                .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
                .show(ctx, |ui| {
                    ui.label(format!("\"{}\" has unsaved changes.", title));
                    ui.add_space(8.0);
                    ui.horizontal(|ui| {
                        if ui.button("Save & Close").clicked() {
                            close_action = Some(true);
                        }
                        if ui.button("Discard").clicked() {
                            close_action = Some(false);
                        }
                        if ui.button("Cancel").clicked() {
                            self.confirm_close = None;
                        }
                    });
                });

            match close_action {
                Some(true) => {
                    let _ = self.docs[tab_idx].save();
                    self.force_close_tab(tab_idx);
                }
                Some(false) => self.force_close_tab(tab_idx),
                None => {}
            }
        }

        ctx.request_repaint();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> VertexApp {
        VertexApp::new(Config::default())
    }

    #[test]
    fn starts_with_one_default_tab() {
        let a = app();
        assert_eq!(a.docs.len(), 1);
        assert_eq!(a.docs[0].title, "untitled1.lua");
        assert_eq!(a.docs[0].text(), "print(\"Hello World\")");
    }

    #[test]
    fn new_tabs_get_sequential_names() {
        let mut a = app();
        a.new_tab();
        a.new_tab();
        assert_eq!(a.docs[1].title, "untitled2.lua");
        assert_eq!(a.docs[2].title, "untitled3.lua");
        assert_eq!(a.active, 2);
    }

    #[test]
    fn closing_the_last_tab_clears_instead_of_removing() {
        let mut a = app();
        a.close_tab(0);
        assert_eq!(a.docs.len(), 1);
        assert_eq!(a.docs[0].text(), "");
    }

    #[test]
    fn closing_an_unmodified_tab_removes_it_and_clamps_active() {
        let mut a = app();
        a.new_tab();
        a.new_tab();
        a.close_tab(2);
        assert_eq!(a.docs.len(), 2);
        assert_eq!(a.active, 1);
    }

    #[test]
    fn closing_a_modified_tab_asks_first() {
        let mut a = app();
        a.new_tab();
        a.docs[1].insert_text("x");
        a.close_tab(1);
        assert_eq!(a.docs.len(), 2);
        assert_eq!(a.confirm_close, Some(1));
        a.force_close_tab(1);
        assert_eq!(a.docs.len(), 1);
        assert_eq!(a.confirm_close, None);
    }

    #[test]
    fn clear_action_empties_the_buffer_and_logs() {
        let mut a = app();
        a.handle_action(ToolbarAction::Clear);
        assert_eq!(a.docs[0].text(), "");
        assert!(a.console.lines().iter().any(|l| l.contains("cleared")));
    }

    #[test]
    fn inert_actions_only_report_to_the_console() {
        let mut a = app();
        let before = a.docs[0].text();
        for action in [
            ToolbarAction::Execute,
            ToolbarAction::Attach,
            ToolbarAction::Kill,
        ] {
            a.handle_action(action);
        }
        assert_eq!(a.docs[0].text(), before);
        assert_eq!(a.console.lines().len(), 3);
    }

    #[test]
    fn highlight_cache_follows_the_revision() {
        let mut a = app();
        a.cache.refresh(0, &a.docs[0], &a.lexer);
        assert_eq!(a.cache.lines().len(), 1);
        let keyword = a.cache.lines()[0]
            .iter()
            .find(|t| t.kind == crate::syntax::TokenKind::Keyword)
            .expect("print is in the default keyword set");
        assert_eq!(keyword.start, 0);

        a.docs[0].insert_text("\nlocal y = 1");
        a.cache.refresh(0, &a.docs[0], &a.lexer);
        assert_eq!(a.cache.lines().len(), 2);
    }
}
