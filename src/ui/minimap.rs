use eframe::egui::{self, Pos2, Rect, Vec2};

use crate::editor::Document;
use crate::syntax::{Lexer, TokenKind};
use crate::theme::Theme;

pub const PANEL_WIDTH: f32 = 90.0;

const ROW_ADVANCE: f32 = 2.0;
const ROW_HEIGHT: f32 = 1.0;
const CHAR_WIDTH: f32 = 1.0;
const PADDING: f32 = 4.0;
const TRACK_WIDTH: f32 = 6.0;
const MIN_THUMB_HEIGHT: f32 = 8.0;

/// First visible line and visible line count, derived from scroll position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub first_line: usize,
    pub visible_lines: usize,
}

/// One classified run projected into minimap space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TokenRect {
    pub rect: Rect,
    pub kind: TokenKind,
}

/// Project the buffer into thin rectangles, one per non-whitespace run.
///
/// Leading indentation offsets a row horizontally; run width is proportional
/// to run length; rows advance by a fixed tiny height and layout stops once
/// the panel is full.
pub fn build_line_rects(doc: &Document, lexer: &Lexer, panel: Rect) -> Vec<TokenRect> {
    let mut out = Vec::new();
    let max_x = panel.right() - TRACK_WIDTH - PADDING;
    let mut y = panel.top() + PADDING;

    for line in 0..doc.line_count() {
        if y + ROW_ADVANCE > panel.bottom() {
            break;
        }
        let text = doc.line_text(line);
        if !text.trim().is_empty() {
            let indent = text.chars().take_while(|c| c.is_whitespace()).count();
            let trimmed = text.trim_start();
            let mut col = indent;
            for token in lexer.classify_line(trimmed, 0) {
                let run = &trimmed[token.start..token.end()];
                let width = run.chars().count();
                let x = panel.left() + PADDING + col as f32 * CHAR_WIDTH;
                col += width;
                if run.trim().is_empty() || x >= max_x {
                    continue;
                }
                let w = (width as f32 * CHAR_WIDTH).min(max_x - x);
                out.push(TokenRect {
                    rect: Rect::from_min_size(Pos2::new(x, y), Vec2::new(w, ROW_HEIGHT)),
                    kind: token.kind,
                });
            }
        }
        y += ROW_ADVANCE;
    }

    out
}

/// Scrollbar thumb: height proportional to the visible share of the buffer,
/// offset proportional to how far the viewport has scrolled.
pub fn thumb_rect(viewport: Viewport, total_lines: usize, track: Rect) -> Rect {
    if total_lines == 0 || viewport.visible_lines >= total_lines {
        return track;
    }
    let height = (track.height() * viewport.visible_lines as f32 / total_lines as f32)
        .max(MIN_THUMB_HEIGHT)
        .min(track.height());
    let scrollable = (total_lines - viewport.visible_lines) as f32;
    let t = (viewport.first_line as f32 / scrollable).clamp(0.0, 1.0);
    let y = track.top() + t * (track.height() - height);
    Rect::from_min_size(
        Pos2::new(track.left(), y),
        Vec2::new(track.width(), height),
    )
}

fn track_rect(panel: Rect) -> Rect {
    Rect::from_min_max(
        Pos2::new(panel.right() - TRACK_WIDTH, panel.top()),
        panel.right_bottom(),
    )
}

/// Paint the minimap into `rect`. All drawing is clipped to the panel.
pub fn show(
    ui: &egui::Ui,
    rect: Rect,
    doc: &Document,
    lexer: &Lexer,
    theme: &Theme,
    viewport: Viewport,
) {
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, theme.minimap_bg.color());

    for tr in build_line_rects(doc, lexer, rect) {
        painter.rect_filled(tr.rect, 0.0, theme.token_color(tr.kind));
    }

    let track = track_rect(rect);
    painter.rect_filled(track, 0.0, theme.bg_medium.color());
    painter.rect_filled(
        thumb_rect(viewport, doc.line_count(), track),
        2.0,
        theme.minimap_thumb.color(),
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::LanguageSpec;

    fn lexer() -> Lexer {
        Lexer::new(LanguageSpec::new(
            ["local".to_string(), "end".to_string()],
            "--",
            vec!['"'],
        ))
    }

    fn panel() -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(PANEL_WIDTH, 200.0))
    }

    #[test]
    fn empty_buffer_produces_no_rectangles() {
        let doc = Document::with_text("t", "");
        assert!(build_line_rects(&doc, &lexer(), panel()).is_empty());
    }

    #[test]
    fn comment_line_renders_entirely_in_comment_color() {
        let doc = Document::with_text("t", "-- a note about end");
        let rects = build_line_rects(&doc, &lexer(), panel());
        assert!(!rects.is_empty());
        assert!(rects.iter().all(|r| r.kind == TokenKind::Comment));
    }

    #[test]
    fn indentation_offsets_a_row_horizontally() {
        let doc = Document::with_text("t", "x\n    x");
        let rects = build_line_rects(&doc, &lexer(), panel());
        assert_eq!(rects.len(), 2);
        assert!(rects[1].rect.left() > rects[0].rect.left());
        assert!(rects[1].rect.top() > rects[0].rect.top());
    }

    #[test]
    fn layout_stops_at_the_panel_bottom() {
        let text = vec!["x"; 1000].join("\n");
        let doc = Document::with_text("t", &text);
        let p = panel();
        let rects = build_line_rects(&doc, &lexer(), p);
        assert!(rects.len() < 1000);
        assert!(rects.iter().all(|r| r.rect.bottom() <= p.bottom()));
    }

    #[test]
    fn whitespace_runs_are_not_painted() {
        let doc = Document::with_text("t", "local  x");
        let rects = build_line_rects(&doc, &lexer(), panel());
        assert_eq!(rects.len(), 2);
        // The gap between the two runs stays unpainted.
        assert!(rects[1].rect.left() > rects[0].rect.right());
    }

    #[test]
    fn thumb_height_shrinks_as_the_buffer_grows() {
        let track = Rect::from_min_size(Pos2::ZERO, Vec2::new(TRACK_WIDTH, 100.0));
        let viewport = |first| Viewport {
            first_line: first,
            visible_lines: 10,
        };
        let mut last = f32::INFINITY;
        for total in [10, 20, 50, 100, 400, 2000] {
            let h = thumb_rect(viewport(0), total, track).height();
            assert!(h <= last, "thumb grew when total went to {total}");
            last = h;
        }
    }

    #[test]
    fn thumb_offset_tracks_scroll_position() {
        let track = Rect::from_min_size(Pos2::ZERO, Vec2::new(TRACK_WIDTH, 100.0));
        let total = 100;
        let at = |first| {
            thumb_rect(
                Viewport {
                    first_line: first,
                    visible_lines: 20,
                },
                total,
                track,
            )
        };
        assert_eq!(at(0).top(), track.top());
        assert_eq!(at(total - 20).bottom(), track.bottom());
        assert!(at(40).top() > at(0).top());
        assert!(at(40).top() < at(total - 20).top());
    }

    #[test]
    fn short_buffer_fills_the_whole_track() {
        let track = Rect::from_min_size(Pos2::ZERO, Vec2::new(TRACK_WIDTH, 100.0));
        let thumb = thumb_rect(
            Viewport {
                first_line: 0,
                visible_lines: 50,
            },
            10,
            track,
        );
        assert_eq!(thumb, track);
    }
}
