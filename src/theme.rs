use eframe::egui::Color32;
use serde::Deserialize;

use crate::syntax::TokenKind;

/// An sRGB triple as it appears in `vertex.toml`, e.g. `keyword = [200, 80, 80]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub fn color(self) -> Color32 {
        Color32::from_rgb(self.0[0], self.0[1], self.0[2])
    }
}

/// Color theme for the whole window. Loaded at startup and passed by
/// reference to every view; nothing in the UI hardcodes a color.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Theme {
    pub bg_dark: Rgb,
    pub bg_medium: Rgb,
    pub bg_light: Rgb,
    pub text: Rgb,
    pub text_dim: Rgb,
    pub accent: Rgb,

    pub keyword: Rgb,
    pub string_literal: Rgb,
    pub number_literal: Rgb,
    pub comment: Rgb,
    pub identifier: Rgb,
    pub other: Rgb,

    pub selection: Rgb,
    pub cursor: Rgb,
    pub gutter_bg: Rgb,
    pub line_number: Rgb,
    pub line_number_active: Rgb,
    pub active_line_bg: Rgb,
    pub indent_guide: Rgb,
    pub minimap_bg: Rgb,
    pub minimap_thumb: Rgb,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            bg_dark: Rgb([18, 18, 18]),
            bg_medium: Rgb([28, 28, 28]),
            bg_light: Rgb([38, 38, 38]),
            text: Rgb([220, 220, 220]),
            text_dim: Rgb([120, 120, 120]),
            accent: Rgb([212, 175, 55]),

            keyword: Rgb([200, 80, 80]),
            string_literal: Rgb([212, 175, 55]),
            number_literal: Rgb([181, 206, 168]),
            comment: Rgb([120, 120, 120]),
            identifier: Rgb([220, 220, 220]),
            other: Rgb([160, 160, 160]),

            selection: Rgb([60, 100, 150]),
            cursor: Rgb([248, 248, 240]),
            gutter_bg: Rgb([24, 24, 24]),
            line_number: Rgb([90, 90, 90]),
            line_number_active: Rgb([180, 180, 180]),
            active_line_bg: Rgb([28, 28, 28]),
            indent_guide: Rgb([48, 48, 48]),
            minimap_bg: Rgb([22, 22, 22]),
            minimap_thumb: Rgb([70, 70, 70]),
        }
    }
}

impl Theme {
    /// Foreground used by the editor highlighter and the minimap for one
    /// token category.
    pub fn token_color(&self, kind: TokenKind) -> Color32 {
        match kind {
            TokenKind::Keyword => self.keyword.color(),
            TokenKind::StringLiteral => self.string_literal.color(),
            TokenKind::NumberLiteral => self.number_literal.color(),
            TokenKind::Comment => self.comment.color(),
            TokenKind::Identifier => self.identifier.color(),
            TokenKind::Other => self.other.color(),
        }
    }

    pub fn selection_bg(&self) -> Color32 {
        let Rgb([r, g, b]) = self.selection;
        Color32::from_rgba_premultiplied(r / 2, g / 2, b / 2, 120)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_token_kind_has_a_color() {
        let theme = Theme::default();
        let kinds = [
            TokenKind::Keyword,
            TokenKind::StringLiteral,
            TokenKind::NumberLiteral,
            TokenKind::Comment,
            TokenKind::Identifier,
            TokenKind::Other,
        ];
        for kind in kinds {
            // Token colors must be distinguishable from the editor background.
            assert_ne!(theme.token_color(kind), theme.bg_dark.color());
        }
    }

    #[test]
    fn rgb_deserializes_from_a_triple() {
        let rgb: Rgb = toml::from_str::<toml::Value>("v = [1, 2, 3]")
            .unwrap()
            .get("v")
            .unwrap()
            .clone()
            .try_into()
            .unwrap();
        assert_eq!(rgb, Rgb([1, 2, 3]));
    }
}
