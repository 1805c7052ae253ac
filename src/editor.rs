use ropey::Rope;
use std::fs;
use std::path::PathBuf;

pub const LINE_HEIGHT: f32 = 20.0;
pub const INDENT_WIDTH: usize = 4;

// --- Position & cursor ---

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Position {
    pub line: usize,
    pub col: usize,
}

impl Position {
    pub fn new(line: usize, col: usize) -> Self {
        Self { line, col }
    }
}

/// Caret plus optional selection anchor. `desired_col` keeps the horizontal
/// position sticky across vertical movement over short lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cursor {
    pub pos: Position,
    pub anchor: Option<Position>,
    pub desired_col: usize,
}

impl Cursor {
    pub fn origin() -> Self {
        Self {
            pos: Position::new(0, 0),
            anchor: None,
            desired_col: 0,
        }
    }

    /// Selection endpoints in document order, if a selection exists.
    pub fn selection(&self) -> Option<(Position, Position)> {
        self.anchor.map(|anchor| {
            if self.pos <= anchor {
                (self.pos, anchor)
            } else {
                (anchor, self.pos)
            }
        })
    }
}

// --- Rope helpers ---

fn line_len_chars(rope: &Rope, line: usize) -> usize {
    if line >= rope.len_lines() {
        return 0;
    }
    let slice = rope.line(line);
    let len = slice.len_chars();
    if len > 0 && line < rope.len_lines() - 1 {
        len - 1
    } else {
        len
    }
}

fn pos_to_char_idx(rope: &Rope, pos: Position) -> usize {
    let line_start = rope.line_to_char(pos.line);
    line_start + pos.col.min(line_len_chars(rope, pos.line))
}

#[derive(Clone)]
struct Snapshot {
    rope: Rope,
    cursor: Cursor,
}

// --- Document ---

/// One open tab: the text buffer, its cursor and scroll state, and a
/// revision counter bumped on every content change so highlight caches know
/// when to re-run the classifier.
pub struct Document {
    pub rope: Rope,
    pub cursor: Cursor,
    pub file_path: Option<PathBuf>,
    pub modified: bool,
    pub scroll_y: f32,
    pub scroll_x: f32,
    pub title: String,
    pub last_edit_time: f64,
    revision: u64,
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
}

impl Document {
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_text(title, "")
    }

    pub fn with_text(title: impl Into<String>, text: &str) -> Self {
        Self {
            rope: Rope::from_str(text),
            cursor: Cursor::origin(),
            file_path: None,
            modified: false,
            scroll_y: 0.0,
            scroll_x: 0.0,
            title: title.into(),
            last_edit_time: 0.0,
            revision: 0,
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
        }
    }

    pub fn from_file(path: PathBuf) -> Result<Self, std::io::Error> {
        let content = fs::read_to_string(&path)?;
        let title = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "untitled.lua".into());
        let mut doc = Self::with_text(title, &content);
        doc.file_path = Some(path);
        Ok(doc)
    }

    pub fn save(&mut self) -> Result<(), std::io::Error> {
        match &self.file_path {
            Some(path) => {
                fs::write(path, self.rope.to_string())?;
                self.modified = false;
                Ok(())
            }
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no file path set",
            )),
        }
    }

    pub fn save_as(&mut self, path: PathBuf) -> Result<(), std::io::Error> {
        fs::write(&path, self.rope.to_string())?;
        self.title = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.title.clone());
        self.file_path = Some(path);
        self.modified = false;
        Ok(())
    }

    /// Counter bumped by every content mutation; highlight caches compare it
    /// to decide whether to re-run classification.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn text(&self) -> String {
        self.rope.to_string()
    }

    pub fn line_count(&self) -> usize {
        self.rope.len_lines()
    }

    pub fn line_text(&self, line: usize) -> String {
        if line >= self.rope.len_lines() {
            return String::new();
        }
        let mut s = self.rope.line(line).to_string();
        if s.ends_with('\n') {
            s.pop();
        }
        if s.ends_with('\r') {
            s.pop();
        }
        s
    }

    // --- Undo / redo ---

    fn save_undo(&mut self) {
        self.undo_stack.push(Snapshot {
            rope: self.rope.clone(),
            cursor: self.cursor,
        });
        if self.undo_stack.len() > 500 {
            self.undo_stack.remove(0);
        }
        self.redo_stack.clear();
    }

    pub fn undo(&mut self) {
        if let Some(snap) = self.undo_stack.pop() {
            self.redo_stack.push(Snapshot {
                rope: self.rope.clone(),
                cursor: self.cursor,
            });
            self.rope = snap.rope;
            self.cursor = snap.cursor;
            self.touch();
        }
    }

    pub fn redo(&mut self) {
        if let Some(snap) = self.redo_stack.pop() {
            self.undo_stack.push(Snapshot {
                rope: self.rope.clone(),
                cursor: self.cursor,
            });
            self.rope = snap.rope;
            self.cursor = snap.cursor;
            self.touch();
        }
    }

    fn touch(&mut self) {
        self.modified = true;
        self.revision += 1;
    }

    // --- Editing ---

    fn delete_selection(&mut self) -> bool {
        let Some((start, end)) = self.cursor.selection() else {
            return false;
        };
        let start_ci = pos_to_char_idx(&self.rope, start);
        let end_ci = pos_to_char_idx(&self.rope, end);
        if start_ci < end_ci {
            self.rope.remove(start_ci..end_ci);
        }
        self.cursor.pos = start;
        self.cursor.anchor = None;
        self.cursor.desired_col = start.col;
        true
    }

    pub fn insert_text(&mut self, text: &str) {
        self.save_undo();
        self.delete_selection();
        let ci = pos_to_char_idx(&self.rope, self.cursor.pos);
        self.rope.insert(ci, text);

        let newlines = text.chars().filter(|&c| c == '\n').count();
        if newlines > 0 {
            self.cursor.pos.line += newlines;
            let last_segment = text.rsplit('\n').next().unwrap_or("");
            self.cursor.pos.col = last_segment.chars().count();
        } else {
            self.cursor.pos.col += text.chars().count();
        }
        self.cursor.desired_col = self.cursor.pos.col;
        self.touch();
    }

    pub fn backspace(&mut self) {
        self.save_undo();
        if self.delete_selection() {
            self.touch();
            return;
        }
        let pos = self.cursor.pos;
        if pos.line == 0 && pos.col == 0 {
            return;
        }
        let ci = pos_to_char_idx(&self.rope, pos);
        if ci == 0 {
            return;
        }
        self.rope.remove(ci - 1..ci);
        if pos.col == 0 {
            self.cursor.pos.line -= 1;
            self.cursor.pos.col = line_len_chars(&self.rope, self.cursor.pos.line);
        } else {
            self.cursor.pos.col -= 1;
        }
        self.cursor.desired_col = self.cursor.pos.col;
        self.touch();
    }

    pub fn delete_forward(&mut self) {
        self.save_undo();
        if self.delete_selection() {
            self.touch();
            return;
        }
        let ci = pos_to_char_idx(&self.rope, self.cursor.pos);
        if ci >= self.rope.len_chars() {
            return;
        }
        self.rope.remove(ci..ci + 1);
        self.touch();
    }

    /// Insert a line break, matching the previous line's indentation and
    /// deepening it after Lua block openers.
    pub fn insert_newline(&mut self) {
        let line_text = self.line_text(self.cursor.pos.line);
        let indent: String = line_text.chars().take_while(|c| c.is_whitespace()).collect();

        let trimmed = line_text.trim_end();
        let opens_block = trimmed.ends_with("then")
            || trimmed.ends_with("do")
            || trimmed.ends_with("else")
            || (trimmed.ends_with(')') && trimmed.contains("function"))
            || trimmed.ends_with('{')
            || trimmed.ends_with('(');

        let mut newline = String::from("\n");
        newline.push_str(&indent);
        if opens_block {
            newline.push_str(&" ".repeat(INDENT_WIDTH));
        }
        self.insert_text(&newline);
    }

    pub fn insert_tab(&mut self) {
        self.insert_text(&" ".repeat(INDENT_WIDTH));
    }

    /// Empty the buffer (the one toolbar action the original wires up).
    pub fn clear(&mut self) {
        self.save_undo();
        self.rope = Rope::new();
        self.cursor = Cursor::origin();
        self.scroll_y = 0.0;
        self.scroll_x = 0.0;
        self.touch();
    }

    // --- Cursor movement ---

    fn begin_move(&mut self, select: bool) {
        if select {
            if self.cursor.anchor.is_none() {
                self.cursor.anchor = Some(self.cursor.pos);
            }
        } else {
            self.cursor.anchor = None;
        }
    }

    pub fn move_left(&mut self, select: bool) {
        if !select {
            if let Some((start, _)) = self.cursor.selection() {
                self.cursor.pos = start;
                self.cursor.anchor = None;
                self.cursor.desired_col = start.col;
                return;
            }
        }
        self.begin_move(select);
        if self.cursor.pos.col > 0 {
            self.cursor.pos.col -= 1;
        } else if self.cursor.pos.line > 0 {
            self.cursor.pos.line -= 1;
            self.cursor.pos.col = line_len_chars(&self.rope, self.cursor.pos.line);
        }
        self.cursor.desired_col = self.cursor.pos.col;
    }

    pub fn move_right(&mut self, select: bool) {
        if !select {
            if let Some((_, end)) = self.cursor.selection() {
                self.cursor.pos = end;
                self.cursor.anchor = None;
                self.cursor.desired_col = end.col;
                return;
            }
        }
        self.begin_move(select);
        let ll = line_len_chars(&self.rope, self.cursor.pos.line);
        if self.cursor.pos.col < ll {
            self.cursor.pos.col += 1;
        } else if self.cursor.pos.line < self.rope.len_lines().saturating_sub(1) {
            self.cursor.pos.line += 1;
            self.cursor.pos.col = 0;
        }
        self.cursor.desired_col = self.cursor.pos.col;
    }

    pub fn move_up(&mut self, select: bool) {
        self.begin_move(select);
        if self.cursor.pos.line > 0 {
            self.cursor.pos.line -= 1;
            let ll = line_len_chars(&self.rope, self.cursor.pos.line);
            self.cursor.pos.col = self.cursor.desired_col.min(ll);
        }
    }

    pub fn move_down(&mut self, select: bool) {
        self.begin_move(select);
        if self.cursor.pos.line < self.rope.len_lines().saturating_sub(1) {
            self.cursor.pos.line += 1;
            let ll = line_len_chars(&self.rope, self.cursor.pos.line);
            self.cursor.pos.col = self.cursor.desired_col.min(ll);
        }
    }

    pub fn move_home(&mut self, select: bool) {
        self.begin_move(select);
        self.cursor.pos.col = 0;
        self.cursor.desired_col = 0;
    }

    pub fn move_end(&mut self, select: bool) {
        self.begin_move(select);
        self.cursor.pos.col = line_len_chars(&self.rope, self.cursor.pos.line);
        self.cursor.desired_col = self.cursor.pos.col;
    }

    pub fn move_page(&mut self, select: bool, visible_lines: usize, down: bool) {
        self.begin_move(select);
        if down {
            let max_line = self.rope.len_lines().saturating_sub(1);
            self.cursor.pos.line = (self.cursor.pos.line + visible_lines).min(max_line);
        } else {
            self.cursor.pos.line = self.cursor.pos.line.saturating_sub(visible_lines);
        }
        let ll = line_len_chars(&self.rope, self.cursor.pos.line);
        self.cursor.pos.col = self.cursor.desired_col.min(ll);
    }

    pub fn move_to_start(&mut self, select: bool) {
        self.begin_move(select);
        self.cursor.pos = Position::new(0, 0);
        self.cursor.desired_col = 0;
    }

    pub fn move_to_end(&mut self, select: bool) {
        self.begin_move(select);
        let last_line = self.rope.len_lines().saturating_sub(1);
        let last_col = line_len_chars(&self.rope, last_line);
        self.cursor.pos = Position::new(last_line, last_col);
        self.cursor.desired_col = last_col;
    }

    pub fn set_cursor(&mut self, line: usize, col: usize) {
        let line = line.min(self.rope.len_lines().saturating_sub(1));
        let col = col.min(line_len_chars(&self.rope, line));
        self.cursor.pos = Position::new(line, col);
        self.cursor.anchor = None;
        self.cursor.desired_col = col;
    }

    pub fn drag_cursor_to(&mut self, line: usize, col: usize) {
        if self.cursor.anchor.is_none() {
            self.cursor.anchor = Some(self.cursor.pos);
        }
        let line = line.min(self.rope.len_lines().saturating_sub(1));
        let col = col.min(line_len_chars(&self.rope, line));
        self.cursor.pos = Position::new(line, col);
        self.cursor.desired_col = col;
    }

    // --- Selection & clipboard ---

    pub fn select_all(&mut self) {
        let last_line = self.rope.len_lines().saturating_sub(1);
        let last_col = line_len_chars(&self.rope, last_line);
        self.cursor.anchor = Some(Position::new(0, 0));
        self.cursor.pos = Position::new(last_line, last_col);
        self.cursor.desired_col = last_col;
    }

    pub fn clear_selection(&mut self) {
        self.cursor.anchor = None;
    }

    pub fn selected_text(&self) -> String {
        match self.cursor.selection() {
            Some((start, end)) => {
                let s = pos_to_char_idx(&self.rope, start);
                let e = pos_to_char_idx(&self.rope, end);
                self.rope.slice(s..e).to_string()
            }
            None => String::new(),
        }
    }

    /// Selected text, or the whole current line when nothing is selected.
    pub fn copy_text(&self) -> String {
        if self.cursor.anchor.is_some() {
            self.selected_text()
        } else {
            let mut line = self.line_text(self.cursor.pos.line);
            line.push('\n');
            line
        }
    }

    pub fn cut_text(&mut self) -> String {
        let text = self.copy_text();
        self.save_undo();
        if self.cursor.anchor.is_some() {
            self.delete_selection();
        } else {
            let line = self.cursor.pos.line;
            let start = self.rope.line_to_char(line);
            let end = if line + 1 < self.rope.len_lines() {
                self.rope.line_to_char(line + 1)
            } else {
                self.rope.len_chars()
            };
            if start < end {
                self.rope.remove(start..end);
            }
            let new_line = line.min(self.rope.len_lines().saturating_sub(1));
            self.cursor.pos = Position::new(new_line, 0);
            self.cursor.anchor = None;
            self.cursor.desired_col = 0;
        }
        self.touch();
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::{LanguageSpec, Lexer, TokenKind};

    fn doc(text: &str) -> Document {
        Document::with_text("untitled1.lua", text)
    }

    #[test]
    fn default_tab_scenario_updates_line_count() {
        let mut d = doc("print(\"Hello World\")");
        assert_eq!(d.line_count(), 1);
        d.move_to_end(false);
        d.insert_text("\nlocal n = 2");
        assert_eq!(d.line_count(), 2);
        assert_eq!(d.line_text(1), "local n = 2");
    }

    #[test]
    fn classification_leaves_cursor_and_selection_untouched() {
        let mut d = doc("local x = 1\nprint(x)");
        d.set_cursor(0, 2);
        d.drag_cursor_to(1, 3);
        let before = d.cursor;

        let lexer = Lexer::new(LanguageSpec::new(
            ["local".to_string(), "print".to_string()],
            "--",
            vec!['"'],
        ));
        let tokens = lexer.classify(&d.text());
        assert!(tokens.iter().any(|t| t.kind == TokenKind::Keyword));

        assert_eq!(d.cursor, before);
        assert_eq!(d.selected_text(), "cal x = 1\npri");
    }

    #[test]
    fn insert_advances_cursor_and_revision() {
        let mut d = doc("");
        let r0 = d.revision();
        d.insert_text("abc");
        assert_eq!(d.cursor.pos, Position::new(0, 3));
        assert!(d.revision() > r0);
        d.insert_text("\nxy");
        assert_eq!(d.cursor.pos, Position::new(1, 2));
    }

    #[test]
    fn typing_over_a_selection_replaces_it() {
        let mut d = doc("hello");
        d.select_all();
        d.insert_text("z");
        assert_eq!(d.text(), "z");
        assert_eq!(d.cursor.pos, Position::new(0, 1));
    }

    #[test]
    fn backspace_at_line_start_joins_lines() {
        let mut d = doc("ab\ncd");
        d.set_cursor(1, 0);
        d.backspace();
        assert_eq!(d.text(), "abcd");
        assert_eq!(d.cursor.pos, Position::new(0, 2));
    }

    #[test]
    fn newline_copies_indentation_and_deepens_after_then() {
        let mut d = doc("    if x then");
        d.move_to_end(false);
        d.insert_newline();
        assert_eq!(d.line_text(1), "        ");
    }

    #[test]
    fn undo_restores_text_and_cursor() {
        let mut d = doc("one");
        d.move_to_end(false);
        let before = d.cursor;
        d.insert_text(" two");
        d.undo();
        assert_eq!(d.text(), "one");
        assert_eq!(d.cursor, before);
        d.redo();
        assert_eq!(d.text(), "one two");
    }

    #[test]
    fn clear_empties_the_buffer_but_keeps_the_tab_alive() {
        let mut d = doc("local x = 1\nlocal y = 2");
        d.clear();
        assert_eq!(d.text(), "");
        assert_eq!(d.line_count(), 1);
        assert_eq!(d.cursor.pos, Position::new(0, 0));
    }

    #[test]
    fn cut_without_selection_takes_the_whole_line() {
        let mut d = doc("aa\nbb\ncc");
        d.set_cursor(1, 1);
        let cut = d.cut_text();
        assert_eq!(cut, "bb\n");
        assert_eq!(d.text(), "aa\ncc");
    }
}
