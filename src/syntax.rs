use std::collections::HashSet;

/// Lexical category of a classified run of source text.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    StringLiteral,
    NumberLiteral,
    Comment,
    Identifier,
    Other,
}

/// A maximal run of characters belonging to one category.
///
/// Offsets are byte positions into the classified text. Tokens produced by
/// [`Lexer::classify`] are non-overlapping, contiguous, and cover the input
/// exactly (whitespace is classified as `Other`).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Token {
    pub start: usize,
    pub len: usize,
    pub kind: TokenKind,
}

impl Token {
    pub fn end(&self) -> usize {
        self.start + self.len
    }
}

/// The scripting dialect the classifier recognizes: a fixed keyword set, a
/// line-comment marker, and the characters that delimit string literals.
///
/// Built once at startup from configuration and never mutated afterwards.
#[derive(Clone, Debug)]
pub struct LanguageSpec {
    keywords: HashSet<String>,
    line_comment: String,
    quotes: Vec<char>,
}

impl LanguageSpec {
    pub fn new(
        keywords: impl IntoIterator<Item = String>,
        line_comment: impl Into<String>,
        quotes: Vec<char>,
    ) -> Self {
        Self {
            keywords: keywords.into_iter().collect(),
            line_comment: line_comment.into(),
            quotes,
        }
    }

    pub fn is_keyword(&self, word: &str) -> bool {
        self.keywords.contains(word)
    }

    pub fn line_comment(&self) -> &str {
        &self.line_comment
    }
}

/// Single-pass lexical classifier shared by the editor highlighter and the
/// minimap renderer.
pub struct Lexer {
    spec: LanguageSpec,
}

impl Lexer {
    pub fn new(spec: LanguageSpec) -> Self {
        Self { spec }
    }

    pub fn spec(&self) -> &LanguageSpec {
        &self.spec
    }

    /// Classify one line (no trailing newline). `base` is added to every
    /// token offset, so callers can produce buffer-absolute positions.
    pub fn classify_line(&self, line: &str, base: usize) -> Vec<Token> {
        let mut tokens = Vec::new();
        let marker = self.spec.line_comment.as_str();
        let mut iter = line.char_indices().peekable();

        while let Some(&(off, ch)) = iter.peek() {
            if !marker.is_empty() && line[off..].starts_with(marker) {
                tokens.push(Token {
                    start: base + off,
                    len: line.len() - off,
                    kind: TokenKind::Comment,
                });
                break;
            }

            if self.spec.quotes.contains(&ch) {
                iter.next();
                let mut end = line.len();
                while let Some((i, c)) = iter.next() {
                    if c == '\\' {
                        iter.next();
                    } else if c == ch {
                        end = i + c.len_utf8();
                        break;
                    }
                }
                tokens.push(Token {
                    start: base + off,
                    len: end - off,
                    kind: TokenKind::StringLiteral,
                });
                continue;
            }

            if ch.is_ascii_digit() {
                let mut end = off + ch.len_utf8();
                let mut seen_sep = false;
                iter.next();
                while let Some(&(i, c)) = iter.peek() {
                    if c.is_ascii_digit() {
                        end = i + c.len_utf8();
                        iter.next();
                    } else if c == '.' && !seen_sep && digit_follows(line, i) {
                        seen_sep = true;
                        end = i + c.len_utf8();
                        iter.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    start: base + off,
                    len: end - off,
                    kind: TokenKind::NumberLiteral,
                });
                continue;
            }

            if ch.is_alphabetic() || ch == '_' {
                let mut end = off + ch.len_utf8();
                iter.next();
                while let Some(&(i, c)) = iter.peek() {
                    if c.is_alphanumeric() || c == '_' {
                        end = i + c.len_utf8();
                        iter.next();
                    } else {
                        break;
                    }
                }
                // The run is maximal, so a keyword embedded in a longer
                // identifier never matches here.
                let kind = if self.spec.is_keyword(&line[off..end]) {
                    TokenKind::Keyword
                } else {
                    TokenKind::Identifier
                };
                tokens.push(Token {
                    start: base + off,
                    len: end - off,
                    kind,
                });
                continue;
            }

            if ch.is_whitespace() {
                let mut end = off + ch.len_utf8();
                iter.next();
                while let Some(&(i, c)) = iter.peek() {
                    if c.is_whitespace() {
                        end = i + c.len_utf8();
                        iter.next();
                    } else {
                        break;
                    }
                }
                tokens.push(Token {
                    start: base + off,
                    len: end - off,
                    kind: TokenKind::Other,
                });
                continue;
            }

            iter.next();
            tokens.push(Token {
                start: base + off,
                len: ch.len_utf8(),
                kind: TokenKind::Other,
            });
        }

        tokens
    }

    /// Classify a whole buffer. Line terminators are emitted as `Other`
    /// tokens so the stream covers every byte of the input.
    pub fn classify(&self, text: &str) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut base = 0;
        for piece in text.split_inclusive('\n') {
            let content = piece
                .strip_suffix('\n')
                .map(|s| s.strip_suffix('\r').unwrap_or(s))
                .unwrap_or(piece);
            tokens.extend(self.classify_line(content, base));
            let tail = piece.len() - content.len();
            if tail > 0 {
                tokens.push(Token {
                    start: base + content.len(),
                    len: tail,
                    kind: TokenKind::Other,
                });
            }
            base += piece.len();
        }
        tokens
    }
}

fn digit_follows(line: &str, dot: usize) -> bool {
    line[dot + 1..]
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lua_lexer() -> Lexer {
        let keywords = [
            "local", "function", "end", "if", "then", "else", "elseif", "while", "do", "for",
            "in", "return", "not", "and", "or", "nil", "true", "false", "print",
        ];
        Lexer::new(LanguageSpec::new(
            keywords.iter().map(|s| s.to_string()),
            "--",
            vec!['"', '\''],
        ))
    }

    fn assert_covers(text: &str, tokens: &[Token]) {
        let mut cursor = 0;
        for token in tokens {
            assert_eq!(token.start, cursor, "gap or overlap before {token:?}");
            cursor = token.end();
        }
        assert_eq!(cursor, text.len(), "stream does not cover the buffer");
    }

    #[test]
    fn empty_buffer_yields_no_tokens() {
        let lexer = lua_lexer();
        assert!(lexer.classify("").is_empty());
        assert!(lexer.classify_line("", 0).is_empty());
    }

    #[test]
    fn classification_is_idempotent() {
        let lexer = lua_lexer();
        let text = "local x = 1\n-- note\nprint(\"hi\")\n";
        let first = lexer.classify(text);
        let second = lexer.classify(text);
        assert_eq!(first, second);
        assert_covers(text, &first);
    }

    #[test]
    fn keyword_inside_identifier_is_not_a_keyword() {
        let lexer = lua_lexer();
        let tokens = lexer.classify_line("endpoint", 0);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::Identifier);
    }

    #[test]
    fn keyword_at_word_boundaries_matches() {
        let lexer = lua_lexer();
        for text in [" end ", "(end)"] {
            let tokens = lexer.classify_line(text, 0);
            let hit = tokens
                .iter()
                .find(|t| t.kind == TokenKind::Keyword)
                .unwrap_or_else(|| panic!("no keyword in {text:?}"));
            assert_eq!(&text[hit.start..hit.end()], "end");
        }
    }

    #[test]
    fn local_assignment_has_exactly_one_keyword() {
        let lexer = lua_lexer();
        let text = "local x = 1";
        let tokens = lexer.classify_line(text, 0);
        assert_covers(text, &tokens);
        let keywords: Vec<_> = tokens
            .iter()
            .filter(|t| t.kind == TokenKind::Keyword)
            .collect();
        assert_eq!(keywords.len(), 1);
        assert_eq!(&text[keywords[0].start..keywords[0].end()], "local");
    }

    #[test]
    fn keyword_inside_string_stays_a_string() {
        let lexer = lua_lexer();
        let tokens = lexer.classify_line("\"end\"", 0);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
    }

    #[test]
    fn unterminated_string_runs_to_end_of_line() {
        let lexer = lua_lexer();
        let text = "x = \"oops";
        let tokens = lexer.classify_line(text, 0);
        assert_covers(text, &tokens);
        let last = tokens.last().unwrap();
        assert_eq!(last.kind, TokenKind::StringLiteral);
        assert_eq!(last.end(), text.len());
    }

    #[test]
    fn escaped_quote_does_not_close_a_string() {
        let lexer = lua_lexer();
        let text = r#""a\"b" c"#;
        let tokens = lexer.classify_line(text, 0);
        assert_eq!(tokens[0].kind, TokenKind::StringLiteral);
        assert_eq!(&text[tokens[0].start..tokens[0].end()], r#""a\"b""#);
    }

    #[test]
    fn number_allows_one_embedded_separator() {
        let lexer = lua_lexer();
        let tokens = lexer.classify_line("3.14", 0);
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].kind, TokenKind::NumberLiteral);

        let tokens = lexer.classify_line("1.2.3", 0);
        assert_eq!(
            tokens.iter().map(|t| t.kind).collect::<Vec<_>>(),
            vec![
                TokenKind::NumberLiteral,
                TokenKind::Other,
                TokenKind::NumberLiteral
            ]
        );
    }

    #[test]
    fn comment_swallows_rest_of_line() {
        let lexer = lua_lexer();
        let text = "x = 1 -- local end";
        let tokens = lexer.classify_line(text, 0);
        assert_covers(text, &tokens);
        let last = tokens.last().unwrap();
        assert_eq!(last.kind, TokenKind::Comment);
        assert_eq!(&text[last.start..last.end()], "-- local end");
        assert!(!tokens[..tokens.len() - 1]
            .iter()
            .any(|t| t.kind == TokenKind::Comment));
    }

    #[test]
    fn whole_buffer_offsets_are_absolute() {
        let lexer = lua_lexer();
        let text = "if x\nend\n";
        let tokens = lexer.classify(text);
        assert_covers(text, &tokens);
        let end_token = tokens
            .iter()
            .find(|t| t.kind == TokenKind::Keyword && &text[t.start..t.end()] == "end")
            .expect("end keyword on second line");
        assert_eq!(end_token.start, 5);
    }
}
