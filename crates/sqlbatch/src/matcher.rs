//! Lexical recognition for the batch scanner.
//!
//! [`next_token`] returns the leftmost significant element at or after a
//! position. When several patterns could begin at the same position a fixed
//! precedence applies: quoted string/identifier, then comments, then variable
//! references, then the line-anchored batch separator and directives.
//! Everything between significant elements is ordinary text the scanner
//! passes through untouched.

/// A matched lexical element with its span `[start, end)` in the scanned text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Token {
    pub(crate) kind: TokenKind,
    pub(crate) start: usize,
    pub(crate) end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenKind {
    /// `--` through the end of the line, terminator included.
    LineComment,
    /// `/*` through the first `*/`, or to end of input when unterminated.
    BlockComment,
    /// `'...'` with `''` as an escaped quote.
    QuotedString,
    /// `[...]` with `]]` as an escaped closing bracket.
    QuotedIdentifier,
    /// `$(name)`; the name span excludes the delimiters.
    VariableReference { name_start: usize, name_end: usize },
    /// A line whose only non-blank content is `GO`, terminator included.
    BatchSeparator,
    /// `:r <path>` line; the args span is the rest of the line without its
    /// terminator.
    Include { args_start: usize, args_end: usize },
    /// `:setvar <name> <value>` line, args span as for [`TokenKind::Include`].
    Setvar { args_start: usize, args_end: usize },
}

/// A `$(name)` occurrence found by [`find_reference`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Reference {
    pub(crate) start: usize,
    pub(crate) name_start: usize,
    pub(crate) name_end: usize,
    pub(crate) end: usize,
}

#[inline]
fn is_word(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

#[inline]
fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

#[inline]
fn at_line_start(bytes: &[u8], i: usize) -> bool {
    i == 0 || bytes[i - 1] == b'\n'
}

/// Returns the next significant element at or after `pos`, or `None` when
/// only ordinary text remains.
///
/// All pattern-significant bytes are ASCII, so byte offsets produced here
/// always fall on `char` boundaries of `text`.
pub(crate) fn next_token(text: &str, pos: usize) -> Option<Token> {
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut i = pos;
    while i < len {
        match bytes[i] {
            b'\'' => return Some(quoted(bytes, i, b'\'', TokenKind::QuotedString)),
            b'[' => return Some(quoted(bytes, i, b']', TokenKind::QuotedIdentifier)),
            b'-' if bytes.get(i + 1) == Some(&b'-') => return Some(line_comment(bytes, i)),
            b'/' if bytes.get(i + 1) == Some(&b'*') => return Some(block_comment(bytes, i)),
            b'$' if bytes.get(i + 1) == Some(&b'(') => {
                if let Some(r) = reference_at(bytes, i) {
                    return Some(Token {
                        kind: TokenKind::VariableReference {
                            name_start: r.name_start,
                            name_end: r.name_end,
                        },
                        start: r.start,
                        end: r.end,
                    });
                }
            }
            _ => {}
        }
        if at_line_start(bytes, i) {
            if let Some(tok) = separator_at(bytes, i) {
                return Some(tok);
            }
            if let Some(tok) = directive_at(bytes, i) {
                return Some(tok);
            }
        }
        i += 1;
    }
    None
}

/// Finds the next well-formed `$(name)` at or after `from`. Malformed
/// near-misses (`$()`, `$(a b)`, an unclosed `$(x`) are skipped over.
pub(crate) fn find_reference(text: &str, from: usize) -> Option<Reference> {
    let bytes = text.as_bytes();
    let mut i = from;
    while i + 1 < bytes.len() {
        if bytes[i] == b'$' && bytes[i + 1] == b'(' {
            if let Some(r) = reference_at(bytes, i) {
                return Some(r);
            }
        }
        i += 1;
    }
    None
}

pub(crate) fn contains_reference(text: &str) -> bool {
    find_reference(text, 0).is_some()
}

fn reference_at(bytes: &[u8], start: usize) -> Option<Reference> {
    let name_start = start + 2;
    let mut i = name_start;
    while i < bytes.len() && is_word(bytes[i]) {
        i += 1;
    }
    if i > name_start && bytes.get(i) == Some(&b')') {
        Some(Reference {
            start,
            name_start,
            name_end: i,
            end: i + 1,
        })
    } else {
        None
    }
}

fn quoted(bytes: &[u8], start: usize, close: u8, kind: TokenKind) -> Token {
    let len = bytes.len();
    let mut i = start + 1;
    loop {
        if i >= len {
            // Unterminated: accepted to end of input.
            return Token { kind, start, end: len };
        }
        if bytes[i] == close {
            if bytes.get(i + 1) == Some(&close) {
                i += 2;
            } else {
                return Token {
                    kind,
                    start,
                    end: i + 1,
                };
            }
        } else {
            i += 1;
        }
    }
}

fn line_comment(bytes: &[u8], start: usize) -> Token {
    let mut i = start + 2;
    while i < bytes.len() && bytes[i] != b'\n' {
        i += 1;
    }
    Token {
        kind: TokenKind::LineComment,
        start,
        end: if i < bytes.len() { i + 1 } else { i },
    }
}

fn block_comment(bytes: &[u8], start: usize) -> Token {
    let mut i = start + 2;
    while i + 1 < bytes.len() {
        if bytes[i] == b'*' && bytes[i + 1] == b'/' {
            return Token {
                kind: TokenKind::BlockComment,
                start,
                end: i + 2,
            };
        }
        i += 1;
    }
    Token {
        kind: TokenKind::BlockComment,
        start,
        end: bytes.len(),
    }
}

/// Matches a separator line at `start` (a line start): optional blanks, `GO`
/// in any case, optional blanks, then a line terminator or end of input. Any
/// other trailing content makes the line ordinary text.
fn separator_at(bytes: &[u8], start: usize) -> Option<Token> {
    let mut i = start;
    while i < bytes.len() && is_blank(bytes[i]) {
        i += 1;
    }
    if i + 1 >= bytes.len() || !bytes[i].eq_ignore_ascii_case(&b'g') {
        return None;
    }
    if !bytes[i + 1].eq_ignore_ascii_case(&b'o') {
        return None;
    }
    i += 2;
    while i < bytes.len() && is_blank(bytes[i]) {
        i += 1;
    }
    let end = match bytes.get(i) {
        None => bytes.len(),
        Some(&b'\n') => i + 1,
        Some(&b'\r') if bytes.get(i + 1) == Some(&b'\n') => i + 2,
        Some(_) => return None,
    };
    Some(Token {
        kind: TokenKind::BatchSeparator,
        start,
        end,
    })
}

/// Matches a `:r` or `:setvar` line at `start` (a line start). The keyword is
/// case-insensitive and must be followed by whitespace or the line end; the
/// raw argument text is everything after it up to the terminator.
fn directive_at(bytes: &[u8], start: usize) -> Option<Token> {
    let mut i = start;
    while i < bytes.len() && is_blank(bytes[i]) {
        i += 1;
    }
    if bytes.get(i) != Some(&b':') {
        return None;
    }
    let rest = &bytes[i + 1..];
    let (setvar, kw_len) = if rest.len() >= 6 && rest[..6].eq_ignore_ascii_case(b"setvar") {
        (true, 7)
    } else if !rest.is_empty() && rest[0].eq_ignore_ascii_case(&b'r') {
        (false, 2)
    } else {
        return None;
    };
    let args_start = i + kw_len;
    match bytes.get(args_start) {
        None | Some(&b' ' | &b'\t' | &b'\r' | &b'\n') => {}
        Some(_) => return None,
    }
    let mut j = args_start;
    while j < bytes.len() && bytes[j] != b'\n' {
        j += 1;
    }
    let end = if j < bytes.len() { j + 1 } else { j };
    let mut args_end = j;
    if args_end > args_start && bytes[args_end - 1] == b'\r' {
        args_end -= 1;
    }
    let kind = if setvar {
        TokenKind::Setvar {
            args_start,
            args_end,
        }
    } else {
        TokenKind::Include {
            args_start,
            args_end,
        }
    };
    Some(Token { kind, start, end })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{Token, TokenKind, contains_reference, find_reference, next_token};

    fn tok(text: &str) -> Token {
        next_token(text, 0).expect("expected a token")
    }

    #[test]
    fn plain_text_has_no_token() {
        assert_eq!(next_token("SELECT 1 FROM t;\n", 0), None);
    }

    #[rstest]
    #[case("'it''s'", 0, 7)]
    #[case("'open", 0, 5)] // unterminated, accepted to end of input
    #[case("x'a'", 1, 4)]
    fn quoted_string_spans(#[case] text: &str, #[case] start: usize, #[case] end: usize) {
        let t = next_token(text, 0).unwrap();
        assert_eq!((t.kind, t.start, t.end), (TokenKind::QuotedString, start, end));
    }

    #[test]
    fn quoted_identifier_doubles_closing_bracket() {
        let t = tok("[a]]b] rest");
        assert_eq!((t.kind, t.start, t.end), (TokenKind::QuotedIdentifier, 0, 6));
    }

    #[test]
    fn line_comment_includes_terminator() {
        let t = tok("--x\r\nGO\n");
        assert_eq!((t.kind, t.start, t.end), (TokenKind::LineComment, 0, 5));
    }

    #[test]
    fn block_comment_unterminated_runs_to_end() {
        let t = tok("/* GO\nGO\n");
        assert_eq!((t.kind, t.start, t.end), (TokenKind::BlockComment, 0, 9));
    }

    #[test]
    fn block_comment_closes_at_first_star_slash() {
        let t = tok("/* a */ b */");
        assert_eq!((t.kind, t.start, t.end), (TokenKind::BlockComment, 0, 7));
    }

    #[test]
    fn reference_carries_name_span() {
        let t = tok("x = $(Var_1);");
        assert_eq!(t.start, 4);
        assert_eq!(t.end, 12);
        assert_eq!(
            t.kind,
            TokenKind::VariableReference {
                name_start: 6,
                name_end: 11
            }
        );
    }

    #[rstest]
    #[case("$()")]
    #[case("$(a b)")]
    #[case("$(open")]
    #[case("$ (x)")]
    fn malformed_references_are_text(#[case] text: &str) {
        assert_eq!(next_token(text, 0), None);
        assert!(!contains_reference(text));
    }

    #[rstest]
    #[case("GO\n", 0, 3)]
    #[case("go\r\n", 0, 4)]
    #[case("  Go  \n", 0, 7)]
    #[case("GO", 0, 2)] // end of input terminates the line
    fn separator_spans(#[case] text: &str, #[case] start: usize, #[case] end: usize) {
        let t = next_token(text, 0).unwrap();
        assert_eq!((t.kind, t.start, t.end), (TokenKind::BatchSeparator, start, end));
    }

    #[rstest]
    #[case("GO 5\n")]
    #[case("GOTO x\n")]
    #[case("a GO\n")] // not at line start
    fn non_separator_lines(#[case] text: &str) {
        assert!(!matches!(
            next_token(text, 0),
            Some(Token {
                kind: TokenKind::BatchSeparator,
                ..
            })
        ));
    }

    #[test]
    fn separator_anchors_to_line_start_after_newline() {
        let t = next_token("a\nGO\nb", 0).unwrap();
        assert_eq!((t.kind, t.start, t.end), (TokenKind::BatchSeparator, 2, 5));
    }

    #[test]
    fn include_args_exclude_terminator() {
        let t = tok(":r file.sql\r\n");
        assert_eq!(t.start, 0);
        assert_eq!(t.end, 13);
        assert_eq!(
            t.kind,
            TokenKind::Include {
                args_start: 2,
                args_end: 11
            }
        );
    }

    #[test]
    fn setvar_keyword_is_case_insensitive() {
        let t = tok("  :SETVAR a b\n");
        assert!(matches!(t.kind, TokenKind::Setvar { .. }));
        assert_eq!(t.start, 0);
        assert_eq!(t.end, 14);
    }

    #[rstest]
    #[case(":rfoo\n")]
    #[case(":setvarx a b\n")]
    #[case("x :r f\n")] // not at line start
    #[case(":q f\n")]
    fn non_directive_lines(#[case] text: &str) {
        assert_eq!(next_token(text, 0), None);
    }

    #[test]
    fn quote_takes_precedence_over_comment_and_separator() {
        // The whole line is a string literal, including the GO-looking tail.
        let t = tok("'--GO\nGO'");
        assert_eq!((t.kind, t.start, t.end), (TokenKind::QuotedString, 0, 9));
    }

    #[test]
    fn leftmost_match_wins() {
        let t = tok("a -- c\n'q'");
        assert_eq!((t.kind, t.start), (TokenKind::LineComment, 2));
    }

    #[test]
    fn find_reference_skips_malformed_prefixes() {
        let r = find_reference("$() $(ok)", 0).unwrap();
        assert_eq!((r.start, r.end), (4, 9));
        assert_eq!(&"$() $(ok)"[r.name_start..r.name_end], "ok");
    }
}
