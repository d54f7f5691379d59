//! Interpretation of directive arguments and `$(name)` expansion.
//!
//! A directive value is either `"`-quoted, with `""` standing for one `"`,
//! or bare text running to the next blank. Content after well-formed
//! arguments is ignored, matching the reference tool's leniency.

use alloc::{
    borrow::ToOwned,
    string::String,
};

use crate::{matcher, variables::VariableTable};

#[inline]
fn is_blank(b: u8) -> bool {
    b == b' ' || b == b'\t'
}

fn skip_blanks(bytes: &[u8], mut i: usize) -> usize {
    while i < bytes.len() && is_blank(bytes[i]) {
        i += 1;
    }
    i
}

/// Parses one value starting at byte `i`. Returns the unescaped value and
/// the offset just past it, or `None` when there is no value (or a quoted
/// value is unterminated).
fn parse_value(args: &str, i: usize) -> Option<(String, usize)> {
    let bytes = args.as_bytes();
    if i >= bytes.len() {
        return None;
    }
    if bytes[i] == b'"' {
        let mut out = String::new();
        let mut seg = i + 1;
        let mut j = i + 1;
        loop {
            if j >= bytes.len() {
                return None;
            }
            if bytes[j] == b'"' {
                out.push_str(&args[seg..j]);
                if bytes.get(j + 1) == Some(&b'"') {
                    out.push('"');
                    j += 2;
                    seg = j;
                } else {
                    return Some((out, j + 1));
                }
            } else {
                j += 1;
            }
        }
    } else {
        let mut j = i;
        while j < bytes.len() && !is_blank(bytes[j]) {
            j += 1;
        }
        if j == i {
            None
        } else {
            Some((args[i..j].to_owned(), j))
        }
    }
}

/// Extracts the path from a `:r` argument span.
pub(crate) fn parse_include_args(args: &str) -> Option<String> {
    let i = skip_blanks(args.as_bytes(), 0);
    let (path, _) = parse_value(args, i)?;
    if path.is_empty() { None } else { Some(path) }
}

/// Extracts `(name, value)` from a `:setvar` argument span. The name is an
/// identifier and must not start with a digit; the value follows after at
/// least one blank.
pub(crate) fn parse_setvar_args(args: &str) -> Option<(String, String)> {
    let bytes = args.as_bytes();
    let start = skip_blanks(bytes, 0);
    if start >= bytes.len() {
        return None;
    }
    if !(bytes[start].is_ascii_alphabetic() || bytes[start] == b'_') {
        return None;
    }
    let mut i = start + 1;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
        i += 1;
    }
    if i < bytes.len() && !is_blank(bytes[i]) {
        return None;
    }
    let name = args[start..i].to_owned();
    let (value, _) = parse_value(args, skip_blanks(bytes, i))?;
    Some((name, value))
}

/// Expands every `$(name)` in `text`, emitting verbatim runs and resolved
/// values in order. Fails with the offending name when a reference is not
/// defined.
pub(crate) fn substitute<F: FnMut(&str)>(
    text: &str,
    vars: &VariableTable,
    mut emit: F,
) -> Result<(), String> {
    let mut pos = 0;
    while let Some(r) = matcher::find_reference(text, pos) {
        if r.start > pos {
            emit(&text[pos..r.start]);
        }
        let name = &text[r.name_start..r.name_end];
        match vars.get(name) {
            Some(value) => emit(value),
            None => return Err(name.to_owned()),
        }
        pos = r.end;
    }
    if pos < text.len() {
        emit(&text[pos..]);
    }
    Ok(())
}
