//! Safe parsing of serialized choice lists
//!
//! The trivia table stores each question's candidates as a list literal,
//! e.g. `['Rome', 'Athens', "Sparta's rival"]`. The text is parsed as data and
//! never evaluated. Two shapes are accepted:
//! - a JSON array of strings
//! - a bracketed list of single- or double-quoted strings, with backslash
//!   escapes and an optional trailing comma

use std::iter::Peekable;
use std::str::Chars;

use chronicle_core::DataIntegrityError;

pub fn parse_choices(raw: &str) -> Result<Vec<String>, DataIntegrityError> {
    let raw = raw.trim();

    if let Ok(list) = serde_json::from_str::<Vec<String>>(raw) {
        return Ok(list);
    }

    parse_list_literal(raw)
}

fn malformed(msg: impl Into<String>) -> DataIntegrityError {
    DataIntegrityError::MalformedChoices(msg.into())
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek().is_some_and(|c| c.is_whitespace()) {
        chars.next();
    }
}

fn parse_list_literal(raw: &str) -> Result<Vec<String>, DataIntegrityError> {
    let mut chars = raw.chars().peekable();
    let mut items = Vec::new();

    if chars.next() != Some('[') {
        return Err(malformed("expected '['"));
    }

    loop {
        skip_whitespace(&mut chars);
        match chars.peek() {
            Some(']') => {
                chars.next();
                break;
            }
            Some(&quote) if quote == '\'' || quote == '"' => {
                chars.next();
                items.push(parse_quoted(&mut chars, quote)?);
            }
            Some(c) => return Err(malformed(format!("unexpected {:?}", c))),
            None => return Err(malformed("unterminated list")),
        }

        skip_whitespace(&mut chars);
        match chars.next() {
            Some(',') => continue,
            Some(']') => break,
            Some(c) => return Err(malformed(format!("expected ',' or ']', found {:?}", c))),
            None => return Err(malformed("unterminated list")),
        }
    }

    skip_whitespace(&mut chars);
    if let Some(c) = chars.next() {
        return Err(malformed(format!("trailing {:?} after list", c)));
    }

    Ok(items)
}

fn parse_quoted(chars: &mut Peekable<Chars<'_>>, quote: char) -> Result<String, DataIntegrityError> {
    let mut out = String::new();
    loop {
        match chars.next() {
            Some(c) if c == quote => return Ok(out),
            Some('\\') => match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some(c @ ('\\' | '\'' | '"')) => out.push(c),
                Some(c) => {
                    out.push('\\');
                    out.push(c);
                }
                None => return Err(malformed("unterminated string")),
            },
            Some(c) => out.push(c),
            None => return Err(malformed("unterminated string")),
        }
    }
}
