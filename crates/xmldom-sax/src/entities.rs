//! Entity tables and reference expansion.
//!
//! Named references resolve through an [`EntityMap`]; numeric character
//! references (`&#N;`, `&#xN;`) resolve directly. Nothing that fails to
//! resolve is dropped: the reference text is kept literally and the problem
//! is recorded as an [`EntityIssue`] for the reader to report.

use memchr::memchr;
use std::borrow::Cow;
use std::collections::HashMap;

/// Entity name to replacement text.
pub type EntityMap = HashMap<String, String>;

/// The five predefined XML entities.
pub fn xml_entities() -> EntityMap {
    [
        ("lt", "<"),
        ("gt", ">"),
        ("amp", "&"),
        ("quot", "\""),
        ("apos", "'"),
    ]
    .into_iter()
    .map(|(name, value)| (name.to_string(), value.to_string()))
    .collect()
}

/// The XML entities plus the HTML ones recognized for HTML content types.
pub fn html_entities() -> EntityMap {
    let mut entities = xml_entities();
    entities.insert("nbsp".to_string(), "\u{a0}".to_string());
    entities.insert("copy".to_string(), "\u{a9}".to_string());
    entities
}

/// A reference that could not be expanded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntityIssue {
    /// `&name;` where `name` is not in the table.
    Unknown(String),
    /// `&#...;` that does not denote a character.
    InvalidCharRef(String),
    /// A bare `&` that does not start a reference.
    Unterminated,
}

/// Expand the references in `input`.
///
/// Returns the input unchanged (borrowed) when it contains no `&`.
pub fn decode<'s>(
    input: &'s str,
    entities: &EntityMap,
    issues: &mut Vec<EntityIssue>,
) -> Cow<'s, str> {
    if memchr(b'&', input.as_bytes()).is_none() {
        return Cow::Borrowed(input);
    }

    let mut result = String::with_capacity(input.len());
    let mut rest = input;

    while let Some(amp) = memchr(b'&', rest.as_bytes()) {
        result.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let Some(name) = reference_name(rest) else {
            issues.push(EntityIssue::Unterminated);
            result.push('&');
            rest = &rest[1..];
            continue;
        };
        // `&` + name + `;`
        let consumed = name.len() + 2;

        if let Some(number) = name.strip_prefix('#') {
            match char_reference(number) {
                Some(ch) => result.push(ch),
                None => {
                    issues.push(EntityIssue::InvalidCharRef(name.to_string()));
                    result.push_str(&rest[..consumed]);
                }
            }
        } else if let Some(value) = entities.get(name) {
            result.push_str(value);
        } else {
            issues.push(EntityIssue::Unknown(name.to_string()));
            result.push_str(&rest[..consumed]);
        }
        rest = &rest[consumed..];
    }

    result.push_str(rest);
    Cow::Owned(result)
}

/// The name between `&` and `;` when `input` starts with a well-formed reference.
fn reference_name(input: &str) -> Option<&str> {
    let semi = memchr(b';', input.as_bytes())?;
    let name = &input[1..semi];
    let valid = !name.is_empty()
        && !name
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '&' | '<' | '"' | '\''));
    valid.then_some(name)
}

fn char_reference(number: &str) -> Option<char> {
    let code = match number.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => number.parse::<u32>().ok()?,
    };
    char::from_u32(code).filter(|&c| c != '\0')
}
