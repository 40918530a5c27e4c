//! Conversion of arbitrary Iceberg field names into valid Avro names.
//!
//! Avro names must start with a letter or `_` and continue with letters,
//! digits or `_`. Invalid characters are escaped deterministically:
//!
//! - a digit in first position becomes `_` followed by the digit
//! - any other invalid character becomes `_x` followed by its code point in
//!   uppercase hex (`-` becomes `_x2D`)
//!
//! The converter keeps the original name in the `iceberg-field-name`
//! property whenever the escaped form differs.

use crate::error::{Error, Result};

/// Escapes `name` into a valid Avro name. Fails only on an empty name.
pub fn sanitize_name(name: &str) -> Result<String> {
    let mut chars = name.chars();
    let first = chars.next().ok_or(Error::EmptyName)?;

    let mut sanitized = String::with_capacity(name.len());
    if is_valid_start(first) {
        sanitized.push(first);
    } else {
        push_escaped(&mut sanitized, first);
    }
    for ch in chars {
        if is_valid_part(ch) {
            sanitized.push(ch);
        } else {
            push_escaped(&mut sanitized, ch);
        }
    }
    Ok(sanitized)
}

/// True when `name` would come back from [`sanitize_name`] unchanged.
pub fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => is_valid_start(first) && chars.all(is_valid_part),
        None => false,
    }
}

fn is_valid_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_'
}

fn is_valid_part(ch: char) -> bool {
    ch.is_alphabetic() || ch.is_ascii_digit() || ch == '_'
}

fn push_escaped(out: &mut String, ch: char) {
    if ch.is_ascii_digit() {
        out.push('_');
        out.push(ch);
    } else {
        out.push_str(&format!("_x{:X}", u32::from(ch)));
    }
}
