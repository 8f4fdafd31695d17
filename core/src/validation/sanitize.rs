//! Live sanitizers applied to each keystroke's worth of input.
//!
//! All of them are idempotent: feeding a sanitized value back in returns it unchanged.

use super::rules::{is_name_char, PHONE_DIGITS};

/// Drops characters a name may not hold, collapses whitespace runs to one space and capitalises
/// the first letter of every word.
pub fn sanitize_name(raw: &str) -> String {
    let mut clean = String::with_capacity(raw.len());
    let mut word_start = true;

    for c in raw.chars().filter(|&c| is_name_char(c)) {
        if c.is_whitespace() {
            if !word_start || clean.is_empty() {
                clean.push(' ');
            }
            word_start = true;
        } else if word_start {
            clean.extend(c.to_uppercase());
            word_start = false;
        } else {
            clean.push(c);
        }
    }
    clean
}

/// Keeps digits only, at most eight of them.
pub fn sanitize_phone(raw: &str) -> String {
    raw.chars()
        .filter(|c| c.is_ascii_digit())
        .take(PHONE_DIGITS)
        .collect()
}

pub fn sanitize_email(raw: &str) -> String {
    raw.chars().filter(|c| !c.is_whitespace()).collect()
}

pub fn sanitize_trimmed(raw: &str) -> String {
    raw.trim().to_string()
}

pub fn sanitize_untouched(raw: &str) -> String {
    raw.to_string()
}
