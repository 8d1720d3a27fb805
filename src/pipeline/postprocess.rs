//! Post-processing: deterministic cleanup of raw Tesseract output.
//!
//! Tesseract's text is already in reading order, but it carries a few
//! artefacts that leak into the JSON response if left alone: a trailing form
//! feed after every page, runs of empty lines where it found blank regions,
//! trailing spaces, and the occasional zero-width character from RTL layout
//! analysis.
//!
//! ## Rule Order
//!
//! Line endings are normalised first so every later rule only has to deal
//! with `\n`; invisible characters are stripped before blank-line collapsing
//! so a line holding only a ZWSP counts as blank.

use once_cell::sync::Lazy;
use regex::Regex;

/// Apply all cleanup rules to one page of raw OCR output.
///
/// Rules (applied in order):
/// 1. Normalise line endings (CRLF / CR → LF)
/// 2. Replace form feeds with newlines
/// 3. Strip invisible Unicode (zero-width spaces, BOM, soft hyphens)
/// 4. Trim trailing whitespace per line
/// 5. Collapse 3+ consecutive newlines down to one blank line
/// 6. Trim the whole text
pub fn clean_text(input: &str) -> String {
    let s = normalise_line_endings(input);
    let s = replace_form_feeds(&s);
    let s = remove_invisible_chars(&s);
    let s = trim_trailing_whitespace(&s);
    let s = collapse_blank_lines(&s);
    s.trim().to_string()
}

// ── Rule 1: Normalise line endings ───────────────────────────────────────────

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

// ── Rule 2: Form feeds ───────────────────────────────────────────────────────

fn replace_form_feeds(input: &str) -> String {
    input.replace('\u{000C}', "\n")
}

// ── Rule 3: Invisible Unicode ────────────────────────────────────────────────

/// Zero-width and formatting characters that carry no text. RTL/LTR marks are
/// kept: they change how mixed Arabic/Latin lines display.
const INVISIBLE: [char; 5] = ['\u{200B}', '\u{FEFF}', '\u{00AD}', '\u{2060}', '\u{180E}'];

fn remove_invisible_chars(input: &str) -> String {
    input.chars().filter(|c| !INVISIBLE.contains(c)).collect()
}

// ── Rule 4: Trim trailing whitespace per line ────────────────────────────────

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(|line| line.trim_end())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Rule 5: Collapse excessive blank lines ───────────────────────────────────

static RE_BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").unwrap());

fn collapse_blank_lines(input: &str) -> String {
    RE_BLANK_LINES.replace_all(input, "\n\n").to_string()
}
