//! Pango markup handling in translatable messages.
//!
//! Old-style Wesnoth markup used sigils at the start of a message string
//! (`~` bold, `@` green, and so on). These convert mechanically to Pango
//! spans when the whole string is highlighted; partial or composite
//! highlights are reported for manual fixing.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::report::Reporter;
use crate::rules::catalog::PANGO_CONVERSIONS;

static SPAN_RE: Lazy<Regex> = Lazy::new(|| Regex::new("</?span[^>]*>").unwrap());
static ENTITY_RE: Lazy<Regex> = Lazy::new(|| Regex::new("&[a-z]+;").unwrap());
static RGB_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:<|&lt;)([0-9]+),([0-9]+),([0-9]+)(?:>|&gt;)").unwrap());

/// Remove all Pango markup from a string, leaving the bare text.
pub fn pango_strip(message: &str) -> String {
    let mut out = message.to_string();
    for tag in ["b", "big", "i", "s", "sub", "sup", "small", "tt", "u"] {
        out = out
            .replace(&format!("<{}>", tag), "")
            .replace(&format!("</{}>", tag), "");
    }
    let out = SPAN_RE.replace_all(&out, "");
    ENTITY_RE.replace_all(&out, "").into_owned()
}

/// Convert old-style markup in a message line to Pango, reporting cases
/// that need a manual fix. Returns the possibly rewritten line.
pub fn pangoize(message: &str, filename: &str, lineno: usize, reporter: &mut Reporter) -> String {
    let mut message = message.to_string();
    // A bare ampersand followed by whitespace needs escaping.
    if let Some(amper) = message.find('&') {
        if message[amper + 1..].starts_with(char::is_whitespace) {
            message = format!("{}&amp;{}", &message[..amper], &message[amper + 1..]);
        }
    }
    if let Some(rgb) = RGB_RE.captures(&message) {
        let channel = |i: usize| -> u32 { rgb[i].parse::<u32>().unwrap_or(255).min(255) };
        let hexed = format!("{:02x}{:02x}{:02x}", channel(1), channel(2), channel(3));
        reporter.report(
            filename,
            lineno,
            format!(
                "color spec ({}) requires manual fix (<span color='#{}'>, </span>).",
                &rgb[0], hexed
            ),
        );
    }
    for (oldstyle, newstart, newend) in PANGO_CONVERSIONS {
        let Some(where_) = message.find(oldstyle) else {
            continue;
        };
        // Only convert a highlight that covers the whole string.
        if where_ == 0 || &message[where_ - 1..where_] != "\"" {
            continue;
        }
        if !message.trim_end().ends_with('"') {
            reporter.report(
                filename,
                lineno,
                format!(
                    "{} highlight at start of multiline string requires manual fix.",
                    oldstyle
                ),
            );
            continue;
        }
        if message.contains('+') {
            reporter.report(
                filename,
                lineno,
                format!("{} highlight in composite string requires manual fix.", oldstyle),
            );
            continue;
        }
        message = format!(
            "{}{}{}",
            &message[..where_],
            newstart,
            &message[where_ + oldstyle.len()..]
        );
        if let Some(endq) = message.rfind('"') {
            message = format!("{}{}{}", &message[..endq], newend, &message[endq..]);
        }
    }
    // Unescaped angle brackets outside Pango markup.
    if message.contains('<') || message.contains('>') {
        let reduced = pango_strip(&message);
        if reduced.contains('<') || reduced.contains('>') {
            if message == reduced {
                if let Some(here) = message.find('<') {
                    if !message[here..].starts_with("&lt;") {
                        message = format!("{}&lt;{}", &message[..here], &message[here + 1..]);
                    }
                }
                if let Some(here) = message.find('>') {
                    if !message[here..].starts_with("&gt;") {
                        message = format!("{}&gt;{}", &message[..here], &message[here + 1..]);
                    }
                }
            } else {
                reporter.report(
                    filename,
                    lineno,
                    "< or > in pango string requires manual fix.",
                );
            }
        }
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_convenience_tags() {
        assert_eq!(pango_strip("<b>bold</b> and <i>italic</i>"), "bold and italic");
    }

    #[test]
    fn test_strip_span_and_entities() {
        assert_eq!(
            pango_strip("<span color='green'>go</span> &amp; stop"),
            "go  stop"
        );
    }

    #[test]
    fn test_whole_string_highlight_converted() {
        let mut reporter = Reporter::new();
        let out = pangoize(
            "message=_ \"@Victory!\"",
            "a.cfg",
            3,
            &mut reporter,
        );
        assert_eq!(
            out,
            "message=_ \"<span color='green'>Victory!</span>\""
        );
        assert!(reporter.is_empty());
    }

    #[test]
    fn test_multiline_highlight_reported() {
        let mut reporter = Reporter::new();
        let out = pangoize("message=_ \"@Victory", "a.cfg", 3, &mut reporter);
        assert_eq!(out, "message=_ \"@Victory");
        assert_eq!(reporter.len(), 1);
    }

    #[test]
    fn test_rgb_color_spec_reported() {
        let mut reporter = Reporter::new();
        pangoize("message=_ \"<255,0,0>Danger\"", "a.cfg", 3, &mut reporter);
        let messages: Vec<String> = reporter.take().into_iter().map(|d| d.message).collect();
        assert!(messages[0].contains("#ff0000"));
    }

    #[test]
    fn test_bare_angle_brackets_escaped() {
        let mut reporter = Reporter::new();
        let out = pangoize("message=_ \"x < y\"", "a.cfg", 3, &mut reporter);
        assert_eq!(out, "message=_ \"x &lt; y\"");
    }
}
