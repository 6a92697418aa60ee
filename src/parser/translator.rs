//! The per-file pipeline.
//!
//! [`translate_file`] takes one file's text through the whole sequence: encoding
//! cleanup, map-block extraction and grid transforms, tag-balance tracking
//! with close-time validation, the local and global content checks, and the
//! syntax-rewrite pass. It returns the transformed text only when something
//! actually changed, so callers can skip rewriting untouched files.

use std::collections::VecDeque;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::discovery::{is_map, is_wml};
use crate::parser::attribute::parse_attribute;
use crate::parser::directives::Directive;
use crate::parser::elements::destring;
use crate::parser::iterator::WmlIterator;
use crate::parser::mapblock::{apply_map_changes, collect_map, render_rows, MapKind};
use crate::parser::tagstack::{CloseOutcome, TagStack};
use crate::registry::CorpusState;
use crate::report::Reporter;
use crate::rules::rewrite;
use crate::validation::{global_sanity_check, local_sanity_check, validate_on_pop};
use crate::LintOptions;

const UTF8_BOM: char = '\u{feff}';

static TAG_TOKEN_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(/?)\+?([a-z][a-z_]*[a-z])\]").unwrap());
static ATTRIBUTE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z][a-z_]*[a-z])\s*=(.*)").unwrap());
static PATH_KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*path=").unwrap());
static MAP_REF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{@?([^A-Z].*)\}").unwrap());
static DISPLAY_ON_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"wmllint: *display +on").unwrap());
static DISPLAY_OFF_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"wmllint: *display +off").unwrap());

/// Run one file through the pipeline.
///
/// Returns the transformed text when any pass changed it, `None` when the
/// file is already clean. Diagnostics accumulate in `reporter` either way.
pub fn translate_file(
    filename: &str,
    text: &str,
    state: &mut CorpusState,
    options: &LintOptions,
    reporter: &mut Reporter,
) -> Option<String> {
    let mut text_ref = text;
    if let Some(stripped) = text_ref.strip_prefix(UTF8_BOM) {
        reporter.report_file(filename, "removed UTF-8 BOM character at the start of the file");
        text_ref = stripped;
    }
    let mut terminator = "\n";
    let mut lines: Vec<String> = Vec::new();
    let mut raw: Vec<&str> = text_ref.split('\n').collect();
    if raw.last() == Some(&"") {
        raw.pop();
    }
    for line in raw {
        match line.strip_suffix('\r') {
            Some(stripped) => {
                if !options.strip_cr {
                    terminator = "\r\n";
                }
                lines.push(stripped.to_string());
            }
            None => lines.push(line.to_string()),
        }
    }

    let map_only = filename.ends_with(".map") && !lines.iter().any(|l| l.contains("map_data"));
    let mut newdata = process_lines(filename, lines, map_only, options, reporter);

    if is_wml(filename) {
        // Purely local checks first; they run off one shared iterator pass.
        for visit in WmlIterator::new(&newdata, filename) {
            let attr = parse_attribute(&visit.text);
            local_sanity_check(filename, &visit, attr.as_ref(), state, reporter);
        }
        newdata = global_sanity_check(filename, newdata, state, options, reporter);
        newdata = rewrite(filename, newdata, options.missing_side, reporter);
    }

    let mut transformed = String::new();
    for line in &newdata {
        transformed.push_str(line);
        transformed.push_str(terminator);
    }
    if is_wml(filename) {
        check_word_wrap(filename, &transformed, reporter);
    }
    // Compare against the raw input: stripping the BOM alone must still
    // count as a change or fix mode would report it without writing it.
    if transformed != text {
        Some(transformed)
    } else {
        None
    }
}

/// The structural walk: map blocks are collected and transformed, text
/// lines feed the tag stack and its close-time validation.
fn process_lines(
    filename: &str,
    lines: Vec<String>,
    map_only: bool,
    options: &LintOptions,
    reporter: &mut Reporter,
) -> Vec<String> {
    let mut feed: VecDeque<String> = lines.into();
    let mut newdata: Vec<String> = Vec::new();
    let mut stack = TagStack::new();
    let mut lineno = 0usize; // consumed-line count; equals the 1-based number of the current line
    let mut validate = true;
    let mut unbalanced = false;

    if map_only {
        let mut block = collect_map(&mut feed, &mut lineno, kind_of(filename), filename, reporter);
        apply_map_changes(&mut block);
        render_rows(&block, &mut newdata);
        return newdata;
    }

    while let Some(line) = feed.pop_front() {
        lineno += 1;

        // A macro reference on a mask= line should name a mask file.
        if line.contains('{') && line.contains('}') {
            let open = line.find('{').unwrap_or(0);
            let close = line.rfind('}').unwrap_or(0);
            if close > open {
                let refname = &line[open..close];
                let all_caps = refname == refname.to_uppercase();
                if !all_caps
                    && line.contains("mask=")
                    && !refname.ends_with('}')
                    && !refname.ends_with(".mask")
                {
                    reporter.report(
                        filename,
                        lineno,
                        format!(
                            "mask file without .mask extension or not a mask file ({})",
                            refname
                        ),
                    );
                }
            }
        }

        let is_grid_opener = (line.contains("map_data=") || line.contains("mask="))
            && matches!(line.matches('"').count(), 1 | 2)
            && !line.contains("\"\"")
            && !line.contains('{')
            && !line.contains('}')
            && !stack.within("time");
        if is_grid_opener {
            let kind = if line.contains("map_data") {
                MapKind::Map
            } else {
                MapKind::Mask
            };
            let leadws = leader(&line).to_string();
            // Seed the feed with any grid content embedded on the opening
            // line, and the closing quote if the literal is one line short.
            let fields: Vec<&str> = line.split('"').collect();
            if fields.len() == 3 {
                feed.push_front("\"".to_string());
            }
            if fields.len() >= 2 && !fields[1].trim().is_empty() {
                feed.push_front(fields[1].to_string());
            }
            newdata.push(format!("{}{}", leadws, kind.attribute()));
            let mut block = collect_map(&mut feed, &mut lineno, kind, filename, reporter);
            apply_map_changes(&mut block);
            render_rows(&block, &mut newdata);
            newdata.push("\"".to_string());
            continue;
        }
        if line.contains("map_data=") && (line.contains('{') || line.contains('}')) {
            // External grid references only need the right extension.
            let mut newline = line.clone();
            if let Some(caps) = MAP_REF_RE.captures(&line) {
                let mapfile = caps[1].to_string();
                if !is_map(&mapfile) {
                    newline = newline.replace(&mapfile, &format!("{}.map", mapfile));
                    reporter.notice(filename, lineno, format!("{} -> {}.map", mapfile, mapfile));
                }
            }
            newdata.push(newline);
            continue;
        }
        if line.contains("map_data=") && line.matches('"').count() > 1 {
            reporter.report(filename, lineno, "one-line map.");
            newdata.push(line);
            continue;
        }

        // An ordinary text line. Maintain the tag stack off a
        // string-blanked copy so quoted tags do not confuse it.
        let mut in_string = false;
        let (destringed, comment) = destring(&line, &mut in_string);
        let trimmed = line.split('#').next().unwrap_or("");
        if !unbalanced && !PATH_KEY_RE.is_match(&destringed) {
            for caps in TAG_TOKEN_RE.captures_iter(&destringed) {
                let tag = caps[2].to_string();
                if &caps[1] != "/" {
                    stack.push(&tag, lineno);
                } else if stack.is_empty() {
                    reporter.report(
                        filename,
                        lineno,
                        format!("closer [/{}] with tag stack empty.", tag),
                    );
                } else {
                    if validate && stack.under(&tag) {
                        validate_on_pop(
                            &stack,
                            &tag,
                            filename,
                            lineno - 1,
                            options.missing_side,
                            reporter,
                        );
                    }
                    if let CloseOutcome::Mismatched { expected, .. } = stack.close(&tag) {
                        reporter.report(
                            filename,
                            lineno,
                            format!("unbalanced [{}] closed with [/{}].", expected, tag),
                        );
                    }
                }
            }
            if !stack.is_empty() {
                for caps in ATTRIBUTE_RE.captures_iter(trimmed) {
                    let value = caps[2].split('#').next().unwrap_or("").trim();
                    stack.record_attribute(&caps[1], value);
                }
            }
        }
        match Directive::parse(&comment) {
            Some(Directive::ValidateOn) => validate = true,
            Some(Directive::ValidateOff) => validate = false,
            Some(Directive::UnbalancedOn) => unbalanced = true,
            Some(Directive::UnbalancedOff) => unbalanced = false,
            _ => {}
        }
        newdata.push(line);
    }

    if !stack.is_empty() {
        let open: Vec<&str> = stack.ancestors().collect();
        reporter.report(
            filename,
            lineno,
            format!("tag stack nonempty ({}) at end of file.", open.join(", ")),
        );
    }
    newdata
}

fn kind_of(filename: &str) -> MapKind {
    if filename.ends_with(".mask") {
        MapKind::Mask
    } else {
        MapKind::Map
    }
}

fn leader(s: &str) -> &str {
    &s[..s.len() - s.trim_start().len()]
}

/// Messages are kept on one logical line and wrapped by the engine; a
/// quote left open across a line break is the hand-wrapped style that
/// breaks translations. Blank-line separated paragraphs are fine.
fn check_word_wrap(filename: &str, text: &str, reporter: &mut Reporter) {
    let mut display_state = false;
    let mut singleline = false;
    let mut quotecount = 0usize;
    let lines: Vec<&str> = text.split('\n').collect();
    for (idx, raw) in lines.iter().enumerate() {
        let line = raw.strip_suffix('\r').unwrap_or(raw);
        if DISPLAY_ON_RE.is_match(line) {
            display_state = true;
        } else if DISPLAY_OFF_RE.is_match(line) {
            display_state = false;
        }
        let bytes = line.as_bytes();
        for i in 0..bytes.len() {
            if bytes[i] == b'"' {
                if !display_state {
                    quotecount += 1;
                    if quotecount % 2 == 0 {
                        singleline = false;
                    }
                }
            } else if bytes[i] == b'=' && i >= 7 && &bytes[i - 7..i] == b"message" {
                // Byte-wise: the window before '=' can fall inside a
                // multibyte character on non-ASCII lines.
                singleline = true;
            }
        }
        if singleline {
            singleline = false;
            let next_empty = lines
                .get(idx + 1)
                .map(|l| l.trim_end_matches('\r').is_empty())
                .unwrap_or(true);
            if !display_state && quotecount % 2 == 1 && !line.is_empty() && !next_empty {
                reporter.report(
                    filename,
                    idx + 1,
                    "nonstandard word-wrap style within message",
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(filename: &str, src: &str) -> (Option<String>, Vec<String>) {
        let mut state = CorpusState::new();
        let mut reporter = Reporter::new();
        let options = LintOptions::default();
        let out = translate_file(filename, src, &mut state, &options, &mut reporter);
        let messages = reporter.take().into_iter().map(|d| d.to_string()).collect();
        (out, messages)
    }

    #[test]
    fn test_clean_file_unchanged() {
        let src = "#textdomain wesnoth-test\n[scenario]\nid=test\n[/scenario]\n";
        let (out, _) = run("test.cfg", src);
        assert_eq!(out, None);
    }

    #[test]
    fn test_bom_removed_and_written() {
        let src = "\u{feff}#textdomain wesnoth-test\nx=1\n";
        let (out, messages) = run("test.cfg", src);
        assert_eq!(out, Some("#textdomain wesnoth-test\nx=1\n".to_string()));
        assert_eq!(
            messages,
            vec!["\"test.cfg\": removed UTF-8 BOM character at the start of the file"]
        );
    }

    #[test]
    fn test_unbalanced_tag_reported() {
        let src = "#textdomain t\n[event]\n[/message]\n";
        let (_, messages) = run("test.cfg", src);
        assert!(messages
            .iter()
            .any(|m| m == "\"test.cfg\", line 3: unbalanced [event] closed with [/message]."));
    }

    #[test]
    fn test_stray_closer_does_not_derail_stack() {
        // The stray [/message] is reported but leaves [event] open, so the
        // real closer still matches and the file ends balanced.
        let src = "#textdomain t\n[event]\n[/message]\n[/event]\n";
        let (_, messages) = run("test.cfg", src);
        assert!(messages
            .iter()
            .any(|m| m.contains("unbalanced [event] closed with [/message].")));
        assert!(!messages.iter().any(|m| m.contains("tag stack empty")));
        assert!(!messages.iter().any(|m| m.contains("tag stack nonempty")));
    }

    #[test]
    fn test_dangling_tag_reported() {
        let src = "#textdomain t\n[event]\nname=start\n";
        let (_, messages) = run("test.cfg", src);
        assert!(messages
            .iter()
            .any(|m| m.contains("tag stack nonempty (event) at end of file.")));
    }

    #[test]
    fn test_unbalanced_directive_suspends_tracking() {
        let src = "#textdomain t\n# wmllint: unbalanced-on\n[event]\n# wmllint: unbalanced-off\n";
        let (_, messages) = run("test.cfg", src);
        assert!(!messages.iter().any(|m| m.contains("tag stack nonempty")));
    }

    #[test]
    fn test_embedded_map_rewritten() {
        let src = "#textdomain t\nmap_data=\"\nGg^Voh,Gg\nGg,Gg\n\"\n";
        let (out, _) = run("test.cfg", src);
        let out = out.expect("map change should rewrite the file");
        assert!(out.contains("Gg^Vo,Gg"));
        assert!(out.contains("map_data=\""));
    }

    #[test]
    fn test_standalone_map_rewritten() {
        let (out, _) = run("scenario.map", "Gg^Voh,Gg\nGg,Gg\n");
        assert_eq!(out, Some("Gg^Vo,Gg\nGg,Gg\n".to_string()));
    }

    #[test]
    fn test_one_line_map_normalized() {
        // A single-line literal with embedded rows gets reflowed into the
        // standard multi-line form.
        let src = "#textdomain t\nmap_data=\"Gg,Gg\"\n";
        let (out, _) = run("test.cfg", src);
        assert_eq!(
            out,
            Some("#textdomain t\nmap_data=\"\nGg,Gg\n\"\n".to_string())
        );
    }

    #[test]
    fn test_empty_one_line_map_reported() {
        let src = "#textdomain t\nmap_data=\"\"\n";
        let (out, messages) = run("test.cfg", src);
        assert!(out.is_none());
        assert!(messages
            .iter()
            .any(|m| m == "\"test.cfg\", line 2: one-line map."));
    }

    #[test]
    fn test_map_reference_gets_extension() {
        let src = "#textdomain t\nmap_data=\"{~add-ons/Mine/maps/plains}\"\n";
        let (out, _) = run("test.cfg", src);
        let out = out.expect("extension should be appended");
        assert!(out.contains("{~add-ons/Mine/maps/plains.map}"));
    }

    #[test]
    fn test_mask_reference_untouched() {
        let src = "#textdomain t\nmask=\"{~add-ons/Mine/maps/cover.mask}\"\n";
        let (out, _) = run("test.cfg", src);
        assert!(out.is_none());
    }

    #[test]
    fn test_side_validated_on_close() {
        let src = "#textdomain t\n[scenario]\nid=t\n[side]\nside=1\n[/side]\n[/scenario]\n";
        let (_, messages) = run("test.cfg", src);
        assert!(messages
            .iter()
            .any(|m| m.contains("[side] without type attribute")));
    }

    #[test]
    fn test_validate_off_suppresses_pop_checks() {
        let src = "#textdomain t\n# wmllint: validate-off\n[scenario]\nid=t\n[side]\nside=1\n[/side]\n[/scenario]\n";
        let (_, messages) = run("test.cfg", src);
        assert!(!messages.iter().any(|m| m.contains("[side] without type")));
    }

    #[test]
    fn test_quoted_tag_not_tracked() {
        let src = "#textdomain t\n[event]\n[message]\nmessage=_ \"press [escape] now\"\n[/message]\n[/event]\n";
        let (_, messages) = run("test.cfg", src);
        assert!(!messages.iter().any(|m| m.contains("unbalanced")));
    }

    #[test]
    fn test_word_wrap_warning() {
        let src = "#textdomain t\n[event]\n[message]\nspeaker=narrator\nmessage=_ \"Split across\nlines by hand\"\n[/message]\n[/event]\n";
        let (_, messages) = run("test.cfg", src);
        assert!(messages
            .iter()
            .any(|m| m.contains("nonstandard word-wrap style within message")));
    }

    #[test]
    fn test_word_wrap_check_survives_non_ascii() {
        // '=' inside Cyrillic text puts multibyte characters in the window
        // before it; the scan must not slice mid-character.
        let src = "#textdomain t\n[event]\n[message]\nmessage=_ \"Привет=мир\"\n[/message]\n[/event]\n";
        let (_, messages) = run("test.cfg", src);
        assert!(!messages
            .iter()
            .any(|m| m.contains("nonstandard word-wrap")));
    }

    #[test]
    fn test_paragraph_break_allowed() {
        let src = "#textdomain t\n[event]\n[message]\nspeaker=narrator\nmessage=_ \"A paragraph.\n\nAnother paragraph.\"\n[/message]\n[/event]\n";
        let (_, messages) = run("test.cfg", src);
        assert!(!messages
            .iter()
            .any(|m| m.contains("nonstandard word-wrap")));
    }

    #[test]
    fn test_crlf_preserved() {
        let src = "#textdomain t\r\nx=1\r\n";
        let (out, _) = run("test.cfg", src);
        assert!(out.is_none());
    }

    #[test]
    fn test_mask_macro_without_extension() {
        let src = "#textdomain t\nmask=\"{MASKS_DIR/cover}\" # not all caps\n";
        let (_, messages) = run("test.cfg", src);
        // All-caps macro arguments are exempt; this one mixes case.
        assert!(messages.iter().any(|m| m.contains("mask file without .mask extension")));
    }
}
