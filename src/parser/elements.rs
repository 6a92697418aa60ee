//! Typed per-line lexing.
//!
//! Rather than answering "does this substring appear in the line" at every
//! call site, each line is scanned once into a small sequence of typed
//! events: tag openers and closers, attribute starts, multi-line macro
//! boundaries, and preprocessor definitions. String literals are blanked
//! before scanning, with open-string state carried across physical lines
//! so tags inside multi-line quoted text are never misread as structure.

use once_cell::sync::Lazy;
use regex::Regex;

use super::attribute::parse_attribute;

static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[(/?)(\+?)([a-z][a-z_]*[a-z])\]").unwrap());
static DEFINE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#define\s+(\S+)").unwrap());

/// A structural event found on one line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// `[tag]` or the amendment form `[+tag]`.
    Open { name: String, amendment: bool },
    /// `[/tag]`.
    Close(String),
    /// `key=...` on a line with no tag tokens.
    Attribute(String),
    /// A `{MACRO` invocation left open at end of line.
    MacroOpen(String),
    /// A `}` closing a multi-line macro invocation.
    MacroClose,
    /// `#define NAME`.
    Define(String),
    /// `#enddef`.
    EndDef,
}

impl Element {
    /// Whether this element opens a scope.
    pub fn is_opener(&self) -> bool {
        matches!(
            self,
            Element::Open { .. } | Element::MacroOpen(_) | Element::Define(_)
        )
    }

    /// The label this element contributes to an ancestor chain,
    /// e.g. `[event]`, `#define`, or `{MACRO`.
    pub fn scope_label(&self) -> Option<String> {
        match self {
            Element::Open { name, .. } => Some(format!("[{}]", name)),
            Element::MacroOpen(name) => Some(format!("{{{}", name)),
            Element::Define(_) => Some("#define".to_string()),
            _ => None,
        }
    }

    /// The bare tag name, for tag openers and closers.
    pub fn tag_name(&self) -> Option<&str> {
        match self {
            Element::Open { name, .. } => Some(name),
            Element::Close(name) => Some(name),
            _ => None,
        }
    }
}

/// One scanned line: string-blanked code text, trailing comment, and the
/// typed elements found.
#[derive(Debug, Clone, Default)]
pub struct ScannedLine {
    /// The line with string-literal contents removed and the comment cut off.
    pub code: String,
    /// The trailing comment including its leading `#`, or empty.
    pub comment: String,
    /// Structural events in source order.
    pub elements: Vec<Element>,
}

/// Remove string-literal contents and split off the trailing comment.
///
/// `in_string` carries open-literal state between physical lines. A `#`
/// inside a string literal does not start a comment.
pub fn destring(line: &str, in_string: &mut bool) -> (String, String) {
    let mut code = String::with_capacity(line.len());
    let mut comment = String::new();
    for (i, ch) in line.char_indices() {
        if *in_string {
            if ch == '"' {
                *in_string = false;
            }
            continue;
        }
        match ch {
            '"' => *in_string = true,
            '#' => {
                comment = line[i..].to_string();
                break;
            }
            c => code.push(c),
        }
    }
    (code, comment)
}

/// Scan one line into typed elements, updating cross-line string state.
pub fn scan_line(line: &str, in_string: &mut bool) -> ScannedLine {
    let was_in_string = *in_string;
    let (code, comment) = destring(line, in_string);
    let mut scanned = ScannedLine {
        code,
        comment,
        elements: Vec::new(),
    };

    // Preprocessor lines: only #define/#enddef are structural, everything
    // else starting with '#' is a comment or conditional handled elsewhere.
    let trimmed = line.trim_start();
    if !was_in_string && trimmed.starts_with('#') {
        if let Some(caps) = DEFINE_RE.captures(trimmed) {
            scanned.elements.push(Element::Define(caps[1].to_string()));
        } else if trimmed.starts_with("#enddef") {
            scanned.elements.push(Element::EndDef);
        }
        return scanned;
    }

    for caps in TAG_RE.captures_iter(&scanned.code) {
        let name = caps[3].to_string();
        if &caps[1] == "/" {
            scanned.elements.push(Element::Close(name));
        } else {
            scanned.elements.push(Element::Open {
                name,
                amendment: &caps[2] == "+",
            });
        }
    }

    // Multi-line macro boundaries: a net brace surplus opens a macro
    // scope, a net deficit closes one per unmatched brace.
    let mut depth: i32 = 0;
    let mut open_at: Option<usize> = None;
    for (i, ch) in scanned.code.char_indices() {
        match ch {
            '{' => {
                depth += 1;
                if depth == 1 {
                    open_at = Some(i);
                }
            }
            '}' => {
                depth -= 1;
                if depth >= 0 {
                    open_at = None;
                }
            }
            _ => {}
        }
    }
    if depth > 0 {
        let name = open_at
            .map(|i| {
                scanned.code[i + 1..]
                    .split(|c: char| c.is_whitespace() || c == '}' || c == '(')
                    .next()
                    .unwrap_or("")
                    .to_string()
            })
            .unwrap_or_default();
        scanned.elements.push(Element::MacroOpen(name));
    } else {
        for _ in 0..(-depth) {
            scanned.elements.push(Element::MacroClose);
        }
    }

    if scanned.elements.is_empty() && scanned.code.contains('=') {
        if let Some(attr) = parse_attribute(line) {
            scanned.elements.push(Element::Attribute(attr.key));
        }
    }

    scanned
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn scan(line: &str) -> Vec<Element> {
        let mut in_string = false;
        scan_line(line, &mut in_string).elements
    }

    #[test]
    fn test_open_and_close_tags() {
        assert_eq!(
            scan("[event]"),
            vec![Element::Open {
                name: "event".to_string(),
                amendment: false
            }]
        );
        assert_eq!(scan("    [/event]"), vec![Element::Close("event".to_string())]);
    }

    #[test]
    fn test_amendment_tag() {
        assert_eq!(
            scan("[+side]"),
            vec![Element::Open {
                name: "side".to_string(),
                amendment: true
            }]
        );
    }

    #[test]
    fn test_attribute_line() {
        assert_eq!(
            scan("    side=1"),
            vec![Element::Attribute("side".to_string())]
        );
    }

    #[test]
    fn test_tag_inside_string_ignored() {
        let mut in_string = false;
        let first = scan_line("message=_ \"press [escape] to", &mut in_string);
        assert_eq!(first.elements, vec![]);
        assert!(in_string);
        let second = scan_line("continue\" # done", &mut in_string);
        assert!(!in_string);
        assert_eq!(second.elements, vec![]);
        assert_eq!(second.comment, "# done");
    }

    #[test]
    fn test_multiline_macro_boundaries() {
        assert_eq!(
            scan("{NAMED_UNIT 2 (Orcish Grunt"),
            vec![Element::MacroOpen("NAMED_UNIT".to_string())]
        );
        assert_eq!(scan(")}"), vec![Element::MacroClose]);
    }

    #[test]
    fn test_balanced_macro_is_not_scope() {
        assert_eq!(scan("{RECALL Kaleh}"), vec![]);
    }

    #[test]
    fn test_define_and_enddef() {
        assert_eq!(
            scan("#define MY_MACRO"),
            vec![Element::Define("MY_MACRO".to_string())]
        );
        assert_eq!(scan("#enddef"), vec![Element::EndDef]);
    }

    #[test]
    fn test_comment_line_has_no_elements() {
        assert_eq!(scan("# just a note about side=1"), vec![]);
    }

    #[test]
    fn test_scope_labels() {
        assert_eq!(
            Element::Open {
                name: "event".to_string(),
                amendment: false
            }
            .scope_label()
            .unwrap(),
            "[event]"
        );
        assert_eq!(
            Element::MacroOpen("FOO".to_string()).scope_label().unwrap(),
            "{FOO"
        );
    }
}
