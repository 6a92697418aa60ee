//! Line-oriented scope walking.
//!
//! [`WmlIterator`] visits a file's lines in order while maintaining the
//! chain of enclosing scopes: tags, multi-line macro calls, `#define`
//! blocks, and preprocessor conditionals. Each visit snapshots the chain
//! before the line's own effects apply, so a closing line still sees the
//! scope it closes among its ancestors.

use super::elements::{scan_line, Element};

const CONDITIONALS: [&str; 6] = [
    "#ifdef", "#ifndef", "#ifhave", "#ifnhave", "#ifver", "#ifnver",
];

/// One visited line.
#[derive(Debug, Clone)]
pub struct Visit {
    /// 0-based line index; diagnostics add one.
    pub lineno: usize,
    /// The raw line text.
    pub text: String,
    /// Structural events found on the line.
    pub elements: Vec<Element>,
    /// Enclosing scope labels, outermost first, as of line entry.
    pub ancestors: Vec<String>,
}

impl Visit {
    /// The innermost enclosing scope label.
    pub fn parent(&self) -> Option<&str> {
        self.ancestors.last().map(|s| s.as_str())
    }

    /// The key of the line's attribute element, if it has one.
    pub fn attribute_key(&self) -> Option<&str> {
        self.elements.iter().find_map(|e| match e {
            Element::Attribute(key) => Some(key.as_str()),
            _ => None,
        })
    }

    /// The first tag opened on the line, bracketed.
    pub fn opened_tag(&self) -> Option<String> {
        self.elements.iter().find_map(|e| match e {
            Element::Open { .. } => e.scope_label(),
            _ => None,
        })
    }

    pub fn in_ancestors(&self, label: &str) -> bool {
        self.ancestors.iter().any(|a| a == label)
    }

    pub fn ancestor_starts_with(&self, prefix: &str) -> bool {
        self.ancestors.iter().any(|a| a.starts_with(prefix))
    }
}

/// A resumable walk over a slice of lines.
#[derive(Debug, Clone)]
pub struct WmlIterator<'a> {
    lines: &'a [String],
    pub fname: &'a str,
    next_index: usize,
    in_string: bool,
    scopes: Vec<String>,
    /// When set, iteration stops once the scope depth drops below this
    /// floor; the closing line itself is still yielded.
    floor: Option<usize>,
}

impl<'a> WmlIterator<'a> {
    pub fn new(lines: &'a [String], fname: &'a str) -> Self {
        WmlIterator {
            lines,
            fname,
            next_index: 0,
            in_string: false,
            scopes: Vec::new(),
            floor: None,
        }
    }

    pub fn has_next(&self) -> bool {
        self.next_index < self.lines.len()
    }

    /// The scope chain at the current position.
    pub fn ancestors(&self) -> &[String] {
        &self.scopes
    }

    /// A sub-iterator over the remainder of the current scope. It yields
    /// lines up to and including the one that closes the scope open at the
    /// current depth.
    pub fn scope_iter(&self) -> WmlIterator<'a> {
        let mut sub = self.clone();
        sub.floor = Some(self.scopes.len());
        sub
    }

    fn apply(&mut self, elements: &[Element]) {
        for element in elements {
            match element {
                Element::Open { .. } | Element::MacroOpen(_) | Element::Define(_) => {
                    if let Some(label) = element.scope_label() {
                        self.scopes.push(label);
                    }
                }
                Element::Close(name) => {
                    let label = format!("[{}]", name);
                    // Best effort on mismatches: drop the nearest match, or
                    // the innermost scope if none matches.
                    if let Some(pos) = self.scopes.iter().rposition(|s| *s == label) {
                        self.scopes.remove(pos);
                    } else {
                        self.scopes.pop();
                    }
                }
                Element::MacroClose => {
                    if let Some(pos) = self.scopes.iter().rposition(|s| s.starts_with('{')) {
                        self.scopes.remove(pos);
                    }
                }
                Element::EndDef => {
                    if let Some(pos) = self.scopes.iter().rposition(|s| s == "#define") {
                        self.scopes.remove(pos);
                    }
                }
                Element::Attribute(_) => {}
            }
        }
    }

    fn apply_conditional(&mut self, line: &str) {
        let trimmed = line.trim_start();
        if CONDITIONALS
            .iter()
            .any(|c| trimmed.starts_with(c) && trimmed[c.len()..].starts_with(char::is_whitespace))
            || CONDITIONALS.contains(&trimmed)
        {
            let word = trimmed.split_whitespace().next().unwrap_or(trimmed);
            self.scopes.push(word.to_string());
        } else if trimmed.starts_with("#endif") {
            if let Some(pos) = self.scopes.iter().rposition(|s| s.starts_with("#if")) {
                self.scopes.remove(pos);
            }
        }
    }
}

impl<'a> Iterator for WmlIterator<'a> {
    type Item = Visit;

    fn next(&mut self) -> Option<Visit> {
        let lineno = self.next_index;
        let text = self.lines.get(lineno)?.clone();
        self.next_index += 1;

        let scanned = scan_line(&text, &mut self.in_string);
        let visit = Visit {
            lineno,
            text,
            elements: scanned.elements,
            ancestors: self.scopes.clone(),
        };
        self.apply(&visit.elements);
        self.apply_conditional(&visit.text);

        if let Some(floor) = self.floor {
            if self.scopes.len() < floor {
                // This line closed the bounding scope; yield it, then end.
                self.next_index = self.lines.len();
            }
        }
        Some(visit)
    }
}
