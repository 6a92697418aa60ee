//! Open-tag tracking.
//!
//! The checker keeps a stack of open tags while walking a file, each frame
//! accumulating the attributes and child tags seen before the frame closes.
//! Close-time validation hooks inspect the finished frame together with its
//! ancestor chain.

use std::collections::HashMap;

/// One open tag and everything observed inside it so far.
#[derive(Debug, Clone, Default)]
pub struct TagFrame {
    pub name: String,
    /// 1-based line the tag opened on.
    pub line: usize,
    /// Attribute values with quotes stripped; later occurrences win.
    pub attributes: HashMap<String, String>,
    /// Names of direct child tags, recorded as they close.
    pub subtags: Vec<String>,
}

impl TagFrame {
    pub fn new(name: &str, line: usize) -> Self {
        TagFrame {
            name: name.to_string(),
            line,
            ..TagFrame::default()
        }
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(|s| s.as_str())
    }

    pub fn has_attr(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }
}

/// The outcome of closing a tag.
#[derive(Debug)]
pub enum CloseOutcome {
    /// The closer matched the innermost open tag.
    Matched(TagFrame),
    /// The closer named a different tag. The stack is left untouched so a
    /// later correct closer still matches.
    Mismatched { expected: String },
    /// Nothing was open.
    Unopened,
}

#[derive(Debug, Clone, Default)]
pub struct TagStack {
    frames: Vec<TagFrame>,
}

impl TagStack {
    pub fn new() -> Self {
        TagStack::default()
    }

    pub fn push(&mut self, name: &str, line: usize) {
        self.frames.push(TagFrame::new(name, line));
    }

    /// Close `name`, recording it as a subtag of the parent frame. A stray
    /// closer is reported back without disturbing the open frames.
    pub fn close(&mut self, name: &str) -> CloseOutcome {
        match self.frames.last() {
            None => return CloseOutcome::Unopened,
            Some(top) if top.name != name => {
                return CloseOutcome::Mismatched {
                    expected: top.name.clone(),
                }
            }
            Some(_) => {}
        }
        let frame = match self.frames.pop() {
            Some(f) => f,
            None => return CloseOutcome::Unopened,
        };
        if let Some(parent) = self.frames.last_mut() {
            parent.subtags.push(name.to_string());
        }
        CloseOutcome::Matched(frame)
    }

    /// Record an attribute on the innermost open tag, if any.
    pub fn record_attribute(&mut self, key: &str, value: &str) {
        if let Some(top) = self.frames.last_mut() {
            top.attributes
                .insert(key.to_string(), value.to_string());
        }
    }

    pub fn top(&self) -> Option<&TagFrame> {
        self.frames.last()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// The names of all open tags, outermost first.
    pub fn ancestors(&self) -> impl Iterator<Item = &str> {
        self.frames.iter().map(|f| f.name.as_str())
    }

    /// Frames still open when the file ended, for dangling-tag reports.
    pub fn frames(&self) -> &[TagFrame] {
        &self.frames
    }

    /// Did `tag` lead one of the enclosing contexts?
    pub fn within(&self, tag: &str) -> bool {
        self.ancestors().any(|name| name == tag)
    }

    pub fn within_any(&self, tags: &[&str]) -> bool {
        tags.iter().any(|t| self.within(t))
    }

    /// Did `tag` lead the innermost context?
    pub fn under(&self, tag: &str) -> bool {
        self.top().map(|f| f.name == tag).unwrap_or(false)
    }

    /// Are we inside a standard unit filter, where `type=` and friends name
    /// unit types rather than arbitrary text? `[message]` counts only as the
    /// innermost context because its `[option]` children carry menu text
    /// that must not be touched.
    pub fn standard_unit_filter(&self) -> bool {
        const FILTER_TAGS: &[&str] = &[
            "filter",
            "filter_second",
            "filter_adjacent",
            "filter_opponent",
            "unit_filter",
            "secondary_unit_filter",
            "special_filter",
            "special_filter_second",
            "neighbor_unit_filter",
            "recall",
            "teleport",
            "kill",
            "unstone",
            "store_unit",
            "have_unit",
            "scroll_to_unit",
            "role",
            "hide_unit",
            "unhide_unit",
            "protect_unit",
            "target",
            "avoid",
        ];
        self.within_any(FILTER_TAGS) || self.under("message")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_matched_close_returns_frame() {
        let mut stack = TagStack::new();
        stack.push("scenario", 1);
        stack.push("side", 2);
        stack.record_attribute("side", "1");
        match stack.close("side") {
            CloseOutcome::Matched(frame) => {
                assert_eq!(frame.name, "side");
                assert_eq!(frame.attr("side"), Some("1"));
                assert_eq!(frame.line, 2);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(stack.top().unwrap().subtags, vec!["side"]);
    }

    #[test]
    fn test_mismatched_close_leaves_stack() {
        let mut stack = TagStack::new();
        stack.push("event", 1);
        match stack.close("side") {
            CloseOutcome::Mismatched { expected } => assert_eq!(expected, "event"),
            other => panic!("unexpected outcome: {:?}", other),
        }
        // The open frame survives, so the right closer still matches and no
        // phantom subtag is recorded anywhere.
        assert_eq!(stack.len(), 1);
        assert!(matches!(stack.close("event"), CloseOutcome::Matched(_)));
        assert!(stack.is_empty());
    }

    #[test]
    fn test_unopened_close() {
        let mut stack = TagStack::new();
        assert!(matches!(stack.close("side"), CloseOutcome::Unopened));
    }

    #[test]
    fn test_context_predicates() {
        let mut stack = TagStack::new();
        stack.push("scenario", 1);
        stack.push("event", 5);
        stack.push("filter", 6);
        assert!(stack.within("scenario"));
        assert!(stack.under("filter"));
        assert!(!stack.under("event"));
        assert!(stack.standard_unit_filter());
    }

    #[test]
    fn test_message_filter_is_innermost_only() {
        let mut stack = TagStack::new();
        stack.push("message", 1);
        assert!(stack.standard_unit_filter());
        stack.push("option", 2);
        assert!(!stack.standard_unit_filter());
    }
}
