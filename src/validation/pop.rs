//! Close-time tag validation.
//!
//! When a closing tag matches the top of the tag stack, the finished frame
//! is checked against the attributes and children it accumulated. All
//! findings are advisory.

use crate::parser::tagstack::TagStack;
use crate::report::Reporter;

/// Validate the innermost open frame as `closer` closes it.
///
/// `missing_side` enables the checks for tags that once defaulted to
/// side 1 and now apply to all sides.
pub fn validate_on_pop(
    stack: &TagStack,
    closer: &str,
    filename: &str,
    lineno: usize,
    missing_side: bool,
    reporter: &mut Reporter,
) {
    let frame = match stack.top() {
        Some(f) => f,
        None => return,
    };
    let ancestors: Vec<&str> = stack.ancestors().collect();
    let line = lineno + 1;

    // An empty [side] without a type deserializes to an empty unit and
    // crashes the game. The final attribute-count test tolerates campaigns
    // that generate entire side declarations with macros.
    if ancestors.contains(&"scenario")
        && closer == "side"
        && !frame.has_attr("type")
        && frame.attr("no_leader") != Some("yes")
        && frame.attr("controller") != Some("null")
        && !ancestors.contains(&"multiplayer")
        && !frame.subtags.iter().any(|t| t == "leader")
        && !frame.attributes.is_empty()
    {
        reporter.report(filename, line, "[side] without type attribute");
    }
    if !filename.contains("units") && closer == "unit" && frame.has_attr("race") {
        reporter.report(filename, line, "[unit] needs hand fixup to [unit_type]");
    }
    if (closer == "campaign" || closer == "race") && !frame.has_attr("id") {
        reporter.report(
            filename,
            line,
            format!("{} requires an ID attribute but has none", closer),
        );
    }
    if closer == "terrain" && matches!(frame.attr("heals"), Some("true") | Some("false")) {
        reporter.report(filename, line, "heals attribute no longer takes a boolean");
    }
    if closer == "unit"
        && frame.has_attr("id")
        && frame.has_attr("type")
        && !frame.has_attr("side")
        && !ancestors.contains(&"side")
    {
        reporter.report(filename, line, "unit declaration without side attribute");
    }
    if closer == "theme" {
        if !frame.has_attr("id") {
            if frame.has_attr("name") {
                reporter.report(
                    filename,
                    line,
                    "using [theme]name= instead of [theme]id= is deprecated",
                );
            } else {
                reporter.report(filename, line, "[theme] needs an id attribute");
            }
        }
        // User-visible themes need a UI name and description.
        if !matches!(frame.attr("hidden"), Some("yes") | Some("true")) {
            for attr in ["name", "description"] {
                if !frame.has_attr(attr) {
                    reporter.report(
                        filename,
                        line,
                        format!("[theme] needs a {} attribute unless hidden=yes", attr),
                    );
                }
            }
        }
    }
    if closer == "filter_side" {
        let ancestor = if ancestors.contains(&"gold") {
            Some("gold")
        } else if ancestors.contains(&"modify_ai") {
            Some("modify_ai")
        } else {
            None
        };
        if let Some(ancestor) = ancestor {
            reporter.report(
                filename,
                line,
                format!(
                    "{} should have an inline SSF instead of using [filter_side]",
                    ancestor
                ),
            );
        }
    }
    if closer == "effect" {
        if frame.has_attr("unit_type") {
            reporter.report(
                filename,
                line,
                "use [effect][filter]type= instead of [effect]unit_type=",
            );
        }
        if frame.has_attr("unit_gender") {
            reporter.report(
                filename,
                line,
                "use [effect][filter]gender= instead of [effect]unit_gender=",
            );
        }
    }
    if missing_side
        && ["set_recruit", "allow_recruit", "disallow_recruit", "store_gold"].contains(&closer)
        && !frame.has_attr("side")
    {
        reporter.report(
            filename,
            line,
            format!(
                "{} without \"side\" attribute is now applied to all sides",
                closer
            ),
        );
    }
    if closer == "variation" && !frame.has_attr("variation_id") {
        reporter.report(
            filename,
            line,
            "[variation] is missing required variation_id attribute",
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn check(stack: &TagStack, closer: &str, missing_side: bool) -> Vec<String> {
        let mut reporter = Reporter::new();
        validate_on_pop(stack, closer, "test.cfg", 9, missing_side, &mut reporter);
        reporter.take().into_iter().map(|d| d.message).collect()
    }

    #[test]
    fn test_side_without_type() {
        let mut stack = TagStack::new();
        stack.push("scenario", 1);
        stack.push("side", 2);
        stack.record_attribute("side", "1");
        assert_eq!(check(&stack, "side", false), vec!["[side] without type attribute"]);
    }

    #[test]
    fn test_side_with_leader_subtag_passes() {
        let mut stack = TagStack::new();
        stack.push("scenario", 1);
        stack.push("side", 2);
        stack.record_attribute("side", "1");
        if let Some(frame) = stack.frames().last() {
            assert_eq!(frame.name, "side");
        }
        stack.record_attribute("no_leader", "yes");
        assert!(check(&stack, "side", false).is_empty());
    }

    #[test]
    fn test_macro_generated_side_tolerated() {
        let mut stack = TagStack::new();
        stack.push("scenario", 1);
        stack.push("side", 2);
        // No attributes at all: assume a macro fills the side in.
        assert!(check(&stack, "side", false).is_empty());
    }

    #[test]
    fn test_campaign_requires_id() {
        let mut stack = TagStack::new();
        stack.push("campaign", 1);
        stack.record_attribute("name", "My Campaign");
        assert_eq!(
            check(&stack, "campaign", false),
            vec!["campaign requires an ID attribute but has none"]
        );
    }

    #[test]
    fn test_theme_visibility_attributes() {
        let mut stack = TagStack::new();
        stack.push("theme", 1);
        stack.record_attribute("id", "mytheme");
        stack.record_attribute("hidden", "yes");
        assert!(check(&stack, "theme", false).is_empty());

        let mut stack = TagStack::new();
        stack.push("theme", 1);
        stack.record_attribute("id", "mytheme");
        let messages = check(&stack, "theme", false);
        assert_eq!(messages.len(), 2);
        assert!(messages[0].contains("needs a name attribute"));
    }

    #[test]
    fn test_missing_side_gated() {
        let mut stack = TagStack::new();
        stack.push("event", 1);
        stack.push("allow_recruit", 2);
        stack.record_attribute("type", "Wolf Rider");
        assert!(check(&stack, "allow_recruit", false).is_empty());
        assert_eq!(
            check(&stack, "allow_recruit", true),
            vec!["allow_recruit without \"side\" attribute is now applied to all sides"]
        );
    }

    #[test]
    fn test_effect_filter_attributes() {
        let mut stack = TagStack::new();
        stack.push("effect", 1);
        stack.record_attribute("unit_type", "Mage");
        assert_eq!(
            check(&stack, "effect", false),
            vec!["use [effect][filter]type= instead of [effect]unit_type="]
        );
    }
}
