//! Per-line sanity checks.
//!
//! These need only the current line and its ancestor chain, so they run in
//! a single iterator pass per file. Attribute-shaped lines arrive already
//! split; structural lines arrive with no attribute.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::parser::attribute::Attribute;
use crate::parser::directives::Directive;
use crate::parser::elements::Element;
use crate::parser::iterator::Visit;
use crate::registry::{CorpusState, ScenarioRef};
use crate::report::Reporter;

static BAD_TR_MARK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[=(]\s*_\s+("|<<)?"#).unwrap());

/// Tags allowed inside a [part] story block.
const PART_CHILDREN: &[&str] = &[
    "[part]",
    "[background_layer]",
    "[image]",
    "[insert_tag]",
    "[if]",
    "[then]",
    "[elseif]",
    "[else]",
    "[switch]",
    "[case]",
    "[variable]",
    "[deprecated_message]",
    "[wml_message]",
];

/// Tags allowed inside an [if] conditional.
const IF_CHILDREN: &[&str] = &[
    "[and]",
    "[else]",
    "[elseif]",
    "[frame]",
    "[have_location]",
    "[have_unit]",
    "[not]",
    "[or]",
    "[then]",
    "[lua]",
    "[variable]",
    "[true]",
    "[false]",
    "[found_item]",
    "[proceed_to_next_scenario]",
];

/// Attributes meaningful only inside an [ai] block.
const AI_ONLY_KEYS: &[&str] = &[
    "number_of_possible_recruits_to_force_recruit",
    "recruitment_ignore_bad_movement",
    "recruitment_ignore_bad_combat",
    "recruitment_pattern",
    "villages_per_scout",
    "leader_value",
    "village_value",
    "aggression",
    "caution",
    "attack_depth",
    "grouping",
    "advancements",
];

pub fn local_sanity_check(
    filename: &str,
    visit: &Visit,
    attr: Option<&Attribute>,
    state: &mut CorpusState,
    reporter: &mut Reporter,
) {
    let line = visit.lineno + 1;
    let mut ancestors: &[String] = &visit.ancestors;
    let in_definition = visit.in_ancestors("#define");
    let in_call = visit.ancestor_starts_with("{");
    let ignored = visit.text.contains("wmllint: ignore");
    let parent = ancestors.last().cloned();
    if !ancestors.is_empty() {
        ancestors = &ancestors[..ancestors.len() - 1];
    }
    let parent = parent.as_deref();

    // Custom conditional tags are declared here rather than in the global
    // pass because the local pass runs first.
    if let Some(Directive::ConditionalTags(tags)) = Directive::parse(&visit.text) {
        for tag in tags {
            state.custom_conditionals.push(format!("[{}]", tag));
        }
    }

    // A translation mark must be followed by a string.
    if visit.text.contains('_') && !ignored {
        if let Some(caps) = BAD_TR_MARK_RE.captures(&visit.text) {
            if caps.get(1).is_none() {
                reporter.report(filename, line, "translatability mark before non-string");
            }
        }
    }

    for element in &visit.elements {
        let Element::Open { name, .. } = element else {
            continue;
        };
        let actual_tag = format!("[{}]", name);
        // Most tags are not allowed within [part].
        if (visit.in_ancestors("[part]") || parent == Some("[part]"))
            && !PART_CHILDREN.contains(&actual_tag.as_str())
        {
            reporter.report(
                filename,
                line,
                format!("{} not permitted within [part] tag", actual_tag),
            );
        }
        // Most tags are not permitted inside [if].
        let under_if = (!ancestors.is_empty() && parent == Some("[if]"))
            || (ancestors.len() >= 2
                && parent == Some("#ifdef")
                && ancestors.last().map(|s| s.as_str()) == Some("[if]"));
        if under_if
            && !IF_CHILDREN.contains(&actual_tag.as_str())
            && !name.ends_with("_frame")
            && !name.starts_with("filter")
            && !state.custom_conditionals.contains(&actual_tag)
        {
            reporter.report(
                filename,
                line,
                format!("illegal child of [if]: {}", actual_tag),
            );
        }
    }

    let Some(attr) = attr else {
        return;
    };
    let key = attr.key.as_str();
    let value = attr.value.as_str();

    if parent == Some("[entry]") && key == "email" && value.contains(' ') {
        reporter.report(filename, line, "space in email name");
    }
    if !in_definition
        && !in_call
        && !visit.in_ancestors("[ai]")
        && !ignored
        && AI_ONLY_KEYS.contains(&key)
    {
        reporter.report(filename, line, format!("{} outside [ai] scope", key));
    }
    if matches!(parent, Some("[allow_recruit]") | Some("[disallow_recruit]")) && key == "recruit" {
        reporter.report(filename, line, "recruit= should be type=");
    }
    if parent == Some("[textdomain]") && key == "path" && !value.contains("/translations") {
        reporter.report(
            filename,
            line,
            "no reference to \"/translations\" directory in textdomain path",
        );
    }
    if parent == Some("[binary_path]")
        && key == "path"
        && (value.contains("/external") || value.contains("/public"))
    {
        reporter.report(
            filename,
            line,
            "\"/external\" or \"/public\" image directories should no longer be used",
        );
    }
    // Scenario linkage data for the corpus-wide consistency pass.
    if parent == Some("[campaign]") && key == "first_scenario" && value != "null" {
        state.next_refs.push(ScenarioRef {
            file: filename.to_string(),
            line,
            id: value.to_string(),
        });
    }
    if parent == Some("[scenario]") || parent.is_none() {
        if key == "next_scenario" && value != "null" {
            state.next_refs.push(ScenarioRef {
                file: filename.to_string(),
                line,
                id: value.to_string(),
            });
        }
        if key == "id" {
            state
                .scenario_to_file
                .insert(value.to_string(), filename.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::attribute::parse_attribute;
    use crate::parser::iterator::WmlIterator;
    use pretty_assertions::assert_eq;

    fn run(src: &str) -> (CorpusState, Vec<String>) {
        let lines: Vec<String> = src.lines().map(str::to_string).collect();
        let mut state = CorpusState::new();
        let mut reporter = Reporter::new();
        for visit in WmlIterator::new(&lines, "test.cfg") {
            let attr = parse_attribute(&visit.text);
            local_sanity_check("test.cfg", &visit, attr.as_ref(), &mut state, &mut reporter);
        }
        let messages = reporter.take().into_iter().map(|d| d.message).collect();
        (state, messages)
    }

    #[test]
    fn test_illegal_child_of_part() {
        let (_, messages) = run("[part]\n[unit]\n[/unit]\n[/part]");
        assert_eq!(messages, vec!["[unit] not permitted within [part] tag"]);
    }

    #[test]
    fn test_image_allowed_in_part() {
        let (_, messages) = run("[part]\n[image]\n[/image]\n[/part]");
        assert!(messages.is_empty());
    }

    #[test]
    fn test_illegal_child_of_if() {
        let (_, messages) = run("[event]\n[if]\n[message]\n[/message]\n[/if]\n[/event]");
        assert_eq!(messages, vec!["illegal child of [if]: [message]"]);
    }

    #[test]
    fn test_custom_conditional_accepted() {
        let (state, messages) = run(
            "# wmllint: conditional tag is_day\n[event]\n[if]\n[is_day]\n[/is_day]\n[/if]\n[/event]",
        );
        assert!(state.custom_conditionals.contains(&"[is_day]".to_string()));
        assert!(messages.is_empty());
    }

    #[test]
    fn test_ai_key_outside_ai() {
        let (_, messages) = run("[side]\naggression=0.5\n[/side]");
        assert_eq!(messages, vec!["aggression outside [ai] scope"]);
        let (_, messages) = run("[side]\n[ai]\naggression=0.5\n[/ai]\n[/side]");
        assert!(messages.is_empty());
    }

    #[test]
    fn test_ai_key_in_macro_definition_tolerated() {
        let (_, messages) = run("#define MY_AI\naggression=0.5\n#enddef");
        assert!(messages.is_empty());
    }

    #[test]
    fn test_translation_mark_before_non_string() {
        let (_, messages) = run("amount=_ 5");
        assert_eq!(messages, vec!["translatability mark before non-string"]);
        let (_, messages) = run("name=_ \"Bob\"");
        assert!(messages.is_empty());
    }

    #[test]
    fn test_recruit_should_be_type() {
        let (_, messages) = run("[allow_recruit]\nrecruit=Mage\n[/allow_recruit]");
        assert_eq!(messages, vec!["recruit= should be type="]);
    }

    #[test]
    fn test_scenario_linkage_collected() {
        let (state, _) =
            run("[scenario]\nid=01_Opening\nnext_scenario=02_Battle\n[/scenario]");
        assert_eq!(state.scenario_to_file["01_Opening"], "test.cfg");
        assert_eq!(state.next_refs.len(), 1);
        assert_eq!(state.next_refs[0].id, "02_Battle");
    }
}
