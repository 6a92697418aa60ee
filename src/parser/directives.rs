//! Magic directive comments.
//!
//! A fixed vocabulary of `# wmllint: <directive>` comments reconfigures the
//! checker from inside the corpus. Each directive's scope is documented on
//! its variant: some apply from point of occurrence onward, some to the
//! whole file, some to the current line only.

use once_cell::sync::Lazy;
use regex::Regex;

use super::attribute::string_strip;

/// A recognized in-file control instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Re-enable close-time tag validation (point of occurrence onward).
    ValidateOn,
    /// Disable close-time tag validation.
    ValidateOff,
    /// Treat following content as intentionally unbalanced; suspends tag
    /// tracking until `UnbalancedOff`.
    UnbalancedOn,
    /// Resume tag tracking.
    UnbalancedOff,
    /// Toggle the ability/note pairing check.
    NoteCheck(bool),
    /// Toggle translation-mark checking.
    MarkCheck(bool),
    /// Toggle the death-event speaker check.
    DeathCheck(bool),
    /// Toggle quote counting in the word-wrap check.
    Display(bool),
    /// Pair an extra trait macro with a note macro (corpus scope).
    MatchNote {
        trait_macro: String,
        note_macro: String,
    },
    /// Declare custom conditional tag names (corpus scope).
    ConditionalTags(Vec<String>),
    /// Declare the characters a macro recalls or creates.
    Who { macro_name: String, names: String },
    /// Forget a `Who` pairing; `None` forgets all of them.
    UnWho(Option<String>),
    /// Declare which argument of a macro carries a character name.
    WhoFieldSet { macro_name: String, argno: usize },
    /// Forget a whofield declaration; `None` forgets all of them.
    WhoFieldClear(Option<String>),
    /// `whofield <macro>` with a non-numeric tail: drop that macro.
    WhoFieldRemove(String),
    /// Declare a character name as present.
    Recognize(String),
    /// Declare the usage class of a macro-generated unit type.
    UsageOf { unit: String, class: String },
    /// Declare non-standard recruit usage classes.
    UsageTypes(Vec<String>),
    /// Spelling exceptions for the whole corpus.
    GeneralSpellings(Vec<String>),
    /// Spelling exceptions for this file's directory.
    DirectorySpellings(Vec<String>),
    /// Spelling exceptions for this file.
    LocalSpellings(Vec<String>),
    /// Skip the ellipse check on this line.
    NoEllipseCheck,
    /// Skip spell-checking this line.
    NoSpellcheck,
    /// This file legitimately contains no translatable strings.
    NoTranslatables,
    /// Advance the expected side number without a [side] tag.
    SkipSide,
    /// Suppress checks on this line.
    Ignore,
    /// Suppress catalog renames on this line.
    NoConvert,
}

static WHO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"wmllint:\s*who\s+(.*?)\s+is\s+(.*)").unwrap());
static WHOFIELD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"wmllint:\s*whofield\s+(\S+)(?:\s+is)?\s*(\S*)").unwrap());
static MATCH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"wmllint:\s*match\s+(.*?)\s+with\s+(.*)").unwrap());
static USAGE_OF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"wmllint:\s*usage of "([^"]*)" is\s+(.*)"#).unwrap());
static SIMPLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"wmllint:\s*([a-z-]+(?:\s+[a-z]+)?)\s*(.*)").unwrap());

impl Directive {
    /// Parse the first directive found in a line of text (usually a
    /// comment). Prose that happens to contain "wmllint" but matches no
    /// directive yields `None`.
    pub fn parse(text: &str) -> Option<Directive> {
        if !text.contains("wmllint") {
            return None;
        }
        if let Some(caps) = WHO_RE.captures(text) {
            return Some(Directive::Who {
                macro_name: strip_macro(&caps[1]),
                names: caps[2].trim().to_string(),
            });
        }
        if let Some(caps) = MATCH_RE.captures(text) {
            return Some(Directive::MatchNote {
                trait_macro: caps[1].trim().to_string(),
                note_macro: caps[2].trim().to_string(),
            });
        }
        if let Some(caps) = USAGE_OF_RE.captures(text) {
            return Some(Directive::UsageOf {
                unit: caps[1].to_string(),
                class: caps[2].trim().to_string(),
            });
        }
        if text.contains("wmllint: whofield") {
            let caps = WHOFIELD_RE.captures(text)?;
            let first = caps[1].to_string();
            let tail = caps[2].to_string();
            if first.starts_with("clear") {
                let target = if tail.is_empty() { None } else { Some(tail) };
                return Some(Directive::WhoFieldClear(target));
            }
            if let Ok(argno) = tail.parse::<usize>() {
                if argno >= 1 {
                    return Some(Directive::WhoFieldSet {
                        macro_name: first,
                        argno,
                    });
                }
            }
            return Some(Directive::WhoFieldRemove(first));
        }

        let caps = SIMPLE_RE.captures(text)?;
        let head = caps[1].trim();
        let tail = caps[2].trim();
        let words = || -> Vec<String> { tail.split_whitespace().map(str::to_string).collect() };
        let csv = || -> Vec<String> {
            tail.split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };

        match head {
            "validate-on" => Some(Directive::ValidateOn),
            "validate-off" => Some(Directive::ValidateOff),
            "unbalanced-on" => Some(Directive::UnbalancedOn),
            "unbalanced-off" => Some(Directive::UnbalancedOff),
            "notecheck on" => Some(Directive::NoteCheck(true)),
            "notecheck off" => Some(Directive::NoteCheck(false)),
            "markcheck on" => Some(Directive::MarkCheck(true)),
            "markcheck off" => Some(Directive::MarkCheck(false)),
            "deathcheck on" => Some(Directive::DeathCheck(true)),
            "deathcheck off" => Some(Directive::DeathCheck(false)),
            "display on" => Some(Directive::Display(true)),
            "display off" => Some(Directive::Display(false)),
            "conditional tag" => Some(Directive::ConditionalTags(csv())),
            "unwho" => {
                let target = strip_macro(tail);
                if target.eq_ignore_ascii_case("all") {
                    Some(Directive::UnWho(None))
                } else {
                    Some(Directive::UnWho(Some(target)))
                }
            }
            "recognize" => Some(Directive::Recognize(
                string_strip(tail).trim().to_string(),
            )),
            "usagetype" | "usagetypes" => Some(Directive::UsageTypes(csv())),
            "general spelling" | "general spellings" => {
                Some(Directive::GeneralSpellings(words()))
            }
            "directory spelling" | "directory spellings" => {
                Some(Directive::DirectorySpellings(words()))
            }
            "local spelling" | "local spellings" => Some(Directive::LocalSpellings(words())),
            "no ellipsecheck" => Some(Directive::NoEllipseCheck),
            "no spellcheck" => Some(Directive::NoSpellcheck),
            "no translatables" => Some(Directive::NoTranslatables),
            "skip-side" => Some(Directive::SkipSide),
            "ignore" => Some(Directive::Ignore),
            "noconvert" => Some(Directive::NoConvert),
            _ => None,
        }
    }
}

/// Whether the line disables the syntax-rewrite pass for the rest of the
/// file. Checked on the raw line because the original convention accepts
/// the bare token anywhere in it.
pub fn is_no_syntax_rewrite(line: &str) -> bool {
    line.contains("no-syntax-rewrite")
}

fn strip_macro(token: &str) -> String {
    string_strip(token.trim())
        .trim_matches(|c| c == '{' || c == '}')
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_toggles() {
        assert_eq!(
            Directive::parse("# wmllint: validate-off"),
            Some(Directive::ValidateOff)
        );
        assert_eq!(
            Directive::parse("# wmllint: notecheck off"),
            Some(Directive::NoteCheck(false))
        );
        assert_eq!(
            Directive::parse("# wmllint: deathcheck on"),
            Some(Directive::DeathCheck(true))
        );
        assert_eq!(
            Directive::parse("#wmllint: markcheck on"),
            Some(Directive::MarkCheck(true))
        );
    }

    #[test]
    fn test_match_note() {
        assert_eq!(
            Directive::parse("# wmllint: match {ABILITY_FOO} with {NOTE_FOO}"),
            Some(Directive::MatchNote {
                trait_macro: "{ABILITY_FOO}".to_string(),
                note_macro: "{NOTE_FOO}".to_string(),
            })
        );
    }

    #[test]
    fn test_conditional_tags() {
        assert_eq!(
            Directive::parse("# wmllint: conditional tag frelse, is_day"),
            Some(Directive::ConditionalTags(vec![
                "frelse".to_string(),
                "is_day".to_string()
            ]))
        );
    }

    #[test]
    fn test_who_and_unwho() {
        assert_eq!(
            Directive::parse("# wmllint: who {RECRUIT_GUARDS} is Haldric, Jessene"),
            Some(Directive::Who {
                macro_name: "RECRUIT_GUARDS".to_string(),
                names: "Haldric, Jessene".to_string(),
            })
        );
        assert_eq!(
            Directive::parse("# wmllint: unwho {RECRUIT_GUARDS}"),
            Some(Directive::UnWho(Some("RECRUIT_GUARDS".to_string())))
        );
        assert_eq!(
            Directive::parse("# wmllint: unwho ALL"),
            Some(Directive::UnWho(None))
        );
    }

    #[test]
    fn test_whofield() {
        assert_eq!(
            Directive::parse("# wmllint: whofield SPAWN 2"),
            Some(Directive::WhoFieldSet {
                macro_name: "SPAWN".to_string(),
                argno: 2
            })
        );
        assert_eq!(
            Directive::parse("# wmllint: whofield clear SPAWN"),
            Some(Directive::WhoFieldClear(Some("SPAWN".to_string())))
        );
    }

    #[test]
    fn test_usage_of() {
        assert_eq!(
            Directive::parse("#wmllint: usage of \"Desert Fighter\" is fighter"),
            Some(Directive::UsageOf {
                unit: "Desert Fighter".to_string(),
                class: "fighter".to_string(),
            })
        );
    }

    #[test]
    fn test_spelling_directives() {
        assert_eq!(
            Directive::parse("# wmllint: local spellings tromp gryphonback"),
            Some(Directive::LocalSpellings(vec![
                "tromp".to_string(),
                "gryphonback".to_string()
            ]))
        );
        assert_eq!(
            Directive::parse("# wmllint: general spelling dwarvish"),
            Some(Directive::GeneralSpellings(vec!["dwarvish".to_string()]))
        );
    }

    #[test]
    fn test_prose_mention_is_not_directive() {
        assert_eq!(Directive::parse("# ask wmllint for help"), None);
    }

    #[test]
    fn test_line_scoped_flags() {
        assert_eq!(
            Directive::parse("side=1 # wmllint: skip-side"),
            Some(Directive::SkipSide)
        );
        assert_eq!(
            Directive::parse("# wmllint: no spellcheck"),
            Some(Directive::NoSpellcheck)
        );
    }
}
