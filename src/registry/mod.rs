//! Cross-file corpus state.
//!
//! Checks that span files (recruit lists versus unit definitions, scenario
//! ids versus `next_scenario` pointers, stored units versus unstores)
//! accumulate into a [`CorpusState`] owned by the invocation. Nothing here
//! is global; two lint runs never share state.

use std::collections::HashMap;

use crate::rules::catalog::{GLOBAL_SPELLINGS, NOTE_PAIRS, USAGE_TYPES};

/// A unit-to-something reference recorded with its source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRef {
    pub unit_id: String,
    pub file: String,
    /// 1-based.
    pub line: usize,
    pub value: String,
}

/// A `[base_unit]` derivation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedUnit {
    pub file: String,
    pub line: usize,
    pub unit_id: String,
    pub base: String,
}

/// Recruit or recruitment_pattern lists keyed by the preprocessor
/// condition in force where they appeared. `None` is the unconditional
/// state; a negated symbol is stored with a leading `!`.
pub type ConditionedLists = HashMap<Option<String>, (usize, Vec<String>)>;

/// One side's recruit data from a scenario file.
#[derive(Debug, Clone, Default)]
pub struct SideInfo {
    pub file: String,
    pub recruit: ConditionedLists,
    pub recruitment_pattern: ConditionedLists,
}

/// A `first_scenario`/`next_scenario` pointer awaiting resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioRef {
    pub file: String,
    pub line: usize,
    pub id: String,
}

/// Everything remembered across files in one invocation.
#[derive(Debug, Clone)]
pub struct CorpusState {
    pub unit_types: Vec<String>,
    pub derived_units: Vec<DerivedUnit>,
    /// Unit id to usage class.
    pub usage: HashMap<String, String>,
    pub sides: Vec<SideInfo>,
    /// `advances_to` lists, unresolved until the whole corpus is read.
    pub advances: Vec<UnitRef>,
    pub movetypes: Vec<String>,
    pub unit_movetypes: Vec<UnitRef>,
    pub races: Vec<String>,
    pub unit_races: Vec<UnitRef>,
    pub next_refs: Vec<ScenarioRef>,
    pub scenario_to_file: HashMap<String, String>,
    /// Stored-unit variable name to the file and ids stored in it.
    pub stored_ids: HashMap<String, (String, String)>,
    /// Macro name to the character names it recalls or creates.
    pub who_pairs: HashMap<String, String>,
    /// Macro name to the argument index carrying a character name.
    pub who_macros: HashMap<String, usize>,
    pub usage_types: Vec<String>,
    /// Bracketed tag names allowed as children of [if].
    pub custom_conditionals: Vec<String>,
    /// Ability/note pairs added by match directives, on top of the
    /// built-in table.
    pub extra_note_pairs: Vec<(String, String)>,
    /// Spelling exceptions keyed by scope: "GLOBAL", a directory, or a file.
    pub spellings: HashMap<String, Vec<String>>,
}

impl Default for CorpusState {
    fn default() -> Self {
        Self::new()
    }
}

impl CorpusState {
    pub fn new() -> Self {
        let mut spellings = HashMap::new();
        spellings.insert(
            "GLOBAL".to_string(),
            GLOBAL_SPELLINGS.iter().map(|w| w.to_string()).collect(),
        );
        CorpusState {
            unit_types: Vec::new(),
            derived_units: Vec::new(),
            usage: HashMap::new(),
            sides: Vec::new(),
            advances: Vec::new(),
            movetypes: Vec::new(),
            unit_movetypes: Vec::new(),
            races: Vec::new(),
            unit_races: Vec::new(),
            next_refs: Vec::new(),
            scenario_to_file: HashMap::new(),
            stored_ids: HashMap::new(),
            who_pairs: HashMap::new(),
            who_macros: HashMap::new(),
            usage_types: USAGE_TYPES.iter().map(|u| u.to_string()).collect(),
            custom_conditionals: Vec::new(),
            extra_note_pairs: Vec::new(),
            spellings,
        }
    }

    /// The ability/note pairs currently in force: the built-in table plus
    /// anything match directives have added this invocation.
    pub fn note_pairs(&self) -> Vec<(String, String)> {
        NOTE_PAIRS
            .iter()
            .map(|(t, n)| (t.to_string(), n.to_string()))
            .chain(self.extra_note_pairs.iter().cloned())
            .collect()
    }

    pub fn add_spelling(&mut self, scope: &str, word: &str) {
        self.spellings
            .entry(scope.to_string())
            .or_default()
            .push(word.to_lowercase());
    }

    pub fn spellings_for(&self, scope: &str) -> &[String] {
        self.spellings
            .get(scope)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Record a who pairing; repeated declarations accumulate names.
    pub fn add_who_pair(&mut self, macro_name: &str, names: &str) {
        self.who_pairs
            .entry(macro_name.to_string())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(names);
            })
            .or_insert_with(|| names.to_string());
    }
}

/// Do two preprocessor condition states match?
///
/// `None` is the unconditional state and matches everything. A negated
/// first operand matches any distinct symbol, so an `#ifndef HARD` recruit
/// list is checked against an `#ifdef EASY` pattern. Two different
/// positive symbols do not match.
pub fn condition_match(p: Option<&str>, q: Option<&str>) -> bool {
    let (p, q) = match (p, q) {
        (None, _) | (_, None) => return true,
        (Some(p), Some(q)) => (p, q),
    };
    if p == q {
        return true;
    }
    let (sp, np) = match p.strip_prefix('!') {
        Some(rest) => (rest, true),
        None => (p, false),
    };
    // Longstanding quirk kept for output compatibility: a negated second
    // operand takes its stem from the first and its negation flag stays
    // unset, so "A" against "!B" never matches while "!A" against "B" does.
    let (sq, nq) = match q.strip_prefix('!') {
        Some(_) => (sp.get(1..).unwrap_or(""), false),
        None => (q, false),
    };
    sp != sq && np != nq
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unconditional_matches_everything() {
        assert!(condition_match(None, None));
        assert!(condition_match(None, Some("EASY")));
        assert!(condition_match(Some("EASY"), None));
    }

    #[test]
    fn test_equal_conditions_match() {
        assert!(condition_match(Some("EASY"), Some("EASY")));
        assert!(condition_match(Some("!HARD"), Some("!HARD")));
    }

    #[test]
    fn test_negated_first_operand() {
        assert!(condition_match(Some("!A"), Some("B")));
        assert!(!condition_match(Some("A"), Some("B")));
    }

    #[test]
    fn test_negated_second_operand_never_matches() {
        assert!(!condition_match(Some("A"), Some("!B")));
        assert!(!condition_match(Some("A"), Some("!A")));
    }

    #[test]
    fn test_seeded_state() {
        let state = CorpusState::new();
        assert!(state.usage_types.iter().any(|u| u == "mixed fighter"));
        assert!(!state.spellings_for("GLOBAL").is_empty());
        assert!(state.spellings_for("nonexistent").is_empty());
    }

    #[test]
    fn test_who_pairs_accumulate() {
        let mut state = CorpusState::new();
        state.add_who_pair("GUARDS", "Haldric");
        state.add_who_pair("GUARDS", "Jessene");
        assert_eq!(state.who_pairs["GUARDS"], "Haldric, Jessene");
    }
}
