//! Whole-file semantic checks.
//!
//! These passes need to see a complete file: ability notes against the
//! unit's traits, death events against their filters, recruit lists under
//! preprocessor conditions, id references against the characters known to
//! be present. Some passes rewrite lines (translation marks, Pango
//! conversion, old macro names); each builds a fresh line vector rather
//! than editing in place.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::parser::attribute::{parse_attribute, string_strip};
use crate::parser::directives::Directive;
use crate::parser::elements::Element;
use crate::parser::iterator::{Visit, WmlIterator};
use crate::parser::macros::parse_macroref;
use crate::registry::{CorpusState, DerivedUnit, SideInfo, UnitRef};
use crate::report::Reporter;
use crate::rules::catalog::is_translatable;
use crate::LintOptions;

use super::markup::pangoize;

static SENTENCE_END_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"([.!?;:])  +").unwrap());
static CAPITALIZATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]  +[a-z]").unwrap());
static TR_MARK_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"_ *""#).unwrap());
static NAME_GENERATOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"name_generator\s*=\s*_\s*<<").unwrap());
static LEAD_MACRO_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\{([^}\s]+)(.)").unwrap());
static NAMED_UNIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^NAMED_[A-Z_]*UNIT$").unwrap());
static SIDE_ARG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+|[^\s]*\$[^\s]*side[^\s]*|\{[^\s]*SIDE[^\s]*\})$").unwrap());
static X_ARG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+|[^\s]*\$[^\s]*x[^\s]*|\{[^\s]*X[^\s]*\})$").unwrap());
static Y_ARG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]+|[^\s]*\$[^\s]*y[^\s]*|\{[^\s]*Y[^\s]*\})$").unwrap());
static DEFENSE_VALUE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^-\d+").unwrap());

/// Does the line contain `[tag]` or the amendment form `[+tag]`?
fn has_opening_tag(line: &str, tag: &str) -> bool {
    line.contains(&format!("[{}]", tag)) || line.contains(&format!("[+{}]", tag))
}

/// Run every whole-file check, returning the (possibly rewritten) lines.
pub fn global_sanity_check(
    filename: &str,
    lines: Vec<String>,
    state: &mut CorpusState,
    options: &LintOptions,
    reporter: &mut Reporter,
) -> Vec<String> {
    collect_magic_declarations(filename, &lines, state);
    check_unit_types(filename, &lines, state, reporter);
    check_death_events(filename, &lines, reporter);
    collect_movetypes_and_races(filename, &lines, state);
    check_recruit_lists(filename, &lines, state, reporter);
    check_ellipses(filename, &lines, reporter);
    check_deprecations(filename, &lines, reporter);
    let lines = check_ids_and_marks(filename, lines, state, options, reporter);
    check_textdomain(filename, lines, reporter)
}

/// Check each [unit_type] for notes matching its abilities and traits, and
/// record unit data for the corpus-wide consistency pass.
fn check_unit_types(
    filename: &str,
    lines: &[String],
    state: &mut CorpusState,
    reporter: &mut Reporter,
) {
    let note_pairs = state.note_pairs();
    let trait_note: HashMap<&str, &str> = note_pairs
        .iter()
        .map(|(t, n)| (t.as_str(), n.as_str()))
        .collect();
    let mut note_trait: HashMap<&str, Vec<&str>> = HashMap::new();
    for (t, n) in &note_pairs {
        note_trait.entry(n.as_str()).or_default().push(t.as_str());
    }

    let mut notecheck = true;
    let mut unit = UnitScan::default();
    for visit in WmlIterator::new(lines, filename) {
        match Directive::parse(&visit.text) {
            Some(Directive::NoteCheck(enabled)) => {
                notecheck = enabled;
                if !enabled {
                    continue;
                }
            }
            _ => {}
        }
        if opens_tag(&visit, "unit_type") {
            unit = UnitScan::default();
            unit.start_line = visit.lineno + 1;
            continue;
        }
        if closes_tag(&visit, "unit_type") {
            unit.finish(
                filename,
                &visit,
                state,
                notecheck,
                &trait_note,
                &note_trait,
                reporter,
            );
            unit = UnitScan::default();
            continue;
        }
        if visit.in_ancestors("[unit_type]") && !visit.ancestor_starts_with("[filter") {
            unit.observe(filename, &visit, &note_pairs);
        }
    }
}

/// Per-[unit_type] accumulation for the notes check.
#[derive(Debug, Default)]
struct UnitScan {
    start_line: usize,
    unit_id: String,
    base_unit: String,
    unit_race: String,
    unit_usage: String,
    traits: Vec<String>,
    notes: Vec<String>,
    has_special_notes: bool,
    hitpoints_specified: bool,
    temp_movetypes: Vec<(usize, String)>,
    temp_races: Vec<(usize, String)>,
    temp_advances: Vec<(usize, String)>,
    arcane_note_needed: bool,
    spirit_note_needed: bool,
    defense_cap_note_needed: bool,
}

impl UnitScan {
    fn observe(&mut self, _filename: &str, visit: &Visit, note_pairs: &[(String, String)]) {
        if let Some(attr) = parse_attribute(&visit.text) {
            let value = string_strip(&attr.value).trim().to_string();
            match attr.key.as_str() {
                "id" => {
                    let value = value.strip_prefix('_').unwrap_or(&value).trim().to_string();
                    let value = string_strip(&value).to_string();
                    if self.unit_id.is_empty() && !visit.in_ancestors("[base_unit]") {
                        self.unit_id = value;
                    } else if self.base_unit.is_empty() && visit.in_ancestors("[base_unit]") {
                        self.base_unit = value;
                    }
                }
                "hitpoints" => self.hitpoints_specified = true,
                "usage" => self.unit_usage = value,
                "movement_type" => {
                    if !value.contains('{') {
                        self.temp_movetypes.push((visit.lineno + 1, value.clone()));
                    }
                    if value == "undeadspirit" {
                        self.spirit_note_needed = true;
                    } else if value == "mounted" {
                        self.defense_cap_note_needed = true;
                    }
                }
                "race" => {
                    if !value.contains('{') {
                        self.unit_race = value.clone();
                        self.temp_races.push((visit.lineno + 1, value));
                    }
                }
                "advances_to" => {
                    if value.trim() != "null" {
                        self.temp_advances.push((visit.lineno + 1, value));
                    }
                }
                "type" => {
                    if value == "arcane" && visit.in_ancestors("[attack]") {
                        self.arcane_note_needed = true;
                    }
                }
                _ => {
                    if visit.in_ancestors("[defense]") && DEFENSE_VALUE_RE.is_match(&value) {
                        self.defense_cap_note_needed = true;
                    }
                }
            }
        }
        let precomment = visit.text.split('#').next().unwrap_or("");
        if precomment.contains("{NOTE") {
            self.has_special_notes = true;
        }
        // These three are driven by attributes rather than ability macros.
        for note in ["{NOTE_DEFENSE_CAP}", "{NOTE_SPIRIT}", "{NOTE_ARCANE}"] {
            if precomment.contains(note) {
                self.notes.push(note.to_string());
            }
        }
        for (p, q) in note_pairs {
            if precomment.contains(p.as_str()) {
                self.traits.push(p.clone());
            }
            if precomment.contains(q.as_str()) {
                self.notes.push(q.clone());
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn finish(
        &self,
        filename: &str,
        visit: &Visit,
        state: &mut CorpusState,
        notecheck: bool,
        trait_note: &HashMap<&str, &str>,
        note_trait: &HashMap<&str, Vec<&str>>,
        reporter: &mut Reporter,
    ) {
        if self.unit_id.is_empty() {
            return;
        }
        if !self.unit_usage.is_empty() {
            state
                .usage
                .insert(self.unit_id.clone(), self.unit_usage.clone());
        }
        for (line, movetype) in &self.temp_movetypes {
            state.unit_movetypes.push(UnitRef {
                unit_id: self.unit_id.clone(),
                file: filename.to_string(),
                line: *line,
                value: movetype.clone(),
            });
        }
        for (line, race) in &self.temp_races {
            state.unit_races.push(UnitRef {
                unit_id: self.unit_id.clone(),
                file: filename.to_string(),
                line: *line,
                value: race.clone(),
            });
        }
        for (line, advances) in &self.temp_advances {
            state.advances.push(UnitRef {
                unit_id: self.unit_id.clone(),
                file: filename.to_string(),
                line: *line,
                value: advances.clone(),
            });
        }
        if !self.base_unit.is_empty() {
            state.derived_units.push(DerivedUnit {
                file: filename.to_string(),
                line: visit.lineno + 1,
                unit_id: self.unit_id.clone(),
                base: self.base_unit.clone(),
            });
            state.unit_types.push(self.unit_id.clone());
            return;
        }
        state.unit_types.push(self.unit_id.clone());

        let mut missing_notes: Vec<String> = Vec::new();
        if self.arcane_note_needed && !self.notes.iter().any(|n| n == "{NOTE_ARCANE}") {
            missing_notes.push("{NOTE_ARCANE}".to_string());
        }
        if self.spirit_note_needed && !self.notes.iter().any(|n| n == "{NOTE_SPIRIT}") {
            missing_notes.push("{NOTE_SPIRIT}".to_string());
        }
        if self.defense_cap_note_needed && !self.notes.iter().any(|n| n == "{NOTE_DEFENSE_CAP}") {
            missing_notes.push("{NOTE_DEFENSE_CAP}".to_string());
        }
        for trait_ in &self.traits {
            if let Some(tn) = trait_note.get(trait_.as_str()) {
                if !self.notes.iter().any(|n| n == tn)
                    && !missing_notes.iter().any(|n| n == tn)
                {
                    missing_notes.push(tn.to_string());
                }
            }
        }
        let mut missing_traits: Vec<String> = Vec::new();
        if !self.arcane_note_needed && self.notes.iter().any(|n| n == "{NOTE_ARCANE}") {
            missing_traits.push("type=arcane".to_string());
        }
        if !self.spirit_note_needed && self.notes.iter().any(|n| n == "{NOTE_SPIRIT}") {
            missing_traits.push("movement_type=undeadspirit".to_string());
        }
        if !self.defense_cap_note_needed && self.notes.iter().any(|n| n == "{NOTE_DEFENSE_CAP}") {
            missing_traits.push("movement_type=mounted or [defense] tag".to_string());
        }
        for note in &self.notes {
            let Some(nts) = note_trait.get(note.as_str()) else {
                continue;
            };
            if nts.iter().any(|nt| self.traits.iter().any(|t| t == nt)) {
                continue;
            }
            for nt in nts {
                if !missing_traits.iter().any(|t| t == nt) {
                    missing_traits.push(nt.to_string());
                }
            }
        }
        // Units without explicit hitpoints are usually macro-generated
        // pseudo-derivations; the note bookkeeping is unreliable there.
        if !self.hitpoints_specified {
            return;
        }
        if notecheck && !missing_notes.is_empty() {
            reporter.report(
                filename,
                self.start_line,
                format!(
                    "unit {} is missing notes {}",
                    self.unit_id,
                    missing_notes.join(" ")
                ),
            );
        }
        if !missing_traits.is_empty() {
            reporter.report(
                filename,
                self.start_line,
                format!(
                    "unit {} is missing traits {}",
                    self.unit_id,
                    missing_traits.join(" ")
                ),
            );
        }
        if notecheck
            && self.notes.is_empty()
            && self.traits.is_empty()
            && self.has_special_notes
        {
            reporter.report(
                filename,
                self.start_line,
                format!("unit {} has superfluous {{NOTE_*}}", self.unit_id),
            );
        }
        if !visit.in_ancestors("[theme]")
            && !visit.in_ancestors("[base_unit]")
            && self.unit_race.is_empty()
        {
            reporter.report(
                filename,
                self.start_line,
                format!("unit {} has no race", self.unit_id),
            );
        }
    }
}

fn opens_tag(visit: &Visit, tag: &str) -> bool {
    visit
        .elements
        .iter()
        .any(|e| matches!(e, Element::Open { name, .. } if name == tag))
}

fn closes_tag(visit: &Visit, tag: &str) -> bool {
    visit
        .elements
        .iter()
        .any(|e| matches!(e, Element::Close(name) if name == tag))
}

/// Find each [event] and check that a unit does not speak in its own death
/// event. Nested events are handled by giving each event its own bounded
/// scope walk.
fn check_death_events(filename: &str, lines: &[String], reporter: &mut Reporter) {
    let mut deathcheck = true;
    let mut iter = WmlIterator::new(lines, filename);
    while let Some(visit) = iter.next() {
        match Directive::parse(&visit.text) {
            Some(Directive::DeathCheck(enabled)) => {
                deathcheck = enabled;
                continue;
            }
            _ => {}
        }
        // The check runs even when the opening line disables it, in case
        // it is re-enabled before the closing tag.
        if visit.text.contains("[event]") {
            check_speaks_in_death_event(&iter, deathcheck, reporter);
        }
    }
}

fn check_speaks_in_death_event(iter: &WmlIterator<'_>, mut deathcheck: bool, reporter: &mut Reporter) {
    let scope = iter.scope_iter();
    let base_depth = scope.ancestors().len();

    // First pass: is this a die event, and whom does it filter on? The
    // depth comparison skips nested events and other tags with a [filter]
    // child.
    let mut die_event = false;
    let mut filter_subject: Option<String> = None;
    for visit in scope.clone() {
        if visit.ancestors.len() == base_depth {
            if let Some(attr) = parse_attribute(&visit.text) {
                if attr.key == "name" && string_strip(&attr.value) == "die" {
                    die_event = true;
                }
            }
        }
        if visit.ancestors.len() == base_depth + 1 && visit.parent() == Some("[filter]") {
            if let Some(attr) = parse_attribute(&visit.text) {
                if attr.key == "id" {
                    filter_subject = Some(string_strip(&attr.value).to_string());
                }
            }
        }
    }
    let Some(subject) = filter_subject else {
        return;
    };
    if !die_event {
        return;
    }

    // Second pass: does the dead unit speak? This descends into nested
    // events too; the unit is just as dead in those.
    for visit in scope {
        match Directive::parse(&visit.text) {
            Some(Directive::DeathCheck(enabled)) => {
                deathcheck = enabled;
                continue;
            }
            _ => {}
        }
        if visit.parent() != Some("[message]") {
            continue;
        }
        let Some(attr) = parse_attribute(&visit.text) else {
            continue;
        };
        if attr.key != "id" && attr.key != "speaker" {
            continue;
        }
        let value = string_strip(&attr.value);
        if deathcheck && (value == subject || value == "unit") {
            reporter.report(
                iter.fname,
                visit.lineno + 1,
                format!(
                    "{} speaks in his/her \"die\" event rather than \"last breath\"",
                    value
                ),
            );
        }
    }
}

fn collect_movetypes_and_races(filename: &str, lines: &[String], state: &mut CorpusState) {
    for visit in WmlIterator::new(lines, filename) {
        let parent = visit.parent();
        if parent != Some("[movetype]") && parent != Some("[race]") {
            continue;
        }
        let Some(attr) = parse_attribute(&visit.text) else {
            continue;
        };
        let value = string_strip(&attr.value).to_string();
        if parent == Some("[movetype]") && attr.key == "name" {
            state.movetypes.push(value);
        } else if parent == Some("[race]") && attr.key == "id" {
            state.races.push(value);
        }
    }
}

/// Record recruit and recruitment_pattern lists per side, keyed by the
/// preprocessor condition in force, and check side numbering. If the lists
/// vary by difficulty only the last instance per condition is kept.
fn check_recruit_lists(
    filename: &str,
    lines: &[String],
    state: &mut CorpusState,
    reporter: &mut Reporter,
) {
    let mut in_side = false;
    let mut in_ai = false;
    let mut in_subunit = false;
    let mut in_generator = false;
    let mut sidecount = 0i64;
    let mut side = SideInfo {
        file: filename.to_string(),
        ..SideInfo::default()
    };
    let mut ifdef_stack: Vec<Option<String>> = vec![None];

    for (num, raw) in lines.iter().enumerate() {
        let num = num + 1;
        let line = raw.trim();
        if line.starts_with("#ifdef") || line.starts_with("#ifhave") || line.starts_with("#ifver")
        {
            ifdef_stack.push(line.split_whitespace().nth(1).map(str::to_string));
            continue;
        }
        if line.starts_with("#ifndef")
            || line.starts_with("#ifnhave")
            || line.starts_with("#ifnver")
        {
            ifdef_stack.push(
                line.split_whitespace()
                    .nth(1)
                    .map(|sym| format!("!{}", sym)),
            );
            continue;
        }
        if line.starts_with("#else") {
            let flipped = match ifdef_stack.last().and_then(|c| c.as_deref()) {
                Some(top) => Some(
                    top.strip_prefix('!')
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("!{}", top)),
                ),
                None => None,
            };
            ifdef_stack.push(flipped);
            continue;
        }
        if line.starts_with("#endif") {
            ifdef_stack.pop();
            if ifdef_stack.is_empty() {
                ifdef_stack.push(None);
            }
            continue;
        }
        let precomment = line.split('#').next().unwrap_or("");
        if precomment.contains("[generator]") {
            in_generator = true;
            continue;
        } else if precomment.contains("[/generator]") {
            in_generator = false;
            continue;
        } else if precomment.contains("[side]") {
            // Amendment [+side] tags must not advance the side count.
            in_side = true;
            sidecount += 1;
            continue;
        } else if precomment.contains("[/side]") {
            if !side.recruit.is_empty() || !side.recruitment_pattern.is_empty() {
                state.sides.push(std::mem::replace(
                    &mut side,
                    SideInfo {
                        file: filename.to_string(),
                        ..SideInfo::default()
                    },
                ));
            } else {
                side.recruit.clear();
                side.recruitment_pattern.clear();
            }
            in_side = false;
            continue;
        } else if in_side && has_opening_tag(precomment, "ai") {
            in_ai = true;
            continue;
        } else if in_side && has_opening_tag(precomment, "unit") {
            in_subunit = true;
            continue;
        } else if in_side && precomment.contains("[/ai]") {
            in_ai = false;
            continue;
        } else if in_side && precomment.contains("[/unit]") {
            in_subunit = false;
            continue;
        }
        if line.contains("wmllint: skip-side") {
            sidecount += 1;
        }
        if !in_side || in_subunit || !precomment.contains('=') {
            continue;
        }
        let Some(attr) = parse_attribute(line) else {
            continue;
        };
        let condition = ifdef_stack.last().cloned().unwrap_or(None);
        let value = string_strip(&attr.value).to_string();
        if (attr.key == "recruit" || attr.key == "extra_recruit") && !value.is_empty() {
            let types: Vec<String> = value.split(',').map(|s| s.trim().to_string()).collect();
            side.recruit.insert(condition, (num, types));
        } else if attr.key == "recruitment_pattern" && !value.is_empty() {
            if !in_ai {
                reporter.report(filename, num, "recruitment_pattern outside [ai]");
            } else {
                let types: Vec<String> = value.split(',').map(|s| s.trim().to_string()).collect();
                side.recruitment_pattern.insert(condition, (num, types));
            }
        } else if attr.key == "side" && in_side && !in_ai {
            if let Ok(side_num) = value.parse::<i64>() {
                if !in_generator && sidecount != side_num {
                    reporter.report(
                        filename,
                        num,
                        format!(
                            "side number {} is out of sequence ({} expected)",
                            value, sidecount
                        ),
                    );
                }
            }
        }
    }
}

/// Leader and nozoc ellipses are assigned automatically since 1.11.6;
/// explicit assignments need to be removed or reviewed.
fn check_ellipses(filename: &str, lines: &[String], reporter: &mut Reporter) {
    let mut in_effect = false;
    let mut in_unit = false;
    let mut in_side = false;
    let mut in_unit_type = false;
    for (num, line) in lines.iter().enumerate() {
        let num = num + 1;
        if has_opening_tag(line, "effect") {
            in_effect = true;
        } else if line.contains("[/effect]") {
            in_effect = false;
        } else if has_opening_tag(line, "unit") {
            in_unit = true;
        } else if line.contains("[/unit]") {
            in_unit = false;
        } else if has_opening_tag(line, "side") {
            in_side = true;
        } else if line.contains("[/side]") {
            in_side = false;
        } else if has_opening_tag(line, "unit_type") {
            in_unit_type = true;
        } else if line.contains("[/unit_type]") {
            in_unit_type = false;
        }
        if line.contains("wmllint: no ellipsecheck") {
            continue;
        }
        if !in_effect && !in_unit && !in_side && !in_unit_type {
            continue;
        }
        let Some(attr) = parse_attribute(line) else {
            continue;
        };
        if attr.key != "ellipse" {
            continue;
        }
        let value = string_strip(&attr.value);
        if value == "misc/ellipse-nozoc" || value == "misc/ellipse-leader" {
            if in_effect {
                reporter.report(filename, num, "[effect] apply_to=ellipse needs to be removed");
            } else {
                reporter.report(
                    filename,
                    num,
                    format!("{}={} needs to be removed", attr.key, value),
                );
            }
        } else if value != "none" && value != "misc/ellipse" && value != "misc/ellipse-hero" {
            reporter.report(
                filename,
                num,
                format!("custom ellipse {} may need to be updated", value),
            );
        }
    }
}

/// [advancefrom] and extra_defines need manual migration; just warn.
fn check_deprecations(filename: &str, lines: &[String], reporter: &mut Reporter) {
    let mut in_campaign = false;
    for (num, line) in lines.iter().enumerate() {
        let num = num + 1;
        let precomment = line.split('#').next().unwrap_or("");
        if precomment.contains("[campaign]") {
            in_campaign = true;
            continue;
        }
        if precomment.contains("[/campaign]") {
            in_campaign = false;
            continue;
        }
        if has_opening_tag(precomment, "advancefrom") {
            reporter.report(
                filename,
                num,
                "[advancefrom] needs to be manually updated to [modify_unit_type] and moved into the _main.cfg file",
            );
        }
        if in_campaign {
            if let Some(attr) = parse_attribute(line) {
                if attr.key == "extra_defines" {
                    reporter.report(
                        filename,
                        num,
                        "extra_defines are now macros and need to be called on their own",
                    );
                }
            }
        }
    }
}

/// Usage declarations and spelling exceptions are corpus-scoped.
fn collect_magic_declarations(filename: &str, lines: &[String], state: &mut CorpusState) {
    let dir = std::path::Path::new(filename)
        .parent()
        .map(|p| p.to_string_lossy().into_owned())
        .unwrap_or_default();
    for line in lines {
        match Directive::parse(line) {
            Some(Directive::MatchNote {
                trait_macro,
                note_macro,
            }) => {
                let pair = (trait_macro, note_macro);
                if !state.extra_note_pairs.contains(&pair) {
                    state.extra_note_pairs.push(pair);
                }
            }
            Some(Directive::UsageOf { unit, class }) => {
                state.usage.insert(unit.clone(), class);
                state.unit_types.push(unit);
            }
            Some(Directive::UsageTypes(types)) => {
                state.usage_types.extend(types);
            }
            Some(Directive::GeneralSpellings(words)) => {
                for word in words {
                    state.add_spelling("GLOBAL", &word);
                }
            }
            Some(Directive::DirectorySpellings(words)) => {
                for word in words {
                    state.add_spelling(&dir, &word);
                }
            }
            _ => {}
        }
    }
}

/// Which characters are on stage, and do id= and speaker= references
/// resolve to them? Also corrects translation marks and converts old
/// message markup; returns the rewritten lines.
fn check_ids_and_marks(
    filename: &str,
    lines: Vec<String>,
    state: &mut CorpusState,
    options: &LintOptions,
    reporter: &mut Reporter,
) -> Vec<String> {
    let mut present: Vec<String> = Vec::new();
    let mut markcheck = true;
    let mut in_name_generator = false;
    let mut preamble_seen = false;
    let mut storeid: Option<String> = None;
    let mut storevar: Option<String> = None;
    let mut out: Vec<String> = Vec::with_capacity(lines.len());

    for visit in WmlIterator::new(&lines, filename) {
        let mut line = visit.text.clone();
        let lineno = visit.lineno + 1;
        if line.contains('[') {
            preamble_seen = true;
        }
        if opens_tag(&visit, "scenario") || opens_tag(&visit, "multiplayer") {
            preamble_seen = false;
        }
        if NAME_GENERATOR_RE.is_match(&line) {
            in_name_generator = true;
        } else if in_name_generator && line.contains(">>") {
            in_name_generator = false;
        }
        match Directive::parse(&line) {
            Some(Directive::MarkCheck(enabled)) => markcheck = enabled,
            Some(Directive::Who { macro_name, names }) => {
                state.add_who_pair(&macro_name, &names);
            }
            Some(Directive::UnWho(None)) => state.who_pairs.clear(),
            Some(Directive::UnWho(Some(target))) => {
                if state.who_pairs.remove(&target).is_none() {
                    reporter.report(
                        filename,
                        lineno,
                        format!(
                            "magic comment \"unwho {}\" does not match any current keys: {}",
                            target,
                            state
                                .who_pairs
                                .keys()
                                .cloned()
                                .collect::<Vec<_>>()
                                .join(", ")
                        ),
                    );
                }
            }
            Some(Directive::WhoFieldSet { macro_name, argno }) => {
                state.who_macros.insert(macro_name, argno);
            }
            Some(Directive::WhoFieldClear(Some(target))) => {
                if state.who_macros.remove(&target).is_none() {
                    state.who_macros.clear();
                }
            }
            Some(Directive::WhoFieldClear(None)) => state.who_macros.clear(),
            Some(Directive::WhoFieldRemove(target)) => {
                if state.who_macros.remove(&target).is_none() {
                    reporter.report(
                        filename,
                        lineno,
                        format!(
                            "magic comment \"whofield {}\" should be followed by a number",
                            target
                        ),
                    );
                }
            }
            Some(Directive::Recognize(name)) => present.push(name),
            _ => {}
        }

        // Recruit and recall macros put characters on stage. The macro is
        // assumed to be the first item on its line.
        let trimmed = line.trim_start().to_string();
        if let Some(caps) = LEAD_MACRO_RE.captures(&trimmed) {
            let macname = caps[1].to_string();
            let closed = &caps[2] == "}";
            if let Some(names) = state.who_pairs.get(&macname).cloned() {
                for who in names.split(',') {
                    let who = who.trim();
                    if let Some(gone) = who.strip_prefix("--") {
                        let gone = gone.trim();
                        if let Some(pos) = present.iter().position(|p| p == gone) {
                            present.remove(pos);
                        }
                    } else {
                        present.push(who.to_string());
                    }
                }
            } else if !closed {
                // {LOYAL_UNIT} from 1.4 became {NAMED_LOYAL_UNIT}. Renamed
                // here rather than in the rewrite pass so recognition data
                // stays consistent.
                if macname == "LOYAL_UNIT" {
                    let mref = parse_macroref(0, &trimmed);
                    if mref.args.len() == 7 {
                        line = line.replacen("{LOYAL_UNIT", "{NAMED_LOYAL_UNIT", 1);
                    }
                }
                if NAMED_UNIT_RE.is_match(&macname) {
                    let mref = parse_macroref(0, &trimmed);
                    if mref.args.len() >= 7
                        && SIDE_ARG_RE.is_match(&mref.args[1])
                        && X_ARG_RE.is_match(&mref.args[3])
                        && Y_ARG_RE.is_match(&mref.args[4])
                        && !mref.args[5].is_empty()
                    {
                        present.push(mref.args[5].clone());
                    }
                } else if macname == "RECALL" {
                    let mref = parse_macroref(0, &trimmed);
                    if mref.args.len() == 2 && mref.brace_depth == 0 {
                        present.push(mref.args[1].clone());
                    }
                } else if macname == "RECALL_XY" {
                    let mref = parse_macroref(0, &trimmed);
                    if mref.args.len() == 4 {
                        present.push(mref.args[1].clone());
                    }
                } else if macname == "CLEAR_VARIABLE" {
                    let mref = parse_macroref(0, &trimmed);
                    // CLEAR_VARIABLE split across lines parses to a bare
                    // name; skip rather than index out of range.
                    if mref.args.len() > 1 {
                        for arg in mref.args[1].split(',') {
                            state.stored_ids.remove(arg.trim_start());
                        }
                    }
                } else if let Some(&argno) = state.who_macros.get(&macname) {
                    let mref = parse_macroref(0, &trimmed);
                    if let Some(arg) = mref.args.get(argno) {
                        present.push(arg.clone());
                    }
                }
            }
        }

        let ignoreable = visit.in_ancestors("[kill]")
            || visit.in_ancestors("[effect]")
            || visit.in_ancestors("[move_unit_fake]")
            || visit.in_ancestors("[scroll_to_unit]");
        if !line.contains('=') || ignoreable {
            if closes_tag(&visit, "store_unit") {
                if let (Some(id), Some(var)) = (storeid.take(), storevar.take()) {
                    state.stored_ids.insert(var, (filename.to_string(), id));
                }
                storeid = None;
                storevar = None;
            }
            out.push(line);
            continue;
        }
        let Some(attr) = parse_attribute(&line) else {
            out.push(line);
            continue;
        };
        if attr.comment.contains("wmllint: ignore") {
            out.push(line);
            continue;
        }
        let key = attr.key.clone();
        let raw_value = attr.value.clone();
        let value = string_strip(&raw_value).to_string();
        let in_scenario =
            visit.in_ancestors("[scenario]") || visit.in_ancestors("[multiplayer]");
        let in_person = visit.in_ancestors("[side]")
            || visit.in_ancestors("[unit]")
            || visit.in_ancestors("[recall]");

        // Track store/unstore so units recognized on store are recognized
        // again when unstored.
        if in_scenario && visit.in_ancestors("[store_unit]") {
            if key == "id" && !visit.in_ancestors("[not]") {
                if storeid.is_none() {
                    storeid = Some(value.clone());
                }
            } else if key == "variable" && !value.contains('{') {
                storevar = Some(value.clone());
            }
        } else if visit.in_ancestors("[unstore_unit]") {
            if key == "variable" {
                let var = value.split("[$").next().unwrap_or("").to_string();
                if let Some((_, ids)) = state.stored_ids.remove(&var) {
                    for unit_id in ids.split(',') {
                        present.push(unit_id.trim_start().to_string());
                    }
                }
            }
        } else if key == "name" && visit.in_ancestors("[clear_variable]") {
            for val in value.split(',') {
                state.stored_ids.remove(val.trim_start());
            }
        }

        let has_tr_mark = TR_MARK_RE.is_match(&raw_value);
        if key == "role" {
            present.push(value.clone());
        }
        if has_tr_mark
            && raw_value.contains('{')
            && !raw_value.contains('+')
            && raw_value.find('{') > raw_value.find('_')
        {
            reporter.report(filename, lineno, "macro reference in translatable string");
        }

        let skip_mark_checks = key.starts_with('#')
            || key.starts_with('{')
            || in_name_generator
            || key == "letter"
            || matches!(key.as_str(), "name" | "male_name" | "female_name" | "value");
        if skip_mark_checks {
            // Nothing to do; these keys carry values the checks misread.
        } else if key == "variation_name" {
            if markcheck && !has_tr_mark {
                reporter.report(
                    filename,
                    lineno,
                    format!(
                        "{} should be renamed as variation_id and/or marked as translatable",
                        key
                    ),
                );
            }
        } else if is_translatable(&key) {
            if markcheck && has_tr_mark && line.contains("\"\"") {
                reporter.report(
                    filename,
                    lineno,
                    format!(
                        "{} doesn`t need translation mark (translatable string is empty)",
                        key
                    ),
                );
                line = line.replace("=_", "=");
            }
            let noconvert = attr.comment.contains("wmllint: ignore")
                || attr.comment.contains("wmllint: noconvert");
            if markcheck
                && !value.starts_with('$')
                && !value.starts_with('{')
                && !has_tr_mark
                && !line.contains("\"\"")
                && !noconvert
            {
                reporter.report(filename, lineno, format!("{} needs translation mark", key));
                line = line.replacen('=', "=_ ", 1);
            }
            if SENTENCE_END_RE.is_match(&raw_value) {
                reporter.report(filename, lineno, "double space after sentence end");
                if !options.string_freeze {
                    line = SENTENCE_END_RE.replace_all(&line, "$1 ").into_owned();
                }
            }
            if CAPITALIZATION_RE.is_match(&line) {
                reporter.report(
                    filename,
                    lineno,
                    "probable capitalization or punctuation error",
                );
            }
            if key == "message"
                && visit.in_ancestors("[message]")
                && !visit.in_ancestors("[option]")
                && !noconvert
            {
                line = pangoize(&line, filename, lineno, reporter);
            }
        } else {
            if in_scenario && key == "id" {
                if in_person {
                    present.push(value.clone());
                } else if value.starts_with('$') || value.starts_with('{') {
                    // Variable or macro reference; not checkable.
                } else if preamble_seen && id_reference_checkable(&visit) {
                    for id in value.split(',') {
                        if !present.iter().any(|p| p == id.trim_start()) {
                            reporter.report(
                                filename,
                                lineno,
                                format!("unknown '{}' referred to by id", id),
                            );
                        }
                    }
                }
            }
            if in_scenario
                && key == "speaker"
                && !present.iter().any(|p| p == &value)
                && !matches!(value.as_str(), "narrator" | "unit" | "second_unit")
                && !value.starts_with('$')
                && !value.starts_with('{')
            {
                reporter.report(
                    filename,
                    lineno,
                    format!("unknown speaker '{}' of [message]", value),
                );
            }
            if markcheck && has_tr_mark {
                reporter.report(
                    filename,
                    lineno,
                    format!("{} should not have a translation mark", key),
                );
                // Remove the mark in place, keeping the original quoting.
                if let Some(eq) = line.find('=') {
                    if let Some(rel) = line[eq..].find('_') {
                        line.remove(eq + rel);
                    }
                }
            }
        }

        if closes_tag(&visit, "store_unit") {
            if let (Some(id), Some(var)) = (storeid.take(), storevar.take()) {
                state.stored_ids.insert(var, (filename.to_string(), id));
            }
            storeid = None;
            storevar = None;
        }
        out.push(line);
    }

    // Everyone on stage is a legitimate spelling in this file.
    let file_spellings: Vec<String> = present
        .iter()
        .filter(|p| !p.is_empty())
        .map(|p| p.to_lowercase())
        .collect();
    state.spellings.insert(filename.to_string(), file_spellings);
    out
}

/// Is an id= at this position a reference that must resolve to a known
/// character? Declaration contexts and engine-defined-id contexts are
/// excluded.
fn id_reference_checkable(visit: &Visit) -> bool {
    const DECLARING_SCOPES: &[&str] = &[
        "[object]",
        "[cfg]",
        "[aspect]",
        "[facet]",
        "[sound_source]",
        "[remove_sound_source]",
        "[load_resource]",
        "[stage]",
        "[goal]",
        "[set_menu_item]",
        "[clear_menu_item]",
        "[time_area]",
        "[trait]",
        "[checkbox]",
        "[combo]",
        "[entry]",
        "[slider]",
        "[generator]",
        "[candidate_action]",
        "[label]",
        "[chamber]",
        "[time]",
        "[remove_event]",
        "[remove_time_area]",
    ];
    // Depth check: an id= directly inside [scenario] or [multiplayer] is a
    // scenario id, not a reference.
    let depth = visit
        .ancestors
        .iter()
        .filter(|a| {
            a.starts_with('[') && a.as_str() != "[scenario]" && a.as_str() != "[multiplayer]"
        })
        .count();
    if depth == 0 {
        return false;
    }
    if DECLARING_SCOPES.iter().any(|s| visit.in_ancestors(s)) {
        return false;
    }
    // [event]id= names the event itself, but [event][filter]id= is a
    // reference.
    if visit.parent() == Some("[event]") {
        return false;
    }
    // [fire_event]id= names an event unless inside [primary_unit] or
    // [secondary_unit]; [tunnel]id= declares unless inside its [filter].
    if visit.in_ancestors("[fire_event]")
        && !visit.in_ancestors("[primary_unit]")
        && !visit.in_ancestors("[secondary_unit]")
    {
        return false;
    }
    if visit.in_ancestors("[tunnel]") && !visit.in_ancestors("[filter]") {
        return false;
    }
    true
}

/// There should be exactly one textdomain declaration, on line 1. A single
/// misplaced declaration is moved there; multiples are reported.
fn check_textdomain(filename: &str, mut lines: Vec<String>, reporter: &mut Reporter) -> Vec<String> {
    let mut textdomains: Vec<usize> = Vec::new();
    let mut no_text = false;
    for (num, line) in lines.iter().enumerate() {
        if line.contains("#textdomain") {
            textdomains.push(num + 1);
        } else if line.contains("wmllint: no translatables") {
            no_text = true;
        }
    }
    if no_text {
        return lines;
    }
    if textdomains.is_empty() {
        reporter.report(filename, 1, "no textdomain string");
    } else if textdomains[0] == 1 {
        // Multiples are fine if the first is on line 1.
    } else if textdomains.len() > 1 {
        let listed: Vec<String> = textdomains.iter().map(|n| n.to_string()).collect();
        reporter.report(
            filename,
            textdomains[0],
            format!("multiple textdomain strings on lines {}", listed.join(", ")),
        );
    } else {
        let w = textdomains[0];
        reporter.report(
            filename,
            w,
            "single textdomain declaration not on line 1.",
        );
        let decl = lines.remove(w - 1).trim_start().to_string();
        lines.insert(0, decl);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn run(src: &str) -> (CorpusState, Vec<String>, Vec<String>) {
        let lines: Vec<String> = src.lines().map(str::to_string).collect();
        let mut state = CorpusState::new();
        let mut reporter = Reporter::new();
        let options = LintOptions::default();
        let out = global_sanity_check("test.cfg", lines, &mut state, &options, &mut reporter);
        let messages = reporter.take().into_iter().map(|d| d.message).collect();
        (state, messages, out)
    }

    const TEXTDOMAIN: &str = "#textdomain wesnoth-test";

    #[test]
    fn test_unit_missing_note() {
        let src = format!(
            "{}\n[unit_type]\nid=Test Healer\nrace=human\nhitpoints=30\nusage=healer\n{{ABILITY_HEALS}}\n[/unit_type]",
            TEXTDOMAIN
        );
        let (state, messages, _) = run(&src);
        assert!(messages
            .iter()
            .any(|m| m == "unit Test Healer is missing notes {NOTE_HEALS}"));
        assert_eq!(state.usage["Test Healer"], "healer");
        assert!(state.unit_types.contains(&"Test Healer".to_string()));
    }

    #[test]
    fn test_unit_missing_trait() {
        let src = format!(
            "{}\n[unit_type]\nid=Test Zombie\nrace=undead\nhitpoints=18\n{{NOTE_HEALS}}\n[/unit_type]",
            TEXTDOMAIN
        );
        let (_, messages, _) = run(&src);
        assert!(messages
            .iter()
            .any(|m| m.starts_with("unit Test Zombie is missing traits")));
    }

    #[test]
    fn test_unit_without_hitpoints_skips_note_checks() {
        let src = format!(
            "{}\n[unit_type]\nid=Macro Unit\nrace=orc\n{{ABILITY_HEALS}}\n[/unit_type]",
            TEXTDOMAIN
        );
        let (_, messages, _) = run(&src);
        assert!(!messages.iter().any(|m| m.contains("missing notes")));
    }

    #[test]
    fn test_derived_unit_recorded_not_checked() {
        let src = format!(
            "{}\n[unit_type]\nid=Derived\nhitpoints=20\n[base_unit]\nid=Base\n[/base_unit]\n{{ABILITY_HEALS}}\n[/unit_type]",
            TEXTDOMAIN
        );
        let (state, messages, _) = run(&src);
        assert_eq!(state.derived_units.len(), 1);
        assert_eq!(state.derived_units[0].base, "Base");
        assert!(!messages.iter().any(|m| m.contains("missing notes")));
    }

    #[test]
    fn test_death_event_speaker() {
        let src = format!(
            "{}\n[scenario]\n[event]\nname=die\n[filter]\nid=Kaleh\n[/filter]\n[message]\nspeaker=Kaleh\nmessage=_ \"Aargh!\"\n[/message]\n[/event]\n[/scenario]",
            TEXTDOMAIN
        );
        let (_, messages, _) = run(&src);
        assert!(messages
            .iter()
            .any(|m| m == "Kaleh speaks in his/her \"die\" event rather than \"last breath\""));
    }

    #[test]
    fn test_death_event_other_speaker_allowed() {
        let src = format!(
            "{}\n[scenario]\n[event]\nname=die\n[filter]\nid=Kaleh\n[/filter]\n[message]\nspeaker=narrator\nmessage=_ \"He fell.\"\n[/message]\n[/event]\n[/scenario]",
            TEXTDOMAIN
        );
        let (_, messages, _) = run(&src);
        assert!(!messages.iter().any(|m| m.contains("die\" event")));
    }

    #[test]
    fn test_side_number_sequence() {
        let src = format!(
            "{}\n[scenario]\n[side]\nside=1\n[/side]\n[side]\nside=3\n[/side]\n[/scenario]",
            TEXTDOMAIN
        );
        let (_, messages, _) = run(&src);
        assert!(messages
            .iter()
            .any(|m| m == "side number 3 is out of sequence (2 expected)"));
    }

    #[test]
    fn test_recruit_recorded_per_condition() {
        let src = format!(
            "{}\n[scenario]\n[side]\nside=1\n#ifdef EASY\nrecruit=Mage,Bowman\n#endif\n[/side]\n[/scenario]",
            TEXTDOMAIN
        );
        let (state, _, _) = run(&src);
        assert_eq!(state.sides.len(), 1);
        let (_, types) = &state.sides[0].recruit[&Some("EASY".to_string())];
        assert_eq!(types, &vec!["Mage".to_string(), "Bowman".to_string()]);
    }

    #[test]
    fn test_recruitment_pattern_outside_ai() {
        let src = format!(
            "{}\n[scenario]\n[side]\nside=1\nrecruitment_pattern=fighter\n[/side]\n[/scenario]",
            TEXTDOMAIN
        );
        let (_, messages, _) = run(&src);
        assert!(messages
            .iter()
            .any(|m| m == "recruitment_pattern outside [ai]"));
    }

    #[test]
    fn test_ellipse_check() {
        let src = format!(
            "{}\n[unit_type]\nid=X\nrace=orc\nhitpoints=1\nellipse=misc/ellipse-leader\n[/unit_type]",
            TEXTDOMAIN
        );
        let (_, messages, _) = run(&src);
        assert!(messages
            .iter()
            .any(|m| m == "ellipse=misc/ellipse-leader needs to be removed"));
    }

    #[test]
    fn test_unknown_id_reference() {
        let src = format!(
            "{}\n[scenario]\n[event]\nname=start\n[kill_unit]\nid=Nobody\n[/kill_unit]\n[/event]\n[/scenario]",
            TEXTDOMAIN
        );
        let (_, messages, _) = run(&src);
        assert!(messages
            .iter()
            .any(|m| m == "unknown 'Nobody' referred to by id"));
    }

    #[test]
    fn test_recall_macro_recognizes_character() {
        let src = format!(
            "{}\n[scenario]\n[event]\nname=start\n{{RECALL Kaleh}}\n[message]\nspeaker=Kaleh\nmessage=_ \"Onward!\"\n[/message]\n[/event]\n[/scenario]",
            TEXTDOMAIN
        );
        let (state, messages, _) = run(&src);
        assert!(!messages.iter().any(|m| m.contains("unknown speaker")));
        assert!(state.spellings_for("test.cfg").contains(&"kaleh".to_string()));
    }

    #[test]
    fn test_unknown_speaker() {
        let src = format!(
            "{}\n[scenario]\n[event]\nname=start\n[message]\nspeaker=Ghost\nmessage=_ \"Boo\"\n[/message]\n[/event]\n[/scenario]",
            TEXTDOMAIN
        );
        let (_, messages, _) = run(&src);
        assert!(messages
            .iter()
            .any(|m| m == "unknown speaker 'Ghost' of [message]"));
    }

    #[test]
    fn test_missing_translation_mark_inserted() {
        let src = format!("{}\n[scenario]\ndescription=\"some text\"\n[/scenario]", TEXTDOMAIN);
        let (_, messages, out) = run(&src);
        assert!(messages.iter().any(|m| m == "description needs translation mark"));
        assert_eq!(out[2], "description=_ \"some text\"");
    }

    #[test]
    fn test_empty_translatable_mark_removed() {
        let src = format!("{}\n[scenario]\ndescription=_\"\"\n[/scenario]", TEXTDOMAIN);
        let (_, messages, out) = run(&src);
        assert!(messages
            .iter()
            .any(|m| m.contains("doesn`t need translation mark")));
        assert_eq!(out[2], "description=\"\"");
    }

    #[test]
    fn test_spurious_translation_mark_removed() {
        let src = format!("{}\n[scenario]\nside=_ \"1\"\n[/scenario]", TEXTDOMAIN);
        let (_, messages, out) = run(&src);
        assert!(messages
            .iter()
            .any(|m| m == "side should not have a translation mark"));
        assert_eq!(out[2], "side= \"1\"");
    }

    #[test]
    fn test_double_space_fixed() {
        let src = format!(
            "{}\n[scenario]\n[event]\n[message]\nmessage=_ \"Stop.  Go.\"\n[/message]\n[/event]\n[/scenario]",
            TEXTDOMAIN
        );
        let (_, messages, out) = run(&src);
        assert!(messages.iter().any(|m| m == "double space after sentence end"));
        assert!(out[4].contains("Stop. Go."));
    }

    #[test]
    fn test_loyal_unit_renamed() {
        let src = format!(
            "{}\n[scenario]\n[event]\n{{LOYAL_UNIT 1 (Elvish Fighter) 10 12 Erl (_\"Erl\")}}\n[/event]\n[/scenario]",
            TEXTDOMAIN
        );
        let (_, _, out) = run(&src);
        assert!(out[3].starts_with("{NAMED_LOYAL_UNIT"));
    }

    #[test]
    fn test_no_textdomain() {
        let (_, messages, _) = run("[scenario]\n[/scenario]");
        assert!(messages.iter().any(|m| m == "no textdomain string"));
    }

    #[test]
    fn test_misplaced_textdomain_moved() {
        let (_, messages, out) = run("[scenario]\n[/scenario]\n#textdomain wesnoth-test");
        assert!(messages
            .iter()
            .any(|m| m == "single textdomain declaration not on line 1."));
        assert_eq!(out[0], "#textdomain wesnoth-test");
    }

    #[test]
    fn test_usage_of_directive() {
        let src = format!(
            "{}\n# wmllint: usage of \"Desert Fighter\" is fighter",
            TEXTDOMAIN
        );
        let (state, _, _) = run(&src);
        assert_eq!(state.usage["Desert Fighter"], "fighter");
        assert!(state.unit_types.contains(&"Desert Fighter".to_string()));
    }
}
