//! Corpus-wide cross-checks.
//!
//! Run once after every file has been read: recruit lists against known
//! unit types and their usage classes, recruitment patterns in both
//! directions, movement types, races, derivations, advancements, and
//! scenario linkage.

use std::collections::HashMap;

use crate::registry::{condition_match, CorpusState};
use crate::report::Reporter;

pub fn consistency_check(state: &CorpusState, reporter: &mut Reporter) {
    let derivations: HashMap<&str, &str> = state
        .derived_units
        .iter()
        .map(|d| (d.unit_id.as_str(), d.base.as_str()))
        .collect();

    for side in &state.sides {
        let filename = side.file.as_str();
        for (rcondition, (rline, recruit)) in &side.recruit {
            let rcondition = rcondition.as_deref();
            // Usage classes actually recruited under this condition.
            let mut utypes: Vec<&str> = Vec::new();
            for rtype in recruit {
                let mut base = rtype.as_str();
                if !state.unit_types.iter().any(|u| u == rtype) {
                    // Assume the author knew what they were doing if the
                    // entry is a macro reference.
                    if !rtype.starts_with('{') {
                        reporter.report(
                            filename,
                            *rline,
                            format!("{} is not a known unit type", rtype),
                        );
                    }
                    continue;
                } else if !state.usage.contains_key(rtype) {
                    match derivations.get(rtype.as_str()) {
                        Some(derived_base) => base = derived_base,
                        None => {
                            reporter.report(
                                filename,
                                *rline,
                                format!("{} has no usage type", rtype),
                            );
                            continue;
                        }
                    }
                }
                let Some(utype) = state.usage.get(base) else {
                    reporter.report(
                        filename,
                        *rline,
                        format!("{} has unknown base {}", rtype, base),
                    );
                    continue;
                };
                utypes.push(utype);
                for (pcondition, (_, pattern)) in &side.recruitment_pattern {
                    let pcondition = pcondition.as_deref();
                    if !condition_match(pcondition, rcondition) {
                        continue;
                    }
                    if pattern.iter().any(|p| p == utype) {
                        continue;
                    }
                    let rshow = match rcondition {
                        Some(c) => format!("At {}, ", c),
                        None => String::new(),
                    };
                    let ushow = if state.usage_types.iter().any(|u| u == utype) {
                        ""
                    } else {
                        ", a non-standard usage class"
                    };
                    let pshow = match pcondition {
                        Some(c) => format!(" {}", c),
                        None => String::new(),
                    };
                    reporter.report(
                        filename,
                        *rline,
                        format!(
                            "{}{} ({}{}) doesn't match the{} recruitment pattern ({}) for its side",
                            rshow,
                            rtype,
                            utype,
                            ushow,
                            pshow,
                            pattern.join(", ")
                        ),
                    );
                }
            }
            // The reverse direction: every usage class in the pattern
            // should be recruitable. Suppressed when the recruit list is a
            // macro expansion.
            if recruit.is_empty() || recruit[0].starts_with('{') {
                continue;
            }
            for (pcondition, (pline, pattern)) in &side.recruitment_pattern {
                let pcondition = pcondition.as_deref();
                if !condition_match(pcondition, rcondition) {
                    continue;
                }
                for utype in pattern {
                    if utypes.iter().any(|u| u == utype) {
                        continue;
                    }
                    let rshow = match rcondition {
                        Some(c) => format!(" at difficulty {}.", c),
                        None => ".".to_string(),
                    };
                    let ushow = if state.usage_types.iter().any(|u| u == utype) {
                        ""
                    } else {
                        " (a non-standard usage class)"
                    };
                    reporter.report(
                        filename,
                        *pline,
                        format!("no {}{} units recruitable{}", utype, ushow, rshow),
                    );
                }
            }
        }
    }

    if !state.movetypes.is_empty() {
        for mt in &state.unit_movetypes {
            if !state.movetypes.iter().any(|m| m == &mt.value) {
                reporter.report(
                    &mt.file,
                    mt.line,
                    format!("{} has unknown movement type", mt.unit_id),
                );
            }
        }
    }
    if !state.races.is_empty() {
        for race in &state.unit_races {
            if !state.races.iter().any(|r| r == &race.value) {
                reporter.report(
                    &race.file,
                    race.line,
                    format!("{} has unknown race", race.unit_id),
                );
            }
        }
    }
    // Derivation is not checked transitively; it is unclear whether
    // [base_unit] works when the base is itself derived.
    for derived in &state.derived_units {
        if !state.unit_types.iter().any(|u| u == &derived.base) {
            reporter.report(
                &derived.file,
                derived.line,
                format!(
                    "derivation of {} from {} does not resolve",
                    derived.unit_id, derived.base
                ),
            );
        }
    }
    for advance in &state.advances {
        let bad: Vec<&str> = advance
            .value
            .split(',')
            .map(str::trim)
            .filter(|a| {
                !state.unit_types.iter().any(|u| u == a) && !derivations.contains_key(a)
            })
            .collect();
        if !bad.is_empty() {
            reporter.report(
                &advance.file,
                advance.line,
                format!(
                    "{} has unknown advancements {}",
                    advance.unit_id,
                    bad.join(", ")
                ),
            );
        }
    }
    for next_ref in &state.next_refs {
        if !state.scenario_to_file.contains_key(&next_ref.id) {
            reporter.report(
                &next_ref.file,
                next_ref.line,
                format!("unresolved scenario reference {}", next_ref.id),
            );
        }
    }
    // Stored units never unstored or cleared; no line survives to point at.
    for (var, (file, ids)) in &state.stored_ids {
        reporter.report_file(
            file,
            format!("stored unit \"{}\" not unstored or cleared from \"{}\"", ids, var),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{DerivedUnit, ScenarioRef, SideInfo, UnitRef};
    use pretty_assertions::assert_eq;

    fn messages(state: &CorpusState) -> Vec<String> {
        let mut reporter = Reporter::new();
        consistency_check(state, &mut reporter);
        reporter.take().into_iter().map(|d| d.message).collect()
    }

    fn side_with_recruit(types: &[&str]) -> SideInfo {
        let mut side = SideInfo {
            file: "scenario.cfg".to_string(),
            ..SideInfo::default()
        };
        side.recruit.insert(
            None,
            (4, types.iter().map(|s| s.to_string()).collect()),
        );
        side
    }

    #[test]
    fn test_unknown_unit_type() {
        let mut state = CorpusState::new();
        state.sides.push(side_with_recruit(&["Elvish Fighter"]));
        assert_eq!(
            messages(&state),
            vec!["Elvish Fighter is not a known unit type"]
        );
    }

    #[test]
    fn test_macro_recruit_not_reported() {
        let mut state = CorpusState::new();
        state.sides.push(side_with_recruit(&["{RANDOM_RECRUIT}"]));
        assert!(messages(&state).is_empty());
    }

    #[test]
    fn test_recruit_not_in_pattern() {
        let mut state = CorpusState::new();
        state.unit_types.push("Mage".to_string());
        state.usage.insert("Mage".to_string(), "mixed fighter".to_string());
        let mut side = side_with_recruit(&["Mage"]);
        side.recruitment_pattern
            .insert(None, (5, vec!["scout".to_string()]));
        state.sides.push(side);
        let msgs = messages(&state);
        assert!(msgs.contains(
            &"Mage (mixed fighter) doesn't match the recruitment pattern (scout) for its side"
                .to_string()
        ));
        assert!(msgs.contains(&"no scout units recruitable.".to_string()));
    }

    #[test]
    fn test_condition_gates_pattern_check() {
        let mut state = CorpusState::new();
        state.unit_types.push("Mage".to_string());
        state.usage.insert("Mage".to_string(), "mixed fighter".to_string());
        let mut side = side_with_recruit(&["Mage"]);
        // The recruit list is unconditional but the pattern only applies
        // under EASY, which still matches.
        side.recruitment_pattern
            .insert(Some("EASY".to_string()), (5, vec!["mixed fighter".to_string()]));
        state.sides.push(side);
        assert!(messages(&state).is_empty());
    }

    #[test]
    fn test_derived_unit_uses_base_usage() {
        let mut state = CorpusState::new();
        state.unit_types.push("Mage".to_string());
        state.unit_types.push("Desert Mage".to_string());
        state.usage.insert("Mage".to_string(), "mixed fighter".to_string());
        state.derived_units.push(DerivedUnit {
            file: "units.cfg".to_string(),
            line: 2,
            unit_id: "Desert Mage".to_string(),
            base: "Mage".to_string(),
        });
        state.sides.push(side_with_recruit(&["Desert Mage"]));
        assert!(messages(&state).is_empty());
    }

    #[test]
    fn test_unknown_movetype_and_race() {
        let mut state = CorpusState::new();
        state.movetypes.push("smallfoot".to_string());
        state.races.push("human".to_string());
        state.unit_movetypes.push(UnitRef {
            unit_id: "Crab".to_string(),
            file: "crab.cfg".to_string(),
            line: 7,
            value: "swimmer".to_string(),
        });
        state.unit_races.push(UnitRef {
            unit_id: "Crab".to_string(),
            file: "crab.cfg".to_string(),
            line: 8,
            value: "crustacean".to_string(),
        });
        let msgs = messages(&state);
        assert_eq!(
            msgs,
            vec![
                "Crab has unknown movement type",
                "Crab has unknown race"
            ]
        );
    }

    #[test]
    fn test_unknown_advancement() {
        let mut state = CorpusState::new();
        state.unit_types.push("Mage".to_string());
        state.advances.push(UnitRef {
            unit_id: "Mage".to_string(),
            file: "units.cfg".to_string(),
            line: 3,
            value: "Arch Mage, Silver Mage".to_string(),
        });
        assert_eq!(
            messages(&state),
            vec!["Mage has unknown advancements Arch Mage, Silver Mage"]
        );
    }

    #[test]
    fn test_unresolved_scenario_reference() {
        let mut state = CorpusState::new();
        state
            .scenario_to_file
            .insert("01_Opening".to_string(), "s1.cfg".to_string());
        state.next_refs.push(ScenarioRef {
            file: "s1.cfg".to_string(),
            line: 2,
            id: "02_Battle".to_string(),
        });
        assert_eq!(
            messages(&state),
            vec!["unresolved scenario reference 02_Battle"]
        );
    }

    #[test]
    fn test_leftover_stored_unit() {
        let mut state = CorpusState::new();
        state.stored_ids.insert(
            "rescued".to_string(),
            ("s1.cfg".to_string(), "Elyssa".to_string()),
        );
        assert_eq!(
            messages(&state),
            vec!["stored unit \"Elyssa\" not unstored or cleared from \"rescued\""]
        );
    }
}
