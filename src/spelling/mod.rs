//! Spell-checking of translatable strings.
//!
//! Exceptions layer hierarchically: the builtin global list, words declared
//! for enclosing directories, words declared for the file, then in-file
//! `# wmllint: local spellings` comments. `id=` values join the session too
//! so proper names never trip the checker. Findings are advisory like
//! everything else.

pub mod dictionary;

use std::collections::HashMap;
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::parser::attribute::{parse_attribute, string_strip};
use crate::parser::iterator::WmlIterator;
use crate::registry::CorpusState;
use crate::report::Reporter;
use crate::rules::catalog::SPELLCHECK_KEYS;
use crate::validation::markup::pango_strip;
use crate::LintOptions;

pub use dictionary::SpellDict;

static LOCAL_SPELLING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"wmllint: local spellings? (.*)").unwrap());
static MODIFIER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-][0-9]").unwrap());
static CONTINUATION_FOLD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r#"" *\+\s*_? *""#).unwrap());
static ONOMATOPOEIA_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:hm+|a+[ur]*g+h*|(?:mu)?ha(?:ha)*|ah+|no+|um+|aw+|o+h+|s+h+)").unwrap()
});
// Text content extraction for help markup; one pattern per tag since the
// open and close tags must agree.
static HELP_MARKUP_RES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    let mut patterns = Vec::new();
    for tag in ["ref", "format"] {
        let re = Regex::new(&format!(r"<{tag}>.*?text='(.*?)'.*?< {tag}>")).unwrap();
        patterns.push((re, "$1"));
    }
    for tag in ["jump", "img"] {
        let re = Regex::new(&format!(r"<{tag}>.*?< {tag}>")).unwrap();
        patterns.push((re, ""));
    }
    for tag in ["italic", "bold", "header"] {
        let re = Regex::new(&format!(r"<{tag}>text='(.*?)'< {tag}>")).unwrap();
        patterns.push((re, "$1"));
    }
    patterns
});

/// Junk characters and highlighter sigils dropped before tokenizing.
const DISCARDS: &[(&str, &str)] = &[
    ("[", " "),
    ("]", " "),
    ("...", " "),
    ("\"", " "),
    ("\\n", " "),
    ("/", " "),
    ("@", " "),
    (")", " "),
    ("(", " "),
    ("\u{2026}", " "), // ellipsis
    ("\u{2014}", " "), // em dash
    ("\u{2013}", " "), // en dash
    ("\u{2015}", " "), // horizontal bar
    ("\u{2212}", " "), // minus sign
    ("\u{2019}", "'"), // right single quote
    ("\u{2018}", "'"), // left single quote
    ("\u{201d}", " "), // right double quote
    ("\u{201c}", " "), // left double quote
    ("\u{2022}", " "), // bullet
    ("\u{25e6}", ""),
    ("''", ""),
    ("female^", " "),
    ("male^", " "),
    ("teamname^", " "),
    ("team_name^", " "),
    ("UI^", " "),
    ("^", " "),
];

const LEADING_JUNK: &str = " \t(`@*'%_+";
const TRAILING_JUNK: &str = "_-*).,:;?!& \t";
const TRAILING_JUNK_QUOTED: &str = "_-*').,:;?!& \t";

/// Spell-check one file.
///
/// Returns the file's new text when `--write-spellings` inserted exception
/// comments, `None` otherwise.
pub fn spellcheck(
    filename: &str,
    text: &str,
    state: &CorpusState,
    dict: &mut SpellDict,
    options: &LintOptions,
    reporter: &mut Reporter,
) -> Option<String> {
    let lines: Vec<String> = text
        .split('\n')
        .map(|l| l.trim_end_matches('\r').to_string())
        .collect();

    // Declared exceptions for this file and every directory above it.
    let mut local_spellings: Vec<String> = Vec::new();
    let mut scope = Path::new(filename);
    loop {
        for word in state.spellings_for(&scope.to_string_lossy()) {
            if !dict.dict_check(word) {
                dict.add_session(word);
                local_spellings.push(word.clone());
            }
        }
        match scope.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => scope = parent,
            _ => break,
        }
    }

    // In-file declarations first, so a message above the comment that
    // declares its words still passes.
    for visit in WmlIterator::new(&lines, filename) {
        if !visit.elements.is_empty() {
            continue;
        }
        let Some(hash) = visit.text.find('#') else {
            continue;
        };
        let comment = &visit.text[hash..];
        if let Some(caps) = LOCAL_SPELLING_RE.captures(comment) {
            for word in caps[1].split_whitespace() {
                let word = word.to_lowercase();
                if dict.check(&word) {
                    reporter.report(
                        filename,
                        visit.lineno + 1,
                        format!("spelling '{}' already declared", word),
                    );
                } else {
                    dict.add_session(&word);
                    local_spellings.push(word);
                }
            }
        }
    }

    let mut to_insert: HashMap<usize, Vec<String>> = HashMap::new();
    for visit in WmlIterator::new(&lines, filename) {
        let Some(key) = visit.attribute_key() else {
            continue;
        };
        if SPELLCHECK_KEYS.contains(&key) {
            // Help text is full of markup we cannot filter well enough.
            if key == "text" && visit.in_ancestors("[help]") {
                continue;
            }
            let text = if visit.text.contains('<')
                || visit.text.contains('>')
                || visit.text.contains('&')
            {
                pango_strip(&visit.text)
            } else {
                visit.text.clone()
            };
            let Some(attr) = parse_attribute(&text) else {
                continue;
            };
            if attr.comment.contains("no spellcheck") {
                continue;
            }
            for word in inner_spellcheck(&attr.value, dict) {
                reporter.report(
                    filename,
                    visit.lineno + 1,
                    format!("possible misspelling \"{}\"", word),
                );
                to_insert.entry(visit.lineno).or_default().push(word);
            }
        }
        if key == "id" {
            if let Some(attr) = parse_attribute(&visit.text) {
                let value = string_strip(&attr.value).to_lowercase();
                if !value.is_empty() && !dict.check(&value) {
                    dict.add_session(&value);
                    local_spellings.push(value);
                }
            }
        }
    }

    for word in &local_spellings {
        dict.remove_session(word);
    }

    if !options.write_spellings || to_insert.is_empty() {
        return None;
    }
    Some(insert_spellings(text, &to_insert))
}

/// Rebuild the file with `local spellings` comments above flagged lines.
/// Each word is inserted once even when it is misspelled repeatedly.
fn insert_spellings(text: &str, to_insert: &HashMap<usize, Vec<String>>) -> String {
    let mut inserted: Vec<String> = Vec::new();
    let mut out = String::with_capacity(text.len());
    for (i, line) in text.split_inclusive('\n').enumerate() {
        if let Some(words) = to_insert.get(&i) {
            let fresh: Vec<&str> = words
                .iter()
                .filter(|w| !inserted.contains(w))
                .map(String::as_str)
                .collect();
            if !fresh.is_empty() {
                out.push_str("# wmllint: local spellings ");
                out.push_str(&fresh.join(" "));
                out.push('\n');
                inserted.extend(fresh.iter().map(|w| w.to_string()));
            }
        }
        out.push_str(line);
    }
    out
}

/// Tokenize an attribute value and yield the tokens the dictionary rejects
/// after every acceptance fallback has been tried.
fn inner_spellcheck(value: &str, dict: &SpellDict) -> Vec<String> {
    let mut value = value.trim().to_string();
    if let Some(stripped) = value.strip_prefix('_') {
        value = stripped.trim().to_string();
    }
    // Line continuations interfere with string-stripping.
    if let Some(stripped) = value.strip_suffix('+') {
        value = stripped.trim_end().to_string();
    }
    let mut value = string_strip(&value).to_string();
    for (old, new) in DISCARDS {
        value = value.replace(old, new);
    }
    if value.contains('<') {
        for (re, replacement) in HELP_MARKUP_RES.iter() {
            value = re.replace_all(&value, *replacement).into_owned();
        }
    }
    let value = CONTINUATION_FOLD_RE.replace_all(&value, "").into_owned();

    let mut flagged = Vec::new();
    'tokens: for token in value.split_whitespace() {
        let mut lowered = token.to_lowercase();
        let mut normal = token.to_string();
        if dict.check(&lowered) {
            continue;
        }
        while lowered
            .chars()
            .next()
            .map(|c| LEADING_JUNK.contains(c))
            .unwrap_or(false)
        {
            lowered.remove(0);
            normal.remove(0);
        }
        // Interpolations and numeric literals are not words.
        if lowered.is_empty() || lowered.starts_with('$') {
            continue;
        }
        // Suffixes come off in two passes; some Dwarvish dialect words end
        // in a single quote, which the first pass must keep.
        strip_trailing(&mut lowered, &mut normal, TRAILING_JUNK);
        if !lowered.is_empty() && dict.check(&lowered) {
            continue;
        }
        strip_trailing(&mut lowered, &mut normal, TRAILING_JUNK_QUOTED);
        if lowered.is_empty()
            || lowered.starts_with('$')
            || lowered.starts_with(|c: char| c.is_ascii_digit())
        {
            continue;
        }
        lowered = string_strip(&lowered).to_string();
        normal = string_strip(&normal).to_string();
        if !lowered.is_empty() && dict.check(&lowered) {
            continue;
        }
        if let Some(stem) = lowered.strip_suffix("'s") {
            if dict.check(stem) {
                continue;
            }
        }
        // Hyphenated compounds pass when all their parts do.
        if lowered.contains('-') {
            if lowered
                .split('-')
                .all(|part| part.is_empty() || dict.check(part))
            {
                continue 'tokens;
            }
        }
        if MODIFIER_RE.is_match(&lowered) {
            continue;
        }
        if ONOMATOPOEIA_RE.is_match(&lowered) {
            continue;
        }
        flagged.push(normal);
    }
    flagged
}

fn strip_trailing(lowered: &mut String, normal: &mut String, junk: &str) {
    while lowered
        .chars()
        .last()
        .map(|c| junk.contains(c))
        .unwrap_or(false)
    {
        lowered.pop();
        normal.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn test_dict() -> SpellDict {
        let aff = "SET UTF-8\nTRY esianrtolcdugmphbyfvkwzESIANRTOLCDUGMPHBYFVKWZ'";
        let dic = "6\nhello\nworld\nelf\nthe\nking\nreturn";
        SpellDict::from_contents(aff, dic).unwrap()
    }

    fn run(src: &str, options: &LintOptions) -> (Option<String>, Vec<String>) {
        let state = CorpusState::new();
        let mut dict = test_dict();
        let mut reporter = Reporter::new();
        let out = spellcheck("test.cfg", src, &state, &mut dict, options, &mut reporter);
        let messages = reporter.take().into_iter().map(|d| d.to_string()).collect();
        (out, messages)
    }

    #[test]
    fn test_flags_unknown_word() {
        let src = "[message]\nmessage=_ \"hello wrold\"\n[/message]\n";
        let (_, messages) = run(src, &LintOptions::default());
        assert_eq!(
            messages,
            vec!["\"test.cfg\", line 2: possible misspelling \"wrold\""]
        );
    }

    #[test]
    fn test_local_spelling_directive_accepts() {
        let src = "# wmllint: local spellings wrold\n[message]\nmessage=_ \"hello wrold\"\n[/message]\n";
        let (_, messages) = run(src, &LintOptions::default());
        assert!(messages.is_empty());
    }

    #[test]
    fn test_duplicate_declaration_reported() {
        let src = "# wmllint: local spellings hello\n";
        let (_, messages) = run(src, &LintOptions::default());
        assert_eq!(
            messages,
            vec!["\"test.cfg\", line 1: spelling 'hello' already declared"]
        );
    }

    #[test]
    fn test_id_value_becomes_exception() {
        let src = "[unit]\nid=Grognak\n[/unit]\n[message]\nmessage=_ \"Grognak the king\"\n[/message]\n";
        let (_, messages) = run(src, &LintOptions::default());
        assert!(messages.is_empty());
    }

    #[test]
    fn test_no_spellcheck_comment() {
        let src = "[message]\nmessage=_ \"hello wrold\" # wmllint: no spellcheck\n[/message]\n";
        let (_, messages) = run(src, &LintOptions::default());
        assert!(messages.is_empty());
    }

    #[test]
    fn test_write_spellings_inserts_comment() {
        let src = "[message]\nmessage=_ \"hello wrold\"\n[/message]\n";
        let options = LintOptions {
            write_spellings: true,
            ..LintOptions::default()
        };
        let (out, _) = run(src, &options);
        assert_eq!(
            out.unwrap(),
            "[message]\n# wmllint: local spellings wrold\nmessage=_ \"hello wrold\"\n[/message]\n"
        );
    }

    #[test]
    fn test_directory_exception_applies() {
        let mut state = CorpusState::new();
        state.add_spelling("campaign/scenarios", "wrold");
        let mut dict = test_dict();
        let mut reporter = Reporter::new();
        let src = "[message]\nmessage=_ \"hello wrold\"\n[/message]\n";
        spellcheck(
            "campaign/scenarios/s1.cfg",
            src,
            &state,
            &mut dict,
            &LintOptions::default(),
            &mut reporter,
        );
        assert!(reporter.is_empty());
        // Exceptions are withdrawn after the file.
        assert!(!dict.check("wrold"));
    }

    #[test]
    fn test_tokenizer_fallbacks() {
        let dict = test_dict();
        assert!(inner_spellcheck("_ \"The king's return...\"", &dict).is_empty());
        assert!(inner_spellcheck("\"Noooo! Aargh!\"", &dict).is_empty());
        assert!(inner_spellcheck("\"$unit.name attacks\"", &dict)
            .contains(&"attacks".to_string()));
        assert!(inner_spellcheck("\"elf-king\"", &dict).is_empty());
        assert!(inner_spellcheck("\"+2 damage\"", &dict).contains(&"damage".to_string()));
    }

    #[test]
    fn test_help_markup_extracted() {
        let dict = test_dict();
        let flagged = inner_spellcheck(
            "_ \"see <ref>dst='about' text='the king'< ref> for details\"",
            &dict,
        );
        assert!(flagged.contains(&"see".to_string()));
        assert!(!flagged.iter().any(|w| w.contains("dst")));
    }
}
