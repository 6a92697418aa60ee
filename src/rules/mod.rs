//! The syntax-rewrite pass.
//!
//! [`rewrite`] migrates deprecated syntax to current equivalents: path
//! normalization, block-level insertions that need look-ahead, renames
//! scoped to an enclosing tag, and finally the global rename catalog. Two
//! magic comments opt out: `no-syntax-rewrite` stops the pass for the rest
//! of the file, `wmllint: noconvert` shields a single line from catalog
//! renames. Re-running the pass on migrated text changes nothing.

pub mod catalog;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::parser::attribute::parse_attribute;
use crate::parser::directives::is_no_syntax_rewrite;
use crate::report::Reporter;

use catalog::{ALIAS_CHANGES, LINE_CHANGES, MAINLINE_CAMPAIGNS};

/// Indentation unit assumed for inserted lines, matching wmlindent.
const BASE_INDENT: &str = "    ";

static WINPATH_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)([^ ={}"]*\\[^ ={}"]+\.)(png|ogg|wav|gif|jpe?g|map|mask|cfg)\b"#).unwrap()
});
static USERDATA_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?:\.\./)?user(?:data/)?(data/[ac][^/]*/?)").unwrap());
static JOURNEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{(DOT|CROSS) ([0-9]+) ([0-9]+)\}").unwrap());
static RC_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"~RC\(([^=)]*)=([^)]*)\)").unwrap());
static TERRAIN_OPEN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[terrain\]").unwrap());
static TERRAIN_CLOSE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\[/terrain\]").unwrap());
static TERRAIN_WORD_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"terrain([^_])").unwrap());
static FORMAT_KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"format(\s*=)").unwrap());
static RANDOM_KEY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"random(\s*=)").unwrap());
static DATA_CAMPAIGNS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"data/campaigns/(\w[\w'&+-]*)").unwrap());
static TILDE_PATH_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^\s*path) *= *([^#]{0,5})(~/?(?:data/)?add-ons/)").unwrap());

/// The leading whitespace of a line.
fn leader(s: &str) -> &str {
    &s[..s.len() - s.trim_start().len()]
}

/// Does the line contain `[tag]` or `[+tag]`?
fn has_opening_tag(line: &str, tag: &str) -> bool {
    line.contains(&format!("[{}]", tag)) || line.contains(&format!("[+{}]", tag))
}

/// Split a line at the first comment hash preceded by whitespace. A `#`
/// with no leading whitespace may be color markup and is left in the code
/// part.
fn split_precomment(line: &str) -> (&str, &str) {
    let bytes = line.as_bytes();
    for i in 1..bytes.len() {
        if bytes[i] == b'#' && (bytes[i - 1] as char).is_whitespace() {
            return (&line[..i], &line[i..]);
        }
    }
    (line, "")
}

/// Run every rewrite pass over a file's lines.
pub fn rewrite(
    filename: &str,
    mut lines: Vec<String>,
    missing_side: bool,
    reporter: &mut Reporter,
) -> Vec<String> {
    fix_windows_paths(filename, &mut lines, reporter);
    insert_attack_descriptions(filename, &mut lines, reporter);
    insert_narrator_images(filename, &mut lines, reporter);
    fix_journey_macros(&mut lines);
    quote_single_quotes(filename, &mut lines, reporter);
    fix_palette_syntax(&mut lines);
    rename_terrain_tags(&mut lines);
    rename_set_variable_keys(&mut lines);
    fix_addon_paths(filename, &mut lines, reporter);
    if missing_side {
        check_sideless_closers(filename, &lines, reporter);
    }
    fix_terrain_aliases(filename, &mut lines, reporter);
    apply_line_changes(filename, &mut lines, reporter);
    lines
}

/// Backslash path separators and `userdata/` prefixes are Windows-author
/// habits that break other platforms.
fn fix_windows_paths(filename: &str, lines: &mut [String], reporter: &mut Reporter) {
    for (i, line) in lines.iter_mut().enumerate() {
        if is_no_syntax_rewrite(line) {
            break;
        }
        let (precomment, comment) = split_precomment(line);
        let mut precomment = precomment.to_string();
        let comment = comment.to_string();
        if precomment.contains('\\') {
            while let Some(caps) = WINPATH_RE.captures(&precomment) {
                let whole = caps.get(0).unwrap();
                // Doubled backslashes are intentional escapes; leave them.
                if caps[1].contains("\\\\") {
                    break;
                }
                let fronted = format!("{}{}", caps[1].replace('\\', "/"), &caps[2]);
                reporter.report(
                    filename,
                    i + 1,
                    format!(
                        "{} -> {} -- please use frontslash (/) for cross-platform compatibility",
                        whole.as_str(),
                        fronted
                    ),
                );
                precomment = format!(
                    "{}{}{}",
                    &precomment[..whole.start()],
                    fronted,
                    &precomment[whole.end()..]
                );
            }
        }
        if precomment.contains("userdata/") {
            while let Some(caps) = USERDATA_RE.captures(&precomment) {
                let whole = caps.get(0).unwrap();
                let fixed = caps[1].to_string();
                reporter.report(
                    filename,
                    i + 1,
                    format!(
                        "{} -> {} -- DO NOT PREFIX PATHS WITH \"userdata/\"",
                        whole.as_str(),
                        fixed
                    ),
                );
                precomment = format!(
                    "{}{}{}",
                    &precomment[..whole.start()],
                    fixed,
                    &precomment[whole.end()..]
                );
            }
        }
        *line = format!("{}{}", precomment, comment);
    }
}

/// Every attack needs a translatable description; derive one from its name
/// when missing. Dummy declarations (`no-icon` comment) and attacks
/// modified through [filter_wml] inherit theirs and are skipped.
fn insert_attack_descriptions(filename: &str, lines: &mut Vec<String>, reporter: &mut Reporter) {
    let mut in_filter_wml = false;
    let mut i = 0;
    while i < lines.len() {
        if is_no_syntax_rewrite(&lines[i]) {
            break;
        }
        if lines[i].contains("[filter_wml]") {
            in_filter_wml = true;
        } else if lines[i].contains("[/filter_wml]") {
            in_filter_wml = false;
        } else if lines[i].contains("[attack]") {
            let mut j = i;
            let mut have_description = false;
            let mut left_open = false;
            while !lines[j].contains("[/attack]") {
                if lines[j].trim().starts_with("description") {
                    have_description = true;
                }
                j += 1;
                if j >= lines.len() {
                    reporter.report(filename, i + 1, "[attack] tag not closed in this file");
                    left_open = true;
                    break;
                }
            }
            if !have_description && !left_open {
                let mut j = i;
                while !lines[j].contains("[/attack]") {
                    let (syntactic, comment) = split_precomment(&lines[j]);
                    if syntactic.trim().starts_with("name") && !comment.contains("no-icon") {
                        if let Some((_, raw)) = syntactic.split_once('=') {
                            let mut description = raw.trim().to_string();
                            if !description.starts_with('"') {
                                description = format!("\"{}\"", description);
                            }
                            if !in_filter_wml {
                                let new_line =
                                    format!("{}description=_{}", leader(syntactic), description);
                                reporter.notice(
                                    filename,
                                    i + 1,
                                    format!("inserting {:?}", new_line),
                                );
                                lines.insert(j + 1, new_line);
                                j += 1;
                            }
                        }
                    }
                    j += 1;
                }
            }
        }
        i += 1;
    }
}

/// Narrator speech without an image gets the Wesnoth icon, so the dialog
/// box is not left with an empty portrait slot.
fn insert_narrator_images(filename: &str, lines: &mut Vec<String>, reporter: &mut Reporter) {
    let mut narrator = false;
    let mut has_image = false;
    let mut i = 0;
    while i < lines.len() {
        if is_no_syntax_rewrite(&lines[i]) {
            break;
        }
        let precomment = lines[i].split('#').next().unwrap_or("").to_string();
        if precomment.contains("speaker=narrator") {
            narrator = true;
        } else if precomment.trim().starts_with("image") {
            has_image = true;
        } else if precomment.contains("[/message]") {
            if narrator && !has_image {
                // Assumes the file has been through wmlindent.
                reporter.notice(filename, i + 1, "inserting \"image=wesnoth-icon.png\"");
                lines.insert(
                    i,
                    format!("{}{}image=wesnoth-icon.png", leader(&precomment), BASE_INDENT),
                );
            }
            narrator = false;
            has_image = false;
        }
        i += 1;
    }
}

/// Journey-track macros from 1.4 encoded colors in their names; the
/// coordinate forms also moved by five pixels.
fn fix_journey_macros(lines: &mut [String]) {
    for line in lines.iter_mut() {
        if is_no_syntax_rewrite(line) {
            break;
        }
        if line.contains("{DOT_CENTERED") {
            *line = line.replace("DOT_CENTERED", "NEW_JOURNEY");
        } else if line.contains("{DOT_WHITE_CENTERED") {
            *line = line.replace("DOT_WHITE_CENTERED", "OLD_JOURNEY");
        } else if line.contains("{CROSS_CENTERED") {
            *line = line.replace("CROSS_CENTERED", "NEW_BATTLE");
        } else if line.contains("{CROSS_WHITE_CENTERED") {
            *line = line.replace("CROSS_WHITE_CENTERED", "OLD_BATTLE");
        } else if line.contains("{FLAG_RED_CENTERED") {
            *line = line.replace("FLAG_RED_CENTERED", "NEW_REST");
        } else if line.contains("{FLAG_WHITE_CENTERED") {
            *line = line.replace("FLAG_WHITE_CENTERED", "OLD_REST");
        } else if line.contains("{DOT ") || line.contains("CROSS") {
            if let Some(caps) = JOURNEY_RE.captures(line) {
                let whole = caps.get(0).unwrap();
                let name = if &caps[1] == "DOT" {
                    "NEW_JOURNEY"
                } else {
                    "NEW_BATTLE"
                };
                let x: i64 = caps[2].parse().unwrap_or(0) + 5;
                let y: i64 = caps[3].parse().unwrap_or(0) + 5;
                *line = format!(
                    "{}{{{} {} {}}}{}",
                    &line[..whole.start()],
                    name,
                    x,
                    y,
                    &line[whole.end()..]
                );
            }
        }
    }
}

/// Bare attribute values containing an odd number of single quotes confuse
/// editor syntax highlighting; enclose them in double quotes.
fn quote_single_quotes(filename: &str, lines: &mut [String], reporter: &mut Reporter) {
    for (i, line) in lines.iter_mut().enumerate() {
        if is_no_syntax_rewrite(line) {
            break;
        }
        if line.matches('\'').count() % 2 != 1 {
            continue;
        }
        let Some(attr) = parse_attribute(line) else {
            continue;
        };
        let value = &attr.value;
        let first_alpha = value.chars().next().map_or(false, |c| c.is_alphabetic());
        let last_alpha = value.chars().last().map_or(false, |c| c.is_alphabetic());
        if value.contains('\'')
            && first_alpha
            && last_alpha
            && !line.contains(&format!("\"{}\"", value))
        {
            let newtext = format!("{}\"{}\"{}", attr.prefix, value, attr.comment);
            if *line != newtext {
                *line = newtext;
                reporter.notice(filename, i + 1, "quote-enclosing attribute value.");
            }
        }
    }
}

/// `~RC(a=b)` image-path function became `~PAL(a>b)` in 1.7.
fn fix_palette_syntax(lines: &mut [String]) {
    for line in lines.iter_mut() {
        if is_no_syntax_rewrite(line) {
            break;
        }
        if line.contains("RC") {
            *line = RC_RE.replace_all(line, "~PAL($1>$2)").into_owned();
        }
    }
}

/// [terrain] the definition tag became [terrain_type]; only top-level
/// occurrences qualify, which relies on the file having been wmlindented.
/// Inside [standing_anim], terrain= filters likewise became terrain_type=.
fn rename_terrain_tags(lines: &mut [String]) {
    let mut in_standing_anim = false;
    for line in lines.iter_mut() {
        if is_no_syntax_rewrite(line) {
            break;
        }
        *line = TERRAIN_OPEN_RE.replace(line, "[terrain_type]").into_owned();
        *line = TERRAIN_CLOSE_RE.replace(line, "[/terrain_type]").into_owned();
        if has_opening_tag(line, "standing_anim") {
            in_standing_anim = true;
        }
        if line.contains("[/standing_anim]") {
            in_standing_anim = false;
        }
        if in_standing_anim {
            *line = TERRAIN_WORD_RE.replace_all(line, "terrain_type$1").into_owned();
        }
    }
}

/// [set_variable] renamed format= to value= and random= to rand=.
fn rename_set_variable_keys(lines: &mut [String]) {
    let mut in_set_variable = false;
    for line in lines.iter_mut() {
        if is_no_syntax_rewrite(line) {
            break;
        }
        if has_opening_tag(line, "set_variable") {
            in_set_variable = true;
        }
        if line.contains("[/set_variable]") {
            in_set_variable = false;
        }
        if in_set_variable {
            *line = FORMAT_KEY_RE.replace(line, "value$1").into_owned();
            *line = RANDOM_KEY_RE.replace(line, "rand$1").into_owned();
        }
    }
}

/// The campaigns directory became add-ons. Mainline campaign paths keep
/// their name; user content moves to `data/add-ons/`. [textdomain] and
/// [binary_path] paths additionally must not use `~` for userdata.
fn fix_addon_paths(filename: &str, lines: &mut [String], reporter: &mut Reporter) {
    let mut in_binary_path = false;
    let mut in_textdomain = false;
    for (i, line) in lines.iter_mut().enumerate() {
        if is_no_syntax_rewrite(line) {
            break;
        }
        if line.contains("campaigns/") {
            *line = line
                .replace("{~campaigns/", "{~add-ons/")
                .replace("{~/campaigns/", "{~add-ons/")
                .replace("{@campaigns/", "{~add-ons/");
            let umc: Vec<String> = DATA_CAMPAIGNS_RE
                .captures_iter(line)
                .map(|caps| caps[1].to_string())
                .filter(|name| !MAINLINE_CAMPAIGNS.contains(&name.as_str()))
                .collect();
            for name in umc {
                *line = line.replace(
                    &format!("data/campaigns/{}", name),
                    &format!("data/add-ons/{}", name),
                );
                reporter.report(
                    filename,
                    i + 1,
                    format!("data/campaigns/{} -> data/add-ons/{}", name, name),
                );
            }
        } else if line.contains("@add-ons/") {
            *line = line.replace("{@add-ons/", "{~add-ons/");
        }
        if has_opening_tag(line, "binary_path") {
            in_binary_path = true;
        }
        if line.contains("[/binary_path]") {
            in_binary_path = false;
        }
        if has_opening_tag(line, "textdomain") {
            in_textdomain = true;
        }
        if line.contains("[/textdomain]") {
            in_textdomain = false;
        }
        if (in_binary_path || in_textdomain) && line.contains('~') {
            if let Some(caps) = TILDE_PATH_RE.captures(line) {
                let end = caps.get(0).unwrap().end();
                let tilde = caps[3].to_string();
                *line = format!("{}={}data/add-ons/{}", &caps[1], &caps[2], &line[end..]);
                reporter.report(
                    filename,
                    i + 1,
                    format!(
                        "{} -> data/add-ons/ -- [textdomain] and [binary_path] paths do not accept \"~\" for userdata",
                        tilde
                    ),
                );
            }
        }
    }
}

/// Since 1.9.5 these tags no longer default to side 1; without a side
/// attribute or [filter_side] they now apply to all sides. [theme] also
/// contains a [gold] tag, which is excluded.
fn check_sideless_closers(filename: &str, lines: &[String], reporter: &mut Reporter) {
    const TAGS: &[&str] = &[
        "remove_shroud",
        "place_shroud",
        "gold",
        "modify_side",
        "modify_ai",
    ];
    let mut outside_theme = true;
    let mut in_tag = false;
    let mut needs_side = true;
    for (i, line) in lines.iter().enumerate() {
        if is_no_syntax_rewrite(line) {
            break;
        }
        let precomment = line.split('#').next().unwrap_or("");
        if outside_theme {
            if has_opening_tag(precomment, "theme") {
                outside_theme = false;
            }
        } else if precomment.contains("[/theme]") {
            outside_theme = true;
        }
        if !outside_theme {
            continue;
        }
        if !in_tag {
            for tag in TAGS {
                if precomment.contains(&format!("[{}]", tag)) {
                    in_tag = true;
                }
            }
        } else {
            if needs_side
                && (precomment.contains("side=") || precomment.contains("[filter_side]"))
            {
                needs_side = false;
            }
            for tag in TAGS {
                if precomment.contains(&format!("[/{}]", tag)) {
                    if needs_side {
                        reporter.notice(
                            filename,
                            i + 1,
                            format!(
                                "[{}] without \"side\" attribute is now applied to all sides",
                                tag
                            ),
                        );
                    }
                    in_tag = false;
                    needs_side = true;
                    break;
                }
            }
        }
    }
}

/// Base-terrain alias renames, applied token-wise to `aliasof=` values.
fn fix_terrain_aliases(filename: &str, lines: &mut [String], reporter: &mut Reporter) {
    for (i, line) in lines.iter_mut().enumerate() {
        if is_no_syntax_rewrite(line) {
            break;
        }
        if !line.contains("aliasof") || line.contains("wmllint: noconvert") {
            continue;
        }
        let Some(attr) = parse_attribute(line) else {
            continue;
        };
        if attr.key != "aliasof" {
            continue;
        }
        let new_value: Vec<&str> = attr
            .value
            .split(',')
            .map(|token| {
                let token = token.trim();
                ALIAS_CHANGES
                    .iter()
                    .find(|(old, _)| *old == token)
                    .map(|(_, new)| *new)
                    .unwrap_or(token)
            })
            .collect();
        let new_value = new_value.join(", ");
        if new_value != attr.value {
            reporter.notice(
                filename,
                i + 1,
                format!("{} -> {}", attr.value, new_value),
            );
            *line = format!("{}{}{}", attr.prefix, new_value, attr.comment);
        }
    }
}

/// The global rename catalog: straight substring substitutions covering
/// renamed tags, attributes, and asset paths.
fn apply_line_changes(filename: &str, lines: &mut [String], reporter: &mut Reporter) {
    for (i, line) in lines.iter_mut().enumerate() {
        if is_no_syntax_rewrite(line) {
            break;
        }
        if line.contains("wmllint: noconvert") {
            continue;
        }
        for (old, new) in LINE_CHANGES {
            if line.contains(old) {
                *line = line.replace(old, new);
                reporter.notice(filename, i + 1, format!("{} -> {}", old, new));
            }
        }
    }
}
