//! Single-line attribute splitting.
//!
//! A WML attribute line has the shape `key=value # comment`. The splitter
//! returns the pieces without interpreting them; in particular the value
//! keeps its quotes and any leading translation mark, so callers that need
//! the bare text go through [`string_strip`].

/// One split attribute line.
///
/// `prefix` is everything up to and including the `=` (leading whitespace
/// and key), so `prefix + value + comment` reassembles the line apart from
/// whitespace immediately around the value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub prefix: String,
    pub value: String,
    pub comment: String,
}

/// Try to split a line into `(key, prefix, value, comment)`.
///
/// Returns `None` when the line is not an attribute: no `=` outside tag
/// brackets and string literals, or a comment starts before the `=`.
/// Callers must treat `None` as "this line is structural", not an error.
/// The value is whitespace-trimmed, so downstream checks never see
/// leading or trailing spaces around it.
pub fn parse_attribute(line: &str) -> Option<Attribute> {
    let eq = find_separator(line)?;
    let leader = &line[..eq];
    let key = leader.trim();
    if key.is_empty() {
        return None;
    }
    let after = &line[eq + 1..];

    // Locate the trailing comment, honoring quote parity so a '#' inside a
    // string literal is not treated as a comment start.
    let mut in_string = false;
    let mut comment_at = after.len();
    for (i, ch) in after.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            '#' if !in_string => {
                comment_at = i;
                break;
            }
            _ => {}
        }
    }

    let value = after[..comment_at].trim().to_string();
    let comment = after[comment_at..].to_string();

    Some(Attribute {
        key: key.to_string(),
        prefix: line[..=eq].to_string(),
        value,
        comment,
    })
}

/// Find the byte offset of the separating `=`, skipping any `=` inside tag
/// brackets or string literals. Returns `None` if a comment intervenes.
fn find_separator(line: &str) -> Option<usize> {
    let mut in_string = false;
    let mut bracket_depth = 0usize;
    for (i, ch) in line.char_indices() {
        match ch {
            '"' => in_string = !in_string,
            _ if in_string => {}
            '[' => bracket_depth += 1,
            ']' => bracket_depth = bracket_depth.saturating_sub(1),
            '#' => return None,
            '=' if bracket_depth == 0 => return Some(i),
            _ => {}
        }
    }
    None
}

/// Strip one layer of double quotes from a value.
///
/// Deliberately asymmetric: a leading quote is removed even without a
/// trailing one, so the opening line of a multi-line string still yields
/// its text.
pub fn string_strip(value: &str) -> &str {
    match value.strip_prefix('"') {
        Some(rest) => rest.strip_suffix('"').unwrap_or(rest),
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_attribute() {
        let attr = parse_attribute("    side=1").unwrap();
        assert_eq!(attr.key, "side");
        assert_eq!(attr.prefix, "    side=");
        assert_eq!(attr.value, "1");
        assert_eq!(attr.comment, "");
    }

    #[test]
    fn test_quoted_value_and_comment() {
        let attr = parse_attribute("name=_ \"Narrator\" # speaker label").unwrap();
        assert_eq!(attr.key, "name");
        assert_eq!(attr.value, "_ \"Narrator\"");
        assert_eq!(attr.comment, "# speaker label");
    }

    #[test]
    fn test_hash_inside_string_is_not_comment() {
        let attr = parse_attribute("message=_ \"use # for color\"").unwrap();
        assert_eq!(attr.value, "_ \"use # for color\"");
        assert_eq!(attr.comment, "");
    }

    #[test]
    fn test_tag_line_is_not_attribute() {
        assert!(parse_attribute("[side]").is_none());
        assert!(parse_attribute("[/side]").is_none());
    }

    #[test]
    fn test_comment_before_equals() {
        assert!(parse_attribute("# side=1 is commented out").is_none());
    }

    #[test]
    fn test_equals_inside_brackets_ignored() {
        // [modify_ai] paths use brackets with embedded '='
        assert!(parse_attribute("[goal=all]").is_none());
    }

    #[test]
    fn test_string_strip() {
        assert_eq!(string_strip("\"Elvish Archer\""), "Elvish Archer");
        assert_eq!(string_strip("Elvish Archer"), "Elvish Archer");
        // Asymmetric: open string keeps going on the next line
        assert_eq!(string_strip("\"opening text"), "opening text");
    }

    #[test]
    fn test_multiline_string_open() {
        let attr = parse_attribute("story=_ \"Long ago,").unwrap();
        assert_eq!(attr.key, "story");
        assert_eq!(attr.value, "_ \"Long ago,");
    }
}
