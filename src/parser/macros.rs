//! Macro-invocation parsing.
//!
//! A macro reference is `{NAME arg1 arg2 ...}` where arguments may be
//! quoted strings, nested macro calls, or parenthesized WML blocks, and the
//! whole call may continue past the end of the line.

/// A parsed macro reference.
///
/// `args[0]` is the macro name. `brace_depth`/`paren_depth` are the nesting
/// depths left open at end of line; a fully closed single-line call has
/// both at zero.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MacroRef {
    pub args: Vec<String>,
    pub optional_args: Vec<String>,
    pub brace_depth: i32,
    pub paren_depth: i32,
}

impl MacroRef {
    /// The macro's name, if the reference parsed at all.
    pub fn name(&self) -> Option<&str> {
        self.args.first().map(|s| s.as_str())
    }

    /// Whether the invocation closed on the parsed line.
    pub fn is_closed(&self) -> bool {
        self.brace_depth == 0 && self.paren_depth == 0
    }
}

/// Parse a macro reference beginning at byte offset `start` in `line`.
///
/// Arguments split on whitespace at brace depth one, outside parentheses
/// and strings. Nested brace and paren content is folded into the argument
/// text. `key=value` arguments at the top level are collected separately
/// as optional arguments.
pub fn parse_macroref(start: usize, line: &str) -> MacroRef {
    let mut mref = MacroRef::default();
    let mut arg = String::new();
    let mut in_string = false;

    let push_arg = |mref: &mut MacroRef, arg: &mut String| {
        if arg.is_empty() {
            return;
        }
        if let Some((_, v)) = arg.split_once('=') {
            mref.optional_args.push(v.to_string());
        } else {
            mref.args.push(arg.clone());
        }
        arg.clear();
    };

    for ch in line[start..].chars() {
        if in_string {
            if ch == '"' {
                in_string = false;
            } else {
                arg.push(ch);
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => {
                if mref.brace_depth > 0 {
                    arg.push(ch);
                }
                mref.brace_depth += 1;
            }
            '}' => {
                mref.brace_depth -= 1;
                if mref.brace_depth == 0 {
                    push_arg(&mut mref, &mut arg);
                    break;
                }
                arg.push(ch);
            }
            '(' => mref.paren_depth += 1,
            ')' => mref.paren_depth -= 1,
            // Whitespace splits arguments at depth one; elsewhere it is
            // dropped, so a parenthesized argument collapses to its bare
            // token text.
            c if c.is_whitespace() => {
                if mref.brace_depth == 1 && mref.paren_depth == 0 {
                    push_arg(&mut mref, &mut arg);
                }
            }
            c => arg.push(c),
        }
    }
    mref
}
