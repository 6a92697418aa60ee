//! wmllint - WML maintenance checker and syntax migrator
//!
//! A library for checking Wesnoth Markup Language content for structural
//! and semantic problems, migrating old syntax in place, and spell-checking
//! translatable strings. All findings are advisory; nothing here aborts on
//! bad content.

use std::path::PathBuf;

pub mod cli;
pub mod discovery;
pub mod error;
pub mod parser;
pub mod registry;
pub mod report;
pub mod rules;
pub mod spelling;
pub mod validation;

pub use error::{Result, WmlError};
pub use parser::translate_file;
pub use registry::CorpusState;
pub use report::{Diagnostic, Reporter};
pub use spelling::SpellDict;

/// Knobs shared by every pass of the pipeline.
#[derive(Debug, Clone)]
pub struct LintOptions {
    /// Convert CRLF files to LF instead of preserving their terminator.
    pub strip_cr: bool,
    /// String freeze: leave translatable strings byte-identical.
    pub string_freeze: bool,
    /// Warn about tags that once defaulted to side 1 and now apply to all.
    pub missing_side: bool,
    /// Run the spell-checker over translatable strings.
    pub spellcheck: bool,
    /// Directory holding `en_US.aff`/`en_US.dic`.
    pub dict_dir: Option<PathBuf>,
    /// Insert `local spellings` exception comments above flagged lines.
    pub write_spellings: bool,
    /// Verbosity; level 0 suppresses rewrite notices.
    pub verbose: u8,
}

impl Default for LintOptions {
    fn default() -> Self {
        LintOptions {
            strip_cr: false,
            string_freeze: false,
            missing_side: true,
            spellcheck: true,
            dict_dir: None,
            write_spellings: false,
            verbose: 1,
        }
    }
}
