pub mod check;
pub mod completions;
pub mod fix;

use std::collections::HashMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use flate2::write::GzEncoder;
use flate2::Compression;

use crate::discovery;
use crate::error::{Result, WmlError};
use crate::parser::translate_file;
use crate::registry::CorpusState;
use crate::report::Reporter;
use crate::rules::catalog::GLOBAL_SPELLINGS;
use crate::spelling::{self, SpellDict};
use crate::validation::consistency_check;
use crate::LintOptions;

/// wmllint - WML maintenance checker and syntax migrator
#[derive(Parser, Debug)]
#[command(name = "wmllint")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check WML files and report problems without writing
    Check(check::CheckArgs),

    /// Check WML files and rewrite migrated syntax in place
    Fix(fix::FixArgs),

    /// Generate shell completions
    Completions(completions::CompletionsArgs),
}

/// Flags shared by `check` and `fix`.
#[derive(Args, Debug)]
pub struct PipelineArgs {
    /// Files or directories to process
    #[arg(default_value = ".")]
    pub paths: Vec<PathBuf>,

    /// Convert CRLF line terminators to LF
    #[arg(long)]
    pub strip_cr: bool,

    /// Leave translatable strings untouched (string freeze)
    #[arg(long)]
    pub string_freeze: bool,

    /// Warn about tags that once defaulted to side 1
    #[arg(long)]
    pub missing_side: bool,

    /// Skip spell-checking
    #[arg(long)]
    pub no_spellcheck: bool,

    /// Directory holding en_US.aff and en_US.dic
    #[arg(long, value_name = "DIR")]
    pub dict_dir: Option<PathBuf>,

    /// JSON file of declared spelling exceptions by scope
    #[arg(long, value_name = "FILE")]
    pub spellings: Option<PathBuf>,

    /// Increase verbosity (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl PipelineArgs {
    fn options(&self, write_spellings: bool) -> LintOptions {
        LintOptions {
            strip_cr: self.strip_cr,
            string_freeze: self.string_freeze,
            missing_side: self.missing_side,
            spellcheck: !self.no_spellcheck,
            dict_dir: self.dict_dir.clone(),
            write_spellings,
            verbose: self.verbose,
        }
    }
}

/// Run the whole pipeline over every requested path.
///
/// Returns whether any requested path was missing; that is the only
/// condition that makes the process exit nonzero.
pub(crate) fn run_pipeline(
    args: &PipelineArgs,
    write: bool,
    write_spellings: bool,
) -> Result<bool> {
    let options = args.options(write_spellings);
    let mut reporter = Reporter::with_verbosity(options.verbose);
    let mut state = CorpusState::new();

    if let Some(path) = &args.spellings {
        load_spellings(path, &mut state)?;
    }

    let mut dict = if options.spellcheck {
        match SpellDict::load(options.dict_dir.as_deref()) {
            Ok(mut dict) => {
                for word in GLOBAL_SPELLINGS {
                    dict.add_session(word);
                }
                for word in state.spellings_for("GLOBAL") {
                    dict.add_session(word);
                }
                Some(dict)
            }
            Err(err) => {
                eprintln!("wmllint: spell check unavailable ({})", err);
                None
            }
        }
    } else {
        None
    };

    let mut failed_any = false;
    let mut total_findings = 0usize;
    for path in &args.paths {
        if !path.exists() {
            eprintln!("wmllint: skipping non-existent path {}", path.display());
            failed_any = true;
            continue;
        }
        for file in discovery::interesting_files(path) {
            let filename = file.to_string_lossy().into_owned();
            if options.verbose >= 2 {
                eprintln!("{}:", filename);
            }
            let mut text = match discovery::read_file_text(&file) {
                Ok(text) => text,
                Err(err) => {
                    eprintln!("wmllint: cannot read {}: {}", filename, err);
                    continue;
                }
            };
            if let Some(new_text) =
                translate_file(&filename, &text, &mut state, &options, &mut reporter)
            {
                if write {
                    write_file(&file, &new_text)?;
                }
                text = new_text;
            }
            if discovery::is_wml(&filename) {
                if let Some(dict) = dict.as_mut() {
                    if let Some(new_text) = spelling::spellcheck(
                        &filename,
                        &text,
                        &state,
                        dict,
                        &options,
                        &mut reporter,
                    ) {
                        if write {
                            write_file(&file, &new_text)?;
                        }
                    }
                }
            }
            total_findings += reporter.len();
            reporter.flush();
        }
    }
    consistency_check(&state, &mut reporter);
    total_findings += reporter.len();
    reporter.flush();
    if options.verbose > 0 {
        eprintln!("wmllint: {} findings", total_findings);
    }
    Ok(failed_any)
}

/// Merge a scope-to-words JSON document into the corpus exceptions.
fn load_spellings(path: &Path, state: &mut CorpusState) -> Result<()> {
    let text = fs::read_to_string(path).map_err(|e| WmlError::Io {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let declared: HashMap<String, Vec<String>> =
        serde_json::from_str(&text).map_err(|e| WmlError::Config {
            message: format!("cannot parse spellings file {}: {}", path.display(), e),
            help: Some("expected a JSON object mapping scopes to word lists".to_string()),
        })?;
    for (scope, words) in declared {
        for word in words {
            state.add_spelling(&scope, &word);
        }
    }
    Ok(())
}

/// Write a file back, re-compressing saved games stored gzipped.
fn write_file(path: &Path, text: &str) -> Result<()> {
    if path.extension().and_then(|e| e.to_str()) == Some("gz") {
        let file = fs::File::create(path)?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(text.as_bytes())?;
        encoder.finish()?;
    } else {
        fs::write(path, text)?;
    }
    Ok(())
}
