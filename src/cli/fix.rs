//! Fix command implementation.
//!
//! Same pipeline as `check`, but files whose text changed are rewritten in
//! place. Bit-identical files are never touched, so timestamps survive a
//! clean run.

use clap::Args;

use super::{run_pipeline, PipelineArgs};
use crate::error::Result;

/// Check WML files and rewrite migrated syntax in place
#[derive(Args, Debug)]
pub struct FixArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,

    /// Insert "local spellings" exception comments above flagged lines
    #[arg(long)]
    pub write_spellings: bool,
}

/// Returns whether any requested path was missing.
pub fn run(args: FixArgs) -> Result<bool> {
    run_pipeline(&args.pipeline, true, args.write_spellings)
}
