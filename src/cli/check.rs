//! Check command implementation.
//!
//! Runs the full pipeline and prints diagnostics without touching any file.

use clap::Args;

use super::{run_pipeline, PipelineArgs};
use crate::error::Result;

/// Check WML files and report problems without writing
#[derive(Args, Debug)]
pub struct CheckArgs {
    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

/// Returns whether any requested path was missing.
pub fn run(args: CheckArgs) -> Result<bool> {
    run_pipeline(&args.pipeline, false, false)
}
