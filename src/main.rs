use clap::Parser;
use miette::Result;
use wmllint::cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let failed_any = match cli.command {
        Commands::Check(args) => wmllint::cli::check::run(args)?,
        Commands::Fix(args) => wmllint::cli::fix::run(args)?,
        Commands::Completions(args) => {
            wmllint::cli::completions::run(args)?;
            false
        }
    };

    // Findings are advisory; only a missing input path fails the run.
    if failed_any {
        std::process::exit(1);
    }
    Ok(())
}
