use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod build;
mod commands;
mod config;
mod logging;
mod site;

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Log per-file detail
    #[arg(long, global = true, default_value = "false")]
    debug: bool,

    /// The command to execute
    #[command(subcommand)]
    command: TachoCommand,
}

#[derive(Parser)]
struct CreateArgs {
    /// The directory to create the site in
    site: PathBuf,
}

#[derive(Parser)]
struct BuildArgs {
    /// The site root directory
    site: PathBuf,

    /// A config file, relative to the site root, merged over config.yaml
    #[arg(long = "extraconfig")]
    extra_config: Option<PathBuf>,

    /// The output directory (defaults to dist-<site name> next to the site)
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[derive(Subcommand)]
enum TachoCommand {
    /// Create a new site
    Create(CreateArgs),

    /// Build a site
    Build(BuildArgs),
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let args = Args::parse();
    logging::init_tracing(args.debug);

    match args.command {
        TachoCommand::Create(args) => {
            commands::create::run(&args).await?;
        }
        TachoCommand::Build(args) => {
            commands::build::run(&args).await?;
        }
    }

    Ok(())
}
