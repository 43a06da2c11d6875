use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use sessile::commands::{clear, path, sessions, show};
use sessile::validation::clap_digest_validator;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sessile")]
#[command(about = "Session caching engine for browser end-to-end tests", long_about = None)]
#[command(version)]
struct Cli {
    /// Override the persisted-store directory
    #[arg(long, global = true, value_name = "DIR")]
    store_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List saved sessions in the cross-run store
    Sessions,

    /// Show one saved session by key digest or digest prefix
    Show {
        /// Digest or digest prefix (lowercase hex; min 4 characters)
        #[arg(value_parser = clap_digest_validator)]
        digest: String,
    },

    /// Clear all saved sessions
    Clear,

    /// Print the persisted-store directory
    Path,

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Sessions => sessions::execute(cli.store_dir),
        Commands::Show { digest } => show::execute(digest, cli.store_dir),
        Commands::Clear => clear::execute(cli.store_dir),
        Commands::Path => path::execute(cli.store_dir),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            clap_complete::generate(shell, &mut cmd, "sessile", &mut std::io::stdout());
            Ok(())
        }
    }
}
