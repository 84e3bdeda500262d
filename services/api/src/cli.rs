use crate::demo::{run_demo, run_rank, DemoArgs, RankArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use scholarship_portal::error::AppError;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "Scholarship Portal",
    about = "Run the scholarship merit-list service or rank applications from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Merit-list tooling that runs without the HTTP service
    Merit {
        #[command(subcommand)]
        command: MeritCommand,
    },
    /// Run an end-to-end demo: generate, regenerate, and edit a merit list
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum MeritCommand {
    /// Rank a CSV export of applications against a scholarship definition
    Rank(RankArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
    /// JSON file with scholarships and applications to preload
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Merit {
            command: MeritCommand::Rank(args),
        } => run_rank(args),
        Command::Demo(args) => run_demo(args),
    }
}
