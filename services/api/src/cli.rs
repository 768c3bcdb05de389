use crate::demo::{reset_draft, run_demo, show_draft, DemoArgs, DraftArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use listing_desk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "listing-desk",
    about = "Serve the listing desk geocoding proxy and inspect saved listing drafts",
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
    /// Inspect or discard the locally saved listing draft
    Draft {
        #[command(subcommand)]
        command: DraftCommand,
    },
    /// Walk the seven-step listing wizard end to end against an in-memory backend
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum DraftCommand {
    /// Print the saved draft and the step it will resume at
    Show(DraftArgs),
    /// Delete the saved draft
    Reset(DraftArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Draft {
            command: DraftCommand::Show(args),
        } => show_draft(args),
        Command::Draft {
            command: DraftCommand::Reset(args),
        } => reset_draft(args),
        Command::Demo(args) => run_demo(args).await,
    }
}
