use crate::commands::{run_export, run_list, ExportArgs, ListArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use techforge::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Techforge Web",
    about = "Run the Techforge marketing site and work with stored contact inquiries",
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
    /// Inspect contact inquiries in the configured store
    Inquiries {
        #[command(subcommand)]
        command: InquiriesCommand,
    },
}

#[derive(Subcommand, Debug)]
enum InquiriesCommand {
    /// Print inquiries newest first
    List(ListArgs),
    /// Write inquiries as CSV to a file or stdout
    Export(ExportArgs),
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
        Command::Inquiries {
            command: InquiriesCommand::List(args),
        } => run_list(args),
        Command::Inquiries {
            command: InquiriesCommand::Export(args),
        } => run_export(args),
    }
}
