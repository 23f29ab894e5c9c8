use crate::demo::{run_demo, run_export, DemoArgs, ExportArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use eventdesk::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "eventdesk",
    about = "Run and demonstrate the event registration service from the command line",
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
    /// Walk through project setup, admission states, and registrations in memory
    Demo(DemoArgs),
    /// Write a project's registrations as CSV to stdout
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
        Command::Demo(args) => run_demo(args),
        Command::Export(args) => run_export(args),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serve_is_the_default_command() {
        let cli = Cli::try_parse_from(["eventdesk"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn export_requires_data_and_project() {
        let cli = Cli::try_parse_from([
            "eventdesk",
            "export",
            "--data",
            "events.json",
            "--project",
            "p1",
        ])
        .expect("parses");
        match cli.command {
            Some(Command::Export(args)) => {
                assert_eq!(args.project, "p1");
                assert_eq!(args.data, std::path::PathBuf::from("events.json"));
            }
            other => panic!("expected export command, got {other:?}"),
        }

        assert!(Cli::try_parse_from(["eventdesk", "export", "--project", "p1"]).is_err());
    }
}
