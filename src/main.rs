mod cmd;
mod core;

use clap::{Parser, Subcommand};

/// Income statement (F14018xx) to tax declaration helper
#[derive(Parser, Debug)]
#[command(name = "deklar", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List income records, optionally filtered by category
    Records(cmd::records::RecordsCommand),
    /// Totals per declaration line and category
    Summary(cmd::summary::SummaryCommand),
    /// Report advisories (period, unmapped codes); exits 1 if any
    Validate(cmd::validate::ValidateCommand),
    /// Show the tax code table of each form variant
    Codes(cmd::codes::CodesCommand),
    /// Print output schemas
    Schema(cmd::schema::SchemaCommand),
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init();

    let cli = Cli::parse();
    match cli.command {
        Command::Records(records) => records.exec(),
        Command::Summary(summary) => summary.exec(),
        Command::Validate(validate) => validate.exec(),
        Command::Codes(codes) => codes.exec(),
        Command::Schema(schema) => schema.exec(),
    }
}
