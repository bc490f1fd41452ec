pub mod commands;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "lodgr",
    about = "Lodgr inventory operator CLI",
    long_about = "Operate the room-inventory ledger: migrations, demo fixtures, availability queries, and block expiry sweeps.",
    after_help = "Examples:\n  lodgr migrate\n  lodgr seed\n  lodgr availability mandarin-oriental-kl-deluxe-king 2026-12-24 2026-12-27 --count 2\n  lodgr blocks mandarin-oriental-kl-deluxe-king\n  lodgr sweep"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Load the deterministic demo hotel dataset (idempotent)")]
    Seed,
    #[command(about = "Report derived availability for a room type over a stay range")]
    Availability {
        #[arg(help = "Room type identifier")]
        room_type_id: String,
        #[arg(help = "Check-in date (YYYY-MM-DD)")]
        check_in: NaiveDate,
        #[arg(help = "Check-out date (YYYY-MM-DD, exclusive)")]
        check_out: NaiveDate,
        #[arg(long, default_value_t = 1, help = "Requested room count")]
        count: u32,
    },
    #[command(about = "List blocks still withholding capacity for a room type")]
    Blocks {
        #[arg(help = "Room type identifier")]
        room_type_id: String,
    },
    #[command(about = "Mark past-expiry ACTIVE blocks as EXPIRED (cosmetic; reads never depend on it)")]
    Sweep,
    #[command(about = "Inspect effective configuration values")]
    Config,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Migrate => commands::migrate::run(),
        Command::Seed => commands::seed::run(),
        Command::Availability { room_type_id, check_in, check_out, count } => {
            commands::availability::run(&room_type_id, check_in, check_out, count)
        }
        Command::Blocks { room_type_id } => commands::blocks::run(&room_type_id),
        Command::Sweep => commands::sweep::run(),
        Command::Config => commands::config::run(),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
