use clap::{Parser, Subcommand};
use remindcal_core::{CalendarError, Config};

mod commands;

/// Exit status for field validation failures. clap reserves 2 for usage errors.
const EXIT_VALIDATION: i32 = 4;
/// Exit status when the referenced event does not exist.
const EXIT_NOT_FOUND: i32 = 3;

#[derive(Parser)]
#[command(name = "remindcal", version, about = "Calendar events with reminders")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Event management
    Event {
        #[command(subcommand)]
        action: commands::event::EventAction,
    },
    /// Events on one day
    Day {
        /// Date as YYYY-MM-DD (default: today)
        date: Option<String>,
    },
    /// Month grid with the events on each day
    Month {
        /// Month as YYYY-MM (default: this month)
        month: Option<String>,
    },
    /// All events sorted by start
    Agenda {
        /// Case-insensitive filter on title and description
        #[arg(long)]
        search: Option<String>,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Deliver reminders until interrupted
    Watch(commands::watch::WatchArgs),
}

fn main() {
    let cli = Cli::parse();
    remindcal_core::logging::init(&Config::load_or_default().logging.level);

    let result = match cli.command {
        Commands::Event { action } => commands::event::run(action),
        Commands::Day { date } => commands::calendar::day(date),
        Commands::Month { month } => commands::calendar::month(month),
        Commands::Agenda { search } => commands::calendar::agenda(search),
        Commands::Config { action } => commands::config::run(action),
        Commands::Watch(args) => commands::watch::run(args),
    };

    if let Err(e) = result {
        std::process::exit(report(e.as_ref()));
    }
}

/// Print `err` to stderr and pick the exit status.
fn report(err: &(dyn std::error::Error + 'static)) -> i32 {
    match err.downcast_ref::<CalendarError>() {
        Some(CalendarError::ValidationFailed(fields)) => {
            eprintln!("error: validation failed");
            match serde_json::to_string_pretty(fields) {
                Ok(json) => eprintln!("{json}"),
                Err(_) => eprintln!("{fields}"),
            }
            EXIT_VALIDATION
        }
        Some(CalendarError::NotFound(id)) => {
            eprintln!("error: event not found: {id}");
            EXIT_NOT_FOUND
        }
        _ => {
            eprintln!("error: {err}");
            1
        }
    }
}
