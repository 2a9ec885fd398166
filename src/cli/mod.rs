pub mod process;
pub mod report;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use process::{kill_previous_servers, restart_server};
use report::{process_month_command, process_today_command, process_week_command, DateStyle};
use tracing::level_filters::LevelFilter;

use crate::{
    daemon::{start_daemon, storage::day_store::{DayStore, DayStoreImpl}},
    transfer,
    utils::{
        dir::create_application_default_path,
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Domainwatch", version, long_about = None)]
#[command(about = "Track active time spent on each web domain", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
}

#[derive(Subcommand, Debug)]
#[command(version, about, long_about = None)]
enum Commands {
    #[command(about = "Starts a daemon for the application")]
    Init {
        #[arg(
            long,
            help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
        )]
        dir: Option<PathBuf>,
    },
    #[command(
        about = "Run a daemon directly in current console. Used for creating a daemon internally and for debugging"
    )]
    Serve {
        #[arg(
            long,
            help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
        )]
        dir: Option<PathBuf>,
    },
    #[command(about = "Stop currently running daemon.")]
    Stop {},
    #[command(about = "Show today's per-domain activity")]
    Today {},
    #[command(about = "Show a 7-day activity summary")]
    Week {
        #[arg(
            long,
            short,
            help = "First day of the window. Examples are \"yesterday\", \"monday\", \"15/03/2025\". Defaults to the beginning of the current week"
        )]
        start: Option<String>,
        #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
        date_style: DateStyle,
    },
    #[command(about = "Show a calendar-month activity summary")]
    Month {
        #[arg(long, help = "Year of the month to show. Defaults to the current year")]
        year: Option<i32>,
        #[arg(long, help = "Month to show, 1-12. Defaults to the current month")]
        month: Option<u32>,
    },
    #[command(about = "Export all recorded data")]
    Export {
        #[arg(long, help = "Export the flattened CSV form instead of JSON")]
        csv: bool,
        #[arg(long, short, help = "Write to a file instead of stdout")]
        out: Option<PathBuf>,
    },
    #[command(about = "Import a previously exported JSON document")]
    Import {
        #[arg(help = "Path to the exported JSON document")]
        file: PathBuf,
    },
    #[command(about = "Remove every recorded day")]
    Clear {},
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    enable_logging(CLI_PREFIX, None, logging_level, args.log)?;

    match args.commands {
        Commands::Init { dir } => {
            restart_server(dir.as_deref())?;
            Ok(())
        }
        Commands::Stop {} => {
            let process_name = std::env::current_exe().expect("Can't operate without an executable");
            kill_previous_servers(&process_name);
            Ok(())
        }
        Commands::Serve { dir } => {
            let dir = dir.map_or_else(create_application_default_path, Ok)?;
            start_daemon(dir).await?;
            Ok(())
        }
        Commands::Today {} => process_today_command(&open_store()?).await,
        Commands::Week { start, date_style } => {
            process_week_command(&open_store()?, start, date_style).await
        }
        Commands::Month { year, month } => {
            process_month_command(&open_store()?, year, month).await
        }
        Commands::Export { csv, out } => {
            let store = open_store()?;
            let snapshot = store.get_all().await?;
            let content = if csv {
                transfer::export_csv(&snapshot)
            } else {
                transfer::export_json(&snapshot)?
            };
            match out {
                Some(path) => tokio::fs::write(path, content).await?,
                None => print!("{content}"),
            }
            Ok(())
        }
        Commands::Import { file } => {
            let store = open_store()?;
            let document = tokio::fs::read_to_string(file).await?;
            let summary = transfer::import_json(&store, &document).await?;
            println!(
                "Imported {} day(s), skipped {} malformed entr{}",
                summary.imported,
                summary.skipped,
                if summary.skipped == 1 { "y" } else { "ies" }
            );
            Ok(())
        }
        Commands::Clear {} => {
            transfer::clear_all(&open_store()?).await?;
            println!("All recorded data removed");
            Ok(())
        }
    }
}

fn open_store() -> Result<DayStoreImpl> {
    Ok(DayStoreImpl::new(
        create_application_default_path()?.join("records"),
    )?)
}
