mod commands;
mod config;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

use crate::commands::{
    ProfileArgs, cmd_catalog_search, cmd_catalog_show, cmd_med_add, cmd_med_delete, cmd_med_list,
    cmd_med_show, cmd_med_update, cmd_profile_edit, cmd_profile_init, cmd_profile_show,
    cmd_remind_check, cmd_remind_watch, create_profile_interactive,
};
use crate::config::Config;
use medinote_core::MedError;
use medinote_core::service::MedinoteService;

#[derive(Parser)]
#[command(
    name = "medinote",
    version,
    about = "Track your medications and get reminded when to take them"
)]
struct Cli {
    /// Directory holding `user_info.json`, `medications.csv` and `my_medications.csv`
    /// (default: current directory)
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show or change your user profile
    Profile {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    /// Browse the medication catalog
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
    /// Manage your medication list
    Med {
        #[command(subcommand)]
        command: MedCommands,
    },
    /// Check for due reminders
    Remind {
        #[command(subcommand)]
        command: RemindCommands,
    },
}

#[derive(clap::Args)]
struct ProfileFields {
    /// Your name
    #[arg(long)]
    name: Option<String>,
    /// Age in whole years
    #[arg(long)]
    age: Option<String>,
    /// Gender: male or female
    #[arg(long)]
    gender: Option<String>,
    /// Height in cm
    #[arg(long)]
    height: Option<String>,
    /// Weight in kg
    #[arg(long)]
    weight: Option<String>,
    /// Allergies, conditions, or other notes
    #[arg(long)]
    notes: Option<String>,
}

impl From<ProfileFields> for ProfileArgs {
    fn from(f: ProfileFields) -> Self {
        ProfileArgs {
            name: f.name,
            age: f.age,
            gender: f.gender,
            height: f.height,
            weight: f.weight,
            notes: f.notes,
        }
    }
}

#[derive(Subcommand)]
enum ProfileCommands {
    /// Show your profile
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Create your profile (prompts when no fields are given)
    Init {
        #[command(flatten)]
        fields: ProfileFields,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change one or more profile fields
    Edit {
        #[command(flatten)]
        fields: ProfileFields,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum CatalogCommands {
    /// Search by product name, main ingredient, or effectiveness
    Search {
        /// Search text (case-insensitive)
        query: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show everything known about a medication
    Show {
        /// Exact product name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum MedCommands {
    /// Add a catalog medication to your list
    Add {
        /// Product name or search text
        name: String,
        /// Reminder time (24-hour HH:MM)
        #[arg(short, long)]
        time: Option<String>,
        /// Taking condition: before-meal, after-meal, empty-stomach
        #[arg(short, long)]
        condition: Option<String>,
        /// Save the reminder time but keep notifications off
        #[arg(long)]
        no_notify: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List your medications
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show one medication from your list
    Show {
        /// Product name
        name: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Change a medication's reminder or taking condition
    Update {
        /// Product name
        name: String,
        /// New reminder time (24-hour HH:MM)
        #[arg(short, long, conflicts_with = "clear_time")]
        time: Option<String>,
        /// Remove the reminder time
        #[arg(long)]
        clear_time: bool,
        /// Taking condition: before-meal, after-meal, empty-stomach
        #[arg(short, long)]
        condition: Option<String>,
        /// Turn notifications on or off
        #[arg(long, value_name = "true|false")]
        notify: Option<bool>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a medication from your list
    Delete {
        /// Product name
        name: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum RemindCommands {
    /// Print reminders due this minute
    Check {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Keep checking for reminders until interrupted
    Watch {
        /// Seconds between checks
        #[arg(short, long, default_value = "60")]
        interval: u64,
        /// Output one JSON object per reminder
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        let not_found = e
            .downcast_ref::<MedError>()
            .is_some_and(MedError::is_not_found);
        process::exit(if not_found { 2 } else { 1 });
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.data_dir)?;
    tracing::debug!(data_dir = %config.data_dir.display(), "using data directory");
    let mut svc = MedinoteService::open(&config.paths)?;

    let creating_profile = matches!(
        cli.command,
        Commands::Profile {
            command: ProfileCommands::Init { .. }
        }
    );
    if !creating_profile && !svc.has_profile() {
        let stdin = std::io::stdin();
        let profile = create_profile_interactive(&svc, &mut stdin.lock(), &mut std::io::stderr())?;
        eprintln!("Saved profile for {}\n", profile.name);
    }

    match cli.command {
        Commands::Profile { command } => match command {
            ProfileCommands::Show { json } => cmd_profile_show(&svc, json),
            ProfileCommands::Init { fields, json } => cmd_profile_init(&svc, fields.into(), json),
            ProfileCommands::Edit { fields, json } => cmd_profile_edit(&svc, fields.into(), json),
        },
        Commands::Catalog { command } => match command {
            CatalogCommands::Search { query, json } => cmd_catalog_search(&svc, &query, json),
            CatalogCommands::Show { name, json } => cmd_catalog_show(&svc, &name, json),
        },
        Commands::Med { command } => match command {
            MedCommands::Add {
                name,
                time,
                condition,
                no_notify,
                json,
            } => cmd_med_add(
                &mut svc,
                &name,
                time.as_deref(),
                condition.as_deref(),
                no_notify,
                json,
            ),
            MedCommands::List { json } => cmd_med_list(&svc, json),
            MedCommands::Show { name, json } => cmd_med_show(&svc, &name, json),
            MedCommands::Update {
                name,
                time,
                clear_time,
                condition,
                notify,
                json,
            } => cmd_med_update(
                &mut svc,
                &name,
                time.as_deref(),
                clear_time,
                condition.as_deref(),
                notify,
                json,
            ),
            MedCommands::Delete { name, yes, json } => cmd_med_delete(&mut svc, &name, yes, json),
        },
        Commands::Remind { command } => match command {
            RemindCommands::Check { json } => cmd_remind_check(&mut svc, json),
            RemindCommands::Watch { interval, json } => {
                cmd_remind_watch(&mut svc, interval, json).await
            }
        },
    }
}
