//! Mottooth - Main Entry Point
//!
//! Command-line companion for the Mottooth yard management backend.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info, warn};

use mottooth_lib::{
    commands::{self, BeaconChanges, Format, MotoChanges},
    config::AppConfig,
    error::{Alert, Result},
    i18n::{self, Locale},
    logging,
    models::{BeaconForm, Id, LocationForm, MotoForm, RegisterForm},
    theme::ThemeMode,
    AppState,
};

#[derive(Parser)]
#[command(name = "mottooth", author, version, about, long_about = None)]
/// Command-line arguments
struct Args {
    /// Backend base URL (overrides config file and environment)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Directory for stored session and preferences
    #[arg(long, global = true, value_name = "DIR")]
    data_dir: Option<PathBuf>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Also log to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Log in and store the session token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Clear the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Create a new user account
    Register {
        #[arg(long)]
        full_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        /// Password confirmation
        #[arg(long)]
        confirm: String,
    },
    /// Home screen: KPIs, zones and recent registrations
    Dashboard,
    /// Per-yard zone summary
    Map,
    /// Manage motorcycles
    #[command(subcommand)]
    Motos(MotoCommand),
    /// Manage beacons
    #[command(subcommand)]
    Beacons(BeaconCommand),
    /// Yard locations
    #[command(subcommand)]
    Locations(LocationCommand),
    /// Theme preference
    #[command(subcommand)]
    Theme(ThemeCommand),
    /// Interface language
    #[command(subcommand)]
    Language(LanguageCommand),
}

#[derive(Subcommand)]
enum MotoCommand {
    List {
        /// Filter by plate, model or manufacturer
        #[arg(long)]
        query: Option<String>,
    },
    Get {
        id: Id,
    },
    Create {
        #[arg(long)]
        placa: String,
        #[arg(long)]
        cliente_id: String,
        #[arg(long)]
        modelo_moto_id: String,
    },
    Update {
        id: Id,
        #[arg(long)]
        placa: Option<String>,
        #[arg(long)]
        cliente_id: Option<String>,
        #[arg(long)]
        modelo_moto_id: Option<String>,
    },
    Delete {
        id: Id,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum BeaconCommand {
    List {
        /// Filter by UUID
        #[arg(long)]
        query: Option<String>,
    },
    Get {
        id: Id,
    },
    Create {
        #[arg(long)]
        uuid: String,
        /// Battery level, 0 to 100
        #[arg(long, default_value = "")]
        bateria: String,
        #[arg(long, default_value = "")]
        moto_id: String,
        #[arg(long, default_value = "")]
        modelo_beacon_id: String,
    },
    Update {
        id: Id,
        #[arg(long)]
        uuid: Option<String>,
        #[arg(long)]
        bateria: Option<String>,
        /// Empty string unlinks the beacon
        #[arg(long)]
        moto_id: Option<String>,
        #[arg(long)]
        modelo_beacon_id: Option<String>,
    },
    Delete {
        id: Id,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum LocationCommand {
    List {
        /// Only this yard
        #[arg(long)]
        patio_id: Option<Id>,
    },
    /// Record a motorcycle position in a yard
    Create {
        #[arg(long)]
        patio_id: Id,
        #[arg(long)]
        moto_id: String,
        /// Accepts a decimal comma
        #[arg(long, allow_hyphen_values = true)]
        x: String,
        #[arg(long, allow_hyphen_values = true)]
        y: String,
    },
}

#[derive(Subcommand)]
enum ThemeCommand {
    Show,
    Set {
        #[arg(value_enum)]
        mode: ThemeArg,
    },
    /// Flip between light and dark
    Toggle,
}

#[derive(Subcommand)]
enum LanguageCommand {
    Show,
    /// pt-BR or es-ES; other tags are mapped onto the closest one
    Set { tag: String },
}

#[derive(Clone, Copy, ValueEnum)]
enum ThemeArg {
    Light,
    Dark,
    System,
}

impl From<ThemeArg> for ThemeMode {
    fn from(arg: ThemeArg) -> Self {
        match arg {
            ThemeArg::Light => ThemeMode::Light,
            ThemeArg::Dark => ThemeMode::Dark,
            ThemeArg::System => ThemeMode::System,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    let mut config = AppConfig::load().context("Failed to load configuration")?;
    if let Some(url) = args.api_url.clone() {
        config.api_base_url = url;
    }
    if let Some(dir) = args.data_dir.clone() {
        config.data_dir = dir;
    }
    config.validate().context("Invalid configuration")?;

    logging::init(&config.log_dir(), args.verbose);
    info!("Mottooth {} starting", env!("CARGO_PKG_VERSION"));

    let device_tag = i18n::device_language_tag();
    let mut state =
        AppState::init(config, device_tag.as_deref()).context("Failed to initialize application state")?;

    let format = if args.json { Format::Json } else { Format::Text };
    match run(&mut state, args.command, format).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{}", output);
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", Alert::for_error(&e, state.locale()));
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Yes/no question on stderr, answered on stdin; anything unreadable is a no
fn ask(question: &str, locale: Locale) -> bool {
    eprint!("{} {} ", question, locale.t("common.confirmHint"));
    let _ = io::stderr().flush();
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(_) => commands::is_affirmative(&answer),
        Err(e) => {
            warn!("Could not read confirmation: {}", e);
            false
        }
    }
}

async fn run(state: &mut AppState, command: Command, format: Format) -> Result<String> {
    let locale = state.locale();
    match command {
        Command::Login { username, password } => commands::login(state, &username, &password).await,
        Command::Logout => commands::logout(state),
        Command::Whoami => commands::whoami(state, format).await,
        Command::Register {
            full_name,
            email,
            username,
            password,
            confirm,
        } => {
            let form = RegisterForm {
                full_name,
                email,
                username,
                password,
                confirm,
            };
            commands::register(state, &form).await
        }
        Command::Dashboard => commands::home(state, format).await,
        Command::Map => commands::map(state, format).await,
        Command::Motos(cmd) => match cmd {
            MotoCommand::List { query } => commands::motos_list(state, query.as_deref(), format).await,
            MotoCommand::Get { id } => commands::motos_get(state, id, format).await,
            MotoCommand::Create {
                placa,
                cliente_id,
                modelo_moto_id,
            } => {
                let form = MotoForm {
                    placa,
                    cliente_id,
                    modelo_moto_id,
                };
                commands::motos_create(state, &form).await
            }
            MotoCommand::Update {
                id,
                placa,
                cliente_id,
                modelo_moto_id,
            } => {
                let changes = MotoChanges {
                    placa,
                    cliente_id,
                    modelo_moto_id,
                };
                commands::motos_update(state, id, changes).await
            }
            MotoCommand::Delete { id, yes } => {
                commands::motos_delete(state, id, |question| yes || ask(question, locale)).await
            }
        },
        Command::Beacons(cmd) => match cmd {
            BeaconCommand::List { query } => commands::beacons_list(state, query.as_deref(), format).await,
            BeaconCommand::Get { id } => commands::beacons_get(state, id, format).await,
            BeaconCommand::Create {
                uuid,
                bateria,
                moto_id,
                modelo_beacon_id,
            } => {
                let form = BeaconForm {
                    uuid,
                    bateria,
                    moto_id,
                    modelo_beacon_id,
                };
                commands::beacons_create(state, &form).await
            }
            BeaconCommand::Update {
                id,
                uuid,
                bateria,
                moto_id,
                modelo_beacon_id,
            } => {
                let changes = BeaconChanges {
                    uuid,
                    bateria,
                    moto_id,
                    modelo_beacon_id,
                };
                commands::beacons_update(state, id, changes).await
            }
            BeaconCommand::Delete { id, yes } => {
                commands::beacons_delete(state, id, |question| yes || ask(question, locale)).await
            }
        },
        Command::Locations(cmd) => match cmd {
            LocationCommand::List { patio_id } => commands::locations_list(state, patio_id, format).await,
            LocationCommand::Create { patio_id, moto_id, x, y } => {
                let form = LocationForm {
                    posicao_x: x,
                    posicao_y: y,
                    moto_id,
                    patio_id,
                };
                commands::locations_create(state, &form).await
            }
        },
        Command::Theme(cmd) => match cmd {
            ThemeCommand::Show => Ok(commands::theme_show(state)),
            ThemeCommand::Set { mode } => commands::theme_set(state, mode.into()),
            ThemeCommand::Toggle => commands::theme_toggle(state),
        },
        Command::Language(cmd) => match cmd {
            LanguageCommand::Show => Ok(commands::language_show(state)),
            LanguageCommand::Set { tag } => commands::language_set(state, &tag),
        },
    }
}
