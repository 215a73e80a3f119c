//! InfoShell - demo account store
//!
//! Command-line front end standing in for the site's login, signup and
//! contact pages.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use infoshell::{
    config::{ConfigManager, StorageBackend},
    export::EXPORT_FILE_NAME,
    forms::{ContactForm, LoginForm, SignupForm},
    pages::{self, Outcome, View},
    storage::{self, snapshot},
    AuthManager, Config,
};

/// CLI arguments for InfoShell
#[derive(Parser, Debug)]
#[command(name = "infoshell")]
#[command(about = "InfoShell - demo login, signup and session store")]
#[command(version)]
#[command(long_about = "
InfoShell - demo login, signup and session store

Accounts and the current session live in a single key-value store file,
the way a browser keeps them in local storage. Passwords are stored in
plain text.

Configuration priority (highest to lowest):
1. Command-line arguments
2. Configuration file
3. Environment variables
4. Built-in defaults

Environment variables:
  INFOSHELL_STORAGE_BACKEND      - Storage backend (file, memory)
  INFOSHELL_STORAGE_PATH         - Storage file path
  INFOSHELL_STORAGE_QUOTA_BYTES  - Storage quota in bytes
  INFOSHELL_EXPORT_DIR           - Directory for user exports
  INFOSHELL_MIN_PASSWORD_LENGTH  - Minimum signup password length
  INFOSHELL_LOG_LEVEL            - Log level (trace, debug, info, warn, error)
")]
pub struct CliArgs {
    /// Configuration file path
    #[arg(
        short,
        long,
        default_value = "infoshell.toml",
        help = "Path to configuration file"
    )]
    pub config: PathBuf,

    /// Storage backend (overrides config file)
    #[arg(long, help = "Storage backend (file or memory)")]
    pub backend: Option<StorageBackend>,

    /// Storage file (overrides config file)
    #[arg(short, long, help = "Path to the storage file")]
    pub storage: Option<PathBuf>,

    /// Export directory (overrides config file)
    #[arg(long, help = "Directory user exports are written to")]
    pub export_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, help = "Log level")]
    pub log_level: Option<String>,

    /// Enable verbose logging (sets log level to debug)
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Validate configuration and exit
    #[arg(long, help = "Validate configuration and exit")]
    pub validate_config: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account
    Register {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// Defaults to the password when omitted
        #[arg(long)]
        confirm_password: Option<String>,
        #[arg(long)]
        phone: String,
        #[arg(long, help = "Agree to the Terms of Service")]
        agree_terms: bool,
    },
    /// Log in and open a session
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
    /// Close the current session
    Logout,
    /// Show the welcome line for the current session
    Whoami,
    /// Show the current user's profile
    Profile,
    /// Dump stored users and the current session
    Users,
    /// Write every account to a JSON file
    Export,
    /// Send a message through the contact form
    Contact {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        message: String,
    },
    /// Delete all stored data
    Clear {
        #[arg(long, help = "Confirm deletion of all stored data")]
        yes: bool,
    },
}

fn main() -> Result<()> {
    let args = CliArgs::parse();

    // Load configuration with priority: CLI args > config file > environment > defaults
    let mut config = if args.config.exists() {
        ConfigManager::load_from_file(&args.config)?
    } else {
        ConfigManager::load_from_env()?
    };

    init_tracing(&args, &config)?;

    info!("Starting InfoShell v{}", env!("CARGO_PKG_VERSION"));

    config.merge_with_cli_args(args.backend, args.storage.as_deref(), args.export_dir.as_deref());

    // Final validation after all overrides
    config
        .validate()
        .context("Final configuration validation failed")?;

    if args.validate_config {
        println!("Configuration is valid");
        println!("  Storage backend: {:?}", config.storage.backend);
        println!("  Storage path: {}", config.storage.path.display());
        println!("  Users key: {}", config.auth.users_key);
        println!("  Session key: {}", config.auth.current_user_key);
        println!("  Export: {}", config.export.directory.join(EXPORT_FILE_NAME).display());
        return Ok(());
    }

    let Some(command) = args.command else {
        anyhow::bail!("no command given, see --help");
    };

    let store = storage::open_store(&config.storage);
    let auth = AuthManager::new(store.clone(), &config.auth);

    run(command, &auth, &config, store.as_ref())
}

fn run(command: Command, auth: &AuthManager, config: &Config, store: &dyn infoshell::KeyValueStore) -> Result<()> {
    match command {
        Command::Register {
            first_name,
            last_name,
            email,
            password,
            confirm_password,
            phone,
            agree_terms,
        } => {
            let form = SignupForm {
                first_name,
                last_name,
                email,
                confirm_password: confirm_password.unwrap_or_else(|| password.clone()),
                password,
                phone,
                agree_terms,
            };
            report(pages::submit_signup(auth, &form, config.forms.min_password_length))
        }
        Command::Login { email, password } => {
            report(pages::submit_login(auth, &LoginForm { email, password }))
        }
        Command::Logout => report(pages::logout(auth)),
        Command::Whoami => match pages::require_auth(auth, View::Main) {
            Ok(Some(user)) => {
                println!("{}", pages::welcome(&user));
                Ok(())
            }
            Ok(None) | Err(_) => redirect_to_login(),
        },
        Command::Profile => match pages::require_auth(auth, View::Main) {
            Ok(Some(user)) => {
                println!("{}", pages::profile_summary(&user));
                Ok(())
            }
            Ok(None) | Err(_) => redirect_to_login(),
        },
        Command::Users => {
            let users = auth.list_users();
            println!("Current Users: {}", serde_json::to_string_pretty(&users)?);
            println!(
                "Current User: {}",
                serde_json::to_string_pretty(&auth.current_user())?
            );
            debug!("Raw store contents: {:?}", snapshot(store)?.keys().collect::<Vec<_>>());
            Ok(())
        }
        Command::Export => {
            let artifact = auth.export_all()?;
            let path = artifact.write_to(&config.export.directory)?;
            println!("Exported users to {} ({})", path.display(), artifact.mime_type);
            Ok(())
        }
        Command::Contact { name, email, message } => {
            if pages::require_auth(auth, View::Contact).is_err() {
                return redirect_to_login();
            }
            let mut form = ContactForm {
                name: name.unwrap_or_default(),
                email: email.unwrap_or_default(),
                message,
            };
            pages::contact_prefill(auth, &mut form);
            report(pages::submit_contact(&mut form))
        }
        Command::Clear { yes } => {
            if !yes {
                anyhow::bail!("refusing to clear all stored data without --yes");
            }
            report(pages::clear_all_data(auth))
        }
    }
}

/// Print a page outcome; a red banner becomes a non-zero exit
fn report(outcome: Outcome) -> Result<()> {
    if let Some(banner) = &outcome.banner {
        println!("{}", banner);
    }

    if let Some(view) = outcome.redirect {
        println!("-> {}", view.path());
    }

    match outcome.banner {
        Some(banner) if banner.kind == pages::BannerKind::Danger => {
            anyhow::bail!("{}", banner.message)
        }
        _ => Ok(()),
    }
}

fn redirect_to_login() -> Result<()> {
    println!("Not logged in");
    println!("-> {}", View::Login.path());
    anyhow::bail!("authentication required")
}

/// Initialize tracing/logging
fn init_tracing(args: &CliArgs, config: &Config) -> Result<()> {
    let log_level = if args.verbose {
        "debug"
    } else {
        args.log_level.as_deref().unwrap_or(&config.logging.log_level)
    };

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true)
                .with_ansi(true),
        )
        .with(env_filter)
        .init();

    Ok(())
}
