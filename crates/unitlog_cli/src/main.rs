//! Command-line surface over the conversion workflow.
//!
//! # Responsibility
//! - Parse arguments and environment into one workflow call per invocation.
//! - Render results as text or JSON; never hold business rules.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use log::debug;
use serde_json::json;
use std::path::PathBuf;
use std::process::ExitCode;
use unitlog_core::{
    close_db, default_log_level, init_logging, open_db, Conversion, ConversionType, ConvertRequest,
    ConverterService, SqliteStore, User,
};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "unitlog")]
#[command(about = "Personal unit converter with per-user history and favorites", long_about = None)]
#[command(version)]
struct Cli {
    /// SQLite database file
    #[arg(long, global = true, env = "UNITLOG_DB", default_value = "unit_converter.db")]
    db: PathBuf,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, global = true, env = "UNITLOG_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "UNITLOG_LOG_LEVEL")]
    log_level: Option<String>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage users
    #[command(subcommand)]
    User(UserCommand),

    /// Convert a value for a user and save it to their history
    Convert {
        user_id: Uuid,
        /// lbs_to_kg, kg_to_lbs, in_to_cm or cm_to_in
        conversion_type: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
        /// Also mark the new conversion as favorite
        #[arg(long)]
        favorite: bool,
    },

    /// Convert a value without saving it
    Preview {
        conversion_type: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Show a user's conversion history, most recent first
    History { user_id: Uuid },

    /// Delete one conversion from history
    Undo { conversion_id: Uuid },

    /// Show the most recent conversions across all users
    Recent {
        #[arg(long)]
        limit: Option<u32>,
    },

    /// Manage favorite conversions
    #[command(subcommand)]
    Favorite(FavoriteCommand),

    /// List supported conversion types
    Types,
}

#[derive(Subcommand)]
enum UserCommand {
    /// Add a new user
    Add { name: String },
    /// Remove a user and all of their conversions
    Remove { user_id: Uuid },
    /// List all users sorted by name
    List,
    /// Show one user
    Show { user_id: Uuid },
}

#[derive(Subcommand)]
enum FavoriteCommand {
    /// Mark one of the user's conversions as favorite
    Add { user_id: Uuid, conversion_id: Uuid },
    /// Remove a conversion from the user's favorites
    Remove { user_id: Uuid, conversion_id: Uuid },
    /// List a user's favorites
    List { user_id: Uuid },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    if let Some(log_dir) = cli.log_dir.as_ref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir).context("failed to initialize logging")?;
    }

    if let Commands::Types = cli.command {
        print_types(cli.json);
        return Ok(());
    }

    debug!("event=cli_command module=cli status=start db={}", cli.db.display());
    let mut conn = open_db(&cli.db)
        .with_context(|| format!("failed to open database `{}`", cli.db.display()))?;
    {
        let store = SqliteStore::try_new(&mut conn)?;
        let mut service = ConverterService::new(store);
        dispatch(&mut service, cli.command, cli.json)?;
    }
    close_db(conn)?;
    Ok(())
}

fn dispatch(
    service: &mut ConverterService<SqliteStore<'_>>,
    command: Commands,
    as_json: bool,
) -> Result<()> {
    match command {
        Commands::User(UserCommand::Add { name }) => {
            let user = service.create_user(&name)?;
            if as_json {
                print_json(&user)?;
            } else {
                println!("Created user: {} (ID: {})", user.name, user.id);
            }
        }
        Commands::User(UserCommand::Remove { user_id }) => {
            service.delete_user(user_id)?;
            if as_json {
                print_json(&json!({ "deleted": user_id }))?;
            } else {
                println!("User {user_id} deleted.");
            }
        }
        Commands::User(UserCommand::List) => {
            let users = service.list_users()?;
            if as_json {
                print_json(&users)?;
            } else if users.is_empty() {
                println!("No users yet.");
            } else {
                users.iter().for_each(print_user);
            }
        }
        Commands::User(UserCommand::Show { user_id }) => {
            let user = service
                .find_user(user_id)?
                .with_context(|| format!("user not found: {user_id}"))?;
            if as_json {
                print_json(&user)?;
            } else {
                print_user(&user);
            }
        }
        Commands::Convert {
            user_id,
            conversion_type,
            value,
            favorite,
        } => {
            let logged = service.convert_and_log(&ConvertRequest {
                user_id,
                conversion_type,
                value,
                favorite,
            })?;
            if as_json {
                print_json(&json!({
                    "conversion": logged.conversion,
                    "favorited": logged.favorited,
                }))?;
            } else {
                println!("Result: {}", logged.conversion);
                println!("Saved as {}", logged.conversion.id());
                if logged.favorited {
                    println!("Added to favorites.");
                }
            }
        }
        Commands::Preview {
            conversion_type,
            value,
        } => {
            let preview = service.preview(&conversion_type, &value)?;
            let (input_unit, output_unit) = preview.conversion_type.units();
            if as_json {
                print_json(&json!({
                    "conversion_type": preview.conversion_type,
                    "input_value": preview.input_value,
                    "result_value": preview.result_value,
                    "input_unit": input_unit,
                    "output_unit": output_unit,
                }))?;
            } else {
                println!(
                    "{:.2} {input_unit} = {:.2} {output_unit}",
                    preview.input_value, preview.result_value
                );
            }
        }
        Commands::History { user_id } => {
            let history = service.get_history(user_id)?;
            print_conversions(&history, as_json, "No conversions yet.")?;
        }
        Commands::Undo { conversion_id } => {
            service.undo_conversion(conversion_id)?;
            if as_json {
                print_json(&json!({ "deleted": conversion_id }))?;
            } else {
                println!("Conversion {conversion_id} removed.");
            }
        }
        Commands::Recent { limit } => {
            let recent = service.recent_conversions(limit)?;
            print_conversions(&recent, as_json, "No conversions yet.")?;
        }
        Commands::Favorite(FavoriteCommand::Add {
            user_id,
            conversion_id,
        }) => {
            let added = service.add_favorite(user_id, conversion_id)?;
            if as_json {
                print_json(&json!({ "changed": added }))?;
            } else if added {
                println!("Added to favorites.");
            } else {
                println!("Already a favorite.");
            }
        }
        Commands::Favorite(FavoriteCommand::Remove {
            user_id,
            conversion_id,
        }) => {
            let removed = service.remove_favorite(user_id, conversion_id)?;
            if as_json {
                print_json(&json!({ "changed": removed }))?;
            } else if removed {
                println!("Removed from favorites.");
            } else {
                println!("Not a favorite.");
            }
        }
        Commands::Favorite(FavoriteCommand::List { user_id }) => {
            let favorites = service.list_favorites(user_id)?;
            print_conversions(&favorites, as_json, "No favorites yet.")?;
        }
        Commands::Types => print_types(as_json),
    }

    Ok(())
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_user(user: &User) {
    println!("  {}: {} (since {})", user.id, user.name, format_timestamp(user.created_at));
}

fn print_conversions(conversions: &[Conversion], as_json: bool, empty_message: &str) -> Result<()> {
    if as_json {
        return print_json(&conversions);
    }
    if conversions.is_empty() {
        println!("{empty_message}");
        return Ok(());
    }
    for conversion in conversions {
        println!(
            "  {}  {}  [{}]",
            format_timestamp(conversion.created_at()),
            conversion,
            conversion.id()
        );
    }
    Ok(())
}

fn print_types(as_json: bool) {
    if as_json {
        let types: Vec<_> = ConversionType::ALL
            .iter()
            .map(|kind| json!({ "name": kind.as_str(), "label": kind.label() }))
            .collect();
        println!("{}", serde_json::Value::Array(types));
        return;
    }
    for kind in ConversionType::ALL {
        println!("  {:<10} {}", kind.as_str(), kind.label());
    }
}

fn format_timestamp(epoch_ms: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(epoch_ms)
        .map(|at| at.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| epoch_ms.to_string())
}
