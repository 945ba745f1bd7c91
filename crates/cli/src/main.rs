//! typedkv CLI - inspect and edit typed key-value instances.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use typedkv_core::{Kind, Value};
use typedkv_storage::{Instance, Platform, Registry, StorageConfig};

#[derive(Parser)]
#[command(name = "typedkv")]
#[command(about = "Typed key-value storage", long_about = None)]
struct Cli {
    /// Backend variant (native or web)
    #[arg(long, global = true)]
    platform: Option<Platform>,

    /// Data directory
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Keep everything in memory
    #[arg(long, global = true)]
    ephemeral: bool,

    /// Instance to operate on
    #[arg(long, short, global = true, default_value = "default")]
    instance: String,

    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Store a value
    Set {
        /// Key
        key: String,
        /// Value (parsed as JSON when no kind is given, else taken as a string)
        value: String,
        /// Value kind (string, number, boolean, object)
        #[arg(long)]
        kind: Option<Kind>,
    },
    /// Read a value
    Get {
        /// Key
        key: String,
        /// Value kind (defaults to the stored kind, else string)
        #[arg(long)]
        kind: Option<Kind>,
    },
    /// Delete a key
    Delete {
        /// Key
        key: String,
    },
    /// Check whether a key exists
    Contains {
        /// Key
        key: String,
    },
    /// List all keys
    Keys,
    /// Remove every key in the instance
    Clear,
    /// Walk through default and named instances
    Demo,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let config = build_config(&cli)?;
    debug!("Using configuration {:?}", config);

    let registry = Registry::new(config).context("Failed to open storage")?;
    let storage = registry.instance(cli.instance.as_str())?;

    match cli.command {
        Commands::Set { key, value, kind } => {
            set_from_text(&storage, &key, &value, kind)?;
            println!("Stored {} in {}", key, storage.id());
        }
        Commands::Get { key, kind } => {
            let kind = match kind {
                Some(kind) => Some(kind),
                None => storage.kind_of(&key)?,
            };
            match storage.get(&key, kind)? {
                Some(value) => println!("{}", format_value(&value)),
                None => println!("Not found"),
            }
        }
        Commands::Delete { key } => {
            storage.delete(&key)?;
            println!("Deleted {}", key);
        }
        Commands::Contains { key } => {
            println!("{}", storage.contains(&key)?);
        }
        Commands::Keys => {
            let mut keys = storage.all_keys()?;
            keys.sort();
            println!("Keys in {} ({})", storage.id(), keys.len());
            for key in keys {
                println!("  {}", key);
            }
        }
        Commands::Clear => {
            storage.clear()?;
            println!("Cleared {}", storage.id());
        }
        Commands::Demo => run_demo(&registry)?,
    }

    Ok(())
}

/// File, then environment, then flags.
fn build_config(cli: &Cli) -> Result<StorageConfig> {
    let mut config = match &cli.config {
        Some(path) => StorageConfig::load(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?,
        None => StorageConfig::default(),
    }
    .with_env();

    if let Some(platform) = cli.platform {
        config.platform = platform;
    }
    if let Some(root) = &cli.root {
        config.root = root.clone();
    }
    if cli.ephemeral {
        config.ephemeral = true;
    }
    Ok(config)
}

fn set_from_text(storage: &Instance, key: &str, text: &str, kind: Option<Kind>) -> Result<()> {
    match kind {
        None => {
            // Bare words that are not JSON are stored as strings
            let value = serde_json::from_str(text).unwrap_or_else(|_| json!(text));
            storage.set(key, &value)?;
        }
        Some(Kind::String) => {
            storage.set_string(key, text)?;
        }
        Some(Kind::Number) => {
            let n: f64 = text.parse().with_context(|| format!("Not a number: {}", text))?;
            storage.set_number(key, n)?;
        }
        Some(Kind::Boolean) => {
            let b: bool = text.parse().with_context(|| format!("Not a boolean: {}", text))?;
            storage.set_boolean(key, b)?;
        }
        Some(Kind::Object) => {
            let value: serde_json::Value =
                serde_json::from_str(text).with_context(|| format!("Not valid JSON: {}", text))?;
            storage.set_object(key, &value)?;
        }
    }
    Ok(())
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Object(v) => serde_json::to_string_pretty(v).unwrap_or_else(|_| v.to_string()),
        other => other.to_string(),
    }
}

fn run_demo(registry: &Registry) -> Result<()> {
    info!("Running demo on {} backend", registry.platform());

    // Default instance
    let storage = registry.default_instance()?;
    storage.set_string("username", "john_doe")?;
    storage.set_number("loginCount", 42.0)?;
    storage.set_boolean("isLoggedIn", true)?;
    storage.set_object(
        "userProfile",
        &json!({
            "name": "John Doe",
            "email": "john@example.com",
            "preferences": {"theme": "dark", "notifications": true},
        }),
    )?;

    println!("Username: {:?}", storage.get_string("username")?);
    println!("Login count: {:?}", storage.get_number("loginCount")?);
    println!("Is logged in: {:?}", storage.get_boolean("isLoggedIn")?);
    println!(
        "User profile: {}",
        storage
            .get_object::<serde_json::Value>("userProfile")?
            .map(|v| v.to_string())
            .unwrap_or_else(|| "none".to_string())
    );

    storage.set("lastLogin", &json!("2026-10-19T00:00:00Z"))?;
    println!("Last login: {:?}", storage.get("lastLogin", Some(Kind::String))?);
    if storage.contains("username")? {
        println!("Username exists");
    }
    println!("All keys: {:?}", storage.all_keys()?);
    storage.delete("lastLogin")?;

    // Named instances are isolated
    let user_storage = registry.instance("userPreferences")?;
    let app_storage = registry.instance("appSettings")?;
    user_storage.set_string("theme", "dark")?;
    app_storage.set_string("theme", "light")?;
    println!("User theme: {:?}", user_storage.get_string("theme")?);
    println!("App theme: {:?}", app_storage.get_string("theme")?);

    // Invalid keys are rejected, missing keys read as absent
    if let Err(e) = storage.set_string("", "value") {
        println!("Error setting value: {}", e);
    }
    match storage.get_string("nonExistentKey")? {
        Some(value) => println!("Value exists: {}", value),
        None => println!("Key does not exist"),
    }

    Ok(())
}
