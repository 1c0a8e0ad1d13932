//! addr - Scriptable client for the Addrbook address service
//!
//! Unix-style tool to list, add and remove addresses on the remote service.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use libaddrbook::list::EMPTY_PLACEHOLDER;
use libaddrbook::logging::LoggingConfig;
use libaddrbook::{
    Address, AddressField, AddressForm, AddressId, AddressStore, Config, RemoveOutcome, Result,
};

#[derive(Parser, Debug)]
#[command(name = "addr")]
#[command(version)]
#[command(about = "List, add and remove addresses")]
#[command(long_about = "\
addr - List, add and remove addresses

DESCRIPTION:
    addr talks to the Addrbook REST service (GET/POST /addresses,
    DELETE /addresses/{id}) and prints results in a script-friendly form.

USAGE EXAMPLES:
    # List all addresses
    addr list

    # JSON output for scripting
    addr list --format json | jq '.[] | .name'

    # One JSON object per line
    addr list --format jsonl

    # Add an address (all fields are required)
    addr add --name \"John Doe\" --street \"123 Main St\" \\
             --city \"New York\" --state NY --zip 10001

    # Remove an address by id
    addr remove 7

    # Talk to another service
    addr --api-url http://addresses.internal:8080 list

CONFIGURATION:
    Configuration file: ~/.config/addrbook/config.toml

    Override with environment variables:
        ADDRBOOK_CONFIG      - Path to config file
        ADDRBOOK_API_URL     - Base URL of the address service
        ADDRBOOK_LOG_FORMAT  - Log format (text, json, pretty)
        ADDRBOOK_LOG_LEVEL   - Log level (error, warn, info, debug, trace)

EXIT CODES:
    0 - Success (including empty results)
    1 - Service or configuration error
    3 - Invalid input (missing field, bad format)
")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Base URL of the address service
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Path to config file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List all addresses
    List {
        /// Output format: text, json or jsonl
        #[arg(short, long, default_value = "text")]
        #[arg(value_parser = ["text", "json", "jsonl"])]
        format: String,
    },

    /// Add an address
    Add {
        /// Full name
        #[arg(long)]
        name: String,

        /// Street address
        #[arg(long)]
        street: String,

        #[arg(long)]
        city: String,

        #[arg(long)]
        state: String,

        /// ZIP code
        #[arg(long)]
        zip: String,

        /// Output format: text, json or jsonl
        #[arg(short, long, default_value = "text")]
        #[arg(value_parser = ["text", "json", "jsonl"])]
        format: String,
    },

    /// Remove an address by id
    Remove {
        /// Address id
        id: AddressId,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    };

    let mut logging = LoggingConfig::from_section(&config.logging, cli.verbose);
    // stderr stays quiet for scripts unless asked otherwise
    if std::env::var("ADDRBOOK_LOG_LEVEL").is_err() {
        logging.level = "error".to_string();
    }
    logging.init();

    if let Err(e) = run(cli, config).await {
        eprintln!("Error: {}", e);
        std::process::exit(e.exit_code());
    }
}

/// Config file (explicit, env or default), then env, then flags
fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match cli.config {
        Some(ref path) => {
            let mut config = Config::load_from_path(path)?;
            config.apply_env();
            config
        }
        None => Config::load()?,
    };

    if let Some(ref url) = cli.api_url {
        config.api.base_url = url.clone();
    }
    config.validate()?;
    Ok(config)
}

async fn run(cli: Cli, config: Config) -> Result<()> {
    let store = AddressStore::from_config(&config.api)?;
    tracing::debug!("Using address service at {}", store.endpoint());

    match cli.command {
        Commands::List { format } => cmd_list(&store, &format).await,
        Commands::Add {
            name,
            street,
            city,
            state,
            zip,
            format,
        } => {
            let mut form = AddressForm::new();
            form.on_field_change(AddressField::Name, name);
            form.on_field_change(AddressField::Street, street);
            form.on_field_change(AddressField::City, city);
            form.on_field_change(AddressField::State, state);
            form.on_field_change(AddressField::Zip, zip);
            cmd_add(&store, &mut form, &format).await
        }
        Commands::Remove { id } => cmd_remove(&store, id).await,
    }
}

/// Print the full collection
async fn cmd_list(store: &AddressStore, format: &str) -> Result<()> {
    store.load().await?;
    let addresses = store.addresses();

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&addresses)?),
        "jsonl" => {
            for address in &addresses {
                println!("{}", serde_json::to_string(address)?);
            }
        }
        _ => {
            if addresses.is_empty() {
                println!("{}", EMPTY_PLACEHOLDER);
            }
            for address in &addresses {
                print_address(address);
            }
        }
    }

    Ok(())
}

/// Create one address and print the server's record
async fn cmd_add(store: &AddressStore, form: &mut AddressForm, format: &str) -> Result<()> {
    let address = form.submit(store).await?;

    match format {
        "json" => println!("{}", serde_json::to_string_pretty(&address)?),
        "jsonl" => println!("{}", serde_json::to_string(&address)?),
        _ => {
            println!("Added address #{}", address.id);
            print_address(&address);
        }
    }

    Ok(())
}

async fn cmd_remove(store: &AddressStore, id: AddressId) -> Result<()> {
    match store.remove(id).await? {
        RemoveOutcome::Removed => println!("Removed address #{}", id),
        RemoveOutcome::AlreadyPending => println!("Removal of address #{} already in progress", id),
    }
    Ok(())
}

/// Human-readable block: name, street, locality
fn print_address(address: &Address) {
    println!("#{} {}", address.id, address.name);
    println!("    {}", address.street);
    println!("    {}", address.locality());
}
