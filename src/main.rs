use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use redlink::{Client, Config, ConnectionManager, Target};

#[derive(Parser)]
#[command(name = "redlink")]
#[command(about = "Operator console for a Redis store managed through redlink")]
struct Args {
    /// Redis hostname
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Redis port
    #[arg(long, default_value_t = 6379)]
    port: u16,

    /// Database index selected after connecting
    #[arg(long, default_value_t = 0)]
    db: u32,

    /// Password; omit to disable authentication
    #[arg(long)]
    password: Option<String>,

    /// Connect and socket timeout in seconds
    #[arg(long, default_value_t = 5)]
    timeout: u64,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Read a key, or a field inside a hash
    Get { key: String, field: Option<String> },

    /// Create an entry: <key> <value>, or <key> <field> <value> for a hash
    Set {
        #[arg(num_args = 2..=3)]
        args: Vec<String>,
    },

    /// Delete a key, printing its prior value
    Del { key: String },

    /// Check whether a key exists
    Exists { key: String },

    /// Publish a message on a channel
    Publish { channel: String, message: String },

    /// Show keys and values, optionally restricted to a glob pattern
    Show {
        #[arg(default_value = "*")]
        pattern: String,
    },

    /// Show the fields and values of a hash
    Hshow { key: String },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let config = Config {
        host: args.host,
        port: args.port,
        database: args.db,
        password: args.password,
        timeout_secs: args.timeout,
    };

    let manager = Arc::new(ConnectionManager::new(config)?);
    manager.connect().context("connecting to redis")?;
    let client = Client::new(manager);

    match args.command {
        Cmd::Get { key, field } => {
            let target = match field {
                Some(field) => Target::HashField(key, field),
                None => Target::Scalar(key),
            };
            match client.read(&target) {
                Some(value) => println!("{value}"),
                None => println!("(not found)"),
            }
        }
        Cmd::Set { args } => {
            let (value, target_args) = args.split_last().expect("clap enforces arity");
            let target = Target::from_args(target_args)?;
            client.write(&target, value)?;
            println!("Entry created.");
        }
        Cmd::Del { key } => match client.delete(&key) {
            Some(prior) => println!("Deleted, prior value: {prior}"),
            None => println!("Entry did not exist."),
        },
        Cmd::Exists { key } => {
            println!("{}", if client.exists(&key) { 1 } else { 0 });
        }
        Cmd::Publish { channel, message } => {
            let count = client.publish(&channel, &message)?;
            println!("Delivered to {count} subscribers.");
        }
        Cmd::Show { pattern } => {
            let entries = client.list_all(&pattern)?;
            print_entries(&entries);
        }
        Cmd::Hshow { key } => {
            let entries = client.list_hash(&key)?;
            print_entries(&entries);
        }
    }

    Ok(())
}

fn print_entries(entries: &[(String, Option<String>)]) {
    for (key, value) in entries {
        println!("{:<50}: {:<25}", key, value.as_deref().unwrap_or(""));
    }
    println!("{} results found.", entries.len());
}
