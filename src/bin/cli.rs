use std::env;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use log::info;
use memkv::engine::{FileSource, MemStore};
use memkv::template::FuncMap;
use serde_json::Value;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// JSON file of key/value pairs (falls back to MEMKV_DATA_FILE).
    #[arg(short, long)]
    data_file: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Report whether a key exists.
    Exists { key: String },
    /// Print the pair stored under a key.
    Get { key: String },
    /// Print the value stored under a key, or a default.
    Getv { key: String, default: Option<String> },
    /// Print every pair whose key matches a glob pattern.
    Gets { pattern: String },
    /// Print the sorted values of every key matching a glob pattern.
    Getvs { pattern: String },
    /// Print every pair in the store.
    Getallkvs,
    /// List the children of a path.
    Ls { path: String },
    /// List the children of a path that have nested keys.
    Lsdir { path: String },
}

impl Commands {
    fn into_call(self) -> (&'static str, Vec<Value>) {
        match self {
            Commands::Exists { key } => ("exists", vec![Value::String(key)]),
            Commands::Get { key } => ("get", vec![Value::String(key)]),
            Commands::Getv { key, default } => {
                let mut args = vec![Value::String(key)];
                args.extend(default.map(Value::String));
                ("getv", args)
            }
            Commands::Gets { pattern } => ("gets", vec![Value::String(pattern)]),
            Commands::Getvs { pattern } => ("getvs", vec![Value::String(pattern)]),
            Commands::Getallkvs => ("getallkvs", Vec::new()),
            Commands::Ls { path } => ("ls", vec![Value::String(path)]),
            Commands::Lsdir { path } => ("lsdir", vec![Value::String(path)]),
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let data_file = cli
        .data_file
        .or_else(|| env::var("MEMKV_DATA_FILE").ok())
        .unwrap_or_else(|| "data.json".to_string());

    let store = Arc::new(MemStore::new());
    let source = FileSource::new(&data_file);
    let loaded = source.sync(&*store)?;
    info!("Loaded {} pairs from {:?}", loaded, source.path());

    let funcs = FuncMap::new(store);
    let (name, args) = cli.command.into_call();
    let result = funcs.call(name, &args)?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    Ok(())
}
