//! Inspect stackwire payloads from the command line.

use anyhow::{bail, Context};
use clap::{ArgAction, Parser, Subcommand};
use serde_json::Value as Json;
use stackwire::{CodecConfig, Decoder, Encoder, Table, Value};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about = "Encode and decode stackwire payloads", long_about = None)]
struct Cli {
    /// Maximum table nesting depth
    #[arg(long, value_name = "N", global = true)]
    max_depth: Option<usize>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode a JSON array of values and print the payload as hex
    Encode {
        /// JSON array, e.g. '[42, "hi", true, {"1": "a"}]'
        json: String,
    },
    /// Decode a hex payload and print one value per line
    Decode {
        /// Payload bytes as hex
        payload: String,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = CodecConfig {
        max_depth: cli.max_depth,
        trace: cli.verbose > 1,
        ..Default::default()
    };

    match cli.cmd {
        Commands::Encode { json } => println!("{}", encode_json(&json, config)?),
        Commands::Decode { payload } => {
            for line in decode_hex(&payload, config)? {
                println!("{line}");
            }
        }
    }

    Ok(())
}

/// Encode a JSON array of values as a hex payload.
fn encode_json(json: &str, config: CodecConfig) -> anyhow::Result<String> {
    let parsed: Json = serde_json::from_str(json).context("invalid JSON")?;
    let Json::Array(items) = parsed else {
        bail!("expected a JSON array of values");
    };
    let values: Vec<Value> = items.iter().map(json_to_value).collect();
    let bytes = Encoder::new(config).encode_values(&values)?;
    Ok(hex::encode(bytes))
}

/// Decode a hex payload into one debug-formatted line per value.
fn decode_hex(payload: &str, config: CodecConfig) -> anyhow::Result<Vec<String>> {
    let bytes = hex::decode(payload.trim()).context("invalid hex")?;
    let values = Decoder::new(config).decode_values(&bytes)?;
    Ok(values.iter().map(|value| format!("{:?}", value)).collect())
}

/// Map JSON onto wire values. Arrays become sequence tables keyed from 1,
/// objects become string-keyed tables.
fn json_to_value(json: &Json) -> Value {
    match json {
        Json::Null => Value::Nil,
        Json::Bool(b) => Value::Boolean(*b),
        Json::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
        Json::String(s) => Value::string(s),
        Json::Array(items) => Value::sequence(items.iter().map(json_to_value).collect()),
        Json::Object(fields) => {
            let mut table = Table::new();
            for (k, v) in fields {
                // String keys are always valid
                let _ = table.set(Value::string(k), json_to_value(v));
            }
            Value::table(table)
        }
    }
}
