//! parkwatch CLI Client
//!
//! Command-line interface for querying and updating the aggregator.

use std::net::{SocketAddr, UdpSocket};
use std::time::Duration;

use clap::{Parser, Subcommand};
use parkwatch::client;
use parkwatch::protocol::{MessageIdGenerator, Method, ResponseCode};
use parkwatch::{ParkError, Result};

/// parkwatch CLI
#[derive(Parser, Debug)]
#[command(name = "parkctl")]
#[command(about = "CLI for the parkwatch aggregator")]
struct Args {
    /// Aggregator address
    #[arg(short, long, default_value = "127.0.0.1:5683")]
    server: SocketAddr,

    /// How long to wait for the reply (milliseconds)
    #[arg(short, long, default_value = "2000")]
    timeout_ms: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show every slot and the number of free slots
    Status,

    /// Mark a slot occupied or free
    Set {
        /// Slot identifier, e.g. slot1
        slot: String,

        /// "occupied" or "free"
        state: String,
    },
}

fn main() {
    let args = Args::parse();

    match execute(&args) {
        Ok(code) if code.is_success() => {}
        Ok(_) => std::process::exit(2),
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    }
}

fn execute(args: &Args) -> Result<ResponseCode> {
    let (method, payload) = match &args.command {
        Commands::Status => (Method::Get, Vec::new()),
        Commands::Set { slot, state } => {
            let occupied = match state.to_ascii_lowercase().as_str() {
                "occupied" => true,
                "free" => false,
                other => {
                    return Err(ParkError::BadRequest(format!(
                        "state must be occupied or free, got {:?}",
                        other
                    )))
                }
            };
            let body = serde_json::json!({ "slot_id": slot, "occupied": occupied });
            (Method::Put, body.to_string().into_bytes())
        }
    };

    let socket = UdpSocket::bind("0.0.0.0:0")?;

    // A fresh process has no outstanding exchanges; derive the id from the
    // clock so consecutive runs do not reuse one
    let seed = (std::process::id() ^ clock_seed()) as u16;
    let message_id = MessageIdGenerator::starting_after(seed).next_id();

    let reply = client::exchange(
        &socket,
        args.server,
        method,
        "/parking",
        &payload,
        message_id,
        Duration::from_millis(args.timeout_ms),
    )?;

    let code = reply.response_code().ok_or_else(|| {
        ParkError::Decode(format!("unexpected response code 0x{:02x}", reply.code))
    })?;
    println!("{}", code);

    match serde_json::from_slice::<serde_json::Value>(&reply.payload) {
        Ok(body) => println!(
            "{}",
            serde_json::to_string_pretty(&body).map_err(|e| ParkError::Serialization(e.to_string()))?
        ),
        Err(_) if !reply.payload.is_empty() => {
            println!("{}", String::from_utf8_lossy(&reply.payload))
        }
        Err(_) => {}
    }
    Ok(code)
}

fn clock_seed() -> u32 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0)
}
