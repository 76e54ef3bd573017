//! Vermilion CLI Client
//!
//! Sends one command, or a pipeline of `;`-separated commands, and prints
//! the replies.

use clap::Parser as ClapParser;
use tracing_subscriber::{fmt, EnvFilter};
use vermilion::{Config, Connection, Parser, Replies, Reply};

/// Vermilion CLI
#[derive(ClapParser, Debug)]
#[command(name = "vermilion-cli")]
#[command(about = "Send commands to a RESP server")]
#[command(version)]
struct Args {
    /// Server address
    #[arg(short, long, default_value = "127.0.0.1:6379")]
    server: String,

    /// Read/write timeout in milliseconds (0 = none)
    #[arg(short, long, default_value = "5000")]
    timeout_ms: u64,

    /// Print bulk replies as raw bytes instead of decoding markers
    #[arg(long)]
    raw: bool,

    /// Always print replies as a list
    #[arg(short, long)]
    pipeline: bool,

    /// Command words; separate several commands with ";"
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    command: Vec<String>,
}

fn main() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,vermilion=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let config = Config::builder()
        .server_addr(&args.server)
        .read_timeout_ms(args.timeout_ms)
        .write_timeout_ms(args.timeout_ms)
        .build();

    let mut conn = match Connection::connect(&config) {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!("Failed to connect to {}: {}", args.server, e);
            std::process::exit(1);
        }
    };

    let commands = split_commands(&args.command);
    let parser = args.raw.then(Parser::raw);

    let result = conn.run(args.pipeline, |ctx| {
        ctx.with_parser(parser, |ctx| {
            for words in &commands {
                ctx.enqueue(words.iter().map(String::as_str), None)?;
            }
            Ok(())
        })
    });

    match result {
        Ok(Some(Replies::Single(reply))) => println!("{}", render(&reply, 0)),
        Ok(Some(Replies::Pipeline(replies))) => {
            for (i, reply) in replies.iter().enumerate() {
                println!("{}) {}", i + 1, render(reply, 0));
            }
        }
        Ok(None) => {}
        Err(e) => {
            eprintln!("(error) {}", e);
            std::process::exit(1);
        }
    }
}

/// Split words on standalone ";" tokens
fn split_commands(words: &[String]) -> Vec<Vec<String>> {
    words
        .split(|w| w == ";")
        .filter(|cmd| !cmd.is_empty())
        .map(|cmd| cmd.to_vec())
        .collect()
}

fn render(reply: &Reply, depth: usize) -> String {
    match reply {
        Reply::Nil => "(nil)".to_string(),
        Reply::Status(s) => s.clone(),
        Reply::Int(n) => format!("(integer) {}", n),
        Reply::Float(f) => format!("(float) {}", f),
        Reply::Bool(b) => format!("(bool) {}", b),
        Reply::Text(s) => format!("{:?}", s),
        Reply::Bytes(b) => format!("(bytes) {:?}", b),
        Reply::Thawed(d) => format!("(thawed) {:?}", d),
        Reply::Error(e) => format!("(error) {}", e),
        Reply::DecodeError(e) => format!("(decode error) {}", e),
        Reply::Suppressed => "(suppressed)".to_string(),
        Reply::Array(items) if items.is_empty() => "(empty array)".to_string(),
        Reply::Array(items) => {
            let indent = "   ".repeat(depth + 1);
            items
                .iter()
                .enumerate()
                .map(|(i, item)| format!("{}) {}", i + 1, render(item, depth + 1)))
                .collect::<Vec<_>>()
                .join(&format!("\n{}", indent))
        }
    }
}
