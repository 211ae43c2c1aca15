//! Console command implementation.
//!
//! Reads whitespace-separated commands from stdin and dispatches them to a
//! single local partition. The console session is one subscriber identity;
//! messages published to its topics are printed as they arrive.

use super::{init_tracing, load_config};
use crate::core::config::ConfigOverrides;
use crate::partition::{
    Delivery, PartitionConfig, PartitionHandle, PartitionIndex, Reply, Request, Subscriber,
};
use anyhow::Result;
use bytes::Bytes;
use clap::Args;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Run an interactive console against one partition.
#[derive(Args, Debug)]
pub struct ConsoleArgs {
    /// Partition index to start and talk to.
    #[arg(short, long, default_value_t = 0)]
    pub partition: PartitionIndex,
}

/// Run the console command.
pub async fn run_console(
    args: ConsoleArgs,
    config_path: Option<&Path>,
    log_level: Option<String>,
) -> Result<()> {
    let overrides = ConfigOverrides {
        log_level,
        partition_count: None,
    };
    let config = load_config(config_path, &overrides)?;
    init_tracing(&config.telemetry.log_level);

    let handle = PartitionHandle::start(args.partition, &PartitionConfig::from(&config.node));
    let (subscriber, mut inbox) = Subscriber::new();
    let printer = tokio::spawn(async move {
        while let Some(delivery) = inbox.recv().await {
            println!("{}", format_delivery(&delivery));
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let Some(request) = parse_line(&line) else {
            continue;
        };
        if is_quit(&request) {
            break;
        }

        match handle.dispatch(request, &subscriber).await {
            Ok(reply) => println!("{}", format_reply(&reply)),
            Err(e) => println!("(error) {}", e),
        }
    }

    handle.stop().await;
    printer.abort();
    Ok(())
}

/// Split a console line into a request. Blank lines yield `None`.
fn parse_line(line: &str) -> Option<Request> {
    let mut words = line.split_whitespace();
    let name = words.next()?;
    let args: Vec<Bytes> = words.map(|w| Bytes::copy_from_slice(w.as_bytes())).collect();
    Some(Request::new(name, args))
}

fn is_quit(request: &Request) -> bool {
    request.args.is_empty()
        && (request.name.eq_ignore_ascii_case("QUIT") || request.name.eq_ignore_ascii_case("EXIT"))
}

fn format_reply(reply: &Reply) -> String {
    match reply {
        Reply::Ok => "OK".to_string(),
        Reply::Value(Some(value)) => format!("\"{}\"", String::from_utf8_lossy(value)),
        Reply::Value(None) => "(nil)".to_string(),
        Reply::Deleted(n) => format!("(integer) {}", n),
        Reply::Published(n) => format!("(integer) {}", n),
        Reply::Pong(index) => format!("PONG {}", index),
        Reply::NoReply => "(no reply)".to_string(),
    }
}

fn format_delivery(delivery: &Delivery) -> String {
    format!(
        "message {} \"{}\"",
        String::from_utf8_lossy(&delivery.topic),
        String::from_utf8_lossy(&delivery.message)
    )
}
