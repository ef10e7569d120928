//! CLI entry point: opens the tape file, drives it line-by-line through
//! the parser and book engine, and prints periodic book snapshots plus a
//! shutdown counter summary.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;
use mimalloc::MiMalloc;

use lob_feed_handler::book_engine::BookEngine;
use lob_feed_handler::error::FeedHandlerError;
use lob_feed_handler::error_counters::ErrorCounters;
use lob_feed_handler::logger::AsyncLogger;
use lob_feed_handler::parser::parse_line;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

/// A tape of ADD/MODIFY/REMOVE/TRADE lines for one symbol.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the input tape. Omitting it is a usage error.
    filename: Option<PathBuf>,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(FeedHandlerError::MissingArgument) => {
            println!("usage: lob-feed-handler <filename>");
            ExitCode::from(255)
        }
        Err(err @ FeedHandlerError::UnopenableFile { .. }) => {
            eprintln!("{err}");
            ExitCode::from(255)
        }
    }
}

fn run() -> Result<(), FeedHandlerError> {
    let args = Args::parse();
    let path = args.filename.ok_or(FeedHandlerError::MissingArgument)?;

    let file = File::open(&path).map_err(|source| FeedHandlerError::UnopenableFile {
        path: path.clone(),
        source,
    })?;
    tracing::info!("Processing tape: {}", path.display());

    let mut engine = BookEngine::new();
    let mut counters = ErrorCounters::new();
    let mut logger = AsyncLogger::start();

    let start_time = Instant::now();
    let mut lines_seen: u64 = 0;
    for line in BufReader::new(file).lines() {
        let line = match line {
            Ok(line) => line,
            Err(_) => break,
        };
        lines_seen += 1;

        if let Some(message) = parse_line(&line, &mut counters) {
            engine.process(message, &mut counters, &logger);
        }

        // Every 10 input lines, rejected or not.
        if lines_seen % 10 == 0 {
            engine.print_book(&logger);
        }
    }

    let duration = start_time.elapsed();
    tracing::info!("Processed {} lines in {:.2?}", lines_seen, duration);

    logger.print(counters.summary());
    logger.stop();

    Ok(())
}
