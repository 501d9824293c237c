mod broadcast;
mod error;
mod source;
mod stats;

use std::path::{Path, PathBuf};

use clap::Parser;

use crate::broadcast::Broadcaster;
use crate::error::Error;
use crate::source::LineSource;
use crate::stats::{AverageLettersPerWord, LineCount, MostCommonLetter, Report, WordCount};

/// Command-line invocation of filestats. The single argument is always taken as a path, even
/// when it looks like a flag.
#[derive(Parser, Debug)]
#[command(
    name = "filestats",
    about = "Line, word and letter statistics for a text file",
    disable_help_flag = true,
    disable_version_flag = true
)]
struct CmdOptions {
    /// "Text file to read"
    #[arg(allow_hyphen_values = true)]
    file: PathBuf,
}

fn usage() -> ! {
    println!("Error: Invalid arguments.");
    println!("  Usage:");
    println!("    filestats <file>");
    std::process::exit(1);
}

/// Computes every statistic over `path`. Results come back in the order the stats were
/// registered; an accumulator that failed shows up as an `Err` without hiding the others.
fn collect_stats(path: &Path) -> Result<Vec<Result<Report, Error>>, Error> {
    let lines = LineSource::open(path)?;

    let mut broadcaster = Broadcaster::new();
    broadcaster.register(LineCount::default())?;
    broadcaster.register(WordCount::default())?;
    broadcaster.register(MostCommonLetter::default())?;
    broadcaster.register(AverageLettersPerWord::default())?;

    broadcaster.run(lines)
}

fn main() {
    // Keep stderr quiet unless asked; statistics go to stdout.
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "warn");
    }
    pretty_env_logger::init();

    // exactly one argument, whatever it looks like
    if std::env::args_os().len() != 2 {
        usage();
    }
    let options = match CmdOptions::try_parse() {
        Ok(options) => options,
        Err(err) => {
            log::debug!("Bad invocation: {}", err);
            usage();
        }
    };

    let results = match collect_stats(&options.file) {
        Ok(results) => results,
        Err(err) => {
            log::error!("{}", err);
            std::process::exit(1);
        }
    };

    let mut failed = false;
    for result in results {
        match result {
            Ok(report) => println!("{}", report),
            Err(err) => {
                log::error!("{}", err);
                failed = true;
            }
        }
    }
    if failed {
        std::process::exit(1);
    }
}
