use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The input file could not be opened
    #[error("could not open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    /// Reading a line from the input failed part way through
    #[error("failed to read input: {0}")]
    Read(#[from] io::Error),
    /// The OS refused to start an accumulator thread
    #[error("could not start the {0} accumulator: {1}")]
    Spawn(&'static str, #[source] io::Error),
    #[error("no statistics registered")]
    NoStats,
    #[error("the {0} accumulator panicked")]
    StatPanicked(&'static str),
}
