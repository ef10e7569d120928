//! CLI-level failure modes. Everything the engine itself encounters is
//! counted, not returned — this enum only covers the two ways the process
//! can fail before a single line is processed.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum FeedHandlerError {
    #[error("usage: lob-feed-handler <filename>")]
    MissingArgument,

    #[error("unable to open {path}: {source}")]
    UnopenableFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
