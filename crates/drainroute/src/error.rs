//! Error types for the routing pipeline.
//!
//! Every failure in the library surfaces as one [`Error`] carrying a message
//! meant for the end user; there is no local recovery anywhere. The CLI prints
//! the message through the message sink and exits nonzero.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading inputs or computing a pipe track.
#[derive(Error, Debug)]
pub enum Error {
    /// An input file could not be opened or read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A CSV field was missing or malformed.
    #[error("{file}, line {line}: invalid value in column \"{column}\": {reason}")]
    Parse {
        file: String,
        line: usize,
        column: String,
        reason: String,
    },

    /// An out-of-range value, invalid token, or inconsistent input set.
    #[error("{0}")]
    Validation(String),

    /// A corridor-graph construction rule was violated.
    #[error("{0}")]
    Geometry(String),

    /// A water-connection object could not be attached to the corridor graph.
    #[error("{0}")]
    Attachment(String),

    /// No feasible polyline connects a source to the track or the destination.
    #[error("no feasible route from source \"{source_name}\" to the track or the destination")]
    Routing { source_name: String },

    /// An output file could not be written.
    #[error("failed to write {path}: {source}")]
    Output {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Result type alias used across the crate.
pub type Result<T> = std::result::Result<T, Error>;
