use std::{io, path::PathBuf};

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failure of a `gencrl` or `gencsr` invocation.
///
/// No variant is retried; the first one raised aborts the command before anything is written.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Conflicting or superfluous positional arguments and flags.
    #[error("{0}")]
    Usage(String),

    /// A required positional argument or setting was not supplied.
    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    /// Reading an input file, standard input or writing the output failed.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Malformed PEM certificate, JSON request or config document.
    #[error("parse error: {0}")]
    Parse(String),

    /// The signing identity could not be resolved or its key could not be loaded.
    #[error("signer configuration: {0}")]
    SignerConfig(String),

    /// The encoder rejected the normalized request.
    #[error("encoding error: {0}")]
    Encoding(String),

    /// Signing identity is of an unexpected kind.
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn parse(ctx: &str, err: impl std::fmt::Display) -> Self {
        Error::Parse(format!("{ctx}: {err}"))
    }

    pub(crate) fn encoding(ctx: &str, err: impl std::fmt::Display) -> Self {
        Error::Encoding(format!("{ctx}: {err}"))
    }
}
