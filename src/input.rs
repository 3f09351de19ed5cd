//! Where request data comes from: named files or standard input.

use std::{
    fmt, fs,
    io::{self, Read as _},
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

/// Argument value that selects standard input instead of a file.
pub const STDIN_MARKER: &str = "-";

/// Source of raw request bytes named by a positional argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// Read everything from standard input.
    Stdin,

    /// Read the named file.
    File(PathBuf),
}

impl Source {
    /// Interprets a positional argument, `-` being standard input.
    pub fn from_arg(arg: &str) -> Self {
        if arg == STDIN_MARKER {
            Source::Stdin
        } else {
            Source::File(PathBuf::from(arg))
        }
    }

    /// Reads the whole source.
    pub fn read(&self) -> Result<Vec<u8>> {
        match self {
            Source::Stdin => {
                let mut buf = Vec::new();
                io::stdin()
                    .lock()
                    .read_to_end(&mut buf)
                    .map_err(|err| Error::io("<stdin>", err))?;
                Ok(buf)
            }
            Source::File(path) => read_file(path),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Stdin => f.write_str("<stdin>"),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Reads a named file, reporting the path on failure.
pub fn read_file(path: impl AsRef<Path>) -> Result<Vec<u8>> {
    let path = path.as_ref();
    fs::read(path).map_err(|err| Error::io(path, err))
}
