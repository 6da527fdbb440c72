//! JSON Lines replay of recorded landmark sessions.
//!
//! Each non-empty line is either a question switch made by the host or a
//! landmark frame:
//!
//! ```text
//! {"question": 2}
//! {"landmarks": [{"x": 0.41, "y": 0.52}, ...], "captured_at_ms": 1000}
//! {"ready": false}
//! ```

use crate::source::types::LandmarkFrame;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use thiserror::Error;

/// One line of a replay file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplayEntry {
    /// The host moved to another question
    Question { question: u32 },
    /// A landmark frame
    Frame(LandmarkFrame),
}

/// Errors reading a replay stream.
#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid entry on line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Open a replay file, or standard input when `path` is `-`.
pub fn open(path: &Path) -> Result<Box<dyn BufRead + Send>, ReplayError> {
    if path == Path::new("-") {
        Ok(Box::new(BufReader::new(io::stdin())))
    } else {
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }
}

/// Iterate over the entries of a replay stream.
///
/// Blank lines are skipped. A malformed line yields an error for that line
/// only; iteration continues with the next one.
pub fn read_entries<R: BufRead>(
    reader: R,
) -> impl Iterator<Item = Result<ReplayEntry, ReplayError>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(index, line)| match line {
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(
                serde_json::from_str(&line).map_err(|source| ReplayError::Parse {
                    line: index + 1,
                    source,
                }),
            ),
            Err(e) => Some(Err(ReplayError::Io(e))),
        })
}
