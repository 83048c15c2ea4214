use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PhyloError {
    #[error("Input directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Input file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Malformed FASTA header in {path}: {line:?}")]
    MalformedHeader {
        path: PathBuf,
        line: String,
    },

    #[error("Invalid Newick at byte {position}: {reason}")]
    InvalidNewick {
        position: usize,
        reason: String,
    },

    #[error("Tree mutation failed: {0}")]
    TreeMutation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PhyloResult<T> = Result<T, PhyloError>;
