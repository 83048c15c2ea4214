//! Directory-level FASTA aggregation.
//!
//! Collects all `*.fasta` files in a directory in lexicographic filename
//! order and accumulates sequences per species across files.

use std::io;
use std::path::{Path, PathBuf};

use itertools::Itertools;
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::errors::{PhyloError, PhyloResult};
use crate::fasta::{FastaParser, FastaWriter};

const FASTA_SUFFIX: &str = ".fasta";

/// Configuration for one concatenation run.
#[derive(Debug, Clone)]
pub struct ConcatJob {
    /// Directory containing the per-gene FASTA files
    pub input_dir: PathBuf,
    /// Combined alignment output file
    pub output: PathBuf,
}

/// Insertion-ordered species -> sequence fragments, one fragment per source
/// file in which the species appeared.
///
/// Fragments are appended in file processing order, not aligned by file
/// index: species covered by different subsets of files end up with
/// positionally concatenated sequences. This mirrors the accumulation
/// semantics of the upstream workflow.
#[derive(Debug, Default)]
pub struct SpeciesAccumulator {
    entries: Vec<(String, Vec<String>)>,
}

impl SpeciesAccumulator {
    pub fn push(&mut self, species: &str, sequence: String) {
        match self.entries.iter_mut().find(|(k, _)| k == species) {
            Some((_, fragments)) => fragments.push(sequence),
            None => self.entries.push((species.to_string(), vec![sequence])),
        }
    }

    pub fn get(&self, species: &str) -> Option<&[String]> {
        self.entries
            .iter()
            .find(|(k, _)| k == species)
            .map(|(_, f)| f.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.entries.iter().map(|(k, f)| (k.as_str(), f.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reads every FASTA file in a directory and accumulates per-species
/// sequences in deterministic order.
pub struct FastaAggregator {
    parser: FastaParser,
}

impl Default for FastaAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl FastaAggregator {
    pub fn new() -> Self {
        Self {
            parser: FastaParser::new(),
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn aggregate(&self, input_dir: &Path) -> PhyloResult<SpeciesAccumulator> {
        if !input_dir.exists() {
            return Err(PhyloError::DirectoryNotFound(input_dir.to_path_buf()));
        }
        if !input_dir.is_dir() {
            return Err(PhyloError::NotADirectory(input_dir.to_path_buf()));
        }

        let files = self.list_fasta_files(input_dir)?;
        debug!("found {} FASTA files in {:?}", files.len(), input_dir);

        let mut accumulator = SpeciesAccumulator::default();
        for path in &files {
            let sequences = self.parser.parse_file(path)?;
            for (species, sequence) in sequences.iter() {
                accumulator.push(species, sequence.to_string());
            }
        }
        Ok(accumulator)
    }

    /// Lists `*.fasta` entries directly inside `input_dir`, lexicographically
    /// sorted so repeated runs process files in the same order.
    fn list_fasta_files(&self, input_dir: &Path) -> PhyloResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(input_dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            if entry.file_name().to_string_lossy().ends_with(FASTA_SUFFIX) {
                files.push(entry.into_path());
            }
        }
        Ok(files.into_iter().sorted().collect())
    }
}

/// Runs one full concatenation job and returns the number of species written.
#[instrument(level = "debug")]
pub fn concatenate(job: &ConcatJob) -> PhyloResult<usize> {
    let aggregator = FastaAggregator::new();
    let accumulator = aggregator.aggregate(&job.input_dir)?;
    FastaWriter::write(&accumulator, &job.output)?;
    Ok(accumulator.len())
}
