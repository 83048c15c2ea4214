//! FASTA parsing and writing.
//!
//! Headers follow the `>{species}_{suffix}` convention used by the per-gene
//! alignment files; the species key is everything before the first underscore.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use regex::Regex;
use tracing::instrument;

use crate::aggregate::SpeciesAccumulator;
use crate::errors::{PhyloError, PhyloResult};

/// Insertion-ordered species -> sequence map for a single FASTA file.
///
/// A repeated key keeps its original position, but the later sequence
/// replaces the earlier one (last occurrence wins).
#[derive(Debug, Default)]
pub struct SequenceMap {
    entries: Vec<(String, String)>,
}

impl SequenceMap {
    pub fn insert(&mut self, key: String, seq: String) {
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, existing)) => *existing = seq,
            None => self.entries.push((key, seq)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, s)| s.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, s)| (k.as_str(), s.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parses FASTA streams into insertion-ordered species -> sequence maps.
pub struct FastaParser {
    header_regex: Regex,
}

impl Default for FastaParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FastaParser {
    pub fn new() -> Self {
        Self {
            header_regex: Regex::new(r"^>(\w+)_\w+").unwrap(),
        }
    }

    #[instrument(level = "debug", skip(self))]
    pub fn parse_file(&self, path: &Path) -> PhyloResult<SequenceMap> {
        let file = File::open(path)?;
        self.parse_reader(BufReader::new(file), path)
    }

    /// Parses one FASTA stream. `path` is only used for error reporting.
    ///
    /// Sequence lines are concatenated whitespace-trimmed until the next
    /// header or end of input. A stream without headers yields an empty map.
    pub fn parse_reader<R: BufRead>(&self, reader: R, path: &Path) -> PhyloResult<SequenceMap> {
        let mut sequences = SequenceMap::default();
        let mut current_species: Option<String> = None;
        let mut sequence = String::new();

        for line in reader.lines() {
            let line = line?;
            if line.starts_with('>') {
                match current_species.take() {
                    Some(species) => sequences.insert(species, std::mem::take(&mut sequence)),
                    // Data before the first header is discarded
                    None => sequence.clear(),
                }
                let caps = self.header_regex.captures(&line).ok_or_else(|| {
                    PhyloError::MalformedHeader {
                        path: path.to_path_buf(),
                        line: line.clone(),
                    }
                })?;
                current_species = Some(caps.get(1).unwrap().as_str().to_string());
            } else {
                sequence.push_str(line.trim());
            }
        }
        if let Some(species) = current_species {
            sequences.insert(species, sequence);
        }

        Ok(sequences)
    }
}

/// Serializes an aggregated alignment back to FASTA.
pub struct FastaWriter;

impl FastaWriter {
    /// Writes one record per species: header line, then all fragments joined
    /// with no separator on a single line. Species order follows the
    /// accumulator's insertion order. An existing file is overwritten.
    #[instrument(level = "debug", skip(accumulator))]
    pub fn write(accumulator: &SpeciesAccumulator, path: &Path) -> PhyloResult<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        for (species, fragments) in accumulator.iter() {
            writeln!(writer, ">{}", species)?;
            writeln!(writer, "{}", fragments.concat())?;
        }
        writer.flush()?;
        Ok(())
    }
}
