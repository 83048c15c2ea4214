//! End-to-end tests for the FASTA concatenation pipeline

use std::fs;
use std::path::PathBuf;

use rstest::rstest;
use tempfile::TempDir;

use phyloprep::errors::PhyloError;
use phyloprep::fasta::FastaParser;
use phyloprep::{concatenate, ConcatJob};

fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("write input file");
    path
}

/// The output lands in a sibling subdirectory: the aggregator only scans the
/// input directory itself, and a `combined.fasta` placed there would be
/// picked up as input on a second run.
fn job(dir: &TempDir) -> ConcatJob {
    let out_dir = dir.path().join("out");
    fs::create_dir_all(&out_dir).expect("create output dir");
    ConcatJob {
        input_dir: dir.path().to_path_buf(),
        output: out_dir.join("combined.fasta"),
    }
}

#[test]
fn given_two_gene_files_when_concatenating_then_fragments_joined_per_species() {
    // Arrange
    let temp = TempDir::new().unwrap();
    write_file(&temp, "geneA.fasta", ">Sp1_x\nACGT\n>Sp2_y\nTTTT\n");
    write_file(&temp, "geneB.fasta", ">Sp1_z\nGGGG\n");
    let job = job(&temp);

    // Act
    let num_species = concatenate(&job).unwrap();

    // Assert
    assert_eq!(num_species, 2);
    let combined = fs::read_to_string(&job.output).unwrap();
    assert_eq!(combined, ">Sp1\nACGTGGGG\n>Sp2\nTTTT\n");
}

#[test]
fn given_unchanged_inputs_when_rerunning_then_output_bytes_identical() {
    // Arrange
    let temp = TempDir::new().unwrap();
    write_file(&temp, "geneA.fasta", ">Sp1_x\nACGT\n>Sp2_y\nTTTT\n");
    write_file(&temp, "geneB.fasta", ">Sp2_z\nCCCC\n>Sp1_z\nGGGG\n");
    let job = job(&temp);

    // Act
    concatenate(&job).unwrap();
    let first = fs::read(&job.output).unwrap();
    concatenate(&job).unwrap();
    let second = fs::read(&job.output).unwrap();

    // Assert
    assert_eq!(first, second);
}

#[test]
fn given_files_when_concatenating_then_processed_in_lexicographic_order() {
    // Arrange
    let temp = TempDir::new().unwrap();
    // Written out of order on purpose
    write_file(&temp, "b_gene.fasta", ">Sp1_x\nBBBB\n");
    write_file(&temp, "a_gene.fasta", ">Sp1_y\nAAAA\n");
    let job = job(&temp);

    // Act
    concatenate(&job).unwrap();

    // Assert
    let combined = fs::read_to_string(&job.output).unwrap();
    assert_eq!(combined, ">Sp1\nAAAABBBB\n");
}

#[test]
fn given_repeated_key_in_one_file_when_concatenating_then_last_occurrence_kept() {
    // Arrange
    let temp = TempDir::new().unwrap();
    write_file(&temp, "gene.fasta", ">Sp1_a\nAAAA\n>Sp1_b\nCCCC\n");
    let job = job(&temp);

    // Act
    concatenate(&job).unwrap();

    // Assert
    let combined = fs::read_to_string(&job.output).unwrap();
    assert_eq!(combined, ">Sp1\nCCCC\n");
}

#[test]
fn given_non_fasta_files_when_concatenating_then_silently_skipped() {
    // Arrange
    let temp = TempDir::new().unwrap();
    write_file(&temp, "gene.fasta", ">Sp1_x\nACGT\n");
    write_file(&temp, "notes.txt", "not a fasta header\n");
    write_file(&temp, "tree.nwk", "((A,B),C);\n");
    let job = job(&temp);

    // Act
    let num_species = concatenate(&job).unwrap();

    // Assert
    assert_eq!(num_species, 1);
}

#[test]
fn given_fasta_in_subdirectory_when_concatenating_then_not_scanned() {
    // Arrange
    let temp = TempDir::new().unwrap();
    write_file(&temp, "gene.fasta", ">Sp1_x\nACGT\n");
    let job = job(&temp);
    fs::write(job.output.parent().unwrap().join("nested.fasta"), ">Sp2_y\nTTTT\n").unwrap();

    // Act
    concatenate(&job).unwrap();

    // Assert
    let combined = fs::read_to_string(&job.output).unwrap();
    assert_eq!(combined, ">Sp1\nACGT\n");
}

#[test]
fn given_directory_without_fasta_files_when_concatenating_then_empty_output() {
    // Arrange
    let temp = TempDir::new().unwrap();
    write_file(&temp, "notes.txt", "nothing here\n");
    let job = job(&temp);

    // Act
    let num_species = concatenate(&job).unwrap();

    // Assert
    assert_eq!(num_species, 0);
    assert_eq!(fs::read_to_string(&job.output).unwrap(), "");
}

#[test]
fn given_existing_output_when_concatenating_then_overwritten() {
    // Arrange
    let temp = TempDir::new().unwrap();
    write_file(&temp, "gene.fasta", ">Sp1_x\nACGT\n");
    let job = job(&temp);
    fs::write(&job.output, "stale content from a previous run\n").unwrap();

    // Act
    concatenate(&job).unwrap();

    // Assert
    assert_eq!(fs::read_to_string(&job.output).unwrap(), ">Sp1\nACGT\n");
}

#[test]
fn given_missing_directory_when_concatenating_then_directory_not_found() {
    // Arrange
    let job = ConcatJob {
        input_dir: PathBuf::from("/nonexistent/phyloprep-dataset"),
        output: PathBuf::from("combined.fasta"),
    };

    // Act
    let result = concatenate(&job);

    // Assert
    assert!(matches!(result, Err(PhyloError::DirectoryNotFound(_))));
}

#[rstest]
#[case(">Sp1\nACGT\n")]
#[case("> Sp1_x\nACGT\n")]
#[case(">_suffix\nACGT\n")]
fn given_malformed_header_when_concatenating_then_error_propagates(#[case] content: &str) {
    // Arrange
    let temp = TempDir::new().unwrap();
    write_file(&temp, "gene.fasta", content);
    let job = job(&temp);

    // Act
    let result = concatenate(&job);

    // Assert
    assert!(matches!(result, Err(PhyloError::MalformedHeader { .. })));
}

#[test]
fn given_written_output_when_reparsing_then_sequence_round_trips() {
    // Arrange
    let temp = TempDir::new().unwrap();
    write_file(&temp, "gene.fasta", ">Sp1_x\nACGTACGTACGT\n");
    let job = job(&temp);

    // Act
    concatenate(&job).unwrap();

    // Assert: output headers have no suffix, so append one before reparsing
    let combined = fs::read_to_string(&job.output).unwrap();
    let reparseable = combined.replace(">Sp1", ">Sp1_combined");
    let map = FastaParser::new()
        .parse_reader(std::io::Cursor::new(reparseable), &job.output)
        .unwrap();
    assert_eq!(map.get("Sp1"), Some("ACGTACGTACGT"));
}
