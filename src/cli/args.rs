//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueHint};

/// Phylogenetics batch utilities: per-gene FASTA concatenation and Newick tree rendering
#[derive(Parser, Debug)]
#[command(name = "phyloprep")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase logging verbosity (-d: info, -d -d: debug, -d -d -d: trace)
    #[arg(short = 'd', long = "debug", action = ArgAction::Count, global = true)]
    pub debug: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Concatenate per-gene FASTA alignments into one combined alignment
    Concat {
        /// Directory containing the per-gene FASTA files
        #[arg(value_hint = ValueHint::DirPath, default_value = "dataset")]
        dir: PathBuf,

        /// Combined alignment output file
        #[arg(short, long, default_value = "combined.fasta")]
        output: PathBuf,
    },

    /// Render a Newick tree as an SVG figure
    Tree {
        /// Newick input file
        #[arg(value_hint = ValueHint::FilePath)]
        infile: PathBuf,

        /// SVG output file
        #[arg(value_hint = ValueHint::FilePath)]
        outfile: PathBuf,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
