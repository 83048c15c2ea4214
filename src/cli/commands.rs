//! Command dispatch: turns parsed CLI args into job configs and runs them.

use std::io;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::aggregate::{concatenate, ConcatJob};
use crate::cli::args::{Cli, Commands};
use crate::cli::output;
use crate::errors::PhyloResult;
use crate::render::{generate_tree_svg, TreeJob};

pub fn execute_command(cli: &Cli) -> PhyloResult<()> {
    match &cli.command {
        Some(Commands::Concat { dir, output }) => {
            let job = ConcatJob {
                input_dir: dir.clone(),
                output: output.clone(),
            };
            concat(&job)
        }
        Some(Commands::Tree { infile, outfile }) => {
            let job = TreeJob {
                infile: infile.clone(),
                outfile: outfile.clone(),
            };
            tree(&job)
        }
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

#[instrument]
fn concat(job: &ConcatJob) -> PhyloResult<()> {
    debug!("job: {:?}", job);
    let num_species = concatenate(job)?;
    output::success(&format!(
        "Combined sequences of {} species have been saved in '{}'.",
        num_species,
        job.output.display()
    ));
    Ok(())
}

#[instrument]
fn tree(job: &TreeJob) -> PhyloResult<()> {
    debug!("job: {:?}", job);
    let num_taxa = generate_tree_svg(job)?;
    output::success(&format!(
        "Rendered tree with {} taxa to '{}'.",
        num_taxa,
        job.outfile.display()
    ));
    Ok(())
}
