//! Command line interface

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use log::{debug, info};

use placeval::circuit::generators::random;
use placeval::circuit::stats::stats;
use placeval::evaluate::Evaluator;
use placeval::io::{read_parameter_file, write_netlist_file};
use placeval::params::Parameters;
use placeval::slicing::slice_long_wires;
use placeval::steiner::{RectilinearSteiner, SteinerBuilder};
use placeval::timing::ExternalTimer;
use placeval::{Circuit, Result};

/// Command line arguments
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Command line arguments
#[derive(Subcommand)]
pub enum Commands {
    /// Show statistics about a placed circuit
    ///
    /// Will print the number of ports, cells, pins and nets, with the net fanout distribution.
    #[clap()]
    Show(ShowArgs),

    /// Evaluate a placement
    ///
    /// Reports the maximum displacement, the density penalty, the half-perimeter and Steiner
    /// wirelengths, and the worst and total negative slacks if a timer is given.
    #[clap(alias = "eval")]
    Evaluate(EvalArgs),

    /// Write the RC netlist given to the timer
    ///
    /// Builds the Steiner trees and slices long wires, but does not run the timer.
    #[clap()]
    Netlist(NetlistArgs),
}

/// Placed circuit to work on
///
/// Circuit files are not read: a random placement is generated instead.
#[derive(Args)]
pub struct DesignArgs {
    /// Number of standard cells
    #[arg(long, default_value_t = 1000)]
    cells: usize,

    /// Random seed for the placement
    #[arg(long, default_value_t = 1)]
    seed: u64,
}

impl DesignArgs {
    fn circuit(&self) -> Circuit {
        info!(
            "Generating a random placement with {} cells (seed {})",
            self.cells, self.seed
        );
        random::placement(self.cells, self.seed)
    }
}

fn parameters(path: &Option<PathBuf>) -> Result<Parameters> {
    let params = match path {
        Some(p) => read_parameter_file(p)?,
        None => Parameters::iccad2014(),
    };
    params.check();
    debug!("{}", params);
    Ok(params)
}

/// Command arguments for circuit informations
#[derive(Args)]
pub struct ShowArgs {
    #[command(flatten)]
    design: DesignArgs,
}

impl ShowArgs {
    pub fn run(&self) -> Result<()> {
        let ckt = self.design.circuit();
        println!("Circuit stats:\n{}\n\n", stats(&ckt));
        Ok(())
    }
}

/// Command arguments for evaluation
#[derive(Args)]
pub struct EvalArgs {
    #[command(flatten)]
    design: DesignArgs,

    /// Parameter file; ICCAD 2014 settings are used by default
    #[arg(short = 'p', long)]
    parameters: Option<PathBuf>,

    /// Target utilization for the density penalty
    #[arg(short = 't', long, default_value_t = 0.8)]
    target_util: f64,

    /// Timer executable, called with the library, netlist and results files
    #[arg(long, requires = "library")]
    timer: Option<PathBuf>,

    /// Cell timing library given to the timer
    #[arg(long)]
    library: Option<PathBuf>,

    /// Directory for the files exchanged with the timer
    #[arg(long, default_value = ".")]
    work_dir: PathBuf,

    /// Directory where to write density plots
    #[arg(long)]
    plot: Option<PathBuf>,

    /// Show progress bars
    #[arg(long)]
    progress: bool,
}

impl EvalArgs {
    pub fn run(&self) -> Result<()> {
        let params = parameters(&self.parameters)?;
        let mut ckt = self.design.circuit();
        let timer = match (&self.timer, &self.library) {
            (Some(t), Some(l)) => Some(ExternalTimer::new(t, l)),
            _ => None,
        };
        let mut evaluator = Evaluator::new(params, &RectilinearSteiner)
            .with_work_dir(&self.work_dir)
            .with_progress(self.progress);
        if let Some(t) = &timer {
            evaluator = evaluator.with_engine(t);
        }
        if let Some(dir) = &self.plot {
            evaluator = evaluator.with_plots(dir);
        }
        let report = evaluator.evaluate(&mut ckt, self.target_util)?;
        println!("{}", report);
        Ok(())
    }
}

/// Command arguments for netlist generation
#[derive(Args)]
pub struct NetlistArgs {
    #[command(flatten)]
    design: DesignArgs,

    /// Output file for the netlist
    #[arg(short = 'o', long, default_value = "feed.netlist")]
    output: PathBuf,

    /// Parameter file; ICCAD 2014 settings are used by default
    #[arg(short = 'p', long)]
    parameters: Option<PathBuf>,
}

impl NetlistArgs {
    pub fn run(&self) -> Result<()> {
        let params = parameters(&self.parameters)?;
        let mut ckt = self.design.circuit();
        ckt.update_pin_locations();
        SteinerBuilder::new(&RectilinearSteiner, params.steiner_accuracy).build(&mut ckt);
        let max_segment = params.max_wire_segment * ckt.dist2microns();
        slice_long_wires(&mut ckt, max_segment)?;
        write_netlist_file(&self.output, &ckt, &params)?;
        info!("Netlist written to {}", self.output.display());
        Ok(())
    }
}
