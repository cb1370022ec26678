//! Command-line surface: load the fixed input layout, run the route
//! builder, and emit the 2D track data.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use crate::catalog::Catalog;
use crate::config::Config;
use crate::connections::WaterConnections;
use crate::decisions::DecisionOracle;
use crate::graph::CorridorGraph;
use crate::params::OptimizationParameters;
use crate::route::RouteBuilder;
use crate::sink::{ConsoleSink, MessageSink};

#[derive(Parser)]
#[command(name = "drainroute")]
#[command(author, version, about)]
#[command(long_about = "Computes a cost-greedy drainage pipe trace through a \
    rectilinear corridor plan.\n\n\
    Reads the semicolon-CSV input files from the input directory\n\
    (config.csv, externalDiameters.csv, materials.csv, corridor.csv,\n\
    connections.csv, decisions.csv) and writes pipeTrack2D.txt to the\n\
    output directory.")]
pub struct Cli {
    /// Directory holding the input CSV files
    #[arg(long, default_value = "InputData")]
    pub input_dir: PathBuf,

    /// Directory receiving the output files
    #[arg(long, default_value = "OutputData")]
    pub output_dir: PathBuf,

    /// Suppress non-essential output
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,
}

impl Cli {
    /// Run the full pipeline; print any failure through the sink and exit
    /// nonzero.
    pub fn run(self) -> ExitCode {
        let sink = ConsoleSink::new(self.quiet, !self.no_color);
        match self.execute(&sink) {
            Ok(()) => ExitCode::SUCCESS,
            Err(err) => {
                sink.error(&format!("{err:#}"));
                ExitCode::FAILURE
            }
        }
    }

    fn execute(&self, sink: &ConsoleSink) -> anyhow::Result<()> {
        let input = &self.input_dir;

        sink.info(&format!(
            "Loading decisions from {}.",
            input.join("decisions.csv").display()
        ));
        let mut oracle = DecisionOracle::load_from_file(&input.join("decisions.csv"))?;

        sink.info(&format!(
            "Loading model parameters from {}.",
            input.join("config.csv").display()
        ));
        let config = Config::load_from_file(&input.join("config.csv"))?;

        sink.info("Loading external diameters and the materials catalog.");
        let catalog = Catalog::load_from_files(
            &input.join("externalDiameters.csv"),
            &input.join("materials.csv"),
        )?;

        sink.info(&format!(
            "Loading the corridor plan from {}.",
            input.join("corridor.csv").display()
        ));
        let mut graph = CorridorGraph::load_from_file(&input.join("corridor.csv"))?;
        graph.auto_connect()?;

        sink.info(&format!(
            "Loading water connections from {}.",
            input.join("connections.csv").display()
        ));
        let connections = WaterConnections::load_from_file(&input.join("connections.csv"))?;

        let params = OptimizationParameters::default();
        let mut builder = RouteBuilder::new(
            &config,
            &connections,
            &catalog,
            graph,
            &params,
            sink,
            &mut oracle,
        );
        let track = builder.compute_track()?;

        track.print_2d(sink);

        std::fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "failed to create the output directory {}",
                self.output_dir.display()
            )
        })?;
        let output_path = self.output_dir.join("pipeTrack2D.txt");
        sink.info(&format!(
            "Writing 2D track data to {}.",
            output_path.display()
        ));
        track.write_2d(&output_path)?;

        Ok(())
    }
}
