use std::io::Write;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use mmesh_io::config::{self, DemoConfig};
use mmesh_io::prelude::*;
use tabwriter::TabWriter;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Launcher variables holding the MPI world size.
const PROCESS_COUNT_VARS: &[&str] = &["OMPI_COMM_WORLD_SIZE", "PMI_SIZE", "MV2_COMM_WORLD_SIZE"];

#[derive(Debug, Parser)]
#[command(name = "mmesh", version, about = "Multimesh cut-cell finite element demo")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Debug, Args)]
struct MeshArgs {
    /// TOML config file (default: ./mmesh.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Annulus mesh in DOLFIN XML (.xml or .xml.gz); generated when omitted
    #[arg(long)]
    annulus: Option<PathBuf>,
    /// Cells per side of the background unit square
    #[arg(long)]
    resolution: Option<usize>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Solve the marking demo and write one XDMF file per part.
    Run {
        #[command(flatten)]
        mesh: MeshArgs,
        /// Directory receiving u0.xdmf and u1.xdmf
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// Interface penalty
        #[arg(long)]
        penalty: Option<f64>,
        /// Linear solver: lu, bicgstab or cg
        #[arg(long)]
        solver: Option<SolverMethod>,
        /// Print solve telemetry as JSON to stdout
        #[arg(long)]
        telemetry_json: bool,
    },
    /// Print per-part cell classification and quadrature totals.
    Inspect {
        #[command(flatten)]
        mesh: MeshArgs,
    },
    /// Write the generated annulus mesh as DOLFIN XML (gzip when OUT ends in .gz).
    AnnulusMesh {
        out: PathBuf,
        #[arg(long)]
        n_radial: Option<usize>,
        #[arg(long)]
        n_angular: Option<usize>,
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Largest process count announced by a known MPI launcher; 1 when absent.
fn process_count() -> usize {
    PROCESS_COUNT_VARS
        .iter()
        .filter_map(|var| std::env::var(var).ok())
        .filter_map(|v| v.trim().parse::<usize>().ok())
        .max()
        .unwrap_or(1)
}

fn load_config(mesh: &MeshArgs) -> anyhow::Result<DemoConfig> {
    let mut cfg = config::load(mesh.config.as_deref())?;
    if let Some(path) = &mesh.annulus {
        cfg.annulus_mesh = Some(path.clone());
    }
    if let Some(n) = mesh.resolution {
        cfg.resolution = n;
    }
    Ok(cfg)
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.cmd {
        Command::Run { mesh, output_dir, penalty, solver, telemetry_json } => {
            if process_count() > 1 {
                println!("Sorry, this demo does not (yet) run in parallel.");
                process::exit(0);
            }

            let mut cfg = load_config(&mesh)?;
            if let Some(dir) = output_dir {
                cfg.output_dir = dir;
            }
            if let Some(beta) = penalty {
                cfg.penalty = beta;
            }
            if let Some(method) = solver {
                cfg.solver = method;
            }
            cfg.validate()?;
            debug!(?cfg, "resolved configuration");

            match run_marking_demo(&cfg) {
                Ok(outcome) => {
                    if telemetry_json {
                        println!("{}", serde_json::to_string_pretty(&outcome.telemetry)?);
                    } else {
                        for path in &outcome.outputs {
                            println!("wrote {}", path.display());
                        }
                    }
                }
                Err(failure) => {
                    if telemetry_json {
                        println!("{}", serde_json::to_string_pretty(&failure.telemetry)?);
                    }
                    eprintln!("{failure}");
                    process::exit(1);
                }
            }
        }
        Command::Inspect { mesh } => {
            let cfg = load_config(&mesh)?;
            cfg.validate()?;
            let marked = build_marked_multimesh(&cfg)?;

            let mut tw = TabWriter::new(std::io::stdout());
            writeln!(tw, "part\tcells\tuncut\tcut\tcovered\tmarked\tvisible_area\tinterface_length\toverlap_area")?;
            for s in marked.multimesh.summary() {
                writeln!(
                    tw,
                    "{}\t{}\t{}\t{}\t{}\t{}\t{:.6}\t{:.6}\t{:.6}",
                    s.part,
                    s.cells,
                    s.uncut,
                    s.cut,
                    s.covered,
                    s.marked,
                    s.visible_area,
                    s.interface_length,
                    s.overlap_area
                )?;
            }
            tw.flush()?;
        }
        Command::AnnulusMesh { out, n_radial, n_angular, config: config_path } => {
            let cfg = config::load(config_path.as_deref())?;
            let mesh = Mesh::annulus(
                cfg.center,
                cfg.inner_radius,
                cfg.outer_radius,
                n_radial.unwrap_or(cfg.annulus_radial),
                n_angular.unwrap_or(cfg.annulus_angular),
            )?;
            write_mesh(&mesh, &out).with_context(|| format!("writing {}", out.display()))?;
            info!(cells = mesh.num_cells(), "generated annulus mesh");
            println!("wrote {} ({} vertices, {} cells)", out.display(), mesh.num_vertices(), mesh.num_cells());
        }
    }

    Ok(())
}
