use std::path::PathBuf;
use std::process;

use clap::Parser;
use colored::Colorize;
use reactsim::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "reactsim")]
#[command(about = "Simulate a reaction-network model and print the time course")]
#[command(version)]
struct Args {
    /// Model document (JSON)
    model: PathBuf,

    /// Simulated time span
    #[arg(long, default_value_t = 10.0)]
    duration: f64,

    /// Number of sampling intervals
    #[arg(long, default_value_t = 10)]
    points: usize,

    /// Override a species or parameter before simulating, as id=value
    #[arg(long = "set", value_parser = parse_override)]
    overrides: Vec<(String, f64)>,

    /// Restore load-time values after applying the overrides
    #[arg(long)]
    reset: bool,

    /// Buffer layout used by the integrator (column-major or row-major)
    #[arg(long, default_value = "column-major")]
    layout: Layout,
}

fn parse_override(s: &str) -> Result<(String, f64), String> {
    let (id, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected id=value, got {s}"))?;
    let value = value
        .trim()
        .parse()
        .map_err(|e| format!("invalid value for {id}: {e}"))?;
    Ok((id.trim().to_string(), value))
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reactsim=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    if let Err(e) = run(&args) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), SimulatorError> {
    let integrator = Dopri5Integrator::new().with_layout(args.layout);
    let mut sim = Simulator::with_collaborators(JsonDocumentParser, integrator);
    sim.load_file(&args.model)?;

    print_values("Floating species", &sim.floating_species()?);
    print_values("Boundary species", &sim.boundary_species()?);
    print_values("Parameters", &sim.parameters()?);

    for (id, value) in &args.overrides {
        sim.set_variable(id, *value)?;
    }
    if args.reset {
        sim.reset_variables()?;
    }

    let table = sim.simulate_time_course(args.duration, args.points)?;
    println!("{}", "Time course".green().bold());
    print!("{table}");
    Ok(())
}

fn print_values(title: &str, values: &reactsim::types::VariableMap) {
    println!("{}", title.green().bold());
    for (id, value) in values {
        println!("  {} = {}", id.cyan(), value);
    }
}
