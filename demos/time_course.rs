//! Time course of the A -> B -> C chain.
//!
//! This demo walks through the simulator workflow:
//! 1. Load the model document and print the load-time values
//! 2. Override a rate constant and an initial concentration, then simulate
//! 3. Reset to the loaded defaults and simulate again
//! 4. Scan the first rate constant over a few values in parallel

use reactsim::prelude::*;

fn main() -> Result<(), SimulatorError> {
    let mut sim = Simulator::new();
    sim.load_file(concat!(env!("CARGO_MANIFEST_DIR"), "/demos/chain.json"))?;

    println!("Species: {:?}", sim.species_ids()?);
    println!("Floating species: {:?}", sim.floating_species()?);
    println!("Parameters: {:?}", sim.parameters()?);

    sim.set_variable("k1", 0.7)?;
    sim.set_variable("A", 20.0)?;
    let table = sim.simulate_time_course(10.0, 10)?;
    println!("\nWith k1 = 0.7 and A = 20:\n{table}");

    sim.reset_variables()?;
    let table = sim.simulate_time_course(10.0, 10)?;
    println!("After reset:\n{table}");

    for (k1, table) in [0.1, 0.35, 1.0]
        .iter()
        .zip(sim.scan("k1", &[0.1, 0.35, 1.0], 10.0, 10)?)
    {
        let c = table.column("C").map(|c| c.values[10]).unwrap_or(f64::NAN);
        println!("k1 = {k1}: C(10) = {c:.4}");
    }

    Ok(())
}
