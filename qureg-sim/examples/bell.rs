//! Bell pair walkthrough
//!
//! Run with `RUST_LOG=debug` to see merges and measurements logged.

use qureg_core::SimulationConfig;
use qureg_sim::QuantumComputer;
use tracing_subscriber::EnvFilter;

fn main() -> qureg_core::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut qc = QuantumComputer::with_config(SimulationConfig::deterministic(2024))?;

    // Two independent one-qubit registers, merged by the CNot
    let alice = qc.new_register(0, 1)?;
    let bob = qc.new_register(0, 1)?;
    qc.hadamard(alice.first_qubit(), &[])?;
    qc.cnot(bob.first_qubit(), alice.first_qubit())?;

    let root = qc.root_of(alice)?;
    println!("Joint state:");
    print!("{}", qc.display(root)?);

    println!("Alice alone:");
    print!("{}", qc.display(alice)?);

    let counts = qc.sample(root, 1000)?;
    println!("1000 shots: {:?}", counts.sorted_outcomes());

    let a = qc.measure(alice)?;
    let b = qc.get_value(bob)?;
    println!("Alice measured {}, Bob now holds {:?}", a, b);

    qc.delete_register(alice)?;
    println!("After deleting Alice the root has {} qubit(s)", qc.width(root)?);

    Ok(())
}
