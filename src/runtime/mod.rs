//! Execution harness for compiled units.
//!
//! Loads a unit from its binary form and runs it on a small stack machine.
//! The translator never depends on this module; it exists so translated
//! programs can be executed and observed.

mod loader;
mod machine;
mod value;

pub use loader::load;
pub use machine::{Machine, MachineConfig};
pub use value::{ArrayRef, Value};

use std::io::{BufRead, Write};

use pascalc_core::PascalError;

/// Load a unit and run its entry routine.
pub fn run<R: BufRead, W: Write>(binary: &[u8], input: R, output: W) -> Result<(), PascalError> {
    let unit = load(binary)?;
    Machine::new(&unit, input, output).run_main()?;
    Ok(())
}

/// Run a unit against the given input and collect what it writes.
pub fn run_to_string(binary: &[u8], input: &str) -> Result<String, PascalError> {
    let mut output = Vec::new();
    run(binary, input.as_bytes(), &mut output)?;
    Ok(String::from_utf8_lossy(&output).into_owned())
}
