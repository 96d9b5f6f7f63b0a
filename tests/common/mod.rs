//! Shared helpers for the end-to-end tests.

#![allow(dead_code)]

use pascalc::ast::Program;
use pascalc::{CompilationError, PascalError, translate};

/// Route `tracing` output to the test writer; filter with `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Translate and run, returning the program output.
pub fn run(program: &Program<'_>, input: &str) -> Result<String, PascalError> {
    init_tracing();
    pascalc::compile_and_run(program, input)
}

/// Translate and run, panicking on any failure.
pub fn output_of(program: &Program<'_>, input: &str) -> String {
    run(program, input).unwrap_or_else(|e| panic!("program failed: {e}"))
}

/// Translate a program that must be rejected.
pub fn translation_error(program: &Program<'_>) -> CompilationError {
    init_tracing();
    match translate(program) {
        Ok(compiled) => panic!(
            "expected translation to fail, got unit:\n{}",
            compiled.unit().disassemble()
        ),
        Err(e) => e,
    }
}

/// Expected output for a sequence of written integers.
pub fn lines(values: &[i32]) -> String {
    values.iter().map(|v| format!("{v}\n")).collect()
}
