//! Benchmarks for translation and execution of generated programs.
//!
//! Programs are built once per size with [`AstBuilder`]; only translation
//! (and, for the `execute` group, running the unit) is measured.
//!
//! ## Profiling with Puffin
//!
//! ```bash
//! cargo bench --features profile-with-puffin
//! ```

use bumpalo::Bump;
use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use pascalc::ast::{AstBuilder, BinaryOp, FunctionDecl, Program};
use pascalc::core::PrimitiveKind;
use pascalc::runtime;
use pascalc::translate;
use std::hint::black_box;

#[cfg(feature = "profile-with-puffin")]
fn setup_profiler() {
    puffin::set_scopes_on(true);
}

#[cfg(not(feature = "profile-with-puffin"))]
fn setup_profiler() {}

#[cfg(feature = "profile-with-puffin")]
fn end_profiling_frame() {
    puffin::GlobalProfiler::lock().new_frame();
}

#[cfg(not(feature = "profile-with-puffin"))]
fn end_profiling_frame() {}

/// A function `fN(n)` summing the squares of `1..n` through a local array.
fn squares<'ast>(b: &AstBuilder<'ast>, name: &str) -> FunctionDecl<'ast> {
    b.function(
        name,
        &[b.var_decl(&["n"], b.integer())],
        b.integer(),
        &[
            b.var_decl(&["i", "s"], b.integer()),
            b.var_decl(&["t"], b.array(PrimitiveKind::Integer, &[(1, 64)])),
        ],
        &[
            b.for_to(
                b.name("i"),
                b.int(1),
                b.var("n"),
                b.assign(
                    b.element("t", &[b.var("i")]),
                    b.binary(b.var("i"), BinaryOp::Mul, b.var("i")),
                ),
            ),
            b.assign(b.name("s"), b.int(0)),
            b.while_(
                b.binary(b.var("n"), BinaryOp::Greater, b.int(0)),
                b.block(&[
                    b.assign(
                        b.name("s"),
                        b.binary(b.var("s"), BinaryOp::Add, b.index("t", &[b.var("n")])),
                    ),
                    b.assign(b.name("n"), b.binary(b.var("n"), BinaryOp::Sub, b.int(1))),
                ]),
            ),
            b.assign(b.name(name), b.var("s")),
        ],
    )
}

/// A program with `count` functions, each called once from the entry.
fn generated<'ast>(b: &AstBuilder<'ast>, count: usize) -> Program<'ast> {
    let names: Vec<String> = (0..count).map(|i| format!("f{i}")).collect();
    let functions: Vec<_> = names.iter().map(|name| squares(b, name)).collect();
    let calls: Vec<_> = names
        .iter()
        .map(|name| b.write(&[b.call(name, &[b.int(64)])]))
        .collect();
    b.program(
        "bench",
        &[b.var_decl(&["grid"], b.array(PrimitiveKind::Integer, &[(1, 32), (1, 32)]))],
        &functions,
        &calls,
    )
}

fn translate_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let mut group = c.benchmark_group("translate/functions");
    for count in [1usize, 10, 100, 1000] {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let program = generated(&b, count);

        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &program, |bench, program| {
            bench.iter(|| {
                let compiled = translate(black_box(program)).unwrap();
                end_profiling_frame();
                black_box(compiled.binary().len())
            });
        });
    }
    group.finish();
}

fn execute_benchmarks(c: &mut Criterion) {
    setup_profiler();

    let mut group = c.benchmark_group("execute/functions");
    for count in [1usize, 10, 100] {
        let arena = Bump::new();
        let b = AstBuilder::new(&arena);
        let compiled = translate(&generated(&b, count)).unwrap();
        let unit = runtime::load(compiled.binary()).unwrap();

        group.throughput(Throughput::Elements(count as u64));
        group.bench_function(BenchmarkId::from_parameter(count), |bench| {
            bench.iter(|| {
                let mut machine = runtime::Machine::new(&unit, &b""[..], Vec::new());
                machine.run_main().unwrap();
                end_profiling_frame();
                black_box(machine.into_output().len())
            });
        });
    }
    group.finish();
}

criterion_group!(benches, translate_benchmarks, execute_benchmarks);
criterion_main!(benches);
