//! End-to-end tests: build a program tree, translate it, run the unit.

mod common;

use bumpalo::Bump;
use common::{lines, output_of, run};
use pascalc::PascalError;
use pascalc::ast::{AstBuilder, BinaryOp};
use pascalc::core::{PrimitiveKind, RuntimeError};
use pascalc::runtime::{Machine, Value, load};
use pascalc::translate;
use pretty_assertions::assert_eq;

#[test]
fn test_write_expressions() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = b.program(
        "exprs",
        &[],
        &[],
        &[b.write(&[
            b.binary(b.int(2), BinaryOp::Add, b.binary(b.int(3), BinaryOp::Mul, b.int(4))),
            b.binary(b.int(17), BinaryOp::Div, b.int(5)),
            b.binary(b.int(17), BinaryOp::Mod, b.int(5)),
            b.neg(b.paren(b.binary(b.int(1), BinaryOp::Sub, b.int(8)))),
            b.binary(b.int(1), BinaryOp::Less, b.int(2)),
            b.binary(b.bool(true), BinaryOp::And, b.bool(false)),
            b.binary(b.bool(true), BinaryOp::Or, b.bool(false)),
            b.not(b.not(b.bool(true))),
            b.not(b.binary(b.int(3), BinaryOp::Equal, b.int(3))),
        ])],
    );

    assert_eq!(output_of(&program, ""), lines(&[14, 3, 2, 7, 1, 0, 1, 1, 0]));
}

#[test]
fn test_for_to_and_downto() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = b.program(
        "count",
        &[b.var_decl(&["i"], b.integer())],
        &[],
        &[
            b.for_to(b.name("i"), b.int(1), b.int(3), b.write(&[b.var("i")])),
            b.for_downto(b.name("i"), b.int(3), b.int(1), b.write(&[b.var("i")])),
            b.for_to(b.name("i"), b.int(5), b.int(1), b.write(&[b.var("i")])),
        ],
    );

    assert_eq!(output_of(&program, ""), lines(&[1, 2, 3, 3, 2, 1]));
}

#[test]
fn test_for_bound_is_reevaluated() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = b.program(
        "bound",
        &[b.var_decl(&["i", "n"], b.integer())],
        &[],
        &[
            b.assign(b.name("n"), b.int(5)),
            b.for_to(
                b.name("i"),
                b.int(1),
                b.var("n"),
                b.block(&[b.write(&[b.var("i")]), b.assign(b.name("n"), b.int(2))]),
            ),
        ],
    );

    assert_eq!(output_of(&program, ""), lines(&[1, 2]));
}

#[test]
fn test_break_exits_innermost_loop() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let inner = b.for_to(
        b.name("j"),
        b.int(1),
        b.int(3),
        b.block(&[
            b.if_(
                b.binary(b.var("j"), BinaryOp::Equal, b.int(2)),
                b.break_(),
                None,
            ),
            b.write(&[b.binary(
                b.binary(b.var("i"), BinaryOp::Mul, b.int(10)),
                BinaryOp::Add,
                b.var("j"),
            )]),
        ]),
    );
    let program = b.program(
        "nested",
        &[b.var_decl(&["i", "j"], b.integer())],
        &[],
        &[b.for_to(b.name("i"), b.int(1), b.int(3), inner)],
    );

    assert_eq!(output_of(&program, ""), lines(&[11, 21, 31]));
}

#[test]
fn test_continue_in_while() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = b.program(
        "odd",
        &[b.var_decl(&["i"], b.integer())],
        &[],
        &[
            b.assign(b.name("i"), b.int(0)),
            b.while_(
                b.binary(b.var("i"), BinaryOp::Less, b.int(5)),
                b.block(&[
                    b.assign(b.name("i"), b.binary(b.var("i"), BinaryOp::Add, b.int(1))),
                    b.if_(
                        b.binary(
                            b.binary(b.var("i"), BinaryOp::Mod, b.int(2)),
                            BinaryOp::Equal,
                            b.int(0),
                        ),
                        b.continue_(),
                        None,
                    ),
                    b.write(&[b.var("i")]),
                ]),
            ),
        ],
    );

    assert_eq!(output_of(&program, ""), lines(&[1, 3, 5]));
}

#[test]
fn test_recursive_function() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let fact = b.function(
        "fact",
        &[b.var_decl(&["n"], b.integer())],
        b.integer(),
        &[],
        &[b.if_(
            b.binary(b.var("n"), BinaryOp::LessEqual, b.int(1)),
            b.assign(b.name("fact"), b.int(1)),
            Some(b.assign(
                b.name("fact"),
                b.binary(
                    b.var("n"),
                    BinaryOp::Mul,
                    b.call("fact", &[b.binary(b.var("n"), BinaryOp::Sub, b.int(1))]),
                ),
            )),
        )],
    );
    let program = b.program(
        "recursion",
        &[],
        &[fact],
        &[b.write(&[b.call("fact", &[b.int(10)])])],
    );

    assert_eq!(output_of(&program, ""), lines(&[3628800]));
}

#[test]
fn test_implicit_return_is_zero() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let positive = b.function(
        "positive",
        &[b.var_decl(&["x"], b.integer())],
        b.integer(),
        &[],
        &[b.if_(
            b.binary(b.var("x"), BinaryOp::Greater, b.int(0)),
            b.assign(b.name("positive"), b.var("x")),
            None,
        )],
    );
    let never = b.function("never", &[], b.boolean(), &[], &[]);
    let program = b.program(
        "implicit",
        &[],
        &[positive, never],
        &[b.write(&[
            b.call("positive", &[b.int(-3)]),
            b.call("positive", &[b.int(4)]),
            b.call("never", &[]),
        ])],
    );

    assert_eq!(output_of(&program, ""), lines(&[0, 4, 0]));
}

#[test]
fn test_function_locals_and_loop() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let sum = b.function(
        "sum",
        &[b.var_decl(&["n"], b.integer())],
        b.integer(),
        &[b.var_decl(&["i", "s"], b.integer())],
        &[
            b.assign(b.name("s"), b.int(0)),
            b.for_to(
                b.name("i"),
                b.int(1),
                b.var("n"),
                b.assign(b.name("s"), b.binary(b.var("s"), BinaryOp::Add, b.var("i"))),
            ),
            b.assign(b.name("sum"), b.var("s")),
        ],
    );
    let program = b.program("sums", &[], &[sum], &[b.write(&[b.call("sum", &[b.int(100)])])]);

    assert_eq!(output_of(&program, ""), lines(&[5050]));
}

#[test]
fn test_overloads_by_parameter_type() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let by_int = b.function(
        "show",
        &[b.var_decl(&["x"], b.integer())],
        b.integer(),
        &[],
        &[b.assign(b.name("show"), b.int(1))],
    );
    let by_bool = b.function(
        "show",
        &[b.var_decl(&["x"], b.boolean())],
        b.integer(),
        &[],
        &[b.assign(b.name("show"), b.int(2))],
    );
    let program = b.program(
        "overloads",
        &[],
        &[by_int, by_bool],
        &[b.write(&[b.call("show", &[b.int(5)]), b.call("show", &[b.bool(true)])])],
    );

    assert_eq!(output_of(&program, ""), lines(&[1, 2]));
}

#[test]
fn test_read_into_array_elements() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = b.program(
        "reverse",
        &[
            b.var_decl(&["a"], b.array(PrimitiveKind::Integer, &[(1, 3)])),
            b.var_decl(&["i"], b.integer()),
        ],
        &[],
        &[
            b.for_to(b.name("i"), b.int(1), b.int(3), b.read(&[b.element("a", &[b.var("i")])])),
            b.for_downto(
                b.name("i"),
                b.int(3),
                b.int(1),
                b.write(&[b.index("a", &[b.var("i")])]),
            ),
        ],
    );

    assert_eq!(output_of(&program, "1\n2\n3\n"), lines(&[3, 2, 1]));
}

#[test]
fn test_negative_lower_bound() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = b.program(
        "squares",
        &[
            b.var_decl(&["a"], b.array(PrimitiveKind::Integer, &[(-2, 2)])),
            b.var_decl(&["i"], b.integer()),
        ],
        &[],
        &[
            b.for_to(
                b.name("i"),
                b.neg(b.int(2)),
                b.int(2),
                b.assign(
                    b.element("a", &[b.var("i")]),
                    b.binary(b.var("i"), BinaryOp::Mul, b.var("i")),
                ),
            ),
            b.write(&[
                b.index("a", &[b.neg(b.int(2))]),
                b.index("a", &[b.int(0)]),
                b.index("a", &[b.int(1)]),
            ]),
        ],
    );

    assert_eq!(output_of(&program, ""), lines(&[4, 0, 1]));
}

#[test]
fn test_array_element_as_for_counter() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = b.program(
        "cell",
        &[b.var_decl(&["c"], b.array(PrimitiveKind::Integer, &[(1, 1)]))],
        &[],
        &[b.for_downto(
            b.element("c", &[b.int(1)]),
            b.int(3),
            b.int(1),
            b.write(&[b.index("c", &[b.int(1)])]),
        )],
    );

    assert_eq!(output_of(&program, ""), lines(&[3, 2, 1]));
}

#[test]
fn test_local_arrays_are_fresh_per_call() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let body = |name: &str| {
        [
            b.assign(
                b.element("t", &[b.int(1)]),
                b.binary(b.index("t", &[b.int(1)]), BinaryOp::Add, b.var("v")),
            ),
            b.assign(b.name(name), b.index("t", &[b.int(1)])),
        ]
    };
    let fresh = b.function(
        "fresh",
        &[b.var_decl(&["v"], b.integer())],
        b.integer(),
        &[b.var_decl(&["t"], b.array(PrimitiveKind::Integer, &[(0, 2)]))],
        &body("fresh"),
    );
    let shared = b.function(
        "shared",
        &[b.var_decl(&["v"], b.integer())],
        b.integer(),
        &[],
        &body("shared"),
    );
    let program = b.program(
        "arrays",
        &[b.var_decl(&["t"], b.array(PrimitiveKind::Integer, &[(0, 2)]))],
        &[fresh, shared],
        &[b.write(&[
            b.call("fresh", &[b.int(5)]),
            b.call("fresh", &[b.int(5)]),
            b.call("shared", &[b.int(5)]),
            b.call("shared", &[b.int(5)]),
        ])],
    );

    assert_eq!(output_of(&program, ""), lines(&[5, 5, 5, 10]));
}

#[test]
fn test_bounds_fault_below_range() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = b.program(
        "oob",
        &[b.var_decl(&["a"], b.array(PrimitiveKind::Integer, &[(1, 10)]))],
        &[],
        &[b.write(&[b.index("a", &[b.int(0)])])],
    );

    match run(&program, "") {
        Err(PascalError::Runtime(RuntimeError::BoundsFault { message })) => {
            assert!(message.contains("Index out of bound in access of 'a'"), "{message}");
            assert!(message.contains("(range 1..10)"), "{message}");
        }
        other => panic!("expected a bounds fault, got {other:?}"),
    }
}

#[test]
fn test_bounds_checked_per_dimension() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = b.program(
        "grid",
        &[b.var_decl(&["m"], b.array(PrimitiveKind::Integer, &[(1, 10), (1, 5)]))],
        &[],
        &[b.assign(b.element("m", &[b.int(1), b.int(6)]), b.int(1))],
    );

    assert!(matches!(
        run(&program, ""),
        Err(PascalError::Runtime(RuntimeError::BoundsFault { .. }))
    ));
}

#[test]
fn test_row_major_layout() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = b.program(
        "layout",
        &[b.var_decl(&["m"], b.array(PrimitiveKind::Integer, &[(1, 10), (1, 5)]))],
        &[],
        &[b.assign(b.element("m", &[b.int(3), b.int(2)]), b.int(7))],
    );
    let compiled = translate(&program).unwrap();
    let unit = load(compiled.binary()).unwrap();
    assert_eq!(&unit, compiled.unit());

    let mut machine = Machine::new(&unit, &b""[..], Vec::new());
    machine.run_main().unwrap();

    let Some(Value::Array(cells)) = machine.global("m") else {
        panic!("m should be allocated by the static initializer");
    };
    let cells = cells.borrow();
    assert_eq!(cells.len(), 50);
    assert_eq!(cells[11], 7);
    assert_eq!(cells.iter().filter(|&&c| c != 0).count(), 1);
}

#[test]
fn test_division_by_zero_at_runtime() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = b.program(
        "zero",
        &[b.var_decl(&["z"], b.integer())],
        &[],
        &[b.write(&[b.binary(b.int(1), BinaryOp::Div, b.var("z"))])],
    );

    assert_eq!(
        run(&program, ""),
        Err(PascalError::Runtime(RuntimeError::DivisionByZero))
    );
}

#[test]
fn test_read_booleans_and_missing_input() {
    let arena = Bump::new();
    let b = AstBuilder::new(&arena);
    let program = b.program(
        "flags",
        &[b.var_decl(&["f", "g"], b.boolean())],
        &[],
        &[
            b.read(&[b.name("f"), b.name("g")]),
            b.write(&[b.var("f"), b.var("g"), b.binary(b.var("f"), BinaryOp::And, b.var("g"))]),
        ],
    );

    assert_eq!(output_of(&program, "True\nfalse\n"), lines(&[1, 0, 0]));
    assert_eq!(
        run(&program, "true\n"),
        Err(PascalError::Runtime(RuntimeError::EndOfInput))
    );
}
