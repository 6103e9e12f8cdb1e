//! End-to-end interpreter tests: compile real source, execute in the sandbox

use kata_compiler::{Compiler, SourceUnit};
use kata_vm::{ExecutionError, ResourceLimits, Sandbox, Value};
use std::time::{Duration, Instant};

const DEADLINE: Duration = Duration::from_secs(2);

fn run(source: &str, entry: &str, args: &[Value]) -> Result<String, ExecutionError> {
    let artifact = Compiler::new()
        .compile(&SourceUnit::new(entry, source))
        .expect("Failed to compile");
    Sandbox::new().execute(&artifact, entry, args, DEADLINE)
}

#[test]
fn test_hello_world() {
    let output = run(
        r#"function main() { println("Hello, World!"); }"#,
        "main",
        &[],
    )
    .unwrap();
    assert_eq!(output, "Hello, World!");
}

#[test]
fn test_trailing_newline_trimmed_once() {
    let output = run(
        r#"function main() { println("a"); println(""); }"#,
        "main",
        &[],
    )
    .unwrap();
    // Two newlines were written; exactly one is trimmed.
    assert_eq!(output, "a\n");
}

#[test]
fn test_print_without_newline() {
    let output = run(
        r#"function main() { print("a"); print("b"); }"#,
        "main",
        &[],
    )
    .unwrap();
    assert_eq!(output, "ab");
}

#[test]
fn test_arguments_become_parameters() {
    let output = run(
        r#"function add(a, b) { println(a + b); }"#,
        "add",
        &[Value::Int(12), Value::Int(30)],
    )
    .unwrap();
    assert_eq!(output, "42");
}

#[test]
fn test_while_loop_sum() {
    let output = run(
        r#"
        function main() {
            let total = 0;
            let i = 1;
            while (i <= 100) {
                total = total + i;
                i = i + 1;
            }
            println(total);
        }
        "#,
        "main",
        &[],
    )
    .unwrap();
    assert_eq!(output, "5050");
}

#[test]
fn test_recursion() {
    let output = run(
        r#"
        function fib(n) {
            if (n < 2) { return n; }
            return fib(n - 1) + fib(n - 2);
        }
        function main(n) { println(fib(n)); }
        "#,
        "main",
        &[Value::Int(15)],
    )
    .unwrap();
    assert_eq!(output, "610");
}

#[test]
fn test_string_builtins() {
    let output = run(
        r#"
        function main(name) {
            let greeting = "Hello, " + name + "!";
            println(greeting);
            println(len(greeting));
            println(str(3) + str(4));
        }
        "#,
        "main",
        &[Value::str("Kata")],
    )
    .unwrap();
    assert_eq!(output, "Hello, Kata!\n12\n34");
}

#[test]
fn test_else_if_and_logical_ops() {
    let source = r#"
        function classify(n) {
            if (n < 0) { println("negative"); }
            else if (n == 0 || n == 1) { println("small"); }
            else if (n > 1 && n < 100) { println("medium"); }
            else { println("large"); }
        }
    "#;
    assert_eq!(run(source, "classify", &[Value::Int(-5)]).unwrap(), "negative");
    assert_eq!(run(source, "classify", &[Value::Int(1)]).unwrap(), "small");
    assert_eq!(run(source, "classify", &[Value::Int(50)]).unwrap(), "medium");
    assert_eq!(run(source, "classify", &[Value::Int(1000)]).unwrap(), "large");
}

#[test]
fn test_break_and_continue() {
    let output = run(
        r#"
        function main() {
            let i = 0;
            while (true) {
                i = i + 1;
                if (i % 2 == 0) { continue; }
                if (i > 8) { break; }
                print(i);
            }
            println("");
        }
        "#,
        "main",
        &[],
    )
    .unwrap();
    assert_eq!(output, "1357");
}

#[test]
fn test_division_by_zero_is_runtime_fault() {
    let err = run(
        r#"function main() { println(1 / 0); }"#,
        "main",
        &[],
    )
    .unwrap_err();
    let ExecutionError::Runtime { message } = err else {
        panic!("Expected runtime fault, got {err:?}");
    };
    assert!(message.contains("division by zero"));
}

#[test]
fn test_type_error_is_runtime_fault() {
    let err = run(
        r#"function main() { println(1 + true); }"#,
        "main",
        &[],
    )
    .unwrap_err();
    assert!(matches!(err, ExecutionError::Runtime { .. }));
}

#[test]
fn test_non_bool_condition_is_runtime_fault() {
    let err = run(
        r#"function main() { if (1) { println("x"); } }"#,
        "main",
        &[],
    )
    .unwrap_err();
    let ExecutionError::Runtime { message } = err else {
        panic!("Expected runtime fault, got {err:?}");
    };
    assert!(message.contains("condition must be a boolean"));
}

#[test]
fn test_infinite_loop_times_out_within_margin() {
    let artifact = Compiler::new()
        .compile(&SourceUnit::new("main", "function main() { while (true) {} }"))
        .expect("Failed to compile");

    let deadline = Duration::from_millis(200);
    let started = Instant::now();
    let err = Sandbox::new()
        .execute(&artifact, "main", &[], deadline)
        .unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, ExecutionError::Timeout { .. }));
    assert!(elapsed >= deadline);
    // The poll interval bounds the overrun to a small constant margin.
    assert!(
        elapsed < deadline + Duration::from_millis(500),
        "took {elapsed:?}"
    );
}

#[test]
fn test_timeout_message_mentions_deadline() {
    let artifact = Compiler::new()
        .compile(&SourceUnit::new("main", "function main() { while (true) {} }"))
        .expect("Failed to compile");
    let err = Sandbox::new()
        .execute(&artifact, "main", &[], Duration::from_millis(100))
        .unwrap_err();
    assert!(err.to_string().contains("timed out"));
}

#[test]
fn test_runaway_recursion_hits_call_depth_limit() {
    let err = run(
        r#"
        function loop_forever(n) { return loop_forever(n + 1); }
        function main() { loop_forever(0); }
        "#,
        "main",
        &[],
    )
    .unwrap_err();
    let ExecutionError::Runtime { message } = err else {
        panic!("Expected runtime fault, got {err:?}");
    };
    assert!(message.contains("call depth"));
}

#[test]
fn test_output_limit_enforced() {
    let artifact = Compiler::new()
        .compile(&SourceUnit::new(
            "main",
            r#"function main() { while (true) { println("spam"); } }"#,
        ))
        .expect("Failed to compile");

    let sandbox = Sandbox::with_limits(ResourceLimits {
        max_output_bytes: 4096,
        ..ResourceLimits::default()
    });
    let err = sandbox
        .execute(&artifact, "main", &[], DEADLINE)
        .unwrap_err();
    let ExecutionError::Runtime { message } = err else {
        panic!("Expected runtime fault, got {err:?}");
    };
    assert!(message.contains("output limit"));
}

#[test]
fn test_missing_entry_point_is_engine_fault() {
    let err = run(r#"function main() {}"#, "start", &[]).unwrap_err();
    let ExecutionError::Engine { message } = err else {
        panic!("Expected engine fault, got {err:?}");
    };
    assert!(message.contains("start"));
}

#[test]
fn test_argument_arity_mismatch_is_runtime_fault() {
    let err = run(
        r#"function main(a, b) { println(a + b); }"#,
        "main",
        &[Value::Int(1)],
    )
    .unwrap_err();
    let ExecutionError::Runtime { message } = err else {
        panic!("Expected runtime fault, got {err:?}");
    };
    assert!(message.contains("expects 2 arguments"));
}

#[test]
fn test_artifact_reusable_across_executions() {
    let artifact = Compiler::new()
        .compile(&SourceUnit::new(
            "echo",
            r#"function echo(x) { println(x); }"#,
        ))
        .expect("Failed to compile");
    let sandbox = Sandbox::new();

    // The entry point can be invoked repeatedly without recompilation, and
    // no state leaks between executions.
    for i in 0..3i64 {
        let output = sandbox
            .execute(&artifact, "echo", &[Value::Int(i)], DEADLINE)
            .unwrap();
        assert_eq!(output, i.to_string());
    }
}

#[test]
fn test_float_and_int_formatting() {
    let output = run(
        r#"function main() { println(1 / 2); println(1.0 / 2.0); }"#,
        "main",
        &[],
    )
    .unwrap();
    // Integer division truncates; float division does not.
    assert_eq!(output, "0\n0.5");
}
