//! Code generation tests

use kata_bytecode::{verify_artifact, Artifact, Opcode};
use kata_compiler::{Compiler, Diagnostic, SourceUnit};

fn compile(source: &str) -> Artifact {
    Compiler::new()
        .compile(&SourceUnit::new("main", source))
        .expect("Failed to compile")
}

fn compile_err(source: &str) -> Vec<Diagnostic> {
    Compiler::new()
        .compile(&SourceUnit::new("main", source))
        .expect_err("Expected diagnostics")
}

#[test]
fn test_compile_empty_function() {
    let artifact = compile("function main() {}");
    assert_eq!(artifact.functions().len(), 1);
    let main = &artifact.functions()[0];
    assert_eq!(main.name, "main");
    assert_eq!(main.param_count, 0);

    // Implicit `return null` terminates the function
    assert!(main.code.contains(&Opcode::ConstNull.to_u8()));
    assert_eq!(*main.code.last().unwrap(), Opcode::Return.to_u8());
}

#[test]
fn test_compiled_artifact_verifies() {
    let artifact = compile(
        r#"
        function fib(n) {
            if (n < 2) { return n; }
            return fib(n - 1) + fib(n - 2);
        }
        function main() {
            let i = 0;
            while (i < 10) {
                println(fib(i));
                i = i + 1;
            }
        }
        "#,
    );
    assert!(verify_artifact(&artifact).is_ok());
    assert_eq!(artifact.functions().len(), 2);
}

#[test]
fn test_string_constants_interned() {
    let artifact = compile(r#"function main() { println("hi"); println("hi"); }"#);
    assert_eq!(artifact.constants().string_count(), 1);
    assert_eq!(artifact.constants().string(0), Some("hi"));
}

#[test]
fn test_locals_counted() {
    let artifact = compile(
        r#"
        function main(a, b) {
            let x = a;
            let y = b;
        }
        "#,
    );
    let main = &artifact.functions()[0];
    assert_eq!(main.param_count, 2);
    assert_eq!(main.local_count, 4);
}

#[test]
fn test_sibling_scopes_share_slots() {
    let artifact = compile(
        r#"
        function main() {
            { let x = 1; }
            { let y = 2; }
        }
        "#,
    );
    // Both blocks reuse the same slot, so only one is ever live.
    assert_eq!(artifact.functions()[0].local_count, 1);
}

#[test]
fn test_undefined_variable_diagnostic() {
    let diags = compile_err("function main() {\n    let x = y;\n}");
    assert_eq!(diags.len(), 1);
    assert_eq!(diags[0].line, 2);
    assert!(diags[0].message.contains("undefined variable 'y'"));
}

#[test]
fn test_undefined_function_diagnostic() {
    let diags = compile_err("function main() { missing(); }");
    assert!(diags[0].message.contains("undefined function 'missing'"));
}

#[test]
fn test_call_arity_diagnostic() {
    let diags = compile_err(
        r#"
        function add(a, b) { return a + b; }
        function main() { add(1); }
        "#,
    );
    assert_eq!(diags.len(), 1);
    assert!(diags[0].message.contains("expects 2 arguments, 1 given"));
    assert_eq!(diags[0].line, 3);
}

#[test]
fn test_builtin_arity_diagnostic() {
    let diags = compile_err("function main() { len(); }");
    assert!(diags[0].message.contains("expects 1 arguments, 0 given"));
}

#[test]
fn test_duplicate_function_diagnostic() {
    let diags = compile_err(
        r#"
        function f() {}
        function f() {}
        "#,
    );
    assert!(diags[0].message.contains("defined more than once"));
    assert_eq!(diags[0].line, 3);
}

#[test]
fn test_builtin_shadow_diagnostic() {
    let diags = compile_err("function println(x) {}");
    assert!(diags[0].message.contains("shadows a builtin"));
}

#[test]
fn test_break_outside_loop_diagnostic() {
    let diags = compile_err("function main() { break; }");
    assert!(diags[0].message.contains("'break' outside of a loop"));
}

#[test]
fn test_duplicate_variable_in_scope_diagnostic() {
    let diags = compile_err(
        r#"
        function main() {
            let x = 1;
            let x = 2;
        }
        "#,
    );
    assert!(diags[0].message.contains("already defined"));
    assert_eq!(diags[0].line, 4);
}

#[test]
fn test_shadowing_in_nested_scope_allowed() {
    let artifact = compile(
        r#"
        function main() {
            let x = 1;
            { let x = 2; println(x); }
            println(x);
        }
        "#,
    );
    assert!(verify_artifact(&artifact).is_ok());
}

#[test]
fn test_parse_errors_become_ordered_diagnostics() {
    let diags = compile_err(
        r#"
        function f() {
            let = 1;
            let y 2;
        }
        "#,
    );
    assert!(diags.len() >= 2);
    assert!(diags[0].line <= diags[1].line);
}

#[test]
fn test_missing_brace_is_a_diagnostic() {
    let diags = compile_err("function f() {\n    let x = 1;\n");
    assert!(!diags.is_empty());
    assert!(diags[0].line >= 2);
}

#[test]
fn test_deterministic_compilation() {
    let source = r#"
        function main() {
            let total = 0;
            let i = 1;
            while (i <= 100) {
                total = total + i;
                i = i + 1;
            }
            println(total);
        }
    "#;
    let a = compile(source);
    let b = compile(source);
    assert_eq!(a.fingerprint(), b.fingerprint());
    assert_eq!(a.functions()[0].code, b.functions()[0].code);
}

#[test]
fn test_short_circuit_lowering_has_jumps() {
    let artifact = compile("function f(a, b) { return a && b || true; }");
    let code = &artifact.functions()[0].code;
    assert!(code.contains(&Opcode::JumpIfFalse.to_u8()));
    assert!(code.contains(&Opcode::JumpIfTrue.to_u8()));
}
