//! Parser integration tests

use kata_parser::ast::*;
use kata_parser::{ParseErrorKind, Parser};

fn parse(source: &str) -> Program {
    Parser::new(source)
        .expect("Failed to tokenize")
        .parse()
        .expect("Failed to parse")
}

fn parse_err(source: &str) -> Vec<kata_parser::ParseError> {
    Parser::new(source)
        .expect("Failed to tokenize")
        .parse()
        .expect_err("Expected parse errors")
}

#[test]
fn test_parse_empty_function() {
    let program = parse("function main() {}");
    assert_eq!(program.functions.len(), 1);
    assert_eq!(program.functions[0].name, "main");
    assert!(program.functions[0].params.is_empty());
    assert!(program.functions[0].body.statements.is_empty());
}

#[test]
fn test_parse_parameters() {
    let program = parse("function add(a, b) { return a + b; }");
    let func = &program.functions[0];
    assert_eq!(func.params.len(), 2);
    assert_eq!(func.params[0].name, "a");
    assert_eq!(func.params[1].name, "b");
}

#[test]
fn test_duplicate_parameter_rejected() {
    let errors = parse_err("function f(a, a) {}");
    assert!(errors
        .iter()
        .any(|e| matches!(e.kind, ParseErrorKind::DuplicateParameter { .. })));
}

#[test]
fn test_precedence_mul_over_add() {
    let program = parse("function f() { return 1 + 2 * 3; }");
    let stmt = &program.functions[0].body.statements[0];
    let Stmt::Return(ret) = stmt else {
        panic!("Expected return statement");
    };
    let Some(Expr::Binary { op, right, .. }) = &ret.value else {
        panic!("Expected binary expression");
    };
    assert_eq!(*op, BinaryOp::Add);
    assert!(matches!(
        **right,
        Expr::Binary {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn test_logical_precedence() {
    // `a || b && c` parses as `a || (b && c)`
    let program = parse("function f(a, b, c) { return a || b && c; }");
    let Stmt::Return(ret) = &program.functions[0].body.statements[0] else {
        panic!("Expected return");
    };
    let Some(Expr::Binary { op, right, .. }) = &ret.value else {
        panic!("Expected binary");
    };
    assert_eq!(*op, BinaryOp::Or);
    assert!(matches!(
        **right,
        Expr::Binary {
            op: BinaryOp::And,
            ..
        }
    ));
}

#[test]
fn test_assignment_vs_call_disambiguation() {
    let program = parse("function f() { x = 1; g(); }");
    let stmts = &program.functions[0].body.statements;
    assert!(matches!(stmts[0], Stmt::Assign(_)));
    assert!(matches!(stmts[1], Stmt::Expression(_)));
}

#[test]
fn test_else_if_chain() {
    let program = parse(
        r#"
        function grade(score) {
            if (score >= 90) { return "A"; }
            else if (score >= 80) { return "B"; }
            else { return "C"; }
        }
        "#,
    );
    let Stmt::If(if_stmt) = &program.functions[0].body.statements[0] else {
        panic!("Expected if statement");
    };
    assert!(matches!(if_stmt.else_branch, Some(ElseBranch::If(_))));
}

#[test]
fn test_while_with_break_continue() {
    let program = parse(
        r#"
        function f() {
            while (true) {
                if (done()) { break; }
                continue;
            }
        }
        "#,
    );
    let Stmt::While(while_stmt) = &program.functions[0].body.statements[0] else {
        panic!("Expected while statement");
    };
    assert_eq!(while_stmt.body.statements.len(), 2);
}

#[test]
fn test_call_arguments() {
    let program = parse(r#"function f() { println("x", 1, 2.5); }"#);
    let Stmt::Expression(expr_stmt) = &program.functions[0].body.statements[0] else {
        panic!("Expected expression statement");
    };
    let Expr::Call { callee, args, .. } = &expr_stmt.expr else {
        panic!("Expected call");
    };
    assert_eq!(callee, "println");
    assert_eq!(args.len(), 3);
}

#[test]
fn test_missing_brace_reports_line() {
    let errors = parse_err("function f() {\n    let x = 1;\n");
    assert!(!errors.is_empty());
    // The error points past the last complete line
    assert!(errors[0].span.line >= 2);
}

#[test]
fn test_recovery_reports_multiple_errors() {
    let errors = parse_err(
        r#"
        function f() {
            let = 1;
            let y 2;
            return y;
        }
        "#,
    );
    assert!(errors.len() >= 2, "got {} errors: {errors:?}", errors.len());
}

#[test]
fn test_recovery_across_functions() {
    let errors = parse_err(
        r#"
        function broken( {}
        function also_broken() { let = ; }
        "#,
    );
    assert!(errors.len() >= 2);
}

#[test]
fn test_nesting_limit() {
    let mut source = String::from("function f() { return ");
    for _ in 0..300 {
        source.push('(');
    }
    source.push('1');
    for _ in 0..300 {
        source.push(')');
    }
    source.push_str("; }");

    let errors = parse_err(&source);
    assert!(errors
        .iter()
        .any(|e| matches!(e.kind, ParseErrorKind::NestingTooDeep)));
}

#[test]
fn test_unary_chain() {
    let program = parse("function f(x) { return --x; }");
    let Stmt::Return(ret) = &program.functions[0].body.statements[0] else {
        panic!("Expected return");
    };
    let Some(Expr::Unary { op, operand, .. }) = &ret.value else {
        panic!("Expected unary");
    };
    assert_eq!(*op, UnaryOp::Neg);
    assert!(matches!(**operand, Expr::Unary { .. }));
}

#[test]
fn test_spans_are_one_based() {
    let program = parse("function f() {}");
    assert_eq!(program.functions[0].name_span.line, 1);
    assert_eq!(program.functions[0].name_span.column, 10);
}
