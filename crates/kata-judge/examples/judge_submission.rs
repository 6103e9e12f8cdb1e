//! Judge one submission end to end and print the verdict.
//!
//! Run with: cargo run --example judge_submission -p kata-judge

use kata_judge::{
    render_diagnostics, SourceUnit, TestCase, TestValue, ValidationEngine,
};

fn main() {
    let engine = ValidationEngine::new();

    let unit = SourceUnit::new(
        "fizzbuzz",
        r#"
        function fizzbuzz(n) {
            let i = 1;
            while (i <= n) {
                if (i % 15 == 0) { println("FizzBuzz"); }
                else if (i % 3 == 0) { println("Fizz"); }
                else if (i % 5 == 0) { println("Buzz"); }
                else { println(i); }
                i = i + 1;
            }
        }
        "#,
    );

    let cases = vec![
        TestCase::new(
            "first five lines",
            vec![TestValue::Int(5)],
            "1\n2\nFizz\n4\nBuzz",
        ),
        TestCase::new(
            "fifteen is FizzBuzz",
            vec![TestValue::Int(15)],
            "1\n2\nFizz\n4\nBuzz\nFizz\n7\n8\nFizz\nBuzz\n11\nFizz\n13\n14\nFizzBuzz",
        ),
    ];

    match engine.validate(&unit, &cases) {
        Ok(verdict) => {
            println!(
                "{}/{} test cases passed",
                verdict.passed_count(),
                verdict.total_count()
            );
            for outcome in verdict.outcomes() {
                let status = if outcome.passed { "PASS" } else { "FAIL" };
                println!("  [{status}] {}", outcome.test_case.description);
                if let Some(diagnostic) = &outcome.diagnostic {
                    println!("         {diagnostic}");
                }
            }
        }
        Err(diagnostics) => {
            println!("Compilation failed:");
            print!("{}", render_diagnostics(&unit.source_text, &diagnostics));
        }
    }
}
