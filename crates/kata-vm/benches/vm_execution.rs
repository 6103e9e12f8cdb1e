//! Sandbox execution benchmarks

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use kata_compiler::{Compiler, SourceUnit};
use kata_vm::{Sandbox, Value};
use std::time::Duration;

const DEADLINE: Duration = Duration::from_secs(10);

fn bench_fib(c: &mut Criterion) {
    let artifact = Compiler::new()
        .compile(&SourceUnit::new(
            "main",
            r#"
            function fib(n) {
                if (n < 2) { return n; }
                return fib(n - 1) + fib(n - 2);
            }
            function main(n) { println(fib(n)); }
            "#,
        ))
        .expect("Failed to compile");
    let sandbox = Sandbox::new();

    c.bench_function("fib_15", |b| {
        b.iter(|| {
            sandbox
                .execute(&artifact, "main", &[Value::Int(black_box(15))], DEADLINE)
                .unwrap()
        })
    });
}

fn bench_loop_sum(c: &mut Criterion) {
    let artifact = Compiler::new()
        .compile(&SourceUnit::new(
            "main",
            r#"
            function main() {
                let total = 0;
                let i = 0;
                while (i < 10000) {
                    total = total + i;
                    i = i + 1;
                }
                println(total);
            }
            "#,
        ))
        .expect("Failed to compile");
    let sandbox = Sandbox::new();

    c.bench_function("loop_sum_10k", |b| {
        b.iter(|| sandbox.execute(&artifact, "main", &[], DEADLINE).unwrap())
    });
}

fn bench_compile(c: &mut Criterion) {
    let unit = SourceUnit::new(
        "main",
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
    let compiler = Compiler::new();

    c.bench_function("compile_fizzbuzz", |b| {
        b.iter(|| compiler.compile(black_box(&unit)).unwrap())
    });
}

criterion_group!(benches, bench_fib, bench_loop_sum, bench_compile);
criterion_main!(benches);
