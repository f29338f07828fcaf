//! Interpreter benchmarks for Lumen.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use lumen::interpreter::Interpreter;

const FIB_RECURSIVE: &str = r#"
fun fib(n) {
    if n < 2 { return n }
    return fib(n - 1) + fib(n - 2)
}
fib(18)
"#;

const LOOP_SUM: &str = r#"
var total = 0
for i = 0 to 10000 { total += i }
total
"#;

const COLLECTIONS: &str = r#"
var xs = []
for i to 1000 { xs.append(i * 2) }
var d = {}
foreach i, x in xs { d[str(i)] = x }
len(d.keys())
"#;

const CLASSES: &str = r#"
class Point {
    property x: number = 0
    property y: number = 0
    fun __init(x, y) {
        self.x = x
        self.y = y
    }
    fun plus(other) -> new Point(self.x + other.x, self.y + other.y)
}
class Point3 extends Point {
    property z = 0
    fun plus(other) {
        var p = super.plus(other)
        return p
    }
}
var acc = new Point3(0, 0)
for i to 300 { acc = acc.plus(new Point(1, 2)) }
acc.x
"#;

fn run_program(source: &str) {
    let mut interpreter = Interpreter::new();
    interpreter.run(source, "<bench>").expect("runtime error");
}

fn function_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("functions");
    group.bench_function("recursive_fib18", |b| {
        b.iter(|| run_program(black_box(FIB_RECURSIVE)))
    });
    group.finish();
}

fn loop_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("loops");
    group.bench_function("sum_10000", |b| b.iter(|| run_program(black_box(LOOP_SUM))));
    group.finish();
}

fn collection_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("collections");
    group.bench_function("list_and_dict_1000", |b| {
        b.iter(|| run_program(black_box(COLLECTIONS)))
    });
    group.finish();
}

fn oop_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("oop");
    group.bench_function("instances_and_super_300", |b| {
        b.iter(|| run_program(black_box(CLASSES)))
    });
    group.finish();
}

criterion_group!(
    benches,
    function_benchmarks,
    loop_benchmarks,
    collection_benchmarks,
    oop_benchmarks
);
criterion_main!(benches);
