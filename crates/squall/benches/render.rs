use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use squall::{
    Fields, Insert, InList, Order, Select, Sort, SqlRender, SqlServerDialect, Value, Where,
};

/// SELECT col0, ... FROM t WHERE col0 = 0 AND col1 = 1 ...
fn build_select(n: usize) -> Select {
    let fields = Fields::new((0..n).map(|i| format!("col{i}"))).unwrap();
    let mut filter = Where::new("col0", "=", Value::new(0)).unwrap();
    for i in 1..n {
        filter = filter.and_where(Where::new(format!("col{i}"), "=", Value::new(i as i64)).unwrap());
    }
    Select::new("t", fields)
        .condition(filter)
        .unwrap()
        .condition(Order::by(["col0"]).unwrap().sort(Sort::Desc))
        .unwrap()
}

fn bench_select_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/select");

    for n in [1, 5, 10, 50, 100] {
        let select = build_select(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &select, |b, select| {
            b.iter(|| black_box(select.render()));
        });
    }

    group.finish();
}

fn bench_build_and_render(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/build_and_render");

    for n in [1, 5, 10, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| black_box(build_select(n).render_with(&SqlServerDialect)));
        });
    }

    group.finish();
}

fn bench_in_list(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/in_list");

    for n in [5, 20, 100, 500] {
        let list = InList::values((0..n).map(Value::new)).unwrap();
        let filter = Where::is_in("id", list).unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &filter, |b, filter| {
            b.iter(|| black_box(filter.render()));
        });
    }

    group.finish();
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/insert");

    for n in [5, 20, 100] {
        let insert = Insert::new(
            "t",
            Fields::new((0..n).map(|i| format!("col{i}"))).unwrap(),
            (0..n).map(|i| Value::new(format!("value {i}"))),
        )
        .unwrap();
        group.bench_with_input(BenchmarkId::from_parameter(n), &insert, |b, insert| {
            b.iter(|| black_box(insert.render()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_select_render,
    bench_build_and_render,
    bench_in_list,
    bench_insert
);
criterion_main!(benches);
