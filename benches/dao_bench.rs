use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use stockroom::{Product, ProductDao};
use stockroom_memory::InMemoryProductDao;
use stockroom_sheet::SheetProductDao;
use tempfile::TempDir;

fn seed(dao: &dyn ProductDao, count: usize) {
    for i in 0..count {
        dao.add(Product::new(format!("Item {}", i), i as i32).with_tag("seed"))
            .unwrap();
    }
}

fn bench_memory(c: &mut Criterion) {
    let dao = InMemoryProductDao::new();
    seed(&dao, 1000);

    c.bench_function("memory_add", |b| {
        b.iter(|| dao.add(black_box(Product::new("Bolt", 10))).unwrap())
    });

    c.bench_function("memory_list_1000", |b| b.iter(|| black_box(dao.list().unwrap())));
}

fn bench_sheet(c: &mut Criterion) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("bench.xlsx");
    let dao = SheetProductDao::with_path(&path);
    seed(&dao, 1000);

    c.bench_function("sheet_list_1000", |b| b.iter(|| black_box(dao.list().unwrap())));

    // Every add rewrites the whole sheet, so cost grows with row count.
    c.bench_function("sheet_add_into_1000", |b| {
        b.iter_batched(
            || {
                let dir = TempDir::new().unwrap();
                let dao = SheetProductDao::with_path(dir.path().join("bench.xlsx"));
                std::fs::copy(&path, dao.path().unwrap()).unwrap();
                (dir, dao)
            },
            |(_dir, dao)| dao.add(black_box(Product::new("Bolt", 10))).unwrap(),
            BatchSize::PerIteration,
        )
    });
}

criterion_group!(benches, bench_memory, bench_sheet);
criterion_main!(benches);
