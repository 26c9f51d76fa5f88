#![allow(clippy::unwrap_used)]
//! Benchmarks for app store writes and queries

#![allow(missing_docs)]

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use tvlauncher::repository::categorize;
use tvlauncher::store::{AppRecord, AppStore};

const APP_COUNT: usize = 500;

fn create_records() -> Vec<AppRecord> {
    let kinds = ["game", "video", "music", "browser", "settings", "tools"];
    (0..APP_COUNT)
        .map(|i| {
            let package = format!("com.vendor{i}.{}.app", kinds[i % kinds.len()]);
            AppRecord {
                category: categorize(&package, None).to_string(),
                install_timestamp: 1_700_000_000_000,
                update_timestamp: 1_700_000_000_000,
                version_code: 1,
                ..AppRecord::new(package, format!("Application {i}"))
            }
        })
        .collect()
}

fn populated_store() -> AppStore {
    let store = AppStore::open_in_memory().unwrap();
    store.upsert_all(&create_records()).unwrap();
    let all = store.list_all().unwrap();
    for (i, record) in all.iter().enumerate().step_by(7) {
        store
            .record_usage(&record.package_id, i64::try_from(i).unwrap() + 1)
            .unwrap();
    }
    store
}

fn bench_upsert_all(c: &mut Criterion) {
    let records = create_records();
    let store = AppStore::open_in_memory().unwrap();

    c.bench_function("upsert_all_500", |b| {
        b.iter(|| store.upsert_all(black_box(&records)).unwrap());
    });
}

fn bench_merge_refresh(c: &mut Criterion) {
    let records = create_records();
    let store = populated_store();

    c.bench_function("upsert_all_preserving_usage_500", |b| {
        b.iter(|| store.upsert_all_preserving_usage(black_box(&records)).unwrap());
    });
}

fn bench_search(c: &mut Criterion) {
    let store = populated_store();

    c.bench_function("search_500", |b| {
        b.iter(|| {
            let results = store.search(black_box("%music%")).unwrap();
            black_box(results);
        });
    });
}

fn bench_category_counts(c: &mut Criterion) {
    let store = populated_store();

    c.bench_function("category_counts_500", |b| {
        b.iter(|| black_box(store.category_counts().unwrap()));
    });
}

fn bench_recent(c: &mut Criterion) {
    let store = populated_store();

    c.bench_function("list_recent_500", |b| {
        b.iter(|| black_box(store.list_recent(black_box(10)).unwrap()));
    });
}

criterion_group!(
    benches,
    bench_upsert_all,
    bench_merge_refresh,
    bench_search,
    bench_category_counts,
    bench_recent
);
criterion_main!(benches);
