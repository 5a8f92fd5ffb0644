//! # Incident List Benchmarks
//!
//! Measures the list path (validate → filter → sort → window → count) over
//! both stores with a seeded data set:
//!
//! | Case | Query |
//! |------|-------|
//! | default | newest first, page 1 |
//! | filtered | severity + status |
//! | search | case-insensitive substring |
//! | deep page | page 40, limit 25 |

use chrono::Utc;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use incident_core::{
    CallerId, InMemoryIncidentStore, IncidentApi, IncidentService, IncidentStore, ListParams,
    SqliteIncidentStore,
};
use incident_server::{generate_incidents, SeedOptions};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;

const SEEDED: u32 = 1_000;

fn seeded_stores(rt: &tokio::runtime::Runtime) -> Vec<(&'static str, Arc<dyn IncidentStore>)> {
    let options = SeedOptions {
        count: SEEDED,
        users: 8,
        days: 90,
    };
    let incidents = generate_incidents(&options, &mut StdRng::seed_from_u64(2024), Utc::now())
        .expect("seed data");

    let sqlite = SqliteIncidentStore::open_in_memory().expect("sqlite store");
    rt.block_on(sqlite.create_many(incidents.clone()))
        .expect("seed sqlite");

    vec![
        ("memory", Arc::new(InMemoryIncidentStore::with_incidents(incidents))),
        ("sqlite", Arc::new(sqlite)),
    ]
}

fn cases() -> Vec<(&'static str, ListParams)> {
    vec![
        ("default", ListParams::default()),
        (
            "filtered",
            ListParams {
                severity: Some("SEV3".into()),
                status: Some("OPEN".into()),
                ..Default::default()
            },
        ),
        (
            "search",
            ListParams {
                search: Some("gateway".into()),
                ..Default::default()
            },
        ),
        (
            "deep_page",
            ListParams {
                page: Some("40".into()),
                limit: Some("25".into()),
                ..Default::default()
            },
        ),
    ]
}

fn bench_list_incidents(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().expect("runtime");
    let caller = CallerId::new("user-1");

    let mut group = c.benchmark_group("incident-list");
    group.measurement_time(Duration::from_secs(5));

    for (store_name, store) in seeded_stores(&rt) {
        let service = IncidentService::new(store);
        for (case, params) in cases() {
            group.bench_with_input(
                BenchmarkId::new(store_name, case),
                &params,
                |b, params| {
                    b.iter(|| {
                        let page = rt
                            .block_on(service.list(Some(&caller), black_box(params)))
                            .expect("list");
                        black_box(page.pagination.total)
                    })
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, bench_list_incidents);
criterion_main!(benches);
