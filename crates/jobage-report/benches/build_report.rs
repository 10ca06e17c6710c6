//! Benchmarks for report building.
//!
//! Run with: cargo bench -p jobage-report

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use jobage_config::EngineConfig;
use jobage_filter::PredicateSet;
use jobage_report::{BandSelection, ReportRequest, build_report};
use jobage_schema::ServiceRecord;
use jobage_testkit::{MANDALAY, MAWLAMYINE, RecordBuilder, YANGON, reference};

fn build_records(count: usize) -> Vec<ServiceRecord> {
    let centers = [YANGON, MANDALAY, MAWLAMYINE, "MM-2.Partner-Bago", "MM-2.Partner-Pyay"];
    let statuses = ["Pending Parts", "In Repair", "Waiting Customer"];
    (0..count)
        .map(|i| {
            RecordBuilder::new(format!("SO-{i:07}"))
                .days_pending((i % 90) as i64)
                .center(centers[i % centers.len()])
                .warranty(if i % 3 == 0 { "OOW" } else { "IW" })
                .service_type(if i % 4 == 0 { "Inspection" } else { "Repair" })
                .status(statuses[i % statuses.len()])
                .build()
        })
        .collect()
}

fn bench_build_report(c: &mut Criterion) {
    let config = EngineConfig::default();
    let mut group = c.benchmark_group("build_report");

    for count in [1_000, 10_000, 100_000] {
        let records = build_records(count);

        let unfiltered = ReportRequest::new(reference()).with_selection(BandSelection::overall("50+"));
        group.bench_with_input(BenchmarkId::new("unfiltered", count), &records, |b, records| {
            b.iter(|| black_box(build_report(black_box(records), &unfiltered, &config)));
        });

        let filtered = ReportRequest::new(reference())
            .with_filters(PredicateSet::new().with_warranty("IW").with_service_type("Repair"));
        group.bench_with_input(BenchmarkId::new("filtered", count), &records, |b, records| {
            b.iter(|| black_box(build_report(black_box(records), &filtered, &config)));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_build_report);
criterion_main!(benches);
