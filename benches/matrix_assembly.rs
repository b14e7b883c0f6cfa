use criterion::{criterion_group, criterion_main, Criterion};

use tessera::matrix::{dynamic_matrix, integrated_matrix};
use tessera::store::cases::CaseStore;
use tessera::store::technology::TechnologyStore;

fn scratch_path() -> std::path::PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("tessera-bench-{}.json", std::process::id()));
    path
}

pub fn assemble_both_views() {
    let store = TechnologyStore::seed().unwrap();
    let cases = CaseStore::seed(scratch_path()).unwrap().all().unwrap();

    let integrated = integrated_matrix(&store, &cases);
    assert!(integrated.len() >= 8);

    let dynamic = dynamic_matrix(&store, &cases);
    assert!(!dynamic.is_empty());
}

fn benchmark(c: &mut Criterion) {
    c.bench_function("matrix assembly", |b| b.iter(assemble_both_views));
}

criterion_group!(benches, benchmark);
criterion_main!(benches);
