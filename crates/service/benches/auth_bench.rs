use criterion::{criterion_group, criterion_main, Criterion};
use std::sync::Arc;

use service::auth::domain::{CreateAdminInput, LoginInput, ProfileInput};
use service::auth::repository::mock::MockAdminRepository;
use service::auth::{AdminService, PasswordHasher};

fn bench_authenticate(c: &mut Criterion) {
    let repo = Arc::new(MockAdminRepository::default());
    let svc = AdminService::new(repo, PasswordHasher::default());

    // pre-create the admin outside of the benchmark using a tokio runtime
    let rt = tokio::runtime::Runtime::new().unwrap();
    let profile = ProfileInput { first_name: "Bench".into(), last_name: "Admin".into(), ..Default::default() };
    let _ = rt.block_on(svc.create(CreateAdminInput { email: "bench@example.com".into(), password: "Benchmark1".into(), profile }));

    c.bench_function("admin_authenticate_bcrypt10", |b| {
        b.iter(|| {
            let _ = rt.block_on(svc.authenticate(LoginInput { email: "bench@example.com".into(), password: "Benchmark1".into() })).unwrap();
        });
    });

    c.bench_function("admin_authenticate_unknown_email", |b| {
        b.iter(|| {
            let _ = rt.block_on(svc.authenticate(LoginInput { email: "ghost@example.com".into(), password: "Benchmark1".into() }));
        });
    });
}

criterion_group!(benches, bench_authenticate);
criterion_main!(benches);
