use common::TransactionId;
use criterion::{Criterion, criterion_group, criterion_main};
use domain::{Course, EnrollmentRequest, Money, StudentProfile};
use saga::{
    InMemoryCourseService, InMemoryNotificationService, InMemoryPaymentService,
    InMemoryStudentService, SagaOrchestrator, SagaStore,
};

type Orchestrator = SagaOrchestrator<
    InMemoryStudentService,
    InMemoryCourseService,
    InMemoryPaymentService,
    InMemoryNotificationService,
>;

fn make_orchestrator(courses: InMemoryCourseService) -> Orchestrator {
    SagaOrchestrator::new(
        InMemoryStudentService::new(),
        courses,
        InMemoryPaymentService::new(),
        InMemoryNotificationService::new(),
    )
}

fn make_request(i: usize, course: &str, dollars: i64) -> EnrollmentRequest {
    EnrollmentRequest::new(
        StudentProfile::new(
            format!("STU-{i}"),
            "Bench Student",
            format!("stu-{i}@example.com"),
        ),
        course,
        Money::from_dollars(dollars),
    )
}

fn bench_successful_enrollment(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("saga/successful_enrollment", |b| {
        b.iter(|| {
            rt.block_on(async {
                let orchestrator = make_orchestrator(InMemoryCourseService::with_courses([
                    Course::new("CS101", "Intro to Programming", 30),
                ]));
                let result = orchestrator
                    .run_saga(TransactionId::new("ENR-001"), make_request(1, "CS101", 500))
                    .await;
                assert!(result.success);
            });
        });
    });
}

fn bench_payment_failure_compensation(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("saga/payment_failure_compensation", |b| {
        b.iter(|| {
            rt.block_on(async {
                let orchestrator = make_orchestrator(InMemoryCourseService::with_courses([
                    Course::new("CS101", "Intro to Programming", 30),
                ]));
                let result = orchestrator
                    .run_saga(TransactionId::new("ENR-002"), make_request(2, "CS101", 0))
                    .await;
                assert!(!result.success);
            });
        });
    });
}

fn bench_sequential_enrollments_100(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("saga/sequential_enrollments_100", |b| {
        b.iter(|| {
            rt.block_on(async {
                let orchestrator = make_orchestrator(InMemoryCourseService::with_courses([
                    Course::new("CS101", "Intro to Programming", 100),
                ]));
                for i in 0..100 {
                    orchestrator
                        .run_saga(
                            TransactionId::new(format!("ENR-{i}")),
                            make_request(i, "CS101", 500),
                        )
                        .await;
                }
            });
        });
    });
}

fn bench_get_saga_status(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let orchestrator = make_orchestrator(InMemoryCourseService::with_courses([Course::new(
        "CS101",
        "Intro to Programming",
        1000,
    )]));

    // Pre-populate with 1000 finished sagas
    rt.block_on(async {
        for i in 0..1000 {
            orchestrator
                .run_saga(
                    TransactionId::new(format!("ENR-{i}")),
                    make_request(i, "CS101", 500),
                )
                .await;
        }
    });

    let target = TransactionId::new("ENR-500");
    c.bench_function("saga/get_saga_status_1000", |b| {
        b.iter(|| {
            rt.block_on(async {
                orchestrator.get_saga_status(&target).await.unwrap();
            });
        });
    });
}

fn bench_store_purge_expired(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let orchestrator = make_orchestrator(InMemoryCourseService::with_courses([Course::new(
        "CS101",
        "Intro to Programming",
        100,
    )]));

    rt.block_on(async {
        for i in 0..100 {
            orchestrator
                .run_saga(
                    TransactionId::new(format!("ENR-{i}")),
                    make_request(i, "CS101", 500),
                )
                .await;
        }
    });
    let snapshots: Vec<_> = rt.block_on(async {
        let mut all = Vec::new();
        for i in 0..100 {
            all.extend(
                orchestrator
                    .get_saga_status(&TransactionId::new(format!("ENR-{i}")))
                    .await,
            );
        }
        all
    });

    c.bench_function("saga/purge_expired_100", |b| {
        b.iter(|| {
            rt.block_on(async {
                let store = SagaStore::with_retention(Some(std::time::Duration::ZERO));
                for saga in snapshots.iter().cloned() {
                    store.register(saga).await.unwrap();
                }
                let later = chrono::Utc::now() + chrono::Duration::seconds(1);
                assert_eq!(store.purge_expired(later).await, 100);
            });
        });
    });
}

criterion_group!(
    benches,
    bench_successful_enrollment,
    bench_payment_failure_compensation,
    bench_sequential_enrollments_100,
    bench_get_saga_status,
    bench_store_purge_expired,
);
criterion_main!(benches);
