//! Reference enrollment demo.
//!
//! Seeds a two-course catalog, runs one enrollment that succeeds and one
//! against a full course, and collects what each service ended up holding.

pub mod config;
pub mod error;

use common::TransactionId;
use domain::{Course, CourseId, EnrollmentRequest, Money, StudentProfile};
use saga::{
    InMemoryCourseService, InMemoryNotificationService, InMemoryPaymentService,
    InMemoryStudentService, Notification, SagaConfig, SagaInstance, SagaOrchestrator, SagaResult,
};
use serde::Serialize;

/// Outcome of one scenario.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioReport {
    pub name: String,
    pub result: SagaResult,
    pub saga: Option<SagaInstance>,
}

/// Enrollment count of one catalog course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseSummary {
    pub course_id: CourseId,
    pub name: String,
    pub enrolled: u32,
    pub capacity: u32,
}

/// Everything the demo observed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoReport {
    pub scenarios: Vec<ScenarioReport>,
    pub students: Vec<StudentProfile>,
    pub courses: Vec<CourseSummary>,
    pub notifications: Vec<Notification>,
}

/// Returns the catalog the demo runs against.
pub fn catalog() -> Vec<Course> {
    vec![
        Course::new("CS101", "Intro to Programming", 30),
        Course::new("MATH201", "Calculus I", 25),
    ]
}

/// Runs both reference scenarios and reports the final state.
pub async fn run_demo(config: SagaConfig) -> DemoReport {
    let students = InMemoryStudentService::new();
    let courses = InMemoryCourseService::with_courses(catalog());
    let notifications = InMemoryNotificationService::new();
    let orchestrator = SagaOrchestrator::with_config(
        students.clone(),
        courses.clone(),
        InMemoryPaymentService::new(),
        notifications.clone(),
        config,
    );

    let mut scenarios = Vec::new();

    tracing::info!("scenario 1: successful enrollment");
    let tx = TransactionId::new("ENR-001");
    let result = orchestrator
        .run_saga(
            tx.clone(),
            EnrollmentRequest::new(
                StudentProfile::new("STU-001", "John Doe", "john@example.com"),
                "CS101",
                Money::from_dollars(500),
            ),
        )
        .await;
    scenarios.push(ScenarioReport {
        name: "successful enrollment".to_string(),
        result,
        saga: orchestrator.get_saga_status(&tx).await,
    });

    tracing::info!("scenario 2: enrollment into a full course");
    let math = CourseId::new("MATH201");
    if let Some(course) = courses.course(&math).await {
        courses.set_enrolled(&math, course.capacity).await;
    }
    let tx = TransactionId::new("ENR-002");
    let result = orchestrator
        .run_saga(
            tx.clone(),
            EnrollmentRequest::new(
                StudentProfile::new("STU-002", "Jane Smith", "jane@example.com"),
                "MATH201",
                Money::from_dollars(450),
            ),
        )
        .await;
    scenarios.push(ScenarioReport {
        name: "course full".to_string(),
        result,
        saga: orchestrator.get_saga_status(&tx).await,
    });

    let mut enrolled_students = Vec::new();
    for id in students.student_ids().await {
        enrolled_students.extend(students.student(&id).await);
    }

    let mut summaries = Vec::new();
    for course in catalog() {
        if let Some(current) = courses.course(&course.id).await {
            summaries.push(CourseSummary {
                course_id: current.id,
                name: current.name,
                enrolled: current.enrolled,
                capacity: current.capacity,
            });
        }
    }

    DemoReport {
        scenarios,
        students: enrolled_students,
        courses: summaries,
        notifications: notifications.sent().await,
    }
}
