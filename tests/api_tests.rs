//! Integration tests for the Nestwell HTTP API.
//!
//! Each test drives the router through axum-test against a fresh in-memory database.

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use chrono::{Duration, Utc};
use nestwell::api::{
    create_router, ErrorBody, HealthResponse, JourneyDetail, MarkReadResponse, ParticipantView,
    StageListResponse, ADMIN_ID_HEADER,
};
use nestwell::config::CorsOrigins;
use nestwell::db::Database;
use nestwell::models::*;
use nestwell_core::StageTimeline;
use serde_json::json;
use uuid::Uuid;

fn server() -> TestServer {
    let db = Database::open_in_memory().unwrap();
    db.migrate().unwrap();
    TestServer::new(create_router(db, &CorsOrigins::LocalhostOnly)).unwrap()
}

fn admin_header(id: Uuid) -> (HeaderName, HeaderValue) {
    (
        HeaderName::from_static(ADMIN_ID_HEADER),
        HeaderValue::from_str(&id.to_string()).unwrap(),
    )
}

async fn participant(server: &TestServer, role: &str, email: &str) -> ParticipantView {
    let response = server
        .post("/api/participants")
        .json(&json!({ "role": role, "email": email }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

async fn pair(server: &TestServer) -> (ParticipantView, ParticipantView) {
    let ip = participant(server, "intended_parent", "parents@example.com").await;
    let gc = participant(server, "surrogate", "carrier@example.com").await;
    (ip, gc)
}

async fn case_journey(server: &TestServer) -> JourneyDetail {
    let (ip, gc) = pair(server).await;
    let response = server
        .post("/api/journeys")
        .json(&json!({
            "track": "case",
            "intended_parent_id": ip.participant.id,
            "surrogate_id": gc.participant.id,
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json()
}

// =============================================================================
// HEALTH & DASHBOARD
// =============================================================================

#[tokio::test]
async fn test_health() {
    let response = server().get("/api/health").await;
    response.assert_status_ok();

    let health: HealthResponse = response.json();
    assert_eq!(health.status, "ok");
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn test_dashboard_counts_roles() {
    let server = server();
    case_journey(&server).await;

    let stats: DashboardStats = server.get("/api/dashboard").await.json();
    assert_eq!(stats.intended_parents, 1);
    assert_eq!(stats.surrogates, 1);
    assert_eq!(stats.case_journeys, 1);
    assert_eq!(stats.completed_journeys, 0);
}

// =============================================================================
// PARTICIPANTS
// =============================================================================

#[tokio::test]
async fn test_participant_name_prefers_form_data() {
    let server = server();
    let response = server
        .post("/api/participants")
        .json(&json!({
            "role": "surrogate",
            "email": "jane@example.com",
            "display_name": "JD",
            "form_data": { "firstName": "Jane", "lastName": "Doe" },
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let created: ParticipantView = response.json();
    assert_eq!(created.name, "Jane Doe");
    assert_eq!(created.participant.status, ParticipantStatus::Lead);
}

#[tokio::test]
async fn test_participant_falls_back_to_email() {
    let server = server();
    let created = participant(&server, "intended_parent", "only@example.com").await;
    assert_eq!(created.name, "only@example.com");
}

#[tokio::test]
async fn test_participant_blank_email_rejected() {
    server()
        .post("/api/participants")
        .json(&json!({ "role": "surrogate", "email": "  " }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_participant_not_found() {
    server()
        .get(&format!("/api/participants/{}", Uuid::new_v4()))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

// =============================================================================
// MATCHES
// =============================================================================

#[tokio::test]
async fn test_match_defaults_to_proposed() {
    let server = server();
    let (ip, gc) = pair(&server).await;

    let response = server
        .post("/api/matches")
        .json(&json!({
            "intended_parent_id": ip.participant.id,
            "surrogate_id": gc.participant.id,
        }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let created: Match = response.json();
    assert_eq!(created.status, MatchStatus::Proposed);
    assert!(!created.ip_accepted && !created.surrogate_accepted);
}

#[tokio::test]
async fn test_match_rejects_swapped_roles() {
    let server = server();
    let (ip, gc) = pair(&server).await;

    server
        .post("/api/matches")
        .json(&json!({
            "intended_parent_id": gc.participant.id,
            "surrogate_id": ip.participant.id,
        }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_match_status_can_change_freely() {
    let server = server();
    let (ip, gc) = pair(&server).await;
    let created: Match = server
        .post("/api/matches")
        .json(&json!({
            "intended_parent_id": ip.participant.id,
            "surrogate_id": gc.participant.id,
        }))
        .await
        .json();

    let updated: Match = server
        .put(&format!("/api/matches/{}", created.id))
        .json(&json!({ "status": "accepted", "ip_accepted": true, "surrogate_accepted": true }))
        .await
        .json();
    assert_eq!(updated.status, MatchStatus::Accepted);

    let reverted: Match = server
        .put(&format!("/api/matches/{}", created.id))
        .json(&json!({ "status": "proposed" }))
        .await
        .json();
    assert_eq!(reverted.status, MatchStatus::Proposed);
    assert!(reverted.ip_accepted);
}

// =============================================================================
// JOURNEYS
// =============================================================================

#[tokio::test]
async fn test_journey_starts_at_first_stage() {
    let server = server();
    let journey = case_journey(&server).await;

    assert_eq!(journey.journey.current_stage, Stage::Matching);
    assert!(journey.journey.stage_history.is_empty());
    assert_eq!(journey.percent_complete, 16);
    assert_eq!(
        journey.surrogate.as_ref().map(|s| s.name.as_str()),
        Some("carrier@example.com")
    );
}

#[tokio::test]
async fn test_advance_requires_admin_header() {
    let server = server();
    let journey = case_journey(&server).await;

    server
        .post(&format!("/api/journeys/{}/advance", journey.journey.id))
        .json(&json!({}))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_advance_records_history() {
    let server = server();
    let journey = case_journey(&server).await;
    let admin = Uuid::new_v4();
    let (name, value) = admin_header(admin);

    let response = server
        .post(&format!("/api/journeys/{}/advance", journey.journey.id))
        .add_header(name, value)
        .json(&json!({ "notes": "done" }))
        .await;
    response.assert_status_ok();

    let advanced: JourneyDetail = response.json();
    assert_eq!(advanced.journey.current_stage, Stage::Screening);
    assert_eq!(advanced.journey.stage_history.len(), 1);

    let entry = &advanced.journey.stage_history[0];
    assert_eq!(entry.stage, Stage::Matching);
    assert_eq!(entry.completed_by, admin);
    assert_eq!(entry.notes.as_deref(), Some("done"));

    let history: Vec<StageHistoryEntry> = server
        .get(&format!("/api/journeys/{}/history", journey.journey.id))
        .await
        .json();
    assert_eq!(history.len(), 1);
}

#[tokio::test]
async fn test_advance_backwards_is_unprocessable() {
    let server = server();
    let journey = case_journey(&server).await;
    let path = format!("/api/journeys/{}/advance", journey.journey.id);

    let (name, value) = admin_header(Uuid::new_v4());
    server
        .post(&path)
        .add_header(name, value)
        .json(&json!({ "target_stage": "legal" }))
        .await
        .assert_status_ok();

    let (name, value) = admin_header(Uuid::new_v4());
    server
        .post(&path)
        .add_header(name, value)
        .json(&json!({ "target_stage": "screening" }))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_advance_completed_journey_is_unprocessable() {
    let server = server();
    let journey = case_journey(&server).await;
    let path = format!("/api/journeys/{}/advance", journey.journey.id);

    let (name, value) = admin_header(Uuid::new_v4());
    let done: JourneyDetail = server
        .post(&path)
        .add_header(name, value)
        .json(&json!({ "target_stage": "completed" }))
        .await
        .json();
    assert_eq!(done.percent_complete, 100);

    let (name, value) = admin_header(Uuid::new_v4());
    server
        .post(&path)
        .add_header(name, value)
        .json(&json!({}))
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_advance_unknown_journey_not_found() {
    let (name, value) = admin_header(Uuid::new_v4());
    server()
        .post(&format!("/api/journeys/{}/advance", Uuid::new_v4()))
        .add_header(name, value)
        .json(&json!({}))
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_timeline_marks_steps() {
    let server = server();
    let journey = case_journey(&server).await;

    let (name, value) = admin_header(Uuid::new_v4());
    server
        .post(&format!("/api/journeys/{}/advance", journey.journey.id))
        .add_header(name, value)
        .json(&json!({}))
        .await
        .assert_status_ok();

    let timeline: StageTimeline = server
        .get(&format!("/api/journeys/{}/timeline", journey.journey.id))
        .await
        .json();
    assert_eq!(timeline.current_stage, Stage::Screening);
    assert_eq!(timeline.percent_complete, 33);
    assert!(!timeline.is_complete);
    assert_eq!(timeline.steps.len(), 6);
}

#[tokio::test]
async fn test_stage_listing() {
    let stages: StageListResponse = server().get("/api/stages/milestone").await.json();
    assert_eq!(stages.stages.len(), 6);
    assert_eq!(stages.stages[0].label, "Medical Screening");
    assert_eq!(stages.stages[5].stage, Stage::Completed);
}

#[tokio::test]
async fn test_unknown_track_returns_error_body() {
    let response = server().get("/api/stages/orbit").await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let body: ErrorBody = response.json();
    assert!(body.error.contains("orbit"));
}

// =============================================================================
// TASKS
// =============================================================================

#[tokio::test]
async fn test_overdue_tasks_exclude_completed() {
    let server = server();
    let (ip, _) = pair(&server).await;
    let yesterday = (Utc::now() - Duration::days(1)).date_naive();

    let late: Task = server
        .post("/api/tasks")
        .json(&json!({ "assignee_id": ip.participant.id, "title": "Sign retainer", "due_date": yesterday }))
        .await
        .json();
    let done: Task = server
        .post("/api/tasks")
        .json(&json!({ "assignee_id": ip.participant.id, "title": "Intake call", "due_date": yesterday }))
        .await
        .json();

    let completed: Task = server
        .put(&format!("/api/tasks/{}", done.id))
        .json(&json!({ "is_completed": true }))
        .await
        .json();
    assert!(completed.completed_at.is_some());

    let overdue: Vec<OverdueTask> = server.get("/api/tasks/overdue").await.json();
    assert_eq!(overdue.len(), 1);
    assert_eq!(overdue[0].task.id, late.id);
    assert_eq!(overdue[0].assignee_name.as_deref(), Some("parents@example.com"));
}

#[tokio::test]
async fn test_task_update_rejects_blank_title() {
    let server = server();
    let (ip, _) = pair(&server).await;
    let task: Task = server
        .post("/api/tasks")
        .json(&json!({ "assignee_id": ip.participant.id, "title": "Sign retainer" }))
        .await
        .json();

    let response = server
        .put(&format!("/api/tasks/{}", task.id))
        .json(&json!({ "title": "   " }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: ErrorBody = response.json();
    assert_eq!(body.error, "title must not be empty");

    let unchanged: Task = server.get(&format!("/api/tasks/{}", task.id)).await.json();
    assert_eq!(unchanged.title, "Sign retainer");
}

// =============================================================================
// MESSAGING
// =============================================================================

#[tokio::test]
async fn test_conversation_unread_flow() {
    let server = server();
    let (ip, gc) = pair(&server).await;

    let response = server
        .post("/api/conversations")
        .json(&json!({
            "subject": "Welcome",
            "participant_ids": [ip.participant.id, gc.participant.id],
        }))
        .await;
    response.assert_status(StatusCode::CREATED);
    let conversation: Conversation = response.json();
    assert_eq!(
        conversation.participant_names.get(&gc.participant.id).map(String::as_str),
        Some("carrier@example.com")
    );

    server
        .post(&format!("/api/conversations/{}/messages", conversation.id))
        .json(&json!({ "sender_id": ip.participant.id, "body": "Hello!" }))
        .await
        .assert_status(StatusCode::CREATED);

    let inbox: Vec<ConversationOverview> = server
        .get(&format!("/api/conversations?participant_id={}", gc.participant.id))
        .await
        .json();
    assert_eq!(inbox.len(), 1);
    assert_eq!(inbox[0].unread_count, 1);

    let marked: MarkReadResponse = server
        .post(&format!("/api/conversations/{}/read", conversation.id))
        .json(&json!({ "reader_id": gc.participant.id }))
        .await
        .json();
    assert_eq!(marked.marked, 1);

    let inbox: Vec<ConversationOverview> = server
        .get(&format!("/api/conversations?participant_id={}", gc.participant.id))
        .await
        .json();
    assert_eq!(inbox[0].unread_count, 0);
}

#[tokio::test]
async fn test_outsider_cannot_post() {
    let server = server();
    let (ip, gc) = pair(&server).await;
    let outsider = participant(&server, "admin", "staff@example.com").await;

    let conversation: Conversation = server
        .post("/api/conversations")
        .json(&json!({ "participant_ids": [ip.participant.id, gc.participant.id] }))
        .await
        .json();

    server
        .post(&format!("/api/conversations/{}/messages", conversation.id))
        .json(&json!({ "sender_id": outsider.participant.id, "body": "hi" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_outsider_cannot_mark_read() {
    let server = server();
    let (ip, gc) = pair(&server).await;
    let outsider = participant(&server, "admin", "staff@example.com").await;

    let conversation: Conversation = server
        .post("/api/conversations")
        .json(&json!({ "participant_ids": [ip.participant.id, gc.participant.id] }))
        .await
        .json();
    server
        .post(&format!("/api/conversations/{}/messages", conversation.id))
        .json(&json!({ "sender_id": ip.participant.id, "body": "Hello!" }))
        .await
        .assert_status(StatusCode::CREATED);

    for reader in [outsider.participant.id, Uuid::new_v4()] {
        server
            .post(&format!("/api/conversations/{}/read", conversation.id))
            .json(&json!({ "reader_id": reader }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    server
        .post(&format!("/api/conversations/{}/read", Uuid::new_v4()))
        .json(&json!({ "reader_id": gc.participant.id }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let inbox: Vec<ConversationOverview> = server
        .get(&format!("/api/conversations?participant_id={}", gc.participant.id))
        .await
        .json();
    assert_eq!(inbox[0].unread_count, 1);
}

// =============================================================================
// LEDGER & SCREENINGS
// =============================================================================

#[tokio::test]
async fn test_ledger_summary_nets_revenue_and_expenses() {
    let server = server();
    let today = Utc::now().date_naive();

    for (kind, cents) in [("revenue", 500_000), ("expense", 120_000)] {
        let (name, value) = admin_header(Uuid::new_v4());
        server
            .post("/api/ledger")
            .add_header(name, value)
            .json(&json!({ "kind": kind, "category": "fees", "amount_cents": cents, "occurred_on": today }))
            .await
            .assert_status(StatusCode::CREATED);
    }

    let summary: LedgerSummary = server.get("/api/ledger/summary").await.json();
    assert_eq!(summary.revenue_cents, 500_000);
    assert_eq!(summary.expense_cents, 120_000);
    assert_eq!(summary.net_cents, 380_000);
    assert_eq!(summary.entry_count, 2);
}

#[tokio::test]
async fn test_ledger_rejects_non_positive_amount() {
    let (name, value) = admin_header(Uuid::new_v4());
    server()
        .post("/api/ledger")
        .add_header(name, value)
        .json(&json!({
            "kind": "expense",
            "category": "travel",
            "amount_cents": 0,
            "occurred_on": Utc::now().date_naive(),
        }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_ledger_rejects_oversized_amount_and_keeps_summary_valid() {
    let server = server();
    let today = Utc::now().date_naive();

    for _ in 0..2 {
        let (name, value) = admin_header(Uuid::new_v4());
        server
            .post("/api/ledger")
            .add_header(name, value)
            .json(&json!({ "kind": "revenue", "category": "fees", "amount_cents": i64::MAX, "occurred_on": today }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    server.get("/api/ledger/summary").await.assert_status_ok();
    let stats: DashboardStats = server.get("/api/dashboard").await.json();
    assert_eq!(stats.ledger_net_cents, 0);
}

#[tokio::test]
async fn test_screening_review_records_reviewer() {
    let server = server();
    let (_, gc) = pair(&server).await;

    let screening: MedicalScreening = server
        .post("/api/screenings")
        .json(&json!({ "surrogate_id": gc.participant.id, "screening_type": "psychological" }))
        .await
        .json();
    assert_eq!(screening.status, ScreeningStatus::Pending);

    let reviewer = Uuid::new_v4();
    let (name, value) = admin_header(reviewer);
    let reviewed: MedicalScreening = server
        .post(&format!("/api/screenings/{}/review", screening.id))
        .add_header(name, value)
        .json(&json!({ "decision": "cleared", "result_notes": "all clear" }))
        .await
        .json();

    assert_eq!(reviewed.status, ScreeningStatus::Cleared);
    assert_eq!(reviewed.reviewed_by, Some(reviewer));
    assert!(reviewed.reviewed_at.is_some());
}

// =============================================================================
// PERSISTENCE
// =============================================================================

#[tokio::test]
async fn test_journey_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("data").join("nestwell.db");

    let db = Database::open(&path).unwrap();
    db.migrate().unwrap();
    let server = TestServer::new(create_router(db, &CorsOrigins::LocalhostOnly)).unwrap();
    let journey = case_journey(&server).await;
    let (name, value) = admin_header(Uuid::new_v4());
    server
        .post(&format!("/api/journeys/{}/advance", journey.journey.id))
        .add_header(name, value)
        .json(&json!({ "notes": "cleared" }))
        .await
        .assert_status_ok();
    drop(server);

    let reopened = Database::open(&path).unwrap();
    reopened.migrate().unwrap();
    let server = TestServer::new(create_router(reopened, &CorsOrigins::LocalhostOnly)).unwrap();

    let restored: JourneyDetail = server
        .get(&format!("/api/journeys/{}", journey.journey.id))
        .await
        .json();
    assert_eq!(restored.journey.current_stage, Stage::Screening);
    assert_eq!(restored.journey.stage_history[0].notes.as_deref(), Some("cleared"));
}
