// tests/api.rs
//! End-to-end API flow: profiles, job posting, feeds, reciprocal swipes,
//! and match listing over a local rocket instance with an in-memory store.

use rocket::http::{ContentType, Header, Status};
use rocket::local::asynchronous::Client;
use serde_json::{json, Value};

use hirematch::auth::{issue_token, AuthConfig};
use hirematch::database::DatabaseConfig;
use hirematch::insight::InsightClient;
use hirematch::web::{build_rocket, ServerConfig};

const JWT_SECRET: &str = "integration-test-secret";

async fn test_client() -> Client {
    let mut db_config = DatabaseConfig::new(std::path::PathBuf::from(":memory:"));
    db_config.init_in_memory().await.unwrap();
    db_config.migrate().await.unwrap();

    let rocket = build_rocket(
        db_config,
        AuthConfig::new(JWT_SECRET.to_string()),
        InsightClient::new(None).unwrap(),
        ServerConfig {
            offline_mode: false,
        },
    );

    Client::tracked(rocket).await.unwrap()
}

fn bearer(user_id: &str) -> Header<'static> {
    let token = issue_token(JWT_SECRET, user_id, &format!("{user_id}@example.com"), 3600).unwrap();
    Header::new("Authorization", format!("Bearer {token}"))
}

async fn create_profile(client: &Client, user_id: &str, role: &str, skills: &[&str]) {
    let body = json!({
        "full_name": user_id,
        "email": format!("{user_id}@example.com"),
        "role": role,
        "skills": skills,
    });

    let response = client
        .post("/api/auth/profile")
        .header(bearer(user_id))
        .header(ContentType::JSON)
        .body(body.to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
}

async fn post_job(client: &Client, recruiter: &str, title: &str) -> String {
    let body = json!({
        "title": title,
        "company": "Acme",
        "location": "Remote",
        "description": "Build and run the matching platform.",
        "requirements": ["rust", "sql"],
    });

    let response = client
        .post("/api/jobs")
        .header(bearer(recruiter))
        .header(ContentType::JSON)
        .body(body.to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let job: Value = response.into_json().await.unwrap();
    job["id"].as_str().unwrap().to_string()
}

async fn swipe(
    client: &Client,
    user_id: &str,
    target_id: &str,
    target_type: &str,
    direction: &str,
) -> (Status, Value) {
    let body = json!({
        "target_id": target_id,
        "target_type": target_type,
        "direction": direction,
    });

    let response = client
        .post("/api/swipe")
        .header(bearer(user_id))
        .header(ContentType::JSON)
        .body(body.to_string())
        .dispatch()
        .await;

    let status = response.status();
    let value: Value = response.into_json().await.unwrap();
    (status, value)
}

#[rocket::async_test]
async fn reciprocal_right_swipes_produce_exactly_one_match() {
    let client = test_client().await;
    create_profile(&client, "alice", "SEEKER", &["rust", "sql"]).await;
    create_profile(&client, "bob", "RECRUITER", &[]).await;
    let job_id = post_job(&client, "bob", "Backend Engineer").await;

    // Seeker likes the job first: no match yet.
    let (status, body) = swipe(&client, "alice", &job_id, "job", "right").await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["is_match"], json!(false));
    assert_eq!(body["match_pending"], json!(false));

    // Recruiter likes the candidate back: the reciprocal check fires.
    let (status, body) = swipe(&client, "bob", "alice", "candidate", "right").await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["is_match"], json!(true));
    assert!(body["match_id"].is_string());

    // Both sides see the same single match.
    for user in ["alice", "bob"] {
        let response = client
            .get("/api/matches")
            .header(bearer(user))
            .dispatch()
            .await;
        assert_eq!(response.status(), Status::Ok);
        let matches: Value = response.into_json().await.unwrap();
        let rows = matches["matches"].as_array().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["seeker_id"], json!("alice"));
        assert_eq!(rows[0]["recruiter_id"], json!("bob"));
        assert_eq!(rows[0]["job_id"], json!(job_id));
    }
}

#[rocket::async_test]
async fn left_swipes_never_produce_a_match() {
    let client = test_client().await;
    create_profile(&client, "carol", "SEEKER", &["go"]).await;
    create_profile(&client, "bob", "RECRUITER", &[]).await;
    let job_id = post_job(&client, "bob", "Platform Engineer").await;

    let (status, body) = swipe(&client, "carol", &job_id, "job", "left").await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["is_match"], json!(false));

    let (status, body) = swipe(&client, "bob", "carol", "candidate", "right").await;
    assert_eq!(status, Status::Ok);
    assert_eq!(body["is_match"], json!(false));

    let response = client
        .get("/api/matches")
        .header(bearer("bob"))
        .dispatch()
        .await;
    let matches: Value = response.into_json().await.unwrap();
    assert_eq!(matches["matches"].as_array().unwrap().len(), 0);
}

#[rocket::async_test]
async fn duplicate_swipes_are_rejected_and_leave_one_row() {
    let client = test_client().await;
    create_profile(&client, "alice", "SEEKER", &["rust"]).await;
    create_profile(&client, "bob", "RECRUITER", &[]).await;
    let job_id = post_job(&client, "bob", "Data Engineer").await;

    let (status, _) = swipe(&client, "alice", &job_id, "job", "right").await;
    assert_eq!(status, Status::Ok);

    // A second decision for the same target is rejected, even reversed.
    let (status, body) = swipe(&client, "alice", &job_id, "job", "left").await;
    assert_eq!(status, Status::Conflict);
    assert_eq!(body["error_code"], json!("DUPLICATE_SWIPE"));

    // The decided card no longer appears in the feed.
    let response = client
        .get("/api/jobs")
        .header(bearer("alice"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let feed: Value = response.into_json().await.unwrap();
    assert_eq!(feed["origin"], json!("live"));
    let ids: Vec<&str> = feed["cards"]
        .as_array()
        .unwrap()
        .iter()
        .map(|card| card["id"].as_str().unwrap())
        .collect();
    assert!(!ids.contains(&job_id.as_str()));
}

#[rocket::async_test]
async fn feeds_are_role_scoped() {
    let client = test_client().await;
    create_profile(&client, "alice", "SEEKER", &["rust"]).await;
    create_profile(&client, "bob", "RECRUITER", &[]).await;

    // A seeker cannot browse candidates.
    let response = client
        .get("/api/candidates")
        .header(bearer("alice"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["error_code"], json!("ROLE_MISMATCH"));

    // A recruiter sees seeker cards.
    let response = client
        .get("/api/candidates")
        .header(bearer("bob"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let feed: Value = response.into_json().await.unwrap();
    let ids: Vec<&str> = feed["cards"]
        .as_array()
        .unwrap()
        .iter()
        .map(|card| card["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, vec!["alice"]);
}

#[rocket::async_test]
async fn job_management_is_owner_scoped() {
    let client = test_client().await;
    create_profile(&client, "alice", "SEEKER", &["rust"]).await;
    create_profile(&client, "bob", "RECRUITER", &[]).await;
    create_profile(&client, "eve", "RECRUITER", &[]).await;
    let job_id = post_job(&client, "bob", "Backend Engineer").await;

    // Another recruiter cannot edit the listing.
    let response = client
        .put(format!("/api/jobs/{job_id}"))
        .header(bearer("eve"))
        .header(ContentType::JSON)
        .body(json!({ "title": "Hijacked" }).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Forbidden);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["error_code"], json!("NOT_JOB_OWNER"));

    // The owner's partial edit keeps untouched fields.
    let response = client
        .put(format!("/api/jobs/{job_id}"))
        .header(bearer("bob"))
        .header(ContentType::JSON)
        .body(json!({ "title": "Senior Backend Engineer" }).to_string())
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let job: Value = response.into_json().await.unwrap();
    assert_eq!(job["title"], json!("Senior Backend Engineer"));
    assert_eq!(job["company"], json!("Acme"));

    // Detail lookup works for any authenticated user; unknown ids are 404.
    let response = client
        .get(format!("/api/jobs/{job_id}"))
        .header(bearer("alice"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let response = client
        .get("/api/jobs/missing")
        .header(bearer("alice"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::NotFound);

    // Deletion is a soft close: the listing leaves the seeker feed.
    let response = client
        .delete(format!("/api/jobs/{job_id}"))
        .header(bearer("bob"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);

    let response = client
        .get("/api/jobs")
        .header(bearer("alice"))
        .dispatch()
        .await;
    let feed: Value = response.into_json().await.unwrap();
    assert_eq!(feed["count"], json!(0));
}

#[rocket::async_test]
async fn missing_or_invalid_tokens_are_unauthorized() {
    let client = test_client().await;

    let response = client.get("/api/matches").dispatch().await;
    assert_eq!(response.status(), Status::Unauthorized);
    let body: Value = response.into_json().await.unwrap();
    assert_eq!(body["error_code"], json!("UNAUTHORIZED"));

    let response = client
        .get("/api/matches")
        .header(Header::new("Authorization", "Bearer not-a-token"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Unauthorized);
}

#[rocket::async_test]
async fn profile_roundtrip_includes_seeker_card_data() {
    let client = test_client().await;
    create_profile(&client, "alice", "SEEKER", &["rust", "sql"]).await;

    let response = client
        .get("/api/auth/profile")
        .header(bearer("alice"))
        .dispatch()
        .await;
    assert_eq!(response.status(), Status::Ok);
    let profile: Value = response.into_json().await.unwrap();
    assert_eq!(profile["role"], json!("SEEKER"));
    assert_eq!(profile["seeker_profile"]["skills"], json!(["rust", "sql"]));
}

#[rocket::async_test]
async fn health_reports_auth_and_mode() {
    let client = test_client().await;

    let response = client.get("/api/health").dispatch().await;
    assert_eq!(response.status(), Status::Ok);
    let health: Value = response.into_json().await.unwrap();
    assert_eq!(health["status"], json!("ok"));
    assert_eq!(health["authenticated"], json!(false));
    assert_eq!(health["offline_mode"], json!(false));
}
