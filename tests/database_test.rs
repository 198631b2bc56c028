mod helpers;

use axum::http::{Method, StatusCode};
use chapterhub::models::user::Role;
use helpers::*;
use serde_json::json;
use sqlx::PgPool;

// These tests need a Postgres server: DATABASE_URL=... cargo test -- --ignored

// ============================================================================
// Auth
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_register_then_login(pool: PgPool) {
    let app = test_app(pool);

    let payload = json!({
        "name": "Asha Rao",
        "email": "Asha@Example.com",
        "password": "secret123",
        "business_category": "Interiors"
    });
    let (status, body) = send(&app, Method::POST, "/api/auth/register", None, Some(payload.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User created successfully!");

    let (status, body) = send(&app, Method::POST, "/api/auth/register", None, Some(payload)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "User already exists!");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "asha@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["role"], "member");
    assert_eq!(body["name"], "Asha Rao");
    assert!(body["token"].as_str().is_some_and(|t| t.split('.').count() == 3));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "asha@example.com", "password": "wrong-password" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials!");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(json!({ "email": "nobody@example.com", "password": "secret123" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid credentials!");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_self_registration_cannot_claim_admin(pool: PgPool) {
    let app = test_app(pool.clone());

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        None,
        Some(json!({
            "name": "Mallory",
            "email": "mallory@example.com",
            "password": "secret123",
            "role": "admin"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let admin = create_user(&pool, "Admin", "admin@example.com", Role::Admin).await;
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/register",
        Some(&bearer(&admin)),
        Some(json!({
            "name": "Second Admin",
            "email": "admin2@example.com",
            "password": "secret123",
            "role": "admin"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_member_cannot_use_admin_endpoints(pool: PgPool) {
    let app = test_app(pool.clone());
    let member = create_user(&pool, "Member", "member@example.com", Role::Member).await;
    let other = create_user(&pool, "Other", "other@example.com", Role::Member).await;
    let auth = bearer(&member);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/api/users/{}", other.id),
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Admin access required");

    let (status, _) = send(&app, Method::GET, "/api/analytics", Some(&auth), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/users/{}", other.id),
        Some(&auth),
        Some(json!({ "name": "Hijacked" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["message"], "Permission denied");
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_deleted_user_token_is_rejected(pool: PgPool) {
    let app = test_app(pool.clone());
    let admin = create_user(&pool, "Admin", "admin@example.com", Role::Admin).await;
    let member = create_user(&pool, "Member", "member@example.com", Role::Member).await;

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/users/{}", member.id),
        Some(&bearer(&admin)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/api/referrals", Some(&bearer(&member)), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is invalid!");
}

// ============================================================================
// Referrals & revenue
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_referral_flow_and_visibility(pool: PgPool) {
    let app = test_app(pool.clone());
    let giver = create_user(&pool, "Giver", "giver@example.com", Role::Member).await;
    let receiver = create_user(&pool, "Receiver", "receiver@example.com", Role::Member).await;
    let outsider = create_user(&pool, "Outsider", "outsider@example.com", Role::Member).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/referrals",
        Some(&bearer(&giver)),
        Some(json!({
            "to_member": receiver.id.to_string(),
            "contact_name": "Ravi",
            "phone": "9876543210",
            "type": "Others"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let referral_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/api/referrals/{}", referral_id),
        Some(&bearer(&receiver)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "Open");
    assert_eq!(body["_id"], referral_id.as_str());
    assert_eq!(body["from_member"], giver.id.to_string());
    assert_eq!(body["to_member"], receiver.id.to_string());

    let (_, listed) = send(&app, Method::GET, "/api/referrals", Some(&bearer(&giver)), None).await;
    assert_eq!(listed[0]["id"], referral_id.as_str());
    assert_eq!(listed[0]["_id"], referral_id.as_str());
    assert_eq!(listed[0]["from_member"], giver.id.to_string());

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/referrals/{}", referral_id),
        Some(&bearer(&outsider)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, listed) = send(&app, Method::GET, "/api/referrals", Some(&bearer(&outsider)), None).await;
    assert_eq!(listed.as_array().unwrap().len(), 0);

    let (_, notifications) =
        send(&app, Method::GET, "/api/notifications", Some(&bearer(&receiver)), None).await;
    let notifications = notifications.as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["type"], "referral");

    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/referrals/{}/close", referral_id),
        Some(&bearer(&receiver)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/referrals/{}", referral_id),
        Some(&bearer(&receiver)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/referrals/{}", referral_id),
        Some(&bearer(&giver)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        Method::GET,
        &format!("/api/referrals/{}", referral_id),
        Some(&bearer(&giver)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_thank_you_slip_validation_and_totals(pool: PgPool) {
    let app = test_app(pool.clone());
    let admin = create_user(&pool, "Admin", "admin@example.com", Role::Admin).await;
    let giver = create_user(&pool, "Giver", "giver@example.com", Role::Member).await;
    let recorder = create_user(&pool, "Recorder", "recorder@example.com", Role::Member).await;
    let auth = bearer(&recorder);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/revenue",
        Some(&auth),
        Some(json!({ "amount": 0, "member_id": giver.id.to_string() })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/revenue",
        Some(&auth),
        Some(json!({ "amount": 100, "member_id": uuid::Uuid::new_v4().to_string() })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for (amount, date) in [(1500.0, "2024-01-10"), (500.0, "2024-01-20"), (250.0, "2024-03-05")] {
        let (status, _) = send(
            &app,
            Method::POST,
            "/api/revenue",
            Some(&auth),
            Some(json!({
                "amount": amount,
                "member_id": giver.id.to_string(),
                "notes": "Closed deal",
                "date": date
            })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (_, notifications) =
        send(&app, Method::GET, "/api/notifications", Some(&bearer(&giver)), None).await;
    assert_eq!(notifications.as_array().unwrap().len(), 3);
    assert_eq!(notifications[0]["type"], "thank_you");

    // Rejected slips leave neither a revenue row nor a notification behind
    let (slips,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM revenue")
        .fetch_one(&pool)
        .await
        .unwrap();
    let (notes,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM notifications WHERE notification_type = 'thank_you'")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!((slips, notes), (3, 3));

    let (status, body) = send(&app, Method::GET, "/api/revenue/total", Some(&bearer(&admin)), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 2250.0);

    let (_, monthly) = send(&app, Method::GET, "/api/revenue/monthly", Some(&bearer(&admin)), None).await;
    assert_eq!(monthly["January"], 2000.0);
    assert_eq!(monthly["March"], 250.0);

    let (_, filtered) = send(
        &app,
        Method::GET,
        "/api/revenue?startDate=2024-01-15&endDate=2024-02-28",
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(filtered.as_array().unwrap().len(), 1);
    assert_eq!(filtered[0]["_id"], filtered[0]["id"]);
    assert_eq!(filtered[0]["amount"], 500.0);

    let (status, _) = send(&app, Method::GET, "/api/revenue/total", Some(&auth), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ============================================================================
// Meetings, events, guests
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_meeting_registration_lifecycle(pool: PgPool) {
    let app = test_app(pool.clone());
    let admin = create_user(&pool, "Admin", "admin@example.com", Role::Admin).await;
    let member = create_user(&pool, "Member", "member@example.com", Role::Member).await;
    let auth = bearer(&member);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/meetings",
        Some(&bearer(&admin)),
        Some(json!({ "title": "No date" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/meetings",
        Some(&bearer(&admin)),
        Some(json!({ "title": "Weekly", "date": "2024-05-01", "time": "07:30" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();
    let register = format!("/api/meetings/{}/register", id);
    let cancel = format!("/api/meetings/{}/cancel", id);

    let (status, _) = send(&app, Method::POST, &register, Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, Method::POST, &register, Some(&auth), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Already registered");

    let (_, meeting) = send(&app, Method::GET, &format!("/api/meetings/{}", id), Some(&auth), None).await;
    assert_eq!(meeting["attendee_count"], 1);
    assert_eq!(meeting["date_time"], "2024-05-01T07:30");
    assert_eq!(meeting["organized_by"], admin.id.to_string());

    let (status, _) = send(&app, Method::POST, &cancel, Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, Method::POST, &cancel, Some(&auth), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Not registered");

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/meetings/{}", id),
        Some(&bearer(&admin)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, Method::POST, &register, Some(&auth), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_event_registered_members(pool: PgPool) {
    let app = test_app(pool.clone());
    let admin = create_user(&pool, "Admin", "admin@example.com", Role::Admin).await;
    let member = create_user(&pool, "Member", "member@example.com", Role::Member).await;

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/events",
        Some(&bearer(&admin)),
        Some(json!({ "title": "Annual Meet", "date": "2024-12-01" })),
    )
    .await;
    let id = body["id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/events/{}/register", id),
        Some(&bearer(&member)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, events) = send(&app, Method::GET, "/api/events", Some(&bearer(&member)), None).await;
    assert_eq!(events[0]["registered_members"], json!([member.id.to_string()]));
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_guests_are_private_to_inviter(pool: PgPool) {
    let app = test_app(pool.clone());
    let host = create_user(&pool, "Host", "host@example.com", Role::Member).await;
    let other = create_user(&pool, "Other", "other@example.com", Role::Member).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/guests",
        Some(&bearer(&host)),
        Some(json!({ "name": "Visitor" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/guests",
        Some(&bearer(&host)),
        Some(json!({ "name": "Visitor", "phone": "9000011111" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let uri = format!("/api/guests/{}", body["guest_id"].as_str().unwrap());

    let (status, _) = send(&app, Method::GET, &uri, Some(&bearer(&other)), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::PUT,
        &uri,
        Some(&bearer(&host)),
        Some(json!({ "status": "Follow-up" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, guest) = send(&app, Method::GET, &uri, Some(&bearer(&host)), None).await;
    assert_eq!(guest["status"], "Follow-up");
}

// ============================================================================
// Broadcasts & analytics
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_broadcast_reaches_group(pool: PgPool) {
    let app = test_app(pool.clone());
    let admin = create_user(&pool, "Admin", "admin@example.com", Role::Admin).await;
    let first = create_user(&pool, "First", "first@example.com", Role::Member).await;
    create_user(&pool, "Second", "second@example.com", Role::Member).await;

    let content = "The venue for next week's meeting has changed to the community hall.";
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/notifications/broadcast",
        Some(&bearer(&admin)),
        Some(json!({ "subject": "Venue", "content": content, "recipientGroup": "member" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Broadcast sent to 2 members");

    let (_, notifications) =
        send(&app, Method::GET, "/api/notifications", Some(&bearer(&first)), None).await;
    let message = notifications[0]["message"].as_str().unwrap();
    assert!(message.starts_with("Venue: The venue"));
    assert!(message.ends_with("..."));

    let (_, admin_inbox) =
        send(&app, Method::GET, "/api/notifications", Some(&bearer(&admin)), None).await;
    assert_eq!(admin_inbox.as_array().unwrap().len(), 0);

    let (_, broadcasts) = send(
        &app,
        Method::GET,
        "/api/notifications/broadcasts",
        Some(&bearer(&admin)),
        None,
    )
    .await;
    assert_eq!(broadcasts[0]["recipient_count"], 2);
    assert_eq!(broadcasts[0]["role"], "member");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/notifications/broadcast",
        Some(&bearer(&admin)),
        Some(json!({ "subject": "Hi", "content": "x", "recipientGroup": "vip" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_engagement_ranking(pool: PgPool) {
    let app = test_app(pool.clone());
    let admin = create_user(&pool, "Admin", "admin@example.com", Role::Admin).await;
    let busy = create_user(&pool, "Busy", "busy@example.com", Role::Member).await;
    let quiet = create_user(&pool, "Quiet", "quiet@example.com", Role::Member).await;

    for _ in 0..3 {
        send(
            &app,
            Method::POST,
            "/api/referrals",
            Some(&bearer(&busy)),
            Some(json!({ "to_member": quiet.id.to_string(), "contact_name": "Lead" })),
        )
        .await;
    }
    send(
        &app,
        Method::POST,
        "/api/one-to-ones",
        Some(&bearer(&busy)),
        Some(json!({ "with_member_id": quiet.id.to_string(), "date": "2024-04-01" })),
    )
    .await;

    let (status, ranked) = send(
        &app,
        Method::GET,
        "/api/analytics/engagement",
        Some(&bearer(&admin)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let ranked = ranked.as_array().unwrap();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0]["name"], "Busy");
    assert_eq!(ranked[0]["points"], 3 * 2 + 3);
    assert_eq!(ranked[0]["status"], "Growing");
    assert_eq!(ranked[1]["points"], 3);
    assert_eq!(ranked[1]["status"], "Inactive");

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/analytics?filter=lifetime",
        Some(&bearer(&admin)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["summary"]["referrals_given"], 3);
    assert_eq!(body["summary"]["member_growth"], 3);
}

// ============================================================================
// Request shapes
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_trailing_slash_is_ignored(pool: PgPool) {
    let app = test_app(pool.clone());
    let member = create_user(&pool, "Member", "member@example.com", Role::Member).await;
    let auth = bearer(&member);

    for uri in ["/api/revenue/", "/api/referrals/", "/api/notifications/"] {
        let (status, body) = send(&app, Method::GET, uri, Some(&auth), None).await;
        assert_eq!(status, StatusCode::OK, "{}", uri);
        assert!(body.is_array(), "{}", uri);
    }
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_overlong_value_is_bad_request(pool: PgPool) {
    let app = test_app(pool.clone());
    let host = create_user(&pool, "Host", "host@example.com", Role::Member).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/guests",
        Some(&bearer(&host)),
        Some(json!({ "name": "Visitor", "phone": "+91 98450 12345 ext 1234" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Value is too long");

    let (_, guests) = send(&app, Method::GET, "/api/guests", Some(&bearer(&host)), None).await;
    assert_eq!(guests.as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_blank_and_malformed_parameters(pool: PgPool) {
    let app = test_app(pool.clone());
    let admin = create_user(&pool, "Admin", "admin@example.com", Role::Admin).await;
    let member = create_user(&pool, "Member", "member@example.com", Role::Member).await;
    let auth = bearer(&member);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/revenue?member_id=&startDate=&endDate=&category=&filter=6m",
        Some(&auth),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_array());

    let (status, body) = send(&app, Method::GET, "/api/revenue?startDate=yesterday", Some(&auth), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid startDate");

    let (status, body) = send(&app, Method::GET, "/api/revenue?member_id=42", Some(&auth), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid member_id");

    let (status, body) = send(&app, Method::GET, "/api/referrals/not-a-uuid", Some(&auth), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].is_string());

    let admin_auth = bearer(&admin);
    let (status, _) = send(&app, Method::GET, "/api/analytics?filter=", Some(&admin_auth), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::GET, "/api/analytics?filter=3m", Some(&admin_auth), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid filter");
}

// ============================================================================
// Profiles & passwords
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_change_password(pool: PgPool) {
    let app = test_app(pool.clone());
    let member = create_user(&pool, "Member", "member@example.com", Role::Member).await;
    let auth = bearer(&member);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/change-password",
        Some(&auth),
        Some(json!({ "current_password": "not-it", "new_password": "fresh-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Incorrect current password");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/auth/change-password",
        Some(&auth),
        Some(json!({ "current_password": TEST_PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Missing fields");

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/auth/change-password",
        Some(&auth),
        Some(json!({ "current_password": TEST_PASSWORD, "new_password": "fresh-pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let login = |password: &str| json!({ "email": "member@example.com", "password": password });

    let (status, _) = send(&app, Method::POST, "/api/auth/login", None, Some(login(TEST_PASSWORD))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::POST, "/api/auth/login", None, Some(login("fresh-pass"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], member.id.to_string());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_profile_edits_self_versus_admin(pool: PgPool) {
    let app = test_app(pool.clone());
    let admin = create_user(&pool, "Admin", "admin@example.com", Role::Admin).await;
    let member = create_user(&pool, "Member", "member@example.com", Role::Member).await;
    let own = format!("/api/users/{}", member.id);

    let (status, _) = send(
        &app,
        Method::PUT,
        &own,
        Some(&bearer(&member)),
        Some(json!({ "name": "Member Renamed", "business_name": "Rao Interiors", "role": "admin" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, profile) = send(&app, Method::GET, &own, Some(&bearer(&member)), None).await;
    assert_eq!(profile["name"], "Member Renamed");
    assert_eq!(profile["business_name"], "Rao Interiors");
    assert_eq!(profile["role"], "member");
    assert!(profile.get("password_hash").is_none());

    let (status, body) = send(&app, Method::PUT, &own, Some(&bearer(&member)), Some(json!({ "name": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "name cannot be blank");

    let (status, _) = send(&app, Method::DELETE, &own, Some(&bearer(&member)), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = send(&app, Method::PUT, &own, Some(&bearer(&admin)), Some(json!({ "role": "admin" }))).await;
    assert_eq!(status, StatusCode::OK);
    let (_, profile) = send(&app, Method::GET, &own, Some(&bearer(&admin)), None).await;
    assert_eq!(profile["role"], "admin");

    let (status, _) = send(&app, Method::DELETE, &own, Some(&bearer(&admin)), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::DELETE, &own, Some(&bearer(&admin)), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_member_search(pool: PgPool) {
    let app = test_app(pool.clone());
    let member = create_user(&pool, "Asha Rao", "asha@example.com", Role::Member).await;
    create_user(&pool, "Vikram Shetty", "vikram@example.com", Role::Member).await;
    let auth = bearer(&member);

    let (status, found) = send(&app, Method::GET, "/api/search?q=shet", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    let found = found.as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["name"], "Vikram Shetty");

    let (_, by_email) = send(&app, Method::GET, "/api/search?q=ASHA@", Some(&auth), None).await;
    assert_eq!(by_email[0]["email"], "asha@example.com");

    let (_, everyone) = send(&app, Method::GET, "/api/search?q=consult", Some(&auth), None).await;
    assert_eq!(everyone.as_array().unwrap().len(), 2);

    let (_, wildcard) = send(&app, Method::GET, "/api/search?q=%25", Some(&auth), None).await;
    assert_eq!(wildcard.as_array().unwrap().len(), 0);

    let (status, blank) = send(&app, Method::GET, "/api/search?q=", Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(blank, json!([]));
}

// ============================================================================
// Learning credits & notifications
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_learning_credits(pool: PgPool) {
    let app = test_app(pool.clone());
    let member = create_user(&pool, "Member", "member@example.com", Role::Member).await;
    let other = create_user(&pool, "Other", "other@example.com", Role::Member).await;
    let auth = bearer(&member);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/learning",
        Some(&auth),
        Some(json!({ "topic": "Negotiation", "duration_hours": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "duration_hours must be greater than zero");

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/learning",
        Some(&auth),
        Some(json!({ "topic": "Negotiation", "source": "Book", "duration_hours": 2.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let credit_id = body["credit_id"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/learning",
        Some(&auth),
        Some(json!({ "topic": "Referral etiquette", "duration_hours": 1.0, "date": "2024-02-02" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, credits) = send(&app, Method::GET, "/api/learning", Some(&auth), None).await;
    let credits = credits.as_array().unwrap();
    assert_eq!(credits.len(), 2);
    assert!(credits.iter().any(|c| c["source"] == "Other"));

    let (_, summary) = send(&app, Method::GET, "/api/learning/summary", Some(&auth), None).await;
    assert_eq!(summary["credits"], 2);
    assert_eq!(summary["total_hours"], 3.5);

    let (_, empty) = send(&app, Method::GET, "/api/learning/summary", Some(&bearer(&other)), None).await;
    assert_eq!(empty["credits"], 0);
    assert_eq!(empty["total_hours"], 0.0);

    let uri = format!("/api/learning/{}", credit_id);
    let (status, _) = send(&app, Method::DELETE, &uri, Some(&bearer(&other)), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::DELETE, &uri, Some(&auth), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, summary) = send(&app, Method::GET, "/api/learning/summary", Some(&auth), None).await;
    assert_eq!(summary["credits"], 1);
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_notification_read_is_owner_only(pool: PgPool) {
    let app = test_app(pool.clone());
    let giver = create_user(&pool, "Giver", "giver@example.com", Role::Member).await;
    let receiver = create_user(&pool, "Receiver", "receiver@example.com", Role::Member).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/referrals",
        Some(&bearer(&giver)),
        Some(json!({ "to_member": receiver.id.to_string(), "contact_name": "Ravi" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, inbox) = send(&app, Method::GET, "/api/notifications", Some(&bearer(&receiver)), None).await;
    assert_eq!(inbox[0]["read_status"], false);
    let uri = format!("/api/notifications/{}/read", inbox[0]["id"].as_str().unwrap());

    let (status, body) = send(&app, Method::PUT, &uri, Some(&bearer(&giver)), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Notification not found");

    let (status, _) = send(&app, Method::PUT, &uri, Some(&bearer(&receiver)), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, inbox) = send(&app, Method::GET, "/api/notifications", Some(&bearer(&receiver)), None).await;
    assert_eq!(inbox[0]["read_status"], true);
}

// ============================================================================
// Round trips
// ============================================================================

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_meeting_and_guest_round_trip(pool: PgPool) {
    let app = test_app(pool.clone());
    let admin = create_user(&pool, "Admin", "admin@example.com", Role::Admin).await;
    let member = create_user(&pool, "Member", "member@example.com", Role::Member).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/meetings",
        Some(&bearer(&admin)),
        Some(json!({
            "title": "Online Mixer",
            "date": "2024-06-12",
            "time": "18:00",
            "location": "Zoom",
            "meeting_mode": "Online",
            "meet_link": "https://meet.example.com/mixer",
            "fee": 150.0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();

    let (status, meeting) = send(
        &app,
        Method::GET,
        &format!("/api/meetings/{}", id),
        Some(&bearer(&member)),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(meeting["_id"], id.as_str());
    assert_eq!(meeting["title"], "Online Mixer");
    assert_eq!(meeting["location"], "Zoom");
    assert_eq!(meeting["meeting_mode"], "Online");
    assert_eq!(meeting["meet_link"], "https://meet.example.com/mixer");
    assert_eq!(meeting["fee"], 150.0);
    assert_eq!(meeting["date_time"], "2024-06-12T18:00");
    assert_eq!(meeting["participants"], json!([]));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/guests",
        Some(&bearer(&member)),
        Some(json!({
            "name": "Neha",
            "email": "neha@example.com",
            "phone": "9000022222",
            "visit_date": "2024-06-19",
            "notes": "Caterer"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let guest_id = body["guest_id"].as_str().unwrap().to_string();

    let (_, guests) = send(&app, Method::GET, "/api/guests", Some(&bearer(&member)), None).await;
    let guest = &guests[0];
    assert_eq!(guest["id"], guest_id.as_str());
    assert_eq!(guest["name"], "Neha");
    assert_eq!(guest["email"], "neha@example.com");
    assert_eq!(guest["visit_date"], "2024-06-19");
    assert_eq!(guest["status"], "Invited");
    assert_eq!(guest["invited_by"], member.id.to_string());
}

#[sqlx::test(migrations = "./migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_analytics_overview(pool: PgPool) {
    let app = test_app(pool.clone());
    let admin = create_user(&pool, "Admin", "admin@example.com", Role::Admin).await;
    let giver = create_user(&pool, "Giver", "giver@example.com", Role::Member).await;
    let receiver = create_user(&pool, "Receiver", "receiver@example.com", Role::Member).await;

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/referrals",
        Some(&bearer(&giver)),
        Some(json!({ "to_member": receiver.id.to_string(), "contact_name": "Lead" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/revenue",
        Some(&bearer(&receiver)),
        Some(json!({ "amount": 1200, "member_id": giver.id.to_string() })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = send(&app, Method::GET, "/api/analytics", Some(&bearer(&admin)), None).await;
    assert_eq!(status, StatusCode::OK);

    let summary = &body["summary"];
    assert_eq!(summary["referrals_given"], 1);
    assert_eq!(summary["referrals_received"], 1);
    assert_eq!(summary["revenue_generated"], 1200.0);
    assert_eq!(summary["meetings_attended"], 0);
    assert_eq!(summary["events_participation"], 0);
    assert_eq!(summary["member_growth"], 3);

    let growth = body["growth_chart"].as_array().unwrap();
    assert_eq!(growth.len(), 1);
    assert_eq!(growth[0]["value"], 3);
    assert!(growth[0]["label"].is_string());

    let performance = body["performance_chart"].as_array().unwrap();
    assert_eq!(performance.len(), 1);
    assert_eq!(performance[0]["referrals"], 1);
    assert_eq!(performance[0]["revenue"], 1200.0);
    assert_eq!(performance[0]["month"], growth[0]["label"]);
}
