//! End-to-end HTTP tests over a real MongoDB.
//!
//! Each test uses its own throwaway database from `MONGO_TEST_URI` and returns
//! early when the variable is unset.

mod common;

use axum::http::StatusCode;
use axum::Router;
use chromance_core::campaigns::base_campaigns;
use chromance_core::progression::{NarrativePhase, CLIMAX_START};
use chromance_db::repositories::{CampaignRepo, NarrativeRepo, ProgressRepo, UserRepo};
use common::{
    body_json, delete_auth, get, get_auth, post_auth, post_json, post_json_auth, put_json_auth,
    FakeBackend, FakeEmbedder,
};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Sign up through the API and return the token response.
async fn signup(app: Router, email: &str) -> Value {
    let response = post_json(
        app,
        "/api/auth/signup",
        json!({ "name": "Kai Vega", "email": email, "password": "neon-rain-42" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

fn character_body(name: &str) -> Value {
    json!({
        "name": name,
        "race": "Humano",
        "class": "Netrunner",
        "attributes": { "strength": 6, "dexterity": 12, "intelligence": 16, "charisma": 11 }
    })
}

async fn create_character(app: Router, token: &str, name: &str) -> Value {
    let response = post_json_auth(app, "/api/characters", character_body(name), token).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

fn token_of(auth: &Value) -> String {
    auth["access_token"].as_str().unwrap().to_string()
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[tokio::test]
async fn signup_login_refresh_and_me() {
    let Some(db) = common::test_db().await else {
        return;
    };
    let app = common::build_test_app(db.clone(), FakeBackend::replying("ok"));

    let auth = signup(app.clone(), "  Kai@Chromance.io ").await;
    assert_eq!(auth["token_type"], "bearer");
    assert_eq!(auth["user"]["email"], "kai@chromance.io");
    assert!(auth["expires_in"].as_i64().unwrap() > 0);

    // Same email, different case: still a duplicate.
    let response = post_json(
        app.clone(),
        "/api/auth/signup",
        json!({ "name": "Other", "email": "KAI@chromance.io", "password": "another-pass" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = post_json(
        app.clone(),
        "/api/auth/login",
        json!({ "email": "kai@chromance.io", "password": "wrong-password" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json(
        app.clone(),
        "/api/auth/login",
        json!({ "email": "kai@chromance.io", "password": "neon-rain-42" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let login = body_json(response).await;

    let response = post_json(
        app.clone(),
        "/api/auth/refresh",
        json!({ "refresh_token": login["refresh_token"] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let refreshed = body_json(response).await;

    let response = get_auth(app, "/api/auth/me", &token_of(&refreshed)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["id"], auth["user"]["id"]);
    assert_eq!(me["name"], "Kai Vega");

    common::teardown(db).await;
}

#[tokio::test]
async fn deactivated_or_deleted_users_lose_access() {
    let Some(db) = common::test_db().await else {
        return;
    };
    let app = common::build_test_app(db.clone(), FakeBackend::replying("ok"));
    let auth = signup(app.clone(), "gone@chromance.io").await;
    let token = token_of(&auth);
    let user_id = auth["user"]["id"].as_str().unwrap();

    let response = get_auth(app.clone(), "/api/characters", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    UserRepo::set_active(&db, user_id, false).await.unwrap();
    for uri in ["/api/auth/me", "/api/characters", "/api/campaigns/active"] {
        let response = get_auth(app.clone(), uri, &token).await;
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "{uri}");
        assert_eq!(body_json(response).await["error"], "Account is deactivated");
    }

    // A well-signed token for an id that was never stored.
    let ghost = common::access_token("66a0c0ffee0000000000beef");
    let response = get_auth(app, "/api/characters", &ghost).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "User no longer exists");

    common::teardown(db).await;
}

// ---------------------------------------------------------------------------
// Characters
// ---------------------------------------------------------------------------

#[tokio::test]
async fn character_crud_is_owner_scoped() {
    let Some(db) = common::test_db().await else {
        return;
    };
    let app = common::build_test_app(db.clone(), FakeBackend::replying("ok"));
    let owner = token_of(&signup(app.clone(), "owner@chromance.io").await);
    let intruder = token_of(&signup(app.clone(), "intruder@chromance.io").await);

    let created = create_character(app.clone(), &owner, "Vex").await;
    let id = created["id"].as_str().unwrap().to_string();
    assert_eq!(created["level"], 1);
    assert_eq!(created["is_selected"], false);

    // Another user sees nothing.
    let response = get_auth(app.clone(), &format!("/api/characters/{id}"), &intruder).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = get_auth(app.clone(), "/api/characters", &intruder).await;
    assert_eq!(body_json(response).await["total"], 0);

    // Validation.
    let mut bad = character_body("Vex");
    bad["attributes"]["strength"] = json!(25);
    let response = post_json_auth(app.clone(), "/api/characters", bad, &owner).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response =
        put_json_auth(app.clone(), &format!("/api/characters/{id}"), json!({}), &owner).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(
        app.clone(),
        &format!("/api/characters/{id}"),
        json!({ "name": "Vex Prisma", "level": 3 }),
        &owner,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["name"], "Vex Prisma");
    assert_eq!(updated["level"], 3);
    assert_eq!(updated["race"], "Humano");

    // Selection is exclusive.
    let second = create_character(app.clone(), &owner, "Nyx").await;
    let second_id = second["id"].as_str().unwrap();
    post_auth(app.clone(), &format!("/api/characters/{id}/select"), &owner).await;
    let response = post_auth(app.clone(), &format!("/api/characters/{second_id}/select"), &owner).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = get_auth(app.clone(), "/api/characters/selected", &owner).await;
    assert_eq!(body_json(response).await["id"], second_id);

    let response = get_auth(app.clone(), "/api/characters?page=1&limit=1", &owner).await;
    let page = body_json(response).await;
    assert_eq!(page["total"], 2);
    assert_eq!(page["pages"], 2);
    assert_eq!(page["characters"].as_array().unwrap().len(), 1);

    // Delete hides the character.
    let response = delete_auth(app.clone(), &format!("/api/characters/{id}"), &owner).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let response = get_auth(app.clone(), &format!("/api/characters/{id}"), &owner).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let response = delete_auth(app, &format!("/api/characters/{id}"), &owner).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    common::teardown(db).await;
}

#[tokio::test]
async fn removing_an_unknown_inventory_item_is_not_found() {
    let Some(db) = common::test_db().await else {
        return;
    };
    let app = common::build_test_app(db.clone(), FakeBackend::replying("ok"));
    let token = token_of(&signup(app.clone(), "bag@chromance.io").await);
    let character = create_character(app.clone(), &token, "Vex").await;
    let id = character["id"].as_str().unwrap();

    let response = delete_auth(
        app,
        &format!("/api/characters/{id}/inventory/nao-existe"),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    common::teardown(db).await;
}

// ---------------------------------------------------------------------------
// Campaigns
// ---------------------------------------------------------------------------

#[tokio::test]
async fn campaign_catalog_merges_progress() {
    let Some(db) = common::test_db().await else {
        return;
    };
    CampaignRepo::replace_base(&db, base_campaigns()).await.unwrap();
    let app = common::build_test_app(db.clone(), FakeBackend::replying("ok"));
    let token = token_of(&signup(app.clone(), "player@chromance.io").await);
    let character = create_character(app.clone(), &token, "Vex").await;

    let response = get(app.clone(), "/api/campaigns").await;
    assert_eq!(response.status(), StatusCode::OK);
    let catalog = body_json(response).await;
    assert_eq!(catalog["total"], base_campaigns().len());
    assert!(catalog["campaigns"][0]["status"].is_null());

    let response = get_auth(app.clone(), "/api/campaigns/active", &token).await;
    assert!(body_json(response).await.is_null());

    let response = get(app.clone(), "/api/campaigns/nao-existe").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json_auth(
        app.clone(),
        "/api/campaigns/arena-sombras/start",
        json!({ "character_id": character["id"] }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let started = body_json(response).await;
    assert_eq!(started["status"], "in_progress");
    assert_eq!(started["active_character_name"], "Vex");

    let response = post_json_auth(
        app.clone(),
        "/api/campaigns/arena-sombras/battles",
        json!({ "won": true }),
        &token,
    )
    .await;
    let after_battle = body_json(response).await;
    assert_eq!(after_battle["battles_won"], 1);
    assert_eq!(after_battle["score"], 10);

    let response = get_auth(app.clone(), "/api/campaigns/active", &token).await;
    assert_eq!(body_json(response).await["campaign_id"], "arena-sombras");

    let response = post_auth(app.clone(), "/api/campaigns/arena-sombras/cancel", &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = get_auth(app.clone(), "/api/campaigns/active", &token).await;
    assert!(body_json(response).await.is_null());

    // Nothing to cancel any more.
    let response = post_auth(app, "/api/campaigns/laboratorio-cristais/cancel", &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    common::teardown(db).await;
}

#[tokio::test]
async fn campaign_chat_turn_records_progress_and_memory() {
    let Some(db) = common::test_db().await else {
        return;
    };
    CampaignRepo::replace_base(&db, base_campaigns()).await.unwrap();
    let backend = FakeBackend::replying(
        "Com um golpe preciso, você derrota o guarda sombrio.\nAÇÕES:\n1. Explorar a arena",
    );
    let app = common::build_test_app(db.clone(), backend.clone());
    let token = token_of(&signup(app.clone(), "narrator@chromance.io").await);
    let character = create_character(app.clone(), &token, "Vex").await;

    // Chat needs an in-progress campaign.
    let chat = json!({ "message": "Ataco o guarda", "campaign_id": "arena-sombras" });
    let response = post_json_auth(app.clone(), "/api/llm/chat", chat.clone(), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(backend.call_count(), 0);

    post_json_auth(
        app.clone(),
        "/api/campaigns/arena-sombras/start",
        json!({ "character_id": character["id"] }),
        &token,
    )
    .await;

    let response = post_json_auth(app.clone(), "/api/llm/chat", chat, &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let turn = body_json(response).await;
    assert_eq!(turn["success"], true);
    assert_eq!(turn["combat"], "won");
    assert_eq!(turn["progression"]["chapter"], 1);
    assert_eq!(turn["progression"]["interaction_count"], 1);
    assert_eq!(turn["chapter_completed"], false);
    assert_eq!(turn["contextual_actions"][0]["label"], "Explorar a arena");

    // The system prompt names the active character.
    let sent = backend.last_messages();
    assert!(sent[0].content.contains("Vex"));

    let response = get_auth(app.clone(), "/api/campaigns/arena-sombras", &token).await;
    let campaign = body_json(response).await;
    assert_eq!(campaign["interaction_count"], 1);
    assert_eq!(campaign["battles_won"], 1);

    let response = get_auth(app.clone(), "/api/campaigns/arena-sombras/history", &token).await;
    let history = body_json(response).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(
        history[0]["narrative"],
        "Com um golpe preciso, você derrota o guarda sombrio."
    );

    let response = get_auth(
        app.clone(),
        "/api/campaigns/arena-sombras/chapters/1/summary",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Completing the chapter by hand records its lore.
    let response = post_auth(
        app.clone(),
        "/api/campaigns/arena-sombras/chapters/1/complete",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let completed = body_json(response).await;
    assert_eq!(completed["chapters_completed"], json!([1]));

    let response = get(app, "/api/lore/summary").await;
    let lore = body_json(response).await;
    assert!(lore["total_items"].as_u64().unwrap() > 0);

    common::teardown(db).await;
}

#[tokio::test]
async fn cancelled_campaign_chapters_cannot_be_completed() {
    let Some(db) = common::test_db().await else {
        return;
    };
    CampaignRepo::replace_base(&db, base_campaigns()).await.unwrap();
    let app = common::build_test_app(db.clone(), FakeBackend::replying("ok"));
    let token = token_of(&signup(app.clone(), "quitter@chromance.io").await);
    let character = create_character(app.clone(), &token, "Vex").await;

    post_json_auth(
        app.clone(),
        "/api/campaigns/arena-sombras/start",
        json!({ "character_id": character["id"] }),
        &token,
    )
    .await;
    let response = post_auth(app.clone(), "/api/campaigns/arena-sombras/cancel", &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_auth(
        app.clone(),
        "/api/campaigns/arena-sombras/chapters/1/complete",
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(app, "/api/campaigns/arena-sombras", &token).await;
    let campaign = body_json(response).await;
    assert_eq!(campaign["status"], "cancelled");
    assert_eq!(campaign["chapters_completed"], json!([]));

    common::teardown(db).await;
}

#[tokio::test]
async fn climax_reward_completes_and_archives_the_chapter() {
    let Some(db) = common::test_db().await else {
        return;
    };
    CampaignRepo::replace_base(&db, base_campaigns()).await.unwrap();
    let backend =
        FakeBackend::replying("Com um último golpe, você conquista o Cubo das Sombras.");
    let app = common::build_test_app(db.clone(), backend);
    let auth = signup(app.clone(), "hero@chromance.io").await;
    let token = token_of(&auth);
    let user_id = auth["user"]["id"].as_str().unwrap();
    let character = create_character(app.clone(), &token, "Vex").await;
    let character_id = character["id"].as_str().unwrap();

    post_json_auth(
        app.clone(),
        "/api/campaigns/arena-sombras/start",
        json!({ "character_id": character_id }),
        &token,
    )
    .await;

    // Earlier turns of the chapter; the chat turn below is the first climax one.
    for _ in 1..CLIMAX_START {
        ProgressRepo::record_interaction(&db, user_id, "arena-sombras", NarrativePhase::Challenge)
            .await
            .unwrap()
            .unwrap();
    }

    let response = post_json_auth(
        app.clone(),
        "/api/llm/chat",
        json!({ "message": "Pego o cubo", "campaign_id": "arena-sombras" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let turn = body_json(response).await;
    assert_eq!(turn["success"], true);
    assert_eq!(turn["progression"]["interaction_count"], CLIMAX_START);
    assert_eq!(turn["progression"]["phase"], "climax");
    assert_eq!(turn["chapter_completed"], true);
    assert_eq!(turn["reward"]["name"], "Cubo das Sombras");
    let reward_id = turn["reward"]["id"].as_str().unwrap().to_string();

    let response = get_auth(
        app.clone(),
        &format!("/api/characters/{character_id}/inventory"),
        &token,
    )
    .await;
    let inventory = body_json(response).await;
    let items = inventory.as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["id"], reward_id.as_str());
    assert_eq!(items[0]["chapter"], 1);
    assert_eq!(items[0]["campaign_id"], "arena-sombras");

    let response = get_auth(app.clone(), "/api/campaigns/arena-sombras", &token).await;
    let campaign = body_json(response).await;
    assert_eq!(campaign["status"], "completed");
    assert_eq!(campaign["chapters_completed"], json!([1]));
    let progress = ProgressRepo::find(&db, user_id, "arena-sombras")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(progress.items_collected, vec![reward_id]);

    let response = get_auth(app, "/api/campaigns/arena-sombras/history", &token).await;
    assert!(body_json(response).await.as_array().unwrap().is_empty());

    let counts = NarrativeRepo::counts(&db).await.unwrap();
    assert_eq!(counts.current, 0);
    assert!(counts.archive >= 1);
    assert!(counts.lore > 0);

    common::teardown(db).await;
}

#[tokio::test]
async fn turns_are_kept_when_embeddings_fail() {
    let Some(db) = common::test_db().await else {
        return;
    };
    CampaignRepo::replace_base(&db, base_campaigns()).await.unwrap();
    let embedder = FakeEmbedder::failing();
    let app = common::build_test_app_with(
        db.clone(),
        FakeBackend::replying("A chuva ácida cai sobre a arena."),
        embedder.clone(),
    );
    let token = token_of(&signup(app.clone(), "offline@chromance.io").await);
    let character = create_character(app.clone(), &token, "Vex").await;
    post_json_auth(
        app.clone(),
        "/api/campaigns/arena-sombras/start",
        json!({ "character_id": character["id"] }),
        &token,
    )
    .await;

    let response = post_json_auth(
        app.clone(),
        "/api/llm/chat",
        json!({ "message": "Olho ao redor", "campaign_id": "arena-sombras" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["success"], true);
    assert!(embedder.call_count() > 0);

    let response = get_auth(app, "/api/campaigns/arena-sombras/history", &token).await;
    let history = body_json(response).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["narrative"], "A chuva ácida cai sobre a arena.");

    common::teardown(db).await;
}
