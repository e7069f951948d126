//! Integration tests for hazard-admin endpoints
//!
//! Each test builds the full router over a fresh in-memory database seeded
//! with the reference hazard types, levels and categories.

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use hazard_admin::{build_router, AppState};
use hazard_common::db::prepare_database;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot` method

/// Test helper: in-memory database with schema and reference data
///
/// A single connection keeps every query on the same in-memory database.
async fn setup_test_db() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .expect("Should open in-memory database");

    prepare_database(&pool)
        .await
        .expect("Should prepare database");
    pool
}

fn setup_app(db: &SqlitePool) -> Router {
    build_router(AppState::new(db.clone()))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Form POST; repeated keys are kept in order
fn post_form(uri: &str, fields: &[(&str, &str)]) -> Request<Body> {
    let body = serde_urlencoded::to_string(fields).expect("Form fields should encode");

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body))
        .unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body");
    String::from_utf8(bytes.to_vec()).expect("Body should be UTF-8")
}

fn location(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .expect("Redirect should carry a Location header")
        .to_str()
        .unwrap()
        .to_string()
}

/// Create a recommendation through the "new" form, returning its id
async fn create_rec(db: &SqlitePool, text: &str, tokens: &[&str]) -> i64 {
    let mut fields = vec![("text", text)];
    fields.extend(tokens.iter().map(|t| ("associations", *t)));

    let response = setup_app(db)
        .oneshot(post_form("/technical_rec/new", &fields))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    location(&response)
        .trim_start_matches("/technical_rec/")
        .parse()
        .expect("Location should end with the new id")
}

async fn category_id(db: &SqlitePool, hazard_type: &str, hazard_level: &str) -> i64 {
    sqlx::query_scalar(
        r#"
        SELECT c.id FROM hazard_categories c
        JOIN hazard_types t ON t.id = c.hazard_type_id
        JOIN hazard_levels l ON l.id = c.hazard_level_id
        WHERE t.mnemonic = ? AND l.mnemonic = ?
        "#,
    )
    .bind(hazard_type)
    .bind(hazard_level)
    .fetch_one(db)
    .await
    .unwrap()
}

/// (association id, recommendation id, order) for a category, by order
async fn category_associations(db: &SqlitePool, category_id: i64) -> Vec<(i64, i64, i64)> {
    sqlx::query_as(
        r#"
        SELECT id, technicalrecommendation_id, "order"
        FROM hazardcategory_technicalrecommendation
        WHERE hazardcategory_id = ?
        ORDER BY "order", id
        "#,
    )
    .bind(category_id)
    .fetch_all(db)
    .await
    .unwrap()
}

/// (association id, category id, order) for a recommendation, by id
async fn rec_associations(db: &SqlitePool, rec_id: i64) -> Vec<(i64, i64, i64)> {
    sqlx::query_as(
        r#"
        SELECT id, hazardcategory_id, "order"
        FROM hazardcategory_technicalrecommendation
        WHERE technicalrecommendation_id = ?
        ORDER BY id
        "#,
    )
    .bind(rec_id)
    .fetch_all(db)
    .await
    .unwrap()
}

async fn rec_text(db: &SqlitePool, rec_id: i64) -> String {
    sqlx::query_scalar("SELECT text FROM technical_recommendations WHERE id = ?")
        .bind(rec_id)
        .fetch_one(db)
        .await
        .unwrap()
}

// =============================================================================
// Health and index
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let db = setup_test_db().await;
    let response = setup_app(&db).oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "hazard-admin");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_index_lists_every_category() {
    let db = setup_test_db().await;
    let response = setup_app(&db).oneshot(get("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains("FL - HIG"));
    assert!(html.contains("WF - VLO"));
    assert!(html.contains(r#"href="/EQ/MED""#));
}

// =============================================================================
// Hazard category editor
// =============================================================================

#[tokio::test]
async fn test_category_page_lists_associations_in_order() {
    let db = setup_test_db().await;
    create_rec(&db, "Raise floor levels", &["FL - HIG"]).await;
    create_rec(&db, "Keep drains clear", &["FL - HIG"]).await;

    let response = setup_app(&db).oneshot(get("/FL/HIG")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    let first = html.find("Raise floor levels").expect("first recommendation listed");
    let second = html.find("Keep drains clear").expect("second recommendation listed");
    assert!(first < second);
    assert!(html.contains(r#"action="/FL/HIG""#));
}

#[tokio::test]
async fn test_category_page_not_found() {
    let db = setup_test_db().await;

    for uri in ["/ZZ/HIG", "/FL/XXX"] {
        let response = setup_app(&db).oneshot(get(uri)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[tokio::test]
async fn test_category_update_general_recommendation() {
    let db = setup_test_db().await;
    let id = category_id(&db, "EQ", "MED").await;
    let id_str = id.to_string();

    let response = setup_app(&db)
        .oneshot(post_form(
            "/EQ/MED",
            &[("id", id_str.as_str()), ("general_recommendation", "Retrofit schools")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/EQ/MED");

    let text: String =
        sqlx::query_scalar("SELECT general_recommendation FROM hazard_categories WHERE id = ?")
            .bind(id)
            .fetch_one(&db)
            .await
            .unwrap();
    assert_eq!(text, "Retrofit schools");

    // Absent field overwrites with an empty string
    let response = setup_app(&db)
        .oneshot(post_form("/EQ/MED", &[("id", id_str.as_str())]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let text: String =
        sqlx::query_scalar("SELECT general_recommendation FROM hazard_categories WHERE id = ?")
            .bind(id)
            .fetch_one(&db)
            .await
            .unwrap();
    assert_eq!(text, "");
}

#[tokio::test]
async fn test_category_update_rejects_unknown_path_before_writing() {
    let db = setup_test_db().await;
    let id = category_id(&db, "FL", "HIG").await;
    let id_str = id.to_string();

    for uri in ["/%0A/HIG", "/ZZ/HIG", "/FL/XXX"] {
        let response = setup_app(&db)
            .oneshot(post_form(
                uri,
                &[("id", id_str.as_str()), ("general_recommendation", "changed")],
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
    }

    let text: String =
        sqlx::query_scalar("SELECT general_recommendation FROM hazard_categories WHERE id = ?")
            .bind(id)
            .fetch_one(&db)
            .await
            .unwrap();
    assert_eq!(text, "");
}

#[tokio::test]
async fn test_category_update_redirects_to_stored_category() {
    let db = setup_test_db().await;
    let id = category_id(&db, "TS", "VLO").await.to_string();

    let response = setup_app(&db)
        .oneshot(post_form("/TS/VLO", &[("id", id.as_str())]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/TS/VLO");
}

#[tokio::test]
async fn test_category_update_unknown_id() {
    let db = setup_test_db().await;
    let response = setup_app(&db)
        .oneshot(post_form("/FL/HIG", &[("id", "999999")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_category_update_non_numeric_association() {
    let db = setup_test_db().await;
    let id = category_id(&db, "FL", "HIG").await.to_string();

    let response = setup_app(&db)
        .oneshot(post_form("/FL/HIG", &[("id", id.as_str()), ("associations", "abc")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_resequencing_is_idempotent() {
    let db = setup_test_db().await;
    for text in ["A", "B", "C"] {
        create_rec(&db, text, &["FL - HIG"]).await;
    }
    let category = category_id(&db, "FL", "HIG").await;
    let before = category_associations(&db, category).await;

    let id = category.to_string();
    let ids: Vec<String> = before.iter().map(|(aid, _, _)| aid.to_string()).collect();
    let mut fields = vec![("id", id.as_str())];
    fields.extend(ids.iter().map(|aid| ("associations", aid.as_str())));

    let response = setup_app(&db)
        .oneshot(post_form("/FL/HIG", &fields))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    assert_eq!(category_associations(&db, category).await, before);
}

#[tokio::test]
async fn test_resequencing_follows_submission_order() {
    let db = setup_test_db().await;
    for text in ["A", "B", "C"] {
        create_rec(&db, text, &["UF - LOW"]).await;
    }
    let category = category_id(&db, "UF", "LOW").await;
    let assoc_ids: Vec<i64> = category_associations(&db, category)
        .await
        .into_iter()
        .map(|(aid, _, _)| aid)
        .collect();

    let permutations = [
        [0, 1, 2],
        [0, 2, 1],
        [1, 0, 2],
        [1, 2, 0],
        [2, 0, 1],
        [2, 1, 0],
    ];

    for permutation in permutations {
        let submitted: Vec<String> = permutation.iter().map(|&i| assoc_ids[i].to_string()).collect();
        let id = category.to_string();
        let mut fields = vec![("id", id.as_str())];
        fields.extend(submitted.iter().map(|aid| ("associations", aid.as_str())));

        let response = setup_app(&db)
            .oneshot(post_form("/UF/LOW", &fields))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);

        for (position, &index) in permutation.iter().enumerate() {
            let order: i64 = sqlx::query_scalar(
                r#"SELECT "order" FROM hazardcategory_technicalrecommendation WHERE id = ?"#,
            )
            .bind(assoc_ids[index])
            .fetch_one(&db)
            .await
            .unwrap();
            assert_eq!(order, position as i64 + 1, "permutation {:?}", permutation);
        }
    }
}

// =============================================================================
// Technical recommendation editor
// =============================================================================

#[tokio::test]
async fn test_new_form_targets_create_endpoint() {
    let db = setup_test_db().await;
    let response = setup_app(&db)
        .oneshot(get("/technical_rec/new"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;
    assert!(html.contains(r#"action="/technical_rec/new""#));
    assert!(html.contains(r#"value="CY - VLO""#));
    assert!(!html.contains(" checked"));
}

#[tokio::test]
async fn test_round_trip_create() {
    let db = setup_test_db().await;
    let id = create_rec(&db, "Build levees", &["FL - HIG"]).await;

    let response = setup_app(&db)
        .oneshot(get(&format!("/technical_rec/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Build levees"));
    assert!(html.contains(&format!(r#"action="/technical_rec/{}""#, id)));
    assert!(html.contains(r#"value="FL - HIG" checked"#));
    assert_eq!(html.matches(" checked").count(), 1);

    let links = rec_associations(&db, id).await;
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].1, category_id(&db, "FL", "HIG").await);
}

#[tokio::test]
async fn test_edit_unknown_recommendation_not_found() {
    let db = setup_test_db().await;

    let response = setup_app(&db)
        .oneshot(get("/technical_rec/999999"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = setup_app(&db)
        .oneshot(post_form("/technical_rec/999999", &[("text", "x")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_recommendation_id_not_found() {
    let db = setup_test_db().await;

    let response = setup_app(&db)
        .oneshot(get("/technical_rec/abc"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = setup_app(&db)
        .oneshot(post_form("/technical_rec/abc", &[("text", "x")]))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM technical_recommendations")
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_removal_keeps_remaining_links() {
    let db = setup_test_db().await;
    create_rec(&db, "Other", &["FL - HIG"]).await;
    let id = create_rec(&db, "Build levees", &["FL - HIG", "FL - MED"]).await;

    let fl_hig = category_id(&db, "FL", "HIG").await;
    let before = rec_associations(&db, id).await;
    let kept = before.iter().find(|(_, cat, _)| *cat == fl_hig).cloned().unwrap();
    assert_eq!(kept.2, 2);

    let response = setup_app(&db)
        .oneshot(post_form(
            &format!("/technical_rec/{}", id),
            &[("text", "Build levees"), ("associations", "FL - HIG")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    assert_eq!(rec_associations(&db, id).await, vec![kept]);
}

#[tokio::test]
async fn test_addition_appends_to_category() {
    let db = setup_test_db().await;
    create_rec(&db, "First", &["FL - HIG"]).await;
    create_rec(&db, "Second", &["FL - HIG"]).await;
    let id = create_rec(&db, "Third", &[]).await;
    assert!(rec_associations(&db, id).await.is_empty());

    let response = setup_app(&db)
        .oneshot(post_form(
            &format!("/technical_rec/{}", id),
            &[("text", "Third"), ("associations", "FL - HIG")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let links = rec_associations(&db, id).await;
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].2, 3);

    // A category with no links starts at 1
    let response = setup_app(&db)
        .oneshot(post_form(
            &format!("/technical_rec/{}", id),
            &[("text", "Third"), ("associations", "FL - HIG"), ("associations", "TS - LOW")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let ts_low = category_id(&db, "TS", "LOW").await;
    let ts_link = rec_associations(&db, id)
        .await
        .into_iter()
        .find(|(_, cat, _)| *cat == ts_low)
        .unwrap();
    assert_eq!(ts_link.2, 1);
}

#[tokio::test]
async fn test_no_duplicate_addition() {
    let db = setup_test_db().await;
    create_rec(&db, "Other", &["FL - HIG"]).await;
    let id = create_rec(&db, "Build levees", &["FL - HIG", "FL - HIG"]).await;

    let before = rec_associations(&db, id).await;
    assert_eq!(before.len(), 1);
    assert_eq!(before[0].2, 2);

    let response = setup_app(&db)
        .oneshot(post_form(
            &format!("/technical_rec/{}", id),
            &[("text", "Build taller levees"), ("associations", "FL - HIG")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    assert_eq!(rec_associations(&db, id).await, before);
    assert_eq!(rec_text(&db, id).await, "Build taller levees");
}

#[tokio::test]
async fn test_unknown_category_rolls_back() {
    let db = setup_test_db().await;
    let id = create_rec(&db, "Original", &["EQ - LOW"]).await;
    let before = rec_associations(&db, id).await;

    let response = setup_app(&db)
        .oneshot(post_form(
            &format!("/technical_rec/{}", id),
            &[
                ("text", "Changed"),
                ("associations", "FL - HIG"),
                ("associations", "ZZ - HIG"),
            ],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    assert_eq!(rec_text(&db, id).await, "Original");
    assert_eq!(rec_associations(&db, id).await, before);
}

#[tokio::test]
async fn test_malformed_token_rejected() {
    let db = setup_test_db().await;

    let response = setup_app(&db)
        .oneshot(post_form(
            "/technical_rec/new",
            &[("text", "Bad"), ("associations", "FL/HIG")],
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM technical_recommendations")
        .fetch_one(&db)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_list_shows_category_names() {
    let db = setup_test_db().await;
    create_rec(&db, "Build levees", &["FL - HIG", "FL - MED"]).await;

    let response = setup_app(&db).oneshot(get("/technical_rec")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("Build levees"));
    assert!(html.contains("FL - HIG, FL - MED"));
}
