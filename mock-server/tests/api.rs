use std::sync::Arc;

use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, Credit, Db, Genre, Store, Title, TitleDetail, User};
use tokio::sync::RwLock;
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn delete(uri: &str) -> Request<String> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(String::new())
        .unwrap()
}

fn seeded() -> Db {
    Arc::new(RwLock::new(Store::seeded()))
}

// --- titles ---

#[tokio::test]
async fn list_titles_empty() {
    let resp = app().oneshot(get("/api/titles")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let titles: Vec<Title> = body_json(resp).await;
    assert!(titles.is_empty());
}

#[tokio::test]
async fn create_title_keeps_client_id() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/titles",
            r#"{"idTitle":"DUNE-WORK","nameTitle":"Dune","titleKind":"WORK","synopsis":"Spice"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let title: Title = body_json(resp).await;
    assert_eq!(title.id_title, "DUNE-WORK");
    assert!(title.date_created.is_some());
}

#[tokio::test]
async fn create_title_blank_field_returns_400() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/titles",
            r#"{"nameTitle":"  ","titleKind":"WORK","synopsis":"Spice"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_title_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/api/titles", r#"{"nameTitle":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn get_title_returns_envelope() {
    let resp = app_with(seeded()).oneshot(get("/api/titles/CIEN-WORK")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let detail: TitleDetail = body_json(resp).await;
    assert_eq!(detail.title.title_kind, "WORK");
    assert_eq!(detail.work.unwrap().creation_year, Some(1967));
    assert!(detail.edition.is_none());
    assert!(detail.adaptation.is_none());
}

#[tokio::test]
async fn get_title_not_found_has_message() {
    let resp = app().oneshot(get("/api/titles/NOPE")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["message"], "title not found");
}

#[tokio::test]
async fn kind_record_endpoints() {
    let db = seeded();
    let resp = app_with(db.clone()).oneshot(get("/api/adaptations/LOTR-FILM")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app_with(db).oneshot(get("/api/editions/LOTR-FILM")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_title_cascades_associations() {
    let db = seeded();
    let resp = app_with(db.clone()).oneshot(delete("/api/titles/CIEN-WORK")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    let store = db.read().await;
    assert!(!store.works.contains_key("CIEN-WORK"));
    assert!(!store.credits.contains_key("CIEN-WORK"));
}

// --- associations ---

#[tokio::test]
async fn title_genres_of_unknown_title_is_404() {
    let resp = app().oneshot(get("/api/titles/NOPE/genres")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn add_and_remove_title_genre() {
    let db = seeded();
    let drama = db.write().await.insert_genre("Drama", "Conflict");

    let resp = app_with(db.clone())
        .oneshot(json_request(
            "POST",
            "/api/titles/LOTR-FILM/genres",
            &format!(r#"{{"idGenre":{drama}}}"#),
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = app_with(db.clone()).oneshot(get("/api/titles/LOTR-FILM/genres")).await.unwrap();
    let genres: Vec<Genre> = body_json(resp).await;
    assert_eq!(genres.len(), 1);
    assert_eq!(genres[0].name, "Drama");

    let resp = app_with(db.clone())
        .oneshot(delete(&format!("/api/titles/LOTR-FILM/genres/{drama}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = app_with(db)
        .oneshot(delete(&format!("/api/titles/LOTR-FILM/genres/{drama}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn credit_is_upserted_per_person() {
    let db = seeded();
    let person = db.write().await.insert_person("Peter Jackson");

    for role in ["Director", "Producer"] {
        let resp = app_with(db.clone())
            .oneshot(json_request(
                "POST",
                "/api/titles/LOTR-FILM/credits",
                &format!(r#"{{"idPerson":{person},"role":"{role}"}}"#),
            ))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = app_with(db).oneshot(get("/api/titles/LOTR-FILM/credits")).await.unwrap();
    let credits: Vec<Credit> = body_json(resp).await;
    assert_eq!(credits.len(), 1);
    assert_eq!(credits[0].person_name, "Peter Jackson");
    assert_eq!(credits[0].role, "Producer");
}

#[tokio::test]
async fn credit_for_unknown_person_is_404() {
    let resp = app_with(seeded())
        .oneshot(json_request(
            "POST",
            "/api/titles/CIEN-WORK/credits",
            r#"{"idPerson":999,"role":"Autor"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- faults ---

#[tokio::test]
async fn injected_fault_overrides_handler() {
    let db = seeded();
    db.write().await.fail_path("/api/titles/CIEN-WORK/credits", 500);

    let resp = app_with(db.clone()).oneshot(get("/api/titles/CIEN-WORK/credits")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let resp = app_with(db).oneshot(get("/api/titles/CIEN-WORK/genres")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
}

// --- reviews & users ---

#[tokio::test]
async fn review_rating_out_of_range_returns_error_field() {
    let resp = app_with(seeded())
        .oneshot(json_request(
            "POST",
            "/api/reviews",
            r#"{"Id_Title":"CIEN-WORK","Email":"a@b.co","Rating":9,"Status":"PUBLICADA","Spoiler":false,"Comment":"","Date_Created":"2024-01-01T00:00:00Z"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: serde_json::Value = body_json(resp).await;
    assert_eq!(body["error"], "rating must be between 1 and 5");
}

#[tokio::test]
async fn login_checks_password() {
    let resp = app_with(seeded())
        .oneshot(json_request(
            "POST",
            "/api/users/login",
            r#"{"email":"demo@example.com","password":"demo123"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let user: User = body_json(resp).await;
    assert_eq!(user.username, "demo");

    let resp = app_with(seeded())
        .oneshot(json_request(
            "POST",
            "/api/users/login",
            r#"{"email":"demo@example.com","password":"nope"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- full genre lifecycle ---

#[tokio::test]
async fn genre_crud_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // create
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/genres",
            r#"{"name":"Terror","description":"Miedo"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Genre = body_json(resp).await;
    let id = created.id_genre;

    // update
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "PUT",
            &format!("/api/genres/{id}"),
            r#"{"name":"Horror","description":"Fear"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let updated: Genre = body_json(resp).await;
    assert_eq!(updated.name, "Horror");

    // list
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/api/genres"))
        .await
        .unwrap();
    let genres: Vec<Genre> = body_json(resp).await;
    assert_eq!(genres, vec![updated]);

    // delete
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(delete(&format!("/api/genres/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    // delete again
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(delete(&format!("/api/genres/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
