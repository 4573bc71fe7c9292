use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    pub id_title: String,
    pub name_title: String,
    pub title_kind: String,
    pub synopsis: String,
    #[serde(default)]
    pub date_created: Option<String>,
    #[serde(default)]
    pub date_updated: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleInput {
    pub id_title: Option<String>,
    pub name_title: String,
    pub title_kind: String,
    pub synopsis: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    pub id_title: String,
    pub original_language: String,
    pub original_country: String,
    pub original_medium: String,
    pub creation_year: Option<i32>,
    pub creation_date: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Edition {
    pub id_title: Option<String>,
    pub id_work_title: Option<String>,
    pub isbn: Option<String>,
    pub date_publication: Option<String>,
    pub publisher: Option<String>,
    pub pages: Option<u32>,
    pub language: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Adaptation {
    pub id_title: Option<String>,
    pub id_work_title: Option<String>,
    pub adaptation_type: Option<String>,
    pub date_released: Option<String>,
    pub producer: Option<String>,
    pub duration: Option<u32>,
    pub language: Option<String>,
}

/// Shape of `GET /api/titles/{id}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TitleDetail {
    pub title: Title,
    pub work: Option<Work>,
    pub edition: Option<Edition>,
    pub adaptation: Option<Adaptation>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    pub id_genre: i64,
    pub name: String,
    pub description: String,
}

#[derive(Deserialize)]
pub struct GenreInput {
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id_person: i64,
    pub name: String,
    pub birth_date: Option<String>,
    pub country: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonInput {
    pub name: String,
    pub birth_date: Option<String>,
    pub country: Option<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Credit {
    pub id_person: i64,
    pub person_name: String,
    pub role: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditInput {
    pub id_person: i64,
    pub role: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreLink {
    pub id_genre: i64,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Review {
    #[serde(rename = "Id_Title")]
    pub id_title: String,
    #[serde(rename = "Email")]
    pub email: String,
    #[serde(rename = "Rating")]
    pub rating: u8,
    #[serde(rename = "Status")]
    pub status: String,
    #[serde(rename = "Spoiler")]
    pub spoiler: bool,
    #[serde(rename = "Comment")]
    pub comment: String,
    #[serde(rename = "Date_Created")]
    pub date_created: String,
}

#[derive(Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub email: String,
    pub username: String,
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub message: String,
}

/// In-memory backend state. Fields are public so tests can seed it.
#[derive(Debug, Default)]
pub struct Store {
    pub titles: BTreeMap<String, Title>,
    pub works: HashMap<String, Work>,
    pub editions: HashMap<String, Edition>,
    pub adaptations: HashMap<String, Adaptation>,
    pub genres: BTreeMap<i64, Genre>,
    pub persons: BTreeMap<i64, Person>,
    /// Title id -> genre ids.
    pub title_genres: HashMap<String, Vec<i64>>,
    /// Title id -> (person id -> role).
    pub credits: HashMap<String, BTreeMap<i64, String>>,
    pub reviews: Vec<Review>,
    /// Email -> (password, user).
    pub users: HashMap<String, (String, User)>,
    /// Request path -> status code returned instead of the real handler.
    pub faults: HashMap<String, u16>,
    next_id: i64,
}

impl Store {
    pub fn fail_path(&mut self, path: &str, status: u16) {
        self.faults.insert(path.to_string(), status);
    }

    pub fn insert_title(&mut self, id: &str, name: &str, kind: &str, synopsis: &str) {
        let now = now();
        self.titles.insert(
            id.to_string(),
            Title {
                id_title: id.to_string(),
                name_title: name.to_string(),
                title_kind: kind.to_string(),
                synopsis: synopsis.to_string(),
                date_created: Some(now.clone()),
                date_updated: Some(now),
            },
        );
    }

    pub fn insert_genre(&mut self, name: &str, description: &str) -> i64 {
        let id = self.next_id();
        self.genres.insert(
            id,
            Genre {
                id_genre: id,
                name: name.to_string(),
                description: description.to_string(),
            },
        );
        id
    }

    pub fn insert_person(&mut self, name: &str) -> i64 {
        let id = self.next_id();
        self.persons.insert(
            id,
            Person {
                id_person: id,
                name: name.to_string(),
                birth_date: None,
                country: None,
            },
        );
        id
    }

    /// A small catalog for local runs.
    pub fn seeded() -> Self {
        let mut store = Store::default();
        store.insert_title(
            "CIEN-WORK",
            "Cien años de soledad",
            "WORK",
            "La historia de la familia Buendía en Macondo.",
        );
        store.works.insert(
            "CIEN-WORK".to_string(),
            Work {
                id_title: "CIEN-WORK".to_string(),
                original_language: "es".to_string(),
                original_country: "Colombia".to_string(),
                original_medium: "Novela".to_string(),
                creation_year: Some(1967),
                creation_date: Some("1967-05-30".to_string()),
            },
        );
        store.insert_title("LOTR-WORK", "The Lord of the Rings", "WORK", "The One Ring must be destroyed.");
        store.insert_title(
            "LOTR-FILM",
            "The Fellowship of the Ring",
            "ADAPTATION",
            "Peter Jackson's adaptation of the first volume.",
        );
        store.adaptations.insert(
            "LOTR-FILM".to_string(),
            Adaptation {
                id_title: Some("LOTR-FILM".to_string()),
                id_work_title: Some("LOTR-WORK".to_string()),
                adaptation_type: Some("Film".to_string()),
                date_released: Some("2001-12-19".to_string()),
                producer: Some("New Line Cinema".to_string()),
                duration: Some(178),
                language: Some("en".to_string()),
            },
        );

        let realism = store.insert_genre("Realismo mágico", "Lo fantástico dentro de lo cotidiano");
        let fantasy = store.insert_genre("Fantasy", "Secondary worlds and magic");
        store.title_genres.insert("CIEN-WORK".to_string(), vec![realism]);
        store.title_genres.insert("LOTR-WORK".to_string(), vec![fantasy]);

        let gabo = store.insert_person("Gabriel García Márquez");
        let tolkien = store.insert_person("J. R. R. Tolkien");
        store
            .credits
            .insert("CIEN-WORK".to_string(), BTreeMap::from([(gabo, "Autor".to_string())]));
        store
            .credits
            .insert("LOTR-WORK".to_string(), BTreeMap::from([(tolkien, "Author".to_string())]));

        store.users.insert(
            "demo@example.com".to_string(),
            (
                "demo123".to_string(),
                User {
                    email: "demo@example.com".to_string(),
                    username: "demo".to_string(),
                },
            ),
        );
        store
    }

    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn genres_of(&self, title_id: &str) -> Vec<Genre> {
        self.title_genres
            .get(title_id)
            .into_iter()
            .flatten()
            .filter_map(|id| self.genres.get(id).cloned())
            .collect()
    }

    fn credits_of(&self, title_id: &str) -> Vec<Credit> {
        self.credits
            .get(title_id)
            .into_iter()
            .flatten()
            .map(|(id, role)| Credit {
                id_person: *id,
                person_name: self.persons.get(id).map(|p| p.name.clone()).unwrap_or_default(),
                role: role.clone(),
            })
            .collect()
    }
}

pub type Db = Arc<RwLock<Store>>;

type ApiResult<T> = Result<T, (StatusCode, Json<ErrorBody>)>;

fn error(status: StatusCode, message: &str) -> (StatusCode, Json<ErrorBody>) {
    (
        status,
        Json(ErrorBody {
            message: message.to_string(),
        }),
    )
}

fn not_found(what: &str) -> (StatusCode, Json<ErrorBody>) {
    error(StatusCode::NOT_FOUND, &format!("{what} not found"))
}

fn blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn now() -> String {
    chrono::Utc::now().to_rfc3339()
}

pub fn app() -> Router {
    app_with(Arc::new(RwLock::new(Store::default())))
}

pub fn app_with(db: Db) -> Router {
    Router::new()
        .route("/api/titles", get(list_titles).post(create_title))
        .route("/api/titles/{id}", get(get_title).put(update_title).delete(delete_title))
        .route("/api/titles/{id}/genres", get(title_genres).post(add_title_genre))
        .route("/api/titles/{id}/genres/{genre_id}", delete(remove_title_genre))
        .route("/api/titles/{id}/credits", get(title_credits).post(add_credit))
        .route("/api/titles/{id}/credits/{person_id}", delete(remove_credit))
        .route("/api/works/{id}", get(get_work))
        .route("/api/editions/{id}", get(get_edition))
        .route("/api/adaptations/{id}", get(get_adaptation))
        .route("/api/genres", get(list_genres).post(create_genre))
        .route("/api/genres/{id}", put(update_genre).delete(delete_genre))
        .route("/api/persons", get(list_persons).post(create_person))
        .route("/api/persons/{id}", put(update_person).delete(delete_person))
        .route("/api/reviews", post(create_review))
        .route("/api/users/login", post(login))
        .layer(middleware::from_fn_with_state(db.clone(), inject_faults))
        .with_state(db)
}

pub async fn run_with(listener: TcpListener, db: Db) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock catalog listening");
    }
    axum::serve(listener, app_with(db)).await
}

async fn inject_faults(State(db): State<Db>, request: Request, next: Next) -> Response {
    let fault = {
        let store = db.read().await;
        store.faults.get(request.uri().path()).copied()
    };
    match fault.and_then(|status| StatusCode::from_u16(status).ok()) {
        Some(status) => {
            debug!(path = request.uri().path(), %status, "injected fault");
            (status, "injected fault").into_response()
        }
        None => next.run(request).await,
    }
}

// --- titles ---

async fn list_titles(State(db): State<Db>) -> Json<Vec<Title>> {
    let store = db.read().await;
    Json(store.titles.values().cloned().collect())
}

async fn create_title(State(db): State<Db>, Json(input): Json<TitleInput>) -> ApiResult<(StatusCode, Json<Title>)> {
    if blank(&input.name_title) || blank(&input.title_kind) || blank(&input.synopsis) {
        return Err(error(StatusCode::BAD_REQUEST, "all title fields are required"));
    }
    let mut store = db.write().await;
    let id = input.id_title.unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    if store.titles.contains_key(&id) {
        return Err(error(StatusCode::CONFLICT, "title already exists"));
    }
    store.insert_title(&id, &input.name_title, &input.title_kind, &input.synopsis);
    Ok((StatusCode::CREATED, Json(store.titles[&id].clone())))
}

async fn get_title(State(db): State<Db>, Path(id): Path<String>) -> ApiResult<Json<TitleDetail>> {
    let store = db.read().await;
    let title = store.titles.get(&id).cloned().ok_or_else(|| not_found("title"))?;
    Ok(Json(TitleDetail {
        title,
        work: store.works.get(&id).cloned(),
        edition: store.editions.get(&id).cloned(),
        adaptation: store.adaptations.get(&id).cloned(),
    }))
}

async fn update_title(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<TitleInput>,
) -> ApiResult<Json<Title>> {
    let mut store = db.write().await;
    let title = store.titles.get_mut(&id).ok_or_else(|| not_found("title"))?;
    title.name_title = input.name_title;
    title.title_kind = input.title_kind;
    title.synopsis = input.synopsis;
    title.date_updated = Some(now());
    Ok(Json(title.clone()))
}

async fn delete_title(State(db): State<Db>, Path(id): Path<String>) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    store.titles.remove(&id).ok_or_else(|| not_found("title"))?;
    store.works.remove(&id);
    store.editions.remove(&id);
    store.adaptations.remove(&id);
    store.title_genres.remove(&id);
    store.credits.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

async fn get_work(State(db): State<Db>, Path(id): Path<String>) -> ApiResult<Json<Work>> {
    let store = db.read().await;
    store.works.get(&id).cloned().map(Json).ok_or_else(|| not_found("work"))
}

async fn get_edition(State(db): State<Db>, Path(id): Path<String>) -> ApiResult<Json<Edition>> {
    let store = db.read().await;
    store.editions.get(&id).cloned().map(Json).ok_or_else(|| not_found("edition"))
}

async fn get_adaptation(State(db): State<Db>, Path(id): Path<String>) -> ApiResult<Json<Adaptation>> {
    let store = db.read().await;
    store.adaptations.get(&id).cloned().map(Json).ok_or_else(|| not_found("adaptation"))
}

// --- title associations ---

async fn title_genres(State(db): State<Db>, Path(id): Path<String>) -> ApiResult<Json<Vec<Genre>>> {
    let store = db.read().await;
    if !store.titles.contains_key(&id) {
        return Err(not_found("title"));
    }
    Ok(Json(store.genres_of(&id)))
}

async fn add_title_genre(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(link): Json<GenreLink>,
) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    if !store.titles.contains_key(&id) {
        return Err(not_found("title"));
    }
    if !store.genres.contains_key(&link.id_genre) {
        return Err(not_found("genre"));
    }
    let linked = store.title_genres.entry(id).or_default();
    if !linked.contains(&link.id_genre) {
        linked.push(link.id_genre);
    }
    Ok(StatusCode::CREATED)
}

async fn remove_title_genre(
    State(db): State<Db>,
    Path((id, genre_id)): Path<(String, i64)>,
) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    let linked = store.title_genres.get_mut(&id).ok_or_else(|| not_found("title genre"))?;
    let before = linked.len();
    linked.retain(|g| *g != genre_id);
    if linked.len() == before {
        return Err(not_found("title genre"));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn title_credits(State(db): State<Db>, Path(id): Path<String>) -> ApiResult<Json<Vec<Credit>>> {
    let store = db.read().await;
    if !store.titles.contains_key(&id) {
        return Err(not_found("title"));
    }
    Ok(Json(store.credits_of(&id)))
}

async fn add_credit(
    State(db): State<Db>,
    Path(id): Path<String>,
    Json(input): Json<CreditInput>,
) -> ApiResult<StatusCode> {
    if blank(&input.role) {
        return Err(error(StatusCode::BAD_REQUEST, "role is required"));
    }
    let mut store = db.write().await;
    if !store.titles.contains_key(&id) {
        return Err(not_found("title"));
    }
    if !store.persons.contains_key(&input.id_person) {
        return Err(not_found("person"));
    }
    store.credits.entry(id).or_default().insert(input.id_person, input.role);
    Ok(StatusCode::CREATED)
}

async fn remove_credit(
    State(db): State<Db>,
    Path((id, person_id)): Path<(String, i64)>,
) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    store
        .credits
        .get_mut(&id)
        .and_then(|credits| credits.remove(&person_id))
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| not_found("credit"))
}

// --- genres ---

async fn list_genres(State(db): State<Db>) -> Json<Vec<Genre>> {
    let store = db.read().await;
    Json(store.genres.values().cloned().collect())
}

async fn create_genre(State(db): State<Db>, Json(input): Json<GenreInput>) -> ApiResult<(StatusCode, Json<Genre>)> {
    if blank(&input.name) || blank(&input.description) {
        return Err(error(StatusCode::BAD_REQUEST, "name and description are required"));
    }
    let mut store = db.write().await;
    let id = store.insert_genre(&input.name, &input.description);
    Ok((StatusCode::CREATED, Json(store.genres[&id].clone())))
}

async fn update_genre(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<GenreInput>,
) -> ApiResult<Json<Genre>> {
    let mut store = db.write().await;
    let genre = store.genres.get_mut(&id).ok_or_else(|| not_found("genre"))?;
    genre.name = input.name;
    genre.description = input.description;
    Ok(Json(genre.clone()))
}

async fn delete_genre(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    store.genres.remove(&id).ok_or_else(|| not_found("genre"))?;
    for linked in store.title_genres.values_mut() {
        linked.retain(|g| *g != id);
    }
    Ok(StatusCode::NO_CONTENT)
}

// --- persons ---

async fn list_persons(State(db): State<Db>) -> Json<Vec<Person>> {
    let store = db.read().await;
    Json(store.persons.values().cloned().collect())
}

async fn create_person(
    State(db): State<Db>,
    Json(input): Json<PersonInput>,
) -> ApiResult<(StatusCode, Json<Person>)> {
    if blank(&input.name) {
        return Err(error(StatusCode::BAD_REQUEST, "name is required"));
    }
    let mut store = db.write().await;
    let id = store.insert_person(&input.name);
    let person = store.persons.get_mut(&id).ok_or_else(|| not_found("person"))?;
    person.birth_date = input.birth_date;
    person.country = input.country;
    Ok((StatusCode::CREATED, Json(person.clone())))
}

async fn update_person(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(input): Json<PersonInput>,
) -> ApiResult<Json<Person>> {
    let mut store = db.write().await;
    let person = store.persons.get_mut(&id).ok_or_else(|| not_found("person"))?;
    person.name = input.name;
    person.birth_date = input.birth_date;
    person.country = input.country;
    Ok(Json(person.clone()))
}

async fn delete_person(State(db): State<Db>, Path(id): Path<i64>) -> ApiResult<StatusCode> {
    let mut store = db.write().await;
    store.persons.remove(&id).ok_or_else(|| not_found("person"))?;
    for credits in store.credits.values_mut() {
        credits.remove(&id);
    }
    Ok(StatusCode::NO_CONTENT)
}

// --- reviews & users ---

async fn create_review(State(db): State<Db>, Json(review): Json<Review>) -> Response {
    if !(1..=5).contains(&review.rating) {
        let body = serde_json::json!({ "error": "rating must be between 1 and 5" });
        return (StatusCode::UNPROCESSABLE_ENTITY, Json(body)).into_response();
    }
    let mut store = db.write().await;
    if !store.titles.contains_key(&review.id_title) {
        return not_found("title").into_response();
    }
    store.reviews.push(review.clone());
    (StatusCode::CREATED, Json(review)).into_response()
}

async fn login(State(db): State<Db>, Json(input): Json<Login>) -> ApiResult<Json<User>> {
    let store = db.read().await;
    match store.users.get(&input.email) {
        Some((password, user)) if *password == input.password => Ok(Json(user.clone())),
        _ => Err(error(StatusCode::UNAUTHORIZED, "invalid credentials")),
    }
}
