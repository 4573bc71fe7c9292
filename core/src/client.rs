//! Stateless HTTP request builder and response parser for the catalog API.
//!
//! # Design
//! `CatalogClient` holds only a `base_url`. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`; the round-trip in between belongs to a
//! `Transport`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{
    Adaptation, Credit, Edition, Genre, KindRecord, LoginRequest, NewCredit, NewGenre, NewPerson,
    NewReview, NewTitle, Person, PrimaryPayload, Title, TitleDetail, TitleForm, TitleGenreLink,
    TitleKind, User, Work,
};

/// Endpoint holding the kind-specific record for each title kind.
fn record_route(kind: TitleKind) -> &'static str {
    match kind {
        TitleKind::Work => "works",
        TitleKind::Edition => "editions",
        TitleKind::Adaptation => "adaptations",
    }
}

/// Synchronous, stateless client for the catalog API.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: String,
}

impl CatalogClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{path}", self.base_url)
    }

    fn get(&self, path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            path: self.url(path),
            headers: Vec::new(),
            body: None,
        }
    }

    fn delete(&self, path: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Delete,
            path: self.url(path),
            headers: Vec::new(),
            body: None,
        }
    }

    fn json<B: Serialize>(&self, method: HttpMethod, path: &str, input: &B) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(input).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(HttpRequest {
            method,
            path: self.url(path),
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    // --- titles ---

    pub fn build_list_titles(&self) -> HttpRequest {
        self.get("titles")
    }

    pub fn build_get_title(&self, id: &str) -> HttpRequest {
        self.get(&format!("titles/{id}"))
    }

    pub fn build_create_title(&self, input: &NewTitle) -> Result<HttpRequest, ApiError> {
        let input = NewTitle {
            id_title: input.id_title.clone(),
            form: input.form.validated()?,
        };
        self.json(HttpMethod::Post, "titles", &input)
    }

    pub fn build_update_title(&self, id: &str, input: &TitleForm) -> Result<HttpRequest, ApiError> {
        self.json(HttpMethod::Put, &format!("titles/{id}"), &input.validated()?)
    }

    pub fn build_delete_title(&self, id: &str) -> HttpRequest {
        self.delete(&format!("titles/{id}"))
    }

    /// Request for the kind-specific record of title `id`.
    pub fn build_get_kind_record(&self, id: &str, kind: TitleKind) -> HttpRequest {
        self.get(&format!("{}/{id}", record_route(kind)))
    }

    pub fn build_title_genres(&self, id: &str) -> HttpRequest {
        self.get(&format!("titles/{id}/genres"))
    }

    pub fn build_add_title_genre(&self, id: &str, genre_id: i64) -> Result<HttpRequest, ApiError> {
        self.json(
            HttpMethod::Post,
            &format!("titles/{id}/genres"),
            &TitleGenreLink { id_genre: genre_id },
        )
    }

    pub fn build_remove_title_genre(&self, id: &str, genre_id: i64) -> HttpRequest {
        self.delete(&format!("titles/{id}/genres/{genre_id}"))
    }

    pub fn build_title_credits(&self, id: &str) -> HttpRequest {
        self.get(&format!("titles/{id}/credits"))
    }

    pub fn build_add_credit(&self, id: &str, input: &NewCredit) -> Result<HttpRequest, ApiError> {
        self.json(HttpMethod::Post, &format!("titles/{id}/credits"), &input.validated()?)
    }

    pub fn build_remove_credit(&self, id: &str, person_id: i64) -> HttpRequest {
        self.delete(&format!("titles/{id}/credits/{person_id}"))
    }

    // --- genres ---

    pub fn build_list_genres(&self) -> HttpRequest {
        self.get("genres")
    }

    pub fn build_create_genre(&self, input: &NewGenre) -> Result<HttpRequest, ApiError> {
        self.json(HttpMethod::Post, "genres", &input.validated()?)
    }

    pub fn build_update_genre(&self, id: i64, input: &NewGenre) -> Result<HttpRequest, ApiError> {
        self.json(HttpMethod::Put, &format!("genres/{id}"), &input.validated()?)
    }

    pub fn build_delete_genre(&self, id: i64) -> HttpRequest {
        self.delete(&format!("genres/{id}"))
    }

    // --- persons ---

    pub fn build_list_persons(&self) -> HttpRequest {
        self.get("persons")
    }

    pub fn build_create_person(&self, input: &NewPerson) -> Result<HttpRequest, ApiError> {
        self.json(HttpMethod::Post, "persons", &input.validated()?)
    }

    pub fn build_update_person(&self, id: i64, input: &NewPerson) -> Result<HttpRequest, ApiError> {
        self.json(HttpMethod::Put, &format!("persons/{id}"), &input.validated()?)
    }

    pub fn build_delete_person(&self, id: i64) -> HttpRequest {
        self.delete(&format!("persons/{id}"))
    }

    // --- reviews & users ---

    pub fn build_submit_review(&self, input: &NewReview) -> Result<HttpRequest, ApiError> {
        self.json(HttpMethod::Post, "reviews", &input.validated()?)
    }

    pub fn build_login(&self, input: &LoginRequest) -> Result<HttpRequest, ApiError> {
        self.json(HttpMethod::Post, "users/login", input)
    }

    // --- parsing ---

    pub fn parse_list_titles(&self, response: HttpResponse) -> Result<Vec<Title>, ApiError> {
        parse_json(response)
    }

    /// Accepts a bare title or a `{title, work, edition, adaptation}`
    /// envelope.
    pub fn parse_get_title(&self, response: HttpResponse) -> Result<TitleDetail, ApiError> {
        parse_json::<PrimaryPayload>(response).map(PrimaryPayload::into_detail)
    }

    pub fn parse_title(&self, response: HttpResponse) -> Result<Title, ApiError> {
        parse_json(response)
    }

    /// Only a non-empty JSON object counts as a record.
    pub fn parse_kind_record(&self, kind: TitleKind, response: HttpResponse) -> Result<KindRecord, ApiError> {
        let value: serde_json::Value = parse_json(response)?;
        if !value.as_object().is_some_and(|fields| !fields.is_empty()) {
            return Err(ApiError::Decode(format!("no {kind} record in response")));
        }
        let record = match kind {
            TitleKind::Work => serde_json::from_value::<Work>(value).map(KindRecord::Work),
            TitleKind::Edition => serde_json::from_value::<Edition>(value).map(KindRecord::Edition),
            TitleKind::Adaptation => serde_json::from_value::<Adaptation>(value).map(KindRecord::Adaptation),
        };
        record.map_err(|e| ApiError::Decode(e.to_string()))
    }

    pub fn parse_genres(&self, response: HttpResponse) -> Result<Vec<Genre>, ApiError> {
        parse_json(response)
    }

    pub fn parse_genre(&self, response: HttpResponse) -> Result<Genre, ApiError> {
        parse_json(response)
    }

    pub fn parse_credits(&self, response: HttpResponse) -> Result<Vec<Credit>, ApiError> {
        parse_json(response)
    }

    pub fn parse_credit(&self, response: HttpResponse) -> Result<Credit, ApiError> {
        parse_json(response)
    }

    pub fn parse_persons(&self, response: HttpResponse) -> Result<Vec<Person>, ApiError> {
        parse_json(response)
    }

    pub fn parse_person(&self, response: HttpResponse) -> Result<Person, ApiError> {
        parse_json(response)
    }

    pub fn parse_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        parse_json(response)
    }

    /// For deletes, association changes and review submission: only the
    /// status matters.
    pub fn parse_empty(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }
}

/// Decode a 2xx body as `T`.
pub fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Map non-2xx statuses to `ApiError::Http`.
pub fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Http {
        status: response.status,
        message: error_message(response),
    })
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    error: Option<String>,
}

/// `message` (or `error`) from a JSON body, else the raw text, else the
/// canonical reason phrase.
fn error_message(response: &HttpResponse) -> String {
    if let Ok(ErrorBody { message, error }) = serde_json::from_str::<ErrorBody>(&response.body) {
        if let Some(message) = message.or(error) {
            return message;
        }
    }
    let text = response.body.trim();
    if !text.is_empty() {
        return text.to_string();
    }
    reqwest::StatusCode::from_u16(response.status)
        .ok()
        .and_then(|status| status.canonical_reason())
        .unwrap_or("unknown status")
        .to_string()
}
