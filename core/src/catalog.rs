//! Typed async facade over every catalog endpoint.
//!
//! Pairs `CatalogClient` (build/parse) with a `ResourceClient` (I/O). All
//! errors propagate to the caller; the lenient collection policy lives
//! only in the aggregate composer.

use crate::client::CatalogClient;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::fetch::ResourceClient;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{
    Credit, Genre, LoginRequest, NewCredit, NewGenre, NewPerson, NewReview, NewTitle, Person, Title,
    TitleDetail, TitleForm, User,
};

#[derive(Debug, Clone)]
pub struct Catalog<T> {
    client: CatalogClient,
    resources: ResourceClient<T>,
}

impl Catalog<ReqwestTransport> {
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::new(
            CatalogClient::new(&config.base_url),
            ReqwestTransport::from_config(config)?,
        ))
    }
}

impl<T: Transport> Catalog<T> {
    pub fn new(client: CatalogClient, transport: T) -> Self {
        Self {
            client,
            resources: ResourceClient::new(transport),
        }
    }

    pub fn client(&self) -> &CatalogClient {
        &self.client
    }

    async fn round_trip(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.resources.execute(request).await
    }

    // --- titles ---

    pub async fn list_titles(&self) -> Result<Vec<Title>, ApiError> {
        let response = self.round_trip(self.client.build_list_titles()).await?;
        self.client.parse_list_titles(response)
    }

    pub async fn get_title(&self, id: &str) -> Result<TitleDetail, ApiError> {
        let response = self.round_trip(self.client.build_get_title(id)).await?;
        self.client.parse_get_title(response)
    }

    pub async fn create_title(&self, form: TitleForm) -> Result<Title, ApiError> {
        let request = self.client.build_create_title(&NewTitle::new(form))?;
        let response = self.round_trip(request).await?;
        self.client.parse_title(response)
    }

    pub async fn update_title(&self, id: &str, form: &TitleForm) -> Result<Title, ApiError> {
        let request = self.client.build_update_title(id, form)?;
        let response = self.round_trip(request).await?;
        self.client.parse_title(response)
    }

    pub async fn delete_title(&self, id: &str) -> Result<(), ApiError> {
        let response = self.round_trip(self.client.build_delete_title(id)).await?;
        self.client.parse_empty(response)
    }

    // --- title genres ---

    pub async fn title_genres(&self, id: &str) -> Result<Vec<Genre>, ApiError> {
        let response = self.round_trip(self.client.build_title_genres(id)).await?;
        self.client.parse_genres(response)
    }

    pub async fn add_title_genre(&self, id: &str, genre_id: i64) -> Result<(), ApiError> {
        let request = self.client.build_add_title_genre(id, genre_id)?;
        let response = self.round_trip(request).await?;
        self.client.parse_empty(response)
    }

    pub async fn remove_title_genre(&self, id: &str, genre_id: i64) -> Result<(), ApiError> {
        let response = self.round_trip(self.client.build_remove_title_genre(id, genre_id)).await?;
        self.client.parse_empty(response)
    }

    // --- credits ---

    pub async fn title_credits(&self, id: &str) -> Result<Vec<Credit>, ApiError> {
        let response = self.round_trip(self.client.build_title_credits(id)).await?;
        self.client.parse_credits(response)
    }

    pub async fn add_credit(&self, id: &str, input: &NewCredit) -> Result<(), ApiError> {
        let request = self.client.build_add_credit(id, input)?;
        let response = self.round_trip(request).await?;
        self.client.parse_empty(response)
    }

    pub async fn remove_credit(&self, id: &str, person_id: i64) -> Result<(), ApiError> {
        let response = self.round_trip(self.client.build_remove_credit(id, person_id)).await?;
        self.client.parse_empty(response)
    }

    // --- genres ---

    pub async fn list_genres(&self) -> Result<Vec<Genre>, ApiError> {
        let response = self.round_trip(self.client.build_list_genres()).await?;
        self.client.parse_genres(response)
    }

    pub async fn create_genre(&self, input: &NewGenre) -> Result<Genre, ApiError> {
        let request = self.client.build_create_genre(input)?;
        let response = self.round_trip(request).await?;
        self.client.parse_genre(response)
    }

    pub async fn update_genre(&self, id: i64, input: &NewGenre) -> Result<Genre, ApiError> {
        let request = self.client.build_update_genre(id, input)?;
        let response = self.round_trip(request).await?;
        self.client.parse_genre(response)
    }

    pub async fn delete_genre(&self, id: i64) -> Result<(), ApiError> {
        let response = self.round_trip(self.client.build_delete_genre(id)).await?;
        self.client.parse_empty(response)
    }

    // --- persons ---

    pub async fn list_persons(&self) -> Result<Vec<Person>, ApiError> {
        let response = self.round_trip(self.client.build_list_persons()).await?;
        self.client.parse_persons(response)
    }

    pub async fn create_person(&self, input: &NewPerson) -> Result<Person, ApiError> {
        let request = self.client.build_create_person(input)?;
        let response = self.round_trip(request).await?;
        self.client.parse_person(response)
    }

    pub async fn update_person(&self, id: i64, input: &NewPerson) -> Result<Person, ApiError> {
        let request = self.client.build_update_person(id, input)?;
        let response = self.round_trip(request).await?;
        self.client.parse_person(response)
    }

    pub async fn delete_person(&self, id: i64) -> Result<(), ApiError> {
        let response = self.round_trip(self.client.build_delete_person(id)).await?;
        self.client.parse_empty(response)
    }

    // --- reviews & users ---

    pub async fn submit_review(&self, input: &NewReview) -> Result<(), ApiError> {
        let request = self.client.build_submit_review(input)?;
        let response = self.round_trip(request).await?;
        self.client.parse_empty(response)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<User, ApiError> {
        let request = self.client.build_login(&LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        })?;
        let response = self.round_trip(request).await?;
        self.client.parse_user(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ValidationError;
    use crate::http::HttpMethod;
    use crate::test_support::FakeTransport;
    use crate::types::TitleKind;

    fn catalog(fake: &FakeTransport) -> Catalog<FakeTransport> {
        Catalog::new(CatalogClient::new("http://api"), fake.clone())
    }

    #[tokio::test]
    async fn list_errors_propagate_unlike_aggregate_collections() {
        let fake = FakeTransport::new();
        fake.reply(HttpMethod::Get, "http://api/api/titles/T/genres", 500, "down");
        let err = catalog(&fake).title_genres("T").await.unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn invalid_input_never_reaches_transport() {
        let fake = FakeTransport::new();
        let credit = NewCredit {
            id_person: 2,
            role: "".to_string(),
        };
        let err = catalog(&fake).add_credit("T", &credit).await.unwrap_err();
        assert_eq!(err, ApiError::Invalid(ValidationError::Blank("role")));
        assert!(fake.requests().is_empty());
    }

    #[tokio::test]
    async fn create_title_posts_generated_id() {
        let fake = FakeTransport::new();
        fake.reply(
            HttpMethod::Post,
            "http://api/api/titles",
            201,
            r#"{"idTitle":"generated","nameTitle":"Dune","titleKind":"WORK","synopsis":"Spice"}"#,
        );
        let form = TitleForm {
            name_title: " Dune ".to_string(),
            title_kind: TitleKind::Work,
            synopsis: "Spice".to_string(),
        };
        let title = catalog(&fake).create_title(form).await.unwrap();
        assert_eq!(title.name_title, "Dune");

        let sent: serde_json::Value = serde_json::from_str(fake.requests()[0].body.as_deref().unwrap()).unwrap();
        assert_eq!(sent["nameTitle"], "Dune");
        assert!(sent["idTitle"].as_str().is_some_and(|id| !id.is_empty()));
    }

    #[tokio::test]
    async fn login_returns_user() {
        let fake = FakeTransport::new();
        fake.reply(
            HttpMethod::Post,
            "http://api/api/users/login",
            200,
            r#"{"email":"ana@example.com","username":"ana"}"#,
        );
        let user = catalog(&fake).login("ana@example.com", "secret1").await.unwrap();
        assert_eq!(user.username, "ana");
    }

    #[tokio::test]
    async fn remove_title_genre_accepts_no_content() {
        let fake = FakeTransport::new();
        fake.reply(HttpMethod::Delete, "http://api/api/titles/T/genres/3", 204, "");
        catalog(&fake).remove_title_genre("T", 3).await.unwrap();
    }
}
