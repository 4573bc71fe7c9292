//! Wire types for the catalog API.
//!
//! # Design
//! Field names follow the backend's JSON (camelCase for catalog entities,
//! `Pascal_Snake` for reviews). Kind-specific records tolerate missing
//! fields since incomplete bibliographic data is the norm.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Discriminant deciding which kind-specific record a title carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TitleKind {
    Work,
    Edition,
    Adaptation,
}

impl TitleKind {
    pub const ALL: [TitleKind; 3] = [TitleKind::Work, TitleKind::Edition, TitleKind::Adaptation];

    pub fn as_str(self) -> &'static str {
        match self {
            TitleKind::Work => "WORK",
            TitleKind::Edition => "EDITION",
            TitleKind::Adaptation => "ADAPTATION",
        }
    }
}

impl fmt::Display for TitleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TitleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TitleKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown title kind `{s}` (expected WORK, EDITION or ADAPTATION)"))
    }
}

/// The generic catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Title {
    pub id_title: String,
    pub name_title: String,
    pub title_kind: TitleKind,
    pub synopsis: String,
    /// Server-assigned; never sent by the client.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_created: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_updated: Option<String>,
}

/// Editable fields of a title. Used as the `PUT /api/titles/{id}` body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleForm {
    pub name_title: String,
    pub title_kind: TitleKind,
    pub synopsis: String,
}

impl TitleForm {
    pub fn validated(&self) -> Result<TitleForm, ValidationError> {
        Ok(TitleForm {
            name_title: non_blank("nameTitle", &self.name_title)?,
            title_kind: self.title_kind,
            synopsis: non_blank("synopsis", &self.synopsis)?,
        })
    }
}

/// `POST /api/titles` body. The client picks the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTitle {
    pub id_title: String,
    #[serde(flatten)]
    pub form: TitleForm,
}

impl NewTitle {
    pub fn new(form: TitleForm) -> Self {
        Self {
            id_title: Uuid::new_v4().to_string(),
            form,
        }
    }
}

/// Language, country and medium are mandatory; a body lacking them is not a work.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Work {
    pub id_title: String,
    pub original_language: String,
    pub original_country: String,
    pub original_medium: String,
    pub creation_year: Option<i32>,
    pub creation_date: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Edition {
    pub id_title: Option<String>,
    pub id_work_title: Option<String>,
    pub isbn: Option<String>,
    pub date_publication: Option<String>,
    pub publisher: Option<String>,
    pub pages: Option<u32>,
    pub language: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Adaptation {
    pub id_title: Option<String>,
    pub id_work_title: Option<String>,
    pub adaptation_type: Option<String>,
    pub date_released: Option<String>,
    pub producer: Option<String>,
    /// Minutes.
    pub duration: Option<u32>,
    pub language: Option<String>,
}

/// Exactly one kind-specific record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KindRecord {
    Work(Work),
    Edition(Edition),
    Adaptation(Adaptation),
}

impl KindRecord {
    pub fn kind(&self) -> TitleKind {
        match self {
            KindRecord::Work(_) => TitleKind::Work,
            KindRecord::Edition(_) => TitleKind::Edition,
            KindRecord::Adaptation(_) => TitleKind::Adaptation,
        }
    }

    /// Title the record claims to belong to, when it says.
    pub fn id_title(&self) -> Option<&str> {
        match self {
            KindRecord::Work(work) => Some(work.id_title.as_str()),
            KindRecord::Edition(edition) => edition.id_title.as_deref(),
            KindRecord::Adaptation(adaptation) => adaptation.id_title.as_deref(),
        }
    }

    /// False only when the record names a different title.
    pub fn belongs_to(&self, id: &str) -> bool {
        self.id_title().map_or(true, |owner| owner == id)
    }
}

/// Primary payload of `GET /api/titles/{id}`.
///
/// The backend may answer with a bare title or with an envelope that also
/// embeds the kind-specific records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleDetail {
    pub title: Title,
    pub work: Option<Work>,
    pub edition: Option<Edition>,
    pub adaptation: Option<Adaptation>,
}

impl TitleDetail {
    /// The embedded record matching `titleKind`, if any. Records for other
    /// kinds are ignored.
    pub fn embedded_record(&self) -> Option<KindRecord> {
        match self.title.title_kind {
            TitleKind::Work => self.work.clone().map(KindRecord::Work),
            TitleKind::Edition => self.edition.clone().map(KindRecord::Edition),
            TitleKind::Adaptation => self.adaptation.clone().map(KindRecord::Adaptation),
        }
    }
}

impl From<Title> for TitleDetail {
    fn from(title: Title) -> Self {
        Self {
            title,
            work: None,
            edition: None,
            adaptation: None,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum PrimaryPayload {
    Envelope {
        title: Title,
        #[serde(default)]
        work: Option<Work>,
        #[serde(default)]
        edition: Option<Edition>,
        #[serde(default)]
        adaptation: Option<Adaptation>,
    },
    Bare(Title),
}

impl PrimaryPayload {
    pub(crate) fn into_detail(self) -> TitleDetail {
        match self {
            PrimaryPayload::Envelope {
                title,
                work,
                edition,
                adaptation,
            } => TitleDetail {
                title,
                work,
                edition,
                adaptation,
            },
            PrimaryPayload::Bare(title) => title.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Genre {
    pub id_genre: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGenre {
    pub name: String,
    pub description: String,
}

impl NewGenre {
    /// Trimmed copy, or the first blank field.
    pub fn validated(&self) -> Result<NewGenre, ValidationError> {
        Ok(NewGenre {
            name: non_blank("name", &self.name)?,
            description: non_blank("description", &self.description)?,
        })
    }
}

/// `POST /api/titles/{id}/genres` body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitleGenreLink {
    pub id_genre: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Person {
    pub id_person: i64,
    pub name: String,
    #[serde(default)]
    pub birth_date: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPerson {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}

impl NewPerson {
    pub fn validated(&self) -> Result<NewPerson, ValidationError> {
        Ok(NewPerson {
            name: non_blank("name", &self.name)?,
            birth_date: self.birth_date.clone(),
            country: self.country.clone(),
        })
    }
}

/// A person's role on a title. The person name is denormalized by the
/// backend at fetch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credit {
    pub id_person: i64,
    pub person_name: String,
    pub role: String,
}

/// `POST /api/titles/{id}/credits` body. One role per person per title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCredit {
    pub id_person: i64,
    pub role: String,
}

impl NewCredit {
    pub fn validated(&self) -> Result<NewCredit, ValidationError> {
        if self.id_person == 0 {
            return Err(ValidationError::Zero("idPerson"));
        }
        Ok(NewCredit {
            id_person: self.id_person,
            role: non_blank("role", &self.role)?,
        })
    }
}

pub const DEFAULT_REVIEW_STATUS: &str = "PUBLICADA";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewReview {
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
    pub date_created: DateTime<Utc>,
}

impl NewReview {
    pub fn new(id_title: &str, email: &str, rating: u8, comment: &str) -> Self {
        Self {
            id_title: id_title.to_string(),
            email: email.to_string(),
            rating,
            status: DEFAULT_REVIEW_STATUS.to_string(),
            spoiler: false,
            comment: comment.to_string(),
            date_created: Utc::now(),
        }
    }

    pub fn validated(&self) -> Result<NewReview, ValidationError> {
        if !(1..=5).contains(&self.rating) {
            return Err(ValidationError::RatingOutOfRange(self.rating));
        }
        Ok(self.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub email: String,
    pub username: String,
}

fn non_blank(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Blank(field));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_kind_parses_case_insensitively() {
        assert_eq!("edition".parse::<TitleKind>().unwrap(), TitleKind::Edition);
        assert_eq!(" WORK ".parse::<TitleKind>().unwrap(), TitleKind::Work);
        assert!("SERIES".parse::<TitleKind>().is_err());
    }

    #[test]
    fn title_rejects_unknown_kind() {
        let raw = r#"{"idTitle":"X","nameTitle":"X","titleKind":"SERIES","synopsis":""}"#;
        assert!(serde_json::from_str::<Title>(raw).is_err());
    }

    #[test]
    fn bare_title_payload_has_no_embedded_records() {
        let raw = r#"{"idTitle":"WORK-1","nameTitle":"Test Work","titleKind":"WORK","synopsis":"..."}"#;
        let payload: PrimaryPayload = serde_json::from_str(raw).unwrap();
        let detail = payload.into_detail();
        assert_eq!(detail.title.id_title, "WORK-1");
        assert!(detail.embedded_record().is_none());
    }

    #[test]
    fn envelope_ignores_records_of_other_kinds() {
        let raw = r#"{
            "title": {"idTitle":"ED-1","nameTitle":"Ed","titleKind":"EDITION","synopsis":"s"},
            "work": {"idTitle":"ED-1","originalLanguage":"es"},
            "edition": null,
            "adaptation": null
        }"#;
        let payload: PrimaryPayload = serde_json::from_str(raw).unwrap();
        let detail = payload.into_detail();
        assert!(detail.work.is_some());
        assert_eq!(detail.embedded_record(), None);
    }

    #[test]
    fn edition_tolerates_missing_fields() {
        let edition: Edition = serde_json::from_str(r#"{"isbn":"978-0"}"#).unwrap();
        assert_eq!(edition.isbn.as_deref(), Some("978-0"));
        assert!(edition.pages.is_none());
    }

    #[test]
    fn new_genre_is_trimmed() {
        let genre = NewGenre {
            name: "  Fantasy ".to_string(),
            description: "Dragons\n".to_string(),
        };
        let valid = genre.validated().unwrap();
        assert_eq!(valid.name, "Fantasy");
        assert_eq!(valid.description, "Dragons");
    }

    #[test]
    fn new_genre_rejects_blank_description() {
        let genre = NewGenre {
            name: "Fantasy".to_string(),
            description: "   ".to_string(),
        };
        assert_eq!(genre.validated(), Err(ValidationError::Blank("description")));
    }

    #[test]
    fn new_credit_requires_person_and_role() {
        let missing_person = NewCredit {
            id_person: 0,
            role: "Autor".to_string(),
        };
        assert_eq!(missing_person.validated(), Err(ValidationError::Zero("idPerson")));

        let blank_role = NewCredit {
            id_person: 3,
            role: " ".to_string(),
        };
        assert_eq!(blank_role.validated(), Err(ValidationError::Blank("role")));
    }

    #[test]
    fn review_serializes_with_backend_field_names() {
        let review = NewReview::new("HP-WORK", "a@b.co", 4, "Great");
        let json = serde_json::to_value(&review).unwrap();
        assert_eq!(json["Id_Title"], "HP-WORK");
        assert_eq!(json["Rating"], 4);
        assert_eq!(json["Status"], DEFAULT_REVIEW_STATUS);
        assert_eq!(json["Spoiler"], false);
        assert!(json["Date_Created"].is_string());
    }

    #[test]
    fn review_rating_must_be_in_range() {
        let review = NewReview::new("HP-WORK", "a@b.co", 6, "");
        assert_eq!(review.validated(), Err(ValidationError::RatingOutOfRange(6)));
    }

    #[test]
    fn new_title_flattens_form() {
        let title = NewTitle::new(TitleForm {
            name_title: "Dune".to_string(),
            title_kind: TitleKind::Work,
            synopsis: "Spice".to_string(),
        });
        let json = serde_json::to_value(&title).unwrap();
        assert_eq!(json["nameTitle"], "Dune");
        assert_eq!(json["titleKind"], "WORK");
        assert!(Uuid::parse_str(json["idTitle"].as_str().unwrap()).is_ok());
    }
}
