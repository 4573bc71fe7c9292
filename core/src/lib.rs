//! Async client core for the literary catalog service.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern); a `Transport` executes the
//! round-trip. On top of that sit the strict `ResourceClient`, the lenient
//! collection fetcher, the typed `Catalog` facade and the
//! `AggregateComposer` behind the title detail view.
//!
//! # Design
//! - `CatalogClient` is stateless; it holds only `base_url`.
//! - Each operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit and the core is testable with a scripted
//!   transport.
//! - DTOs are defined independently from the mock-server crate;
//!   integration tests catch schema drift.

pub mod aggregate;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod filter;
pub mod http;
pub mod transport;
pub mod types;

#[cfg(test)]
mod test_support;

pub use aggregate::{AggregateComposer, ComposerState, Composition, TitleAggregate};
pub use catalog::Catalog;
pub use client::CatalogClient;
pub use config::ClientConfig;
pub use error::{AggregateLoadFailed, ApiError, ValidationError};
pub use fetch::{CollectionOutcome, ResourceClient};
pub use filter::TitleFilter;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transport::{ReqwestTransport, Transport};
pub use types::{
    Adaptation, Credit, Edition, Genre, KindRecord, LoginRequest, NewCredit, NewGenre, NewPerson,
    NewReview, NewTitle, Person, Title, TitleDetail, TitleForm, TitleGenreLink, TitleKind, User,
    Work,
};
