//! Title aggregate retrieval and composition.
//!
//! # Overview
//! `AggregateComposer::load` fetches a title (primary), then fans out to
//! the kind-specific record, the title's genres and its credits
//! (dependents) and folds the results into one `TitleAggregate`.
//!
//! # Design
//! - Primary failure is fatal: the composer publishes `Failed` and returns
//!   `AggregateLoadFailed`. Dependent failures degrade to `None` /
//!   `CollectionOutcome::Absent` and are never surfaced.
//! - The dependents run concurrently inside the calling task via
//!   `futures::join!`; each writes only its own slot.
//! - Every `load` captures a generation number. A result is published on
//!   the `watch` channel only if no later `load`, `cancel` or successful
//!   `delete_title` has happened since; otherwise it is dropped and the
//!   call returns `Composition::Superseded`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::client::CatalogClient;
use crate::config::ClientConfig;
use crate::error::{AggregateLoadFailed, ApiError};
use crate::fetch::{CollectionOutcome, ResourceClient};
use crate::transport::{ReqwestTransport, Transport};
use crate::types::{Credit, Genre, KindRecord, Title, TitleDetail, TitleKind};

/// Read model for the title detail view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TitleAggregate {
    pub title: Title,
    /// Present only when it matches `title.title_kind`.
    pub kind_record: Option<KindRecord>,
    pub genres: CollectionOutcome<Genre>,
    pub credits: CollectionOutcome<Credit>,
}

impl TitleAggregate {
    pub fn kind(&self) -> TitleKind {
        self.title.title_kind
    }

    pub fn genres_or_empty(&self) -> &[Genre] {
        self.genres.as_slice()
    }

    pub fn credits_or_empty(&self) -> &[Credit] {
        self.credits.as_slice()
    }
}

/// Observable state of the composer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComposerState {
    Idle,
    FetchingPrimary { id: String },
    FetchingDependents { id: String, kind: TitleKind },
    Ready(Arc<TitleAggregate>),
    Failed { id: String, error: ApiError },
}

/// What a `load` call amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Composition {
    /// Blank id; no request was issued.
    Skipped,
    /// A newer request took over; this result was discarded.
    Superseded,
    Ready(Arc<TitleAggregate>),
}

pub struct AggregateComposer<T> {
    client: CatalogClient,
    resources: ResourceClient<T>,
    generation: AtomicU64,
    state: watch::Sender<ComposerState>,
}

impl AggregateComposer<ReqwestTransport> {
    pub fn from_config(config: &ClientConfig) -> Result<Self, ApiError> {
        Ok(Self::new(
            CatalogClient::new(&config.base_url),
            ReqwestTransport::from_config(config)?,
        ))
    }
}

impl<T: Transport> AggregateComposer<T> {
    pub fn new(client: CatalogClient, transport: T) -> Self {
        let (state, _) = watch::channel(ComposerState::Idle);
        Self {
            client,
            resources: ResourceClient::new(transport),
            generation: AtomicU64::new(0),
            state,
        }
    }

    /// Latest published state.
    pub fn state(&self) -> ComposerState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ComposerState> {
        self.state.subscribe()
    }

    /// Compose the aggregate for `id`, superseding any load in flight.
    pub async fn load(&self, id: &str) -> Result<Composition, AggregateLoadFailed> {
        if id.trim().is_empty() {
            debug!("blank title id, clearing");
            self.cancel();
            return Ok(Composition::Skipped);
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.publish(generation, ComposerState::FetchingPrimary { id: id.to_string() });

        let detail = match self.fetch_primary(id).await {
            Ok(detail) => detail,
            Err(error) => {
                warn!(id, %error, "primary title fetch failed");
                let failed = AggregateLoadFailed {
                    id: id.to_string(),
                    source: error.clone(),
                };
                let state = ComposerState::Failed {
                    id: id.to_string(),
                    error,
                };
                if self.publish(generation, state) {
                    return Err(failed);
                }
                return Ok(Composition::Superseded);
            }
        };

        let kind = detail.title.title_kind;
        if !self.publish(
            generation,
            ComposerState::FetchingDependents {
                id: id.to_string(),
                kind,
            },
        ) {
            debug!(id, generation, "superseded before dependent fetches");
            return Ok(Composition::Superseded);
        }

        let (kind_record, genres, credits) = futures::join!(
            self.fetch_kind_record(id, &detail),
            self.resources.fetch_collection::<Genre>(self.client.build_title_genres(id)),
            self.resources.fetch_collection::<Credit>(self.client.build_title_credits(id)),
        );

        let aggregate = Arc::new(TitleAggregate {
            title: detail.title,
            kind_record,
            genres,
            credits,
        });
        if self.publish(generation, ComposerState::Ready(Arc::clone(&aggregate))) {
            info!(id, %kind, "title aggregate ready");
            Ok(Composition::Ready(aggregate))
        } else {
            debug!(id, generation, "discarding stale aggregate");
            Ok(Composition::Superseded)
        }
    }

    /// Drop whatever is in flight or displayed and return to `Idle`.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.state.send_replace(ComposerState::Idle);
    }

    /// Delete the title. On success the current aggregate is discarded; on
    /// failure the state is left untouched.
    pub async fn delete_title(&self, id: &str) -> Result<(), ApiError> {
        let response = self.resources.execute(self.client.build_delete_title(id)).await?;
        self.client.parse_empty(response)?;
        info!(id, "title deleted");
        self.cancel();
        Ok(())
    }

    async fn fetch_primary(&self, id: &str) -> Result<TitleDetail, ApiError> {
        let response = self.resources.execute(self.client.build_get_title(id)).await?;
        let detail = self.client.parse_get_title(response)?;
        if detail.title.id_title != id {
            return Err(ApiError::Decode(format!(
                "requested title `{id}` but received `{}`",
                detail.title.id_title
            )));
        }
        Ok(detail)
    }

    /// Embedded record if the primary carried one for `id`, else the kind
    /// endpoint. Records naming another title are dropped.
    async fn fetch_kind_record(&self, id: &str, detail: &TitleDetail) -> Option<KindRecord> {
        match detail.embedded_record() {
            Some(record) if record.belongs_to(id) => return Some(record),
            Some(record) => warn!(id, owner = record.id_title(), "ignoring embedded record of another title"),
            None => {}
        }
        let kind = detail.title.title_kind;
        let result = match self.resources.execute(self.client.build_get_kind_record(id, kind)).await {
            Ok(response) => self.client.parse_kind_record(kind, response),
            Err(e) => Err(e),
        };
        match result {
            Ok(record) if record.belongs_to(id) => Some(record),
            Ok(record) => {
                warn!(id, owner = record.id_title(), "kind endpoint answered for another title");
                None
            }
            Err(e) => {
                debug!(id, %kind, error = %e, "no kind-specific record");
                None
            }
        }
    }

    /// Replace the state if `generation` is still the latest.
    fn publish(&self, generation: u64, next: ComposerState) -> bool {
        self.state.send_if_modified(|state| {
            if self.generation.load(Ordering::SeqCst) != generation {
                return false;
            }
            *state = next;
            true
        })
    }
}
