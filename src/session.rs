//! Search session state.

use thiserror::Error;
use tracing::info;

use crate::{
    broker::{BearerToken, BrokerError, TokenBroker},
    directory::{DirectoryError, DirectoryFetcher, DirectorySnapshot},
    search::{
        ConsoleError, ConsoleEvent, QueryBuffer, RenderFrame, Transition, render_frame,
        transition,
    },
    store::{ClientProfile, TenantProfile},
};

/// Failures opening or running a search session.
#[derive(Debug, Error)]
pub enum SessionError {
    /// Token negotiation failed.
    #[error("could not obtain a token")]
    Broker(#[from] BrokerError),

    /// Directory fetch failed.
    #[error("could not fetch the client directory")]
    Directory(#[from] DirectoryError),

    /// Terminal failure while the console was open.
    #[error("search console failed")]
    Console(#[from] ConsoleError),

    /// The client's flow never hands a token back to the tool.
    #[error(
        "client {0} is a single-page application; its token is only shown in the browser \
         and can't be used to search"
    )]
    NoBearerToken(String),
}

/// One search session: the token it was opened with, the directory it
/// searches and the console's editing state.
#[derive(Debug)]
pub struct Session {
    token: BearerToken,
    snapshot: DirectorySnapshot,
    names: Vec<String>,
    query: QueryBuffer,
    view: RenderFrame,
}

impl Session {
    /// Session over an already fetched snapshot, with an empty query.
    #[must_use]
    pub fn new(token: BearerToken, snapshot: DirectorySnapshot) -> Self {
        Self {
            token,
            names: snapshot.names(),
            snapshot,
            query: QueryBuffer::new(),
            view: RenderFrame::default(),
        }
    }

    /// Get a token for `client` and fetch the directory of `tenant` with it.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoBearerToken`] for single-page clients and
    /// passes broker and fetcher errors through.
    pub async fn open(
        broker: &TokenBroker,
        fetcher: &DirectoryFetcher,
        client: &ClientProfile,
        tenant: &TenantProfile,
    ) -> Result<Self, SessionError> {
        let token = broker
            .acquire(client, tenant)
            .await?
            .into_bearer()
            .ok_or_else(|| SessionError::NoBearerToken(client.name.clone()))?;

        let snapshot = fetcher.fetch_all(&token).await?;

        info!(tenant = %tenant.name, entries = snapshot.len(), "search session ready");

        Ok(Self::new(token, snapshot))
    }

    /// Token the session was opened with.
    #[must_use]
    pub fn token(&self) -> &BearerToken {
        &self.token
    }

    /// Directory being searched.
    #[must_use]
    pub fn snapshot(&self) -> &DirectorySnapshot {
        &self.snapshot
    }

    /// Current query buffer.
    #[must_use]
    pub fn query(&self) -> &QueryBuffer {
        &self.query
    }

    /// The last rendered frame.
    #[must_use]
    pub fn view(&self) -> &RenderFrame {
        &self.view
    }

    /// Apply a console event, re-running the search when the query changed.
    pub fn apply(&mut self, event: ConsoleEvent) -> Transition {
        let (query, step) = transition(&self.query, event);
        self.query = query;

        if step.rerender {
            self.view = render_frame(&self.query.query(), &self.snapshot, &self.names);
        }

        step
    }
}
