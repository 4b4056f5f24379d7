//! Asynchronous candidate lookup
//!
//! When lookups may be slow, the state machine does not call the provider
//! itself. It hands out a [`QueryTicket`] per query; the host runs the lookup
//! off the event thread and feeds the result back. Only the newest ticket's
//! result is ever applied.
//!
//! [`LookupDispatcher`] is the tokio side of that contract:
//! 1. Every dispatched ticket runs as its own task, bounded by a timeout
//! 2. Dispatching a newer ticket cancels the previous task
//! 3. Finished lookups are reported on an mpsc channel

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

use super::category::TriggerCategory;
use super::provider::{CandidateProvider, CandidateRecord};
use crate::error::ProviderError;

/// Identifies one query issued by the state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    /// Monotonic query counter; only the latest generation is current
    pub generation: u64,
    /// Queried category
    pub category: TriggerCategory,
    /// Query text
    pub query: String,
}

/// How the state machine obtains candidates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LookupMode {
    /// Call the provider synchronously inside the reaction
    #[default]
    Blocking,
    /// Issue a [`QueryTicket`] and wait for the host to deliver results
    Deferred,
}

/// Trait for providers whose lookups are asynchronous
#[async_trait]
pub trait AsyncCandidateProvider: Send + Sync {
    /// Get the records matching `query` in `category`
    async fn lookup(
        &self,
        category: TriggerCategory,
        query: &str,
    ) -> Result<Vec<CandidateRecord>, ProviderError>;
}

#[async_trait]
impl<P> AsyncCandidateProvider for P
where
    P: CandidateProvider + ?Sized,
{
    async fn lookup(
        &self,
        category: TriggerCategory,
        query: &str,
    ) -> Result<Vec<CandidateRecord>, ProviderError> {
        CandidateProvider::lookup(self, category, query)
    }
}

/// A finished lookup
#[derive(Debug)]
pub struct LookupResult {
    /// Ticket the lookup answered
    pub ticket: QueryTicket,
    /// Provider outcome
    pub result: Result<Vec<CandidateRecord>, ProviderError>,
}

/// Runs lookups on the tokio runtime, one live task at a time
pub struct LookupDispatcher {
    provider: Arc<dyn AsyncCandidateProvider>,
    timeout: Duration,
    results: mpsc::UnboundedSender<LookupResult>,
    in_flight: Option<CancellationToken>,
}

impl LookupDispatcher {
    /// Create a dispatcher and the receiving end of its result channel
    ///
    /// # Arguments
    /// * `provider` - Asynchronous candidate provider
    /// * `timeout` - Upper bound for a single lookup
    pub fn new(
        provider: Arc<dyn AsyncCandidateProvider>,
        timeout: Duration,
    ) -> (Self, mpsc::UnboundedReceiver<LookupResult>) {
        let (results, rx) = mpsc::unbounded_channel();
        (
            Self {
                provider,
                timeout,
                results,
                in_flight: None,
            },
            rx,
        )
    }

    /// Start a lookup for `ticket`, cancelling whichever lookup is still
    /// running.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&mut self, ticket: QueryTicket) {
        self.cancel();

        let token = CancellationToken::new();
        self.in_flight = Some(token.clone());

        let provider = Arc::clone(&self.provider);
        let results = self.results.clone();
        let timeout = self.timeout;

        tokio::spawn(async move {
            trace!(generation = ticket.generation, "lookup started");
            let lookup = tokio::time::timeout(
                timeout,
                provider.lookup(ticket.category, &ticket.query),
            );

            let result = tokio::select! {
                outcome = lookup => match outcome {
                    Ok(result) => result,
                    Err(_) => Err(ProviderError::Timeout),
                },
                _ = token.cancelled() => {
                    debug!(generation = ticket.generation, "lookup superseded");
                    return;
                }
            };

            // The receiver may already be gone when the host shuts down
            let _ = results.send(LookupResult { ticket, result });
        });
    }

    /// Cancel the running lookup, if any
    pub fn cancel(&mut self) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }
    }
}

impl Drop for LookupDispatcher {
    fn drop(&mut self) {
        self.cancel();
    }
}
