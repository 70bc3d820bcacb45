//! Price fetch handler
//!
//! Reacts to one trigger: shows a pending message, validates the stock name,
//! performs a single lookup and writes the price or an error to an output
//! sink. Overlapping triggers run independently; the render policy decides
//! whether a late response from an older trigger may still overwrite the
//! output.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::quote::{FetchError, PriceClient, Quote};

/// Shown as soon as a trigger fires
pub const PENDING_MESSAGE: &str = "Fetching price...";

/// Every failure shown to the user starts with this
pub const ERROR_PREFIX: &str = "Error: ";

/// What a message written to the sink represents
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Pending,
    Price,
    Error,
}

/// Where status and result text ends up
pub trait OutputSink: Send + Sync {
    fn show(&self, kind: MessageKind, message: &str);
}

/// What happens when responses arrive out of order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderPolicy {
    /// Every completion writes; whichever finishes last wins
    #[default]
    LastWriteWins,
    /// Only the most recently issued trigger may write its outcome
    LatestOnly,
}

#[derive(Debug, Clone)]
pub struct PriceFetchHandler {
    client: PriceClient,
    policy: RenderPolicy,
    latest: Arc<AtomicU64>,
}

impl PriceFetchHandler {
    pub fn new(client: PriceClient, policy: RenderPolicy) -> Self {
        Self {
            client,
            policy,
            latest: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn policy(&self) -> RenderPolicy {
        self.policy
    }

    pub fn endpoint(&self) -> &str {
        self.client.endpoint()
    }

    /// Handle one trigger. The outcome is only observable through `sink`.
    pub async fn handle(&self, input: &str, sink: &dyn OutputSink) {
        let request_id = self.latest.fetch_add(1, Ordering::SeqCst) + 1;

        sink.show(MessageKind::Pending, PENDING_MESSAGE);

        let result = self.lookup(input).await;

        if matches!(result, Err(FetchError::EmptyInput)) {
            // Local validation failure, nothing went over the wire
            sink.show(MessageKind::Error, &render(&result));
            return;
        }

        if self.policy == RenderPolicy::LatestOnly {
            let newest = self.latest.load(Ordering::SeqCst);
            if newest != request_id {
                tracing::debug!(request_id, newest, "Discarding stale price response");
                return;
            }
        }

        match &result {
            Ok(quote) => tracing::info!(stock_name = %quote.stock_name, price = %quote.price, "Price fetched"),
            Err(e) => tracing::warn!("Price lookup failed: {}", e),
        }

        let kind = if result.is_ok() { MessageKind::Price } else { MessageKind::Error };
        sink.show(kind, &render(&result));
    }

    /// Validate and fetch without touching any sink
    pub async fn lookup(&self, input: &str) -> Result<Quote, FetchError> {
        let stock_name = input.trim();
        if stock_name.is_empty() {
            return Err(FetchError::EmptyInput);
        }
        self.client.fetch(stock_name).await
    }
}

/// Display text for a lookup outcome
pub fn render(result: &Result<Quote, FetchError>) -> String {
    match result {
        Ok(quote) => quote.display_price(),
        Err(e) => format!("{}{}", ERROR_PREFIX, e),
    }
}
