//! Price endpoint wire types and HTTP client
//!
//! One request shape, one response shape. The endpoint answers a POST of
//! `{"stock_name": "..."}` with `{"price": ...}`, or with `{"error": "..."}`
//! when it cannot resolve the symbol.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Body sent to the price endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PriceRequest {
    pub stock_name: String,
}

/// A resolved price for one stock name
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Quote {
    pub stock_name: String,
    pub price: Value,
}

impl Quote {
    /// The price as it should appear on screen.
    /// Strings are shown without quotes, everything else as its JSON text.
    pub fn display_price(&self) -> String {
        match &self.price {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Everything that can go wrong between reading the input and showing a price
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FetchError {
    #[error("Please enter a stock name")]
    EmptyInput,

    #[error("{0}")]
    Transport(String),

    #[error("{0}")]
    Parse(String),

    #[error("{0}")]
    Rejected(String),
}

/// HTTP client bound to a single price endpoint
#[derive(Debug, Clone)]
pub struct PriceClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl PriceClient {
    /// Create a client for `endpoint`. Without a timeout a request waits
    /// until the network layer resolves or rejects it.
    pub fn new(endpoint: impl Into<String>, timeout: Option<Duration>) -> Self {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        // Client::new() is infallible, use it if the builder can't initialize TLS
        let http_client = builder.build().unwrap_or_else(|e| {
            tracing::warn!("Falling back to default HTTP client: {}", e);
            reqwest::Client::new()
        });

        Self {
            http_client,
            endpoint: endpoint.into(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// POST one lookup and decode the answer.
    ///
    /// `stock_name` is sent as given; trimming and the empty check belong to
    /// the caller.
    pub async fn fetch(&self, stock_name: &str) -> Result<Quote, FetchError> {
        let request = PriceRequest {
            stock_name: stock_name.to_string(),
        };

        tracing::debug!(endpoint = %self.endpoint, stock_name, "Requesting price");

        // .json() sets Content-Type: application/json
        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| FetchError::Transport(describe(&e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(describe(&e)))?;

        tracing::debug!(%status, bytes = body.len(), "Price response received");

        let price = parse_price_body(status.as_u16(), &body)?;

        Ok(Quote {
            stock_name: request.stock_name,
            price,
        })
    }
}

/// Pull the price out of a response body.
///
/// The HTTP status only decorates error text; the body alone decides
/// whether the lookup succeeded.
pub fn parse_price_body(status: u16, body: &str) -> Result<Value, FetchError> {
    let parsed: Value = serde_json::from_str(body)
        .map_err(|e| FetchError::Parse(format!("Invalid JSON in response (HTTP {}): {}", status, e)))?;

    if let Some(price) = parsed.get("price") {
        return Ok(price.clone());
    }

    match parsed.get("error").and_then(|v| v.as_str()) {
        Some(message) => Err(FetchError::Rejected(message.to_string())),
        None => Err(FetchError::Parse(format!(
            "Response has no price field (HTTP {})",
            status
        ))),
    }
}

/// Flatten an error and its sources into one line
fn describe(err: &(dyn std::error::Error + 'static)) -> String {
    let mut text = err.to_string();
    let mut source = std::error::Error::source(err);
    while let Some(inner) = source {
        let inner_text = inner.to_string();
        if !text.contains(&inner_text) {
            text.push_str(": ");
            text.push_str(&inner_text);
        }
        source = std::error::Error::source(inner);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_display_price_is_verbatim() {
        let quote = Quote {
            stock_name: "ACME".to_string(),
            price: json!("123.45"),
        };
        assert_eq!(quote.display_price(), "123.45");

        let quote = Quote {
            stock_name: "ACME".to_string(),
            price: json!(2801.12),
        };
        assert_eq!(quote.display_price(), "2801.12");

        let quote = Quote {
            stock_name: "ACME".to_string(),
            price: Value::Null,
        };
        assert_eq!(quote.display_price(), "null");
    }

    #[test]
    fn test_parse_price_body() {
        assert_eq!(parse_price_body(200, r#"{"price":"123.45"}"#), Ok(json!("123.45")));
        assert_eq!(parse_price_body(200, r#"{"price":17,"symbol":"X"}"#), Ok(json!(17)));

        // Status doesn't matter if the body carries a price
        assert_eq!(parse_price_body(500, r#"{"price":1}"#), Ok(json!(1)));
    }

    #[test]
    fn test_parse_price_body_rejected() {
        let err = parse_price_body(404, r#"{"error":"Stock 'ZZZ' not found"}"#).unwrap_err();
        assert_eq!(err, FetchError::Rejected("Stock 'ZZZ' not found".to_string()));
    }

    #[test]
    fn test_parse_price_body_missing_price() {
        let err = parse_price_body(200, r#"{"ltp":5}"#).unwrap_err();
        assert!(matches!(err, FetchError::Parse(_)));
        assert!(err.to_string().contains("no price field"));
    }

    #[test]
    fn test_parse_price_body_invalid_json() {
        let err = parse_price_body(502, "<html>Bad Gateway</html>").unwrap_err();
        match err {
            FetchError::Parse(msg) => {
                assert!(msg.contains("HTTP 502"));
                assert!(!msg.contains("Bad Gateway"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_sends_json_post() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/get_price"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({"stock_name": "ACME"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"price": "123.45"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = PriceClient::new(format!("{}/get_price", server.uri()), None);
        let quote = client.fetch("ACME").await.unwrap();

        assert_eq!(quote.stock_name, "ACME");
        assert_eq!(quote.display_price(), "123.45");
    }

    #[tokio::test]
    async fn test_fetch_connection_refused() {
        // Nothing listens on port 1
        let client = PriceClient::new("http://127.0.0.1:1/get_price", None);
        let err = client.fetch("ACME").await.unwrap_err();

        match err {
            FetchError::Transport(msg) => {
                assert!(msg.contains("127.0.0.1:1"), "unexpected message: {}", msg);
                assert!(msg.to_lowercase().contains("connection refused"), "unexpected message: {}", msg);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[derive(Debug, thiserror::Error)]
    #[error("tcp connect error")]
    struct ConnectError(#[source] std::io::Error);

    #[derive(Debug, thiserror::Error)]
    #[error("request failed: {0}")]
    struct EchoingError(#[source] std::io::Error);

    #[test]
    fn test_describe_walks_source_chain() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Connection refused");
        let text = describe(&ConnectError(io));
        assert_eq!(text, "tcp connect error: Connection refused");
    }

    #[test]
    fn test_describe_skips_repeated_source() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "Connection refused");
        let text = describe(&EchoingError(io));
        assert_eq!(text, "request failed: Connection refused");
        assert_eq!(text.matches("Connection refused").count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_timeout() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"price": 1}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client = PriceClient::new(server.uri(), Some(Duration::from_millis(50)));
        let err = client.fetch("ACME").await.unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
