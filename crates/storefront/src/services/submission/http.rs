//! Order endpoint submitter.
//!
//! POSTs [`presto_core::OrderPayload`] JSON to a configured endpoint. Any 2xx
//! response counts as accepted. A `Location` header on the response, if it
//! parses as an absolute URL, becomes the receipt's redirect.

use std::time::Duration;

use async_trait::async_trait;
use presto_core::Order;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, LOCATION};
use secrecy::ExposeSecret;
use url::Url;

use super::{OrderSubmitter, SubmissionError, SubmissionReceipt};
use crate::config::HttpEndpointConfig;

/// Longest response body kept in a rejection message.
const MAX_REJECTION_MESSAGE: usize = 512;

/// Submits orders to an HTTP endpoint.
#[derive(Clone)]
pub struct HttpSubmitter {
    client: reqwest::Client,
    url: Url,
}

impl std::fmt::Debug for HttpSubmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpSubmitter")
            .field("url", &self.url.as_str())
            .finish_non_exhaustive()
    }
}

impl HttpSubmitter {
    /// Create a submitter for `endpoint`.
    ///
    /// The client-level timeout matches the checkout timeout so a hung
    /// request releases its connection.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(endpoint: &HttpEndpointConfig, timeout: Duration) -> Result<Self, SubmissionError> {
        let mut headers = HeaderMap::new();

        if let Some(token) = &endpoint.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|_| {
                    SubmissionError::Configuration(
                        "order endpoint token is not a valid header value".to_string(),
                    )
                })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            url: endpoint.url.clone(),
        })
    }
}

#[async_trait]
impl OrderSubmitter for HttpSubmitter {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn submit(&self, order: &Order) -> Result<SubmissionReceipt, SubmissionError> {
        let response = self
            .client
            .post(self.url.clone())
            .json(&order.payload())
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    SubmissionError::Timeout
                } else {
                    SubmissionError::Request(e)
                }
            })?;
        let status = response.status();

        if !status.is_success() {
            let mut message = response.text().await.unwrap_or_default();
            if message.len() > MAX_REJECTION_MESSAGE {
                let cut = (0..=MAX_REJECTION_MESSAGE)
                    .rev()
                    .find(|i| message.is_char_boundary(*i))
                    .unwrap_or(0);
                message.truncate(cut);
            }
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let redirect_url = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Url::parse(value).ok());

        tracing::debug!(status = status.as_u16(), "Order endpoint accepted order");
        Ok(SubmissionReceipt { redirect_url })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use presto_core::{Cart, CatalogItem, ItemId, PhoneNumber, PhoneRule, Price};
    use secrecy::SecretString;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn order() -> Order {
        let mut cart = Cart::new();
        cart.add(&CatalogItem {
            id: ItemId::new("p1"),
            name: "Pizza Pepperoni".to_owned(),
            description: String::new(),
            price: Price::new(70_000),
            image_url: String::new(),
            category: "Menu".to_owned(),
        });
        let phone = PhoneNumber::parse("+998901234567", &PhoneRule::default()).unwrap();
        Order::from_cart(&cart, Some(phone)).unwrap()
    }

    fn submitter(server: &MockServer, token: Option<&str>) -> HttpSubmitter {
        let endpoint = HttpEndpointConfig {
            url: Url::parse(&format!("{}/orders", server.uri())).unwrap(),
            token: token.map(SecretString::from),
        };
        HttpSubmitter::new(&endpoint, Duration::from_secs(5)).unwrap()
    }

    #[tokio::test]
    async fn test_posts_order_json_with_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/orders"))
            .and(header("authorization", "Bearer k9Qz2LmX7vR4tW8p"))
            .and(body_json(json!({
                "phone": "+998901234567",
                "items": [{ "id": "p1", "name": "Pizza Pepperoni", "quantity": 1, "price": 70000 }],
                "totalPrice": 70000
            })))
            .respond_with(ResponseTemplate::new(201))
            .expect(1)
            .mount(&server)
            .await;

        let receipt = submitter(&server, Some("k9Qz2LmX7vR4tW8p"))
            .submit(&order())
            .await
            .unwrap();
        assert_eq!(receipt.redirect_url, None);
    }

    #[tokio::test]
    async fn test_location_header_becomes_redirect() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/orders"))
            .respond_with(
                ResponseTemplate::new(201)
                    .insert_header("location", "https://orders.test/track/42"),
            )
            .mount(&server)
            .await;

        let receipt = submitter(&server, None).submit(&order()).await.unwrap();
        assert_eq!(
            receipt.redirect_url.unwrap().as_str(),
            "https://orders.test/track/42"
        );
    }

    #[tokio::test]
    async fn test_non_success_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/orders"))
            .respond_with(ResponseTemplate::new(503).set_body_string("kitchen closed"))
            .mount(&server)
            .await;

        let err = submitter(&server, None).submit(&order()).await.unwrap_err();
        assert!(matches!(
            err,
            SubmissionError::Rejected { status: 503, ref message } if message == "kitchen closed"
        ));
    }

    #[tokio::test]
    async fn test_slow_endpoint_times_out() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
            .mount(&server)
            .await;

        let endpoint = HttpEndpointConfig {
            url: Url::parse(&format!("{}/orders", server.uri())).unwrap(),
            token: None,
        };
        let submitter = HttpSubmitter::new(&endpoint, Duration::from_millis(100)).unwrap();
        let err = submitter.submit(&order()).await.unwrap_err();
        assert!(matches!(err, SubmissionError::Timeout));
    }
}
