use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crux_http::{Http, Response};

use crate::event::Event;
use crate::model::{Product, ProductDraft, ProductId, ProductPatch};
use crate::query::{CountQuery, FetchTicket, OutboundQuery};

pub type HttpCapability = Http<Event>;

pub const MAX_URL_LENGTH: usize = 2048;

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum ApiError {
    #[error("network error: {message}")]
    Network { message: String },

    #[error("request timed out")]
    Timeout,

    #[error("resource not found")]
    NotFound,

    #[error("HTTP error {code}")]
    Status { code: u16 },

    #[error("unexpected response body: {message}")]
    Decode { message: String },

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

impl ApiError {
    #[must_use]
    pub fn from_status(code: u16) -> Self {
        if code == 404 {
            Self::NotFound
        } else {
            Self::Status { code }
        }
    }
}

impl From<crux_http::Error> for ApiError {
    fn from(e: crux_http::Error) -> Self {
        match e {
            crux_http::Error::Http(http) => Self::from_status(u16::from(http.code)),
            crux_http::Error::Json(message) => Self::Decode { message },
            crux_http::Error::Url(reason) => Self::InvalidUrl {
                url: String::new(),
                reason,
            },
            crux_http::Error::Io(message) => Self::Network { message },
            crux_http::Error::Timeout => Self::Timeout,
        }
    }
}

/// An absolute http(s) URL with a host and no embedded credentials.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValidatedUrl {
    url: String,
    scheme: String,
    host: String,
}

impl ValidatedUrl {
    pub fn new(url: impl Into<String>) -> Result<Self, ApiError> {
        let url = url.into();
        let parsed = Self::validate(&url)?;

        let scheme = parsed.scheme().to_lowercase();
        let host = parsed
            .host_str()
            .map(str::to_lowercase)
            .unwrap_or_default();

        Ok(Self {
            url: parsed.to_string(),
            scheme,
            host,
        })
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.url
    }

    #[must_use]
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    fn validate(url: &str) -> Result<Url, ApiError> {
        let invalid = |reason: String| ApiError::InvalidUrl {
            url: Self::truncate_url(url),
            reason,
        };

        if url.trim().is_empty() {
            return Err(invalid("URL cannot be empty".to_string()));
        }

        if url.len() > MAX_URL_LENGTH {
            return Err(invalid(format!(
                "URL exceeds maximum length of {MAX_URL_LENGTH} bytes"
            )));
        }

        let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;

        let scheme = parsed.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(invalid(format!(
                "invalid scheme '{scheme}', only 'http' and 'https' are allowed"
            )));
        }

        if parsed.host_str().is_none() {
            return Err(invalid("URL must have a host".to_string()));
        }

        if !parsed.username().is_empty() || parsed.password().is_some() {
            return Err(invalid("credentials in URL are not allowed".to_string()));
        }

        Ok(parsed)
    }

    fn truncate_url(url: &str) -> String {
        if url.len() <= 100 {
            url.to_string()
        } else {
            let cut = (0..=100)
                .rev()
                .find(|i| url.is_char_boundary(*i))
                .unwrap_or(0);
            format!("{}...", &url[..cut])
        }
    }
}

/// REST client for the products collection.
///
/// URL construction is pure and tested directly; the `send_*` methods hand
/// the request to the shell through the Crux `Http` capability and turn the
/// response into a typed event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductApi {
    base: Url,
}

impl ProductApi {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let validated = ValidatedUrl::new(base_url)?;
        let base = Url::parse(validated.as_str()).map_err(|e| ApiError::InvalidUrl {
            url: validated.as_str().to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self { base })
    }

    #[must_use]
    pub fn collection_url(&self) -> Url {
        self.base.clone()
    }

    pub fn item_url(&self, id: &ProductId) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.set_query(None);
        url.path_segments_mut()
            .map_err(|()| ApiError::InvalidUrl {
                url: self.base.to_string(),
                reason: "base URL cannot take path segments".to_string(),
            })?
            .pop_if_empty()
            .push(id.as_str());
        Ok(url)
    }

    #[must_use]
    pub fn page_url(&self, query: &OutboundQuery) -> Url {
        self.with_query(query.to_pairs())
    }

    #[must_use]
    pub fn count_url(&self, query: &CountQuery) -> Url {
        self.with_query(query.to_pairs())
    }

    fn with_query(&self, pairs: Vec<(String, String)>) -> Url {
        let mut url = self.base.clone();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        url
    }

    pub fn send_page_request(&self, http: &HttpCapability, ticket: FetchTicket, query: &OutboundQuery) {
        http.get(self.page_url(query))
            .expect_json::<Vec<Product>>()
            .send(move |result| Event::PageLoaded {
                ticket,
                result: Box::new(json_body(result)),
            });
    }

    pub fn send_count_request(&self, http: &HttpCapability, ticket: FetchTicket, query: &CountQuery) {
        http.get(self.count_url(query))
            .expect_json::<Vec<serde_json::Value>>()
            .send(move |result| Event::CountLoaded {
                ticket,
                result: Box::new(json_body(result).map(|rows| rows.len() as u64)),
            });
    }

    pub fn send_get_product(&self, http: &HttpCapability, id: ProductId) -> Result<(), ApiError> {
        let url = self.item_url(&id)?;
        http.get(url)
            .expect_json::<Product>()
            .send(move |result| Event::ProductLoaded {
                id,
                result: Box::new(json_body(result)),
            });
        Ok(())
    }

    pub fn send_create(&self, http: &HttpCapability, draft: &ProductDraft) -> Result<(), ApiError> {
        let body = encode_body(draft)?;
        http.post(self.collection_url())
            .header("Content-Type", "application/json")
            .body(body)
            .send(|result| Event::SaveResponse {
                result: Box::new(empty_body(result)),
            });
        Ok(())
    }

    pub fn send_update(
        &self,
        http: &HttpCapability,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<(), ApiError> {
        let url = self.item_url(id)?;
        let body = encode_body(patch)?;
        http.put(url)
            .header("Content-Type", "application/json")
            .body(body)
            .send(|result| Event::SaveResponse {
                result: Box::new(empty_body(result)),
            });
        Ok(())
    }

    pub fn send_delete(&self, http: &HttpCapability, id: ProductId) -> Result<(), ApiError> {
        let url = self.item_url(&id)?;
        http.delete(url).send(move |result| Event::DeleteResponse {
            id,
            result: Box::new(empty_body(result)),
        });
        Ok(())
    }
}

fn encode_body<T: Serialize>(value: &T) -> Result<Vec<u8>, ApiError> {
    serde_json::to_vec(value).map_err(|e| ApiError::Decode {
        message: e.to_string(),
    })
}

fn checked<T>(result: crux_http::Result<Response<T>>) -> Result<Response<T>, ApiError> {
    let response = result?;
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        Err(ApiError::from_status(u16::from(status)))
    }
}

fn json_body<T>(result: crux_http::Result<Response<T>>) -> Result<T, ApiError> {
    checked(result)?.take_body().ok_or_else(|| ApiError::Decode {
        message: "empty response body".to_string(),
    })
}

fn empty_body(result: crux_http::Result<Response<Vec<u8>>>) -> Result<(), ApiError> {
    checked(result).map(|_| ())
}
