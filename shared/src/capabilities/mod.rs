mod http;
mod kv;

pub use self::http::{ApiError, HttpCapability, ProductApi, ValidatedUrl, MAX_URL_LENGTH};
pub use self::kv::{KvCapability, KvKey, StorageError, StoredSetting};

pub use crux_core::render::Render;
pub use crux_http::Http;
pub use crux_kv::KeyValue;

use crate::event::Event;
use crate::App;

#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("HTTP error: {0}")]
    Http(#[from] ApiError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// The shell sees one `Effect` variant per capability: `Http`, `KeyValue`
/// and `Render`.
#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub kv: KeyValue<Event>,
    pub render: Render<Event>,
}
