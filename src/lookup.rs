use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use url::Url;

pub const LOOKUP_ENDPOINT: &str = "https://erp.ayaanmr.com/urlapi/api/url/getapi";
pub const LOOKUP_API_KEY: &str = "TESTKEYITM";
pub const LOOKUP_UID: &str = "API";
pub const LOOKUP_UPW: &str = "ba1234";

const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Phase of a remote item fetch. Replaced wholesale on every attempt,
/// discarded when the screen is left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LookupState {
    #[default]
    Empty,
    Loading,
    Error(String),
    Success(ItemRecord),
}

impl LookupState {
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    #[must_use]
    pub fn record(&self) -> Option<&ItemRecord> {
        match self {
            Self::Success(record) => Some(record),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum LookupError {
    #[error("No ID provided")]
    MissingId,

    #[error("No internet connection. Please check your network and try again.")]
    Offline,

    #[error("HTTP error! Status: {status} - {reason}")]
    Status { status: u16, reason: String },

    #[error("No item found for this ID.")]
    NoItem,

    #[error("{message}")]
    Transport { message: String },

    #[error("{message}")]
    Malformed { message: String },
}

/// Free-form item record as the lookup service returns it.
///
/// The service contract only promises a JSON mapping; `ItmID`, `ItmNm` and
/// `ItmThmbnl` are the fields the item screen renders, everything else is
/// kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct ItemRecord {
    fields: serde_json::Map<String, Value>,
}

impl ItemRecord {
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    /// `ItmID` rendered for display, "N/A" when absent or unrenderable.
    #[must_use]
    pub fn item_id_text(&self) -> String {
        field_text(self.fields.get("ItmID"))
    }

    /// `ItmNm` rendered for display, "N/A" when absent or unrenderable.
    #[must_use]
    pub fn name_text(&self) -> String {
        field_text(self.fields.get("ItmNm"))
    }

    #[must_use]
    pub fn thumbnail_b64(&self) -> Option<&str> {
        self.fields.get("ItmThmbnl").and_then(Value::as_str)
    }

    /// Decodes `ItmThmbnl` (bare base64, no data-URI prefix) and checks the
    /// PNG signature. An undecodable thumbnail degrades to `None`; it never
    /// fails the lookup.
    #[must_use]
    pub fn decoded_thumbnail_png(&self) -> Option<Vec<u8>> {
        let encoded = self.thumbnail_b64()?;
        if encoded.is_empty() {
            return None;
        }

        let bytes = match base64::engine::general_purpose::STANDARD.decode(encoded.trim()) {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(error = %e, "thumbnail is not valid base64");
                return None;
            }
        };

        if !bytes.starts_with(&PNG_MAGIC) {
            tracing::warn!(len = bytes.len(), "thumbnail bytes are not a PNG");
            return None;
        }

        Some(bytes)
    }
}

/// Builds the lookup request URL with the static service credentials and
/// the scanned id in `P1`. `P2`..`P4` are unused by this app but the
/// service requires them to be present.
pub fn lookup_url(id: &str) -> Result<Url, LookupError> {
    Url::parse_with_params(
        LOOKUP_ENDPOINT,
        &[
            ("APIKEY", LOOKUP_API_KEY),
            ("UID", LOOKUP_UID),
            ("UPW", LOOKUP_UPW),
            ("P1", id),
            ("P2", ""),
            ("P3", ""),
            ("P4", ""),
        ],
    )
    .map_err(|e| LookupError::Transport {
        message: e.to_string(),
    })
}

/// Normalizes the lookup response body into a single record.
///
/// The service answers with either an array of records (first one wins) or
/// a single object; anything else means the id matched nothing.
pub fn normalize_response(body: &str) -> Result<ItemRecord, LookupError> {
    let value: Value = serde_json::from_str(body).map_err(|e| LookupError::Malformed {
        message: format!("failed to parse response: {e}"),
    })?;

    match value {
        Value::Array(items) => items
            .into_iter()
            .next()
            .and_then(|first| serde_json::from_value(first).ok())
            .ok_or(LookupError::NoItem),
        Value::Object(fields) => Ok(ItemRecord { fields }),
        _ => Err(LookupError::NoItem),
    }
}

fn field_text(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        _ => "N/A".to_string(),
    }
}
