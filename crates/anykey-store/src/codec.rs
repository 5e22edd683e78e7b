//! Binary framing for serialized containers.
//!
//! ```text
//! [4 bytes: magic "AKEY"]
//! [1 byte:  format version]
//! [1 byte:  variant tag]
//! [N bytes: payload (bincode-serialized container state)]
//! ```
//!
//! Only a round trip within the same variant and format version is
//! supported; anything else is rejected with [`StoreError::Format`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::trace;

use crate::error::{StoreError, StoreResult};

const MAGIC: &[u8; 4] = b"AKEY";

/// Current format version.
pub const FORMAT_VERSION: u8 = 1;

/// Header size: magic + version + tag.
const HEADER_SIZE: usize = 6;

/// Identifies which container variant produced a payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum VariantTag {
    Strict = 1,
    AnyKey = 2,
    Native = 3,
}

impl VariantTag {
    fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            1 => Some(Self::Strict),
            2 => Some(Self::AnyKey),
            3 => Some(Self::Native),
            _ => None,
        }
    }
}

/// Encode container state behind a header for `tag`.
pub fn encode<T: Serialize>(tag: VariantTag, state: &T) -> StoreResult<Vec<u8>> {
    let payload =
        bincode::serialize(state).map_err(|e| StoreError::Serialization(e.to_string()))?;
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.extend_from_slice(MAGIC);
    buf.push(FORMAT_VERSION);
    buf.push(tag as u8);
    buf.extend_from_slice(&payload);
    trace!(?tag, bytes = buf.len(), "encoded container");
    Ok(buf)
}

/// Decode container state, checking that the header matches `tag`.
pub fn decode<T: DeserializeOwned>(tag: VariantTag, data: &[u8]) -> StoreResult<T> {
    if data.len() < HEADER_SIZE {
        return Err(StoreError::Format(format!(
            "too short: have {} bytes, need at least {HEADER_SIZE}",
            data.len()
        )));
    }
    if &data[..4] != MAGIC {
        return Err(StoreError::Format("bad magic".into()));
    }
    if data[4] != FORMAT_VERSION {
        return Err(StoreError::Format(format!(
            "unsupported version {} (expected {FORMAT_VERSION})",
            data[4]
        )));
    }
    match VariantTag::from_byte(data[5]) {
        Some(found) if found == tag => {}
        Some(found) => {
            return Err(StoreError::Format(format!(
                "variant mismatch: payload is {found:?}, expected {tag:?}"
            )))
        }
        None => return Err(StoreError::Format(format!("unknown variant tag {}", data[5]))),
    }
    trace!(?tag, bytes = data.len(), "decoding container");
    bincode::deserialize(&data[HEADER_SIZE..])
        .map_err(|e| StoreError::Deserialization(e.to_string()))
}
