//! JSON encoding of the sticker map as stored on disk.

use serde::de::Error as _;
use crate::error::{Result, StickerError};
use crate::sticker::StickerMap;

/// Parses a persisted sticker document
///
/// Every entry must be keyed by its own `name`.
pub fn decode(bytes: &[u8]) -> Result<StickerMap> {
    let stickers: StickerMap = serde_json::from_slice(bytes).map_err(StickerError::Decode)?;
    if let Some((key, sticker)) = stickers.iter().find(|(key, sticker)| **key != sticker.name) {
        return Err(StickerError::Decode(serde_json::Error::custom(format!(
            "entry '{key}' holds sticker named '{}'",
            sticker.name
        ))));
    }
    Ok(stickers)
}

/// Pretty-prints the sticker map for writing to disk
pub fn encode(stickers: &StickerMap) -> Result<Vec<u8>> {
    serde_json::to_vec_pretty(stickers).map_err(StickerError::Encode)
}
