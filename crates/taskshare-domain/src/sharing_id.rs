//! Composite sharing identifier codec.
//!
//! A sharing identifier addresses "this category's slot within this share
//! root" towards the sharing-management collaborator, without exposing the
//! topology cache structure. It is the pipe-joined pair
//! `<rootShareId>|<categoryId>` and must round-trip exactly.

use crate::error::{ShareError, ShareResult};
use crate::model::CategoryId;

const TOKEN_SEPARATOR: char = '|';

/// Encodes a `(root share id, category id)` pair into a sharing identifier.
pub fn encode_sharing_id(root_share_id: &str, category_id: CategoryId) -> String {
    format!("{root_share_id}{TOKEN_SEPARATOR}{category_id}")
}

/// Parses a sharing identifier back into its `(root share id, category id)`
/// pair.
///
/// Fails with [`ShareError::MalformedSharingId`] unless the input is exactly
/// two tokens and the second one is a valid category id.
pub fn parse_sharing_id(value: &str) -> ShareResult<(String, CategoryId)> {
    let malformed = || ShareError::MalformedSharingId {
        value: value.to_string(),
    };

    let mut tokens = value.split(TOKEN_SEPARATOR);
    let root_share_id = tokens.next().filter(|t| !t.is_empty()).ok_or_else(malformed)?;
    let category_token = tokens.next().ok_or_else(malformed)?;
    if tokens.next().is_some() {
        return Err(malformed());
    }

    let category_id: CategoryId = category_token.parse().map_err(|_| malformed())?;
    Ok((root_share_id.to_string(), category_id))
}
