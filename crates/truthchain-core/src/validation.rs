//! Input validation for registration and flagging.
//!
//! Records are fixed-capacity, so oversized metadata is rejected rather than
//! truncated.

use crate::crypto::Fingerprint;
use crate::error::ValidationError;
use crate::record::{
    DocumentMetadata, MAX_CATS_NUMBER_LEN, MAX_CONTENT_LOCATOR_LEN, MAX_DOCUMENT_TYPE_LEN,
    MAX_TITLE_LEN,
};

/// Parse caller-supplied digest bytes into a [`Fingerprint`].
pub fn parse_fingerprint(field: &'static str, bytes: &[u8]) -> Result<Fingerprint, ValidationError> {
    Fingerprint::from_slice(field, bytes)
}

/// Validate metadata field lengths.
///
/// Checks fields in declaration order and reports the first one over its bound.
pub fn validate_metadata(metadata: &DocumentMetadata) -> Result<(), ValidationError> {
    check_len("document_type", &metadata.document_type, MAX_DOCUMENT_TYPE_LEN)?;

    if let Some(ref cats) = metadata.cats_number {
        check_len("cats_number", cats, MAX_CATS_NUMBER_LEN)?;
    }

    check_len(
        "content_locator",
        &metadata.content_locator,
        MAX_CONTENT_LOCATOR_LEN,
    )?;
    check_len("title", &metadata.title, MAX_TITLE_LEN)?;

    Ok(())
}

fn check_len(field: &'static str, value: &str, max: usize) -> Result<(), ValidationError> {
    if value.len() > max {
        return Err(ValidationError::MetadataTooLong {
            field,
            len: value.len(),
            max,
        });
    }
    Ok(())
}
