//! Canonical CBOR encoding for operation intents.
//!
//! This module implements the subset of RFC 8949 Core Deterministic Encoding
//! needed to sign intents:
//! - Integer map keys, written in ascending order
//! - Integers use smallest valid encoding
//! - Definite lengths only
//! - No floats
//!
//! A caller that signs an intent on one machine must produce byte-identical
//! input to the verifier on another, so nothing here may depend on map
//! iteration order or serializer defaults.

use crate::authority::OperationIntent;
use crate::record::DocumentMetadata;

/// Domain prefix for signed intents.
pub const SIGN_DOMAIN: &[u8] = b"truthchain-intent-v0:";

/// Intent field keys (integer keys for compact encoding).
///
/// Keys 0-23 encode as single bytes in CBOR.
mod keys {
    pub const OP: u64 = 0;
    pub const FINGERPRINT: u64 = 1;
    pub const NEW_HASH: u64 = 2;
    pub const DOCUMENT_TYPE: u64 = 3;
    pub const CATS_NUMBER: u64 = 4;
    pub const CONTENT_LOCATOR: u64 = 5;
    pub const PAGE_NUMBER: u64 = 6;
    pub const TITLE: u64 = 7;
}

/// Operation codes.
mod ops {
    pub const INITIALIZE_REGISTRY: u64 = 1;
    pub const REGISTER_DOCUMENT: u64 = 2;
    pub const FLAG_MODIFICATION: u64 = 3;
}

/// Encode an intent to canonical CBOR bytes.
pub fn intent_bytes(intent: &OperationIntent) -> Vec<u8> {
    let mut buf = Vec::new();
    match intent {
        OperationIntent::InitializeRegistry => {
            encode_uint(&mut buf, 5, 1);
            encode_uint(&mut buf, 0, keys::OP);
            encode_uint(&mut buf, 0, ops::INITIALIZE_REGISTRY);
        }
        OperationIntent::RegisterDocument {
            fingerprint,
            metadata,
        } => {
            encode_uint(&mut buf, 5, 7);
            encode_uint(&mut buf, 0, keys::OP);
            encode_uint(&mut buf, 0, ops::REGISTER_DOCUMENT);
            encode_uint(&mut buf, 0, keys::FINGERPRINT);
            encode_bytes(&mut buf, fingerprint.as_bytes());
            encode_metadata(&mut buf, metadata);
        }
        OperationIntent::FlagModification {
            fingerprint,
            new_hash,
        } => {
            encode_uint(&mut buf, 5, 3);
            encode_uint(&mut buf, 0, keys::OP);
            encode_uint(&mut buf, 0, ops::FLAG_MODIFICATION);
            encode_uint(&mut buf, 0, keys::FINGERPRINT);
            encode_bytes(&mut buf, fingerprint.as_bytes());
            encode_uint(&mut buf, 0, keys::NEW_HASH);
            encode_bytes(&mut buf, new_hash.as_bytes());
        }
    }
    buf
}

/// Construct the signed message (domain || canonical intent).
pub fn signed_message(intent: &OperationIntent) -> Vec<u8> {
    let mut buf = SIGN_DOMAIN.to_vec();
    buf.extend_from_slice(&intent_bytes(intent));
    buf
}

/// Metadata entries, keys 3..=7 in order.
fn encode_metadata(buf: &mut Vec<u8>, metadata: &DocumentMetadata) {
    encode_uint(buf, 0, keys::DOCUMENT_TYPE);
    encode_text(buf, &metadata.document_type);

    encode_uint(buf, 0, keys::CATS_NUMBER);
    match &metadata.cats_number {
        Some(cats) => encode_text(buf, cats),
        None => buf.push(0xf6),
    }

    encode_uint(buf, 0, keys::CONTENT_LOCATOR);
    encode_text(buf, &metadata.content_locator);

    encode_uint(buf, 0, keys::PAGE_NUMBER);
    encode_uint(buf, 0, u64::from(metadata.page_number));

    encode_uint(buf, 0, keys::TITLE);
    encode_text(buf, &metadata.title);
}

/// Encode an unsigned integer with the given major type.
fn encode_uint(buf: &mut Vec<u8>, major: u8, n: u64) {
    let mt = major << 5;
    if n < 24 {
        buf.push(mt | (n as u8));
    } else if n <= 0xff {
        buf.push(mt | 24);
        buf.push(n as u8);
    } else if n <= 0xffff {
        buf.push(mt | 25);
        buf.extend_from_slice(&(n as u16).to_be_bytes());
    } else if n <= 0xffffffff {
        buf.push(mt | 26);
        buf.extend_from_slice(&(n as u32).to_be_bytes());
    } else {
        buf.push(mt | 27);
        buf.extend_from_slice(&n.to_be_bytes());
    }
}

/// Encode a byte string (major type 2).
fn encode_bytes(buf: &mut Vec<u8>, bytes: &[u8]) {
    encode_uint(buf, 2, bytes.len() as u64);
    buf.extend_from_slice(bytes);
}

/// Encode a text string (major type 3).
fn encode_text(buf: &mut Vec<u8>, s: &str) {
    encode_uint(buf, 3, s.len() as u64);
    buf.extend_from_slice(s.as_bytes());
}
