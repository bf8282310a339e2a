//! Proptest generators for property-based testing.

use std::collections::HashSet;

use proptest::prelude::*;

use truthchain_core::record::{
    MAX_CATS_NUMBER_LEN, MAX_CONTENT_LOCATOR_LEN, MAX_DOCUMENT_TYPE_LEN, MAX_TITLE_LEN,
};
use truthchain_core::{DocumentMetadata, Fingerprint, Keypair};

/// Generate a random keypair.
pub fn keypair() -> impl Strategy<Value = Keypair> {
    any::<[u8; 32]>().prop_map(|seed| Keypair::from_seed(&seed))
}

/// Generate an arbitrary 32-byte fingerprint.
pub fn fingerprint() -> impl Strategy<Value = Fingerprint> {
    any::<[u8; 32]>().prop_map(Fingerprint::from_bytes)
}

/// Generate digest input that is anything but 32 bytes long.
pub fn wrong_length_bytes() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=64).prop_filter("not 32 bytes", |b| b.len() != 32)
}

/// Generate `count` distinct fingerprints.
pub fn distinct_fingerprints(count: usize) -> impl Strategy<Value = Vec<Fingerprint>> {
    prop::collection::hash_set(any::<[u8; 32]>(), count)
        .prop_map(|set: HashSet<[u8; 32]>| set.into_iter().map(Fingerprint::from_bytes).collect())
}

/// ASCII text of at most `max` bytes.
fn bounded_text(max: usize) -> impl Strategy<Value = String> {
    prop::collection::vec(prop::char::range(' ', '~'), 0..=max)
        .prop_map(|chars| chars.into_iter().collect())
}

/// Generate metadata within every field bound.
pub fn valid_metadata() -> impl Strategy<Value = DocumentMetadata> {
    (
        bounded_text(MAX_DOCUMENT_TYPE_LEN),
        prop::option::of(bounded_text(MAX_CATS_NUMBER_LEN)),
        bounded_text(MAX_CONTENT_LOCATOR_LEN),
        any::<u32>(),
        bounded_text(MAX_TITLE_LEN),
    )
        .prop_map(
            |(document_type, cats_number, content_locator, page_number, title)| DocumentMetadata {
                document_type,
                cats_number,
                content_locator,
                page_number,
                title,
            },
        )
}

/// Generate metadata with exactly one field past its bound, and that field's name.
pub fn oversized_metadata() -> impl Strategy<Value = (DocumentMetadata, &'static str)> {
    (valid_metadata(), 0usize..4, 1usize..16).prop_map(|(mut m, field, excess)| {
        let name = match field {
            0 => {
                m.document_type = "d".repeat(MAX_DOCUMENT_TYPE_LEN + excess);
                "document_type"
            }
            1 => {
                m.cats_number = Some("c".repeat(MAX_CATS_NUMBER_LEN + excess));
                "cats_number"
            }
            2 => {
                m.content_locator = "l".repeat(MAX_CONTENT_LOCATOR_LEN + excess);
                "content_locator"
            }
            _ => {
                m.title = "t".repeat(MAX_TITLE_LEN + excess);
                "title"
            }
        };
        (m, name)
    })
}

/// Parameters for registering one document.
#[derive(Debug, Clone)]
pub struct DocumentParams {
    pub content: Vec<u8>,
    pub metadata: DocumentMetadata,
}

impl DocumentParams {
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::digest(&self.content)
    }
}

impl Arbitrary for DocumentParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (prop::collection::vec(any::<u8>(), 0..=512), valid_metadata())
            .prop_map(|(content, metadata)| DocumentParams { content, metadata })
            .boxed()
    }
}
