//! Proptest generators for property-based testing.

use std::collections::BTreeMap;

use proptest::prelude::*;
use serde_json::Value;

use vaultdrop_core::CipherSuite;
use vaultdrop_store::CallerMetadata;

/// Generate file contents of at most `max_len` bytes, including empty.
pub fn file_bytes(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}

/// Generate a body cipher.
pub fn cipher_suite() -> impl Strategy<Value = CipherSuite> {
    prop_oneof![Just(CipherSuite::Aes256Gcm), Just(CipherSuite::ChaCha20Poly1305)]
}

/// Generate a plausible original file name.
pub fn filename() -> impl Strategy<Value = String> {
    "[A-Za-z0-9_-]{1,24}\\.[a-z]{1,4}".prop_map(String::from)
}

/// Generate caller extra fields.
pub fn extra_fields() -> impl Strategy<Value = BTreeMap<String, Value>> {
    prop::collection::btree_map(
        "x[A-Za-z]{0,11}",
        prop_oneof![
            any::<i64>().prop_map(Value::from),
            "[ -~]{0,32}".prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
        ],
        0..4,
    )
}

/// Parameters for one send.
#[derive(Debug, Clone)]
pub struct UploadParams {
    pub file: Vec<u8>,
    pub filename: String,
    pub suite: CipherSuite,
    pub extra: BTreeMap<String, Value>,
}

impl Arbitrary for UploadParams {
    type Parameters = ();
    type Strategy = BoxedStrategy<Self>;

    fn arbitrary_with(_: Self::Parameters) -> Self::Strategy {
        (file_bytes(4096), filename(), cipher_suite(), extra_fields())
            .prop_map(|(file, filename, suite, extra)| UploadParams {
                file,
                filename,
                suite,
                extra,
            })
            .boxed()
    }
}

/// Caller metadata for `envelope` with the params' extras attached.
pub fn caller_metadata(
    envelope: vaultdrop_core::EnvelopeMetadata,
    params: &UploadParams,
) -> CallerMetadata {
    let mut metadata = CallerMetadata::new(envelope);
    metadata.extra = params.extra.clone();
    metadata
}
