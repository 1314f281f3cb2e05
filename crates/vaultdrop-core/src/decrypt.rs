//! Envelope decryption.

use crate::crypto::{CipherSuite, EnvelopeNonce};
use crate::envelope::{verify_payload, EnvelopeMetadata, SealedEnvelope};
use crate::error::Result;
use crate::keys::RecipientPrivateKey;

/// Opens envelopes addressed to one private key.
///
/// Decryption runs four checks in order and stops at the first failure:
/// unwrap the content key ([`Unwrap`]), verify the AEAD tag
/// ([`Authentication`]), check the payload is long enough to hold a digest
/// ([`MalformedPayload`]) and compare the embedded digest ([`Integrity`]).
/// Only the file bytes are returned; the digest suffix is stripped.
///
/// [`Unwrap`]: crate::CryptoError::Unwrap
/// [`Authentication`]: crate::CryptoError::Authentication
/// [`MalformedPayload`]: crate::CryptoError::MalformedPayload
/// [`Integrity`]: crate::CryptoError::Integrity
pub struct EnvelopeDecryptor {
    private_key: RecipientPrivateKey,
}

impl EnvelopeDecryptor {
    pub fn new(private_key: RecipientPrivateKey) -> Self {
        Self { private_key }
    }

    /// The private key in use.
    pub fn private_key(&self) -> &RecipientPrivateKey {
        &self.private_key
    }

    /// Decrypt an AES-256-GCM envelope from its raw parts.
    pub fn decrypt(
        &self,
        ciphertext: &[u8],
        wrapped_key: &[u8],
        nonce: &EnvelopeNonce,
    ) -> Result<Vec<u8>> {
        self.decrypt_with_suite(CipherSuite::Aes256Gcm, ciphertext, wrapped_key, nonce)
    }

    /// Decrypt from raw parts with an explicit body cipher.
    pub fn decrypt_with_suite(
        &self,
        suite: CipherSuite,
        ciphertext: &[u8],
        wrapped_key: &[u8],
        nonce: &EnvelopeNonce,
    ) -> Result<Vec<u8>> {
        let key = self.private_key.unwrap_key(wrapped_key)?;
        let payload = key.open(suite, nonce, ciphertext)?;
        drop(key);
        verify_payload(payload)
    }

    /// Decrypt a [`SealedEnvelope`].
    pub fn decrypt_envelope(&self, envelope: &SealedEnvelope) -> Result<Vec<u8>> {
        self.decrypt_with_suite(
            envelope.suite,
            &envelope.ciphertext,
            &envelope.wrapped_key,
            &envelope.nonce,
        )
    }

    /// Decrypt a stored blob using its record's envelope fields.
    pub fn decrypt_with_metadata(
        &self,
        ciphertext: &[u8],
        metadata: &EnvelopeMetadata,
    ) -> Result<Vec<u8>> {
        let header = metadata.decode()?;
        self.decrypt_with_suite(header.suite, ciphertext, &header.wrapped_key, &header.nonce)
    }
}

impl std::fmt::Debug for EnvelopeDecryptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EnvelopeDecryptor").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::crypto::{ContentKey, Sha256Digest, DIGEST_LEN};
    use crate::encrypt::EnvelopeEncryptor;
    use crate::error::CryptoError;
    use crate::keys::test_keys::{other_private_key, private_key};

    fn decryptor() -> EnvelopeDecryptor {
        EnvelopeDecryptor::new(private_key().clone_for_test())
    }

    fn encryptor() -> EnvelopeEncryptor {
        EnvelopeEncryptor::new(private_key().public_key())
    }

    #[test]
    fn test_roundtrip_hello() {
        let envelope = encryptor().encrypt(b"hello").unwrap();
        assert_eq!(decryptor().decrypt_envelope(&envelope).unwrap(), b"hello");
    }

    #[test]
    fn test_roundtrip_empty() {
        let envelope = encryptor().encrypt(b"").unwrap();
        assert!(decryptor().decrypt_envelope(&envelope).unwrap().is_empty());
    }

    #[test]
    fn test_roundtrip_chacha() {
        let envelope = encryptor()
            .with_suite(CipherSuite::ChaCha20Poly1305)
            .encrypt(b"hello")
            .unwrap();
        assert_eq!(decryptor().decrypt_envelope(&envelope).unwrap(), b"hello");
        assert_eq!(
            decryptor()
                .decrypt_with_metadata(&envelope.ciphertext, &envelope.metadata())
                .unwrap(),
            b"hello"
        );
    }

    #[test]
    fn test_decrypt_raw_parts_defaults_to_aes() {
        let envelope = encryptor().encrypt(b"raw parts").unwrap();
        let plaintext = decryptor()
            .decrypt(&envelope.ciphertext, &envelope.wrapped_key, &envelope.nonce)
            .unwrap();
        assert_eq!(plaintext, b"raw parts");
    }

    #[test]
    fn test_wrong_private_key_is_unwrap_error() {
        let envelope = encryptor().encrypt(b"secret").unwrap();
        let wrong = EnvelopeDecryptor::new(other_private_key().clone_for_test());
        assert!(matches!(wrong.decrypt_envelope(&envelope), Err(CryptoError::Unwrap)));
    }

    #[test]
    fn test_corrupted_ciphertext_is_authentication_error() {
        let mut envelope = encryptor().encrypt(b"hello").unwrap();
        envelope.ciphertext[0] ^= 0x01;
        assert!(matches!(
            decryptor().decrypt_envelope(&envelope),
            Err(CryptoError::Authentication)
        ));
    }

    #[test]
    fn test_truncated_ciphertext_is_authentication_error() {
        let mut envelope = encryptor().encrypt(b"hello").unwrap();
        envelope.ciphertext.truncate(4);
        assert!(matches!(
            decryptor().decrypt_envelope(&envelope),
            Err(CryptoError::Authentication)
        ));
    }

    #[test]
    fn test_wrong_nonce_is_authentication_error() {
        let mut envelope = encryptor().encrypt(b"hello").unwrap();
        envelope.nonce.0[11] ^= 0x80;
        assert!(matches!(
            decryptor().decrypt_envelope(&envelope),
            Err(CryptoError::Authentication)
        ));
    }

    #[test]
    fn test_short_authenticated_payload_is_malformed() {
        // A validly wrapped key and tag over a payload with no room for a digest.
        let public = private_key().public_key();
        let key = ContentKey::generate();
        let nonce = EnvelopeNonce::generate();
        let ciphertext = key.seal(CipherSuite::Aes256Gcm, &nonce, b"too short").unwrap();
        let wrapped = public.wrap_key(&key).unwrap();

        assert!(matches!(
            decryptor().decrypt(&ciphertext, &wrapped, &nonce),
            Err(CryptoError::MalformedPayload { len: 9, min: DIGEST_LEN })
        ));
    }

    #[test]
    fn test_bad_embedded_digest_is_integrity_error() {
        // Authenticated, but the embedded digest is wrong.
        let public = private_key().public_key();
        let key = ContentKey::generate();
        let nonce = EnvelopeNonce::generate();
        let mut payload = b"hello".to_vec();
        payload.extend_from_slice(Sha256Digest::hash(b"world").as_bytes());
        let ciphertext = key.seal(CipherSuite::Aes256Gcm, &nonce, &payload).unwrap();
        let wrapped = public.wrap_key(&key).unwrap();

        assert!(matches!(
            decryptor().decrypt(&ciphertext, &wrapped, &nonce),
            Err(CryptoError::Integrity)
        ));
    }

    #[test]
    fn test_invalid_metadata_is_input_error() {
        let envelope = encryptor().encrypt(b"hello").unwrap();
        let mut metadata = envelope.metadata();
        metadata.iv_hex = "abc".into();
        assert!(matches!(
            decryptor().decrypt_with_metadata(&envelope.ciphertext, &metadata),
            Err(CryptoError::InvalidInput(_))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(16))]

        #[test]
        fn test_roundtrip_any_file(file in prop::collection::vec(any::<u8>(), 0..2048)) {
            let envelope = encryptor().encrypt(&file).unwrap();
            prop_assert_eq!(decryptor().decrypt_envelope(&envelope).unwrap(), file);
        }

        #[test]
        fn test_any_ciphertext_bit_flip_is_rejected(
            file in prop::collection::vec(any::<u8>(), 0..256),
            bit in any::<prop::sample::Index>(),
        ) {
            let mut envelope = encryptor().encrypt(&file).unwrap();
            let i = bit.index(envelope.ciphertext.len() * 8);
            envelope.ciphertext[i / 8] ^= 1 << (i % 8);
            prop_assert!(matches!(
                decryptor().decrypt_envelope(&envelope),
                Err(CryptoError::Authentication)
            ));
        }

        #[test]
        fn test_any_wrapped_key_bit_flip_is_rejected(bit in any::<prop::sample::Index>()) {
            let mut envelope = encryptor().encrypt(b"hello").unwrap();
            let i = bit.index(envelope.wrapped_key.len() * 8);
            envelope.wrapped_key[i / 8] ^= 1 << (i % 8);
            prop_assert!(matches!(
                decryptor().decrypt_envelope(&envelope),
                Err(CryptoError::Unwrap) | Err(CryptoError::Authentication)
            ));
        }

        #[test]
        fn test_any_nonce_bit_flip_is_rejected(bit in 0usize..96) {
            let mut envelope = encryptor().encrypt(b"hello").unwrap();
            envelope.nonce.0[bit / 8] ^= 1 << (bit % 8);
            prop_assert!(matches!(
                decryptor().decrypt_envelope(&envelope),
                Err(CryptoError::Authentication)
            ));
        }
    }
}
