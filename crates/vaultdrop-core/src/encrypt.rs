//! Envelope encryption.

use zeroize::Zeroize;

use crate::crypto::{CipherSuite, ContentKey, EnvelopeNonce};
use crate::envelope::{build_payload, SealedEnvelope};
use crate::error::Result;
use crate::keys::RecipientPublicKey;

/// Encrypts files for one recipient.
///
/// Holds only public material, so one encryptor can be shared across
/// threads. Every call to [`encrypt`](Self::encrypt) draws a fresh content
/// key and nonce; a key is never used for more than one envelope.
#[derive(Debug, Clone)]
pub struct EnvelopeEncryptor {
    recipient: RecipientPublicKey,
    suite: CipherSuite,
}

impl EnvelopeEncryptor {
    /// Encrypt for `recipient` with the default suite (AES-256-GCM).
    pub fn new(recipient: RecipientPublicKey) -> Self {
        Self {
            recipient,
            suite: CipherSuite::default(),
        }
    }

    /// Use a different body cipher.
    pub fn with_suite(mut self, suite: CipherSuite) -> Self {
        self.suite = suite;
        self
    }

    /// The recipient this encryptor seals for.
    pub fn recipient(&self) -> &RecipientPublicKey {
        &self.recipient
    }

    /// The body cipher in use.
    pub fn suite(&self) -> CipherSuite {
        self.suite
    }

    /// Seal `file` into a new envelope. Empty input is allowed.
    pub fn encrypt(&self, file: &[u8]) -> Result<SealedEnvelope> {
        let (mut payload, digest) = build_payload(file);

        let key = ContentKey::generate();
        let nonce = EnvelopeNonce::generate();
        let sealed = key.seal(self.suite, &nonce, &payload);
        payload.zeroize();
        let ciphertext = sealed?;

        let wrapped_key = self.recipient.wrap_key(&key)?;
        drop(key);

        Ok(SealedEnvelope {
            suite: self.suite,
            ciphertext,
            wrapped_key,
            nonce,
            digest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{Sha256Digest, DIGEST_LEN, TAG_LEN};
    use crate::keys::test_keys::private_key;

    #[test]
    fn test_ciphertext_length() {
        let encryptor = EnvelopeEncryptor::new(private_key().public_key());
        for len in [0usize, 1, 5, 1000] {
            let file = vec![0x5a; len];
            let envelope = encryptor.encrypt(&file).unwrap();
            assert_eq!(envelope.ciphertext.len(), len + DIGEST_LEN + TAG_LEN);
            assert_eq!(envelope.plaintext_len(), Some(len));
            assert_eq!(envelope.wrapped_key.len(), 256);
            assert_eq!(envelope.digest, Sha256Digest::hash(&file));
        }
    }

    #[test]
    fn test_empty_file_encrypts() {
        let encryptor = EnvelopeEncryptor::new(private_key().public_key());
        let envelope = encryptor.encrypt(b"").unwrap();
        assert_eq!(envelope.ciphertext.len(), DIGEST_LEN + TAG_LEN);
    }

    #[test]
    fn test_fresh_key_and_nonce_per_call() {
        let encryptor = EnvelopeEncryptor::new(private_key().public_key());
        let a = encryptor.encrypt(b"same content").unwrap();
        let b = encryptor.encrypt(b"same content").unwrap();

        assert_ne!(a.nonce, b.nonce);
        assert_ne!(a.wrapped_key, b.wrapped_key);
        assert_ne!(a.ciphertext, b.ciphertext);
        assert_eq!(a.digest, b.digest);

        let private = private_key();
        let key_a = private.unwrap_key(&a.wrapped_key).unwrap();
        let key_b = private.unwrap_key(&b.wrapped_key).unwrap();
        assert_ne!(key_a.as_bytes(), key_b.as_bytes());
    }

    #[test]
    fn test_suite_selection() {
        let encryptor = EnvelopeEncryptor::new(private_key().public_key())
            .with_suite(CipherSuite::ChaCha20Poly1305);
        assert_eq!(encryptor.suite(), CipherSuite::ChaCha20Poly1305);

        let envelope = encryptor.encrypt(b"hello").unwrap();
        assert_eq!(envelope.suite, CipherSuite::ChaCha20Poly1305);
        assert_eq!(envelope.metadata().cipher, Some(CipherSuite::ChaCha20Poly1305));
    }
}
