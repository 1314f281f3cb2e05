//! Golden envelopes for cross-implementation verification.
//!
//! Produced by an independent AES-GCM / ChaCha20-Poly1305 / RSA-OAEP
//! implementation with the fixed content key `00 01 .. 1f` and nonce
//! `a5 * 12`, wrapped for [`TEST_PUBLIC_KEY_HEX`](crate::fixtures::TEST_PUBLIC_KEY_HEX).
//! Every implementation must open the positive vectors to the same bytes
//! and reject the negative ones with the same error.

use vaultdrop_core::{
    hex_decode, CipherSuite, CryptoError, EnvelopeDecryptor, EnvelopeMetadata,
};

use crate::fixtures::test_private_key;

/// Content key used for every vector.
pub const CONTENT_KEY_HEX: &str = "000102030405060708090a0b0c0d0e0f101112131415161718191a1b1c1d1e1f";

/// Nonce used for every vector.
pub const IV_HEX: &str = "a5a5a5a5a5a5a5a5a5a5a5a5";

/// What opening a vector must produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
    Plaintext(&'static [u8]),
    Integrity,
    MalformedPayload,
}

/// A golden envelope.
#[derive(Debug, Clone)]
pub struct GoldenEnvelope {
    /// Human-readable name for the vector.
    pub name: &'static str,
    pub suite: CipherSuite,
    pub ciphertext_hex: &'static str,
    pub wrapped_key_hex: &'static str,
    pub iv_hex: &'static str,
    pub file_hash_hex: &'static str,
    pub expected: Expected,
}

impl GoldenEnvelope {
    /// The record fields as a store would hold them.
    pub fn metadata(&self) -> EnvelopeMetadata {
        EnvelopeMetadata {
            wrapped_key_hex: self.wrapped_key_hex.to_string(),
            iv_hex: self.iv_hex.to_string(),
            file_hash_hex: self.file_hash_hex.to_string(),
            cipher: Some(self.suite),
        }
    }

    pub fn ciphertext(&self) -> Vec<u8> {
        hex_decode(self.ciphertext_hex).expect("vector ciphertext is valid hex")
    }

    /// Whether `outcome` is what this vector requires.
    pub fn check(&self, outcome: &vaultdrop_core::Result<Vec<u8>>) -> bool {
        match (self.expected, outcome) {
            (Expected::Plaintext(want), Ok(got)) => got.as_slice() == want,
            (Expected::Integrity, Err(CryptoError::Integrity)) => true,
            (Expected::MalformedPayload, Err(CryptoError::MalformedPayload { .. })) => true,
            _ => false,
        }
    }
}

/// Get all golden envelopes.
pub fn all_vectors() -> Vec<GoldenEnvelope> {
    vec![
        GoldenEnvelope {
            name: "hello",
            suite: CipherSuite::Aes256Gcm,
            ciphertext_hex: "4922f0cc5db0dac492f31341a6059f1ea7df0eb57d4a575f1a48203b7a34f7a8\
942cdf21ee8db70acadff82ebcd3b1c0de283ae953",
            wrapped_key_hex: "08e299710127b60c70898714c562ce9be943e3ac46f60d32811ebaabdb484f5b\
edd0a413585e0d93720a69379e322d65238ff4eb9406d25e2f296e2f714b77a7\
0a534a93f4fbefdc80ea70ea555735677a4f58192e56f76cc69d5b7225931931\
28aedd8d4f0672df7aff1841518d37fb6f99e98a796a64286450e3ccae476cfc\
ed206100b136451d793d0ca7b49bf07d4c689f8cf9d6bbc47af98493731475c2\
9d5a71c434566275ab5ef9361848d7503d2e2197538eec2118403d43a1013677\
47164759c2504281f8ae79b4c677fc49f8ae565281445456fb13d86ce56bf67c\
ee5c4884434872d28121cafa218daf03216406fb5d499e1246a2988cace09fca",
            iv_hex: IV_HEX,
            file_hash_hex: "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824",
            expected: Expected::Plaintext(b"hello"),
        },
        GoldenEnvelope {
            name: "empty file",
            suite: CipherSuite::Aes256Gcm,
            ciphertext_hex: "c2f758e2aa60349db257572a314cce01aab4f6b387cad20de2c21e625c154bce\
fc5f2e2adfe3fd7b4eca682df0f89923",
            wrapped_key_hex: "21655242cb49317a968912d2a97bc9f9d8f50f0c82ba8f130c15abeb6128d27c\
24dd4e2dc08ac3f7316c2e959a336c9718e8832a54c3e04cece3483e9c0941bf\
fdf38d4814e6b69d3bb9e611d6d582d54e06f95036b9e47b58f421ff0908dd32\
271e4bd307e634cbc41d45469886c77f046293353aba6fa80a3add8b8b7620b4\
09795e6eea528189a4a7b53c017625391ec2b35daf419ea761fa3c7cea6f6a2e\
23ff07bce589d39439e539ccb5041abc490dfbdf5127863996e95f622c5656bb\
35f77aab722c78d655be6d6f9530d63ac7a16162608cd66f79b2bedcf890163a\
7edc32e987447015252eef0a03da86a29b1b9a8b0d509dd5a7b6ac8a400f7e0f",
            iv_hex: IV_HEX,
            file_hash_hex: "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855",
            expected: Expected::Plaintext(b""),
        },
        GoldenEnvelope {
            name: "hello under ChaCha20-Poly1305",
            suite: CipherSuite::ChaCha20Poly1305,
            ciphertext_hex: "8724edfeb9d2df1caa3326f645b97d6129008b9f9e0f5e215af9a5673c9af8ea\
4f02cc3f6ea832688e3fea046229e9286c7f97c248",
            wrapped_key_hex: "133502d846f7149a2fa5068e7d4ddc403e93819f30e7101e38584bcfb6b39a01\
07276bdb8d8e87df0614505916afc2a6ac8ee616eac676f2280027c799611373\
4a331bff373cb7c518b8cad8a8084994e067bace3fb46c75b154b9ab186c4cd6\
2ebe750fe124fbc8665b3c5c7f74bfbddede82e4fb222621196d52876c1869c3\
c6652337fcb770f0fdaf3d6596719a555b885e0463c6309d58b990453314af0b\
6316da46011266e8d69ad02090941a802919d284c28e718fbfe2200814d06d07\
19392e6c890820c7bf2ca8e12a1969892c6b7cc6878af043b62d0c423f979611\
f434169854a9f1f965850c7ab4e9290886495c684039cfcb05c30d03ae51c591",
            iv_hex: IV_HEX,
            file_hash_hex: "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824",
            expected: Expected::Plaintext(b"hello"),
        },
        GoldenEnvelope {
            name: "authenticated payload with zeroed digest",
            suite: CipherSuite::Aes256Gcm,
            ciphertext_hex: "4922f0cc5d9c288928aca3e2a82377258d1ab757e3514141465787792447f39b\
f6bf54b9ca7d836f3842981ddff87933880d648627",
            wrapped_key_hex: "92758718c3f2ec43e642d6cfaed63e9a0441fdcb25d1c0a2de045a4bfc7178cb\
f3a13585818cfa2725ddcf47761b94fe882c180a183fe33f27f2b0828ae6fecc\
5937dbfd08aaa51032e43d7711c0c57c4d70eea4d19ba438f9f1eb84bd5b8b83\
2b71e4daaa02f510fbfaf8f090b3fadd76996a35d0c4120234227b7a505c5d72\
0c746c398995a05b973c26ffa193bbfe6ecde5589c8b1eda39936f73ba8dfb4f\
e7d5335ad0af9a00dcdd7fcf02a08fbcae399cd147b77c54ddf41915f0768925\
201a2cd8f5bdc415bbd45b405698f22a855a7db630272a64bff1f459bbeb29dc\
ecc4d2cb92f77b3d05d07649058dc94726c9346bb098e244a09c00a394db98b9",
            iv_hex: IV_HEX,
            file_hash_hex: "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824",
            expected: Expected::Integrity,
        },
        GoldenEnvelope {
            name: "authenticated payload shorter than a digest",
            suite: CipherSuite::Aes256Gcm,
            ciphertext_hex: "5528f38041f447fb5cd8456571383e680937e891c8feaf76e3",
            wrapped_key_hex: "31ebf93f399ed7a3bbf3195e64eefad69a7186df9c3131dd4d7a0b9fbc1677c3\
facbe7dfb7c661566c164b8388e0dc6e1e575c59d43c4a920dd4386a14ff6b7f\
ab20be3d191b553335356ac17e5c934bdb45f8e96202910132cbd26266805d2d\
5473bd5a561fb4d459afd070544d099b2ad7c44e5cf0ba53a69aa0a2a16d4854\
28ba40389697e9126868b52a28c5b38bd0f3ffbfbb6f944d696d3ccfee7e42ce\
df0d34f7c12dc4149c3609778f15dc1fb2a268a2897ab7e458799d70a6d5af89\
ba16c6a30b0a2475fcab56ae6d563ef966ba1e32159f41efe1eda48ecad4be6a\
9518d124217f8e37467c432cb84d0ab022d612030e28ca0bd895bd9976bf85fd",
            iv_hex: IV_HEX,
            file_hash_hex: "b5d00f1594c604cf4815299a2e990fbb287b4cc6dcceb8ffb087f20742acbd7b",
            expected: Expected::MalformedPayload,
        },
    ]
}

/// Open every vector with the test private key.
///
/// Returns `(name, matches, outcome)` for each vector.
pub fn verify_all_vectors() -> Vec<(String, bool, String)> {
    let decryptor = EnvelopeDecryptor::new(test_private_key());
    all_vectors()
        .iter()
        .map(|v| {
            let outcome = decryptor.decrypt_with_metadata(&v.ciphertext(), &v.metadata());
            let detail = match &outcome {
                Ok(file) => format!("ok: {} bytes", file.len()),
                Err(e) => format!("err: {e}"),
            };
            (v.name.to_string(), v.check(&outcome), detail)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use vaultdrop_core::{hex_decode_array, ContentKey, EnvelopeNonce, Sha256Digest};

    #[test]
    fn test_all_vectors_verify() {
        for (name, ok, detail) in verify_all_vectors() {
            assert!(ok, "vector '{name}' failed: {detail}");
        }
    }

    #[test]
    fn test_vectors_unwrap_to_fixed_key() {
        let private = test_private_key();
        for v in all_vectors() {
            let wrapped = hex_decode(v.wrapped_key_hex).unwrap();
            let key = private.unwrap_key(&wrapped).unwrap();
            assert_eq!(hex::encode(key.as_bytes()), CONTENT_KEY_HEX, "vector '{}'", v.name);
        }
    }

    #[test]
    fn test_local_seal_matches_vectors() {
        // Same key and nonce must give the same ciphertext as the reference.
        let key = ContentKey::from_bytes(hex_decode_array(CONTENT_KEY_HEX).unwrap());
        let nonce = EnvelopeNonce::from_bytes(hex_decode_array(IV_HEX).unwrap());

        for v in all_vectors() {
            let Expected::Plaintext(file) = v.expected else {
                continue;
            };
            let mut payload = file.to_vec();
            payload.extend_from_slice(Sha256Digest::hash(file).as_bytes());
            let ciphertext = key.seal(v.suite, &nonce, &payload).unwrap();
            assert_eq!(hex::encode(ciphertext), v.ciphertext_hex, "vector '{}'", v.name);
        }
    }

    #[test]
    fn test_vectors_with_wrong_key_fail_to_unwrap() {
        let decryptor = EnvelopeDecryptor::new(crate::fixtures::other_private_key());
        for v in all_vectors() {
            assert!(matches!(
                decryptor.decrypt_with_metadata(&v.ciphertext(), &v.metadata()),
                Err(CryptoError::Unwrap)
            ));
        }
    }
}
