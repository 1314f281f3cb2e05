//! Test fixtures and helpers.
//!
//! Common setup code for integration tests. The key pairs below are fixed
//! 2048-bit RSA keys generated for tests only; never use them for real data.

use bytes::Bytes;

use vaultdrop_core::{
    EnvelopeDecryptor, EnvelopeEncryptor, RecipientPrivateKey, RecipientPublicKey, SealedEnvelope,
};
use vaultdrop_store::{CallerMetadata, FileRecord, MemoryStore, Store, StoredBlob};

/// SPKI DER of the primary test public key, hex.
pub const TEST_PUBLIC_KEY_HEX: &str = "30820122300d06092a864886f70d01010105000382010f003082010a02820101\
00952f37ae09b20b71f4559a95e119fe43268c496738afac4b72dcabbb120918\
5dfffebb5b1e7dd413c4dc68e8c88165cb608ff9318bc29e4d69ce4ad90e79f4\
4195badde910b8d44e6f77dd0e01e81f3752f8251cf69c788953a037e2979446\
b0e2161eefb82ddd5a09e7a687d3636a46a07d68ed60f272ba37186c82907158\
503fafe08c460d9dd21583f0bcbe632ef272e79d5de8af671504e3bb84bc72cc\
45abf6b1898b87471a9e11fd8a696812dd6f36b68fb21ad13c7a1f4cc64e3b65\
57acfaec27d8593a327412d113a4e0dcc7acb5fcadb21b79b5a4963e9c801b46\
7f69e0a60b51673b16c4a6944b0e6ec43106763880ca6e8804205f8a4ffed01b\
6b0203010001";

/// PKCS#8 DER of the primary test private key, hex.
pub const TEST_PRIVATE_KEY_HEX: &str = "308204bd020100300d06092a864886f70d0101010500048204a7308204a30201\
000282010100952f37ae09b20b71f4559a95e119fe43268c496738afac4b72dc\
abbb1209185dfffebb5b1e7dd413c4dc68e8c88165cb608ff9318bc29e4d69ce\
4ad90e79f44195badde910b8d44e6f77dd0e01e81f3752f8251cf69c788953a0\
37e2979446b0e2161eefb82ddd5a09e7a687d3636a46a07d68ed60f272ba3718\
6c82907158503fafe08c460d9dd21583f0bcbe632ef272e79d5de8af671504e3\
bb84bc72cc45abf6b1898b87471a9e11fd8a696812dd6f36b68fb21ad13c7a1f\
4cc64e3b6557acfaec27d8593a327412d113a4e0dcc7acb5fcadb21b79b5a496\
3e9c801b467f69e0a60b51673b16c4a6944b0e6ec43106763880ca6e8804205f\
8a4ffed01b6b020301000102820100268d552e3c832e41fc8a42b088c356d9b3\
947d43977a8e63d10305be0a231f90eb1ec0fc031d31390a9e8adddd32d34383\
68b1550470fec7b29804efa2b61151018890e031da11c3533afe7d2830fc2027\
e8c86e7bac63d9d92a8646a035492f5cbdaab0f83fa1fc2aa31a7def3ab9b416\
b551f0462561508dfc59ce43d586a4914739abd93bedb8c88aeedaa1ea4d1d7e\
c162c8929cd00f89d3d4ffe5abdefcb3ea652d1419ddb548846ac3b53d07ff20\
f6492bd3a91511fd5ccf4dc49eac69d25ed5eed8fed2e25690d98ead4797590e\
0012cc4623553376b9f4d3f89dc6e877c1aef595c09f59a68d49dced733d6550\
4770f8e1814a0aeb385d21e758e7c102818100c86b98043a55ee589392002571\
53ec1ebc78c2b8190db4f7655380a51f01a9353f57a2b595489d84ea6595369b\
d7c51e8ac92e66575c0816624738c1b13794a04212f7fb2d6dab9634bfd15957\
0f02a5ba81b5e5d141423fd6d2d290c050c3fb0c266defaa1a2349ee3394f0e7\
b89d00625c27b9d01335363565f49c9c8b2d7502818100be8e3ecf9707075106\
0f9364dd01f94ea2bd30d695628835a8b3ebbb4c007c0e91089c13ca9b43a83a\
f6ba3137d8a8bd6d3beb87d86f15a5fef3942912d9b7ad662e161198b20f0419\
c9fcf41fc5ee7039a781ba1421832d8d3a5bfe7c68b021f3e281c34e729fafb9\
ed3f49d62c2239430c23e0f0876862f09bdca66088a95f02818100b2a9676c6d\
6c68fac12267caf909acf58161cd833ba2426e3fff7e30b44150cbccd99c8c6e\
b5bae5dfe60a6c11e4f92dcedea4e44a801a1d8a229f6fdb4106d70dcfc70c3c\
65058ef31b03ceb69304f3241db93f5398ef2be59f2e62276e582695a034646f\
a8b94890759f125a1ef2a683084fc98eb970b810460117135de67902818054f5\
cf03776ee6d03547948c100de53e2e48f41178a169e1a2ca357c58b28e9d6004\
dab1e84fb9a6b4437558a471b12a641da731f649f0f905e74c53d3d7c6914551\
9efd517b723e7dd1153b333f68c418b09aa2807f40a17aaa5e81e4ae3879aae7\
7ebbb9aa59905bf16f9a58276d4ae29df31143acdbd9e1355cf7c16aad390281\
800fe7b51b460cba4ebceec0e2bde7256ca58b5ae4a75d1076f1829fb773b01f\
2bfc013b5d639078fa3df81f547dcf0338f21a264be80a87d32728c720811098\
cefdd3e0077a223cda8d54312ff73471b71fdd0b75a115d9aec702f5486d9c11\
3e9a1d252a6ee0201f87803b9a129fa387707160b191b48ea3d4937e9703b425\
79";

/// SPKI DER of a second, unrelated test public key, hex.
pub const OTHER_PUBLIC_KEY_HEX: &str = "30820122300d06092a864886f70d01010105000382010f003082010a02820101\
00c1fd693bc4a200d1ca06af37b531f032120d6953f0e42dd58657cdaa53bc10\
5eaa23889f7ac1223d990e1d648dcb1d0dee28e230c09bd15b12eeeda92844fa\
a57e403776b331924b8b6cc542619561fd89a6987863cf710a1b709d3fb4ba77\
2b85838e6b3a674e4f6f4fb2af67f67f13f0e687be0f3d979dc83c3584ccf6cc\
c642b30a1b9e96d0f9b8142fd6b812a25280894af7975c8b835e695c72e1c985\
3d62dc805f6dbb6db7e74bf6894189e26a8d6b8aef09962186b75617142ea044\
cdfdf9abe1238469a53f8b5feaed3f6d049d321203cf0cc168dc15237037f6d2\
5eb7eb3281e5a956456f88330deb6b84ee0406d3300d1d2803d179a15709ab62\
190203010001";

/// PKCS#8 DER of the second test private key, hex.
pub const OTHER_PRIVATE_KEY_HEX: &str = "308204bd020100300d06092a864886f70d0101010500048204a7308204a30201\
000282010100c1fd693bc4a200d1ca06af37b531f032120d6953f0e42dd58657\
cdaa53bc105eaa23889f7ac1223d990e1d648dcb1d0dee28e230c09bd15b12ee\
eda92844faa57e403776b331924b8b6cc542619561fd89a6987863cf710a1b70\
9d3fb4ba772b85838e6b3a674e4f6f4fb2af67f67f13f0e687be0f3d979dc83c\
3584ccf6ccc642b30a1b9e96d0f9b8142fd6b812a25280894af7975c8b835e69\
5c72e1c9853d62dc805f6dbb6db7e74bf6894189e26a8d6b8aef09962186b756\
17142ea044cdfdf9abe1238469a53f8b5feaed3f6d049d321203cf0cc168dc15\
237037f6d25eb7eb3281e5a956456f88330deb6b84ee0406d3300d1d2803d179\
a15709ab62190203010001028201000ea1b5a0e0904c11c6c4498dc0fcd4e63f\
ea934bd5a6ee46955114d600a616117fd1798df6d92fa31802e2a86991fcfd66\
9dde8ea90e6fa468098db335327bb9c50ba4ab4f31815c7196190c4c56333b87\
790175ce2870b91f8ff74a5d70358a1ab24d290d110aeceea34321dc0c717210\
78e0daeee51945193be2590389277178aad6b8438f08b74abd61da52eae26014\
27f04f58478cc331391a92bf2d3e9d3ecb4542df5136f028e8a817031fb9eb5a\
f13b03b13f806d9ea196c2fdba60317f313e20f0f0de7cc96f81040a4f5e5b09\
53f2d0e5f8939851424ac1bf8e0ffd93200ec3a7649946d9be0072b136492eb9\
f26f6cee6f76a633ee06aecce15f4102818100e0dc0e1dd2dc21db68a86fbfe8\
3f0e36a486aafa62231529d5ee8519a2cb2d9a3a28503143e930b3d6cdd93240\
aae41f1b84d7d3406c9efb41007273096b88543ca27968497aa98e91392f99e8\
0715c492779cbcea03319bbeadd195bff57013ac26588e3d376bd8b9ba0107b8\
93c1ae025312c4da9814bf7e1dfab8cdd803c102818100dcdaeec1036b617692\
f883ca192130537ab297d7f0e692593fc0ab8101d4bf4141a7064191385c1538\
94975552772418b63338644bde2775fc71cf17a6fbc26483c1e7a8e0433a1d74\
d39969e8588d3184bcdf2e3dbbe4e21dce46915888ae3dc18e067fb6a5e3e6df\
8acb845e34525e5ad5f55df748f6912edab0ae3f0714590281810085fedc72ad\
4afcea10edfed9ef7e53ec001338244902fb039936b01e5cc293044b0fe6e9d4\
bc4b877fc3df6070e4e5581c4007951dd91ccc412a1109b85d5a3a487fd1b571\
c424f28e5bf39fd5831357b6a88cc08efb243ed95c1f7f0b8b2924affb91de01\
60db65a517d0b1572ec5c5fa20a318a7e2e4ca504f712f5b8b14810281807217\
a7bf8e44aad4d6980b7d1bfe4938d6e9ec07622bbaeee0406858fcd92af44b36\
3dc521803c11ba6908c4cb15415082cf73125d1f26c38ce63e55b9add57e9792\
545aa9801145a654a9ac4c9b7255627d2fce7395dd67f27ddd76b885e37d83c0\
1b1b5effd3fc30ff42a3df06a88695e6721b58e4187c67f811cdf24176010281\
801d2e228dfc56a9c0b0110b47a4e71cf2e3ffa2d080fd3fa014419e54281a39\
af387878f58c0854541aa7f52ab6b0e7fe6b57cc23a3acef75d6cf6e99a3d0a6\
7ec947e10a1ff815acda568005f2f221d12d247c95a680491204fdee574869c6\
300e384bcac5ddabd158c511a93c7d2a31f8e1188fd216507968e91d8f22a488\
eb";

/// The primary test public key.
pub fn test_public_key() -> RecipientPublicKey {
    RecipientPublicKey::from_hex(TEST_PUBLIC_KEY_HEX).expect("test public key must parse")
}

/// The primary test private key.
pub fn test_private_key() -> RecipientPrivateKey {
    RecipientPrivateKey::from_hex(TEST_PRIVATE_KEY_HEX).expect("test private key must parse")
}

/// A private key that cannot open envelopes sealed for [`test_public_key`].
pub fn other_private_key() -> RecipientPrivateKey {
    RecipientPrivateKey::from_hex(OTHER_PRIVATE_KEY_HEX).expect("other private key must parse")
}

/// A test fixture with the fixed key pair and a memory store.
pub struct TestFixture {
    pub encryptor: EnvelopeEncryptor,
    pub decryptor: EnvelopeDecryptor,
    pub store: MemoryStore,
}

impl TestFixture {
    /// Create a new fixture with an empty store.
    pub fn new() -> Self {
        Self {
            encryptor: EnvelopeEncryptor::new(test_public_key()),
            decryptor: EnvelopeDecryptor::new(test_private_key()),
            store: MemoryStore::new(),
        }
    }

    /// Seal `file` for the fixture's recipient.
    pub fn seal(&self, file: &[u8]) -> SealedEnvelope {
        self.encryptor.encrypt(file).expect("encryption must succeed")
    }

    /// Seal `file` and put it in the store.
    pub async fn seal_and_store(&self, file: &[u8], filename: &str) -> FileRecord {
        let envelope = self.seal(file);
        self.store
            .store(
                Bytes::from(envelope.ciphertext.clone()),
                filename,
                CallerMetadata::new(envelope.metadata()),
            )
            .await
            .expect("store must succeed")
    }

    /// Decrypt a retrieved blob with the fixture's private key.
    pub fn open(&self, blob: &StoredBlob) -> vaultdrop_core::Result<Vec<u8>> {
        self.decryptor
            .decrypt_with_metadata(&blob.bytes, &blob.record.envelope)
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
