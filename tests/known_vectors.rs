//! Known-answer chains for the DH-based suites.
//!
//! Every hex value below was computed with an independent HPKE
//! implementation; the X25519 base chain doubles as the published
//! RFC 9180 DHKEM(X25519, HKDF-SHA256) vector.

use hybrid_hpke::{
    AeadId, CipherSuite, KdfId, KemId, KemKeyPair, Psk, RecipientParams, SenderParams,
};

async fn key_pair_from_ikm(kem: KemId, ikm: &[u8]) -> KemKeyPair {
    kem.derive_key_pair(ikm).await.unwrap()
}

// ---------------------------------------------------------------------------
// DHKEM(X25519, HKDF-SHA256) + HKDF-SHA256 + AES-128-GCM, base mode
// ---------------------------------------------------------------------------

const A_IKM_R: &str = "6db9df30aa07dd42ee5e8181afdb977e538f5e1fec8a06223f33f7013e525037";
const A_IKM_E: &str = "7268600d403fce431561aef583ee1613527cff655c1343f29812e66706df3234";
const A_SK_R: &str = "4612c550263fc8ad58375df3f557aac531d26850903e55a9f23f21d8534e8ac8";
const A_PK_R: &str = "3948cfe0ad1ddb695d780e59077195da6c56506b027329794ab02bca80815c4d";
const A_ENC: &str = "37fda3567bdbd628e88668c3c8d7e97d1d1253b6d4ea6d44c150f741f1bf4431";
const A_SS: &str = "fe0e18c9f024ce43799ae393c7e8fe8fce9d218875e8227b0187c04e7d2ea1fc";

#[tokio::test]
async fn x25519_derive_key_pair_matches_vector() {
    let kem = KemId::DhkemX25519HkdfSha256;
    let key_pair = kem.derive_key_pair(&hex::decode(A_IKM_R).unwrap()).await.unwrap();
    assert_eq!(hex::encode(key_pair.private_key.as_bytes()), A_SK_R);
    assert_eq!(hex::encode(key_pair.public_key.as_bytes()), A_PK_R);
}

#[tokio::test]
async fn x25519_encap_matches_vector() {
    let kem = KemId::DhkemX25519HkdfSha256;
    let recipient = kem.derive_key_pair(&hex::decode(A_IKM_R).unwrap()).await.unwrap();
    let encapsulation = kem
        .encap_derand(&recipient.public_key, &hex::decode(A_IKM_E).unwrap())
        .await
        .unwrap();
    assert_eq!(hex::encode(&encapsulation.enc), A_ENC);
    assert_eq!(hex::encode(&*encapsulation.shared_secret), A_SS);

    let recovered = kem
        .decap(&encapsulation.enc, &recipient.private_key)
        .await
        .unwrap();
    assert_eq!(hex::encode(&*recovered), A_SS);
}

#[tokio::test]
async fn x25519_aes128_base_chain() {
    let suite = CipherSuite::new(
        KemId::DhkemX25519HkdfSha256,
        KdfId::HkdfSha256,
        AeadId::Aes128Gcm,
    );
    let info: &[u8] = b"application session v1";
    let recipient =
        key_pair_from_ikm(KemId::DhkemX25519HkdfSha256, &hex::decode(A_IKM_R).unwrap()).await;
    let ephemeral =
        key_pair_from_ikm(KemId::DhkemX25519HkdfSha256, &hex::decode(A_IKM_E).unwrap()).await;

    let mut sender_params = SenderParams::new(&recipient.public_key);
    sender_params.info = Some(info);
    sender_params.ephemeral_key_pair = Some(&ephemeral);
    let mut sender = suite.create_sender_context(sender_params).await.unwrap();
    assert_eq!(hex::encode(sender.enc()), A_ENC);

    let ct0 = sender.seal(b"message zero", b"aad zero").await.unwrap();
    assert_eq!(
        hex::encode(&ct0),
        "9605664b718b3d382a51a4be086ee4a7074f9746dff2b73b609c16f4"
    );
    let ct1 = sender.seal(b"message one", b"aad one").await.unwrap();
    assert_eq!(
        hex::encode(&ct1),
        "2888dd909d271ce2fea2b2f03d77ea5759a17d3e4ef959b00da4d0"
    );
    assert_eq!(sender.sequence(), 2);

    let exported = sender.export(b"context", 32).await.unwrap();
    assert_eq!(
        hex::encode(&exported),
        "47dee231a2e3ba5f31d4d889c24f17552065876350706388fa3f0b7ca45389f7"
    );

    let mut recipient_params = RecipientParams::new(sender.enc(), &recipient);
    recipient_params.info = Some(info);
    let mut opener = suite.create_recipient_context(recipient_params).await.unwrap();
    assert_eq!(opener.open(&ct0, b"aad zero").await.unwrap(), b"message zero");
    assert_eq!(opener.open(&ct1, b"aad one").await.unwrap(), b"message one");
    assert_eq!(opener.export(b"context", 32).await.unwrap(), exported);
}

// ---------------------------------------------------------------------------
// DHKEM(X25519, HKDF-SHA256) + HKDF-SHA256 + ChaCha20-Poly1305, PSK mode
// ---------------------------------------------------------------------------

#[tokio::test]
async fn x25519_chacha_psk_chain() {
    let suite = CipherSuite::new(
        KemId::DhkemX25519HkdfSha256,
        KdfId::HkdfSha256,
        AeadId::ChaCha20Poly1305,
    );
    let psk = Psk {
        key: hex::decode("0247fd33b913760fa1fa51e1892d9f307fbe65eb171e8132c2af18555a738b82")
            .unwrap(),
        id: b"Ennyn Durin aran Moria".to_vec(),
    };
    let recipient = key_pair_from_ikm(
        KemId::DhkemX25519HkdfSha256,
        &hex::decode("81c14712c7ccd5b92a6b7b7d89b71bbd2ee8b303a532aa6cdcc0bd0020adacfc").unwrap(),
    ).await;
    let ephemeral = key_pair_from_ikm(
        KemId::DhkemX25519HkdfSha256,
        &hex::decode("4303619085a20ebcf18787dca20ecade32ad4bddf97e1f99e3b9a8bd32cf71f1").unwrap(),
    ).await;

    let mut sender_params = SenderParams::new(&recipient.public_key);
    sender_params.psk = Some(&psk);
    sender_params.ephemeral_key_pair = Some(&ephemeral);
    let mut sender = suite.create_sender_context(sender_params).await.unwrap();
    assert_eq!(
        hex::encode(sender.enc()),
        "aa299f8bbadac46321b82d3eadb390e35515d872325b96c86850a76807242923"
    );

    let ct = sender.seal(b"under the mountain", b"").await.unwrap();
    assert_eq!(
        hex::encode(&ct),
        "309f08658ae06b38401d699100f1080718284fcb97fa9b024922d2d9599f66548080"
    );

    let mut recipient_params = RecipientParams::new(sender.enc(), &recipient);
    recipient_params.psk = Some(&psk);
    let mut opener = suite.create_recipient_context(recipient_params).await.unwrap();
    assert_eq!(opener.open(&ct, b"").await.unwrap(), b"under the mountain");
}

// ---------------------------------------------------------------------------
// DHKEM(P-256, HKDF-SHA256) + HKDF-SHA256 + AES-256-GCM, auth mode
// ---------------------------------------------------------------------------

#[tokio::test]
async fn p256_aes256_auth_chain() {
    let kem = KemId::DhkemP256HkdfSha256;
    let suite = CipherSuite::new(kem, KdfId::HkdfSha256, AeadId::Aes256Gcm);

    let recipient = key_pair_from_ikm(
        kem,
        &hex::decode("668b37171f1072f3cf12ea8a236a45df23fc13b82af3609ad1e354f6ef817550").unwrap(),
    ).await;
    assert_eq!(
        hex::encode(recipient.private_key.as_bytes()),
        "f3ce7fdae57e1a310d87f1ebbde6f328be0a99cdbcadf4d6589cf29de4b8ffd2"
    );
    assert_eq!(
        hex::encode(recipient.public_key.as_bytes()),
        "04fe8c19ce0905191ebc298a9245792531f26f0cece2460639e8bc39cb7f706a826a779b4cf969b8a0e539c7f62fb3d30ad6aa8f80e30f1d128aafd68a2ce72ea0"
    );

    let sender_key = key_pair_from_ikm(
        kem,
        &hex::decode("ea9ff7cc5b2705b188841c7ace169290ff312a9cb31467784ca92d7a2e6e1be8").unwrap(),
    ).await;
    let ephemeral = key_pair_from_ikm(
        kem,
        &hex::decode("42c587ca6c4e0f2446dc76f83d0478b11a312ab0327041f6b957253ae352b342").unwrap(),
    ).await;

    let mut sender_params = SenderParams::new(&recipient.public_key);
    sender_params.info = Some(b"tensor channel".as_slice());
    sender_params.sender_key_pair = Some(&sender_key);
    sender_params.ephemeral_key_pair = Some(&ephemeral);
    let mut sender = suite.create_sender_context(sender_params).await.unwrap();
    assert_eq!(
        hex::encode(sender.enc()),
        "046cb4672e852ce3a7b503fe11c780b83393d7d4cc8860bc95752e46ef734d445271741443c6973206a9bdefc5020661ad681f5e94d3d87002076127ad1bd01d31"
    );

    let ct = sender.seal(b"authenticated payload", b"frame-0").await.unwrap();
    assert_eq!(
        hex::encode(&ct),
        "514591deab504d246db369ac8f8a47792cae08ef2a3648d914edd0e28d46c86c10cbf1b156"
    );

    let mut recipient_params = RecipientParams::new(sender.enc(), &recipient);
    recipient_params.info = Some(b"tensor channel".as_slice());
    recipient_params.sender_public_key = Some(&sender_key.public_key);
    let mut opener = suite.create_recipient_context(recipient_params).await.unwrap();
    assert_eq!(
        opener.open(&ct, b"frame-0").await.unwrap(),
        b"authenticated payload"
    );
}

// ---------------------------------------------------------------------------
// DHKEM(P-521, HKDF-SHA512) + HKDF-SHA512 + AES-256-GCM, base mode
// ---------------------------------------------------------------------------

#[tokio::test]
async fn p521_sha512_base_chain() {
    let kem = KemId::DhkemP521HkdfSha512;
    let suite = CipherSuite::new(kem, KdfId::HkdfSha512, AeadId::Aes256Gcm);

    let recipient = key_pair_from_ikm(
        kem,
        &hex::decode(
            "2e99ac709379c7eb15ca068253bbae4dd6297c2397f47a89b8cb3ef4e83f235f83cb1ce3d2f754c47431ff0d0d8d2c429a7b6768d9524c3be60b9fb7749c49cb816b",
        )
        .unwrap(),
    ).await;
    assert_eq!(
        hex::encode(recipient.private_key.as_bytes()),
        "010098b8ae22e009f18d0a1e7cc19e14e2da19d4f83b8e1a8507a15475db705eb3b62952ff4da5ee9610d3fdcbf416a3049bcee29803c517958592a82d5b28bce8fd"
    );

    let ephemeral = key_pair_from_ikm(
        kem,
        &hex::decode(
            "bdd4505108c8bb2a1d18a1f3a3bfbd74e7840363ab06ef8e9e8de45e05b2c3e5b7a59ca9aa06e5572220c61b97b0a22a246f116ec151d5b2ad6b75de63c57b5e9f33",
        )
        .unwrap(),
    ).await;

    let mut sender_params = SenderParams::new(&recipient.public_key);
    sender_params.ephemeral_key_pair = Some(&ephemeral);
    let mut sender = suite.create_sender_context(sender_params).await.unwrap();
    assert_eq!(
        hex::encode(sender.enc()),
        "0401bfddb6c6dbc91e90e3d5c9e19b6855bf063fd5cf40d37abdaf762a93929e3bbc7bb63fcdba14c530f66b5007e2c175f56d921b813eaa12e7ac0ee4b01f94327131019e9b0619a0a1a2a9e5482b73f73172e25b38763a9307a5bddccb467cf0d7cfb1e5d39c18c184f3aca527e36a048b2bf264b29644e5326fa143da8348fb3a0c4b43"
    );

    let ct = sender.seal(b"large curve message", b"").await.unwrap();
    assert_eq!(
        hex::encode(&ct),
        "1dd81994a5407acd9e8a20e00c4ea83a7f447465fdd14030e001d470612d75a75295bb"
    );

    let exported = sender.export(b"", 64).await.unwrap();
    assert_eq!(
        hex::encode(&exported),
        "0729d2616288c88d745c96dea5e06d53dfd9b60154e90b0bce0d1a6c2dfdbb1b8bc46add45505c34ff05530da1b83b1bd3b848352f547b5ec3882b89c3e1b4f0"
    );

    let mut opener = suite
        .create_recipient_context(RecipientParams::new(sender.enc(), &recipient))
        .await
        .unwrap();
    assert_eq!(opener.open(&ct, b"").await.unwrap(), b"large curve message");
    assert_eq!(opener.export(b"", 64).await.unwrap(), exported);
}
