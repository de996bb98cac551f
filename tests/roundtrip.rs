//! End-to-end seal/open behavior across the supported suite matrix, plus
//! the failure modes a transport would observe: wrong PSK, wrong info,
//! wrong sender key, and export-only suites.

use proptest::prelude::*;

use hybrid_hpke::{
    AeadId, CipherSuite, ConfigError, CryptoError, Error, KdfId, KemId, Psk, RecipientParams,
    SenderParams,
};

const ALL_KEMS: [KemId; 5] = [
    KemId::DhkemP256HkdfSha256,
    KemId::DhkemP384HkdfSha384,
    KemId::DhkemP521HkdfSha512,
    KemId::DhkemX25519HkdfSha256,
    KemId::HybridX25519Kyber768,
];

const ALL_AEADS: [AeadId; 3] = [AeadId::Aes128Gcm, AeadId::Aes256Gcm, AeadId::ChaCha20Poly1305];

#[tokio::test]
async fn every_suite_round_trips() {
    for kem in ALL_KEMS {
        for aead in ALL_AEADS {
            let suite = CipherSuite::new(kem, KdfId::HkdfSha256, aead);
            let key_pair = kem.generate_key_pair().await.unwrap();

            let mut sender = suite
                .create_sender_context(SenderParams::new(&key_pair.public_key))
                .await
                .unwrap();
            assert_eq!(sender.enc().len(), kem.enc_size());
            let ct = sender.seal(b"round trip", b"binding").await.unwrap();
            assert_eq!(ct.len(), b"round trip".len() + aead.tag_size());

            let mut recipient = suite
                .create_recipient_context(RecipientParams::new(sender.enc(), &key_pair))
                .await
                .unwrap();
            let pt = recipient.open(&ct, b"binding").await.unwrap();
            assert_eq!(pt, b"round trip", "{kem:?}/{aead:?}");

            assert_eq!(sender.sequence(), 1);
            assert_eq!(recipient.sequence(), 1);
        }
    }
}

#[tokio::test]
async fn every_kdf_round_trips() {
    for kdf in [KdfId::HkdfSha256, KdfId::HkdfSha384, KdfId::HkdfSha512] {
        let suite = CipherSuite::new(KemId::DhkemX25519HkdfSha256, kdf, AeadId::Aes128Gcm);
        let key_pair = suite.kem().generate_key_pair().await.unwrap();
        let (enc, ct) = suite
            .seal(&key_pair.public_key, None, b"kdf matrix", b"")
            .await
            .unwrap();
        let pt = suite.open(&enc, &key_pair, None, &ct, b"").await.unwrap();
        assert_eq!(pt, b"kdf matrix");
    }
}

#[tokio::test]
async fn mismatched_info_fails_authentication() {
    let suite = CipherSuite::new(
        KemId::DhkemX25519HkdfSha256,
        KdfId::HkdfSha256,
        AeadId::Aes128Gcm,
    );
    let key_pair = suite.kem().generate_key_pair().await.unwrap();

    let (enc, ct) = suite
        .seal(&key_pair.public_key, Some(b"info A".as_slice()), b"payload", b"")
        .await
        .unwrap();
    let result = suite.open(&enc, &key_pair, Some(b"info B".as_slice()), &ct, b"").await;
    assert!(matches!(
        result,
        Err(Error::Crypto(CryptoError::AuthenticationFailure))
    ));
}

#[tokio::test]
async fn mismatched_psk_fails_authentication() {
    let suite = CipherSuite::new(
        KemId::DhkemX25519HkdfSha256,
        KdfId::HkdfSha256,
        AeadId::Aes256Gcm,
    );
    let key_pair = suite.kem().generate_key_pair().await.unwrap();
    let psk_sender = Psk {
        key: vec![0x17; 32],
        id: b"team-psk".to_vec(),
    };
    let psk_recipient = Psk {
        key: vec![0x18; 32],
        id: b"team-psk".to_vec(),
    };

    let mut sender_params = SenderParams::new(&key_pair.public_key);
    sender_params.psk = Some(&psk_sender);
    let mut sender = suite.create_sender_context(sender_params).await.unwrap();
    let ct = sender.seal(b"psk bound", b"").await.unwrap();

    let mut recipient_params = RecipientParams::new(sender.enc(), &key_pair);
    recipient_params.psk = Some(&psk_recipient);
    let mut recipient = suite.create_recipient_context(recipient_params).await.unwrap();
    let result = recipient.open(&ct, b"").await;
    assert!(matches!(
        result,
        Err(Error::Crypto(CryptoError::AuthenticationFailure))
    ));
}

#[tokio::test]
async fn inconsistent_psk_is_a_config_error() {
    let suite = CipherSuite::new(
        KemId::DhkemX25519HkdfSha256,
        KdfId::HkdfSha256,
        AeadId::Aes128Gcm,
    );
    let key_pair = suite.kem().generate_key_pair().await.unwrap();
    let psk = Psk {
        key: vec![0x17; 32],
        id: Vec::new(),
    };

    let mut params = SenderParams::new(&key_pair.public_key);
    params.psk = Some(&psk);
    let result = suite.create_sender_context(params).await;
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::InconsistentPsk))
    ));
}

#[tokio::test]
async fn wrong_sender_key_fails_authentication() {
    let suite = CipherSuite::new(
        KemId::DhkemP256HkdfSha256,
        KdfId::HkdfSha256,
        AeadId::Aes128Gcm,
    );
    let kem = suite.kem();
    let recipient_keys = kem.generate_key_pair().await.unwrap();
    let sender_keys = kem.generate_key_pair().await.unwrap();
    let imposter_keys = kem.generate_key_pair().await.unwrap();

    let mut sender_params = SenderParams::new(&recipient_keys.public_key);
    sender_params.sender_key_pair = Some(&sender_keys);
    let mut sender = suite.create_sender_context(sender_params).await.unwrap();
    let ct = sender.seal(b"authenticated", b"").await.unwrap();

    let mut recipient_params = RecipientParams::new(sender.enc(), &recipient_keys);
    recipient_params.sender_public_key = Some(&imposter_keys.public_key);
    let mut recipient = suite.create_recipient_context(recipient_params).await.unwrap();
    let result = recipient.open(&ct, b"").await;
    assert!(matches!(
        result,
        Err(Error::Crypto(CryptoError::AuthenticationFailure))
    ));
}

#[tokio::test]
async fn export_only_suite_exports_but_refuses_seal() {
    let suite = CipherSuite::new(
        KemId::DhkemX25519HkdfSha256,
        KdfId::HkdfSha256,
        AeadId::ExportOnly,
    );
    let key_pair = suite.kem().generate_key_pair().await.unwrap();

    let mut sender = suite
        .create_sender_context(SenderParams::new(&key_pair.public_key))
        .await
        .unwrap();
    let recipient = suite
        .create_recipient_context(RecipientParams::new(sender.enc(), &key_pair))
        .await
        .unwrap();

    // Both ends derive the same exporter secret.
    let from_sender = sender.export(b"ctx", 32).await.unwrap();
    let from_recipient = recipient.export(b"ctx", 32).await.unwrap();
    assert_eq!(from_sender, from_recipient);

    let result = sender.seal(b"no aead here", b"").await;
    assert!(matches!(
        result,
        Err(Error::Config(ConfigError::ExportOnlySuite))
    ));
}

#[tokio::test]
async fn single_shot_seal_open() {
    let suite = CipherSuite::new(
        KemId::HybridX25519Kyber768,
        KdfId::HkdfSha256,
        AeadId::Aes128Gcm,
    );
    let key_pair = suite.kem().generate_key_pair().await.unwrap();

    let (enc, ct) = suite
        .seal(&key_pair.public_key, Some(b"one shot".as_slice()), b"fire and forget", b"aad")
        .await
        .unwrap();
    assert_eq!(enc.len(), suite.kem().enc_size());
    let pt = suite
        .open(&enc, &key_pair, Some(b"one shot".as_slice()), &ct, b"aad")
        .await
        .unwrap();
    assert_eq!(pt, b"fire and forget");
}

#[tokio::test]
async fn truncated_enc_is_a_serialization_error() {
    let suite = CipherSuite::new(
        KemId::HybridX25519Kyber768,
        KdfId::HkdfSha256,
        AeadId::Aes128Gcm,
    );
    let key_pair = suite.kem().generate_key_pair().await.unwrap();
    let (enc, ct) = suite
        .seal(&key_pair.public_key, None, b"payload", b"")
        .await
        .unwrap();

    let result = suite.open(&enc[..enc.len() - 1], &key_pair, None, &ct, b"").await;
    assert!(matches!(result, Err(Error::Serialization(_))));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn arbitrary_payloads_round_trip(
        plaintext in proptest::collection::vec(any::<u8>(), 0..512),
        aad in proptest::collection::vec(any::<u8>(), 0..64),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .build()
            .unwrap();
        rt.block_on(async {
            let suite = CipherSuite::new(
                KemId::DhkemX25519HkdfSha256,
                KdfId::HkdfSha256,
                AeadId::ChaCha20Poly1305,
            );
            let key_pair = suite.kem().generate_key_pair().await.unwrap();
            let (enc, ct) = suite.seal(&key_pair.public_key, None, &plaintext, &aad).await.unwrap();
            let pt = suite.open(&enc, &key_pair, None, &ct, &aad).await.unwrap();
            prop_assert_eq!(pt, plaintext);
            Ok(())
        })?;
    }
}
