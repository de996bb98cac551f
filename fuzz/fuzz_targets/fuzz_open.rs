#![no_main]

use libfuzzer_sys::fuzz_target;

use hybrid_hpke::{AeadId, CipherSuite, KdfId, KemId, RecipientParams, SenderParams};

fuzz_target!(|data: &[u8]| {
    // Fuzz the open path: establish a real session, then feed arbitrary
    // bytes as the ciphertext and AAD and ensure clean error returns, never
    // panics. The split point doubles as fuzzer-controlled structure.
    if data.is_empty() {
        return;
    }
    let split = (data[0] as usize).min(data.len() - 1);
    let (aad, ciphertext) = data[1..].split_at(split.min(data.len() - 1));

    let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
    rt.block_on(async {
        let suite = CipherSuite::new(
            KemId::DhkemX25519HkdfSha256,
            KdfId::HkdfSha256,
            AeadId::Aes128Gcm,
        );
        let key_pair = suite.kem().generate_key_pair().await.unwrap();
        let sender = suite
            .create_sender_context(SenderParams::new(&key_pair.public_key))
            .await
            .unwrap();
        let mut recipient = suite
            .create_recipient_context(RecipientParams::new(sender.enc(), &key_pair))
            .await
            .unwrap();

        // Garbage ciphertext must fail cleanly and leave the sequence alone.
        let _ = recipient.open(ciphertext, aad).await;
        assert_eq!(recipient.sequence(), 0);
    });
});
