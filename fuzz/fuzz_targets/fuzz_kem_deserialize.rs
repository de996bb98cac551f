#![no_main]

use libfuzzer_sys::fuzz_target;

use hybrid_hpke::KemId;

const KEMS: [KemId; 5] = [
    KemId::DhkemP256HkdfSha256,
    KemId::DhkemP384HkdfSha384,
    KemId::DhkemP521HkdfSha512,
    KemId::DhkemX25519HkdfSha256,
    KemId::HybridX25519Kyber768,
];

fuzz_target!(|data: &[u8]| {
    // Key and enc deserialization must reject malformed input with errors,
    // never panics, for every KEM.
    for kem in KEMS {
        let _ = kem.deserialize_public_key(data);
        let _ = kem.deserialize_private_key(data);
    }
});
