use zeroize::{Zeroize, Zeroizing};

use crate::error::{Result, SerializationError};
use crate::kdf::LabeledKdf;
use crate::kem::{dhkem, kyber, Encapsulation, KemKeyPair, KemPrivateKey, KemPublicKey};
use crate::suite::KemId;

/// The classical half of the composition. Its component always comes first
/// in every concatenated encoding; this ordering is a protocol contract.
const CLASSICAL: KemId = KemId::DhkemX25519HkdfSha256;
const CLASSICAL_KEY_SIZE: usize = 32;
const CLASSICAL_ENC_SIZE: usize = 32;

/// Deterministic encapsulation consumes a 64-byte seed: the first half
/// derives the X25519 ephemeral key pair, the second half feeds the lattice
/// encapsulation.
pub(crate) const ENCAP_SEED_SIZE: usize = CLASSICAL_KEY_SIZE + kyber::ENCAP_SEED_SIZE;

/// Key derivation expands a 96-byte seed: X25519 derivation input, then the
/// lattice key generation randomness (d ‖ z).
const DERIVE_SEED_SIZE: usize = CLASSICAL_KEY_SIZE + kyber::KEYGEN_SEED_SIZE;

// The published suite metadata must stay in lockstep with the provider's
// component sizes.
const _: () = {
    let kem = KemId::HybridX25519Kyber768;
    assert!(kem.enc_size() == CLASSICAL_ENC_SIZE + kyber::CIPHERTEXT_SIZE);
    assert!(kem.public_key_size() == CLASSICAL_KEY_SIZE + kyber::PUBLIC_KEY_SIZE);
    assert!(kem.private_key_size() == CLASSICAL_KEY_SIZE + kyber::PRIVATE_KEY_SIZE);
    assert!(kem.shared_secret_size() == CLASSICAL_KEY_SIZE + kyber::SHARED_SECRET_SIZE);
};

fn own_kdf() -> LabeledKdf {
    let kem = KemId::HybridX25519Kyber768;
    LabeledKdf::new(kem.kdf(), kem.kem_suite_id().to_vec())
}

fn split_public(public_key: &KemPublicKey) -> (KemPublicKey, &[u8]) {
    let bytes = public_key.as_bytes();
    let classical = KemPublicKey::new_unchecked(CLASSICAL, bytes[..CLASSICAL_KEY_SIZE].to_vec());
    (classical, &bytes[CLASSICAL_KEY_SIZE..])
}

fn concat_key_pair(classical: &KemKeyPair, pq_public: &[u8], pq_private: &[u8]) -> KemKeyPair {
    let kem = KemId::HybridX25519Kyber768;
    let mut public_key = Vec::with_capacity(kem.public_key_size());
    public_key.extend_from_slice(classical.public_key.as_bytes());
    public_key.extend_from_slice(pq_public);

    let mut private_key = Zeroizing::new(Vec::with_capacity(kem.private_key_size()));
    private_key.extend_from_slice(classical.private_key.as_bytes());
    private_key.extend_from_slice(pq_private);

    KemKeyPair::from_parts(kem, private_key, public_key)
}

fn concat_encapsulation(
    classical: Encapsulation,
    pq_enc: &[u8],
    pq_shared_secret: &[u8],
) -> Encapsulation {
    let kem = KemId::HybridX25519Kyber768;
    let mut enc = Vec::with_capacity(kem.enc_size());
    enc.extend_from_slice(&classical.enc);
    enc.extend_from_slice(pq_enc);

    let mut shared_secret = Zeroizing::new(Vec::with_capacity(kem.shared_secret_size()));
    shared_secret.extend_from_slice(&classical.shared_secret);
    shared_secret.extend_from_slice(pq_shared_secret);

    Encapsulation { enc, shared_secret }
}

pub(crate) async fn generate_key_pair() -> Result<KemKeyPair> {
    let classical = dhkem::generate_key_pair(CLASSICAL).await?;
    let (pq_public, pq_private) = kyber::generate_key_pair()?;
    Ok(concat_key_pair(&classical, &pq_public, &pq_private))
}

/// Deterministic key derivation: one labeled expansion under the hybrid's
/// own KEM suite id seeds both halves.
pub(crate) async fn derive_key_pair(ikm: &[u8]) -> Result<KemKeyPair> {
    let kdf = own_kdf();
    let dkp_prk = Zeroizing::new(kdf.labeled_extract(&[], b"dkp_prk", ikm));
    let seed = Zeroizing::new(kdf.labeled_expand(&dkp_prk, b"sk", &[], DERIVE_SEED_SIZE)?);

    let classical = dhkem::derive_key_pair(CLASSICAL, &seed[..CLASSICAL_KEY_SIZE]).await?;

    let mut keygen_seed = [0u8; kyber::KEYGEN_SEED_SIZE];
    keygen_seed.copy_from_slice(&seed[CLASSICAL_KEY_SIZE..]);
    let pq_result = kyber::key_pair_from_seed(&keygen_seed);
    keygen_seed.zeroize();
    let (pq_public, pq_private) = pq_result?;

    Ok(concat_key_pair(&classical, &pq_public, &pq_private))
}

pub(crate) async fn encap(recipient: &KemPublicKey) -> Result<Encapsulation> {
    let (classical_public, pq_public) = split_public(recipient);
    let classical = dhkem::encap(CLASSICAL, &classical_public, None).await?;
    let (pq_enc, pq_shared_secret) = kyber::encap(pq_public)?;
    Ok(concat_encapsulation(classical, &pq_enc, &pq_shared_secret))
}

/// Deterministic encapsulation for reproducible test vectors.
pub(crate) async fn encap_derand(recipient: &KemPublicKey, seed: &[u8]) -> Result<Encapsulation> {
    if seed.len() != ENCAP_SEED_SIZE {
        return Err(SerializationError::InvalidSeedLength {
            expected: ENCAP_SEED_SIZE,
            actual: seed.len(),
        }
        .into());
    }
    let (classical_public, pq_public) = split_public(recipient);

    let ephemeral = dhkem::derive_key_pair(CLASSICAL, &seed[..CLASSICAL_KEY_SIZE]).await?;
    let classical = dhkem::encap(CLASSICAL, &classical_public, Some(&ephemeral)).await?;

    let mut pq_seed = [0u8; kyber::ENCAP_SEED_SIZE];
    pq_seed.copy_from_slice(&seed[CLASSICAL_KEY_SIZE..]);
    let pq_result = kyber::encap_seeded(pq_public, &pq_seed);
    pq_seed.zeroize();
    let (pq_enc, pq_shared_secret) = pq_result?;

    Ok(concat_encapsulation(classical, &pq_enc, &pq_shared_secret))
}

/// Split `enc` at the classical boundary and decapsulate each half.
pub(crate) async fn decap(enc: &[u8], recipient: &KemPrivateKey) -> Result<Zeroizing<Vec<u8>>> {
    let sk = recipient.as_bytes();
    let classical_private =
        KemPrivateKey::new_unchecked(CLASSICAL, sk[..CLASSICAL_KEY_SIZE].to_vec());

    let classical_shared =
        dhkem::decap(CLASSICAL, &enc[..CLASSICAL_ENC_SIZE], &classical_private).await?;
    let pq_shared = kyber::decap(&enc[CLASSICAL_ENC_SIZE..], &sk[CLASSICAL_KEY_SIZE..])?;

    let mut shared_secret = Zeroizing::new(Vec::with_capacity(
        KemId::HybridX25519Kyber768.shared_secret_size(),
    ));
    shared_secret.extend_from_slice(&classical_shared);
    shared_secret.extend_from_slice(&pq_shared);
    Ok(shared_secret)
}

pub(crate) fn validate_public_key(bytes: &[u8]) -> Result<()> {
    dhkem::validate_public_key(CLASSICAL, &bytes[..CLASSICAL_KEY_SIZE])
}
