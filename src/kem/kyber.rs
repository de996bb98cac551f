use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};
use zeroize::Zeroizing;

use crate::error::{CryptoError, Error, Result, SerializationError};

/// Ciphertext length for the 768-parameter set.
pub(crate) const CIPHERTEXT_SIZE: usize = pqc_kyber::KYBER_CIPHERTEXTBYTES;
/// Encoded public key length.
pub(crate) const PUBLIC_KEY_SIZE: usize = pqc_kyber::KYBER_PUBLICKEYBYTES;
/// Encoded private key length.
pub(crate) const PRIVATE_KEY_SIZE: usize = pqc_kyber::KYBER_SECRETKEYBYTES;
/// Shared secret length.
pub(crate) const SHARED_SECRET_SIZE: usize = pqc_kyber::KYBER_SSBYTES;
/// Key generation consumes 64 bytes of randomness (d ‖ z).
pub(crate) const KEYGEN_SEED_SIZE: usize = 64;
/// Encapsulation consumes 32 bytes of randomness.
pub(crate) const ENCAP_SEED_SIZE: usize = 32;

/// Fixed-tape RNG driving the provider's randomized API on deterministic
/// paths. The tape length matches exactly what the provider draws; reading
/// past it would mean the provider contract changed.
struct SeedTape<'a> {
    tape: &'a [u8],
    position: usize,
}

impl<'a> SeedTape<'a> {
    fn new(tape: &'a [u8]) -> Self {
        Self { tape, position: 0 }
    }
}

impl RngCore for SeedTape<'_> {
    fn next_u32(&mut self) -> u32 {
        let mut buf = [0u8; 4];
        self.fill_bytes(&mut buf);
        u32::from_le_bytes(buf)
    }

    fn next_u64(&mut self) -> u64 {
        let mut buf = [0u8; 8];
        self.fill_bytes(&mut buf);
        u64::from_le_bytes(buf)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        let end = self.position + dest.len();
        assert!(end <= self.tape.len(), "lattice provider drew past the seed tape");
        dest.copy_from_slice(&self.tape[self.position..end]);
        self.position = end;
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> std::result::Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl CryptoRng for SeedTape<'_> {}

fn provider_error(err: pqc_kyber::KyberError) -> Error {
    CryptoError::LatticeKem(err.to_string()).into()
}

/// Generate a key pair from provider randomness.
pub(crate) fn generate_key_pair() -> Result<(Vec<u8>, Zeroizing<Vec<u8>>)> {
    let keys = pqc_kyber::keypair(&mut OsRng).map_err(provider_error)?;
    Ok((keys.public.to_vec(), Zeroizing::new(keys.secret.to_vec())))
}

/// Deterministic key generation from a 64-byte seed (d ‖ z).
pub(crate) fn key_pair_from_seed(
    seed: &[u8; KEYGEN_SEED_SIZE],
) -> Result<(Vec<u8>, Zeroizing<Vec<u8>>)> {
    let mut tape = SeedTape::new(seed);
    let keys = pqc_kyber::keypair(&mut tape).map_err(provider_error)?;
    Ok((keys.public.to_vec(), Zeroizing::new(keys.secret.to_vec())))
}

/// Randomized encapsulation against `public_key`.
pub(crate) fn encap(public_key: &[u8]) -> Result<(Vec<u8>, Zeroizing<Vec<u8>>)> {
    check_public_key(public_key)?;
    let (ciphertext, shared_secret) =
        pqc_kyber::encapsulate(public_key, &mut OsRng).map_err(provider_error)?;
    Ok((ciphertext.to_vec(), Zeroizing::new(shared_secret.to_vec())))
}

/// Deterministic encapsulation using a 32-byte randomness seed.
pub(crate) fn encap_seeded(
    public_key: &[u8],
    seed: &[u8; ENCAP_SEED_SIZE],
) -> Result<(Vec<u8>, Zeroizing<Vec<u8>>)> {
    check_public_key(public_key)?;
    let mut tape = SeedTape::new(seed);
    let (ciphertext, shared_secret) =
        pqc_kyber::encapsulate(public_key, &mut tape).map_err(provider_error)?;
    Ok((ciphertext.to_vec(), Zeroizing::new(shared_secret.to_vec())))
}

/// Decapsulate `ciphertext` with `private_key`.
pub(crate) fn decap(ciphertext: &[u8], private_key: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if ciphertext.len() != CIPHERTEXT_SIZE {
        return Err(SerializationError::InvalidEncapsulationLength {
            expected: CIPHERTEXT_SIZE,
            actual: ciphertext.len(),
        }
        .into());
    }
    if private_key.len() != PRIVATE_KEY_SIZE {
        return Err(SerializationError::InvalidPrivateKeyLength {
            expected: PRIVATE_KEY_SIZE,
            actual: private_key.len(),
        }
        .into());
    }
    let shared_secret = pqc_kyber::decapsulate(ciphertext, private_key).map_err(provider_error)?;
    Ok(Zeroizing::new(shared_secret.to_vec()))
}

fn check_public_key(public_key: &[u8]) -> Result<()> {
    if public_key.len() != PUBLIC_KEY_SIZE {
        return Err(SerializationError::InvalidPublicKeyLength {
            expected: PUBLIC_KEY_SIZE,
            actual: public_key.len(),
        }
        .into());
    }
    Ok(())
}
