use elliptic_curve::ecdh::diffie_hellman;
use elliptic_curve::sec1::{FromEncodedPoint, ModulusSize, ToEncodedPoint};
use elliptic_curve::{AffinePoint, CurveArithmetic, FieldBytesSize, PublicKey, SecretKey};
use rand::rngs::OsRng;
use x25519_dalek::{PublicKey as X25519PublicKey, StaticSecret};
use zeroize::Zeroizing;

use crate::error::{CryptoError, Result, SerializationError};
use crate::kdf::LabeledKdf;
use crate::kem::{Encapsulation, KemKeyPair, KemPrivateKey, KemPublicKey};
use crate::suite::KemId;

/// The Diffie-Hellman group behind a DH-based KEM.
#[derive(Debug, Clone, Copy)]
enum DhCurve {
    P256,
    P384,
    P521,
    X25519,
}

fn curve(kem: KemId) -> DhCurve {
    match kem {
        KemId::DhkemP256HkdfSha256 => DhCurve::P256,
        KemId::DhkemP384HkdfSha384 => DhCurve::P384,
        KemId::DhkemP521HkdfSha512 => DhCurve::P521,
        KemId::DhkemX25519HkdfSha256 => DhCurve::X25519,
        KemId::HybridX25519Kyber768 => unreachable!("hybrid is dispatched to its own module"),
    }
}

/// The KEM-internal labeled KDF, bound to the 5-byte `"KEM" ‖ id` suite id.
pub(crate) fn kem_kdf(kem: KemId) -> LabeledKdf {
    LabeledKdf::new(kem.kdf(), kem.kem_suite_id().to_vec())
}

pub(crate) async fn generate_key_pair(kem: KemId) -> Result<KemKeyPair> {
    let (private_key, public_key) = match curve(kem) {
        DhCurve::P256 => nist_generate::<p256::NistP256>(),
        DhCurve::P384 => nist_generate::<p384::NistP384>(),
        DhCurve::P521 => nist_generate::<p521::NistP521>(),
        DhCurve::X25519 => {
            let secret = StaticSecret::random_from_rng(OsRng);
            let public = X25519PublicKey::from(&secret);
            (
                Zeroizing::new(secret.to_bytes().to_vec()),
                public.as_bytes().to_vec(),
            )
        }
    };
    Ok(KemKeyPair::from_parts(kem, private_key, public_key))
}

/// Deterministic key derivation from input keying material.
///
/// X25519 expands the `dkp_prk` directly; the NIST curves rejection-sample
/// `"candidate"` outputs until one lands in scalar range (the P-521
/// candidate is additionally masked down to its 521-bit width).
pub(crate) async fn derive_key_pair(kem: KemId, ikm: &[u8]) -> Result<KemKeyPair> {
    let kdf = kem_kdf(kem);
    let dkp_prk = Zeroizing::new(kdf.labeled_extract(&[], b"dkp_prk", ikm));
    let private_key = match curve(kem) {
        DhCurve::X25519 => Zeroizing::new(kdf.labeled_expand(&dkp_prk, b"sk", &[], 32)?),
        nist => derive_nist_private(kem, nist, &kdf, &dkp_prk)?,
    };
    let public_key = public_from_private(kem, &private_key)?;
    Ok(KemKeyPair::from_parts(kem, private_key, public_key))
}

fn derive_nist_private(
    kem: KemId,
    nist: DhCurve,
    kdf: &LabeledKdf,
    dkp_prk: &[u8],
) -> Result<Zeroizing<Vec<u8>>> {
    let bitmask: u8 = match nist {
        DhCurve::P521 => 0x01,
        _ => 0xFF,
    };
    let private_key_size = kem.private_key_size();
    for counter in 0u8..=255 {
        let mut candidate = Zeroizing::new(kdf.labeled_expand(
            dkp_prk,
            b"candidate",
            &[counter],
            private_key_size,
        )?);
        candidate[0] &= bitmask;
        let in_range = match nist {
            DhCurve::P256 => SecretKey::<p256::NistP256>::from_slice(&candidate).is_ok(),
            DhCurve::P384 => SecretKey::<p384::NistP384>::from_slice(&candidate).is_ok(),
            DhCurve::P521 => SecretKey::<p521::NistP521>::from_slice(&candidate).is_ok(),
            DhCurve::X25519 => unreachable!("X25519 derives without sampling"),
        };
        if in_range {
            return Ok(candidate);
        }
    }
    Err(CryptoError::DeriveKeyPairFailed.into())
}

/// `Encap`: agree with an ephemeral (or supplied) key pair and derive the
/// shared secret; `enc` is the serialized ephemeral public key.
pub(crate) async fn encap(
    kem: KemId,
    recipient: &KemPublicKey,
    ephemeral: Option<&KemKeyPair>,
) -> Result<Encapsulation> {
    let ephemeral = match ephemeral {
        Some(key_pair) => key_pair.clone(),
        None => generate_key_pair(kem).await?,
    };
    let dh = agree(kem, ephemeral.private_key.as_bytes(), recipient.as_bytes())?;
    let enc = ephemeral.public_key.as_bytes().to_vec();

    let mut kem_context = Vec::with_capacity(enc.len() + recipient.as_bytes().len());
    kem_context.extend_from_slice(&enc);
    kem_context.extend_from_slice(recipient.as_bytes());

    let shared_secret = derive_shared_secret(kem, &dh, &kem_context)?;
    Ok(Encapsulation { enc, shared_secret })
}

/// `AuthEncap`: like `encap`, with a second agreement under the sender's
/// long-term key so the recipient can authenticate the sender.
pub(crate) async fn auth_encap(
    kem: KemId,
    recipient: &KemPublicKey,
    sender: &KemKeyPair,
    ephemeral: Option<&KemKeyPair>,
) -> Result<Encapsulation> {
    let ephemeral = match ephemeral {
        Some(key_pair) => key_pair.clone(),
        None => generate_key_pair(kem).await?,
    };
    let mut dh = agree(kem, ephemeral.private_key.as_bytes(), recipient.as_bytes())?;
    dh.extend_from_slice(&agree(
        kem,
        sender.private_key.as_bytes(),
        recipient.as_bytes(),
    )?);
    let enc = ephemeral.public_key.as_bytes().to_vec();

    let mut kem_context =
        Vec::with_capacity(enc.len() + recipient.as_bytes().len() + kem.public_key_size());
    kem_context.extend_from_slice(&enc);
    kem_context.extend_from_slice(recipient.as_bytes());
    kem_context.extend_from_slice(sender.public_key.as_bytes());

    let shared_secret = derive_shared_secret(kem, &dh, &kem_context)?;
    Ok(Encapsulation { enc, shared_secret })
}

/// `Decap`: the recipient-side agreement, symmetric to [`encap`].
pub(crate) async fn decap(
    kem: KemId,
    enc: &[u8],
    recipient: &KemPrivateKey,
) -> Result<Zeroizing<Vec<u8>>> {
    let dh = agree(kem, recipient.as_bytes(), enc)?;
    let recipient_public = public_from_private(kem, recipient.as_bytes())?;

    let mut kem_context = Vec::with_capacity(enc.len() + recipient_public.len());
    kem_context.extend_from_slice(enc);
    kem_context.extend_from_slice(&recipient_public);

    derive_shared_secret(kem, &dh, &kem_context)
}

/// `AuthDecap`: symmetric to [`auth_encap`].
pub(crate) async fn auth_decap(
    kem: KemId,
    enc: &[u8],
    recipient: &KemPrivateKey,
    sender: &KemPublicKey,
) -> Result<Zeroizing<Vec<u8>>> {
    let mut dh = agree(kem, recipient.as_bytes(), enc)?;
    dh.extend_from_slice(&agree(kem, recipient.as_bytes(), sender.as_bytes())?);
    let recipient_public = public_from_private(kem, recipient.as_bytes())?;

    let mut kem_context =
        Vec::with_capacity(enc.len() + recipient_public.len() + sender.as_bytes().len());
    kem_context.extend_from_slice(enc);
    kem_context.extend_from_slice(&recipient_public);
    kem_context.extend_from_slice(sender.as_bytes());

    derive_shared_secret(kem, &dh, &kem_context)
}

/// `ExtractAndExpand` over the raw agreement: `eae_prk` then
/// `shared_secret`, bound to the KEM suite id.
fn derive_shared_secret(kem: KemId, dh: &[u8], kem_context: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    let kdf = kem_kdf(kem);
    let eae_prk = Zeroizing::new(kdf.labeled_extract(&[], b"eae_prk", dh));
    Ok(Zeroizing::new(kdf.labeled_expand(
        &eae_prk,
        b"shared_secret",
        kem_context,
        kem.shared_secret_size(),
    )?))
}

fn agree(kem: KemId, private_key: &[u8], public_key: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    match curve(kem) {
        DhCurve::P256 => nist_agree::<p256::NistP256>(private_key, public_key),
        DhCurve::P384 => nist_agree::<p384::NistP384>(private_key, public_key),
        DhCurve::P521 => nist_agree::<p521::NistP521>(private_key, public_key),
        DhCurve::X25519 => {
            let private_key: [u8; 32] = private_key
                .try_into()
                .map_err(|_| SerializationError::MalformedPrivateKey)?;
            let public_key: [u8; 32] = public_key
                .try_into()
                .map_err(|_| SerializationError::MalformedPublicKey)?;
            let shared = StaticSecret::from(private_key)
                .diffie_hellman(&X25519PublicKey::from(public_key));
            if !shared.was_contributory() {
                return Err(CryptoError::NonContributoryKey.into());
            }
            Ok(Zeroizing::new(shared.as_bytes().to_vec()))
        }
    }
}

/// Recompute the serialized public key from a private key.
pub(crate) fn public_from_private(kem: KemId, private_key: &[u8]) -> Result<Vec<u8>> {
    match curve(kem) {
        DhCurve::P256 => nist_public_from_private::<p256::NistP256>(private_key),
        DhCurve::P384 => nist_public_from_private::<p384::NistP384>(private_key),
        DhCurve::P521 => nist_public_from_private::<p521::NistP521>(private_key),
        DhCurve::X25519 => {
            let private_key: [u8; 32] = private_key
                .try_into()
                .map_err(|_| SerializationError::MalformedPrivateKey)?;
            Ok(X25519PublicKey::from(&StaticSecret::from(private_key))
                .as_bytes()
                .to_vec())
        }
    }
}

/// Structural validation used when deserializing keys.
pub(crate) fn validate_public_key(kem: KemId, bytes: &[u8]) -> Result<()> {
    match curve(kem) {
        DhCurve::P256 => nist_validate_public::<p256::NistP256>(bytes),
        DhCurve::P384 => nist_validate_public::<p384::NistP384>(bytes),
        DhCurve::P521 => nist_validate_public::<p521::NistP521>(bytes),
        DhCurve::X25519 => {
            // The identity point would yield a non-contributory agreement.
            if bytes.iter().all(|&b| b == 0) {
                return Err(SerializationError::MalformedPublicKey.into());
            }
            Ok(())
        }
    }
}

pub(crate) fn validate_private_key(kem: KemId, bytes: &[u8]) -> Result<()> {
    match curve(kem) {
        DhCurve::P256 => nist_validate_private::<p256::NistP256>(bytes),
        DhCurve::P384 => nist_validate_private::<p384::NistP384>(bytes),
        DhCurve::P521 => nist_validate_private::<p521::NistP521>(bytes),
        // Clamping makes every 32-byte string a valid X25519 scalar.
        DhCurve::X25519 => Ok(()),
    }
}

fn nist_generate<C>() -> (Zeroizing<Vec<u8>>, Vec<u8>)
where
    C: CurveArithmetic,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let secret = SecretKey::<C>::random(&mut OsRng);
    let public = secret.public_key().to_encoded_point(false).as_bytes().to_vec();
    (Zeroizing::new(secret.to_bytes().to_vec()), public)
}

fn nist_agree<C>(private_key: &[u8], public_key: &[u8]) -> Result<Zeroizing<Vec<u8>>>
where
    C: CurveArithmetic,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let secret = SecretKey::<C>::from_slice(private_key)
        .map_err(|_| SerializationError::MalformedPrivateKey)?;
    let public = PublicKey::<C>::from_sec1_bytes(public_key)
        .map_err(|_| SerializationError::MalformedPublicKey)?;
    let shared = diffie_hellman(secret.to_nonzero_scalar(), public.as_affine());
    Ok(Zeroizing::new(shared.raw_secret_bytes().to_vec()))
}

fn nist_public_from_private<C>(private_key: &[u8]) -> Result<Vec<u8>>
where
    C: CurveArithmetic,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    let secret = SecretKey::<C>::from_slice(private_key)
        .map_err(|_| SerializationError::MalformedPrivateKey)?;
    Ok(secret.public_key().to_encoded_point(false).as_bytes().to_vec())
}

fn nist_validate_public<C>(bytes: &[u8]) -> Result<()>
where
    C: CurveArithmetic,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    PublicKey::<C>::from_sec1_bytes(bytes)
        .map(|_| ())
        .map_err(|_| SerializationError::MalformedPublicKey.into())
}

fn nist_validate_private<C>(bytes: &[u8]) -> Result<()>
where
    C: CurveArithmetic,
    AffinePoint<C>: FromEncodedPoint<C> + ToEncodedPoint<C>,
    FieldBytesSize<C>: ModulusSize,
{
    SecretKey::<C>::from_slice(bytes)
        .map(|_| ())
        .map_err(|_| SerializationError::MalformedPrivateKey.into())
}
