pub(crate) mod dhkem;
pub(crate) mod hybrid;
pub(crate) mod kyber;

use std::fmt;

use zeroize::Zeroizing;

use crate::error::{ConfigError, Result, SerializationError};
use crate::suite::KemId;

/// An encoded KEM public key, tagged with the KEM it belongs to.
#[derive(Clone, PartialEq, Eq)]
pub struct KemPublicKey {
    kem: KemId,
    bytes: Vec<u8>,
}

impl KemPublicKey {
    pub(crate) fn new_unchecked(kem: KemId, bytes: Vec<u8>) -> Self {
        Self { kem, bytes }
    }

    pub fn kem(&self) -> KemId {
        self.kem
    }

    /// The fixed-width serialized encoding.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for KemPublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KemPublicKey")
            .field("kem", &self.kem)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// An encoded KEM private key. The buffer is wiped on drop and the Debug
/// representation never prints key material.
#[derive(Clone)]
pub struct KemPrivateKey {
    kem: KemId,
    bytes: Zeroizing<Vec<u8>>,
}

impl KemPrivateKey {
    pub(crate) fn new_unchecked(kem: KemId, bytes: Vec<u8>) -> Self {
        Self {
            kem,
            bytes: Zeroizing::new(bytes),
        }
    }

    pub fn kem(&self) -> KemId {
        self.kem
    }

    /// The fixed-width serialized encoding. Handle with care.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}

impl fmt::Debug for KemPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KemPrivateKey")
            .field("kem", &self.kem)
            .finish_non_exhaustive()
    }
}

/// A KEM key pair.
#[derive(Debug, Clone)]
pub struct KemKeyPair {
    pub public_key: KemPublicKey,
    pub private_key: KemPrivateKey,
}

impl KemKeyPair {
    pub(crate) fn from_parts(
        kem: KemId,
        private_key: Zeroizing<Vec<u8>>,
        public_key: Vec<u8>,
    ) -> Self {
        Self {
            public_key: KemPublicKey {
                kem,
                bytes: public_key,
            },
            private_key: KemPrivateKey {
                kem,
                bytes: private_key,
            },
        }
    }
}

/// Result of a KEM encapsulation: the value transmitted to the recipient and
/// the locally held shared secret.
pub struct Encapsulation {
    pub enc: Vec<u8>,
    pub shared_secret: Zeroizing<Vec<u8>>,
}

impl KemId {
    /// Generate a fresh key pair from provider randomness.
    pub async fn generate_key_pair(self) -> Result<KemKeyPair> {
        match self {
            KemId::HybridX25519Kyber768 => hybrid::generate_key_pair().await,
            _ => dhkem::generate_key_pair(self).await,
        }
    }

    /// Deterministically derive a key pair from input keying material.
    ///
    /// Intended for reproducible test-vector key generation, not general
    /// runtime use.
    pub async fn derive_key_pair(self, ikm: &[u8]) -> Result<KemKeyPair> {
        match self {
            KemId::HybridX25519Kyber768 => hybrid::derive_key_pair(ikm).await,
            _ => dhkem::derive_key_pair(self, ikm).await,
        }
    }

    /// Encapsulate against a recipient public key, returning the
    /// encapsulated value and shared secret. A caller-supplied ephemeral key
    /// pair pins the encapsulation for test vectors (DH KEMs only).
    pub async fn encap(
        self,
        recipient: &KemPublicKey,
        ephemeral: Option<&KemKeyPair>,
    ) -> Result<Encapsulation> {
        self.check_key(recipient.kem)?;
        if let Some(ephemeral) = ephemeral {
            self.check_key(ephemeral.public_key.kem)?;
        }
        match self {
            KemId::HybridX25519Kyber768 => {
                if ephemeral.is_some() {
                    return Err(ConfigError::EphemeralKeyPairUnsupported.into());
                }
                hybrid::encap(recipient).await
            }
            _ => dhkem::encap(self, recipient, ephemeral).await,
        }
    }

    /// Deterministic encapsulation from a fixed seed, for reproducing
    /// published test vectors.
    pub async fn encap_derand(self, recipient: &KemPublicKey, seed: &[u8]) -> Result<Encapsulation> {
        self.check_key(recipient.kem)?;
        match self {
            KemId::HybridX25519Kyber768 => hybrid::encap_derand(recipient, seed).await,
            _ => {
                let ephemeral = dhkem::derive_key_pair(self, seed).await?;
                dhkem::encap(self, recipient, Some(&ephemeral)).await
            }
        }
    }

    /// Authenticated encapsulation under the sender's long-term key pair.
    /// DH KEMs only.
    pub async fn auth_encap(
        self,
        recipient: &KemPublicKey,
        sender: &KemKeyPair,
        ephemeral: Option<&KemKeyPair>,
    ) -> Result<Encapsulation> {
        self.check_key(recipient.kem)?;
        self.check_key(sender.public_key.kem)?;
        match self {
            KemId::HybridX25519Kyber768 => Err(ConfigError::SenderAuthUnsupported.into()),
            _ => dhkem::auth_encap(self, recipient, sender, ephemeral).await,
        }
    }

    /// Recover the shared secret from an encapsulated value.
    pub async fn decap(self, enc: &[u8], recipient: &KemPrivateKey) -> Result<Zeroizing<Vec<u8>>> {
        self.check_key(recipient.kem)?;
        self.check_enc(enc)?;
        match self {
            KemId::HybridX25519Kyber768 => hybrid::decap(enc, recipient).await,
            _ => dhkem::decap(self, enc, recipient).await,
        }
    }

    /// Authenticated decapsulation counterpart of [`KemId::auth_encap`].
    pub async fn auth_decap(
        self,
        enc: &[u8],
        recipient: &KemPrivateKey,
        sender: &KemPublicKey,
    ) -> Result<Zeroizing<Vec<u8>>> {
        self.check_key(recipient.kem)?;
        self.check_key(sender.kem)?;
        self.check_enc(enc)?;
        match self {
            KemId::HybridX25519Kyber768 => Err(ConfigError::SenderAuthUnsupported.into()),
            _ => dhkem::auth_decap(self, enc, recipient, sender).await,
        }
    }

    /// Validate and wrap a serialized public key.
    pub fn deserialize_public_key(self, bytes: &[u8]) -> Result<KemPublicKey> {
        if bytes.len() != self.public_key_size() {
            return Err(SerializationError::InvalidPublicKeyLength {
                expected: self.public_key_size(),
                actual: bytes.len(),
            }
            .into());
        }
        match self {
            KemId::HybridX25519Kyber768 => hybrid::validate_public_key(bytes)?,
            _ => dhkem::validate_public_key(self, bytes)?,
        }
        Ok(KemPublicKey {
            kem: self,
            bytes: bytes.to_vec(),
        })
    }

    /// Validate and wrap a serialized private key.
    pub fn deserialize_private_key(self, bytes: &[u8]) -> Result<KemPrivateKey> {
        if bytes.len() != self.private_key_size() {
            return Err(SerializationError::InvalidPrivateKeyLength {
                expected: self.private_key_size(),
                actual: bytes.len(),
            }
            .into());
        }
        if self != KemId::HybridX25519Kyber768 {
            dhkem::validate_private_key(self, bytes)?;
        }
        Ok(KemPrivateKey {
            kem: self,
            bytes: Zeroizing::new(bytes.to_vec()),
        })
    }

    fn check_key(self, key_kem: KemId) -> Result<()> {
        if self != key_kem {
            return Err(SerializationError::KemMismatch.into());
        }
        Ok(())
    }

    fn check_enc(self, enc: &[u8]) -> Result<()> {
        if enc.len() != self.enc_size() {
            return Err(SerializationError::InvalidEncapsulationLength {
                expected: self.enc_size(),
                actual: enc.len(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[tokio::test]
    async fn keys_are_bound_to_their_kem() {
        let x = KemId::DhkemX25519HkdfSha256;
        let p = KemId::DhkemP256HkdfSha256;
        let key_pair = x.generate_key_pair().await.unwrap();

        let result = p.encap(&key_pair.public_key, None).await;
        assert!(matches!(
            result,
            Err(Error::Serialization(SerializationError::KemMismatch))
        ));
    }

    #[tokio::test]
    async fn enc_length_is_enforced() {
        let kem = KemId::DhkemX25519HkdfSha256;
        let key_pair = kem.generate_key_pair().await.unwrap();
        let result = kem.decap(&[0u8; 31], &key_pair.private_key).await;
        assert!(matches!(
            result,
            Err(Error::Serialization(
                SerializationError::InvalidEncapsulationLength { expected: 32, actual: 31 }
            ))
        ));
    }

    #[tokio::test]
    async fn serialization_round_trip() {
        for kem in [
            KemId::DhkemP256HkdfSha256,
            KemId::DhkemX25519HkdfSha256,
            KemId::HybridX25519Kyber768,
        ] {
            let key_pair = kem.generate_key_pair().await.unwrap();
            let pk = kem
                .deserialize_public_key(key_pair.public_key.as_bytes())
                .unwrap();
            assert_eq!(pk.as_bytes(), key_pair.public_key.as_bytes());
            let sk = kem
                .deserialize_private_key(key_pair.private_key.as_bytes())
                .unwrap();
            assert_eq!(sk.as_bytes(), key_pair.private_key.as_bytes());
        }
    }

    #[test]
    fn wrong_length_keys_rejected() {
        let kem = KemId::DhkemX25519HkdfSha256;
        assert!(kem.deserialize_public_key(&[0x11; 31]).is_err());
        assert!(kem.deserialize_private_key(&[0x11; 33]).is_err());
    }

    #[tokio::test]
    async fn hybrid_rejects_sender_auth() {
        let kem = KemId::HybridX25519Kyber768;
        let recipient = kem.generate_key_pair().await.unwrap();
        let sender = kem.generate_key_pair().await.unwrap();
        let result = kem
            .auth_encap(&recipient.public_key, &sender, None)
            .await;
        assert!(matches!(
            result,
            Err(Error::Config(ConfigError::SenderAuthUnsupported))
        ));
    }
}
