use aes_gcm::{Aes128Gcm, Aes256Gcm};
use chacha20poly1305::aead::{Aead, KeyInit, Payload};
use chacha20poly1305::ChaCha20Poly1305;
use zeroize::Zeroizing;

use crate::error::{ConfigError, CryptoError, Result};
use crate::suite::AeadId;

/// Provider-native cipher handle after key import.
enum AeadCipher {
    Aes128Gcm(Box<Aes128Gcm>),
    Aes256Gcm(Box<Aes256Gcm>),
    ChaCha20Poly1305(Box<ChaCha20Poly1305>),
}

impl AeadCipher {
    fn import(aead: AeadId, raw: &[u8]) -> Result<Self> {
        // Lengths are fixed by the key schedule; `new_from_slice` cannot fail
        // once `SealingKey::new` has validated them.
        Ok(match aead {
            AeadId::Aes128Gcm => AeadCipher::Aes128Gcm(Box::new(
                Aes128Gcm::new_from_slice(raw).expect("key length validated"),
            )),
            AeadId::Aes256Gcm => AeadCipher::Aes256Gcm(Box::new(
                Aes256Gcm::new_from_slice(raw).expect("key length validated"),
            )),
            AeadId::ChaCha20Poly1305 => AeadCipher::ChaCha20Poly1305(Box::new(
                ChaCha20Poly1305::new_from_slice(raw).expect("key length validated"),
            )),
            AeadId::ExportOnly => return Err(ConfigError::ExportOnlySuite.into()),
        })
    }
}

/// One-shot key state: the raw bytes exist only until first use.
enum KeyState {
    Raw(Zeroizing<Vec<u8>>),
    Imported(AeadCipher),
}

/// A symmetric AEAD key with lazy, at-most-once import into the provider.
///
/// The raw key material is consumed on the first encrypt/decrypt and its
/// buffer is wiped on that same path (`Zeroizing` drop). Nonce and AAD are
/// caller-supplied; this type performs no nonce management.
pub struct SealingKey {
    aead: AeadId,
    state: KeyState,
}

impl SealingKey {
    pub(crate) fn new(aead: AeadId, raw: Vec<u8>) -> Result<Self> {
        if aead == AeadId::ExportOnly {
            return Err(ConfigError::ExportOnlySuite.into());
        }
        if raw.len() != aead.key_size() {
            return Err(CryptoError::SealFailed.into());
        }
        Ok(Self {
            aead,
            state: KeyState::Raw(Zeroizing::new(raw)),
        })
    }

    #[cfg(test)]
    pub(crate) fn aead(&self) -> AeadId {
        self.aead
    }

    fn cipher(&mut self) -> Result<&AeadCipher> {
        if let KeyState::Raw(raw) = &self.state {
            let imported = AeadCipher::import(self.aead, raw)?;
            // Replacing the state drops the raw buffer, which zeroes it.
            self.state = KeyState::Imported(imported);
        }
        match &self.state {
            KeyState::Imported(cipher) => Ok(cipher),
            KeyState::Raw(_) => unreachable!("raw key imported above"),
        }
    }

    /// Authenticated encryption with an explicit nonce and associated data.
    pub(crate) async fn encrypt(
        &mut self,
        nonce: &[u8],
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>> {
        let payload = Payload {
            msg: plaintext,
            aad,
        };
        let result = match self.cipher()? {
            AeadCipher::Aes128Gcm(cipher) => {
                cipher.encrypt(aes_gcm::Nonce::from_slice(nonce), payload)
            }
            AeadCipher::Aes256Gcm(cipher) => {
                cipher.encrypt(aes_gcm::Nonce::from_slice(nonce), payload)
            }
            AeadCipher::ChaCha20Poly1305(cipher) => {
                cipher.encrypt(chacha20poly1305::Nonce::from_slice(nonce), payload)
            }
        };
        result.map_err(|_| CryptoError::SealFailed.into())
    }

    /// Authenticated decryption. A tag mismatch surfaces as
    /// [`CryptoError::AuthenticationFailure`] and nothing else — the error
    /// shape does not reveal why verification failed.
    pub(crate) async fn decrypt(
        &mut self,
        nonce: &[u8],
        ciphertext: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>> {
        let payload = Payload {
            msg: ciphertext,
            aad,
        };
        let result = match self.cipher()? {
            AeadCipher::Aes128Gcm(cipher) => {
                cipher.decrypt(aes_gcm::Nonce::from_slice(nonce), payload)
            }
            AeadCipher::Aes256Gcm(cipher) => {
                cipher.decrypt(aes_gcm::Nonce::from_slice(nonce), payload)
            }
            AeadCipher::ChaCha20Poly1305(cipher) => {
                cipher.decrypt(chacha20poly1305::Nonce::from_slice(nonce), payload)
            }
        };
        result.map_err(|_| CryptoError::AuthenticationFailure.into())
    }

    #[cfg(test)]
    fn raw_key_consumed(&self) -> bool {
        matches!(self.state, KeyState::Imported(_))
    }
}
