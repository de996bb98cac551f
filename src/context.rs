use zeroize::Zeroizing;

use crate::aead::SealingKey;
use crate::error::{ConfigError, CryptoError, Result};
use crate::kdf::LabeledKdf;
use crate::schedule::AeadParams;

/// Highest sequence value this context will consume for a given nonce
/// length. Refusing at the bound (rather than wrapping) is what prevents
/// nonce reuse.
fn max_sequence(nonce_size: usize) -> u64 {
    if nonce_size >= 8 {
        u64::MAX
    } else {
        (1u64 << (8 * nonce_size)) - 1
    }
}

struct AeadState {
    key: SealingKey,
    base_nonce: Vec<u8>,
    sequence: u64,
    max_sequence: u64,
}

impl AeadState {
    /// Per-message nonce: `base_nonce XOR big_endian(sequence)`, with the
    /// counter aligned to the low-order bytes.
    fn message_nonce(&self) -> Vec<u8> {
        let mut nonce = self.base_nonce.clone();
        let seq = self.sequence.to_be_bytes();
        let take = seq.len().min(nonce.len());
        let nonce_offset = nonce.len() - take;
        let seq_offset = seq.len() - take;
        for i in 0..take {
            nonce[nonce_offset + i] ^= seq[seq_offset + i];
        }
        nonce
    }
}

/// Stateful per-session encryption context.
///
/// `seal` and `open` must be called strictly sequentially: the sequence
/// counter is shared mutable state with no internal synchronization, and
/// concurrent calls on one context risk nonce reuse. Distinct contexts share
/// nothing and carry no ordering constraint.
pub struct EncryptionContext {
    kdf: LabeledKdf,
    exporter_secret: Zeroizing<Vec<u8>>,
    aead: Option<AeadState>,
}

impl EncryptionContext {
    pub(crate) fn new(kdf: LabeledKdf, params: AeadParams) -> Self {
        let aead = params.key.map(|key| {
            let max_sequence = max_sequence(params.base_nonce.len());
            AeadState {
                key,
                base_nonce: params.base_nonce,
                sequence: 0,
                max_sequence,
            }
        });
        Self {
            kdf,
            exporter_secret: params.exporter_secret,
            aead,
        }
    }

    /// Encrypt the next message. The sequence counter advances only after
    /// the provider call succeeds, so an aborted call leaves the context
    /// unchanged.
    pub async fn seal(&mut self, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        let state = self
            .aead
            .as_mut()
            .ok_or(ConfigError::ExportOnlySuite)?;
        if state.sequence >= state.max_sequence {
            return Err(CryptoError::MessageLimitReached.into());
        }
        let nonce = state.message_nonce();
        let ciphertext = state.key.encrypt(&nonce, plaintext, aad).await?;
        state.sequence += 1;
        Ok(ciphertext)
    }

    /// Decrypt the next message. The sequence counter advances only on
    /// successful authentication, so a forged ciphertext cannot desynchronize
    /// the context.
    pub async fn open(&mut self, ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        let state = self
            .aead
            .as_mut()
            .ok_or(ConfigError::ExportOnlySuite)?;
        if state.sequence >= state.max_sequence {
            return Err(CryptoError::MessageLimitReached.into());
        }
        let nonce = state.message_nonce();
        let plaintext = state.key.decrypt(&nonce, ciphertext, aad).await?;
        state.sequence += 1;
        Ok(plaintext)
    }

    /// Derive an auxiliary secret from the exporter secret. Has no effect on
    /// the sequence counter and is available on export-only suites.
    pub async fn export(&self, exporter_context: &[u8], length: usize) -> Result<Vec<u8>> {
        self.kdf
            .labeled_expand(&self.exporter_secret, b"sec", exporter_context, length)
    }

    /// The next sequence value to be consumed.
    pub fn sequence(&self) -> u64 {
        self.aead.as_ref().map(|state| state.sequence).unwrap_or(0)
    }

    #[cfg(test)]
    pub(crate) fn force_sequence(&mut self, sequence: u64) {
        if let Some(state) = self.aead.as_mut() {
            state.sequence = sequence;
        }
    }
}

/// A sender-side context: an [`EncryptionContext`] plus the encapsulated
/// value that must reach the recipient out of band.
pub struct SenderContext {
    enc: Vec<u8>,
    context: EncryptionContext,
}

impl SenderContext {
    pub(crate) fn new(enc: Vec<u8>, context: EncryptionContext) -> Self {
        Self { enc, context }
    }

    /// The encapsulated value to transmit to the recipient.
    pub fn enc(&self) -> &[u8] {
        &self.enc
    }

    pub async fn seal(&mut self, plaintext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        self.context.seal(plaintext, aad).await
    }

    pub async fn open(&mut self, ciphertext: &[u8], aad: &[u8]) -> Result<Vec<u8>> {
        self.context.open(ciphertext, aad).await
    }

    pub async fn export(&self, exporter_context: &[u8], length: usize) -> Result<Vec<u8>> {
        self.context.export(exporter_context, length).await
    }

    pub fn sequence(&self) -> u64 {
        self.context.sequence()
    }
}
