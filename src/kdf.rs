use hkdf::Hkdf;
use sha2::{Sha256, Sha384, Sha512};

use crate::error::{CryptoError, Result};
use crate::suite::KdfId;

/// Protocol version label mixed into every labeled derivation.
const VERSION_LABEL: &[u8] = b"HPKE-v1";

/// HKDF engine with labeled extract/expand bound to a suite identifier.
///
/// The suite id is the 10-byte `"HPKE" ‖ ids` identifier when used by the key
/// schedule and exporter, or the 5-byte `"KEM" ‖ id` identifier when used
/// inside a KEM. Binding it into every call domain-separates derivations
/// across suites and protocols.
#[derive(Debug, Clone)]
pub struct LabeledKdf {
    kdf: KdfId,
    suite_id: Vec<u8>,
}

impl LabeledKdf {
    pub fn new(kdf: KdfId, suite_id: Vec<u8>) -> Self {
        Self { kdf, suite_id }
    }

    /// Length in bytes of the underlying hash output (Nh).
    pub fn hash_size(&self) -> usize {
        self.kdf.hash_size()
    }

    /// Plain two-argument `Extract(salt, ikm)`. An empty salt selects the
    /// KDF's default (a zero-filled block of hash length).
    pub fn extract(&self, salt: &[u8], ikm: &[u8]) -> Vec<u8> {
        let salt = if salt.is_empty() { None } else { Some(salt) };
        match self.kdf {
            KdfId::HkdfSha256 => Hkdf::<Sha256>::extract(salt, ikm).0.to_vec(),
            KdfId::HkdfSha384 => Hkdf::<Sha384>::extract(salt, ikm).0.to_vec(),
            KdfId::HkdfSha512 => Hkdf::<Sha512>::extract(salt, ikm).0.to_vec(),
        }
    }

    /// Plain `Expand(prk, info, length)`. Requesting more than 255·Nh bytes
    /// is rejected by the provider; suite parameters keep this unreachable
    /// at runtime.
    pub fn expand(&self, prk: &[u8], info: &[u8], length: usize) -> Result<Vec<u8>> {
        let mut okm = vec![0u8; length];
        let expanded = match self.kdf {
            KdfId::HkdfSha256 => Hkdf::<Sha256>::from_prk(prk)
                .map_err(|_| ())
                .and_then(|hk| hk.expand(info, &mut okm).map_err(|_| ())),
            KdfId::HkdfSha384 => Hkdf::<Sha384>::from_prk(prk)
                .map_err(|_| ())
                .and_then(|hk| hk.expand(info, &mut okm).map_err(|_| ())),
            KdfId::HkdfSha512 => Hkdf::<Sha512>::from_prk(prk)
                .map_err(|_| ())
                .and_then(|hk| hk.expand(info, &mut okm).map_err(|_| ())),
        };
        match expanded {
            Ok(()) => Ok(okm),
            Err(()) => Err(CryptoError::HkdfExpandFailed.into()),
        }
    }

    /// `LabeledExtract(salt, label, ikm)`: extract over
    /// `"HPKE-v1" ‖ suite_id ‖ label ‖ ikm`.
    pub fn labeled_extract(&self, salt: &[u8], label: &[u8], ikm: &[u8]) -> Vec<u8> {
        self.extract(salt, &self.build_labeled_ikm(label, ikm))
    }

    /// `LabeledExpand(prk, label, info, length)`: expand with info
    /// `i2osp(length, 2) ‖ "HPKE-v1" ‖ suite_id ‖ label ‖ info`.
    pub fn labeled_expand(
        &self,
        prk: &[u8],
        label: &[u8],
        info: &[u8],
        length: usize,
    ) -> Result<Vec<u8>> {
        self.expand(prk, &self.build_labeled_info(label, info, length), length)
    }

    /// Assemble the labeled IKM prefix for `LabeledExtract`.
    pub fn build_labeled_ikm(&self, label: &[u8], ikm: &[u8]) -> Vec<u8> {
        let mut out =
            Vec::with_capacity(VERSION_LABEL.len() + self.suite_id.len() + label.len() + ikm.len());
        out.extend_from_slice(VERSION_LABEL);
        out.extend_from_slice(&self.suite_id);
        out.extend_from_slice(label);
        out.extend_from_slice(ikm);
        out
    }

    /// Assemble the labeled info field for `LabeledExpand`.
    pub fn build_labeled_info(&self, label: &[u8], info: &[u8], length: usize) -> Vec<u8> {
        let mut out = Vec::with_capacity(
            2 + VERSION_LABEL.len() + self.suite_id.len() + label.len() + info.len(),
        );
        out.extend_from_slice(&(length as u16).to_be_bytes());
        out.extend_from_slice(VERSION_LABEL);
        out.extend_from_slice(&self.suite_id);
        out.extend_from_slice(label);
        out.extend_from_slice(info);
        out
    }

    /// `Extract(salt, ikm)` followed by `Expand` with a prebuilt info field.
    /// This composition is the primitive used by the key schedule and the
    /// DH KEM shared-secret derivation.
    pub fn extract_and_expand(
        &self,
        salt: &[u8],
        ikm: &[u8],
        info: &[u8],
        length: usize,
    ) -> Result<Vec<u8>> {
        let prk = self.extract(salt, ikm);
        self.expand(&prk, info, length)
    }
}
