use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::aead::SealingKey;
use crate::error::{ConfigError, Result};
use crate::kdf::LabeledKdf;
use crate::suite::AeadId;

/// HPKE operating mode, encoded as the leading byte of the key schedule
/// context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Mode {
    Base = 0x00,
    Psk = 0x01,
    Auth = 0x02,
    AuthPsk = 0x03,
}

/// A pre-shared key and its identifier. Both buffers are wiped on drop.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct Psk {
    pub key: Vec<u8>,
    pub id: Vec<u8>,
}

/// Optional per-session inputs to the key schedule.
pub struct KeyScheduleParams<'a> {
    pub psk: Option<&'a Psk>,
    pub info: Option<&'a [u8]>,
}

/// Output of the key schedule: an AEAD key and base nonce (absent for
/// export-only suites) plus the exporter secret. The sequence counter starts
/// at zero in the context built from this.
pub(crate) struct AeadParams {
    pub key: Option<SealingKey>,
    pub base_nonce: Vec<u8>,
    pub exporter_secret: Zeroizing<Vec<u8>>,
}

/// Derives AEAD parameters from a KEM shared secret.
///
/// Holds a [`LabeledKdf`] bound to the full 10-byte suite id; the engine is
/// a collaborator, not a base class, so it stays independently testable.
pub(crate) struct KeySchedule {
    kdf: LabeledKdf,
    aead: AeadId,
}

impl KeySchedule {
    pub(crate) fn new(kdf: LabeledKdf, aead: AeadId) -> Self {
        Self { kdf, aead }
    }

    /// Validate PSK inputs against the operating mode.
    ///
    /// The mode/presence arms only fire when the mode is chosen
    /// independently of the inputs; with the mode derived from the supplied
    /// parameters they are structurally satisfied, but the key↔id
    /// consistency check is load-bearing and always runs.
    pub(crate) fn verify_psk_inputs(mode: Mode, params: &KeyScheduleParams<'_>) -> Result<()> {
        let (got_psk, got_psk_id) = match params.psk {
            Some(psk) => (!psk.key.is_empty(), !psk.id.is_empty()),
            None => (false, false),
        };
        if got_psk != got_psk_id {
            return Err(ConfigError::InconsistentPsk.into());
        }
        if got_psk && matches!(mode, Mode::Base | Mode::Auth) {
            return Err(ConfigError::UnexpectedPsk.into());
        }
        if !got_psk && matches!(mode, Mode::Psk | Mode::AuthPsk) {
            return Err(ConfigError::MissingPsk.into());
        }
        Ok(())
    }

    /// Run the key schedule over a KEM shared secret.
    ///
    /// The derivation order is fixed by the wire specification; reordering
    /// any step breaks interoperability.
    pub(crate) async fn derive(
        &self,
        mode: Mode,
        shared_secret: &[u8],
        params: &KeyScheduleParams<'_>,
    ) -> Result<AeadParams> {
        Self::verify_psk_inputs(mode, params)?;

        let psk_id = params.psk.map(|psk| psk.id.as_slice()).unwrap_or(&[]);
        let psk_id_hash = self.kdf.labeled_extract(&[], b"psk_id_hash", psk_id);

        let info = params.info.unwrap_or(&[]);
        let info_hash = self.kdf.labeled_extract(&[], b"info_hash", info);

        let mut context = Vec::with_capacity(1 + psk_id_hash.len() + info_hash.len());
        context.push(mode as u8);
        context.extend_from_slice(&psk_id_hash);
        context.extend_from_slice(&info_hash);

        // The labeled PSK becomes the IKM of a second extract salted with the
        // KEM shared secret; each output is then one expand over that PRK.
        let psk = params.psk.map(|psk| psk.key.as_slice()).unwrap_or(&[]);
        let ikm = Zeroizing::new(self.kdf.build_labeled_ikm(b"secret", psk));

        let hash_size = self.kdf.hash_size();
        let exporter_info = self.kdf.build_labeled_info(b"exp", &context, hash_size);
        let exporter_secret = Zeroizing::new(self.kdf.extract_and_expand(
            shared_secret,
            &ikm,
            &exporter_info,
            hash_size,
        )?);

        if self.aead == AeadId::ExportOnly {
            return Ok(AeadParams {
                key: None,
                base_nonce: Vec::new(),
                exporter_secret,
            });
        }

        let key_info = self
            .kdf
            .build_labeled_info(b"key", &context, self.aead.key_size());
        let key = self
            .kdf
            .extract_and_expand(shared_secret, &ikm, &key_info, self.aead.key_size())?;

        let nonce_info =
            self.kdf
                .build_labeled_info(b"base_nonce", &context, self.aead.nonce_size());
        let base_nonce = self.kdf.extract_and_expand(
            shared_secret,
            &ikm,
            &nonce_info,
            self.aead.nonce_size(),
        )?;

        Ok(AeadParams {
            key: Some(SealingKey::new(self.aead, key)?),
            base_nonce,
            exporter_secret,
        })
    }
}
