use zeroize::Zeroizing;

use crate::context::{EncryptionContext, SenderContext};
use crate::error::{ConfigError, Result};
use crate::kdf::LabeledKdf;
use crate::kem::{KemKeyPair, KemPublicKey};
use crate::schedule::{KeySchedule, KeyScheduleParams, Mode, Psk};

/// Supported key encapsulation mechanisms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum KemId {
    /// DHKEM(P-256, HKDF-SHA256)
    DhkemP256HkdfSha256 = 0x0010,
    /// DHKEM(P-384, HKDF-SHA384)
    DhkemP384HkdfSha384 = 0x0011,
    /// DHKEM(P-521, HKDF-SHA512)
    DhkemP521HkdfSha512 = 0x0012,
    /// DHKEM(X25519, HKDF-SHA256)
    DhkemX25519HkdfSha256 = 0x0020,
    /// X25519 + Kyber768 hybrid
    HybridX25519Kyber768 = 0x0030,
}

impl KemId {
    /// Length in bytes of the KEM shared secret (Nsecret).
    pub const fn shared_secret_size(self) -> usize {
        match self {
            Self::DhkemP256HkdfSha256 => 32,
            Self::DhkemP384HkdfSha384 => 48,
            Self::DhkemP521HkdfSha512 => 64,
            Self::DhkemX25519HkdfSha256 => 32,
            Self::HybridX25519Kyber768 => 64,
        }
    }

    /// Length in bytes of the encapsulated value (Nenc).
    pub const fn enc_size(self) -> usize {
        match self {
            Self::DhkemP256HkdfSha256 => 65,
            Self::DhkemP384HkdfSha384 => 97,
            Self::DhkemP521HkdfSha512 => 133,
            Self::DhkemX25519HkdfSha256 => 32,
            Self::HybridX25519Kyber768 => 1120,
        }
    }

    /// Length in bytes of an encoded public key (Npk).
    pub const fn public_key_size(self) -> usize {
        match self {
            Self::DhkemP256HkdfSha256 => 65,
            Self::DhkemP384HkdfSha384 => 97,
            Self::DhkemP521HkdfSha512 => 133,
            Self::DhkemX25519HkdfSha256 => 32,
            Self::HybridX25519Kyber768 => 1216,
        }
    }

    /// Length in bytes of an encoded private key (Nsk).
    pub const fn private_key_size(self) -> usize {
        match self {
            Self::DhkemP256HkdfSha256 => 32,
            Self::DhkemP384HkdfSha384 => 48,
            Self::DhkemP521HkdfSha512 => 66,
            Self::DhkemX25519HkdfSha256 => 32,
            Self::HybridX25519Kyber768 => 2432,
        }
    }

    /// The KDF bound to this KEM for its internal labeled derivations.
    pub(crate) const fn kdf(self) -> KdfId {
        match self {
            Self::DhkemP256HkdfSha256 => KdfId::HkdfSha256,
            Self::DhkemP384HkdfSha384 => KdfId::HkdfSha384,
            Self::DhkemP521HkdfSha512 => KdfId::HkdfSha512,
            Self::DhkemX25519HkdfSha256 => KdfId::HkdfSha256,
            Self::HybridX25519Kyber768 => KdfId::HkdfSha256,
        }
    }

    /// The 5-byte `"KEM" ‖ I2OSP(kem_id, 2)` suite id used by labeled
    /// derivations inside the KEM itself.
    pub(crate) fn kem_suite_id(self) -> [u8; 5] {
        let mut suite_id = [0u8; 5];
        suite_id[..3].copy_from_slice(b"KEM");
        suite_id[3..].copy_from_slice(&(self as u16).to_be_bytes());
        suite_id
    }
}

impl TryFrom<u16> for KemId {
    type Error = ConfigError;

    fn try_from(value: u16) -> std::result::Result<Self, ConfigError> {
        match value {
            0x0010 => Ok(Self::DhkemP256HkdfSha256),
            0x0011 => Ok(Self::DhkemP384HkdfSha384),
            0x0012 => Ok(Self::DhkemP521HkdfSha512),
            0x0020 => Ok(Self::DhkemX25519HkdfSha256),
            0x0030 => Ok(Self::HybridX25519Kyber768),
            other => Err(ConfigError::UnknownKemId(other)),
        }
    }
}

/// Supported key derivation functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum KdfId {
    HkdfSha256 = 0x0001,
    HkdfSha384 = 0x0002,
    HkdfSha512 = 0x0003,
}

impl KdfId {
    /// Length in bytes of the underlying hash output (Nh).
    pub const fn hash_size(self) -> usize {
        match self {
            Self::HkdfSha256 => 32,
            Self::HkdfSha384 => 48,
            Self::HkdfSha512 => 64,
        }
    }
}

impl TryFrom<u16> for KdfId {
    type Error = ConfigError;

    fn try_from(value: u16) -> std::result::Result<Self, ConfigError> {
        match value {
            0x0001 => Ok(Self::HkdfSha256),
            0x0002 => Ok(Self::HkdfSha384),
            0x0003 => Ok(Self::HkdfSha512),
            other => Err(ConfigError::UnknownKdfId(other)),
        }
    }
}

/// Supported AEAD algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum AeadId {
    Aes128Gcm = 0x0001,
    Aes256Gcm = 0x0002,
    ChaCha20Poly1305 = 0x0003,
    /// Export-only: the suite derives an exporter secret but no AEAD key.
    ExportOnly = 0xFFFF,
}

impl AeadId {
    /// AEAD key length in bytes (Nk).
    pub const fn key_size(self) -> usize {
        match self {
            Self::Aes128Gcm => 16,
            Self::Aes256Gcm => 32,
            Self::ChaCha20Poly1305 => 32,
            Self::ExportOnly => 0,
        }
    }

    /// AEAD nonce length in bytes (Nn).
    pub const fn nonce_size(self) -> usize {
        match self {
            Self::Aes128Gcm | Self::Aes256Gcm | Self::ChaCha20Poly1305 => 12,
            Self::ExportOnly => 0,
        }
    }

    /// AEAD tag length in bytes (Nt).
    pub const fn tag_size(self) -> usize {
        match self {
            Self::Aes128Gcm | Self::Aes256Gcm | Self::ChaCha20Poly1305 => 16,
            Self::ExportOnly => 0,
        }
    }
}

impl TryFrom<u16> for AeadId {
    type Error = ConfigError;

    fn try_from(value: u16) -> std::result::Result<Self, ConfigError> {
        match value {
            0x0001 => Ok(Self::Aes128Gcm),
            0x0002 => Ok(Self::Aes256Gcm),
            0x0003 => Ok(Self::ChaCha20Poly1305),
            0xFFFF => Ok(Self::ExportOnly),
            other => Err(ConfigError::UnknownAeadId(other)),
        }
    }
}

/// Parameters for establishing a sender context.
pub struct SenderParams<'a> {
    /// The recipient's public key to encapsulate against.
    pub recipient_public_key: &'a KemPublicKey,
    /// Optional application-supplied info bound into the key schedule.
    pub info: Option<&'a [u8]>,
    /// Optional pre-shared key (Psk / AuthPsk modes).
    pub psk: Option<&'a Psk>,
    /// Optional sender key pair for sender authentication (Auth / AuthPsk
    /// modes, DH KEMs only).
    pub sender_key_pair: Option<&'a KemKeyPair>,
    /// Optional non-ephemeral key pair, for reproducible test-vector
    /// encapsulation. Not for general use.
    pub ephemeral_key_pair: Option<&'a KemKeyPair>,
}

impl<'a> SenderParams<'a> {
    pub fn new(recipient_public_key: &'a KemPublicKey) -> Self {
        Self {
            recipient_public_key,
            info: None,
            psk: None,
            sender_key_pair: None,
            ephemeral_key_pair: None,
        }
    }
}

/// Parameters for establishing a recipient context.
pub struct RecipientParams<'a> {
    /// The encapsulated value received from the sender.
    pub enc: &'a [u8],
    /// The recipient's key pair.
    pub recipient_key_pair: &'a KemKeyPair,
    /// Optional application-supplied info; must match the sender's.
    pub info: Option<&'a [u8]>,
    /// Optional pre-shared key; must match the sender's.
    pub psk: Option<&'a Psk>,
    /// The sender's public key when sender authentication is in use.
    pub sender_public_key: Option<&'a KemPublicKey>,
}

impl<'a> RecipientParams<'a> {
    pub fn new(enc: &'a [u8], recipient_key_pair: &'a KemKeyPair) -> Self {
        Self {
            enc,
            recipient_key_pair,
            info: None,
            psk: None,
            sender_public_key: None,
        }
    }
}

/// A cipher suite: one KEM, one KDF, and one AEAD selection.
///
/// The 10-byte suite identifier is computed once at construction and bound
/// into every labeled KDF call for the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CipherSuite {
    kem: KemId,
    kdf: KdfId,
    aead: AeadId,
    suite_id: [u8; 10],
}

impl CipherSuite {
    pub fn new(kem: KemId, kdf: KdfId, aead: AeadId) -> Self {
        let mut suite_id = [0u8; 10];
        suite_id[..4].copy_from_slice(b"HPKE");
        suite_id[4..6].copy_from_slice(&(kem as u16).to_be_bytes());
        suite_id[6..8].copy_from_slice(&(kdf as u16).to_be_bytes());
        suite_id[8..].copy_from_slice(&(aead as u16).to_be_bytes());
        Self {
            kem,
            kdf,
            aead,
            suite_id,
        }
    }

    /// Construct a suite from raw registry identifiers, rejecting unknown
    /// values.
    pub fn from_ids(kem: u16, kdf: u16, aead: u16) -> Result<Self> {
        Ok(Self::new(
            KemId::try_from(kem)?,
            KdfId::try_from(kdf)?,
            AeadId::try_from(aead)?,
        ))
    }

    pub fn kem(&self) -> KemId {
        self.kem
    }

    pub fn kdf(&self) -> KdfId {
        self.kdf
    }

    pub fn aead(&self) -> AeadId {
        self.aead
    }

    /// The 10-byte `"HPKE" ‖ kem ‖ kdf ‖ aead` identifier.
    pub fn suite_id(&self) -> &[u8; 10] {
        &self.suite_id
    }

    fn key_schedule(&self) -> KeySchedule {
        KeySchedule::new(
            LabeledKdf::new(self.kdf, self.suite_id.to_vec()),
            self.aead,
        )
    }

    /// Establish a sender context: encapsulate against the recipient public
    /// key and run the key schedule over the resulting shared secret.
    pub async fn create_sender_context(&self, params: SenderParams<'_>) -> Result<SenderContext> {
        let encapsulation = match params.sender_key_pair {
            None => {
                self.kem
                    .encap(params.recipient_public_key, params.ephemeral_key_pair)
                    .await?
            }
            Some(sender) => {
                self.kem
                    .auth_encap(params.recipient_public_key, sender, params.ephemeral_key_pair)
                    .await?
            }
        };

        let mode = operating_mode(params.psk.is_some(), params.sender_key_pair.is_some());
        let schedule_params = KeyScheduleParams {
            psk: params.psk,
            info: params.info,
        };
        let aead_params = self
            .key_schedule()
            .derive(mode, &encapsulation.shared_secret, &schedule_params)
            .await?;

        tracing::debug!(kem = ?self.kem, kdf = ?self.kdf, aead = ?self.aead, ?mode,
            "sender context established");

        let context = EncryptionContext::new(
            LabeledKdf::new(self.kdf, self.suite_id.to_vec()),
            aead_params,
        );
        Ok(SenderContext::new(encapsulation.enc, context))
    }

    /// Establish a recipient context: decapsulate `enc` with the recipient
    /// key pair and run the key schedule over the recovered shared secret.
    pub async fn create_recipient_context(
        &self,
        params: RecipientParams<'_>,
    ) -> Result<EncryptionContext> {
        let shared_secret: Zeroizing<Vec<u8>> = match params.sender_public_key {
            None => {
                self.kem
                    .decap(params.enc, &params.recipient_key_pair.private_key)
                    .await?
            }
            Some(sender) => {
                self.kem
                    .auth_decap(params.enc, &params.recipient_key_pair.private_key, sender)
                    .await?
            }
        };

        let mode = operating_mode(params.psk.is_some(), params.sender_public_key.is_some());
        let schedule_params = KeyScheduleParams {
            psk: params.psk,
            info: params.info,
        };
        let aead_params = self
            .key_schedule()
            .derive(mode, &shared_secret, &schedule_params)
            .await?;

        tracing::debug!(kem = ?self.kem, kdf = ?self.kdf, aead = ?self.aead, ?mode,
            "recipient context established");

        Ok(EncryptionContext::new(
            LabeledKdf::new(self.kdf, self.suite_id.to_vec()),
            aead_params,
        ))
    }

    /// Single-shot encryption: establish a fresh sender context and seal one
    /// message. Returns `(enc, ciphertext)`.
    pub async fn seal(
        &self,
        recipient_public_key: &KemPublicKey,
        info: Option<&[u8]>,
        plaintext: &[u8],
        aad: &[u8],
    ) -> Result<(Vec<u8>, Vec<u8>)> {
        let mut params = SenderParams::new(recipient_public_key);
        params.info = info;
        let mut sender = self.create_sender_context(params).await?;
        let ciphertext = sender.seal(plaintext, aad).await?;
        Ok((sender.enc().to_vec(), ciphertext))
    }

    /// Single-shot decryption counterpart of [`CipherSuite::seal`].
    pub async fn open(
        &self,
        enc: &[u8],
        recipient_key_pair: &KemKeyPair,
        info: Option<&[u8]>,
        ciphertext: &[u8],
        aad: &[u8],
    ) -> Result<Vec<u8>> {
        let mut params = RecipientParams::new(enc, recipient_key_pair);
        params.info = info;
        let mut recipient = self.create_recipient_context(params).await?;
        recipient.open(ciphertext, aad).await
    }
}

/// The HPKE mode is not caller-selectable: it follows from which optional
/// inputs are present.
fn operating_mode(has_psk: bool, has_sender_key: bool) -> Mode {
    match (has_psk, has_sender_key) {
        (false, false) => Mode::Base,
        (true, false) => Mode::Psk,
        (false, true) => Mode::Auth,
        (true, true) => Mode::AuthPsk,
    }
}
