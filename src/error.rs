/// Errors raised when a cipher suite or key schedule is misconfigured.
///
/// These are fatal: they are reported at construction or schedule time and
/// are never retried.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown KEM identifier: 0x{0:04X}")]
    UnknownKemId(u16),

    #[error("unknown KDF identifier: 0x{0:04X}")]
    UnknownKdfId(u16),

    #[error("unknown AEAD identifier: 0x{0:04X}")]
    UnknownAeadId(u16),

    #[error("inconsistent PSK inputs: key and id must be supplied together")]
    InconsistentPsk,

    #[error("PSK input provided when the mode does not accept one")]
    UnexpectedPsk,

    #[error("missing required PSK input for this mode")]
    MissingPsk,

    #[error("sender authentication is not supported by this KEM")]
    SenderAuthUnsupported,

    #[error("this KEM does not accept a caller-supplied ephemeral key pair")]
    EphemeralKeyPairUnsupported,

    #[error("seal/open is not available for an export-only suite")]
    ExportOnlySuite,
}

/// Errors from cryptographic operations.
#[derive(Debug, thiserror::Error)]
pub enum CryptoError {
    /// AEAD tag verification failed. Deliberately carries no detail: the
    /// caller must not be able to distinguish a corrupted ciphertext from a
    /// wrong key.
    #[error("AEAD open failed: ciphertext could not be authenticated")]
    AuthenticationFailure,

    #[error("AEAD encryption failed")]
    SealFailed,

    #[error("message limit reached: sequence counter exhausted")]
    MessageLimitReached,

    #[error("HKDF expand failed: invalid length")]
    HkdfExpandFailed,

    #[error("non-contributory key exchange: peer sent small-subgroup or identity point")]
    NonContributoryKey,

    #[error("key pair derivation failed: no valid candidate scalar found")]
    DeriveKeyPairFailed,

    #[error("lattice KEM provider error: {0}")]
    LatticeKem(String),
}

/// Errors from serializing or deserializing keys and encapsulated values.
///
/// Reported immediately; no partial state is retained.
#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("invalid public key length: expected {expected}, got {actual}")]
    InvalidPublicKeyLength { expected: usize, actual: usize },

    #[error("invalid private key length: expected {expected}, got {actual}")]
    InvalidPrivateKeyLength { expected: usize, actual: usize },

    #[error("invalid encapsulated value length: expected {expected}, got {actual}")]
    InvalidEncapsulationLength { expected: usize, actual: usize },

    #[error("invalid seed length: expected {expected}, got {actual}")]
    InvalidSeedLength { expected: usize, actual: usize },

    #[error("malformed public key")]
    MalformedPublicKey,

    #[error("malformed private key")]
    MalformedPrivateKey,

    #[error("key belongs to a different KEM than the one in use")]
    KemMismatch,
}

/// Top-level error type for the crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),

    #[error(transparent)]
    Serialization(#[from] SerializationError),
}

pub type Result<T> = std::result::Result<T, Error>;
