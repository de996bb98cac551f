pub mod aead;
pub mod context;
pub mod error;
pub mod kdf;
pub mod kem;
pub mod schedule;
pub mod suite;

// Re-export key types at crate root for convenience.
pub use context::{EncryptionContext, SenderContext};
pub use error::{ConfigError, CryptoError, Error, Result, SerializationError};
pub use kdf::LabeledKdf;
pub use kem::{Encapsulation, KemKeyPair, KemPrivateKey, KemPublicKey};
pub use schedule::{KeyScheduleParams, Mode, Psk};
pub use suite::{AeadId, CipherSuite, KdfId, KemId, RecipientParams, SenderParams};
