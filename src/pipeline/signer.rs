//! Signing capability boundary.
//!
//! The pipeline never holds keys. Wallet integrations, hardware devices and
//! headless test signers all plug in through [`TransactionSigner`].

use async_trait::async_trait;
use thiserror::Error;

use crate::pipeline::envelope::Envelope;

/// Why a signer declined to produce a signature.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignerError {
    #[error("User rejected the signature request")]
    UserRejected,

    #[error("Wallet is locked")]
    WalletLocked,

    /// Any other backend failure, message as reported by the backend.
    #[error("Signer error: {0}")]
    Backend(String),
}

/// Turns an unsigned envelope into a signed one.
///
/// Implementations may wait on a human for an unbounded time; the pipeline
/// applies no timeout here and leaves cancellation to the caller.
#[async_trait]
pub trait TransactionSigner: Send + Sync {
    async fn sign(&self, unsigned: &Envelope) -> Result<Envelope, SignerError>;
}

#[async_trait]
impl<S: TransactionSigner + ?Sized> TransactionSigner for std::sync::Arc<S> {
    async fn sign(&self, unsigned: &Envelope) -> Result<Envelope, SignerError> {
        (**self).sign(unsigned).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    struct Refusing;

    #[async_trait]
    impl TransactionSigner for Refusing {
        async fn sign(&self, _unsigned: &Envelope) -> Result<Envelope, SignerError> {
            Err(SignerError::UserRejected)
        }
    }

    #[tokio::test]
    async fn test_arc_signer_delegates() {
        let signer: Arc<dyn TransactionSigner> = Arc::new(Refusing);
        let err = signer.sign(&Envelope::from_opaque("AAAA")).await.unwrap_err();
        assert_eq!(err, SignerError::UserRejected);
    }
}
