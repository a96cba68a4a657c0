use std::fmt;

/// PEM block labels produced by this crate.
///
/// The label choice carries meaning for downstream tooling: an unencrypted RSA
/// key travels as the bare PKCS#1 structure under `RSA PRIVATE KEY`, while a
/// password-protected key is a PKCS#8 `EncryptedPrivateKeyInfo` under
/// `ENCRYPTED PRIVATE KEY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PemLabel {
    /// Bare PKCS#1 RSA key structure.
    RsaPrivateKey,
    /// PKCS#8 `EncryptedPrivateKeyInfo`.
    EncryptedPrivateKey,
    /// X.509 certificate.
    Certificate,
}

impl PemLabel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RsaPrivateKey => "RSA PRIVATE KEY",
            Self::EncryptedPrivateKey => "ENCRYPTED PRIVATE KEY",
            Self::Certificate => "CERTIFICATE",
        }
    }
}

impl fmt::Display for PemLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
