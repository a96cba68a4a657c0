#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! Sertica PEM/anahtar codec katmanı.
//!
//! Sertifika otoritesinden inen PKCS#12 arşivindeki malzemeyi dışarıya taşınabilir
//! PEM bloklarına çevirir: PKCS#8 → PKCS#1 yapısal dönüşümü, parola korumalı
//! PKCS#8 (PBES2) şifrelemesi ve sertifika zinciri serileştirmesi. Ağ veya TLS
//! bilgisi içermez; yalnızca ikili/metin dönüşümüdür.

mod codec;
mod label;
mod password;

use thiserror::Error;

pub use codec::{encode_pem, encrypt_pkcs8, pkcs8_to_pkcs1, write_certificate, write_certificates};
pub use label::PemLabel;
pub use password::OneTimePassword;

/// Codec katmanında oluşabilecek hatalar.
#[derive(Debug, Error)]
pub enum PemCodecError {
    /// Girdi geçerli bir PKCS#8 `PrivateKeyInfo` yapısı değil.
    #[error("PKCS#8 yapısı ayrıştırılamadı: {0}")]
    InvalidPkcs8(String),
    /// Anahtar RSA değil; PKCS#1 dönüşümü yalnızca RSA anahtarları için tanımlı.
    #[error("beklenmeyen anahtar algoritması: {0}")]
    UnsupportedAlgorithm(String),
    /// PBES2 şifrelemesi başarısız oldu.
    #[error("PKCS#8 şifreleme başarısız: {0}")]
    Encryption(String),
}
