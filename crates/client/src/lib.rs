#![forbid(unsafe_code)]
#![deny(warnings)]
#![deny(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

//! Sertifika web servisi (CWS) istemcisi.
//!
//! Uzak sertifika yönetim otoritesiyle karşılıklı TLS üzerinden konuşur;
//! sertifika oluşturma, yenileme, iptal, indirme ve sorgulama operasyonlarını
//! sürer. İndirme yanıtı olarak dönen parola korumalı PKCS#12 arşivini PEM
//! kodlu bir pakete (özel anahtar, uç sertifika, CA zinciri) dönüştürür.
//!
//! HTTP taşıması dış bir iş birlikçidir: [`Transport`] arayüzünü sağlayan her
//! katman kullanılabilir, istemci yalnızca "operasyon çağır → kendini anlatan
//! yanıt" sözleşmesini tüketir.

mod bundle;
mod client;
mod config;
mod error;
#[cfg(test)]
mod fixtures;
mod model;
mod poll;
mod tls;
mod transport;

pub use bundle::materialize_bundle;
pub use client::CertClient;
pub use config::{ClientConfig, ClientConfigBuilder, KeystoreLocator};
pub use error::ClientError;
pub use model::{
    CertBundle, CertFormat, CreateReq, CreateRes, CwsRequest, CwsResponse, DownloadReq,
    DownloadRes, ExistsRes, ExpirationRes, ExpiringReq, ExpiringRes, ResponseStatus,
    RevokeReason, RevokeReq, RevokeRes, SelfDescribing, SerialNumberRes, ViewRes,
};
pub use poll::{Poller, DOWNLOAD_MAX_ATTEMPTS, DOWNLOAD_RETRY_INTERVAL};
pub use tls::{AliasClientCertResolver, TlsIdentity};
pub use transport::{Transport, TransportError};
