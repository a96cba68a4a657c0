use std::error::Error as StdError;

use thiserror::Error;

use crate::transport::TransportError;

/// İstemcinin dışarıya yansıttığı hata sınıflandırması.
///
/// Hiçbir hata yutulmaz; yalnızca "işleniyor, henüz hazır değil" yanıtı
/// polling sınırına kadar içeride tekrar denenir.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Anahtar deposu bulunamadı, açılamadı veya istenen takma ad yok.
    /// Açılışta yükselir, hiçbir zaman tekrar denenmez.
    #[error("yapılandırma hatası: {0}")]
    Configuration(String),
    /// Çağrı sahibinin verdiği parametre geçersiz; her türlü G/Ç'den önce
    /// yükselir.
    #[error("geçersiz parametre: {0}")]
    CallerInput(String),
    /// Uzak otorite kalıcı bir hata bildirdi; mesaj otoriteden geldiği gibi
    /// taşınır.
    #[error("sertifika servisi hatası: {0}")]
    RemoteOperation(String),
    /// Taşıma katmanı hatası; değiştirilmeden yüzeye çıkar.
    #[error("iletişim hatası: {0}")]
    Transport(#[from] TransportError),
    /// Arşiv çözme, anahtar dönüşümü veya PEM kodlama hatası; altta yatan
    /// neden tanı için korunur.
    #[error("sertifika paketi üretilemedi: {0}")]
    Bundle(Box<dyn StdError + Send + Sync>),
}

impl ClientError {
    pub(crate) fn bundle(err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Bundle(Box::new(err))
    }

    pub(crate) fn bundle_msg(msg: impl Into<String>) -> Self {
        #[derive(Debug, Error)]
        #[error("{0}")]
        struct Message(String);
        Self::Bundle(Box::new(Message(msg.into())))
    }
}
