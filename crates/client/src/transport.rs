use thiserror::Error;

/// Taşıma katmanı hataları; istemci bunları ayırt etmeden yüzeye taşır.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Bağlantı veya soket hatası.
    #[error("bağlantı hatası: {0}")]
    Io(#[from] std::io::Error),
    /// HTTP katmanından dönen hata.
    #[error("HTTP taşıma hatası: {0}")]
    Http(String),
    /// Yanıt gövdesi okunamadı veya ayrıştırılamadı.
    #[error("yanıt gövdesi çözümlenemedi: {0}")]
    Body(String),
}

/// Kimliği doğrulanmış kanal üzerinden tek bir operasyon çağrısı.
///
/// Uygulamalar HTTP mekaniğini sahiplenir: verilen operasyon yoluna JSON
/// gövdesiyle tek bir POST atar ve ham JSON yanıtını döndürür. Kanalın TLS
/// bağlamı [`crate::TlsIdentity`] üzerinden kurulur. Uygulamalar kendi
/// başına tekrar denemez ve protokoller arası yönlendirme izlemez; tekrar
/// deneme kararı yalnızca polling denetleyicisine aittir.
pub trait Transport: Send + Sync {
    /// Operasyonu çağırır ve ham JSON yanıt gövdesini döndürür.
    ///
    /// # Errors
    ///
    /// Ağ veya gövde hatasında [`TransportError`] döner.
    fn call(&self, operation: &str, body: &str) -> Result<String, TransportError>;
}
