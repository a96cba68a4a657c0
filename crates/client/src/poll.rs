//! Asenkron tamamlanan uzak operasyonlar için sınırlı polling denetleyicisi.
//!
//! Otoritenin sertifika üretimi sunucu tarafında asenkrondur: indirme
//! yanıtı meşru olarak "kabul edildi ama hazır değil" diyebilir. Denetleyici
//! bu durumu kalıcı hatadan ayırır ve sabit aralıkla, sınırlı sayıda tekrar
//! dener. Üstel geri çekilme ve jitter bilinçli olarak yoktur; uzak işlemin
//! gecikmesi yaklaşık sabittir.

use std::time::Duration;

use tracing::info;

use crate::error::ClientError;
use crate::model::SelfDescribing;

/// İndirme operasyonu için varsayılan deneme üst sınırı.
pub const DOWNLOAD_MAX_ATTEMPTS: usize = 12;

/// Denemeler arasındaki sabit bekleme.
pub const DOWNLOAD_RETRY_INTERVAL: Duration = Duration::from_secs(10);

/// Sınırlı, sabit aralıklı tekrar deneme durum makinesi.
///
/// Üç durum vardır: bekliyor, başarılı, kalıcı hata. Yanıtın hata kodu
/// `[200, 300)` aralığındaysa "işleniyor" sayılır ve bütçe elverdiğince
/// tekrar denenir; aralık dışındaki her kod beklemeden kalıcı hataya geçer.
#[derive(Debug, Clone, Copy)]
pub struct Poller {
    max_attempts: usize,
    interval: Duration,
}

impl Poller {
    #[must_use]
    pub const fn new(max_attempts: usize, interval: Duration) -> Self {
        Self {
            max_attempts,
            interval,
        }
    }

    /// Sertifika indirme için varsayılan bütçe: 12 deneme, 10 saniye aralık
    /// (en kötü ~2 dakika).
    #[must_use]
    pub const fn download_default() -> Self {
        Self::new(DOWNLOAD_MAX_ATTEMPTS, DOWNLOAD_RETRY_INTERVAL)
    }

    #[must_use]
    pub const fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Operasyonu başarıya veya kalıcı hataya kadar sürer.
    ///
    /// `sleep` dışarıdan verilir; üretimde `std::thread::sleep`, testlerde
    /// sayaç. Bekleme kesintisi iptal değildir: denetleyicinin dış iptal
    /// girdisi yoktur, iptal isteyen çağrı sahibi tüm çağrıyı dışarıdan
    /// yarıştırır.
    ///
    /// # Errors
    ///
    /// Operasyonun kendi hatası olduğu gibi yükselir. Yanıt kalıcı hata
    /// bildirirse veya deneme bütçesi biterse son yanıtın hata mesajıyla
    /// [`ClientError::RemoteOperation`] döner.
    pub fn run<T, Op, Sleep>(&self, mut op: Op, mut sleep: Sleep) -> Result<T, ClientError>
    where
        T: SelfDescribing,
        Op: FnMut() -> Result<T, ClientError>,
        Sleep: FnMut(Duration),
    {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let response = op()?;
            if response.success() {
                return Ok(response);
            }

            let detail = response.error_message().to_owned();
            if !is_processing(response.error_code()) || attempt >= self.max_attempts {
                return Err(ClientError::RemoteOperation(detail));
            }

            info!(
                attempt,
                max_attempts = self.max_attempts,
                detail = %detail,
                "sertifika henüz hazır değil, tekrar denenecek"
            );
            sleep(self.interval);
        }
    }
}

/// `[200, 300)` aralığındaki kodlar "kabul edildi, işleniyor" demektir.
/// Aralık sınırı otoritenin sözleşmesi gereği olduğu gibi korunur.
const fn is_processing(code: Option<i64>) -> bool {
    matches!(code, Some(code) if code >= 200 && code < 300)
}
