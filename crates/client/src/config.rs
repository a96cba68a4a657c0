use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use url::Url;
use zeroize::Zeroizing;

use crate::error::ClientError;

/// Gömülü anahtar deposu içeriğini işaretleyen önek.
const INLINE_PREFIX: &str = "inline-base64:";

/// Kimlik doğrulama anahtar deposunun nereden okunacağını söyler.
///
/// Ya dosya sisteminden ya da çağrı tarafında gömülü baytlardan
/// (`include_bytes!` malzemesi) gelir. Metin halinde `inline-base64:` öneki
/// gömülü stratejiyi seçer; önek yoksa değer dosya yolu kabul edilir.
#[derive(Clone, PartialEq, Eq)]
pub enum KeystoreLocator {
    /// PKCS#12 dosya yolu.
    File(PathBuf),
    /// Gömülü PKCS#12 içeriği.
    Inline(Vec<u8>),
}

impl KeystoreLocator {
    /// Depo baytlarını okur.
    ///
    /// # Errors
    ///
    /// Dosya bulunamaz veya okunamazsa [`ClientError::Configuration`] döner;
    /// bu hata hiçbir zaman tekrar denenmez.
    pub fn read(&self) -> Result<Vec<u8>, ClientError> {
        match self {
            Self::File(path) => fs::read(path).map_err(|err| {
                ClientError::Configuration(format!(
                    "anahtar deposu okunamadı: {}: {err}",
                    path.display()
                ))
            }),
            Self::Inline(bytes) => Ok(bytes.clone()),
        }
    }
}

impl FromStr for KeystoreLocator {
    type Err = ClientError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value.strip_prefix(INLINE_PREFIX).map_or_else(
            || Ok(Self::File(PathBuf::from(value))),
            |encoded| {
                STANDARD.decode(encoded.trim()).map(Self::Inline).map_err(|err| {
                    ClientError::Configuration(format!(
                        "gömülü anahtar deposu çözülemedi: {err}"
                    ))
                })
            },
        )
    }
}

impl fmt::Debug for KeystoreLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
            Self::Inline(bytes) => f
                .debug_tuple("Inline")
                .field(&format_args!("{} bayt", bytes.len()))
                .finish(),
        }
    }
}

/// İstemci yapılandırma yüzeyi.
///
/// Kurulumda bir kez verilir, sonrasında değişmez. Parola alanı `Debug`
/// çıktısında gizlenir ve bellekte sıfırlanarak bırakılır.
#[derive(Clone)]
pub struct ClientConfig {
    endpoint: Url,
    app_id: String,
    team_dl: String,
    domain: Option<String>,
    keystore: KeystoreLocator,
    keystore_password: Zeroizing<String>,
    key_alias: Option<String>,
    debug: bool,
    timeout_secs: u64,
}

impl ClientConfig {
    #[must_use]
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    #[must_use]
    pub const fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Sertifika sahipliğini taşıyan temel takım DL'i
    /// (`Org\Takım\Proje\...` biçiminde hiyerarşik).
    #[must_use]
    pub fn team_dl(&self) -> &str {
        &self.team_dl
    }

    #[must_use]
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    #[must_use]
    pub const fn keystore(&self) -> &KeystoreLocator {
        &self.keystore
    }

    pub(crate) fn keystore_password(&self) -> &str {
        &self.keystore_password
    }

    #[must_use]
    pub fn key_alias(&self) -> Option<&str> {
        self.key_alias.as_deref()
    }

    #[must_use]
    pub const fn debug(&self) -> bool {
        self.debug
    }

    #[must_use]
    pub const fn timeout_secs(&self) -> u64 {
        self.timeout_secs
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint.as_str())
            .field("app_id", &self.app_id)
            .field("team_dl", &self.team_dl)
            .field("domain", &self.domain)
            .field("keystore", &self.keystore)
            .field("keystore_password", &"<gizli>")
            .field("key_alias", &self.key_alias)
            .field("debug", &self.debug)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// [`ClientConfig`] kurucusu.
#[derive(Debug, Default)]
pub struct ClientConfigBuilder {
    endpoint: Option<String>,
    app_id: Option<String>,
    team_dl: Option<String>,
    domain: Option<String>,
    keystore: Option<KeystoreLocator>,
    keystore_password: Option<Zeroizing<String>>,
    key_alias: Option<String>,
    debug: bool,
    timeout_secs: Option<u64>,
}

impl ClientConfigBuilder {
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    #[must_use]
    pub fn app_id(mut self, app_id: impl Into<String>) -> Self {
        self.app_id = Some(app_id.into());
        self
    }

    #[must_use]
    pub fn team_dl(mut self, team_dl: impl Into<String>) -> Self {
        self.team_dl = Some(team_dl.into());
        self
    }

    #[must_use]
    pub fn domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    #[must_use]
    pub fn keystore(mut self, keystore: KeystoreLocator) -> Self {
        self.keystore = Some(keystore);
        self
    }

    #[must_use]
    pub fn keystore_password(mut self, password: impl Into<String>) -> Self {
        self.keystore_password = Some(Zeroizing::new(password.into()));
        self
    }

    #[must_use]
    pub fn key_alias(mut self, alias: impl Into<String>) -> Self {
        self.key_alias = Some(alias.into());
        self
    }

    #[must_use]
    pub const fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    #[must_use]
    pub const fn timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = Some(timeout_secs);
        self
    }

    /// Yapılandırmayı doğrular ve dondurur.
    ///
    /// # Errors
    ///
    /// Zorunlu bir alan eksikse veya uç nokta URL olarak ayrıştırılamazsa
    /// [`ClientError::Configuration`] döner.
    pub fn build(self) -> Result<ClientConfig, ClientError> {
        let endpoint_raw = self
            .endpoint
            .ok_or_else(|| ClientError::Configuration("uç nokta zorunlu".to_owned()))?;
        let endpoint = Url::parse(&endpoint_raw).map_err(|err| {
            ClientError::Configuration(format!("uç nokta geçersiz: {endpoint_raw}: {err}"))
        })?;
        let app_id = require_non_empty(self.app_id, "appId")?;
        let team_dl = require_non_empty(self.team_dl, "teamDL")?;
        let keystore = self
            .keystore
            .ok_or_else(|| ClientError::Configuration("anahtar deposu zorunlu".to_owned()))?;
        let keystore_password = self.keystore_password.ok_or_else(|| {
            ClientError::Configuration("anahtar deposu parolası zorunlu".to_owned())
        })?;

        Ok(ClientConfig {
            endpoint,
            app_id,
            team_dl,
            domain: self.domain,
            keystore,
            keystore_password,
            key_alias: self.key_alias,
            debug: self.debug,
            timeout_secs: self.timeout_secs.unwrap_or(10),
        })
    }
}

fn require_non_empty(value: Option<String>, field: &str) -> Result<String, ClientError> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ClientError::Configuration(format!("{field} zorunlu"))),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn minimal_builder() -> ClientConfigBuilder {
        ClientConfig::builder()
            .endpoint("https://cws.example.com/api/")
            .app_id("envanter")
            .team_dl("Org\\Takim")
            .keystore(KeystoreLocator::Inline(vec![1, 2, 3]))
            .keystore_password("changeit")
    }

    #[test]
    fn builder_applies_defaults() {
        let config = minimal_builder().build().unwrap();
        assert!(!config.debug());
        assert_eq!(config.timeout_secs(), 10);
        assert_eq!(config.key_alias(), None);
        assert_eq!(config.domain(), None);
    }

    #[test]
    fn missing_endpoint_is_configuration_error() {
        let result = ClientConfig::builder().app_id("x").build();
        match result {
            Err(ClientError::Configuration(msg)) => assert!(msg.contains("uç nokta")),
            other => panic!("beklenmeyen sonuç: {other:?}"),
        }
    }

    #[test]
    fn invalid_endpoint_is_configuration_error() {
        let result = minimal_builder().endpoint("no-es-url").build();
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[test]
    fn locator_prefix_selects_inline_strategy() {
        let locator: KeystoreLocator = "inline-base64:AQID".parse().unwrap();
        assert_eq!(locator, KeystoreLocator::Inline(vec![1, 2, 3]));
        assert_eq!(locator.read().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn locator_without_prefix_is_a_path() {
        let locator: KeystoreLocator = "/etc/sertica/client.p12".parse().unwrap();
        assert_eq!(
            locator,
            KeystoreLocator::File(PathBuf::from("/etc/sertica/client.p12"))
        );
    }

    #[test]
    fn invalid_inline_payload_is_configuration_error() {
        let result: Result<KeystoreLocator, _> = "inline-base64:%%%".parse();
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[test]
    fn missing_file_read_is_configuration_error() {
        let locator = KeystoreLocator::File(PathBuf::from("/yok/boyle/bir/dosya.p12"));
        match locator.read() {
            Err(ClientError::Configuration(msg)) => assert!(msg.contains("okunamadı")),
            other => panic!("beklenmeyen sonuç: {other:?}"),
        }
    }

    #[test]
    fn debug_output_redacts_password() {
        let config = minimal_builder().build().unwrap();
        let rendered = format!("{config:?}");
        assert!(rendered.contains("<gizli>"));
        assert!(!rendered.contains("changeit"));
    }
}
