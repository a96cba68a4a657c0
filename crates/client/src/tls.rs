//! Karşılıklı TLS kimliğinin PKCS#12 deposundan kurulması.
//!
//! Depo hem istemci kimliğini (özel anahtar + zincir) hem de güven çapasını
//! taşır: depodaki her sertifika kök deposuna eklenir, böylece otoritenin
//! kendinden imzalı sunucu sertifikası ayrıca dağıtılmaz. Birden fazla
//! anahtar girdisi olan depolarda sunulacak kimlik takma adla daraltılır.

use std::fmt;
use std::sync::Arc;

use p12_keystore::{KeyStore, KeyStoreEntry, Pkcs12ImportPolicy, PrivateKeyChain};
use rustls::client::ResolvesClientCert;
use rustls::crypto::ring;
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::sign::CertifiedKey;
use rustls::{RootCertStore, SignatureScheme};
use tracing::{debug, info, warn};

use crate::config::KeystoreLocator;
use crate::error::ClientError;

/// Kurulmuş TLS kimliği: rustls istemci yapılandırması ve kimlik seçici.
pub struct TlsIdentity {
    client_config: Arc<rustls::ClientConfig>,
    resolver: Arc<AliasClientCertResolver>,
}

impl TlsIdentity {
    /// Depoyu okur, açar ve TLS 1.2'ye sabitlenmiş istemci yapılandırmasını
    /// kurar. `alias` verilmişse sunulacak kimlik o girdiyle sınırlanır.
    ///
    /// # Errors
    ///
    /// Depo okunamaz, parola yanlışsa, depoda özel anahtar yoksa veya
    /// istenen takma ad bulunamazsa [`ClientError::Configuration`] döner.
    /// Bu hataların hiçbiri tekrar denemeye değmez.
    pub fn bootstrap(
        locator: &KeystoreLocator,
        password: &str,
        alias: Option<&str>,
    ) -> Result<Self, ClientError> {
        let bytes = locator.read()?;
        let store = KeyStore::from_pkcs12(&bytes, password, Pkcs12ImportPolicy::default())
            .map_err(|err| {
            ClientError::Configuration(format!("anahtar deposu açılamadı: {err}"))
        })?;

        let mut roots = RootCertStore::empty();
        let mut identities: Vec<(String, Arc<CertifiedKey>)> = Vec::new();
        for (entry_alias, entry) in store.entries() {
            if let KeyStoreEntry::PrivateKeyChain(chain) = entry {
                for cert in chain.certs() {
                    add_trust_anchor(&mut roots, entry_alias, cert.as_der());
                }
                let certified = certified_key(entry_alias, chain)?;
                identities.push((entry_alias.to_owned(), Arc::new(certified)));
            } else if let KeyStoreEntry::Certificate(cert) = entry {
                add_trust_anchor(&mut roots, entry_alias, cert.as_der());
            }
        }

        if identities.is_empty() {
            return Err(ClientError::Configuration(
                "anahtar deposunda özel anahtar girdisi yok".to_owned(),
            ));
        }
        if let Some(wanted) = alias {
            if !identities.iter().any(|(name, _)| name == wanted) {
                return Err(ClientError::Configuration(format!(
                    "takma ad depoda bulunamadı: {wanted}"
                )));
            }
        }

        info!(
            keystore = ?locator,
            identity_count = identities.len(),
            alias = alias.unwrap_or("<ilk girdi>"),
            "TLS kimliği kuruldu"
        );

        let resolver = Arc::new(AliasClientCertResolver {
            identities,
            alias: alias.map(str::to_owned),
        });
        let provider = Arc::new(ring::default_provider());
        let client_config = rustls::ClientConfig::builder_with_provider(provider)
            .with_protocol_versions(&[&rustls::version::TLS12])
            .map_err(|err| {
                ClientError::Configuration(format!("TLS profili kurulamadı: {err}"))
            })?
            .with_root_certificates(roots)
            .with_client_cert_resolver(resolver.clone());

        Ok(Self {
            client_config: Arc::new(client_config),
            resolver,
        })
    }

    /// Taşıma katmanının kullanacağı rustls yapılandırması.
    #[must_use]
    pub fn client_config(&self) -> Arc<rustls::ClientConfig> {
        Arc::clone(&self.client_config)
    }

    #[must_use]
    pub fn resolver(&self) -> &AliasClientCertResolver {
        &self.resolver
    }
}

impl fmt::Debug for TlsIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TlsIdentity")
            .field("resolver", &self.resolver)
            .finish_non_exhaustive()
    }
}

fn add_trust_anchor(roots: &mut RootCertStore, alias: &str, der: &[u8]) {
    if let Err(err) = roots.add(CertificateDer::from(der.to_vec())) {
        warn!(alias, error = %err, "sertifika güven çapası olarak eklenemedi, atlanıyor");
    }
}

fn certified_key(alias: &str, chain: &PrivateKeyChain) -> Result<CertifiedKey, ClientError> {
    let key_der = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(chain.key().as_der().to_vec()));
    let signing_key = ring::sign::any_supported_type(&key_der).map_err(|err| {
        ClientError::Configuration(format!("{alias}: özel anahtar imzalamaya uygun değil: {err}"))
    })?;
    let certs = chain
        .certs()
        .iter()
        .map(|cert| CertificateDer::from(cert.as_der().to_vec()))
        .collect();
    debug!(alias, chain_len = chain.certs().len(), "kimlik girdisi hazırlandı");
    Ok(CertifiedKey::new(certs, signing_key))
}

/// El sıkışmada sunulacak kimliği takma ada göre seçen karar noktası.
///
/// Takma ad verilmişse yalnızca o girdi sunulur; verilmemişse deponun ilk
/// anahtar girdisi kullanılır. Sunucunun CA ipuçları ve imza şeması
/// tercihleri seçimi etkilemez, daraltma tamamen istemci tarafındadır.
pub struct AliasClientCertResolver {
    identities: Vec<(String, Arc<CertifiedKey>)>,
    alias: Option<String>,
}

impl AliasClientCertResolver {
    /// Seçime açık takma adlar; daraltma varsa tek elemanlıdır.
    #[must_use]
    pub fn aliases(&self) -> Vec<&str> {
        self.alias.as_ref().map_or_else(
            || self.identities.iter().map(|(name, _)| name.as_str()).collect(),
            |alias| {
                self.identities
                    .iter()
                    .filter(|(name, _)| name == alias)
                    .map(|(name, _)| name.as_str())
                    .collect()
            },
        )
    }

    fn select(&self) -> Option<&Arc<CertifiedKey>> {
        self.alias.as_ref().map_or_else(
            || self.identities.first().map(|(_, key)| key),
            |alias| {
                self.identities
                    .iter()
                    .find(|(name, _)| name == alias)
                    .map(|(_, key)| key)
            },
        )
    }
}

impl ResolvesClientCert for AliasClientCertResolver {
    fn resolve(
        &self,
        _root_hint_subjects: &[&[u8]],
        _sigschemes: &[SignatureScheme],
    ) -> Option<Arc<CertifiedKey>> {
        self.select().cloned()
    }

    fn has_certs(&self) -> bool {
        self.select().is_some()
    }
}

impl fmt::Debug for AliasClientCertResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.identities.iter().map(|(name, _)| name.as_str()).collect();
        f.debug_struct("AliasClientCertResolver")
            .field("identities", &names)
            .field("alias", &self.alias)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::fixtures;

    const SCHEMES: &[SignatureScheme] = &[SignatureScheme::RSA_PKCS1_SHA256];

    #[test]
    fn alias_narrowing_presents_only_the_requested_identity() {
        let (archive, layout) =
            fixtures::build_archive(&["birincil", "ikincil"], "depo-parolasi", true);
        let locator = KeystoreLocator::Inline(archive);

        let identity =
            TlsIdentity::bootstrap(&locator, "depo-parolasi", Some("ikincil")).unwrap();
        let resolver = identity.resolver();

        assert_eq!(resolver.aliases(), vec!["ikincil"]);
        assert!(resolver.has_certs());
        let presented = resolver.resolve(&[], SCHEMES).unwrap();
        assert_eq!(presented.cert[0].as_ref(), layout.leaf_ders[1].as_slice());
        assert_eq!(presented.cert.len(), 2);
        assert_eq!(presented.cert[1].as_ref(), layout.ca_der.as_slice());
    }

    #[test]
    fn without_alias_an_entry_from_the_store_is_presented() {
        let (archive, layout) =
            fixtures::build_archive(&["birincil", "ikincil"], "depo-parolasi", true);
        let locator = KeystoreLocator::Inline(archive);

        let identity = TlsIdentity::bootstrap(&locator, "depo-parolasi", None).unwrap();
        let resolver = identity.resolver();

        assert_eq!(resolver.aliases().len(), 2);
        let presented = resolver.resolve(&[], SCHEMES).unwrap();
        assert!(layout
            .leaf_ders
            .iter()
            .any(|leaf| leaf.as_slice() == presented.cert[0].as_ref()));
    }

    #[test]
    fn missing_alias_is_a_configuration_error() {
        let (archive, _) = fixtures::build_archive(&["birincil"], "depo-parolasi", true);
        let locator = KeystoreLocator::Inline(archive);

        let result = TlsIdentity::bootstrap(&locator, "depo-parolasi", Some("yok"));
        match result {
            Err(ClientError::Configuration(msg)) => assert!(msg.contains("yok")),
            other => panic!("beklenmeyen sonuç: {other:?}"),
        }
    }

    #[test]
    fn wrong_store_password_is_a_configuration_error() {
        let (archive, _) = fixtures::build_archive(&["birincil"], "depo-parolasi", true);
        let locator = KeystoreLocator::Inline(archive);

        let result = TlsIdentity::bootstrap(&locator, "yanlis", None);
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }

    #[test]
    fn unreadable_locator_is_a_configuration_error() {
        let locator = KeystoreLocator::File("/yok/boyle/bir/depo.p12".into());
        let result = TlsIdentity::bootstrap(&locator, "parola", None);
        assert!(matches!(result, Err(ClientError::Configuration(_))));
    }
}
