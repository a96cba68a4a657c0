//! İndirilen PKCS#12 arşivinin PEM paketine dönüştürülmesi.

use p12_keystore::{KeyStore, Pkcs12ImportPolicy};
use rand_core::OsRng;
use sertica_pem::{
    encode_pem, encrypt_pkcs8, pkcs8_to_pkcs1, write_certificate, write_certificates, PemLabel,
};
use tracing::debug;

use crate::error::ClientError;
use crate::model::CertBundle;

/// Otoritenin kabul ettiği en kısa özel anahtar parolası.
pub(crate) const MIN_KEY_PASSWORD_LEN: usize = 4;

/// Kısa parolayı herhangi bir kripto işleminden önce reddeder.
pub(crate) fn validate_key_password(key_password: Option<&str>) -> Result<(), ClientError> {
    match key_password {
        Some(password) if password.chars().count() < MIN_KEY_PASSWORD_LEN => {
            Err(ClientError::CallerInput(format!(
                "özel anahtar parolası en az {MIN_KEY_PASSWORD_LEN} karakter olmalı"
            )))
        }
        _ => Ok(()),
    }
}

/// PKCS#12 arşivini açar ve PEM paketine dönüştürür.
///
/// Arşivin ilk özel anahtar girdisi kullanılır: zincirin ilk sertifikası uç
/// sertifika, kalanı sıralı CA zinciridir. `key_password` verilmişse anahtar
/// PBES2 ile şifrelenmiş PKCS#8 olarak, verilmemişse düz PKCS#1 olarak
/// kodlanır.
///
/// # Errors
///
/// Kısa anahtar parolası [`ClientError::CallerInput`] döndürür; arşivin
/// açılamaması veya beklenen girdilerin eksikliği [`ClientError::Bundle`]
/// olarak yüzeye çıkar.
pub fn materialize_bundle(
    archive: &[u8],
    archive_password: &str,
    key_password: Option<&str>,
) -> Result<CertBundle, ClientError> {
    validate_key_password(key_password)?;

    let store = KeyStore::from_pkcs12(archive, archive_password, Pkcs12ImportPolicy::default())
        .map_err(ClientError::bundle)?;
    let (alias, chain) = store
        .private_key_chain()
        .ok_or_else(|| ClientError::bundle_msg("arşivde özel anahtar girdisi yok"))?;
    let certs = chain.certs();
    let leaf = certs
        .first()
        .ok_or_else(|| ClientError::bundle_msg("arşiv girdisinin sertifika zinciri boş"))?;
    debug!(alias, chain_len = certs.len(), "arşiv girdisi seçildi");

    let key = match key_password {
        Some(password) => {
            let encrypted =
                encrypt_pkcs8(chain.key().as_der(), password, OsRng).map_err(ClientError::bundle)?;
            encode_pem(PemLabel::EncryptedPrivateKey, &encrypted)
        }
        None => {
            let pkcs1 = pkcs8_to_pkcs1(chain.key().as_der()).map_err(ClientError::bundle)?;
            encode_pem(PemLabel::RsaPrivateKey, &pkcs1)
        }
    };

    let cert = write_certificate(leaf.as_der());
    let ca_chain = write_certificates(certs.iter().skip(1).map(|cert| cert.as_der()));
    Ok(CertBundle::new(
        key,
        key_password.map(str::to_owned),
        cert,
        ca_chain,
    ))
}

#[cfg(test)]
mod tests {
    use pkcs8::EncryptedPrivateKeyInfo;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::fixtures;

    #[test]
    fn unencrypted_bundle_splits_leaf_and_chain() {
        let (archive, layout) = fixtures::build_archive(&["servis"], "arsiv-parolasi", true);

        let bundle = materialize_bundle(&archive, "arsiv-parolasi", None).unwrap();

        assert_eq!(bundle.key_password(), None);
        let key_block = pem::parse(bundle.key()).unwrap();
        assert_eq!(key_block.tag(), "RSA PRIVATE KEY");
        assert_eq!(key_block.contents(), fixtures::rsa_material().pkcs1_der);

        let cert_block = pem::parse(bundle.cert()).unwrap();
        assert_eq!(cert_block.tag(), "CERTIFICATE");
        assert_eq!(cert_block.contents(), layout.leaf_ders[0].as_slice());

        let chain_blocks = pem::parse_many(bundle.ca_chain()).unwrap();
        assert_eq!(chain_blocks.len(), 1);
        assert_eq!(chain_blocks[0].contents(), layout.ca_der.as_slice());
    }

    #[test]
    fn leaf_only_chain_yields_empty_ca_chain() {
        let (archive, _) = fixtures::build_archive(&["servis"], "arsiv-parolasi", false);
        let bundle = materialize_bundle(&archive, "arsiv-parolasi", None).unwrap();
        assert_eq!(bundle.ca_chain(), "");
    }

    #[test]
    fn encrypted_key_decrypts_back_to_the_original() {
        let (archive, _) = fixtures::build_archive(&["servis"], "arsiv-parolasi", true);

        let bundle =
            materialize_bundle(&archive, "arsiv-parolasi", Some("anahtar-parolasi")).unwrap();

        assert_eq!(bundle.key_password(), Some("anahtar-parolasi"));
        let key_block = pem::parse(bundle.key()).unwrap();
        assert_eq!(key_block.tag(), "ENCRYPTED PRIVATE KEY");

        let encrypted = EncryptedPrivateKeyInfo::try_from(key_block.contents()).unwrap();
        let decrypted = encrypted.decrypt("anahtar-parolasi").unwrap();
        assert_eq!(decrypted.as_bytes(), fixtures::rsa_material().pkcs8_der);
    }

    #[test]
    fn short_key_password_fails_before_any_decoding() {
        let result = materialize_bundle(b"bozuk arsiv", "parola", Some("abc"));
        match result {
            Err(ClientError::CallerInput(msg)) => assert!(msg.contains("4 karakter")),
            other => panic!("beklenmeyen sonuç: {other:?}"),
        }
    }

    #[test]
    fn wrong_archive_password_is_a_bundle_error() {
        let (archive, _) = fixtures::build_archive(&["servis"], "arsiv-parolasi", true);
        let result = materialize_bundle(&archive, "yanlis", None);
        assert!(matches!(result, Err(ClientError::Bundle(_))));
    }
}
