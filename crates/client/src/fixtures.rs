//! Test malzemesi: üretilmiş RSA anahtarı, imzalı sertifikalar ve PKCS#12
//! arşivleri. RSA üretimi pahalı olduğu için anahtar bir kez üretilir ve tüm
//! testlerce paylaşılır.

use once_cell::sync::Lazy;
use p12_keystore::{
    Certificate as P12Certificate, KeyStore, KeyStoreEntry, LocalKeyId, PrivateKey,
    PrivateKeyChain,
};
use rand_core::OsRng;
use rcgen::{BasicConstraints, CertificateParams, DnType, IsCa, Issuer, KeyPair};
use rsa::pkcs1::EncodeRsaPrivateKey;
use rsa::pkcs8::{EncodePrivateKey, LineEnding};
use rsa::RsaPrivateKey;

pub(crate) struct RsaMaterial {
    pub pkcs8_der: Vec<u8>,
    pub pkcs1_der: Vec<u8>,
    pub pkcs8_pem: String,
}

static RSA_MATERIAL: Lazy<RsaMaterial> = Lazy::new(|| {
    let key = RsaPrivateKey::new(&mut OsRng, 2048).expect("RSA üretimi");
    let pkcs8_der = key.to_pkcs8_der().expect("pkcs8 kodlama").as_bytes().to_vec();
    let pkcs1_der = key.to_pkcs1_der().expect("pkcs1 kodlama").as_bytes().to_vec();
    let pkcs8_pem = key
        .to_pkcs8_pem(LineEnding::LF)
        .expect("pkcs8 pem kodlama")
        .to_string();
    RsaMaterial {
        pkcs8_der,
        pkcs1_der,
        pkcs8_pem,
    }
});

pub(crate) fn rsa_material() -> &'static RsaMaterial {
    &RSA_MATERIAL
}

/// Arşivin beklenen iç düzeni; takma ad sırası girdi sırasıyla aynıdır.
pub(crate) struct ArchiveLayout {
    pub leaf_ders: Vec<Vec<u8>>,
    pub ca_der: Vec<u8>,
}

/// Her takma ad için ortak RSA anahtarını taşıyan, ayrı uç sertifikalı bir
/// PKCS#12 arşivi üretir. `include_ca` kapalıysa zincir yalnızca uç
/// sertifikadan oluşur.
pub(crate) fn build_archive(
    aliases: &[&str],
    password: &str,
    include_ca: bool,
) -> (Vec<u8>, ArchiveLayout) {
    let ca_key = KeyPair::generate_for(&rcgen::PKCS_ECDSA_P256_SHA256).expect("CA anahtarı");
    let mut ca_params = CertificateParams::new(Vec::new()).expect("CA parametreleri");
    ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
    ca_params
        .distinguished_name
        .push(DnType::CommonName, "sertica test ca");
    let ca_cert = ca_params.self_signed(&ca_key).expect("CA imzalama");
    let ca_der = ca_cert.der().to_vec();
    let issuer = Issuer::new(ca_params, ca_key);

    let leaf_key =
        KeyPair::from_pkcs8_pem_and_sign_algo(&RSA_MATERIAL.pkcs8_pem, &rcgen::PKCS_RSA_SHA256)
            .expect("RSA anahtar köprüsü");

    let mut store = KeyStore::new();
    let mut leaf_ders = Vec::with_capacity(aliases.len());
    for (index, alias) in aliases.iter().enumerate() {
        let mut params =
            CertificateParams::new(vec![format!("{alias}.example.com")]).expect("uç parametreleri");
        params.distinguished_name.push(DnType::CommonName, *alias);
        let leaf = params.signed_by(&leaf_key, &issuer).expect("uç imzalama");
        let leaf_der = leaf.der().to_vec();

        let mut chain = vec![P12Certificate::from_der(&leaf_der).expect("uç sertifika")];
        if include_ca {
            chain.push(P12Certificate::from_der(&ca_der).expect("CA sertifikası"));
        }
        let key_id = vec![u8::try_from(index + 1).expect("takma ad sayısı"); 20];
        let entry = PrivateKeyChain::new(
            LocalKeyId::from(key_id),
            PrivateKey::from_der(&RSA_MATERIAL.pkcs8_der).expect("özel anahtar"),
            chain,
        );
        store.add_entry(alias, KeyStoreEntry::PrivateKeyChain(entry));
        leaf_ders.push(leaf_der);
    }

    let bytes = store.writer(password).write().expect("PKCS#12 yazımı");
    (bytes, ArchiveLayout { leaf_ders, ca_der })
}
