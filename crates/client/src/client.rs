//! Sertifika yaşam döngüsü operasyonlarının istemci yüzeyi.

use std::thread;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::DeserializeOwned;
use serde::Serialize;
use time::PrimitiveDateTime;
use tracing::{debug, info};
use zeroize::Zeroizing;

use sertica_pem::OneTimePassword;

use crate::bundle::{materialize_bundle, validate_key_password};
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::model::{
    CertBundle, CertFormat, CreateReq, CreateRes, CwsRequest, CwsResponse, DownloadReq,
    DownloadRes, ExistsRes, ExpirationRes, ExpiringReq, ExpiringRes, RevokeReason, RevokeReq,
    RevokeRes, SelfDescribing, SerialNumberRes, ViewRes,
};
use crate::poll::Poller;
use crate::tls::TlsIdentity;
use crate::transport::{Transport, TransportError};

const OP_CREATE: &str = "certificate/create";
const OP_RENEW: &str = "certificate/renew";
const OP_OBSOLETE: &str = "certificate/obsolete";
const OP_DOWNLOAD: &str = "certificate/download";
const OP_VIEW: &str = "certificate/view";
const OP_EXISTS: &str = "certificate/exists";
const OP_EXPIRING: &str = "certificate/expiring";
const OP_EXPIRATION_DATE: &str = "certificate/expirationdate";
const OP_SERIAL_NUMBER: &str = "certificate/serialnumber";
const OP_REVOKE: &str = "certificate/revoke";

/// İndirilen arşivi yolda koruyan tek kullanımlık parolanın uzunluğu.
const ARCHIVE_PASSWORD_LEN: usize = 20;

/// Sertifika web servisi istemcisi.
///
/// Taşıma katmanı üzerinde soyuttur: kurulum sırasında TLS kimliği kurulur
/// ve verilen fabrika bu kimlikle taşıma örneğini üretir. Operasyon
/// çağrıları eşzamanlıdır; yalnızca indirme, polling denetleyicisiyle
/// tekrar denenir.
pub struct CertClient<T> {
    config: ClientConfig,
    identity: TlsIdentity,
    transport: T,
    poller: Poller,
}

impl<T: Transport> CertClient<T> {
    /// TLS kimliğini kurar ve taşıma katmanını fabrikayla üretir.
    ///
    /// # Errors
    ///
    /// Kimlik kurulumunda [`ClientError::Configuration`], fabrika hatasında
    /// [`ClientError::Transport`] döner.
    pub fn connect<F>(config: ClientConfig, make_transport: F) -> Result<Self, ClientError>
    where
        F: FnOnce(&ClientConfig, &TlsIdentity) -> Result<T, TransportError>,
    {
        let identity = TlsIdentity::bootstrap(
            config.keystore(),
            config.keystore_password(),
            config.key_alias(),
        )?;
        let transport = make_transport(&config, &identity)?;
        info!(endpoint = %config.endpoint(), app_id = config.app_id(), "CWS istemcisi hazır");
        Ok(Self {
            config,
            identity,
            transport,
            poller: Poller::download_default(),
        })
    }

    /// İndirme operasyonunun polling bütçesini değiştirir.
    #[must_use]
    pub const fn with_poller(mut self, poller: Poller) -> Self {
        self.poller = poller;
        self
    }

    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    #[must_use]
    pub const fn tls_identity(&self) -> &TlsIdentity {
        &self.identity
    }

    /// Yeni bir sertifika oluşturur.
    ///
    /// # Errors
    ///
    /// Taşıma veya servis hatasında [`ClientError`] döner.
    pub fn create_cert(&self, req: &CreateReq) -> Result<CreateRes, ClientError> {
        self.exec(OP_CREATE, req)
    }

    /// Ortak ad ve takım DL'i ile sertifika oluşturur, ayırt edici adı döner.
    ///
    /// # Errors
    ///
    /// Servis ayırt edici ad döndürmezse [`ClientError::RemoteOperation`],
    /// diğer durumlarda ilgili [`ClientError`] döner.
    pub fn create_cert_for(
        &self,
        common_name: &str,
        subject_alt_names: Vec<String>,
        team_dl_name: &str,
    ) -> Result<String, ClientError> {
        let req = CreateReq {
            request: self.request(common_name, team_dl_name),
            subject_alt_name: subject_alt_names,
            domain: self.config.domain().map(str::to_owned),
            create_policy: None,
        };
        self.create_cert(&req)?.certificate_dn.ok_or_else(|| {
            ClientError::RemoteOperation("yanıt sertifika DN'i içermiyor".to_owned())
        })
    }

    /// Takım DL'i için policy DN oluşturur.
    ///
    /// # Errors
    ///
    /// Taşıma veya servis hatasında [`ClientError`] döner.
    pub fn create_policy_dn(&self, team_dl_name: &str) -> Result<bool, ClientError> {
        let req = CreateReq {
            request: self.request("", team_dl_name),
            subject_alt_name: Vec::new(),
            domain: Some(String::new()),
            create_policy: Some("1".to_owned()),
        };
        Ok(self.create_cert(&req)?.success())
    }

    /// Var olan sertifikayı yeniler.
    ///
    /// # Errors
    ///
    /// Taşıma veya servis hatasında [`ClientError`] döner.
    pub fn renew_cert(&self, req: &CwsRequest) -> Result<CwsResponse, ClientError> {
        self.exec(OP_RENEW, req)
    }

    /// # Errors
    ///
    /// Taşıma veya servis hatasında [`ClientError`] döner.
    pub fn renew_cert_for(&self, common_name: &str, team_dl_name: &str) -> Result<bool, ClientError> {
        Ok(self.renew_cert(&self.request(common_name, team_dl_name))?.success())
    }

    /// Sertifikayı kullanım dışı bırakır.
    ///
    /// # Errors
    ///
    /// Taşıma veya servis hatasında [`ClientError`] döner.
    pub fn obsolete_cert(&self, req: &CwsRequest) -> Result<CwsResponse, ClientError> {
        self.exec(OP_OBSOLETE, req)
    }

    /// # Errors
    ///
    /// Taşıma veya servis hatasında [`ClientError`] döner.
    pub fn obsolete_cert_for(
        &self,
        common_name: &str,
        team_dl_name: &str,
    ) -> Result<bool, ClientError> {
        Ok(self.obsolete_cert(&self.request(common_name, team_dl_name))?.success())
    }

    /// Sertifikayı iptal eder.
    ///
    /// # Errors
    ///
    /// Taşıma veya servis hatasında [`ClientError`] döner.
    pub fn revoke_cert(&self, req: &RevokeReq) -> Result<RevokeRes, ClientError> {
        self.exec(OP_REVOKE, req)
    }

    /// # Errors
    ///
    /// Taşıma veya servis hatasında [`ClientError`] döner.
    pub fn revoke_cert_for(
        &self,
        common_name: &str,
        team_dl_name: &str,
        reason: RevokeReason,
        disable: bool,
    ) -> Result<RevokeRes, ClientError> {
        let req = RevokeReq {
            request: self.request(common_name, team_dl_name),
            reason,
            disable,
        };
        self.revoke_cert(&req)
    }

    /// Sertifikayı indirir; "işleniyor" yanıtları polling bütçesi içinde
    /// tekrar denenir.
    ///
    /// # Errors
    ///
    /// Bütçe biterse veya servis kalıcı hata bildirirse
    /// [`ClientError::RemoteOperation`] döner.
    pub fn download_cert(&self, req: &DownloadReq) -> Result<DownloadRes, ClientError> {
        self.poller.run(|| self.exec_raw(OP_DOWNLOAD, req), thread::sleep)
    }

    /// Sertifikayı istenen biçimde indirir ve base64 gövdesini döner.
    ///
    /// # Errors
    ///
    /// Yanıt veri alanı taşımıyorsa [`ClientError::RemoteOperation`], diğer
    /// durumlarda ilgili [`ClientError`] döner.
    pub fn download_cert_data(
        &self,
        common_name: &str,
        team_dl_name: &str,
        password: &str,
        format: CertFormat,
    ) -> Result<String, ClientError> {
        let req = DownloadReq {
            request: self.request(common_name, team_dl_name),
            format,
            password: password.to_owned(),
        };
        let res = self.download_cert(&req)?;
        res.certificate_data.ok_or_else(|| {
            ClientError::RemoteOperation("yanıt sertifika verisi içermiyor".to_owned())
        })
    }

    /// Sertifikayı PKCS#12 olarak indirir ve PEM paketine dönüştürür.
    ///
    /// Arşiv, telde tek kullanımlık üretilen bir parolayla korunur;
    /// `key_password` verilmişse paketteki özel anahtar o parolayla
    /// şifrelenir, verilmemişse düz PKCS#1 olarak kodlanır.
    ///
    /// # Errors
    ///
    /// Kısa anahtar parolası herhangi bir ağ çağrısından önce
    /// [`ClientError::CallerInput`] döndürür; indirme ve dönüştürme hataları
    /// ilgili [`ClientError`] olarak yükselir.
    pub fn download_cert_bundle(
        &self,
        common_name: &str,
        team_dl_name: &str,
        key_password: Option<&str>,
    ) -> Result<CertBundle, ClientError> {
        validate_key_password(key_password)?;
        let archive_password: Zeroizing<String> =
            OneTimePassword::generate(ARCHIVE_PASSWORD_LEN);
        let req = DownloadReq {
            request: self.request(common_name, team_dl_name),
            format: CertFormat::Pkcs12,
            password: archive_password.to_string(),
        };
        let res = self.download_cert(&req)?;
        let data = res.certificate_data.ok_or_else(|| {
            ClientError::RemoteOperation("yanıt sertifika verisi içermiyor".to_owned())
        })?;
        let archive = STANDARD
            .decode(data.trim())
            .map_err(ClientError::bundle)?;
        materialize_bundle(&archive, &archive_password, key_password)
    }

    /// Sertifika ayrıntılarını görüntüler.
    ///
    /// # Errors
    ///
    /// Taşıma veya servis hatasında [`ClientError`] döner.
    pub fn view_cert(&self, req: &CwsRequest) -> Result<ViewRes, ClientError> {
        self.exec(OP_VIEW, req)
    }

    /// # Errors
    ///
    /// Taşıma veya servis hatasında [`ClientError`] döner.
    pub fn view_cert_for(&self, common_name: &str, team_dl_name: &str) -> Result<ViewRes, ClientError> {
        self.view_cert(&self.request(common_name, team_dl_name))
    }

    /// Sertifikanın var olup olmadığını sorgular.
    ///
    /// # Errors
    ///
    /// Taşıma veya servis hatasında [`ClientError`] döner.
    pub fn cert_exists(&self, req: &CwsRequest) -> Result<ExistsRes, ClientError> {
        self.exec(OP_EXISTS, req)
    }

    /// # Errors
    ///
    /// Taşıma veya servis hatasında [`ClientError`] döner.
    pub fn cert_exists_for(
        &self,
        common_name: &str,
        team_dl_name: &str,
    ) -> Result<bool, ClientError> {
        Ok(self
            .cert_exists(&self.request(common_name, team_dl_name))?
            .certificate_exists)
    }

    /// Sertifikanın verilen pencere içinde süresinin dolup dolmayacağını
    /// sorgular.
    ///
    /// # Errors
    ///
    /// Taşıma veya servis hatasında [`ClientError`] döner.
    pub fn cert_expiring(&self, req: &ExpiringReq) -> Result<ExpiringRes, ClientError> {
        self.exec(OP_EXPIRING, req)
    }

    /// # Errors
    ///
    /// Taşıma veya servis hatasında [`ClientError`] döner.
    pub fn cert_expiring_in(
        &self,
        common_name: &str,
        team_dl_name: &str,
        window_days: u32,
    ) -> Result<bool, ClientError> {
        let req = ExpiringReq {
            request: self.request(common_name, team_dl_name),
            expiration_window: window_days.to_string(),
        };
        Ok(self.cert_expiring(&req)?.certificate_expiring)
    }

    /// Sertifikanın süre dolum tarihini sorgular.
    ///
    /// # Errors
    ///
    /// Taşıma veya servis hatasında [`ClientError`] döner.
    pub fn cert_expiration_date(&self, req: &CwsRequest) -> Result<ExpirationRes, ClientError> {
        self.exec(OP_EXPIRATION_DATE, req)
    }

    /// # Errors
    ///
    /// Yanıt tarih taşımıyorsa [`ClientError::RemoteOperation`], diğer
    /// durumlarda ilgili [`ClientError`] döner.
    pub fn expiration_date_for(
        &self,
        common_name: &str,
        team_dl_name: &str,
    ) -> Result<PrimitiveDateTime, ClientError> {
        self.cert_expiration_date(&self.request(common_name, team_dl_name))?
            .expiration_date
            .ok_or_else(|| {
                ClientError::RemoteOperation("yanıt süre dolum tarihi içermiyor".to_owned())
            })
    }

    /// Sertifikanın seri numarasını sorgular.
    ///
    /// # Errors
    ///
    /// Taşıma veya servis hatasında [`ClientError`] döner.
    pub fn cert_serial_number(&self, req: &CwsRequest) -> Result<SerialNumberRes, ClientError> {
        self.exec(OP_SERIAL_NUMBER, req)
    }

    /// # Errors
    ///
    /// Yanıt seri numarası taşımıyorsa [`ClientError::RemoteOperation`],
    /// diğer durumlarda ilgili [`ClientError`] döner.
    pub fn serial_number_for(
        &self,
        common_name: &str,
        team_dl_name: &str,
    ) -> Result<String, ClientError> {
        self.cert_serial_number(&self.request(common_name, team_dl_name))?
            .cert_serial_number
            .ok_or_else(|| {
                ClientError::RemoteOperation("yanıt seri numarası içermiyor".to_owned())
            })
    }

    fn request(&self, common_name: &str, team_dl_name: &str) -> CwsRequest {
        CwsRequest::new(
            self.config.app_id(),
            self.normalize_team_dl(team_dl_name),
            common_name,
        )
    }

    /// Göreli takım DL'ini yapılandırmadaki temel DL'in altına yerleştirir;
    /// temel DL ile başlayan değer olduğu gibi kalır.
    fn normalize_team_dl(&self, team_dl_name: &str) -> String {
        if team_dl_name.starts_with(self.config.team_dl()) {
            team_dl_name.to_owned()
        } else {
            format!("{}\\{team_dl_name}", self.config.team_dl())
        }
    }

    /// Çağrıyı yapar ve servis düzeyi başarıyı da denetler.
    fn exec<Req, Res>(&self, operation: &str, req: &Req) -> Result<Res, ClientError>
    where
        Req: Serialize,
        Res: SelfDescribing + DeserializeOwned,
    {
        let res: Res = self.exec_raw(operation, req)?;
        if res.success() {
            Ok(res)
        } else {
            Err(ClientError::RemoteOperation(res.error_message().to_owned()))
        }
    }

    /// Çağrıyı yapar, yanıtı başarı denetimi yapmadan çözümler. İndirme
    /// operasyonu "işleniyor" yanıtlarını kendisi yorumlar.
    fn exec_raw<Req, Res>(&self, operation: &str, req: &Req) -> Result<Res, ClientError>
    where
        Req: Serialize,
        Res: SelfDescribing + DeserializeOwned,
    {
        let body = serde_json::to_string(req)
            .map_err(|err| ClientError::Transport(TransportError::Body(err.to_string())))?;
        if self.config.debug() {
            debug!(operation, body = %body, "istek gönderiliyor");
        }
        let raw = self.transport.call(operation, &body)?;
        if self.config.debug() {
            debug!(operation, body = %raw, "yanıt alındı");
        }
        serde_json::from_str(&raw)
            .map_err(|err| ClientError::Transport(TransportError::Body(err.to_string())))
    }
}
