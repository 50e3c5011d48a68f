/// TLS 与客户端证书
///
/// 客户端证书文件可以是：
/// - PKCS#12（`.pfx` / `.p12`，DER 编码），用提供的密码解密，密码可为空
/// - PEM，包含证书链和私钥。私钥若为加密的 PKCS#8（`ENCRYPTED PRIVATE KEY`），
///   使用提供的密码解密

use std::io::{BufReader, Cursor};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use common::{Error, Result};
use rustls::pki_types::{CertificateDer, PrivateKeyDer, PrivatePkcs8KeyDer};
use rustls::{ClientConfig, RootCertStore};
use tracing::debug;

const ENCRYPTED_KEY_TAG: &str = "ENCRYPTED PRIVATE KEY";

/// DER SEQUENCE 标记，PKCS#12 文件以此开头
const DER_SEQUENCE_TAG: u8 = 0x30;

/// 客户端证书（证书链 + 私钥）
pub struct ClientCertificate {
    path: PathBuf,
    cert_chain: Vec<CertificateDer<'static>>,
    private_key: PrivateKeyDer<'static>,
}

impl ClientCertificate {
    /// 从 PKCS#12 或 PEM 文件加载客户端证书
    ///
    /// PEM 文件的 `password` 为空或 `None` 时要求私钥未加密；
    /// PKCS#12 文件的 `None` 按空密码处理。
    pub fn from_file(path: impl AsRef<Path>, password: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|e| {
            Error::Tls(format!("读取证书文件失败 '{}': {}", path.display(), e))
        })?;

        let (cert_chain, private_key) = if data.first() == Some(&DER_SEQUENCE_TAG) {
            parse_pkcs12(&data, password)?
        } else {
            (parse_certificates(&data)?, parse_private_key(&data, password)?)
        };

        debug!(
            "已加载客户端证书: path={}, cert_count={}",
            path.display(),
            cert_chain.len()
        );

        Ok(Self {
            path: path.to_path_buf(),
            cert_chain,
            private_key,
        })
    }

    /// 证书文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 证书链长度
    pub fn cert_count(&self) -> usize {
        self.cert_chain.len()
    }
}

impl std::fmt::Debug for ClientCertificate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientCertificate")
            .field("path", &self.path)
            .field("cert_count", &self.cert_chain.len())
            .finish_non_exhaustive()
    }
}

/// 从 PEM 文件加载额外信任的根证书
pub fn load_root_certificates(path: impl AsRef<Path>) -> Result<Vec<CertificateDer<'static>>> {
    let path = path.as_ref();
    let pem_data = std::fs::read(path).map_err(|e| {
        Error::Tls(format!("读取根证书文件失败 '{}': {}", path.display(), e))
    })?;
    parse_certificates(&pem_data)
}

/// 构建 rustls 客户端配置
///
/// 信任 webpki 根证书及 `extra_roots`；提供客户端证书时启用双向 TLS。
pub fn build_client_config(
    certificate: Option<&ClientCertificate>,
    extra_roots: &[CertificateDer<'static>],
) -> Result<Arc<ClientConfig>> {
    let mut roots = RootCertStore::empty();
    roots.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    for cert in extra_roots {
        roots
            .add(cert.clone())
            .map_err(|e| Error::Tls(format!("无效的根证书: {}", e)))?;
    }

    let builder =
        ClientConfig::builder_with_provider(Arc::new(rustls::crypto::ring::default_provider()))
            .with_safe_default_protocol_versions()
            .map_err(|e| Error::Tls(format!("TLS 协议版本配置失败: {}", e)))?
            .with_root_certificates(roots);

    let config = match certificate {
        Some(cert) => builder
            .with_client_auth_cert(cert.cert_chain.clone(), cert.private_key.clone_key())
            .map_err(|e| Error::Tls(format!("客户端证书与私钥不匹配: {}", e)))?,
        None => builder.with_no_client_auth(),
    };

    Ok(Arc::new(config))
}

fn parse_pkcs12(
    der: &[u8],
    password: Option<&str>,
) -> Result<(Vec<CertificateDer<'static>>, PrivateKeyDer<'static>)> {
    let keystore = p12_keystore::KeyStore::from_pkcs12(der, password.unwrap_or(""))
        .map_err(|e| Error::Tls(format!("解析 PKCS#12 失败，密码错误或文件损坏: {}", e)))?;

    let (alias, chain) = keystore
        .private_key_chain()
        .ok_or_else(|| Error::Tls("PKCS#12 中未找到私钥".to_string()))?;

    let certs: Vec<CertificateDer<'static>> = chain
        .chain()
        .iter()
        .map(|cert| CertificateDer::from(cert.as_der().to_vec()))
        .collect();

    if certs.is_empty() {
        return Err(Error::Tls(format!("PKCS#12 条目 '{}' 中未找到证书", alias)));
    }

    let key = PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(chain.key().to_vec()));
    Ok((certs, key))
}

fn parse_certificates(pem_data: &[u8]) -> Result<Vec<CertificateDer<'static>>> {
    let mut reader = BufReader::new(Cursor::new(pem_data));
    let certs = rustls_pemfile::certs(&mut reader)
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::Tls(format!("解析 PEM 证书失败: {}", e)))?;

    if certs.is_empty() {
        return Err(Error::Tls("PEM 数据中未找到证书".to_string()));
    }

    Ok(certs)
}

fn parse_private_key(pem_data: &[u8], password: Option<&str>) -> Result<PrivateKeyDer<'static>> {
    let mut reader = BufReader::new(Cursor::new(pem_data));
    let plain_key = rustls_pemfile::private_key(&mut reader)
        .map_err(|e| Error::Tls(format!("解析私钥失败: {}", e)))?;

    // 未加密的私钥忽略密码
    if let Some(key) = plain_key {
        return Ok(key);
    }

    let blocks = pem::parse_many(pem_data).map_err(|e| Error::Tls(format!("解析 PEM 失败: {}", e)))?;
    let encrypted = blocks
        .iter()
        .find(|block| block.tag() == ENCRYPTED_KEY_TAG)
        .ok_or_else(|| Error::Tls("PEM 数据中未找到私钥".to_string()))?;

    let password = match password {
        Some(p) if !p.is_empty() => p,
        _ => return Err(Error::Tls("私钥已加密，但未提供密码".to_string())),
    };

    let info = pkcs8::EncryptedPrivateKeyInfo::try_from(encrypted.contents())
        .map_err(|e| Error::Tls(format!("无效的加密私钥: {}", e)))?;
    let document = info
        .decrypt(password)
        .map_err(|_| Error::Tls("私钥解密失败，密码错误或加密算法不支持".to_string()))?;

    Ok(PrivateKeyDer::Pkcs8(PrivatePkcs8KeyDer::from(
        document.as_bytes().to_vec(),
    )))
}
