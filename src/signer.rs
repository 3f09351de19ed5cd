//! Resolving the signing identity of an invocation.

use std::path::PathBuf;

use p256::ecdsa::SigningKey;
use pkcs8::DecodePrivateKey as _;
use zeroize::Zeroizing;

use crate::{
    config::Config,
    error::{Error, Result},
    input::read_file,
};

/// Make a P-256 private key (from which we can derive a public key).
pub fn create_p256_key() -> SigningKey {
    let csprng = &mut rand::thread_rng();
    ecdsa::SigningKey::from(p256::SecretKey::random(csprng))
}

/// Loads a P-256 private key from PEM.
///
/// Both PKCS#8 (`PRIVATE KEY`) and SEC1 (`EC PRIVATE KEY`) documents are accepted.
pub fn signing_key_from_pem(pem: &str) -> Result<SigningKey> {
    let label = pem::decode_label(pem.as_bytes())
        .map_err(|err| Error::SignerConfig(format!("private key is not PEM: {err}")))?;

    match label {
        "PRIVATE KEY" => SigningKey::from_pkcs8_pem(pem)
            .map_err(|err| Error::SignerConfig(format!("read PKCS#8 private key: {err}"))),

        "EC PRIVATE KEY" => p256::SecretKey::from_sec1_pem(pem)
            .map(SigningKey::from)
            .map_err(|err| Error::SignerConfig(format!("read SEC1 private key: {err}"))),

        label => Err(Error::SignerConfig(format!(
            "unsupported private key PEM label '{label}'"
        ))),
    }
}

/// Where the signing identity of one command comes from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignerConfig {
    pub key_file: Option<PathBuf>,
    pub remote: Option<String>,
}

impl SignerConfig {
    /// CRLs are signed by the CA key, falling back to `--key`.
    pub fn for_crl(config: &Config) -> Result<Self> {
        let key_file = config.ca_key_file.clone().or_else(|| config.key_file.clone());
        Self::with_key(config, key_file)
    }

    /// CSRs are signed by `--key`, falling back to the CA key.
    pub fn for_csr(config: &Config) -> Result<Self> {
        let key_file = config.key_file.clone().or_else(|| config.ca_key_file.clone());
        Self::with_key(config, key_file)
    }

    fn with_key(config: &Config, key_file: Option<PathBuf>) -> Result<Self> {
        let remote = match &config.remote {
            Some(remote) => Some(remote.clone()),
            None => config
                .load_file()?
                .as_ref()
                .map(|file| file.default_remote())
                .transpose()?
                .flatten()
                .map(ToOwned::to_owned),
        };

        Ok(SignerConfig { key_file, remote })
    }
}

/// Signer holding a private key in process.
#[derive(Debug, Clone)]
pub struct LocalSigner {
    signing_key: SigningKey,
}

impl LocalSigner {
    pub fn new(signing_key: SigningKey) -> Self {
        LocalSigner { signing_key }
    }

    pub fn signing_key(&self) -> &SigningKey {
        &self.signing_key
    }
}

/// Signer reached over the network; its key never enters this process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteSigner {
    pub address: String,
}

/// Signing identity resolved from configuration.
#[derive(Debug, Clone)]
pub enum SignerIdentity {
    Local(LocalSigner),
    Remote(RemoteSigner),
}

impl SignerIdentity {
    /// Resolves the configured identity, loading the key of a local signer.
    pub fn from_config(config: &SignerConfig) -> Result<Self> {
        if let Some(address) = &config.remote {
            log::debug!("resolved remote signer {address}");
            return Ok(SignerIdentity::Remote(RemoteSigner {
                address: address.clone(),
            }));
        }

        let key_file = config
            .key_file
            .as_ref()
            .ok_or_else(|| Error::SignerConfig("no private key file configured".to_owned()))?;

        log::debug!("read private key file {}", key_file.display());
        let bytes = read_file(key_file)
            .map_err(|err| Error::SignerConfig(format!("load private key: {err}")))?;
        let pem = Zeroizing::new(String::from_utf8(bytes).map_err(|_| {
            Error::SignerConfig(format!("{}: private key is not UTF-8", key_file.display()))
        })?);

        let signing_key = signing_key_from_pem(&pem)?;
        Ok(SignerIdentity::Local(LocalSigner::new(signing_key)))
    }

    /// Extracts the in-process signer the encoders need.
    pub fn into_local(self) -> Result<LocalSigner> {
        match self {
            SignerIdentity::Local(signer) => Ok(signer),
            SignerIdentity::Remote(remote) => Err(Error::Internal(format!(
                "resolved signer is remote ({}), a local private key is required",
                remote.address
            ))),
        }
    }
}
