//! Invocation settings shared by the commands.

use std::{collections::HashMap, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    input::read_file,
};

/// Settings resolved from flags for one command invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    /// Certificate file (`--cert`).
    ///
    /// For `gencrl` this is the CRL issuer; for `gencsr` it selects certificate-derivation mode.
    pub cert_file: Option<PathBuf>,

    /// CA certificate file (`--ca`), the issuer fallback for `gencrl`.
    pub ca_file: Option<PathBuf>,

    /// CA private key file (`--ca-key`).
    pub ca_key_file: Option<PathBuf>,

    /// Private key file (`--key`).
    pub key_file: Option<PathBuf>,

    /// Comma separated hosts replacing the request's hosts (`--hostname`).
    pub hostname: Option<String>,

    /// Remote signer address (`--remote`).
    pub remote: Option<String>,

    /// Signing config document (`--config`).
    pub config_file: Option<PathBuf>,
}

impl Config {
    /// Loads the signing config document, if one is configured.
    pub fn load_file(&self) -> Result<Option<ConfigFile>> {
        let Some(path) = &self.config_file else {
            return Ok(None);
        };

        log::debug!("read config file {}", path.display());
        let bytes = read_file(path)?;
        ConfigFile::from_json(&bytes).map(Some)
    }
}

/// Signing config document.
///
/// ```json
/// {
///   "signing": { "default": { "remote": "server1" } },
///   "remotes": { "server1": "10.0.0.1:8888" }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signing: Option<Signing>,

    /// Named remote signer addresses.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub remotes: HashMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signing {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<SigningProfile>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SigningProfile {
    /// Name of an entry in [`ConfigFile::remotes`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
}

impl ConfigFile {
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes).map_err(|err| Error::parse("config file", err))
    }

    /// Address of the remote signer selected by the default profile.
    ///
    /// Naming a remote that is not listed under `remotes` is a signer configuration error.
    pub fn default_remote(&self) -> Result<Option<&str>> {
        let name = self
            .signing
            .as_ref()
            .and_then(|signing| signing.default.as_ref())
            .and_then(|profile| profile.remote.as_deref());

        let Some(name) = name else {
            return Ok(None);
        };

        self.remotes
            .get(name)
            .map(|addr| Some(addr.as_str()))
            .ok_or_else(|| Error::SignerConfig(format!("unknown remote '{name}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test::Workdir;

    #[test]
    fn no_config_file() {
        assert_eq!(Config::default().load_file().unwrap(), None);
    }

    #[test]
    fn default_remote() {
        let file = ConfigFile::from_json(
            br#"{
                "signing": { "default": { "remote": "server1" } },
                "remotes": { "server1": "10.0.0.1:8888" }
            }"#,
        )
        .unwrap();
        assert_eq!(file.default_remote().unwrap(), Some("10.0.0.1:8888"));

        let file = ConfigFile::from_json(br#"{ "signing": { "default": {} } }"#).unwrap();
        assert_eq!(file.default_remote().unwrap(), None);
    }

    #[test]
    fn unknown_remote() {
        let file =
            ConfigFile::from_json(br#"{ "signing": { "default": { "remote": "nope" } } }"#)
                .unwrap();
        assert!(matches!(file.default_remote(), Err(Error::SignerConfig(_))));
    }

    #[test]
    fn load_from_disk() {
        let work = Workdir::new();
        let config = Config {
            config_file: Some(work.write("config.json", "{}")),
            ..Config::default()
        };
        assert_eq!(config.load_file().unwrap(), Some(ConfigFile::default()));

        let config = Config {
            config_file: Some(work.write("broken.json", "{ signing")),
            ..Config::default()
        };
        assert!(matches!(config.load_file(), Err(Error::Parse(_))));

        let config = Config {
            config_file: Some(work.path("missing.json")),
            ..Config::default()
        };
        assert!(matches!(config.load_file(), Err(Error::Io { .. })));
    }
}
