//! Certificate Revocation List requests.

use std::time::Duration;

use crate::error::{Error, Result};

mod encode;

pub(crate) use self::encode::build_crl;

/// Window used for `nextUpdate` when no validity is requested.
pub const DEFAULT_CRL_WINDOW: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// How long a generated CRL stays valid, counted from the moment it is signed.
///
/// Defaults to zero seconds, which the encoder replaces by [`DEFAULT_CRL_WINDOW`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct CrlValidity(Duration);

impl CrlValidity {
    pub const fn from_secs(secs: u64) -> Self {
        CrlValidity(Duration::from_secs(secs))
    }

    /// Interprets the optional `TIME` argument, a whole number of seconds.
    ///
    /// Surrounding whitespace (including newlines) is ignored.
    pub fn from_arg(arg: Option<&str>) -> Result<Self> {
        let Some(arg) = arg else {
            return Ok(CrlValidity::default());
        };

        let arg = arg.trim();
        arg.parse::<u64>()
            .map(CrlValidity::from_secs)
            .map_err(|err| Error::Usage(format!("invalid TIME '{arg}': {err}")))
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    /// Time between `thisUpdate` and `nextUpdate`.
    pub fn window(&self) -> Duration {
        if self.0.is_zero() {
            DEFAULT_CRL_WINDOW
        } else {
            self.0
        }
    }
}

/// Everything needed to produce one CRL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RevocationRequest {
    serial_numbers: Vec<String>,
    issuer_certificate: Vec<u8>,
    validity: CrlValidity,
}

impl RevocationRequest {
    /// Assembles a request; the serial list may be empty, the issuer certificate may not.
    pub fn new(
        serial_numbers: Vec<String>,
        issuer_certificate: Vec<u8>,
        validity: CrlValidity,
    ) -> Result<Self> {
        if issuer_certificate.is_empty() {
            return Err(Error::Usage("issuer certificate is empty".to_owned()));
        }

        Ok(RevocationRequest {
            serial_numbers,
            issuer_certificate,
            validity,
        })
    }

    /// Decimal serial numbers in input order, duplicates included.
    pub fn serial_numbers(&self) -> &[String] {
        &self.serial_numbers
    }

    /// PEM bytes of the issuer certificate.
    pub fn issuer_certificate(&self) -> &[u8] {
        &self.issuer_certificate
    }

    pub fn validity(&self) -> CrlValidity {
        self.validity
    }
}

/// Splits a serial list into one entry per non-empty line.
///
/// Lines are trimmed (so CRLF input works); numbers are not validated here.
pub fn parse_serial_list(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .split('\n')
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
