//! `gencsr`: generate a CSR from a private key and a JSON request or an issued certificate.

use std::{io::Write, path::PathBuf};

use crate::{
    cert::parse_certificate_pem,
    csr::{split_hosts, CertificateRequest},
    emit::{write_pem, CSR_LABEL},
    encoder::CsrEncoder,
    error::{Error, Result},
    input::{read_file, Source},
    signer::{SignerConfig, SignerIdentity},
    Config,
};

pub const USAGE: &str = "\
Usage of gencsr:
        pkigen gencsr --key private_key_file [--hostname hostname_override] CSRJSON
        pkigen gencsr --key private_key_file [--hostname hostname_override] --cert certificate_file

Arguments:
        CSRJSON:    JSON file containing the request, use '-' for reading JSON from stdin";

/// Where the request specification of a `gencsr` invocation comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestSource {
    /// Re-derive the request from this certificate.
    Certificate(PathBuf),

    /// Decode a JSON request.
    Json(Source),
}

impl RequestSource {
    /// Picks the request source from the positional arguments and `--cert`, without any I/O.
    pub fn resolve(args: &[String], config: &Config) -> Result<Self> {
        if let Some(cert_file) = &config.cert_file {
            if !args.is_empty() {
                return Err(Error::Usage(
                    "no argument is accepted with '--cert', please check with usage".to_owned(),
                ));
            }

            return Ok(RequestSource::Certificate(cert_file.clone()));
        }

        match args {
            [] => Err(Error::MissingArgument("CSRJSON")),
            [csr_file] => Ok(RequestSource::Json(Source::from_arg(csr_file))),
            _ => Err(Error::Usage(
                "only one argument is accepted, please check with usage".to_owned(),
            )),
        }
    }

    /// Reads the source and normalizes it into a request.
    pub fn load(&self) -> Result<CertificateRequest> {
        match self {
            RequestSource::Certificate(cert_file) => {
                log::debug!("read cert file {}", cert_file.display());
                let cert = parse_certificate_pem(&read_file(cert_file)?)?;
                CertificateRequest::from_certificate(&cert)
            }

            RequestSource::Json(source) => {
                log::debug!("read csr file {source}");
                CertificateRequest::from_json(&source.read()?)
            }
        }
    }
}

/// Reads and normalizes the request of a `gencsr` invocation, applying `--hostname`.
pub fn prepare_csr(args: &[String], config: &Config) -> Result<CertificateRequest> {
    let source = RequestSource::resolve(args, config)?;
    load_request(&source, config)
}

fn load_request(source: &RequestSource, config: &Config) -> Result<CertificateRequest> {
    let mut req = source.load()?;

    if let Some(hostname) = config.hostname.as_deref().filter(|h| !h.is_empty()) {
        req.hosts = split_hosts(hostname);
    }

    Ok(req)
}

/// Generates a CSR and writes it PEM-encoded to `out`.
///
/// Argument conflicts are reported before the key or any input is read.
pub fn gencsr(
    args: &[String],
    config: &Config,
    encoder: &impl CsrEncoder,
    out: &mut impl Write,
) -> Result<()> {
    let source = RequestSource::resolve(args, config)?;

    log::debug!("generate signer");
    let signer = SignerIdentity::from_config(&SignerConfig::for_csr(config)?)?.into_local()?;

    let req = load_request(&source, config)?;

    let csr = encoder.encode_csr(&req, signer.signing_key())?;
    log::info!("signed CSR for {} host(s)", req.hosts.len());

    write_pem(out, CSR_LABEL, &csr)
}
