//! Encode/sign capabilities the commands hand their canonical requests to.

use std::time::SystemTime;

use der::Encode as _;
use p256::ecdsa::SigningKey;

use crate::{
    crl::{self, RevocationRequest},
    csr::{self, CertificateRequest},
    error::{Error, Result},
};

/// Produces a signed, DER encoded CRL.
pub trait CrlEncoder {
    fn encode_crl(&self, req: &RevocationRequest, signing_key: &SigningKey) -> Result<Vec<u8>>;
}

/// Produces a signed, DER encoded CSR.
pub trait CsrEncoder {
    fn encode_csr(&self, req: &CertificateRequest, signing_key: &SigningKey) -> Result<Vec<u8>>;
}

/// Encoder backed by the `x509-cert` builders.
///
/// CRLs are stamped with the current time when encoded.
#[derive(Debug, Clone, Copy, Default)]
pub struct X509Encoder;

impl CrlEncoder for X509Encoder {
    fn encode_crl(&self, req: &RevocationRequest, signing_key: &SigningKey) -> Result<Vec<u8>> {
        let crl = crl::build_crl(req, signing_key, SystemTime::now())?;
        crl.to_der().map_err(|err| Error::encoding("encode CRL", err))
    }
}

impl CsrEncoder for X509Encoder {
    fn encode_csr(&self, req: &CertificateRequest, signing_key: &SigningKey) -> Result<Vec<u8>> {
        let csr = csr::build_csr(req, signing_key)?;
        csr.to_der().map_err(|err| Error::encoding("encode CSR", err))
    }
}
