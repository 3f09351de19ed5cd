use std::io::{BufReader, Cursor};

use const_oid::AssociatedOid;
use der::Decode;

use crate::error::{Error, Result};

/// Parses the first `CERTIFICATE` block of a PEM bundle.
///
/// Bundles holding a chain are accepted; the leaf is expected first.
pub fn parse_certificate_pem(pem: &[u8]) -> Result<x509_cert::Certificate> {
    let mut rdr = BufReader::new(Cursor::new(pem));

    let cert_ee = rustls_pemfile::certs(&mut rdr)
        .next() // EE cert is first
        .ok_or_else(|| Error::Parse("no certificate found in PEM input".to_owned()))?
        .map_err(|err| Error::parse("read certificate PEM", err))?;

    x509_cert::Certificate::from_der(&cert_ee)
        .map_err(|err| Error::parse("decode certificate", err))
}

/// Finds and decodes the extension of type `T`, if the certificate carries one.
pub(crate) fn find_extension<T>(cert: &x509_cert::Certificate) -> Result<Option<T>>
where
    T: AssociatedOid + for<'a> Decode<'a>,
{
    let Some(extensions) = &cert.tbs_certificate.extensions else {
        return Ok(None);
    };

    extensions
        .iter()
        .find(|ext| ext.extn_id == T::OID)
        .map(|ext| T::from_der(ext.extn_value.as_bytes()))
        .transpose()
        .map_err(|err| Error::parse(&format!("decode extension {}", T::OID), err))
}
