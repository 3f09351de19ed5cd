//! Writing signed artifacts out.

use std::io::Write;

use crate::error::{Error, Result};

/// PEM label of a certificate revocation list.
pub const CRL_LABEL: &str = "X509 CRL";

/// PEM label of a certificate signing request.
pub const CSR_LABEL: &str = "CERTIFICATE REQUEST";

/// PEM-wraps `der` under `label` with LF line endings.
pub fn encode_pem(label: &str, der: &[u8]) -> Result<String> {
    pem::encode_string(label, pem::LineEnding::LF, der)
        .map_err(|err| Error::encoding("PEM encode", err))
}

/// Writes `der` PEM-wrapped to `out` in one go.
pub fn write_pem(out: &mut impl Write, label: &str, der: &[u8]) -> Result<()> {
    let pem = encode_pem(label, der)?;

    out.write_all(pem.as_bytes())
        .and_then(|()| out.flush())
        .map_err(|err| Error::io("<stdout>", err))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pem_wrapped() {
        let mut out = Vec::new();
        write_pem(&mut out, CRL_LABEL, b"\x30\x03\x02\x01\x01").unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.starts_with("-----BEGIN X509 CRL-----\n"));
        assert!(out.ends_with("-----END X509 CRL-----\n"));

        let (label, der) = pem::decode_vec(out.as_bytes()).unwrap();
        assert_eq!(label, CRL_LABEL);
        assert_eq!(der, b"\x30\x03\x02\x01\x01");
    }

    #[test]
    fn write_failure_is_io() {
        struct Broken;

        impl Write for Broken {
            fn write(&mut self, _: &[u8]) -> std::io::Result<usize> {
                Err(std::io::ErrorKind::BrokenPipe.into())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        assert!(matches!(
            write_pem(&mut Broken, CSR_LABEL, b"\x05\x00"),
            Err(Error::Io { .. })
        ));
    }
}
