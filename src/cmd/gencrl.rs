//! `gencrl`: generate a new Certificate Revocation List.

use std::io::Write;

use crate::{
    crl::{parse_serial_list, CrlValidity, RevocationRequest},
    emit::{write_pem, CRL_LABEL},
    encoder::CrlEncoder,
    error::{Error, Result},
    input::{read_file, Source},
    signer::{SignerConfig, SignerIdentity},
    Config,
};

pub const USAGE: &str = "\
Usage of gencrl:
        pkigen gencrl INPUTFILE TIME

Arguments:
        INPUTFILE:               Text file with one serial number per line, use '-' for reading text from stdin
        TIME (OPTIONAL):         The desired expiration from now, in seconds";

/// Reads and normalizes the revocation request of a `gencrl` invocation.
///
/// `args` are the positional arguments: `INPUTFILE [TIME]`. The issuer certificate comes from
/// `cert_file`, falling back to `ca_file`.
pub fn prepare_crl(args: &[String], config: &Config) -> Result<RevocationRequest> {
    let (serial_list, rest) = args
        .split_first()
        .ok_or(Error::MissingArgument("INPUTFILE"))?;

    let validity = CrlValidity::from_arg(rest.first().map(String::as_str))?;
    if rest.len() > 1 {
        log::warn!("ignoring {} extra argument(s)", rest.len() - 1);
    }

    let source = Source::from_arg(serial_list);
    log::debug!("read seriallist file {source}");
    let serial_list = source.read()?;

    let cert_file = config
        .cert_file
        .as_ref()
        .or(config.ca_file.as_ref())
        .ok_or(Error::MissingArgument("certificate file (--cert or --ca)"))?;
    log::debug!("read cert file {}", cert_file.display());
    let issuer_certificate = read_file(cert_file)?;

    RevocationRequest::new(parse_serial_list(&serial_list), issuer_certificate, validity)
}

/// Generates a CRL and writes it PEM-encoded to `out`.
pub fn gencrl(
    args: &[String],
    config: &Config,
    encoder: &impl CrlEncoder,
    out: &mut impl Write,
) -> Result<()> {
    let req = prepare_crl(args, config)?;

    log::debug!("generate signer");
    let signer = SignerIdentity::from_config(&SignerConfig::for_crl(config)?)?.into_local()?;

    let crl = encoder.encode_crl(&req, signer.signing_key())?;
    log::info!(
        "signed CRL with {} revoked serial(s)",
        req.serial_numbers().len()
    );

    write_pem(out, CRL_LABEL, &crl)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use der::Decode as _;
    use num_bigint::BigUint;
    use x509_cert::crl::CertificateList;

    use super::*;
    use crate::{
        cmd::stub::StubEncoder,
        encoder::X509Encoder,
        test::{args, Issuer, Workdir},
    };

    #[test]
    fn default_validity_from_ca_file() {
        let work = Workdir::new();
        let issuer = Issuer::new("Test CA");
        let config = work.ca_config(&issuer);
        let serials = work.write("serials.txt", "1001\n1002\n");

        let req = prepare_crl(&args(&[serials.to_str().unwrap()]), &config).unwrap();
        assert_eq!(req.serial_numbers(), ["1001", "1002"]);
        assert_eq!(req.validity(), CrlValidity::default());
        assert_eq!(req.issuer_certificate(), issuer.cert_pem.as_bytes());
    }

    #[test]
    fn cert_file_preferred_over_ca_file() {
        let work = Workdir::new();
        let ca = Issuer::new("Test CA");
        let other = Issuer::new("Other");
        let config = Config {
            cert_file: Some(work.write("other.pem", &other.cert_pem)),
            ..work.ca_config(&ca)
        };
        let serials = work.write("serials.txt", "1\n");

        let req = prepare_crl(&args(&[serials.to_str().unwrap()]), &config).unwrap();
        assert_eq!(req.issuer_certificate(), other.cert_pem.as_bytes());
    }

    #[test]
    fn time_argument_trimmed() {
        let work = Workdir::new();
        let config = work.ca_config(&Issuer::new("Test CA"));
        let serials = work.write("serials.txt", "1\n");

        let req = prepare_crl(&args(&[serials.to_str().unwrap(), " 86400\n"]), &config).unwrap();
        assert_eq!(req.validity(), CrlValidity::from_secs(86400));
    }

    #[test]
    fn missing_input_file_argument() {
        let work = Workdir::new();
        let config = work.ca_config(&Issuer::new("Test CA"));

        assert!(matches!(
            prepare_crl(&[], &config),
            Err(Error::MissingArgument("INPUTFILE"))
        ));
    }

    #[test]
    fn unreadable_inputs() {
        let work = Workdir::new();
        let serials = work.write("serials.txt", "1\n");

        let config = Config {
            ca_file: Some(work.path("missing-ca.pem")),
            ..Config::default()
        };
        assert!(matches!(
            prepare_crl(&args(&[serials.to_str().unwrap()]), &config),
            Err(Error::Io { path, .. }) if path == work.path("missing-ca.pem")
        ));

        let config = work.ca_config(&Issuer::new("Test CA"));
        let missing = work.path("missing.txt");
        assert!(matches!(
            prepare_crl(&args(&[missing.to_str().unwrap()]), &config),
            Err(Error::Io { .. })
        ));

        assert!(matches!(
            prepare_crl(&args(&[serials.to_str().unwrap()]), &Config::default()),
            Err(Error::MissingArgument(_))
        ));
    }

    #[test]
    fn stub_receives_request() {
        let work = Workdir::new();
        let config = work.ca_config(&Issuer::new("Test CA"));
        let serials = work.write("serials.txt", "5\n\n6\n5\n");
        let encoder = StubEncoder::default();

        let mut out = Vec::new();
        gencrl(&args(&[serials.to_str().unwrap()]), &config, &encoder, &mut out).unwrap();

        let req = encoder.crl.borrow().clone().unwrap();
        assert_eq!(req.serial_numbers(), ["5", "6", "5"]);
        assert!(String::from_utf8(out)
            .unwrap()
            .starts_with("-----BEGIN X509 CRL-----"));
    }

    #[test]
    fn encoder_failure_writes_nothing() {
        let work = Workdir::new();
        let config = work.ca_config(&Issuer::new("Test CA"));
        let serials = work.write("serials.txt", "1\n");

        let mut out = Vec::new();
        let res = gencrl(
            &args(&[serials.to_str().unwrap()]),
            &config,
            &StubEncoder::failing(),
            &mut out,
        );
        assert!(matches!(res, Err(Error::Encoding(_))));
        assert!(out.is_empty());
    }

    #[test]
    fn remote_signer_rejected() {
        let work = Workdir::new();
        let config = Config {
            remote: Some("127.0.0.1:8888".to_owned()),
            ..work.ca_config(&Issuer::new("Test CA"))
        };
        let serials = work.write("serials.txt", "1\n");

        let mut out = Vec::new();
        let res = gencrl(
            &args(&[serials.to_str().unwrap()]),
            &config,
            &StubEncoder::default(),
            &mut out,
        );
        assert!(matches!(res, Err(Error::Internal(_))));
        assert!(out.is_empty());
    }

    #[test]
    fn signed_crl_end_to_end() {
        let work = Workdir::new();
        let config = work.ca_config(&Issuer::new("Test CA"));
        let serials = work.write("serials.txt", "1001\r\n1002\r\n");

        let mut out = Vec::new();
        gencrl(
            &args(&[serials.to_str().unwrap(), "3600"]),
            &config,
            &X509Encoder,
            &mut out,
        )
        .unwrap();

        let (label, der) = pem::decode_vec(&out).unwrap();
        assert_eq!(label, "X509 CRL");

        let crl = CertificateList::from_der(&der).unwrap();
        let tbs = crl.tbs_cert_list;
        let serials = tbs
            .revoked_certificates
            .unwrap()
            .iter()
            .map(|rc| BigUint::from_bytes_be(rc.serial_number.as_bytes()))
            .collect::<Vec<_>>();
        assert_eq!(serials, [BigUint::from(1001u32), BigUint::from(1002u32)]);
        assert_eq!(
            tbs.next_update.unwrap().to_unix_duration() - tbs.this_update.to_unix_duration(),
            Duration::from_secs(3600)
        );
    }

    #[test]
    fn huge_time_writes_nothing() {
        let work = Workdir::new();
        let config = work.ca_config(&Issuer::new("Test CA"));
        let serials = work.write("serials.txt", "1001\n");

        let mut out = Vec::new();
        let res = gencrl(
            &args(&[serials.to_str().unwrap(), "18446744073709551615"]),
            &config,
            &X509Encoder,
            &mut out,
        );
        assert!(matches!(res, Err(Error::Encoding(_))));
        assert!(out.is_empty());
    }

    #[test]
    fn invalid_serial_writes_nothing() {
        let work = Workdir::new();
        let config = work.ca_config(&Issuer::new("Test CA"));
        let serials = work.write("serials.txt", "1001\nnot-a-number\n");

        let mut out = Vec::new();
        let res = gencrl(
            &args(&[serials.to_str().unwrap()]),
            &config,
            &X509Encoder,
            &mut out,
        );
        assert!(matches!(res, Err(Error::Encoding(_))));
        assert!(out.is_empty());
    }
}
