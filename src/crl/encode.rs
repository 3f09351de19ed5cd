use std::time::SystemTime;

use const_oid::AssociatedOid as _;
use der::{
    asn1::{BitString, OctetString},
    Encode as _,
};
use num_bigint::BigUint;
use p256::ecdsa::{signature::Signer as _, DerSignature, SigningKey};
use x509_cert::{
    crl::{CertificateList, RevokedCert, TbsCertList},
    ext::{
        pkix::{AuthorityKeyIdentifier, SubjectKeyIdentifier},
        Extension,
    },
    serial_number::SerialNumber,
    spki::DynSignatureAlgorithmIdentifier as _,
    time::Time,
    Version,
};

use super::RevocationRequest;
use crate::{
    cert::{find_extension, parse_certificate_pem},
    error::{Error, Result},
};

/// Builds and signs a v2 CRL revoking every serial of `req` at `now`.
pub(crate) fn build_crl(
    req: &RevocationRequest,
    signing_key: &SigningKey,
    now: SystemTime,
) -> Result<CertificateList> {
    let issuer = parse_certificate_pem(req.issuer_certificate())?;

    let this_update = Time::try_from(now).map_err(|err| Error::encoding("thisUpdate", err))?;
    let window = req.validity().window();
    let next_update = now.checked_add(window).ok_or_else(|| {
        Error::Encoding(format!(
            "nextUpdate: validity of {}s is out of range",
            window.as_secs()
        ))
    })?;
    let next_update =
        Time::try_from(next_update).map_err(|err| Error::encoding("nextUpdate", err))?;

    let revoked = req
        .serial_numbers()
        .iter()
        .map(|serial| {
            Ok(RevokedCert {
                serial_number: parse_serial(serial)?,
                revocation_date: this_update,
                crl_entry_extensions: None,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let crl_extensions = match find_extension::<SubjectKeyIdentifier>(&issuer)? {
        Some(ski) => Some(vec![authority_key_id(ski)?]),
        None => None,
    };

    let signature_algorithm = signing_key
        .signature_algorithm_identifier()
        .map_err(|err| Error::encoding("signature algorithm", err))?;

    let tbs_cert_list = TbsCertList {
        version: Version::V2,
        signature: signature_algorithm.clone(),
        issuer: issuer.tbs_certificate.subject,
        this_update,
        next_update: Some(next_update),
        // an empty sequence must be omitted rather than encoded
        revoked_certificates: (!revoked.is_empty()).then_some(revoked),
        crl_extensions,
    };

    let tbs_der = tbs_cert_list
        .to_der()
        .map_err(|err| Error::encoding("encode tbsCertList", err))?;

    let signature: DerSignature = signing_key
        .try_sign(&tbs_der)
        .map_err(|err| Error::encoding("sign CRL", err))?;

    let signature = BitString::from_bytes(signature.as_bytes())
        .map_err(|err| Error::encoding("signature value", err))?;

    Ok(CertificateList {
        tbs_cert_list,
        signature_algorithm,
        signature,
    })
}

/// Decimal serial number to its certificate serial number encoding (at most 20 octets).
fn parse_serial(serial: &str) -> Result<SerialNumber> {
    let value = serial
        .bytes()
        .all(|b| b.is_ascii_digit())
        .then(|| BigUint::parse_bytes(serial.as_bytes(), 10))
        .flatten()
        .ok_or_else(|| Error::Encoding(format!("invalid serial number '{serial}'")))?;

    SerialNumber::new(&value.to_bytes_be())
        .map_err(|err| Error::encoding(&format!("serial number '{serial}'"), err))
}

fn authority_key_id(ski: SubjectKeyIdentifier) -> Result<Extension> {
    let aki = AuthorityKeyIdentifier {
        key_identifier: Some(ski.0),
        authority_cert_issuer: None,
        authority_cert_serial_number: None,
    };

    let extn_value = aki
        .to_der()
        .and_then(OctetString::new)
        .map_err(|err| Error::encoding("authorityKeyIdentifier", err))?;

    Ok(Extension {
        extn_id: AuthorityKeyIdentifier::OID,
        critical: false,
        extn_value,
    })
}
