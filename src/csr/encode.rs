use std::net::IpAddr;

use const_oid::{db::rfc4519, ObjectIdentifier};
use der::{
    asn1::{
        Any, Ia5String, Ia5StringRef, OctetString, PrintableStringRef, SetOfVec, Utf8StringRef,
    },
    Tag,
};
use p256::ecdsa::{DerSignature, SigningKey};
use x509_cert::{
    attr::AttributeTypeAndValue,
    builder::{Builder as _, RequestBuilder as CsrBuilder},
    ext::pkix::{name::GeneralName, SubjectAltName},
    name::{Name, RdnSequence, RelativeDistinguishedName},
    request::CertReq,
};

use super::{CertificateRequest, KeyRequest, EMAIL_ADDRESS};
use crate::error::{Error, Result};

/// Creates a CSR for `req` and signs it with `signer`.
///
/// All hosts are added to a Subject Alternative Name (SAN) extension. The public key is always
/// the one of `signer`, whatever key request `req` carries.
pub(crate) fn build_csr(req: &CertificateRequest, signer: &SigningKey) -> Result<CertReq> {
    if req.key_request != KeyRequest::default() {
        log::warn!(
            "key request {}/{} ignored, the request is made for the ecdsa/256 signing key",
            req.key_request.algo,
            req.key_request.size
        );
    }

    let subject = subject_of(req)?;
    if subject.0.is_empty() && req.hosts.is_empty() {
        return Err(Error::Encoding(
            "request has neither subject nor hosts".to_owned(),
        ));
    }

    let mut csr =
        CsrBuilder::new(subject, signer).map_err(|err| Error::encoding("create csr", err))?;

    if !req.hosts.is_empty() {
        let names = req
            .hosts
            .iter()
            .map(|host| general_name(host))
            .collect::<Result<Vec<_>>>()?;

        csr.add_extension(&SubjectAltName(names))
            .map_err(|err| Error::encoding("subjectAltName", err))?;
    }

    csr.build::<DerSignature>()
        .map_err(|err| Error::encoding("build csr", err))
}

fn subject_of(req: &CertificateRequest) -> Result<Name> {
    let mut rdns = Vec::new();

    for name in &req.names {
        push_attr(&mut rdns, rfc4519::C, &name.country, Tag::PrintableString)?;
        push_attr(&mut rdns, rfc4519::ST, &name.province, Tag::Utf8String)?;
        push_attr(&mut rdns, rfc4519::L, &name.locality, Tag::Utf8String)?;
        push_attr(&mut rdns, rfc4519::O, &name.organization, Tag::Utf8String)?;
        push_attr(&mut rdns, rfc4519::OU, &name.organizational_unit, Tag::Utf8String)?;
        push_attr(&mut rdns, EMAIL_ADDRESS, &name.email, Tag::Ia5String)?;
    }

    push_attr(
        &mut rdns,
        rfc4519::SERIAL_NUMBER,
        &req.serial_number,
        Tag::PrintableString,
    )?;
    push_attr(&mut rdns, rfc4519::CN, &req.common_name, Tag::Utf8String)?;

    Ok(RdnSequence(rdns))
}

/// Appends `value` as a single-attribute RDN; empty values are skipped.
fn push_attr(
    rdns: &mut Vec<RelativeDistinguishedName>,
    oid: ObjectIdentifier,
    value: &str,
    tag: Tag,
) -> Result<()> {
    if value.is_empty() {
        return Ok(());
    }

    let invalid =
        |err: der::Error| Error::encoding(&format!("subject attribute {oid} '{value}'"), err);

    // validate the character set before wrapping the raw bytes
    let checked = match tag {
        Tag::PrintableString => PrintableStringRef::new(value).map(drop),
        Tag::Ia5String => Ia5StringRef::new(value).map(drop),
        _ => Utf8StringRef::new(value).map(drop),
    };
    checked.map_err(invalid)?;

    let atv = AttributeTypeAndValue {
        oid,
        value: Any::new(tag, value.as_bytes()).map_err(invalid)?,
    };

    let rdn = SetOfVec::try_from(vec![atv]).map_err(invalid)?;
    rdns.push(RelativeDistinguishedName(rdn));

    Ok(())
}

/// IP addresses, then email addresses (`@`), then URIs (`://`); anything else is a DNS name.
fn general_name(host: &str) -> Result<GeneralName> {
    if let Ok(ip) = host.parse::<IpAddr>() {
        let octets = match ip {
            IpAddr::V4(v4) => v4.octets().to_vec(),
            IpAddr::V6(v6) => v6.octets().to_vec(),
        };

        return OctetString::new(octets)
            .map(GeneralName::IpAddress)
            .map_err(|err| Error::encoding(&format!("host '{host}'"), err));
    }

    let ia5 =
        Ia5String::new(host).map_err(|err| Error::encoding(&format!("host '{host}'"), err))?;

    Ok(if host.contains('@') {
        GeneralName::Rfc822Name(ia5)
    } else if host.contains("://") {
        GeneralName::UniformResourceIdentifier(ia5)
    } else {
        GeneralName::DnsName(ia5)
    })
}
