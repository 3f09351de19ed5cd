//! Certificate Signing Request specifications.
//!
//! A [`CertificateRequest`] is either read from a JSON document:
//!
//! ```json
//! {
//!   "CN": "www.example.com",
//!   "names": [{ "C": "SE", "ST": "Stockholm", "L": "Stockholm", "O": "Example", "OU": "Web" }],
//!   "hosts": ["www.example.com", "10.0.0.1", "admin@example.com"],
//!   "key": { "algo": "ecdsa", "size": 256 }
//! }
//! ```
//!
//! or re-derived from an already issued certificate with
//! [`CertificateRequest::from_certificate`].

use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

use const_oid::{
    db::{rfc4519, rfc5912},
    ObjectIdentifier,
};
use der::{asn1::UintRef, Decode as _, Sequence, Tag, Tagged as _};
use serde::{Deserialize, Serialize};
use x509_cert::{
    ext::pkix::{name::GeneralName, SubjectAltName},
    spki::SubjectPublicKeyInfoOwned,
};

use crate::{
    cert::find_extension,
    error::{Error, Result},
};

mod encode;

pub(crate) use self::encode::build_csr;

/// `emailAddress` attribute (PKCS #9).
pub(crate) const EMAIL_ADDRESS: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.9.1");

/// Key algorithm and size the request is made for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyRequest {
    pub algo: String,
    pub size: usize,
}

impl KeyRequest {
    pub fn ecdsa(size: usize) -> Self {
        KeyRequest {
            algo: "ecdsa".to_owned(),
            size,
        }
    }

    pub fn rsa(size: usize) -> Self {
        KeyRequest {
            algo: "rsa".to_owned(),
            size,
        }
    }
}

impl Default for KeyRequest {
    fn default() -> Self {
        KeyRequest::ecdsa(256)
    }
}

/// One set of subject attributes; empty fields are left out of the subject.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Name {
    /// Country.
    #[serde(rename = "C", default, skip_serializing_if = "String::is_empty")]
    pub country: String,

    /// State or province.
    #[serde(rename = "ST", default, skip_serializing_if = "String::is_empty")]
    pub province: String,

    /// Locality.
    #[serde(rename = "L", default, skip_serializing_if = "String::is_empty")]
    pub locality: String,

    /// Organization.
    #[serde(rename = "O", default, skip_serializing_if = "String::is_empty")]
    pub organization: String,

    /// Organizational unit.
    #[serde(rename = "OU", default, skip_serializing_if = "String::is_empty")]
    pub organizational_unit: String,

    /// Email address.
    #[serde(rename = "E", default, skip_serializing_if = "String::is_empty")]
    pub email: String,
}

/// Canonical CSR specification handed to the encoder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertificateRequest {
    /// Subject common name.
    #[serde(rename = "CN", default)]
    pub common_name: String,

    #[serde(default)]
    pub names: Vec<Name>,

    /// DNS names, IP addresses, email addresses and URIs for the SAN extension.
    #[serde(default)]
    pub hosts: Vec<String>,

    #[serde(rename = "key", default)]
    pub key_request: KeyRequest,

    /// Subject serial number attribute (not the certificate serial).
    #[serde(rename = "serialnumber", default, skip_serializing_if = "String::is_empty")]
    pub serial_number: String,
}

impl CertificateRequest {
    /// Decodes a JSON request; an absent `key` keeps the default key request.
    ///
    /// The document must be a JSON object.
    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        let doc = serde_json::from_slice::<serde_json::Value>(bytes)
            .map_err(|err| Error::parse("CSR JSON", err))?;

        if !doc.is_object() {
            return Err(Error::Parse(
                "CSR JSON: expected an object at the top level".to_owned(),
            ));
        }

        serde_json::from_value(doc).map_err(|err| Error::parse("CSR JSON", err))
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|err| Error::parse("CSR JSON", err))
    }

    /// Re-derives the request an issued certificate was made from.
    ///
    /// Subject attributes with several values are spread over several [`Name`]s by position.
    pub fn from_certificate(cert: &x509_cert::Certificate) -> Result<Self> {
        let tbs = &cert.tbs_certificate;

        let mut req = CertificateRequest::default();
        let mut attrs = SubjectAttrs::default();

        for atv in tbs.subject.0.iter().flat_map(|rdn| rdn.0.iter()) {
            let oid = atv.oid;
            let known = oid == rfc4519::CN
                || oid == rfc4519::SERIAL_NUMBER
                || attrs.values_mut(oid).is_some();

            if !known {
                log::debug!("skipping subject attribute {oid}");
                continue;
            }

            let Some(value) = attribute_string(atv.value.tag(), atv.value.value()) else {
                log::warn!(
                    "skipping subject attribute {oid} with unsupported encoding {}",
                    atv.value.tag()
                );
                continue;
            };

            if oid == rfc4519::CN {
                req.common_name = value;
            } else if oid == rfc4519::SERIAL_NUMBER {
                req.serial_number = value;
            } else if let Some(values) = attrs.values_mut(oid) {
                values.push(value);
            }
        }

        req.names = attrs.into_names();

        if let Some(SubjectAltName(names)) = find_extension::<SubjectAltName>(cert)? {
            req.hosts = names.iter().filter_map(host_of).collect();
        }

        if let Some(key_request) = key_request_of(&tbs.subject_public_key_info)? {
            req.key_request = key_request;
        }

        Ok(req)
    }
}

#[derive(Default)]
struct SubjectAttrs {
    country: Vec<String>,
    province: Vec<String>,
    locality: Vec<String>,
    organization: Vec<String>,
    organizational_unit: Vec<String>,
    email: Vec<String>,
}

impl SubjectAttrs {
    fn values_mut(&mut self, oid: ObjectIdentifier) -> Option<&mut Vec<String>> {
        let values = if oid == rfc4519::C {
            &mut self.country
        } else if oid == rfc4519::ST {
            &mut self.province
        } else if oid == rfc4519::L {
            &mut self.locality
        } else if oid == rfc4519::O {
            &mut self.organization
        } else if oid == rfc4519::OU {
            &mut self.organizational_unit
        } else if oid == EMAIL_ADDRESS {
            &mut self.email
        } else {
            return None;
        };

        Some(values)
    }

    fn into_names(self) -> Vec<Name> {
        let count = [
            self.country.len(),
            self.province.len(),
            self.locality.len(),
            self.organization.len(),
            self.organizational_unit.len(),
            self.email.len(),
        ]
        .into_iter()
        .max()
        .unwrap_or(0);

        let mut country = self.country.into_iter();
        let mut province = self.province.into_iter();
        let mut locality = self.locality.into_iter();
        let mut organization = self.organization.into_iter();
        let mut organizational_unit = self.organizational_unit.into_iter();
        let mut email = self.email.into_iter();

        (0..count)
            .map(|_| Name {
                country: country.next().unwrap_or_default(),
                province: province.next().unwrap_or_default(),
                locality: locality.next().unwrap_or_default(),
                organization: organization.next().unwrap_or_default(),
                organizational_unit: organizational_unit.next().unwrap_or_default(),
                email: email.next().unwrap_or_default(),
            })
            .collect()
    }
}

/// Decodes a directory string value; invalid characters are replaced, not rejected.
fn attribute_string(tag: Tag, value: &[u8]) -> Option<String> {
    match tag {
        Tag::Utf8String
        | Tag::PrintableString
        | Tag::Ia5String
        | Tag::TeletexString
        | Tag::VisibleString
        | Tag::NumericString => Some(String::from_utf8_lossy(value).into_owned()),

        // UCS-2, big endian
        Tag::BmpString => {
            let units = value
                .chunks(2)
                .map(|pair| u16::from_be_bytes([pair[0], pair.get(1).copied().unwrap_or(0)]));

            Some(
                char::decode_utf16(units)
                    .map(|ch| ch.unwrap_or(char::REPLACEMENT_CHARACTER))
                    .collect(),
            )
        }

        _ => None,
    }
}

fn host_of(name: &GeneralName) -> Option<String> {
    match name {
        GeneralName::DnsName(dns) => Some(dns.to_string()),
        GeneralName::Rfc822Name(email) => Some(email.to_string()),
        GeneralName::UniformResourceIdentifier(uri) => Some(uri.to_string()),
        GeneralName::IpAddress(octets) => ip_of(octets.as_bytes()).map(|ip| ip.to_string()),
        _ => None,
    }
}

fn ip_of(octets: &[u8]) -> Option<IpAddr> {
    if let Ok(v4) = <[u8; 4]>::try_from(octets) {
        return Some(IpAddr::V4(Ipv4Addr::from(v4)));
    }

    <[u8; 16]>::try_from(octets)
        .ok()
        .map(|v6| IpAddr::V6(Ipv6Addr::from(v6)))
}

/// `RSAPublicKey` as defined in RFC 8017; only the modulus size is of interest.
#[derive(Sequence)]
struct RsaPublicKey<'a> {
    modulus: UintRef<'a>,
    _public_exponent: UintRef<'a>,
}

fn key_request_of(spki: &SubjectPublicKeyInfoOwned) -> Result<Option<KeyRequest>> {
    let oid = spki.algorithm.oid;

    if oid == rfc5912::ID_EC_PUBLIC_KEY {
        let curve = spki
            .algorithm
            .parameters
            .as_ref()
            .map(|params| params.decode_as::<ObjectIdentifier>())
            .transpose()
            .map_err(|err| Error::parse("EC parameters", err))?;

        let size = match curve {
            Some(curve) if curve == rfc5912::SECP_256_R_1 => 256,
            Some(curve) if curve == rfc5912::SECP_384_R_1 => 384,
            Some(curve) if curve == rfc5912::SECP_521_R_1 => 521,
            _ => return Ok(None),
        };

        return Ok(Some(KeyRequest::ecdsa(size)));
    }

    if oid == rfc5912::RSA_ENCRYPTION {
        let key = RsaPublicKey::from_der(spki.subject_public_key.raw_bytes())
            .map_err(|err| Error::parse("RSA public key", err))?;

        let modulus = key.modulus.as_bytes();
        let bits = match modulus.first() {
            Some(first) => (modulus.len() - 1) * 8 + (8 - first.leading_zeros() as usize),
            None => 0,
        };

        return Ok(Some(KeyRequest::rsa(bits)));
    }

    Ok(None)
}

/// Splits a hostname override into hosts.
///
/// Tokens are comma separated, trimmed, and empty tokens are dropped.
pub fn split_hosts(hosts: &str) -> Vec<String> {
    hosts
        .split(',')
        .map(str::trim)
        .filter(|host| !host.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}
