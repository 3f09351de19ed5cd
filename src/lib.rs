//! Generating Certificate Revocation Lists (CRLs) and Certificate Signing Requests (CSRs).
//!
//! Two commands share one shape: resolve the input, normalize it into a canonical request,
//! resolve the signing identity, encode and sign, then emit the PEM result.
//!
//! # CRLs
//!
//! [`cmd::gencrl`] reads a text file with one decimal serial number per line (`-` reads standard
//! input) and an optional validity in seconds, and signs a CRL with the CA key for the issuer
//! named by `--cert` (or `--ca`).
//!
//! # CSRs
//!
//! [`cmd::gencsr`] builds a CSR signed by `--key`, either from a JSON request document or, with
//! `--cert`, re-derived from an already issued certificate. `--hostname` replaces the hosts of
//! the request.
//!
//! # Encoders
//!
//! The commands hand their canonical requests to a [`CrlEncoder`] / [`CsrEncoder`].
//! [`X509Encoder`] is the implementation used by the `pkigen` binary.
//!
//! Only P-256 ECDSA signing keys are supported.

#![deny(rust_2018_idioms, nonstandard_style, future_incompatible)]

mod cert;
mod config;
mod encoder;
mod error;
mod signer;

pub mod cmd;
pub mod crl;
pub mod csr;
pub mod emit;
pub mod input;


pub use crate::{
    cert::parse_certificate_pem,
    config::{Config, ConfigFile, Signing, SigningProfile},
    encoder::{CrlEncoder, CsrEncoder, X509Encoder},
    error::{Error, Result},
    signer::{
        create_p256_key, signing_key_from_pem, LocalSigner, RemoteSigner, SignerConfig,
        SignerIdentity,
    },
};
