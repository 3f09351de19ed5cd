//! The `gencrl` and `gencsr` commands.
//!
//! Both follow the same flow: resolve the input, normalize it into a canonical request, resolve
//! the signing identity, encode and sign, then emit. The first failure aborts the command and
//! nothing is written.

pub mod gencrl;
pub mod gencsr;

pub use self::{gencrl::gencrl, gencsr::gencsr};

#[cfg(test)]
mod stub {
    use std::cell::RefCell;

    use p256::ecdsa::SigningKey;

    use crate::{
        crl::RevocationRequest,
        csr::CertificateRequest,
        encoder::{CrlEncoder, CsrEncoder},
        error::{Error, Result},
    };

    /// Records the request it was handed and returns fixed bytes.
    #[derive(Default)]
    pub(super) struct StubEncoder {
        pub crl: RefCell<Option<RevocationRequest>>,
        pub csr: RefCell<Option<CertificateRequest>>,
        pub fail: bool,
    }

    impl StubEncoder {
        pub fn failing() -> Self {
            StubEncoder {
                fail: true,
                ..StubEncoder::default()
            }
        }

        fn output(&self) -> Result<Vec<u8>> {
            if self.fail {
                Err(Error::Encoding("stub rejected request".to_owned()))
            } else {
                Ok(b"\x30\x00".to_vec())
            }
        }
    }

    impl CrlEncoder for StubEncoder {
        fn encode_crl(&self, req: &RevocationRequest, _: &SigningKey) -> Result<Vec<u8>> {
            *self.crl.borrow_mut() = Some(req.clone());
            self.output()
        }
    }

    impl CsrEncoder for StubEncoder {
        fn encode_csr(&self, req: &CertificateRequest, _: &SigningKey) -> Result<Vec<u8>> {
            *self.csr.borrow_mut() = Some(req.clone());
            self.output()
        }
    }
}
