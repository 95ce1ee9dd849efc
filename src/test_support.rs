//! Throwaway keys and certificates for unit tests.

use crate::domain::types::{KeyBundleConfig, Passphrase};
use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::ec::{EcGroup, EcKey};
use openssl::hash::MessageDigest;
use openssl::nid::Nid;
use openssl::pkcs12::Pkcs12;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::{X509Builder, X509NameBuilder, X509};
use std::path::Path;

pub(crate) struct TestIdentity {
    pub key: PKey<Private>,
    pub certificate: X509,
}

impl TestIdentity {
    pub fn rsa(common_name: &str) -> Self {
        let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();
        Self::self_signed(key, common_name)
    }

    pub fn ec(common_name: &str) -> Self {
        let group = EcGroup::from_curve_name(Nid::X9_62_PRIME256V1).unwrap();
        let key = PKey::from_ec_key(EcKey::generate(&group).unwrap()).unwrap();
        Self::self_signed(key, common_name)
    }

    fn self_signed(key: PKey<Private>, common_name: &str) -> Self {
        let mut name = X509NameBuilder::new().unwrap();
        name.append_entry_by_text("CN", common_name).unwrap();
        let name = name.build();

        let mut builder = X509Builder::new().unwrap();
        builder.set_version(2).unwrap();
        let serial = BigNum::from_u32(1).unwrap().to_asn1_integer().unwrap();
        builder.set_serial_number(&serial).unwrap();
        builder.set_subject_name(&name).unwrap();
        builder.set_issuer_name(&name).unwrap();
        builder
            .set_not_before(&Asn1Time::days_from_now(0).unwrap())
            .unwrap();
        builder
            .set_not_after(&Asn1Time::days_from_now(1).unwrap())
            .unwrap();
        builder.set_pubkey(&key).unwrap();
        builder.sign(&key, MessageDigest::sha256()).unwrap();

        Self {
            key,
            certificate: builder.build(),
        }
    }

    /// Write `bundle.pfx` (key + certificate) into `dir`.
    pub fn write_bundle(&self, dir: &Path, passphrase: &str) -> KeyBundleConfig {
        let p12 = Pkcs12::builder()
            .name("test")
            .pkey(&self.key)
            .cert(&self.certificate)
            .build2(passphrase)
            .unwrap();
        let path = dir.join("bundle.pfx");
        std::fs::write(&path, p12.to_der().unwrap()).unwrap();
        KeyBundleConfig::new(path, Passphrase::new(passphrase))
    }

    /// Write `public-only.pfx` carrying the certificate but no key.
    pub fn write_bundle_without_key(&self, dir: &Path, passphrase: &str) -> KeyBundleConfig {
        let p12 = Pkcs12::builder()
            .name("public")
            .cert(&self.certificate)
            .build2(passphrase)
            .unwrap();
        let path = dir.join("public-only.pfx");
        std::fs::write(&path, p12.to_der().unwrap()).unwrap();
        KeyBundleConfig::new(path, Passphrase::new(passphrase))
    }

    /// Write the public certificate as `public.crt` (PEM).
    pub fn write_certificate(&self, dir: &Path) -> std::path::PathBuf {
        let path = dir.join("public.crt");
        std::fs::write(&path, self.certificate.to_pem().unwrap()).unwrap();
        path
    }
}
