//! Shared fixtures for integration tests.
//!
//! Generates a throwaway RSA identity and writes it out the way a deployment
//! would hold it: a password-protected PKCS#12 bundle plus a public-only
//! PEM certificate.

#![allow(dead_code)]

use external_signer::{KeyBundleConfig, Passphrase};
use openssl::asn1::Asn1Time;
use openssl::bn::BigNum;
use openssl::hash::MessageDigest;
use openssl::pkcs12::Pkcs12;
use openssl::pkey::{PKey, Private};
use openssl::rsa::Rsa;
use openssl::x509::{X509Builder, X509NameBuilder, X509};
use std::path::PathBuf;
use tempfile::TempDir;

pub const PASSPHRASE: &str = "johndoe";

pub struct SigningFixture {
    pub dir: TempDir,
    pub key: PKey<Private>,
    pub certificate: X509,
    pub bundle_path: PathBuf,
    pub keyless_bundle_path: PathBuf,
    pub certificate_path: PathBuf,
}

impl SigningFixture {
    pub fn new(common_name: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let key = PKey::from_rsa(Rsa::generate(2048).unwrap()).unwrap();
        let certificate = self_signed(&key, common_name);

        let bundle = Pkcs12::builder()
            .name(common_name)
            .pkey(&key)
            .cert(&certificate)
            .build2(PASSPHRASE)
            .unwrap();
        let bundle_path = dir.path().join("JohnDoe.pfx");
        std::fs::write(&bundle_path, bundle.to_der().unwrap()).unwrap();

        let keyless = Pkcs12::builder()
            .name(common_name)
            .cert(&certificate)
            .build2(PASSPHRASE)
            .unwrap();
        let keyless_bundle_path = dir.path().join("PublicOnly.pfx");
        std::fs::write(&keyless_bundle_path, keyless.to_der().unwrap()).unwrap();

        let certificate_path = dir.path().join("JohnDoe.crt");
        std::fs::write(&certificate_path, certificate.to_pem().unwrap()).unwrap();

        Self {
            dir,
            key,
            certificate,
            bundle_path,
            keyless_bundle_path,
            certificate_path,
        }
    }

    pub fn bundle(&self) -> KeyBundleConfig {
        KeyBundleConfig::new(&self.bundle_path, Passphrase::new(PASSPHRASE))
    }

    pub fn keyless_bundle(&self) -> KeyBundleConfig {
        KeyBundleConfig::new(&self.keyless_bundle_path, Passphrase::new(PASSPHRASE))
    }
}

fn self_signed(key: &PKey<Private>, common_name: &str) -> X509 {
    let mut name = X509NameBuilder::new().unwrap();
    name.append_entry_by_text("CN", common_name).unwrap();
    name.append_entry_by_text("O", "External Signer Tests").unwrap();
    let name = name.build();

    let mut builder = X509Builder::new().unwrap();
    builder.set_version(2).unwrap();
    let serial = BigNum::from_u32(7).unwrap().to_asn1_integer().unwrap();
    builder.set_serial_number(&serial).unwrap();
    builder.set_subject_name(&name).unwrap();
    builder.set_issuer_name(&name).unwrap();
    builder
        .set_not_before(&Asn1Time::days_from_now(0).unwrap())
        .unwrap();
    builder
        .set_not_after(&Asn1Time::days_from_now(30).unwrap())
        .unwrap();
    builder.set_pubkey(key).unwrap();
    builder.sign(key, MessageDigest::sha256()).unwrap();
    builder.build()
}
