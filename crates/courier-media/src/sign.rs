// SPDX-FileCopyrightText: 2026 Courier Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HMAC-signed media URLs.
//!
//! Carrier media endpoints require carrier credentials, so ingested files
//! are re-exposed through the relay's own gateway behind expiring signed
//! URLs. The signature covers `<user_id>/<file>:<expires>` so neither the
//! path nor the expiry can be swapped out.

use chrono::Utc;
use courier_config::model::MediaConfig;
use courier_core::error::CourierError;
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SECONDS_PER_DAY: i64 = 86_400;

/// Signs and verifies gateway media URLs.
#[derive(Clone)]
pub struct UrlSigner {
    key: Vec<u8>,
    public_base_url: String,
    ttl_secs: i64,
}

impl UrlSigner {
    pub fn new(config: &MediaConfig) -> Result<Self, CourierError> {
        let key = config
            .signing_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                CourierError::Config("media.signing_key must be set to serve media".to_string())
            })?;
        Ok(Self {
            key: key.as_bytes().to_vec(),
            public_base_url: config.public_base_url.trim_end_matches('/').to_string(),
            ttl_secs: config.url_ttl_days as i64 * SECONDS_PER_DAY,
        })
    }

    fn mac(&self) -> HmacSha256 {
        // HMAC accepts keys of any length.
        HmacSha256::new_from_slice(&self.key).expect("hmac key length is unrestricted")
    }

    fn payload(user_id: &str, file: &str, expires: i64) -> String {
        format!("{user_id}/{file}:{expires}")
    }

    /// Hex signature over a media path and expiry.
    pub fn signature(&self, user_id: &str, file: &str, expires: i64) -> String {
        let mut mac = self.mac();
        mac.update(Self::payload(user_id, file, expires).as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Full public URL for a stored file, expiring `url_ttl_days` from now.
    pub fn signed_url(&self, user_id: &str, file: &str) -> String {
        let expires = Utc::now().timestamp() + self.ttl_secs;
        let sig = self.signature(user_id, file, expires);
        format!(
            "{}/media/{user_id}/{file}?expires={expires}&sig={sig}",
            self.public_base_url
        )
    }

    /// Check a presented signature and expiry against the current time.
    pub fn verify(&self, user_id: &str, file: &str, expires: i64, sig: &str) -> bool {
        if expires < Utc::now().timestamp() {
            return false;
        }
        let Ok(presented) = hex::decode(sig) else {
            return false;
        };
        let mut mac = self.mac();
        mac.update(Self::payload(user_id, file, expires).as_bytes());
        mac.verify_slice(&presented).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> UrlSigner {
        let config = MediaConfig {
            signing_key: Some("test-signing-key".to_string()),
            public_base_url: "https://relay.example".to_string(),
            ..MediaConfig::default()
        };
        UrlSigner::new(&config).unwrap()
    }

    #[test]
    fn missing_key_is_a_config_error() {
        let config = MediaConfig::default();
        assert!(matches!(
            UrlSigner::new(&config),
            Err(CourierError::Config(_))
        ));
    }

    #[test]
    fn signed_url_round_trips() {
        let signer = signer();
        let url = signer.signed_url("u-1", "1700000000000_0.jpg");
        assert!(url.starts_with("https://relay.example/media/u-1/1700000000000_0.jpg?expires="));

        let query = url.split_once('?').unwrap().1;
        let mut expires = 0i64;
        let mut sig = String::new();
        for pair in query.split('&') {
            let (k, v) = pair.split_once('=').unwrap();
            match k {
                "expires" => expires = v.parse().unwrap(),
                "sig" => sig = v.to_string(),
                _ => panic!("unexpected query key {k}"),
            }
        }
        assert!(signer.verify("u-1", "1700000000000_0.jpg", expires, &sig));
    }

    #[test]
    fn tampered_path_fails_verification() {
        let signer = signer();
        let expires = Utc::now().timestamp() + 60;
        let sig = signer.signature("u-1", "a.jpg", expires);
        assert!(!signer.verify("u-2", "a.jpg", expires, &sig));
        assert!(!signer.verify("u-1", "b.jpg", expires, &sig));
        assert!(!signer.verify("u-1", "a.jpg", expires + 1, &sig));
    }

    #[test]
    fn expired_signature_is_rejected_even_when_valid() {
        let signer = signer();
        let expires = Utc::now().timestamp() - 1;
        let sig = signer.signature("u-1", "a.jpg", expires);
        assert!(!signer.verify("u-1", "a.jpg", expires, &sig));
    }

    #[test]
    fn garbage_signature_is_rejected() {
        let signer = signer();
        let expires = Utc::now().timestamp() + 60;
        assert!(!signer.verify("u-1", "a.jpg", expires, "not-hex"));
        assert!(!signer.verify("u-1", "a.jpg", expires, "deadbeef"));
    }
}
