//! Time-stepped one-time codes for the optional second login factor.
//!
//! Codes are an HMAC-SHA-256 over the big-endian time-step counter with
//! RFC 4226 dynamic truncation, 6 digits, zero-padded. Verification accepts a
//! configurable number of adjacent steps to absorb client clock skew.

use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const SECRET_LEN: usize = 32;
const BASE32_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Generate a fresh shared secret, base32-alphabet so authenticator apps can
/// consume it straight from the provisioning URI.
#[must_use]
pub fn generate_secret() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    (0..SECRET_LEN)
        .map(|_| BASE32_ALPHABET[rng.random_range(0..BASE32_ALPHABET.len())] as char)
        .collect()
}

/// The 6-digit code for the time step containing `now`.
#[must_use]
pub fn compute_code(secret: &str, step_seconds: u64, now: DateTime<Utc>) -> String {
    let counter = counter_at(step_seconds, now);
    code_for_counter(secret, counter)
}

/// Check a submitted code against the current step and `skew_steps` steps on
/// either side. Exact string match, leading zeros significant.
#[must_use]
pub fn verify(
    secret: &str,
    submitted: &str,
    step_seconds: u64,
    skew_steps: u32,
    now: DateTime<Utc>,
) -> bool {
    let current = counter_at(step_seconds, now) as i64;
    let skew = i64::from(skew_steps);

    (-skew..=skew).any(|offset| {
        let counter = current + offset;
        counter >= 0 && code_for_counter(secret, counter as u64) == submitted
    })
}

/// otpauth:// URI consumed by authenticator apps at enrollment.
#[must_use]
pub fn provisioning_uri(issuer: &str, email: &str, secret: &str, step_seconds: u64) -> String {
    format!(
        "otpauth://totp/{issuer}:{email}?secret={secret}&issuer={issuer}&algorithm=SHA256&digits=6&period={step_seconds}"
    )
}

fn counter_at(step_seconds: u64, now: DateTime<Utc>) -> u64 {
    let seconds = now.timestamp().max(0) as u64;
    seconds / step_seconds.max(1)
}

fn code_for_counter(secret: &str, counter: u64) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    let bin = u32::from_be_bytes([
        digest[offset],
        digest[offset + 1],
        digest[offset + 2],
        digest[offset + 3],
    ]) & 0x7fff_ffff;

    format!("{:06}", bin % 1_000_000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    const STEP: u64 = 30;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    #[test]
    fn test_code_is_deterministic_within_a_step() {
        let secret = "JBSWY3DPEHPK3PXPJBSWY3DPEHPK3PXP";
        let a = compute_code(secret, STEP, at(1_700_000_010));
        let b = compute_code(secret, STEP, at(1_700_000_029));
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
        assert!(a.chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_code_changes_across_steps() {
        let secret = "JBSWY3DPEHPK3PXPJBSWY3DPEHPK3PXP";
        let a = compute_code(secret, STEP, at(1_700_000_000));
        let b = compute_code(secret, STEP, at(1_700_000_060));
        assert_ne!(a, b);
    }

    #[test]
    fn test_verify_accepts_current_and_adjacent_steps() {
        let secret = generate_secret();
        let now = at(1_700_000_015);

        let current = compute_code(secret.as_str(), STEP, now);
        assert!(verify(&secret, &current, STEP, 1, now));

        // Code from the previous step still passes with a one-step window.
        let previous = compute_code(secret.as_str(), STEP, at(1_700_000_015 - 30));
        assert!(verify(&secret, &previous, STEP, 1, now));

        // But not with a zero-step window, unless it happens to collide.
        if previous != current {
            assert!(!verify(&secret, &previous, STEP, 0, now));
        }
    }

    #[test]
    fn test_verify_rejects_far_away_steps() {
        let secret = generate_secret();
        let now = at(1_700_000_015);
        let stale = compute_code(secret.as_str(), STEP, at(1_700_000_015 - 300));
        let current = compute_code(secret.as_str(), STEP, now);
        if stale != current {
            assert!(!verify(&secret, &stale, STEP, 1, now));
        }
    }

    #[test]
    fn test_verify_rejects_garbage() {
        let secret = generate_secret();
        let now = at(1_700_000_015);
        assert!(!verify(&secret, "", STEP, 1, now));
        assert!(!verify(&secret, "abcdef", STEP, 1, now));
        // "000000" is a valid code shape but must never be a universal pass.
        assert!(
            !verify(&secret, "000000", STEP, 1, now)
                || compute_code(&secret, STEP, now) == "000000"
        );
    }

    #[test]
    fn test_secret_shape() {
        let secret = generate_secret();
        assert_eq!(secret.len(), 32);
        assert!(secret.bytes().all(|b| BASE32_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_provisioning_uri() {
        let uri = provisioning_uri("Agendarr", "alice@inst.edu", "SECRETSECRET", 30);
        assert!(uri.starts_with("otpauth://totp/Agendarr:alice@inst.edu?"));
        assert!(uri.contains("secret=SECRETSECRET"));
        assert!(uri.contains("period=30"));
    }
}
