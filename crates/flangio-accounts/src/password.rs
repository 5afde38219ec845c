//! PBKDF2-HMAC-SHA256 password hashes
//!
//! Encoded as `pbkdf2_sha256$<iterations>$<salt>$<hex digest>`. The iteration
//! count travels with the hash, so raising [`ITERATIONS`] leaves existing
//! hashes verifiable.

use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;
use uuid::Uuid;

const ALGORITHM: &str = "pbkdf2_sha256";
const SALT_LEN: usize = 12;
const DIGEST_LEN: usize = 32;

/// Rounds applied to new hashes
pub const ITERATIONS: u32 = 260_000;

/// Hash `password` under a fresh random salt
pub fn hash_password(password: &str) -> String {
    let salt = Uuid::new_v4().simple().to_string();
    hash_with(password, &salt[..SALT_LEN], ITERATIONS)
}

fn hash_with(password: &str, salt: &str, iterations: u32) -> String {
    format!(
        "{}${}${}${}",
        ALGORITHM,
        iterations,
        salt,
        digest_hex(password, salt, iterations)
    )
}

fn digest_hex(password: &str, salt: &str, iterations: u32) -> String {
    let mut digest = [0u8; DIGEST_LEN];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt.as_bytes(), iterations, &mut digest);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Check `password` against an encoded hash. Malformed hashes never match.
pub fn verify_password(password: &str, encoded: &str) -> bool {
    let mut parts = encoded.splitn(4, '$');
    let (Some(algorithm), Some(iterations), Some(salt), Some(expected)) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    if algorithm != ALGORITHM {
        return false;
    }
    let iterations = match iterations.parse::<u32>() {
        Ok(n) if n > 0 => n,
        _ => return false,
    };
    constant_time_eq(
        digest_hex(password, salt, iterations).as_bytes(),
        expected.as_bytes(),
    )
}

/// Constant-time byte comparison
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff = 0u8;
    for (x, y) in a.iter().zip(b) {
        diff |= x ^ y;
    }
    diff == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_format() {
        let encoded = hash_password("hunter2");
        let parts: Vec<&str> = encoded.split('$').collect();
        assert_eq!(parts.len(), 4);
        assert_eq!(parts[0], "pbkdf2_sha256");
        assert_eq!(parts[1], ITERATIONS.to_string());
        assert_eq!(parts[2].len(), SALT_LEN);
        assert_eq!(parts[3].len(), DIGEST_LEN * 2);
    }

    #[test]
    fn test_verify() {
        let encoded = hash_password("hunter2");
        assert!(verify_password("hunter2", &encoded));
        assert!(!verify_password("hunter3", &encoded));
    }

    #[test]
    fn test_salts_differ() {
        assert_ne!(hash_password("same"), hash_password("same"));
    }

    #[test]
    fn test_known_digests() {
        assert_eq!(
            hash_with("password", "salt", 1),
            "pbkdf2_sha256$1$salt$120fb6cffcf8b32c43e7225256c4f837a86548c92ccc35480805987cb70be17b"
        );
        assert_eq!(
            hash_with("password", "salt", 2),
            "pbkdf2_sha256$2$salt$ae4d0c95af6b46d32d0adff928f06dd02a303f8ef3c251dfd6e2d85a95474c43"
        );
    }

    #[test]
    fn test_stored_iteration_count_is_used() {
        let encoded = hash_with("hunter2", "somesalt", 3);
        assert!(verify_password("hunter2", &encoded));
        let tampered = encoded.replacen("$3$", "$4$", 1);
        assert!(!verify_password("hunter2", &tampered));
    }

    #[test]
    fn test_malformed_hash_never_matches() {
        assert!(!verify_password("x", ""));
        assert!(!verify_password("x", "md5$1$salt$abc"));
        assert!(!verify_password("x", "pbkdf2_sha256$salt$abc"));
        assert!(!verify_password("x", "pbkdf2_sha256$0$salt$abc"));
        assert!(!verify_password("x", "pbkdf2_sha256$many$salt$abc"));
        // single unsalted SHA-256
        assert!(!verify_password(
            "bc",
            "sha256$a$ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        ));
    }

    #[test]
    fn test_constant_time_eq() {
        assert!(constant_time_eq(b"abc", b"abc"));
        assert!(!constant_time_eq(b"abc", b"abd"));
        assert!(!constant_time_eq(b"abc", b"ab"));
    }
}
