use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand_core::{OsRng, RngCore};

/// Minimum accepted length for a client-supplied key. Rotation-generated
/// keys are 43 characters (32 random bytes, base64).
pub const MIN_KEY_LEN: usize = 24;

/// Generate a fresh opaque API key. Keys are long-lived bearer-equivalent
/// secrets compared literally; at most one is valid per user at a time,
/// so assigning a new one invalidates the old.
pub fn generate_api_key() -> String {
    let mut bytes = [0u8; 32];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Format gate for client-supplied keys: long enough to resist guessing,
/// printable ASCII, no whitespace.
pub fn validate_api_key(key: &str) -> bool {
    key.len() >= MIN_KEY_LEN && key.chars().all(|c| c.is_ascii_graphic())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_keys_are_valid_and_distinct() {
        let a = generate_api_key();
        let b = generate_api_key();
        assert_ne!(a, b);
        assert_eq!(a.len(), 43);
        assert!(validate_api_key(&a));
        assert!(validate_api_key(&b));
    }

    #[test]
    fn short_keys_rejected() {
        assert!(!validate_api_key(""));
        assert!(!validate_api_key("tooshort"));
        assert!(!validate_api_key(&"x".repeat(MIN_KEY_LEN - 1)));
        assert!(validate_api_key(&"x".repeat(MIN_KEY_LEN)));
    }

    #[test]
    fn whitespace_and_control_rejected() {
        assert!(!validate_api_key("abcd efgh ijkl mnop qrst uvwx"));
        assert!(!validate_api_key("abcdefgh\tijklmnopqrstuvwxyz"));
        assert!(!validate_api_key("abcdefghijklmnopqrstuvwx\u{7}z"));
    }

    #[test]
    fn non_ascii_rejected() {
        assert!(!validate_api_key("clés-secrètes-très-longues-oui"));
    }
}
