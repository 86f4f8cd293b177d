use rand::rngs::OsRng;
use rand::RngCore;

/// Number of random bytes backing a session identifier or CSRF token.
const TOKEN_BYTES: usize = 32;

/// Generates an opaque, unguessable token from the OS random source,
/// hex-encoded (64 characters).
pub fn generate_token() -> String {
    let mut buf = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}
