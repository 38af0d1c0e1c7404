//! Command authentication.
//!
//! The signature is an HMAC-SHA256 over the null-joined argument vector,
//! keyed with the shared secret and hex-encoded. The argument vector is the
//! security-relevant input: it determines what the server will run. The null
//! separator keeps arguments containing spaces or other delimiters
//! unambiguous.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Compute the hex-encoded signature for an argument vector.
pub fn calculate_signature(auth_secret: &str, args: &[String]) -> String {
    let mut mac = HmacSha256::new_from_slice(auth_secret.as_bytes())
        .expect("HMAC accepts keys of any length");
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            mac.update(&[0]);
        }
        mac.update(arg.as_bytes());
    }
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a received signature against the expected one in constant time.
pub fn verify_signature(auth_secret: &str, signature: &str, args: &[String]) -> bool {
    let expected = calculate_signature(auth_secret, args);
    expected.as_bytes().ct_eq(signature.as_bytes()).into()
}
