//! Lobby codes and connection ids from OS randomness.
//!
//! Codes are six characters from `[A-Z0-9]`, drawn with rejection sampling
//! so every character is uniform. Connection ids are random `u64`s.

use crate::{error::ServerError, lobby::ConnectionId};

/// Length of a lobby code.
pub const CODE_LEN: usize = 6;

const CHARSET: &[u8; 36] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Largest multiple of the charset size that fits in a byte. Bytes at or
/// above it are redrawn.
const REJECT_AT: u8 = (u8::MAX / 36) * 36;

/// Fresh random lobby code.
pub fn generate_code() -> Result<String, ServerError> {
    let mut code = String::with_capacity(CODE_LEN);
    let mut buf = [0u8; 16];

    while code.len() < CODE_LEN {
        getrandom::fill(&mut buf)?;
        for byte in buf {
            if byte >= REJECT_AT {
                continue;
            }
            code.push(char::from(CHARSET[usize::from(byte % 36)]));
            if code.len() == CODE_LEN {
                break;
            }
        }
    }

    Ok(code)
}

/// Whether `code` has the shape of a generated code.
pub fn is_valid_code(code: &str) -> bool {
    code.len() == CODE_LEN && code.bytes().all(|b| CHARSET.contains(&b))
}

/// Fresh random connection id.
pub fn connection_id() -> Result<ConnectionId, ServerError> {
    let mut buf = [0u8; 8];
    getrandom::fill(&mut buf)?;
    Ok(ConnectionId(u64::from_le_bytes(buf)))
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn codes_have_expected_shape() {
        for _ in 0..200 {
            let code = generate_code().unwrap();
            assert!(is_valid_code(&code), "bad code {code}");
        }
    }

    #[test]
    fn codes_differ() {
        let codes: HashSet<String> = (0..50).map(|_| generate_code().unwrap()).collect();
        assert!(codes.len() > 45);
    }

    #[test]
    fn validation_rejects_other_shapes() {
        assert!(is_valid_code("AB12CD"));
        assert!(!is_valid_code("ab12cd"));
        assert!(!is_valid_code("AB12C"));
        assert!(!is_valid_code("AB12CD7"));
        assert!(!is_valid_code("AB-2CD"));
    }

    #[test]
    fn connection_ids_differ() {
        assert_ne!(connection_id().unwrap(), connection_id().unwrap());
    }
}
