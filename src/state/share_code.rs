//! Opaque share codes handed to anonymous viewers.

use std::fmt;

use rand::{Rng, rng};
use serde::{Deserialize, Serialize};

/// Number of characters in a share code.
pub const SHARE_CODE_LEN: usize = 16;
/// Lowercase alphabet without look-alike characters (`0/o`, `1/l/i`).
const ALPHABET: &[u8] = b"abcdefghjkmnpqrstuvwxyz23456789";

/// Unguessable token mapping to exactly one match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShareCode(String);

impl ShareCode {
    /// Draw a fresh code from the thread-local CSPRNG.
    pub fn generate() -> Self {
        let mut rng = rng();
        let code = (0..SHARE_CODE_LEN)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        Self(code)
    }

    /// Accept `raw` only when it has the exact shape of an issued code.
    pub fn parse(raw: &str) -> Option<Self> {
        let well_formed =
            raw.len() == SHARE_CODE_LEN && raw.bytes().all(|byte| ALPHABET.contains(&byte));
        well_formed.then(|| Self(raw.to_owned()))
    }

    /// Code text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Take the code text.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ShareCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn generated_codes_are_well_formed() {
        for _ in 0..64 {
            let code = ShareCode::generate();
            assert_eq!(code.as_str().len(), SHARE_CODE_LEN);
            assert_eq!(ShareCode::parse(code.as_str()), Some(code));
        }
    }

    #[test]
    fn generated_codes_do_not_repeat() {
        let codes = (0..512)
            .map(|_| ShareCode::generate().into_inner())
            .collect::<HashSet<_>>();
        assert_eq!(codes.len(), 512);
    }

    #[test]
    fn parse_rejects_malformed_input() {
        assert!(ShareCode::parse("").is_none());
        assert!(ShareCode::parse("abc").is_none());
        assert!(ShareCode::parse("ABCDEFGHJKMNPQRS").is_none()); // uppercase
        assert!(ShareCode::parse("abcdefghjkmnpq10").is_none()); // ambiguous digits
        assert!(ShareCode::parse("abcdefghjkmnpqrst").is_none()); // too long
    }
}
