use rand::{Rng, SeedableRng, rngs::StdRng};
use std::sync::{Mutex, PoisonError};

pub const CODE_LENGTH: usize = 6;

/// Lowercase without `l`, uppercase without `I`, all digits.
pub const ALPHABET: &[u8] = b"abcdefghijkmnopqrstuvwxyzABCDEFGHJKLMNOPQRSTUVWXYZ0123456789";

/// Random short code source shared by every request.
///
/// The generator is seeded once when constructed. Codes are not checked for
/// uniqueness here: the `links.code` constraint rejects collisions.
pub struct ShortCodes {
    rng: Mutex<StdRng>,
}

impl ShortCodes {
    pub fn from_os_rng() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    pub fn generate(&self) -> String {
        // the rng holds no invariant a panicking holder could break
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        (0..CODE_LENGTH)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect()
    }
}
