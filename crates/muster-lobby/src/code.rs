//! Join-code generation.

use muster_protocol::LobbyCode;
use rand::Rng;

/// Uppercase letters and digits only: codes get read aloud and typed
/// on phones, so no lowercase and no punctuation.
const CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Generates a random join code of the given length.
///
/// Uniqueness is not guaranteed here; the directory checks candidates
/// against live lobbies and retries.
pub(crate) fn generate(length: usize) -> LobbyCode {
    let mut rng = rand::rng();
    let code: String = (0..length)
        .map(|_| {
            let idx = rng.random_range(0..CODE_ALPHABET.len());
            CODE_ALPHABET[idx] as char
        })
        .collect();
    LobbyCode(code)
}
