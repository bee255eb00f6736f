//! Object key generation.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::RngCore;

/// Random bytes behind every object id.
const OBJECT_ID_BYTES: usize = 32;

/// Generate a collision-resistant, path-safe object id.
///
/// 32 bytes from the thread-local CSPRNG, encoded as unpadded base64url (43 chars).
pub fn generate_object_id() -> String {
    let mut buf = [0u8; OBJECT_ID_BYTES];
    rand::rng().fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

/// Build `{prefix}{id}.{extension}` with a fresh id.
pub fn object_key(prefix: &str, extension: &str) -> String {
    format!("{}{}.{}", prefix, generate_object_id(), extension)
}
