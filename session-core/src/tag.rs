//! Factory tags: short fingerprints of a client type's identity.

use sha2::{Digest, Sha256};

const TAG_LEN: usize = 16;

/// Fingerprint the client type `C`.
///
/// The tag is derived from the type's fully qualified path, so it is stable
/// across restarts of the same build and changes when the type is renamed or
/// moved to another module. It is a compatibility guard, not a security
/// primitive.
pub fn factory_tag<C: ?Sized>() -> String {
    tag_for_path(std::any::type_name::<C>())
}

/// Fingerprint an arbitrary type path; first 16 hex digits of its SHA-256.
pub fn tag_for_path(path: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.as_bytes());
    let mut tag = format!("{:x}", hasher.finalize());
    tag.truncate(TAG_LEN);
    tag
}
