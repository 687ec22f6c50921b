use rand::Rng;
use tracing::debug;

use super::{LocalStore, StoreError, SESSION_ID_KEY};

const BASE36_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const SUFFIX_LEN: usize = 9;

/// Build a new identifier from the current time and a random base-36 suffix.
///
/// Uniqueness is best-effort; the id only correlates anonymous activity.
pub fn generate_session_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| BASE36_ALPHABET[rng.random_range(0..BASE36_ALPHABET.len())] as char)
        .collect();
    format!(
        "session_{}_{}",
        chrono::Utc::now().timestamp_millis(),
        suffix
    )
}

/// Return the stored session id, creating and storing one on first use.
pub fn ensure_session_id(store: &dyn LocalStore) -> Result<String, StoreError> {
    if let Some(existing) = store.get(SESSION_ID_KEY)? {
        if !existing.is_empty() {
            return Ok(existing);
        }
    }

    let session_id = generate_session_id();
    store.set(SESSION_ID_KEY, &session_id)?;
    debug!("Created session id {}", session_id);
    Ok(session_id)
}
