use bytes::Bytes;
use parking_lot::RwLock;
use rand::RngExt;
use std::sync::Arc;

/// Token value reported while no frame has been posted yet.
pub const EMPTY_TOKEN: u64 = 0;

struct Inner {
    frame: Option<(Bytes, u64)>,
    next_token: u64,
}

/// Shared store holding the most recent frame and its version token.
///
/// Cloning is cheap; all clones observe the same state. A reader always
/// sees a frame together with the token minted for it, since the pair is
/// replaced under a single write lock.
#[derive(Clone)]
pub struct FrameStore {
    inner: Arc<RwLock<Inner>>,
}

impl FrameStore {
    /// Create an empty store.
    ///
    /// The token counter starts at a pseudorandom seed so tokens from a
    /// previous server run do not read as current after a restart.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(Inner {
                frame: None,
                next_token: rand::rng().random(),
            })),
        }
    }

    /// Store a new frame, returning the token minted for it.
    pub fn set(&self, frame: Bytes) -> u64 {
        let mut inner = self.inner.write();
        inner.next_token = inner.next_token.wrapping_add(1);
        // EMPTY_TOKEN is reserved for the not-yet-posted state
        if inner.next_token == EMPTY_TOKEN {
            inner.next_token = 1;
        }
        let token = inner.next_token;
        inner.frame = Some((frame, token));
        token
    }

    /// Current frame and token, or `None` before the first post.
    pub fn get(&self) -> Option<(Bytes, u64)> {
        self.inner.read().frame.clone()
    }

    /// Current token, or [`EMPTY_TOKEN`] before the first post.
    pub fn current_token(&self) -> u64 {
        self.inner
            .read()
            .frame
            .as_ref()
            .map(|(_, token)| *token)
            .unwrap_or(EMPTY_TOKEN)
    }
}

impl Default for FrameStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_store() {
        let store = FrameStore::new();
        assert!(store.get().is_none());
        assert_eq!(store.current_token(), EMPTY_TOKEN);
    }

    #[test]
    fn test_set_rotates_token() {
        let store = FrameStore::new();
        let t1 = store.set(Bytes::from_static(b"one"));
        let t2 = store.set(Bytes::from_static(b"two"));

        assert_ne!(t1, EMPTY_TOKEN);
        assert_ne!(t2, EMPTY_TOKEN);
        assert_ne!(t1, t2);
        assert_eq!(store.current_token(), t2);
    }

    #[test]
    fn test_get_returns_latest_pair() {
        let store = FrameStore::new();
        store.set(Bytes::from_static(b"old"));
        let token = store.set(Bytes::from_static(b"new"));

        let (frame, seen) = store.get().expect("frame was set");
        assert_eq!(frame.as_ref(), b"new");
        assert_eq!(seen, token);
    }

    #[test]
    fn test_clones_share_state() {
        let store = FrameStore::new();
        let other = store.clone();
        let token = store.set(Bytes::from_static(b"shared"));

        assert_eq!(other.current_token(), token);
        assert_eq!(other.get().unwrap().0.as_ref(), b"shared");
    }
}
