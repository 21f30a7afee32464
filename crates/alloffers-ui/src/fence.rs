use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;

/// Monotonic request sequence for one logical stream.
///
/// Every request takes a number from [`issue`](Self::issue); its response may
/// only be applied while that number is still the latest. The check and the
/// application happen under the same lock, so a newer response can never be
/// overwritten by an older one.
#[derive(Debug, Default)]
pub struct SequenceFence {
    latest: Mutex<u64>,
}

impl SequenceFence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number for a request about to be sent.
    pub fn issue(&self) -> u64 {
        let mut latest = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        *latest += 1;
        *latest
    }

    /// Make every outstanding request stale without issuing a new one.
    pub fn invalidate(&self) {
        self.issue();
    }

    pub fn latest(&self) -> u64 {
        *self.latest.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Run `apply` only if `seq` is still the latest issued number.
    pub fn run_if_current<R>(&self, seq: u64, apply: impl FnOnce() -> R) -> Option<R> {
        let latest = self.latest.lock().unwrap_or_else(|e| e.into_inner());
        (*latest == seq).then(apply)
    }
}

/// One independent [`SequenceFence`] per key.
///
/// Numbers come from a single counter shared by every key, and a key's entry
/// is dropped once its latest response has been applied. A key issued again
/// later can never match a number handed out before the removal.
#[derive(Debug)]
pub struct FenceMap<K> {
    state: Mutex<Streams<K>>,
}

#[derive(Debug)]
struct Streams<K> {
    next: u64,
    latest: HashMap<K, u64>,
}

impl<K> Default for FenceMap<K> {
    fn default() -> Self {
        Self { state: Mutex::new(Streams { next: 0, latest: HashMap::new() }) }
    }
}

impl<K: Eq + Hash> FenceMap<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn issue(&self, key: K) -> u64 {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.next += 1;
        let seq = state.next;
        state.latest.insert(key, seq);
        seq
    }

    /// Run `apply` only if `seq` is the latest number issued for `key`. The
    /// key is forgotten afterwards, since nothing newer is outstanding.
    pub fn run_if_current<R>(&self, key: &K, seq: u64, apply: impl FnOnce() -> R) -> Option<R> {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.latest.get(key) != Some(&seq) {
            return None;
        }
        let out = apply();
        state.latest.remove(key);
        Some(out)
    }

    /// Keys with a request still outstanding.
    pub fn len(&self) -> usize {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).latest.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
