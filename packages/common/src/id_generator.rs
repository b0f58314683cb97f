use crc32fast::Hasher;
use std::sync::atomic::{AtomicU64, Ordering};

static INSTANCE_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Generate a generator seed from the current time and a process-wide counter
pub fn fresh_seed() -> String {
    let nanos = chrono::Utc::now()
        .timestamp_nanos_opt()
        .unwrap_or_default();
    let instance = INSTANCE_COUNTER.fetch_add(1, Ordering::Relaxed);

    let mut hasher = Hasher::new();
    hasher.update(format!("{}:{}:{}", nanos, std::process::id(), instance).as_bytes());
    format!("{:08x}", hasher.finalize())
}

/// Sequential ID generator for pages, components, snapshots and history entries
///
/// Every ID is `<seed>-<n>`. Two generators built with [`IdGenerator::new`] get
/// different seeds, so IDs stay unique across engine instances.
#[derive(Debug, Clone)]
pub struct IdGenerator {
    seed: String,
    count: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::from_seed(fresh_seed())
    }

    /// Deterministic generator (tests, reproducible exports)
    pub fn from_seed(seed: impl Into<String>) -> Self {
        Self {
            seed: seed.into(),
            count: 0,
        }
    }

    /// Generate next sequential ID
    pub fn new_id(&mut self) -> String {
        self.count += 1;
        format!("{}-{}", self.seed, self.count)
    }

    pub fn seed(&self) -> &str {
        &self.seed
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_ids() {
        let mut gen = IdGenerator::from_seed("abc");

        let id1 = gen.new_id();
        let id2 = gen.new_id();
        let id3 = gen.new_id();

        assert_eq!(id1, "abc-1");
        assert_eq!(id2, "abc-2");
        assert_eq!(id3, "abc-3");
        assert_eq!(gen.seed(), "abc");
    }

    #[test]
    fn test_fresh_generators_do_not_collide() {
        let mut a = IdGenerator::new();
        let mut b = IdGenerator::new();

        assert_ne!(a.seed(), b.seed());
        assert_ne!(a.new_id(), b.new_id());
    }
}
