//! Point-in-time page copies and the autosave schedule.

use chrono::{DateTime, Duration, Utc};
use pagesmith_model::Page;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub id: String,
    pub page_id: String,
    pub name: String,
    pub data: Page,
    pub created_at: DateTime<Utc>,
    pub is_auto_save: bool,
}

/// Snapshots of one page, oldest first
///
/// Retention runs on every insert: manual and automatic snapshots are capped
/// separately, oldest evicted first.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    snapshots: Vec<Snapshot>,
    max_manual: usize,
    max_auto: usize,
}

impl SnapshotStore {
    pub fn new(max_manual: usize, max_auto: usize) -> Self {
        Self {
            snapshots: Vec::new(),
            max_manual,
            max_auto,
        }
    }

    pub fn insert(&mut self, snapshot: Snapshot) {
        self.snapshots.push(snapshot);
        // Stable, so equal timestamps keep insertion order
        self.snapshots.sort_by_key(|s| s.created_at);

        let mut manual_excess = self.manual_count().saturating_sub(self.max_manual);
        let mut auto_excess = self.auto_count().saturating_sub(self.max_auto);
        self.snapshots.retain(|s| {
            let excess = if s.is_auto_save { &mut auto_excess } else { &mut manual_excess };
            if *excess > 0 {
                *excess -= 1;
                false
            } else {
                true
            }
        });
    }

    pub fn get(&self, snapshot_id: &str) -> Option<&Snapshot> {
        self.snapshots.iter().find(|s| s.id == snapshot_id)
    }

    pub fn list(&self) -> &[Snapshot] {
        &self.snapshots
    }

    pub fn manual_count(&self) -> usize {
        self.snapshots.iter().filter(|s| !s.is_auto_save).count()
    }

    pub fn auto_count(&self) -> usize {
        self.snapshots.iter().filter(|s| s.is_auto_save).count()
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Fixed-interval schedule, polled by the caller
///
/// The first poll arms the timer; it fires once per elapsed interval after
/// that. Polling late fires once, not once per missed interval.
#[derive(Debug, Clone)]
pub struct AutosaveTimer {
    interval: Duration,
    next_due: Option<DateTime<Utc>>,
}

impl AutosaveTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_due: None,
        }
    }

    pub fn from_secs(secs: u64) -> Self {
        let secs = secs.min(i64::MAX as u64 / 1000) as i64;
        Self::new(Duration::seconds(secs))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether an autosave is due at `now`
    pub fn poll(&mut self, now: DateTime<Utc>) -> bool {
        match self.next_due {
            Some(due) if now >= due => {
                self.next_due = Some(now + self.interval);
                true
            }
            Some(_) => false,
            None => {
                self.next_due = Some(now + self.interval);
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(n: i64, auto: bool, base: DateTime<Utc>) -> Snapshot {
        Snapshot {
            id: format!("s-{}", n),
            page_id: "p-1".to_string(),
            name: format!("Snapshot {}", n),
            data: Page::blank("p-1", "Home", "home", base),
            created_at: base + Duration::seconds(n),
            is_auto_save: auto,
        }
    }

    #[test]
    fn test_retention_caps_each_kind() {
        let base = Utc::now();
        let mut store = SnapshotStore::new(20, 10);

        for n in 0..25 {
            store.insert(snapshot(n, false, base));
        }
        for n in 25..40 {
            store.insert(snapshot(n, true, base));
        }

        assert_eq!(store.manual_count(), 20);
        assert_eq!(store.auto_count(), 10);
        assert_eq!(store.list()[0].id, "s-5");
        assert!(store.get("s-4").is_none());
        assert!(store.get("s-29").is_none());
        assert!(store.get("s-30").is_some());
    }

    #[test]
    fn test_merged_list_sorted_by_creation() {
        let base = Utc::now();
        let mut store = SnapshotStore::new(20, 10);

        store.insert(snapshot(3, true, base));
        store.insert(snapshot(1, false, base));
        store.insert(snapshot(2, true, base));

        let ids: Vec<&str> = store.list().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, ["s-1", "s-2", "s-3"]);
    }

    #[test]
    fn test_timer_fires_per_interval() {
        let start = Utc::now();
        let mut timer = AutosaveTimer::from_secs(30);

        assert!(!timer.poll(start));
        assert!(!timer.poll(start + Duration::seconds(29)));
        assert!(timer.poll(start + Duration::seconds(30)));
        assert!(!timer.poll(start + Duration::seconds(31)));
        assert!(timer.poll(start + Duration::seconds(200)));
        assert!(!timer.poll(start + Duration::seconds(201)));
    }
}
