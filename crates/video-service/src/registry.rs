use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::model::VideoMetadata;

/// Ids up to and including this value are never handed out.
pub const RESERVED_IDS: u64 = 10;

type Entries = BTreeMap<u64, Arc<VideoMetadata>>;

/// Concurrent collection of video metadata plus the id generator.
///
/// Entries live in a copy-on-write map: readers take a cheap snapshot of the
/// current `Arc` and iterate it without holding the lock, so a listing never
/// waits on an in-flight `add` and never sees a half-inserted entry.
pub struct VideoRegistry {
    counter: AtomicU64,
    entries: RwLock<Arc<Entries>>,
}

impl VideoRegistry {
    pub fn new() -> Self {
        Self {
            counter: AtomicU64::new(RESERVED_IDS),
            entries: RwLock::new(Arc::new(BTreeMap::new())),
        }
    }

    fn snapshot(&self) -> Arc<Entries> {
        Arc::clone(&*self.entries.read())
    }

    /// All registered videos, ordered by id
    pub fn list(&self) -> Vec<VideoMetadata> {
        self.snapshot()
            .values()
            .map(|video| video.as_ref().clone())
            .collect()
    }

    /// Assign the next id, compute the data URL and store the entry.
    ///
    /// `host_base_url` is the scheme and authority clients reach this
    /// service on, e.g. `http://localhost:8080`.
    pub fn add(&self, candidate: VideoMetadata, host_base_url: &str) -> VideoMetadata {
        let id = self.counter.fetch_add(1, Ordering::SeqCst) + 1;

        let video = VideoMetadata {
            id,
            data_url: data_url(host_base_url, id),
            ..candidate
        };

        let mut entries = self.entries.write();
        Arc::make_mut(&mut *entries).insert(id, Arc::new(video.clone()));
        drop(entries);

        tracing::debug!(video_id = id, title = %video.title, "Registered video");
        video
    }

    pub fn find_by_id(&self, id: u64) -> Option<VideoMetadata> {
        self.snapshot()
            .get(&id)
            .map(|video| video.as_ref().clone())
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.snapshot().len()
    }

    #[cfg(test)]
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for VideoRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// `{base}/video/{id}/data`, tolerating a trailing slash on `base`
pub fn data_url(host_base_url: &str, id: u64) -> String {
    format!("{}/video/{}/data", host_base_url.trim_end_matches('/'), id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::thread;

    const BASE: &str = "http://localhost:8080";

    #[test]
    fn test_first_id_above_reserved_range() {
        let registry = VideoRegistry::new();
        let video = registry.add(VideoMetadata::new("t1", 30), BASE);

        assert_eq!(video.id, 11);
        assert_eq!(video.title, "t1");
        assert_eq!(video.duration, 30);
        assert_eq!(video.data_url, "http://localhost:8080/video/11/data");
    }

    #[test]
    fn test_caller_supplied_id_and_url_ignored() {
        let registry = VideoRegistry::new();
        let candidate = VideoMetadata {
            id: 3,
            data_url: "http://elsewhere/x".to_string(),
            ..VideoMetadata::new("t1", 30)
        };
        let video = registry.add(candidate, "http://media.local/");

        assert_eq!(video.id, 11);
        assert_eq!(video.data_url, "http://media.local/video/11/data");
    }

    #[test]
    fn test_ids_strictly_increase() {
        let registry = VideoRegistry::new();
        let ids: Vec<u64> = (0..5)
            .map(|i| registry.add(VideoMetadata::new(format!("v{i}"), i), BASE).id)
            .collect();
        assert_eq!(ids, vec![11, 12, 13, 14, 15]);
    }

    #[test]
    fn test_find_by_id() {
        let registry = VideoRegistry::new();
        let added = registry.add(VideoMetadata::new("t1", 30), BASE);

        assert_eq!(registry.find_by_id(added.id), Some(added));
        assert_eq!(registry.find_by_id(999), None);
        assert_eq!(registry.find_by_id(RESERVED_IDS), None);
    }

    #[test]
    fn test_list_returns_finalized_entries() {
        let registry = VideoRegistry::new();
        assert!(registry.is_empty());
        registry.add(VideoMetadata::new("a", 1), BASE);
        registry.add(VideoMetadata::new("b", 2), BASE);

        let videos = registry.list();
        assert_eq!(videos.len(), 2);
        assert_eq!(videos[0].title, "a");
        assert_eq!(videos[1].title, "b");
        assert!(videos.iter().all(|v| v.id > RESERVED_IDS && !v.data_url.is_empty()));
    }

    #[test]
    fn test_independent_instances() {
        let first = VideoRegistry::new();
        let second = VideoRegistry::new();
        first.add(VideoMetadata::new("a", 1), BASE);

        assert_eq!(first.len(), 1);
        assert!(second.is_empty());
        assert_eq!(second.add(VideoMetadata::new("b", 1), BASE).id, 11);
    }

    #[test]
    fn test_concurrent_adds_get_distinct_ids() {
        let registry = VideoRegistry::new();
        let per_thread = 200;
        let threads = 8;

        let ids: Vec<u64> = thread::scope(|s| {
            let handles: Vec<_> = (0..threads)
                .map(|t| {
                    let registry = &registry;
                    s.spawn(move || {
                        let mut ids = Vec::with_capacity(per_thread);
                        for i in 0..per_thread {
                            let video = registry
                                .add(VideoMetadata::new(format!("{t}-{i}"), i as u64), BASE);
                            ids.push(video.id);
                        }
                        ids
                    })
                })
                .collect();
            handles
                .into_iter()
                .flat_map(|h| h.join().unwrap())
                .collect()
        });

        let total = per_thread * threads;
        let unique: HashSet<u64> = ids.iter().copied().collect();
        assert_eq!(unique.len(), total);
        assert_eq!(registry.len(), total);
        assert_eq!(*unique.iter().min().unwrap(), RESERVED_IDS + 1);
        assert_eq!(*unique.iter().max().unwrap(), RESERVED_IDS + total as u64);
    }

    #[test]
    fn test_list_during_concurrent_adds() {
        let registry = VideoRegistry::new();

        thread::scope(|s| {
            s.spawn(|| {
                for i in 0..500 {
                    registry.add(VideoMetadata::new(format!("v{i}"), i), BASE);
                }
            });
            s.spawn(|| {
                let mut seen = 0;
                while seen < 500 {
                    let videos = registry.list();
                    assert!(videos.len() >= seen);
                    for video in &videos {
                        assert!(video.id > RESERVED_IDS);
                        assert_eq!(video.data_url, data_url(BASE, video.id));
                    }
                    seen = videos.len();
                }
            });
        });
    }
}
