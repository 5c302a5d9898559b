use std::collections::HashSet;
use std::sync::Mutex;

/// Set of canonical URLs admitted into the frontier during one crawl run
///
/// Admission is an atomic check-and-set guarded by a single mutex. A URL,
/// once present, is never removed for the lifetime of the run; the set is
/// dropped with the run and nothing is persisted. The lock is only ever held
/// for map operations, never across I/O.
pub struct DedupSet {
    inner: Mutex<Inner>,
}

struct Inner {
    seen: HashSet<String>,
    rejected: u64,
}

impl DedupSet {
    /// Creates an empty set
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                seen: HashSet::new(),
                rejected: 0,
            }),
        }
    }

    /// Atomically admits a canonical URL
    ///
    /// Returns `true` and marks the URL as seen iff it was not already
    /// present; returns `false` otherwise. Safe under unbounded concurrent
    /// callers: exactly one caller wins for any given string.
    pub fn try_admit(&self, url: &str) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.seen.contains(url) {
            inner.rejected += 1;
            false
        } else {
            inner.seen.insert(url.to_string());
            true
        }
    }

    /// Returns true if the URL has already been admitted
    pub fn contains(&self, url: &str) -> bool {
        self.inner.lock().unwrap().seen.contains(url)
    }

    /// Number of distinct URLs admitted so far
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().seen.len()
    }

    /// Returns true if nothing has been admitted yet
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of admission attempts rejected as duplicates
    pub fn duplicates(&self) -> u64 {
        self.inner.lock().unwrap().rejected
    }

    /// Copies out the admitted URLs, for end-of-run reporting
    pub fn snapshot(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        let mut urls: Vec<String> = inner.seen.iter().cloned().collect();
        urls.sort();
        urls
    }
}

impl Default for DedupSet {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_first_admission_wins() {
        let set = DedupSet::new();
        assert!(set.try_admit("http://example.com/"));
        assert!(!set.try_admit("http://example.com/"));
        assert!(!set.try_admit("http://example.com/"));
        assert_eq!(set.len(), 1);
        assert_eq!(set.duplicates(), 2);
    }

    #[test]
    fn test_distinct_urls_all_admitted() {
        let set = DedupSet::new();
        assert!(set.try_admit("http://example.com/a"));
        assert!(set.try_admit("http://example.com/b"));
        assert!(set.try_admit("http://example.com/c"));
        assert_eq!(set.len(), 3);
        assert_eq!(set.duplicates(), 0);
    }

    #[test]
    fn test_contains() {
        let set = DedupSet::new();
        set.try_admit("http://example.com/a");
        assert!(set.contains("http://example.com/a"));
        assert!(!set.contains("http://example.com/b"));
    }

    #[test]
    fn test_snapshot_is_sorted() {
        let set = DedupSet::new();
        set.try_admit("http://example.com/b");
        set.try_admit("http://example.com/a");
        assert_eq!(
            set.snapshot(),
            vec![
                "http://example.com/a".to_string(),
                "http://example.com/b".to_string()
            ]
        );
    }

    #[test]
    fn test_empty() {
        let set = DedupSet::new();
        assert!(set.is_empty());
        set.try_admit("http://example.com/");
        assert!(!set.is_empty());
    }

    #[test]
    fn test_concurrent_admission_exactly_one_winner() {
        let set = Arc::new(DedupSet::new());
        let mut handles = Vec::new();

        for _ in 0..32 {
            let set = Arc::clone(&set);
            handles.push(std::thread::spawn(move || {
                set.try_admit("http://example.com/contended")
            }));
        }

        let wins: usize = handles
            .into_iter()
            .map(|h| h.join().unwrap() as usize)
            .sum();

        assert_eq!(wins, 1, "exactly one thread may admit a given URL");
        assert_eq!(set.len(), 1);
        assert_eq!(set.duplicates(), 31);
    }

    #[test]
    fn test_concurrent_distinct_urls() {
        let set = Arc::new(DedupSet::new());
        let mut handles = Vec::new();

        for i in 0..16 {
            let set = Arc::clone(&set);
            handles.push(std::thread::spawn(move || {
                assert!(set.try_admit(&format!("http://example.com/{}", i)));
            }));
        }

        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(set.len(), 16);
        assert_eq!(set.duplicates(), 0);
    }
}
