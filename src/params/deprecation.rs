use std::sync::{Arc, Mutex, PoisonError};

/// Append-only record of deprecated parameter names used during a run.
///
/// Clones share the same list, so one handle can be given to the mapping step
/// and another kept by the caller that reports the warning.
#[derive(Debug, Clone, Default)]
pub struct DeprecationLog {
    inner: Arc<Mutex<Vec<String>>>,
}

impl DeprecationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `name` unless it was already recorded
    pub fn add(&self, name: &str) {
        let mut names = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn is_empty(&self) -> bool {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    pub fn clear(&self) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_initially_empty() {
        assert!(DeprecationLog::new().is_empty());
    }

    #[test]
    fn test_add_records_each_name_once() {
        let log = DeprecationLog::new();
        log.add("param1");
        log.add("param2");
        log.add("param1");

        assert_eq!(log.names(), vec!["param1", "param2"]);
    }

    #[test]
    fn test_clones_share_state() {
        let log = DeprecationLog::new();
        let handle = log.clone();
        handle.add("blackduck_url");

        assert_eq!(log.names(), vec!["blackduck_url"]);
        log.clear();
        assert!(handle.is_empty());
    }

    #[test]
    fn test_concurrent_appends() {
        let log = DeprecationLog::new();
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let log = log.clone();
                thread::spawn(move || log.add(&format!("param{}", i)))
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(log.names().len(), 8);
    }

    #[test]
    fn test_separate_logs_do_not_cross_contaminate() {
        let first = DeprecationLog::new();
        let second = DeprecationLog::new();
        first.add("blackduck_token");

        assert!(second.is_empty());
    }
}
