use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Descriptor → native handle cache.
///
/// Holds at most one handle per distinct key. Handles are created on the first `resolve_with`
/// for a key and stay until released; a failed creation leaves the cache untouched. The cache
/// never disposes handles on its own: every removal path hands the handle to a caller-supplied
/// dispose function, so the owner decides how (and in what order) native objects go away.
pub struct ResourceCache<K, H> {
    entries: HashMap<K, H>,
    /// 缓存命中计数
    hit_count: u64,
    /// 缓存未命中计数
    miss_count: u64,
}

impl<K, H> Default for ResourceCache<K, H> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            hit_count: 0,
            miss_count: 0,
        }
    }
}

impl<K: Eq + Hash + Clone, H: Clone> ResourceCache<K, H> {
    /// 创建空缓存
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取或创建句柄：命中直接返回，未命中调用 `create`
    pub fn resolve_with<E, F>(&mut self, key: &K, create: F) -> Result<H, E>
    where
        F: FnOnce() -> Result<H, E>,
    {
        if let Some(handle) = self.entries.get(key) {
            self.hit_count += 1;
            return Ok(handle.clone());
        }

        self.miss_count += 1;
        let handle = create()?;
        self.entries.insert(key.clone(), handle.clone());
        Ok(handle)
    }

    pub fn get(&self, key: &K) -> Option<&H> {
        self.entries.get(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    /// Remove the entry for `key` and pass its handle to `dispose`.
    ///
    /// Returns `false` (and does not call `dispose`) when there is no entry.
    pub fn release_with<F>(&mut self, key: &K, dispose: F) -> bool
    where
        F: FnOnce(H),
    {
        match self.entries.remove(key) {
            Some(handle) => {
                dispose(handle);
                true
            }
            None => false,
        }
    }

    /// 清空缓存，逐个交给 `dispose`，返回释放数量
    pub fn release_all_with<F>(&mut self, mut dispose: F) -> usize
    where
        F: FnMut(H),
    {
        let count = self.entries.len();
        for (_, handle) in self.entries.drain() {
            dispose(handle);
        }
        count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.len(),
            hit_count: self.hit_count,
            miss_count: self.miss_count,
        }
    }

    /// 重置命中统计
    pub fn reset_stats(&mut self) {
        self.hit_count = 0;
        self.miss_count = 0;
    }
}

/// 缓存统计信息
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub entries: usize,
    pub hit_count: u64,
    pub miss_count: u64,
}

impl CacheStats {
    /// 缓存命中率
    pub fn hit_rate(&self) -> f64 {
        let total = self.hit_count + self.miss_count;
        if total > 0 {
            self.hit_count as f64 / total as f64
        } else {
            0.0
        }
    }
}

impl std::ops::Add for CacheStats {
    type Output = CacheStats;

    fn add(self, rhs: CacheStats) -> CacheStats {
        CacheStats {
            entries: self.entries + rhs.entries,
            hit_count: self.hit_count + rhs.hit_count,
            miss_count: self.miss_count + rhs.miss_count,
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "entries={}, hits={}, misses={}, rate={:.1}%",
            self.entries,
            self.hit_count,
            self.miss_count,
            self.hit_rate() * 100.0
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn counter() -> impl FnMut() -> Result<u32, ()> {
        let next = Cell::new(0u32);
        move || {
            next.set(next.get() + 1);
            Ok(next.get())
        }
    }

    #[test]
    fn test_cache_new() {
        let cache: ResourceCache<u32, u32> = ResourceCache::new();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats::default());
    }

    #[test]
    fn test_hit_returns_same_handle() {
        let mut cache = ResourceCache::new();
        let mut make = counter();
        let a = cache.resolve_with(&"red", &mut make).unwrap();
        let b = cache.resolve_with(&"red", &mut make).unwrap();
        assert_eq!(a, b);
        assert_eq!(cache.len(), 1);

        let stats = cache.stats();
        assert_eq!((stats.hit_count, stats.miss_count), (1, 1));
        assert_eq!(stats.hit_rate(), 0.5);
    }

    #[test]
    fn test_release_then_resolve_allocates_fresh() {
        let mut cache = ResourceCache::new();
        let mut make = counter();
        let first = cache.resolve_with(&1, &mut make).unwrap();

        let mut disposed = Vec::new();
        assert!(cache.release_with(&1, |h| disposed.push(h)));
        assert!(!cache.release_with(&1, |h| disposed.push(h)));
        assert_eq!(disposed, vec![first]);

        let second = cache.resolve_with(&1, &mut make).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_failed_create_does_not_insert() {
        let mut cache: ResourceCache<&str, u32> = ResourceCache::new();
        let err = cache.resolve_with(&"broken", || Err("bad bytes"));
        assert_eq!(err, Err("bad bytes"));
        assert!(!cache.contains(&"broken"));
        assert_eq!(cache.stats().miss_count, 1);
    }

    #[test]
    fn test_release_all_empties() {
        let mut cache = ResourceCache::new();
        let mut make = counter();
        for key in 0..4 {
            cache.resolve_with(&key, &mut make).unwrap();
        }
        let mut disposed = Vec::new();
        assert_eq!(cache.release_all_with(|h| disposed.push(h)), 4);
        disposed.sort();
        assert_eq!(disposed, vec![1, 2, 3, 4]);
        assert!(cache.is_empty());

        assert_eq!(cache.resolve_with(&0, &mut make).unwrap(), 5);
    }
}
