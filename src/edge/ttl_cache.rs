//! TTL 缓存
//!
//! 基于 LRU 的本地缓存，每个条目带有自己的过期时间。
//! 项目配置、语言名称和页面缓存共用这一实现。

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use blake3::Hasher;
use lru::LruCache;
use tokio::sync::RwLock;

/// 缓存条目
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    created_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    /// 检查是否过期
    fn is_expired(&self) -> bool {
        self.created_at.elapsed() >= self.ttl
    }
}

/// 缓存统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub expired: u64,
    pub sets: u64,
}

impl CacheStats {
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    expired: AtomicU64,
    sets: AtomicU64,
}

/// 带 TTL 的 LRU 缓存，可在任务间共享
#[derive(Clone)]
pub struct TtlCache<V> {
    cache: Arc<RwLock<LruCache<String, CacheEntry<V>>>>,
    default_ttl: Duration,
    counters: Arc<Counters>,
}

impl<V: Clone> TtlCache<V> {
    pub fn new(capacity: usize, default_ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: Arc::new(RwLock::new(LruCache::new(capacity))),
            default_ttl,
            counters: Arc::new(Counters::default()),
        }
    }

    /// 生成缓存键
    pub fn key(namespace: &str, parts: &[&str]) -> String {
        let mut hasher = Hasher::new();
        for part in parts {
            hasher.update(part.as_bytes());
            hasher.update(&[0]);
        }
        format!("{}:{}", namespace, hasher.finalize().to_hex())
    }

    /// 获取缓存项，过期项会被移除
    pub async fn get(&self, key: &str) -> Option<V> {
        let mut cache = self.cache.write().await;

        let found = cache
            .get(key)
            .map(|entry| (entry.is_expired(), entry.value.clone()));

        match found {
            Some((true, _)) => {
                cache.pop(key);
                self.counters.expired.fetch_add(1, Ordering::Relaxed);
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
            Some((false, value)) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                Some(value)
            }
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// 使用默认 TTL 写入
    pub async fn insert(&self, key: String, value: V) {
        self.insert_with_ttl(key, value, self.default_ttl).await;
    }

    pub async fn insert_with_ttl(&self, key: String, value: V, ttl: Duration) {
        let mut cache = self.cache.write().await;
        cache.put(
            key,
            CacheEntry {
                value,
                created_at: Instant::now(),
                ttl,
            },
        );
        self.counters.sets.fetch_add(1, Ordering::Relaxed);
    }

    pub async fn remove(&self, key: &str) -> bool {
        self.cache.write().await.pop(key).is_some()
    }

    /// 获取缓存大小（含尚未清理的过期项）
    pub async fn len(&self) -> usize {
        self.cache.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.cache.read().await.is_empty()
    }

    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }

    /// 获取统计信息
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            expired: self.counters.expired.load(Ordering::Relaxed),
            sets: self.counters.sets.load(Ordering::Relaxed),
        }
    }
}
