use crate::redis_client::RedisClient;
use tracing::info;

pub mod events;

/// Кеш поверх Redis. Без подключения все чтения промахиваются,
/// а записи и инвалидация ничего не делают.
#[derive(Clone)]
pub struct CacheService {
    redis: Option<RedisClient>,
    events_ttl_seconds: u64,
}

impl CacheService {
    pub fn new(redis: Option<RedisClient>, events_ttl_seconds: u64) -> Self {
        if redis.is_none() {
            info!("Redis is not configured, event list cache disabled");
        }
        Self { redis, events_ttl_seconds }
    }

    pub fn disabled() -> Self {
        Self { redis: None, events_ttl_seconds: 0 }
    }

    pub fn is_enabled(&self) -> bool {
        self.redis.is_some()
    }
}
