use crate::cache::CacheService;
use redis::AsyncCommands;
use tracing::{debug, warn};

const EVENTS_LIST_PREFIX: &str = "events:list:";
const EVENTS_GENERATION_KEY: &str = "events:generation";

// Ключ содержит поколение: после инвалидации старые ключи никто не читает,
// и они доживают до конца TTL.
fn events_list_key(generation: u64, ordering_key: &str) -> String {
    format!("{}{}:{}", EVENTS_LIST_PREFIX, generation, ordering_key)
}

impl CacheService {
    /// Текущее поколение списка событий. `None`, если кеш выключен или Redis недоступен.
    pub async fn events_generation(&self) -> Option<u64> {
        let redis = self.redis.as_ref()?;
        let mut conn = redis.conn.clone();
        let res: redis::RedisResult<Option<u64>> = conn.get(EVENTS_GENERATION_KEY).await;
        match res {
            Ok(generation) => Some(generation.unwrap_or(0)),
            Err(e) => {
                warn!("Failed to read events cache generation: {:?}", e);
                None
            }
        }
    }

    /// Сериализованный список событий для данного порядка сортировки.
    pub async fn get_events_list(&self, generation: u64, ordering_key: &str) -> Option<String> {
        let redis = self.redis.as_ref()?;
        let mut conn = redis.conn.clone();
        let key = events_list_key(generation, ordering_key);
        let res: redis::RedisResult<Option<String>> = conn.get(&key).await;
        match res {
            Ok(hit) => hit,
            Err(e) => {
                warn!("Failed to read events cache {}: {:?}", key, e);
                None
            }
        }
    }

    // Поколение берется до чтения из базы. Если список успели инвалидировать,
    // запись уйдет под устаревший ключ.
    pub async fn save_events_list(&self, generation: u64, ordering_key: &str, json: &str) {
        let Some(redis) = self.redis.as_ref() else {
            return;
        };
        let mut conn = redis.conn.clone();
        let key = events_list_key(generation, ordering_key);
        let res: Result<(), _> = conn.set_ex(&key, json, self.events_ttl_seconds).await;
        if let Err(e) = res {
            warn!("Failed to cache events list {}: {:?}", key, e);
        }
    }

    // Любая запись в события или оценки меняет список и средние оценки
    pub async fn invalidate_events(&self) {
        let Some(redis) = self.redis.as_ref() else {
            return;
        };
        let mut conn = redis.conn.clone();
        let res: redis::RedisResult<u64> = conn.incr(EVENTS_GENERATION_KEY, 1).await;
        match res {
            Ok(generation) => debug!("Events cache moved to generation {}", generation),
            Err(e) => warn!("Failed to invalidate events cache: {:?}", e),
        }
    }
}
