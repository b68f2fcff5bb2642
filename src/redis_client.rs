use redis::{aio::MultiplexedConnection, Client};
use tracing::info;

#[derive(Clone)]
pub struct RedisClient {
    pub conn: MultiplexedConnection,
}

impl RedisClient {
    pub async fn new(redis_url: &str) -> redis::RedisResult<Self> {
        let client = Client::open(redis_url)?;
        let mut conn = client.get_multiplexed_async_connection().await?;
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(RedisClient { conn })
    }

    /// Подключение только если URL задан.
    pub async fn connect_optional(redis_url: Option<&str>) -> redis::RedisResult<Option<Self>> {
        match redis_url {
            Some(url) => {
                let client = Self::new(url).await?;
                info!("Redis connected");
                Ok(Some(client))
            }
            None => Ok(None),
        }
    }
}
