use anyhow::{Error, Result, anyhow};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::MultiplexedConnection};
use tracing::{debug, info};

use crate::clients::queue::{QueueError, QueueStore};

/// Queue store backed by a Redis list (`RPUSH` tail, `LPOP` head).
pub struct RedisQueue {
    connection: MultiplexedConnection,
}

impl RedisQueue {
    pub async fn connect(redis_url: &str) -> Result<Self, Error> {
        info!("Connecting to Redis...");

        let client = Client::open(redis_url)
            .map_err(|e| anyhow!("Failed to create redis client: {}", e))?;

        let mut connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| anyhow!("Failed to connect to redis: {}", e))?;

        connection
            .ping::<String>()
            .await
            .map_err(|e| anyhow!("Redis ping failed: {}", e))?;

        info!("Redis connection established");

        Ok(Self { connection })
    }
}

#[async_trait]
impl QueueStore for RedisQueue {
    async fn append(&self, key: &str, value: &str) -> Result<u64, QueueError> {
        let mut conn = self.connection.clone();
        let depth: u64 = conn.rpush(key, value).await?;

        debug!(queue_key = key, depth, "Entry appended");
        Ok(depth)
    }

    async fn pop_front(&self, key: &str) -> Result<Option<String>, QueueError> {
        let mut conn = self.connection.clone();
        let entry: Option<String> = conn.lpop(key, None).await?;
        Ok(entry)
    }

    async fn len(&self, key: &str) -> Result<u64, QueueError> {
        let mut conn = self.connection.clone();
        let depth: u64 = conn.llen(key).await?;
        Ok(depth)
    }

    async fn ping(&self) -> Result<(), QueueError> {
        let mut conn = self.connection.clone();
        conn.ping::<String>().await?;
        Ok(())
    }
}
