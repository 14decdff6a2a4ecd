//! View invalidation signal over Redis pub/sub
//!
//! Mutating operations publish the path of the views they dirty (for
//! example "/assets" or "/assets/42"); UI processes subscribed to the
//! channel re-fetch. Delivery is fire-and-forget: a Redis outage must
//! never fail the operation that triggered the signal.

use redis::{AsyncCommands, Client};

use crate::error::{AppError, AppResult};

const CHANNEL: &str = "trackit:invalidate";

#[derive(Clone)]
pub struct InvalidationService {
    client: Client,
}

impl InvalidationService {
    /// Create the service. The client connects lazily, so an unreachable
    /// Redis does not prevent startup.
    pub fn new(url: &str) -> AppResult<Self> {
        let client = Client::open(url)
            .map_err(|e| AppError::Internal(format!("Failed to create Redis client: {}", e)))?;
        Ok(Self { client })
    }

    /// Publish an invalidation signal for the given view path.
    /// Failures are logged and swallowed.
    pub async fn invalidate(&self, path: &str) {
        if let Err(e) = self.publish(path).await {
            tracing::warn!(path, "view invalidation publish failed: {}", e);
        }
    }

    async fn publish(&self, path: &str) -> redis::RedisResult<()> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        conn.publish::<_, _, ()>(CHANNEL, path).await
    }
}
