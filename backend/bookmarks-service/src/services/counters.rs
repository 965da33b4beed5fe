use crate::error::ServiceResult;
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use tracing::warn;
use uuid::Uuid;

/// View counter and ranking storage
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CounterStore: Send + Sync {
    /// Add one view to the item counter and its ranking score; returns the new count
    async fn increment_views(&self, item_id: Uuid) -> ServiceResult<i64>;

    /// Current view count (0 if never viewed)
    async fn views(&self, item_id: Uuid) -> ServiceResult<i64>;

    /// Up to `n` highest-scored items with their scores, highest first.
    /// Order among equal scores is store-defined.
    async fn top_with_scores(&self, n: usize) -> ServiceResult<Vec<(Uuid, f64)>>;

    /// Up to `limit` items whose score equals `score`, ascending by id
    async fn ties_at(&self, score: f64, limit: usize) -> ServiceResult<Vec<Uuid>>;

    async fn ping(&self) -> ServiceResult<()>;
}

/// Redis view counters
///
/// Keys: {prefix}image:{image_id}:views (string counter),
///       {prefix}image_ranking (sorted set, member = image id, score = views)
/// No TTL: counters live as long as the Redis dataset.
#[derive(Clone)]
pub struct RedisCounterStore {
    redis: ConnectionManager,
    prefix: String,
}

impl RedisCounterStore {
    pub fn new(redis: ConnectionManager, prefix: impl Into<String>) -> Self {
        Self {
            redis,
            prefix: prefix.into(),
        }
    }

    fn views_key(&self, item_id: Uuid) -> String {
        format!("{}image:{}:views", self.prefix, item_id)
    }

    fn ranking_key(&self) -> String {
        format!("{}image_ranking", self.prefix)
    }
}

/// Inclusive ZRANGE stop index for the first `n` members (`n > 0`)
fn stop_index(n: usize) -> isize {
    isize::try_from(n - 1).unwrap_or(isize::MAX)
}

/// ZRANGEBYSCORE LIMIT count; saturates instead of wrapping negative,
/// which Redis would read as "no limit"
fn count_arg(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}

fn parse_members(members: Vec<String>) -> Vec<Uuid> {
    members
        .into_iter()
        .filter_map(|member| match Uuid::parse_str(&member) {
            Ok(id) => Some(id),
            Err(_) => {
                warn!(member = %member, "skipping non-uuid ranking member");
                None
            }
        })
        .collect()
}

#[async_trait]
impl CounterStore for RedisCounterStore {
    async fn increment_views(&self, item_id: Uuid) -> ServiceResult<i64> {
        let member = item_id.to_string();
        let (views, _score): (i64, f64) = redis::pipe()
            .atomic()
            .incr(self.views_key(item_id), 1)
            .zincr(self.ranking_key(), &member, 1)
            .query_async(&mut self.redis.clone())
            .await?;
        Ok(views)
    }

    async fn views(&self, item_id: Uuid) -> ServiceResult<i64> {
        let views: Option<i64> = self.redis.clone().get(self.views_key(item_id)).await?;
        Ok(views.unwrap_or(0))
    }

    async fn top_with_scores(&self, n: usize) -> ServiceResult<Vec<(Uuid, f64)>> {
        if n == 0 {
            return Ok(Vec::new());
        }

        let entries: Vec<(String, f64)> = self
            .redis
            .clone()
            .zrevrange_withscores(self.ranking_key(), 0, stop_index(n))
            .await?;

        Ok(entries
            .into_iter()
            .filter_map(|(member, score)| match Uuid::parse_str(&member) {
                Ok(id) => Some((id, score)),
                Err(_) => {
                    warn!(member = %member, "skipping non-uuid ranking member");
                    None
                }
            })
            .collect())
    }

    async fn ties_at(&self, score: f64, limit: usize) -> ServiceResult<Vec<Uuid>> {
        if limit == 0 {
            return Ok(Vec::new());
        }

        // Equal-score members come back in ascending lexicographic order,
        // which for hyphenated UUIDs is ascending id order.
        let members: Vec<String> = self
            .redis
            .clone()
            .zrangebyscore_limit(self.ranking_key(), score, score, 0, count_arg(limit))
            .await?;
        Ok(parse_members(members))
    }

    async fn ping(&self) -> ServiceResult<()> {
        let _: String = redis::cmd("PING")
            .query_async(&mut self.redis.clone())
            .await?;
        Ok(())
    }
}
