//! The warehouse client: one lazily created connection pool per process,
//! plus the composer and result caches the typed repositories share.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::{Query, QueryAs};
use sqlx::{PgPool, Postgres};
use tokio::sync::OnceCell;

use crate::cache::{Clock, ResultCache, SystemClock};
use crate::compose::{ComposedQuery, QueryComposer};
use crate::config::WarehouseConfig;
use crate::error::{classify, WarehouseError, WarehouseResult};
use crate::models::dimension::DimensionValue;
use crate::models::game::{DimensionRef, GameRecord, PlayerCountVotes};
use crate::models::stats::{DistributionBucket, SummaryStats};
use crate::params::ParamValue;
use crate::template::TemplateBindings;

/// Row type for bare COUNT queries.
pub(crate) type CountRow = (i64,);

/// One result cache per row shape, all sharing the configured TTL and clock.
pub(crate) struct Caches {
    pub games: ResultCache<GameRecord>,
    pub counts: ResultCache<CountRow>,
    pub dimension_refs: ResultCache<DimensionRef>,
    pub player_counts: ResultCache<PlayerCountVotes>,
    pub dimension_values: ResultCache<DimensionValue>,
    pub stats: ResultCache<SummaryStats>,
    pub buckets: ResultCache<DistributionBucket>,
}

impl Caches {
    fn new(ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Caches {
            games: ResultCache::new(ttl, clock.clone()),
            counts: ResultCache::new(ttl, clock.clone()),
            dimension_refs: ResultCache::new(ttl, clock.clone()),
            player_counts: ResultCache::new(ttl, clock.clone()),
            dimension_values: ResultCache::new(ttl, clock.clone()),
            stats: ResultCache::new(ttl, clock.clone()),
            buckets: ResultCache::new(ttl, clock),
        }
    }

    async fn clear_all(&self) {
        self.games.clear().await;
        self.counts.clear().await;
        self.dimension_refs.clear().await;
        self.player_counts.clear().await;
        self.dimension_values.clear().await;
        self.stats.clear().await;
        self.buckets.clear().await;
    }
}

/// Process-wide handle to the warehouse.
///
/// The pool is created on first use and reused for the process lifetime;
/// initialization happens at most once even under concurrent first calls.
/// The handle is safe for concurrent read-only use: construct it once and
/// share it (`Arc<Warehouse>`) across request workers.
pub struct Warehouse {
    config: WarehouseConfig,
    composer: QueryComposer,
    pool: OnceCell<PgPool>,
    caches: Caches,
}

impl Warehouse {
    /// Build a warehouse handle from configuration. No connection is made
    /// until the first query.
    pub fn new(config: WarehouseConfig) -> Self {
        Warehouse::with_clock(config, Arc::new(SystemClock))
    }

    /// Like [`Warehouse::new`] with an injected cache clock, so tests drive
    /// expiry by hand.
    pub fn with_clock(config: WarehouseConfig, clock: Arc<dyn Clock>) -> Self {
        let composer = QueryComposer::new(TemplateBindings::from_config(&config));
        let ttl = Duration::from_secs(config.cache_ttl_secs);
        Warehouse {
            config,
            composer,
            pool: OnceCell::new(),
            caches: Caches::new(ttl, clock),
        }
    }

    pub fn config(&self) -> &WarehouseConfig {
        &self.config
    }

    pub fn composer(&self) -> &QueryComposer {
        &self.composer
    }

    pub(crate) fn caches(&self) -> &Caches {
        &self.caches
    }

    /// Drop every cached result. Safe to call concurrently with in-flight
    /// requests; they re-execute on their next lookup.
    pub async fn clear_cache(&self) {
        self.caches.clear_all().await;
        tracing::info!("result caches cleared");
    }

    /// Verify the warehouse is reachable.
    pub async fn health_check(&self) -> WarehouseResult<()> {
        let pool = self.pool().await?;
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(pool)
            .await
            .map_err(|e| classify(e, "health_check"))?;
        Ok(())
    }

    async fn pool(&self) -> WarehouseResult<&PgPool> {
        self.pool
            .get_or_try_init(|| async {
                tracing::info!(
                    environment = %self.config.environment,
                    dataset = %self.config.dataset,
                    "connecting to warehouse"
                );
                PgPoolOptions::new()
                    .max_connections(self.config.max_connections)
                    .acquire_timeout(Duration::from_secs(self.config.acquire_timeout_secs))
                    .connect(&self.config.database_url)
                    .await
            })
            .await
            .map_err(|source| WarehouseError::Connection { source })
    }

    /// Execute a composed query, decoding every row.
    pub(crate) async fn fetch_all<T>(
        &self,
        composed: &ComposedQuery,
        mode: &'static str,
    ) -> WarehouseResult<Vec<T>>
    where
        T: for<'r> sqlx::FromRow<'r, PgRow> + Send + Unpin,
    {
        let pool = self.pool().await?;
        let query = bind_query_as(sqlx::query_as::<_, T>(&composed.sql), &composed.params);
        let rows = query
            .fetch_all(pool)
            .await
            .map_err(|e| classify(e, mode))?;
        tracing::debug!(mode, rows = rows.len(), "query executed");
        Ok(rows)
    }

    /// Execute a statement that returns no rows (bookkeeping inserts).
    /// Template tokens in `sql` are resolved here.
    pub(crate) async fn execute(
        &self,
        sql: &str,
        params: &[ParamValue],
        mode: &'static str,
    ) -> WarehouseResult<u64> {
        let sql = self.composer.bindings().resolve(sql);
        let pool = self.pool().await?;
        let query = bind_query(sqlx::query(&sql), params);
        let result = query.execute(pool).await.map_err(|e| classify(e, mode))?;
        Ok(result.rows_affected())
    }
}

fn bind_query_as<'q, T>(
    mut query: QueryAs<'q, Postgres, T, PgArguments>,
    params: &[ParamValue],
) -> QueryAs<'q, Postgres, T, PgArguments> {
    for param in params {
        query = match param {
            ParamValue::Bool(v) => query.bind(*v),
            ParamValue::Int(v) => query.bind(*v),
            ParamValue::Float(v) => query.bind(*v),
            ParamValue::Text(v) => query.bind(v.clone()),
            ParamValue::IntArray(v) => query.bind(v.clone()),
        };
    }
    query
}

fn bind_query<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &[ParamValue],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            ParamValue::Bool(v) => query.bind(*v),
            ParamValue::Int(v) => query.bind(*v),
            ParamValue::Float(v) => query.bind(*v),
            ParamValue::Text(v) => query.bind(v.clone()),
            ParamValue::IntArray(v) => query.bind(v.clone()),
        };
    }
    query
}
