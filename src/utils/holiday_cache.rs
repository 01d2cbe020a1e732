use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use futures_util::StreamExt;
use moka::future::Cache;
use once_cell::sync::OnceCell;
use sqlx::MySqlPool;
use std::sync::Arc;
use std::time::Duration;

use crate::model::holiday::Holiday;

/// Holiday calendar per civil year.
static HOLIDAY_CACHE: OnceCell<Cache<i32, Arc<Vec<Holiday>>>> = OnceCell::new();

const DEFAULT_CAPACITY: u64 = 64;
const DEFAULT_TTL_SECS: u64 = 86400;

/// Sizes the cache. Only the first call has any effect.
pub fn init(capacity: u64, ttl: Duration) {
    let _ = HOLIDAY_CACHE.set(build(capacity, ttl));
}

fn build(capacity: u64, ttl: Duration) -> Cache<i32, Arc<Vec<Holiday>>> {
    Cache::builder()
        .max_capacity(capacity)
        .time_to_live(ttl)
        .build()
}

fn cache() -> &'static Cache<i32, Arc<Vec<Holiday>>> {
    HOLIDAY_CACHE.get_or_init(|| build(DEFAULT_CAPACITY, Duration::from_secs(DEFAULT_TTL_SECS)))
}

pub async fn invalidate_year(year: i32) {
    cache().invalidate(&year).await;
}

async fn load_year(pool: &MySqlPool, year: i32) -> Result<Vec<Holiday>> {
    let holidays = sqlx::query_as::<_, Holiday>(
        r#"
        SELECT id, holiday_date, name, is_optional
        FROM holidays
        WHERE holiday_date >= ? AND holiday_date < ?
        ORDER BY holiday_date
        "#,
    )
    .bind(year_start(year))
    .bind(year_start(year + 1))
    .fetch_all(pool)
    .await?;

    Ok(holidays)
}

fn year_start(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(NaiveDate::MIN)
}

/// Holidays of one civil year, from cache or the database.
pub async fn holidays_for_year(pool: &MySqlPool, year: i32) -> Result<Arc<Vec<Holiday>>> {
    if let Some(hit) = cache().get(&year).await {
        return Ok(hit);
    }

    let holidays = Arc::new(load_year(pool, year).await?);
    cache().insert(year, holidays.clone()).await;
    tracing::debug!(year, count = holidays.len(), "Holiday cache filled");

    Ok(holidays)
}

/// Holidays falling inside `[start, end]`.
pub async fn holidays_between(
    pool: &MySqlPool,
    start: NaiveDate,
    end: NaiveDate,
) -> Result<Vec<Holiday>> {
    let mut out = Vec::new();
    for year in start.year()..=end.year() {
        let holidays = holidays_for_year(pool, year).await?;
        out.extend(
            holidays
                .iter()
                .filter(|h| h.date >= start && h.date <= end)
                .cloned(),
        );
    }
    Ok(out)
}

/// Streams the calendars of `years` into the cache at startup.
pub async fn warmup_holiday_cache(pool: &MySqlPool, years: &[i32]) -> Result<()> {
    let (Some(first), Some(last)) = (years.iter().min(), years.iter().max()) else {
        return Ok(());
    };

    let mut stream = sqlx::query_as::<_, Holiday>(
        r#"
        SELECT id, holiday_date, name, is_optional
        FROM holidays
        WHERE holiday_date >= ? AND holiday_date < ?
        ORDER BY holiday_date
        "#,
    )
    .bind(year_start(*first))
    .bind(year_start(*last + 1))
    .fetch(pool);

    let mut by_year: std::collections::BTreeMap<i32, Vec<Holiday>> =
        years.iter().map(|y| (*y, Vec::new())).collect();
    let mut total_count = 0usize;

    while let Some(row) = stream.next().await {
        let holiday = row?;
        if let Some(bucket) = by_year.get_mut(&holiday.date.year()) {
            bucket.push(holiday);
            total_count += 1;
        }
    }

    let inserts: Vec<_> = by_year
        .into_iter()
        .map(|(year, holidays)| cache().insert(year, Arc::new(holidays)))
        .collect();
    futures::future::join_all(inserts).await;

    tracing::info!(
        years = ?years,
        total_count,
        "Holiday cache warmup complete"
    );

    Ok(())
}
