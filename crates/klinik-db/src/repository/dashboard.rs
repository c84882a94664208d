//! # Dashboard Repository
//!
//! Read-only summary for the admin dashboard.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN (one snapshot)                                                   │
//! │    COUNT patients            created_at ∈ [today 00:00, now]           │
//! │    COUNT patients            created_at ∈ [month 1st 00:00, now]       │
//! │    SUM   sales total         created_at ∈ [today 00:00, now]           │
//! │    SUM   sales total         created_at ∈ [month 1st 00:00, now]       │
//! │    5 newest patients / 5 newest sales by created_at                    │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Day and month boundaries are local midnights (see `klinik_core::period`).

use chrono::{DateTime, Local, TimeZone, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use crate::error::DbResult;
use klinik_core::money::Money;
use klinik_core::period::Periods;
use klinik_core::{DashboardStats, RecentPatient, RecentSale, RECENT_ACTIVITY_LIMIT};

/// Repository for dashboard aggregates.
#[derive(Debug, Clone)]
pub struct DashboardRepository {
    pool: SqlitePool,
}

impl DashboardRepository {
    /// Creates a new DashboardRepository.
    pub fn new(pool: SqlitePool) -> Self {
        DashboardRepository { pool }
    }

    /// Computes the dashboard as of the current local time.
    pub async fn stats(&self) -> DbResult<DashboardStats> {
        self.stats_at(Local::now()).await
    }

    /// Computes the dashboard as of `now`, using `now`'s time zone for the
    /// day and month boundaries.
    pub async fn stats_at<Tz: TimeZone>(&self, now: DateTime<Tz>) -> DbResult<DashboardStats> {
        let periods = Periods::at(&now);
        self.stats_for(periods).await
    }

    async fn stats_for(&self, periods: Periods) -> DbResult<DashboardStats> {
        debug!(
            today_start = %periods.today_start,
            month_start = %periods.month_start,
            "Computing dashboard stats"
        );

        let mut tx = self.pool.begin().await?;

        let total_patients_today = count_patients(&mut *tx, periods.today_start, periods.now).await?;
        let total_patients_this_month =
            count_patients(&mut *tx, periods.month_start, periods.now).await?;
        let total_sales_today = sum_sales(&mut *tx, periods.today_start, periods.now).await?;
        let total_sales_this_month = sum_sales(&mut *tx, periods.month_start, periods.now).await?;

        let recent_patients = sqlx::query_as::<_, RecentPatient>(
            r#"
            SELECT id, name, examination_date
            FROM patients
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(RECENT_ACTIVITY_LIMIT)
        .fetch_all(&mut *tx)
        .await?;

        let recent_sales = sqlx::query_as::<_, RecentSale>(
            r#"
            SELECT id, item_service_name, total_cents, created_at
            FROM sales_transactions
            ORDER BY created_at DESC, rowid DESC
            LIMIT ?1
            "#,
        )
        .bind(RECENT_ACTIVITY_LIMIT)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(DashboardStats {
            total_patients_today,
            total_patients_this_month,
            total_sales_today,
            total_sales_this_month,
            recent_patients,
            recent_sales,
        })
    }
}

async fn count_patients(
    conn: &mut SqliteConnection,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> DbResult<i64> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM patients WHERE created_at >= ?1 AND created_at <= ?2",
    )
    .bind(from)
    .bind(to)
    .fetch_one(conn)
    .await?;

    Ok(count)
}

async fn sum_sales(
    conn: &mut SqliteConnection,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> DbResult<Money> {
    let cents: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(total_cents), 0) FROM sales_transactions WHERE created_at >= ?1 AND created_at <= ?2",
    )
    .bind(from)
    .bind(to)
    .fetch_one(conn)
    .await?;

    Ok(Money::from_cents(cents))
}

// =============================================================================
// Unit Tests
// =============================================================================
