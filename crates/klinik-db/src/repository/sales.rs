//! # Sales Transaction Repository
//!
//! Database operations for standalone single-item sales.
//!
//! ## Total Invariant
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  create   { price 25.00, qty 2 }          → total 50.00                 │
//! │  update   { price 30.00 }                  → merged { 30.00, 2 }        │
//! │                                            → total 60.00 (recomputed)   │
//! │                                                                         │
//! │  total is written only by this repository, always via price_line()     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Updates read and write inside one `BEGIN IMMEDIATE` transaction, so
//! concurrent updates to the same sale serialize on the write lock.

use chrono::{DateTime, Local, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{begin_write, contains_pattern, new_id, push_day_range, search_key};
use klinik_core::period::DayRange;
use klinik_core::pricing::price_line;
use klinik_core::validation::{validate_name, validate_search_query};
use klinik_core::{
    CreateSalesTransactionRequest, SalesTransaction, SalesTransactionFilter,
    UpdateSalesTransactionRequest,
};

const SELECT_SALE: &str = "SELECT id, item_service_name, price_cents, quantity, total_cents, created_at FROM sales_transactions";

/// Repository for sales transaction database operations.
#[derive(Debug, Clone)]
pub struct SalesTransactionRepository {
    pool: SqlitePool,
}

impl SalesTransactionRepository {
    /// Creates a new SalesTransactionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SalesTransactionRepository { pool }
    }

    /// Records a sale, stamped with the current time.
    ///
    /// The total is computed here; the request has no total field.
    pub async fn create(
        &self,
        request: CreateSalesTransactionRequest,
    ) -> DbResult<SalesTransaction> {
        self.create_at(request, Utc::now()).await
    }

    /// Records a sale with an explicit creation time.
    pub async fn create_at(
        &self,
        request: CreateSalesTransactionRequest,
        created_at: DateTime<Utc>,
    ) -> DbResult<SalesTransaction> {
        let item_service_name = validate_name("item_service_name", &request.item_service_name)?;
        let total = price_line(request.price, request.quantity)?;

        let sale = SalesTransaction {
            id: new_id(),
            item_service_name,
            price: request.price,
            quantity: request.quantity,
            total,
            created_at,
        };

        debug!(id = %sale.id, total = %sale.total, "Creating sales transaction");

        sqlx::query(
            r#"
            INSERT INTO sales_transactions
                (id, item_service_name, item_service_name_search, price_cents, quantity,
                 total_cents, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&sale.id)
        .bind(&sale.item_service_name)
        .bind(search_key(&sale.item_service_name))
        .bind(sale.price)
        .bind(sale.quantity)
        .bind(sale.total)
        .bind(sale.created_at)
        .execute(&self.pool)
        .await?;

        Ok(sale)
    }

    /// Gets a sales transaction by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<SalesTransaction>> {
        let sale = sqlx::query_as::<_, SalesTransaction>(&format!("{} WHERE id = ?1", SELECT_SALE))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(sale)
    }

    /// Lists sales, newest first.
    ///
    /// ## Filters (AND-combined, all optional)
    /// - `date_from` / `date_to`: inclusive local calendar days over `created_at`
    ///   (an inverted pair matches nothing)
    /// - `search`: case-insensitive substring of the item/service name;
    ///   blank is ignored
    pub async fn list(&self, filter: &SalesTransactionFilter) -> DbResult<Vec<SalesTransaction>> {
        let range = DayRange::from_dates(filter.date_from, filter.date_to, &Local);
        let search = validate_search_query(filter.search.as_deref())?;

        debug!(?filter, "Listing sales transactions");

        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(SELECT_SALE);
        qb.push(" WHERE 1 = 1");

        push_day_range(&mut qb, "created_at", &range);

        if let Some(term) = search {
            qb.push(" AND item_service_name_search LIKE ")
                .push_bind(contains_pattern(&search_key(&term)))
                .push(" ESCAPE '\\'");
        }

        qb.push(" ORDER BY created_at DESC, rowid DESC");

        let sales = qb
            .build_query_as::<SalesTransaction>()
            .fetch_all(&self.pool)
            .await?;

        debug!(count = sales.len(), "Listed sales transactions");
        Ok(sales)
    }

    /// Applies a partial update, recomputing the total from the merged
    /// price and quantity.
    ///
    /// ## Errors
    /// - `DbError::NotFound` if the ID doesn't exist
    /// - `DbError::Validation` if a supplied field is invalid
    pub async fn update(
        &self,
        id: &str,
        request: UpdateSalesTransactionRequest,
    ) -> DbResult<SalesTransaction> {
        debug!(id = %id, "Updating sales transaction");

        let item_service_name = request
            .item_service_name
            .as_deref()
            .map(|v| validate_name("item_service_name", v))
            .transpose()?;

        let mut tx = begin_write(&self.pool).await?;

        let current =
            sqlx::query_as::<_, SalesTransaction>(&format!("{} WHERE id = ?1", SELECT_SALE))
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| DbError::not_found("SalesTransaction", id))?;

        if request.is_empty() {
            tx.commit().await?;
            return Ok(current);
        }

        let price = request.price.unwrap_or(current.price);
        let quantity = request.quantity.unwrap_or(current.quantity);
        let total = price_line(price, quantity)?;

        let updated = SalesTransaction {
            item_service_name: item_service_name.unwrap_or(current.item_service_name),
            price,
            quantity,
            total,
            ..current
        };

        sqlx::query(
            r#"
            UPDATE sales_transactions
            SET item_service_name = ?1, item_service_name_search = ?2, price_cents = ?3,
                quantity = ?4, total_cents = ?5
            WHERE id = ?6
            "#,
        )
        .bind(&updated.item_service_name)
        .bind(search_key(&updated.item_service_name))
        .bind(updated.price)
        .bind(updated.quantity)
        .bind(updated.total)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        debug!(id = %id, total = %updated.total, "Sales transaction updated");
        Ok(updated)
    }

    /// Permanently deletes a sales transaction.
    ///
    /// ## Errors
    /// - `DbError::NotFound` if the ID doesn't exist
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting sales transaction");

        let result = sqlx::query("DELETE FROM sales_transactions WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("SalesTransaction", id));
        }

        Ok(())
    }

    /// Counts all sales transactions.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales_transactions")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use chrono::{Duration, NaiveDate, TimeZone};
    use klinik_core::money::Money;

    async fn repo() -> SalesTransactionRepository {
        Database::new(DbConfig::in_memory())
            .await
            .unwrap()
            .sales_transactions()
    }

    fn request(name: &str, price: &str, quantity: i64) -> CreateSalesTransactionRequest {
        CreateSalesTransactionRequest {
            item_service_name: name.to_string(),
            price: price.parse().unwrap(),
            quantity,
        }
    }

    /// Local noon on the given day, as UTC.
    fn local_noon(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Local
            .with_ymd_and_hms(y, m, d, 12, 0, 0)
            .earliest()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn test_create_computes_total() {
        let repo = repo().await;

        let sale = repo.create(request("Konsultasi", "25", 2)).await.unwrap();

        assert_eq!(sale.price, Money::from_cents(2500));
        assert_eq!(sale.total, Money::from_cents(5000));
        assert_eq!(repo.get_by_id(&sale.id).await.unwrap().unwrap(), sale);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let repo = repo().await;

        assert!(repo
            .create(request("", "25", 1))
            .await
            .unwrap_err()
            .is_validation());
        assert!(repo
            .create(request("Obat", "0", 1))
            .await
            .unwrap_err()
            .is_validation());
        assert!(repo
            .create(request("Obat", "10", 0))
            .await
            .unwrap_err()
            .is_validation());

        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_price_only_update_recomputes_total() {
        let repo = repo().await;
        let sale = repo.create(request("Konsultasi", "25", 2)).await.unwrap();
        assert_eq!(sale.total.to_string(), "50.00");

        let updated = repo
            .update(
                &sale.id,
                UpdateSalesTransactionRequest {
                    price: Some("30".parse().unwrap()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.quantity, 2);
        assert_eq!(updated.total.to_string(), "60.00");

        let stored = repo.get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(stored.total, Money::from_cents(6000));
    }

    #[tokio::test]
    async fn test_quantity_only_update_recomputes_total() {
        let repo = repo().await;
        let sale = repo.create(request("Obat", "12.50", 2)).await.unwrap();

        let updated = repo
            .update(
                &sale.id,
                UpdateSalesTransactionRequest {
                    quantity: Some(3),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.total, Money::from_cents(3750));
    }

    #[tokio::test]
    async fn test_update_errors() {
        let repo = repo().await;
        let sale = repo.create(request("Obat", "10", 1)).await.unwrap();

        let err = repo
            .update(
                &sale.id,
                UpdateSalesTransactionRequest {
                    quantity: Some(-2),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_validation());

        // Failed update leaves the row untouched
        assert_eq!(repo.get_by_id(&sale.id).await.unwrap().unwrap(), sale);

        let err = repo
            .update("missing", UpdateSalesTransactionRequest::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_empty_update_returns_current_record() {
        let repo = repo().await;
        let sale = repo.create(request("Obat", "10", 1)).await.unwrap();

        let same = repo
            .update(&sale.id, UpdateSalesTransactionRequest::default())
            .await
            .unwrap();
        assert_eq!(same, sale);
    }

    #[tokio::test]
    async fn test_list_local_day_range_inclusive_and_descending() {
        let repo = repo().await;
        for day in 1..=5 {
            repo.create_at(request(&format!("Item {}", day), "10", 1), local_noon(2024, 1, day))
                .await
                .unwrap();
        }
        // Last second of Jan 4th still counts
        let late = local_noon(2024, 1, 4) + Duration::hours(11) + Duration::minutes(59);
        repo.create_at(request("Late", "10", 1), late).await.unwrap();

        let filter = SalesTransactionFilter {
            date_from: Some(date(2024, 1, 2)),
            date_to: Some(date(2024, 1, 4)),
            search: None,
        };
        let names: Vec<String> = repo
            .list(&filter)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.item_service_name)
            .collect();

        assert_eq!(names, vec!["Late", "Item 4", "Item 3", "Item 2"]);
    }

    #[tokio::test]
    async fn test_same_timestamp_lists_newest_insert_first() {
        let repo = repo().await;
        let at = local_noon(2024, 2, 1);
        repo.create_at(request("First", "10", 1), at).await.unwrap();
        repo.create_at(request("Second", "10", 1), at).await.unwrap();

        let sales = repo.list(&SalesTransactionFilter::default()).await.unwrap();
        assert_eq!(sales[0].item_service_name, "Second");
        assert_eq!(sales[1].item_service_name, "First");
    }

    #[tokio::test]
    async fn test_search_by_item_name() {
        let repo = repo().await;
        repo.create(request("Cabut Gigi", "150", 1)).await.unwrap();
        repo.create(request("Konsultasi Umum", "50", 1)).await.unwrap();

        let filter = SalesTransactionFilter {
            search: Some("gigi".to_string()),
            ..Default::default()
        };
        let sales = repo.list(&filter).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].item_service_name, "Cabut Gigi");
    }

    #[tokio::test]
    async fn test_search_folds_case_beyond_ascii() {
        let repo = repo().await;
        repo.create(request("Échographie Abdomen", "200", 1)).await.unwrap();
        repo.create(request("Konsultasi", "50", 1)).await.unwrap();

        let filter = SalesTransactionFilter {
            search: Some("échographie".to_string()),
            ..Default::default()
        };
        let sales = repo.list(&filter).await.unwrap();
        assert_eq!(sales.len(), 1);
        assert_eq!(sales[0].item_service_name, "Échographie Abdomen");
    }

    #[tokio::test]
    async fn test_list_inverted_range_is_empty() {
        let repo = repo().await;
        repo.create_at(request("Obat", "10", 1), local_noon(2024, 1, 3))
            .await
            .unwrap();

        let filter = SalesTransactionFilter {
            date_from: Some(date(2024, 1, 5)),
            date_to: Some(date(2024, 1, 1)),
            search: None,
        };
        assert!(repo.list(&filter).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_on_file_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("klinik.db")).max_connections(8))
            .await
            .unwrap();
        let repo = db.sales_transactions();
        let sale = repo.create(request("Konsultasi", "25", 1)).await.unwrap();

        let mut handles = Vec::new();
        for i in 0..200 {
            let repo = repo.clone();
            let id = sale.id.clone();
            handles.push(tokio::spawn(async move {
                repo.update(
                    &id,
                    UpdateSalesTransactionRequest {
                        quantity: Some(1 + i % 5),
                        ..Default::default()
                    },
                )
                .await
            }));
        }

        let mut failures = Vec::new();
        for handle in handles {
            if let Err(e) = handle.await.unwrap() {
                failures.push(e.to_string());
            }
        }
        assert!(failures.is_empty(), "{} updates failed: {:?}", failures.len(), failures.first());

        let stored = repo.get_by_id(&sale.id).await.unwrap().unwrap();
        assert_eq!(stored.total, Money::from_cents(2500 * stored.quantity));
        db.close().await;
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo().await;
        let sale = repo.create(request("Obat", "10", 1)).await.unwrap();

        repo.delete(&sale.id).await.unwrap();
        assert!(repo.get_by_id(&sale.id).await.unwrap().is_none());
        assert!(repo.delete(&sale.id).await.unwrap_err().is_not_found());
    }
}
