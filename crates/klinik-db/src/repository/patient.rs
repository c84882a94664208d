//! # Patient Repository
//!
//! Database operations for patient registrations.
//!
//! ## Key Operations
//! - Registration (create)
//! - Filtered listing by examination date and name/phone search
//! - Partial update
//! - Hard delete
//!
//! ## Search
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  User types: "0812"                                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  name LIKE '%0812%' OR phone_number LIKE '%0812%'                      │
//! │       │                                                                 │
//! │  ┌─────────────────────────────────────────┐                           │
//! │  │ Siti Aminah | 0812-3456-7890            │ ← MATCH (phone)           │
//! │  │ Budi 0812   | 0857-1111-2222            │ ← MATCH (name)            │
//! │  │ Andi        | 0857-3333-4444            │                           │
//! │  └─────────────────────────────────────────┘                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Names are matched through `name_search`, a lowercased copy written on
//! every insert and update, so case folding covers all scripts. `%` and `_`
//! in the term are literal.

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::{begin_write, contains_pattern, new_id, search_key};
use klinik_core::validation::{
    validate_complaint, validate_name, validate_phone_number, validate_search_query,
};
use klinik_core::{CreatePatientRequest, Patient, PatientFilter, UpdatePatientRequest};

const SELECT_PATIENT: &str =
    "SELECT id, name, phone_number, complaint, examination_date, created_at FROM patients";

/// Repository for patient database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.patients();
///
/// let patient = repo.create(request).await?;
/// let today = repo.list(&PatientFilter { date_from: Some(today), date_to: Some(today), ..Default::default() }).await?;
/// ```
#[derive(Debug, Clone)]
pub struct PatientRepository {
    pool: SqlitePool,
}

impl PatientRepository {
    /// Creates a new PatientRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PatientRepository { pool }
    }

    /// Registers a patient, stamped with the current time.
    ///
    /// ## Errors
    /// - `DbError::Validation` if name, phone number or complaint is blank
    pub async fn create(&self, request: CreatePatientRequest) -> DbResult<Patient> {
        self.create_at(request, Utc::now()).await
    }

    /// Registers a patient with an explicit creation time.
    ///
    /// Used by the seed tool to backfill history.
    pub async fn create_at(
        &self,
        request: CreatePatientRequest,
        created_at: DateTime<Utc>,
    ) -> DbResult<Patient> {
        let patient = Patient {
            id: new_id(),
            name: validate_name("name", &request.name)?,
            phone_number: validate_phone_number(&request.phone_number)?,
            complaint: validate_complaint(&request.complaint)?,
            examination_date: request.examination_date,
            created_at,
        };

        debug!(id = %patient.id, examination_date = %patient.examination_date, "Creating patient");

        sqlx::query(
            r#"
            INSERT INTO patients
                (id, name, name_search, phone_number, complaint, examination_date, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&patient.id)
        .bind(&patient.name)
        .bind(search_key(&patient.name))
        .bind(&patient.phone_number)
        .bind(&patient.complaint)
        .bind(patient.examination_date)
        .bind(patient.created_at)
        .execute(&self.pool)
        .await?;

        Ok(patient)
    }

    /// Gets a patient by ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Patient))` - Patient found
    /// * `Ok(None)` - Patient not found
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Patient>> {
        let patient = sqlx::query_as::<_, Patient>(&format!("{} WHERE id = ?1", SELECT_PATIENT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(patient)
    }

    /// Lists patients, newest examination date first.
    ///
    /// ## Filters (AND-combined, all optional)
    /// - `date_from` / `date_to`: inclusive bounds on `examination_date`
    ///   (an inverted pair matches nothing)
    /// - `search`: case-insensitive substring of name OR phone number;
    ///   blank is ignored
    pub async fn list(&self, filter: &PatientFilter) -> DbResult<Vec<Patient>> {
        let search = validate_search_query(filter.search.as_deref())?;

        debug!(?filter, "Listing patients");

        let mut qb: QueryBuilder<'_, Sqlite> = QueryBuilder::new(SELECT_PATIENT);
        qb.push(" WHERE 1 = 1");

        if let Some(from) = filter.date_from {
            qb.push(" AND examination_date >= ").push_bind(from);
        }
        if let Some(to) = filter.date_to {
            qb.push(" AND examination_date <= ").push_bind(to);
        }
        if let Some(term) = search {
            let pattern = contains_pattern(&search_key(&term));
            qb.push(" AND (name_search LIKE ")
                .push_bind(pattern.clone())
                .push(" ESCAPE '\\' OR phone_number LIKE ")
                .push_bind(pattern)
                .push(" ESCAPE '\\')");
        }

        qb.push(" ORDER BY examination_date DESC, created_at DESC, rowid DESC");

        let patients = qb.build_query_as::<Patient>().fetch_all(&self.pool).await?;

        debug!(count = patients.len(), "Listed patients");
        Ok(patients)
    }

    /// Applies a partial update and returns the full record.
    ///
    /// Supplied fields are validated like on create. An update with no
    /// fields returns the current record unchanged.
    ///
    /// ## Errors
    /// - `DbError::NotFound` if the ID doesn't exist
    /// - `DbError::Validation` if a supplied field is blank
    pub async fn update(&self, id: &str, request: UpdatePatientRequest) -> DbResult<Patient> {
        debug!(id = %id, "Updating patient");

        let name = request
            .name
            .as_deref()
            .map(|v| validate_name("name", v))
            .transpose()?;
        let phone_number = request
            .phone_number
            .as_deref()
            .map(validate_phone_number)
            .transpose()?;
        let complaint = request
            .complaint
            .as_deref()
            .map(validate_complaint)
            .transpose()?;

        let mut tx = begin_write(&self.pool).await?;

        let current = sqlx::query_as::<_, Patient>(&format!("{} WHERE id = ?1", SELECT_PATIENT))
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Patient", id))?;

        if request.is_empty() {
            tx.commit().await?;
            return Ok(current);
        }

        let updated = Patient {
            name: name.unwrap_or(current.name),
            phone_number: phone_number.unwrap_or(current.phone_number),
            complaint: complaint.unwrap_or(current.complaint),
            examination_date: request.examination_date.unwrap_or(current.examination_date),
            ..current
        };

        sqlx::query(
            r#"
            UPDATE patients
            SET name = ?1, name_search = ?2, phone_number = ?3, complaint = ?4,
                examination_date = ?5
            WHERE id = ?6
            "#,
        )
        .bind(&updated.name)
        .bind(search_key(&updated.name))
        .bind(&updated.phone_number)
        .bind(&updated.complaint)
        .bind(updated.examination_date)
        .bind(id)
        .execute(&mut *tx)
        .await?;

        tx.commit()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        Ok(updated)
    }

    /// Permanently deletes a patient.
    ///
    /// ## Errors
    /// - `DbError::NotFound` if the ID doesn't exist
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting patient");

        let result = sqlx::query("DELETE FROM patients WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Patient", id));
        }

        Ok(())
    }

    /// Counts all patients.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM patients")
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
    use chrono::NaiveDate;

    async fn repo() -> PatientRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().patients()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(name: &str, phone: &str, examination_date: NaiveDate) -> CreatePatientRequest {
        CreatePatientRequest {
            name: name.to_string(),
            phone_number: phone.to_string(),
            complaint: "Demam".to_string(),
            examination_date,
        }
    }

    #[tokio::test]
    async fn test_create_assigns_id_and_trims() {
        let repo = repo().await;

        let patient = repo
            .create(request("  Siti Aminah ", " 0812-3456-7890", date(2024, 3, 1)))
            .await
            .unwrap();

        assert!(!patient.id.is_empty());
        assert_eq!(patient.name, "Siti Aminah");
        assert_eq!(patient.phone_number, "0812-3456-7890");

        let stored = repo.get_by_id(&patient.id).await.unwrap().unwrap();
        assert_eq!(stored, patient);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_fields() {
        let repo = repo().await;

        let err = repo
            .create(request("", "0812", date(2024, 3, 1)))
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let mut blank_complaint = request("Budi", "0812", date(2024, 3, 1));
        blank_complaint.complaint = "   ".to_string();
        assert!(repo.create(blank_complaint).await.unwrap_err().is_validation());

        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_list_date_range_is_inclusive_and_descending() {
        let repo = repo().await;
        for day in 1..=5 {
            repo.create(request(&format!("Pasien {}", day), "0812", date(2024, 1, day)))
                .await
                .unwrap();
        }

        let filter = PatientFilter {
            date_from: Some(date(2024, 1, 2)),
            date_to: Some(date(2024, 1, 4)),
            search: None,
        };
        let patients = repo.list(&filter).await.unwrap();

        let dates: Vec<NaiveDate> = patients.iter().map(|p| p.examination_date).collect();
        assert_eq!(dates, vec![date(2024, 1, 4), date(2024, 1, 3), date(2024, 1, 2)]);
    }

    #[tokio::test]
    async fn test_list_without_filter_returns_all() {
        let repo = repo().await;
        repo.create(request("A", "1", date(2024, 1, 1))).await.unwrap();
        repo.create(request("B", "2", date(2024, 1, 2))).await.unwrap();

        let all = repo.list(&PatientFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].name, "B");
    }

    #[tokio::test]
    async fn test_list_inverted_range_is_empty() {
        let repo = repo().await;
        for day in 1..=5 {
            repo.create(request(&format!("Pasien {}", day), "0812", date(2024, 1, day)))
                .await
                .unwrap();
        }

        let filter = PatientFilter {
            date_from: Some(date(2024, 1, 5)),
            date_to: Some(date(2024, 1, 1)),
            search: None,
        };

        assert!(repo.list(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_matches_name_or_phone_case_insensitively() {
        let repo = repo().await;
        repo.create(request("Siti Aminah", "0812-1111", date(2024, 1, 1)))
            .await
            .unwrap();
        repo.create(request("Budi", "0857-2222", date(2024, 1, 2)))
            .await
            .unwrap();

        let by_name = PatientFilter {
            search: Some("  siti ".to_string()),
            ..Default::default()
        };
        let found = repo.list(&by_name).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Siti Aminah");

        let by_phone = PatientFilter {
            search: Some("0857".to_string()),
            ..Default::default()
        };
        let found = repo.list(&by_phone).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Budi");

        let blank = PatientFilter {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.list(&blank).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_search_folds_case_beyond_ascii() {
        let repo = repo().await;
        let elise = repo
            .create(request("Élise Ömer", "0812", date(2024, 1, 1)))
            .await
            .unwrap();
        repo.create(request("Budi", "0857", date(2024, 1, 1)))
            .await
            .unwrap();

        for term in ["élise", "ÉLISE", "ömer"] {
            let filter = PatientFilter {
                search: Some(term.to_string()),
                ..Default::default()
            };
            let found = repo.list(&filter).await.unwrap();
            assert_eq!(found.len(), 1, "search {:?}", term);
            assert_eq!(found[0].id, elise.id);
        }

        repo.update(
            &elise.id,
            UpdatePatientRequest {
                name: Some("Çağrı Şahin".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let renamed = PatientFilter {
            search: Some("çağrı".to_string()),
            ..Default::default()
        };
        assert_eq!(repo.list(&renamed).await.unwrap().len(), 1);

        let old_name = PatientFilter {
            search: Some("élise".to_string()),
            ..Default::default()
        };
        assert!(repo.list(&old_name).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_wildcards_are_literal() {
        let repo = repo().await;
        repo.create(request("Anak_1", "1", date(2024, 1, 1))).await.unwrap();
        repo.create(request("AnakX1", "2", date(2024, 1, 1))).await.unwrap();

        let filter = PatientFilter {
            search: Some("_".to_string()),
            ..Default::default()
        };
        let found = repo.list(&filter).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "Anak_1");

        let filter = PatientFilter {
            search: Some("%".to_string()),
            ..Default::default()
        };
        assert!(repo.list(&filter).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_changes_only_supplied_fields() {
        let repo = repo().await;
        let patient = repo
            .create(request("Budi", "0812", date(2024, 1, 1)))
            .await
            .unwrap();

        let updated = repo
            .update(
                &patient.id,
                UpdatePatientRequest {
                    complaint: Some("Batuk".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.complaint, "Batuk");
        assert_eq!(updated.name, "Budi");
        assert_eq!(updated.created_at, patient.created_at);
        assert_eq!(repo.get_by_id(&patient.id).await.unwrap().unwrap(), updated);
    }

    #[tokio::test]
    async fn test_empty_update_returns_current_record() {
        let repo = repo().await;
        let patient = repo
            .create(request("Budi", "0812", date(2024, 1, 1)))
            .await
            .unwrap();

        let same = repo
            .update(&patient.id, UpdatePatientRequest::default())
            .await
            .unwrap();
        assert_eq!(same, patient);
    }

    #[tokio::test]
    async fn test_update_validates_and_reports_missing() {
        let repo = repo().await;
        let patient = repo
            .create(request("Budi", "0812", date(2024, 1, 1)))
            .await
            .unwrap();

        let err = repo
            .update(
                &patient.id,
                UpdatePatientRequest {
                    name: Some(" ".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let err = repo
            .update("missing", UpdatePatientRequest::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_on_file_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("klinik.db")).max_connections(8))
            .await
            .unwrap();
        let repo = db.patients();
        let patient = repo
            .create(request("Budi", "0812", date(2024, 1, 1)))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for i in 0..50 {
            let repo = repo.clone();
            let id = patient.id.clone();
            handles.push(tokio::spawn(async move {
                repo.update(
                    &id,
                    UpdatePatientRequest {
                        complaint: Some(format!("Kontrol {}", i)),
                        ..Default::default()
                    },
                )
                .await
            }));
        }

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let stored = repo.get_by_id(&patient.id).await.unwrap().unwrap();
        assert!(stored.complaint.starts_with("Kontrol "));
        db.close().await;
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo().await;
        let patient = repo
            .create(request("Budi", "0812", date(2024, 1, 1)))
            .await
            .unwrap();

        repo.delete(&patient.id).await.unwrap();
        assert!(repo.get_by_id(&patient.id).await.unwrap().is_none());

        assert!(repo.delete(&patient.id).await.unwrap_err().is_not_found());
    }
}
