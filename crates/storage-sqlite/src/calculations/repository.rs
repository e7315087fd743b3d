//! Calculation repository.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::sqlite::SqliteConnection;

use super::model::CalculationRow;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::{IntoCore, StorageError};
use crate::schema::calculations::dsl as calculations_dsl;
use encargos_core::calculations::{CalculationRecord, CalculationStore};
use encargos_core::errors::Result;

pub struct CalculationRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl CalculationRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl CalculationStore for CalculationRepository {
    async fn save(&self, record: &CalculationRecord) -> Result<CalculationRecord> {
        let row = CalculationRow::try_from(record)?;
        let saved = record.clone();

        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                diesel::insert_into(calculations_dsl::calculations)
                    .values(&row)
                    .execute(conn)
                    .map_err(StorageError::QueryFailed)?;
                Ok(())
            })
            .await?;

        Ok(saved)
    }

    fn get(&self, id: &str) -> Result<Option<CalculationRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let row = calculations_dsl::calculations
            .filter(calculations_dsl::id.eq(id))
            .first::<CalculationRow>(&mut conn)
            .optional()
            .into_core()?;

        row.map(CalculationRecord::try_from).transpose()
    }

    fn latest_for_process(&self, process_id: &str) -> Result<Option<CalculationRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let row = calculations_dsl::calculations
            .filter(calculations_dsl::process_id.eq(process_id))
            .order(calculations_dsl::calculated_at.desc())
            .first::<CalculationRow>(&mut conn)
            .optional()
            .into_core()?;

        row.map(CalculationRecord::try_from).transpose()
    }

    fn list(&self, limit: i64, process_id: Option<&str>) -> Result<Vec<CalculationRecord>> {
        let mut conn = get_connection(&self.pool)?;

        let mut query = calculations_dsl::calculations
            .order(calculations_dsl::calculated_at.desc())
            .limit(limit)
            .into_boxed();

        if let Some(process_id) = process_id {
            query = query.filter(calculations_dsl::process_id.eq(process_id.to_string()));
        }

        let rows = query.load::<CalculationRow>(&mut conn).into_core()?;
        rows.into_iter().map(CalculationRecord::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::{TimeZone, Utc};
    use encargos_core::calculations::{
        CalculationResult, CostsUsd, ExchangeBlock, Summary, Totals,
    };
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn sample_record(id: &str, process_id: &str, calculated_at_minute: u32) -> CalculationRecord {
        let calculated_at = Utc
            .with_ymd_and_hms(2025, 7, 1, 12, calculated_at_minute, 0)
            .unwrap();
        let result = CalculationResult {
            id: id.to_string(),
            input_hash: "aabbcc".to_string(),
            process_id: process_id.to_string(),
            client_id: Some("CLI-77".to_string()),
            costs: CostsUsd {
                fob: dec!(40000),
                freight: dec!(8000),
                insurance: dec!(2000),
                cif: dec!(50000),
            },
            exchange: ExchangeBlock {
                cdi_daily: dec!(0.05),
                spot_rate: dec!(5.2),
                forward_rate: Decimal::ZERO,
                fiscal_dollar_rate: dec!(5.1),
                cif_brl: dec!(255000),
            },
            expenses: Vec::new(),
            movements: Vec::new(),
            enriched_payments: Vec::new(),
            totals: Totals {
                disburse: Decimal::ZERO,
                interest: Decimal::ZERO,
                lost_interest: Decimal::ZERO,
                charges: Decimal::ZERO,
            },
            has_existing_interest_charge: false,
            summary: Summary {
                count: 0,
                calculated_at,
                total_disburse: Decimal::ZERO,
                effective_rate: dec!(0.05),
            },
            status: "calculated".to_string(),
        };
        CalculationRecord::from_result(result)
    }

    async fn repository() -> (CalculationRepository, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("encargos.db");
        let (_, pool) = db::init(db_path.to_str().unwrap()).unwrap();
        let writer = db::spawn_writer(pool.clone());
        (CalculationRepository::new(pool, writer), dir)
    }

    #[tokio::test]
    async fn save_and_get_round_trip() {
        let (repo, _dir) = repository().await;
        let record = sample_record("calc-1", "4711", 0);

        repo.save(&record).await.unwrap();
        let loaded = repo.get("calc-1").unwrap().unwrap();

        assert_eq!(loaded.id, record.id);
        assert_eq!(loaded.input_hash, record.input_hash);
        assert_eq!(loaded.payload.costs.cif, dec!(50000));
        assert_eq!(loaded.calculated_at, record.calculated_at);
    }

    #[tokio::test]
    async fn unknown_id_is_none_not_an_error() {
        let (repo, _dir) = repository().await;
        assert!(repo.get("missing").unwrap().is_none());
    }

    #[tokio::test]
    async fn identical_hashes_append_rather_than_merge() {
        let (repo, _dir) = repository().await;
        repo.save(&sample_record("calc-1", "4711", 0)).await.unwrap();
        repo.save(&sample_record("calc-2", "4711", 1)).await.unwrap();

        let listed = repo.list(10, Some("4711")).unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].input_hash, listed[1].input_hash);
    }

    #[tokio::test]
    async fn latest_for_process_picks_the_newest() {
        let (repo, _dir) = repository().await;
        repo.save(&sample_record("calc-1", "4711", 0)).await.unwrap();
        repo.save(&sample_record("calc-2", "4711", 5)).await.unwrap();
        repo.save(&sample_record("calc-3", "9999", 9)).await.unwrap();

        let latest = repo.latest_for_process("4711").unwrap().unwrap();
        assert_eq!(latest.id, "calc-2");
    }

    #[tokio::test]
    async fn list_respects_limit_and_filter() {
        let (repo, _dir) = repository().await;
        for i in 0..5 {
            repo.save(&sample_record(&format!("calc-{}", i), "4711", i))
                .await
                .unwrap();
        }
        repo.save(&sample_record("other", "9999", 30)).await.unwrap();

        let limited = repo.list(3, Some("4711")).unwrap();
        assert_eq!(limited.len(), 3);
        assert_eq!(limited[0].id, "calc-4");

        let all = repo.list(100, None).unwrap();
        assert_eq!(all.len(), 6);
    }
}
