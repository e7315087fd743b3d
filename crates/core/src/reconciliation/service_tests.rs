//! Tests for the reconciliation service.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::model::{Discharge, FinancialTitle};
use super::service::ReconciliationService;
use super::source::TitleSource;
use crate::cdi::{CdiService, RateSample, RateSource};
use crate::errors::{Error, Result};

// =========================================================================
// Mocks
// =========================================================================

#[derive(Clone, Default)]
struct MockRateSource {
    samples: Arc<Mutex<Vec<RateSample>>>,
}

#[async_trait]
impl RateSource for MockRateSource {
    async fn rates_in_window(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<RateSample>> {
        Ok(self
            .samples
            .lock()
            .unwrap()
            .iter()
            .filter(|s| s.date >= start && s.date <= end)
            .cloned()
            .collect())
    }

    async fn latest_rates(&self) -> Result<Vec<RateSample>> {
        Ok(self.samples.lock().unwrap().clone())
    }
}

#[derive(Clone, Default)]
struct MockTitleSource {
    titles: Arc<Mutex<Vec<FinancialTitle>>>,
    discharges: Arc<Mutex<HashMap<i64, Vec<Discharge>>>>,
    fail_for_titles: Arc<Mutex<Vec<i64>>>,
}

impl MockTitleSource {
    fn add_title(&self, title: FinancialTitle, discharges: Vec<Discharge>) {
        self.discharges
            .lock()
            .unwrap()
            .insert(title.title_code, discharges);
        self.titles.lock().unwrap().push(title);
    }

    fn fail_discharges_for(&self, title_code: i64) {
        self.fail_for_titles.lock().unwrap().push(title_code);
    }
}

#[async_trait]
impl TitleSource for MockTitleSource {
    async fn financial_titles(&self, process_code: i64) -> Result<Vec<FinancialTitle>> {
        Ok(self
            .titles
            .lock()
            .unwrap()
            .iter()
            .filter(|t| t.process_code == process_code)
            .cloned()
            .collect())
    }

    async fn discharges(&self, title: &FinancialTitle) -> Result<Vec<Discharge>> {
        if self
            .fail_for_titles
            .lock()
            .unwrap()
            .contains(&title.title_code)
        {
            return Err(Error::Unexpected("intentional discharge failure".into()));
        }
        Ok(self
            .discharges
            .lock()
            .unwrap()
            .get(&title.title_code)
            .cloned()
            .unwrap_or_default())
    }
}

// =========================================================================
// Fixtures
// =========================================================================

const PROCESS: i64 = 4711;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn title(title_code: i64, due: NaiveDate) -> FinancialTitle {
    FinancialTitle {
        company_code: 2,
        document_code: 9000 + title_code,
        title_code,
        document_type: 1,
        due_date: due,
        process_code: PROCESS,
    }
}

fn discharge_on(date: NaiveDate, amount: Decimal) -> Discharge {
    Discharge {
        movement_date: Some(date),
        settlement_date: None,
        amount,
    }
}

/// Rates at 0.04%/day for all of Jan-Feb 2025.
fn service_with(titles: MockTitleSource) -> ReconciliationService {
    let mut samples = Vec::new();
    let mut date = day(2025, 1, 1);
    while date <= day(2025, 2, 28) {
        samples.push(RateSample::new(date, dec!(0.04)));
        date = date + chrono::Days::new(1);
    }
    let rates = MockRateSource {
        samples: Arc::new(Mutex::new(samples)),
    };
    ReconciliationService::new(Arc::new(titles), CdiService::new(Arc::new(rates)))
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn on_time_discharges_carry_zero_lost_interest() {
    let titles = MockTitleSource::default();
    titles.add_title(
        title(1, day(2025, 1, 10)),
        vec![discharge_on(day(2025, 1, 10), dec!(10000))],
    );

    let outcome = service_with(titles).reconcile(PROCESS).await.unwrap();

    assert_eq!(outcome.payments.len(), 1);
    assert_eq!(outcome.payments[0].lost_interest, Decimal::ZERO);
    assert_eq!(outcome.payments[0].discharges[0].accumulated_factor, Decimal::ONE);
    assert_eq!(outcome.total_lost_interest, Decimal::ZERO);
}

#[tokio::test]
async fn late_discharge_is_priced_with_market_rates() {
    let titles = MockTitleSource::default();
    titles.add_title(
        title(1, day(2025, 1, 10)),
        vec![discharge_on(day(2025, 1, 15), dec!(10000))],
    );

    let outcome = service_with(titles).reconcile(PROCESS).await.unwrap();

    let payment = &outcome.payments[0];
    assert_eq!(payment.late_days, 5);
    assert!(payment.lost_interest > Decimal::ZERO);
    assert_eq!(outcome.total_lost_interest, payment.lost_interest);
}

#[tokio::test]
async fn partial_discharges_accumulate_additively() {
    // Two partial late settlements: lost interest and late days are sums,
    // not maxima.
    let titles = MockTitleSource::default();
    titles.add_title(
        title(1, day(2025, 1, 10)),
        vec![
            discharge_on(day(2025, 1, 13), dec!(6000)),
            discharge_on(day(2025, 1, 15), dec!(4000)),
        ],
    );

    let outcome = service_with(titles).reconcile(PROCESS).await.unwrap();

    let payment = &outcome.payments[0];
    assert_eq!(payment.discharges.len(), 2);
    assert_eq!(payment.late_days, 3 + 5);
    let summed: Decimal = payment.discharges.iter().map(|d| d.lost_interest).sum();
    assert_eq!(payment.lost_interest, summed);
}

#[tokio::test]
async fn settlement_date_backfills_missing_movement_date() {
    let titles = MockTitleSource::default();
    titles.add_title(
        title(1, day(2025, 1, 10)),
        vec![Discharge {
            movement_date: None,
            settlement_date: Some(day(2025, 1, 12)),
            amount: dec!(2500),
        }],
    );

    let outcome = service_with(titles).reconcile(PROCESS).await.unwrap();

    let breakdown = &outcome.payments[0].discharges[0];
    assert_eq!(breakdown.payment_date, Some(day(2025, 1, 12)));
    assert_eq!(breakdown.late_days, 2);
    assert!(breakdown.lost_interest > Decimal::ZERO);
}

#[tokio::test]
async fn zero_amount_discharges_are_never_late() {
    let titles = MockTitleSource::default();
    titles.add_title(
        title(1, day(2025, 1, 10)),
        vec![discharge_on(day(2025, 1, 20), Decimal::ZERO)],
    );

    let outcome = service_with(titles).reconcile(PROCESS).await.unwrap();

    assert_eq!(outcome.payments[0].lost_interest, Decimal::ZERO);
    assert_eq!(outcome.payments[0].late_days, 0);
}

#[tokio::test]
async fn one_failing_title_does_not_abort_the_others() {
    let titles = MockTitleSource::default();
    titles.add_title(
        title(1, day(2025, 1, 10)),
        vec![discharge_on(day(2025, 1, 15), dec!(10000))],
    );
    titles.add_title(
        title(2, day(2025, 1, 10)),
        vec![discharge_on(day(2025, 1, 15), dec!(5000))],
    );
    titles.fail_discharges_for(1);

    let outcome = service_with(titles).reconcile(PROCESS).await.unwrap();

    assert_eq!(outcome.payments.len(), 2);

    let failed = &outcome.payments[0];
    assert_eq!(failed.title.title_code, 1);
    assert!(failed.discharges.is_empty());
    assert_eq!(failed.lost_interest, Decimal::ZERO);

    let healthy = &outcome.payments[1];
    assert_eq!(healthy.title.title_code, 2);
    assert_eq!(healthy.late_days, 5);
    assert!(healthy.lost_interest > Decimal::ZERO);
    assert_eq!(outcome.total_lost_interest, healthy.lost_interest);
}

#[tokio::test]
async fn process_without_titles_reconciles_to_empty() {
    let outcome = service_with(MockTitleSource::default())
        .reconcile(PROCESS)
        .await
        .unwrap();

    assert!(outcome.payments.is_empty());
    assert_eq!(outcome.total_lost_interest, Decimal::ZERO);
}
