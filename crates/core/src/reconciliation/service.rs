//! Reconciliation service.

use std::sync::Arc;

use futures::future::join_all;
use rust_decimal::Decimal;

use super::model::{
    Discharge, DischargeBreakdown, EnrichedPayment, FinancialTitle, Reconciliation,
};
use super::source::TitleSource;
use crate::cdi::{CdiService, LostInterest};
use crate::errors::Result;

#[derive(Clone)]
pub struct ReconciliationService {
    titles: Arc<dyn TitleSource>,
    cdi: CdiService,
}

impl ReconciliationService {
    pub fn new(titles: Arc<dyn TitleSource>, cdi: CdiService) -> Self {
        Self { titles, cdi }
    }

    /// Joins the process's titles with their discharges and prices the late
    /// ones.
    ///
    /// Discharge lookups run concurrently (independent reads); output order
    /// follows the title listing. A failed lookup degrades that one title to
    /// an empty discharge list with a diagnostic and reconciliation
    /// continues. Lost interest here always uses true market rates, never a
    /// caller-supplied override.
    pub async fn reconcile(&self, process_code: i64) -> Result<Reconciliation> {
        let titles = self.titles.financial_titles(process_code).await?;
        if titles.is_empty() {
            return Ok(Reconciliation::empty());
        }

        let lookups = join_all(titles.iter().map(|title| self.titles.discharges(title))).await;

        let mut payments = Vec::with_capacity(titles.len());
        let mut total_lost_interest = Decimal::ZERO;

        for (title, lookup) in titles.into_iter().zip(lookups) {
            let discharges = match lookup {
                Ok(discharges) => discharges,
                Err(err) => {
                    log::warn!(
                        "discharge lookup failed for title {} (document {}): {}",
                        title.title_code,
                        title.document_code,
                        err
                    );
                    Vec::new()
                }
            };

            let payment = self.enrich_title(title, discharges).await?;
            total_lost_interest += payment.lost_interest;
            payments.push(payment);
        }

        Ok(Reconciliation {
            payments,
            total_lost_interest,
        })
    }

    async fn enrich_title(
        &self,
        title: FinancialTitle,
        discharges: Vec<Discharge>,
    ) -> Result<EnrichedPayment> {
        let mut breakdowns = Vec::with_capacity(discharges.len());
        let mut lost_interest = Decimal::ZERO;
        let mut late_days = 0i64;

        for discharge in discharges {
            let breakdown = self.enrich_discharge(&title, &discharge).await?;
            lost_interest += breakdown.lost_interest;
            late_days += breakdown.late_days;
            breakdowns.push(breakdown);
        }

        Ok(EnrichedPayment {
            title,
            discharges: breakdowns,
            lost_interest,
            late_days,
        })
    }

    async fn enrich_discharge(
        &self,
        title: &FinancialTitle,
        discharge: &Discharge,
    ) -> Result<DischargeBreakdown> {
        let payment_date = discharge.payment_date();

        let late_payment = match payment_date {
            Some(paid_on) => discharge.amount > Decimal::ZERO && paid_on > title.due_date,
            None => false,
        };

        let lost = if late_payment {
            // payment_date is always present on a late payment
            let paid_on = payment_date.unwrap_or(title.due_date);
            self.cdi
                .lost_interest(discharge.amount, title.due_date, paid_on)
                .await?
        } else {
            LostInterest::none()
        };

        Ok(DischargeBreakdown {
            payment_date,
            amount: discharge.amount,
            lost_interest: lost.lost_interest,
            late_days: lost.late_days,
            accumulated_factor: lost.accumulated_factor,
        })
    }
}
