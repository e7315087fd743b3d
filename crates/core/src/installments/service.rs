//! Straight-line installment interest.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::model::{Installment, Movement};

pub struct InstallmentService;

impl InstallmentService {
    /// Prices each installment at simple interest:
    /// `interest = principal * (daily_rate / 100) * elapsed_days`.
    ///
    /// Output order equals input order. Elapsed days are taken as provided,
    /// negatives included; normalization of missing values happens at the
    /// adapter boundary.
    pub fn compute_movements(
        installments: &[Installment],
        daily_rate_percent: Decimal,
        spot_rate_percent: Decimal,
    ) -> Vec<Movement> {
        installments
            .iter()
            .map(|installment| {
                let interest = installment.principal
                    * (daily_rate_percent / dec!(100))
                    * Decimal::from(installment.elapsed_days);
                Movement {
                    date: installment.scheduled_date,
                    description: installment.description.clone(),
                    elapsed_days: installment.elapsed_days,
                    spot_rate: spot_rate_percent,
                    principal: installment.principal,
                    interest,
                    total: installment.principal + interest,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn installment(principal: Decimal, elapsed_days: i64, description: &str) -> Installment {
        Installment {
            principal,
            scheduled_date: NaiveDate::from_ymd_opt(2025, 6, 15).unwrap(),
            elapsed_days,
            description: description.to_string(),
        }
    }

    #[test]
    fn simple_interest_formula() {
        let movements = InstallmentService::compute_movements(
            &[installment(dec!(1000), 30, "Parcela 1")],
            dec!(0.045),
            dec!(5.2),
        );

        assert_eq!(movements.len(), 1);
        assert_eq!(movements[0].interest, dec!(13.5));
        assert_eq!(movements[0].total, dec!(1013.5));
        assert_eq!(movements[0].spot_rate, dec!(5.2));
    }

    #[test]
    fn output_preserves_input_order() {
        let input = vec![
            installment(dec!(300), 3, "c"),
            installment(dec!(100), 1, "a"),
            installment(dec!(200), 2, "b"),
        ];

        let movements = InstallmentService::compute_movements(&input, dec!(0.05), Decimal::ZERO);

        let order: Vec<&str> = movements.iter().map(|m| m.description.as_str()).collect();
        assert_eq!(order, vec!["c", "a", "b"]);
    }

    #[test]
    fn zero_elapsed_days_accrues_nothing() {
        let movements = InstallmentService::compute_movements(
            &[installment(dec!(5000), 0, "spot")],
            dec!(0.045),
            Decimal::ZERO,
        );

        assert_eq!(movements[0].interest, Decimal::ZERO);
        assert_eq!(movements[0].total, dec!(5000));
    }

    #[test]
    fn negative_elapsed_days_compute_negative_interest() {
        // Accepted as provided; see DESIGN.md.
        let movements = InstallmentService::compute_movements(
            &[installment(dec!(1000), -10, "early")],
            dec!(0.1),
            Decimal::ZERO,
        );

        assert_eq!(movements[0].interest, dec!(-10));
        assert_eq!(movements[0].total, dec!(990));
    }

    #[test]
    fn empty_input_yields_no_movements() {
        let movements = InstallmentService::compute_movements(&[], dec!(0.045), dec!(5.2));
        assert!(movements.is_empty());
    }
}
