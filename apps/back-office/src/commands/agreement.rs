//! # Agreement Commands
//!
//! `add-agreement` starts new terms for a franchise on a given date. Any
//! option left out is carried over from the terms in force that day.

use chrono::NaiveDate;
use serde::Serialize;
use std::fmt::Write;
use tracing::{debug, info};

use crate::error::CliError;
use clowee_core::types::{Agreement, PaymentDuration, PricingTerms, Rate};
use clowee_core::validation::{coerce_amount, parse_rate, validate_uuid};
use clowee_core::Money;
use clowee_db::Database;

#[derive(Debug, Clone)]
pub struct AddAgreementArgs {
    pub franchise_id: String,
    pub effective_date: NaiveDate,
    /// Taka; blank or unparseable counts as zero.
    pub coin_price: Option<String>,
    pub doll_price: Option<String>,
    pub electricity: Option<String>,
    /// Percentages, e.g. `7.5` or `40%`.
    pub vat: Option<String>,
    pub franchise_share: Option<String>,
    pub clowee_share: Option<String>,
    /// Blank clears the maintenance fee.
    pub maintenance: Option<String>,
    pub duration: Option<PaymentDuration>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgreementAdded {
    pub agreement: Agreement,
    /// Agreement that was in force on the effective date, if any.
    pub supersedes: Option<String>,
}

fn amount_or(raw: Option<String>, current: Money) -> Money {
    match raw {
        Some(raw) => coerce_amount(Some(&raw)),
        None => current,
    }
}

pub async fn add(db: &Database, args: AddAgreementArgs) -> Result<AgreementAdded, CliError> {
    debug!(franchise_id = %args.franchise_id, effective_date = %args.effective_date, "add-agreement command");
    validate_uuid("franchise_id", &args.franchise_id)?;

    let franchise = db.franchises().get(&args.franchise_id).await?;
    let previous = db.agreements().effective_on(&franchise.id, args.effective_date).await?;
    let current = previous.as_ref().map_or(&franchise.terms, |a| &a.terms);

    let rate_or = |raw: Option<String>, current: Rate| match raw {
        Some(raw) => parse_rate(&raw),
        None => Ok(current),
    };

    let maintenance_percentage = match args.maintenance {
        Some(raw) if raw.trim().is_empty() => None,
        Some(raw) => Some(parse_rate(&raw)?),
        None => current.maintenance_percentage,
    };

    let terms = PricingTerms {
        coin_price: amount_or(args.coin_price, current.coin_price),
        doll_price: amount_or(args.doll_price, current.doll_price),
        vat_percentage: rate_or(args.vat, current.vat_percentage)?,
        franchise_share: rate_or(args.franchise_share, current.franchise_share)?,
        clowee_share: rate_or(args.clowee_share, current.clowee_share)?,
        electricity_cost: amount_or(args.electricity, current.electricity_cost),
        maintenance_percentage,
        payment_duration: args.duration.unwrap_or(current.payment_duration),
    };

    let notes = args.notes.filter(|n| !n.trim().is_empty());
    let agreement = db
        .agreements()
        .create(&franchise.id, args.effective_date, terms, notes)
        .await?;
    info!(agreement_id = %agreement.id, franchise = %franchise.name, "Agreement added");

    Ok(AgreementAdded {
        agreement,
        supersedes: previous.map(|a| a.id),
    })
}

pub fn render(added: &AgreementAdded) -> String {
    let a = &added.agreement;
    let t = &a.terms;
    let mut out = String::new();
    let _ = writeln!(out, "Agreement {} from {}", a.id, a.effective_date);
    let _ = writeln!(out, "  coin / doll    {} / {}", t.coin_price, t.doll_price);
    let _ = writeln!(out, "  VAT            {}", t.vat_percentage);
    let _ = writeln!(out, "  split          {} / {}", t.franchise_share, t.clowee_share);
    let _ = writeln!(out, "  electricity    {}", t.electricity_cost);
    if let Some(rate) = t.maintenance() {
        let _ = writeln!(out, "  maintenance    {}", rate);
    }
    let _ = writeln!(out, "  billing        {}", t.payment_duration);
    match &added.supersedes {
        Some(id) => {
            let _ = writeln!(out, "  supersedes     {}", id);
        }
        None => {
            let _ = writeln!(out, "  supersedes     franchise defaults");
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures::{date, setup};
    use crate::error::ErrorCode;

    fn args(franchise_id: &str, effective_date: NaiveDate) -> AddAgreementArgs {
        AddAgreementArgs {
            franchise_id: franchise_id.to_string(),
            effective_date,
            coin_price: None,
            doll_price: None,
            electricity: None,
            vat: None,
            franchise_share: None,
            clowee_share: None,
            maintenance: None,
            duration: None,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_unset_options_carry_terms_in_force() {
        let (db, franchise, _) = setup().await;

        let first = add(
            &db,
            AddAgreementArgs {
                coin_price: Some("10".into()),
                maintenance: Some("5%".into()),
                ..args(&franchise.id, date(2026, 7, 1))
            },
        )
        .await
        .unwrap();
        assert!(first.supersedes.is_none());
        assert_eq!(first.agreement.terms.coin_price, Money::from_major(10));
        assert_eq!(first.agreement.terms.doll_price, franchise.terms.doll_price);
        assert_eq!(first.agreement.terms.maintenance_percentage, Some(Rate::from_bps(500)));

        let second = add(
            &db,
            AddAgreementArgs {
                vat: Some("10".into()),
                maintenance: Some(" ".into()),
                duration: Some(PaymentDuration::HalfMonthly),
                ..args(&franchise.id, date(2026, 10, 1))
            },
        )
        .await
        .unwrap();
        assert_eq!(second.supersedes.as_deref(), Some(first.agreement.id.as_str()));
        assert_eq!(second.agreement.terms.coin_price, Money::from_major(10));
        assert_eq!(second.agreement.terms.vat_percentage, Rate::from_bps(1000));
        assert_eq!(second.agreement.terms.maintenance_percentage, None);
        assert_eq!(second.agreement.terms.payment_duration, PaymentDuration::HalfMonthly);

        let text = render(&second);
        assert!(text.contains("৳10.00"));
        assert!(text.contains(&first.agreement.id));
    }

    #[tokio::test]
    async fn test_garbled_price_is_zero() {
        let (db, franchise, _) = setup().await;

        let added = add(
            &db,
            AddAgreementArgs {
                electricity: Some("n/a".into()),
                ..args(&franchise.id, date(2026, 10, 1))
            },
        )
        .await
        .unwrap();
        assert_eq!(added.agreement.terms.electricity_cost, Money::zero());
        assert!(render(&added).contains("franchise defaults"));
    }

    #[tokio::test]
    async fn test_rejects_bad_rate_and_split() {
        let (db, franchise, _) = setup().await;

        let err = add(
            &db,
            AddAgreementArgs {
                vat: Some("seven".into()),
                ..args(&franchise.id, date(2026, 10, 1))
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = add(
            &db,
            AddAgreementArgs {
                franchise_share: Some("70".into()),
                ..args(&franchise.id, date(2026, 10, 1))
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(db.agreements().list_for_franchise(&franchise.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_franchise_id() {
        let (db, _, _) = setup().await;

        let err = add(&db, args("bashundhara", date(2026, 10, 1))).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }
}
