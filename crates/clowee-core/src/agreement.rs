//! # Agreement Resolution
//!
//! Picks the pricing terms in force for a franchise on a given date.
//!
//! ```text
//! agreements:   2025-01-01        2025-07-01            2026-01-01
//!                   │                 │                     │
//! timeline: ────────●─────────────────●─────────────────────●──────►
//!                         ▲                     ▲
//!                   2025-03-15            2025-12-31
//!                   → 2025-01-01          → 2025-07-01
//!
//! before 2025-01-01 → no agreement → franchise defaults
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{Agreement, Franchise, PricingTerms};

/// Returns the agreement with the latest `effective_date` not after `target`.
///
/// `None` means no agreement had started yet and the caller should fall
/// back to the franchise's default terms. The list does not need to be
/// sorted.
pub fn resolve<'a>(agreements: impl IntoIterator<Item = &'a Agreement>, target: NaiveDate) -> Option<&'a Agreement> {
    agreements
        .into_iter()
        .filter(|agreement| agreement.effective_date <= target)
        .max_by_key(|agreement| agreement.effective_date)
}

/// Where a set of effective terms came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "agreement_id")]
pub enum TermsSource {
    Agreement(String),
    FranchiseDefault,
}

/// Terms in force on a date, with their provenance.
#[derive(Debug, Clone)]
pub struct EffectiveTerms<'a> {
    pub terms: &'a PricingTerms,
    pub source: TermsSource,
}

impl EffectiveTerms<'_> {
    /// Agreement id to store on a sale, if an agreement applied.
    pub fn agreement_id(&self) -> Option<String> {
        match &self.source {
            TermsSource::Agreement(id) => Some(id.clone()),
            TermsSource::FranchiseDefault => None,
        }
    }
}

/// Resolves the terms for `franchise` on `date`.
///
/// Agreements belonging to other franchises are ignored, so callers may
/// pass a mixed list.
pub fn effective_terms<'a>(
    franchise: &'a Franchise,
    agreements: &'a [Agreement],
    date: NaiveDate,
) -> EffectiveTerms<'a> {
    let own = agreements.iter().filter(|agreement| agreement.franchise_id == franchise.id);

    match resolve(own, date) {
        Some(agreement) => EffectiveTerms {
            terms: &agreement.terms,
            source: TermsSource::Agreement(agreement.id.clone()),
        },
        None => EffectiveTerms {
            terms: &franchise.terms,
            source: TermsSource::FranchiseDefault,
        },
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::money::Money;
    use crate::types::{PaymentDuration, Rate};
    use chrono::{TimeZone, Utc};

    pub(crate) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub(crate) fn terms(coin_price_taka: i64, clowee_share_bps: u32) -> PricingTerms {
        PricingTerms {
            coin_price: Money::from_major(coin_price_taka),
            doll_price: Money::from_major(25),
            vat_percentage: Rate::from_bps(750),
            franchise_share: Rate::from_bps(10_000 - clowee_share_bps),
            clowee_share: Rate::from_bps(clowee_share_bps),
            electricity_cost: Money::from_major(500),
            maintenance_percentage: None,
            payment_duration: PaymentDuration::Monthly,
        }
    }

    pub(crate) fn franchise(id: &str) -> Franchise {
        let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        Franchise {
            id: id.to_string(),
            name: format!("Franchise {id}"),
            terms: terms(5, 4000),
            is_active: true,
            created_at: ts,
            updated_at: ts,
        }
    }

    pub(crate) fn agreement(id: &str, franchise_id: &str, effective: NaiveDate, coin: i64) -> Agreement {
        Agreement {
            id: id.to_string(),
            franchise_id: franchise_id.to_string(),
            effective_date: effective,
            terms: terms(coin, 4000),
            notes: None,
            created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_resolve_picks_latest_not_after_target() {
        let list = vec![
            agreement("a-jul", "f1", date(2025, 7, 1), 10),
            agreement("a-jan", "f1", date(2025, 1, 1), 5),
            agreement("a-2026", "f1", date(2026, 1, 1), 20),
        ];

        assert_eq!(resolve(&list, date(2025, 3, 15)).unwrap().id, "a-jan");
        assert_eq!(resolve(&list, date(2025, 12, 31)).unwrap().id, "a-jul");
        assert_eq!(resolve(&list, date(2026, 6, 1)).unwrap().id, "a-2026");
    }

    #[test]
    fn test_resolve_effective_date_is_inclusive() {
        let list = vec![agreement("a", "f1", date(2025, 7, 1), 10)];
        assert_eq!(resolve(&list, date(2025, 7, 1)).unwrap().id, "a");
        assert!(resolve(&list, date(2025, 6, 30)).is_none());
    }

    #[test]
    fn test_resolve_empty_list() {
        assert!(resolve(&Vec::<Agreement>::new(), date(2025, 1, 1)).is_none());
    }

    #[test]
    fn test_resolve_matches_brute_force() {
        let list = vec![
            agreement("a", "f1", date(2024, 2, 29), 1),
            agreement("b", "f1", date(2024, 11, 1), 2),
            agreement("c", "f1", date(2025, 5, 16), 3),
        ];

        let mut day = date(2024, 1, 1);
        while day <= date(2025, 12, 31) {
            let expected = list
                .iter()
                .filter(|a| a.effective_date <= day)
                .map(|a| a.effective_date)
                .max();
            assert_eq!(resolve(&list, day).map(|a| a.effective_date), expected);
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_effective_terms_falls_back_to_franchise() {
        let f = franchise("f1");
        let list = vec![agreement("a", "f1", date(2025, 7, 1), 10)];

        let before = effective_terms(&f, &list, date(2025, 6, 1));
        assert_eq!(before.source, TermsSource::FranchiseDefault);
        assert_eq!(before.terms.coin_price, Money::from_major(5));
        assert_eq!(before.agreement_id(), None);

        let after = effective_terms(&f, &list, date(2025, 8, 1));
        assert_eq!(after.source, TermsSource::Agreement("a".to_string()));
        assert_eq!(after.terms.coin_price, Money::from_major(10));
    }

    #[test]
    fn test_effective_terms_ignores_other_franchises() {
        let f = franchise("f1");
        let list = vec![agreement("other", "f2", date(2025, 1, 1), 99)];

        let effective = effective_terms(&f, &list, date(2025, 6, 1));
        assert_eq!(effective.source, TermsSource::FranchiseDefault);
    }
}
