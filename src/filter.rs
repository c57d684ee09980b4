// 🔎 View filters - read-side selection over a snapshot
//
// "All" is always a pass-through. Period checks are calendar checks in the
// time zone of the `now` the caller passes in; weeks start on Sunday.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Datelike, Duration, TimeZone, Utc};
use std::str::FromStr;

use crate::transaction::{Category, Transaction, TransactionType};

// ============================================================================
// FILTER PARTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TypeFilter {
    #[default]
    All,
    Only(TransactionType),
}

impl TypeFilter {
    pub fn matches(&self, tx: &Transaction) -> bool {
        match self {
            TypeFilter::All => true,
            TypeFilter::Only(t) => tx.transaction_type == *t,
        }
    }
}

impl FromStr for TypeFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(TypeFilter::All)
        } else {
            s.parse().map(TypeFilter::Only)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn matches(&self, tx: &Transaction) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(c) => tx.category == *c,
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(CategoryFilter::All)
        } else {
            s.parse().map(CategoryFilter::Only)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Period {
    Today,
    Week,
    Month,
    #[default]
    All,
}

impl Period {
    /// Whether `date` falls in this period relative to `now`
    pub fn contains<Tz: TimeZone>(&self, date: &DateTime<Utc>, now: &DateTime<Tz>) -> bool {
        let day = date.with_timezone(&now.timezone()).date_naive();
        let today = now.date_naive();

        match self {
            Period::All => true,
            Period::Today => day == today,
            Period::Week => {
                let start = today - Duration::days(today.weekday().num_days_from_sunday() as i64);
                let end = start + Duration::days(6);
                start <= day && day <= end
            }
            Period::Month => day.year() == today.year() && day.month() == today.month(),
        }
    }
}

impl FromStr for Period {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "today" => Ok(Period::Today),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "all" => Ok(Period::All),
            other => Err(anyhow!("unknown period '{}' (expected today, week, month or all)", other)),
        }
    }
}

// ============================================================================
// COMBINED FILTER
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransactionFilter {
    pub transaction_type: TypeFilter,
    pub category: CategoryFilter,
    pub period: Period,
}

impl TransactionFilter {
    pub fn matches<Tz: TimeZone>(&self, tx: &Transaction, now: &DateTime<Tz>) -> bool {
        self.transaction_type.matches(tx)
            && self.category.matches(tx)
            && self.period.contains(&tx.date, now)
    }

    /// Matching transactions, in their original order
    pub fn apply<Tz: TimeZone>(&self, transactions: &[Transaction], now: &DateTime<Tz>) -> Vec<Transaction> {
        transactions
            .iter()
            .filter(|tx| self.matches(tx, now))
            .cloned()
            .collect()
    }
}

/// Most recent first; ties keep their relative order
pub fn sort_newest_first(transactions: &mut [Transaction]) {
    transactions.sort_by(|a, b| b.date.cmp(&a.date));
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::NewTransaction;
    use chrono::FixedOffset;

    fn at(date: DateTime<Utc>, category: Category, transaction_type: TransactionType) -> Transaction {
        NewTransaction::new("t", 10.0, category, transaction_type, date)
            .into_transaction(uuid::Uuid::new_v4().to_string())
    }

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_all_is_pass_through() {
        let filter = TransactionFilter::default();
        assert_eq!(filter.period, Period::All);

        let now = utc(2024, 6, 12, 12);
        let transactions = vec![
            at(utc(1990, 1, 1, 0), Category::Food, TransactionType::Expense),
            at(utc(2050, 1, 1, 0), Category::Salary, TransactionType::Income),
        ];

        assert_eq!(filter.apply(&transactions, &now), transactions);
    }

    #[test]
    fn test_type_and_category() {
        let now = utc(2024, 6, 12, 12);
        let transactions = vec![
            at(now, Category::Food, TransactionType::Expense),
            at(now, Category::Food, TransactionType::Income),
            at(now, Category::Bills, TransactionType::Expense),
        ];

        let filter = TransactionFilter {
            transaction_type: TypeFilter::Only(TransactionType::Expense),
            category: CategoryFilter::Only(Category::Food),
            period: Period::All,
        };

        let result = filter.apply(&transactions, &now);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id, transactions[0].id);
    }

    #[test]
    fn test_today() {
        let now = utc(2024, 6, 12, 12);

        assert!(Period::Today.contains(&utc(2024, 6, 12, 0), &now));
        assert!(Period::Today.contains(&utc(2024, 6, 12, 23), &now));
        assert!(!Period::Today.contains(&utc(2024, 6, 11, 23), &now));
        assert!(!Period::Today.contains(&utc(2024, 6, 13, 0), &now));
    }

    #[test]
    fn test_week_starts_on_sunday() {
        // 2024-06-12 is a Wednesday; its week is Sun 06-09 .. Sat 06-15
        let now = utc(2024, 6, 12, 12);

        assert!(Period::Week.contains(&utc(2024, 6, 9, 0), &now));
        assert!(Period::Week.contains(&utc(2024, 6, 15, 23), &now));
        assert!(!Period::Week.contains(&utc(2024, 6, 8, 23), &now));
        assert!(!Period::Week.contains(&utc(2024, 6, 16, 0), &now));
    }

    #[test]
    fn test_week_on_sunday_itself() {
        let now = utc(2024, 6, 9, 8);

        assert!(Period::Week.contains(&utc(2024, 6, 9, 0), &now));
        assert!(Period::Week.contains(&utc(2024, 6, 15, 0), &now));
        assert!(!Period::Week.contains(&utc(2024, 6, 8, 0), &now));
    }

    #[test]
    fn test_month() {
        let now = utc(2024, 2, 15, 12);

        assert!(Period::Month.contains(&utc(2024, 2, 1, 0), &now));
        assert!(Period::Month.contains(&utc(2024, 2, 29, 23), &now));
        assert!(!Period::Month.contains(&utc(2024, 3, 1, 0), &now));
        assert!(!Period::Month.contains(&utc(2023, 2, 15, 0), &now));
    }

    #[test]
    fn test_period_uses_callers_time_zone() {
        // 02:00 UTC on the 13th is still the 12th at UTC-3
        let brt = FixedOffset::west_opt(3 * 3600).unwrap();
        let now = brt.with_ymd_and_hms(2024, 6, 12, 20, 0, 0).unwrap();
        let late = utc(2024, 6, 13, 2);

        assert!(Period::Today.contains(&late, &now));
        assert!(!Period::Today.contains(&late, &now.with_timezone(&Utc)));
    }

    #[test]
    fn test_sort_newest_first() {
        let mut transactions = vec![
            at(utc(2024, 1, 2, 0), Category::Other, TransactionType::Expense),
            at(utc(2024, 3, 1, 0), Category::Other, TransactionType::Expense),
            at(utc(2024, 2, 1, 0), Category::Other, TransactionType::Expense),
        ];

        sort_newest_first(&mut transactions);

        let months: Vec<u32> = transactions.iter().map(|tx| tx.date.month()).collect();
        assert_eq!(months, vec![3, 2, 1]);
    }

    #[test]
    fn test_parse_filters() {
        assert_eq!("all".parse::<TypeFilter>().unwrap(), TypeFilter::All);
        assert_eq!(
            "income".parse::<TypeFilter>().unwrap(),
            TypeFilter::Only(TransactionType::Income)
        );
        assert_eq!(
            "Leisure".parse::<CategoryFilter>().unwrap(),
            CategoryFilter::Only(Category::Leisure)
        );
        assert_eq!("Week".parse::<Period>().unwrap(), Period::Week);
        assert!("year".parse::<Period>().is_err());
    }
}
