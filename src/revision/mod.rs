//! Synchronizes the revision vocabulary across components.
//!
//! There is exactly one table of revision year ranges in the whole crate.
//! Every component that needs to place a year, a technology or a case into a
//! revision column goes through [`classify_year`] or [`classify_period_str`]
//! rather than carrying its own copy of the boundaries.

use derive_more::{Display, Error};
use serde::{Deserialize, Serialize};

/// The five revision buckets of the evolution matrix, in chronological order.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RevisionKey {
    #[serde(rename = "rev1")]
    Rev1,
    #[serde(rename = "rev2")]
    Rev2,
    #[serde(rename = "rev3")]
    Rev3,
    #[serde(rename = "rev4")]
    Rev4,
    #[serde(rename = "rev5")]
    Rev5,
}

pub const REVISION_ORDER: [RevisionKey; 5] = [
    RevisionKey::Rev1,
    RevisionKey::Rev2,
    RevisionKey::Rev3,
    RevisionKey::Rev4,
    RevisionKey::Rev5,
];

impl RevisionKey {
    /// Inclusive year range covered by this bucket.
    pub fn years(&self) -> (i32, i32) {
        match self {
            RevisionKey::Rev1 => (2000, 2015),
            RevisionKey::Rev2 => (2016, 2020),
            RevisionKey::Rev3 => (2021, 2022),
            RevisionKey::Rev4 => (2023, 2023),
            RevisionKey::Rev5 => (2024, 2025),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RevisionKey::Rev1 => "Rev 1 (2015)",
            RevisionKey::Rev2 => "Rev 2 (2020)",
            RevisionKey::Rev3 => "Rev 3 (2022)",
            RevisionKey::Rev4 => "Rev 4 (2023)",
            RevisionKey::Rev5 => "Rev 5 (2024)",
        }
    }

    pub fn index(&self) -> usize {
        REVISION_ORDER.iter().position(|k| k == self).unwrap()
    }

    pub fn next(&self) -> Option<RevisionKey> {
        REVISION_ORDER.get(self.index() + 1).copied()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RevisionKey::Rev1 => "rev1",
            RevisionKey::Rev2 => "rev2",
            RevisionKey::Rev3 => "rev3",
            RevisionKey::Rev4 => "rev4",
            RevisionKey::Rev5 => "rev5",
        }
    }
}

/// A period string that contains no 4-digit year. Callers are expected to log
/// and skip the offending record rather than abort the derivation.
#[derive(Debug, Display, Error)]
#[display(fmt = "no 4-digit year in period string: {}", period)]
pub struct UnparseablePeriod {
    #[error(not(source))]
    pub period: String,
}

/// Maps a calendar year to a revision bucket. Total over all integers: years
/// before 2000 clamp to Rev1, years after 2025 clamp to Rev5.
pub fn classify_year(year: i32) -> RevisionKey {
    for key in REVISION_ORDER {
        let (_, hi) = key.years();
        if year <= hi {
            return key;
        }
    }
    RevisionKey::Rev5
}

/// Classifies a free-text period such as `"2015-2017"` or `"2020+"` by its
/// first 4-digit year. A string without one is a data-quality error, never a
/// silent default bucket.
pub fn classify_period_str(period: &str) -> Result<RevisionKey, UnparseablePeriod> {
    match first_year(period) {
        Some(year) => Ok(classify_year(year)),
        None => Err(UnparseablePeriod {
            period: period.to_string(),
        }),
    }
}

/// First run of at least four ASCII digits, read as a 4-digit year.
pub fn first_year(text: &str) -> Option<i32> {
    let bytes = text.as_bytes();
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i].is_ascii_digit() {
            let mut j = i;
            while j < bytes.len() && bytes[j].is_ascii_digit() {
                j += 1;
            }
            if j - i >= 4 {
                return text[i..i + 4].parse().ok();
            }
            i = j;
        } else {
            i += 1;
        }
    }
    None
}

/// Technology categories as they appear in the record store.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Data,
    Processing,
    Ml,
    Visualization,
    Infrastructure,
    Risk,
    Execution,
    Adaptation,
}

pub mod module_names {
    pub const DATA_COLLECTION: &str = "Сбор данных";
    pub const DATA_PROCESSING: &str = "Обработка данных";
    pub const FEATURE_ENGINEERING: &str = "Feature Engineering";
    pub const SIGNAL_GENERATION: &str = "Генерация сигналов";
    pub const RISK_MANAGEMENT: &str = "Риск-менеджмент";
    pub const EXECUTION: &str = "Исполнение сделок";
    pub const MARKET_ADAPTATION: &str = "Адаптация к рынку";
    pub const VISUALIZATION: &str = "Визуализация и мониторинг";
    pub const INFRASTRUCTURE: &str = "Инфраструктура";
}

use module_names::*;

/// Display order of matrix rows. Инфраструктура is ninth so that
/// infrastructure technologies are not dropped from the integrated view.
pub const MODULE_ORDER: [&str; 9] = [
    DATA_COLLECTION,
    DATA_PROCESSING,
    FEATURE_ENGINEERING,
    SIGNAL_GENERATION,
    RISK_MANAGEMENT,
    EXECUTION,
    MARKET_ADAPTATION,
    VISUALIZATION,
    INFRASTRUCTURE,
];

pub fn module_for_category(category: Category) -> &'static str {
    match category {
        Category::Data => DATA_COLLECTION,
        Category::Processing => DATA_PROCESSING,
        Category::Ml => SIGNAL_GENERATION,
        Category::Visualization => VISUALIZATION,
        Category::Infrastructure => INFRASTRUCTURE,
        Category::Risk => RISK_MANAGEMENT,
        Category::Execution => EXECUTION,
        Category::Adaptation => MARKET_ADAPTATION,
    }
}

/// Reverse of [`module_for_category`], except that Feature Engineering is an
/// aggregate of two categories and owns none of its own.
pub fn categories_for_module(module: &str) -> &'static [Category] {
    match module {
        DATA_COLLECTION => &[Category::Data],
        DATA_PROCESSING => &[Category::Processing],
        FEATURE_ENGINEERING => &[Category::Processing, Category::Ml],
        SIGNAL_GENERATION => &[Category::Ml],
        RISK_MANAGEMENT => &[Category::Risk],
        EXECUTION => &[Category::Execution],
        MARKET_ADAPTATION => &[Category::Adaptation],
        VISUALIZATION => &[Category::Visualization],
        INFRASTRUCTURE => &[Category::Infrastructure],
        _ => &[],
    }
}

pub fn module_order_index(module: &str) -> usize {
    MODULE_ORDER
        .iter()
        .position(|m| *m == module)
        .unwrap_or(MODULE_ORDER.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_year_is_total_and_monotonic() {
        let mut last = 0;
        for year in 1990..=2030 {
            let idx = classify_year(year).index();
            assert!(idx <= 4);
            assert!(idx >= last, "bucket index decreased at year {year}");
            last = idx;
        }
    }

    #[test]
    fn classify_year_boundaries() {
        assert_eq!(classify_year(2015), RevisionKey::Rev1);
        assert_eq!(classify_year(2016), RevisionKey::Rev2);
        assert_eq!(classify_year(2023), RevisionKey::Rev4);
        assert_eq!(classify_year(2025), RevisionKey::Rev5);
        assert_eq!(classify_year(2030), RevisionKey::Rev5);
        assert_eq!(classify_year(1990), RevisionKey::Rev1);
    }

    #[test]
    fn ranges_are_contiguous() {
        for pair in REVISION_ORDER.windows(2) {
            let (_, hi) = pair[0].years();
            let (lo, _) = pair[1].years();
            assert_eq!(hi + 1, lo);
        }
    }

    #[test]
    fn classify_period_str_takes_first_year() {
        assert_eq!(classify_period_str("2015-2017").unwrap(), RevisionKey::Rev1);
        assert_eq!(classify_period_str("2020+").unwrap(), RevisionKey::Rev2);
        assert_eq!(classify_period_str("c 2024 года").unwrap(), RevisionKey::Rev5);
    }

    #[test]
    fn classify_period_str_rejects_yearless_strings() {
        assert!(classify_period_str("unknown").is_err());
        assert!(classify_period_str("90-е").is_err());
        assert!(classify_period_str("").is_err());
    }

    #[test]
    fn feature_engineering_aggregates_two_categories() {
        let cats = categories_for_module(module_names::FEATURE_ENGINEERING);
        assert_eq!(cats, &[Category::Processing, Category::Ml]);
        // No category maps back to Feature Engineering.
        assert_eq!(module_for_category(Category::Processing), module_names::DATA_PROCESSING);
        assert_eq!(module_for_category(Category::Ml), module_names::SIGNAL_GENERATION);
    }
}
