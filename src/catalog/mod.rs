//! Proposal filtering and sorting.
//!
//! Both operations are idempotent: applying the same filter or sort twice
//! yields the same list as applying it once.

use std::cmp::Ordering;

use crate::models::{Eip, EipCategory, EipStatus, EipType};

/// Criteria a proposal must satisfy; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EipFilter {
    pub status: Option<EipStatus>,
    pub eip_type: Option<EipType>,
    pub category: Option<EipCategory>,
    /// Case-insensitive substring of any author name.
    pub author: Option<String>,
}

impl EipFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.eip_type.is_none()
            && self.category.is_none()
            && self.author.as_deref().map_or(true, |a| a.trim().is_empty())
    }

    pub fn matches(&self, eip: &Eip) -> bool {
        if self.status.is_some_and(|s| s != eip.status) {
            return false;
        }
        if self.eip_type.is_some_and(|t| t != eip.eip_type) {
            return false;
        }
        if self.category.is_some() && self.category != eip.category {
            return false;
        }
        if let Some(author) = self.author.as_deref().map(str::trim) {
            if !author.is_empty() {
                let needle = author.to_lowercase();
                if !eip
                    .author
                    .iter()
                    .any(|a| a.to_lowercase().contains(&needle))
                {
                    return false;
                }
            }
        }
        true
    }
}

/// Field to sort proposals by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    Number,
    Title,
    Created,
    Updated,
}

impl SortField {
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "number" => Some(SortField::Number),
            "title" => Some(SortField::Title),
            "created" => Some(SortField::Created),
            "updated" => Some(SortField::Updated),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn from_label(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(SortOrder::Ascending),
            "desc" | "descending" => Some(SortOrder::Descending),
            _ => None,
        }
    }
}

/// Proposals matching `filter`, in input order.
pub fn filter_eips(eips: &[Eip], filter: &EipFilter) -> Vec<Eip> {
    if filter.is_empty() {
        return eips.to_vec();
    }
    eips.iter().filter(|e| filter.matches(e)).cloned().collect()
}

/// Sort in place. Ties are broken by proposal number so the result is total.
pub fn sort_eips(eips: &mut [Eip], field: SortField, order: SortOrder) {
    eips.sort_by(|a, b| {
        let primary = match field {
            SortField::Number => Ordering::Equal,
            SortField::Title => a.title.to_lowercase().cmp(&b.title.to_lowercase()),
            SortField::Created => a.created.cmp(&b.created),
            SortField::Updated => a.last_updated().cmp(&b.last_updated()),
        };
        let ordering = primary.then_with(|| a.number.cmp(&b.number));
        match order {
            SortOrder::Ascending => ordering,
            SortOrder::Descending => ordering.reverse(),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::fallback_eips;

    fn numbers(eips: &[Eip]) -> Vec<u32> {
        eips.iter().map(|e| e.number).collect()
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let eips = fallback_eips();
        assert_eq!(filter_eips(&eips, &EipFilter::default()), eips);
    }

    #[test]
    fn test_filter_by_status_and_category() {
        let eips = fallback_eips();
        let filter = EipFilter {
            status: Some(EipStatus::Final),
            category: Some(EipCategory::Core),
            ..Default::default()
        };
        assert_eq!(numbers(&filter_eips(&eips, &filter)), vec![1559, 4844]);
    }

    #[test]
    fn test_filter_by_type() {
        let eips = fallback_eips();
        let filter = EipFilter {
            eip_type: Some(EipType::Meta),
            ..Default::default()
        };
        assert_eq!(numbers(&filter_eips(&eips, &filter)), vec![1]);
    }

    #[test]
    fn test_filter_by_author_substring() {
        let eips = fallback_eips();
        let filter = EipFilter {
            author: Some("  vitalik ".to_string()),
            ..Default::default()
        };
        let result = filter_eips(&eips, &filter);
        assert!(result.iter().any(|e| e.number == 1559));
        assert!(!result.iter().any(|e| e.number == 721));
    }

    #[test]
    fn test_filter_is_idempotent() {
        let eips = fallback_eips();
        let filter = EipFilter {
            category: Some(EipCategory::ERC),
            ..Default::default()
        };
        let once = filter_eips(&eips, &filter);
        let twice = filter_eips(&once, &filter);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_sort_by_number_descending() {
        let mut eips = fallback_eips();
        sort_eips(&mut eips, SortField::Number, SortOrder::Descending);
        assert_eq!(numbers(&eips), vec![7702, 4844, 4337, 2535, 1559, 721, 20, 1]);
    }

    #[test]
    fn test_sort_by_updated_uses_created_fallback() {
        let mut eips = fallback_eips();
        sort_eips(&mut eips, SortField::Updated, SortOrder::Ascending);
        assert_eq!(eips.first().map(|e| e.number), Some(20));
        assert_eq!(eips.last().map(|e| e.number), Some(7702));
    }

    #[test]
    fn test_sort_is_idempotent() {
        let mut once = fallback_eips();
        once.reverse();
        sort_eips(&mut once, SortField::Title, SortOrder::Ascending);
        let mut twice = once.clone();
        sort_eips(&mut twice, SortField::Title, SortOrder::Ascending);
        assert_eq!(numbers(&once), numbers(&twice));
    }

    #[test]
    fn test_sort_labels() {
        assert_eq!(SortField::from_label("Updated"), Some(SortField::Updated));
        assert_eq!(SortField::from_label("size"), None);
        assert_eq!(SortOrder::from_label("DESC"), Some(SortOrder::Descending));
        assert_eq!(SortOrder::from_label("sideways"), None);
    }
}
