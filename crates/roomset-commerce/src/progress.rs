//! Selection progress.

use serde::{Deserialize, Serialize};

use crate::catalog::PackagePlan;
use crate::ids::CategoryKey;
use crate::selection::SelectionState;

/// Progress of one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryProgress {
    pub key: CategoryKey,
    pub name: String,
    pub selected: u32,
    pub required: u32,
}

impl CategoryProgress {
    /// Selected quantity that counts towards the quota.
    pub fn counted(&self) -> u32 {
        self.selected.min(self.required)
    }

    pub fn is_complete(&self) -> bool {
        self.selected >= self.required
    }

    /// Quantity still to choose.
    pub fn remaining(&self) -> u32 {
        self.required.saturating_sub(self.selected)
    }
}

/// How far a package selection is from complete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionProgress {
    /// Σ min(selected, required).
    pub completed: u64,
    /// Σ required.
    pub required_total: u64,
    /// round(100 × completed / required_total), 0 for an empty plan.
    pub percent: u8,
    pub is_complete: bool,
    pub categories: Vec<CategoryProgress>,
}

impl SelectionProgress {
    /// Derive progress from a selection.
    pub fn compute(plan: &PackagePlan, state: &SelectionState) -> Self {
        let categories: Vec<CategoryProgress> = plan
            .categories
            .iter()
            .map(|c| CategoryProgress {
                key: c.key.clone(),
                name: c.name.clone(),
                selected: state.category_quantity(&c.key),
                required: c.required,
            })
            .collect();

        let completed: u64 = categories.iter().map(|c| u64::from(c.counted())).sum();
        let required_total = plan.required_total();
        let percent = if required_total == 0 {
            0
        } else {
            ((200 * completed + required_total) / (2 * required_total)) as u8
        };

        Self {
            completed,
            required_total,
            percent,
            // A plan without quotas has nothing to submit.
            is_complete: required_total > 0 && categories.iter().all(CategoryProgress::is_complete),
            categories,
        }
    }

    /// Progress of an empty, not yet loaded package.
    pub fn empty() -> Self {
        Self {
            completed: 0,
            required_total: 0,
            percent: 0,
            is_complete: false,
            categories: Vec::new(),
        }
    }

    /// First category that still needs items.
    pub fn next_incomplete(&self) -> Option<&CategoryProgress> {
        self.categories.iter().find(|c| !c.is_complete())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PackageCategory, PackageProduct};
    use crate::money::{Currency, Money};

    fn plan() -> PackagePlan {
        let cny = |u| Money::from_units(u, Currency::CNY);
        PackagePlan::new("plan", "Plan", cny(5000))
            .with_category(
                PackageCategory::new("sofa", "Sofa", 2)
                    .with_product(PackageProduct::new("a", "A", cny(1000)))
                    .with_product(PackageProduct::new("b", "B", cny(1000))),
            )
            .with_category(
                PackageCategory::new("table", "Table", 1)
                    .with_product(PackageProduct::new("t", "T", cny(800))),
            )
    }

    #[test]
    fn test_empty_selection() {
        let progress = SelectionProgress::compute(&plan(), &SelectionState::new());
        assert_eq!(progress.completed, 0);
        assert_eq!(progress.required_total, 3);
        assert_eq!(progress.percent, 0);
        assert!(!progress.is_complete);
        assert_eq!(progress.next_incomplete().map(|c| c.name.as_str()), Some("Sofa"));
    }

    #[test]
    fn test_percent_rounds() {
        let plan = plan();
        let mut state = SelectionState::new();
        state.select(&plan, &"sofa".into(), &"a".into()).unwrap();
        let progress = SelectionProgress::compute(&plan, &state);
        // 1 of 3
        assert_eq!(progress.percent, 33);

        state.select(&plan, &"sofa".into(), &"b".into()).unwrap();
        let progress = SelectionProgress::compute(&plan, &state);
        // 2 of 3
        assert_eq!(progress.percent, 67);
        assert_eq!(progress.categories[0].remaining(), 0);
    }

    #[test]
    fn test_complete() {
        let plan = plan();
        let mut state = SelectionState::new();
        state.select(&plan, &"sofa".into(), &"a".into()).unwrap();
        state
            .change_quantity(&plan, &"sofa".into(), &"a".into(), 1)
            .unwrap();
        state.select(&plan, &"table".into(), &"t".into()).unwrap();

        let progress = SelectionProgress::compute(&plan, &state);
        assert_eq!(progress.percent, 100);
        assert!(progress.is_complete);
        assert!(progress.next_incomplete().is_none());
    }

    #[test]
    fn test_empty_plan_is_zero_percent() {
        let plan = PackagePlan::new("p", "P", Money::zero(Currency::CNY));
        let progress = SelectionProgress::compute(&plan, &SelectionState::new());
        assert_eq!(progress.percent, 0);
        assert!(!progress.is_complete);
    }

    #[test]
    fn test_huge_quotas_do_not_overflow() {
        let cny = |u| Money::from_units(u, Currency::CNY);
        let plan = PackagePlan::new("big", "Big", cny(100))
            .with_category(
                PackageCategory::new("a", "A", 3_000_000_000)
                    .with_product(PackageProduct::new("a1", "A1", cny(10))),
            )
            .with_category(
                PackageCategory::new("b", "B", 3_000_000_000)
                    .with_product(PackageProduct::new("b1", "B1", cny(10))),
            );
        let mut state = SelectionState::new();
        state.select(&plan, &"a".into(), &"a1".into()).unwrap();

        let progress = SelectionProgress::compute(&plan, &state);
        assert_eq!(progress.required_total, 6_000_000_000);
        assert_eq!(progress.completed, 1);
        assert_eq!(progress.percent, 0);
        assert!(!progress.is_complete);
    }
}
