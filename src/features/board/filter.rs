//! Pure derivation of the filtered issue subset.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::features::issues::models::{IssueCategory, IssueRecord, IssueStatus};
use crate::shared::types::empty_string_as_none;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Ownership {
    #[default]
    Any,
    /// Only issues whose reporter is the current user
    Mine,
}

/// Conjunction of optional predicates; an unset predicate matches everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IssueFilter {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub category: Option<IssueCategory>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    pub status: Option<IssueStatus>,
    #[serde(default)]
    pub ownership: Ownership,
}

impl IssueFilter {
    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.category.is_none() && self.status.is_none() && self.ownership == Ownership::Any
    }

    pub fn matches(&self, issue: &IssueRecord, current_user: Option<&str>) -> bool {
        if self.category.is_some_and(|c| c != issue.category) {
            return false;
        }
        if self.status.is_some_and(|s| s != issue.status) {
            return false;
        }
        match self.ownership {
            Ownership::Any => true,
            Ownership::Mine => current_user.is_some_and(|user| issue.is_reported_by(user)),
        }
    }
}

/// Issues of `all` matching `filter`, in their original order.
///
/// `Ownership::Mine` without a current user yields nothing.
pub fn filter_issues(
    all: &[Arc<IssueRecord>],
    filter: &IssueFilter,
    current_user: Option<&str>,
) -> Vec<Arc<IssueRecord>> {
    if filter.ownership == Ownership::Mine && current_user.is_none() {
        return Vec::new();
    }
    all.iter()
        .filter(|issue| filter.matches(issue, current_user))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::test_helpers::issue_fixture;

    fn sample() -> Vec<Arc<IssueRecord>> {
        let specs = [
            (IssueCategory::Roads, IssueStatus::Reported, Some("u1")),
            (IssueCategory::Lighting, IssueStatus::Resolved, Some("u2")),
            (IssueCategory::Roads, IssueStatus::InProgress, None),
            (IssueCategory::Water, IssueStatus::Reported, Some("u1")),
            (IssueCategory::Roads, IssueStatus::Reported, Some("u2")),
        ];
        specs
            .into_iter()
            .map(|(category, status, reporter)| {
                let mut issue = issue_fixture("388001", category, status);
                issue.reporter_id = reporter.map(str::to_string);
                Arc::new(issue)
            })
            .collect()
    }

    fn ids(issues: &[Arc<IssueRecord>]) -> Vec<uuid::Uuid> {
        issues.iter().map(|i| i.id).collect()
    }

    #[test]
    fn test_empty_filter_returns_everything() {
        let all = sample();
        let filtered = filter_issues(&all, &IssueFilter::default(), None);
        assert_eq!(ids(&filtered), ids(&all));
    }

    #[test]
    fn test_empty_input_returns_empty() {
        let filter = IssueFilter {
            category: Some(IssueCategory::Roads),
            ..Default::default()
        };
        assert!(filter_issues(&[], &filter, Some("u1")).is_empty());
    }

    #[test]
    fn test_predicates_combine_with_and_and_preserve_order() {
        let all = sample();
        let filter = IssueFilter {
            category: Some(IssueCategory::Roads),
            status: Some(IssueStatus::Reported),
            ownership: Ownership::Any,
        };
        let filtered = filter_issues(&all, &filter, None);
        assert_eq!(ids(&filtered), vec![all[0].id, all[4].id]);
    }

    #[test]
    fn test_result_is_subset_and_idempotent() {
        let all = sample();
        let filter = IssueFilter {
            category: Some(IssueCategory::Roads),
            ..Default::default()
        };
        let once = filter_issues(&all, &filter, None);
        let twice = filter_issues(&once, &filter, None);
        assert_eq!(ids(&once), ids(&twice));
        assert!(once.iter().all(|i| all.iter().any(|a| a.id == i.id)));
    }

    #[test]
    fn test_mine_without_user_is_empty() {
        let all = sample();
        let filter = IssueFilter {
            ownership: Ownership::Mine,
            ..Default::default()
        };
        assert!(filter_issues(&all, &filter, None).is_empty());
    }

    #[test]
    fn test_mine_matches_reporter() {
        let all = sample();
        let filter = IssueFilter {
            ownership: Ownership::Mine,
            ..Default::default()
        };
        let mine = filter_issues(&all, &filter, Some("u1"));
        assert_eq!(ids(&mine), vec![all[0].id, all[3].id]);
    }

    #[test]
    fn test_filter_does_not_mutate_input() {
        let all = sample();
        let before = ids(&all);
        let filter = IssueFilter {
            status: Some(IssueStatus::Resolved),
            ..Default::default()
        };
        let _ = filter_issues(&all, &filter, None);
        assert_eq!(ids(&all), before);
    }

    #[test]
    fn test_filter_deserializes_blank_selects() {
        let filter: IssueFilter =
            serde_json::from_str(r#"{"category": "", "status": "resolved"}"#).unwrap();
        assert_eq!(filter.category, None);
        assert_eq!(filter.status, Some(IssueStatus::Resolved));
        assert_eq!(filter.ownership, Ownership::Any);
        assert!(!filter.is_empty());
    }
}
