//! Page slicing and page-control metadata for the issue grid.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// One page of a list
#[derive(Debug, PartialEq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub current_page: usize,
    pub total_pages: usize,
}

/// `ceil(len / page_size)`; zero for an empty list or zero page size
pub fn total_pages(len: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    len.div_ceil(page_size)
}

/// Slice `[(page-1)*size, page*size)` of `items`, clamped.
///
/// Page numbers are 1-based. A page outside the list (including page 0)
/// yields an empty slice rather than an error.
pub fn paginate<T>(items: &[T], page_size: usize, current_page: usize) -> Page<'_, T> {
    let total = total_pages(items.len(), page_size);
    let start = current_page
        .checked_sub(1)
        .and_then(|p| p.checked_mul(page_size));

    let slice = match start {
        Some(start) if start < items.len() => {
            let end = start.saturating_add(page_size).min(items.len());
            &items[start..end]
        }
        _ => &items[0..0],
    };

    Page {
        items: slice,
        current_page,
        total_pages: total,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PageControl {
    Previous { target: usize },
    Number { page: usize, current: bool },
    Next { target: usize },
}

/// Controls for the grid footer.
///
/// Nothing when there is at most one page. Every target lies in
/// `1..=total_pages`.
pub fn page_controls(current_page: usize, total_pages: usize) -> Vec<PageControl> {
    if total_pages <= 1 {
        return Vec::new();
    }

    let mut controls = Vec::with_capacity(total_pages + 2);
    if current_page > 1 {
        controls.push(PageControl::Previous {
            target: (current_page - 1).min(total_pages),
        });
    }
    controls.extend((1..=total_pages).map(|page| PageControl::Number {
        page,
        current: page == current_page,
    }));
    if current_page < total_pages {
        controls.push(PageControl::Next {
            target: current_page.max(1) + 1,
        });
    }
    controls
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paginate_empty() {
        let items: Vec<u32> = Vec::new();
        let page = paginate(&items, 9, 1);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_paginate_last_partial_page() {
        let items: Vec<u32> = (0..20).collect();
        let page = paginate(&items, 9, 3);
        assert_eq!(page.items, &items[18..20]);
        assert_eq!(page.total_pages, 3);
    }

    #[test]
    fn test_paginate_out_of_range_is_empty() {
        let items: Vec<u32> = (0..20).collect();
        assert!(paginate(&items, 9, 99).items.is_empty());
        assert!(paginate(&items, 9, 0).items.is_empty());
        assert_eq!(paginate(&items, 9, 99).total_pages, 3);
    }

    #[test]
    fn test_paginate_zero_page_size() {
        let items: Vec<u32> = (0..5).collect();
        let page = paginate(&items, 0, 1);
        assert!(page.items.is_empty());
        assert_eq!(page.total_pages, 0);
    }

    #[test]
    fn test_no_controls_for_single_page() {
        assert!(page_controls(1, 0).is_empty());
        assert!(page_controls(1, 1).is_empty());
    }

    #[test]
    fn test_controls_first_page() {
        let controls = page_controls(1, 3);
        assert_eq!(
            controls,
            vec![
                PageControl::Number { page: 1, current: true },
                PageControl::Number { page: 2, current: false },
                PageControl::Number { page: 3, current: false },
                PageControl::Next { target: 2 },
            ]
        );
    }

    #[test]
    fn test_controls_middle_page() {
        let controls = page_controls(2, 3);
        assert_eq!(controls.first(), Some(&PageControl::Previous { target: 1 }));
        assert_eq!(controls.last(), Some(&PageControl::Next { target: 3 }));
        assert!(controls.contains(&PageControl::Number { page: 2, current: true }));
    }

    #[test]
    fn test_controls_never_target_beyond_last_page() {
        let controls = page_controls(99, 3);
        assert_eq!(controls.first(), Some(&PageControl::Previous { target: 3 }));
        assert!(!controls
            .iter()
            .any(|c| matches!(c, PageControl::Next { .. })));
        for control in controls {
            let target = match control {
                PageControl::Previous { target } | PageControl::Next { target } => target,
                PageControl::Number { page, .. } => page,
            };
            assert!((1..=3).contains(&target));
        }
    }

    #[test]
    fn test_control_serialization_shape() {
        let json = serde_json::to_value(PageControl::Number {
            page: 2,
            current: true,
        })
        .unwrap();
        assert_eq!(json["kind"], "number");
        assert_eq!(json["page"], 2);
        assert_eq!(json["current"], true);
    }
}
