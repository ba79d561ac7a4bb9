/// One page of an ordered index set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<'a, T> {
    pub items: &'a [T],
    pub total: usize,
    pub total_pages: usize,
}

/// Slice `items` into 1-based pages of `per_page`.
///
/// `page` and `per_page` must be at least 1; callers validate them. A page
/// past the end is empty. There is always at least one page.
pub fn paginate<T>(items: &[T], page: usize, per_page: usize) -> Page<'_, T> {
    let total = items.len();
    let total_pages = total.div_ceil(per_page).max(1);

    let start = page.saturating_sub(1).saturating_mul(per_page).min(total);
    let end = start.saturating_add(per_page).min(total);

    Page {
        items: &items[start..end],
        total,
        total_pages,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_pages_rounds_up_with_minimum_one() {
        let items: Vec<usize> = (0..45).collect();
        assert_eq!(paginate(&items, 1, 20).total_pages, 3);
        assert_eq!(paginate(&items, 1, 45).total_pages, 1);
        assert_eq!(paginate::<usize>(&[], 1, 20).total_pages, 1);
    }

    #[test]
    fn test_last_page_is_partial() {
        let items: Vec<usize> = (0..45).collect();
        let page = paginate(&items, 3, 20);
        assert_eq!(page.items, &[40, 41, 42, 43, 44]);
        assert_eq!(page.total, 45);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let items: Vec<usize> = (0..5).collect();
        assert!(paginate(&items, 2, 5).items.is_empty());
        assert!(paginate(&items, usize::MAX, 5).items.is_empty());
    }

    #[test]
    fn test_pages_reconstruct_input_exactly_once() {
        let items: Vec<usize> = vec![3, 7, 8, 12, 20, 21, 30];
        for per_page in 1..=8 {
            let total_pages = paginate(&items, 1, per_page).total_pages;
            let joined: Vec<usize> = (1..=total_pages)
                .flat_map(|p| paginate(&items, p, per_page).items.to_vec())
                .collect();
            assert_eq!(joined, items, "per_page {per_page}");
        }
    }
}
