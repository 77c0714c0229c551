//! Derived visibility flags for pagination controls.

/// Row range shown to the user, 1-based and inclusive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DataMeta {
    pub from: u64,
    pub to: u64,
    pub of: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationView {
    pub page: i64,
    pub per_page: i64,
    pub total_rows: u64,
    pub can_show_load_more: bool,
    pub can_show_pagination: bool,
    pub can_show_bottom_navigation: bool,
    pub has_active_filter: bool,
    pub data_meta: DataMeta,
}

impl PaginationView {
    pub fn compute(
        page: i64,
        per_page: i64,
        total_rows: u64,
        item_count: usize,
        has_active_filter: bool,
    ) -> Self {
        let total = i128::from(total_rows);
        let can_show_load_more = i128::from(page) * i128::from(per_page) < total;
        let can_show_pagination = i128::from(per_page) < total;

        Self {
            page,
            per_page,
            total_rows,
            can_show_load_more,
            can_show_pagination,
            can_show_bottom_navigation: can_show_load_more || can_show_pagination,
            has_active_filter,
            data_meta: data_meta(page, per_page, total_rows, item_count),
        }
    }
}

fn data_meta(page: i64, per_page: i64, total_rows: u64, item_count: usize) -> DataMeta {
    let offset = u64::try_from(page.max(1) - 1)
        .unwrap_or_default()
        .saturating_mul(u64::try_from(per_page.max(0)).unwrap_or_default());
    let shown = u64::try_from(item_count).unwrap_or(u64::MAX);
    if shown == 0 || total_rows == 0 {
        return DataMeta {
            from: 0,
            to: 0,
            of: total_rows,
        };
    }
    DataMeta {
        from: offset.saturating_add(1),
        to: offset.saturating_add(shown).min(total_rows),
        of: total_rows,
    }
}
