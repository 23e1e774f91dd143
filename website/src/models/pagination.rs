use dto::pagination::PaginatedMetaDto;

/// Prev/next links for the result table.
#[derive(Clone, Debug)]
pub struct PaginationLinks {
    pub page: u32,
    pub total_pages: u64,
    pub total_records: u64,
    pub prev: Option<String>,
    pub next: Option<String>,
}

impl PaginationLinks {
    pub fn new(meta: &PaginatedMetaDto, base_url: &str, suffix: &str) -> Self {
        let mut prev: Option<String> = None;
        let mut next: Option<String> = None;

        if meta.has_prev() {
            // Clamp so a page past the end still links back to the last one
            let prev_page = (meta.page as u64 - 1).min(meta.total_pages);
            prev = Some(format!("{}/?page={}{}", base_url, prev_page, suffix));
        }
        if meta.has_next() {
            next = Some(format!("{}/?page={}{}", base_url, meta.page + 1, suffix));
        }

        Self {
            page: meta.page,
            total_pages: meta.total_pages,
            total_records: meta.total_records,
            prev,
            next,
        }
    }
}
