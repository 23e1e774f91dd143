use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaginatedMetaDto {
    pub page: u32,
    pub per_page: u32,
    pub total_records: u64,
    pub total_pages: u64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PaginatedDto<T> {
    pub meta: PaginatedMetaDto,
    pub data: Vec<T>,
}

impl PaginatedMetaDto {
    /// Builds the page metadata. The requested page is kept as-is even when
    /// it runs past the last page, so the caller sees an empty slice rather
    /// than a silently different page.
    pub fn new(page: u32, per_page: u32, total_records: u64) -> Self {
        Self {
            page,
            per_page,
            total_records,
            total_pages: total_pages(total_records, per_page),
        }
    }

    /// Zero-based index of the first record on the current page.
    pub fn offset(&self) -> usize {
        (self.page.saturating_sub(1) as usize).saturating_mul(self.per_page as usize)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        (self.page as u64) < self.total_pages
    }
}

impl<T> PaginatedDto<T> {
    pub fn new(records: Vec<T>, page: u32, per_page: u32, total_records: u64) -> Self {
        Self {
            meta: PaginatedMetaDto::new(page, per_page, total_records),
            data: records,
        }
    }

    /// Slices one page out of an in-memory list, counting the whole list.
    pub fn from_all(records: Vec<T>, page: u32, per_page: u32) -> Self {
        let meta = PaginatedMetaDto::new(page, per_page, records.len() as u64);
        let data = records
            .into_iter()
            .skip(meta.offset())
            .take(per_page as usize)
            .collect();
        Self { meta, data }
    }
}

/// `ceil(total_records / per_page)`, never less than one page.
pub fn total_pages(total_records: u64, per_page: u32) -> u64 {
    if per_page == 0 {
        return 1;
    }
    total_records.div_ceil(per_page as u64).max(1)
}
