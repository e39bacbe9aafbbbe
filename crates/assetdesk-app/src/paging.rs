// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::ops::Range;

use crate::StoreError;

pub const PAGE_SIZE_OPTIONS: [usize; 3] = [5, 10, 25];
pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    page: usize,
    size: usize,
}

impl PageWindow {
    pub fn new(page: usize, size: usize) -> Result<Self, StoreError> {
        if size == 0 {
            return Err(StoreError::validation("page size must be at least 1"));
        }
        Ok(Self { page, size })
    }

    pub const fn page(self) -> usize {
        self.page
    }

    pub const fn size(self) -> usize {
        self.size
    }

    pub const fn offset(self) -> usize {
        self.page.saturating_mul(self.size)
    }

    pub fn range(self, total: usize) -> Range<usize> {
        let start = self.offset().min(total);
        let end = start.saturating_add(self.size).min(total);
        start..end
    }

    pub fn slice<T: Clone>(self, rows: &[T]) -> Vec<T> {
        rows[self.range(rows.len())].to_vec()
    }
}

pub fn page_count(total: usize, size: usize) -> usize {
    if size == 0 {
        return 0;
    }
    total.div_ceil(size).max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationState {
    page: usize,
    page_size: usize,
}

impl Default for PaginationState {
    fn default() -> Self {
        Self {
            page: 0,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl PaginationState {
    pub fn with_page_size(page_size: usize) -> Result<Self, StoreError> {
        let mut state = Self::default();
        state.set_page_size(page_size)?;
        Ok(state)
    }

    pub const fn page(&self) -> usize {
        self.page
    }

    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    pub const fn offset(&self) -> usize {
        self.page.saturating_mul(self.page_size)
    }

    pub fn window(&self) -> PageWindow {
        PageWindow {
            page: self.page,
            size: self.page_size,
        }
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn set_page_size(&mut self, page_size: usize) -> Result<(), StoreError> {
        if page_size == 0 {
            return Err(StoreError::validation("page size must be at least 1"));
        }
        self.page_size = page_size;
        self.page = 0;
        Ok(())
    }

    pub fn reset(&mut self) {
        self.page = 0;
    }

    pub fn page_count(&self, total: usize) -> usize {
        page_count(total, self.page_size)
    }

    pub fn last_page(&self, total: usize) -> usize {
        self.page_count(total).saturating_sub(1)
    }

    pub fn has_next(&self, total: usize) -> bool {
        self.page < self.last_page(total)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 0
    }

    pub fn next_page_size(&self) -> usize {
        PAGE_SIZE_OPTIONS
            .iter()
            .copied()
            .find(|size| *size > self.page_size)
            .unwrap_or(PAGE_SIZE_OPTIONS[0])
    }
}
