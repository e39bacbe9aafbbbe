// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use tracing::{debug, info, warn};

use crate::edit::{CommitOutcome, InlineEditState};
use crate::filter::{CategoryGroup, FilterField, FilterState};
use crate::model::{AssetField, AssetRecord};
use crate::notify::{Notification, Notifier};
use crate::paging::PaginationState;
use crate::store::{AssetPage, AssetQuery, AssetStore, AssetUpdate};
use crate::{AssetNumber, StoreError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Idle,
    Loading,
    Error(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct FetchTicket(u64);

impl FetchTicket {
    pub const fn get(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied,
    Stale,
    Failed(StoreError),
}

pub struct TableController<S> {
    store: S,
    filters: FilterState,
    paging: PaginationState,
    edits: InlineEditState,
    rows: Vec<AssetRecord>,
    total: usize,
    status: LoadStatus,
    issued: u64,
    settled: u64,
}

impl<S: AssetStore> TableController<S> {
    pub fn new(store: S, filters: FilterState, paging: PaginationState) -> Self {
        Self {
            store,
            filters,
            paging,
            edits: InlineEditState::default(),
            rows: Vec::new(),
            total: 0,
            status: LoadStatus::Idle,
            issued: 0,
            settled: 0,
        }
    }

    pub fn rows(&self) -> &[AssetRecord] {
        &self.rows
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn status(&self) -> &LoadStatus {
        &self.status
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn paging(&self) -> &PaginationState {
        &self.paging
    }

    pub fn edits(&self) -> &InlineEditState {
        &self.edits
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn row(&self, asset_number: &AssetNumber) -> Option<&AssetRecord> {
        self.rows
            .iter()
            .find(|row| &row.asset_number == asset_number)
    }

    pub fn page_count(&self) -> usize {
        self.paging.page_count(self.total)
    }

    pub fn query(&self) -> AssetQuery {
        AssetQuery::new(self.filters.to_query(), self.paging.window())
    }

    pub fn begin_refresh(&mut self) -> (FetchTicket, AssetQuery) {
        self.issued += 1;
        self.status = LoadStatus::Loading;
        let query = self.query();
        debug!(
            ticket = self.issued,
            page = query.window.page(),
            page_size = query.window.size(),
            filters = ?query.filter.pairs(),
            "fetching assets"
        );
        (FetchTicket(self.issued), query)
    }

    /// A result whose ticket is not newer than the last settled one is
    /// dropped. Failures keep the previous rows, and only the newest ticket
    /// decides the load status.
    pub fn complete_refresh(
        &mut self,
        ticket: FetchTicket,
        result: Result<AssetPage, StoreError>,
        notifier: &mut dyn Notifier,
    ) -> RefreshOutcome {
        if ticket.0 <= self.settled {
            debug!(ticket = ticket.0, settled = self.settled, "dropping stale fetch");
            return RefreshOutcome::Stale;
        }
        self.settled = ticket.0;
        match result {
            Ok(page) => {
                self.rows = page.rows;
                self.total = page.total;
                if self.settled == self.issued {
                    self.status = LoadStatus::Idle;
                }
                RefreshOutcome::Applied
            }
            Err(error) => {
                warn!(ticket = ticket.0, %error, "asset fetch failed");
                if self.settled == self.issued {
                    self.status = LoadStatus::Error(error.to_string());
                }
                notifier.notify(Notification::failure(&error));
                RefreshOutcome::Failed(error)
            }
        }
    }

    pub fn refresh(&mut self, notifier: &mut dyn Notifier) -> RefreshOutcome {
        let (ticket, query) = self.begin_refresh();
        let result = self.store.list_assets(&query);
        self.complete_refresh(ticket, result, notifier)
    }

    pub fn set_filter(
        &mut self,
        field: FilterField,
        value: Option<&str>,
        notifier: &mut dyn Notifier,
    ) -> RefreshOutcome {
        self.filters.set_constraint(field, value);
        self.paging.reset();
        self.refresh(notifier)
    }

    pub fn set_group(
        &mut self,
        group: Option<CategoryGroup>,
        notifier: &mut dyn Notifier,
    ) -> RefreshOutcome {
        self.filters.set_group(group);
        self.paging.reset();
        self.refresh(notifier)
    }

    pub fn reset_filters(&mut self, notifier: &mut dyn Notifier) -> RefreshOutcome {
        self.filters.reset();
        self.paging.reset();
        self.refresh(notifier)
    }

    pub fn set_department(
        &mut self,
        department: Option<&str>,
        notifier: &mut dyn Notifier,
    ) -> RefreshOutcome {
        self.filters.set_department(department);
        self.paging.reset();
        self.refresh(notifier)
    }

    pub fn set_page(&mut self, page: usize, notifier: &mut dyn Notifier) -> RefreshOutcome {
        self.paging.set_page(page);
        self.refresh(notifier)
    }

    pub fn next_page(&mut self, notifier: &mut dyn Notifier) -> Option<RefreshOutcome> {
        if !self.paging.has_next(self.total) {
            return None;
        }
        let page = self.paging.page() + 1;
        Some(self.set_page(page, notifier))
    }

    pub fn prev_page(&mut self, notifier: &mut dyn Notifier) -> Option<RefreshOutcome> {
        if !self.paging.has_prev() {
            return None;
        }
        let page = self.paging.page() - 1;
        Some(self.set_page(page, notifier))
    }

    pub fn set_page_size(
        &mut self,
        page_size: usize,
        notifier: &mut dyn Notifier,
    ) -> Result<RefreshOutcome, StoreError> {
        self.paging.set_page_size(page_size)?;
        Ok(self.refresh(notifier))
    }

    pub fn begin_edit(&mut self, asset_number: &AssetNumber, field: AssetField) -> bool {
        let Some(current) = self.row(asset_number).map(|row| field.value_of(row)) else {
            return false;
        };
        self.edits.begin_edit(asset_number, field, &current);
        true
    }

    pub fn update_draft(
        &mut self,
        asset_number: &AssetNumber,
        field: AssetField,
        value: &str,
    ) -> bool {
        self.edits.update_draft(asset_number, field, value)
    }

    pub fn draft(&self, asset_number: &AssetNumber, field: AssetField) -> Option<&str> {
        self.edits.draft(asset_number, field)
    }

    pub fn cancel_edit(&mut self, asset_number: &AssetNumber, field: AssetField) -> bool {
        self.edits.cancel(asset_number, field)
    }

    pub fn commit_edit(
        &mut self,
        asset_number: &AssetNumber,
        field: AssetField,
        notifier: &mut dyn Notifier,
    ) -> Result<CommitOutcome, StoreError> {
        let resolved = self
            .edits
            .draft(asset_number, field)
            .map(|draft| field.normalize_choice(draft))
            .transpose();
        match resolved {
            Ok(Some(value)) if self.edits.draft(asset_number, field) != Some(value.as_str()) => {
                self.edits.update_draft(asset_number, field, &value);
            }
            Ok(_) => {}
            Err(error) => {
                warn!(asset = %asset_number, field = field.key(), %error, "draft rejected");
                notifier.notify(Notification::failure(&error));
                return Err(error);
            }
        }
        let outcome = match self.edits.commit(&mut self.store, asset_number, field) {
            Ok(outcome) => outcome,
            Err(error) => {
                warn!(asset = %asset_number, field = field.key(), %error, "commit failed");
                notifier.notify(Notification::failure(&error));
                return Err(error);
            }
        };
        match &outcome {
            CommitOutcome::Committed { value } => {
                info!(asset = %asset_number, field = field.key(), "field committed");
                self.patch_row(asset_number, field, value);
                notifier.notify(Notification::asset_updated(asset_number.as_str()));
            }
            CommitOutcome::Coalesced => {
                notifier.notify(Notification::info(format!(
                    "{} of {asset_number} is already being saved",
                    field.label()
                )));
            }
            CommitOutcome::NoDraft => {}
        }
        Ok(outcome)
    }

    pub fn get_asset(&mut self, asset_number: &AssetNumber) -> Result<AssetRecord, StoreError> {
        self.store.get_asset(asset_number)
    }

    pub fn create_asset(
        &mut self,
        asset: &AssetRecord,
        notifier: &mut dyn Notifier,
    ) -> Result<(AssetRecord, RefreshOutcome), StoreError> {
        let created = self.store.create_asset(asset).inspect_err(|error| {
            warn!(asset = %asset.asset_number, %error, "create failed");
            notifier.notify(Notification::failure(error));
        })?;
        info!(asset = %created.asset_number, "asset created");
        notifier.notify(Notification::asset_added(created.asset_number.as_str()));
        let refreshed = self.refresh(notifier);
        Ok((created, refreshed))
    }

    pub fn update_asset(
        &mut self,
        asset_number: &AssetNumber,
        update: &AssetUpdate,
        notifier: &mut dyn Notifier,
    ) -> Result<AssetRecord, StoreError> {
        let updated = self
            .store
            .update_asset(asset_number, update)
            .inspect_err(|error| {
                warn!(asset = %asset_number, %error, "update failed");
                notifier.notify(Notification::failure(error));
            })?;
        info!(asset = %asset_number, "asset updated");
        if let Some(row) = self
            .rows
            .iter_mut()
            .find(|row| &row.asset_number == asset_number)
        {
            *row = updated.clone();
        }
        notifier.notify(Notification::asset_updated(asset_number.as_str()));
        Ok(updated)
    }

    pub fn delete_asset(
        &mut self,
        asset_number: &AssetNumber,
        notifier: &mut dyn Notifier,
    ) -> Result<RefreshOutcome, StoreError> {
        self.store.delete_asset(asset_number).inspect_err(|error| {
            warn!(asset = %asset_number, %error, "delete failed");
            notifier.notify(Notification::failure(error));
        })?;
        info!(asset = %asset_number, "asset deleted");
        self.edits.discard_asset(asset_number);
        notifier.notify(Notification::asset_deleted(asset_number.as_str()));
        Ok(self.refresh(notifier))
    }

    fn patch_row(&mut self, asset_number: &AssetNumber, field: AssetField, value: &str) {
        let Some(row) = self
            .rows
            .iter_mut()
            .find(|row| &row.asset_number == asset_number)
        else {
            return;
        };
        if let Err(error) = field.apply(row, value) {
            warn!(
                asset = %asset_number,
                field = field.key(),
                %error,
                "committed value did not parse locally"
            );
        }
    }
}
