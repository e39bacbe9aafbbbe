// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use crate::filter::FilterPredicate;
use crate::ids::AssetNumber;
use crate::model::{AssetField, AssetRecord};
use crate::paging::PageWindow;
use crate::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetQuery {
    pub filter: FilterPredicate,
    pub window: PageWindow,
}

impl AssetQuery {
    pub fn new(filter: FilterPredicate, window: PageWindow) -> Self {
        Self { filter, window }
    }

    pub fn apply(&self, records: &[AssetRecord]) -> AssetPage {
        let matching = records
            .iter()
            .filter(|record| self.filter.matches(record))
            .cloned()
            .collect::<Vec<_>>();
        AssetPage {
            total: matching.len(),
            rows: self.window.slice(&matching),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetPage {
    pub rows: Vec<AssetRecord>,
    pub total: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetUpdate {
    values: BTreeMap<AssetField, String>,
}

impl AssetUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_record(record: &AssetRecord) -> Self {
        let values = AssetField::ALL
            .into_iter()
            .map(|field| (field, field.value_of(record)))
            .collect();
        Self { values }
    }

    pub fn single(field: AssetField, value: impl Into<String>) -> Self {
        let mut update = Self::new();
        update.set(field, value);
        update
    }

    pub fn set(&mut self, field: AssetField, value: impl Into<String>) {
        self.values.insert(field, value.into());
    }

    pub fn get(&self, field: AssetField) -> Option<&str> {
        self.values.get(&field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (AssetField, &str)> {
        self.values
            .iter()
            .map(|(field, value)| (*field, value.as_str()))
    }

    pub fn apply_to(&self, record: &AssetRecord) -> Result<AssetRecord, StoreError> {
        let mut updated = record.clone();
        for (field, value) in self.iter() {
            field.apply(&mut updated, value)?;
        }
        Ok(updated)
    }
}

/// `list_assets` must return an empty slice with the correct total when the
/// window starts past the end of the filtered set.
pub trait AssetStore {
    fn list_assets(&mut self, query: &AssetQuery) -> Result<AssetPage, StoreError>;

    fn get_asset(&mut self, asset_number: &AssetNumber) -> Result<AssetRecord, StoreError>;

    fn create_asset(&mut self, asset: &AssetRecord) -> Result<AssetRecord, StoreError>;

    fn update_asset(
        &mut self,
        asset_number: &AssetNumber,
        update: &AssetUpdate,
    ) -> Result<AssetRecord, StoreError>;

    fn update_field(
        &mut self,
        asset_number: &AssetNumber,
        field: AssetField,
        value: &str,
    ) -> Result<(), StoreError> {
        self.update_asset(asset_number, &AssetUpdate::single(field, value))
            .map(|_| ())
    }

    fn delete_asset(&mut self, asset_number: &AssetNumber) -> Result<(), StoreError>;
}

impl<S: AssetStore + ?Sized> AssetStore for &mut S {
    fn list_assets(&mut self, query: &AssetQuery) -> Result<AssetPage, StoreError> {
        (**self).list_assets(query)
    }

    fn get_asset(&mut self, asset_number: &AssetNumber) -> Result<AssetRecord, StoreError> {
        (**self).get_asset(asset_number)
    }

    fn create_asset(&mut self, asset: &AssetRecord) -> Result<AssetRecord, StoreError> {
        (**self).create_asset(asset)
    }

    fn update_asset(
        &mut self,
        asset_number: &AssetNumber,
        update: &AssetUpdate,
    ) -> Result<AssetRecord, StoreError> {
        (**self).update_asset(asset_number, update)
    }

    fn update_field(
        &mut self,
        asset_number: &AssetNumber,
        field: AssetField,
        value: &str,
    ) -> Result<(), StoreError> {
        (**self).update_field(asset_number, field, value)
    }

    fn delete_asset(&mut self, asset_number: &AssetNumber) -> Result<(), StoreError> {
        (**self).delete_asset(asset_number)
    }
}

impl<S: AssetStore + ?Sized> AssetStore for Box<S> {
    fn list_assets(&mut self, query: &AssetQuery) -> Result<AssetPage, StoreError> {
        (**self).list_assets(query)
    }

    fn get_asset(&mut self, asset_number: &AssetNumber) -> Result<AssetRecord, StoreError> {
        (**self).get_asset(asset_number)
    }

    fn create_asset(&mut self, asset: &AssetRecord) -> Result<AssetRecord, StoreError> {
        (**self).create_asset(asset)
    }

    fn update_asset(
        &mut self,
        asset_number: &AssetNumber,
        update: &AssetUpdate,
    ) -> Result<AssetRecord, StoreError> {
        (**self).update_asset(asset_number, update)
    }

    fn update_field(
        &mut self,
        asset_number: &AssetNumber,
        field: AssetField,
        value: &str,
    ) -> Result<(), StoreError> {
        (**self).update_field(asset_number, field, value)
    }

    fn delete_asset(&mut self, asset_number: &AssetNumber) -> Result<(), StoreError> {
        (**self).delete_asset(asset_number)
    }
}

#[cfg(test)]
mod tests {
    use super::{AssetQuery, AssetUpdate};
    use crate::filter::FilterPredicate;
    use crate::model::{AssetField, AssetRecord};
    use crate::paging::PageWindow;

    fn records(count: usize) -> Vec<AssetRecord> {
        (0..count)
            .map(|index| {
                let mut record = AssetRecord::new(format!("A-{index:03}"));
                record.division = Some(if index % 3 == 0 { "ENG" } else { "OPS" }.to_owned());
                record
            })
            .collect()
    }

    #[test]
    fn query_filters_before_slicing() {
        let rows = records(12);
        let query = AssetQuery::new(
            FilterPredicate {
                division: Some("ENG".to_owned()),
                ..FilterPredicate::default()
            },
            PageWindow::new(1, 3).expect("valid window"),
        );

        let page = query.apply(&rows);
        assert_eq!(page.total, 4);
        assert_eq!(page.rows.len(), 1);
        assert_eq!(page.rows[0].asset_number.as_str(), "A-009");
    }

    #[test]
    fn update_applies_atomically() {
        let record = AssetRecord::new("A-001");
        let mut update = AssetUpdate::single(AssetField::Brand, "HP");
        update.set(AssetField::AddedDate, "not a date");

        assert!(update.apply_to(&record).is_err());

        update.set(AssetField::AddedDate, "2024-01-02");
        let updated = update.apply_to(&record).expect("valid update");
        assert_eq!(updated.brand.as_deref(), Some("HP"));
        assert_eq!(record.brand, None);
    }

    #[test]
    fn from_record_covers_every_field() {
        let record = AssetRecord::new("A-001");
        let update = AssetUpdate::from_record(&record);
        assert_eq!(update.iter().count(), AssetField::ALL.len());
        assert_eq!(update.apply_to(&record).expect("reapplies"), record);
    }
}
