// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use crate::ids::AssetNumber;
use crate::model::AssetField;
use crate::store::AssetStore;
use crate::StoreError;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EditKey {
    pub asset_number: AssetNumber,
    pub field: AssetField,
}

impl EditKey {
    pub fn new(asset_number: &AssetNumber, field: AssetField) -> Self {
        Self {
            asset_number: asset_number.clone(),
            field,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub draft: String,
    pub in_flight: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitStart {
    Send(String),
    NoDraft,
    InFlight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed { value: String },
    NoDraft,
    Coalesced,
}

#[derive(Debug, Clone, Default)]
pub struct InlineEditState {
    edits: BTreeMap<EditKey, PendingEdit>,
}

impl InlineEditState {
    pub fn begin_edit(
        &mut self,
        asset_number: &AssetNumber,
        field: AssetField,
        current: &str,
    ) -> bool {
        let key = EditKey::new(asset_number, field);
        if self.edits.contains_key(&key) {
            return false;
        }
        self.edits.insert(
            key,
            PendingEdit {
                draft: current.to_owned(),
                in_flight: false,
            },
        );
        true
    }

    /// Overwrites an open draft. Only `begin_edit` opens one, so this returns
    /// false and changes nothing when no draft exists.
    pub fn update_draft(
        &mut self,
        asset_number: &AssetNumber,
        field: AssetField,
        value: &str,
    ) -> bool {
        let Some(edit) = self.edits.get_mut(&EditKey::new(asset_number, field)) else {
            return false;
        };
        value.clone_into(&mut edit.draft);
        true
    }

    pub fn draft(&self, asset_number: &AssetNumber, field: AssetField) -> Option<&str> {
        self.pending(asset_number, field)
            .map(|edit| edit.draft.as_str())
    }

    pub fn pending(&self, asset_number: &AssetNumber, field: AssetField) -> Option<&PendingEdit> {
        self.edits.get(&EditKey::new(asset_number, field))
    }

    pub fn is_editing(&self, asset_number: &AssetNumber, field: AssetField) -> bool {
        self.pending(asset_number, field).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn cancel(&mut self, asset_number: &AssetNumber, field: AssetField) -> bool {
        self.edits
            .remove(&EditKey::new(asset_number, field))
            .is_some()
    }

    pub fn discard_asset(&mut self, asset_number: &AssetNumber) {
        self.edits
            .retain(|key, _| &key.asset_number != asset_number);
    }

    pub fn begin_commit(&mut self, asset_number: &AssetNumber, field: AssetField) -> CommitStart {
        let Some(edit) = self.edits.get_mut(&EditKey::new(asset_number, field)) else {
            return CommitStart::NoDraft;
        };
        if edit.in_flight {
            return CommitStart::InFlight;
        }
        edit.in_flight = true;
        CommitStart::Send(edit.draft.clone())
    }

    pub fn finish_commit(
        &mut self,
        asset_number: &AssetNumber,
        field: AssetField,
        sent: &str,
        succeeded: bool,
    ) {
        let key = EditKey::new(asset_number, field);
        let Some(edit) = self.edits.get_mut(&key) else {
            return;
        };
        edit.in_flight = false;
        if succeeded && edit.draft == sent {
            self.edits.remove(&key);
        }
    }

    pub fn commit<S: AssetStore + ?Sized>(
        &mut self,
        store: &mut S,
        asset_number: &AssetNumber,
        field: AssetField,
    ) -> Result<CommitOutcome, StoreError> {
        let value = match self.begin_commit(asset_number, field) {
            CommitStart::Send(value) => value,
            CommitStart::NoDraft => return Ok(CommitOutcome::NoDraft),
            CommitStart::InFlight => return Ok(CommitOutcome::Coalesced),
        };
        let result = store.update_field(asset_number, field, &value);
        self.finish_commit(asset_number, field, &value, result.is_ok());
        result.map(|()| CommitOutcome::Committed { value })
    }
}
