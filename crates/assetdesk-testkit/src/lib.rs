// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use assetdesk_app::{
    AssetField, AssetNumber, AssetPage, AssetQuery, AssetRecord, AssetStatus, AssetStore,
    AssetUpdate, BRANCH_OPTIONS, DIVISION_OPTIONS, FLOOR_OPTIONS, StoreError,
};
use std::collections::VecDeque;
use std::path::PathBuf;
use time::{Date, Month};

// Every category and brand here is in the form option lists.
const CATEGORIES: [(&str, &[&str]); 10] = [
    ("PC", &["Dell", "HP", "Lenovo"]),
    ("Laptop", &["Dell", "Lenovo", "Apple"]),
    ("Printer", &["HP", "Canon", "Epson"]),
    ("Router", &["Cisco", "Juniper"]),
    ("Switch", &["Cisco", "HPE"]),
    ("Server", &["Dell", "HPE"]),
    ("Firewall", &["Fortinet", "Cisco"]),
    ("Access Point", &["Ubiquiti", "Cisco"]),
    ("Camera", &["Axis", "Hikvision"]),
    ("UPS", &["APC"]),
];

const MODEL_SUFFIXES: [&str; 8] = ["100", "220", "400", "7080", "G5", "Pro", "LE", "X2"];

const SECTIONS: [&str; 5] = ["Support", "Infrastructure", "Accounts", "Payroll", "Projects"];
const VENDORS: [&str; 5] = [
    "Abans IT",
    "Metropolitan Computers",
    "Softlogic",
    "Singer Business",
    "Redline Tech",
];
const DESIGNATIONS: [&str; 6] = [
    "Engineer",
    "Technician",
    "Manager",
    "Executive",
    "Analyst",
    "Assistant",
];

const FIRST_NAMES: [&str; 12] = [
    "Nimal", "Kasun", "Dilani", "Ayesha", "Ruwan", "Tharindu", "Sachini", "Malith", "Ishara",
    "Chamara", "Nadeesha", "Pradeep",
];
const LAST_NAMES: [&str; 10] = [
    "Perera",
    "Fernando",
    "Silva",
    "Jayasinghe",
    "Bandara",
    "Wijesinghe",
    "Gunawardena",
    "Rathnayake",
    "Kumara",
    "Dissanayake",
];

const FIRST_YEAR: i32 = 2018;
const LAST_YEAR: i32 = 2025;

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }

    fn bool(&mut self) -> bool {
        (self.next_u64() & 1) == 1
    }
}

#[derive(Debug, Clone)]
pub struct AssetFaker {
    rng: DeterministicRng,
}

impl AssetFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    pub fn asset(&mut self, sequence: usize) -> AssetRecord {
        let (category, brands) = CATEGORIES[self.rng.int_n(CATEGORIES.len())];
        let brand = self.pick(brands);
        let division = self.pick(&DIVISION_OPTIONS);
        let added_year = self.int_range(FIRST_YEAR, LAST_YEAR);
        let added = self.date_in_year(added_year);
        let status = self.status();

        let mut record = AssetRecord::new(format!("A-{sequence:03}"));
        record.name = Some(format!("{category}-{sequence:03}"));
        record.category = Some(category.to_owned());
        record.brand = Some(brand.to_owned());
        record.model = Some(format!(
            "{}{}",
            brand_prefix(brand),
            self.pick(&MODEL_SUFFIXES)
        ));
        record.serial_number = Some(format!("SN-{sequence:05}"));
        record.ip_address = Some(format!(
            "10.{}.{}.{}",
            self.int_range(0, 20),
            self.int_range(0, 254),
            self.int_range(1, 254),
        ));
        let first = self.pick(&FIRST_NAMES);
        let last = self.pick(&LAST_NAMES);
        record.employee_name = Some(format!("{first} {last}"));
        record.employee_number = Some(format!("E{:04}", self.int_range(1, 9999)));
        record.designation = Some(self.pick(&DESIGNATIONS).to_owned());
        record.division = Some(division.to_owned());
        record.section = Some(self.pick(&SECTIONS).to_owned());
        record.department = Some(division.to_owned());
        record.branch = Some(self.pick(&BRANCH_OPTIONS).to_owned());
        record.floor = Some(self.pick(&FLOOR_OPTIONS).to_owned());
        record.vendor = Some(self.pick(&VENDORS).to_owned());
        record.purchased_year = Some(added_year);
        record.added_date = Some(added);
        record.status = status;
        record.status_date = Some(added);
        if status == AssetStatus::Transferred {
            record.transfer_date = Some(self.date_in_year(LAST_YEAR));
        }
        record.warranty = self.rng.bool();
        if record.warranty {
            record.warranty_start = Some(added);
            record.warranty_end = Some(self.date_in_year(added_year + 3));
        }
        record
    }

    pub fn assets(&mut self, count: usize) -> Vec<AssetRecord> {
        (0..count).map(|sequence| self.asset(sequence)).collect()
    }

    fn status(&mut self) -> AssetStatus {
        match self.rng.int_n(10) {
            0 => AssetStatus::InRepair,
            1 => AssetStatus::Transferred,
            2 => AssetStatus::Retired,
            _ => AssetStatus::Active,
        }
    }

    fn pick<'a>(&mut self, items: &'a [&'a str]) -> &'a str {
        items[self.rng.int_n(items.len())]
    }

    fn int_range(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        let span = i64::from(max) - i64::from(min) + 1;
        let offset = (self.rng.next_u64() % (span as u64)) as i64;
        (i64::from(min) + offset) as i32
    }

    fn date_in_year(&mut self, year: i32) -> Date {
        let month = Month::try_from(self.int_range(1, 12) as u8).unwrap_or(Month::January);
        let day = self.int_range(1, 28) as u8;
        Date::from_calendar_date(year, month, day).expect("valid calendar date")
    }
}

pub fn sample_assets() -> Vec<AssetRecord> {
    [
        (
            "A-001", "SN-001", "Printer-01", "192.168.1.10", "Printer", "HP", "LaserJet 400",
            "Head Office", "John Doe", "IT", "Active", "2024-01-10", "2024-01-01",
            "Office printer on 1st floor",
        ),
        (
            "A-002", "SN-002", "Router-Edge", "10.0.0.1", "Router", "Cisco", "ISR4321", "Ekala",
            "Network Team", "IT", "Active", "2024-02-15", "2024-02-01", "Edge router",
        ),
        (
            "A-003", "SN-003", "Workstation-101", "192.168.1.101", "PC", "Dell", "OptiPlex 7080",
            "Nugegoda", "Alice Smith", "Engineering", "In Repair", "2024-03-05", "2023-12-15",
            "Engineering workstation",
        ),
        (
            "A-004", "SN-004", "Camera-Lobby", "192.168.2.20", "Camera", "Axis", "M2026-LE",
            "Galle", "Security", "Operations", "Active", "2024-01-20", "2024-01-05",
            "Lobby surveillance camera",
        ),
    ]
    .into_iter()
    .map(
        |(
            number,
            serial,
            name,
            ip,
            category,
            brand,
            model,
            branch,
            employee,
            division,
            status,
            status_date,
            added,
            remarks,
        )| {
            let mut record = AssetRecord::new(number);
            for (field, value) in [
                (AssetField::SerialNumber, serial),
                (AssetField::Name, name),
                (AssetField::IpAddress, ip),
                (AssetField::Category, category),
                (AssetField::Brand, brand),
                (AssetField::Model, model),
                (AssetField::Branch, branch),
                (AssetField::EmployeeName, employee),
                (AssetField::Division, division),
                (AssetField::Department, division),
                (AssetField::Status, status),
                (AssetField::StatusDate, status_date),
                (AssetField::AddedDate, added),
                (AssetField::Remarks, remarks),
            ] {
                field
                    .apply(&mut record, value)
                    .expect("sample values are well formed");
            }
            record
        },
    )
    .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    List,
    Get,
    Create,
    Update,
    UpdateField,
    Delete,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallCounts {
    pub list: usize,
    pub get: usize,
    pub create: usize,
    pub update: usize,
    pub update_field: usize,
    pub delete: usize,
}

/// In-memory `AssetStore` that records calls and fails on request.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<AssetRecord>,
    failures: VecDeque<(StoreOp, StoreError)>,
    calls: CallCounts,
    field_updates: Vec<(AssetNumber, AssetField, String)>,
    queries: Vec<AssetQuery>,
}

impl MemoryStore {
    pub fn new(records: Vec<AssetRecord>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }

    pub fn records(&self) -> &[AssetRecord] {
        &self.records
    }

    pub fn calls(&self) -> &CallCounts {
        &self.calls
    }

    pub fn field_updates(&self) -> &[(AssetNumber, AssetField, String)] {
        &self.field_updates
    }

    pub fn queries(&self) -> &[AssetQuery] {
        &self.queries
    }

    /// Queues `error` for the next call of `op`. Queued failures for other
    /// operations are left alone.
    pub fn fail_next(&mut self, op: StoreOp, error: StoreError) {
        self.failures.push_back((op, error));
    }

    fn take_failure(&mut self, op: StoreOp) -> Result<(), StoreError> {
        let Some(index) = self.failures.iter().position(|(queued, _)| *queued == op) else {
            return Ok(());
        };
        match self.failures.remove(index) {
            Some((_, error)) => Err(error),
            None => Ok(()),
        }
    }

    fn position(&self, asset_number: &AssetNumber) -> Result<usize, StoreError> {
        self.records
            .iter()
            .position(|record| &record.asset_number == asset_number)
            .ok_or_else(|| StoreError::NotFound(asset_number.clone()))
    }

    fn ensure_serial_free(
        &self,
        serial_number: Option<&str>,
        owner: Option<&AssetNumber>,
    ) -> Result<(), StoreError> {
        let Some(serial_number) = serial_number else {
            return Ok(());
        };
        let taken = self.records.iter().any(|record| {
            record.serial_number.as_deref() == Some(serial_number)
                && Some(&record.asset_number) != owner
        });
        if taken {
            return Err(StoreError::Duplicate(format!("serial number {serial_number}")));
        }
        Ok(())
    }
}

impl AssetStore for MemoryStore {
    fn list_assets(&mut self, query: &AssetQuery) -> Result<AssetPage, StoreError> {
        self.calls.list += 1;
        self.queries.push(query.clone());
        self.take_failure(StoreOp::List)?;
        Ok(query.apply(&self.records))
    }

    fn get_asset(&mut self, asset_number: &AssetNumber) -> Result<AssetRecord, StoreError> {
        self.calls.get += 1;
        self.take_failure(StoreOp::Get)?;
        let index = self.position(asset_number)?;
        Ok(self.records[index].clone())
    }

    fn create_asset(&mut self, asset: &AssetRecord) -> Result<AssetRecord, StoreError> {
        self.calls.create += 1;
        self.take_failure(StoreOp::Create)?;
        if asset.asset_number.as_str().trim().is_empty() {
            return Err(StoreError::validation("asset number is required"));
        }
        if self.position(&asset.asset_number).is_ok() {
            return Err(StoreError::Duplicate(format!(
                "asset number {}",
                asset.asset_number
            )));
        }
        self.ensure_serial_free(asset.serial_number.as_deref(), None)?;
        self.records.push(asset.clone());
        Ok(asset.clone())
    }

    fn update_asset(
        &mut self,
        asset_number: &AssetNumber,
        update: &AssetUpdate,
    ) -> Result<AssetRecord, StoreError> {
        self.calls.update += 1;
        self.take_failure(StoreOp::Update)?;
        let index = self.position(asset_number)?;
        let updated = update.apply_to(&self.records[index])?;
        self.ensure_serial_free(updated.serial_number.as_deref(), Some(asset_number))?;
        self.records[index] = updated.clone();
        Ok(updated)
    }

    fn update_field(
        &mut self,
        asset_number: &AssetNumber,
        field: AssetField,
        value: &str,
    ) -> Result<(), StoreError> {
        self.calls.update_field += 1;
        self.field_updates
            .push((asset_number.clone(), field, value.to_owned()));
        self.take_failure(StoreOp::UpdateField)?;
        let index = self.position(asset_number)?;
        let mut updated = self.records[index].clone();
        field.apply(&mut updated, value)?;
        self.ensure_serial_free(updated.serial_number.as_deref(), Some(asset_number))?;
        self.records[index] = updated;
        Ok(())
    }

    fn delete_asset(&mut self, asset_number: &AssetNumber) -> Result<(), StoreError> {
        self.calls.delete += 1;
        self.take_failure(StoreOp::Delete)?;
        let index = self.position(asset_number)?;
        self.records.remove(index);
        Ok(())
    }
}

pub fn temp_db_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let db_path = dir.path().join("assetdesk.db");
    Ok((dir, db_path))
}

pub fn brand_prefix(brand: &str) -> String {
    brand.chars().take(2).collect::<String>().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::{AssetFaker, MemoryStore, StoreOp, brand_prefix, sample_assets};
    use assetdesk_app::{AssetField, AssetForm, AssetNumber, AssetStatus, AssetStore, StoreError};
    use std::collections::BTreeSet;

    #[test]
    fn same_seed_same_assets() {
        let left = AssetFaker::new(42).assets(5);
        let right = AssetFaker::new(42).assets(5);
        assert_eq!(left, right);
    }

    #[test]
    fn faked_assets_have_unique_identity() {
        let assets = AssetFaker::new(7).assets(50);
        let numbers = assets
            .iter()
            .map(|asset| asset.asset_number.clone())
            .collect::<BTreeSet<_>>();
        let serials = assets
            .iter()
            .filter_map(|asset| asset.serial_number.clone())
            .collect::<BTreeSet<_>>();
        assert_eq!(numbers.len(), 50);
        assert_eq!(serials.len(), 50);
        for asset in &assets {
            assert_eq!(asset.department, asset.division);
            if asset.warranty {
                assert!(asset.warranty_end > asset.warranty_start);
            }
        }
    }

    #[test]
    fn generated_choices_come_from_option_lists() {
        let listed = [
            AssetField::Category,
            AssetField::Brand,
            AssetField::Division,
            AssetField::Floor,
            AssetField::Branch,
        ];
        let assets = AssetFaker::new(11).assets(60).into_iter().chain(sample_assets());
        for asset in assets {
            for field in listed {
                let value = field.value_of(&asset);
                assert_eq!(
                    field.normalize_choice(&value).ok(),
                    Some(value.clone()),
                    "{} {value:?} is not listed",
                    field.label()
                );
            }
            if asset.employee_number.is_some() {
                assert!(AssetForm::from_record(&asset).to_record().is_ok());
            }
        }
    }

    #[test]
    fn sample_assets_match_starter_inventory() {
        let samples = sample_assets();
        assert_eq!(samples.len(), 4);
        assert_eq!(samples[0].name.as_deref(), Some("Printer-01"));
        assert_eq!(samples[2].status, AssetStatus::InRepair);
        assert_eq!(samples[2].division.as_deref(), Some("Engineering"));
        assert_eq!(samples[3].brand.as_deref(), Some("Axis"));
    }

    #[test]
    fn queued_failure_hits_only_its_operation() {
        let mut store = MemoryStore::new(sample_assets());
        store.fail_next(StoreOp::Delete, StoreError::Network("down".to_owned()));

        assert!(store.get_asset(&AssetNumber::from("A-001")).is_ok());
        assert!(store.delete_asset(&AssetNumber::from("A-001")).is_err());
        assert!(store.delete_asset(&AssetNumber::from("A-001")).is_ok());
        assert_eq!(store.calls().delete, 2);
        assert_eq!(store.records().len(), 3);
    }

    #[test]
    fn brand_prefix_uppercases() {
        assert_eq!(brand_prefix("Dell"), "DE");
        assert_eq!(brand_prefix("x"), "X");
    }
}
