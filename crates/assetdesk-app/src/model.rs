// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use time::Date;

use crate::ids::*;
use crate::validation::{
    FieldError, format_date, format_flag, format_year, optional_text, parse_flag,
    parse_optional_date, parse_optional_year,
};
use crate::StoreError;

pub const PLACEHOLDER: &str = "—";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AssetStatus {
    #[default]
    Active,
    InRepair,
    Transferred,
    Retired,
}

impl AssetStatus {
    pub const ALL: [Self; 4] = [
        Self::Active,
        Self::InRepair,
        Self::Transferred,
        Self::Retired,
    ];

    pub const fn code(self) -> &'static str {
        match self {
            Self::Active => "A",
            Self::InRepair => "I",
            Self::Transferred => "T",
            Self::Retired => "R",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::InRepair => "In Repair",
            Self::Transferred => "Transferred",
            Self::Retired => "Retired",
        }
    }

    pub fn from_code(value: &str) -> Option<Self> {
        match value {
            "A" => Some(Self::Active),
            "I" => Some(Self::InRepair),
            "T" => Some(Self::Transferred),
            "R" => Some(Self::Retired),
            _ => None,
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ALL.into_iter().find(|status| {
            status.code().eq_ignore_ascii_case(trimmed)
                || status.label().eq_ignore_ascii_case(trimmed)
        })
    }

    pub fn next(self) -> Self {
        let index = Self::ALL
            .iter()
            .position(|status| *status == self)
            .unwrap_or_default();
        Self::ALL[(index + 1) % Self::ALL.len()]
    }
}

pub const CATEGORY_OPTIONS: [&str; 10] = [
    "PC",
    "Laptop",
    "Printer",
    "Server",
    "Router",
    "Switch",
    "Firewall",
    "Access Point",
    "Camera",
    "UPS",
];

pub const BRAND_OPTIONS: [&str; 15] = [
    "Dell", "HP", "Lenovo", "Cisco", "Canon", "Asus", "Apple", "Epson", "HPE", "Juniper",
    "Fortinet", "Ubiquiti", "Axis", "Hikvision", "APC",
];

pub const DIVISION_OPTIONS: [&str; 6] = [
    "Administration",
    "IT",
    "Engineering",
    "Operations",
    "Finance",
    "HR",
];

pub const FLOOR_OPTIONS: [&str; 5] = [
    "Ground Floor",
    "1st Floor",
    "2nd Floor",
    "3rd Floor",
    "4th Floor",
];

pub const BRANCH_OPTIONS: [&str; 5] = ["Head Office", "Ekala", "Nugegoda", "Galle", "Kandy"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRecord {
    pub asset_number: AssetNumber,
    pub name: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub ip_address: Option<String>,
    pub employee_number: Option<String>,
    pub employee_name: Option<String>,
    pub designation: Option<String>,
    pub division: Option<String>,
    pub section: Option<String>,
    pub department: Option<String>,
    pub status: AssetStatus,
    pub status_date: Option<Date>,
    pub added_date: Option<Date>,
    pub transfer_date: Option<Date>,
    pub branch: Option<String>,
    pub floor: Option<String>,
    pub vendor: Option<String>,
    pub purchased_year: Option<i32>,
    pub warranty: bool,
    pub warranty_start: Option<Date>,
    pub warranty_end: Option<Date>,
    pub remarks: Option<String>,
}

impl AssetRecord {
    pub fn new(asset_number: impl Into<AssetNumber>) -> Self {
        Self {
            asset_number: asset_number.into(),
            name: None,
            category: None,
            brand: None,
            model: None,
            serial_number: None,
            ip_address: None,
            employee_number: None,
            employee_name: None,
            designation: None,
            division: None,
            section: None,
            department: None,
            status: AssetStatus::Active,
            status_date: None,
            added_date: None,
            transfer_date: None,
            branch: None,
            floor: None,
            vendor: None,
            purchased_year: None,
            warranty: false,
            warranty_start: None,
            warranty_end: None,
            remarks: None,
        }
    }

    pub fn with(mut self, field: AssetField, value: &str) -> Result<Self, StoreError> {
        field.apply(&mut self, value)?;
        Ok(self)
    }

    pub fn display(&self, field: AssetField) -> String {
        let value = field.value_of(self);
        if value.is_empty() {
            PLACEHOLDER.to_owned()
        } else {
            value
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Date,
    Year,
    Flag,
    Status,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum AssetField {
    Name,
    Category,
    Brand,
    Model,
    SerialNumber,
    IpAddress,
    EmployeeNumber,
    EmployeeName,
    Designation,
    Division,
    Section,
    Department,
    Status,
    StatusDate,
    AddedDate,
    TransferDate,
    Branch,
    Floor,
    Vendor,
    PurchasedYear,
    Warranty,
    WarrantyStart,
    WarrantyEnd,
    Remarks,
}

impl AssetField {
    pub const ALL: [Self; 24] = [
        Self::Name,
        Self::Category,
        Self::Brand,
        Self::Model,
        Self::SerialNumber,
        Self::IpAddress,
        Self::EmployeeNumber,
        Self::EmployeeName,
        Self::Designation,
        Self::Division,
        Self::Section,
        Self::Department,
        Self::Status,
        Self::StatusDate,
        Self::AddedDate,
        Self::TransferDate,
        Self::Branch,
        Self::Floor,
        Self::Vendor,
        Self::PurchasedYear,
        Self::Warranty,
        Self::WarrantyStart,
        Self::WarrantyEnd,
        Self::Remarks,
    ];

    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Category => "category",
            Self::Brand => "brand",
            Self::Model => "model",
            Self::SerialNumber => "serialNumber",
            Self::IpAddress => "ipAddress",
            Self::EmployeeNumber => "employeeNumber",
            Self::EmployeeName => "employeeName",
            Self::Designation => "designation",
            Self::Division => "division",
            Self::Section => "section",
            Self::Department => "department",
            Self::Status => "status",
            Self::StatusDate => "statusDate",
            Self::AddedDate => "addedDate",
            Self::TransferDate => "transferDate",
            Self::Branch => "branch",
            Self::Floor => "floor",
            Self::Vendor => "vendor",
            Self::PurchasedYear => "purchasedYear",
            Self::Warranty => "warranty",
            Self::WarrantyStart => "warrantyStart",
            Self::WarrantyEnd => "warrantyEnd",
            Self::Remarks => "remarks",
        }
    }

    pub const fn wire_name(self) -> &'static str {
        match self {
            Self::Name => "pcName",
            Self::Category => "assetCategory",
            Self::Brand => "assetBrand",
            Self::Model => "assetModel",
            Self::SerialNumber => "assetSerialNo",
            Self::IpAddress => "assetIp",
            Self::EmployeeNumber => "empNo",
            Self::EmployeeName => "empName",
            Self::Designation => "designation",
            Self::Division => "division",
            Self::Section => "section",
            Self::Department => "department",
            Self::Status => "status",
            Self::StatusDate => "dateOfStatus",
            Self::AddedDate => "addedDate",
            Self::TransferDate => "transferDate",
            Self::Branch => "branch",
            Self::Floor => "floor",
            Self::Vendor => "vendor",
            Self::PurchasedYear => "purchasedYear",
            Self::Warranty => "maintenanceWarranty",
            Self::WarrantyStart => "maintenanceWarrantyStartDate",
            Self::WarrantyEnd => "maintenanceWarrantyEndDate",
            Self::Remarks => "remarks",
        }
    }

    pub const fn column_name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Category => "category",
            Self::Brand => "brand",
            Self::Model => "model",
            Self::SerialNumber => "serial_number",
            Self::IpAddress => "ip_address",
            Self::EmployeeNumber => "employee_number",
            Self::EmployeeName => "employee_name",
            Self::Designation => "designation",
            Self::Division => "division",
            Self::Section => "section",
            Self::Department => "department",
            Self::Status => "status",
            Self::StatusDate => "status_date",
            Self::AddedDate => "added_date",
            Self::TransferDate => "transfer_date",
            Self::Branch => "branch",
            Self::Floor => "floor",
            Self::Vendor => "vendor",
            Self::PurchasedYear => "purchased_year",
            Self::Warranty => "warranty",
            Self::WarrantyStart => "warranty_start",
            Self::WarrantyEnd => "warranty_end",
            Self::Remarks => "remarks",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Name",
            Self::Category => "Category",
            Self::Brand => "Brand",
            Self::Model => "Model",
            Self::SerialNumber => "Serial Number",
            Self::IpAddress => "IP Address",
            Self::EmployeeNumber => "Emp. No",
            Self::EmployeeName => "Employee",
            Self::Designation => "Designation",
            Self::Division => "Division",
            Self::Section => "Section",
            Self::Department => "Department",
            Self::Status => "Status",
            Self::StatusDate => "Status Date",
            Self::AddedDate => "Added",
            Self::TransferDate => "Transferred",
            Self::Branch => "Branch",
            Self::Floor => "Floor",
            Self::Vendor => "Vendor",
            Self::PurchasedYear => "Purchased",
            Self::Warranty => "Warranty",
            Self::WarrantyStart => "Warranty Start",
            Self::WarrantyEnd => "Warranty End",
            Self::Remarks => "Remarks",
        }
    }

    pub const fn kind(self) -> FieldKind {
        match self {
            Self::Status => FieldKind::Status,
            Self::StatusDate
            | Self::AddedDate
            | Self::TransferDate
            | Self::WarrantyStart
            | Self::WarrantyEnd => FieldKind::Date,
            Self::PurchasedYear => FieldKind::Year,
            Self::Warranty => FieldKind::Flag,
            _ => FieldKind::Text,
        }
    }

    pub const fn options(self) -> Option<&'static [&'static str]> {
        match self {
            Self::Category => Some(&CATEGORY_OPTIONS),
            Self::Brand => Some(&BRAND_OPTIONS),
            Self::Division => Some(&DIVISION_OPTIONS),
            Self::Floor => Some(&FLOOR_OPTIONS),
            Self::Branch => Some(&BRANCH_OPTIONS),
            _ => None,
        }
    }

    pub fn normalize_choice(self, input: &str) -> Result<String, StoreError> {
        let Some(options) = self.options() else {
            return Ok(input.to_owned());
        };
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Ok(String::new());
        }
        options
            .iter()
            .find(|option| option.eq_ignore_ascii_case(trimmed))
            .map(|option| (*option).to_owned())
            .ok_or_else(|| {
                StoreError::Validation(format!(
                    "{} must be one of: {}",
                    self.label(),
                    options.join(", ")
                ))
            })
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|field| field.key() == value || field.wire_name() == value)
    }

    pub fn value_of(self, record: &AssetRecord) -> String {
        if let Some(slot) = self.text(record) {
            return slot.clone().unwrap_or_default();
        }
        match self {
            Self::Status => record.status.label().to_owned(),
            Self::StatusDate => format_date(record.status_date),
            Self::AddedDate => format_date(record.added_date),
            Self::TransferDate => format_date(record.transfer_date),
            Self::PurchasedYear => format_year(record.purchased_year),
            Self::Warranty => format_flag(record.warranty).to_owned(),
            Self::WarrantyStart => format_date(record.warranty_start),
            Self::WarrantyEnd => format_date(record.warranty_end),
            _ => String::new(),
        }
    }

    pub fn apply(self, record: &mut AssetRecord, input: &str) -> Result<(), StoreError> {
        if let Some(slot) = self.text_mut(record) {
            *slot = optional_text(input);
            return Ok(());
        }
        match self {
            Self::Status => {
                record.status = AssetStatus::parse(input).ok_or(FieldError::InvalidStatus)?;
            }
            Self::StatusDate => record.status_date = parse_optional_date(input)?,
            Self::AddedDate => record.added_date = parse_optional_date(input)?,
            Self::TransferDate => record.transfer_date = parse_optional_date(input)?,
            Self::PurchasedYear => record.purchased_year = parse_optional_year(input)?,
            Self::Warranty => record.warranty = parse_flag(input)?,
            Self::WarrantyStart => record.warranty_start = parse_optional_date(input)?,
            Self::WarrantyEnd => record.warranty_end = parse_optional_date(input)?,
            _ => {}
        }
        Ok(())
    }

    fn text(self, record: &AssetRecord) -> Option<&Option<String>> {
        match self {
            Self::Name => Some(&record.name),
            Self::Category => Some(&record.category),
            Self::Brand => Some(&record.brand),
            Self::Model => Some(&record.model),
            Self::SerialNumber => Some(&record.serial_number),
            Self::IpAddress => Some(&record.ip_address),
            Self::EmployeeNumber => Some(&record.employee_number),
            Self::EmployeeName => Some(&record.employee_name),
            Self::Designation => Some(&record.designation),
            Self::Division => Some(&record.division),
            Self::Section => Some(&record.section),
            Self::Department => Some(&record.department),
            Self::Branch => Some(&record.branch),
            Self::Floor => Some(&record.floor),
            Self::Vendor => Some(&record.vendor),
            Self::Remarks => Some(&record.remarks),
            _ => None,
        }
    }

    fn text_mut(self, record: &mut AssetRecord) -> Option<&mut Option<String>> {
        match self {
            Self::Name => Some(&mut record.name),
            Self::Category => Some(&mut record.category),
            Self::Brand => Some(&mut record.brand),
            Self::Model => Some(&mut record.model),
            Self::SerialNumber => Some(&mut record.serial_number),
            Self::IpAddress => Some(&mut record.ip_address),
            Self::EmployeeNumber => Some(&mut record.employee_number),
            Self::EmployeeName => Some(&mut record.employee_name),
            Self::Designation => Some(&mut record.designation),
            Self::Division => Some(&mut record.division),
            Self::Section => Some(&mut record.section),
            Self::Department => Some(&mut record.department),
            Self::Branch => Some(&mut record.branch),
            Self::Floor => Some(&mut record.floor),
            Self::Vendor => Some(&mut record.vendor),
            Self::Remarks => Some(&mut record.remarks),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{AssetField, AssetRecord, AssetStatus, FLOOR_OPTIONS, FieldKind, PLACEHOLDER};
    use crate::StoreError;
    use time::{Date, Month};

    #[test]
    fn status_codes_round_trip() {
        for status in AssetStatus::ALL {
            assert_eq!(AssetStatus::from_code(status.code()), Some(status));
            assert_eq!(AssetStatus::parse(status.label()), Some(status));
        }
        assert_eq!(AssetStatus::InRepair.label(), "In Repair");
        assert_eq!(AssetStatus::parse("in repair"), Some(AssetStatus::InRepair));
        assert_eq!(AssetStatus::parse("r"), Some(AssetStatus::Retired));
        assert_eq!(AssetStatus::from_code("X"), None);
        assert_eq!(AssetStatus::Retired.next(), AssetStatus::Active);
    }

    #[test]
    fn field_keys_are_unique() {
        let mut keys = AssetField::ALL.map(AssetField::key).to_vec();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), AssetField::ALL.len());

        let mut wires = AssetField::ALL.map(AssetField::wire_name).to_vec();
        wires.sort_unstable();
        wires.dedup();
        assert_eq!(wires.len(), AssetField::ALL.len());
    }

    #[test]
    fn parse_accepts_key_or_wire_name() {
        assert_eq!(
            AssetField::parse("serialNumber"),
            Some(AssetField::SerialNumber)
        );
        assert_eq!(
            AssetField::parse("assetSerialNo"),
            Some(AssetField::SerialNumber)
        );
        assert_eq!(AssetField::parse("assetNo"), None);
    }

    #[test]
    fn apply_parses_typed_fields() {
        let mut record = AssetRecord::new("A-001");
        AssetField::AddedDate
            .apply(&mut record, "2023-06-01")
            .expect("date applies");
        AssetField::PurchasedYear
            .apply(&mut record, "2021")
            .expect("year applies");
        AssetField::Warranty
            .apply(&mut record, "Yes")
            .expect("flag applies");
        AssetField::Status
            .apply(&mut record, "T")
            .expect("status applies");

        assert_eq!(
            record.added_date,
            Some(Date::from_calendar_date(2023, Month::June, 1).expect("valid date"))
        );
        assert_eq!(record.purchased_year, Some(2021));
        assert!(record.warranty);
        assert_eq!(record.status, AssetStatus::Transferred);
        assert_eq!(AssetField::Status.kind(), FieldKind::Status);
    }

    #[test]
    fn apply_rejects_bad_input_without_touching_record() {
        let mut record = AssetRecord::new("A-001");
        let err = AssetField::AddedDate
            .apply(&mut record, "yesterday")
            .expect_err("bad date");
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(record.added_date, None);

        let err = AssetField::Status
            .apply(&mut record, "")
            .expect_err("status cannot be blank");
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(record.status, AssetStatus::Active);
    }

    #[test]
    fn empty_input_clears_and_displays_placeholder() {
        let mut record = AssetRecord::new("A-001")
            .with(AssetField::Brand, "HP")
            .expect("brand applies");
        assert_eq!(record.display(AssetField::Brand), "HP");

        AssetField::Brand
            .apply(&mut record, "  ")
            .expect("clear applies");
        assert_eq!(record.brand, None);
        assert_eq!(record.display(AssetField::Brand), PLACEHOLDER);
        assert_eq!(AssetField::Brand.value_of(&record), "");
    }

    #[test]
    fn value_of_round_trips_through_apply() {
        let source = AssetRecord::new("A-002")
            .with(AssetField::SerialNumber, "SN-002")
            .and_then(|r| r.with(AssetField::WarrantyEnd, "2026-01-31"))
            .and_then(|r| r.with(AssetField::Status, "In Repair"))
            .expect("fields apply");

        let mut copy = AssetRecord::new("A-002");
        for field in AssetField::ALL {
            field
                .apply(&mut copy, &field.value_of(&source))
                .expect("canonical text re-applies");
        }
        assert_eq!(copy, source);
    }

    #[test]
    fn listed_fields_resolve_case_and_reject_typos() {
        assert_eq!(AssetField::Brand.normalize_choice("hp").expect("listed"), "HP");
        assert_eq!(
            AssetField::Floor.normalize_choice(" 2nd floor ").expect("listed"),
            "2nd Floor"
        );
        assert_eq!(AssetField::Branch.normalize_choice("").expect("blank"), "");

        let err = AssetField::Floor
            .normalize_choice("Second")
            .expect_err("not listed");
        let StoreError::Validation(message) = err else {
            panic!("expected validation error");
        };
        assert!(message.starts_with("Floor must be one of: "));
        assert!(message.contains(FLOOR_OPTIONS[2]));

        assert_eq!(
            AssetField::Model.normalize_choice("anything").expect("free text"),
            "anything"
        );
        assert_eq!(AssetField::Model.options(), None);
    }
}
