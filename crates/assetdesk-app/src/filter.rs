// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::model::{AssetField, AssetRecord};
use crate::validation::optional_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilterField {
    Division,
    Category,
    Brand,
    Floor,
}

impl FilterField {
    pub const ALL: [Self; 4] = [Self::Division, Self::Category, Self::Brand, Self::Floor];

    pub const fn asset_field(self) -> AssetField {
        match self {
            Self::Division => AssetField::Division,
            Self::Category => AssetField::Category,
            Self::Brand => AssetField::Brand,
            Self::Floor => AssetField::Floor,
        }
    }

    pub const fn query_key(self) -> &'static str {
        match self {
            Self::Division => "division",
            Self::Category => "category",
            Self::Brand => "brand",
            Self::Floor => "floor",
        }
    }

    pub const fn label(self) -> &'static str {
        self.asset_field().label()
    }
}

const IT_EQUIPMENT: [&str; 2] = ["PC", "Printer"];
const SERVER_EQUIPMENT: [&str; 1] = ["Server"];
const NETWORK_EQUIPMENT: [&str; 5] = ["Router", "Switch", "Firewall", "Access Point", "Camera"];

/// Coarse grouping of categories for the list's "refine" control. `Other`
/// holds every category outside the named groups, including none at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CategoryGroup {
    ItEquipment,
    ServerEquipment,
    NetworkEquipment,
    Other,
}

impl CategoryGroup {
    pub const ALL: [Self; 4] = [
        Self::ItEquipment,
        Self::ServerEquipment,
        Self::NetworkEquipment,
        Self::Other,
    ];

    pub const QUERY_KEY: &'static str = "categoryGroup";

    pub const fn label(self) -> &'static str {
        match self {
            Self::ItEquipment => "IT Equipment",
            Self::ServerEquipment => "Server Equipment",
            Self::NetworkEquipment => "Network Equipment",
            Self::Other => "Other",
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            Self::ItEquipment => "it",
            Self::ServerEquipment => "server",
            Self::NetworkEquipment => "network",
            Self::Other => "other",
        }
    }

    pub const fn categories(self) -> &'static [&'static str] {
        match self {
            Self::ItEquipment => &IT_EQUIPMENT,
            Self::ServerEquipment => &SERVER_EQUIPMENT,
            Self::NetworkEquipment => &NETWORK_EQUIPMENT,
            Self::Other => &[],
        }
    }

    pub fn grouped_categories() -> Vec<&'static str> {
        [Self::ItEquipment, Self::ServerEquipment, Self::NetworkEquipment]
            .into_iter()
            .flat_map(Self::categories)
            .copied()
            .collect()
    }

    pub fn parse(value: &str) -> Option<Self> {
        let trimmed = value.trim();
        Self::ALL.into_iter().find(|group| {
            group.slug().eq_ignore_ascii_case(trimmed)
                || group.label().eq_ignore_ascii_case(trimmed)
        })
    }

    pub fn contains(self, category: Option<&str>) -> bool {
        match self {
            Self::Other => category.is_none_or(|category| {
                !Self::grouped_categories().contains(&category)
            }),
            group => category.is_some_and(|category| group.categories().contains(&category)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPredicate {
    pub division: Option<String>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub floor: Option<String>,
    pub group: Option<CategoryGroup>,
    pub department: Option<String>,
}

impl FilterPredicate {
    pub fn is_empty(&self) -> bool {
        self.pairs().is_empty()
    }

    pub fn get(&self, field: FilterField) -> Option<&str> {
        match field {
            FilterField::Division => self.division.as_deref(),
            FilterField::Category => self.category.as_deref(),
            FilterField::Brand => self.brand.as_deref(),
            FilterField::Floor => self.floor.as_deref(),
        }
    }

    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        let mut pairs = FilterField::ALL
            .into_iter()
            .filter_map(|field| self.get(field).map(|value| (field.query_key(), value)))
            .collect::<Vec<_>>();
        if let Some(group) = self.group {
            pairs.push((CategoryGroup::QUERY_KEY, group.slug()));
        }
        if let Some(department) = self.department.as_deref() {
            pairs.push(("department", department));
        }
        pairs
    }

    pub fn matches(&self, record: &AssetRecord) -> bool {
        let fields_match = FilterField::ALL.into_iter().all(|field| {
            self.get(field).is_none_or(|wanted| {
                field.asset_field().value_of(record) == wanted
            })
        });
        fields_match
            && self
                .group
                .is_none_or(|group| group.contains(record.category.as_deref()))
            && self
                .department
                .as_deref()
                .is_none_or(|wanted| record.department.as_deref() == Some(wanted))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState {
    division: Option<String>,
    category: Option<String>,
    brand: Option<String>,
    floor: Option<String>,
    group: Option<CategoryGroup>,
    department: Option<String>,
}

impl FilterState {
    pub fn with_department(department: Option<String>) -> Self {
        Self {
            department: department.as_deref().and_then(optional_text),
            ..Self::default()
        }
    }

    pub fn constraint(&self, field: FilterField) -> Option<&str> {
        self.slot(field).as_deref()
    }

    pub fn group(&self) -> Option<CategoryGroup> {
        self.group
    }

    pub fn department(&self) -> Option<&str> {
        self.department.as_deref()
    }

    pub fn set_constraint(&mut self, field: FilterField, value: Option<&str>) {
        *self.slot_mut(field) = value.and_then(optional_text);
    }

    pub fn set_group(&mut self, group: Option<CategoryGroup>) {
        self.group = group;
    }

    pub fn reset(&mut self) {
        for field in FilterField::ALL {
            *self.slot_mut(field) = None;
        }
        self.group = None;
    }

    pub fn set_department(&mut self, department: Option<&str>) {
        self.department = department.and_then(optional_text);
    }

    pub fn has_user_constraints(&self) -> bool {
        self.group.is_some()
            || FilterField::ALL
                .into_iter()
                .any(|field| self.constraint(field).is_some())
    }

    pub fn to_query(&self) -> FilterPredicate {
        FilterPredicate {
            division: self.division.clone(),
            category: self.category.clone(),
            brand: self.brand.clone(),
            floor: self.floor.clone(),
            group: self.group,
            department: self.department.clone(),
        }
    }

    fn slot(&self, field: FilterField) -> &Option<String> {
        match field {
            FilterField::Division => &self.division,
            FilterField::Category => &self.category,
            FilterField::Brand => &self.brand,
            FilterField::Floor => &self.floor,
        }
    }

    fn slot_mut(&mut self, field: FilterField) -> &mut Option<String> {
        match field {
            FilterField::Division => &mut self.division,
            FilterField::Category => &mut self.category,
            FilterField::Brand => &mut self.brand,
            FilterField::Floor => &mut self.floor,
        }
    }
}
