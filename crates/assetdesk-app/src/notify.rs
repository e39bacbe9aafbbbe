// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Success,
    Error,
}

impl Severity {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Success => "success",
            Self::Error => "error",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub severity: Severity,
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(severity: Severity, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity,
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, "Info", message)
    }

    pub fn asset_added(asset_number: &str) -> Self {
        Self::new(
            Severity::Success,
            "Asset Added Successfully",
            format!("asset {asset_number} was added"),
        )
    }

    pub fn asset_updated(asset_number: &str) -> Self {
        Self::new(
            Severity::Success,
            "Asset Updated Successfully",
            format!("asset {asset_number} was updated"),
        )
    }

    pub fn asset_deleted(asset_number: &str) -> Self {
        Self::new(
            Severity::Success,
            "Asset Deleted",
            format!("asset {asset_number} was deleted"),
        )
    }

    pub fn failure(error: &StoreError) -> Self {
        Self::new(Severity::Error, "Operation Failed", error.to_string())
    }

    pub fn line(&self) -> String {
        format!("{}: {}", self.title, self.message)
    }
}

pub trait Notifier {
    fn notify(&mut self, notification: Notification);
}

impl<N: Notifier + ?Sized> Notifier for &mut N {
    fn notify(&mut self, notification: Notification) {
        (**self).notify(notification);
    }
}

#[derive(Debug, Clone, Default)]
pub struct NotificationLog {
    entries: Vec<Notification>,
}

impl NotificationLog {
    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    pub fn last(&self) -> Option<&Notification> {
        self.entries.last()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.severity == severity)
            .count()
    }

    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.entries)
    }
}

impl Notifier for NotificationLog {
    fn notify(&mut self, notification: Notification) {
        self.entries.push(notification);
    }
}
