// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::{AssetNumber, Session, Username};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum View {
    Login,
    List,
    Detail(AssetNumber),
    Add,
    Edit(AssetNumber),
}

impl View {
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Login => "Sign In",
            Self::List => "Assets",
            Self::Detail(_) => "Asset Details",
            Self::Add => "Add Asset",
            Self::Edit(_) => "Modify Asset",
        }
    }

    pub const fn requires_session(&self) -> bool {
        !matches!(self, Self::Login)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    pub view: View,
    pub session: Option<Session>,
    pub status_line: Option<String>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            view: View::Login,
            session: None,
            status_line: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppCommand {
    SignedIn(Session),
    SignOut,
    ShowList,
    OpenDetail(AssetNumber),
    OpenAdd,
    OpenEdit(AssetNumber),
    Back,
    SetStatus(String),
    ClearStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    ViewChanged(View),
    SessionStarted(Username),
    SessionEnded,
    RedirectedToLogin,
    StatusUpdated(String),
    StatusCleared,
}

impl AppState {
    pub fn is_signed_in(&self) -> bool {
        self.session.is_some()
    }

    pub fn dispatch(&mut self, command: AppCommand) -> Vec<AppEvent> {
        match command {
            AppCommand::SignedIn(session) => {
                let username = session.username.clone();
                self.session = Some(session);
                let mut events = vec![AppEvent::SessionStarted(username.clone())];
                events.extend(self.navigate(View::List));
                events.push(self.set_status(&format!("signed in as {username}")));
                events
            }
            AppCommand::SignOut => {
                self.session = None;
                self.view = View::Login;
                vec![
                    AppEvent::SessionEnded,
                    AppEvent::ViewChanged(View::Login),
                    self.set_status("signed out"),
                ]
            }
            AppCommand::ShowList => self.navigate(View::List),
            AppCommand::OpenDetail(asset_number) => self.navigate(View::Detail(asset_number)),
            AppCommand::OpenAdd => self.navigate(View::Add),
            AppCommand::OpenEdit(asset_number) => self.navigate(View::Edit(asset_number)),
            AppCommand::Back => {
                let target = match &self.view {
                    View::Login | View::List | View::Detail(_) | View::Add => View::List,
                    View::Edit(asset_number) => View::Detail(asset_number.clone()),
                };
                self.navigate(target)
            }
            AppCommand::SetStatus(message) => vec![self.set_status(&message)],
            AppCommand::ClearStatus => {
                self.status_line = None;
                vec![AppEvent::StatusCleared]
            }
        }
    }

    fn navigate(&mut self, target: View) -> Vec<AppEvent> {
        if target.requires_session() && self.session.is_none() {
            self.view = View::Login;
            return vec![
                AppEvent::RedirectedToLogin,
                AppEvent::ViewChanged(View::Login),
            ];
        }
        if self.view == target {
            return Vec::new();
        }
        self.view = target.clone();
        vec![AppEvent::ViewChanged(target)]
    }

    fn set_status(&mut self, message: &str) -> AppEvent {
        self.status_line = Some(message.to_owned());
        AppEvent::StatusUpdated(message.to_owned())
    }
}
