// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use assetdesk_api::Client;
use assetdesk_app::{
    AssetNumber, AssetPage, AssetQuery, AssetRecord, AssetStore, AssetUpdate, AssetField,
    Authenticator, FilterState, LocalAuthenticator, PaginationState, Session, StoreError,
    TableController,
};
use assetdesk_db::Store;
use tracing::info;

pub enum Backend {
    Local(Store),
    Remote(Client),
}

impl Backend {
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Local(_) => "sqlite",
            Self::Remote(_) => "remote",
        }
    }
}

impl AssetStore for Backend {
    fn list_assets(&mut self, query: &AssetQuery) -> Result<AssetPage, StoreError> {
        match self {
            Self::Local(store) => AssetStore::list_assets(store, query),
            Self::Remote(client) => client.list_assets(query),
        }
    }

    fn get_asset(&mut self, asset_number: &AssetNumber) -> Result<AssetRecord, StoreError> {
        match self {
            Self::Local(store) => AssetStore::get_asset(store, asset_number),
            Self::Remote(client) => client.get_asset(asset_number),
        }
    }

    fn create_asset(&mut self, asset: &AssetRecord) -> Result<AssetRecord, StoreError> {
        match self {
            Self::Local(store) => AssetStore::create_asset(store, asset),
            Self::Remote(client) => client.create_asset(asset),
        }
    }

    fn update_asset(
        &mut self,
        asset_number: &AssetNumber,
        update: &AssetUpdate,
    ) -> Result<AssetRecord, StoreError> {
        match self {
            Self::Local(store) => AssetStore::update_asset(store, asset_number, update),
            Self::Remote(client) => client.update_asset(asset_number, update),
        }
    }

    fn update_field(
        &mut self,
        asset_number: &AssetNumber,
        field: AssetField,
        value: &str,
    ) -> Result<(), StoreError> {
        match self {
            Self::Local(store) => AssetStore::update_field(store, asset_number, field, value),
            Self::Remote(client) => client.update_field(asset_number, field, value),
        }
    }

    fn delete_asset(&mut self, asset_number: &AssetNumber) -> Result<(), StoreError> {
        match self {
            Self::Local(store) => AssetStore::delete_asset(store, asset_number),
            Self::Remote(client) => client.delete_asset(asset_number),
        }
    }
}

impl Authenticator for Backend {
    fn login(&mut self, username: &str, password: &str) -> Result<Session, StoreError> {
        match self {
            Self::Local(_) => LocalAuthenticator.login(username, password),
            Self::Remote(client) => client.login(username, password),
        }
    }

    fn logout(&mut self) {
        if let Self::Remote(client) = self {
            client.logout();
        }
    }
}

pub struct DeskRuntime {
    table: TableController<Backend>,
}

impl DeskRuntime {
    pub fn new(backend: Backend, filters: FilterState, paging: PaginationState) -> Self {
        Self {
            table: TableController::new(backend, filters, paging),
        }
    }
}

impl assetdesk_tui::AppRuntime for DeskRuntime {
    type Store = Backend;

    fn table(&self) -> &TableController<Backend> {
        &self.table
    }

    fn table_mut(&mut self) -> &mut TableController<Backend> {
        &mut self.table
    }

    fn login(&mut self, username: &str, password: &str) -> Result<Session, StoreError> {
        let backend = self.table.store_mut();
        let session = backend.login(username, password)?;
        info!(user = %session.username, backend = backend.label(), "signed in");
        Ok(session)
    }

    fn logout(&mut self) {
        self.table.store_mut().logout();
        info!("signed out");
    }
}

#[cfg(test)]
mod tests {
    use super::{Backend, DeskRuntime};
    use anyhow::{Result, anyhow};
    use assetdesk_api::Client;
    use assetdesk_app::{
        AssetField, AssetNumber, FilterState, NotificationLog, PaginationState, StoreError,
    };
    use assetdesk_db::Store;
    use assetdesk_testkit::sample_assets;
    use assetdesk_tui::AppRuntime;
    use std::thread;
    use std::time::Duration;
    use tiny_http::{Header, Response, Server};

    fn local_runtime(department: Option<&str>) -> Result<DeskRuntime> {
        let store = Store::open_memory()?;
        store.bootstrap()?;
        store.seed_demo_data(&sample_assets())?;
        Ok(DeskRuntime::new(
            Backend::Local(store),
            FilterState::with_department(department.map(str::to_owned)),
            PaginationState::with_page_size(10)?,
        ))
    }

    #[test]
    fn local_login_accepts_any_non_empty_credentials() -> Result<()> {
        let mut runtime = local_runtime(None)?;
        let session = runtime.login("clerk", "pw")?;
        assert_eq!(session.username.as_str(), "clerk");
        assert_eq!(session.token, None);

        let error = runtime.login("clerk", "").expect_err("empty password");
        assert!(matches!(error, StoreError::Validation(_)));
        Ok(())
    }

    #[test]
    fn department_constraint_reaches_sqlite() -> Result<()> {
        let mut runtime = local_runtime(Some("IT"))?;
        let mut log = NotificationLog::default();
        runtime.table_mut().refresh(&mut log);

        assert_eq!(runtime.table().total(), 2);
        assert!(
            runtime
                .table()
                .rows()
                .iter()
                .all(|row| row.department.as_deref() == Some("IT"))
        );
        Ok(())
    }

    #[test]
    fn inline_commit_persists_through_local_backend() -> Result<()> {
        let mut runtime = local_runtime(None)?;
        let mut log = NotificationLog::default();
        let id = AssetNumber::from("A-001");
        runtime.table_mut().refresh(&mut log);

        assert!(runtime.table_mut().begin_edit(&id, AssetField::SerialNumber));
        runtime
            .table_mut()
            .update_draft(&id, AssetField::SerialNumber, "SN-099");
        runtime
            .table_mut()
            .commit_edit(&id, AssetField::SerialNumber, &mut log)?;
        runtime.table_mut().refresh(&mut log);

        assert_eq!(
            runtime.table().row(&id).and_then(|row| row.serial_number.clone()),
            Some("SN-099".to_owned())
        );
        Ok(())
    }

    #[test]
    fn remote_backend_signs_in_and_lists_with_department() -> Result<()> {
        let server =
            Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
        let base_url = format!("http://{}/api", server.server_addr());
        let json = || {
            Header::from_bytes("Content-Type", "application/json").expect("valid header")
        };

        let handle = thread::spawn(move || {
            let request = server.recv().expect("login request");
            assert_eq!(request.url(), "/api/auth/login");
            request
                .respond(Response::from_string(r#"{"token":"t-1"}"#).with_header(json()))
                .expect("respond");

            let request = server.recv().expect("list request");
            assert_eq!(request.url(), "/api/assets?department=IT&page=0&pageSize=10");
            request
                .respond(
                    Response::from_string(
                        r#"{"success":true,"total":1,"data":[{"assetNo":"A-009","department":"IT"}]}"#,
                    )
                    .with_header(json()),
                )
                .expect("respond");
        });

        let client = Client::new(&base_url, Duration::from_secs(1))?;
        let mut runtime = DeskRuntime::new(
            Backend::Remote(client),
            FilterState::with_department(Some("IT".to_owned())),
            PaginationState::with_page_size(10)?,
        );
        let session = runtime.login("admin", "secret")?;
        assert_eq!(session.token.as_deref(), Some("t-1"));

        let mut log = NotificationLog::default();
        runtime.table_mut().refresh(&mut log);
        assert_eq!(runtime.table().total(), 1);
        assert!(log.entries().is_empty());

        runtime.logout();
        match runtime.table().store() {
            Backend::Remote(client) => assert!(!client.is_authenticated()),
            Backend::Local(_) => panic!("expected remote backend"),
        }

        handle.join().expect("server thread should join");
        Ok(())
    }
}
