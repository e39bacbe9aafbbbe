// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use assetdesk_api::Client;
use assetdesk_app::{
    AssetField, AssetNumber, AssetQuery, AssetRecord, AssetStatus, AssetUpdate, Authenticator,
    CategoryGroup, FilterPredicate, FilterState, NotificationLog, PageWindow, PaginationState,
    StoreError, TableController,
};
use std::io::Read;
use std::thread;
use std::time::Duration;
use tiny_http::{Header, Method, Request, Response, Server};

fn mock_server() -> Result<(Server, String)> {
    let server =
        Server::http("127.0.0.1:0").map_err(|error| anyhow!("start mock server: {error}"))?;
    let addr = format!("http://{}/api", server.server_addr());
    Ok((server, addr))
}

fn respond_json(request: Request, status: u16, body: &str) {
    let response = Response::from_string(body)
        .with_status_code(status)
        .with_header(
            Header::from_bytes("Content-Type", "application/json")
                .expect("valid content type header"),
        );
    request.respond(response).expect("response should succeed");
}

fn header(request: &Request, name: &'static str) -> Option<String> {
    request
        .headers()
        .iter()
        .find(|header| header.field.equiv(name))
        .map(|header| header.value.to_string())
}

fn body(request: &mut Request) -> String {
    let mut body = String::new();
    request
        .as_reader()
        .read_to_string(&mut body)
        .expect("request body should be readable");
    body
}

#[test]
fn unreachable_service_is_a_network_error() {
    let mut client =
        Client::new("http://127.0.0.1:1/api", Duration::from_millis(50)).expect("client");
    let query = AssetQuery::new(
        FilterPredicate::default(),
        PageWindow::new(0, 5).expect("window"),
    );

    let error = client.list_assets(&query).expect_err("nothing listens on port 1");
    assert!(matches!(error, StoreError::Network(_)));
    assert!(error.to_string().contains("[remote].base_url"));
}

#[test]
fn login_stores_token_and_sends_bearer_header() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let mut request = server.recv().expect("login request");
        assert_eq!(request.url(), "/api/auth/login");
        let sent: serde_json::Value =
            serde_json::from_str(&body(&mut request)).expect("login body is json");
        assert_eq!(sent["username"], "admin");
        assert_eq!(sent["password"], "secret");
        respond_json(request, 200, r#"{"success":true,"token":"t-123"}"#);

        let request = server.recv().expect("list request");
        assert_eq!(
            request.url(),
            "/api/assets?division=ENG&department=IT&page=1&pageSize=5"
        );
        assert_eq!(
            header(&request, "Authorization").as_deref(),
            Some("Bearer t-123")
        );
        respond_json(
            request,
            200,
            r#"{"success":true,"total":7,"data":[
                {"assetNo":"A-005","pcName":"PC-5","division":"ENG","status":"A"},
                {"assetNo":"A-006","pcName":"PC-6","division":"ENG","status":"R"}
            ]}"#,
        );
    });

    let mut client = Client::new(&addr, Duration::from_secs(1))?;
    let session = Authenticator::login(&mut client, " admin ", "secret")?;
    assert_eq!(session.username.as_str(), "admin");
    assert_eq!(client.token(), Some("t-123"));

    let filter = FilterPredicate {
        division: Some("ENG".to_owned()),
        department: Some("IT".to_owned()),
        ..FilterPredicate::default()
    };
    let page = client.list_assets(&AssetQuery::new(filter, PageWindow::new(1, 5)?))?;
    assert_eq!(page.total, 7);
    assert_eq!(page.rows.len(), 2);
    assert_eq!(page.rows[1].status, AssetStatus::Retired);

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn category_group_is_sent_and_applied_to_unpaged_results() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("list request");
        assert_eq!(
            request.url(),
            "/api/assets?categoryGroup=other&page=0&pageSize=5"
        );
        respond_json(
            request,
            200,
            r#"{"success":true,"data":[
                {"assetNo":"A-001","assetCategory":"PC"},
                {"assetNo":"A-002","assetCategory":"UPS"},
                {"assetNo":"A-003"},
                {"assetNo":"A-004","assetCategory":"Switch"}
            ]}"#,
        );
    });

    let mut client = Client::new(&addr, Duration::from_secs(1))?;
    let filter = FilterPredicate {
        group: Some(CategoryGroup::Other),
        ..FilterPredicate::default()
    };
    let page = client.list_assets(&AssetQuery::new(filter, PageWindow::new(0, 5)?))?;
    let numbers = page
        .rows
        .iter()
        .map(|row| row.asset_number.to_string())
        .collect::<Vec<_>>();
    assert_eq!(numbers, vec!["A-002", "A-003"]);
    assert_eq!(page.total, 2);

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn unpaged_listing_is_windowed_locally() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("list request");
        let rows = (0..7)
            .map(|index| format!(r#"{{"assetNo":"A-{index:03}","assetBrand":"Dell"}}"#))
            .collect::<Vec<_>>()
            .join(",");
        respond_json(request, 200, &format!(r#"{{"success":true,"data":[{rows}]}}"#));
    });

    let mut client = Client::new(&addr, Duration::from_secs(1))?;
    let page = client.list_assets(&AssetQuery::new(
        FilterPredicate::default(),
        PageWindow::new(1, 5)?,
    ))?;
    assert_eq!(page.total, 7);
    let numbers = page
        .rows
        .iter()
        .map(|row| row.asset_number.to_string())
        .collect::<Vec<_>>();
    assert_eq!(numbers, vec!["A-005", "A-006"]);

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn rejected_token_is_cleared() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("get request");
        assert_eq!(request.url(), "/api/assets/A-001");
        respond_json(request, 401, r#"{"message":"Token expired"}"#);
    });

    let mut client = Client::new(&addr, Duration::from_secs(1))?;
    client.set_token(Some("stale".to_owned()));
    let error = client
        .get_asset(&AssetNumber::from("A-001"))
        .expect_err("401 should fail");
    assert_eq!(error, StoreError::Unauthorized("Token expired".to_owned()));
    assert!(!client.is_authenticated());

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn inline_commit_patches_one_wire_field() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("list request");
        respond_json(
            request,
            200,
            r#"{"success":true,"total":1,"data":[{"assetNo":"A-001","assetSerialNo":"SN-001"}]}"#,
        );

        let mut request = server.recv().expect("patch request");
        assert_eq!(request.method(), &Method::Patch);
        assert_eq!(request.url(), "/api/assets/A-001");
        let sent: serde_json::Value =
            serde_json::from_str(&body(&mut request)).expect("patch body is json");
        assert_eq!(sent, serde_json::json!({ "assetSerialNo": "SN-099" }));
        respond_json(request, 200, r#"{"success":true}"#);
    });

    let client = Client::new(&addr, Duration::from_secs(1))?;
    let mut table = TableController::new(
        client,
        FilterState::default(),
        PaginationState::default(),
    );
    let mut log = NotificationLog::default();
    table.refresh(&mut log);

    let id = AssetNumber::from("A-001");
    assert!(table.begin_edit(&id, AssetField::SerialNumber));
    table.update_draft(&id, AssetField::SerialNumber, "SN-099");
    table.commit_edit(&id, AssetField::SerialNumber, &mut log)?;
    assert_eq!(
        table.row(&id).and_then(|row| row.serial_number.clone()),
        Some("SN-099".to_owned())
    );

    handle.join().expect("server thread should join");
    Ok(())
}

#[test]
fn conflicts_and_validation_failures_keep_server_message() -> Result<()> {
    let (server, addr) = mock_server()?;

    let handle = thread::spawn(move || {
        let request = server.recv().expect("create request");
        assert_eq!(request.method(), &Method::Post);
        respond_json(request, 409, r#"{"message":"Asset number already exists"}"#);

        let request = server.recv().expect("update request");
        assert_eq!(request.method(), &Method::Put);
        respond_json(request, 400, r#"{"message":"Invalid IP address"}"#);

        let request = server.recv().expect("delete request");
        assert_eq!(request.method(), &Method::Delete);
        respond_json(request, 404, r#"{"message":"Asset not found"}"#);
    });

    let mut client = Client::new(&addr, Duration::from_secs(1))?;
    let id = AssetNumber::from("A-001");

    let created = client.create_asset(&AssetRecord::new("A-001"));
    assert_eq!(
        created,
        Err(StoreError::Duplicate("Asset number already exists".to_owned()))
    );

    let updated = client.update_asset(
        &id,
        &AssetUpdate::single(AssetField::IpAddress, "999.1.1.1"),
    );
    assert_eq!(
        updated,
        Err(StoreError::Validation("Invalid IP address".to_owned()))
    );

    assert_eq!(client.delete_asset(&id), Err(StoreError::NotFound(id.clone())));

    handle.join().expect("server thread should join");
    Ok(())
}
