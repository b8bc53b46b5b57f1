use scry_adapters::http::ReqwestTransport;
use scry_core::operations::SearchOptions;
use scry_core::query_client::QueryClient;

fn http_integration_enabled() -> bool {
    matches!(
        std::env::var("SCRY_RUN_HTTP_INTEGRATION").ok().as_deref(),
        Some("1")
    )
}

fn integration_target() -> (String, String, String) {
    let url =
        std::env::var("SCRY_TEST_URL").unwrap_or_else(|_| "http://127.0.0.1:9925".to_string());
    let username = std::env::var("SCRY_TEST_USER").unwrap_or_else(|_| "admin".to_string());
    let password = std::env::var("SCRY_TEST_PASSWORD").unwrap_or_else(|_| "admin".to_string());
    (url, username, password)
}

#[tokio::test(flavor = "current_thread")]
async fn http_transport_connects_and_browses_a_live_instance() {
    if !http_integration_enabled() {
        return;
    }

    let transport = ReqwestTransport::new().expect("transport should build");
    let mut client = QueryClient::new(transport);

    let (url, username, password) = integration_target();
    client
        .connect(&url, &username, &password)
        .await
        .expect("connect should succeed");
    assert!(client.is_connected());

    let databases = client
        .describe_all()
        .await
        .expect("describe_all should succeed");
    for (database, tables) in databases.iter() {
        let derived = client
            .describe_database(database)
            .await
            .expect("describe_database should succeed");
        assert_eq!(derived.len(), tables.len());
    }

    let system = client
        .system_information(None)
        .await
        .expect("system_information should succeed");
    assert!(!system.is_empty());

    let first_table = databases.iter().find_map(|(database, tables)| {
        tables
            .keys()
            .next()
            .map(|table| (database.clone(), table.clone()))
    });
    if let Some((database, table)) = first_table {
        let rows = client
            .search_by_conditions(
                &database,
                &table,
                Vec::new(),
                &SearchOptions::default(),
                None,
            )
            .await
            .expect("fallback page should succeed");
        assert!(rows.len() <= 100);
    }

    client.disconnect();
    assert!(!client.is_connected());
}
