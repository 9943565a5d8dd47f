//! HTTP client tests against a local mock catalog

mod common;

use charmstore_core::{
    CatalogClient, CatalogEntity, CatalogError, Charm, CharmStore, HttpCatalogClient, SearchQuery,
    StoreConfig,
};
use common::fixture;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer) -> StoreConfig {
    StoreConfig::default().with_api_url(format!("{}/v4", server.uri()))
}

#[tokio::test]
async fn test_search_unwraps_meta() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/search"))
        .and(query_param("text", "wordpress"))
        .and(query_param("requires", "mysql"))
        .and(query_param("include", "charm-metadata"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Results": [
                {"Id": "cs:trusty/wordpress-5", "Meta": fixture("wordpress.json")}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = CharmStore::from_config(&config_for(&server)).unwrap();
    let charms = store
        .search(SearchQuery::new().text("wordpress").requires("mysql"))
        .await
        .unwrap();

    assert_eq!(charms.len(), 1);
    assert_eq!(charms[0].entity.name.as_deref(), Some("wordpress"));
    assert_eq!(charms[0].entity.raw, fixture("wordpress.json"));
}

#[tokio::test]
async fn test_search_without_results_key_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    let client = HttpCatalogClient::new(&config_for(&server)).unwrap();
    let results = client.search(&SearchQuery::new().build()).await.unwrap();
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_fetch_metadata_by_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/trusty/mysql-38/meta/any"))
        .and(query_param("include", "id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "Id": "cs:trusty/mysql-38",
            "Meta": fixture("mysql.json")
        })))
        .expect(1)
        .mount(&server)
        .await;

    let store = CharmStore::from_config(&config_for(&server)).unwrap();
    let charm = store.charm("cs:trusty/mysql-38").await.unwrap();

    assert_eq!(charm.entity.revision, 38);
    assert_eq!(charm.summary.as_deref(), Some("MySQL relational database"));
}

#[tokio::test]
async fn test_file_fetches_archive_path() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/trusty/mysql-38/archive/metadata.yaml"))
        .respond_with(ResponseTemplate::new(200).set_body_string("name: mysql\n"))
        .expect(1)
        .mount(&server)
        .await;

    let store = CharmStore::from_config(&config_for(&server)).unwrap();
    let charm = Charm::from_data(fixture("mysql.json")).unwrap();
    let text = store.file(&charm, "metadata.yaml").await.unwrap();

    assert_eq!(text, "name: mysql\n");
}

#[tokio::test]
async fn test_not_found_maps_to_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/trusty/ghost-1/meta/any"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not found"))
        .mount(&server)
        .await;

    let store = CharmStore::from_config(&config_for(&server)).unwrap();
    let err = store.charm("cs:trusty/ghost-1").await.unwrap_err();

    assert!(matches!(err, CatalogError::NotFound(_)));
}

#[tokio::test]
async fn test_server_error_keeps_status_and_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v4/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database is down"))
        .mount(&server)
        .await;

    let store = CharmStore::from_config(&config_for(&server)).unwrap();
    let err = store.approved().await.unwrap_err();

    match err {
        CatalogError::Server { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "database is down");
        }
        other => panic!("Unexpected error: {other}"),
    }
}
