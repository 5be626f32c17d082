//! Integration tests for the scrape pipeline
//!
//! These tests use wiremock to stand in for the registry, the geocoding
//! service and the blob store, and exercise the coordinator end-to-end
//! against a temporary SQLite database.

use almoneda::config::{
    BlobConfig, Config, GeocoderConfig, OutputConfig, RegistryConfig, ScraperConfig,
    UserAgentConfig,
};
use almoneda::crawler::Coordinator;
use almoneda::facets::{Facet, ASSET_TYPES, AUCTION_TYPES, PROVINCES, STATUSES};
use almoneda::model::AttachmentKind;
use almoneda::storage::{RunStatus, SqliteStorage, Storage};
use std::path::Path;
use tempfile::TempDir;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a test configuration with every external surface pointed at the
/// mock server
fn create_test_config(mock_uri: &str, db_path: &str) -> Config {
    Config {
        registry: RegistryConfig {
            base_url: format!("{}/", mock_uri),
        },
        scraper: ScraperConfig {
            search_delay_ms: 0,
            detail_delay_ms: 0,
            request_timeout_secs: 5,
            max_retries: 0,
        },
        user_agent: UserAgentConfig {
            scraper_name: "TestScraper".to_string(),
            scraper_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        geocoder: GeocoderConfig {
            endpoint: format!("{}/geocode", mock_uri),
            timeout_secs: 5,
        },
        blob: BlobConfig {
            endpoint: mock_uri.to_string(),
            bucket: "auction-files".to_string(),
            public_base_url: None,
        },
        output: OutputConfig {
            database_path: db_path.to_string(),
        },
    }
}

/// The facet used by the single-facet tests (Madrid, first entry of every
/// other list)
fn madrid_facet() -> Facet {
    Facet {
        province: PROVINCES[31],
        asset_type: ASSET_TYPES[0],
        auction_type: AUCTION_TYPES[0],
        status: STATUSES[0],
    }
}

/// Mounts the geocoder mock returning one Madrid hit
async fn mount_geocoder(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/geocode"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"lat": "40.4168", "lon": "-3.7038"}
        ])))
        .mount(server)
        .await;
}

/// Mounts a catch-all blob PUT mock accepting every upload
async fn mount_blob_store(server: &MockServer) {
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .mount(server)
        .await;
}

fn detail_page(title: &str) -> String {
    format!(
        r#"<html><body>
        <h1>{}</h1>
        <table>
            <tr><td>Descripción</td><td>Piso de 80 m2 en el centro</td></tr>
            <tr><td>Tipo de bien</td><td>Inmuebles - Vivienda</td></tr>
            <tr><td>Estado</td><td>Próxima apertura</td></tr>
            <tr><td>Provincia</td><td>Madrid</td></tr>
            <tr><td>Localidad</td><td>Madrid</td></tr>
            <tr><td>Dirección</td><td>Calle de Alcalá 1</td></tr>
            <tr><td>Valor de tasación</td><td>250.000 €</td></tr>
            <tr><td>Fecha de inicio</td><td>15/09/2025</td></tr>
            <tr><td>Fecha de conclusión</td><td>05/10/2025</td></tr>
        </table>
        <img class="foto" src="/img/lote1.jpg">
        <a href="/docs/edicto.pdf">Edicto de la subasta</a>
        </body></html>"#,
        title
    )
}

#[tokio::test]
async fn test_end_to_end_scrape_single_facet() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("scrape.db");
    let config = create_test_config(&mock_server.uri(), db_path.to_str().unwrap());

    // Search page lists the same detail link twice; it must be processed
    // once.
    Mock::given(method("GET"))
        .and(path("/subastas_ava.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
            <a href="detalleSubasta.php?idSub=SUB-2025-001234">Lote 1</a>
            <a href="detalleSubasta.php?idSub=SUB-2025-001234">Lote 1 (bis)</a>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/detalleSubasta.php"))
        .and(query_param("idSub", "SUB-2025-001234"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(detail_page("Subasta de vivienda")),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/lote1.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF; 64]))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/edicto.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x25; 128]))
        .mount(&mock_server)
        .await;

    mount_geocoder(&mock_server).await;
    mount_blob_store(&mock_server).await;

    let mut coordinator = Coordinator::new(&config, "test-hash").expect("coordinator");
    let counters = coordinator
        .run_facets(std::iter::once(madrid_facet()))
        .await
        .expect("run");

    assert_eq!(counters.facets_searched, 1);
    assert_eq!(counters.searches_failed, 0);
    assert_eq!(counters.pages_attempted, 1, "duplicate link collapsed");
    assert_eq!(counters.auctions_persisted, 1);
    assert_eq!(counters.attachments_stored, 2);
    assert_eq!(counters.attachment_failures, 0);
    assert_eq!(counters.geocoded, 1);

    drop(coordinator);
    let storage = SqliteStorage::new(Path::new(db_path.to_str().unwrap())).unwrap();

    let record = storage
        .get_auction("SUB-2025-001234")
        .unwrap()
        .expect("auction stored");
    assert_eq!(record.auction.title, "Subasta de vivienda");
    assert_eq!(record.auction.province, "Madrid");
    assert_eq!(record.auction.appraisal_value, 250000.0);
    let coords = record.auction.coordinates.expect("geocoded");
    assert!((coords.latitude - 40.4168).abs() < 1e-9);
    assert!((coords.longitude - -3.7038).abs() < 1e-9);

    let images = storage
        .get_attachments("SUB-2025-001234", AttachmentKind::Image)
        .unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].name, "image_1.jpg");
    assert_eq!(images[0].size_bytes, 64);
    assert!(!images[0].storage_url.is_empty());
    assert!(images[0]
        .storage_url
        .ends_with("auction-files/auctions/SUB-2025-001234/images/image_1.jpg"));

    let documents = storage
        .get_attachments("SUB-2025-001234", AttachmentKind::Document)
        .unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].name, "Edicto de la subasta.pdf");
    assert_eq!(documents[0].size_bytes, 128);
    assert!(!documents[0].storage_url.is_empty());

    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.counters.auctions_persisted, 1);
    assert_eq!(run.config_hash, "test-hash");
}

#[tokio::test]
async fn test_attachment_failure_is_isolated() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("scrape.db");
    let config = create_test_config(&mock_server.uri(), db_path.to_str().unwrap());

    Mock::given(method("GET"))
        .and(path("/subastas_ava.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<a href="detalleSubasta.php?idSub=SUB-1">Lote</a>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/detalleSubasta.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>
            <h1>Subasta</h1>
            <table><tr><td>Provincia</td><td>Madrid</td></tr></table>
            <a href="/docs/primero.pdf">Primer documento</a>
            <a href="/docs/segundo.pdf">Segundo documento</a>
            </body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/primero.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x25; 32]))
        .mount(&mock_server)
        .await;

    // The second document download fails; the first must survive.
    Mock::given(method("GET"))
        .and(path("/docs/segundo.pdf"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    mount_geocoder(&mock_server).await;
    mount_blob_store(&mock_server).await;

    let mut coordinator = Coordinator::new(&config, "test-hash").expect("coordinator");
    let counters = coordinator
        .run_facets(std::iter::once(madrid_facet()))
        .await
        .expect("run");

    assert_eq!(counters.auctions_persisted, 1);
    assert_eq!(counters.attachments_stored, 1);
    assert_eq!(counters.attachment_failures, 1);

    drop(coordinator);
    let storage = SqliteStorage::new(Path::new(db_path.to_str().unwrap())).unwrap();
    assert!(storage.get_auction("SUB-1").unwrap().is_some());

    let documents = storage
        .get_attachments("SUB-1", AttachmentKind::Document)
        .unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].name, "Primer documento.pdf");
}

#[tokio::test]
async fn test_search_failure_is_not_fatal() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("scrape.db");
    let config = create_test_config(&mock_server.uri(), db_path.to_str().unwrap());

    Mock::given(method("GET"))
        .and(path("/subastas_ava.php"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let mut coordinator = Coordinator::new(&config, "test-hash").expect("coordinator");
    let counters = coordinator
        .run_facets(std::iter::once(madrid_facet()))
        .await
        .expect("a failed search never aborts the run");

    assert_eq!(counters.facets_searched, 1);
    assert_eq!(counters.searches_failed, 1);
    assert_eq!(counters.pages_attempted, 0);

    drop(coordinator);
    let storage = SqliteStorage::new(Path::new(db_path.to_str().unwrap())).unwrap();
    assert_eq!(storage.count_auctions().unwrap(), 0);
    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
}

#[tokio::test]
async fn test_detail_page_without_id_is_discarded() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("scrape.db");
    let config = create_test_config(&mock_server.uri(), db_path.to_str().unwrap());

    // The anchor matches the detail path pattern but carries no idSub.
    Mock::given(method("GET"))
        .and(path("/subastas_ava.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<a href="detalleSubasta.php?ver=1">Lote raro</a>"#,
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/detalleSubasta.php"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("<html><body><h1>Sin identificador</h1></body></html>"),
        )
        .mount(&mock_server)
        .await;

    let mut coordinator = Coordinator::new(&config, "test-hash").expect("coordinator");
    let counters = coordinator
        .run_facets(std::iter::once(madrid_facet()))
        .await
        .expect("run");

    assert_eq!(counters.pages_attempted, 1);
    assert_eq!(counters.pages_discarded, 1);
    assert_eq!(counters.auctions_persisted, 0);
    assert_eq!(counters.pages_failed, 0);
}

#[tokio::test]
async fn test_rescrape_upserts_without_duplicating() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("scrape.db");
    let config = create_test_config(&mock_server.uri(), db_path.to_str().unwrap());

    Mock::given(method("GET"))
        .and(path("/subastas_ava.php"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<a href="detalleSubasta.php?idSub=SUB-2025-001234">Lote</a>"#,
        ))
        .mount(&mock_server)
        .await;

    // First run sees the original title, every run after that the
    // corrected one.
    Mock::given(method("GET"))
        .and(path("/detalleSubasta.php"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(detail_page("Título original")),
        )
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/detalleSubasta.php"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(detail_page("Título corregido")),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/img/lote1.jpg"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF; 16]))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/docs/edicto.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x25; 16]))
        .mount(&mock_server)
        .await;

    mount_geocoder(&mock_server).await;
    mount_blob_store(&mock_server).await;

    let facet = madrid_facet();

    let mut first_run = Coordinator::new(&config, "hash-1").expect("coordinator");
    first_run
        .run_facets(std::iter::once(facet))
        .await
        .expect("first run");
    drop(first_run);

    let first = {
        let storage = SqliteStorage::new(Path::new(db_path.to_str().unwrap())).unwrap();
        storage.get_auction("SUB-2025-001234").unwrap().unwrap()
    };
    assert_eq!(first.auction.title, "Título original");

    let mut second_run = Coordinator::new(&config, "hash-2").expect("coordinator");
    second_run
        .run_facets(std::iter::once(facet))
        .await
        .expect("second run");
    drop(second_run);

    let storage = SqliteStorage::new(Path::new(db_path.to_str().unwrap())).unwrap();
    assert_eq!(storage.count_auctions().unwrap(), 1, "no duplicate row");

    let second = storage.get_auction("SUB-2025-001234").unwrap().unwrap();
    assert_eq!(second.auction.title, "Título corregido");
    assert_eq!(second.first_seen_at, first.first_seen_at);

    let updated_first = chrono::DateTime::parse_from_rfc3339(&first.last_updated_at).unwrap();
    let updated_second = chrono::DateTime::parse_from_rfc3339(&second.last_updated_at).unwrap();
    assert!(updated_second > updated_first);

    // Attachments are appended per discovery event: re-harvesting uploads
    // and records them again.
    let images = storage
        .get_attachments("SUB-2025-001234", AttachmentKind::Image)
        .unwrap();
    assert_eq!(images.len(), 2);
}

#[tokio::test]
async fn test_cancellation_before_first_facet() {
    let mock_server = MockServer::start().await;
    let tmp = TempDir::new().unwrap();
    let db_path = tmp.path().join("scrape.db");
    let config = create_test_config(&mock_server.uri(), db_path.to_str().unwrap());

    let mut coordinator = Coordinator::new(&config, "test-hash").expect("coordinator");
    coordinator.cancel_token().cancel();

    let counters = coordinator
        .run_facets(std::iter::once(madrid_facet()))
        .await
        .expect("run");

    assert_eq!(counters.facets_searched, 0);
    assert_eq!(counters.pages_attempted, 0);

    drop(coordinator);
    let storage = SqliteStorage::new(Path::new(db_path.to_str().unwrap())).unwrap();
    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Cancelled);
}
