//! Geocoder against mocked Open-Meteo and Nominatim endpoints

use std::time::Duration;

use serde_json::json;
use skylog_web::services::{GeocodeError, GeocodeSource, Geocoder, ProviderError};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const USER_AGENT: &str = "skylog-tests/0.1";

fn geocoder(server: &MockServer, timeout: Duration) -> Geocoder {
    Geocoder::from_parts(
        &format!("{}/v1/search", server.uri()),
        &format!("{}/search", server.uri()),
        USER_AGENT,
        timeout,
    )
    .unwrap()
}

async fn mount_nominatim(server: &MockServer, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_primary_result_builds_display_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "Seattle"))
        .and(query_param("count", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "name": "Seattle",
                "latitude": 47.60621,
                "longitude": -122.33207,
                "country_code": "US",
                "admin1": "Washington",
                "country": "United States"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let location = geocoder(&server, Duration::from_secs(2))
        .resolve("Seattle")
        .await
        .unwrap();

    assert_eq!(location.name, "Seattle, Washington, United States");
    assert_eq!(location.lat, 47.60621);
    assert_eq!(location.lon, -122.33207);
    assert_eq!(location.country_code.as_deref(), Some("US"));
    assert_eq!(location.source, GeocodeSource::OpenMeteo);
}

#[tokio::test]
async fn test_primary_skips_missing_name_parts() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{ "name": "Monaco", "latitude": 43.73, "longitude": 7.42, "country": "Monaco" }]
        })))
        .mount(&server)
        .await;

    let location = geocoder(&server, Duration::from_secs(2))
        .resolve("Monaco")
        .await
        .unwrap();

    assert_eq!(location.name, "Monaco, Monaco");
}

#[tokio::test]
async fn test_empty_primary_falls_back_to_nominatim() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "Eiffel Tower"))
        .and(query_param("format", "jsonv2"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "display_name": "Tour Eiffel, Paris, France",
            "lat": "48.8582599",
            "lon": "2.2945006"
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let location = geocoder(&server, Duration::from_secs(2))
        .resolve("Eiffel Tower")
        .await
        .unwrap();

    assert_eq!(location.name, "Tour Eiffel, Paris, France");
    assert_eq!(location.lat, 48.8582599);
    assert_eq!(location.lon, 2.2945006);
    assert_eq!(location.source, GeocodeSource::Nominatim);
}

#[tokio::test]
async fn test_primary_server_error_falls_back() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_nominatim(&server, json!([{ "display_name": "Austin, Texas", "lat": "30.27", "lon": "-97.74" }])).await;

    let location = geocoder(&server, Duration::from_secs(2))
        .resolve("Austin")
        .await
        .unwrap();

    assert_eq!(location.source, GeocodeSource::Nominatim);
    assert_eq!(location.name, "Austin, Texas");
}

#[tokio::test]
async fn test_primary_timeout_falls_back() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "results": [] }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;
    mount_nominatim(&server, json!([{ "display_name": "Oslo, Norway", "lat": "59.91", "lon": "10.75" }])).await;

    let location = geocoder(&server, Duration::from_millis(300))
        .resolve("Oslo")
        .await
        .unwrap();

    assert_eq!(location.source, GeocodeSource::Nominatim);
}

#[tokio::test]
async fn test_both_providers_failing_is_unresolved() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "results": [] })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = geocoder(&server, Duration::from_secs(2))
        .resolve("Nowhere Special")
        .await
        .unwrap_err();

    assert_eq!(
        err,
        GeocodeError::Unresolved {
            primary: ProviderError::NoResults,
            fallback: ProviderError::Status(503),
        }
    );
}

#[tokio::test]
async fn test_nominatim_bad_coordinates_is_parse_error() {
    let server = MockServer::start().await;
    mount_nominatim(&server, json!([{ "display_name": "Broken", "lat": "north", "lon": "1.0" }])).await;

    let err = geocoder(&server, Duration::from_secs(2))
        .search_nominatim("Broken")
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Parse(_)));
}

#[tokio::test]
async fn test_nominatim_empty_list_is_no_results() {
    let server = MockServer::start().await;
    mount_nominatim(&server, json!([])).await;

    let err = geocoder(&server, Duration::from_secs(2))
        .search_nominatim("Atlantis")
        .await
        .unwrap_err();

    assert_eq!(err, ProviderError::NoResults);
}

#[tokio::test]
async fn test_malformed_primary_body_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let err = geocoder(&server, Duration::from_secs(2))
        .search_open_meteo("Seattle")
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::Parse(_)));
}

#[tokio::test]
async fn test_coordinates_never_hit_the_network() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let location = geocoder(&server, Duration::from_secs(2))
        .resolve("-33.8688 151.2093")
        .await
        .unwrap();

    assert_eq!(location.name, "-33.8688,151.2093");
    assert_eq!(location.source, GeocodeSource::Coordinates);
}
