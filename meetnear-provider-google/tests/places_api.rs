use meetnear_core::{Location, LocationFilter, Place, PlaceId, PlacesPort, PortError, Settings};
use meetnear_provider_google::{GooglePlacesPort, http_client};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn port_for(server: &MockServer) -> GooglePlacesPort {
    let mut settings = Settings::with_api_key("test-key");
    settings.places_base_url = server.uri();
    let client = http_client(&settings).expect("http client");
    GooglePlacesPort::new(client, &settings)
}

#[tokio::test]
async fn nearby_search_maps_results_to_places() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/place/nearbysearch/json"))
        .and(query_param("location", "45,123"))
        .and(query_param("radius", "50000"))
        .and(query_param("type", "cafe"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "html_attributions": ["listing by someone"],
            "next_page_token": "page-2",
            "results": [
                {
                    "place_id": "321",
                    "name": "somewhere",
                    "photos": [
                        { "photo_reference": "photo-1", "html_attributions": ["<a>photographer</a>"] },
                        { "photo_reference": "photo-2", "html_attributions": [] }
                    ]
                },
                { "place_id": "654", "name": "no photos here" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let filter = LocationFilter {
        place_type: Some("cafe".to_owned()),
        radius_meters: Some(50_000),
    };
    let results = port_for(&server)
        .find_nearby_places(&Location::at(45.0, 123.0), &filter)
        .await
        .expect("search succeeds");

    assert_eq!(results.attribution_html, "listing by someone");
    assert_eq!(results.next_page_token.as_deref(), Some("page-2"));
    assert_eq!(
        results.places,
        vec![
            Place::new("321", "somewhere").with_photo("photo-1", "<a>photographer</a>"),
            Place::new("654", "no photos here"),
        ]
    );
}

#[tokio::test]
async fn nearby_search_falls_back_to_default_radius() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/place/nearbysearch/json"))
        .and(query_param("radius", "5000"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ZERO_RESULTS",
            "html_attributions": [],
            "results": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = port_for(&server)
        .find_nearby_places(&Location::at(30.25, -97.75), &LocationFilter::default())
        .await
        .expect("zero results is not an error");

    assert!(results.places.is_empty(), "expected no places");
    assert_eq!(results.next_page_token, None);
}

#[tokio::test]
async fn text_locations_use_text_search() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/place/textsearch/json"))
        .and(query_param("query", "Austin, TX"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "html_attributions": [],
            "results": [{ "place_id": "P1", "name": "Zilker Park" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let results = port_for(&server)
        .find_nearby_places(&Location::from("Austin, TX"), &LocationFilter::default())
        .await
        .expect("search succeeds");

    assert_eq!(results.places, vec![Place::new("P1", "Zilker Park")]);
}

#[tokio::test]
async fn search_failure_status_carries_upstream_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/place/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        })))
        .mount(&server)
        .await;

    let err = port_for(&server)
        .find_nearby_places(&Location::at(1.0, 2.0), &LocationFilter::default())
        .await
        .expect_err("denied");

    match err {
        PortError::Provider { status, message } => {
            assert_eq!(status, "REQUEST_DENIED");
            assert_eq!(message.as_deref(), Some("The provided API key is invalid."));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn http_errors_surface_as_network_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = port_for(&server)
        .find_nearby_places(&Location::at(1.0, 2.0), &LocationFilter::default())
        .await
        .expect_err("server error");

    assert!(matches!(err, PortError::Network(_)), "unexpected error: {err:?}");
}

async fn details_status(status: &str) -> Result<bool, PortError> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/place/details/json"))
        .and(query_param("placeid", "ChIJ123"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": status })))
        .expect(1)
        .mount(&server)
        .await;

    port_for(&server)
        .check_place_validity(&PlaceId::from("ChIJ123"))
        .await
}

#[tokio::test]
async fn place_validity_follows_details_status() {
    assert!(details_status("OK").await.expect("ok status"), "OK means valid");
    assert!(
        !details_status("NOT_FOUND").await.expect("not found status"),
        "NOT_FOUND means invalid"
    );
    assert!(
        !details_status("ZERO_RESULTS").await.expect("zero results status"),
        "ZERO_RESULTS means invalid"
    );
}

#[tokio::test]
async fn place_validity_errors_on_other_statuses() {
    let err = details_status("INVALID_REQUEST")
        .await
        .expect_err("invalid request");

    assert!(
        matches!(&err, PortError::Provider { status, .. } if status == "INVALID_REQUEST"),
        "unexpected error: {err:?}"
    );
}
