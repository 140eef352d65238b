#![allow(clippy::unwrap_used)]
// Integration tests for `LightClient` using wiremock.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use pitlight_api::{
    Color, Error, LightClient, LightState, Power, PulseEffect, RetryPolicy, TransportConfig,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_millis(10),
    }
}

async fn setup() -> (MockServer, LightClient) {
    let server = MockServer::start().await;
    let token: secrecy::SecretString = "test-token".to_string().into();
    let client = LightClient::new(&server.uri(), &token, &TransportConfig::default())
        .unwrap()
        .with_retry_policy(fast_retry());
    (server, client)
}

fn lights_body() -> serde_json::Value {
    json!([
        {
            "id": "d073d5000001",
            "label": "Pit Wall Left",
            "power": "on",
            "connected": true,
            "brightness": 0.8,
            "color": { "hue": 120.0, "saturation": 1.0, "kelvin": 3500 },
            "product": {
                "name": "LIFX Color 1000",
                "capabilities": { "has_color": true, "has_variable_color_temp": true }
            }
        },
        {
            "id": "d073d5000002",
            "label": "Pit Wall Right",
            "power": "off",
            "connected": false,
            "brightness": 0.5,
            "color": { "hue": 0.0, "saturation": 0.0, "kelvin": 2700 }
        }
    ])
}

// ── Listing tests ───────────────────────────────────────────────────

#[tokio::test]
async fn test_list_lights() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/lights/all"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lights_body()))
        .mount(&server)
        .await;

    let lights = client.list_lights().await.unwrap();

    assert_eq!(lights.len(), 2);
    assert_eq!(lights[0].id, "d073d5000001");
    assert_eq!(lights[0].label, "Pit Wall Left");
    assert!(lights[0].connected);
    assert!(lights[0].product.as_ref().unwrap().capabilities.has_color);
    assert_eq!(lights[1].power, Power::Off);
}

#[tokio::test]
async fn test_list_lights_bad_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/lights/all"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let result = client.list_lights().await;

    match result {
        Err(Error::Deserialization { ref body, .. }) => assert_eq!(body, "not json"),
        other => panic!("expected Deserialization error, got: {other:?}"),
    }
}

// ── State tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_set_state_sends_exact_body() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/lights/id:a,id:b/state"))
        .and(body_partial_json(json!({
            "power": "on",
            "color": { "hue": 120.0, "saturation": 1.0, "kelvin": 3500 },
            "brightness": 0.5,
            "duration": 1.0
        })))
        .respond_with(ResponseTemplate::new(207).set_body_json(json!({ "results": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let state = LightState {
        power: Power::On,
        color: Color::hue_deg(120.0),
        brightness: 0.5,
        duration: Some(1.0),
    };
    client.set_state("id:a,id:b", &state).await.unwrap();
}

#[tokio::test]
async fn test_pulse() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/lights/id:a/effects/pulse"))
        .and(body_partial_json(json!({
            "period": 0.5,
            "cycles": 6,
            "power_on": true
        })))
        .respond_with(ResponseTemplate::new(207).set_body_json(json!({ "results": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let effect = PulseEffect {
        color: Color::hue_deg(0.0).with_brightness(1.0),
        from_color: Color::hue_deg(0.0).with_brightness(0.3),
        period: 0.5,
        cycles: 6,
        power_on: true,
    };
    client.pulse("id:a", &effect).await.unwrap();
}

// ── Classification & retry tests ────────────────────────────────────

#[tokio::test]
async fn test_invalid_token_never_retried() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/lights/all"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": "Invalid token"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let result = client.list_lights().await;

    assert!(
        matches!(result, Err(Error::InvalidToken)),
        "expected InvalidToken, got: {result:?}"
    );
}

#[tokio::test]
async fn test_server_error_retried_until_success() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/lights/all"))
        .respond_with(ResponseTemplate::new(500).set_body_string("upstream sad"))
        .up_to_n_times(2)
        .expect(2)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/lights/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lights_body()))
        .expect(1)
        .mount(&server)
        .await;

    let lights = client.list_lights().await.unwrap();
    assert_eq!(lights.len(), 2);
}

#[tokio::test]
async fn test_server_error_exhausts_retry_budget() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/lights/all"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(3)
        .mount(&server)
        .await;

    let result = client.list_lights().await;

    match result {
        Err(Error::Server { status, .. }) => assert_eq!(status, 502),
        other => panic!("expected Server error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limited_reports_retry_after() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/lights/all"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("retry-after", "7")
                .set_body_json(json!({ "error": "Too many requests" })),
        )
        .expect(3)
        .mount(&server)
        .await;

    let result = client.list_lights().await;

    match result {
        Err(Error::RateLimited { retry_after_secs }) => assert_eq!(retry_after_secs, 7),
        other => panic!("expected RateLimited error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_other_client_error_is_permanent() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/lights/id:x/state"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "Could not find light"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let state = LightState {
        power: Power::On,
        color: Color::hue_deg(60.0),
        brightness: 1.0,
        duration: Some(0.1),
    };
    let result = client.set_state("id:x", &state).await;

    match result {
        Err(Error::Api { status, ref message }) => {
            assert_eq!(status, 404);
            assert!(message.contains("Could not find light"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}
