// Coordinator behavior against a mocked Vision+ API.
//
// Covers the polling state machine: initial refresh, stale-on-error,
// device-scoped refresh, and the command -> refresh contract observed
// through the entity adapters.

use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeDelta, Utc};
use pretty_assertions::assert_eq;
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wattsvision_api::{AuthProvider, OAuthConfig, Token, VisionClient};
use wattsvision_core::{
    BridgeConfig, ClimateEntity, Coordinator, CoordinatorState, CoreError, DeviceId, HvacMode,
    SwitchEntity, build_entities,
};

// ── Helpers ─────────────────────────────────────────────────────────

fn valid_auth() -> Arc<AuthProvider> {
    let config = OAuthConfig {
        client_id: "test-client".into(),
        token_url: "http://127.0.0.1:9/token".parse().expect("valid URL"),
        scopes: vec!["openid".into()],
    };
    let initial = Token {
        access_token: SecretString::from("test-token".to_owned()),
        refresh_token: SecretString::from("refresh".to_owned()),
        expires_at: Utc::now() + TimeDelta::hours(1),
    };
    Arc::new(AuthProvider::new(reqwest::Client::new(), config, initial))
}

fn coordinator(server: &MockServer, update_interval: Duration) -> Coordinator {
    let config = BridgeConfig {
        api_base_url: server.uri().parse().expect("valid base URL"),
        update_interval,
        timeout: Duration::from_secs(5),
    };
    let client = Arc::new(VisionClient::new(
        reqwest::Client::new(),
        config.api_base_url.clone(),
        valid_auth(),
    ));
    Coordinator::new(client, config)
}

fn discovery_body() -> serde_json::Value {
    json!({
        "devices": [
            {
                "deviceId": "T1",
                "friendlyName": "Living Room",
                "interface": "action.devices.types.THERMOSTAT",
                "roomName": "Living Room",
            },
            {
                "deviceId": "S1",
                "friendlyName": "Towel Rail",
                "interface": "action.devices.types.SWITCH",
                "roomName": "Bathroom",
            },
        ]
    })
}

fn t1_report(setpoint: f64) -> serde_json::Value {
    json!({
        "isOnline": true,
        "currentTemperature": 19.5,
        "setpoint": setpoint,
        "thermostatMode": "Comfort",
        "minAllowedTemperature": 7.0,
        "maxAllowedTemperature": 30.0,
        "temperatureUnit": "C",
    })
}

fn s1_report(is_on: bool) -> serde_json::Value {
    json!({ "isOnline": true, "isTurnedOn": is_on })
}

async fn mount_discovery(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/voice-control/discover/Google"))
        .respond_with(ResponseTemplate::new(200).set_body_json(discovery_body()))
        .mount(server)
        .await;
}

async fn mount_report(server: &MockServer, device_id: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/voice-control/report/Google/{device_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

async fn mount_report_once(server: &MockServer, device_id: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!("/voice-control/report/Google/{device_id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

/// Pull the T1 climate and S1 switch adapters out of the built entity set.
fn entities(coordinator: &Coordinator) -> (ClimateEntity, SwitchEntity) {
    let (mut climates, mut switches) = build_entities(coordinator);
    assert_eq!(climates.len(), 1);
    assert_eq!(switches.len(), 1);
    let climate = climates.pop().expect("one climate entity");
    let switch = switches.pop().expect("one switch entity");
    assert_eq!(climate.device_id(), &DeviceId::from("T1"));
    assert_eq!(switch.device_id(), &DeviceId::from("S1"));
    (climate, switch)
}

// ── State machine ───────────────────────────────────────────────────

#[tokio::test]
async fn first_refresh_transitions_to_ready() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    mount_report(&server, "T1", t1_report(21.0)).await;
    mount_report(&server, "S1", s1_report(true)).await;

    let coordinator = coordinator(&server, Duration::ZERO);
    assert_eq!(coordinator.state(), CoordinatorState::Uninitialized);

    coordinator.first_refresh().await.expect("first refresh");

    assert_eq!(coordinator.state(), CoordinatorState::Ready);
    assert!(coordinator.last_update_success());
    assert_eq!(coordinator.store().len(), 2);
}

#[tokio::test]
async fn failed_first_refresh_stays_uninitialized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let coordinator = coordinator(&server, Duration::ZERO);
    let result = coordinator.first_refresh().await;

    assert!(
        matches!(result, Err(CoreError::UpdateFailed { .. })),
        "expected UpdateFailed, got: {result:?}"
    );
    assert_eq!(coordinator.state(), CoordinatorState::Uninitialized);
    assert!(coordinator.store().is_empty());
}

#[tokio::test]
async fn entity_reads_mirror_the_snapshot() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    mount_report(&server, "T1", t1_report(21.0)).await;
    mount_report(&server, "S1", s1_report(true)).await;

    let coordinator = coordinator(&server, Duration::ZERO);
    coordinator.first_refresh().await.expect("first refresh");

    let (climate, switch) = entities(&coordinator);

    // Raw mode "Comfort" surfaces as Heat.
    assert_eq!(climate.hvac_mode(), Some(HvacMode::Heat));
    assert_eq!(climate.current_temperature(), Some(19.5));
    assert_eq!(climate.target_temperature(), Some(21.0));
    assert_eq!(climate.min_temp(), 7.0);
    assert_eq!(climate.max_temp(), 30.0);
    assert_eq!(climate.name().as_deref(), Some("Living Room"));
    assert!(climate.available());

    assert_eq!(switch.is_on(), Some(true));
    assert!(switch.available());
}

#[tokio::test]
async fn device_gone_from_snapshot_reads_unavailable() {
    let server = MockServer::start().await;

    // First discovery sees both devices; later ones only the switch.
    Mock::given(method("GET"))
        .and(path("/voice-control/discover/Google"))
        .respond_with(ResponseTemplate::new(200).set_body_json(discovery_body()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/voice-control/discover/Google"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "devices": [{
                "deviceId": "S1",
                "friendlyName": "Towel Rail",
                "interface": "action.devices.types.SWITCH",
            }]
        })))
        .mount(&server)
        .await;
    mount_report(&server, "T1", t1_report(21.0)).await;
    mount_report(&server, "S1", s1_report(true)).await;

    let coordinator = coordinator(&server, Duration::ZERO);
    coordinator.first_refresh().await.expect("first refresh");
    let (climate, switch) = entities(&coordinator);

    coordinator.request_refresh().await.expect("second refresh");

    // The thermostat dropped out: defined unavailable values, no panic.
    assert_eq!(climate.current_temperature(), None);
    assert_eq!(climate.target_temperature(), None);
    assert_eq!(climate.hvac_mode(), None);
    assert!(!climate.available());

    // The switch is untouched.
    assert_eq!(switch.is_on(), Some(true));
    assert!(switch.available());
}

#[tokio::test]
async fn failed_poll_preserves_snapshot_and_marks_stale() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    mount_report(&server, "T1", t1_report(21.0)).await;

    // S1: one good report, then one failure, then good again.
    mount_report_once(&server, "S1", s1_report(true)).await;
    Mock::given(method("GET"))
        .and(path("/voice-control/report/Google/S1"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_report(&server, "S1", s1_report(false)).await;

    let coordinator = coordinator(&server, Duration::ZERO);
    coordinator.first_refresh().await.expect("first refresh");
    let (climate, switch) = entities(&coordinator);

    // The failing cycle: typed error, stale state, untouched snapshot.
    let result = coordinator.request_refresh().await;
    assert!(
        matches!(result, Err(CoreError::UpdateFailed { .. })),
        "expected UpdateFailed, got: {result:?}"
    );
    assert_eq!(coordinator.state(), CoordinatorState::Stale);
    assert!(!coordinator.last_update_success());

    // Both entities keep reporting the pre-failure values.
    assert_eq!(climate.hvac_mode(), Some(HvacMode::Heat));
    assert_eq!(climate.target_temperature(), Some(21.0));
    assert_eq!(switch.is_on(), Some(true));

    // The next successful poll returns to Ready and applies new data.
    coordinator.request_refresh().await.expect("recovery");
    assert_eq!(coordinator.state(), CoordinatorState::Ready);
    assert!(coordinator.last_update_success());
    assert_eq!(switch.is_on(), Some(false));
}

// ── Device-scoped refresh ───────────────────────────────────────────

#[tokio::test]
async fn device_refresh_replaces_only_that_device() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    mount_report(&server, "S1", s1_report(true)).await;
    mount_report_once(&server, "T1", t1_report(21.0)).await;
    mount_report(&server, "T1", t1_report(23.5)).await;

    let coordinator = coordinator(&server, Duration::ZERO);
    coordinator.first_refresh().await.expect("first refresh");
    let (climate, switch) = entities(&coordinator);
    assert_eq!(climate.target_temperature(), Some(21.0));

    coordinator.refresh_device(&DeviceId::from("T1")).await;

    assert_eq!(climate.target_temperature(), Some(23.5));
    assert_eq!(switch.is_on(), Some(true));
    assert!(coordinator.last_update_success());
}

#[tokio::test]
async fn failed_device_refresh_retains_previous_record() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    mount_report(&server, "S1", s1_report(true)).await;
    mount_report_once(&server, "T1", t1_report(21.0)).await;
    Mock::given(method("GET"))
        .and(path("/voice-control/report/Google/T1"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let coordinator = coordinator(&server, Duration::ZERO);
    coordinator.first_refresh().await.expect("first refresh");
    let (climate, switch) = entities(&coordinator);

    // Swallowed: no error surfaces, the previous record stays.
    coordinator.refresh_device(&DeviceId::from("T1")).await;

    assert_eq!(climate.target_temperature(), Some(21.0));
    assert_eq!(switch.is_on(), Some(true));
    assert!(coordinator.last_update_success());
    assert_eq!(coordinator.state(), CoordinatorState::Ready);
}

#[tokio::test]
async fn device_refresh_for_unknown_id_is_a_no_op() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    mount_report(&server, "T1", t1_report(21.0)).await;
    mount_report(&server, "S1", s1_report(true)).await;

    let coordinator = coordinator(&server, Duration::ZERO);
    coordinator.first_refresh().await.expect("first refresh");

    coordinator.refresh_device(&DeviceId::from("nope")).await;
    assert_eq!(coordinator.store().len(), 2);
}

// ── Commands ────────────────────────────────────────────────────────

#[tokio::test]
async fn successful_command_triggers_exactly_one_refresh() {
    let server = MockServer::start().await;

    // Initial refresh plus exactly one post-command refresh.
    Mock::given(method("GET"))
        .and(path("/voice-control/discover/Google"))
        .respond_with(ResponseTemplate::new(200).set_body_json(discovery_body()))
        .expect(2)
        .mount(&server)
        .await;
    mount_report(&server, "S1", s1_report(true)).await;
    mount_report_once(&server, "T1", t1_report(20.0)).await;
    mount_report(&server, "T1", t1_report(23.5)).await;

    Mock::given(method("POST"))
        .and(path("/voice-control/control/thermostat/Google/T1/set-temperature"))
        .and(body_json(json!({ "targetTemperature": 23.5 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = coordinator(&server, Duration::ZERO);
    coordinator.first_refresh().await.expect("first refresh");
    coordinator.start().await;
    let (climate, _switch) = entities(&coordinator);
    assert_eq!(climate.target_temperature(), Some(20.0));

    climate.set_temperature(23.5).await;

    // The snapshot reflects the new value once the refresh resolved.
    assert_eq!(climate.target_temperature(), Some(23.5));

    coordinator.close().await;
}

#[tokio::test]
async fn set_mode_sends_the_numeric_vendor_code() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    mount_report(&server, "T1", t1_report(21.0)).await;
    mount_report(&server, "S1", s1_report(true)).await;

    Mock::given(method("POST"))
        .and(path("/voice-control/control/thermostat/Google/T1/set-mode"))
        .and(body_json(json!({ "mode": 6 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = coordinator(&server, Duration::ZERO);
    coordinator.first_refresh().await.expect("first refresh");
    coordinator.start().await;
    let (climate, _switch) = entities(&coordinator);

    climate.set_hvac_mode(HvacMode::Auto).await;

    coordinator.close().await;
}

#[tokio::test]
async fn unknown_mode_write_is_rejected_before_any_http() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    mount_report(&server, "T1", t1_report(21.0)).await;
    mount_report(&server, "S1", s1_report(true)).await;

    Mock::given(method("POST"))
        .and(path("/voice-control/control/thermostat/Google/T1/set-mode"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let coordinator = coordinator(&server, Duration::ZERO);
    coordinator.first_refresh().await.expect("first refresh");
    coordinator.start().await;
    let (climate, _switch) = entities(&coordinator);

    // Swallowed at the entity boundary; nothing reaches the API.
    climate.set_hvac_mode(HvacMode::Unknown).await;

    coordinator.close().await;
}

#[tokio::test]
async fn failed_command_is_swallowed_and_triggers_no_refresh() {
    let server = MockServer::start().await;

    // Only the initial refresh; a failed command must not refresh.
    Mock::given(method("GET"))
        .and(path("/voice-control/discover/Google"))
        .respond_with(ResponseTemplate::new(200).set_body_json(discovery_body()))
        .expect(1)
        .mount(&server)
        .await;
    mount_report(&server, "T1", t1_report(21.0)).await;
    mount_report(&server, "S1", s1_report(true)).await;

    Mock::given(method("POST"))
        .and(path("/voice-control/control/on-off/Google/S1/change-state"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = coordinator(&server, Duration::ZERO);
    coordinator.first_refresh().await.expect("first refresh");
    coordinator.start().await;
    let (_climate, switch) = entities(&coordinator);

    switch.turn_off().await;

    // The UI value is unchanged until the next successful poll.
    assert_eq!(switch.is_on(), Some(true));

    coordinator.close().await;
}

#[tokio::test]
async fn switch_commands_post_the_expected_payloads() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    mount_report(&server, "T1", t1_report(21.0)).await;
    mount_report_once(&server, "S1", s1_report(false)).await;
    mount_report(&server, "S1", s1_report(true)).await;

    Mock::given(method("POST"))
        .and(path("/voice-control/control/on-off/Google/S1/change-state"))
        .and(body_json(json!({ "isTurnedOn": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let coordinator = coordinator(&server, Duration::ZERO);
    coordinator.first_refresh().await.expect("first refresh");
    coordinator.start().await;
    let (_climate, switch) = entities(&coordinator);
    assert_eq!(switch.is_on(), Some(false));

    switch.turn_on().await;

    assert_eq!(switch.is_on(), Some(true));

    coordinator.close().await;
}

// ── Periodic polling ────────────────────────────────────────────────

#[tokio::test]
async fn periodic_task_polls_without_external_prompting() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    mount_report(&server, "T1", t1_report(21.0)).await;
    mount_report(&server, "S1", s1_report(true)).await;

    let coordinator = coordinator(&server, Duration::from_millis(50));
    // No first_refresh here: only the timer can populate the store.
    coordinator.start().await;

    tokio::time::sleep(Duration::from_millis(400)).await;

    assert_eq!(coordinator.state(), CoordinatorState::Ready);
    assert_eq!(coordinator.store().len(), 2);
    assert!(coordinator.store().last_refresh().is_some());

    coordinator.close().await;
}

#[tokio::test]
async fn execute_after_close_fails_with_coordinator_closed() {
    let server = MockServer::start().await;
    mount_discovery(&server).await;
    mount_report(&server, "T1", t1_report(21.0)).await;
    mount_report(&server, "S1", s1_report(true)).await;

    let coordinator = coordinator(&server, Duration::ZERO);
    coordinator.first_refresh().await.expect("first refresh");
    coordinator.start().await;
    coordinator.close().await;

    let result = coordinator
        .execute(wattsvision_core::Command::SetSwitchState {
            device_id: DeviceId::from("S1"),
            is_on: true,
        })
        .await;

    assert!(
        matches!(result, Err(CoreError::CoordinatorClosed)),
        "expected CoordinatorClosed, got: {result:?}"
    );
}
