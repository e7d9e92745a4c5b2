//! Integration tests for configuration, settings and credential operations.

mod common;

use std::path::PathBuf;

use latchkey_core::{
    BackgroundScanningMode, CloudTlsValidationMode, ConfigureRequest, Error, ErrorKind,
    SdkFeature, SdkState,
};
use latchkey_sdk::mock::sample_credential;
use rstest::rstest;

use common::{bridge, configured_bridge};

#[test]
fn test_configure_forwards_parsed_options() {
    let (bridge, sdk) = bridge();
    bridge.configure(
        &ConfigureRequest::default()
            .with_database_path("/data/access.sqlite")
            .with_tls_mode("gallagherCertificateRequired")
            .with_feature("digitalId")
            .with_feature("teleport")
            .with_feature("salto"),
    );

    let options = sdk.last_options().unwrap();
    assert_eq!(
        options.database_path,
        Some(PathBuf::from("/data/access.sqlite"))
    );
    assert_eq!(
        options.cloud_tls_validation_mode,
        CloudTlsValidationMode::GallagherCertificateRequired
    );
    assert_eq!(
        options.enabled_features,
        vec![SdkFeature::DigitalId, SdkFeature::Salto]
    );
}

#[rstest]
#[case(None)]
#[case(Some("strictest"))]
fn test_unrecognized_tls_mode_uses_default(#[case] mode: Option<&str>) {
    let (bridge, sdk) = bridge();
    let mut request = ConfigureRequest::default();
    request.cloud_tls_validation_mode = mode.map(str::to_string);
    bridge.configure(&request);

    assert_eq!(
        sdk.last_options().unwrap().cloud_tls_validation_mode,
        CloudTlsValidationMode::AnyValidCertificateRequired
    );
}

#[test]
fn test_configure_twice_keeps_first_session() {
    let (bridge, sdk) = configured_bridge();
    bridge.configure(&ConfigureRequest::default().with_tls_mode("allowInvalidCertificate"));

    assert_eq!(sdk.configure_count(), 1);
    assert_eq!(
        sdk.last_options().unwrap().cloud_tls_validation_mode,
        CloudTlsValidationMode::AnyValidCertificateRequired
    );
}

#[test]
fn test_settings_are_forwarded() {
    let (bridge, sdk) = configured_bridge();
    bridge.set_scanning(true);
    bridge.set_automatic_access_enabled(true);
    bridge.set_background_scanning_mode("extended");

    assert!(sdk.is_scanning());
    assert!(sdk.is_automatic_access_enabled());
    assert_eq!(
        sdk.background_scanning_mode(),
        Some(BackgroundScanningMode::Extended)
    );
}

#[test]
fn test_unrecognized_background_mode_is_ignored() {
    let (bridge, sdk) = configured_bridge();
    bridge.set_background_scanning_mode("standard");
    bridge.set_background_scanning_mode("aggressive");
    assert_eq!(
        sdk.background_scanning_mode(),
        Some(BackgroundScanningMode::Standard)
    );
}

#[test]
fn test_settings_before_configure_are_no_ops() {
    let (bridge, sdk) = bridge();
    bridge.set_scanning(true);
    bridge.set_automatic_access_enabled(true);
    bridge.set_background_scanning_mode("extended");

    assert!(!sdk.is_scanning());
    assert!(!sdk.is_automatic_access_enabled());
    assert_eq!(sdk.background_scanning_mode(), None);
}

#[tokio::test]
async fn test_resolve_invitation_url() {
    let (bridge, _sdk) = configured_bridge();
    let url = bridge
        .resolve_invitation_url("commandcentre.example.cloud", "UUWM-M26T-UDT2-7TUN")
        .await
        .unwrap();
    assert_eq!(
        url,
        "https://commandcentre.example.cloud/api/invitations/UUWM-M26T-UDT2-7TUN"
    );
}

#[rstest]
#[case("", "UUWM-M26T")]
#[case("commandcentre.example.cloud", "")]
#[case("command centre", "UUWM-M26T")]
#[tokio::test]
async fn test_resolve_invitation_url_rejects_bad_input(#[case] host: &str, #[case] code: &str) {
    let (bridge, _sdk) = configured_bridge();
    let error = bridge.resolve_invitation_url(host, code).await.unwrap_err();
    assert_eq!(error, Error::invalid_argument("host or invitationCode was invalid"));
    assert_eq!(error.code(), "invalid_arg");
}

#[tokio::test]
async fn test_queries_before_configure() {
    let (bridge, _sdk) = bridge();
    assert_eq!(bridge.get_states().unwrap_err(), Error::NotConfigured);
    assert_eq!(bridge.get_credentials().unwrap_err(), Error::NotConfigured);
    assert_eq!(
        bridge.resolve_invitation_url("host", "code").await.unwrap_err(),
        Error::NotConfigured
    );
    assert_eq!(bridge.subscribe_events().unwrap_err(), Error::NotConfigured);
}

#[test]
fn test_get_states() {
    let (bridge, sdk) = configured_bridge();
    sdk.set_states(vec![
        SdkState::ErrorNoCredentials,
        SdkState::BleErrorNoLocationPermission,
    ]);

    let states = bridge.get_states().unwrap();
    let tags: Vec<_> = states.iter().map(SdkState::tag).collect();
    assert_eq!(tags, vec!["errorNoCredentials", "bleErrorNoLocationPermission"]);
}

#[test]
fn test_get_credentials() {
    let (bridge, sdk) = configured_bridge();
    sdk.add_credential(sample_credential("c1"));
    sdk.add_credential(sample_credential("c2"));

    let credentials = bridge.get_credentials().unwrap();
    let ids: Vec<_> = credentials.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, vec!["c1", "c2"]);

    let json = serde_json::to_value(&credentials[0]).unwrap();
    assert_eq!(json["facilityId"], 1);
    assert_eq!(json["isRevoked"], false);
    assert!(json["registeredDate"].is_string());
}

#[tokio::test]
async fn test_delete_credential() {
    let (bridge, sdk) = configured_bridge();
    sdk.add_credential(sample_credential("c1"));
    sdk.add_credential(sample_credential("c2"));

    let deleted = bridge.delete_credential("c1").await.unwrap();

    assert_eq!(deleted.id, "c1");
    assert_eq!(sdk.deleted(), vec!["c1".to_string()]);
    assert_eq!(bridge.get_credentials().unwrap().len(), 1);
}

#[rstest]
#[case("")]
#[case("missing")]
#[tokio::test]
async fn test_delete_unknown_credential(#[case] id: &str) {
    let (bridge, sdk) = configured_bridge();
    sdk.add_credential(sample_credential("c1"));

    let error = bridge.delete_credential(id).await.unwrap_err();

    assert_eq!(error, Error::invalid_argument("credentialId was invalid"));
    assert!(sdk.deleted().is_empty());
}

#[tokio::test]
async fn test_delete_failure_carries_sdk_message() {
    let (bridge, sdk) = configured_bridge();
    sdk.add_credential(sample_credential("c1"));
    sdk.fail_next_delete("Server rejected the request");

    let error = bridge.delete_credential("c1").await.unwrap_err();

    assert_eq!(error.kind(), ErrorKind::DeleteFailed);
    assert_eq!(error.code(), "delete_mobile_credential_failed");
    assert_eq!(error.to_string(), "Server rejected the request");
    assert_eq!(bridge.get_credentials().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_before_configure() {
    let (bridge, _sdk) = bridge();
    assert_eq!(
        bridge.delete_credential("c1").await.unwrap_err(),
        Error::NotConfigured
    );
}
