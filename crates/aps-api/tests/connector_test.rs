#![allow(clippy::unwrap_used)]
// Integration tests for the action dispatcher using wiremock.

use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use aps_api::{Action, Connector, Credentials, HostList};

// ── Helpers ─────────────────────────────────────────────────────────

const BLOCK_COLLECTION: &str = "/api/aps/v1/otf/blacklisted-hosts/";
const ALLOW_COLLECTION: &str = "/api/aps/v1/otf/whitelisted-hosts/";

async fn setup() -> (MockServer, Connector) {
    let server = MockServer::start().await;
    let credentials = Credentials::new(
        &server.uri(),
        "admin",
        SecretString::from("test-password".to_owned()),
        true,
    );
    (server, Connector::new(credentials))
}

async fn mount_login_ok(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/platform/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(server)
        .await;
}

fn host_entry(address: &str) -> serde_json::Value {
    json!({ "hostAddress": address, "updateTime": 0, "annotation": "" })
}

/// 200 with an empty JSON object: how the appliance reports an absent entry.
fn absent_entry() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({}))
}

// ── test_connectivity ───────────────────────────────────────────────

#[tokio::test]
async fn test_connectivity_passes_on_good_login() {
    let (server, mut connector) = setup().await;
    mount_login_ok(&server).await;

    let report = connector.run(&Action::TestConnectivity).await;

    assert!(report.success);
    assert_eq!(report.message, "Test Connectivity Passed");
}

#[tokio::test]
async fn test_connectivity_fails_on_bad_login() {
    let (server, mut connector) = setup().await;

    Mock::given(method("POST"))
        .and(path("/platform/login"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"errors": [{"message": "access denied"}]})),
        )
        .mount(&server)
        .await;

    let report = connector.run(&Action::TestConnectivity).await;

    assert!(!report.success);
    assert!(report.message.contains("access denied"), "got: {}", report.message);
}

// ── list_ips ────────────────────────────────────────────────────────

#[tokio::test]
async fn test_list_ips_renames_the_legacy_field_and_counts() {
    let (server, mut connector) = setup().await;
    mount_login_ok(&server).await;

    Mock::given(method("GET"))
        .and(path(BLOCK_COLLECTION))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "blacklisted-hosts": ["1.2.3.4", "5.6.7.8"],
            "api-version": 1,
        })))
        .mount(&server)
        .await;

    let report = connector
        .run(&Action::ListIps { list: HostList::Block })
        .await;

    assert!(report.success);
    assert_eq!(report.summary.get("num_ips"), Some(&json!(2)));
    assert_eq!(report.data.len(), 1);
    assert_eq!(report.data[0]["hosts"], json!(["1.2.3.4", "5.6.7.8"]));
    assert!(report.data[0].get("blacklisted-hosts").is_none());
}

#[tokio::test]
async fn test_list_ips_allowlist_uses_the_whitelist_endpoint() {
    let (server, mut connector) = setup().await;
    mount_login_ok(&server).await;

    Mock::given(method("GET"))
        .and(path(ALLOW_COLLECTION))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "whitelisted-hosts": [],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let report = connector
        .run(&Action::ListIps { list: HostList::Allow })
        .await;

    assert!(report.success);
    assert_eq!(report.summary.get("num_ips"), Some(&json!(0)));
}

// ── block_ip / allow_ip ─────────────────────────────────────────────

#[tokio::test]
async fn test_block_ip_creates_an_absent_entry() {
    let (server, mut connector) = setup().await;
    mount_login_ok(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{BLOCK_COLLECTION}1.2.3.4/")))
        .respond_with(absent_entry())
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(BLOCK_COLLECTION))
        .and(query_param("hostAddress", "1.2.3.4"))
        .respond_with(ResponseTemplate::new(200).set_body_json(host_entry("1.2.3.4")))
        .expect(1)
        .mount(&server)
        .await;

    let report = connector
        .run(&Action::BlockIp { ip: "1.2.3.4".to_owned() })
        .await;

    assert!(report.success);
    assert_eq!(report.message, "IP added to the blocklist");
    assert_eq!(report.data[0]["hostAddress"], json!("1.2.3.4"));
    assert_eq!(report.data[0]["updatetimeISO"], json!("1970-01-01T00:00:00Z"));
}

#[tokio::test]
async fn test_block_ip_is_idempotent_without_a_write() {
    let (server, mut connector) = setup().await;
    mount_login_ok(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{BLOCK_COLLECTION}1.2.3.4/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(host_entry("1.2.3.4")))
        .mount(&server)
        .await;

    // No POST may be issued for an already-listed address.
    Mock::given(method("POST"))
        .and(path(BLOCK_COLLECTION))
        .respond_with(ResponseTemplate::new(200).set_body_json(host_entry("1.2.3.4")))
        .expect(0)
        .mount(&server)
        .await;

    let report = connector
        .run(&Action::BlockIp { ip: "1.2.3.4".to_owned() })
        .await;

    assert!(report.success);
    assert_eq!(report.message, "IP already on the blocklist");
    assert_eq!(report.data[0]["updatetimeISO"], json!("1970-01-01T00:00:00Z"));
}

#[tokio::test]
async fn test_block_cidr_keeps_the_full_cidr_as_identifier() {
    let (server, mut connector) = setup().await;
    mount_login_ok(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{BLOCK_COLLECTION}10.0.0.0/24/")))
        .respond_with(absent_entry())
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(BLOCK_COLLECTION))
        .and(query_param("hostAddress", "10.0.0.0/24"))
        .respond_with(ResponseTemplate::new(200).set_body_json(host_entry("10.0.0.0/24")))
        .expect(1)
        .mount(&server)
        .await;

    let report = connector
        .run(&Action::BlockIp { ip: "10.0.0.0/24".to_owned() })
        .await;

    assert!(report.success, "got: {}", report.message);
}

#[tokio::test]
async fn test_slash_32_uses_the_bare_address() {
    let (server, mut connector) = setup().await;
    mount_login_ok(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{ALLOW_COLLECTION}9.9.9.9/")))
        .respond_with(absent_entry())
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(ALLOW_COLLECTION))
        .and(query_param("hostAddress", "9.9.9.9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(host_entry("9.9.9.9")))
        .expect(1)
        .mount(&server)
        .await;

    let report = connector
        .run(&Action::AllowIp { ip: "9.9.9.9/32".to_owned() })
        .await;

    assert!(report.success, "got: {}", report.message);
    assert_eq!(report.message, "IP added to the allowlist");
}

#[tokio::test]
async fn test_invalid_ip_fails_without_network_contact() {
    let (server, mut connector) = setup().await;

    Mock::given(method("POST"))
        .and(path("/platform/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let report = connector
        .run(&Action::BlockIp { ip: "not-an-ip".to_owned() })
        .await;

    assert!(!report.success);
    assert!(report.message.contains("failed validation"), "got: {}", report.message);
}

// ── unblock_ip / unallow_ip ─────────────────────────────────────────

#[tokio::test]
async fn test_unblock_removes_a_present_entry() {
    let (server, mut connector) = setup().await;
    mount_login_ok(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{BLOCK_COLLECTION}1.2.3.4/")))
        .respond_with(ResponseTemplate::new(200).set_body_json(host_entry("1.2.3.4")))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(BLOCK_COLLECTION))
        .and(query_param("hostAddress", "1.2.3.4"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let report = connector
        .run(&Action::UnblockIp { ip: "1.2.3.4".to_owned() })
        .await;

    assert!(report.success);
    assert_eq!(report.message, "IP removed from the blocklist");
}

#[tokio::test]
async fn test_unblock_is_idempotent_without_a_delete() {
    let (server, mut connector) = setup().await;
    mount_login_ok(&server).await;

    Mock::given(method("GET"))
        .and(path(format!("{BLOCK_COLLECTION}1.2.3.4/")))
        .respond_with(absent_entry())
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path(BLOCK_COLLECTION))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let report = connector
        .run(&Action::UnblockIp { ip: "1.2.3.4".to_owned() })
        .await;

    assert!(report.success);
    assert_eq!(report.message, "IP already absent from the blocklist");
}

// ── Error propagation & teardown ────────────────────────────────────

#[tokio::test]
async fn test_failed_login_aborts_the_action_but_not_the_connector() {
    let (server, mut connector) = setup().await;

    // First and only mock for the per-host lookup: must never be hit.
    Mock::given(method("GET"))
        .and(path(format!("{BLOCK_COLLECTION}1.2.3.4/")))
        .respond_with(absent_entry())
        .expect(0)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/platform/login"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"errors": [{"message": "access denied"}]})),
        )
        .mount(&server)
        .await;

    let first = connector
        .run(&Action::BlockIp { ip: "1.2.3.4".to_owned() })
        .await;
    assert!(!first.success);

    // The connector keeps running further actions after a failure.
    let second = connector.run(&Action::TestConnectivity).await;
    assert!(!second.success);
}

#[tokio::test]
async fn test_finish_logs_out_exactly_once() {
    let (server, mut connector) = setup().await;
    mount_login_ok(&server).await;

    Mock::given(method("POST"))
        .and(path("/platform/logout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let report = connector.run(&Action::TestConnectivity).await;
    assert!(report.success);

    connector.finish().await.unwrap();
    // A second finish has no session left to close and issues nothing.
    connector.finish().await.unwrap();
}

#[tokio::test]
async fn test_finish_without_any_action_is_a_no_op() {
    let (_server, mut connector) = setup().await;
    connector.finish().await.unwrap();
}
