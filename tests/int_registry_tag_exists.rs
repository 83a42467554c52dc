mod common;

use std::net::TcpListener;
use std::time::Duration;

use common::one_shot_http;
use dockhand::{ImageReference, LifecycleError, RegistryTagChecker};

fn checker() -> RegistryTagChecker {
    RegistryTagChecker::new(Duration::from_secs(5)).expect("http client")
}

#[test]
fn int_tag_found_case_insensitively() {
    let (host, server) = one_shot_http(200, r#"{"name":"team/app","tags":["1.0","Latest"]}"#);
    let image = ImageReference::with_registry("team/app:latest", format!("{host}/"));
    assert!(checker().tag_exists(&image).expect("query"));
    let request = server.join().expect("server");
    assert_eq!(request, "GET /2/team/app/tags/list HTTP/1.1");
}

#[test]
fn int_tag_absent_from_listing() {
    let (host, server) = one_shot_http(200, r#"{"name":"app","tags":["1.0"]}"#);
    let image = ImageReference::with_registry("app:2.0", host);
    assert!(!checker().tag_exists(&image).expect("query"));
    server.join().expect("server");
}

#[test]
fn int_untagged_name_compares_whole_name() {
    let (host, server) = one_shot_http(200, r#"{"name":"app","tags":["app"]}"#);
    let image = ImageReference::with_registry("app", host);
    assert!(checker().tag_exists(&image).expect("query"));
    server.join().expect("server");
}

#[test]
fn int_null_tags_is_false() {
    let (host, server) = one_shot_http(200, r#"{"name":"app","tags":null}"#);
    let image = ImageReference::with_registry("app:1.0", host);
    assert!(!checker().tag_exists(&image).expect("query"));
    server.join().expect("server");
}

#[test]
fn int_unknown_repository_is_false() {
    let (host, server) = one_shot_http(404, r#"{"errors":[{"code":"NAME_UNKNOWN"}]}"#);
    let image = ImageReference::with_registry("nope:1.0", host);
    assert!(!checker().tag_exists(&image).expect("query"));
    server.join().expect("server");
}

#[test]
fn int_server_error_is_engine_error() {
    let (host, server) = one_shot_http(500, "boom");
    let image = ImageReference::with_registry("app:1.0", host);
    let err = checker().tag_exists(&image).unwrap_err();
    assert!(matches!(err, LifecycleError::Engine { .. }), "{err:?}");
    assert!(err.message().contains("500"));
    server.join().expect("server");
}

#[test]
fn int_undecodable_body_is_protocol_error() {
    let (host, server) = one_shot_http(200, "<html>not json</html>");
    let image = ImageReference::with_registry("app:1.0", host);
    let err = checker().tag_exists(&image).unwrap_err();
    assert!(matches!(err, LifecycleError::Protocol { .. }), "{err:?}");
    server.join().expect("server");
}

#[test]
fn int_unreachable_registry_is_network_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        listener.local_addr().expect("addr").port()
    };
    let image = ImageReference::with_registry("app:1.0", format!("127.0.0.1:{port}"));
    let err = checker().tag_exists(&image).unwrap_err();
    assert!(matches!(err, LifecycleError::Network { .. }), "{err:?}");
}
