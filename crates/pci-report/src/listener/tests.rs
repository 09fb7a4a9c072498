use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use super::*;

fn loopback_config() -> ListenerConfig {
    ListenerConfig {
        bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
    }
}

#[test]
fn default_config_listens_on_all_interfaces() {
    let config = ListenerConfig::default();
    assert_eq!(config.socket_addr(), SocketAddr::from(([0, 0, 0, 0], 12345)));
}

#[test]
fn status_messages_match_operator_wording() {
    let local = SocketAddr::from(([127, 0, 0, 1], 12345));
    let peer = SocketAddr::from(([192, 168, 1, 20], 50123));

    assert_eq!(ListenerStatus::stopped().message, "server stopped");
    assert_eq!(ListenerStatus::listening(local).message, "listening on port 12345");
    assert_eq!(ListenerStatus::waiting(Some(local)).message, "waiting for connection...");

    let connected = ListenerStatus::connected(Some(local), peer);
    assert_eq!(connected.message, "client connected: 192.168.1.20");
    assert_eq!(connected.client_ip(), Some(peer.ip()));
    assert_eq!(connected.state, ListenerState::ClientConnected);
}

#[tokio::test]
async fn fresh_listener_is_stopped_and_empty() {
    let (handle, _task) = ReportListener::spawn(loopback_config());
    assert!(!handle.is_running());
    assert_eq!(handle.status().state, ListenerState::Stopped);
    assert_eq!(handle.device_count(), 0);
}

#[tokio::test]
async fn stop_before_start_is_harmless() {
    let (handle, _task) = ReportListener::spawn(loopback_config());
    handle.stop().await.expect("stop");
    assert_eq!(handle.status(), ListenerStatus::stopped());
}

#[tokio::test]
async fn commands_fail_once_the_task_is_gone() {
    let (listener, handle) = ReportListener::new(loopback_config());
    drop(listener);

    let err = handle.start().await.expect_err("no reactor");
    assert!(matches!(err, ListenerError::ReactorGone));
}

#[test]
fn vendor_names_resolve_through_the_handle() {
    let (_listener, handle) = ReportListener::new(loopback_config());
    assert_eq!(handle.vendor_name("8086"), "Intel Corporation");
    assert_eq!(handle.vendor_name(" 10de "), "NVIDIA Corporation");
    assert_eq!(handle.vendor_name("FFFE"), "Unknown manufacturer");
}

#[tokio::test(start_paused = true)]
async fn failed_accept_backs_off_and_keeps_state() {
    let (mut listener, handle) = ReportListener::new(loopback_config());
    let before = handle.status();

    let started = tokio::time::Instant::now();
    listener
        .on_accept(Err(io::Error::new(io::ErrorKind::Other, "too many open files")))
        .await;

    assert!(started.elapsed() >= ACCEPT_BACKOFF);
    assert!(listener.session.is_none());
    assert_eq!(handle.status(), before);
}
