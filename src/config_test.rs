use super::*;

#[test]
fn empty_env_uses_defaults() {
    let cfg = ServerConfig::from_lookup(|_| None);
    assert_eq!(cfg, ServerConfig::default());
    assert_eq!(cfg.listen_addr(), "0.0.0.0:5000");
}

#[test]
fn parses_overrides() {
    let cfg = ServerConfig::from_lookup(|key| match key {
        "PORT" => Some("8080".into()),
        "BIND_ADDR" => Some("127.0.0.1".into()),
        "MAX_UPLOAD_BYTES" => Some("1024".into()),
        _ => None,
    });
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.max_upload_bytes, 1024);
    assert_eq!(cfg.listen_addr(), "127.0.0.1:8080");
}

#[test]
fn invalid_port_falls_back() {
    let cfg = ServerConfig::from_lookup(|key| (key == "PORT").then(|| "99999".to_string()));
    assert_eq!(cfg.port, DEFAULT_PORT);
}
