use contact_relay::interfaces::config::{Config, StorageCfg, DEFAULT_BIND};

#[test]
fn empty_config_uses_defaults() {
    let cfg = Config::from_yaml("").unwrap();

    assert_eq!(cfg.storage, StorageCfg::File { path: None });
    assert_eq!(cfg.bind_addr(), DEFAULT_BIND);
    assert!(cfg.relay_credentials().is_none());
}

#[test]
fn parses_full_config() {
    let cfg = Config::from_yaml(
        r#"
relay:
  service_id: service_abc
  template_id: template_xyz
  public_key: pk_123
  endpoint: http://localhost:9999/send
storage:
  kind: sqlite
  url: "sqlite:./state.db?mode=rwc"
http:
  bind: 0.0.0.0:3000
"#,
    )
    .unwrap();

    let creds = cfg.relay_credentials().unwrap();
    assert_eq!(creds.service_id, "service_abc");
    assert_eq!(creds.template_id, "template_xyz");
    assert_eq!(creds.public_key, "pk_123");
    assert_eq!(cfg.relay_endpoint(), "http://localhost:9999/send");
    assert_eq!(
        cfg.storage,
        StorageCfg::Sqlite {
            url: Some("sqlite:./state.db?mode=rwc".into())
        }
    );
    assert_eq!(cfg.bind_addr(), "0.0.0.0:3000");
}

#[test]
fn any_missing_credential_means_simulated() {
    let cfg = Config::from_yaml(
        r#"
relay:
  service_id: service_abc
  template_id: template_xyz
"#,
    )
    .unwrap();
    assert!(cfg.relay_credentials().is_none());

    let cfg = Config::from_yaml(
        r#"
relay:
  service_id: service_abc
  template_id: "   "
  public_key: pk
"#,
    )
    .unwrap();
    assert!(cfg.relay_credentials().is_none());
}

#[test]
fn unexpanded_placeholders_count_as_unset() {
    let cfg = Config::from_yaml(
        r#"
relay:
  service_id: ${CONTACT_RELAY_TEST_SURELY_UNSET_VAR}
  template_id: t
  public_key: p
"#,
    )
    .unwrap();
    assert!(cfg.relay_credentials().is_none());
}

#[test]
fn environment_overrides_file_values() {
    let mut cfg = Config::from_yaml(
        r#"
relay:
  service_id: from_file
"#,
    )
    .unwrap();

    cfg.apply_env(|k| match k {
        "EMAILJS_SERVICE_ID" => Some("from_env".to_string()),
        "EMAILJS_TEMPLATE_ID" => Some("tpl".to_string()),
        "EMAILJS_PUBLIC_KEY" => Some("key".to_string()),
        _ => None,
    });

    let creds = cfg.relay_credentials().unwrap();
    assert_eq!(creds.service_id, "from_env");
    assert_eq!(creds.template_id, "tpl");
}

#[test]
fn memory_storage_kind() {
    let cfg = Config::from_yaml("storage:\n  kind: memory\n").unwrap();
    assert_eq!(cfg.storage, StorageCfg::Memory);
}

#[test]
fn sqlite_kind_takes_a_connection_url() {
    let cfg = Config::from_yaml("storage:\n  kind: sqlite\n").unwrap();
    assert_eq!(cfg.storage, StorageCfg::Sqlite { url: None });

    let cfg = Config::from_yaml("storage:\n  kind: file\n  path: /tmp/state.json\n").unwrap();
    assert_eq!(
        cfg.storage,
        StorageCfg::File {
            path: Some("/tmp/state.json".into())
        }
    );
}
