use super::*;

use std::{
    collections::HashMap,
    env,
    sync::atomic::{AtomicUsize, Ordering},
    time::{SystemTime, UNIX_EPOCH},
};

static NEXT_CONFIG: AtomicUsize = AtomicUsize::new(0);

fn temp_config(contents: &str) -> PathBuf {
    let suffix = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock")
        .as_nanos();
    let n = NEXT_CONFIG.fetch_add(1, Ordering::Relaxed);
    let path = env::temp_dir().join(format!("orac_ctl_bridge_test_{suffix}_{n}.toml"));
    fs::write(&path, contents).expect("write config");
    path
}

fn no_env(_: &str) -> Option<String> {
    None
}

#[test]
fn defaults_match_the_stock_setup() {
    let settings = Settings::default();
    assert_eq!(settings.remote_host, "127.0.0.1");
    assert_eq!(settings.remote_port, 6100);
    assert_eq!(settings.listen_port, 6111);
    assert_eq!(settings.device_filter, "ORAC-CTL");
    assert_eq!(settings.quiet_window(), Duration::from_millis(200));
    settings.validate().expect("defaults are valid");
}

#[test]
fn file_values_override_defaults() {
    let path = temp_config("remote_port = 7000\ndevice_filter = \"Midiboy\"\n");

    let settings = load_settings_with(Some(path.as_path()), no_env).expect("load");
    assert_eq!(settings.remote_port, 7000);
    assert_eq!(settings.device_filter, "Midiboy");
    assert_eq!(settings.listen_port, 6111);

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn environment_overrides_file() {
    let path = temp_config("remote_host = \"10.0.0.2\"\nlisten_port = 7111\n");
    let vars = HashMap::from([
        ("BRIDGE_LISTEN_PORT", "8111"),
        ("BRIDGE_QUIET_WINDOW_MS", "350"),
    ]);

    let settings = load_settings_with(Some(path.as_path()), |key| {
        vars.get(key).map(|v| v.to_string())
    })
    .expect("load");
    assert_eq!(settings.remote_host, "10.0.0.2");
    assert_eq!(settings.listen_port, 8111);
    assert_eq!(settings.quiet_window(), Duration::from_millis(350));

    fs::remove_file(path).expect("cleanup");
}

#[test]
fn invalid_environment_values_are_reported() {
    let path = temp_config("");
    let err = load_settings_with(Some(path.as_path()), |key| {
        (key == "BRIDGE_REMOTE_PORT").then(|| "70000".to_string())
    })
    .expect_err("port out of range");
    assert!(err.to_string().contains("BRIDGE_REMOTE_PORT"), "{err}");
    fs::remove_file(path).expect("cleanup");
}

#[test]
fn unknown_file_keys_are_rejected() {
    let path = temp_config("remote_prot = 7000\n");
    let err = load_settings_with(Some(path.as_path()), no_env).expect_err("typo");
    assert!(format!("{err:#}").contains("remote_prot"), "{err:#}");
    fs::remove_file(path).expect("cleanup");
}

#[test]
fn explicit_config_path_must_exist() {
    let missing = env::temp_dir().join("orac_ctl_bridge_missing_config.toml");
    let err = load_settings_with(Some(missing.as_path()), no_env).expect_err("missing file");
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn zero_quiet_window_is_invalid() {
    let settings = Settings {
        quiet_window_ms: 0,
        ..Settings::default()
    };
    assert!(settings.validate().is_err());
}
