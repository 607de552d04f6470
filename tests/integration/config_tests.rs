use figment::providers::{Env, Serialized};
use figment::Figment;
use mediasync::config::{Config, ENV_PREFIX};
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::tempdir;

// Environment variables are process-wide
static ENV_MUTEX: Mutex<()> = Mutex::new(());

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert!(!config.follow_symlinks);
    assert!(!config.skip_hidden);
    assert!(config.mark_scripts_executable);
    assert_eq!(config.output_dir, None);
}

#[test]
fn test_config_load_from_toml() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    fs::write(
        &config_path,
        r#"
skip_hidden = true
output_dir = "/var/tmp/sync"
mark_scripts_executable = false
"#,
    )
    .unwrap();

    let config = Config::load_from_path(&config_path);
    assert!(config.skip_hidden);
    assert!(!config.follow_symlinks);
    assert!(!config.mark_scripts_executable);
    assert_eq!(config.output_dir, Some(PathBuf::from("/var/tmp/sync")));
    assert!(!config.compare_options().mark_executable);
    assert!(config.walker_config().skip_hidden);
}

#[test]
fn test_config_env_overrides_file() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "follow_symlinks = false\n").unwrap();

    std::env::set_var("MEDIASYNC_FOLLOW_SYMLINKS", "true");
    let config = Config::load_from_path(&config_path);
    std::env::remove_var("MEDIASYNC_FOLLOW_SYMLINKS");

    assert!(config.follow_symlinks);
}

#[test]
fn test_config_env_prefix() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    std::env::set_var("MEDIASYNC_SKIP_HIDDEN", "true");

    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));
    let config: Config = figment.extract().unwrap();

    std::env::remove_var("MEDIASYNC_SKIP_HIDDEN");
    assert!(config.skip_hidden);
}

#[test]
fn test_invalid_toml_falls_back_to_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "skip_hidden = \"sometimes\"\n[[[").unwrap();

    assert_eq!(Config::load_from_path(&config_path), Config::default());
}

#[test]
fn test_missing_file_uses_defaults() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp_dir = tempdir().unwrap();

    let config = Config::load(Some(&temp_dir.path().join("absent.toml")));
    assert_eq!(config, Config::default());
}

#[test]
fn test_written_config_loads_back() {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let config = Config {
        follow_symlinks: true,
        skip_hidden: true,
        output_dir: Some(PathBuf::from("/srv/out")),
        mark_scripts_executable: false,
    };
    fs::write(&config_path, toml::to_string_pretty(&config).unwrap()).unwrap();

    assert_eq!(Config::load_from_path(&config_path), config);
}
