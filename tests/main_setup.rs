use console_router::{AppConfig, config::Env};
use serial_test::serial;
use std::{env, panic};
use uuid::Uuid;

// --- Setup/Teardown Utilities ---

const CONFIG_VARS: [&str; 5] = [
    "APP_ENV",
    "CONSOLE_JWT_SECRET",
    "CONSOLE_BASE_PATH",
    "CONSOLE_BIND_ADDR",
    "CONSOLE_ADMIN_IDS",
];

/// Runs `test` with `vars` set (and every other config variable cleared), then restores
/// the previous environment, even if the test panics.
fn run_with_env<T, R>(vars: &[(&str, &str)], test: T) -> R
where
    T: FnOnce() -> R + panic::UnwindSafe,
{
    let originals: Vec<(&str, Option<String>)> = CONFIG_VARS
        .iter()
        .map(|&var| (var, env::var(var).ok()))
        .collect();

    unsafe {
        for var in CONFIG_VARS {
            env::remove_var(var);
        }
        for (key, value) in vars {
            env::set_var(key, value);
        }
    }

    let result = panic::catch_unwind(test);

    for (key, original_value) in originals {
        unsafe {
            match original_value {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }

    match result {
        Ok(value) => value,
        Err(e) => panic::resume_unwind(e),
    }
}

// --- Tests ---

#[test]
#[serial]
fn test_app_config_production_fail_fast() {
    let result = run_with_env(&[("APP_ENV", "production")], || {
        panic::catch_unwind(AppConfig::load).is_err()
    });

    assert!(result, "Production config loading should panic without a JWT secret");
}

#[test]
#[serial]
fn test_app_config_production_with_secret() {
    let config = run_with_env(
        &[
            ("APP_ENV", "production"),
            ("CONSOLE_JWT_SECRET", "prod-secret"),
            ("CONSOLE_BASE_PATH", "/console"),
        ],
        AppConfig::load,
    );

    assert_eq!(config.env, Env::Production);
    assert_eq!(config.jwt_secret, "prod-secret");
    assert_eq!(config.base_path, "/console");
}

#[test]
#[serial]
fn test_app_config_local_env_defaults() {
    let config = run_with_env(&[("APP_ENV", "local")], AppConfig::load);

    assert_eq!(config.env, Env::Local);
    assert_eq!(config.jwt_secret, "console-router-local-secret");
    assert_eq!(config.base_path, "/");
    assert_eq!(config.bind_addr, "0.0.0.0:3000");
    assert!(config.admin_ids.is_empty());
}

#[test]
#[serial]
fn test_app_config_parses_admin_ids() {
    let a = Uuid::from_u128(7);
    let b = Uuid::from_u128(8);
    let raw = format!("{a}, {b},");

    let config = run_with_env(&[("CONSOLE_ADMIN_IDS", raw.as_str())], AppConfig::load);
    assert_eq!(config.admin_ids, vec![a, b]);

    let result = run_with_env(&[("CONSOLE_ADMIN_IDS", "not-a-uuid")], || {
        panic::catch_unwind(AppConfig::load).is_err()
    });
    assert!(result, "Malformed admin ids should stop startup");
}
