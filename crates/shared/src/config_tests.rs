use super::*;

const REQUIRED: [(&str, Option<&str>); 2] = [
    ("BENEFIT__DATABASE__URL", Some("postgres://localhost/benefit")),
    ("BENEFIT__JWT__SECRET", Some("secret")),
];

#[test]
fn test_load_from_environment_with_defaults() {
    temp_env::with_vars(REQUIRED, || {
        let config = AppConfig::load().expect("config should load");

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.database.url, "postgres://localhost/benefit");
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.jwt.access_token_expires_minutes, 60);
        assert!(!config.email.enabled);
        assert_eq!(config.benefit.max_upload_size, 10 * 1024 * 1024);
        assert_eq!(config.benefit.min_working_hours, 18);
        assert_eq!(config.benefit.association_form_codes, vec![29]);
        assert_eq!(config.storage, StorageSettings::default());
    });
}

#[test]
fn test_environment_overrides_nested_values() {
    temp_env::with_vars(
        [
            REQUIRED[0],
            REQUIRED[1],
            ("BENEFIT__SERVER__PORT", Some("9000")),
            ("BENEFIT__BENEFIT__MIN_WORKING_HOURS", Some("20")),
            ("BENEFIT__PAYMENT_EXPORT__USERNAME", Some("robot")),
            ("BENEFIT__CASE_SYSTEM__BASE_URL", Some("https://cases.example")),
        ],
        || {
            let config = AppConfig::load().expect("config should load");

            assert_eq!(config.server.port, 9000);
            assert_eq!(config.benefit.min_working_hours, 20);
            assert_eq!(config.payment_export.username, "robot");
            assert_eq!(config.case_system.base_url, "https://cases.example");
            assert_eq!(config.case_system.timeout_secs, 30);
        },
    );
}

#[test]
fn test_missing_database_url_fails() {
    temp_env::with_vars(
        [
            ("BENEFIT__DATABASE__URL", None),
            ("BENEFIT__JWT__SECRET", Some("secret")),
        ],
        || {
            assert!(AppConfig::load().is_err());
        },
    );
}

#[test]
fn test_email_config_default() {
    let config = EmailConfig::default();
    assert_eq!(config.smtp_host, "localhost");
    assert_eq!(config.smtp_port, 1025);
    assert!(!config.enabled);
}
