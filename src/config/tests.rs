use super::*;

fn raw_with_api() -> RawSettings {
    let mut raw = RawSettings::default();
    raw.api.base_url = Some("http://localhost:4000/api".to_string());
    raw
}

#[test]
fn cli_overrides_take_highest_precedence() {
    let mut raw = raw_with_api();
    raw.server.public_port = Some(4000);
    raw.logging.level = Some("info".to_string());

    let overrides = ServeOverrides {
        public_port: Some(4321),
        log_level: Some("debug".to_string()),
        api_base_url: Some("https://blog.example.com/v1".to_string()),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert_eq!(settings.server.public_addr.port(), 4321);
    assert_eq!(settings.logging.level, LevelFilter::DEBUG);
    assert_eq!(
        settings.api.base_url.as_str(),
        "https://blog.example.com/v1"
    );
}

#[test]
fn defaults_fill_everything_but_the_api_url() {
    let settings = Settings::from_raw(raw_with_api()).expect("valid settings");

    assert_eq!(settings.server.public_addr.to_string(), "127.0.0.1:3000");
    assert!(matches!(settings.logging.format, LogFormat::Compact));
    assert!(settings.cache.enabled);
    assert!(settings.cache.warm_on_startup);
    assert_eq!(settings.cache.entry_limit.get(), DEFAULT_CACHE_ENTRY_LIMIT);
    assert_eq!(
        crate::cache::CacheConfig::from(&settings.cache),
        crate::cache::CacheConfig::default()
    );
    assert_eq!(settings.site.title, "Folio");
    assert!(settings.api.user_agent.is_none());
}

#[test]
fn missing_api_url_is_rejected() {
    let err = Settings::from_raw(RawSettings::default()).expect_err("api url required");
    assert!(matches!(err, LoadError::Invalid { key: "api.base_url", .. }));

    let mut blank = RawSettings::default();
    blank.api.base_url = Some("   ".to_string());
    assert!(Settings::from_raw(blank).is_err());
}

#[test]
fn non_http_api_urls_are_rejected() {
    let mut raw = RawSettings::default();
    raw.api.base_url = Some("ftp://files.example.com".to_string());
    let err = Settings::from_raw(raw).expect_err("scheme rejected");
    assert!(err.to_string().contains("unsupported scheme"));
}

#[test]
fn zero_cache_limits_are_rejected() {
    let mut raw = raw_with_api();
    raw.cache.entry_limit = Some(0);
    assert!(Settings::from_raw(raw).is_err());

    let mut raw = raw_with_api();
    raw.cache.warm_concurrency = Some(0);
    assert!(Settings::from_raw(raw).is_err());

    let mut raw = raw_with_api();
    raw.cache.warm_concurrency = Some(MAX_CACHE_WARM_CONCURRENCY + 1);
    assert!(Settings::from_raw(raw).is_err());
}

#[test]
fn cli_json_logging_enforces_format() {
    let mut raw = raw_with_api();
    let overrides = ServeOverrides {
        log_json: Some(true),
        ..Default::default()
    };

    raw.apply_serve_overrides(&overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(matches!(settings.logging.format, LogFormat::Json));
}

#[test]
fn cache_can_be_disabled_from_the_cli() {
    let args = CliArgs::parse_from([
        "folio",
        "serve",
        "--cache-enabled",
        "false",
        "--cache-warm-on-startup",
        "no",
    ]);

    let Some(Command::Serve(serve)) = args.command else {
        panic!("serve command expected");
    };
    let mut raw = raw_with_api();
    raw.apply_serve_overrides(&serve.overrides);
    let settings = Settings::from_raw(raw).expect("valid settings");

    assert!(!settings.cache.enabled);
    assert!(!settings.cache.warm_on_startup);
}

#[test]
fn default_to_serve_command() {
    let args = CliArgs::parse_from(["folio"]);
    let command = args
        .command
        .unwrap_or(Command::Serve(Box::<ServeArgs>::default()));
    assert!(matches!(command, Command::Serve(_)));
}

#[test]
fn parse_serve_overrides() {
    let args = CliArgs::parse_from([
        "folio",
        "serve",
        "--server-host",
        "0.0.0.0",
        "--api-base-url",
        "http://api.internal:8080",
    ]);

    match args.command.expect("serve command") {
        Command::Serve(serve) => {
            assert_eq!(serve.overrides.server_host.as_deref(), Some("0.0.0.0"));
            assert_eq!(
                serve.overrides.api_base_url.as_deref(),
                Some("http://api.internal:8080")
            );
        }
    }
}
