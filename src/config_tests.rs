//! Unit tests for configuration structures and parsing.

#[cfg(test)]
mod config_tests {
    use crate::config::*;
    use crate::error::ConfigError;

    // ============= AppConfig Tests =============

    #[test]
    fn test_minimal_config_uses_defaults() {
        let yaml = r#"
base_url: "http://localhost:8000/pyalgotrade_web/"
"#;
        let config = AppConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.channel.csrf_cookie, "csrftoken");
        assert_eq!(config.channel.request_timeout_secs, 120);
        assert_eq!(config.channel.connect_timeout_secs, 10);
        assert!(config.channel.cookies.is_none());
        assert_eq!(config.single_flight, SingleFlightPolicy::Reject);
        assert_eq!(config.chart_id, "chartdiv");
        assert_eq!(config.default_filename, "Strategy.py");
        assert_eq!(config.save_dir, ".");
        assert_eq!(config.annotations, AnnotationStyle::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_full_config_deserialize() {
        let yaml = r##"
base_url: "https://desk.example.com/app"
channel:
  csrf_cookie: "xsrf"
  request_timeout_secs: 30
  connect_timeout_secs: 3
  cookies: "xsrf=abc; sessionid=42"
single_flight: queue
chart_id: "mainchart"
annotations:
  graph: "g2"
  buy_color: "#00CC00"
  sell_color: "#CC0000"
default_filename: "MyStrategy.py"
save_dir: "/tmp/strategies"
"##;
        let config = AppConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.channel.csrf_cookie, "xsrf");
        assert_eq!(config.channel.request_timeout().as_secs(), 30);
        assert_eq!(config.channel.connect_timeout().as_secs(), 3);
        assert_eq!(config.channel.cookies.as_deref(), Some("xsrf=abc; sessionid=42"));
        assert_eq!(config.single_flight, SingleFlightPolicy::Queue);
        assert_eq!(config.chart_id, "mainchart");
        assert_eq!(config.annotations.graph, "g2");
        assert_eq!(config.annotations.buy_color, "#00CC00");
        assert_eq!(config.annotations.sell_color, "#CC0000");
        assert_eq!(config.default_filename, "MyStrategy.py");
        assert_eq!(config.save_dir, "/tmp/strategies");
    }

    #[test]
    fn test_missing_base_url_fails() {
        let yaml = r#"
chart_id: "chartdiv"
"#;
        assert!(AppConfig::from_yaml(yaml).is_err());
    }

    #[test]
    fn test_bom_is_stripped() {
        let yaml = "\u{feff}base_url: \"http://localhost:8000/\"\n";
        let config = AppConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.base_url, "http://localhost:8000/");
    }

    #[test]
    fn test_unknown_policy_fails() {
        let yaml = r#"
base_url: "http://localhost:8000/"
single_flight: "drop"
"#;
        assert!(AppConfig::from_yaml(yaml).is_err());
    }

    // ============= Base URL Tests =============

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let config = AppConfig::with_base_url("http://localhost:8000/pyalgotrade_web");
        let url = config.base_url().unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/pyalgotrade_web/");
        assert_eq!(
            url.join("ajax/beginBacktest/").unwrap().as_str(),
            "http://localhost:8000/pyalgotrade_web/ajax/beginBacktest/"
        );
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        let config = AppConfig::with_base_url("not a url");
        assert!(config.validate().is_err());

        let config = AppConfig::with_base_url("mailto:someone@example.com");
        assert!(config.validate().is_err());
    }

    // ============= Validation Tests =============

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = AppConfig::with_base_url("http://localhost:8000/");
        config.channel.request_timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_chart_id_rejected() {
        let mut config = AppConfig::with_base_url("http://localhost:8000/");
        config.chart_id = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_filename_rejected() {
        let mut config = AppConfig::with_base_url("http://localhost:8000/");
        config.default_filename = String::new();
        assert!(config.validate().is_err());
    }

    // ============= AnnotationStyle Tests =============

    #[test]
    fn test_annotation_style_default_colors_match() {
        let style = AnnotationStyle::default();
        assert_eq!(style.graph, "g1");
        assert_eq!(style.buy_color, "#CC0000");
        assert_eq!(style.buy_color, style.sell_color);
    }

    #[test]
    fn test_annotation_style_partial_override() {
        let yaml = r##"
sell_color: "#00CC00"
"##;
        let style: AnnotationStyle = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(style.graph, "g1");
        assert_eq!(style.buy_color, "#CC0000");
        assert_eq!(style.sell_color, "#00CC00");
    }

    // ============= CLI Resolution Tests =============

    fn write_config(dir: &tempfile::TempDir, yaml: &str) -> String {
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, yaml).unwrap();
        path.to_string_lossy().into_owned()
    }

    #[test]
    fn test_resolve_missing_file_uses_env_url() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");

        let config = AppConfig::resolve_with_env(
            missing.to_str().unwrap(),
            None,
            Some("http://env.example/app/".to_string()),
        )
        .unwrap();

        assert_eq!(config.base_url, "http://env.example/app/");
        assert_eq!(config.chart_id, "chartdiv");
    }

    #[test]
    fn test_resolve_flag_beats_env() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");

        let config = AppConfig::resolve_with_env(
            missing.to_str().unwrap(),
            Some("http://flag.example/".to_string()),
            Some("http://env.example/".to_string()),
        )
        .unwrap();

        assert_eq!(config.base_url, "http://flag.example/");
    }

    #[test]
    fn test_resolve_env_overrides_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config(&dir, "base_url: \"http://file.example/\"\nchart_id: \"c2\"\n");

        let config =
            AppConfig::resolve_with_env(&path, None, Some("http://env.example/".to_string())).unwrap();
        assert_eq!(config.base_url, "http://env.example/");
        assert_eq!(config.chart_id, "c2");

        let config = AppConfig::resolve_with_env(&path, None, None).unwrap();
        assert_eq!(config.base_url, "http://file.example/");
    }

    #[test]
    fn test_resolve_missing_file_without_url_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");

        let result = AppConfig::resolve_with_env(missing.to_str().unwrap(), None, None);
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }

    #[test]
    fn test_resolve_validates_override() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");

        let result =
            AppConfig::resolve_with_env(missing.to_str().unwrap(), Some("not a url".to_string()), None);
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
