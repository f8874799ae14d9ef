use std::env;
use std::sync::Mutex;

use caption_forge::AppConfig;

static ENV_LOCK: Mutex<()> = Mutex::new(());

fn clear_override_vars() {
    env::remove_var("STARTER_DAILY_QUOTA");
    env::remove_var("GENERATION_TEMPERATURE");
    env::remove_var("OPENAI_API_BASE");
    env::remove_var("OPENAI_MODEL");
}

#[test]
fn missing_file_loads_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_override_vars();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("caption.toml");

    let (config, loaded_path) = AppConfig::load(Some(path.clone())).unwrap();

    assert_eq!(loaded_path, Some(path));
    assert_eq!(config.quota.starter_daily, 5);
    assert_eq!(config.quota.pro_daily, None);
    assert_eq!(config.generator.model, "gpt-4.1-mini");
    assert_eq!(config.generator.api_base, "https://api.openai.com/v1");
    assert!((config.generator.temperature - 0.8).abs() < 1e-9);
    assert!((config.scoring.clarity.base - 7.0).abs() < 1e-9);
    assert_eq!(config.scoring.clarity.short_limit, 120);
    assert!(config
        .scoring
        .engagement
        .emoji_set
        .contains(&"🔥".to_string()));
}

#[test]
fn partial_file_keeps_other_defaults() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_override_vars();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("caption.toml");
    std::fs::write(
        &path,
        "[quota]\nstarter_daily = 3\n\n[generator]\ntemperature = 0.4\n",
    )
    .unwrap();

    let (config, _) = AppConfig::load(Some(path)).unwrap();

    assert_eq!(config.quota.starter_daily, 3);
    assert!((config.generator.temperature - 0.4).abs() < 1e-9);
    assert_eq!(config.generator.model, "gpt-4.1-mini");
    assert!((config.scoring.engagement.base - 6.0).abs() < 1e-9);
}

#[test]
fn rule_tables_are_editable_as_data() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_override_vars();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("caption.toml");
    std::fs::write(
        &path,
        r#"
[scoring.engagement.cta]
bonus = 2.0
phrases = ["swipe up"]
"#,
    )
    .unwrap();

    let (config, _) = AppConfig::load(Some(path)).unwrap();

    let score = config.scoring.score("Swipe up for the full story");
    assert!((score.engagement - 8.0).abs() < 1e-9);
    assert!((config.scoring.clarity.base - 7.0).abs() < 1e-9);
}

#[test]
fn write_then_load_preserves_changes() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_override_vars();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("caption.toml");

    let mut config = AppConfig::default();
    config.quota.starter_daily = 9;
    config.scoring.clarity.short_limit = 100;
    config.write(&path).unwrap();

    let (reloaded, _) = AppConfig::load(Some(path)).unwrap();

    assert_eq!(reloaded.quota.starter_daily, 9);
    assert_eq!(reloaded.scoring.clarity.short_limit, 100);
}

#[test]
fn env_overrides_apply_on_load() {
    let _guard = ENV_LOCK.lock().unwrap();
    clear_override_vars();
    env::set_var("STARTER_DAILY_QUOTA", "2");
    env::set_var("OPENAI_MODEL", "gpt-4.1");

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("caption.toml");

    let (config, _) = AppConfig::load(Some(path)).unwrap();
    clear_override_vars();

    assert_eq!(config.quota.starter_daily, 2);
    assert_eq!(config.generator.model, "gpt-4.1");
}
