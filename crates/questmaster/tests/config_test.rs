//! Tests for layered configuration.

use questmaster::{QuestConfig, QuestErrorKind};
use std::collections::HashMap;
use std::path::PathBuf;
use tempfile::TempDir;

fn no_env() -> Option<HashMap<String, String>> {
    Some(HashMap::new())
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_bundled_defaults() {
    let config = QuestConfig::load_with(&[], no_env()).unwrap();

    assert_eq!(config.oracle.base_url, "https://api.openai.com/v1");
    assert_eq!(config.oracle.model, "gpt-4o");
    assert_eq!(config.oracle.temperature, 0.0);
    assert_eq!(config.oracle.max_tokens, None);
    assert_eq!(config.oracle.api_key_env, "OPENAI_API_KEY");
    assert_eq!(config.planner.search, "astar(lmcut())");
    assert_eq!(config.planner.plan_file, "sas_plan");
    assert_eq!(config.planner.time_limit_secs, None);
    assert_eq!(config.reflection.max_model_repairs, 3);
    assert_eq!(config.reflection.max_narrative_repairs, 2);
    assert!(!config.reflection.skip_story_generation);
    assert_eq!(config.store.session, "default");
    assert_eq!(config.server.port, 8000);
}

#[test]
fn test_missing_files_are_skipped() {
    let dir = TempDir::new().unwrap();
    let config =
        QuestConfig::load_with(&[dir.path().join("absent.toml")], no_env()).unwrap();
    assert_eq!(config.oracle.model, "gpt-4o");
}

#[test]
fn test_later_files_override_earlier() {
    let dir = TempDir::new().unwrap();
    let home = write(
        &dir,
        "home.toml",
        "[oracle]\nmodel = \"gpt-4o-mini\"\nmax_tokens = 2048\n\n[planner]\ntime_limit_secs = 300\n",
    );
    let local = write(&dir, "local.toml", "[oracle]\nmodel = \"local-llama\"\n");

    let config = QuestConfig::load_with(&[home, local], no_env()).unwrap();

    assert_eq!(config.oracle.model, "local-llama");
    assert_eq!(config.oracle.max_tokens, Some(2048));
    assert_eq!(config.planner.time_limit_secs, Some(300));
    // Untouched keys keep the bundled value
    assert_eq!(config.planner.search, "astar(lmcut())");
}

#[test]
fn test_environment_overrides_files() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "local.toml", "[loop]\nmax_model_repairs = 5\n");
    let env = HashMap::from([
        ("QUESTMASTER_LOOP__MAX_MODEL_REPAIRS".to_string(), "7".to_string()),
        ("QUESTMASTER_STORE__SESSION".to_string(), "castle".to_string()),
        ("QUESTMASTER_PLANNER__PLAN_FILE".to_string(), "castle_plan".to_string()),
    ]);

    let config = QuestConfig::load_with(&[file], Some(env)).unwrap();

    assert_eq!(config.reflection.max_model_repairs, 7);
    assert_eq!(config.store.session, "castle");
    assert_eq!(config.planner.plan_file, "castle_plan");
}

#[test]
fn test_from_file_requires_existing_file() {
    let dir = TempDir::new().unwrap();
    let err = QuestConfig::from_file(dir.path().join("missing.toml")).unwrap_err();
    assert!(matches!(err.kind(), QuestErrorKind::Config(_)));
}

#[test]
fn test_invalid_session_is_rejected() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "bad.toml", "[store]\nsession = \"../escape\"\n");

    let err = QuestConfig::load_with(&[file], no_env()).unwrap_err();
    match err.kind() {
        QuestErrorKind::Config(e) => assert!(e.message.contains("store.session")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_malformed_value_is_config_error() {
    let dir = TempDir::new().unwrap();
    let file = write(&dir, "bad.toml", "[server]\nport = \"not a port\"\n");

    let err = QuestConfig::load_with(&[file], no_env()).unwrap_err();
    assert!(matches!(err.kind(), QuestErrorKind::Config(_)));
}

#[test]
fn test_settings_convert_to_components() {
    let dir = TempDir::new().unwrap();
    let file = write(
        &dir,
        "local.toml",
        "[oracle]\nmax_tokens = 512\n\n[planner]\ncommand = \"fd\"\nargs = [\"--alias\", \"lama-first\"]\ntime_limit_secs = 60\n\n[loop]\nmax_model_repairs = 1\nmax_narrative_repairs = 0\n",
    );
    let config = QuestConfig::load_with(&[file], no_env()).unwrap();

    let oracle = config.oracle.to_openai().unwrap();
    assert_eq!(oracle.model(), "gpt-4o");
    assert_eq!(*oracle.max_tokens(), Some(512));

    let planner = config.planner.to_fast_downward(dir.path()).unwrap();
    assert_eq!(planner.command(), "fd");
    assert_eq!(planner.args(), &vec!["--alias".to_string(), "lama-first".to_string()]);
    assert_eq!(*planner.time_limit_secs(), Some(60));
    assert_eq!(planner.work_dir(), &dir.path().to_path_buf());

    let budgets = config.reflection.to_loop_config().unwrap();
    assert_eq!(*budgets.max_model_repairs(), 1);
    assert_eq!(*budgets.max_narrative_repairs(), 0);
}

#[test]
fn test_session_dir_joins_root_and_session() {
    let config = QuestConfig::load_with(&[], no_env()).unwrap();
    assert_eq!(config.session_dir(), PathBuf::from("sessions").join("default"));
}
