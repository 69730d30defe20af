use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;
use tickswapr_guard::config::Settings;

#[test]
fn missing_file_falls_back_to_defaults() {
    let s = Settings::load_with("test", Path::new("config/does-not-exist.toml")).unwrap();
    assert_eq!(s.env, "test");
    assert_eq!(s.app.name, "TickSwapr");
    assert_eq!(s.guard.message_sample_chars, 100);
    assert_eq!(s.guard.max_violations_per_user, 50);
}

#[test]
fn toml_overrides_and_sanitizes() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[app]
name = "TixSafe"

[http]
bind = "0.0.0.0:9000"
admin_token = "abc"

[guard]
message_sample_chars = 0
max_violations_per_user = 10
recent_violations = 25
"#
    )
    .unwrap();

    let s = Settings::load_with("staging", file.path()).unwrap();
    assert_eq!(s.env, "staging");
    assert_eq!(s.app.name, "TixSafe");
    assert_eq!(s.http.bind, "0.0.0.0:9000");
    assert_eq!(s.http.admin_token.as_deref(), Some("abc"));
    assert_eq!(s.guard.message_sample_chars, 1);
    assert_eq!(s.guard.max_violations_per_user, 10);
    assert_eq!(s.guard.recent_violations, 10);
}

#[test]
fn blank_admin_token_disables_admin_surface() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[http]\nbind = \"127.0.0.1:1\"\nadmin_token = \"   \"").unwrap();
    let s = Settings::load_with("test", file.path()).unwrap();
    assert!(s.http.admin_token.is_none());
}
