//! Coverage for `.env` credential loading.

use std::fs;
use std::path::{Path, PathBuf};

use quill::credentials::{load_credentials, OPENAI_API_KEY};

fn write_env(dir: &Path, contents: &str) -> PathBuf {
    let path = dir.join(".env");
    fs::write(&path, contents).expect("env file should be written");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(&path, fs::Permissions::from_mode(0o600))
            .expect("permissions should be set");
    }
    path
}

#[test]
fn loads_key_value_pairs() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let path = write_env(
        tmp.path(),
        "OPENAI_API_KEY=sk-test-123\n# comment\nQUILL_EXTRA=\"quoted value\"\n",
    );

    let credentials = load_credentials(&path).expect("credentials should load");
    assert_eq!(credentials.get(OPENAI_API_KEY), Some("sk-test-123"));
    assert_eq!(credentials.get("QUILL_EXTRA"), Some("quoted value"));
    assert_eq!(credentials.get("MISSING"), None);
}

#[test]
fn env_overlay_beats_file() {
    let tmp = tempfile::tempdir().expect("temp dir");
    let path = write_env(tmp.path(), "OPENAI_API_KEY=from-file\n");

    let mut credentials = load_credentials(&path).expect("credentials should load");
    credentials.overlay_env(|key| (key == OPENAI_API_KEY).then(|| "from-env".to_owned()));
    assert_eq!(credentials.get(OPENAI_API_KEY), Some("from-env"));
}

#[test]
fn missing_file_is_an_error() {
    let tmp = tempfile::tempdir().expect("temp dir");
    assert!(load_credentials(&tmp.path().join(".env")).is_err());
}

#[cfg(unix)]
#[test]
fn rejects_group_readable_file() {
    use std::os::unix::fs::PermissionsExt;

    let tmp = tempfile::tempdir().expect("temp dir");
    let path = write_env(tmp.path(), "OPENAI_API_KEY=sk-test\n");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o640)).expect("chmod");

    let err = load_credentials(&path).expect_err("broad permissions should be rejected");
    assert!(err.to_string().contains("must be 0600"));
}
