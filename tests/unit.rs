use gistsel::{
    Config, ConfigBuilder, File, GistError, ID_LENGTH, Item, Items, RawFile, RawItem, Settings,
    convert_items, is_runnable, item_url, shorten_id,
};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

fn raw(id: &str, public: bool, files: &[&str]) -> RawItem {
    RawItem {
        id: id.into(),
        short_id: None,
        description: format!("desc {}", id),
        public,
        files: files
            .iter()
            .map(|f| RawFile {
                filename: f.to_string(),
                content: format!("content of {}", f),
            })
            .collect(),
    }
}

fn settings() -> Settings {
    Settings::new("https://gist.github.com", "/tmp/mirror").unwrap()
}

fn ids(items: &Items) -> Vec<&str> {
    items.iter().map(|i| i.id.as_str()).collect()
}

#[test]
fn test_convert_preserves_order_and_derives_paths() {
    let raws = vec![
        raw("bbb", true, &["b.sh"]),
        raw("aaa", false, &["a.py", "b.txt"]),
        raw("bbb", true, &["b.sh"]),
    ];
    let items = convert_items(raws, &settings()).unwrap();
    assert_eq!(ids(&items), ["bbb", "aaa", "bbb"]);
    let aaa = &items[1];
    assert_eq!(aaa.url, "https://gist.github.com/aaa");
    assert_eq!(aaa.path, Path::new("/tmp/mirror/aaa"));
    assert_eq!(aaa.files[1].path, Path::new("/tmp/mirror/aaa/b.txt"));
    assert_eq!(aaa.files[1].content, "content of b.txt");
    assert!(!aaa.public);
    assert_eq!(aaa.short_id, "aaa");
}

#[test]
fn test_convert_keeps_given_short_id() {
    let mut r = raw("0123456789abcdef", true, &[]);
    r.short_id = Some("custom".into());
    let items = convert_items(vec![r], &settings()).unwrap();
    assert_eq!(items[0].short_id, "custom");
}

#[test]
fn test_item_url_keeps_base_path() {
    let s = Settings::new("https://ghe.example.com/gist", "m").unwrap();
    assert_eq!(item_url(&s, "abc").unwrap(), "https://ghe.example.com/gist/abc");
    let s = Settings::new("https://ghe.example.com/gist/", "m").unwrap();
    assert_eq!(item_url(&s, "abc").unwrap(), "https://ghe.example.com/gist/abc");
}

#[test]
fn test_malformed_base_url_fails_fast() {
    assert!(matches!(
        Settings::new("not a url", "m"),
        Err(GistError::InvalidUrl { .. })
    ));
    assert!(matches!(
        Settings::new("mailto:someone@example.com", "m"),
        Err(GistError::InvalidUrl { .. })
    ));
    let config = ConfigBuilder::new("m").base_url("::").build();
    assert!(config.settings().is_err());
}

#[test]
fn test_shorten_id() {
    assert_eq!(ID_LENGTH, 8);
    assert_eq!(shorten_id("abcdef0123456789"), "abcdef01");
    assert_eq!(shorten_id("abc"), "abc");
    assert_eq!(shorten_id("abcdefgh"), "abcdefgh");
    assert_eq!(shorten_id("日本語日本語"), "日本語日");
    // A wide glyph straddling the limit is dropped.
    assert_eq!(shorten_id("a日本語日本"), "a日本語");
}

#[test]
fn test_unique_keeps_first_occurrence() {
    let raws = vec![
        raw("c", true, &["1"]),
        raw("a", true, &["first"]),
        raw("c", true, &["2"]),
        raw("b", true, &[]),
        raw("a", true, &["second"]),
    ];
    let items = convert_items(raws, &settings()).unwrap();
    let unique = items.unique();
    assert_eq!(ids(&unique), ["c", "a", "b"]);
    assert_eq!(unique[1].files[0].filename, "first");
    assert_eq!(unique.unique(), unique);
    assert_eq!(items.len(), 5);
}

#[test]
fn test_filter_keeps_order_and_is_idempotent() {
    let raws = vec![
        raw("a", true, &[]),
        raw("b", false, &[]),
        raw("c", true, &[]),
        raw("d", false, &[]),
    ];
    let items = convert_items(raws, &settings()).unwrap();
    let public = items.filter(|i| i.public);
    assert_eq!(ids(&public), ["a", "c"]);
    assert_eq!(public.filter(|i| i.public), public);
    assert_eq!(items.len(), 4);
}

#[test]
fn test_one() {
    let items = convert_items(vec![raw("x", true, &[]), raw("y", true, &[])], &settings()).unwrap();
    assert_eq!(items.one().id, "x");
    assert_eq!(Items::default().one(), Item::default());
}

fn render_fixture() -> Items {
    let raws = vec![
        raw("abcdef0123456789", true, &["a.sh", "longer.py"]),
        raw("ffff", false, &["b"]),
    ];
    convert_items(raws, &settings()).unwrap()
}

#[test]
fn test_render_one_line_per_file() {
    let items = render_fixture();
    let columns = Config::default().screen.columns;
    let lines = items.render(&columns);
    assert_eq!(
        lines,
        vec![
            "abcdef01\t  a.sh     \tdesc abcdef0123456789",
            "abcdef01\t  longer.py\tdesc abcdef0123456789",
            "ffff\t* b        \tdesc ffff",
        ]
    );
    let rows = items.rows();
    assert_eq!(rows.len(), lines.len());
    assert_eq!(rows[1].file.filename, "longer.py");
    assert_eq!(rows[2].url(), "https://gist.github.com/ffff");
}

#[test]
fn test_render_defaults_to_id() {
    let lines = render_fixture().render(&[]);
    assert_eq!(lines, vec!["abcdef0123456789", "abcdef0123456789", "ffff"]);
}

#[test]
fn test_render_empty_and_malformed() {
    assert!(Items::default().render(&["{{.ID}}".to_string()]).is_empty());
    let items = render_fixture();
    assert!(items.render(&["{{.ID".to_string()]).is_empty());
    assert!(items.render(&["{{.ID}}".to_string(), "{{.Owner}}".to_string()]).is_empty());
}

#[test]
fn test_is_runnable() {
    let exts = ConfigBuilder::new("m").build().gist.runnable_ext;
    let file = |name: &str| File {
        filename: name.into(),
        ..Default::default()
    };
    assert!(is_runnable(&file("deploy.sh"), &exts));
    assert!(is_runnable(&file("x.py"), &exts));
    assert!(!is_runnable(&file("notes.md"), &exts));
    assert!(!is_runnable(&file("Makefile"), &exts));
}

#[test]
fn test_config_bootstrap_and_reload() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    let config = Config::load_or_init(&path).unwrap();
    assert!(path.exists());
    assert!(dir.path().join("files").is_dir());
    assert_eq!(config.gist.dir, dir.path().join("files"));
    assert_eq!(config.core.tomlfile, path);

    let reloaded = Config::load_or_init(&path).unwrap();
    assert_eq!(reloaded.screen.columns, config.screen.columns);
    assert_eq!(reloaded.gist.base_url, "https://gist.github.com");
    assert_eq!(reloaded.gist.cache_ttl, 24 * 60 * 60);
}

#[test]
fn test_config_partial_file_uses_defaults() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[screen]\ncolumns = [\"{{.ID}}\"]\n").unwrap();
    let config = Config::load_or_init(&path).unwrap();
    assert_eq!(config.screen.columns, vec!["{{.ID}}".to_string()]);
    assert_eq!(config.gist.shell, "sh");
    assert!(config.gist.use_cache);

    fs::write(&path, "[screen\n").unwrap();
    assert!(matches!(
        Config::load_or_init(&path),
        Err(GistError::ConfigParse(_))
    ));
}

#[test]
fn test_config_ignores_retired_keys() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "[flag]\nopen_url = true\nstarred = true\n").unwrap();
    let config = Config::load_or_init(&path).unwrap();
    assert!(config.flag.starred);

    config.save(&path).unwrap();
    let saved = fs::read_to_string(&path).unwrap();
    assert!(!saved.contains("open_url"));
}

#[cfg(unix)]
#[test]
fn test_command_status_errors() {
    use std::process::Command;

    let ok = Command::new("true").status().unwrap();
    assert!(GistError::check_status("true", ok).is_ok());

    let failed = Command::new("false").status().unwrap();
    match GistError::check_status("false", failed) {
        Err(GistError::CommandFailed { program, status }) => {
            assert_eq!(program, "false");
            assert!(!status.success());
        }
        other => panic!("unexpected {:?}", other),
    }

    let missing = Command::new("gistsel-no-such-editor").status().unwrap_err();
    let err = GistError::spawn("gistsel-no-such-editor", missing);
    assert!(
        matches!(err, GistError::Spawn { ref program, .. } if program == "gistsel-no-such-editor")
    );
    assert!(err.to_string().contains("gistsel-no-such-editor"));
}

#[cfg(unix)]
mod execute {
    use gistsel::{EXEC_MODE, File, GistError, OsPermissions, PermissionOps, Runner};
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use tempfile::tempdir;

    // Writing a script and exec'ing it while another test thread forks can
    // fail with ETXTBSY.
    static EXEC_LOCK: Mutex<()> = Mutex::new(());

    #[derive(Clone, Default)]
    struct CountingPerms {
        chmods: Arc<AtomicUsize>,
    }

    impl PermissionOps for CountingPerms {
        fn mode(&self, path: &Path) -> Result<u32, GistError> {
            OsPermissions.mode(path)
        }
        fn set_mode(&self, path: &Path, mode: u32) -> Result<(), GistError> {
            self.chmods.fetch_add(1, Ordering::SeqCst);
            OsPermissions.set_mode(path, mode)
        }
    }

    fn script(dir: &Path, name: &str, body: &str, mode: u32) -> File {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).unwrap();
        File {
            filename: name.into(),
            content: body.into(),
            path,
        }
    }

    fn mode_of(path: &Path) -> u32 {
        fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[test]
    fn test_execute_restores_mode() {
        let _lock = EXEC_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let file = script(
            dir.path(),
            "hello.sh",
            &format!("#!/bin/sh\necho \"$1\" > '{}'\n", out.display()),
            0o644,
        );
        let perms = CountingPerms::default();
        let runner = Runner::with_permissions("sh", perms.clone());
        runner.execute(&file, &["hi there".to_string()]).unwrap();
        assert_eq!(fs::read_to_string(&out).unwrap(), "hi there\n");
        assert_eq!(perms.chmods.load(Ordering::SeqCst), 2);
        assert_eq!(mode_of(&file.path), 0o644);
    }

    #[test]
    fn test_execute_already_executable_skips_chmod() {
        let _lock = EXEC_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir().unwrap();
        let file = script(dir.path(), "ok.sh", "#!/bin/sh\nexit 0\n", EXEC_MODE);
        let perms = CountingPerms::default();
        Runner::with_permissions("sh", perms.clone())
            .execute(&file, &[])
            .unwrap();
        assert_eq!(perms.chmods.load(Ordering::SeqCst), 0);
        assert_eq!(mode_of(&file.path), EXEC_MODE);
    }

    #[test]
    fn test_execute_failure_still_restores_mode() {
        let _lock = EXEC_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let dir = tempdir().unwrap();
        let file = script(dir.path(), "fail.sh", "#!/bin/sh\nexit 3\n", 0o600);
        let perms = CountingPerms::default();
        let err = Runner::with_permissions("sh", perms.clone())
            .execute(&file, &[])
            .unwrap_err();
        assert!(matches!(err, GistError::CommandFailed { .. }));
        assert_eq!(perms.chmods.load(Ordering::SeqCst), 2);
        assert_eq!(mode_of(&file.path), 0o600);
    }

    #[test]
    fn test_execute_missing_file() {
        let dir = tempdir().unwrap();
        let file = File {
            filename: "gone.sh".into(),
            content: String::new(),
            path: dir.path().join("gone.sh"),
        };
        let perms = CountingPerms::default();
        let err = Runner::with_permissions("sh", perms.clone())
            .execute(&file, &[])
            .unwrap_err();
        assert!(matches!(err, GistError::Io { .. }));
        assert_eq!(perms.chmods.load(Ordering::SeqCst), 0);
    }
}
