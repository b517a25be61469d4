//! Integration tests for podcdn

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Command isolated from the user's config and repositories
    fn podcdn(home: &Path) -> Command {
        let mut cmd = cargo_bin_cmd!("podcdn");
        cmd.env("PODCDN_CONFIG", home.join("config.toml"))
            .env_remove("PODCDN_REPO");
        cmd
    }

    /// A source whose CDN is never reachable
    fn offline_source(home: &Path) -> std::path::PathBuf {
        let root = home.join("trunk");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join(".url"), "http://127.0.0.1:9/\n").unwrap();
        root
    }

    #[test]
    fn help_displays() {
        let home = TempDir::new().unwrap();
        podcdn(home.path())
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("CDN-hosted pod spec repositories"));
    }

    #[test]
    fn version_displays() {
        let home = TempDir::new().unwrap();
        podcdn(home.path())
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("podcdn"));
    }

    #[test]
    fn config_path() {
        let home = TempDir::new().unwrap();
        podcdn(home.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("config.toml"));
    }

    #[test]
    fn config_show() {
        let home = TempDir::new().unwrap();
        podcdn(home.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("[cdn]"))
            .stdout(predicate::str::contains("default_source = \"trunk\""));
    }

    #[test]
    fn config_set_persists() {
        let home = TempDir::new().unwrap();
        podcdn(home.path())
            .args(["config", "set", "cdn.max_workers", "12"])
            .assert()
            .success();

        podcdn(home.path())
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("max_workers = 12"));
    }

    #[test]
    fn config_set_unknown_key() {
        let home = TempDir::new().unwrap();
        podcdn(home.path())
            .args(["config", "set", "cdn.nope", "1"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unknown config key"));
    }

    #[test]
    fn add_creates_source() {
        let home = TempDir::new().unwrap();
        let repos = home.path().join("repos");
        podcdn(home.path())
            .args(["config", "set", "cdn.repos_dir"])
            .arg(&repos)
            .assert()
            .success();

        podcdn(home.path())
            .args(["add", "trunk", "https://cdn.example/"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Added source trunk"));

        let url = fs::read_to_string(repos.join("trunk").join(".url")).unwrap();
        assert_eq!(url, "https://cdn.example/");

        podcdn(home.path())
            .args(["add", "trunk", "https://cdn.example/"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Source already exists"));
    }

    #[test]
    fn add_rejects_bad_url() {
        let home = TempDir::new().unwrap();
        podcdn(home.path())
            .args(["add", "trunk", "ftp://cdn.example/"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid CDN URL"));
    }

    #[test]
    fn missing_source_has_hint() {
        let home = TempDir::new().unwrap();
        podcdn(home.path())
            .arg("--repo")
            .arg(home.path().join("absent"))
            .arg("info")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Unable to find a source"))
            .stderr(predicate::str::contains("podcdn add"));
    }

    #[test]
    fn info_describes_source() {
        let home = TempDir::new().unwrap();
        let root = offline_source(home.path());
        podcdn(home.path())
            .arg("--repo")
            .arg(&root)
            .arg("info")
            .assert()
            .success()
            .stdout(predicate::str::contains("CDN"))
            .stdout(predicate::str::contains("http://127.0.0.1:9/"))
            .stdout(predicate::str::contains("never"));
    }

    #[test]
    fn empty_pod_name_is_rejected_offline() {
        let home = TempDir::new().unwrap();
        let root = offline_source(home.path());
        podcdn(home.path())
            .arg("--repo")
            .arg(&root)
            .args(["versions", ""])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid argument"));
    }

    #[test]
    fn empty_version_is_rejected_offline() {
        let home = TempDir::new().unwrap();
        let root = offline_source(home.path());
        podcdn(home.path())
            .arg("--repo")
            .arg(&root)
            .args(["spec", "Foo", ""])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Invalid argument"));
    }

    #[test]
    fn full_text_search_is_unsupported() {
        let home = TempDir::new().unwrap();
        let root = offline_source(home.path());
        podcdn(home.path())
            .arg("--repo")
            .arg(&root)
            .args(["search", "networking", "--full-text"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Can't search by full text"));
    }

    #[test]
    fn update_reports_up_to_date() {
        let home = TempDir::new().unwrap();
        let root = offline_source(home.path());
        podcdn(home.path())
            .arg("--repo")
            .arg(&root)
            .arg("update")
            .assert()
            .success()
            .stdout(predicate::str::contains("up to date"));
    }

    #[test]
    fn unreachable_cdn_fails() {
        let home = TempDir::new().unwrap();
        let root = offline_source(home.path());
        podcdn(home.path())
            .arg("--repo")
            .arg(&root)
            .arg("pods")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Request to http://127.0.0.1:9/all_pods.txt failed"));
    }
}

mod source_tests {
    use async_trait::async_trait;
    use podcdn::cdn::{
        CdnSource, ConditionalHeaders, FetchOutcome, HttpClient, HttpResponse, SourceOptions,
    };
    use podcdn::{CdnError, CdnResult};
    use std::collections::HashMap;
    use std::fs;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use tempfile::TempDir;

    const BASE: &str = "https://specs.example/";

    /// Static file server keyed by relative path
    #[derive(Default)]
    struct StaticCdn {
        files: Mutex<HashMap<String, (String, String)>>,
        requests: Mutex<Vec<(String, Option<String>)>>,
    }

    impl StaticCdn {
        fn put(&self, relative: &str, body: &str, etag: &str) {
            self.files
                .lock()
                .unwrap()
                .insert(relative.to_string(), (body.to_string(), etag.to_string()));
        }

        fn request_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        fn conditional_requests(&self) -> usize {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, etag)| etag.is_some())
                .count()
        }
    }

    #[async_trait]
    impl HttpClient for StaticCdn {
        async fn get(&self, url: &str, conditional: &ConditionalHeaders) -> CdnResult<HttpResponse> {
            self.requests
                .lock()
                .unwrap()
                .push((url.to_string(), conditional.if_none_match.clone()));

            let relative = url.strip_prefix(BASE).unwrap_or(url);
            let file = self.files.lock().unwrap().get(relative).cloned();
            Ok(match file {
                None => HttpResponse::status(404),
                Some((_, etag)) if conditional.if_none_match.as_deref() == Some(etag.as_str()) => {
                    HttpResponse::not_modified()
                }
                Some((body, etag)) => HttpResponse::ok(body, Some(&etag)),
            })
        }
    }

    fn catalog() -> Arc<StaticCdn> {
        let cdn = Arc::new(StaticCdn::default());
        cdn.put("CocoaPods-version.yml", "---\nmin: 1.0.0\n", "\"v\"");
        cdn.put("deprecated_podspecs.txt", "", "\"d\"");
        cdn.put("all_pods.txt", "Alamofire\nFoo\n", "\"a\"");
        cdn.put("Specs/Foo/index.txt", "1.0.0\n1.1.0\n.hidden\n", "\"i\"");
        cdn.put("Specs/Foo/1.0.0/Foo.podspec.json", r#"{"name":"Foo","version":"1.0.0"}"#, "\"f0\"");
        cdn.put("Specs/Foo/1.1.0/Foo.podspec.json", r#"{"name":"Foo","version":"1.1.0"}"#, "\"f1\"");
        cdn
    }

    fn source_root(dir: &TempDir) -> &Path {
        fs::write(dir.path().join(".url"), BASE).unwrap();
        dir.path()
    }

    fn open(root: &Path, cdn: &Arc<StaticCdn>) -> CdnSource {
        CdnSource::open(root, Arc::clone(cdn) as Arc<dyn HttpClient>, SourceOptions::default())
            .unwrap()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn end_to_end_queries() {
        let dir = TempDir::new().unwrap();
        let root = source_root(&dir);
        let cdn = catalog();
        let source = open(root, &cdn);

        let summary = source.refresh().await.unwrap();
        assert_eq!(summary.marker, FetchOutcome::Fetched);

        assert_eq!(source.pods().await.unwrap(), vec!["Alamofire", "Foo"]);

        let versions = source.versions("Foo").await.unwrap().unwrap();
        let names: Vec<&str> = versions.iter().map(|v| v.as_str()).collect();
        assert_eq!(names, vec!["1.1.0", "1.0.0"]);
        assert!(root.join("Specs/Foo/1.0.0/Foo.podspec.json").is_file());
        assert!(root.join("Specs/Foo/1.1.0/Foo.podspec.json").is_file());

        let before = cdn.request_count();
        source.versions("Foo").await.unwrap();
        assert_eq!(cdn.request_count(), before);

        let path = source.specification_path("Foo", "1.0.0").await.unwrap();
        assert!(path.ends_with("Specs/Foo/1.0.0/Foo.podspec.json"));

        let entry = source.search("Foo/Core").await.unwrap().unwrap();
        assert_eq!(entry.name, "Foo");
        assert!(source.versions("Nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn next_run_revalidates_with_etags() {
        let dir = TempDir::new().unwrap();
        let root = source_root(&dir);
        let cdn = catalog();

        let first = open(root, &cdn);
        first.pods().await.unwrap();
        assert_eq!(cdn.conditional_requests(), 0);

        tokio::time::sleep(Duration::from_millis(20)).await;

        let second = open(root, &cdn);
        assert_eq!(second.pods().await.unwrap(), vec!["Alamofire", "Foo"]);
        assert_eq!(cdn.conditional_requests(), 1);
        assert_eq!(
            fs::read_to_string(root.join("all_pods.etag")).unwrap(),
            "\"a\""
        );
    }

    #[tokio::test]
    async fn unsupported_operations() {
        let dir = TempDir::new().unwrap();
        let source = open(source_root(&dir), &catalog());

        assert!(matches!(
            source.all_specifications(),
            Err(CdnError::Unsupported { .. })
        ));
        assert!(matches!(
            source.search_by_full_text("Foo"),
            Err(CdnError::Unsupported { .. })
        ));
        assert!(source.update().await.unwrap().is_empty());
        assert!(!source.is_git());
        assert!(!source.is_indexable());
    }

    #[tokio::test]
    async fn missing_specification_is_an_error() {
        let dir = TempDir::new().unwrap();
        let source = open(source_root(&dir), &catalog());

        let err = source.specification_path("Foo", "9.9.9").await.unwrap_err();
        assert!(matches!(err, CdnError::SpecificationNotFound { .. }));
        assert!(!err.is_retryable());
    }
}
