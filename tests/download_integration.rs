//! End-to-end download behaviour over HTTP: naming, collisions, failures
//! and cancellation.

mod support;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use linkfile_core::download::FetchedResource;
use linkfile_core::{
    BibEntry, Collaborators, CurrentThreadTaskExecutor, DatabaseContext, DownloadError,
    ExternalFileTypes, FilePreferences, HttpClient, LinkedFile, LinkedFileError,
    LinkedFileManager, ScriptedDialog, TaskError, TaskExecutor, TaskStatus, TokioTaskExecutor,
    UrlFetcher, lock_entry, share_entry,
};
use support::socket_guard::{should_skip_socket_bound_test, start_mock_server_or_skip};
use tempfile::TempDir;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn manager_for(
    library_dir: &Path,
    mut entry: BibEntry,
    link: &str,
    dialog: Arc<ScriptedDialog>,
    executor: Arc<dyn TaskExecutor>,
) -> LinkedFileManager {
    let linked = LinkedFile::new("", link, "");
    entry.add_file(linked.clone());
    let preferences = FilePreferences {
        file_name_pattern: "[citationkey]".to_string(),
        file_directory_pattern: "[entrytype]".to_string(),
        ..FilePreferences::default()
    };
    LinkedFileManager::new(
        linked,
        share_entry(entry),
        Arc::new(DatabaseContext::with_database_path(
            library_dir.join("library.bib"),
        )),
        preferences,
        Arc::new(ExternalFileTypes::standard()),
        Collaborators {
            dialog,
            executor,
            fetcher: Arc::new(HttpClient::new()),
        },
    )
}

async fn mount_pdf(server: &MockServer, route: &str, body: &[u8]) -> String {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(body.to_vec())
                .insert_header("Content-Type", "application/pdf"),
        )
        .mount(server)
        .await;
    format!("{}{route}", server.uri())
}

/// Names of all files below `dir`, relative and with `/` separators.
fn tree(dir: &Path) -> Vec<String> {
    fn walk(root: &Path, dir: &Path, out: &mut Vec<String>) {
        for entry in std::fs::read_dir(dir).expect("readable dir") {
            let path = entry.expect("dir entry").path();
            if path.is_dir() {
                walk(root, &path, out);
            } else {
                let relative = path.strip_prefix(root).expect("below root");
                out.push(relative.to_string_lossy().replace('\\', "/"));
            }
        }
    }
    let mut out = Vec::new();
    walk(dir, dir, &mut out);
    out.sort();
    out
}

#[tokio::test]
async fn test_existing_file_is_not_overwritten() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let link = mount_pdf(&server, "/paper.pdf", b"%PDF-new").await;
    let library = TempDir::new().unwrap();
    std::fs::create_dir(library.path().join("Misc")).unwrap();
    std::fs::write(library.path().join("Misc").join("asdf.pdf"), b"%PDF-old").unwrap();

    let manager = manager_for(
        library.path(),
        BibEntry::default().with_citation_key("asdf"),
        &link,
        Arc::new(ScriptedDialog::default()),
        Arc::new(CurrentThreadTaskExecutor),
    );
    assert_eq!(
        manager.download_and_wait().await.unwrap(),
        TaskStatus::Succeeded
    );

    assert_eq!(
        lock_entry(manager.entry()).files(),
        [LinkedFile::new("", "Misc/asdf_2.pdf", "PDF")]
    );
    assert_eq!(
        std::fs::read(library.path().join("Misc").join("asdf.pdf")).unwrap(),
        b"%PDF-old"
    );
    assert_eq!(
        std::fs::read(library.path().join("Misc").join("asdf_2.pdf")).unwrap(),
        b"%PDF-new"
    );
}

#[tokio::test]
async fn test_content_disposition_names_file_without_citation_key() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/download"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF".to_vec())
                .insert_header("Content-Type", "application/pdf")
                .insert_header("Content-Disposition", r#"attachment; filename="Smith2020.pdf""#),
        )
        .mount(&server)
        .await;
    let library = TempDir::new().unwrap();

    let manager = manager_for(
        library.path(),
        BibEntry::default(),
        &format!("{}/download?id=7", server.uri()),
        Arc::new(ScriptedDialog::default()),
        Arc::new(CurrentThreadTaskExecutor),
    );
    manager.download_and_wait().await.unwrap();

    assert_eq!(
        lock_entry(manager.entry()).files()[0].link(),
        "Misc/Smith2020.pdf"
    );
}

#[tokio::test]
async fn test_unreachable_host_fails_without_side_effects() {
    if should_skip_socket_bound_test() {
        return;
    }
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let link = format!("http://127.0.0.1:{port}/paper.pdf");
    let library = TempDir::new().unwrap();
    let dialog = Arc::new(ScriptedDialog::default());

    let manager = manager_for(
        library.path(),
        BibEntry::default().with_citation_key("asdf"),
        &link,
        Arc::clone(&dialog),
        Arc::new(CurrentThreadTaskExecutor),
    );
    let status = manager.download_and_wait().await.unwrap();

    assert_eq!(status, TaskStatus::Failed);
    assert_eq!(
        lock_entry(manager.entry()).files(),
        [LinkedFile::new("", link.as_str(), "")]
    );
    let notifications = dialog.notifications();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].starts_with("Error downloading"));
    assert!(tree(library.path()).is_empty(), "left {:?}", tree(library.path()));
}

#[tokio::test]
async fn test_aborted_download_removes_temporary_file() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    Mock::given(method("GET"))
        .and(path("/slow.pdf"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_bytes(b"%PDF".to_vec())
                .insert_header("Content-Type", "application/pdf")
                .set_delay(Duration::from_secs(30)),
        )
        .mount(&server)
        .await;
    let library = TempDir::new().unwrap();
    let link = format!("{}/slow.pdf", server.uri());
    let dialog = Arc::new(ScriptedDialog::default());

    let manager = manager_for(
        library.path(),
        BibEntry::default().with_citation_key("asdf"),
        &link,
        Arc::clone(&dialog),
        Arc::new(TokioTaskExecutor::new(2).unwrap()),
    );
    let handle = manager.download().await.unwrap();

    // Wait until the worker has created its temporary file.
    for _ in 0..100 {
        if !tree(library.path()).is_empty() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    handle.abort();

    let result = handle.wait().await;
    assert!(matches!(result, Err(TaskError::Aborted { .. })), "{result:?}");
    assert!(tree(library.path()).is_empty(), "left {:?}", tree(library.path()));
    assert!(dialog.notifications().is_empty());
    assert_eq!(
        lock_entry(manager.entry()).files(),
        [LinkedFile::new("", link.as_str(), "")]
    );
}

#[tokio::test]
async fn test_concurrent_downloads_share_a_bounded_executor() {
    let Some(server) = start_mock_server_or_skip().await else {
        return;
    };
    let first = mount_pdf(&server, "/a.pdf", b"%PDF-a").await;
    let second = mount_pdf(&server, "/b.pdf", b"%PDF-b").await;
    let library = TempDir::new().unwrap();
    let executor: Arc<dyn TaskExecutor> = Arc::new(TokioTaskExecutor::new(1).unwrap());

    let managers = [("alpha", first), ("beta", second)].map(|(key, link)| {
        manager_for(
            library.path(),
            BibEntry::default().with_citation_key(key),
            &link,
            Arc::new(ScriptedDialog::default()),
            Arc::clone(&executor),
        )
    });
    let mut handles = Vec::new();
    for manager in &managers {
        handles.push(manager.download().await.unwrap());
    }
    for handle in handles {
        assert_eq!(handle.wait().await.unwrap(), TaskStatus::Succeeded);
    }

    assert_eq!(tree(library.path()), vec!["Misc/alpha.pdf", "Misc/beta.pdf"]);
}

#[tokio::test]
async fn test_local_link_is_rejected_before_any_work() {
    let library = TempDir::new().unwrap();
    let manager = manager_for(
        library.path(),
        BibEntry::default().with_citation_key("asdf"),
        "papers/asdf.pdf",
        Arc::new(ScriptedDialog::default()),
        Arc::new(CurrentThreadTaskExecutor),
    );

    let result = manager.download().await;
    assert!(matches!(result, Err(LinkedFileError::NotOnlineLink { .. })));
    assert!(tree(library.path()).is_empty());
}

#[tokio::test]
async fn test_missing_library_directory_is_reported() {
    let library = TempDir::new().unwrap();
    let missing = library.path().join("gone");
    let dialog = Arc::new(ScriptedDialog::default());
    let manager = manager_for(
        &missing,
        BibEntry::default().with_citation_key("asdf"),
        "https://example.org/paper.pdf",
        Arc::clone(&dialog),
        Arc::new(CurrentThreadTaskExecutor),
    );

    let result = manager.download_and_wait().await;
    assert!(matches!(result, Err(LinkedFileError::NoFileDirectory)));
    assert_eq!(dialog.notifications().len(), 1);
}

/// Fetcher whose disk fills up after part of the body was written.
struct DiskFullFetcher;

#[async_trait]
impl UrlFetcher for DiskFullFetcher {
    async fn fetch_to_file(
        &self,
        _url: &Url,
        destination: &Path,
    ) -> Result<FetchedResource, DownloadError> {
        std::fs::write(destination, b"%PDF-1.5 partial").unwrap();
        Err(DownloadError::io(
            destination,
            std::io::Error::other("no space left on device"),
        ))
    }
}

#[tokio::test]
async fn test_disk_write_failure_leaves_entry_unchanged() {
    let library = TempDir::new().unwrap();
    let dialog = Arc::new(ScriptedDialog::default());
    let online = LinkedFile::new("Full text", "https://example.org/paper.pdf", "PDF");
    let mut entry = BibEntry::default().with_citation_key("asdf");
    entry.add_file(online.clone());
    let manager = LinkedFileManager::new(
        online.clone(),
        share_entry(entry),
        Arc::new(DatabaseContext::with_database_path(
            library.path().join("library.bib"),
        )),
        FilePreferences::default(),
        Arc::new(ExternalFileTypes::standard()),
        Collaborators {
            dialog: dialog.clone(),
            executor: Arc::new(CurrentThreadTaskExecutor),
            fetcher: Arc::new(DiskFullFetcher),
        },
    );

    let status = manager.download_and_wait().await.unwrap();

    assert_eq!(status, TaskStatus::Failed);
    assert_eq!(lock_entry(manager.entry()).files(), [online]);
    let notifications = dialog.notifications();
    assert_eq!(notifications.len(), 1);
    assert!(notifications[0].contains("no space left on device"));
    assert!(tree(library.path()).is_empty(), "left {:?}", tree(library.path()));
}
