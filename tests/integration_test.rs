//! Integration tests for fsx
//!
//! These tests drive an explorer session against a real temporary directory and
//! check both the displayed tree and what ends up on disk.

use fsx::{
    ExplorerError,
    config::ExplorerConfig,
    gateway::{FileSystemGateway, LocalGateway},
    model::ReportReceiver,
    session::{ExplorerSession, Notice},
    tree::NodeKind,
    ui::MockDialog,
    validation::ValidationError,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;

/// Helper function to lay out a small project on disk
fn setup_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("docs/img")).unwrap();
    fs::create_dir_all(root.join("src")).unwrap();
    fs::write(root.join("docs/guide.md"), "# Guide\nTODO: write").unwrap();
    fs::write(root.join("docs/img/logo.png"), "png").unwrap();
    fs::write(root.join("src/main.rs"), "fn main() {}").unwrap();
    fs::write(root.join("notes.txt"), "remember the milk").unwrap();
    dir
}

/// Helper function to open a session on `root`
async fn open_session(root: &Path, dialog: MockDialog) -> (ExplorerSession, ReportReceiver) {
    let gateway: Arc<dyn FileSystemGateway> = Arc::new(LocalGateway::new());
    let (mut session, reports) = ExplorerSession::new(gateway, Arc::new(dialog), &ExplorerConfig::default());
    session
        .open(Some(vec![root.to_path_buf()]))
        .await
        .unwrap()
        .unwrap();
    (session, reports)
}

/// Helper function to wait for `count` operation reports
async fn settle(reports: &mut ReportReceiver, count: usize) {
    for _ in 0..count {
        let report = reports.recv().await.unwrap();
        assert!(report.is_success(), "operation failed: {:?}", report.alert());
    }
}

/// Helper function to list a folder's children by name, sorted (the disk gives
/// no order)
fn names(session: &ExplorerSession, path: &Path) -> Vec<String> {
    let id = session.model().find_by_path(path).unwrap();
    let mut names: Vec<String> = session
        .model()
        .children(id)
        .iter()
        .map(|child| session.model().get(*child).unwrap().name.clone())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_open_lists_whole_tree() {
    let dir = setup_tree();
    let (session, _reports) = open_session(dir.path(), MockDialog::cancelled()).await;

    assert_eq!(session.model().len(), 8);
    assert_eq!(names(&session, dir.path()), vec!["docs", "notes.txt", "src"]);
}

#[tokio::test]
async fn test_search_by_extension_and_content() {
    let dir = setup_tree();
    let (mut session, _reports) = open_session(dir.path(), MockDialog::cancelled()).await;

    // folders never match an extension, so matches surface as flat roots
    session.set_criteria(false, true, false);
    session.search("md").await.unwrap();
    let found: Vec<PathBuf> = session
        .model()
        .to_file_nodes()
        .into_iter()
        .map(|root| root.path)
        .collect();
    assert_eq!(found, vec![dir.path().join("docs/guide.md")]);
    assert!(session.model().find_by_path(&dir.path().join("docs")).is_none());
    assert!(session.model().find_by_path(&dir.path().join("notes.txt")).is_none());

    session.set_criteria(false, false, true);
    let summary = session.search("milk").await.unwrap();
    assert!(summary.notice.is_none());
    assert!(session.model().find_by_path(&dir.path().join("notes.txt")).is_some());

    let summary = session.search("nothing like this").await.unwrap();
    assert_eq!(summary.notice, Some(Notice::NoResults));
}

#[tokio::test]
async fn test_create_copy_move_delete_on_disk() {
    let dir = setup_tree();
    let root = dir.path();
    let (mut session, mut reports) = open_session(root, MockDialog::cancelled()).await;
    let root_id = session.model().find_by_path(root).unwrap();

    let (inbox, _) = session.create(root_id, "inbox", Some(NodeKind::Folder)).unwrap();
    settle(&mut reports, 1).await;
    assert!(root.join("inbox").is_dir());

    let notes = session.model().find_by_path(&root.join("notes.txt")).unwrap();
    session.copy(notes).unwrap();
    session.paste(inbox).await.unwrap();
    settle(&mut reports, 1).await;
    assert_eq!(fs::read_to_string(root.join("inbox/notes.txt")).unwrap(), "remember the milk");

    // pasting again next to the first copy picks a fresh name
    session.paste(inbox).await.unwrap();
    settle(&mut reports, 1).await;
    assert!(root.join("inbox/notes (1).txt").exists());

    let src = session.model().find_by_path(&root.join("src")).unwrap();
    session.drag(src, inbox).await.unwrap();
    settle(&mut reports, 1).await;
    assert!(root.join("inbox/src/main.rs").exists());
    assert!(!root.join("src").exists());

    let docs = session.model().find_by_path(&root.join("docs")).unwrap();
    session.delete(docs).unwrap();
    settle(&mut reports, 1).await;
    assert!(!root.join("docs").exists());

    session.refresh().await.unwrap();
    assert_eq!(names(&session, root), vec!["inbox", "notes.txt"]);
}

#[tokio::test]
async fn test_create_rejects_taken_name() {
    let dir = setup_tree();
    let (mut session, _reports) = open_session(dir.path(), MockDialog::cancelled()).await;
    let root_id = session.model().find_by_path(dir.path()).unwrap();

    let err = session.create(root_id, "notes.txt", Some(NodeKind::File)).unwrap_err();
    assert!(matches!(
        err,
        ExplorerError::Validation(ValidationError::AlreadyExists(_))
    ));
}

#[tokio::test]
async fn test_export_selection_to_dialog_destination() {
    let dir = setup_tree();
    let out = TempDir::new().unwrap();
    let destination = out.path().join("backup");
    let (mut session, _reports) =
        open_session(dir.path(), MockDialog::cancelled().saving_to(&destination)).await;

    let img = session.model().find_by_path(&dir.path().join("docs/img")).unwrap();
    let notes = session.model().find_by_path(&dir.path().join("notes.txt")).unwrap();
    session.set_selected(img, true).unwrap();
    session.set_selected(notes, true).unwrap();

    let summary = session.export(None).await.unwrap().unwrap();
    assert!(summary.is_complete());
    assert_eq!(summary.copied.len(), 2);
    assert_eq!(fs::read_to_string(destination.join("img/logo.png")).unwrap(), "png");
    assert!(destination.join("notes.txt").exists());
    assert!(!destination.join("docs").exists());
}

#[tokio::test]
async fn test_open_missing_path_fails() {
    let gateway: Arc<dyn FileSystemGateway> = Arc::new(LocalGateway::new());
    let (mut session, _reports) =
        ExplorerSession::new(gateway, Arc::new(MockDialog::cancelled()), &ExplorerConfig::default());

    let result = session.open(Some(vec![PathBuf::from("/definitely/not/here")])).await;
    assert!(matches!(result, Err(ExplorerError::Tree(_))));
    assert!(session.model().is_empty());
}
