use chrono::{TimeZone, Utc};
use taskfile::error::AppError;
use taskfile::models::{Priority, Task};
use taskfile::store::{FileTaskStore, TaskStore};

async fn open_store(dir: &tempfile::TempDir) -> FileTaskStore {
    FileTaskStore::open(dir.path()).await.expect("open data dir")
}

#[tokio::test]
async fn create_list_delete_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(&dir).await;

    store.create_file("inbox").await.expect("create inbox");
    store.create_file("backlog").await.expect("create backlog");
    assert_eq!(
        store.list_files().await.expect("list"),
        ["backlog", "inbox"]
    );

    store.delete_file("inbox").await.expect("delete inbox");
    assert_eq!(store.list_files().await.expect("list"), ["backlog"]);
}

#[tokio::test]
async fn creating_an_existing_file_conflicts() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(&dir).await;

    store.create_file("inbox").await.expect("create");
    let err = store.create_file("inbox").await.expect_err("duplicate");
    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn missing_files_are_not_found() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(&dir).await;

    assert!(matches!(
        store.fetch_tasks("nope").await.expect_err("fetch missing"),
        AppError::NotFound
    ));
    assert!(matches!(
        store.delete_file("nope").await.expect_err("delete missing"),
        AppError::NotFound
    ));
}

#[tokio::test]
async fn save_and_fetch_round_trip() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(&dir).await;

    let mut task = Task::new("Write report");
    task.priority = Priority::High;
    task.tags = vec!["work".to_string(), "urgent".to_string()];
    task.due_date = Utc.with_ymd_and_hms(2026, 9, 1, 0, 0, 0).single();
    task.memo = Some("include Q3 numbers".to_string());

    store.save_tasks("inbox", &[task.clone()]).await.expect("save");
    let loaded = store.fetch_tasks("inbox").await.expect("fetch");

    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].id, task.id);
    assert_eq!(loaded[0].title, "Write report");
    assert_eq!(loaded[0].priority, Priority::High);
    assert_eq!(loaded[0].tags, ["work", "urgent"]);
    assert_eq!(loaded[0].due_date, task.due_date);
    assert_eq!(loaded[0].memo.as_deref(), Some("include Q3 numbers"));
    assert!(!loaded[0].completed);
}

#[tokio::test]
async fn legacy_documents_are_normalized_on_load() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(&dir).await;

    let legacy = r#"[
        {
            "id": "1",
            "text": "Call the dentist",
            "notes": "ask about friday",
            "category": "errands",
            "createdAt": "2026-01-01T09:00:00Z",
            "updatedAt": "2026-01-02T09:00:00Z"
        },
        {
            "id": "2",
            "title": "Tagged already",
            "category": "work",
            "tags": ["work"],
            "createdAt": "2026-01-01T09:00:00Z",
            "updatedAt": "2026-01-01T09:00:00Z"
        }
    ]"#;
    std::fs::write(dir.path().join("legacy.json"), legacy).expect("seed file");

    let loaded = store.fetch_tasks("legacy").await.expect("fetch");
    assert_eq!(loaded[0].title, "Call the dentist");
    assert_eq!(loaded[0].memo.as_deref(), Some("ask about friday"));
    assert_eq!(loaded[0].tags, ["errands"]);
    assert_eq!(loaded[0].priority, Priority::Medium);
    // An existing tag is not duplicated by the folded category.
    assert_eq!(loaded[1].tags, ["work"]);
}

#[tokio::test]
async fn unparsable_due_date_loads_as_no_deadline() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(&dir).await;

    let raw = r#"[
        {
            "id": "1",
            "title": "bad date",
            "dueDate": "next tuesday",
            "createdAt": "2026-01-01T09:00:00Z",
            "updatedAt": "2026-01-01T09:00:00Z"
        }
    ]"#;
    std::fs::write(dir.path().join("dates.json"), raw).expect("seed file");

    let loaded = store.fetch_tasks("dates").await.expect("fetch");
    assert!(loaded[0].due_date.is_none());
}

#[tokio::test]
async fn file_names_are_validated() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(&dir).await;

    for name in ["", "../escape", "a/b", ".hidden"] {
        let err = store.create_file(name).await.expect_err("invalid name");
        assert!(matches!(err, AppError::BadRequest(_)), "name: {name:?}");
    }
}

#[tokio::test]
async fn saving_overwrites_the_whole_document() {
    let dir = tempfile::tempdir().expect("tempdir");
    let store = open_store(&dir).await;

    let first = vec![Task::new("a"), Task::new("b")];
    store.save_tasks("inbox", &first).await.expect("save");
    let second = vec![Task::new("c")];
    store.save_tasks("inbox", &second).await.expect("resave");

    let loaded = store.fetch_tasks("inbox").await.expect("fetch");
    assert_eq!(loaded.len(), 1);
    assert_eq!(loaded[0].title, "c");
}
