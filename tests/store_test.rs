use localturk::store::csv_store::{self, CsvStore};
use localturk::store::{Record, TabularStore};
use std::fs;

fn rec(pairs: &[(&str, &str)]) -> Record {
    pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
}

#[test]
fn test_load_missing_and_empty_files() {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let missing = temp_dir.path().join("missing.csv");
    let (rows, columns) = csv_store::load(&missing).expect("missing file should load");
    assert!(rows.is_empty());
    assert!(columns.is_empty());

    let empty = temp_dir.path().join("empty.csv");
    fs::write(&empty, "").unwrap();
    let (rows, columns) = csv_store::load(&empty).expect("empty file should load");
    assert!(rows.is_empty());
    assert!(columns.is_empty());
}

#[test]
fn test_load_preserves_column_order_and_skips_blank_lines() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("tasks.csv");
    fs::write(&path, "q,img\na,1.png\n\nb,\"x, y\"\n").unwrap();

    let (rows, columns) = csv_store::load(&path).unwrap();
    assert_eq!(columns, vec!["q", "img"]);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1], rec(&[("q", "b"), ("img", "x, y")]));
    assert_eq!(rows[0].keys().collect::<Vec<_>>(), vec!["q", "img"]);
}

#[tokio::test]
async fn test_append_subset_does_not_rewrite_header() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("out.csv");
    fs::write(&path, "q,ans\na,x\n").unwrap();

    let mut store = CsvStore::open(&path).unwrap();
    store.append(vec![rec(&[("ans", "y")])]).await.unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, "q,ans\na,x\n,y\n");
    assert_eq!(store.columns(), ["q", "ans"]);
    assert_eq!(store.records().len(), 2);
}

#[tokio::test]
async fn test_append_novel_column_rewrites_whole_file() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("out.csv");
    fs::write(&path, "q,ans\na,x\nb,y\n").unwrap();

    let mut store = CsvStore::open(&path).unwrap();
    store
        .append(vec![rec(&[("q", "c"), ("ans", "z"), ("note", "hard")])])
        .await
        .unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert_eq!(content, "q,ans,note\na,x,\nb,y,\nc,z,hard\n");
    assert_eq!(store.columns(), ["q", "ans", "note"]);
    assert!(!temp_dir.path().join("out.csv.tmp").exists());
}

#[tokio::test]
async fn test_first_append_creates_file_with_header() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("out.csv");

    let mut store = CsvStore::open(&path).unwrap();
    store.append(vec![rec(&[("q", "a"), ("ans", "x")])]).await.unwrap();
    store.append(vec![rec(&[("q", "b"), ("ans", "y")])]).await.unwrap();

    assert_eq!(fs::read_to_string(&path).unwrap(), "q,ans\na,x\nb,y\n");

    // A fresh store sees everything on reload.
    let reopened = CsvStore::open(&path).unwrap();
    assert_eq!(reopened.records().len(), 2);
    assert_eq!(reopened.records()[1], rec(&[("q", "b"), ("ans", "y")]));
}

#[tokio::test]
async fn test_append_empty_batch_is_noop() {
    let temp_dir = tempfile::tempdir().unwrap();
    let path = temp_dir.path().join("out.csv");

    let mut store = CsvStore::open(&path).unwrap();
    store.append(Vec::new()).await.unwrap();
    assert!(!path.exists());
}

#[tokio::test]
async fn test_failed_append_keeps_state() {
    let temp_dir = tempfile::tempdir().unwrap();
    let dir = temp_dir.path().join("gone");
    fs::create_dir(&dir).unwrap();
    fs::write(dir.join("out.csv"), "q\na\n").unwrap();

    let mut store = CsvStore::open(dir.join("out.csv")).unwrap();
    fs::remove_dir_all(&dir).unwrap();

    // Subset append and widening rewrite both fail without touching state.
    assert!(store.append(vec![rec(&[("q", "b")])]).await.is_err());
    assert!(store.append(vec![rec(&[("q", "b"), ("ans", "y")])]).await.is_err());
    assert_eq!(store.records().len(), 1);
    assert_eq!(store.columns(), ["q"]);
}
