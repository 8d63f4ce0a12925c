use honden_core::{import_directory, GraphStore, InodeKind, StoreConfig, StoreLayout};
use std::fs;

fn seed_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("a.md"), "# Alpha\n").unwrap();
    fs::write(dir.path().join("README"), "plain text").unwrap();
    fs::write(dir.path().join("pic.png"), b"\x89PNG\r\n").unwrap();
    fs::write(dir.path().join("x.zip"), b"PK").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    dir
}

#[test]
fn import_classifies_and_creates_inodes() {
    let source = seed_dir();
    let mut store = GraphStore::open_in_memory(StoreConfig::default()).unwrap();

    let report = import_directory(&mut store, source.path()).unwrap();

    let imported: Vec<_> = report
        .imported
        .iter()
        .map(|file| (file.filename.as_str(), file.kind))
        .collect();
    assert_eq!(
        imported,
        vec![
            ("README", InodeKind::Note),
            ("a.md", InodeKind::Note),
            ("pic.png", InodeKind::Media),
        ]
    );
    assert_eq!(report.skipped, vec!["nested".to_string(), "x.zip".to_string()]);
    assert!(report.failed.is_empty());

    let readme = report.imported[0].uuid;
    assert_eq!(store.get_contents(readme).unwrap(), "plain text");
    let pic = report.imported[2].uuid;
    assert_eq!(store.media_bytes(pic).unwrap(), b"\x89PNG\r\n".to_vec());
    match store.resolve(pic).unwrap().entity {
        honden_core::Entity::Media(media) => assert_eq!(media.filetype, "image/png"),
        other => panic!("unexpected entity {other:?}"),
    }
}

#[test]
fn reimport_reports_already_known() {
    let source = seed_dir();
    let mut store = GraphStore::open_in_memory(StoreConfig::default()).unwrap();

    import_directory(&mut store, source.path()).unwrap();
    let second = import_directory(&mut store, source.path()).unwrap();

    assert!(second.imported.is_empty());
    assert_eq!(second.already_known.len(), 3);
    assert_eq!(store.enumerate_all().unwrap().len(), 3);
}

#[test]
fn import_into_filesystem_store_copies_media() {
    let source = seed_dir();
    let target = tempfile::tempdir().unwrap();
    let layout = StoreLayout::new(target.path());
    let mut store = GraphStore::open(&layout, StoreConfig::default()).unwrap();

    let report = import_directory(&mut store, source.path()).unwrap();
    let pic = report
        .imported
        .iter()
        .find(|file| file.kind == InodeKind::Media)
        .unwrap();

    let copied = fs::read(layout.media_dir().join(pic.uuid.to_string())).unwrap();
    assert_eq!(copied, b"\x89PNG\r\n".to_vec());
}

#[test]
fn missing_directory_aborts_import() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = GraphStore::open_in_memory(StoreConfig::default()).unwrap();

    let err = import_directory(&mut store, &dir.path().join("absent")).unwrap_err();
    assert!(err.to_string().contains("absent"));
}
