use honden_core::{
    Entity, EntityValidationError, InodeKind, Link, Media, NameUniqueness, Note, ResolvedInode,
};
use serde_json::json;
use uuid::Uuid;

#[test]
fn entity_serializes_with_kind_tag() {
    let id = Uuid::parse_str("6f1c0d4e-2b7a-4c1e-9a53-0d1f2e3a4b5c").unwrap();
    let media = Media::with_id(id, "pic.png", "image/png").unwrap();

    let value = serde_json::to_value(Entity::Media(media)).unwrap();
    assert_eq!(
        value,
        json!({
            "kind": "media",
            "uuid": "6f1c0d4e-2b7a-4c1e-9a53-0d1f2e3a4b5c",
            "filename": "pic.png",
            "filetype": "image/png",
        })
    );
}

#[test]
fn resolved_inode_deserializes_from_wire_shape() {
    let raw = json!({
        "uuid": "00000000-0000-4000-8000-0000000000aa",
        "kind": "note",
        "entity": {
            "kind": "note",
            "uuid": "00000000-0000-4000-8000-0000000000aa",
            "filename": "alpha",
            "contents": null,
        }
    });

    let resolved: ResolvedInode = serde_json::from_value(raw).unwrap();
    assert_eq!(resolved.kind, InodeKind::Note);
    assert_eq!(resolved.filename(), Some("alpha"));
    match resolved.entity {
        Entity::Note(note) => assert_eq!(note.contents, None),
        other => panic!("unexpected entity {other:?}"),
    }
}

#[test]
fn validation_rejects_bad_records() {
    assert_eq!(
        Note::with_id(Uuid::nil(), "alpha", None).unwrap_err(),
        EntityValidationError::NilUuid
    );
    assert_eq!(
        Note::new("line\nbreak", "").unwrap_err(),
        EntityValidationError::FilenameControlChar
    );
    assert_eq!(
        Media::new("", "image/png").unwrap_err(),
        EntityValidationError::BlankFilename
    );
}

#[test]
fn kind_strings_are_stable() {
    for kind in InodeKind::ALL {
        assert_eq!(InodeKind::parse(kind.as_str()), Some(kind));
    }
    assert_eq!(InodeKind::parse("folder"), None);
    assert!(InodeKind::Media.has_backing_bytes());
    assert!(!InodeKind::Media.has_contents());
}

#[test]
fn link_serializes_canonical_endpoints() {
    let low = Uuid::parse_str("10000000-0000-4000-8000-000000000000").unwrap();
    let high = Uuid::parse_str("20000000-0000-4000-8000-000000000000").unwrap();

    let link = Link::canonical(high, low).unwrap();
    let value = serde_json::to_value(link).unwrap();
    assert_eq!(value["endpoint_a"], json!(low.to_string()));
    assert_eq!(value["endpoint_b"], json!(high.to_string()));
}

#[test]
fn name_uniqueness_parses_cli_spellings() {
    assert_eq!("per-kind".parse::<NameUniqueness>(), Ok(NameUniqueness::PerKind));
    assert_eq!(
        "Catalog_Wide".parse::<NameUniqueness>(),
        Ok(NameUniqueness::CatalogWide)
    );
    assert!("strict".parse::<NameUniqueness>().is_err());
}
