use honden_core::db::open_db_in_memory;
use honden_core::{LinkGraph, SqliteLinkGraph, StoreError};
use rusqlite::Connection;
use uuid::Uuid;

const LOW: &str = "00000000-0000-4000-8000-000000000001";
const MID: &str = "55555555-0000-4000-8000-000000000002";
const HIGH: &str = "ffffffff-0000-4000-8000-000000000003";

fn setup() -> (Connection, Uuid, Uuid, Uuid) {
    let conn = open_db_in_memory().unwrap();
    let ids: Vec<Uuid> = [LOW, MID, HIGH]
        .iter()
        .map(|text| Uuid::parse_str(text).unwrap())
        .collect();
    for id in &ids {
        conn.execute(
            "INSERT INTO inodes (uuid, kind) VALUES (?1, 'note');",
            [id.to_string()],
        )
        .unwrap();
    }
    (conn, ids[0], ids[1], ids[2])
}

#[test]
fn connect_stores_smaller_id_first() {
    let (conn, low, _, high) = setup();
    let graph = SqliteLinkGraph::new(&conn);

    let link = graph.connect(high, low).unwrap();
    assert_eq!(link.endpoint_a, low);
    assert_eq!(link.endpoint_b, high);

    let (a, b): (String, String) = conn
        .query_row("SELECT endpoint_a, endpoint_b FROM links;", [], |row| {
            Ok((row.get(0)?, row.get(1)?))
        })
        .unwrap();
    assert_eq!((a.as_str(), b.as_str()), (LOW, HIGH));
}

#[test]
fn reversed_connect_is_duplicate() {
    let (conn, low, _, high) = setup();
    let graph = SqliteLinkGraph::new(&conn);

    graph.connect(low, high).unwrap();
    let err = graph.connect(high, low).unwrap_err();
    assert!(matches!(err, StoreError::DuplicateLink(a, b) if a == low && b == high));
    assert_eq!(graph.link_count().unwrap(), 1);
}

#[test]
fn self_link_is_rejected_without_mutation() {
    let (conn, low, _, _) = setup();
    let graph = SqliteLinkGraph::new(&conn);

    let err = graph.connect(low, low).unwrap_err();
    assert!(matches!(err, StoreError::SelfLink(id) if id == low));
    assert_eq!(graph.link_count().unwrap(), 0);
}

#[test]
fn neighbors_read_both_slots_and_carry_origin() {
    let (conn, low, mid, high) = setup();
    let graph = SqliteLinkGraph::new(&conn);
    graph.connect(mid, low).unwrap();
    graph.connect(mid, high).unwrap();

    let ends = graph.neighbors(mid).unwrap();
    let ids: Vec<Uuid> = ends.iter().map(|end| end.uuid).collect();
    assert_eq!(ids, vec![low, high]);
    assert!(ends.iter().all(|end| end.linked_from == mid));

    let from_low = graph.neighbors(low).unwrap();
    assert_eq!(from_low.len(), 1);
    assert_eq!(from_low[0].uuid, mid);
}

#[test]
fn disconnect_is_order_insensitive_and_idempotent() {
    let (conn, low, mid, high) = setup();
    let graph = SqliteLinkGraph::new(&conn);
    graph.connect(low, high).unwrap();

    assert!(!graph.disconnect(low, mid).unwrap());
    assert_eq!(graph.link_count().unwrap(), 1);

    assert!(graph.disconnect(high, low).unwrap());
    assert!(!graph.disconnect(high, low).unwrap());
    assert_eq!(graph.link_count().unwrap(), 0);
}

#[test]
fn remove_all_touching_only_removes_incident_links() {
    let (conn, low, mid, high) = setup();
    let graph = SqliteLinkGraph::new(&conn);
    graph.connect(low, mid).unwrap();
    graph.connect(mid, high).unwrap();
    graph.connect(low, high).unwrap();

    assert_eq!(graph.remove_all_touching(mid).unwrap(), 2);
    assert!(graph.is_linked(low, high).unwrap());
    assert!(graph.neighbors(mid).unwrap().is_empty());
}

#[test]
fn connect_to_unregistered_id_fails_foreign_key() {
    let (conn, low, _, _) = setup();
    let graph = SqliteLinkGraph::new(&conn);

    let err = graph.connect(low, Uuid::new_v4()).unwrap_err();
    assert!(matches!(err, StoreError::Db(_)));
    assert_eq!(graph.link_count().unwrap(), 0);
}
