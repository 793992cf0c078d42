use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use shotwatch::publish::SessionEvent;
use shotwatch::score::ScoreTree;
use shotwatch::session::{self, ScoreSession, SessionError, SessionOptions};
use shotwatch::watcher::StagingOptions;
use shotwatch::TreeBroadcaster;
use tempfile::TempDir;
use tokio::sync::broadcast;

const INDEX: &str = "1;3;4;Kari Nordmann;Nordstrand SKL;3;V55;0;;31\r\n\
                     1;3;5;Ola Nordmann;Asker SKL;5;S;12;;31\r\n\
                     2;1;1;Per Hansen;Bærum SKL;4;J;0;;30\r\n";

fn series(sum: u32, shots: u32) -> String {
    format!(
        "[Serie]\r\nNr = 1\r\nNavn = Felt 1\r\nStartsum = 0\r\nSeriesum = {sum}\r\nTotalsum = {sum}\r\nSkudd = {shots}\r\n"
    )
}

/// A shot file holding `count` shots of raw value 1050.
fn shots(count: u16) -> Vec<u8> {
    let mut bytes = vec![0u8; 9];
    for n in 1..=count {
        bytes.extend_from_slice(&n.to_le_bytes());
        bytes.extend_from_slice(&1050i16.to_le_bytes());
        bytes.extend_from_slice(&[0xB8, 0x0B, 0x00, 0x90, 0xE8, 0xFF]);
    }
    bytes
}

/// The device writes its text files in Latin-1.
fn latin1(text: &str) -> Vec<u8> {
    text.chars().map(|c| c as u8).collect()
}

/// Write a file and push its mtime forward so every write is a visible change.
fn write(dir: &Path, name: &str, contents: impl AsRef<[u8]>, generation: u64) {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    let file = fs::File::options().write(true).open(&path).unwrap();
    file.set_modified(SystemTime::now() + Duration::from_secs(generation))
        .unwrap();
}

fn device_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "index.txt", latin1(INDEX), 0);
    for key in ["1_4", "1_5", "2_1"] {
        write(dir.path(), &format!("{key}.TXT"), series(0, 0), 0);
        write(dir.path(), &format!("{key}.MLD"), shots(0), 0);
    }
    // not part of any lane
    write(dir.path(), "1_9.TXT", series(0, 0), 0);
    dir
}

fn options() -> SessionOptions {
    SessionOptions {
        index_name: "index.txt".to_string(),
        staging: StagingOptions {
            poll_interval: Duration::from_millis(20),
            ..StagingOptions::default()
        },
        ..SessionOptions::default()
    }
}

async fn tree_where(
    rx: &mut broadcast::Receiver<SessionEvent>,
    done: impl Fn(&ScoreTree) -> bool,
) -> Arc<ScoreTree> {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if let SessionEvent::TreeUpdated(tree) = rx.recv().await.unwrap() {
                if done(&tree) {
                    return tree;
                }
            }
        }
    })
    .await
    .expect("expected tree never published")
}

fn card_named<'a>(tree: &'a ScoreTree, name: &str) -> Option<&'a shotwatch::score::CardSnapshot> {
    tree.ranges
        .iter()
        .flat_map(|range| range.cards.iter())
        .find(|card| card.name == name)
}

#[tokio::test]
async fn test_snapshot_of_device_directory() {
    let dir = device_dir();
    write(dir.path(), "1_4.TXT", series(48, 2), 1);
    write(dir.path(), "1_4.MLD", shots(2), 1);

    let files = session::discover(dir.path(), "index.txt").await.unwrap();
    assert_eq!(files.lane_keys().collect::<Vec<_>>(), ["1_4", "1_5", "2_1"]);

    let tree = session::snapshot(&files, &options()).await.unwrap();
    assert_eq!(tree.ranges.len(), 2);
    assert_eq!(tree.ranges[0].name, "1");
    assert_eq!(tree.ranges[0].cards.len(), 2);
    assert_eq!(tree.ranges[1].name, "2");
    assert_eq!(tree.ranges[1].relay, "1");

    let kari = &tree.ranges[0].cards[0];
    assert_eq!(kari.series_sum, "48");
    assert_eq!(kari.shots.len(), 2);
    assert_eq!(kari.shots[1].value, "*.5");
    assert_eq!(kari.target_id, Some("NO_DFS_100M"));

    assert_eq!(tree.ranges[1].cards[0].club, "Bærum SKL");
}

#[tokio::test]
async fn test_discover_without_index() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "1_4.TXT", series(0, 0), 0);
    write(dir.path(), "1_4.MLD", shots(0), 0);

    let err = session::discover(dir.path(), "index.txt").await.unwrap_err();
    assert!(matches!(err, SessionError::MissingIndex { .. }));
}

#[tokio::test]
async fn test_watch_follows_device_writes() {
    let dir = device_dir();
    let files = session::discover(dir.path(), "index.txt").await.unwrap();

    let broadcaster = TreeBroadcaster::new(64);
    let mut rx = broadcaster.subscribe();
    let session = ScoreSession::start(files, &options(), broadcaster).unwrap();

    let tree = tree_where(&mut rx, |tree| card_named(tree, "Per Hansen").is_some()).await;
    assert_eq!(tree.card_count(), 3);

    // the device records two shots for lane 1_4
    write(dir.path(), "1_4.MLD", shots(2), 5);
    write(dir.path(), "1_4.TXT", series(20, 2), 5);

    let tree = tree_where(&mut rx, |tree| {
        card_named(tree, "Kari Nordmann").is_some_and(|card| card.series_sum == "20")
    })
    .await;
    let kari = card_named(&tree, "Kari Nordmann").unwrap();
    assert_eq!(kari.shots.len(), 2);
    // full tree every time
    assert_eq!(tree.card_count(), 3);

    // a name correction in the index keeps the shots
    write(
        dir.path(),
        "index.txt",
        latin1(&INDEX.replace("Kari Nordmann", "Kari Nordvik")),
        10,
    );
    let tree = tree_where(&mut rx, |tree| card_named(tree, "Kari Nordvik").is_some()).await;
    assert_eq!(card_named(&tree, "Kari Nordvik").unwrap().shots.len(), 2);

    let board = session.shutdown().await.unwrap();
    assert_eq!(board.lane_count(), 3);
}

#[tokio::test]
async fn test_index_naming_unknown_lane_is_rejected() {
    let dir = device_dir();
    let files = session::discover(dir.path(), "index.txt").await.unwrap();

    let broadcaster = TreeBroadcaster::new(64);
    let mut rx = broadcaster.subscribe();
    let session = ScoreSession::start(files, &options(), broadcaster).unwrap();
    tree_where(&mut rx, |tree| card_named(tree, "Per Hansen").is_some()).await;

    write(
        dir.path(),
        "index.txt",
        "1;3;4;Kari;Club;3;V55;0;;31\r\n1;3;9;Ghost;Club;3;V55;0;;31\r\n",
        5,
    );

    let (entity, message) = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            if let SessionEvent::Failed { entity, message } = rx.recv().await.unwrap() {
                return (entity, message);
            }
        }
    })
    .await
    .unwrap();
    assert_eq!(entity, "index");
    assert!(message.contains("1_9"));

    // the previous index is still in effect
    let board = session.shutdown().await.unwrap();
    assert_eq!(board.card("1_4").unwrap().name, "Kari Nordmann");
}
