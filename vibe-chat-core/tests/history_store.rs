use std::fs;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use tempfile::TempDir;
use vibe_chat_core::{ConversationSession, HistoryStore, Turn};

fn exchange(n: usize) -> Vec<Turn> {
    (0..n)
        .flat_map(|i| [Turn::user(format!("q{}", i)), Turn::bot(format!("a{}", i))])
        .collect()
}

#[test]
fn test_history_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("conversation_history.json");

    let mut first = ConversationSession::new(Some(HistoryStore::new(&path, 1000).unwrap()));
    first.record_exchange("hello", "Hey there!");
    first.record_exchange("tell me a joke", "Arrays!");
    drop(first);

    let second = ConversationSession::new(Some(HistoryStore::new(&path, 1000).unwrap()));
    assert_eq!(second.len(), 4);
    assert!(second.history()[0].is_user());
    assert!(!second.history()[3].is_user());
}

#[test]
fn test_last_writer_wins_across_instances() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("conversation_history.json");
    let a = HistoryStore::new(&path, 1000).unwrap();
    let b = HistoryStore::new(&path, 1000).unwrap();

    a.save(&exchange(3));
    b.save(&exchange(1));

    assert_eq!(a.load(), exchange(1));
}

#[test]
fn test_unwritable_temp_keeps_previous_document() {
    let temp_dir = TempDir::new().unwrap();
    let store = HistoryStore::new(temp_dir.path().join("conversation_history.json"), 1000).unwrap();
    store.save(&exchange(2));

    // A directory squatting on the temp path makes the write step fail.
    fs::create_dir(store.temp_path()).unwrap();
    store.save(&exchange(5));

    assert_eq!(store.load(), exchange(2));
    assert!(store.path().is_file());
}

#[test]
fn test_stored_document_is_plain_json_list() {
    let temp_dir = TempDir::new().unwrap();
    let store = HistoryStore::new(temp_dir.path().join("conversation_history.json"), 1000).unwrap();
    store.save(&[Turn::user("Hello"), Turn::bot("Hi there!")]);

    let value: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
    assert!(value.is_array());
    assert_eq!(value[0]["speaker"], "user");
    assert_eq!(value[1]["text"], "Hi there!");
}

#[cfg(unix)]
#[test]
fn test_readers_never_see_partial_documents() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("conversation_history.json");
    HistoryStore::new(&path, 1000).unwrap().save(&exchange(1));

    let done = Arc::new(AtomicBool::new(false));
    let writers: Vec<_> = (0..3)
        .map(|w| {
            let path = path.clone();
            thread::spawn(move || {
                let store = HistoryStore::new(&path, 1000).unwrap();
                for i in 0..20 {
                    store.save(&exchange(1 + (w * 20 + i) % 7));
                }
            })
        })
        .collect();

    let reader = {
        let path = path.clone();
        let done = Arc::clone(&done);
        thread::spawn(move || {
            let store = HistoryStore::new(&path, 1000).unwrap();
            let mut reads = 0;
            while !done.load(Ordering::SeqCst) || reads == 0 {
                let turns = store.load();
                assert!(!turns.is_empty());
                assert_eq!(turns.len() % 2, 0);
                assert_eq!(turns, exchange(turns.len() / 2));
                reads += 1;
            }
        })
    };

    for writer in writers {
        writer.join().unwrap();
    }
    done.store(true, Ordering::SeqCst);
    reader.join().unwrap();

    assert!(!HistoryStore::new(&path, 1000).unwrap().temp_path().exists());
}
