//! Board event stream tests
//!
//! Observers subscribe to the board's EventBus and re-render from events.
//! These tests check ordering, payloads and JSON serialization.

mod helpers;

use chime_common::events::{BoardEvent, EndReason};
use helpers::*;

#[tokio::test]
async fn test_notification_cycle_event_order() {
    let mut board = board();
    let mut rx = board.subscribe();
    add_slot(&mut board, 0, 1, "piam");
    board.start(0).unwrap();
    board.advance_to(secs(6));

    let events = drain(&mut rx);
    assert_eq!(
        event_types(&events),
        vec![
            "ReminderAdded",
            "ReminderUpdated",
            "ReminderUpdated",
            "TimerStarted",
            "TimerExpired",
            "PlaybackStarted",
            "PlaybackEnded",
            "TimerStarted",
            "TimerExpired",
            "PlaybackStarted",
        ]
    );

    let ended = events
        .iter()
        .find_map(|e| match e {
            BoardEvent::PlaybackEnded { reason, owner, .. } => Some((*reason, *owner)),
            _ => None,
        })
        .unwrap();
    assert_eq!(ended.0, EndReason::Completed);
    assert_eq!(ended.1, Some(board.slot(0).unwrap().id.as_uuid()));
}

#[tokio::test]
async fn test_ticks_and_progress_are_high_frequency() {
    let mut board = board();
    add_slot(&mut board, 0, 2, "Sonnguyn");
    let mut rx = board.subscribe();
    board.start(0).unwrap();
    board.advance_to(secs(3));

    let events = drain(&mut rx);
    let labels: Vec<String> = events
        .iter()
        .filter_map(|e| match e {
            BoardEvent::TimerTick { label, .. } => Some(label.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(labels, vec!["00:01", "00:00"]);

    let progress = events
        .iter()
        .filter(|e| matches!(e, BoardEvent::PlaybackProgress { .. }))
        .count();
    assert_eq!(progress, 10);
    assert!(events
        .iter()
        .filter(|e| e.is_high_frequency())
        .all(|e| matches!(
            e,
            BoardEvent::TimerTick { .. } | BoardEvent::PlaybackProgress { .. }
        )));
}

#[tokio::test]
async fn test_events_serialize_as_tagged_json() {
    let mut board = board();
    add_slot(&mut board, 0, 1, "piam");
    board.start(0).unwrap();
    let mut rx = board.subscribe();
    board.advance_to(secs(1));

    let expired = drain(&mut rx)
        .into_iter()
        .find(|e| matches!(e, BoardEvent::TimerExpired { .. }))
        .unwrap();
    let line = expired.to_json_line().unwrap();
    assert!(line.contains("\"type\":\"TimerExpired\""));

    let json: serde_json::Value = serde_json::from_str(&line).unwrap();
    assert_eq!(json["index"], 0);
    assert_eq!(json["category"], "piam");
}

#[tokio::test]
async fn test_removing_middle_slot_reports_new_order() {
    let mut board = board();
    for _ in 0..3 {
        board.add_reminder();
    }
    let first = board.slot(0).unwrap().id;
    let middle = board.slot(1).unwrap().id;
    let last = board.slot(2).unwrap().id;
    let mut rx = board.subscribe();

    board.remove_reminder(1).unwrap();
    let events = drain(&mut rx);
    assert_eq!(event_types(&events), vec!["ReminderRemoved", "SlotsReindexed"]);

    match &events[0] {
        BoardEvent::ReminderRemoved { slot_id, index, .. } => {
            assert_eq!(*slot_id, middle.as_uuid());
            assert_eq!(*index, 1);
        }
        other => panic!("Wrong event type received: {:?}", other),
    }
    match &events[1] {
        BoardEvent::SlotsReindexed { order, .. } => {
            assert_eq!(order, &vec![first.as_uuid(), last.as_uuid()]);
        }
        other => panic!("Wrong event type received: {:?}", other),
    }

    // Removing the tail reindexes nobody
    board.remove_reminder(1).unwrap();
    assert_eq!(event_types(&drain(&mut rx)), vec!["ReminderRemoved"]);
}

#[tokio::test]
async fn test_queued_request_reports_depth() {
    let mut board = board();
    board.add_reminder();
    let mut rx = board.subscribe();

    board.test_sound(0).unwrap();
    board.test_sound(0).unwrap();
    board.test_sound(0).unwrap();

    let depths: Vec<usize> = drain(&mut rx)
        .iter()
        .filter_map(|e| match e {
            BoardEvent::PlaybackQueued { queue_depth, .. } => Some(*queue_depth),
            _ => None,
        })
        .collect();
    assert_eq!(depths, vec![1, 2]);
}

#[tokio::test]
async fn test_subscriber_receives_asynchronously() {
    let mut board = board();
    let mut rx = board.subscribe();
    board.add_reminder();

    match rx.recv().await.unwrap() {
        BoardEvent::ReminderAdded { index, label, .. } => {
            assert_eq!(index, 0);
            assert_eq!(label, "20:00");
        }
        other => panic!("Wrong event type received: {:?}", other),
    }
}
