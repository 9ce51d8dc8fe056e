//! Mini player tests
//!
//! Title, artwork and progress shown for the active clip; pause, seek and
//! volume controls; the idle reset after a clip ends.

mod helpers;

use chime_board::commands::BoardCommand;
use chime_board::Error;
use chime_common::events::{BoardEvent, EndReason, PlaybackState};
use helpers::*;

#[test]
fn test_view_follows_active_clip() {
    let mut board = board();
    add_slot(&mut board, 0, 1, "Sonnguyn");
    board.start(0).unwrap();
    board.advance_to(secs(1));

    let view = board.player_view();
    assert_eq!(view.title, "Sonnguyn - Người như anh xứng đáng có đơn");
    assert_eq!(view.category_label, "Sonnguyn");
    assert_eq!(view.vinyl, "disque/sonnguyn.png");
    assert!(view.spinning);
    assert_eq!(view.state, PlaybackState::Playing);
    assert_eq!(view.current_label, "00:00");

    board.advance_to(ms(2500));
    let view = board.player_view();
    assert_eq!(view.progress_percent, 50.0);
    assert_eq!(view.current_label, "00:01");
    assert_eq!(view.total_label, "00:03");
}

#[test]
fn test_idle_reset_after_grace_delay() {
    let mut board = board();
    add_slot(&mut board, 20, 0, "Sonnguyn");
    board.test_sound(0).unwrap();

    board.advance_to(secs(3));
    let view = board.player_view();
    assert!(!view.spinning);
    assert_eq!(view.state, PlaybackState::Stopped);
    assert_eq!(view.vinyl, "disque/sonnguyn.png");
    assert_eq!(view.progress_percent, 100.0);

    let mut rx = board.subscribe();
    board.advance_to(ms(4900));
    assert_eq!(board.player_view().vinyl, "disque/sonnguyn.png");

    board.advance_to(secs(5));
    let view = board.player_view();
    assert_eq!(view.vinyl, "disque/p.iam.png");
    assert_eq!(view.progress_percent, 0.0);
    assert_eq!(view.current_label, "00:00");
    assert_eq!(view.total_label, "00:00");
    assert!(drain(&mut rx)
        .iter()
        .any(|e| matches!(e, BoardEvent::PlayerReset { .. })));
}

#[test]
fn test_idle_reset_skipped_when_next_clip_started() {
    let mut board = board();
    add_slot(&mut board, 20, 0, "Sonnguyn");
    board.test_sound(0).unwrap();
    board.advance_to(secs(3));

    // New clip inside the grace window
    board.advance_to(secs(4));
    board.test_sound(0).unwrap();

    board.advance_to(ms(5500));
    let view = board.player_view();
    assert!(view.spinning);
    assert_eq!(view.vinyl, "disque/sonnguyn.png");
    assert!(view.progress_percent > 0.0);
    assert_eq!(board.player().reset_due(), None);
}

#[test]
fn test_pause_freezes_progress_and_delays_end() {
    let mut board = board();
    board.add_reminder();
    board.test_sound(0).unwrap();
    board.advance_to(secs(1));

    let mut rx = board.subscribe();
    assert_eq!(board.toggle_play_pause().unwrap(), Some(PlaybackState::Paused));
    assert!(!board.player_view().spinning);

    board.advance_to(secs(10));
    let session = board.player().session().unwrap();
    assert_eq!(session.position, secs(1));
    assert_eq!(session.state, PlaybackState::Paused);

    assert_eq!(board.toggle_play_pause().unwrap(), Some(PlaybackState::Playing));
    board.advance_to(ms(11500));
    assert_eq!(board.player().session().map(|s| s.position), Some(ms(2500)));

    board.advance_to(secs(12));
    assert!(board.player().session().is_none());

    let changes: Vec<_> = drain(&mut rx)
        .into_iter()
        .filter_map(|e| match e {
            BoardEvent::PlaybackStateChanged {
                old_state,
                new_state,
                ..
            } => Some((old_state, new_state)),
            _ => None,
        })
        .collect();
    assert_eq!(
        changes,
        vec![
            (PlaybackState::Playing, PlaybackState::Paused),
            (PlaybackState::Paused, PlaybackState::Playing)
        ]
    );
}

#[test]
fn test_seek_moves_progress() {
    let mut board = board();
    board.add_reminder();
    board.test_sound(0).unwrap();
    board.advance_to(ms(100));

    assert!(board.seek(0.5));
    assert_eq!(board.player_view().progress_percent, 50.0);
    assert_eq!(board.player_view().current_label, "00:01");

    board.advance_to(ms(200));
    assert_eq!(board.player().session().map(|s| s.position), Some(ms(1600)));
}

#[test]
fn test_player_volume_only_touches_active_clip() {
    let mut board = board();
    board.add_reminder();
    board.test_sound(0).unwrap();

    assert!(board.set_player_volume(2).unwrap());
    let voice = board.device().current_voice().unwrap();
    assert_eq!(board.device().voice_volume(voice), Some(0.2));
    assert_eq!(board.slot(0).unwrap().volume_bars, 7);

    assert!(matches!(
        board.set_player_volume(11),
        Err(Error::InvalidInput(_))
    ));
    assert_eq!(board.device().voice_volume(voice), Some(0.2));
}

#[test]
fn test_non_finite_seek_is_ignored() {
    let mut board = board();
    add_slot(&mut board, 0, 1, "piam");
    board.start(0).unwrap();
    board.advance_to(ms(1200));

    board.apply(BoardCommand::Seek(f64::NAN)).unwrap();
    assert!(!board.seek(f64::INFINITY));
    assert_eq!(board.player().session().map(|s| s.position), Some(ms(200)));
    assert!(board.player_view().spinning);
}

#[test]
fn test_failed_resume_releases_queue() {
    let mut board = board();
    add_slot(&mut board, 0, 1, "piam");
    add_slot(&mut board, 0, 2, "Sonnguyn");
    let first = board.slot(0).unwrap().id;
    let second = board.slot(1).unwrap().id;
    board.start(0).unwrap();
    board.advance_to(ms(1500));

    assert_eq!(board.toggle_play_pause().unwrap(), Some(PlaybackState::Paused));
    let voice = board.device().current_voice().unwrap();
    board.device_mut().fail(voice, "output device unplugged");

    // Second reminder expires at 3.5s and waits behind the paused clip
    board.start(1).unwrap();
    board.advance_to(secs(4));
    assert_eq!(board.queue_depth(), 1);

    let mut rx = board.subscribe();
    assert!(matches!(
        board.toggle_play_pause(),
        Err(Error::PlaybackStart(_))
    ));
    assert!(drain(&mut rx).iter().any(|e| matches!(
        e,
        BoardEvent::PlaybackEnded {
            reason: EndReason::Failed,
            ..
        }
    )));
    assert_eq!(board.player().owner(), Some(second));
    assert_eq!(board.queue_depth(), 0);
    assert_eq!(board.timers().remaining(first), Some(1));

    board.advance_to(secs(60));
    assert!(board.device().started().len() > 4);
    assert!(board.is_running(0).unwrap());
}

#[test]
fn test_controls_without_clip_do_nothing() {
    let mut board = board();
    assert_eq!(board.toggle_play_pause().unwrap(), None);
    assert!(!board.seek(0.3));
    assert!(!board.set_player_volume(5).unwrap());
    assert_eq!(board.player_view().state, PlaybackState::Stopped);
    assert_eq!(board.player_view().vinyl, "disque/p.iam.png");
}
