//! Integration tests for the player loop.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use storybook_core::clock::{Clock, SystemClock};
use storybook_scene::{BookConfig, ScenePhase};
use storybook_player::config::PlayerConfig;
use storybook_player::error::AppError;
use storybook_player::runner::{self, Player};
use storybook_player::script::Script;
use storybook_player::stage::LoggingStage;

fn demo(file: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../demos")
        .join(file)
}

fn demo_config(realtime: bool) -> PlayerConfig {
    PlayerConfig {
        book_path: demo("book.yaml"),
        script_path: demo("script.yaml"),
        frame_rate: 30,
        realtime,
    }
}

fn count(types: &[&str], wanted: &str) -> usize {
    types.iter().filter(|t| **t == wanted).count()
}

#[tokio::test]
async fn test_demo_book_plays_to_the_win() {
    let report = runner::play(&demo_config(false)).await.unwrap();

    // 20s at 30 fps; the frame interval rounds down, so one extra frame.
    assert_eq!(report.frames, 601);
    assert_eq!(report.inputs, 13);
    let types = &report.event_types;
    assert_eq!(count(types, "scene.idle_nudged"), 1);
    assert_eq!(count(types, "scene.collection_accepted"), 7);
    assert_eq!(count(types, "scene.collection_rejected"), 2);
    assert_eq!(count(types, "scene.goals_completed"), 1);
    assert_eq!(count(types, "scene.win_completed"), 1);
    assert_eq!(count(types, "scene.deactivated"), 1);
    assert_eq!(count(types, "scene.activated"), 3);
}

#[tokio::test]
async fn test_missing_book_file_is_an_io_error() {
    let mut config = demo_config(false);
    config.book_path = demo("no-such-book.yaml");

    let err = runner::play(&config).await.unwrap_err();

    assert!(matches!(err, AppError::Io(_)));
}

#[tokio::test]
async fn test_realtime_playback_paces_frames() {
    let dir = std::env::temp_dir().join(format!("storybook-player-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("script.yaml"), "run_secs: 0.2\n").unwrap();
    let config = PlayerConfig {
        script_path: dir.join("script.yaml"),
        ..demo_config(true)
    };

    let started = std::time::Instant::now();
    let report = runner::play(&config).await.unwrap();

    assert!(report.frames >= 6);
    assert!(started.elapsed() >= Duration::from_millis(150));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_player_delivers_inputs_at_their_timestamps() {
    let book = BookConfig::from_yaml(&std::fs::read_to_string(demo("book.yaml")).unwrap()).unwrap();
    let script = Script::from_yaml(
        r"
run_secs: 1
inputs:
  - at_secs: 0.5
    recognition: { target_id: page3, state: tracked }
",
    )
    .unwrap();
    let stage = LoggingStage::from_book(&book).into_stage();
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let mut player = Player::new(&book, script, Duration::from_millis(100), &stage, &clock);

    for _ in 0..5 {
        player.step();
    }
    assert_eq!(player.book().page("page3").unwrap().phase(), ScenePhase::Dormant);

    player.step();
    assert_eq!(player.book().page("page3").unwrap().phase(), ScenePhase::Intro);

    let report = player.run_to_end();
    assert_eq!(report.frames, 10);
    assert!(!player.is_running());
}
