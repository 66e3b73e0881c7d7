//! End-to-end commentary flow: payload in, cue resolution out

mod helpers;

use courtside_common::events::PlayerEvent;
use courtside_common::SyncTuning;
use courtside_player::commentary::CueCategory;
use courtside_player::playback::sim::SimulatedStream;
use courtside_player::playback::{StreamEvent, StreamRole, SyncEngine};
use courtside_player::session::{keys, CommentaryPayload, MemorySessionStore, SessionSnapshot};
use courtside_player::state::SharedState;
use helpers::drain_events;
use std::sync::Arc;

const MATCH_COMMENTARY: &str = "\
Match commentary
[0:05] Strong opening serve
0:30 - Notice the footwork on that return
At 62 seconds - Incredible cross-court winner!
garbage line without a timestamp
1:30 - Long rally develops
";

fn text_only_engine() -> (Arc<SyncEngine<SimulatedStream>>, Arc<SharedState>) {
    let primary = Arc::new(SimulatedStream::new(120.0));
    let state = Arc::new(SharedState::new());
    let engine = Arc::new(SyncEngine::new(
        primary,
        None,
        Arc::clone(&state),
        SyncTuning::default(),
    ));
    (engine, state)
}

async fn report_position(engine: &SyncEngine<SimulatedStream>, position_secs: f64) {
    engine
        .handle_stream_event(
            StreamRole::Primary,
            StreamEvent::PositionUpdate {
                position_secs,
                duration_secs: Some(120.0),
            },
        )
        .await;
}

#[tokio::test(start_paused = true)]
async fn test_payload_to_cue_timeline() {
    let (engine, state) = text_only_engine();
    let mut events = state.subscribe_events();

    let payload = CommentaryPayload {
        job_id: None,
        commentary_text: MATCH_COMMENTARY.to_string(),
        audio_url: None,
    };
    engine.load_commentary(&payload).await;

    // Undated lines are dropped; four timestamped cues survive
    assert!(drain_events(&mut events).iter().any(|e| matches!(
        e,
        PlayerEvent::CommentaryLoaded {
            cue_count: 4,
            has_audio: false,
            ..
        }
    )));

    let cue = engine.cue(2).await.unwrap();
    assert_eq!(cue.timestamp_secs, 62.0);
    assert_eq!(cue.category, CueCategory::Excitement);
}

#[tokio::test(start_paused = true)]
async fn test_cue_resolution_follows_playback() {
    let (engine, _state) = text_only_engine();
    let payload = CommentaryPayload {
        job_id: None,
        commentary_text: MATCH_COMMENTARY.to_string(),
        audio_url: None,
    };
    engine.load_commentary(&payload).await;

    // Before the first cue
    report_position(&engine, 2.0).await;
    assert_eq!(engine.active_cue().await, None);

    report_position(&engine, 5.0).await;
    assert_eq!(engine.active_cue().await, Some(0));

    report_position(&engine, 45.0).await;
    assert_eq!(engine.active_cue().await, Some(1));

    // Past the last cue it stays on the last one
    report_position(&engine, 119.0).await;
    assert_eq!(engine.active_cue().await, Some(3));
}

#[tokio::test(start_paused = true)]
async fn test_active_cue_changes_are_broadcast_once() {
    let (engine, state) = text_only_engine();
    let payload = CommentaryPayload {
        job_id: None,
        commentary_text: MATCH_COMMENTARY.to_string(),
        audio_url: None,
    };
    engine.load_commentary(&payload).await;
    let mut events = state.subscribe_events();

    report_position(&engine, 5.0).await;
    report_position(&engine, 6.0).await;
    report_position(&engine, 7.0).await;

    let changes: Vec<_> = drain_events(&mut events)
        .into_iter()
        .filter(|e| matches!(e, PlayerEvent::ActiveCueChanged { .. }))
        .collect();
    assert_eq!(changes.len(), 1);
    assert!(matches!(
        changes[0],
        PlayerEvent::ActiveCueChanged {
            cue_index: Some(0),
            cue_secs: Some(secs),
            ..
        } if secs == 5.0
    ));
}

#[tokio::test(start_paused = true)]
async fn test_seeking_backwards_deactivates_cues() {
    let (engine, state) = text_only_engine();
    let payload = CommentaryPayload {
        job_id: None,
        commentary_text: MATCH_COMMENTARY.to_string(),
        audio_url: None,
    };
    engine.load_commentary(&payload).await;

    report_position(&engine, 45.0).await;
    assert_eq!(engine.active_cue().await, Some(1));

    let mut events = state.subscribe_events();
    engine.seek(1.0).await;

    assert_eq!(engine.active_cue().await, None);
    assert!(drain_events(&mut events).iter().any(|e| matches!(
        e,
        PlayerEvent::ActiveCueChanged {
            cue_index: None,
            ..
        }
    )));
}

#[tokio::test(start_paused = true)]
async fn test_session_payload_drives_the_engine() {
    // Payload staged in the session store the way the host does it
    let store = MemorySessionStore::new();
    store.insert(
        keys::COMMENTARY_PAYLOAD,
        &serde_json::json!({
            "commentary_text": "0:10 - Opening exchange\n0:20 - What a shot!",
            "audio_url": null,
        })
        .to_string(),
    );

    let snapshot = SessionSnapshot::load(&store);
    let payload = snapshot.payload.expect("payload should deserialize");
    assert!(payload.audio_url.is_none());

    let (engine, _state) = text_only_engine();
    engine.load_commentary(&payload).await;

    report_position(&engine, 25.0).await;
    let cue = engine.cue(engine.active_cue().await.unwrap()).await.unwrap();
    assert_eq!(cue.text, "What a shot!");
    assert_eq!(cue.category, CueCategory::Excitement);
}

#[tokio::test(start_paused = true)]
async fn test_reloading_commentary_replaces_the_timeline() {
    let (engine, _state) = text_only_engine();
    let first = CommentaryPayload {
        job_id: None,
        commentary_text: MATCH_COMMENTARY.to_string(),
        audio_url: None,
    };
    engine.load_commentary(&first).await;
    report_position(&engine, 45.0).await;
    assert_eq!(engine.active_cue().await, Some(1));

    let second = CommentaryPayload {
        job_id: None,
        commentary_text: "2:00 - Second half begins".to_string(),
        audio_url: None,
    };
    engine.load_commentary(&second).await;

    // Active cue resets until the next position report
    assert_eq!(engine.active_cue().await, None);
    report_position(&engine, 121.0).await;
    assert_eq!(engine.active_cue().await, Some(0));
    assert!(engine.cue(1).await.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_empty_commentary_yields_no_cues() {
    let (engine, state) = text_only_engine();
    let mut events = state.subscribe_events();
    let payload = CommentaryPayload {
        job_id: None,
        commentary_text: "no timestamps anywhere\njust prose\n".to_string(),
        audio_url: None,
    };
    engine.load_commentary(&payload).await;

    assert!(drain_events(&mut events).iter().any(|e| matches!(
        e,
        PlayerEvent::CommentaryLoaded { cue_count: 0, .. }
    )));

    report_position(&engine, 50.0).await;
    assert_eq!(engine.active_cue().await, None);
}
