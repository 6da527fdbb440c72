//! Integration tests for the focus tracker pipeline

use pretty_assertions::assert_eq;
use chrono::Utc;
use std::io::Cursor;
use std::thread;
use std::time::Duration;
use synheart_focus_agent::core::{
    session_summary, FocusStatus, GazeSample, ReportBuilder, SessionRecorder, SessionReport,
    FACE_MESH_IRIS_V1,
};
use synheart_focus_agent::source::{
    channel_source, read_entries, Landmark, LandmarkFrame, ReplayEntry, ScriptedSource,
};
use synheart_focus_agent::tracker::{FocusTracker, TickOutcome, TrackerError};
use synheart_focus_agent::transparency::create_shared_log;

/// Landmark set with both eyes looking along the given gaze ratios.
fn landmarks(left_ratio: f64, right_ratio: f64) -> Vec<Landmark> {
    let topology = FACE_MESH_IRIS_V1;
    let mut points = vec![Landmark::default(); topology.required_landmarks()];

    for idx in topology.left.iris {
        points[idx] = Landmark::new(0.50 + 0.25 * left_ratio, 0.50);
    }
    points[topology.left.inner_corner] = Landmark::new(0.50, 0.50);
    points[topology.left.outer_corner] = Landmark::new(0.75, 0.50);

    for idx in topology.right.iris {
        points[idx] = Landmark::new(0.50 - 0.25 * right_ratio, 0.50);
    }
    points[topology.right.inner_corner] = Landmark::new(0.50, 0.50);
    points[topology.right.outer_corner] = Landmark::new(0.25, 0.50);

    points
}

fn centered(at_ms: i64) -> LandmarkFrame {
    LandmarkFrame::face(landmarks(0.5, 0.5)).captured_at(at_ms)
}

fn looking_away(at_ms: i64) -> LandmarkFrame {
    LandmarkFrame::face(landmarks(1.0, 0.0)).captured_at(at_ms)
}

fn sample(timestamp: i64, focus_level: f64) -> GazeSample {
    GazeSample::new(timestamp, focus_level, 0.5, 0.5)
}

#[test]
fn test_two_question_session_summary() {
    let mut recorder = SessionRecorder::new(1);
    recorder.record(sample(1000, 90.0)).unwrap();
    recorder.record(sample(1100, 85.0)).unwrap();
    recorder.record(sample(1200, 95.0)).unwrap();
    recorder.set_current_question(2).unwrap();
    recorder.record(sample(2000, 30.0)).unwrap();
    recorder.record(sample(2100, 20.0)).unwrap();

    let summary = session_summary(&recorder);

    assert_eq!(summary.per_question.len(), 2);
    let q1 = &summary.per_question[0];
    assert_eq!(q1.question_number, 1);
    assert_eq!(q1.average_focus_percent, 90.0);
    assert_eq!(q1.focus_status, FocusStatus::HighlyFocused);
    assert_eq!(q1.time_spent_ms, 200);

    let q2 = &summary.per_question[1];
    assert_eq!(q2.question_number, 2);
    assert_eq!(q2.average_focus_percent, 25.0);
    assert_eq!(q2.focus_status, FocusStatus::Distracted);
    assert_eq!(q2.time_spent_ms, 100);

    assert_eq!(summary.overall_focus_percent, 64.0);
    assert_eq!(summary.total_duration_ms, 300);
    assert_eq!(summary.total_samples, 5);
    assert_eq!(summary.focus_time_percent(), 64);
}

#[test]
fn test_tracker_end_to_end_with_smoothing() {
    let source = ScriptedSource::from_frames([
        centered(1000),
        centered(1100),
        centered(1200),
        looking_away(2000),
        looking_away(2100),
    ]);

    let mut tracker = FocusTracker::new();
    tracker.start_tracking(source).unwrap();

    for _ in 0..3 {
        assert!(matches!(tracker.tick(), TickOutcome::Recorded(_)));
    }
    tracker.set_current_question(2).unwrap();
    for _ in 0..2 {
        assert!(matches!(tracker.tick(), TickOutcome::Recorded(_)));
    }

    // The window carries over between questions: 300/4 then 300/5
    let levels: Vec<f64> = tracker
        .recorder()
        .bucket(2)
        .unwrap()
        .snapshots
        .iter()
        .map(|s| s.focus_level)
        .collect();
    assert_eq!(levels, vec![75.0, 60.0]);

    let summary = tracker.finish_session();
    let q1 = &summary.per_question[0];
    assert_eq!(q1.average_focus_percent, 100.0);
    assert_eq!(q1.time_spent_ms, 200);
    let q2 = &summary.per_question[1];
    assert_eq!(q2.average_focus_percent, 67.5);
    assert_eq!(q2.focus_status, FocusStatus::Focused);
    assert_eq!(q2.time_spent_ms, 100);

    assert_eq!(summary.overall_focus_percent, 87.0);
    assert_eq!(summary.total_focused_time_ms, 300);
    assert_eq!(summary.integrated_focused_time_ms, 300);
}

#[test]
fn test_questions_without_samples_are_omitted() {
    let source = ScriptedSource::from_frames([centered(1000), centered(1500)]);
    let mut tracker = FocusTracker::new();
    tracker.start_tracking(source).unwrap();

    tracker.set_current_question(3).unwrap();
    tracker.tick();
    tracker.set_current_question(4).unwrap();
    tracker.set_current_question(3).unwrap();
    tracker.tick();

    let per_question = tracker.per_question_data();
    assert_eq!(per_question.len(), 1);
    assert_eq!(per_question[0].question_number, 3);
    assert_eq!(per_question[0].time_spent_ms, 500);
    assert!(tracker.recorder().bucket(1).is_none());
    assert!(tracker.recorder().bucket(4).is_none());
}

#[test]
fn test_summaries_are_repeatable() {
    let source = ScriptedSource::from_frames([centered(0), looking_away(40), centered(80)]);
    let mut tracker = FocusTracker::new();
    tracker.start_tracking(source).unwrap();
    for _ in 0..3 {
        tracker.tick();
    }

    let first = tracker.session_summary();
    let second = tracker.session_summary();
    assert_eq!(first, second);
    assert_eq!(tracker.per_question_data(), first.per_question);
}

#[test]
fn test_empty_session() {
    let mut tracker = FocusTracker::new();
    tracker
        .start_tracking(ScriptedSource::from_frames([
            LandmarkFrame::no_face(),
            LandmarkFrame::not_ready(),
        ]))
        .unwrap();
    assert_eq!(tracker.tick(), TickOutcome::NoFace);
    assert_eq!(tracker.tick(), TickOutcome::NotReady);

    let summary = tracker.finish_session();
    assert_eq!(summary.overall_focus_percent, 0.0);
    assert_eq!(summary.total_duration_ms, 0);
    assert_eq!(summary.total_samples, 0);
    assert!(summary.per_question.is_empty());
    assert_eq!(tracker.current_focus_label(), "NOT TRACKING");
}

#[test]
fn test_failed_init_keeps_previous_session() {
    let mut tracker = FocusTracker::new();
    tracker
        .start_tracking(ScriptedSource::from_frames([centered(1000)]))
        .unwrap();
    tracker.tick();
    tracker.stop_tracking();

    let result = tracker.start_tracking(ScriptedSource::new().failing_init("model missing"));
    assert!(matches!(result, Err(TrackerError::NotReady(_))));
    assert!(!tracker.is_ready());
    assert_eq!(tracker.session_summary().total_samples, 1);
}

#[test]
fn test_channel_source_feeds_freshest_frame() {
    let (frames, source) = channel_source(8);
    let mut tracker = FocusTracker::new();
    tracker.start_tracking(source).unwrap();

    assert_eq!(tracker.tick(), TickOutcome::NotReady);

    frames.send(looking_away(1000)).unwrap();
    frames.send(centered(1033)).unwrap();
    match tracker.tick() {
        TickOutcome::Recorded(sample) => {
            assert_eq!(sample.timestamp, 1033);
            assert_eq!(sample.focus_level, 100.0);
        }
        other => panic!("expected a recorded sample, got {other:?}"),
    }
    assert_eq!(tracker.recorder().sample_count(), 1);
}

#[test]
fn test_stop_from_another_thread() {
    let (frames, source) = channel_source(1);
    let mut tracker = FocusTracker::new();
    let handle = tracker.start_tracking(source).unwrap();

    let producer = thread::spawn(move || {
        for i in 0..5 {
            if frames.try_send(centered(i * 33)).is_err() {
                thread::sleep(Duration::from_millis(5));
            }
        }
        thread::sleep(Duration::from_millis(20));
        handle.stop();
    });

    tracker.run_paced(Duration::from_millis(2));
    producer.join().unwrap();

    assert!(!tracker.is_tracking());
    assert_eq!(tracker.tick(), TickOutcome::Idle);
}

#[test]
fn test_transparency_counts_pipeline() {
    let log = create_shared_log();
    let mut tracker = FocusTracker::new().with_transparency(log.clone());
    tracker
        .start_tracking(ScriptedSource::from_frames([
            centered(0),
            LandmarkFrame::no_face(),
            LandmarkFrame::face(vec![Landmark::new(0.5, 0.5); 468]),
            centered(66),
        ]))
        .unwrap();
    for _ in 0..4 {
        tracker.tick();
    }

    let stats = log.stats();
    assert_eq!(stats.sessions_started, 1);
    assert_eq!(stats.frames_processed, 2);
    assert_eq!(stats.frames_without_face, 1);
    assert_eq!(stats.frames_rejected, 1);
}

#[test]
fn test_replay_stream_through_tracker() {
    let stream = format!(
        "{}\n{{\"question\": 2}}\n\n{}\nnot json\n",
        serde_json::to_string(&centered(1000)).unwrap(),
        serde_json::to_string(&centered(1250)).unwrap(),
    );

    let (frames, source) = channel_source(4);
    let mut tracker = FocusTracker::new();
    tracker.start_tracking(source).unwrap();

    let mut errors = 0;
    for entry in read_entries(Cursor::new(stream)) {
        match entry {
            Ok(ReplayEntry::Question { question }) => tracker.set_current_question(question).unwrap(),
            Ok(ReplayEntry::Frame(frame)) => {
                frames.send(frame).unwrap();
                tracker.tick();
            }
            Err(_) => errors += 1,
        }
    }

    assert_eq!(errors, 1);
    let per_question = tracker.per_question_data();
    assert_eq!(per_question.len(), 2);
    assert_eq!(per_question[0].question_number, 1);
    assert_eq!(per_question[1].question_number, 2);
}

#[test]
fn test_report_from_finished_session() {
    let mut tracker = FocusTracker::new();
    tracker
        .start_tracking(ScriptedSource::from_frames([centered(1000), centered(1100)]))
        .unwrap();
    tracker.tick();
    tracker.tick();
    let summary = tracker.finish_session();

    let report = ReportBuilder::new()
        .with_device_id("test-device")
        .include_snapshots(false)
        .build(
            tracker.session_id().unwrap(),
            tracker.started_at().unwrap(),
            tracker.ended_at().unwrap(),
            &summary,
        );

    assert_eq!(report.device_id, "test-device");
    assert_eq!(report.focus_time_percent, 100);
    assert!(report.summary.per_question[0].snapshots.is_empty());

    assert!(!report.privacy.contains_landmarks);
    let json = serde_json::to_string(&report).unwrap();
    assert!(!json.contains("\"landmarks\":"));
}

#[test]
fn test_non_finite_frame_is_skipped() {
    let mut bad = landmarks(0.5, 0.5);
    bad[FACE_MESH_IRIS_V1.left.iris[0]] = Landmark::new(f64::NAN, 0.5);

    let mut tracker = FocusTracker::new();
    tracker
        .start_tracking(ScriptedSource::from_frames([
            LandmarkFrame::face(bad).captured_at(0),
            centered(100),
            centered(200),
            centered(300),
            centered(400),
        ]))
        .unwrap();

    assert!(matches!(tracker.tick(), TickOutcome::Rejected(_)));
    assert_eq!(tracker.recorder().sample_count(), 0);
    for _ in 0..4 {
        match tracker.tick() {
            TickOutcome::Recorded(sample) => assert_eq!(sample.focus_level, 100.0),
            other => panic!("expected a recorded sample, got {other:?}"),
        }
    }

    let summary = tracker.finish_session();
    assert_eq!(summary.overall_focus_percent, 100.0);
    assert_eq!(summary.total_focused_time_ms, 300);

    let report = ReportBuilder::new().build("session", Utc::now(), Utc::now(), &summary);
    let json = serde_json::to_string(&report).unwrap();
    let restored: SessionReport = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.summary, summary);
}

#[test]
fn test_producer_hangup_ends_session() {
    let (frames, source) = channel_source(4);
    let mut tracker = FocusTracker::new();
    let handle = tracker.start_tracking(source).unwrap();

    frames.send(centered(1000)).unwrap();
    drop(frames);

    assert!(matches!(tracker.tick(), TickOutcome::Recorded(_)));
    assert_eq!(tracker.tick(), TickOutcome::Ended);
    assert!(!handle.is_active());
    assert_eq!(tracker.run_paced(Duration::from_millis(1)), 0);
}
