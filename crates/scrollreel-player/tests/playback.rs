use std::time::Duration;

use scrollreel_core::{Color, FrameBuffer, ReelError, SequenceConfig, SequenceTuning};
use scrollreel_player::{
    DrawOutcome, FrameRequest, Generation, LoadEvent, PlayerHost, ReadyCause, ScrollGeometry,
    ScrollPlayer, SkipReason, SoftwareSurface, Surface, ViewportSize,
};

/// Records what the player asked of its host.
#[derive(Default)]
struct RecordingHost {
    requests: Vec<FrameRequest>,
    armed: Vec<(Generation, Duration)>,
    disarmed: Vec<Generation>,
}

impl PlayerHost for RecordingHost {
    fn fetch_frame(&mut self, request: FrameRequest) {
        self.requests.push(request);
    }

    fn arm_safety_timer(&mut self, generation: Generation, after: Duration) {
        self.armed.push((generation, after));
    }

    fn disarm_safety_timer(&mut self, generation: Generation) {
        self.disarmed.push(generation);
    }
}

const MAGENTA: [u8; 4] = [255, 0, 255, 255];

fn sequence(url: &str) -> SequenceConfig {
    SequenceConfig::new(
        url,
        &SequenceTuning {
            frame_count: 192,
            load_threshold: 20.0 / 192.0,
            safety_timeout_ms: 2000,
        },
    )
    .unwrap()
}

fn frame(shade: u8) -> FrameBuffer {
    FrameBuffer::solid(8, 10, &Color::from_rgba8([shade, shade, shade, 255]))
}

fn mounted() -> ScrollPlayer<SoftwareSurface> {
    ScrollPlayer::mount(SoftwareSurface::new(0, 0), ViewportSize::new(192, 108))
}

fn hero(progress: f64) -> ScrollGeometry {
    ScrollGeometry::hero(108.0, progress)
}

#[test]
fn test_mount_sizes_surface_to_viewport() {
    let player = mounted();
    assert_eq!(player.surface().size(), (192, 108));
    assert!(!player.is_ready());
    assert!(player.frames().is_none());
}

#[test]
fn test_load_requests_every_frame_and_arms_timer() {
    let mut player = mounted();
    let mut host = RecordingHost::default();

    assert!(player.load(sequence("https://cdn.test/a/"), &mut host).unwrap());
    assert_eq!(host.requests.len(), 192);
    assert_eq!(
        host.requests[42].url,
        "https://cdn.test/a/frame_042_delay-0.04s.png"
    );
    assert_eq!(host.armed, vec![(Generation::first(), Duration::from_millis(2000))]);

    // Same config again: nothing new in flight.
    assert!(!player.load(sequence("https://cdn.test/a/"), &mut host).unwrap());
    assert_eq!(host.requests.len(), 192);
    assert_eq!(host.armed.len(), 1);
}

#[test]
fn test_scroll_before_ready_is_noop() {
    let mut player = mounted();
    let mut host = RecordingHost::default();
    player.load(sequence("https://cdn.test/a/"), &mut host).unwrap();

    let tickets: Vec<_> = host.requests.iter().map(|r| r.ticket).collect();
    for ticket in &tickets[..19] {
        player.on_frame_complete(*ticket, Ok(frame(100)), &mut host);
    }
    assert_eq!(player.on_scroll(hero(0.5)), None);
    assert_eq!(player.surface().buffer().get_pixel(0, 0), Some([0, 0, 0, 0]));
    assert_eq!(player.state().current_frame_index, 0);
}

#[test]
fn test_ready_after_twenty_frames_then_draws() {
    let mut player = mounted();
    let mut host = RecordingHost::default();
    player.load(sequence("https://cdn.test/a/"), &mut host).unwrap();
    let tickets: Vec<_> = host.requests.iter().map(|r| r.ticket).collect();

    // Completion order is arbitrary; load from the far end first.
    let mut last = LoadEvent::Ignored;
    for ticket in tickets.iter().rev().take(20) {
        last = player.on_frame_complete(*ticket, Ok(frame(200)), &mut host);
    }
    assert_eq!(last, LoadEvent::BecameReady(ReadyCause::Threshold));
    assert!(player.is_ready());
    assert_eq!(host.disarmed, vec![Generation::first()]);

    // Later failures never revoke readiness.
    for ticket in &tickets[..50] {
        player.on_frame_complete(
            *ticket,
            Err(ReelError::asset("status 404", "x")),
            &mut host,
        );
    }
    assert!(player.is_ready());

    let outcome = player.on_scroll(hero(1.0)).unwrap();
    assert!(outcome.is_drawn());
    assert_eq!(player.state().current_frame_index, 191);
    assert_eq!(player.state().scroll_progress, 1.0);
    assert_eq!(player.surface().buffer().get_pixel(96, 54), Some([200, 200, 200, 255]));

    // Frame 0 failed: the previous pixels stay on screen.
    let outcome = player.on_scroll(hero(0.0)).unwrap();
    assert_eq!(
        outcome,
        DrawOutcome::Skipped {
            index: 0,
            reason: SkipReason::Failed
        }
    );
    assert_eq!(player.surface().buffer().get_pixel(96, 54), Some([200, 200, 200, 255]));
    assert_eq!(player.last_drawn(), Some(191));
}

#[test]
fn test_safety_timeout_with_no_frames() {
    let mut player = mounted();
    let mut host = RecordingHost::default();
    player.load(sequence("https://cdn.test/a/"), &mut host).unwrap();

    assert_eq!(
        player.on_safety_timeout(Generation::first()),
        LoadEvent::BecameReady(ReadyCause::SafetyTimeout)
    );
    assert!(player.is_ready());

    for progress in [0.0, 0.3, 1.0] {
        let outcome = player.on_scroll(hero(progress)).unwrap();
        assert!(!outcome.is_drawn());
    }
    assert_eq!(player.surface().buffer().get_pixel(10, 10), Some([0, 0, 0, 0]));
    assert_eq!(player.last_drawn(), None);
}

#[test]
fn test_skipped_draw_leaves_existing_pixels() {
    let mut player = ScrollPlayer::mount(
        {
            let mut surface = SoftwareSurface::new(0, 0);
            surface.set_size(192, 108);
            surface.fill(&Color::from_rgba8(MAGENTA));
            surface
        },
        ViewportSize::new(192, 108),
    );
    let mut host = RecordingHost::default();
    player.load(sequence("https://cdn.test/a/"), &mut host).unwrap();
    player.on_safety_timeout(Generation::first());

    player.on_scroll(hero(0.7));
    assert_eq!(player.surface().buffer().get_pixel(0, 0), Some(MAGENTA));
    assert_eq!(player.surface().buffer().get_pixel(191, 107), Some(MAGENTA));
}

#[test]
fn test_switching_sequence_discards_stale_callbacks() {
    let mut player = mounted();
    let mut host = RecordingHost::default();
    player.load(sequence("https://cdn.test/a/"), &mut host).unwrap();
    let old: Vec<_> = host.requests.iter().map(|r| r.ticket).collect();
    for ticket in &old[..5] {
        player.on_frame_complete(*ticket, Ok(frame(10)), &mut host);
    }

    assert!(player.load(sequence("https://cdn.test/b/"), &mut host).unwrap());
    let current = player.generation().unwrap();
    assert_ne!(current, Generation::first());
    assert_eq!(host.disarmed, vec![Generation::first()]);
    assert_eq!(host.requests.len(), 384);
    assert_eq!(
        host.requests[192].url,
        "https://cdn.test/b/frame_000_delay-0.04s.png"
    );

    let frames = player.frames().unwrap();
    assert_eq!(frames.loaded_count(), 0);
    assert!(!player.is_ready());

    // Late arrivals from the old sequence.
    for ticket in &old[5..] {
        assert_eq!(
            player.on_frame_complete(*ticket, Ok(frame(10)), &mut host),
            LoadEvent::Ignored
        );
    }
    assert_eq!(player.on_safety_timeout(Generation::first()), LoadEvent::Ignored);
    assert_eq!(player.frames().unwrap().loaded_count(), 0);
    assert!(!player.is_ready());

    assert_eq!(
        player.on_safety_timeout(current),
        LoadEvent::BecameReady(ReadyCause::SafetyTimeout)
    );
}

#[test]
fn test_resize_syncs_surface_and_redraws() {
    let mut player = mounted();
    let mut host = RecordingHost::default();
    player.load(sequence("https://cdn.test/a/"), &mut host).unwrap();

    // Resizing before readiness still resizes, but does not draw.
    let outcome = player.on_resize(ViewportSize::new(100, 50), ScrollGeometry::hero(50.0, 0.0));
    assert_eq!(outcome, None);
    assert_eq!(player.surface().size(), (100, 50));

    let tickets: Vec<_> = host.requests.iter().map(|r| r.ticket).collect();
    for ticket in &tickets[..20] {
        player.on_frame_complete(*ticket, Ok(frame(77)), &mut host);
    }
    let outcome = player
        .on_resize(ViewportSize::new(80, 60), ScrollGeometry::hero(60.0, 0.0))
        .unwrap();
    assert_eq!(player.viewport(), ViewportSize::new(80, 60));
    assert_eq!(player.surface().size(), (80, 60));
    match outcome {
        DrawOutcome::Drawn { index, dest } => {
            assert_eq!(index, 0);
            // 8x10 frame on 80x60: width matches, 100px tall, centered.
            assert_eq!((dest.x, dest.y, dest.width, dest.height), (0.0, -20.0, 80.0, 100.0));
        }
        other => panic!("expected a draw, got {:?}", other),
    }
    assert_eq!(player.surface().buffer().get_pixel(79, 59), Some([77, 77, 77, 255]));
}

#[test]
fn test_restart_and_teardown() {
    let mut player = mounted();
    let mut host = RecordingHost::default();
    player.load(sequence("https://cdn.test/a/"), &mut host).unwrap();

    player.restart(&mut host);
    assert_eq!(host.requests.len(), 384);
    assert_eq!(host.armed.len(), 2);
    let second = player.generation().unwrap();
    assert_eq!(second, Generation::first().next());

    player.teardown(&mut host);
    assert_eq!(host.disarmed, vec![Generation::first(), second]);
    assert!(player.frames().is_none());
    assert_eq!(player.on_safety_timeout(second), LoadEvent::Ignored);
    assert!(!player.is_ready());
}
