pub mod backend;
pub mod catalog;
pub mod config;
pub mod dialog;
pub mod error;
pub mod log;
pub mod refresh;
pub mod resource;
pub mod runner;
pub mod util;

// Decoupled game loop architecture
pub mod actors;
pub mod app;
pub mod render;
pub mod tea;
pub mod ui;

pub use error::{Error, Result};

/// Architecture verification tests.
///
/// These tests verify the core properties of the Decoupled Game Loop architecture:
/// - Thread safety: Lock-free channels never block
/// - State isolation: Immutable snapshots prevent race conditions
/// - Performance: Consistent frame timing and input latency
#[cfg(test)]
mod architecture_tests {
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use crate::config::Config;
    use crate::dialog::{MessageDialog, Overlay};
    use crate::render::{next_version, RenderState};
    use crate::resource::{ResourceKind, ResourceRow, ResourceTables};
    use crate::tea::Model;

    /// Verify that the frame duration constant aligns with 60 FPS target.
    #[test]
    fn test_frame_duration_is_60fps() {
        const TARGET_FPS: u32 = 60;
        const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS as u64);

        let expected_ms = 1000.0 / 60.0;
        let actual_ms = FRAME_DURATION.as_secs_f64() * 1000.0;

        assert!(
            (actual_ms - expected_ms).abs() < 0.1,
            "Frame duration should be ~16.67ms, got {}ms",
            actual_ms
        );
    }

    /// RenderState::default() is what the render thread starts from.
    #[test]
    fn test_render_state_default_is_cheap() {
        let start = Instant::now();
        for _ in 0..10000 {
            let _ = RenderState::default();
        }
        let elapsed = start.elapsed();

        assert!(
            elapsed.as_millis() < 100,
            "Creating 10000 default RenderStates took {:?} - should be < 100ms",
            elapsed
        );
    }

    /// Verify that try_send never blocks on a full channel.
    #[test]
    fn test_try_send_never_blocks_on_full_channel() {
        let (tx, _rx) = crossbeam_channel::bounded::<RenderState>(1);
        let _ = tx.try_send(RenderState::default());

        let iterations = 10000;
        let start = Instant::now();
        for _ in 0..iterations {
            let _ = tx.try_send(RenderState::default());
        }
        let elapsed = start.elapsed();

        let avg_ns = elapsed.as_nanos() / iterations as u128;
        assert!(
            avg_ns < 1000,
            "try_send averaged {}ns per call - should be < 1000ns",
            avg_ns
        );
    }

    /// Cloning a snapshot carrying a large inspect document stays cheap.
    #[test]
    fn test_render_state_clone_performance() {
        let state = RenderState {
            version: 42,
            overlay: Overlay::Message(MessageDialog::new("podman container inspect", "A".repeat(10000))),
            ..Default::default()
        };

        let start = Instant::now();
        for _ in 0..1000 {
            let _ = state.clone();
        }
        let elapsed = start.elapsed();

        assert!(
            elapsed.as_millis() < 500,
            "Cloning 1000 states with a 10KB message took {:?} - should be < 500ms",
            elapsed
        );
    }

    /// Snapshots are taken on every dirty loop iteration; a few hundred rows
    /// must not stall the logic thread.
    #[test]
    fn test_snapshot_of_large_table_is_fast() {
        let tables = Arc::new(ResourceTables::new());
        let rows = (0..500)
            .map(|i| {
                ResourceRow::new(
                    format!("{:012x}", i),
                    format!("container-{}", i),
                    vec![format!("{:012x}", i), "docker.io/library/nginx:latest".into()],
                )
            })
            .collect();
        tables.replace(ResourceKind::Containers, rows);
        let model = Model::new(Config::default(), tables);

        let start = Instant::now();
        let mut last = 0;
        for _ in 0..100 {
            let snapshot = model.snapshot();
            assert!(snapshot.version > last || last == 0);
            last = snapshot.version;
        }
        let elapsed = start.elapsed();

        assert!(
            elapsed.as_millis() < 500,
            "100 snapshots of 500 rows took {:?} - should be < 500ms",
            elapsed
        );
    }

    /// Simulate rapid state updates: the drain-and-send pattern of the logic
    /// thread never blocks.
    #[test]
    fn test_rapid_state_updates_dont_block() {
        let (tx, rx) = crossbeam_channel::bounded::<RenderState>(1);

        let start = Instant::now();
        for i in 0..1000 {
            let _ = rx.try_recv();
            let state = RenderState {
                version: next_version(),
                active: i % 5,
                ..Default::default()
            };
            let _ = tx.try_send(state);
        }
        let elapsed = start.elapsed();

        assert!(
            elapsed.as_millis() < 50,
            "1000 rapid state updates took {:?} - should be < 50ms",
            elapsed
        );
    }
}
