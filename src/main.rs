// src/main.rs

use anyhow::Result;
use shot_detection::{Config, DetectionStream, ShotSession};
use std::io::Write;
use std::path::Path;
use tracing::{error, info};

fn main() -> Result<()> {
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.yaml".to_string());
    let config = Config::load(&config_path)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!("shot_detection={}", config.logging.level))
        .init();

    info!("🏀 Shot Detection System Starting");
    info!("✓ Configuration loaded from {}", config_path);
    info!(
        "Thresholds: ball={:.2} (near hoop {:.2}), hoop={:.2}, person={:.2}, resolve every {} frames",
        config.detection.ball_confidence,
        config.detection.ball_near_hoop_confidence,
        config.detection.hoop_confidence,
        config.detection.person_confidence,
        config.shot.resolve_interval
    );

    let mut stream = DetectionStream::open(&config.stream.input_path)?;
    info!("✓ Detection stream open: {}", config.stream.input_path);

    std::fs::create_dir_all(&config.stream.output_dir)?;
    let stream_name = Path::new(&config.stream.input_path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("session");
    let jsonl_path =
        Path::new(&config.stream.output_dir).join(format!("{}_shots.jsonl", stream_name));
    let mut results_file = std::fs::File::create(&jsonl_path)?;
    info!("💾 Shot events will be written to: {}", jsonl_path.display());

    let mut session = ShotSession::new(&config);
    let mut frame_count: u64 = 0;
    let mut events_written: usize = 0;

    loop {
        let frame = match stream.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(e) => {
                // Totals up to this point stay valid and final
                error!("detection stream unreadable: {}", e);
                break;
            }
        };
        frame_count += 1;

        let result =
            session.process_frame(frame.frame_index, &frame.boxes, frame.width, frame.height);

        if let Some(event) = result.event {
            let json_line = serde_json::to_string(&event)?;
            writeln!(results_file, "{}", json_line)?;
            results_file.flush()?;
            events_written += 1;
            info!(
                "🎯 {} at frame {} (up {} → down {}) | score {}/{}",
                event.outcome.as_str(),
                event.resolved_frame,
                event.up_frame,
                event.down_frame,
                event.totals.makes,
                event.totals.attempts
            );
        }

        if frame_count % 300 == 0 {
            info!(
                "Progress: frame {} | state: {} | score: {}/{}",
                frame.frame_index,
                session.state().as_str(),
                result.totals.makes,
                result.totals.attempts
            );
        }
    }

    let totals = session.totals();
    info!("\n📊 Final Report:");
    info!("  Frames processed: {}", frame_count);
    info!("  🎯 Attempts: {}", totals.attempts);
    info!("  ✅ Makes: {}", totals.makes);
    if totals.attempts > 0 {
        info!(
            "  Shooting: {:.1}%",
            100.0 * totals.makes as f64 / totals.attempts as f64
        );
    }
    info!("  Events written: {}", events_written);

    Ok(())
}
