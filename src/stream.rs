// Frame-source collaborator: recorded detector output replayed from a
// JSONL file, one frame per line:
//
//   {"frame_index": 0, "width": 1280.0, "height": 720.0,
//    "boxes": [{"class_id": 0, "confidence": 0.82,
//               "x1": 610.0, "y1": 240.0, "x2": 640.0, "y2": 270.0}]}
//
// Keeps video decode and model inference outside the crate; the core only
// ever sees the detector's box shape.

use crate::types::RawDetection;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

fn default_width() -> f32 {
    1280.0
}

fn default_height() -> f32 {
    720.0
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionFrame {
    pub frame_index: u64,
    #[serde(default = "default_width")]
    pub width: f32,
    #[serde(default = "default_height")]
    pub height: f32,
    #[serde(default)]
    pub boxes: Vec<RawDetection>,
}

pub struct DetectionStream {
    reader: BufReader<File>,
    line: String,
    pub frames_read: u64,
}

impl DetectionStream {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("failed to open detection stream {}", path.display()))?;
        Ok(Self {
            reader: BufReader::new(file),
            line: String::new(),
            frames_read: 0,
        })
    }

    /// Next frame, or None at end of stream. Blank lines are skipped.
    pub fn next_frame(&mut self) -> Result<Option<DetectionFrame>> {
        loop {
            self.line.clear();
            let n = self
                .reader
                .read_line(&mut self.line)
                .context("failed to read detection stream")?;
            if n == 0 {
                return Ok(None);
            }
            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }
            let frame: DetectionFrame = serde_json::from_str(trimmed)
                .with_context(|| format!("malformed detection frame: {}", trimmed))?;
            self.frames_read += 1;
            return Ok(Some(frame));
        }
    }
}
