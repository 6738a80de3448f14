//! Input events read as JSON lines, one event per line.
//!
//! ```text
//! {"event": "button_press", "button": "left", "x": 120.0, "y": 45.5}
//! {"event": "key_press", "key": "escape", "x": 0.0, "y": 0.0}
//! ```

use std::io::{self, BufRead, BufReader};
use std::sync::mpsc::{self, Receiver};
use std::thread;

use contour_engine::InputEvent;
use tracing::{debug, warn};

/// Parse one line; blank lines and `#` comments yield None.
pub fn parse_event_line(line: &str) -> Option<InputEvent> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    match serde_json::from_str(line) {
        Ok(event) => Some(event),
        Err(e) => {
            warn!(error = %e, line, "Ignoring malformed input event");
            None
        }
    }
}

/// Read events from `reader` on a background thread.
///
/// The channel closes when the reader hits end of input or the receiver
/// is dropped.
pub fn spawn_reader<R>(reader: R) -> Receiver<InputEvent>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in reader.lines() {
            let line = match line {
                Ok(line) => line,
                Err(e) => {
                    warn!(error = %e, "Failed to read input event");
                    break;
                }
            };
            if let Some(event) = parse_event_line(&line) {
                if tx.send(event).is_err() {
                    break;
                }
            }
        }
        debug!("Input event reader finished");
    });
    rx
}

/// Read events from standard input.
pub fn spawn_stdin_reader() -> Receiver<InputEvent> {
    spawn_reader(BufReader::new(io::stdin()))
}
