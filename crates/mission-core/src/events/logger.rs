//! Event Logger
//!
//! Append-only JSONL event logging.

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use mission_events::Event;

use crate::error::SimResult;

/// Default event log path
pub const EVENTS_PATH: &str = "output/events.jsonl";

/// Writes one JSON event per line
pub struct EventLogger {
    writer: Option<BufWriter<File>>,
    event_count: u64,
}

impl EventLogger {
    /// Create a new event logger writing to the specified path
    pub fn new(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            event_count: 0,
        })
    }

    /// Create a logger that discards events (for testing)
    pub fn null() -> Self {
        Self {
            writer: None,
            event_count: 0,
        }
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    pub fn log(&mut self, event: &Event) -> SimResult<()> {
        self.event_count += 1;
        if let Some(ref mut writer) = self.writer {
            let json = serde_json::to_string(event)?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    pub fn log_batch(&mut self, events: &[Event]) -> SimResult<()> {
        for event in events {
            self.log(event)?;
        }
        Ok(())
    }

    /// Flush the buffer to disk
    pub fn flush(&mut self) -> SimResult<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!(error = %e, "failed to flush event log");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mission_events::{AgentId, EventKind, Tier, WasteId};
    use std::io::BufRead;

    #[test]
    fn test_event_logging() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.jsonl");

        let mut logger = EventLogger::new(&path).unwrap();
        logger
            .log_batch(&[
                Event::new(
                    "evt_00000001",
                    1,
                    AgentId(2),
                    EventKind::Picked {
                        waste: WasteId(4),
                        tier: Tier::Green,
                    },
                ),
                Event::new("evt_00000002", 1, AgentId(0), EventKind::Waited),
            ])
            .unwrap();
        logger.flush().unwrap();

        let file = File::open(&path).unwrap();
        let lines: Vec<String> = std::io::BufReader::new(file)
            .lines()
            .map(|l| l.unwrap())
            .collect();
        assert_eq!(lines.len(), 2);

        let parsed: Event = serde_json::from_str(&lines[0]).unwrap();
        assert_eq!(parsed.event_id, "evt_00000001");
        assert_eq!(parsed.agent_id, AgentId(2));
        assert_eq!(logger.event_count(), 2);
    }

    #[test]
    fn test_null_logger() {
        let mut logger = EventLogger::null();
        logger
            .log(&Event::new("evt_1", 1, AgentId(1), EventKind::Waited))
            .unwrap();
        assert_eq!(logger.event_count(), 1);
    }
}
