//! JSON-lines turn loop.
//!
//! Each input line is one [`TurnEvent`]; each processed event produces one
//! line holding the serialized [`VoiceDirective`](ivr_types::VoiceDirective).
//!
//! Events are handled strictly one after another, so the n-th output line
//! answers the n-th accepted input line. A slow generator call for one call
//! delays the events queued behind it, including those of other calls. Hosts
//! that need per-call concurrency drive [`DialogueController`] directly.

use ivr_dialogue::DialogueController;
use ivr_types::TurnEvent;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode directive: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Counters reported when the input is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    pub processed: usize,
    pub skipped: usize,
}

/// Feeds every event read from `input` through `controller`, writing the
/// directives to `output`, until `input` reaches EOF.
///
/// Blank lines are ignored and lines that are not valid JSON are logged and
/// skipped.
pub async fn run<R, W>(
    controller: &DialogueController,
    input: R,
    mut output: W,
) -> Result<DriverStats, DriverError>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut stats = DriverStats::default();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event: TurnEvent = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed turn event");
                stats.skipped += 1;
                continue;
            }
        };

        let directive = controller.handle_turn(&event).await;
        let mut encoded = serde_json::to_string(&directive)?;
        encoded.push('\n');
        output.write_all(encoded.as_bytes()).await?;
        output.flush().await?;
        stats.processed += 1;
    }

    Ok(stats)
}
