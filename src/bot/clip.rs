//! The clip-creation workflow: create, then poll until playable or out of
//! attempts.
use crate::api::twitch::{self, Helix};
use crate::api::ApiError;
use std::time::Duration;

/// Clip generation usually lands well inside this window (5 * 2.5s).
pub const POLL_ATTEMPTS: u32 = 5;
pub const POLL_INTERVAL: Duration = Duration::from_millis(2500);

/// The per-invocation state of one clip request. Independent per `!clip`;
/// two concurrent invocations never share a job.
#[derive(Debug)]
pub struct ClipJob {
    pub broadcaster_id: String,
    pub clip_id: String,
    pub attempts_remaining: u32,
    pub status: ClipStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipStatus {
    Pending,
    Ready(String),
    Failed,
}

/// Where a clip request ended up. Exactly one of these is reported to chat.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipOutcome {
    Created { url: String },
    TimedOut,
    Forbidden,
}

impl ClipJob {
    /// The outcome a job in a terminal status reports to chat. A job still
    /// `Pending` here ran out of attempts without a playable url.
    fn outcome(self) -> ClipOutcome {
        match self.status {
            ClipStatus::Ready(url) => ClipOutcome::Created { url },
            ClipStatus::Pending | ClipStatus::Failed => ClipOutcome::TimedOut,
        }
    }
}

/// One external clip operation pair. Implemented for [Helix] in production;
/// tests script their own.
pub trait ClipApi {
    async fn create(&self, broadcaster_id: &str) -> Result<String, ApiError>;
    /// `Ok(Some(url))` once the clip is playable, `Ok(None)` while the
    /// platform is still processing it.
    async fn poll(&self, clip_id: &str) -> Result<Option<String>, ApiError>;
}

impl ClipApi for Helix {
    async fn create(&self, broadcaster_id: &str) -> Result<String, ApiError> {
        twitch::create_clip(broadcaster_id, self).await
    }
    async fn poll(&self, clip_id: &str) -> Result<Option<String>, ApiError> {
        Ok(twitch::get_clip(clip_id, self)
            .await?
            .and_then(|clip| clip.url))
    }
}

/// Runs one clip request to its terminal state.
///
/// A forbidden create call ends the job immediately with zero polls. Each
/// poll tick consumes exactly one attempt, whether the clip was not indexed
/// yet, had no url yet, or the poll call itself failed; only a playable url
/// or an exhausted budget ends the loop.
///
/// # Errors
/// Only the create call can fail the workflow (other than 403); poll errors
/// are absorbed into the attempt budget.
pub async fn run<A: ClipApi>(
    api: &A,
    broadcaster_id: String,
    interval: Duration,
    attempts: u32,
) -> Result<ClipOutcome, ApiError> {
    let clip_id = match api.create(&broadcaster_id).await {
        Ok(id) => id,
        Err(ApiError::Forbidden) => return Ok(ClipOutcome::Forbidden),
        Err(err) => return Err(err),
    };

    let mut job = ClipJob {
        broadcaster_id,
        clip_id,
        attempts_remaining: attempts,
        status: ClipStatus::Pending,
    };
    log::debug!(
        "Created clip {} for broadcaster {}, polling",
        job.clip_id,
        job.broadcaster_id
    );
    while job.attempts_remaining > 0 && job.status == ClipStatus::Pending {
        tokio::time::sleep(interval).await;
        job.attempts_remaining -= 1;

        match api.poll(&job.clip_id).await {
            Ok(Some(url)) => job.status = ClipStatus::Ready(url),
            // Not indexed yet: the attempt is spent, nothing else changes.
            Ok(None) => {}
            Err(err) => {
                log::debug!("Still waiting for clip {}: {err}", job.clip_id);
            }
        }
    }
    if job.status == ClipStatus::Pending {
        job.status = ClipStatus::Failed;
    }
    Ok(job.outcome())
}
