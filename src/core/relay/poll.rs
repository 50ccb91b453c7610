use tracing::{debug, error, info, warn};

use super::{Job, JobStatus, JobTransport, PollSettings, RelayError, Sleeper};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    Polling,
    Complete,
    Failed,
    TimedOut,
}

impl PollState {
    pub fn as_str(self) -> &'static str {
        match self {
            PollState::Polling => "polling",
            PollState::Complete => "complete",
            PollState::Failed => "failed",
            PollState::TimedOut => "timed_out",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, PollState::Polling)
    }
}

pub fn can_transition(from: PollState, to: PollState) -> bool {
    if from == to {
        return from == PollState::Polling;
    }
    match from {
        PollState::Polling => to.is_terminal(),
        PollState::Complete | PollState::Failed | PollState::TimedOut => false,
    }
}

fn advance(state: &mut PollState, to: PollState, job: &Job) {
    debug_assert!(
        can_transition(*state, to),
        "illegal poll transition {:?} -> {:?}",
        state,
        to
    );
    debug!(
        "Job {}/{}: {} -> {}",
        job.studio_id,
        job.job_id,
        state.as_str(),
        to.as_str()
    );
    *state = to;
}

/// Polls a job until it completes with results, errors, or the attempt budget
/// runs out. A transport error aborts immediately without further attempts.
pub async fn poll(
    transport: &dyn JobTransport,
    sleeper: &dyn Sleeper,
    settings: PollSettings,
    job: &Job,
    credential: &str,
) -> Result<JobStatus, RelayError> {
    if !job.is_valid() {
        error!("Refusing to poll job with missing ids: {:?}", job);
        return Err(RelayError::InvalidJob(format!(
            "studio_id={:?} job_id={:?}",
            job.studio_id, job.job_id
        )));
    }

    let mut state = PollState::Polling;
    for attempt in 1..=settings.max_attempts {
        let status = match transport.fetch_status(credential, job).await {
            Ok(status) => status,
            Err(e) => {
                advance(&mut state, PollState::Failed, job);
                error!(
                    "Polling job {}/{} failed on attempt {}: {}",
                    job.studio_id, job.job_id, attempt, e
                );
                return Err(e);
            }
        };

        if status.is_finished() {
            advance(&mut state, PollState::Complete, job);
            info!(
                "Job {}/{} complete after {} attempt(s)",
                job.studio_id, job.job_id, attempt
            );
            return Ok(status);
        }

        debug!(
            "Job {}/{} not ready (attempt {}/{}, type={:?}, updates={})",
            job.studio_id,
            job.job_id,
            attempt,
            settings.max_attempts,
            status.kind,
            status.updates.len()
        );
        sleeper.sleep(settings.interval).await;
    }

    advance(&mut state, PollState::TimedOut, job);
    warn!(
        "Job {}/{} still running after {} attempts",
        job.studio_id, job.job_id, settings.max_attempts
    );
    Err(RelayError::Timeout {
        attempts: settings.max_attempts,
    })
}
