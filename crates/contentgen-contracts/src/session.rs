use crate::response::NormalizedResult;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionState {
    Idle,
    Submitting,
    Success(NormalizedResult),
    Failed(String),
}

impl SubmissionState {
    pub fn label(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Submitting => "submitting",
            SubmissionState::Success(_) => "success",
            SubmissionState::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("a generation request is already in flight")]
    AlreadySubmitting,
    #[error("cannot submit from state '{0}'; start a new generation first")]
    NotIdle(&'static str),
    #[error("no submission is in flight")]
    NotSubmitting,
}

/// Lifecycle of one form: Idle -> Submitting -> Success | Failed -> Idle.
///
/// The session is owned by whoever drives the view and passed by reference;
/// there is no shared instance.
#[derive(Debug, Clone)]
pub struct FormSession {
    state: SubmissionState,
}

impl Default for FormSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FormSession {
    pub fn new() -> Self {
        Self {
            state: SubmissionState::Idle,
        }
    }

    pub fn current(&self) -> &SubmissionState {
        &self.state
    }

    pub fn is_submitting(&self) -> bool {
        matches!(self.state, SubmissionState::Submitting)
    }

    pub fn result(&self) -> Option<&NormalizedResult> {
        match &self.state {
            SubmissionState::Success(result) => Some(result),
            _ => None,
        }
    }

    /// Whether the submit trigger is live.
    pub fn ensure_idle(&self) -> Result<(), SessionError> {
        match &self.state {
            SubmissionState::Idle => Ok(()),
            SubmissionState::Submitting => Err(SessionError::AlreadySubmitting),
            other => Err(SessionError::NotIdle(other.label())),
        }
    }

    pub fn begin(&mut self) -> Result<(), SessionError> {
        self.ensure_idle()?;
        self.state = SubmissionState::Submitting;
        Ok(())
    }

    pub fn succeed(&mut self, result: NormalizedResult) -> Result<(), SessionError> {
        if !self.is_submitting() {
            return Err(SessionError::NotSubmitting);
        }
        self.state = SubmissionState::Success(result);
        Ok(())
    }

    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), SessionError> {
        if !self.is_submitting() {
            return Err(SessionError::NotSubmitting);
        }
        self.state = SubmissionState::Failed(message.into());
        Ok(())
    }

    /// "New generation": drops whatever result or failure is held.
    pub fn reset(&mut self) {
        self.state = SubmissionState::Idle;
    }
}
