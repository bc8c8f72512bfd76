#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyDecision {
    Fail,
    Reprompt,
}

/// How many protocol errors in a row the loop tolerates before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatRetryPolicy {
    max_consecutive: u32,
}

impl Default for FormatRetryPolicy {
    fn default() -> Self {
        Self::new(1)
    }
}

impl FormatRetryPolicy {
    pub fn new(max_consecutive: u32) -> Self {
        Self { max_consecutive }
    }

    pub fn max_consecutive(&self) -> u32 {
        self.max_consecutive
    }

    /// `consecutive_errors` includes the error being decided on.
    pub fn decide(&self, consecutive_errors: u32) -> PolicyDecision {
        if consecutive_errors <= self.max_consecutive {
            PolicyDecision::Reprompt
        } else {
            PolicyDecision::Fail
        }
    }
}
