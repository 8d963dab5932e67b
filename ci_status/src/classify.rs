//! Run classification and the tracking-issue state machine.

use std::fmt;

/// Class of a CI run, derived from its raw status string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunClass {
    Success,
    Failure,
    Cancelled,
}

impl RunClass {
    /// Case-insensitive match on the job status. Anything that is neither
    /// `success` nor `cancelled` counts as a failure.
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw.eq_ignore_ascii_case("success") {
            Self::Success
        } else if raw.eq_ignore_ascii_case("cancelled") {
            Self::Cancelled
        } else {
            Self::Failure
        }
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

/// Open/closed state of the tracking issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueState {
    Open,
    Closed,
}

impl fmt::Display for IssueState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => f.write_str("open"),
            Self::Closed => f.write_str("closed"),
        }
    }
}

/// What to do with the tracking issue for a given run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueAction {
    /// Post a "build fixed" comment, then close the issue.
    CloseWithComment,
    /// Post a "still failing" comment.
    Comment,
    /// Reopen the issue, then post a "build failed" comment.
    ReopenWithComment,
    NoOp,
}

impl IssueAction {
    /// Issue state after the action has been applied.
    pub fn next_state(self, current: IssueState) -> IssueState {
        match self {
            Self::CloseWithComment => IssueState::Closed,
            Self::Comment | Self::ReopenWithComment => IssueState::Open,
            Self::NoOp => current,
        }
    }
}

/// Pick the issue action for a run. Cancelled runs never mutate the issue.
pub fn decide(class: RunClass, state: IssueState) -> IssueAction {
    match (class, state) {
        (RunClass::Cancelled, _) => IssueAction::NoOp,
        (RunClass::Success, IssueState::Open) => IssueAction::CloseWithComment,
        (RunClass::Success, IssueState::Closed) => IssueAction::NoOp,
        (RunClass::Failure, IssueState::Open) => IssueAction::Comment,
        (RunClass::Failure, IssueState::Closed) => IssueAction::ReopenWithComment,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(RunClass::parse("SUCCESS"), RunClass::Success);
        assert_eq!(RunClass::parse("Success"), RunClass::Success);
        assert_eq!(RunClass::parse("Cancelled"), RunClass::Cancelled);
        assert_eq!(RunClass::parse("failure"), RunClass::Failure);
    }

    #[test]
    fn unknown_status_counts_as_failure() {
        assert_eq!(RunClass::parse("skipped"), RunClass::Failure);
        assert_eq!(RunClass::parse(""), RunClass::Failure);
        assert_eq!(RunClass::parse("canceled"), RunClass::Failure);
    }

    #[test]
    fn action_table() {
        use IssueAction::*;
        use IssueState::*;
        assert_eq!(decide(RunClass::Success, Open), CloseWithComment);
        assert_eq!(decide(RunClass::Success, Closed), NoOp);
        assert_eq!(decide(RunClass::Failure, Open), Comment);
        assert_eq!(decide(RunClass::Failure, Closed), ReopenWithComment);
        assert_eq!(decide(RunClass::Cancelled, Open), NoOp);
        assert_eq!(decide(RunClass::Cancelled, Closed), NoOp);
    }

    #[test]
    fn next_state_follows_action() {
        assert_eq!(
            IssueAction::CloseWithComment.next_state(IssueState::Open),
            IssueState::Closed
        );
        assert_eq!(
            IssueAction::ReopenWithComment.next_state(IssueState::Closed),
            IssueState::Open
        );
        assert_eq!(IssueAction::NoOp.next_state(IssueState::Closed), IssueState::Closed);
    }
}
