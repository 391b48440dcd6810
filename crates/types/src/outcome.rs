use serde::{Deserialize, Serialize};

/// Process exit codes for every terminal outcome.
///
/// Intentional stops occupy a reserved success band starting at `1 << 5`;
/// failures occupy a reserved error band starting at `1 << 6`. Nothing in
/// the installer exits with a code outside these bands (plus plain 0).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitCode {
    Success,
    SuccessUserAbort,
    SuccessBootloaderUnlocked,
    ErrorPrereqs,
    ErrorUserInput,
    ErrorUsbPerms,
    ErrorAdb,
    ErrorFastboot,
    ErrorRemote,
    ErrorTwrp,
}

const SUCCESS_BASE: i32 = 1 << 5;
const ERROR_BASE: i32 = 1 << 6;

impl ExitCode {
    /// Numeric process exit code.
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            Self::Success => 0,
            Self::SuccessUserAbort => SUCCESS_BASE + 1,
            Self::SuccessBootloaderUnlocked => SUCCESS_BASE + 2,
            Self::ErrorPrereqs => ERROR_BASE + 1,
            Self::ErrorUserInput => ERROR_BASE + 2,
            Self::ErrorUsbPerms => ERROR_BASE + 3,
            Self::ErrorAdb => ERROR_BASE + 4,
            Self::ErrorFastboot => ERROR_BASE + 5,
            Self::ErrorRemote => ERROR_BASE + 6,
            Self::ErrorTwrp => ERROR_BASE + 7,
        }
    }

    /// Outcome category this code belongs to.
    #[must_use]
    pub fn category(self) -> OutcomeCategory {
        match self {
            Self::Success | Self::SuccessBootloaderUnlocked => OutcomeCategory::Success,
            Self::SuccessUserAbort => OutcomeCategory::UserAbort,
            // Re-running is cheap after a download failure: present
            // artifacts are never re-fetched.
            Self::ErrorRemote => OutcomeCategory::RecoverableError,
            Self::ErrorPrereqs
            | Self::ErrorUserInput
            | Self::ErrorUsbPerms
            | Self::ErrorAdb
            | Self::ErrorFastboot
            | Self::ErrorTwrp => OutcomeCategory::FatalError,
        }
    }
}

/// Coarse classification of a terminal outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeCategory {
    Success,
    UserAbort,
    RecoverableError,
    FatalError,
}

/// Terminal result of an installer run.
///
/// Produced exactly once, by the last phase reached; the state machine is
/// single-pass, so there is no way to observe two outcomes from one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub exit: ExitCode,
    pub category: OutcomeCategory,
    pub message: String,
}

impl Outcome {
    #[must_use]
    pub fn new(exit: ExitCode, message: impl Into<String>) -> Self {
        Self {
            exit,
            category: exit.category(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(ExitCode::Success, message)
    }

    /// True for the two intentional-stop outcomes and plain success.
    #[must_use]
    pub fn is_failure(&self) -> bool {
        matches!(
            self.category,
            OutcomeCategory::RecoverableError | OutcomeCategory::FatalError
        )
    }
}
