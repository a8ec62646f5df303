// src/exit.rs
//! Process exit codes for `sweep`.
//!
//! Schedulers only look at zero vs non-zero, but the distinct codes help when
//! reading cron mail.

use colored::Colorize;
use std::process::Termination;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum SweepExit {
    /// The selected unit was analyzed and its record appended.
    Success = 0,
    /// The selected unit's directory does not exist.
    UnitMissing = 1,
    /// I/O, config or state error before a result could be produced.
    Error = 2,
}

impl SweepExit {
    #[must_use]
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl Termination for SweepExit {
    fn report(self) -> std::process::ExitCode {
        #[allow(clippy::cast_sign_loss, clippy::cast_possible_truncation)]
        std::process::ExitCode::from(self.code() as u8)
    }
}

impl From<anyhow::Result<SweepExit>> for SweepExit {
    fn from(res: anyhow::Result<SweepExit>) -> Self {
        match res {
            Ok(code) => code,
            Err(e) => {
                eprintln!("{} {e:#}", "Error:".red());
                Self::Error
            }
        }
    }
}
