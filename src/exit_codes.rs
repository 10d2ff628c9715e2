//! Process exit codes used by the `tagcheck` binary

/// No error-severity diagnostics were found
pub const SUCCESS: i32 = 0;

/// At least one diagnostic failed the run
pub const VIOLATIONS_FOUND: i32 = 1;

/// Invalid configuration, unreadable input, or another tool failure
pub const TOOL_ERROR: i32 = 2;

pub mod exit {
    use super::*;

    pub fn success() -> ! {
        std::process::exit(SUCCESS);
    }

    pub fn violations_found() -> ! {
        std::process::exit(VIOLATIONS_FOUND);
    }

    pub fn tool_error() -> ! {
        std::process::exit(TOOL_ERROR);
    }
}
