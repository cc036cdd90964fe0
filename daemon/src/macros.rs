//! Custom macros for reducing code repetition in backdrop

/// Log an error and continue execution (non-fatal error handling)
///
/// # Example
/// ```ignore
/// log_and_continue!(store.set(prefs).await, "persist preferences");
/// ```
#[macro_export]
macro_rules! log_and_continue {
    ($expr:expr, $context:expr) => {
        if let Err(e) = $expr {
            log::error!("Failed to {}: {}", $context, e);
        }
    };
}

/// Log a refused playback attempt as a warning and carry on
///
/// Playback refusals (autoplay policy, missing decoder) never reach the user.
///
/// # Example
/// ```ignore
/// warn_on_refusal!(self.video.play(), "resume after unmute");
/// ```
#[macro_export]
macro_rules! warn_on_refusal {
    ($expr:expr, $context:expr) => {
        if let Err(e) = $expr {
            log::warn!("Playback refused ({}): {}", $context, e);
        }
    };
}

/// Validate an enum-like string value
///
/// # Example
/// ```ignore
/// validate_enum!(level, "trace", "debug", "info", "warn", "error");
/// ```
#[macro_export]
macro_rules! validate_enum {
    ($value:expr, $($variant:expr),+) => {
        match $value {
            $($variant)|+ => Ok(()),
            _ => anyhow::bail!("Invalid value: {} (expected one of: {})", $value, [$($variant),+].join(", ")),
        }
    };
}
