//! Dispatch debug logging.
//!
//! Set `PSCRIPT_DISPATCH_DEBUG=1` to trace dispatch decisions on stderr.
//! Only available in debug builds to avoid any cost in release.

/// Check if dispatch debug logging is enabled via `PSCRIPT_DISPATCH_DEBUG`.
#[cfg(debug_assertions)]
pub(crate) fn dispatch_debug_enabled() -> bool {
    use std::sync::OnceLock;
    static ENABLED: OnceLock<bool> = OnceLock::new();
    *ENABLED.get_or_init(|| std::env::var("PSCRIPT_DISPATCH_DEBUG").is_ok())
}

/// Emit dispatch debug logs in debug builds without relying on `eprintln!`.
#[cfg(debug_assertions)]
pub(crate) fn dispatch_debug_log(args: std::fmt::Arguments<'_>) {
    use std::io::Write;
    let _ = writeln!(std::io::stderr(), "{args}");
}
