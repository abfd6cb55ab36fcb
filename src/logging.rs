/// Conditional logging module for development builds
///
/// The `log!` macro provides debug logging that is compiled out in production
/// (release) builds by default. The records go through the `log` facade, so
/// nothing is printed unless the host application installs a logger.
///
/// Logging is enabled when either:
/// - Building in debug mode (`cfg(debug_assertions)`)
/// - The `console_logging` feature is explicitly enabled
///
/// # Examples
///
/// ```rust
/// use section_control::log;
///
/// let trains = 3;
/// log!("Optimizing {} trains", trains);
/// ```
/// Conditionally log a debug record in development builds
///
/// This macro expands to `log::debug!()` in debug builds or when the
/// `console_logging` feature is enabled. In production release builds,
/// it compiles to nothing (zero overhead).
#[macro_export]
macro_rules! log {
    ($($arg:tt)+) => {{
        #[cfg(any(debug_assertions, feature = "console_logging"))]
        {
            $crate::__private::log::debug!(target: "section_control", $($arg)+);
        }
    }};
}
