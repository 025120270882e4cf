/// Domain-aware logging macros.
///
/// Each macro injects a `domain` field so call sites never spell the string
/// literal. Domains in use: `sys` (process lifecycle), `conf` (config and
/// specification loading), `pipe` (event processing), `res` (snapshot
/// files).
///
/// # Usage
///
/// ```ignore
/// agg_info!(conf, aggregators = 3, "specification applied");
/// agg_warn!(pipe, line = n, error = %e, "skipping malformed event");
/// ```
///
/// The domain is a bare identifier, not a string; the macro turns it into a
/// `&str` literal.

// ---------------------------------------------------------------------------
// Core macro: dispatches to the matching tracing level macro.
// ---------------------------------------------------------------------------

/// Internal helper.  Do not call directly; use `agg_error!` … `agg_trace!`.
#[doc(hidden)]
macro_rules! agg_log {
    ($level:ident, $domain:ident, $($field:tt)*) => {
        tracing::$level!(domain = stringify!($domain), $($field)*)
    };
}

// ---------------------------------------------------------------------------
// Public per-level macros
// ---------------------------------------------------------------------------

/// Log at ERROR level with an automatic `domain` field.
#[allow(unused_macros)]
macro_rules! agg_error {
    ($domain:ident, $($rest:tt)*) => {
        agg_log!(error, $domain, $($rest)*)
    };
}

/// Log at WARN level with an automatic `domain` field.
///
/// ```ignore
/// agg_warn!(pipe, event = name, "event not in catalog");
/// ```
macro_rules! agg_warn {
    ($domain:ident, $($rest:tt)*) => {
        agg_log!(warn, $domain, $($rest)*)
    };
}

/// Log at INFO level with an automatic `domain` field.
macro_rules! agg_info {
    ($domain:ident, $($rest:tt)*) => {
        agg_log!(info, $domain, $($rest)*)
    };
}

/// Log at DEBUG level with an automatic `domain` field.
macro_rules! agg_debug {
    ($domain:ident, $($rest:tt)*) => {
        agg_log!(debug, $domain, $($rest)*)
    };
}

/// Log at TRACE level with an automatic `domain` field.
macro_rules! agg_trace {
    ($domain:ident, $($rest:tt)*) => {
        agg_log!(trace, $domain, $($rest)*)
    };
}
