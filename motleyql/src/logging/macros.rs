//! Logging macros
//!
//! Context values accept any `Display` type: `"key" => value`.

/// Turns `"key" => value` pairs into owned strings and hands borrowed
/// pairs to `$sink`.
#[doc(hidden)]
#[macro_export]
macro_rules! __log_with_context {
    ($sink:expr, $($key:expr => $value:expr),+) => {{
        let context_strings: Vec<(&str, String)> = vec![$(($key, format!("{}", $value))),+];
        let context_refs: Vec<(&str, &str)> = context_strings
            .iter()
            .map(|(k, v)| (*k, v.as_str()))
            .collect();
        $sink(context_refs)
    }};
}

/// Log an error with a [`Code`](crate::logging::Code), optional span and context
#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr) => {
        $crate::logging::log_error_with_context($code, $message, None, vec![])
    };

    ($code:expr, $message:expr, span = $span:expr) => {
        $crate::logging::log_error_with_context($code, $message, Some($span), vec![])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        $crate::__log_with_context!(
            |ctx| $crate::logging::log_error_with_context($code, $message, None, ctx),
            $($key => $value),+
        )
    };

    ($code:expr, $message:expr, span = $span:expr, $($key:expr => $value:expr),+) => {
        $crate::__log_with_context!(
            |ctx| $crate::logging::log_error_with_context($code, $message, Some($span), ctx),
            $($key => $value),+
        )
    };
}

#[macro_export]
macro_rules! log_warning {
    ($message:expr) => {
        $crate::logging::log_warning_with_context($message, vec![])
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        $crate::__log_with_context!(
            |ctx| $crate::logging::log_warning_with_context($message, ctx),
            $($key => $value),+
        )
    };
}

/// Log success with a success [`Code`](crate::logging::Code)
#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr) => {
        $crate::logging::log_success_with_context($code, $message, vec![])
    };

    ($code:expr, $message:expr, $($key:expr => $value:expr),+) => {
        $crate::__log_with_context!(
            |ctx| $crate::logging::log_success_with_context($code, $message, ctx),
            $($key => $value),+
        )
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr) => {
        $crate::logging::log_info_with_context($message, vec![])
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        $crate::__log_with_context!(
            |ctx| $crate::logging::log_info_with_context($message, ctx),
            $($key => $value),+
        )
    };
}

/// Debug events skip formatting entirely when the global level is above debug
#[macro_export]
macro_rules! log_debug {
    ($message:expr) => {
        if $crate::logging::debug_enabled() {
            $crate::logging::log_debug_with_context($message, vec![])
        }
    };

    ($message:expr, $($key:expr => $value:expr),+) => {
        if $crate::logging::debug_enabled() {
            $crate::__log_with_context!(
                |ctx| $crate::logging::log_debug_with_context($message, ctx),
                $($key => $value),+
            )
        }
    };
}
