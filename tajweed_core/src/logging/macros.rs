//! Logging macros
//!
//! Context values accept any `Display` type:
//! `log_error!(code, "message", "key" => value, ...)`.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_context {
    ($($key:expr => $value:expr),*) => {
        vec![$(($key, format!("{}", $value))),*]
    };
}

#[macro_export]
macro_rules! log_error {
    ($code:expr, $message:expr, location = $location:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::log_error_with_context(
            $code,
            $message,
            Some($location),
            $crate::__log_context!($($key => $value),*),
        )
    };

    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::log_error_with_context(
            $code,
            $message,
            None,
            $crate::__log_context!($($key => $value),*),
        )
    };
}

#[macro_export]
macro_rules! log_success {
    ($code:expr, $message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::log_success_with_context(
            $code,
            $message,
            $crate::__log_context!($($key => $value),*),
        )
    };
}

#[macro_export]
macro_rules! log_info {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::log_info_with_context($message, $crate::__log_context!($($key => $value),*))
    };
}

/// Warnings are also recorded in the request collector
#[macro_export]
macro_rules! log_warning {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        $crate::logging::log_warning_event(
            $crate::logging::LogEvent::warning($message)
                .with_fields($crate::__log_context!($($key => $value),*)),
        )
    };
}

/// Debug events are built only when the configured level admits them
#[macro_export]
macro_rules! log_debug {
    ($message:expr $(, $key:expr => $value:expr)* $(,)?) => {
        if $crate::logging::config::get_min_log_level() >= $crate::logging::LogLevel::Debug {
            $crate::logging::log_debug_event(
                $crate::logging::LogEvent::debug($message)
                    .with_fields($crate::__log_context!($($key => $value),*)),
            );
        }
    };
}
