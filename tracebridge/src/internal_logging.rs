#![allow(unused_macros)]
//! Logging macros for the tracebridge crates themselves.
//!
//! `bridge_info!`, `bridge_warn!`, `bridge_debug!` and `bridge_error!` are meant
//! for code inside this workspace and for custom exporters or transports built
//! on top of it. They are not a general purpose application logger.
//!
//! Every event carries a `name` in `Component.Operation.Outcome` form and
//! optional `key = value` attributes:
//!
//! ```
//! use tracebridge::bridge_warn;
//! bridge_warn!(name: "Codec.Decode.Rejected", field = "trace_id");
//! ```
//!
//! With the `internal-logs` feature of the *calling* crate enabled the events
//! go to [`tracing`](https://docs.rs/tracing) with the crate name as target.
//! Under `cfg(test)` they are also printed so `--nocapture` shows them.

#[doc(hidden)]
#[macro_export]
macro_rules! __bridge_log {
    ($level:ident, $tag:literal, name: $name:expr $(,)?) => {
        #[cfg(feature = "internal-logs")]
        {
            $crate::_private::$level!(name: $name, target: env!("CARGO_PKG_NAME"), name = $name);
        }

        #[cfg(test)]
        {
            print!("{}: name={}\n", $tag, $name);
        }

        #[cfg(all(not(feature = "internal-logs"), not(test)))]
        {
            let _ = $name;
        }
    };
    ($level:ident, $tag:literal, name: $name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        #[cfg(feature = "internal-logs")]
        {
            $crate::_private::$level!(
                name: $name,
                target: env!("CARGO_PKG_NAME"),
                name = $name,
                $($key = { $value }),+,
            );
        }

        #[cfg(test)]
        {
            print!("{}: name={}", $tag, $name);
            $(
                print!(", {}={}", stringify!($key), $value);
            )+
            print!("\n");
        }

        #[cfg(all(not(feature = "internal-logs"), not(test)))]
        {
            let _ = ($name, $($value),+);
        }
    };
}

/// Log an informational event.
#[macro_export]
macro_rules! bridge_info {
    ($($args:tt)+) => {
        $crate::__bridge_log!(info, "bridge_info", $($args)+)
    };
}

/// Log a warning. Use it for conditions the user can act on, such as invalid
/// configuration that was replaced by a default.
#[macro_export]
macro_rules! bridge_warn {
    ($($args:tt)+) => {
        $crate::__bridge_log!(warn, "bridge_warn", $($args)+)
    };
}

/// Log a debug event.
#[macro_export]
macro_rules! bridge_debug {
    ($($args:tt)+) => {
        $crate::__bridge_log!(debug, "bridge_debug", $($args)+)
    };
}

/// Log an error.
#[macro_export]
macro_rules! bridge_error {
    ($($args:tt)+) => {
        $crate::__bridge_log!(error, "bridge_error", $($args)+)
    };
}
