/// Path of the function the macro is expanded in, e.g. `app::worker::run`.
#[doc(hidden)]
#[macro_export]
macro_rules! __caller {
    () => {{
        fn __here() {}
        fn __name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = __name_of(__here);
        name.strip_suffix("::__here").unwrap_or(name)
    }};
}

#[doc(hidden)]
#[macro_export]
macro_rules! __log {
    ($severity:expr, logger: $logger:expr, $($arg:tt)+) => {
        $logger.log($severity, $crate::__caller!(), ::std::format_args!($($arg)+))
    };
    ($severity:expr, $($arg:tt)+) => {
        $crate::global().log($severity, $crate::__caller!(), ::std::format_args!($($arg)+))
    };
}

/// Logs at FATAL, tagged with the calling function.
///
/// `fatal!("msg {}", x)` goes to the process-wide logger,
/// `fatal!(logger: &logger, "msg {}", x)` to an injected one.
#[macro_export]
macro_rules! fatal {
    ($($arg:tt)+) => {
        $crate::__log!($crate::Severity::Fatal, $($arg)+)
    };
}

/// Logs at ERROR. See [`fatal!`] for the accepted forms.
#[macro_export]
macro_rules! error {
    ($($arg:tt)+) => {
        $crate::__log!($crate::Severity::Error, $($arg)+)
    };
}

/// Logs at WARN. See [`fatal!`] for the accepted forms.
#[macro_export]
macro_rules! warn {
    ($($arg:tt)+) => {
        $crate::__log!($crate::Severity::Warn, $($arg)+)
    };
}

/// Logs at INFO. See [`fatal!`] for the accepted forms.
#[macro_export]
macro_rules! info {
    ($($arg:tt)+) => {
        $crate::__log!($crate::Severity::Info, $($arg)+)
    };
}

/// Logs at DEBUG. See [`fatal!`] for the accepted forms.
#[macro_export]
macro_rules! debug {
    ($($arg:tt)+) => {
        $crate::__log!($crate::Severity::Debug, $($arg)+)
    };
}
