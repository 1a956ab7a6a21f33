#[macro_export]
macro_rules! node_log {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $crate::node::LogSink::log(&$logger, $level, format!($($arg)+), file!(), line!())
    };
}

#[macro_export]
macro_rules! node_info {
    ($logger:expr, $($arg:tt)+) => {
        $crate::node_log!($logger, $crate::node::Log::INFO, $($arg)+)
    };
}
