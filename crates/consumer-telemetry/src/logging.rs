//! Structured logging helpers.
//!
//! Every line carries a `subsystem` field (`authentication`, `process_engine`,
//! `client`) so logs from the consumer subsystems can be filtered apart.

/// Log an event with a subsystem field.
#[macro_export]
macro_rules! log_event {
    (info, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    (warn, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::warn!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    (error, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::error!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };

    (debug, $subsystem:expr, $msg:expr $(, $($field:tt)*)?) => {
        tracing::debug!(
            subsystem = $subsystem,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a process-instance event with standard fields.
#[macro_export]
macro_rules! log_process_event {
    ($level:ident, $subsystem:expr, $msg:expr, $process_instance_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            process_instance_id = %$process_instance_id,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a user-task event with standard fields.
#[macro_export]
macro_rules! log_task_event {
    ($level:ident, $subsystem:expr, $msg:expr, $user_task_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            user_task_id = %$user_task_id,
            $($($field)*,)?
            $msg
        )
    };
}
