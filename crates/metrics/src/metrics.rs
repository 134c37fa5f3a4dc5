use lazy_static::lazy_static;
use prometheus::{
    register_gauge, register_histogram, register_int_counter, register_int_counter_vec, Gauge,
    Histogram, IntCounter, IntCounterVec,
};

lazy_static! {
    // ═══════════════════════════════════════════════════════════════════════════
    // RECORD METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Terminal outcomes by status (SUCCESS, FAILED, INVALID, SKIPPED)
    pub static ref OUTCOMES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "esim_deactivation_outcomes_total",
        "Total processed records by terminal status",
        &["status"]
    )
    .unwrap();

    /// Successful outcomes by reason (DEACTIVATED, ALREADY_EXPIRED)
    pub static ref SUCCESS_REASONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "esim_deactivation_success_reasons_total",
        "Total successful records by success reason",
        &["reason"]
    )
    .unwrap();

    /// Attempts used per record that reached the RSP platform
    pub static ref RECORD_ATTEMPTS: Histogram = register_histogram!(
        "esim_deactivation_record_attempts",
        "Attempts used per deactivated record",
        vec![1.0, 2.0, 3.0, 5.0, 10.0]
    )
    .unwrap();

    /// Wall-clock time from first attempt to terminal state
    pub static ref RECORD_DURATION: Histogram = register_histogram!(
        "esim_deactivation_record_duration_ms",
        "Record processing duration in milliseconds",
        vec![100.0, 500.0, 1000.0, 5000.0, 10000.0, 30000.0, 60000.0]
    )
    .unwrap();

    // ═══════════════════════════════════════════════════════════════════════════
    // FILE AND RUN METRICS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Files by verdict (met, below_threshold, load_error, move_error)
    pub static ref FILES_TOTAL: IntCounterVec = register_int_counter_vec!(
        "esim_deactivation_files_total",
        "Total files handled by verdict",
        &["verdict"]
    )
    .unwrap();

    /// Success rate of the most recently processed file
    pub static ref FILE_SUCCESS_RATE: Gauge = register_gauge!(
        "esim_deactivation_file_success_rate",
        "Success rate of the last processed file"
    )
    .unwrap();

    /// Completed runs by overall status
    pub static ref RUNS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "esim_deactivation_runs_total",
        "Total runs by status",
        &["status"]
    )
    .unwrap();

    // ═══════════════════════════════════════════════════════════════════════════
    // LOGGING
    // ═══════════════════════════════════════════════════════════════════════════

    pub static ref ERROR_EVENTS_TOTAL: IntCounter = register_int_counter!(
        "esim_deactivation_error_events_total",
        "Total ERROR level log events"
    )
    .unwrap();
}
