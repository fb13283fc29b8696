//! Metric name and label definitions.
//!
//! Centralizing these keeps names consistent between the crates that record
//! them.

/// Channel routing metrics
pub mod channels {
    /// Number of registered channels
    pub const REGISTERED: &str = "waterline_channels_registered";
    /// Total number of outbound messages accepted by a transport
    pub const MESSAGES_SENT_TOTAL: &str = "waterline_channel_messages_sent_total";
    /// Total number of outbound sends that failed in the transport
    pub const SEND_ERRORS_TOTAL: &str = "waterline_channel_send_errors_total";
    /// Total number of route attempts with no usable channel
    pub const UNAVAILABLE_TOTAL: &str = "waterline_channel_unavailable_total";
    /// Duration of a transport send in seconds
    pub const SEND_DURATION_SECONDS: &str = "waterline_channel_send_duration_seconds";
}

/// Watermark store metrics
pub mod watermark {
    /// Total number of watermark advances that moved a group forward
    pub const ADVANCES_TOTAL: &str = "waterline_watermark_advances_total";
    /// Total number of groups force-advanced by a catch-up flush
    pub const FLUSHED_GROUPS_TOTAL: &str = "waterline_watermark_flushed_groups_total";
    /// Number of groups tracked in the watermark record
    pub const GROUPS: &str = "waterline_watermark_groups";
    /// Total number of corrupt-state reads
    pub const CORRUPT_READS_TOTAL: &str = "waterline_watermark_corrupt_reads_total";
}

/// Sandbox lifecycle metrics
pub mod sandbox {
    /// Total number of successful container runtime starts
    pub const RUNTIME_STARTS_TOTAL: &str = "waterline_sandbox_runtime_starts_total";
    /// Total number of orphaned containers removed
    pub const ORPHANS_REMOVED_TOTAL: &str = "waterline_sandbox_orphans_removed_total";
    /// Total number of individual cleanup operations that failed
    pub const CLEANUP_FAILURES_TOTAL: &str = "waterline_sandbox_cleanup_failures_total";
}

/// Common label keys
pub mod labels {
    pub const CHANNEL: &str = "channel";
}
