//! Defaults shared across the crate.

/// How many months ahead of now a backup reaches.
pub const DEFAULT_BACKUP_MONTHS_FUTURE: u32 = 12;

/// Local hour at which the daily job runs.
pub const DEFAULT_BACKUP_HOUR: u32 = 5;

/// Size of a single fetch window in days.
pub const DEFAULT_WINDOW_DAYS: i64 = 30;

/// Wall-clock budget for one backup operation.
pub const DEFAULT_EXECUTION_LIMIT: &str = "5m";

/// Estimated event count above which a full backup asks for confirmation.
pub const DEFAULT_ESTIMATE_THRESHOLD: u64 = 500;

/// Days sampled when estimating the volume of a full backup.
pub const DEFAULT_ESTIMATE_SAMPLE_DAYS: i64 = 7;

/// Earliest date a full backup reaches back to (YYYY-MM-DD).
pub const DEFAULT_FULL_BACKUP_START: &str = "2012-01-01";

pub const DEFAULT_SHEET_PREFIX: &str = "Calendar_";

pub const DEFAULT_PROVIDER_TIMEOUT: &str = "60s";

/// Sheet names longer than this are shortened.
pub const MAX_SHEET_NAME_CHARS: usize = 30;

/// Characters kept before the ellipsis when a sheet name is shortened.
pub const TRUNCATED_SHEET_NAME_CHARS: usize = 27;

/// Characters that are not allowed in sheet names.
pub const FORBIDDEN_SHEET_CHARS: &[char] = &['/', '\\', '?', '*', '[', ']', ':'];

pub const METADATA_SHEET_NAME: &str = "Backup Info";

/// Marker row that precedes the metadata column header.
pub const METADATA_MARKER: &str = "Backed-up calendars";

/// Property key holding the registered calendar ids.
pub const CALENDAR_IDS_KEY: &str = "CALENDAR_IDS";

/// Property key holding the hour of the daily trigger.
pub const DAILY_TRIGGER_KEY: &str = "DAILY_TRIGGER_HOUR";
