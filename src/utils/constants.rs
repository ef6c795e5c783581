/// Default file locations
pub const DEFAULT_INPUT_PATH: &str = "data/yesterday_air_monitors.csv";
pub const DEFAULT_OUTPUT_PATH: &str = "data/high_impact_air_monitors.csv";

/// Columns that must be non-null for a row to survive cleaning
pub const DEFAULT_CRITICAL_COLUMNS: [&str; 2] = ["Max_PM10", "Avg_PM10_24Hour"];

/// Columns converted from text to datetimes
pub const DEFAULT_DATETIME_COLUMNS: [&str; 2] = ["Date", "Max_PM10_Time"];

/// Columns kept in the output, in output order
pub const DEFAULT_COLUMNS_OF_INTEREST: [&str; 7] = [
    "Site_Name",
    "Latitude",
    "Longitude",
    "Date",
    "Max_PM10",
    "Max_PM10_Time",
    "Avg_PM10_24Hour",
];

/// High impact thresholding
pub const DEFAULT_POLLUTANT_COLUMN: &str = "Max_PM10";
pub const DEFAULT_THRESHOLD: f64 = 100.0;
pub const HIGH_IMPACT_COLUMN: &str = "High Impact";

/// Environment variable prefix for configuration overrides (AIRQ_THRESHOLD=150)
pub const ENV_PREFIX: &str = "AIRQ";

/// Cell text read as null
pub const NA_VALUES: [&str; 19] = [
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Datetime layouts tried in order, after RFC 3339
pub const DATETIME_FORMATS: [&str; 12] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %I:%M:%S %p",
    "%m/%d/%Y %I:%M %p",
    "%Y-%m-%d %I:%M:%S %p",
    "%Y%m%d %H:%M",
];

/// Date-only layouts, read as midnight
pub const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%Y%m%d"];

/// Output layouts
pub const OUTPUT_DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
pub const OUTPUT_DATE_FORMAT: &str = "%Y-%m-%d";

/// Pipeline defaults
pub const DEFAULT_SAMPLE_ROWS: usize = 5;
pub const PIPELINE_STAGE_COUNT: u64 = 6;
