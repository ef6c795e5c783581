use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use validator::Validate;

use crate::error::{ProcessingError, Result};
use crate::utils::constants::{
    DATETIME_FORMATS, DATE_FORMATS, DEFAULT_COLUMNS_OF_INTEREST, DEFAULT_CRITICAL_COLUMNS,
    DEFAULT_DATETIME_COLUMNS, DEFAULT_INPUT_PATH, DEFAULT_OUTPUT_PATH, DEFAULT_POLLUTANT_COLUMN,
    DEFAULT_THRESHOLD, ENV_PREFIX, HIGH_IMPACT_COLUMN,
};

const LIST_KEYS: [&str; 4] = [
    "critical_columns",
    "datetime_columns",
    "columns_of_interest",
    "datetime_formats",
];

/// Everything the pipeline needs to run, passed by value into each step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct PipelineConfig {
    pub input_path: PathBuf,

    pub output_path: PathBuf,

    #[validate(length(min = 1))]
    pub critical_columns: Vec<String>,

    #[validate(length(min = 1))]
    pub datetime_columns: Vec<String>,

    #[validate(length(min = 1))]
    pub columns_of_interest: Vec<String>,

    #[validate(length(min = 1))]
    pub pollutant_column: String,

    #[validate(range(min = 0.0))]
    pub threshold: f64,

    /// Extra chrono layouts tried after RFC 3339; date-only layouts read as midnight
    #[validate(length(min = 1))]
    pub datetime_formats: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT_PATH),
            output_path: PathBuf::from(DEFAULT_OUTPUT_PATH),
            critical_columns: to_strings(&DEFAULT_CRITICAL_COLUMNS),
            datetime_columns: to_strings(&DEFAULT_DATETIME_COLUMNS),
            columns_of_interest: to_strings(&DEFAULT_COLUMNS_OF_INTEREST),
            pollutant_column: DEFAULT_POLLUTANT_COLUMN.to_string(),
            threshold: DEFAULT_THRESHOLD,
            datetime_formats: DATETIME_FORMATS
                .iter()
                .chain(DATE_FORMATS.iter())
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

impl PipelineConfig {
    /// Layer defaults, an optional settings file, then `AIRQ_*` environment variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = path {
            builder = builder.add_source(File::from(path).required(true));
        }

        let mut env = Environment::with_prefix(ENV_PREFIX)
            .try_parsing(true)
            .list_separator(",");
        for key in LIST_KEYS {
            env = env.with_list_parse_key(key);
        }

        let config: Self = builder.add_source(env).build()?.try_deserialize()?;
        config.check()?;
        Ok(config)
    }

    /// Field validation plus the cross-field rules the pipeline relies on.
    pub fn check(&self) -> Result<()> {
        self.validate()?;

        if !self.threshold.is_finite() {
            return Err(ProcessingError::Config(format!(
                "Threshold must be a finite number, got {}",
                self.threshold
            )));
        }

        let mut seen = HashSet::new();
        if let Some(repeated) = self.columns_of_interest.iter().find(|c| !seen.insert(*c)) {
            return Err(ProcessingError::Config(format!(
                "Column '{}' appears more than once in the columns of interest",
                repeated
            )));
        }

        if !self
            .projection_columns()
            .iter()
            .any(|c| c == &self.pollutant_column)
        {
            return Err(ProcessingError::Config(format!(
                "Pollutant column '{}' is not among the columns of interest",
                self.pollutant_column
            )));
        }

        Ok(())
    }

    /// Columns of interest without the derived flag, which the flagger appends.
    pub fn projection_columns(&self) -> Vec<String> {
        self.columns_of_interest
            .iter()
            .filter(|c| c.as_str() != HIGH_IMPACT_COLUMN)
            .cloned()
            .collect()
    }

    /// Every column the input file must carry, without repeats.
    pub fn required_input_columns(&self) -> Vec<String> {
        let mut required: Vec<String> = Vec::new();
        for column in self
            .critical_columns
            .iter()
            .chain(self.datetime_columns.iter())
            .chain(self.projection_columns().iter())
        {
            if !required.contains(column) {
                required.push(column.clone());
            }
        }
        required
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.check().is_ok());
        assert_eq!(config.pollutant_column, "Max_PM10");
        assert_eq!(config.threshold, 100.0);
        assert_eq!(config.critical_columns, vec!["Max_PM10", "Avg_PM10_24Hour"]);
    }

    #[test]
    fn test_invalid_threshold() {
        let config = PipelineConfig {
            threshold: -5.0,
            ..Default::default()
        };
        assert!(config.check().is_err());

        let config = PipelineConfig {
            threshold: f64::NAN,
            ..Default::default()
        };
        assert!(config.check().is_err());
    }

    #[test]
    fn test_empty_lists_rejected() {
        let empty = |apply: fn(&mut PipelineConfig)| {
            let mut config = PipelineConfig::default();
            apply(&mut config);
            config.check()
        };

        assert!(matches!(
            empty(|c| c.datetime_columns.clear()),
            Err(ProcessingError::Validation(_))
        ));
        assert!(empty(|c| c.critical_columns.clear()).is_err());
        assert!(empty(|c| c.columns_of_interest.clear()).is_err());
    }

    #[test]
    fn test_repeated_column_of_interest_rejected() {
        let mut config = PipelineConfig::default();
        config.columns_of_interest.push("Site_Name".to_string());
        assert!(matches!(config.check(), Err(ProcessingError::Config(_))));
    }

    #[test]
    fn test_pollutant_must_be_projected() {
        let config = PipelineConfig {
            pollutant_column: "Max_PM25".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.check(), Err(ProcessingError::Config(_))));
    }

    #[test]
    fn test_projection_skips_flag_column() {
        let mut config = PipelineConfig::default();
        config.columns_of_interest.push(HIGH_IMPACT_COLUMN.to_string());
        assert!(!config
            .projection_columns()
            .contains(&HIGH_IMPACT_COLUMN.to_string()));
    }

    #[test]
    fn test_required_input_columns_deduplicated() {
        let config = PipelineConfig::default();
        let required = config.required_input_columns();
        assert_eq!(required.iter().filter(|c| *c == "Max_PM10").count(), 1);
        assert!(required.contains(&"Site_Name".to_string()));
        assert!(required.contains(&"Max_PM10_Time".to_string()));
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let mut file = Builder::new().suffix(".toml").tempfile()?;
        writeln!(file, "threshold = 150")?;
        writeln!(file, "output_path = \"out/flagged.csv\"")?;
        writeln!(file, "datetime_columns = [\"Date\"]")?;

        let config = PipelineConfig::load(Some(file.path()))?;
        assert_eq!(config.threshold, 150.0);
        assert_eq!(config.output_path, PathBuf::from("out/flagged.csv"));
        assert_eq!(config.datetime_columns, vec!["Date"]);
        assert_eq!(config.input_path, PathBuf::from(DEFAULT_INPUT_PATH));

        Ok(())
    }

    #[test]
    fn test_load_missing_file_fails() {
        let result = PipelineConfig::load(Some(Path::new("does/not/exist.toml")));
        assert!(result.is_err());
    }
}
