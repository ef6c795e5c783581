use air_quality_processor::models::{
    PipelineConfig, PipelineStage, PipelineStatus, StepDetail, Table, Value,
};
use air_quality_processor::processors::{Cleaner, EventFlagger, Pipeline};
use air_quality_processor::readers::TableReader;
use air_quality_processor::utils::constants::HIGH_IMPACT_COLUMN;
use pretty_assertions::assert_eq;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const MONITORS: &str = "\
Site_Name,Agency,Latitude,Longitude,Date,Max_PM10,Max_PM10_Time,Avg_PM10_24Hour,Notes
North Ridge,State DEQ,45.51,-122.68,2024-03-01,120,2024-03-01 13:00,80,
Harbor,State DEQ,45.60,-122.70,2024-03-01,NA,2024-03-01 09:00,80,sensor offline
Valley School,County,45.40,-122.55,2024-03-01,50,03/01/2024 7:15 AM,80,
Valley School,County,45.40,-122.55,2024-03-01,50,03/01/2024 7:15 AM,80,
Airport,FAA,45.58,-122.60,2024-03-01,101.5,bad timestamp,NaN,
Downtown,County,45.52,-122.67,2024-03-01,99,2024-03-01T18:30:00Z,60,
";

fn config_for(dir: &TempDir) -> PipelineConfig {
    PipelineConfig {
        input_path: dir.path().join("yesterday_air_monitors.csv"),
        output_path: dir.path().join("output").join("high_impact.csv"),
        ..Default::default()
    }
}

fn column(table: &Table, name: &str) -> Vec<Value> {
    table
        .column_values(name, PipelineStage::Flagged)
        .unwrap()
        .cloned()
        .collect()
}

#[test]
fn test_full_pipeline_through_files() {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let config = config_for(&dir);
    fs::write(&config.input_path, MONITORS).unwrap();

    let output = Pipeline::new(config.clone()).run(None).unwrap();
    assert_eq!(output.report.status, PipelineStatus::Completed);

    let loaded = output.report.step(PipelineStage::Loaded).unwrap();
    let cleaned = output.report.step(PipelineStage::Cleaned).unwrap();
    let flagged = output.report.step(PipelineStage::Flagged).unwrap();
    assert_eq!((loaded.rows, loaded.columns), (6, 9));
    // Harbor (null Max_PM10), Airport (null average), one Valley School duplicate
    assert_eq!(cleaned.rows, 3);
    assert!(flagged.rows <= cleaned.rows && cleaned.rows <= loaded.rows);

    let table = output.table.unwrap();
    assert_eq!(
        column(&table, "Site_Name"),
        vec![Value::from("North Ridge"), Value::from("Valley School"), Value::from("Downtown")]
    );
    assert_eq!(
        column(&table, HIGH_IMPACT_COLUMN),
        vec![Value::Boolean(true), Value::Boolean(false), Value::Boolean(false)]
    );

    // 101.5 in the input makes the whole Max_PM10 column a float column
    let written = fs::read_to_string(&config.output_path).unwrap();
    let mut lines = written.lines();
    assert_eq!(
        lines.next(),
        Some("Site_Name,Latitude,Longitude,Date,Max_PM10,Max_PM10_Time,Avg_PM10_24Hour,High Impact")
    );
    assert_eq!(
        lines.next(),
        Some("North Ridge,45.51,-122.68,2024-03-01,120.0,2024-03-01 13:00:00,80,True")
    );
    assert_eq!(
        lines.next(),
        Some("Valley School,45.4,-122.55,2024-03-01,50.0,2024-03-01 07:15:00,80,False")
    );
    assert_eq!(
        lines.next(),
        Some("Downtown,45.52,-122.67,2024-03-01,99.0,2024-03-01 18:30:00,60,False")
    );
    assert_eq!(lines.next(), None);
}

#[test]
fn test_flagging_scenario() {
    let table = Table::from_rows(
        vec!["Max_PM10".to_string(), "Avg_PM10_24Hour".to_string()],
        vec![
            vec![Value::Integer(120), Value::Integer(80)],
            vec![Value::Null, Value::Integer(80)],
            vec![Value::Integer(50), Value::Integer(80)],
        ],
    )
    .unwrap();

    let cleaner = Cleaner::new(vec!["Max_PM10".to_string(), "Avg_PM10_24Hour".to_string()]);
    let (cleaned, _) = cleaner.clean(table).unwrap();
    assert_eq!(cleaned.num_rows(), 2);

    let (flagged, report) = EventFlagger::new("Max_PM10", 100.0).flag(cleaned).unwrap();
    assert_eq!(flagged.value(0, "Max_PM10"), Some(&Value::Integer(120)));
    assert_eq!(flagged.value(0, HIGH_IMPACT_COLUMN), Some(&Value::Boolean(true)));
    assert_eq!(flagged.value(1, "Max_PM10"), Some(&Value::Integer(50)));
    assert_eq!(flagged.value(1, HIGH_IMPACT_COLUMN), Some(&Value::Boolean(false)));
    assert!(matches!(
        report.detail,
        StepDetail::Flagged {
            high_impact_rows: 1,
            ..
        }
    ));
}

#[test]
fn test_identical_rows_collapse_after_load() {
    let reader = TableReader::new();
    let table = reader
        .parse_str("Max_PM10,Avg_PM10_24Hour\n120,80\n120,80\n")
        .unwrap();
    assert_eq!(table.num_rows(), 2);

    let cleaner = Cleaner::new(vec!["Max_PM10".to_string(), "Avg_PM10_24Hour".to_string()]);
    let (cleaned, _) = cleaner.clean(table).unwrap();
    assert_eq!(cleaned.num_rows(), 1);
}

#[test]
fn test_nonexistent_input_returns_absent() {
    let loaded = TableReader::new()
        .load(Path::new("no/such/dir/yesterday_air_monitors.csv"))
        .unwrap();
    assert!(loaded.is_none());
}

#[test]
fn test_saved_output_reloads_with_same_shape() {
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir);
    fs::write(&config.input_path, MONITORS).unwrap();

    let output = Pipeline::new(config.clone()).run(None).unwrap();
    let table = output.table.unwrap();

    let (reloaded, _) = TableReader::new()
        .load(&config.output_path)
        .unwrap()
        .expect("output was written");
    assert_eq!(reloaded.num_rows(), table.num_rows());
    assert_eq!(reloaded.columns(), table.columns());
}

#[test]
fn test_every_output_row_has_critical_values() {
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir);
    fs::write(&config.input_path, MONITORS).unwrap();

    let table = Pipeline::new(config.clone()).run(None).unwrap().table.unwrap();
    for name in &config.critical_columns {
        assert!(column(&table, name).iter().all(|v| !v.is_null()));
    }
    assert!(table.has_column(HIGH_IMPACT_COLUMN));
}

#[test]
fn test_nan_spelled_critical_cells_never_reach_output() {
    let dir = TempDir::new().unwrap();
    let config = config_for(&dir);
    fs::write(
        &config.input_path,
        "\
Site_Name,Latitude,Longitude,Date,Max_PM10,Max_PM10_Time,Avg_PM10_24Hour
A,1,2,2024-03-01,NAN,2024-03-01 13:00,80
B,1,2,2024-03-01,120,2024-03-01 13:00,+nan
C,1,2,2024-03-01,130,2024-03-01 14:00,90.5
",
    )
    .unwrap();

    let output = Pipeline::new(config.clone()).run(None).unwrap();
    assert_eq!(output.report.step(PipelineStage::Cleaned).unwrap().rows, 1);

    let written = fs::read_to_string(&config.output_path).unwrap();
    let rows: Vec<&str> = written.lines().skip(1).collect();
    assert_eq!(rows, vec!["C,1,2,2024-03-01,130,2024-03-01 14:00:00,90.5,True"]);
}
