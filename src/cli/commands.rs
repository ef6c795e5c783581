use crate::cli::args::{Cli, Commands};
use crate::error::{ProcessingError, Result};
use crate::models::{PipelineConfig, PipelineReport, PipelineStatus, Table};
use crate::processors::Pipeline;
use crate::readers::TableReader;
use crate::utils::constants::PIPELINE_STAGE_COUNT;
use crate::utils::progress::ProgressReporter;
use crate::writers::CsvWriter;
use std::fs;
use std::path::Path;

pub fn run(cli: Cli) -> Result<()> {
    let config = PipelineConfig::load(cli.config.as_deref())?;
    let silent = cli.hide_progress();
    let command = cli.command.unwrap_or(Commands::Process {
        input: None,
        output: None,
        threshold: None,
        pollutant_column: None,
        report_json: None,
    });

    match command {
        Commands::Process {
            input,
            output,
            threshold,
            pollutant_column,
            report_json,
        } => {
            let mut config = config;
            if let Some(input) = input {
                config.input_path = input;
            }
            if let Some(output) = output {
                config.output_path = output;
            }
            if let Some(threshold) = threshold {
                config.threshold = threshold;
            }
            if let Some(column) = pollutant_column {
                config.pollutant_column = column;
            }
            config.check()?;

            if !cli.quiet {
                println!("Processing air monitor data...");
                println!("Input file: {}", config.input_path.display());
                println!("Output file: {}", config.output_path.display());
            }

            let progress =
                ProgressReporter::new_stages(PIPELINE_STAGE_COUNT, "Starting pipeline", silent);
            let pipeline = Pipeline::new(config);
            let outcome = pipeline.run(Some(&progress))?;
            progress.finish_and_clear();

            if !cli.quiet {
                println!("\n{}", outcome.report.summary());
            }

            if let Some(path) = report_json {
                write_report_json(&outcome.report, &path)?;
                if !cli.quiet {
                    println!("Report written to {}", path.display());
                }
            }

            let config = pipeline.config();
            match outcome.report.status {
                PipelineStatus::InputMissing => {
                    return Err(ProcessingError::InputNotFound(config.input_path.clone()));
                }
                PipelineStatus::SaveFailed => {
                    return Err(ProcessingError::OutputNotWritten(config.output_path.clone()));
                }
                PipelineStatus::Completed => {}
            }

            if !cli.quiet {
                let file_info = CsvWriter::new().get_file_info(&config.output_path)?;
                println!("{}", file_info.summary());
                println!("Processing complete!");
            }
        }

        Commands::Validate { input } => {
            let mut config = config;
            if let Some(input) = input {
                config.input_path = input;
            }

            println!("Validating air monitor data...");
            println!("Input file: {}", config.input_path.display());

            let progress = ProgressReporter::new_spinner("Validating data...", silent);
            let pipeline = Pipeline::new(config);
            let (table, load_report) = TableReader::new()
                .load(&pipeline.config().input_path)?
                .ok_or_else(|| {
                    ProcessingError::InputNotFound(pipeline.config().input_path.clone())
                })?;

            let missing = pipeline.check_schema(&table);
            if !missing.is_empty() {
                progress.finish_and_clear();
                println!("⚠️  Input is missing {} required columns:", missing.len());
                for column in &missing {
                    println!("  - {}", column);
                }
                return Err(ProcessingError::InvalidFormat(format!(
                    "Missing required columns: {}",
                    missing.join(", ")
                )));
            }

            let (_table, mut steps) = pipeline.process(table, Some(&progress))?;
            steps.insert(0, load_report);
            progress.finish_with_message("Validation complete");

            let report = PipelineReport {
                status: PipelineStatus::Completed,
                steps,
            };
            println!("\n{}", report.summary());

            if report.warning_count() == 0 {
                println!("✅ All data passed validation checks");
            } else {
                println!("⚠️  Found {} validation warnings", report.warning_count());
            }
            println!("Validation complete - no output file written");
        }

        Commands::Info { file, sample } => {
            println!("Analyzing CSV file: {}", file.display());

            let (table, _) = TableReader::new()
                .load(&file)?
                .ok_or_else(|| ProcessingError::InputNotFound(file.clone()))?;

            println!("\n{}", describe_table(&table));

            let file_info = CsvWriter::new().get_file_info(&file)?;
            println!("{}", file_info.summary());

            if sample > 0 {
                println!("\nSample Records (showing {} records):", sample.min(table.num_rows()));
                for (i, row) in table.head(sample).iter().enumerate() {
                    let cells: Vec<String> = row.iter().map(|v| v.to_string()).collect();
                    println!("{}. {}", i + 1, cells.join(" | "));
                }
            }
        }

        Commands::ShowConfig => {
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn write_report_json(report: &PipelineReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, serde_json::to_string_pretty(report)?)?;
    Ok(())
}

fn describe_table(table: &Table) -> String {
    let mut summary = String::new();
    summary.push_str(&format!(
        "Shape: ({}, {})\nColumns:\n",
        table.num_rows(),
        table.num_columns()
    ));

    for column in table.columns() {
        let kind = table
            .column_kind(column)
            .map(|k| format!("{:?}", k).to_lowercase())
            .unwrap_or_default();
        summary.push_str(&format!("  - {:<28} {}\n", column, kind));
    }

    summary
}
