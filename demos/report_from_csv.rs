use sales_insight_builder::{read_csv_file, AnalysisConfig, SalesInsightProcessor};
use std::env;

fn main() -> anyhow::Result<()> {
    let mut args = env::args().skip(1);
    let Some(csv_path) = args.next() else {
        eprintln!("usage: report_from_csv <sales.csv> [config.json]");
        std::process::exit(2);
    };

    let config = match args.next() {
        Some(path) => AnalysisConfig::from_path(path)?,
        None => AnalysisConfig::default(),
    };

    let table = read_csv_file(&csv_path)?;
    let report = match SalesInsightProcessor::process(&table, &config) {
        Ok(report) => report,
        Err(e) if e.is_fatal_input_error() => {
            eprintln!("Analysis failed ({}): {}", e.reason_code(), e);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    println!("{}", report.to_markdown());
    println!("--- JSON payload ---");
    println!("{}", report.to_json()?);

    Ok(())
}
