use env_logger::Env;
use phishreport::cli::{Args, USAGE};
use phishreport::config::ReportOptions;
use phishreport::utils::format_size;
use phishreport::{ReportError, ReportGenerator, ReportResult, ReportSummary};

fn run() -> ReportResult<ReportSummary> {
    let args = Args::parse_from_env()?;
    log::debug!("Parsed args: {:?}", args);

    let options = ReportOptions::from_env().with_timestamp(chrono::Local::now());
    ReportGenerator::new(args, options)?.generate()
}

fn main() {
    // RUST_LOG overrides; stay quiet by default so stdout carries only the result line
    env_logger::Builder::from_env(Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    match run() {
        Ok(summary) => {
            log::info!(
                "{} rows, {} columns, {} written",
                summary.rows,
                summary.columns,
                format_size(summary.bytes_written as u64)
            );
            println!("Report saved to {}", summary.output.display());
        }
        Err(err) => {
            match &err {
                ReportError::Usage => println!("{}", USAGE),
                ReportError::FileNotFound { .. } => println!("{}", err),
                _ => {
                    eprintln!("Error: {}", err);
                    let mut source = std::error::Error::source(&err);
                    while let Some(cause) = source {
                        log::debug!("caused by: {}", cause);
                        source = cause.source();
                    }
                }
            }
            std::process::exit(err.exit_code());
        }
    }
}
