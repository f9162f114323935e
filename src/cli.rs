use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

use crate::errors::{ReportError, ReportResult};

pub const USAGE: &str = "Usage: phishreport <result.csv> <report.html>";

#[derive(Parser, Debug, Clone)]
#[command(
    name = "phishreport",
    about = "Render a GoPhish campaign CSV export as a stand-alone HTML report",
    disable_help_flag = true,
    disable_version_flag = true
)]
pub struct Args {
    /// Campaign results exported as CSV
    pub input: PathBuf,

    /// Destination HTML file (overwritten if present)
    pub output: PathBuf,
}

impl Args {
    /// Parse the process arguments. Anything other than two paths is a usage error.
    pub fn parse_from_env() -> ReportResult<Self> {
        Self::parse_from_iter(std::env::args_os())
    }

    pub fn parse_from_iter<I, T>(args: I) -> ReportResult<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        Self::try_parse_from(args).map_err(|err| {
            log::debug!("Argument parsing failed: {}", err);
            ReportError::Usage
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_two_positionals() -> ReportResult<()> {
        let args = Args::parse_from_iter(["phishreport", "result.csv", "report.html"])?;
        assert_eq!(args.input, PathBuf::from("result.csv"));
        assert_eq!(args.output, PathBuf::from("report.html"));
        Ok(())
    }

    #[test]
    fn test_wrong_argument_counts_are_usage_errors() {
        let cases: [&[&str]; 4] = [
            &["phishreport"],
            &["phishreport", "result.csv"],
            &["phishreport", "a.csv", "b.html", "extra"],
            &["phishreport", "--help"],
        ];
        for argv in cases {
            assert!(
                matches!(Args::parse_from_iter(argv.iter().copied()), Err(ReportError::Usage)),
                "{argv:?}"
            );
        }
    }
}
