use clap::Parser;
use std::path::PathBuf;

use crate::domain::{DEFAULT_EXPORT_FILE, TableConfig, TableError};

#[derive(Parser, Debug, Clone, Default)]
#[command(
    name = "rt",
    version,
    about = "Browse and filter a table of records",
    long_about = "rt shows a table of records and narrows it down by a search over name and email plus exact category, type and status filters.\n\nExamples:\n  rt\n  rt --data members.csv --status Active\n  rt --category Premium --html premium.html"
)]
pub struct Args {
    #[arg(
        short = 'd',
        long = "data",
        value_name = "FILE",
        help_heading = "Input",
        help = "Load records from a csv, parquet or arrow file instead of the built-in set."
    )]
    pub data: Option<String>,

    #[arg(
        short = 's',
        long = "search",
        value_name = "TEXT",
        default_value = "",
        help_heading = "Filters",
        help = "Initial search text, matched against name and email ignoring case."
    )]
    pub search: String,

    #[arg(
        long = "category",
        value_name = "VALUE",
        default_value = "",
        help_heading = "Filters",
        help = "Only show records of this category (Standard, Premium, Enterprise)."
    )]
    pub category: String,

    #[arg(
        long = "type",
        value_name = "VALUE",
        default_value = "",
        help_heading = "Filters",
        help = "Only show records of this type (Business, Personal, Academic)."
    )]
    pub kind: String,

    #[arg(
        long = "status",
        value_name = "VALUE",
        default_value = "",
        help_heading = "Filters",
        help = "Only show records with this status (Active, Inactive, Pending)."
    )]
    pub status: String,

    #[arg(
        long = "html",
        value_name = "FILE",
        help_heading = "Output",
        help = "Write the filtered table as a static html page and exit."
    )]
    pub html: Option<String>,

    #[arg(
        long = "poll-ms",
        value_name = "MS",
        default_value_t = 100,
        help_heading = "Terminal",
        help = "Event poll interval of the terminal ui."
    )]
    pub poll_ms: u64,

    #[arg(
        long = "log-file",
        value_name = "FILE",
        help_heading = "Output",
        help = "Log destination, defaults to rt.log in the temp directory."
    )]
    pub log_file: Option<String>,
}

/// Expand `~` and environment variables in a user supplied path.
pub fn expand_path(path: &str) -> Result<PathBuf, TableError> {
    shellexpand::full(path)
        .map(|p| PathBuf::from(p.as_ref()))
        .map_err(|e| TableError::LoadingFailed(format!("cannot expand \"{path}\": {e}")))
}

impl Args {
    pub fn to_config(&self) -> Result<TableConfig, TableError> {
        let mut config = TableConfig::default()
            .with_event_poll_time(self.poll_ms)
            .with_export_file(expand_path(self.html.as_deref().unwrap_or(DEFAULT_EXPORT_FILE))?);
        if let Some(data) = &self.data {
            config = config.with_data_file(expand_path(data)?);
        }
        if let Some(log_file) = &self.log_file {
            config = config.with_log_file(expand_path(log_file)?);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_filters() {
        let args = Args::try_parse_from([
            "rt", "-s", "alice", "--category", "Premium", "--type", "Business", "--status", "Active",
        ])
        .unwrap();
        assert_eq!(args.search, "alice");
        assert_eq!(args.category, "Premium");
        assert_eq!(args.kind, "Business");
        assert_eq!(args.status, "Active");
        assert!(args.html.is_none());
    }

    #[test]
    fn defaults_to_unset_filters() {
        let args = Args::try_parse_from(["rt"]).unwrap();
        assert_eq!(args.search, "");
        assert_eq!(args.category, "");
        let config = args.to_config().unwrap();
        assert_eq!(config.event_poll_time, 100);
        assert!(config.data_file.is_none());
        assert_eq!(config.export_file, PathBuf::from(DEFAULT_EXPORT_FILE));
    }

    #[test]
    fn html_path_becomes_export_file() {
        let args = Args::try_parse_from(["rt", "--html", "out.html", "--poll-ms", "50"]).unwrap();
        let config = args.to_config().unwrap();
        assert_eq!(config.export_file, PathBuf::from("out.html"));
        assert_eq!(config.event_poll_time, 50);
    }

    #[test]
    fn plain_paths_are_kept() {
        assert_eq!(expand_path("data/members.csv").unwrap(), PathBuf::from("data/members.csv"));
    }
}
