use std::io::{self, Write};

use serde::Serialize;

use crate::domain::QueryResponse;
use crate::pipeline::Translation;
use crate::stats::ReadRunStatistics;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Text,
    Json,
}

/// What `query` prints: the endpoint body, its status, and statistics when asked for.
#[derive(Debug, Clone, Serialize)]
pub struct QueryReport {
    pub status: u16,
    #[serde(flatten)]
    pub response: QueryResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statistics: Option<ReadRunStatistics>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    pub expression: String,
    pub valid: bool,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TokenReport {
    pub expression: String,
    pub tokens: Vec<String>,
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_query(report: &QueryReport) -> io::Result<()> {
        Self::print_json(report)
    }

    pub fn print_translation(translation: &Translation) -> io::Result<()> {
        Self::print_json(translation)
    }

    pub fn print_validation(report: &ValidationReport) -> io::Result<()> {
        Self::print_json(report)
    }

    pub fn print_tokens(report: &TokenReport) -> io::Result<()> {
        Self::print_json(report)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}

pub struct TextOutput;

impl TextOutput {
    pub fn print_query(report: &QueryReport) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "status: {}", report.status)?;
        if let Some(error) = &report.response.error {
            writeln!(stdout, "error: {error}")?;
        }
        writeln!(stdout, "read runs: {}", report.response.count)?;
        for run in &report.response.data {
            writeln!(
                stdout,
                "  {}\t{}\t{}\t{}",
                run.accession.as_deref().unwrap_or("-"),
                run.sample_accession.as_deref().unwrap_or("-"),
                run.study_accession.as_deref().unwrap_or("-"),
                run.instrument_platform.as_deref().unwrap_or("-"),
            )?;
        }
        if let Some(stats) = &report.statistics {
            writeln!(
                stdout,
                "bases: {}, biosamples: {}, read runs: {}, studies: {}",
                stats.bases, stats.biosamples, stats.read_runs, stats.studies
            )?;
        }
        Ok(())
    }

    pub fn print_translation(translation: &Translation) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        writeln!(stdout, "{}", translation.rewritten)?;
        for accession in &translation.unresolved {
            writeln!(stdout, "# {accession}: no samples")?;
        }
        Ok(())
    }

    pub fn print_validation(report: &ValidationReport) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        if report.valid {
            writeln!(stdout, "valid: {}", report.expression)?;
        }
        for error in &report.errors {
            writeln!(stdout, "{error}")?;
        }
        Ok(())
    }

    pub fn print_tokens(report: &TokenReport) -> io::Result<()> {
        let mut stdout = io::stdout().lock();
        for token in &report.tokens {
            writeln!(stdout, "{token}")?;
        }
        Ok(())
    }
}
