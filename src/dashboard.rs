use std::io::{self, BufRead, IsTerminal};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::models::SurveyResponse;
use crate::report::{self, ReportError};
use crate::store::{LoadOutcome, ResponseStore};

pub const ADMIN_SECRET: &str = "genai2024";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    Granted,
    Denied,
    /// Nothing was entered; neither the dashboard nor an error is shown.
    NoInput,
}

pub fn check_access(input: &str) -> AccessOutcome {
    if input.is_empty() {
        AccessOutcome::NoInput
    } else if input == ADMIN_SECRET {
        AccessOutcome::Granted
    } else {
        AccessOutcome::Denied
    }
}

/// Takes the password from the flag, a hidden terminal prompt, or the first line of stdin.
pub fn read_password(provided: Option<String>) -> io::Result<String> {
    if let Some(value) = provided {
        return Ok(value);
    }
    if io::stdin().is_terminal() {
        return rpassword::prompt_password("Enter admin password: ");
    }
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Every stored response in submission order.
pub fn responses(store: &mut ResponseStore) -> Vec<SurveyResponse> {
    store
        .load()
        .iter()
        .map(|record| record.responses.clone())
        .collect()
}

/// Line shown above the dashboard when the log could not be read cleanly.
pub fn load_notice(outcome: Option<&LoadOutcome>) -> Option<String> {
    match outcome? {
        LoadOutcome::Missing | LoadOutcome::Loaded { .. } => None,
        LoadOutcome::LegacyArray => Some(
            "> Note: the response log is in the legacy JSON array format; \
             run `import-legacy` to migrate it."
                .to_string(),
        ),
        LoadOutcome::Degraded {
            records,
            skipped,
            reason,
        } => Some(format!(
            "> Note: response log was only partly readable ({records} loaded, \
             {skipped} skipped): {reason}"
        )),
    }
}

pub fn render(store: &mut ResponseStore) -> String {
    let responses = responses(store);
    let dashboard = report::build_dashboard(&responses);
    match load_notice(store.load_outcome()) {
        Some(notice) => format!("{notice}\n\n{dashboard}"),
        None => dashboard,
    }
}

/// Writes the dated CSV export. `None` when there is nothing to export; no file is created.
pub fn export_csv(
    store: &mut ResponseStore,
    dir: &Path,
    date: NaiveDate,
) -> Result<Option<PathBuf>, ReportError> {
    let responses = responses(store);
    if responses.is_empty() {
        return Ok(None);
    }
    report::export_csv(dir, &responses, date).map(Some)
}
