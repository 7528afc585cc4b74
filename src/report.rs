use std::fmt::Write as _;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::metrics::{self, Tally};
use crate::models::{SurveyResponse, FIELD_NAMES};

const BAR_WIDTH: usize = 30;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("failed to write CSV export: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

pub fn build_dashboard(responses: &[SurveyResponse]) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Survey Analytics Dashboard");
    let _ = writeln!(output);

    let Some(headline) = metrics::headline(responses) else {
        let _ = writeln!(output, "No responses yet.");
        return output;
    };

    let _ = writeln!(output, "## Key Metrics");
    let _ = writeln!(output, "- Total Responses: {}", headline.total);
    let _ = writeln!(output, "- Exceeded Expectations: {:.0}%", headline.exceeded_pct);
    let _ = writeln!(output, "- Would Recommend: {:.0}%", headline.recommend_pct);
    let _ = writeln!(output, "- Built Something: {:.0}%", headline.built_pct);

    let _ = writeln!(output);
    let _ = writeln!(output, "## Workshop Expectations");
    write_bar_chart(&mut output, &metrics::expectation_distribution(responses));

    let helpful = metrics::most_helpful_distribution(responses);
    if !helpful.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Most Helpful Workshops");
        write_bar_chart(&mut output, &helpful);
    }

    let least = metrics::least_helpful_distribution(responses);
    if !least.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Least Helpful Workshops");
        write_bar_chart(&mut output, &least);
    }

    let groups = metrics::working_group_distribution(responses);
    if !groups.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Working Group Interest");
        write_bar_chart(&mut output, &groups);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Success Stories");
    for story in metrics::success_stories(responses) {
        let _ = writeln!(output);
        let _ = writeln!(output, "> **Success Story #{}:**", story.number);
        for line in story.story.lines() {
            let _ = writeln!(output, "> {line}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Potential Success Story Champions");
    let champions = metrics::champions(responses);
    if !champions.is_empty() {
        let _ = writeln!(
            output,
            "Participants with strong success stories AND willing to recommend:"
        );
        for champion in champions {
            let _ = writeln!(output);
            let _ = writeln!(output, "**{}**", champion.email);
            let _ = writeln!(output, "- Built: {}", single_line(&champion.built));
            let _ = writeln!(
                output,
                "- Would recommend to: {}",
                single_line(&champion.recommends)
            );
            let _ = writeln!(output, "---");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Raw Data");
    write_raw_table(&mut output, responses);

    output
}

/// Horizontal text bars scaled to the largest count.
pub fn write_bar_chart(output: &mut String, tallies: &[Tally]) {
    let Some(max) = tallies.iter().map(|tally| tally.count).max() else {
        return;
    };
    let label_width = tallies
        .iter()
        .map(|tally| metrics::char_len(tally.label))
        .max()
        .unwrap_or(0);

    let _ = writeln!(output, "```text");
    for tally in tallies {
        let filled = (tally.count * BAR_WIDTH).div_ceil(max);
        let _ = writeln!(
            output,
            "{:<label_width$} | {} {}",
            tally.label,
            "█".repeat(filled),
            tally.count
        );
    }
    let _ = writeln!(output, "```");
}

fn write_raw_table(output: &mut String, responses: &[SurveyResponse]) {
    let _ = writeln!(output, "| {} |", FIELD_NAMES.join(" | "));
    let _ = writeln!(output, "|{}", "---|".repeat(FIELD_NAMES.len()));
    for response in responses {
        let cells: Vec<String> = response.cells().iter().map(|c| table_cell(c)).collect();
        let _ = writeln!(output, "| {} |", cells.join(" | "));
    }
}

fn table_cell(value: &str) -> String {
    single_line(value).replace('|', "\\|")
}

fn single_line(value: &str) -> String {
    value.replace("\r\n", "<br>").replace('\n', "<br>")
}

pub fn csv_file_name(date: NaiveDate) -> String {
    format!("genai_workshop_responses_{}.csv", date.format("%Y%m%d"))
}

pub fn write_csv<W: io::Write>(writer: W, responses: &[SurveyResponse]) -> Result<(), csv::Error> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(FIELD_NAMES)?;
    for response in responses {
        writer.write_record(response.cells())?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the dated CSV export into `dir` and returns its path.
pub fn export_csv(
    dir: &Path,
    responses: &[SurveyResponse],
    date: NaiveDate,
) -> Result<PathBuf, ReportError> {
    std::fs::create_dir_all(dir).map_err(|source| ReportError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(csv_file_name(date));
    let file = std::fs::File::create(&path).map_err(|source| ReportError::Io {
        path: path.clone(),
        source,
    })?;
    write_csv(file, responses)?;
    tracing::info!(path = %path.display(), rows = responses.len(), "csv export written");
    Ok(path)
}
