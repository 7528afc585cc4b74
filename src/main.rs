use std::io;
use std::path::PathBuf;

use anyhow::{bail, Context};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use genai_workshop_survey::config::Config;
use genai_workshop_survey::dashboard::{self, AccessOutcome};
use genai_workshop_survey::models::{
    BuildOutcome, Choice, Expectation, TrainTrainer, WorkingGroup, Workshop,
};
use genai_workshop_survey::store::ResponseStore;
use genai_workshop_survey::survey::{self, FormError, FormInput, Prompter, MAX_WORKSHOP_PICKS};

#[derive(Parser)]
#[command(name = "workshop-survey")]
#[command(about = "GenAI workshop review: collect feedback and report on it", long_about = None)]
struct Cli {
    /// Response log path (overrides SURVEY_STORE_PATH)
    #[arg(long, global = true)]
    store: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Submit one survey response
    Submit(SubmitArgs),
    /// Show the password-protected analytics dashboard
    Dashboard {
        #[arg(long)]
        password: Option<String>,
        /// Write the dashboard markdown here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
        /// Also write the dated CSV export into this directory
        #[arg(long)]
        csv_dir: Option<PathBuf>,
    },
    /// Export every response as a dated CSV file
    ExportCsv {
        #[arg(long)]
        password: Option<String>,
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Append the records of a legacy JSON array file to the response log
    ImportLegacy {
        #[arg(long)]
        json: PathBuf,
    },
    /// List the numbered options of every fixed-choice question
    Options,
}

#[derive(Args)]
struct SubmitArgs {
    /// Ask each question in the terminal instead of reading flags
    #[arg(long)]
    interactive: bool,
    #[arg(long, default_value = "")]
    work_email: String,
    #[arg(long, default_value = "")]
    key_takeaway: String,
    #[arg(long, default_value = "")]
    missing_coverage: String,
    /// Option number or label
    #[arg(long)]
    expectations: Option<String>,
    /// Repeat for each option (number or label)
    #[arg(long = "built", value_name = "OPTION")]
    built_something: Vec<String>,
    #[arg(long, default_value = "")]
    something_else: String,
    #[arg(long, default_value = "")]
    what_created: String,
    /// Repeat for each workshop, up to 3
    #[arg(long = "most-helpful", value_name = "WORKSHOP")]
    most_helpful: Vec<String>,
    /// Repeat for each workshop, up to 3
    #[arg(long = "least-helpful", value_name = "WORKSHOP")]
    least_helpful: Vec<String>,
    #[arg(long, default_value = "")]
    recommend_colleagues: String,
    /// Repeat for each working group
    #[arg(long = "future-interest", value_name = "GROUP")]
    future_interest: Vec<String>,
    #[arg(long, default_value = "")]
    sub_lob: String,
    #[arg(long)]
    train_trainer: Option<String>,
    #[arg(long, default_value = "")]
    improvements: String,
    #[arg(long, default_value = "")]
    additional_thoughts: String,
    #[arg(long, default_value = "")]
    anything_else: String,
}

impl SubmitArgs {
    fn into_form(self) -> Result<FormInput, FormError> {
        let expectations = match self.expectations.as_deref() {
            Some(raw) => survey::resolve::<Expectation>(Expectation::FIELD, raw)?,
            None => Expectation::default(),
        };
        let train_trainer = match self.train_trainer.as_deref() {
            Some(raw) => survey::resolve::<TrainTrainer>(TrainTrainer::FIELD, raw)?,
            None => TrainTrainer::default(),
        };

        Ok(FormInput {
            work_email: self.work_email,
            key_takeaway: self.key_takeaway,
            missing_coverage: self.missing_coverage,
            expectations,
            built_something: survey::resolve_many::<BuildOutcome>(
                BuildOutcome::FIELD,
                &self.built_something,
                None,
            )?,
            something_else: self.something_else,
            what_created: self.what_created,
            most_helpful: survey::resolve_many::<Workshop>(
                "most_helpful",
                &self.most_helpful,
                Some(MAX_WORKSHOP_PICKS),
            )?,
            least_helpful: survey::resolve_many::<Workshop>(
                "least_helpful",
                &self.least_helpful,
                Some(MAX_WORKSHOP_PICKS),
            )?,
            recommend_colleagues: self.recommend_colleagues,
            future_interest: survey::resolve_many::<WorkingGroup>(
                WorkingGroup::FIELD,
                &self.future_interest,
                None,
            )?,
            sub_lob: self.sub_lob,
            train_trainer,
            improvements: self.improvements,
            additional_thoughts: self.additional_thoughts,
            anything_else: self.anything_else,
        })
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = Config::from_env().with_store_override(cli.store);
    init_tracing(&config);

    let mut store = ResponseStore::open(&config.store_path);

    match cli.command {
        Commands::Submit(args) => {
            let response = if args.interactive {
                let stdin = io::stdin();
                let mut prompter = Prompter::new(stdin.lock(), io::stdout());
                prompter
                    .submit_form()
                    .context("failed to read survey answers")??
            } else {
                args.into_form()?.submit()?
            };

            store
                .append(response)
                .with_context(|| format!("failed to save response to {}", store.path().display()))?;
            println!("Thank you! Your feedback has been submitted.");
        }
        Commands::Dashboard {
            password,
            out,
            csv_dir,
        } => {
            if !unlock(password)? {
                return Ok(());
            }
            let rendered = dashboard::render(&mut store);
            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Dashboard written to {}.", path.display());
                }
                None => print!("{rendered}"),
            }
            // The empty state is already part of the rendered dashboard.
            if let Some(dir) = csv_dir {
                if let Some(path) =
                    dashboard::export_csv(&mut store, &dir, Local::now().date_naive())?
                {
                    println!("CSV written to {}.", path.display());
                }
            }
        }
        Commands::ExportCsv { password, out_dir } => {
            if !unlock(password)? {
                return Ok(());
            }
            match dashboard::export_csv(&mut store, &out_dir, Local::now().date_naive())? {
                Some(path) => println!("CSV written to {}.", path.display()),
                None => println!("No responses yet."),
            }
        }
        Commands::ImportLegacy { json } => {
            let imported = store.import_legacy(&json)?;
            println!(
                "Imported {imported} responses from {} into {}.",
                json.display(),
                store.path().display()
            );
        }
        Commands::Options => {
            print_options::<Expectation>();
            print_options::<BuildOutcome>();
            print_options::<Workshop>();
            print_options::<WorkingGroup>();
            print_options::<TrainTrainer>();
        }
    }

    Ok(())
}

/// `Ok(false)` when no password was entered.
fn unlock(password: Option<String>) -> anyhow::Result<bool> {
    let input = dashboard::read_password(password).context("failed to read admin password")?;
    match dashboard::check_access(&input) {
        AccessOutcome::Granted => Ok(true),
        AccessOutcome::NoInput => Ok(false),
        AccessOutcome::Denied => bail!("Incorrect password"),
    }
}

fn print_options<T: Choice>() {
    println!("{}:", T::FIELD);
    for (index, choice) in T::ALL.iter().enumerate() {
        println!("  {}. {}", index + 1, choice.label());
    }
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    if config.log_json {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
            .init();
    }
}
