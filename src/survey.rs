use std::io::{self, BufRead, Write};

use crate::models::{
    BuildOutcome, Choice, Expectation, SurveyResponse, TrainTrainer, WorkingGroup, Workshop,
};

pub const MAX_WORKSHOP_PICKS: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FormError {
    #[error("Please provide a valid work email address")]
    InvalidEmail,
    #[error("{field}: select at most {max} options")]
    TooManySelections { field: &'static str, max: usize },
    #[error("{field}: unknown option {value:?}")]
    UnknownOption { field: &'static str, value: String },
}

/// The form as typed, including answers to conditional questions that ended up hidden.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormInput {
    pub work_email: String,
    pub key_takeaway: String,
    pub missing_coverage: String,
    pub expectations: Expectation,
    pub built_something: Vec<BuildOutcome>,
    pub something_else: String,
    pub what_created: String,
    pub most_helpful: Vec<Workshop>,
    pub least_helpful: Vec<Workshop>,
    pub recommend_colleagues: String,
    pub future_interest: Vec<WorkingGroup>,
    pub sub_lob: String,
    pub train_trainer: TrainTrainer,
    pub improvements: String,
    pub additional_thoughts: String,
    pub anything_else: String,
}

impl FormInput {
    pub fn shows_something_else(&self) -> bool {
        self.built_something.contains(&BuildOutcome::SomethingElse)
    }

    pub fn shows_sub_lob(&self) -> bool {
        self.future_interest.contains(&WorkingGroup::SubLob)
    }

    /// Validates the email and assembles the stored response. Hidden conditional
    /// answers are dropped.
    pub fn submit(&self) -> Result<SurveyResponse, FormError> {
        validate_email(&self.work_email)?;

        Ok(SurveyResponse {
            work_email: self.work_email.clone(),
            key_takeaway: self.key_takeaway.clone(),
            missing_coverage: self.missing_coverage.clone(),
            expectations: self.expectations,
            built_something: dedup(&self.built_something),
            something_else: if self.shows_something_else() {
                self.something_else.clone()
            } else {
                String::new()
            },
            what_created: self.what_created.clone(),
            most_helpful: dedup(&self.most_helpful),
            least_helpful: dedup(&self.least_helpful),
            recommend_colleagues: self.recommend_colleagues.clone(),
            future_interest: dedup(&self.future_interest),
            sub_lob: if self.shows_sub_lob() {
                self.sub_lob.clone()
            } else {
                String::new()
            },
            train_trainer: self.train_trainer,
            improvements: self.improvements.clone(),
            additional_thoughts: self.additional_thoughts.clone(),
            anything_else: self.anything_else.clone(),
        })
    }
}

pub fn validate_email(email: &str) -> Result<(), FormError> {
    if email.is_empty() || !email.contains('@') {
        return Err(FormError::InvalidEmail);
    }
    Ok(())
}

fn dedup<T: Choice>(choices: &[T]) -> Vec<T> {
    let mut unique = Vec::with_capacity(choices.len());
    for choice in choices {
        if !unique.contains(choice) {
            unique.push(*choice);
        }
    }
    unique
}

/// Resolves an option given by its number or its exact label.
pub fn resolve<T: Choice>(field: &'static str, raw: &str) -> Result<T, FormError> {
    let trimmed = raw.trim();
    let found = match trimmed.parse::<usize>() {
        Ok(number) => T::from_number(number),
        Err(_) => T::from_label(trimmed),
    };
    found.ok_or_else(|| FormError::UnknownOption {
        field,
        value: raw.to_string(),
    })
}

/// Resolves a multi-select answer, enforcing the widget's selection cap.
pub fn resolve_many<T: Choice>(
    field: &'static str,
    raw: &[String],
    max: Option<usize>,
) -> Result<Vec<T>, FormError> {
    let mut picks = Vec::with_capacity(raw.len());
    for value in raw {
        picks.push(resolve::<T>(field, value)?);
    }
    let picks = dedup(&picks);
    if let Some(max) = max {
        if picks.len() > max {
            return Err(FormError::TooManySelections { field, max });
        }
    }
    Ok(picks)
}

/// Renders the form as terminal questions.
///
/// Single-choice questions take an option number (blank keeps the default),
/// multi-choice questions take comma-separated numbers (blank selects none).
/// Invalid answers are asked again. Once input runs out every remaining
/// question takes its empty answer.
pub struct Prompter<R, W> {
    input: R,
    output: W,
    exhausted: bool,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            exhausted: false,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    pub fn form(&mut self) -> io::Result<FormInput> {
        let mut form = FormInput {
            work_email: self.text("Your work email")?,
            ..FormInput::default()
        };

        self.heading("Workshop Outcomes")?;
        form.key_takeaway =
            self.text("What's one helpful thing you took away from these workshops?")?;
        form.missing_coverage = self.text(
            "What's one thing these workshops didn't cover that you'd like to explore?",
        )?;
        form.expectations = self.single(
            "Overall, how did these workshops compare to your expectations?",
            Expectation::default(),
        )?;

        self.heading("Practical Application")?;
        form.built_something = self.multi(
            BuildOutcome::FIELD,
            "Did you build something with LLM Suite during or after these workshops? \
             (Check all that apply)",
            None,
        )?;
        if form.shows_something_else() {
            form.something_else = self.text("Please specify what else you built:")?;
        }
        form.what_created = self.text("If yes, describe what you created.")?;

        self.heading("Workshop Effectiveness")?;
        form.most_helpful = self.multi(
            "most_helpful",
            "Which workshops were the most helpful? (Select up to 3)",
            Some(MAX_WORKSHOP_PICKS),
        )?;
        form.least_helpful = self.multi(
            "least_helpful",
            "Which workshops were the least helpful? (Select up to 3)",
            Some(MAX_WORKSHOP_PICKS),
        )?;

        self.heading("Recommendations & Future")?;
        form.recommend_colleagues = self.text(
            "Who are two colleagues you'd recommend these workshops to? \
             Why those colleagues, specifically? (Leave blank if you wouldn't recommend them.)",
        )?;
        form.future_interest = self.multi(
            WorkingGroup::FIELD,
            "(optional) Would you like to contribute to any of these workshop working groups?",
            None,
        )?;
        if form.shows_sub_lob() {
            form.sub_lob = self.text("GenAI for _____ (you fill in the blank):")?;
        }
        form.train_trainer = self.single(
            "(optional) Would you like to participate in a 'train-the-trainer' program \
             to learn how to lead workshops?",
            TrainTrainer::default(),
        )?;

        self.heading("Improvements")?;
        form.improvements = self
            .text("What's one thing you would suggest we improve on or add to these workshops?")?;
        form.additional_thoughts = self.text(
            "Any additional thoughts about the workshops? \
             (e.g., if sessions felt too long/short, needed more/less guidance, etc.)",
        )?;
        form.anything_else = self.text("(optional) Anything else you'd like to share?")?;

        Ok(form)
    }

    /// Asks the whole form, then submits it. A rejected email is asked again
    /// with every other answer kept, until it passes or input runs out.
    pub fn submit_form(&mut self) -> io::Result<Result<SurveyResponse, FormError>> {
        let mut form = self.form()?;
        loop {
            match form.submit() {
                Ok(response) => return Ok(Ok(response)),
                Err(error) => match self.reenter_email(&error)? {
                    Some(email) => form.work_email = email,
                    None => return Ok(Err(error)),
                },
            }
        }
    }

    /// Asks for the email again after a failed submit. `None` once input has run out.
    pub fn reenter_email(&mut self, error: &FormError) -> io::Result<Option<String>> {
        writeln!(self.output, "{error}")?;
        if self.exhausted {
            return Ok(None);
        }
        self.ask("Your work email")
    }

    fn heading(&mut self, title: &str) -> io::Result<()> {
        writeln!(self.output)?;
        writeln!(self.output, "### {title}")
    }

    fn text(&mut self, question: &str) -> io::Result<String> {
        Ok(self.ask(question)?.unwrap_or_default())
    }

    fn single<T: Choice>(&mut self, question: &str, default: T) -> io::Result<T> {
        writeln!(self.output, "{question}")?;
        self.list_options::<T>()?;
        loop {
            let Some(answer) = self.ask(&format!("Choice [{}]", option_number(default)))? else {
                return Ok(default);
            };
            if answer.trim().is_empty() {
                return Ok(default);
            }
            match resolve::<T>(T::FIELD, &answer) {
                Ok(choice) => return Ok(choice),
                Err(error) => writeln!(self.output, "{error}")?,
            }
        }
    }

    fn multi<T: Choice>(
        &mut self,
        field: &'static str,
        question: &str,
        max: Option<usize>,
    ) -> io::Result<Vec<T>> {
        writeln!(self.output, "{question}")?;
        self.list_options::<T>()?;
        loop {
            let Some(answer) = self.ask("Choices (comma-separated, blank for none)")? else {
                return Ok(Vec::new());
            };
            let parts: Vec<String> = answer
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect();
            match resolve_many::<T>(field, &parts, max) {
                Ok(picks) => return Ok(picks),
                Err(error) => writeln!(self.output, "{error}")?,
            }
        }
    }

    fn list_options<T: Choice>(&mut self) -> io::Result<()> {
        for (index, choice) in T::ALL.iter().enumerate() {
            writeln!(self.output, "  {}. {}", index + 1, choice.label())?;
        }
        Ok(())
    }

    fn ask(&mut self, prompt: &str) -> io::Result<Option<String>> {
        write!(self.output, "{prompt}: ")?;
        self.output.flush()?;
        if self.exhausted {
            writeln!(self.output)?;
            return Ok(None);
        }
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            self.exhausted = true;
            writeln!(self.output)?;
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}

fn option_number<T: Choice>(choice: T) -> usize {
    T::ALL
        .iter()
        .position(|candidate| *candidate == choice)
        .map_or(1, |index| index + 1)
}
