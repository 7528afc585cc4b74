use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// A fixed-option question. Options are numbered from 1 in declaration order.
pub trait Choice: Copy + Eq + 'static {
    const FIELD: &'static str;
    const ALL: &'static [Self];

    fn label(self) -> &'static str;

    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|choice| choice.label() == label)
    }

    fn from_number(number: usize) -> Option<Self> {
        number
            .checked_sub(1)
            .and_then(|index| Self::ALL.get(index))
            .copied()
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown {field} option: {value:?}")]
pub struct UnknownLabel {
    pub field: &'static str,
    pub value: String,
}

macro_rules! label_serde {
    ($choice:ty) => {
        impl From<$choice> for &'static str {
            fn from(choice: $choice) -> Self {
                choice.label()
            }
        }

        impl TryFrom<String> for $choice {
            type Error = UnknownLabel;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                <$choice as Choice>::from_label(&value).ok_or(UnknownLabel {
                    field: <$choice as Choice>::FIELD,
                    value,
                })
            }
        }
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum Expectation {
    #[default]
    WayMore,
    More,
    AsHoped,
    WantedDifferent,
    FellShort,
    NotSure,
}

impl Choice for Expectation {
    const FIELD: &'static str = "expectations";
    const ALL: &'static [Self] = &[
        Self::WayMore,
        Self::More,
        Self::AsHoped,
        Self::WantedDifferent,
        Self::FellShort,
        Self::NotSure,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::WayMore => "I got WAY more than I was expecting from these workshops",
            Self::More => "I got more than I expected",
            Self::AsHoped => "I got what I was hoping for",
            Self::WantedDifferent => "I was hoping for something more or different",
            Self::FellShort => "These workshops fell short of my expectations",
            Self::NotSure => "Not sure",
        }
    }
}

label_serde!(Expectation);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum BuildOutcome {
    ComplexPrompt,
    CustomTile,
    CustomCode,
    SomethingElse,
    PlanningTo,
    NotSure,
}

impl Choice for BuildOutcome {
    const FIELD: &'static str = "built_something";
    const ALL: &'static [Self] = &[
        Self::ComplexPrompt,
        Self::CustomTile,
        Self::CustomCode,
        Self::SomethingElse,
        Self::PlanningTo,
        Self::NotSure,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::ComplexPrompt => "I made a complex prompt",
            Self::CustomTile => "I set up a custom tile in LLM Suite",
            Self::CustomCode => "I wrote some custom code",
            Self::SomethingElse => "Something else",
            Self::PlanningTo => "Not yet but I plan to soon",
            Self::NotSure => "I'm not sure?",
        }
    }
}

label_serde!(BuildOutcome);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum Workshop {
    PicoFramework,
    ComplexPrompts,
    BetterDecisions,
    PracticePerformance,
    WriteAndRunCode,
    ShareCodingProjects,
    PrototypeUtilities,
    ImpactUtility,
}

impl Choice for Workshop {
    const FIELD: &'static str = "workshop";
    const ALL: &'static [Self] = &[
        Self::PicoFramework,
        Self::ComplexPrompts,
        Self::BetterDecisions,
        Self::PracticePerformance,
        Self::WriteAndRunCode,
        Self::ShareCodingProjects,
        Self::PrototypeUtilities,
        Self::ImpactUtility,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::PicoFramework => "Prompting: Improving prompts with the PICO framework",
            Self::ComplexPrompts => "Prompting: Craft and iterate on complex prompts",
            Self::BetterDecisions => "Collaborating with GenAI: Make better decisions with GenAI",
            Self::PracticePerformance => {
                "Collaborating with GenAI: Practice and improve performance with GenAI"
            }
            Self::WriteAndRunCode => "Coding with GenAI: Write and run code with LLM Suite",
            Self::ShareCodingProjects => "Coding with GenAI: Organize and share coding projects",
            Self::PrototypeUtilities => "Crafting Utilities: Prototype and test GenAI Utilities",
            Self::ImpactUtility => {
                "Crafting Utilities: Collaborate on a Utility that makes an impact"
            }
        }
    }
}

label_serde!(Workshop);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum WorkingGroup {
    RisingLeaders,
    LearningAndDevelopment,
    Sales,
    TechData,
    DesignProduct,
    SubLob,
    MoreInfo,
}

impl Choice for WorkingGroup {
    const FIELD: &'static str = "future_interest";
    const ALL: &'static [Self] = &[
        Self::RisingLeaders,
        Self::LearningAndDevelopment,
        Self::Sales,
        Self::TechData,
        Self::DesignProduct,
        Self::SubLob,
        Self::MoreInfo,
    ];

    fn label(self) -> &'static str {
        match self {
            Self::RisingLeaders => "GenAI for rising leaders",
            Self::LearningAndDevelopment => "GenAI for learning and development",
            Self::Sales => "GenAI for sales professionals",
            Self::TechData => "GenAI for tech / data",
            Self::DesignProduct => "GenAI for design / product",
            Self::SubLob => {
                "GenAI for your sub-LOB (e.g. originations, servicing, correspondent, ...)"
            }
            Self::MoreInfo => "I'm not sure. I'd like more info.",
        }
    }
}

label_serde!(WorkingGroup);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "&'static str", try_from = "String")]
pub enum TrainTrainer {
    #[default]
    Yes,
    Maybe,
    NoThanks,
    NotSure,
}

impl Choice for TrainTrainer {
    const FIELD: &'static str = "train_trainer";
    const ALL: &'static [Self] = &[Self::Yes, Self::Maybe, Self::NoThanks, Self::NotSure];

    fn label(self) -> &'static str {
        match self {
            Self::Yes => "Yes!",
            Self::Maybe => "I think so?",
            Self::NoThanks => "No thanks",
            Self::NotSure => "Not sure",
        }
    }
}

label_serde!(TrainTrainer);

/// Column order used by the raw table and the CSV export.
pub const FIELD_NAMES: [&str; 16] = [
    "work_email",
    "key_takeaway",
    "missing_coverage",
    "expectations",
    "built_something",
    "something_else",
    "what_created",
    "most_helpful",
    "least_helpful",
    "recommend_colleagues",
    "future_interest",
    "sub_lob",
    "train_trainer",
    "improvements",
    "additional_thoughts",
    "anything_else",
];

/// One attendee's answers. Only `work_email` is required when reading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurveyResponse {
    pub work_email: String,
    #[serde(default)]
    pub key_takeaway: String,
    #[serde(default)]
    pub missing_coverage: String,
    #[serde(default)]
    pub expectations: Expectation,
    #[serde(default)]
    pub built_something: Vec<BuildOutcome>,
    #[serde(default)]
    pub something_else: String,
    #[serde(default)]
    pub what_created: String,
    #[serde(default)]
    pub most_helpful: Vec<Workshop>,
    #[serde(default)]
    pub least_helpful: Vec<Workshop>,
    #[serde(default)]
    pub recommend_colleagues: String,
    #[serde(default)]
    pub future_interest: Vec<WorkingGroup>,
    #[serde(default)]
    pub sub_lob: String,
    #[serde(default)]
    pub train_trainer: TrainTrainer,
    #[serde(default)]
    pub improvements: String,
    #[serde(default)]
    pub additional_thoughts: String,
    #[serde(default)]
    pub anything_else: String,
}

impl SurveyResponse {
    /// A response with only the email filled in and every other field at its default.
    pub fn with_email(work_email: impl Into<String>) -> Self {
        Self {
            work_email: work_email.into(),
            key_takeaway: String::new(),
            missing_coverage: String::new(),
            expectations: Expectation::default(),
            built_something: Vec::new(),
            something_else: String::new(),
            what_created: String::new(),
            most_helpful: Vec::new(),
            least_helpful: Vec::new(),
            recommend_colleagues: String::new(),
            future_interest: Vec::new(),
            sub_lob: String::new(),
            train_trainer: TrainTrainer::default(),
            improvements: String::new(),
            additional_thoughts: String::new(),
            anything_else: String::new(),
        }
    }

    /// Cell values in [`FIELD_NAMES`] order. Multi-select answers are joined with `"; "`.
    pub fn cells(&self) -> [String; 16] {
        [
            self.work_email.clone(),
            self.key_takeaway.clone(),
            self.missing_coverage.clone(),
            self.expectations.label().to_string(),
            join_labels(&self.built_something),
            self.something_else.clone(),
            self.what_created.clone(),
            join_labels(&self.most_helpful),
            join_labels(&self.least_helpful),
            self.recommend_colleagues.clone(),
            join_labels(&self.future_interest),
            self.sub_lob.clone(),
            self.train_trainer.label().to_string(),
            self.improvements.clone(),
            self.additional_thoughts.clone(),
            self.anything_else.clone(),
        ]
    }
}

fn join_labels<T: Choice>(choices: &[T]) -> String {
    choices
        .iter()
        .map(|choice| choice.label())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub timestamp: NaiveDateTime,
    pub responses: SurveyResponse,
}

impl StoredRecord {
    pub fn stamp(responses: SurveyResponse) -> Self {
        Self {
            timestamp: Local::now().naive_local(),
            responses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_are_numbered_from_one() {
        assert_eq!(Expectation::from_number(1), Some(Expectation::WayMore));
        assert_eq!(Expectation::from_number(6), Some(Expectation::NotSure));
        assert_eq!(Expectation::from_number(0), None);
        assert_eq!(Workshop::from_number(9), None);
        assert_eq!(Workshop::ALL.len(), 8);
        assert_eq!(WorkingGroup::ALL.len(), 7);
    }

    #[test]
    fn choices_serialize_as_their_labels() {
        let json = serde_json::to_string(&vec![BuildOutcome::SomethingElse]).unwrap();
        assert_eq!(json, r#"["Something else"]"#);

        let parsed: TrainTrainer = serde_json::from_str(r#""I think so?""#).unwrap();
        assert_eq!(parsed, TrainTrainer::Maybe);

        let unknown = serde_json::from_str::<Expectation>(r#""Meh""#);
        assert!(unknown.is_err());
    }

    #[test]
    fn record_with_only_email_fills_defaults() {
        let raw = r#"{"timestamp":"2024-06-03T14:05:09.123456","responses":{"work_email":"a@b.com"}}"#;
        let record: StoredRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.responses, SurveyResponse::with_email("a@b.com"));
        assert_eq!(record.timestamp.to_string(), "2024-06-03 14:05:09.123456");
    }

    #[test]
    fn stamped_timestamp_is_local_time_without_offset() {
        let record = StoredRecord::stamp(SurveyResponse::with_email("a@b.com"));
        let json = serde_json::to_value(&record).unwrap();
        let stamp = json["timestamp"].as_str().expect("timestamp string");
        assert!(stamp.parse::<NaiveDateTime>().is_ok());
        assert!(!stamp.ends_with('Z'));
        assert!(!stamp[stamp.len() - 6..].contains('+'));
    }

    #[test]
    fn cells_follow_field_names() {
        let mut response = SurveyResponse::with_email("a@b.com");
        response.most_helpful = vec![Workshop::PicoFramework, Workshop::ImpactUtility];
        let cells = response.cells();
        assert_eq!(cells.len(), FIELD_NAMES.len());
        assert_eq!(cells[0], "a@b.com");
        assert_eq!(
            cells[7],
            "Prompting: Improving prompts with the PICO framework; \
             Crafting Utilities: Collaborate on a Utility that makes an impact"
        );
        assert_eq!(cells[12], "Yes!");
    }
}
