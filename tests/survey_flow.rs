use genai_workshop_survey::dashboard::{self, AccessOutcome};
use genai_workshop_survey::models::{BuildOutcome, Expectation, SurveyResponse, Workshop};
use genai_workshop_survey::report;
use genai_workshop_survey::store::{LoadOutcome, ResponseStore};
use genai_workshop_survey::survey::{FormError, FormInput};

fn submission(email: &str, expectations: Expectation, what_created: &str) -> SurveyResponse {
    FormInput {
        work_email: email.to_string(),
        expectations,
        built_something: vec![BuildOutcome::ComplexPrompt],
        what_created: what_created.to_string(),
        recommend_colleagues: "Jordan on the servicing analytics team".to_string(),
        most_helpful: vec![Workshop::ComplexPrompts],
        ..FormInput::default()
    }
    .submit()
    .expect("valid submission")
}

#[test]
fn appended_responses_survive_a_fresh_session_in_order() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("genai_survey_responses.jsonl");

    let emails: Vec<String> = (0..12).map(|i| format!("attendee{i}@example.com")).collect();
    {
        let mut session = ResponseStore::open(&path);
        for email in &emails {
            session
                .append(submission(email, Expectation::AsHoped, ""))
                .expect("append");
        }
    }

    let mut fresh = ResponseStore::open(&path);
    let loaded: Vec<&str> = fresh
        .load()
        .iter()
        .map(|record| record.responses.work_email.as_str())
        .collect();
    assert_eq!(loaded, emails);
    assert_eq!(
        fresh.load_outcome(),
        Some(&LoadOutcome::Loaded { records: 12 })
    );

    let timestamps: Vec<_> = fresh.load().iter().map(|record| record.timestamp).collect();
    assert!(timestamps.windows(2).all(|pair| pair[0] <= pair[1]));
}

#[test]
fn rejected_submission_stores_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("responses.jsonl");
    let mut store = ResponseStore::open(&path);

    let form = FormInput {
        work_email: "nope".to_string(),
        what_created: "a whole automation suite".to_string(),
        ..FormInput::default()
    };
    assert_eq!(form.submit(), Err(FormError::InvalidEmail));
    assert!(store.load().is_empty());
    assert!(!path.exists());
}

#[test]
fn unlocked_dashboard_reflects_stored_submissions() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("responses.jsonl");
    let mut store = ResponseStore::open(&path);
    store
        .append(submission(
            "pat@example.com",
            Expectation::More,
            "A prompt that drafts borrower letters",
        ))
        .unwrap();
    store
        .append(submission("lee@example.com", Expectation::NotSure, "short"))
        .unwrap();

    assert_eq!(dashboard::check_access("genai2024"), AccessOutcome::Granted);
    let rendered = dashboard::render(&mut ResponseStore::open(&path));
    assert!(rendered.contains("- Total Responses: 2"));
    assert!(rendered.contains("- Exceeded Expectations: 50%"));
    assert!(rendered.contains("- Built Something: 100%"));
    assert_eq!(rendered.matches("Success Story #").count(), 1);
    assert!(rendered.contains("**pat@example.com**"));
    assert!(!rendered.contains("**lee@example.com**"));

    let responses = dashboard::responses(&mut store);
    let mut csv = Vec::new();
    report::write_csv(&mut csv, &responses).unwrap();
    assert_eq!(String::from_utf8(csv).unwrap().lines().count(), 3);
}
