use crate::models::{Choice, Expectation, SurveyResponse};

pub const RECOMMEND_MIN_CHARS: usize = 10;
pub const STORY_MIN_CHARS: usize = 20;
pub const STORY_LIMIT: usize = 5;
pub const EXCERPT_CHARS: usize = 100;

#[derive(Debug, Clone, PartialEq)]
pub struct Headline {
    pub total: usize,
    pub exceeded_pct: f64,
    pub recommend_pct: f64,
    pub built_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tally {
    pub label: &'static str,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessStory<'a> {
    pub number: usize,
    pub story: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Champion<'a> {
    pub email: &'a str,
    pub built: String,
    pub recommends: String,
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

pub fn percentage(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64 * 100.0
}

/// Label match on "WAY more" or "more than I expected".
pub fn exceeded(expectation: Expectation) -> bool {
    let label = expectation.label();
    label.contains("WAY more") || label.contains("more than I expected")
}

/// Any recommendation text longer than ten characters counts, whatever it says.
pub fn would_recommend(response: &SurveyResponse) -> bool {
    char_len(&response.recommend_colleagues) > RECOMMEND_MIN_CHARS
}

/// `None` when there are no responses.
pub fn headline(responses: &[SurveyResponse]) -> Option<Headline> {
    if responses.is_empty() {
        return None;
    }
    let total = responses.len();
    let exceeded_count = responses
        .iter()
        .filter(|response| exceeded(response.expectations))
        .count();
    let recommend_count = responses.iter().filter(|r| would_recommend(r)).count();
    let built_count = responses
        .iter()
        .filter(|response| !response.built_something.is_empty())
        .count();

    Some(Headline {
        total,
        exceeded_pct: percentage(exceeded_count, total),
        recommend_pct: percentage(recommend_count, total),
        built_pct: percentage(built_count, total),
    })
}

/// Counts labels, most frequent first. Ties keep first-seen order.
pub fn tally<I>(labels: I) -> Vec<Tally>
where
    I: IntoIterator<Item = &'static str>,
{
    let mut tallies: Vec<Tally> = Vec::new();
    for label in labels {
        match tallies.iter_mut().find(|tally| tally.label == label) {
            Some(tally) => tally.count += 1,
            None => tallies.push(Tally { label, count: 1 }),
        }
    }
    tallies.sort_by(|a, b| b.count.cmp(&a.count));
    tallies
}

pub fn expectation_distribution(responses: &[SurveyResponse]) -> Vec<Tally> {
    tally(responses.iter().map(|response| response.expectations.label()))
}

pub fn most_helpful_distribution(responses: &[SurveyResponse]) -> Vec<Tally> {
    tally(
        responses
            .iter()
            .flat_map(|response| response.most_helpful.iter().map(|w| w.label())),
    )
}

pub fn least_helpful_distribution(responses: &[SurveyResponse]) -> Vec<Tally> {
    tally(
        responses
            .iter()
            .flat_map(|response| response.least_helpful.iter().map(|w| w.label())),
    )
}

pub fn working_group_distribution(responses: &[SurveyResponse]) -> Vec<Tally> {
    tally(
        responses
            .iter()
            .flat_map(|response| response.future_interest.iter().map(|g| g.label())),
    )
}

/// First five substantial `what_created` answers in submission order.
pub fn success_stories(responses: &[SurveyResponse]) -> Vec<SuccessStory<'_>> {
    responses
        .iter()
        .filter(|response| char_len(&response.what_created) > STORY_MIN_CHARS)
        .take(STORY_LIMIT)
        .enumerate()
        .map(|(index, response)| SuccessStory {
            number: index + 1,
            story: &response.what_created,
        })
        .collect()
}

pub fn champions(responses: &[SurveyResponse]) -> Vec<Champion<'_>> {
    responses
        .iter()
        .filter(|response| {
            char_len(&response.recommend_colleagues) > STORY_MIN_CHARS
                && char_len(&response.what_created) > STORY_MIN_CHARS
        })
        .map(|response| Champion {
            email: &response.work_email,
            built: excerpt(&response.what_created),
            recommends: excerpt(&response.recommend_colleagues),
        })
        .collect()
}

/// First hundred characters followed by `...`.
pub fn excerpt(text: &str) -> String {
    let mut short: String = text.chars().take(EXCERPT_CHARS).collect();
    short.push_str("...");
    short
}

/// Net promoter score: promoters score 9 or 10, detractors 6 or below.
pub fn calculate_nps(scores: &[u8]) -> f64 {
    if scores.is_empty() {
        return 0.0;
    }
    let promoters = scores.iter().filter(|score| **score >= 9).count() as f64;
    let detractors = scores.iter().filter(|score| **score <= 6).count() as f64;
    (promoters - detractors) / scores.len() as f64 * 100.0
}
