//! Topic-bound tutor jobs: explain, hint and quiz drafting.

use serde_json::json;

use learnhub_learning::Topic;

use crate::job::AiJob;
use crate::result::{AiError, AiResult};

const MASK: &str = "____";

/// Explain a topic, optionally framed around a learner's question.
#[derive(Debug, Clone)]
pub struct ExplainTopicJob {
    topic: Topic,
    question: Option<String>,
}

impl ExplainTopicJob {
    pub fn new(topic: Topic, question: Option<String>) -> Self {
        let question = question.map(|q| q.trim().to_string()).filter(|q| !q.is_empty());
        Self { topic, question }
    }
}

impl AiJob for ExplainTopicJob {
    fn kind(&self) -> &'static str {
        "tutor.explain"
    }

    fn run(&self) -> Result<AiResult, AiError> {
        let t = &self.topic;
        let mut text = format!("{}: {}", t.title, t.description);

        let intro = first_sentences(&t.content, 2);
        if !intro.is_empty() {
            text.push(' ');
            text.push_str(&intro);
        }

        if let Some(q) = &self.question {
            text.push_str(&format!(
                " You asked: \"{q}\". Start from the key idea above, then try the {}-question quiz to check your understanding.",
                t.quiz.len()
            ));
        }

        Ok(AiResult::mock(self.kind(), 1.0, 0.9)
            .with_explanation(text)
            .with_field("topic_id", t.id.as_str())
            .with_field("question", self.question.clone())
            .with_field("difficulty", json!(t.difficulty)))
    }
}

/// Nudge a learner toward a quiz answer without revealing it.
#[derive(Debug, Clone)]
pub struct HintJob {
    topic: Topic,
    question_id: u32,
}

impl HintJob {
    pub fn new(topic: Topic, question_id: u32) -> Self {
        Self { topic, question_id }
    }
}

impl AiJob for HintJob {
    fn kind(&self) -> &'static str {
        "tutor.hint"
    }

    fn run(&self) -> Result<AiResult, AiError> {
        let q = self.topic.question(self.question_id).ok_or_else(|| {
            AiError::InvalidInput(format!(
                "topic {} has no question {}",
                self.topic.id, self.question_id
            ))
        })?;

        let masked = mask(&q.explanation, q.correct_option());
        let ruled_out = q.options.len().saturating_sub(2);

        let mut text = format!("Hint: {masked}");
        if ruled_out > 0 {
            text.push_str(&format!(
                " You should be able to rule out {ruled_out} of the {} options.",
                q.options.len()
            ));
        }

        Ok(AiResult::mock(self.kind(), ruled_out as f64, 0.8)
            .with_explanation(text)
            .with_field("topic_id", self.topic.id.as_str())
            .with_field("question_id", q.id))
    }
}

/// Draft a quiz for teachers from the topic's question bank (answers included).
#[derive(Debug, Clone)]
pub struct GenerateQuizJob {
    topic: Topic,
    count: Option<usize>,
}

impl GenerateQuizJob {
    pub fn new(topic: Topic, count: Option<usize>) -> Self {
        Self { topic, count }
    }
}

impl AiJob for GenerateQuizJob {
    fn kind(&self) -> &'static str {
        "tutor.generate_quiz"
    }

    fn run(&self) -> Result<AiResult, AiError> {
        let bank = &self.topic.quiz;
        if bank.is_empty() {
            return Err(AiError::InvalidInput(format!(
                "topic {} has no questions to draw from",
                self.topic.id
            )));
        }

        let count = self.count.unwrap_or(bank.len()).clamp(1, bank.len());
        let questions = &bank[..count];

        Ok(AiResult::mock(self.kind(), count as f64, 0.75)
            .with_explanation(format!(
                "Drafted {count} question(s) for \"{}\" from the topic bank.",
                self.topic.title
            ))
            .with_field("topic_id", self.topic.id.as_str())
            .with_field("questions", json!(questions)))
    }
}

/// The first `n` sentences of `text` (terminated by `.`, `!` or `?`).
fn first_sentences(text: &str, n: usize) -> String {
    let mut end = 0;
    let mut found = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if matches!(c, '.' | '!' | '?') {
            let at_boundary = chars.peek().is_none_or(|(_, next)| next.is_whitespace());
            if at_boundary {
                end = i + c.len_utf8();
                found += 1;
                if found == n {
                    break;
                }
            }
        }
    }

    if found == 0 {
        return text.trim().to_string();
    }
    text[..end].trim().to_string()
}

fn mask(text: &str, secret: &str) -> String {
    let secret = secret.trim();
    if secret.is_empty() {
        return text.to_string();
    }

    let lower_text = text.to_lowercase();
    let lower_secret = secret.to_lowercase();
    // Lowercasing can change byte lengths outside ASCII; only do the
    // case-insensitive pass when offsets line up.
    if lower_text.len() != text.len() || lower_secret.len() != secret.len() {
        return text.replace(secret, MASK);
    }

    let mut out = String::with_capacity(text.len());
    let mut cursor = 0;
    while let Some(pos) = lower_text[cursor..].find(&lower_secret) {
        let start = cursor + pos;
        out.push_str(&text[cursor..start]);
        out.push_str(MASK);
        cursor = start + secret.len();
    }
    out.push_str(&text[cursor..]);
    out
}
