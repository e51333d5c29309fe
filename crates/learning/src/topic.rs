use serde::{Deserialize, Serialize};

use learnhub_core::{DomainError, DomainResult, Entity, TopicId};

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Beginner,
    Intermediate,
    Advanced,
}

impl core::str::FromStr for Difficulty {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Ok(Self::Beginner),
            "intermediate" => Ok(Self::Intermediate),
            "advanced" => Ok(Self::Advanced),
            _ => Err(DomainError::validation(
                "difficulty must be one of: beginner, intermediate, advanced",
            )),
        }
    }
}

/// A multiple-choice question. `answer` indexes into `options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: u32,
    pub prompt: String,
    pub options: Vec<String>,
    pub answer: usize,
    pub explanation: String,
}

impl QuizQuestion {
    pub fn new(
        id: u32,
        prompt: impl Into<String>,
        options: &[&str],
        answer: usize,
        explanation: impl Into<String>,
    ) -> DomainResult<Self> {
        if options.len() < 2 {
            return Err(DomainError::validation(format!(
                "question {id} needs at least two options"
            )));
        }
        if answer >= options.len() {
            return Err(DomainError::validation(format!(
                "question {id} answer index {answer} is out of range"
            )));
        }
        Ok(Self {
            id,
            prompt: prompt.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
            answer,
            explanation: explanation.into(),
        })
    }

    pub fn correct_option(&self) -> &str {
        &self.options[self.answer]
    }
}

/// A unit of learning content with its quiz.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Topic {
    pub id: TopicId,
    pub title: String,
    pub subject: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub xp_reward: u32,
    pub estimated_minutes: u32,
    pub content: String,
    pub quiz: Vec<QuizQuestion>,
    /// Position in the catalog.
    pub order: u32,
}

impl Entity for Topic {
    type Id = TopicId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Topic {
    pub fn question(&self, id: u32) -> Option<&QuizQuestion> {
        self.quiz.iter().find(|q| q.id == id)
    }

    pub fn summary(&self) -> TopicSummary {
        TopicSummary {
            id: self.id.clone(),
            title: self.title.clone(),
            subject: self.subject.clone(),
            description: self.description.clone(),
            difficulty: self.difficulty,
            xp_reward: self.xp_reward,
            estimated_minutes: self.estimated_minutes,
            question_count: self.quiz.len(),
        }
    }

    pub fn detail(&self) -> TopicDetail {
        TopicDetail {
            summary: self.summary(),
            content: self.content.clone(),
            questions: self
                .quiz
                .iter()
                .map(|q| PublicQuestion {
                    id: q.id,
                    prompt: q.prompt.clone(),
                    options: q.options.clone(),
                })
                .collect(),
        }
    }
}

/// Catalog listing entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicSummary {
    pub id: TopicId,
    pub title: String,
    pub subject: String,
    pub description: String,
    pub difficulty: Difficulty,
    pub xp_reward: u32,
    pub estimated_minutes: u32,
    pub question_count: usize,
}

/// Quiz question as shown to learners: the answer is withheld.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicQuestion {
    pub id: u32,
    pub prompt: String,
    pub options: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicDetail {
    #[serde(flatten)]
    pub summary: TopicSummary,
    pub content: String,
    pub questions: Vec<PublicQuestion>,
}

/// Catalog query. Absent or blank fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TopicFilter {
    pub subject: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub search: Option<String>,
}

impl TopicFilter {
    pub fn matches(&self, topic: &Topic) -> bool {
        if let Some(subject) = non_blank(&self.subject) {
            if !topic.subject.eq_ignore_ascii_case(subject) {
                return false;
            }
        }

        if let Some(difficulty) = self.difficulty {
            if topic.difficulty != difficulty {
                return false;
            }
        }

        if let Some(search) = non_blank(&self.search) {
            let needle = search.to_lowercase();
            let hit = [&topic.title, &topic.description, &topic.subject]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }

        true
    }

    /// Apply the filter and return matches in catalog order.
    pub fn apply<'a>(&self, topics: impl IntoIterator<Item = &'a Topic>) -> Vec<&'a Topic> {
        let mut out: Vec<&Topic> = topics.into_iter().filter(|t| self.matches(t)).collect();
        out.sort_by_key(|t| (t.order, t.id.clone()));
        out
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    pub fn topic(id: &str, subject: &str, difficulty: Difficulty, order: u32) -> Topic {
        Topic {
            id: TopicId::parse(id).unwrap(),
            title: format!("{id} title"),
            subject: subject.to_string(),
            description: format!("All about {id}."),
            difficulty,
            xp_reward: 50,
            estimated_minutes: 15,
            content: "First sentence. Second sentence. Third sentence.".to_string(),
            quiz: vec![
                QuizQuestion::new(1, "One?", &["a", "b", "c"], 0, "Because a.").unwrap(),
                QuizQuestion::new(2, "Two?", &["x", "y"], 1, "Because y.").unwrap(),
            ],
            order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::topic;
    use super::*;

    #[test]
    fn question_invariants_are_enforced() {
        assert!(QuizQuestion::new(1, "?", &["only"], 0, "").is_err());
        assert!(QuizQuestion::new(1, "?", &["a", "b"], 2, "").is_err());
        let q = QuizQuestion::new(1, "?", &["a", "b"], 1, "").unwrap();
        assert_eq!(q.correct_option(), "b");
    }

    #[test]
    fn detail_withholds_answers() {
        let t = topic("fractions", "Mathematics", Difficulty::Beginner, 1);
        let json = serde_json::to_value(t.detail()).unwrap();

        assert_eq!(json["id"], "fractions");
        assert_eq!(json["question_count"], 2);
        assert_eq!(json["questions"][0]["options"][2], "c");
        assert!(json["questions"][0].get("answer").is_none());
        assert!(json["questions"][0].get("explanation").is_none());
    }

    #[test]
    fn difficulty_parses_case_insensitively() {
        assert_eq!("Advanced".parse::<Difficulty>().unwrap(), Difficulty::Advanced);
        assert!("expert".parse::<Difficulty>().is_err());
        assert!(Difficulty::Beginner < Difficulty::Intermediate);
    }

    #[test]
    fn filter_by_subject_difficulty_and_search() {
        let topics = vec![
            topic("cells", "Science", Difficulty::Beginner, 3),
            topic("algebra", "Mathematics", Difficulty::Beginner, 1),
            topic("calculus", "Mathematics", Difficulty::Advanced, 2),
        ];

        let all = TopicFilter::default().apply(&topics);
        assert_eq!(
            all.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(),
            vec!["algebra", "calculus", "cells"]
        );

        let maths = TopicFilter {
            subject: Some("mathematics".to_string()),
            ..Default::default()
        };
        assert_eq!(maths.apply(&topics).len(), 2);

        let hard_maths = TopicFilter {
            subject: Some("Mathematics".to_string()),
            difficulty: Some(Difficulty::Advanced),
            search: None,
        };
        assert_eq!(hard_maths.apply(&topics)[0].id.as_str(), "calculus");

        let search = TopicFilter {
            search: Some("CELLS".to_string()),
            ..Default::default()
        };
        assert_eq!(search.apply(&topics).len(), 1);

        let blank = TopicFilter {
            subject: Some("  ".to_string()),
            search: Some(String::new()),
            difficulty: None,
        };
        assert_eq!(blank.apply(&topics).len(), 3);
    }
}
