use chrono::{DateTime, Utc};
use rand::Rng;
use serde::Serialize;

use learnhub_core::{ClassroomId, DomainError, DomainResult, Entity, UserId};

pub const JOIN_CODE_LEN: usize = 6;

/// Join-code characters: no `I`/`O`/`0`/`1` so codes read unambiguously.
pub const JOIN_CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

const MAX_NAME_LEN: usize = 80;
const DEFAULT_SUBJECT: &str = "General";

/// A class owned by one teacher, with enrolled students.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classroom {
    pub id: ClassroomId,
    pub name: String,
    pub subject: String,
    pub teacher_id: UserId,
    pub join_code: String,
    pub student_ids: Vec<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Entity for Classroom {
    type Id = ClassroomId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

impl Classroom {
    pub fn new(
        name: &str,
        subject: Option<&str>,
        teacher_id: UserId,
        join_code: String,
        now: DateTime<Utc>,
    ) -> DomainResult<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::validation("class name cannot be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(DomainError::validation(format!(
                "class name must be at most {MAX_NAME_LEN} characters"
            )));
        }

        let subject = subject
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SUBJECT);

        Ok(Self {
            id: ClassroomId::new(),
            name: name.to_string(),
            subject: subject.to_string(),
            teacher_id,
            join_code,
            student_ids: Vec::new(),
            created_at: now,
        })
    }

    /// Enroll a student. Returns `false` if they were already enrolled.
    pub fn enroll(&mut self, student: UserId) -> bool {
        if self.student_ids.contains(&student) {
            return false;
        }
        self.student_ids.push(student);
        true
    }

    pub fn remove_student(&mut self, student: UserId) -> DomainResult<()> {
        let before = self.student_ids.len();
        self.student_ids.retain(|s| *s != student);
        if self.student_ids.len() == before {
            return Err(DomainError::not_found("student in class"));
        }
        Ok(())
    }

    pub fn is_teacher(&self, user: UserId) -> bool {
        self.teacher_id == user
    }

    pub fn is_student(&self, user: UserId) -> bool {
        self.student_ids.contains(&user)
    }

    pub fn is_member(&self, user: UserId) -> bool {
        self.is_teacher(user) || self.is_student(user)
    }
}

/// Random join code drawn from [`JOIN_CODE_ALPHABET`].
///
/// Uniqueness among existing classes is the caller's job (retry on collision).
pub fn generate_join_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..JOIN_CODE_LEN)
        .map(|_| JOIN_CODE_ALPHABET[rng.gen_range(0..JOIN_CODE_ALPHABET.len())] as char)
        .collect()
}

/// Codes are typed by humans; compare them trimmed and uppercased.
pub fn normalize_join_code(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn class() -> Classroom {
        Classroom::new("Period 1", None, UserId::new(), "ABC234".to_string(), Utc::now()).unwrap()
    }

    #[test]
    fn new_class_defaults_subject_and_trims_name() {
        let c = Classroom::new("  Biology A ", Some("  "), UserId::new(), "ABC234".into(), Utc::now()).unwrap();
        assert_eq!(c.name, "Biology A");
        assert_eq!(c.subject, "General");
        assert!(c.student_ids.is_empty());
    }

    #[test]
    fn blank_name_is_rejected() {
        let err = Classroom::new(" ", None, UserId::new(), "ABC234".into(), Utc::now()).unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[test]
    fn enroll_is_idempotent() {
        let mut c = class();
        let s = UserId::new();
        assert!(c.enroll(s));
        assert!(!c.enroll(s));
        assert_eq!(c.student_ids, vec![s]);
        assert!(c.is_member(s));
        assert!(c.is_member(c.teacher_id));
        assert!(!c.is_student(c.teacher_id));
    }

    #[test]
    fn removing_unknown_student_is_not_found() {
        let mut c = class();
        let s = UserId::new();
        assert!(matches!(c.remove_student(s), Err(DomainError::NotFound(_))));
        c.enroll(s);
        c.remove_student(s).unwrap();
        assert!(!c.is_member(s));
    }

    #[test]
    fn join_codes_are_normalized() {
        assert_eq!(normalize_join_code(" alg123 "), "ALG123");
    }

    proptest! {
        #[test]
        fn generated_codes_use_the_alphabet(seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            let code = generate_join_code(&mut rng);
            prop_assert_eq!(code.len(), JOIN_CODE_LEN);
            prop_assert!(code.bytes().all(|b| JOIN_CODE_ALPHABET.contains(&b)));
        }
    }
}
