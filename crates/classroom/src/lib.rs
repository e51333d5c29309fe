//! Classroom domain: classes, enrollment and topic assignments.

pub mod assignment;
pub mod classroom;

pub use assignment::{Assignment, AssignmentStatus, NewAssignment, Submission};
pub use classroom::{Classroom, JOIN_CODE_ALPHABET, JOIN_CODE_LEN, generate_join_code, normalize_join_code};
