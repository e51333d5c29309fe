use std::sync::Arc;

use learnhub_auth::User;
use learnhub_classroom::{Assignment, Classroom};
use learnhub_learning::{Progress, Topic};

use crate::store::InMemoryStore;

/// All application state. Cheap to clone; clones share the same stores.
#[derive(Debug, Clone, Default)]
pub struct Repositories {
    pub users: Arc<InMemoryStore<User>>,
    pub topics: Arc<InMemoryStore<Topic>>,
    pub progress: Arc<InMemoryStore<Progress>>,
    pub classrooms: Arc<InMemoryStore<Classroom>>,
    pub assignments: Arc<InMemoryStore<Assignment>>,
}

impl Repositories {
    pub fn new() -> Self {
        Self::default()
    }
}
