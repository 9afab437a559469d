//! Shared test utilities
//!
//! - `TestDatabase`: PostgreSQL container with migrations applied
//! - `TestDataBuilder`: deterministic task titles and tags
//!
//! ```rust,no_run
//! use test_utils::{TestDatabase, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_postgres_test() {
//!     let db = TestDatabase::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_postgres_test");
//!
//!     let title = builder.name("task", "main");
//!     let tags = builder.tags(2);
//! }
//! ```

mod postgres;

pub use postgres::TestDatabase;

const TAG_POOL: [&str; 8] = [
    "backend", "frontend", "urgent", "docs", "ops", "bug", "feature", "research",
];

/// Builder for test data with deterministic variation
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Seed derived from the test name, so each test gets stable data
    ///
    /// ```
    /// use test_utils::TestDataBuilder;
    ///
    /// let builder = TestDataBuilder::from_test_name("test_list_tasks");
    /// ```
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Unique name such as `test-task-12345-main`
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }

    /// `count` distinct tags drawn from a fixed pool (at most the pool size)
    pub fn tags(&self, count: usize) -> Vec<String> {
        let start = (self.seed % TAG_POOL.len() as u64) as usize;
        (0..count.min(TAG_POOL.len()))
            .map(|i| TAG_POOL[(start + i) % TAG_POOL.len()].to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_builder_deterministic() {
        let builder1 = TestDataBuilder::from_test_name("my_test");
        let builder2 = TestDataBuilder::from_test_name("my_test");

        assert_eq!(builder1.name("task", "a"), builder2.name("task", "a"));
        assert_eq!(builder1.tags(3), builder2.tags(3));
    }

    #[test]
    fn test_tags_are_distinct_and_bounded() {
        let builder = TestDataBuilder::new(7);

        let tags = builder.tags(20);
        assert_eq!(tags.len(), TAG_POOL.len());

        let mut unique = tags.clone();
        unique.sort();
        unique.dedup();
        assert_eq!(unique.len(), tags.len());
    }
}
