use infludb_core::{Category, Platform};

/// Final state of one account after a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountOutcome {
    pub link: String,
    pub platform: Platform,
    pub followers: u64,
    pub category: Category,
    /// Why extraction failed, for logs and the CLI. Never persisted.
    pub error: Option<String>,
}

/// Per-account outcomes of one batch, with tallies.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<AccountOutcome>,
    pub succeeded: usize,
    pub failed: usize,
    pub failed_platform: usize,
}

impl BatchReport {
    pub(crate) fn record(&mut self, outcome: AccountOutcome) {
        match outcome.category {
            Category::Failed => self.failed += 1,
            Category::FailedPlatform => self.failed_platform += 1,
            Category::Micro | Category::Macro => self.succeeded += 1,
            Category::Pending => {}
        }
        self.outcomes.push(outcome);
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn outcome(&self, link: &str) -> Option<&AccountOutcome> {
        self.outcomes.iter().find(|o| o.link == link)
    }
}

/// What an import did.
#[derive(Debug, Clone, Default)]
pub struct ImportSummary {
    /// Rows staged on a supported platform and sent through a batch.
    pub queued: usize,
    /// Rows stored as `failed_platform` without extraction.
    pub unsupported: usize,
    /// Rows missing a name or link; nothing was stored for them.
    pub dropped: usize,
    pub report: BatchReport,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(link: &str, category: Category) -> AccountOutcome {
        AccountOutcome {
            link: link.to_string(),
            platform: Platform::Twitter,
            followers: 0,
            category,
            error: None,
        }
    }

    #[test]
    fn record_tallies_by_category() {
        let mut report = BatchReport::default();
        report.record(outcome("a", Category::Micro));
        report.record(outcome("b", Category::Macro));
        report.record(outcome("c", Category::Failed));
        report.record(outcome("d", Category::FailedPlatform));

        assert_eq!(report.succeeded, 2);
        assert_eq!(report.failed, 1);
        assert_eq!(report.failed_platform, 1);
        assert_eq!(report.total(), 4);
        assert_eq!(report.outcome("c").unwrap().category, Category::Failed);
    }
}
