use super::errors::ScanError;
use super::models::{StageOutcome, Target};
use super::scheduler::Pipeline;
use std::collections::BTreeMap;

/// Stage name to that stage's latest outcome.
pub type SessionResults = BTreeMap<String, StageOutcome>;

/// Explicit per-session state: current target, user agent and accumulated results.
#[derive(Debug, Default, Clone)]
pub struct SessionContext {
    target: Option<Target>,
    user_agent: Option<String>,
    results: SessionResults,
}

impl SessionContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_target(&mut self, raw: &str) -> Result<&Target, ScanError> {
        let target = Target::parse(raw)?;
        Ok(self.target.insert(target))
    }

    pub fn target(&self) -> Option<&Target> {
        self.target.as_ref()
    }

    pub fn set_user_agent(&mut self, user_agent: Option<String>) {
        self.user_agent = user_agent.filter(|ua| !ua.trim().is_empty());
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    pub fn results(&self) -> &SessionResults {
        &self.results
    }

    /// Fold a run's delta in; a stage re-run replaces its previous entry.
    pub fn merge(&mut self, delta: &SessionResults) {
        self.results
            .extend(delta.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    pub fn replace_results(&mut self, results: SessionResults) {
        self.results = results;
    }

    pub fn clear(&mut self) {
        self.results.clear();
    }

    /// Run `category` against the current target and merge the delta.
    pub async fn run(&mut self, pipeline: &Pipeline, category: &str) -> Result<SessionResults, ScanError> {
        let target = self
            .target
            .clone()
            .ok_or(ScanError::NoTarget)?;

        let delta = pipeline
            .run_category(category, &target, self.user_agent())
            .await?;
        self.merge(&delta);
        Ok(delta)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{StageKind, Subdomain};

    #[test]
    fn test_merge_grows_and_overwrites() {
        let mut session = SessionContext::new();
        let mut first = SessionResults::new();
        first.insert("subfinder".into(), StageOutcome::empty(StageKind::Subfinder));
        first.insert("httpx".into(), StageOutcome::Failed { error: "x".into() });
        session.merge(&first);

        let mut second = SessionResults::new();
        second.insert(
            "subfinder".into(),
            StageOutcome::Subdomains {
                records: vec![Subdomain { domain: "a.example.com".into() }],
            },
        );
        session.merge(&second);

        assert_eq!(session.results().len(), 2);
        assert_eq!(session.results()["subfinder"].item_count(), 1);
        assert!(session.results()["httpx"].is_failed());

        session.clear();
        assert!(session.results().is_empty());
    }

    #[test]
    fn test_target_and_user_agent() {
        let mut session = SessionContext::new();
        assert!(session.set_target("").is_err());
        assert!(session.target().is_none());

        session.set_target("example.com").unwrap();
        assert_eq!(session.target().unwrap().url, "https://example.com");

        session.set_user_agent(Some("  ".into()));
        assert_eq!(session.user_agent(), None);
        session.set_user_agent(Some("Mozilla/5.0".into()));
        assert_eq!(session.user_agent(), Some("Mozilla/5.0"));
    }
}
