use crate::error::{Result, RuleError};
use crate::rules::builtin_rules;
use crate::runner::run_rule;
use crate::{ComplianceRule, RuleOutput};
use cloudguard_cache::ResultCache;
use std::sync::Arc;

pub struct ScanEngine {
    rules: Vec<Arc<dyn ComplianceRule>>,
    concurrency: usize,
}

impl ScanEngine {
    pub fn new(rules: Vec<Arc<dyn ComplianceRule>>, concurrency: usize) -> Self {
        Self { rules, concurrency }
    }

    /// Engine preloaded with every built-in rule.
    pub fn with_builtin_rules(concurrency: usize) -> Self {
        Self::new(builtin_rules(), concurrency)
    }

    pub fn rules(&self) -> &[Arc<dyn ComplianceRule>] {
        &self.rules
    }

    /// Get a rule by its ID.
    pub fn get_rule(&self, id: &str) -> Option<&dyn ComplianceRule> {
        self.rules.iter().find(|r| r.id() == id).map(|r| r.as_ref())
    }

    /// Keep only rules whose ID matches at least one glob pattern.
    pub fn retain_matching(&mut self, patterns: &[String]) {
        self.rules
            .retain(|r| patterns.iter().any(|p| rule_matches(p, r.id())));
    }

    /// Run a single registered rule.
    ///
    /// # Errors
    ///
    /// Returns [`RuleError::UnknownRule`] if `id` is not registered, or the
    /// rule's own invocation error.
    pub async fn run_rule(
        &self,
        id: &str,
        cache: Arc<dyn ResultCache>,
        regions: &[String],
    ) -> Result<RuleOutput> {
        let rule = self
            .rules
            .iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| RuleError::UnknownRule(id.to_string()))?;
        run_rule(Arc::clone(rule), cache, regions, self.concurrency).await
    }

    /// Run every registered rule in registration order.
    pub async fn run_all(
        &self,
        cache: Arc<dyn ResultCache>,
        regions: &[String],
    ) -> Result<Vec<RuleOutput>> {
        let mut outputs = Vec::with_capacity(self.rules.len());
        for rule in &self.rules {
            outputs.push(run_rule(Arc::clone(rule), Arc::clone(&cache), regions, self.concurrency).await?);
        }
        Ok(outputs)
    }
}

fn rule_matches(pattern: &str, rule_id: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    glob_match::glob_match(pattern, rule_id)
}
