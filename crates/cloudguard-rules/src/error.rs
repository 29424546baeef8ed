/// Errors that abort a rule invocation.
///
/// Per-region fetch problems are never errors; they surface as findings.
/// These variants cover precondition violations only.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// A region task panicked or was cancelled before producing its outcome.
    #[error("Rule: region task for '{rule_id}' in '{region}' did not complete: {source}")]
    RegionTask {
        rule_id: String,
        region: String,
        #[source]
        source: tokio::task::JoinError,
    },

    /// The requested rule id is not registered in the engine.
    #[error("Rule: unknown rule '{0}'")]
    UnknownRule(String),
}

/// Convenience `Result` alias for rule invocations.
pub type Result<T> = std::result::Result<T, RuleError>;
