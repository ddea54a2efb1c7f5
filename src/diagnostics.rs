//! Non-fatal findings collected while normalizing arguments and running stages

use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Index of the stage that produced the warning, if any
    pub stage: Option<usize>,
    pub message: String,
}

/// Warning collector. Every entry is also emitted through `tracing::warn!`.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    stage: Option<usize>,
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tag subsequent warnings with a stage index.
    pub fn enter_stage(&mut self, stage: usize) {
        self.stage = Some(stage);
    }

    pub fn leave_stage(&mut self) {
        self.stage = None;
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        match self.stage {
            Some(stage) => warn!(stage, "{}", message),
            None => warn!("{}", message),
        }
        self.entries.push(Diagnostic {
            stage: self.stage,
            message,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warnings_carry_current_stage() {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warn("before");
        diagnostics.enter_stage(2);
        diagnostics.warn("during");
        diagnostics.leave_stage();

        let stages: Vec<_> = diagnostics.entries().iter().map(|d| d.stage).collect();
        assert_eq!(stages, vec![None, Some(2)]);
        assert_eq!(diagnostics.len(), 2);
    }
}
