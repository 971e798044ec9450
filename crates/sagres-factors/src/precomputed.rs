//! Factors whose values were produced outside this workspace.

use sagres_traits::{Factor, FactorCategory, FactorContext, FactorPanel, Result, SagresError};

/// An externally produced panel exposed through the [`Factor`] capability.
///
/// Used for factor files loaded from disk and for panels computed by upstream
/// systems (fundamentals, sentiment).
#[derive(Debug, Clone)]
pub struct PrecomputedFactor {
    name: String,
    description: String,
    category: FactorCategory,
    panel: FactorPanel,
}

impl PrecomputedFactor {
    /// Wraps `panel` under `name`.
    pub fn new(name: impl Into<String>, panel: FactorPanel) -> Self {
        let name = name.into();
        Self {
            description: format!("Precomputed values of {name}"),
            name,
            category: FactorCategory::External,
            panel,
        }
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the category.
    #[must_use]
    pub const fn with_category(mut self, category: FactorCategory) -> Self {
        self.category = category;
        self
    }

    /// The wrapped panel.
    pub const fn panel(&self) -> &FactorPanel {
        &self.panel
    }
}

impl Factor for PrecomputedFactor {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn category(&self) -> FactorCategory {
        self.category
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, _ctx: &FactorContext<'_>) -> Result<FactorPanel> {
        if self.panel.is_empty() {
            return Err(SagresError::FactorComputation(format!(
                "precomputed factor '{}' has no values",
                self.name
            )));
        }
        Ok(self.panel.clone())
    }
}
