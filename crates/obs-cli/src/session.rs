//! Per-operator interaction state.

use obs_model::FilterCriteria;

/// What one operator has selected.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionContext {
    user: Option<String>,
    criteria: FilterCriteria,
    drill_down: Option<String>,
}

impl SessionContext {
    pub fn new(user: Option<String>) -> Self {
        Self {
            user,
            ..Self::default()
        }
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref()
    }

    pub fn criteria(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
    }

    /// Selected procedure for the professional drill-down.
    pub fn drill_down(&self) -> Option<&str> {
        self.drill_down.as_deref()
    }

    pub fn select_procedure(&mut self, procedure: impl Into<String>) {
        self.drill_down = Some(procedure.into());
    }

    pub fn clear_drill_down(&mut self) {
        self.drill_down = None;
    }
}
