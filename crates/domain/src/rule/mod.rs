//! Rule — a named condition guarding an ordered list of device actions.
//!
//! Rules are executed on demand; nothing in the domain schedules them. A
//! rule's [`Condition`] is evaluated against an [`EvaluationContext`] and,
//! when it holds, the [`Action`]s are applied in list order.

mod action;
mod condition;

pub use action::{Action, Command};
pub use condition::{Condition, DevicePredicate, EvaluationContext};

use serde::{Deserialize, Serialize};

use crate::error::{HomeError, ValidationError};
use crate::id::{DeviceId, RuleId};

/// Priority assigned when a rule does not specify one.
pub const DEFAULT_PRIORITY: u8 = 5;

/// A contextual automation rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    pub id: RuleId,
    pub name: String,
    /// Lower values sort first when listing.
    pub priority: u8,
    pub enabled: bool,
    pub condition: Condition,
    pub actions: Vec<Action>,
}

impl Rule {
    /// Create a builder for constructing a [`Rule`].
    #[must_use]
    pub fn builder() -> RuleBuilder {
        RuleBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] when:
    /// - `id` is empty ([`ValidationError::EmptyId`])
    /// - `name` is empty ([`ValidationError::EmptyName`])
    /// - `actions` is empty ([`ValidationError::NoActions`])
    pub fn validate(&self) -> Result<(), HomeError> {
        if self.id.is_empty() {
            return Err(ValidationError::EmptyId.into());
        }
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        if self.actions.is_empty() {
            return Err(ValidationError::NoActions.into());
        }
        Ok(())
    }

    /// Whether any action or condition of this rule targets `device_id`.
    #[must_use]
    pub fn references_device(&self, device_id: &DeviceId) -> bool {
        self.actions.iter().any(|a| &a.device_id == device_id)
            || self.condition.device_ids().contains(&device_id)
    }
}

/// Step-by-step builder for [`Rule`].
#[derive(Debug, Default)]
pub struct RuleBuilder {
    id: Option<RuleId>,
    name: Option<String>,
    priority: Option<u8>,
    enabled: Option<bool>,
    condition: Option<Condition>,
    actions: Vec<Action>,
}

impl RuleBuilder {
    #[must_use]
    pub fn id(mut self, id: impl Into<RuleId>) -> Self {
        self.id = Some(id.into());
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    #[must_use]
    pub fn condition(mut self, condition: Condition) -> Self {
        self.condition = Some(condition);
        self
    }

    #[must_use]
    pub fn action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }

    /// Consume the builder, validate, and return a [`Rule`].
    ///
    /// Unset fields default to: enabled, [`DEFAULT_PRIORITY`], and a
    /// condition that always holds.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] if required fields are missing or empty.
    pub fn build(self) -> Result<Rule, HomeError> {
        let rule = Rule {
            id: self.id.unwrap_or_else(|| RuleId::new("")),
            name: self.name.unwrap_or_default(),
            priority: self.priority.unwrap_or(DEFAULT_PRIORITY),
            enabled: self.enabled.unwrap_or(true),
            condition: self.condition.unwrap_or_else(Condition::always),
            actions: self.actions,
        };
        rule.validate()?;
        Ok(rule)
    }
}
