//! Rule engine — stores contextual rules and runs them on demand.
//!
//! Running a rule takes a snapshot of devices and occupancy, evaluates the
//! rule's condition against it and, if it holds, applies every action in
//! order through the [`DeviceRegistry`]. A failing action is recorded in the
//! report and the remaining actions still run.

use std::collections::{BTreeMap, VecDeque};

use homesim_domain::error::HomeError;
use homesim_domain::id::{DeviceId, RuleId};
use homesim_domain::report::{ActionOutcome, ExecutionReport};
use homesim_domain::rule::{EvaluationContext, Rule};
use homesim_domain::time::Timestamp;

use crate::occupancy::OccupancyTracker;
use crate::registry::DeviceRegistry;

/// Number of execution reports kept when no capacity is configured.
pub const DEFAULT_HISTORY_CAPACITY: usize = 10;

/// On-demand contextual rule engine.
#[derive(Debug, Clone)]
pub struct RuleEngine {
    rules: BTreeMap<RuleId, Rule>,
    history: VecDeque<ExecutionReport>,
    history_capacity: usize,
}

impl Default for RuleEngine {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl RuleEngine {
    /// Create an engine that keeps the last `history_capacity` reports.
    #[must_use]
    pub fn new(history_capacity: usize) -> Self {
        Self {
            rules: BTreeMap::new(),
            history: VecDeque::with_capacity(history_capacity),
            history_capacity,
        }
    }

    /// Register a rule after validating domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::Validation`] if invariants fail, or
    /// [`HomeError::DuplicateRuleId`] if a rule with the same id exists.
    #[tracing::instrument(skip(self, rule), fields(rule_id = %rule.id))]
    pub fn register_rule(&mut self, rule: Rule) -> Result<(), HomeError> {
        rule.validate()?;
        if self.rules.contains_key(&rule.id) {
            return Err(HomeError::DuplicateRuleId(rule.id));
        }
        tracing::debug!(condition = %rule.condition, actions = rule.actions.len(), "rule registered");
        self.rules.insert(rule.id.clone(), rule);
        Ok(())
    }

    /// Look up a rule by id.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::RuleNotFound`] when no rule has `id`.
    pub fn get(&self, id: &RuleId) -> Result<&Rule, HomeError> {
        self.rules
            .get(id)
            .ok_or_else(|| HomeError::RuleNotFound(id.clone()))
    }

    /// All rules ordered by priority, then id.
    #[must_use]
    pub fn list(&self) -> Vec<&Rule> {
        let mut rules: Vec<_> = self.rules.values().collect();
        rules.sort_by(|a, b| a.priority.cmp(&b.priority).then_with(|| a.id.cmp(&b.id)));
        rules
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Enable or disable a rule.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::RuleNotFound`] when no rule has `id`.
    #[tracing::instrument(skip(self))]
    pub fn set_enabled(&mut self, id: &RuleId, enabled: bool) -> Result<(), HomeError> {
        let rule = self
            .rules
            .get_mut(id)
            .ok_or_else(|| HomeError::RuleNotFound(id.clone()))?;
        rule.enabled = enabled;
        Ok(())
    }

    /// Ids of the rules whose condition or actions mention `device_id`.
    #[must_use]
    pub fn rules_referencing(&self, device_id: &DeviceId) -> Vec<RuleId> {
        self.rules
            .values()
            .filter(|r| r.references_device(device_id))
            .map(|r| r.id.clone())
            .collect()
    }

    /// Evaluate a rule's condition. Pure: no state is read beyond `ctx` and
    /// nothing is mutated.
    #[must_use]
    pub fn evaluate_condition(rule: &Rule, ctx: &EvaluationContext<'_>) -> bool {
        rule.condition.evaluate(ctx)
    }

    /// Run a rule at `now`.
    ///
    /// A rule whose condition does not hold produces a `skipped` report. A
    /// rule whose actions partly fail produces a `partial` report; individual
    /// action failures never abort the run. Every report is kept in the
    /// bounded history.
    ///
    /// # Errors
    ///
    /// Returns [`HomeError::RuleNotFound`] for an unknown id and
    /// [`HomeError::RuleDisabled`] for a disabled rule; no device is touched
    /// in either case.
    #[tracing::instrument(skip(self, registry, occupancy), fields(rule_id = %rule_id))]
    pub fn execute_rule(
        &mut self,
        rule_id: &RuleId,
        now: Timestamp,
        registry: &mut DeviceRegistry,
        occupancy: &OccupancyTracker,
    ) -> Result<ExecutionReport, HomeError> {
        let rule = self.get(rule_id)?;
        if !rule.enabled {
            tracing::debug!("rule is disabled");
            return Err(HomeError::RuleDisabled(rule_id.clone()));
        }

        let devices = registry.snapshot();
        let rooms = occupancy.snapshot();
        let ctx = EvaluationContext {
            now,
            occupancy: &rooms,
            devices: &devices,
        };

        let report = if Self::evaluate_condition(rule, &ctx) {
            let outcomes = rule
                .actions
                .iter()
                .map(|action| {
                    let error = registry.apply(action, now).err();
                    if let Some(err) = &error {
                        tracing::warn!(action = %action, error = %err, "action failed");
                    }
                    ActionOutcome {
                        action: action.clone(),
                        error,
                    }
                })
                .collect();
            ExecutionReport::applied(rule.id.clone(), rule.name.clone(), now, outcomes)
        } else {
            ExecutionReport::skipped(rule.id.clone(), rule.name.clone(), now)
        };

        tracing::info!(
            status = %report.status,
            applied = report.applied_count(),
            attempted = report.outcomes.len(),
            "rule executed"
        );
        self.record(report.clone());
        Ok(report)
    }

    /// The most recent reports, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &ExecutionReport> {
        self.history.iter()
    }

    fn record(&mut self, report: ExecutionReport) {
        if self.history_capacity == 0 {
            return;
        }
        while self.history.len() >= self.history_capacity {
            self.history.pop_front();
        }
        self.history.push_back(report);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use homesim_domain::device::{Device, DeviceCategory, PowerState};
    use homesim_domain::error::{InvalidDeviceError, ValidationError};
    use homesim_domain::report::ExecutionStatus;
    use homesim_domain::rule::{Action, Condition};

    // ── Helpers ────────────────────────────────────────────────────

    fn at(h: u32, m: u32) -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn registry() -> DeviceRegistry {
        let mut registry = DeviceRegistry::new();
        for (id, category) in [
            ("hall_light", DeviceCategory::Light),
            ("hall_lock", DeviceCategory::Lock),
            ("hall_camera", DeviceCategory::Camera),
        ] {
            registry
                .add(
                    Device::builder()
                        .id(id)
                        .name(id)
                        .category(category)
                        .room("hall")
                        .build()
                        .unwrap(),
                )
                .unwrap();
        }
        registry
    }

    fn occupied() -> OccupancyTracker {
        let mut tracker = OccupancyTracker::with_rooms(["hall"]);
        tracker.set_occupancy("hall", true);
        tracker
    }

    fn rule(id: &str, condition: Condition, actions: Vec<Action>) -> Rule {
        actions
            .into_iter()
            .fold(
                Rule::builder().id(id).name(id).condition(condition),
                homesim_domain::rule::RuleBuilder::action,
            )
            .build()
            .unwrap()
    }

    fn engine_with(rules: Vec<Rule>) -> RuleEngine {
        let mut engine = RuleEngine::default();
        for r in rules {
            engine.register_rule(r).unwrap();
        }
        engine
    }

    fn rid(s: &str) -> RuleId {
        RuleId::new(s)
    }

    // ── Tests ──────────────────────────────────────────────────────

    #[test]
    fn should_reject_duplicate_rule_id() {
        let r = rule("arrive", Condition::always(), vec![Action::unlock("hall_lock")]);
        let mut engine = engine_with(vec![r.clone()]);
        let result = engine.register_rule(r);
        assert!(matches!(result, Err(HomeError::DuplicateRuleId(id)) if id == rid("arrive")));
        assert_eq!(engine.len(), 1);
    }

    #[test]
    fn should_reject_invalid_rule_on_register() {
        let mut engine = RuleEngine::default();
        let mut r = rule("x", Condition::always(), vec![Action::unlock("hall_lock")]);
        r.actions.clear();
        assert!(matches!(
            engine.register_rule(r),
            Err(HomeError::Validation(ValidationError::NoActions))
        ));
    }

    #[test]
    fn should_return_rule_not_found_for_unknown_id() {
        let mut engine = RuleEngine::default();
        let mut registry = registry();
        let result = engine.execute_rule(&rid("nope"), at(12, 0), &mut registry, &occupied());
        assert!(matches!(result, Err(HomeError::RuleNotFound(_))));
    }

    #[test]
    fn should_not_touch_devices_when_rule_disabled() {
        let mut r = rule(
            "lights",
            Condition::always(),
            vec![Action::turn_on_light("hall_light", Some(50))],
        );
        r.enabled = false;
        let mut engine = engine_with(vec![r]);
        let mut registry = registry();
        let before = registry.snapshot();

        let result = engine.execute_rule(&rid("lights"), at(12, 0), &mut registry, &occupied());

        assert!(matches!(result, Err(HomeError::RuleDisabled(_))));
        assert_eq!(registry.snapshot(), before);
        assert_eq!(engine.history().count(), 0);
    }

    #[test]
    fn should_skip_when_condition_fails() {
        let r = rule(
            "morning",
            Condition::time_range("06:00", "09:00").unwrap(),
            vec![Action::turn_on_light("hall_light", None)],
        );
        let mut engine = engine_with(vec![r]);
        let mut registry = registry();

        let report = engine
            .execute_rule(&rid("morning"), at(15, 0), &mut registry, &occupied())
            .unwrap();

        assert_eq!(report.status, ExecutionStatus::Skipped);
        assert!(!registry.get(&DeviceId::new("hall_light")).unwrap().is_on());
    }

    #[test]
    fn should_complete_when_all_actions_apply() {
        let r = rule(
            "arrive",
            Condition::home_occupied(true),
            vec![
                Action::unlock("hall_lock"),
                Action::turn_on_light("hall_light", Some(80)),
            ],
        );
        let mut engine = engine_with(vec![r]);
        let mut registry = registry();

        let report = engine
            .execute_rule(&rid("arrive"), at(18, 0), &mut registry, &occupied())
            .unwrap();

        assert_eq!(report.status, ExecutionStatus::Completed);
        assert_eq!(report.outcomes.len(), 2);
        let light = registry.get(&DeviceId::new("hall_light")).unwrap();
        assert_eq!(light.brightness(), Some(80));
        assert_eq!(light.last_updated, Some(at(18, 0)));
        assert_eq!(
            registry.get(&DeviceId::new("hall_lock")).unwrap().is_locked(),
            Some(false)
        );
    }

    #[test]
    fn should_apply_remaining_actions_when_one_fails() {
        let r = rule(
            "secure",
            Condition::always(),
            vec![
                Action::lock("hall_lock"),
                Action::lock("garage_lock"),
                Action::arm_camera("hall_camera"),
            ],
        );
        let mut engine = engine_with(vec![r]);
        let mut registry = registry();
        registry.control_lock(&DeviceId::new("hall_lock"), false).unwrap();

        let report = engine
            .execute_rule(&rid("secure"), at(2, 0), &mut registry, &occupied())
            .unwrap();

        assert_eq!(report.status, ExecutionStatus::Partial);
        assert_eq!(report.applied_count(), 2);
        assert!(matches!(
            report.outcomes[1].error,
            Some(HomeError::InvalidDevice(InvalidDeviceError::NotFound(_)))
        ));
        assert_eq!(
            registry.get(&DeviceId::new("hall_lock")).unwrap().is_locked(),
            Some(true)
        );
        assert!(registry.get(&DeviceId::new("hall_camera")).unwrap().is_camera_active());
    }

    #[test]
    fn should_record_wrong_category_as_failed_action() {
        let r = rule("bad", Condition::always(), vec![Action::lock("hall_light")]);
        let mut engine = engine_with(vec![r]);
        let mut registry = registry();

        let report = engine
            .execute_rule(&rid("bad"), at(2, 0), &mut registry, &occupied())
            .unwrap();

        assert_eq!(report.status, ExecutionStatus::Partial);
        assert_eq!(report.applied_count(), 0);
    }

    #[test]
    fn should_evaluate_against_snapshot_taken_before_actions() {
        let r = rule(
            "once",
            Condition::device_power("hall_light", PowerState::Off),
            vec![
                Action::turn_on_light("hall_light", None),
                Action::arm_camera("hall_camera"),
            ],
        );
        let mut engine = engine_with(vec![r]);
        let mut registry = registry();

        let report = engine
            .execute_rule(&rid("once"), at(20, 0), &mut registry, &occupied())
            .unwrap();

        assert_eq!(report.status, ExecutionStatus::Completed);
        assert_eq!(report.outcomes.len(), 2);
    }

    #[test]
    fn should_evaluate_condition_purely() {
        let r = rule(
            "night",
            Condition::and(vec![
                Condition::time_range("22:00", "05:00").unwrap(),
                Condition::home_occupied(true),
            ]),
            vec![Action::lock("hall_lock")],
        );
        let registry = registry();
        let devices = registry.snapshot();
        let rooms = occupied().snapshot();
        let ctx = EvaluationContext {
            now: at(23, 0),
            occupancy: &rooms,
            devices: &devices,
        };
        let first = RuleEngine::evaluate_condition(&r, &ctx);
        let second = RuleEngine::evaluate_condition(&r, &ctx);
        assert!(first);
        assert_eq!(first, second);
        assert_eq!(registry.snapshot(), devices);
    }

    #[test]
    fn should_toggle_enabled_flag() {
        let r = rule("x", Condition::always(), vec![Action::lock("hall_lock")]);
        let mut engine = engine_with(vec![r]);
        engine.set_enabled(&rid("x"), false).unwrap();
        assert!(!engine.get(&rid("x")).unwrap().enabled);
        assert!(matches!(
            engine.set_enabled(&rid("y"), true),
            Err(HomeError::RuleNotFound(_))
        ));
    }

    #[test]
    fn should_list_rules_by_priority_then_id() {
        let mut high = rule("zeta", Condition::always(), vec![Action::lock("hall_lock")]);
        high.priority = 1;
        let low = rule("alpha", Condition::always(), vec![Action::lock("hall_lock")]);
        let mid = rule("beta", Condition::always(), vec![Action::lock("hall_lock")]);
        let engine = engine_with(vec![low, high, mid]);
        let ids: Vec<_> = engine.list().into_iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["zeta", "alpha", "beta"]);
    }

    #[test]
    fn should_find_rules_referencing_device() {
        let engine = engine_with(vec![
            rule("a", Condition::always(), vec![Action::lock("hall_lock")]),
            rule("b", Condition::always(), vec![Action::arm_camera("hall_camera")]),
        ]);
        assert_eq!(engine.rules_referencing(&DeviceId::new("hall_lock")), vec![rid("a")]);
        assert!(engine.rules_referencing(&DeviceId::new("hall_light")).is_empty());
    }

    #[test]
    fn should_bound_history_to_capacity() {
        let mut engine = RuleEngine::new(2);
        engine
            .register_rule(rule("x", Condition::always(), vec![Action::lock("hall_lock")]))
            .unwrap();
        let mut registry = registry();
        for hour in 1..=3 {
            engine
                .execute_rule(&rid("x"), at(hour, 0), &mut registry, &occupied())
                .unwrap();
        }
        let times: Vec<_> = engine.history().map(|r| r.executed_at).collect();
        assert_eq!(times, vec![at(2, 0), at(3, 0)]);
    }

    #[test]
    fn should_keep_no_history_when_capacity_is_zero() {
        let mut engine = RuleEngine::new(0);
        engine
            .register_rule(rule("x", Condition::always(), vec![Action::lock("hall_lock")]))
            .unwrap();
        let mut registry = registry();
        engine
            .execute_rule(&rid("x"), at(1, 0), &mut registry, &occupied())
            .unwrap();
        assert_eq!(engine.history().count(), 0);
    }
}
