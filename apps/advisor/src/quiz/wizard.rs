use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

use crate::models::quiz::{FormFields, IncompleteQuiz};
use crate::quiz::collector::{collect, CollectedAnswers};
use crate::quiz::navigator::WizardStepState;
use crate::quiz::questions::{QuestionBank, TOTAL_STEPS};
use crate::quiz::WizardError;

/// Navigation request from the client.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum StepAction {
    Next,
    Prev,
    Goto { step: usize },
}

/// Human-readable labels for the non-quiz fields shown on the review step.
const REVIEW_FIELDS: &[(&str, &str)] = &[
    ("full_name", "Name"),
    ("age", "Age"),
    ("gender", "Gender"),
    ("class_grade", "Class"),
    ("location", "Location"),
    ("previous_class_percentage", "Last exam %"),
    ("budget", "Budget"),
    ("max_distance_km", "Max distance (km)"),
    ("needs_hostel", "Needs hostel"),
    ("preferred_medium", "Medium"),
];

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReviewLine {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ReviewSummary {
    pub lines: Vec<ReviewLine>,
    pub unanswered: Vec<String>,
}

/// Serializable snapshot of a wizard for the client.
#[derive(Debug, Clone, Serialize)]
pub struct WizardView {
    pub current_step: usize,
    pub total_steps: usize,
    pub percent_complete: u8,
    pub panels: Vec<bool>,
    pub fields: FormFields,
    pub review: Option<ReviewSummary>,
}

/// All wizard state for one client session.
#[derive(Debug, Clone)]
pub struct WizardContext {
    bank: Arc<QuestionBank>,
    step: WizardStepState,
    fields: FormFields,
    review: Option<ReviewSummary>,
}

impl WizardContext {
    pub fn new(bank: Arc<QuestionBank>) -> Result<Self, WizardError> {
        Ok(Self {
            bank,
            step: WizardStepState::new(TOTAL_STEPS)?,
            fields: FormFields::new(),
            review: None,
        })
    }

    pub fn step(&self) -> &WizardStepState {
        &self.step
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn review(&self) -> Option<&ReviewSummary> {
        self.review.as_ref()
    }

    /// Merges new field values over the existing ones.
    pub fn merge_fields(&mut self, fields: FormFields) {
        self.fields.extend(fields);
    }

    /// Applies a navigation action. Arriving on the last step through next/prev rebuilds
    /// the review summary; a direct goto only moves.
    pub fn navigate(&mut self, action: &StepAction) {
        let arrived_last = match action {
            StepAction::Next => self.step.next(),
            StepAction::Prev => self.step.prev(),
            StepAction::Goto { step } => {
                self.step.go_to_step(*step);
                false
            }
        };
        if arrived_last {
            self.review = Some(self.build_review());
        }
    }

    /// Submission is only allowed from the review step.
    pub fn collect_for_submit(&self) -> Result<CollectedAnswers, WizardError> {
        if !self.step.is_last() {
            return Err(WizardError::NotOnReviewStep);
        }
        collect(&self.bank, &self.fields)
    }

    pub fn to_incomplete(&self) -> IncompleteQuiz {
        IncompleteQuiz {
            current_step: self.step.current_step(),
            fields: self.fields.clone(),
            saved_at: Utc::now(),
        }
    }

    /// Restores a saved wizard. The stored step is clamped like any other navigation.
    pub fn restore(&mut self, saved: IncompleteQuiz) {
        self.fields = saved.fields;
        self.step.go_to_step(saved.current_step);
        self.review = if self.step.is_last() {
            Some(self.build_review())
        } else {
            None
        };
    }

    pub fn view(&self) -> WizardView {
        WizardView {
            current_step: self.step.current_step(),
            total_steps: self.step.total_steps(),
            percent_complete: self.step.percent_complete(),
            panels: self.step.panel_visibility(),
            fields: self.fields.clone(),
            review: self.review.clone(),
        }
    }

    fn build_review(&self) -> ReviewSummary {
        let mut lines: Vec<ReviewLine> = REVIEW_FIELDS
            .iter()
            .filter_map(|(key, label)| {
                let value = self.fields.get(*key)?.trim();
                (!value.is_empty()).then(|| ReviewLine {
                    label: label.to_string(),
                    value: value.to_string(),
                })
            })
            .collect();

        let mut unanswered = Vec::new();
        for question in &self.bank.questions {
            match self.fields.get(&question.id).map(|v| v.trim()) {
                Some(value) if !value.is_empty() => {
                    // invalid options are reported at submit time
                    let shown = question
                        .option(value)
                        .map(|o| o.label.clone())
                        .unwrap_or_else(|| value.to_string());
                    lines.push(ReviewLine {
                        label: question.prompt.clone(),
                        value: shown,
                    });
                }
                _ => unanswered.push(question.id.clone()),
            }
        }

        ReviewSummary {
            lines,
            unanswered,
        }
    }
}

/// Wizards untouched for this long are dropped on the next admission.
pub const WIZARD_IDLE_TTL: Duration = Duration::from_secs(6 * 60 * 60);
/// Upper bound on live wizards. The least recently touched one makes room.
pub const MAX_WIZARDS: usize = 10_000;

struct Slot {
    context: WizardContext,
    touched: Instant,
}

/// In-memory wizards keyed by client session id. A session id the registry has not seen
/// gets a fresh wizard on first use, so clients can keep their id across restarts.
/// Only mutations store a wizard; reading an unknown id shows a fresh one without
/// keeping it.
#[derive(Clone)]
pub struct WizardRegistry {
    bank: Arc<QuestionBank>,
    inner: Arc<RwLock<HashMap<Uuid, Slot>>>,
    idle_ttl: Duration,
    capacity: usize,
}

impl WizardRegistry {
    pub fn new(bank: Arc<QuestionBank>) -> Self {
        Self::with_limits(bank, WIZARD_IDLE_TTL, MAX_WIZARDS)
    }

    pub fn with_limits(bank: Arc<QuestionBank>, idle_ttl: Duration, capacity: usize) -> Self {
        Self {
            bank,
            inner: Arc::new(RwLock::new(HashMap::new())),
            idle_ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn bank(&self) -> &Arc<QuestionBank> {
        &self.bank
    }

    pub async fn create(&self) -> Result<(Uuid, WizardView), WizardError> {
        let context = WizardContext::new(Arc::clone(&self.bank))?;
        let view = context.view();
        let session_id = Uuid::new_v4();
        let mut guard = self.inner.write().await;
        self.admit(&mut guard, session_id, context);
        Ok((session_id, view))
    }

    #[cfg(test)]
    pub async fn contains(&self, session_id: Uuid) -> bool {
        self.inner.read().await.contains_key(&session_id)
    }

    #[cfg(test)]
    pub async fn live_count(&self) -> usize {
        self.inner.read().await.len()
    }

    /// Runs `f` against the session's wizard without storing anything. An unknown id
    /// sees a fresh wizard.
    pub async fn peek<R>(
        &self,
        session_id: Uuid,
        f: impl FnOnce(&WizardContext) -> R,
    ) -> Result<R, WizardError> {
        let guard = self.inner.read().await;
        match guard.get(&session_id) {
            Some(slot) => Ok(f(&slot.context)),
            None => Ok(f(&WizardContext::new(Arc::clone(&self.bank))?)),
        }
    }

    /// Runs `f` against the session's wizard, creating it first if needed.
    pub async fn with<R>(
        &self,
        session_id: Uuid,
        f: impl FnOnce(&mut WizardContext) -> R,
    ) -> Result<R, WizardError> {
        let mut guard = self.inner.write().await;
        if let Some(slot) = guard.get_mut(&session_id) {
            slot.touched = Instant::now();
            return Ok(f(&mut slot.context));
        }

        let mut context = WizardContext::new(Arc::clone(&self.bank))?;
        let out = f(&mut context);
        self.admit(&mut guard, session_id, context);
        Ok(out)
    }

    /// Inserts a wizard after dropping idle ones and, when still full, the least
    /// recently touched.
    fn admit(&self, wizards: &mut HashMap<Uuid, Slot>, session_id: Uuid, context: WizardContext) {
        let now = Instant::now();
        let before = wizards.len();
        wizards.retain(|_, slot| now.duration_since(slot.touched) < self.idle_ttl);

        while wizards.len() >= self.capacity {
            let Some(oldest) = wizards
                .iter()
                .min_by_key(|(_, slot)| slot.touched)
                .map(|(id, _)| *id)
            else {
                break;
            };
            wizards.remove(&oldest);
        }

        let evicted = before - wizards.len();
        if evicted > 0 {
            debug!("Evicted {evicted} idle wizard(s)");
        }
        wizards.insert(
            session_id,
            Slot {
                context,
                touched: now,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> WizardContext {
        WizardContext::new(Arc::new(QuestionBank::default())).unwrap()
    }

    #[test]
    fn test_review_built_on_arrival_at_last_step() {
        let mut wizard = context();
        wizard.merge_fields(FormFields::from([
            ("full_name".to_string(), "Ravi".to_string()),
            ("q_debate".to_string(), "sometimes".to_string()),
        ]));

        wizard.navigate(&StepAction::Next);
        wizard.navigate(&StepAction::Next);
        assert!(wizard.review().is_none());
        wizard.navigate(&StepAction::Next);

        let review = wizard.review().expect("review rebuilt on last step");
        assert!(review
            .lines
            .iter()
            .any(|l| l.label == "Name" && l.value == "Ravi"));
        assert!(review.lines.iter().any(|l| l.value == "Sometimes"));
        assert!(!review.unanswered.contains(&"q_debate".to_string()));
        assert!(review.unanswered.contains(&"q_lab_work".to_string()));
    }

    #[test]
    fn test_goto_last_step_does_not_rebuild_review() {
        let mut wizard = context();
        wizard.navigate(&StepAction::Goto { step: 99 });
        assert_eq!(wizard.step().current_step(), TOTAL_STEPS);
        assert!(wizard.review().is_none());
    }

    #[test]
    fn test_submit_requires_review_step() {
        let wizard = context();
        assert_eq!(
            wizard.collect_for_submit().unwrap_err(),
            WizardError::NotOnReviewStep
        );
    }

    #[test]
    fn test_incomplete_round_trip() {
        let mut wizard = context();
        wizard.merge_fields(FormFields::from([(
            "location".to_string(),
            "Pune".to_string(),
        )]));
        wizard.navigate(&StepAction::Next);
        let saved = wizard.to_incomplete();

        let mut resumed = context();
        resumed.restore(saved);
        assert_eq!(resumed.step().current_step(), 2);
        assert_eq!(resumed.fields().get("location").map(String::as_str), Some("Pune"));
    }

    #[test]
    fn test_restore_clamps_step() {
        let mut wizard = context();
        wizard.restore(IncompleteQuiz {
            current_step: 0,
            fields: FormFields::new(),
            saved_at: Utc::now(),
        });
        assert_eq!(wizard.step().current_step(), 1);
    }

    #[test]
    fn test_step_action_wire_format() {
        let goto: StepAction = serde_json::from_str(r#"{"action":"goto","step":3}"#).unwrap();
        assert_eq!(goto, StepAction::Goto { step: 3 });
        let next: StepAction = serde_json::from_str(r#"{"action":"next"}"#).unwrap();
        assert_eq!(next, StepAction::Next);
    }

    #[tokio::test]
    async fn test_registry_creates_unknown_sessions_lazily() {
        let registry = WizardRegistry::new(Arc::new(QuestionBank::default()));
        let sid = Uuid::new_v4();
        assert!(!registry.contains(sid).await);

        let step = registry
            .with(sid, |w| {
                w.navigate(&StepAction::Next);
                w.step().current_step()
            })
            .await
            .unwrap();
        assert_eq!(step, 2);
        assert!(registry.contains(sid).await);

        let (id, view) = registry.create().await.unwrap();
        assert_eq!(view.current_step, 1);
        assert_ne!(id, sid);
    }

    #[tokio::test]
    async fn test_reading_unknown_sessions_stores_nothing() {
        let registry = WizardRegistry::new(Arc::new(QuestionBank::default()));
        for _ in 0..100 {
            let view = registry.peek(Uuid::new_v4(), |w| w.view()).await.unwrap();
            assert_eq!(view.current_step, 1);
        }
        assert_eq!(registry.live_count().await, 0);
    }

    #[tokio::test]
    async fn test_peek_sees_stored_wizard() {
        let registry = WizardRegistry::new(Arc::new(QuestionBank::default()));
        let sid = Uuid::new_v4();
        registry
            .with(sid, |w| w.navigate(&StepAction::Next))
            .await
            .unwrap();
        let step = registry.peek(sid, |w| w.step().current_step()).await.unwrap();
        assert_eq!(step, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_registry_is_capacity_bounded() {
        let registry = WizardRegistry::with_limits(
            Arc::new(QuestionBank::default()),
            WIZARD_IDLE_TTL,
            3,
        );
        let first = Uuid::new_v4();
        registry.with(first, |_| ()).await.unwrap();
        for _ in 0..10 {
            tokio::time::advance(Duration::from_secs(1)).await;
            registry.with(Uuid::new_v4(), |_| ()).await.unwrap();
        }
        assert_eq!(registry.live_count().await, 3);
        assert!(!registry.contains(first).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_idle_wizards_expire() {
        let registry = WizardRegistry::with_limits(
            Arc::new(QuestionBank::default()),
            Duration::from_secs(60),
            100,
        );
        let idle = Uuid::new_v4();
        let active = Uuid::new_v4();
        registry.with(idle, |_| ()).await.unwrap();
        registry.with(active, |_| ()).await.unwrap();

        tokio::time::advance(Duration::from_secs(45)).await;
        registry.with(active, |_| ()).await.unwrap();
        tokio::time::advance(Duration::from_secs(30)).await;
        registry.with(Uuid::new_v4(), |_| ()).await.unwrap();

        assert!(!registry.contains(idle).await);
        assert!(registry.contains(active).await);
        assert_eq!(registry.live_count().await, 2);
    }
}
