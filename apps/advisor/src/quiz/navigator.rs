use serde::Serialize;

use crate::quiz::WizardError;

/// Current position in the wizard. Always satisfies `1 <= current_step <= total_steps`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WizardStepState {
    current_step: usize,
    total_steps: usize,
}

impl WizardStepState {
    pub fn new(total_steps: usize) -> Result<Self, WizardError> {
        if total_steps == 0 {
            return Err(WizardError::NoSteps);
        }
        Ok(Self {
            current_step: 1,
            total_steps,
        })
    }

    pub fn current_step(&self) -> usize {
        self.current_step
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn is_last(&self) -> bool {
        self.current_step == self.total_steps
    }

    /// Clamps `step` into range and makes it current. Earlier steps are not validated.
    pub fn go_to_step(&mut self, step: usize) {
        self.current_step = step.clamp(1, self.total_steps);
    }

    /// Moves forward one step. Returns true when the move lands on the last step.
    pub fn next(&mut self) -> bool {
        self.go_to_step(self.current_step.saturating_add(1));
        self.is_last()
    }

    /// Moves back one step. Returns true when the move lands on the last step.
    pub fn prev(&mut self) -> bool {
        self.go_to_step(self.current_step.saturating_sub(1));
        self.is_last()
    }

    /// `round((current - 1) / (total - 1) * 100)`. A single-step wizard is always 100%.
    pub fn percent_complete(&self) -> u8 {
        if self.total_steps <= 1 {
            return 100;
        }
        let done = (self.current_step - 1) as f64 / (self.total_steps - 1) as f64;
        (done * 100.0).round() as u8
    }

    /// One flag per panel, true only for the current step.
    pub fn panel_visibility(&self) -> Vec<bool> {
        (1..=self.total_steps)
            .map(|step| step == self.current_step)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_steps_rejected() {
        assert_eq!(WizardStepState::new(0), Err(WizardError::NoSteps));
    }

    #[test]
    fn test_go_to_step_clamps_low() {
        let mut a = WizardStepState::new(4).unwrap();
        let mut b = WizardStepState::new(4).unwrap();
        a.go_to_step(0);
        b.go_to_step(1);
        assert_eq!(a, b);
        assert_eq!(a.current_step(), 1);
    }

    #[test]
    fn test_go_to_step_clamps_high() {
        let mut a = WizardStepState::new(4).unwrap();
        let mut b = WizardStepState::new(4).unwrap();
        a.go_to_step(4 + 5);
        b.go_to_step(4);
        assert_eq!(a, b);
    }

    #[test]
    fn test_percent_complete_four_steps() {
        let mut state = WizardStepState::new(4).unwrap();
        assert_eq!(state.percent_complete(), 0);
        state.go_to_step(2);
        assert_eq!(state.percent_complete(), 33);
        state.go_to_step(3);
        assert_eq!(state.percent_complete(), 67);
        state.go_to_step(4);
        assert_eq!(state.percent_complete(), 100);
    }

    #[test]
    fn test_single_step_wizard_is_complete() {
        let state = WizardStepState::new(1).unwrap();
        assert_eq!(state.percent_complete(), 100);
        assert!(state.is_last());
    }

    #[test]
    fn test_next_and_prev_stay_in_bounds() {
        let mut state = WizardStepState::new(3).unwrap();
        assert!(!state.prev());
        assert_eq!(state.current_step(), 1);
        assert!(!state.next());
        assert!(state.next());
        assert!(state.next());
        assert_eq!(state.current_step(), 3);
    }

    #[test]
    fn test_exactly_one_panel_visible() {
        let mut state = WizardStepState::new(4).unwrap();
        state.go_to_step(3);
        assert_eq!(state.panel_visibility(), vec![false, false, true, false]);
    }
}
