//! Replays a recorded run and checks every transition against a rule set

use super::RunHistory;
use crate::game_of_life::{CellState, Grid, RuleSet};
use std::fmt;

/// Checks that each recorded generation follows from the previous one
pub struct HistoryValidator {
    rules: RuleSet,
}

/// Result of validating a history
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub transitions_checked: usize,
    pub cells_checked: usize,
    pub violations: Vec<RuleViolation>,
    pub error_message: Option<String>,
}

/// A cell whose recorded state differs from what the rules produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleViolation {
    /// Generation offset of the erroneous state within the history
    pub generation: usize,
    pub cell_position: (usize, usize),
    pub expected_state: CellState,
    pub actual_state: CellState,
    pub living_neighbors: usize,
}

impl HistoryValidator {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    /// Validator using the rule recorded in the history itself
    pub fn for_history(history: &RunHistory) -> Self {
        Self::new(RuleSet::parse(&history.rule))
    }

    pub fn validate(&self, history: &RunHistory) -> ValidationResult {
        let mut violations = Vec::new();
        let mut cells_checked = 0;

        for (offset, pair) in history.states.windows(2).enumerate() {
            let (current, next) = (&pair[0], &pair[1]);
            if !current.same_shape(next) {
                return ValidationResult {
                    is_valid: false,
                    transitions_checked: offset,
                    cells_checked,
                    violations,
                    error_message: Some(format!(
                        "Grid shape changes at generation {}: {}x{} -> {}x{}",
                        offset + 1, current.width, current.height, next.width, next.height
                    )),
                };
            }

            violations.extend(self.validate_transition(current, next, offset + 1));
            cells_checked += current.cells.len();
        }

        let is_valid = violations.is_empty();
        let error_message = (!is_valid).then(|| Self::describe(&violations));

        ValidationResult {
            is_valid,
            transitions_checked: history.generations(),
            cells_checked,
            violations,
            error_message,
        }
    }

    /// Compare one recorded transition against the rules
    pub fn validate_transition(&self, current: &Grid, next: &Grid, generation: usize) -> Vec<RuleViolation> {
        let mut violations = Vec::new();

        for y in 0..current.height {
            for x in 0..current.width {
                let neighbors = current.neighbors(x, y);
                let living_neighbors = neighbors.iter().filter(|&&n| n > 0).count();
                let expected_state = self.rules.next_state(current.get(x, y), neighbors);
                let actual_state = next.get(x, y);

                if expected_state != actual_state {
                    violations.push(RuleViolation {
                        generation,
                        cell_position: (x, y),
                        expected_state,
                        actual_state,
                        living_neighbors,
                    });
                }
            }
        }

        violations
    }

    fn describe(violations: &[RuleViolation]) -> String {
        let mut message = format!("Found {} rule violations. ", violations.len());
        for violation in violations.iter().take(3) {
            message.push_str(&format!("{}; ", violation));
        }
        if violations.len() > 3 {
            message.push_str(&format!("... and {} more", violations.len() - 3));
        }
        message
    }
}

impl fmt::Display for RuleViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cell ({}, {}) at generation {} should be {} but is {} ({} living neighbors)",
               self.cell_position.0, self.cell_position.1, self.generation,
               self.expected_state, self.actual_state, self.living_neighbors)
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation Result:")?;
        writeln!(f, "  Valid: {}", self.is_valid)?;
        writeln!(f, "  Transitions checked: {}", self.transitions_checked)?;
        writeln!(f, "  Cells checked: {}", self.cells_checked)?;
        writeln!(f, "  Rule violations: {}", self.violations.len())?;
        if let Some(ref message) = self.error_message {
            writeln!(f, "  Error: {}", message)?;
        }
        Ok(())
    }
}
