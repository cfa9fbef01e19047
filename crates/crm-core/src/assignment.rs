//! Assigning representatives to an account.
//!
//! Every account with at least one rep has exactly one primary rep. When
//! the manager never picks one, the first rep selected becomes primary, and
//! removing the primary promotes the next rep in selection order.

use std::collections::HashSet;

use crate::error::CoreError;
use crate::models::{Account, RepAssignment, Representative};

/// Editable rep selection for one account.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssignmentDraft {
    selected: Vec<(String, String)>,
    primary: Option<String>,
}

impl AssignmentDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the account's current assignments.
    pub fn from_account(account: &Account) -> Self {
        Self {
            selected: account
                .reps
                .iter()
                .map(|r| (r.rep_id.clone(), r.rep_name.clone()))
                .collect(),
            primary: account.primary_rep().map(|r| r.rep_id.clone()),
        }
    }

    pub fn is_selected(&self, rep_id: &str) -> bool {
        self.selected.iter().any(|(id, _)| id == rep_id)
    }

    pub fn primary(&self) -> Option<&str> {
        self.primary.as_deref()
    }

    /// Add the rep if absent, remove it if present.
    pub fn toggle_rep(&mut self, rep: &Representative) {
        if let Some(pos) = self.selected.iter().position(|(id, _)| *id == rep.id) {
            self.selected.remove(pos);
            if self.primary.as_deref() == Some(rep.id.as_str()) {
                self.primary = self.selected.first().map(|(id, _)| id.clone());
            }
        } else {
            self.selected.push((rep.id.clone(), rep.name.clone()));
            if self.primary.is_none() {
                self.primary = Some(rep.id.clone());
            }
        }
    }

    /// Designate an already-selected rep as primary.
    pub fn set_primary(&mut self, rep_id: &str) -> Result<(), CoreError> {
        if !self.is_selected(rep_id) {
            return Err(CoreError::InvalidAssignment(format!(
                "rep {} is not assigned to this account",
                rep_id
            )));
        }
        self.primary = Some(rep_id.to_string());
        Ok(())
    }

    /// Assignments to persist, in selection order.
    pub fn finalize(&self) -> Vec<RepAssignment> {
        let primary = self
            .primary
            .as_deref()
            .or_else(|| self.selected.first().map(|(id, _)| id.as_str()));

        self.selected
            .iter()
            .map(|(id, name)| RepAssignment {
                rep_id: id.clone(),
                rep_name: name.clone(),
                is_primary: Some(id.as_str()) == primary,
            })
            .collect()
    }
}

/// Check the primary-rep rule on a full assignment list.
///
/// Reps must be distinct, and a non-empty list needs exactly one primary.
pub fn validate_assignments(assignments: &[RepAssignment]) -> Result<(), CoreError> {
    let mut seen = HashSet::new();
    for a in assignments {
        if !seen.insert(a.rep_id.as_str()) {
            return Err(CoreError::InvalidAssignment(format!(
                "rep {} assigned twice",
                a.rep_id
            )));
        }
    }

    let primaries = assignments.iter().filter(|a| a.is_primary).count();
    match (assignments.is_empty(), primaries) {
        (true, _) | (false, 1) => Ok(()),
        (false, 0) => Err(CoreError::InvalidAssignment(
            "no primary rep designated".to_string(),
        )),
        (false, n) => Err(CoreError::InvalidAssignment(format!(
            "{} primary reps designated, expected one",
            n
        ))),
    }
}
