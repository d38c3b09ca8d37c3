//! Per-form submission tracking.

use std::{
    collections::HashSet,
    sync::{Mutex, PoisonError},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormAction {
    Login,
    Register,
    Upload,
    ListResumes,
}

impl FormAction {
    pub fn name(self) -> &'static str {
        match self {
            FormAction::Login => "login",
            FormAction::Register => "register",
            FormAction::Upload => "upload",
            FormAction::ListResumes => "list_resumes",
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct Submissions {
    in_flight: Mutex<HashSet<FormAction>>,
}

impl Submissions {
    /// Marks `action` as in flight. With `exclusive` set, `None` means the same
    /// form is already being submitted.
    pub(crate) fn try_begin(
        &self,
        action: FormAction,
        exclusive: bool,
    ) -> Option<SubmissionGuard<'_>> {
        if !exclusive {
            return Some(SubmissionGuard {
                owner: None,
                action,
            });
        }

        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        if !in_flight.insert(action) {
            tracing::debug!(form = action.name(), "submission already in flight");
            return None;
        }
        Some(SubmissionGuard {
            owner: Some(self),
            action,
        })
    }

    pub(crate) fn is_in_flight(&self, action: FormAction) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&action)
    }
}

pub(crate) struct SubmissionGuard<'a> {
    owner: Option<&'a Submissions>,
    action: FormAction,
}

impl Drop for SubmissionGuard<'_> {
    fn drop(&mut self) {
        if let Some(owner) = self.owner {
            owner
                .in_flight
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .remove(&self.action);
        }
    }
}
