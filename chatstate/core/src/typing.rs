//! Typing-Status Tracking
//!
//! Tracks which users are currently composing a message, per project. The
//! tracker only ever holds active typists: pushing a "stopped typing" status
//! removes the user in the same operation that would otherwise update them,
//! so readers never have to filter.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::ids::{ProjectId, UserId};

/// A user's latest known typing state
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypingStatus {
    /// The user this status belongs to
    pub user: UserId,
    /// Whether the user is currently typing
    pub typing: bool,
}

impl TypingStatus {
    /// Create a typing status
    pub fn new(user: impl Into<String>, typing: bool) -> Self {
        Self {
            user: UserId::new(user),
            typing,
        }
    }
}

/// Per-project set of users currently typing
///
/// Invariants: at most one entry per `(project, user)` pair, and no entry
/// with `typing = false` is ever retained.
#[derive(Clone, Debug, Default)]
pub struct TypingTracker {
    projects: HashMap<ProjectId, Vec<TypingStatus>>,
}

impl TypingTracker {
    /// Create an empty tracker
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the full set for a project
    ///
    /// Inactive entries in the snapshot are dropped on install so the
    /// invariant holds regardless of what the transport pushed.
    pub fn set_all(&mut self, project: &ProjectId, mut statuses: Vec<TypingStatus>) {
        statuses.retain(|s| s.typing);
        if statuses.is_empty() {
            self.projects.remove(project);
        } else {
            self.projects.insert(project.clone(), statuses);
        }
    }

    /// Apply a single status change
    ///
    /// An existing entry for the same user is replaced in place (list
    /// position preserved); otherwise the status is appended. Entries left
    /// with `typing = false` are removed immediately.
    pub fn upsert(&mut self, project: &ProjectId, status: TypingStatus) {
        let list = self.projects.entry(project.clone()).or_default();
        if let Some(existing) = list.iter_mut().find(|s| s.user == status.user) {
            *existing = status;
        } else {
            list.push(status);
        }
        list.retain(|s| s.typing);
        if list.is_empty() {
            self.projects.remove(project);
        }
    }

    /// Remove any entry for a user
    pub fn remove(&mut self, project: &ProjectId, user: &UserId) {
        if let Some(list) = self.projects.get_mut(project) {
            list.retain(|s| &s.user != user);
            if list.is_empty() {
                self.projects.remove(project);
            }
        }
    }

    /// The users currently typing in a project (empty for an unknown project)
    #[must_use]
    pub fn typists(&self, project: &ProjectId) -> &[TypingStatus] {
        self.projects.get(project).map_or(&[], Vec::as_slice)
    }

    /// Whether a specific user is typing in a project
    #[must_use]
    pub fn is_typing(&self, project: &ProjectId, user: &UserId) -> bool {
        self.typists(project).iter().any(|s| &s.user == user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_deduplicates_per_user() {
        let mut tracker = TypingTracker::new();
        let project = ProjectId::new("p1");

        tracker.upsert(&project, TypingStatus::new("u1", true));
        tracker.upsert(&project, TypingStatus::new("u1", true));

        assert_eq!(tracker.typists(&project).len(), 1);
        assert!(tracker.is_typing(&project, &UserId::new("u1")));
    }

    #[test]
    fn test_stop_typing_removes_entry() {
        let mut tracker = TypingTracker::new();
        let project = ProjectId::new("p1");

        tracker.upsert(&project, TypingStatus::new("u1", true));
        tracker.upsert(&project, TypingStatus::new("u1", false));

        assert!(tracker.typists(&project).is_empty());
        assert!(!tracker.is_typing(&project, &UserId::new("u1")));
    }

    #[test]
    fn test_upsert_preserves_position() {
        let mut tracker = TypingTracker::new();
        let project = ProjectId::new("p1");

        tracker.upsert(&project, TypingStatus::new("u1", true));
        tracker.upsert(&project, TypingStatus::new("u2", true));
        tracker.upsert(&project, TypingStatus::new("u3", true));

        // Re-upserting u1 keeps it first
        tracker.upsert(&project, TypingStatus::new("u1", true));
        let users: Vec<_> = tracker
            .typists(&project)
            .iter()
            .map(|s| s.user.as_str())
            .collect();
        assert_eq!(users, vec!["u1", "u2", "u3"]);
    }

    #[test]
    fn test_set_all_filters_inactive() {
        let mut tracker = TypingTracker::new();
        let project = ProjectId::new("p1");

        tracker.set_all(
            &project,
            vec![
                TypingStatus::new("u1", true),
                TypingStatus::new("u2", false),
                TypingStatus::new("u3", true),
            ],
        );

        let users: Vec<_> = tracker
            .typists(&project)
            .iter()
            .map(|s| s.user.as_str())
            .collect();
        assert_eq!(users, vec!["u1", "u3"]);
    }

    #[test]
    fn test_remove_user() {
        let mut tracker = TypingTracker::new();
        let project = ProjectId::new("p1");

        tracker.upsert(&project, TypingStatus::new("u1", true));
        tracker.remove(&project, &UserId::new("u1"));

        assert!(tracker.typists(&project).is_empty());
        // Removing from an unknown project is a no-op
        tracker.remove(&ProjectId::new("ghost"), &UserId::new("u1"));
    }

    #[test]
    fn test_projects_are_independent() {
        let mut tracker = TypingTracker::new();
        let p1 = ProjectId::new("p1");
        let p2 = ProjectId::new("p2");

        tracker.upsert(&p1, TypingStatus::new("u1", true));
        tracker.upsert(&p2, TypingStatus::new("u1", true));
        tracker.upsert(&p1, TypingStatus::new("u1", false));

        assert!(tracker.typists(&p1).is_empty());
        assert_eq!(tracker.typists(&p2).len(), 1);
    }
}
