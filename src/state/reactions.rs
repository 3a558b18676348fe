// Reaction mutations.
// Optimistic add/remove of issue reactions, reconciled with the server response.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use crate::data::Environment;
use crate::error::Result;
use crate::github::operations::{
    ADD_REACTION_MUTATION, REMOVE_REACTION_MUTATION, reaction_variables,
};
use crate::github::{ReactionContent, ReactionGroup};

use super::notifications::Notifications;

/// Set the viewer's reaction state on one group, adjusting its count.
///
/// The group is created when absent; the count never drops below zero.
pub fn apply_optimistic(groups: &mut Vec<ReactionGroup>, content: ReactionContent, reacted: bool) {
    let index = match groups.iter().position(|group| group.content == content) {
        Some(index) => index,
        None => {
            groups.push(ReactionGroup::empty(content));
            groups.len() - 1
        }
    };
    let group = &mut groups[index];
    group.viewer_has_reacted = reacted;
    group.users.total_count = if reacted {
        group.users.total_count + 1
    } else {
        group.users.total_count.saturating_sub(1)
    };
}

/// Whether the viewer currently has this reaction.
pub fn has_reacted(groups: &[ReactionGroup], content: ReactionContent) -> bool {
    groups
        .iter()
        .any(|group| group.content == content && group.viewer_has_reacted)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionAction {
    Add,
    Remove,
}

impl ReactionAction {
    fn error_message(&self) -> &'static str {
        match self {
            ReactionAction::Add => "Error adding reaction.",
            ReactionAction::Remove => "Error removing reaction.",
        }
    }
}

/// A mutation whose optimistic update has been applied.
#[derive(Debug)]
pub struct PendingReaction {
    pub subject_id: String,
    pub content: ReactionContent,
    pub action: ReactionAction,
    /// Groups before the optimistic update.
    previous: Vec<ReactionGroup>,
    /// Groups right after it; a rollback only applies while these are current.
    optimistic: Vec<ReactionGroup>,
}

/// Sends reaction mutations, one in flight per subject and content.
#[derive(Clone)]
pub struct ReactionMutator {
    env: Environment,
    notifications: Notifications,
    in_flight: Arc<Mutex<HashSet<(String, ReactionContent)>>>,
}

impl ReactionMutator {
    pub fn new(env: Environment, notifications: Notifications) -> Self {
        Self {
            env,
            notifications,
            in_flight: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    pub fn is_pending(&self, subject_id: &str, content: ReactionContent) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&(subject_id.to_string(), content))
    }

    /// Choose add or remove from the current state and apply it locally.
    ///
    /// Returns `None` while the same reaction is already being sent.
    pub fn begin(&self, subject_id: &str, content: ReactionContent) -> Option<PendingReaction> {
        let key = (subject_id.to_string(), content);
        if !self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key)
        {
            debug!(subject = subject_id, ?content, "reaction already in flight");
            return None;
        }

        let mut action = ReactionAction::Add;
        let mut optimistic = Vec::new();
        let previous = self.env.update_reaction_groups(subject_id, |groups| {
            let reacted = has_reacted(groups, content);
            if reacted {
                action = ReactionAction::Remove;
            }
            apply_optimistic(groups, content, !reacted);
            optimistic = groups.clone();
        });

        Some(PendingReaction {
            subject_id: subject_id.to_string(),
            content,
            action,
            previous,
            optimistic,
        })
    }

    /// Send the mutation. The server's reaction groups replace the local ones
    /// on success. On failure the reader is notified and the optimistic change
    /// is reverted, unless a server response has replaced it in the meantime.
    pub async fn commit(&self, pending: PendingReaction) -> Result<()> {
        let operation = match pending.action {
            ReactionAction::Add => &ADD_REACTION_MUTATION,
            ReactionAction::Remove => &REMOVE_REACTION_MUTATION,
        };
        let variables = reaction_variables(&pending.subject_id, pending.content);
        let result = self.env.mutate(operation, &variables).await;

        if let Err(e) = &result {
            warn!(subject = %pending.subject_id, content = ?pending.content, "reaction mutation failed: {}", e);
            let PendingReaction {
                previous,
                optimistic,
                ..
            } = &pending;
            self.env.update_reaction_groups(&pending.subject_id, |groups| {
                if *groups == *optimistic {
                    *groups = previous.clone();
                } else {
                    debug!(subject = %pending.subject_id, "reaction groups refreshed, keeping server state");
                }
            });
            self.notifications.error(pending.action.error_message());
        } else {
            info!(subject = %pending.subject_id, content = ?pending.content, action = ?pending.action, "reaction saved");
        }

        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(pending.subject_id, pending.content));
        result.map(|_| ())
    }

    /// Toggle a reaction and send it in the background.
    pub fn toggle(&self, subject_id: &str, content: ReactionContent) -> Option<ReactionAction> {
        let pending = self.begin(subject_id, content)?;
        let action = pending.action;
        let mutator = self.clone();
        tokio::spawn(async move {
            let _ = mutator.commit(pending).await;
        });
        Some(action)
    }
}
