//! Recipient resolution.
//!
//! Turns a notification scope into a deduplicated list of users. Group
//! scoped parent events go through the children collection: every child in
//! a targeted group contributes its parent, and parents are then fetched in
//! batches no larger than the directory's `in` query limit.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{NotificationError, NotificationResult};
use crate::models::{Recipient, Role, UserRecord};
use crate::repository::Directory;

/// Who should receive a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecipientScope {
    AllAdmins,
    AllParents,
    /// Parents with at least one child in any of these groups.
    Groups(Vec<String>),
}

impl RecipientScope {
    /// Scope for a parent event from its `group` field.
    ///
    /// Missing, blank, "All" and "All Groups" target every parent; anything
    /// else is a comma-separated list of group names.
    pub fn for_event_group(group: Option<&str>) -> Self {
        let Some(group) = group.map(str::trim).filter(|g| !g.is_empty()) else {
            return RecipientScope::AllParents;
        };

        if group.eq_ignore_ascii_case("all") || group.eq_ignore_ascii_case("all groups") {
            return RecipientScope::AllParents;
        }

        let mut groups: Vec<String> = Vec::new();
        for name in group.split(',').map(str::trim).filter(|g| !g.is_empty()) {
            if !groups.iter().any(|g| g == name) {
                groups.push(name.to_string());
            }
        }

        if groups.is_empty() {
            RecipientScope::AllParents
        } else {
            RecipientScope::Groups(groups)
        }
    }
}

impl std::fmt::Display for RecipientScope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecipientScope::AllAdmins => write!(f, "all admins"),
            RecipientScope::AllParents => write!(f, "all parents"),
            RecipientScope::Groups(groups) => write!(f, "groups [{}]", groups.join(", ")),
        }
    }
}

/// Resolves scopes against a [`Directory`].
#[derive(Clone)]
pub struct RecipientResolver {
    directory: Arc<dyn Directory>,
}

impl RecipientResolver {
    pub fn new(directory: Arc<dyn Directory>) -> Self {
        Self { directory }
    }

    /// Deduplicated recipients for `scope`. An empty result is not an error.
    pub async fn resolve(&self, scope: &RecipientScope) -> NotificationResult<Vec<Recipient>> {
        let recipients = match scope {
            RecipientScope::AllAdmins => self.by_role(Role::Admin).await?,
            RecipientScope::AllParents => self.by_role(Role::Parent).await?,
            RecipientScope::Groups(groups) => self.by_groups(groups).await?,
        };

        debug!(scope = %scope, count = recipients.len(), "Resolved recipients");
        Ok(recipients)
    }

    /// The invoiced parent, looked up by uid.
    pub async fn parent(&self, parent_id: &str) -> NotificationResult<UserRecord> {
        self.directory
            .user_by_id(parent_id)
            .await?
            .ok_or_else(|| NotificationError::UserNotFound(parent_id.to_string()))
    }

    async fn by_role(&self, role: Role) -> NotificationResult<Vec<Recipient>> {
        let users = self.directory.users_by_role(role).await?;
        Ok(dedup_users(users).into_iter().map(Recipient::from).collect())
    }

    async fn by_groups(&self, groups: &[String]) -> NotificationResult<Vec<Recipient>> {
        let batch = self.directory.max_ids_per_query().max(1);

        // Parent ids in first-seen order, each with its children's names.
        let mut parents: Vec<(String, Vec<String>)> = Vec::new();
        for chunk in groups.chunks(batch) {
            for child in self.directory.children_in_groups(chunk).await? {
                if child.parent_id.trim().is_empty() {
                    warn!(child_id = %child.id, "Child has no parent id, skipping");
                    continue;
                }
                match parents.iter_mut().find(|(id, _)| *id == child.parent_id) {
                    Some((_, names)) => {
                        if !names.contains(&child.name) {
                            names.push(child.name);
                        }
                    }
                    None => parents.push((child.parent_id, vec![child.name])),
                }
            }
        }

        if parents.is_empty() {
            debug!(groups = ?groups, "No children in targeted groups");
            return Ok(Vec::new());
        }

        let ids: Vec<String> = parents.iter().map(|(id, _)| id.clone()).collect();
        let mut users = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(batch) {
            users.extend(self.directory.users_by_ids(chunk).await?);
        }

        let users = dedup_users(users);
        let recipients = parents
            .into_iter()
            .filter_map(|(id, child_names)| {
                let user = users.iter().find(|u| u.uid == id).cloned();
                if user.is_none() {
                    warn!(parent_id = %id, "Parent referenced by a child was not found");
                }
                user.map(|u| Recipient::with_children(u, child_names))
            })
            .collect();

        Ok(recipients)
    }
}

/// Drop repeated uids and users without an email address.
fn dedup_users(users: Vec<UserRecord>) -> Vec<UserRecord> {
    let mut seen = HashSet::new();
    users
        .into_iter()
        .filter(|user| {
            if user.email.trim().is_empty() {
                warn!(uid = %user.uid, "User has no email address, skipping");
                return false;
            }
            seen.insert(user.uid.clone())
        })
        .collect()
}
