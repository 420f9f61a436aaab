//! Contexts: scopes of refinement bundling agent roles, a time window, and a
//! governed set of targets.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::clock::Timestamp;
use crate::ids::{AgentID, ContextID, TargetID};

/// An agent's standing relative to a context's inquiry (§3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Inquirer side.
    I,
    /// Non-inquirer side.
    NotI,
    /// Both sides (coalition agent).
    Both,
    /// No role assigned.
    Unknown,
}

impl Default for Role {
    fn default() -> Self {
        Self::Unknown
    }
}

/// A half-open time interval `[start, end)`. `end = None` means "still open".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeInterval {
    pub start: Timestamp,
    pub end: Option<Timestamp>,
}

impl TimeInterval {
    pub fn from(start: Timestamp) -> Self {
        Self { start, end: None }
    }

    pub fn closed(start: Timestamp, end: Timestamp) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    /// Whether `t` falls within `[start, end)`.
    pub fn contains(&self, t: Timestamp) -> bool {
        t >= self.start && self.end.is_none_or(|end| t < end)
    }
}

/// A scope of refinement: agent roles, a governed time window, and the set of
/// targets this context has jurisdiction over (§3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    pub id: ContextID,
    pub i_side: HashSet<AgentID>,
    pub not_i_side: HashSet<AgentID>,
    pub tau: TimeInterval,
    pub policy_ref: String,
    pub scope: HashSet<TargetID>,
    roles: HashMap<AgentID, Role>,
}

impl Context {
    pub fn new(id: ContextID, tau: TimeInterval, policy_ref: impl Into<String>) -> Self {
        Self {
            id,
            i_side: HashSet::new(),
            not_i_side: HashSet::new(),
            tau,
            policy_ref: policy_ref.into(),
            scope: HashSet::new(),
            roles: HashMap::new(),
        }
    }

    /// Assign an explicit role to an agent. Also threads the agent into the
    /// I-side/NotI-side sets for `I`/`NotI`/`Both` roles so the two views
    /// stay consistent.
    pub fn set_role(&mut self, agent: AgentID, role: Role) {
        match role {
            Role::I => {
                self.i_side.insert(agent.clone());
            }
            Role::NotI => {
                self.not_i_side.insert(agent.clone());
            }
            Role::Both => {
                self.i_side.insert(agent.clone());
                self.not_i_side.insert(agent.clone());
            }
            Role::Unknown => {}
        }
        self.roles.insert(agent, role);
    }

    /// `role: AgentID -> Role` (§3). Agents with no explicit assignment are
    /// `Unknown`.
    pub fn role(&self, agent: &AgentID) -> Role {
        self.roles.get(agent).copied().unwrap_or_default()
    }

    pub fn with_scope_target(mut self, target: TargetID) -> Self {
        self.scope.insert(target);
        self
    }
}
