//! Boundary transform: trust adjustment from an agent's role under a
//! context's role function (§4.5).

use crate::context::{Context, Role};
use crate::evidence::EvidenceItem;
use crate::policy::Policy;

/// The per-role trust multiplier (§3 policy table).
pub fn role_factor(role: Role, policy: &Policy) -> f64 {
    match role {
        Role::I => 1.0,
        Role::NotI => policy.not_i_trust_factor,
        Role::Both => policy.coalition_factor,
        Role::Unknown => policy.unknown_trust_factor,
    }
}

/// `effective_trust(e, context) = e.trust * factor(context.role(e.src))`.
///
/// Applied once, at ingestion (Incorporate, Merge); aggregation never
/// re-applies it (§4.5).
pub fn effective_trust(raw_trust: f64, src_role: Role, policy: &Policy) -> f64 {
    (raw_trust * role_factor(src_role, policy)).clamp(0.0, 1.0)
}

/// Re-derive an evidence item's stored trust under `context`, starting from
/// its `pre_transform_trust` (used by Recontextualize, §4.6).
pub fn retransform(item: &EvidenceItem, context: &Context, policy: &Policy) -> EvidenceItem {
    let role = context.role(&item.src);
    item.with_retransformed_trust(role_factor(role, policy))
}
