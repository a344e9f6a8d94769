// SPDX-License-Identifier: MIT

use super::*;

#[test]
fn stable_is_fixed_name() {
    assert_eq!(NamespaceId::stable().as_str(), "stable");
    assert!(NamespaceId::stable().is_stable());
}

#[test]
fn agent_namespace_is_not_stable() {
    let ns = NamespaceId::for_agent(&AgentId::generate());
    assert!(!ns.is_stable());
}

#[test]
fn for_agent_embeds_the_agent_id() {
    let agent = AgentId::from_string("agent-fixed");
    let ns = NamespaceId::for_agent(&agent);
    assert_eq!(ns.as_str(), "agent-fixed");
}

#[test]
fn display_matches_as_str() {
    let ns = NamespaceId::from("stable");
    assert_eq!(ns.to_string(), ns.as_str());
}
