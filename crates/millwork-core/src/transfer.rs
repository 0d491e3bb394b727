//! The pull protocol: downstream nodes withdraw from upstream neighbors.
//!
//! Each receiver computes its own demand and drains its inputs greedily,
//! richest neighbor first. There is no global flow solution.

use crate::catalog::Catalog;
use crate::fixed::Fixed64;
use crate::graph::ConnectionGraph;
use crate::id::{NodeId, ResourceId};
use crate::node::Node;
use std::collections::BTreeMap;

/// One completed withdrawal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub from: NodeId,
    pub to: NodeId,
    pub resource: ResourceId,
    pub amount: Fixed64,
}

/// Run one pull pass over every node, in id order.
///
/// Ghosts with a running build timer do not pull. Returns every non-zero
/// transfer made.
pub fn pull_all(
    nodes: &mut BTreeMap<NodeId, Node>,
    graph: &ConnectionGraph,
    catalog: &Catalog,
) -> Vec<Transfer> {
    let mut transfers = Vec::new();
    let receivers: Vec<NodeId> = nodes.keys().copied().collect();
    for receiver in receivers {
        pull_into(receiver, nodes, graph, catalog, &mut transfers);
    }
    transfers
}

/// Pull every demanded resource into `receiver`.
pub fn pull_into(
    receiver: NodeId,
    nodes: &mut BTreeMap<NodeId, Node>,
    graph: &ConnectionGraph,
    catalog: &Catalog,
    transfers: &mut Vec<Transfer>,
) {
    let demand = match nodes.get(&receiver) {
        Some(node) if !node.is_building() => node.pull_demand(catalog),
        _ => return,
    };

    for (resource, wanted) in demand {
        let sources = ranked_sources(receiver, resource, nodes, graph);
        let mut remaining = wanted;
        let count = sources.len();

        for (index, source) in sources.into_iter().enumerate() {
            if remaining <= Fixed64::ZERO {
                break;
            }
            let left_to_try = Fixed64::saturating_from_num(count - index);
            let request = (remaining / left_to_try).saturating_ceil();
            let pulled = match nodes.get_mut(&source) {
                Some(node) => node.ledger_mut().pull(resource, request),
                None => continue,
            };
            if pulled <= Fixed64::ZERO {
                continue;
            }
            let credited = match nodes.get_mut(&receiver) {
                Some(node) => node.ledger_mut().credit(resource, pulled),
                None => Fixed64::ZERO,
            };
            // Refund whatever the receiver had no room for.
            if credited < pulled
                && let Some(node) = nodes.get_mut(&source)
            {
                node.ledger_mut().credit(resource, pulled - credited);
            }
            if credited > Fixed64::ZERO {
                transfers.push(Transfer {
                    from: source,
                    to: receiver,
                    resource,
                    amount: credited,
                });
            }
            remaining = remaining.saturating_sub(credited);
        }
    }
}

/// Inputs of `receiver` that track `resource`, richest first. Ties break by
/// id so the order is deterministic.
fn ranked_sources(
    receiver: NodeId,
    resource: ResourceId,
    nodes: &BTreeMap<NodeId, Node>,
    graph: &ConnectionGraph,
) -> Vec<NodeId> {
    let mut sources: Vec<(NodeId, Fixed64)> = graph
        .inputs(receiver)
        .filter_map(|id| {
            let stock = nodes.get(&id)?.ledger().get(resource)?;
            Some((id, stock.amount))
        })
        .collect();
    sources.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    sources.into_iter().map(|(id, _)| id).collect()
}
