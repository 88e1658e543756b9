use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::hierarchy::{Link, NodeIndex};

/// Assigns every node to a layer so that each link points to a strictly
/// deeper layer while keeping links as short as possible.
///
/// Nodes are first layered by longest path from the sources, then every
/// source is pulled down to sit right above its shallowest child. On
/// forests this gives every link a span of exactly one layer.
pub fn assign_layers(node_count: usize, links: &[Link]) -> Vec<usize> {
    let mut outgoing: Vec<Vec<NodeIndex>> = vec![Vec::new(); node_count];
    let mut incoming: Vec<Vec<NodeIndex>> = vec![Vec::new(); node_count];
    for link in links {
        if link.source >= node_count || link.target >= node_count || link.source == link.target {
            continue;
        }
        outgoing[link.source].push(link.target);
        incoming[link.target].push(link.source);
    }

    let order = topological_order(&outgoing, &incoming);
    let mut position = vec![0usize; node_count];
    for (idx, node) in order.iter().enumerate() {
        position[*node] = idx;
    }

    let mut layers = vec![0usize; node_count];
    for &node in &order {
        for &next in &outgoing[node] {
            // Links closing a cycle are ignored.
            if position[next] <= position[node] {
                continue;
            }
            layers[next] = layers[next].max(layers[node] + 1);
        }
    }

    for &node in order.iter().rev() {
        if !incoming[node].is_empty() {
            continue;
        }
        let shallowest_child = outgoing[node]
            .iter()
            .filter(|&&next| position[next] > position[node])
            .map(|&next| layers[next])
            .min();
        if let Some(child_layer) = shallowest_child {
            layers[node] = layers[node].max(child_layer.saturating_sub(1));
        }
    }

    layers
}

/// Kahn's algorithm; ties are broken by node index so that the order is
/// deterministic and follows the outline.
fn topological_order(outgoing: &[Vec<NodeIndex>], incoming: &[Vec<NodeIndex>]) -> Vec<NodeIndex> {
    let node_count = outgoing.len();
    let mut indeg: Vec<usize> = incoming.iter().map(Vec::len).collect();
    let mut processed = vec![false; node_count];
    let mut order = Vec::with_capacity(node_count);

    let mut ready: BinaryHeap<Reverse<NodeIndex>> = (0..node_count)
        .filter(|&node| indeg[node] == 0)
        .map(Reverse)
        .collect();

    loop {
        while let Some(Reverse(node)) = ready.pop() {
            if processed[node] {
                continue;
            }
            processed[node] = true;
            order.push(node);
            for &next in &outgoing[node] {
                if processed[next] {
                    continue;
                }
                indeg[next] = indeg[next].saturating_sub(1);
                if indeg[next] == 0 {
                    ready.push(Reverse(next));
                }
            }
        }

        if order.len() >= node_count {
            break;
        }

        // Cycle: restart from the earliest remaining node.
        match (0..node_count).find(|&node| !processed[node]) {
            Some(node) => ready.push(Reverse(node)),
            None => break,
        }
    }

    order
}
