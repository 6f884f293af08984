//! Derived redirect-chain index over a frozen input set.
//!
//! Redirects form a directed graph over resources. This module flattens
//! that graph into presentation-ready chains: one chain per path from a
//! root (a redirect nobody redirects to) through its targets. Branching
//! targets produce one chain per branch, and a revisited resource ends
//! its chain with the repeated entry so cycles stay visible without
//! looping.

use std::collections::{HashMap, HashSet};

use crate::core::input::InputSet;

/// All redirect chains of an input set, indexed by participating
/// resource.
#[derive(Debug)]
pub struct RedirectRegistry {
    chains: Vec<Vec<usize>>,
    resource_to_chain: HashMap<usize, usize>,
}

impl RedirectRegistry {
    /// Builds the registry from a frozen input set.
    pub fn build(input: &InputSet) -> Self {
        // Edge list: redirect source index -> resolved target index.
        // Redirects whose target is not in the input set are skipped.
        let mut edges: HashMap<usize, Vec<usize>> = HashMap::new();
        let mut destinations: HashSet<usize> = HashSet::new();
        for (idx, resource) in input.resources().iter().enumerate() {
            if !resource.is_redirect() {
                continue;
            }
            let Some(target_url) = resource.redirected_url() else {
                tracing::debug!(
                    url = resource.request_url(),
                    "redirect has no resolvable target"
                );
                continue;
            };
            match input.resource_index_for_url(&target_url) {
                Some(target) => {
                    edges.entry(idx).or_default().push(target);
                    destinations.insert(target);
                }
                None => {
                    tracing::debug!(
                        url = resource.request_url(),
                        target = %target_url,
                        "redirect target not captured in input set"
                    );
                }
            }
        }

        // Roots that nothing redirects to come first, so chains start at
        // their true origin. Remaining sources are walked afterwards to
        // keep pure cycles reportable.
        let mut sources: Vec<usize> = edges.keys().copied().collect();
        sources.sort_unstable();
        let mut roots: Vec<usize> = sources
            .iter()
            .copied()
            .filter(|idx| !destinations.contains(idx))
            .collect();
        roots.extend(sources.iter().copied().filter(|idx| destinations.contains(idx)));

        let mut chains: Vec<Vec<usize>> = Vec::new();
        let mut covered: HashSet<usize> = HashSet::new();
        for root in roots {
            if covered.contains(&root) {
                continue;
            }
            let mut path = vec![root];
            extend_chains(&edges, &mut path, &mut chains, &mut covered);
        }

        let mut resource_to_chain = HashMap::new();
        for (chain_idx, chain) in chains.iter().enumerate() {
            for &resource_idx in chain {
                resource_to_chain.entry(resource_idx).or_insert(chain_idx);
            }
        }

        Self {
            chains,
            resource_to_chain,
        }
    }

    /// Every chain, each an ordered list of resource indices from origin
    /// to final destination (or to the repeated entry for a cycle).
    pub fn chains(&self) -> &[Vec<usize>] {
        &self.chains
    }

    /// The first chain a resource participates in, if any.
    pub fn chain_containing(&self, resource_idx: usize) -> Option<&[usize]> {
        self.resource_to_chain
            .get(&resource_idx)
            .map(|&chain_idx| self.chains[chain_idx].as_slice())
    }

    /// The resource a chain starting at `resource_idx` ultimately lands
    /// on, if the resource heads a chain.
    pub fn final_redirect_target(&self, resource_idx: usize) -> Option<usize> {
        let chain = self.chain_containing(resource_idx)?;
        if chain.first() != Some(&resource_idx) {
            return None;
        }
        chain.last().copied()
    }
}

/// Depth-first chain expansion. Each branch target gets its own chain
/// sharing the prefix walked so far; a target already on the path closes
/// the chain with that repeated entry.
fn extend_chains(
    edges: &HashMap<usize, Vec<usize>>,
    path: &mut Vec<usize>,
    chains: &mut Vec<Vec<usize>>,
    covered: &mut HashSet<usize>,
) {
    let current = *path.last().expect("path is never empty");
    covered.insert(current);

    let targets = match edges.get(&current) {
        Some(targets) if !targets.is_empty() => targets,
        _ => {
            chains.push(path.clone());
            return;
        }
    };

    for &target in targets {
        if path.contains(&target) {
            let mut cycle = path.clone();
            cycle.push(target);
            chains.push(cycle);
            continue;
        }
        path.push(target);
        extend_chains(edges, path, chains, covered);
        path.pop();
    }
}
