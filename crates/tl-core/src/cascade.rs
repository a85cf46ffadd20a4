//! # Cascade planning
//!
//! Works out what a delete touches before any row is removed: the telll ids
//! in the subtree, and the users and communities whose telll lists must drop
//! them. Storage plugins collect the subtree and then execute the plan.

use crate::models::Telll;
use std::collections::HashSet;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePlan {
    /// Root first, then descendants in discovery order
    pub telll_ids: Vec<Uuid>,
    pub author_ids: Vec<Uuid>,
    pub community_ids: Vec<Uuid>,
}

impl DeletePlan {
    pub fn build(root: &Telll, descendants: &[Telll]) -> Self {
        let mut telll_ids = Vec::with_capacity(descendants.len() + 1);
        let mut author_ids = Vec::new();
        let mut community_ids = Vec::new();
        let mut seen = HashSet::new();

        for telll in std::iter::once(root).chain(descendants) {
            if !seen.insert(telll.id) {
                continue;
            }
            telll_ids.push(telll.id);
            if !author_ids.contains(&telll.author_id) {
                author_ids.push(telll.author_id);
            }
            if let Some(community_id) = telll.community_id {
                if !community_ids.contains(&community_id) {
                    community_ids.push(community_id);
                }
            }
        }

        Self {
            telll_ids,
            author_ids,
            community_ids,
        }
    }
}

/// Breadth-first walk over `parent_id` links starting below a root.
///
/// The walk does no I/O itself: the caller asks for the next batch of parent
/// ids, loads their direct children however it likes, and records them.
/// Ids already visited are skipped, so a corrupted parent cycle cannot loop
/// forever.
#[derive(Debug)]
pub struct DescendantWalk {
    visited: HashSet<Uuid>,
    frontier: Vec<Uuid>,
    found: Vec<Telll>,
}

impl DescendantWalk {
    pub fn new(root_id: Uuid) -> Self {
        Self {
            visited: HashSet::from([root_id]),
            frontier: vec![root_id],
            found: Vec::new(),
        }
    }

    /// Parent ids whose children still need loading, or `None` when done.
    pub fn next_batch(&mut self) -> Option<Vec<Uuid>> {
        if self.frontier.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.frontier))
        }
    }

    pub fn record(&mut self, children: Vec<Telll>) {
        for child in children {
            if self.visited.insert(child.id) {
                self.frontier.push(child.id);
                self.found.push(child);
            }
        }
    }

    pub fn finish(self) -> Vec<Telll> {
        self.found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn telll(parent: Option<Uuid>, author: Uuid, community: Option<Uuid>) -> Telll {
        Telll {
            id: Uuid::now_v7(),
            text: "text".into(),
            author_id: author,
            community_id: community,
            parent_id: parent,
            created_at: Utc::now(),
        }
    }

    fn walk_in_memory(root_id: Uuid, all: &[Telll]) -> Vec<Telll> {
        let mut walk = DescendantWalk::new(root_id);
        while let Some(parents) = walk.next_batch() {
            let children = all
                .iter()
                .filter(|t| t.parent_id.is_some_and(|p| parents.contains(&p)))
                .cloned()
                .collect();
            walk.record(children);
        }
        walk.finish()
    }

    #[test]
    fn plan_dedups_authors_and_communities() {
        let (alice, bob) = (Uuid::now_v7(), Uuid::now_v7());
        let rust = Uuid::now_v7();
        let root = telll(None, alice, Some(rust));
        let c1 = telll(Some(root.id), bob, None);
        let c2 = telll(Some(root.id), alice, Some(rust));

        let plan = DeletePlan::build(&root, &[c1.clone(), c2.clone()]);
        assert_eq!(plan.telll_ids, vec![root.id, c1.id, c2.id]);
        assert_eq!(plan.author_ids, vec![alice, bob]);
        assert_eq!(plan.community_ids, vec![rust]);
    }

    #[test]
    fn collects_whole_subtree_and_nothing_else() {
        let author = Uuid::now_v7();
        let root = telll(None, author, None);
        let child = telll(Some(root.id), author, None);
        let grandchild = telll(Some(child.id), author, None);
        let unrelated = telll(None, author, None);
        let all = vec![
            root.clone(),
            child.clone(),
            grandchild.clone(),
            unrelated.clone(),
        ];

        let found = walk_in_memory(root.id, &all);
        let ids: Vec<Uuid> = found.iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![child.id, grandchild.id]);
    }

    #[test]
    fn parent_cycle_terminates() {
        let author = Uuid::now_v7();
        let mut a = telll(None, author, None);
        let b = telll(Some(a.id), author, None);
        a.parent_id = Some(b.id);
        let all = vec![a.clone(), b.clone()];

        let found = walk_in_memory(a.id, &all);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, b.id);
    }
}
