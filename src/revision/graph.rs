// ============================================================================
// Revision Graph
// ============================================================================
//
// Built once from the parent pointers of every known revision and validated
// up front: one root, no dangling parents, no cycles, no branches. After
// that the graph is a single chain and path resolution cannot guess.
//
// ============================================================================

use std::collections::HashMap;

use super::{Direction, Revision};
use crate::core::{MigrateError, Result};

#[derive(Debug, Clone)]
pub struct RevisionGraph {
    revisions: HashMap<String, Revision>,
    /// Root first, head last.
    order: Vec<String>,
}

/// Ordered revisions to run between two points of the graph.
#[derive(Debug, Clone)]
pub struct MigrationPath<'a> {
    pub direction: Direction,
    pub from: Option<String>,
    pub to: Option<String>,
    pub steps: Vec<&'a Revision>,
}

impl<'a> MigrationPath<'a> {
    fn new(
        direction: Direction,
        from: Option<&str>,
        to: Option<&str>,
        steps: Vec<&'a Revision>,
    ) -> Self {
        Self {
            direction,
            from: from.map(str::to_string),
            to: to.map(str::to_string),
            steps,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Revision the target points at once `step` has been committed.
    pub fn resulting_revision<'r>(&self, step: &'r Revision) -> Option<&'r str> {
        match self.direction {
            Direction::Upgrade => Some(step.id()),
            Direction::Downgrade => step.parent_id(),
        }
    }
}

impl RevisionGraph {
    pub fn new<I>(revisions: I) -> Result<Self>
    where
        I: IntoIterator<Item = Revision>,
    {
        let mut by_id = HashMap::<String, Revision>::new();
        for revision in revisions {
            let id = revision.id().to_string();
            if by_id.contains_key(&id) {
                return Err(MigrateError::DuplicateRevision(id));
            }
            by_id.insert(id, revision);
        }

        if by_id.is_empty() {
            return Ok(Self {
                revisions: by_id,
                order: Vec::new(),
            });
        }

        let mut children = HashMap::<String, Vec<String>>::new();
        let mut roots = Vec::new();
        for revision in by_id.values() {
            match revision.parent_id() {
                None => roots.push(revision.id().to_string()),
                Some(parent) => {
                    if !by_id.contains_key(parent) {
                        return Err(MigrateError::UnknownRevision(parent.to_string()));
                    }
                    children
                        .entry(parent.to_string())
                        .or_default()
                        .push(revision.id().to_string());
                }
            }
        }

        roots.sort();
        if roots.len() > 1 {
            return Err(MigrateError::DisjointGraph { roots });
        }
        let Some(root) = roots.pop() else {
            let mut ids: Vec<&String> = by_id.keys().collect();
            ids.sort();
            return Err(MigrateError::CycleDetected(ids[0].clone()));
        };

        let mut branches: Vec<(&String, &Vec<String>)> =
            children.iter().filter(|(_, kids)| kids.len() > 1).collect();
        branches.sort();
        if let Some((parent, kids)) = branches.first() {
            let mut kids = (*kids).clone();
            kids.sort();
            return Err(MigrateError::BranchedGraph {
                parent: parent.to_string(),
                children: kids,
            });
        }

        let mut order = vec![root];
        while let Some(next) = order
            .last()
            .and_then(|id| children.get(id))
            .and_then(|kids| kids.first())
            .cloned()
        {
            order.push(next);
        }

        if order.len() != by_id.len() {
            // The chain from the root misses a detached cycle; report the root
            // next to the lowest id of the unreachable part.
            let mut unreachable: Vec<&String> =
                by_id.keys().filter(|id| !order.contains(id)).collect();
            unreachable.sort();
            return Err(MigrateError::DisjointGraph {
                roots: vec![order[0].clone(), unreachable[0].clone()],
            });
        }

        Ok(Self {
            revisions: by_id,
            order,
        })
    }

    pub fn get(&self, id: &str) -> Result<&Revision> {
        self.revisions
            .get(id)
            .ok_or_else(|| MigrateError::UnknownRevision(id.to_string()))
    }

    pub fn contains(&self, id: &str) -> bool {
        self.revisions.contains_key(id)
    }

    pub fn root(&self) -> Option<&Revision> {
        self.order.first().and_then(|id| self.revisions.get(id))
    }

    pub fn head(&self) -> Option<&Revision> {
        self.order.last().and_then(|id| self.revisions.get(id))
    }

    /// Revisions from root to head.
    pub fn iter(&self) -> impl Iterator<Item = &Revision> {
        self.order.iter().filter_map(|id| self.revisions.get(id))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Index in root-to-head order; `None` means base.
    pub(crate) fn position(&self, id: Option<&str>) -> Result<Option<usize>> {
        match id {
            None => Ok(None),
            Some(id) => self
                .order
                .iter()
                .position(|candidate| candidate == id)
                .map(Some)
                .ok_or_else(|| MigrateError::UnknownRevision(id.to_string())),
        }
    }

    pub(crate) fn id_at(&self, position: usize) -> Option<&str> {
        self.order.get(position).map(String::as_str)
    }

    /// Ordered revisions taking a target from `current` to `target`, where
    /// `None` stands for base (nothing applied).
    ///
    /// Upgrades walk back from `target` until `current` and reverse the walk.
    /// Downgrades walk back from `current` until `target` and keep that order.
    pub fn path_from(&self, current: Option<&str>, target: Option<&str>) -> Result<MigrationPath<'_>> {
        for id in [current, target].into_iter().flatten() {
            self.get(id)?;
        }

        if current == target {
            return Ok(MigrationPath::new(Direction::Upgrade, current, target, Vec::new()));
        }

        if let Some(mut steps) = self.walk_back(target, current)? {
            steps.reverse();
            return Ok(MigrationPath::new(Direction::Upgrade, current, target, steps));
        }

        if let Some(steps) = self.walk_back(current, target)? {
            return Ok(MigrationPath::new(Direction::Downgrade, current, target, steps));
        }

        Err(MigrateError::DisjointGraph {
            roots: self.root().map(|r| vec![r.id().to_string()]).unwrap_or_default(),
        })
    }

    /// Revisions met walking parent pointers from `start` (inclusive) until
    /// `stop` (exclusive). `None` when `stop` is not an ancestor of `start`.
    fn walk_back(&self, start: Option<&str>, stop: Option<&str>) -> Result<Option<Vec<&Revision>>> {
        let mut steps = Vec::new();
        let mut cursor = start;
        while cursor != stop {
            let Some(id) = cursor else {
                return Ok(None);
            };
            let revision = self.get(id)?;
            steps.push(revision);
            cursor = revision.parent_id();
        }
        Ok(Some(steps))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chain(ids: &[&str]) -> Vec<Revision> {
        let mut parent = None;
        let mut revisions = Vec::new();
        for id in ids {
            revisions.push(Revision::new(*id, parent));
            parent = Some(*id);
        }
        revisions
    }

    fn ids(path: &MigrationPath<'_>) -> Vec<String> {
        path.steps.iter().map(|r| r.id().to_string()).collect()
    }

    #[test]
    fn test_order_is_root_to_head() {
        let mut revisions = chain(&["r0", "r1", "r2"]);
        revisions.reverse();
        let graph = RevisionGraph::new(revisions).unwrap();
        let order: Vec<&str> = graph.iter().map(Revision::id).collect();
        assert_eq!(order, vec!["r0", "r1", "r2"]);
        assert_eq!(graph.root().unwrap().id(), "r0");
        assert_eq!(graph.head().unwrap().id(), "r2");
    }

    #[test]
    fn test_upgrade_path() {
        let graph = RevisionGraph::new(chain(&["r0", "r1", "r2", "r3"])).unwrap();
        let path = graph.path_from(Some("r1"), Some("r3")).unwrap();
        assert_eq!(path.direction, Direction::Upgrade);
        assert_eq!(ids(&path), vec!["r2", "r3"]);

        let from_base = graph.path_from(None, Some("r1")).unwrap();
        assert_eq!(ids(&from_base), vec!["r0", "r1"]);
    }

    #[test]
    fn test_downgrade_path() {
        let graph = RevisionGraph::new(chain(&["r0", "r1", "r2", "r3"])).unwrap();
        let path = graph.path_from(Some("r3"), Some("r1")).unwrap();
        assert_eq!(path.direction, Direction::Downgrade);
        assert_eq!(ids(&path), vec!["r3", "r2"]);
        assert_eq!(path.resulting_revision(path.steps[1]), Some("r1"));

        let to_base = graph.path_from(Some("r1"), None).unwrap();
        assert_eq!(ids(&to_base), vec!["r1", "r0"]);
        assert_eq!(to_base.resulting_revision(to_base.steps[1]), None);
    }

    #[test]
    fn test_same_point_is_empty() {
        let graph = RevisionGraph::new(chain(&["r0", "r1"])).unwrap();
        assert!(graph.path_from(Some("r1"), Some("r1")).unwrap().is_empty());
        assert!(graph.path_from(None, None).unwrap().is_empty());
    }

    #[test]
    fn test_unknown_ids() {
        let graph = RevisionGraph::new(chain(&["r0", "r1"])).unwrap();
        assert!(matches!(
            graph.path_from(Some("r0"), Some("nope")),
            Err(MigrateError::UnknownRevision(id)) if id == "nope"
        ));
        assert!(matches!(
            graph.path_from(Some("nope"), None),
            Err(MigrateError::UnknownRevision(_))
        ));
    }

    #[test]
    fn test_two_roots_are_disjoint() {
        let err = RevisionGraph::new(vec![Revision::new("a", None), Revision::new("b", None)])
            .unwrap_err();
        assert!(matches!(err, MigrateError::DisjointGraph { roots } if roots == vec!["a", "b"]));
    }

    #[test]
    fn test_dangling_parent() {
        let err = RevisionGraph::new(vec![
            Revision::new("d4d2b2fce5f8", Some("3fb13bacd9e0")),
        ])
        .unwrap_err();
        assert!(matches!(err, MigrateError::UnknownRevision(id) if id == "3fb13bacd9e0"));
    }

    #[test]
    fn test_branch_is_rejected() {
        let err = RevisionGraph::new(vec![
            Revision::new("r0", None),
            Revision::new("r1b", Some("r0")),
            Revision::new("r1a", Some("r0")),
        ])
        .unwrap_err();
        assert!(matches!(
            err,
            MigrateError::BranchedGraph { parent, children }
                if parent == "r0" && children == vec!["r1a", "r1b"]
        ));
    }

    #[test]
    fn test_cycles() {
        let no_root = RevisionGraph::new(vec![
            Revision::new("a", Some("b")),
            Revision::new("b", Some("a")),
        ])
        .unwrap_err();
        assert!(matches!(no_root, MigrateError::CycleDetected(_)));

        let detached = RevisionGraph::new(vec![
            Revision::new("r0", None),
            Revision::new("x", Some("y")),
            Revision::new("y", Some("x")),
        ])
        .unwrap_err();
        assert!(matches!(
            detached,
            MigrateError::DisjointGraph { roots } if roots == vec!["r0", "x"]
        ));
    }

    #[test]
    fn test_duplicate_ids() {
        let err = RevisionGraph::new(vec![Revision::new("r0", None), Revision::new("r0", None)])
            .unwrap_err();
        assert!(matches!(err, MigrateError::DuplicateRevision(id) if id == "r0"));
    }
}
