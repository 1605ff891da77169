use std::fmt;
use std::str::FromStr;

use super::RevisionGraph;
use crate::core::{MigrateError, Result};

/// A user-supplied migration destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetSpec {
    /// Latest revision (`head`, `heads`, `latest`).
    Head,
    /// Nothing applied (`base`).
    Base,
    /// Steps relative to the current revision (`+2`, `-1`).
    Relative(i64),
    /// Full revision id or a unique prefix of one.
    Revision(String),
}

impl FromStr for TargetSpec {
    type Err = MigrateError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(MigrateError::UnknownRevision(String::new()));
        }
        match s.to_ascii_lowercase().as_str() {
            "head" | "heads" | "latest" => return Ok(Self::Head),
            "base" => return Ok(Self::Base),
            _ => {}
        }
        if s.starts_with('+') || s.starts_with('-') {
            let steps = s
                .parse::<i64>()
                .map_err(|_| MigrateError::UnknownRevision(s.to_string()))?;
            return Ok(Self::Relative(steps));
        }
        Ok(Self::Revision(s.to_string()))
    }
}

impl fmt::Display for TargetSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Head => write!(f, "head"),
            Self::Base => write!(f, "base"),
            Self::Relative(steps) => write!(f, "{:+}", steps),
            Self::Revision(id) => write!(f, "{}", id),
        }
    }
}

impl RevisionGraph {
    /// Resolve a full id or unique prefix to a known revision id.
    pub fn resolve_id(&self, prefix: &str) -> Result<&str> {
        if let Ok(revision) = self.get(prefix) {
            return Ok(revision.id());
        }
        let mut candidates: Vec<&str> = self
            .iter()
            .map(|r| r.id())
            .filter(|id| id.starts_with(prefix))
            .collect();
        match candidates.len() {
            0 => Err(MigrateError::UnknownRevision(prefix.to_string())),
            1 => Ok(candidates[0]),
            _ => {
                candidates.sort();
                Err(MigrateError::AmbiguousRevision {
                    prefix: prefix.to_string(),
                    candidates: candidates.into_iter().map(str::to_string).collect(),
                })
            }
        }
    }

    /// Turn a target spec into a concrete revision id (`None` = base),
    /// relative to `current`.
    pub fn resolve(&self, spec: &TargetSpec, current: Option<&str>) -> Result<Option<String>> {
        match spec {
            TargetSpec::Head => Ok(self.head().map(|r| r.id().to_string())),
            TargetSpec::Base => Ok(None),
            TargetSpec::Revision(prefix) => self.resolve_id(prefix).map(|id| Some(id.to_string())),
            TargetSpec::Relative(steps) => {
                // Base sits at -1, the root at 0.
                let position = match self.position(current)? {
                    Some(p) => p as i64,
                    None => -1,
                };
                let out_of_range = || {
                    MigrateError::UnknownRevision(format!(
                        "{}{:+}",
                        current.unwrap_or("base"),
                        steps
                    ))
                };
                let destination = position.checked_add(*steps).ok_or_else(out_of_range)?;
                if destination == -1 {
                    return Ok(None);
                }
                let index = usize::try_from(destination).map_err(|_| out_of_range())?;
                self.id_at(index)
                    .map(|id| Some(id.to_string()))
                    .ok_or_else(out_of_range)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::revision::Revision;

    fn graph() -> RevisionGraph {
        RevisionGraph::new(vec![
            Revision::new("3fb13bacd9e0", None),
            Revision::new("d4d2b2fce5f8", Some("3fb13bacd9e0")),
            Revision::new("d4d9aa000001", Some("d4d2b2fce5f8")),
        ])
        .unwrap()
    }

    #[test]
    fn test_parse_symbols() {
        assert_eq!("head".parse::<TargetSpec>().unwrap(), TargetSpec::Head);
        assert_eq!("LATEST".parse::<TargetSpec>().unwrap(), TargetSpec::Head);
        assert_eq!("base".parse::<TargetSpec>().unwrap(), TargetSpec::Base);
        assert_eq!("+2".parse::<TargetSpec>().unwrap(), TargetSpec::Relative(2));
        assert_eq!("-1".parse::<TargetSpec>().unwrap(), TargetSpec::Relative(-1));
        assert_eq!(
            "d4d2".parse::<TargetSpec>().unwrap(),
            TargetSpec::Revision("d4d2".to_string())
        );
        assert!("+x".parse::<TargetSpec>().is_err());
        assert!("".parse::<TargetSpec>().is_err());
    }

    #[test]
    fn test_prefix_resolution() {
        let graph = graph();
        assert_eq!(graph.resolve_id("3f").unwrap(), "3fb13bacd9e0");
        assert_eq!(graph.resolve_id("d4d2").unwrap(), "d4d2b2fce5f8");
        assert!(matches!(
            graph.resolve_id("d4d"),
            Err(MigrateError::AmbiguousRevision { candidates, .. }) if candidates.len() == 2
        ));
        assert!(matches!(graph.resolve_id("ff"), Err(MigrateError::UnknownRevision(_))));
    }

    #[test]
    fn test_relative_resolution() {
        let graph = graph();
        assert_eq!(
            graph.resolve(&TargetSpec::Relative(1), None).unwrap().as_deref(),
            Some("3fb13bacd9e0")
        );
        assert_eq!(
            graph
                .resolve(&TargetSpec::Relative(2), Some("3fb13bacd9e0"))
                .unwrap()
                .as_deref(),
            Some("d4d9aa000001")
        );
        assert_eq!(
            graph.resolve(&TargetSpec::Relative(-1), Some("3fb13bacd9e0")).unwrap(),
            None
        );
        assert!(graph.resolve(&TargetSpec::Relative(-2), Some("3fb13bacd9e0")).is_err());
        assert!(graph.resolve(&TargetSpec::Relative(1), Some("d4d9aa000001")).is_err());
    }

    #[test]
    fn test_relative_steps_at_the_i64_limits() {
        let graph = graph();
        assert!(matches!(
            graph.resolve(&TargetSpec::Relative(i64::MAX), Some("d4d9aa000001")),
            Err(MigrateError::UnknownRevision(id)) if id == "d4d9aa000001+9223372036854775807"
        ));
        assert!(graph.resolve(&TargetSpec::Relative(i64::MIN), None).is_err());
        assert_eq!(
            "+9223372036854775807".parse::<TargetSpec>().unwrap(),
            TargetSpec::Relative(i64::MAX)
        );
    }

    #[test]
    fn test_head_and_base() {
        let graph = graph();
        assert_eq!(
            graph.resolve(&TargetSpec::Head, None).unwrap().as_deref(),
            Some("d4d9aa000001")
        );
        assert_eq!(graph.resolve(&TargetSpec::Base, Some("d4d2b2fce5f8")).unwrap(), None);
    }
}
