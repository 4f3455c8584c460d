use crate::error::RemapError;

/// A bijective renumbering of global parameters: `canonical id -> target id` over `0..N`.
///
/// Tables can only be constructed through checked constructors, so an existing table is always a bijection over
/// `0..len()`. [`Mesh::apply_remap`](super::Mesh::apply_remap) additionally checks that `len()` matches the Mesh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemapTable {
    targets: Vec<usize>,
}

impl RemapTable {
    /// The table which leaves every id in place
    pub fn identity(len: usize) -> Self {
        Self {
            targets: (0..len).collect(),
        }
    }

    /// Build a table from `(canonical, target)` pairs, as written out for hand-derived orderings
    ///
    /// The pairs may be given in any order, but every source and every target in `0..pairs.len()` must appear
    /// exactly once.
    pub fn from_pairs<I>(pairs: I) -> Result<Self, RemapError>
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        let pairs: Vec<(usize, usize)> = pairs.into_iter().collect();
        let len = pairs.len();

        let mut targets: Vec<Option<usize>> = vec![None; len];
        for (source, target) in pairs {
            if source >= len {
                return Err(RemapError::SourceOutOfRange { id: source, len });
            }
            if targets[source].replace(target).is_some() {
                return Err(RemapError::DuplicateSource(source));
            }
        }

        Self::from_partial(targets)
    }

    /// Build a table from a list of targets indexed by canonical id
    pub fn from_targets(targets: Vec<usize>) -> Result<Self, RemapError> {
        check_targets(&targets)?;
        Ok(Self { targets })
    }

    /// Build a table from a list of (possibly missing) targets indexed by canonical id
    pub fn from_partial(targets: Vec<Option<usize>>) -> Result<Self, RemapError> {
        let targets = targets
            .into_iter()
            .enumerate()
            .map(|(source, target)| target.ok_or(RemapError::MissingSource(source)))
            .collect::<Result<Vec<_>, _>>()?;

        Self::from_targets(targets)
    }

    /// Check that this table renumbers exactly `num_params` global parameters
    pub fn validate(&self, num_params: usize) -> Result<(), RemapError> {
        if self.targets.len() != num_params {
            return Err(RemapError::WrongSize {
                expected: num_params,
                found: self.targets.len(),
            });
        }
        check_targets(&self.targets)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    /// Get the new id of a canonical id
    ///
    /// Panics if `source` is out of range
    pub fn target(&self, source: usize) -> usize {
        self.targets[source]
    }

    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    /// Iterate over `(canonical, target)` pairs in canonical order
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.targets.iter().copied().enumerate()
    }

    /// The table which undoes this one
    pub fn inverse(&self) -> Self {
        let mut sources = vec![0; self.targets.len()];
        for (source, target) in self.pairs() {
            sources[target] = source;
        }
        Self { targets: sources }
    }
}

fn check_targets(targets: &[usize]) -> Result<(), RemapError> {
    let len = targets.len();
    let mut seen = vec![false; len];

    for &target in targets {
        if target >= len {
            return Err(RemapError::TargetOutOfRange { id: target, len });
        }
        if std::mem::replace(&mut seen[target], true) {
            return Err(RemapError::DuplicateTarget(target));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pairs_in_any_order() {
        let table = RemapTable::from_pairs([(2, 0), (0, 1), (1, 2)]).unwrap();
        assert_eq!(table.targets(), &[1, 2, 0]);
        assert_eq!(table.inverse().targets(), &[2, 0, 1]);
        assert!(table.validate(3).is_ok());
    }

    #[test]
    fn rejects_non_bijections() {
        assert_eq!(
            RemapTable::from_pairs([(0, 0), (0, 1)]),
            Err(RemapError::DuplicateSource(0))
        );
        assert_eq!(
            RemapTable::from_pairs([(0, 1), (3, 0)]),
            Err(RemapError::SourceOutOfRange { id: 3, len: 2 })
        );
        assert_eq!(
            RemapTable::from_targets(vec![0, 2, 2]),
            Err(RemapError::DuplicateTarget(2))
        );
        assert_eq!(
            RemapTable::from_targets(vec![0, 3, 1]),
            Err(RemapError::TargetOutOfRange { id: 3, len: 3 })
        );
        assert_eq!(
            RemapTable::from_partial(vec![Some(1), None, Some(0)]),
            Err(RemapError::MissingSource(1))
        );
    }

    #[test]
    fn size_is_checked() {
        let table = RemapTable::identity(4);
        assert_eq!(
            table.validate(5),
            Err(RemapError::WrongSize {
                expected: 5,
                found: 4
            })
        );
        assert!(RemapTable::identity(0).is_empty());
    }
}
