//! [`PartitionPlan`]: deterministic assignment of an ordered agent-type list
//! to worker ranks (spec.md §3 "Partition plan", §4.8).

use rustc_hash::FxHashMap;

use pert_core::Rank;

use crate::error::{PartitionError, PartitionResult};

/// Worker `r` owns agent types at indices `[r*W, (r+1)*W)` of the ordered
/// type list, where `W = ceil(|types| / num_ranks)`; the last worker takes
/// whatever remains (possibly fewer than `W`, never more).
#[derive(Clone, Debug)]
pub struct PartitionPlan {
    types: Vec<String>,
    num_ranks: usize,
    slice_len: usize,
    rank_of: FxHashMap<String, Rank>,
}

impl PartitionPlan {
    /// Build the plan for `types` (in caller-supplied, stable order) split
    /// across `num_ranks` workers.
    pub fn new(types: &[String], num_ranks: usize) -> PartitionResult<Self> {
        if num_ranks == 0 {
            return Err(PartitionError::InvalidRankCount { type_count: types.len(), num_ranks });
        }

        let slice_len = types.len().div_ceil(num_ranks).max(1);
        let mut rank_of = FxHashMap::default();
        for (rank, chunk) in types.chunks(slice_len).enumerate() {
            for type_name in chunk {
                rank_of.insert(type_name.clone(), Rank(rank as u16));
            }
        }

        Ok(Self { types: types.to_vec(), num_ranks, slice_len, rank_of })
    }

    pub fn num_ranks(&self) -> usize {
        self.num_ranks
    }

    pub fn types(&self) -> &[String] {
        &self.types
    }

    /// The rank that owns `type_name`, or `None` if it is not in the type
    /// list this plan was built from.
    pub fn rank_of(&self, type_name: &str) -> Option<Rank> {
        self.rank_of.get(type_name).copied()
    }

    pub fn try_rank_of(&self, type_name: &str) -> PartitionResult<Rank> {
        self.rank_of(type_name).ok_or_else(|| PartitionError::TypeNotOwned(type_name.to_string()))
    }

    /// The contiguous slice of types owned by `rank` (empty if `rank` is
    /// beyond the last non-empty chunk).
    pub fn types_for_rank(&self, rank: Rank) -> &[String] {
        let start = (rank.0 as usize) * self.slice_len;
        if start >= self.types.len() {
            return &[];
        }
        let end = (start + self.slice_len).min(self.types.len());
        &self.types[start..end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn types(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("Type{i}")).collect()
    }

    #[test]
    fn evenly_divisible_split() {
        let plan = PartitionPlan::new(&types(4), 2).unwrap();
        assert_eq!(plan.types_for_rank(Rank(0)), &["Type0", "Type1"]);
        assert_eq!(plan.types_for_rank(Rank(1)), &["Type2", "Type3"]);
    }

    #[test]
    fn last_worker_takes_remainder() {
        let plan = PartitionPlan::new(&types(5), 2).unwrap();
        // W = ceil(5/2) = 3
        assert_eq!(plan.types_for_rank(Rank(0)), &["Type0", "Type1", "Type2"]);
        assert_eq!(plan.types_for_rank(Rank(1)), &["Type3", "Type4"]);
    }

    #[test]
    fn every_type_is_owned_by_exactly_one_rank() {
        let t = types(7);
        let plan = PartitionPlan::new(&t, 3).unwrap();
        for name in &t {
            assert!(plan.rank_of(name).is_some());
        }
    }

    #[test]
    fn no_rank_exceeds_the_ceiling() {
        let t = types(10);
        let num_ranks = 3;
        let plan = PartitionPlan::new(&t, num_ranks).unwrap();
        let ceiling = t.len().div_ceil(num_ranks);
        for r in 0..num_ranks {
            assert!(plan.types_for_rank(Rank(r as u16)).len() <= ceiling);
        }
    }

    #[test]
    fn zero_ranks_rejected() {
        assert!(PartitionPlan::new(&types(3), 0).is_err());
    }

    #[test]
    fn unknown_type_not_owned() {
        let plan = PartitionPlan::new(&types(2), 2).unwrap();
        assert!(plan.rank_of("Nonexistent").is_none());
        assert!(plan.try_rank_of("Nonexistent").is_err());
    }
}
