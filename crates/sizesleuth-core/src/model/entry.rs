/// A path paired with its size, and the ordering used to rank them.
///
/// Ranking is descending by size. Equal sizes are ordered by ascending
/// path so that results do not depend on the order in which the
/// filesystem happened to list entries.
use serde::Serialize;
use std::cmp::Ordering;
use std::path::PathBuf;

/// A file or directory and its size in bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SizedEntry {
    pub path: PathBuf,
    pub size: u64,
}

impl SizedEntry {
    pub fn new(path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            path: path.into(),
            size,
        }
    }

    /// Ordering in which `self` should be listed relative to `other`:
    /// `Less` means `self` ranks first.
    pub fn rank_cmp(&self, other: &Self) -> Ordering {
        other
            .size
            .cmp(&self.size)
            .then_with(|| self.path.cmp(&other.path))
    }
}

/// Entries ordered descending by size, at most as long as the requested limit.
pub type RankedResult = Vec<SizedEntry>;

/// Wrapper whose `Ord` says "ranks higher": larger size wins, and on equal
/// sizes the lexicographically smaller path wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByRank(pub SizedEntry);

impl Ord for ByRank {
    fn cmp(&self, other: &Self) -> Ordering {
        other.0.rank_cmp(&self.0)
    }
}

impl PartialOrd for ByRank {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Sort into rank order and keep the first `limit` entries.
pub fn sort_ranked(entries: &mut RankedResult, limit: usize) {
    entries.sort_by(SizedEntry::rank_cmp);
    entries.truncate(limit);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rank_cmp_larger_first() {
        let big = SizedEntry::new("/b", 200);
        let small = SizedEntry::new("/a", 100);
        assert_eq!(big.rank_cmp(&small), Ordering::Less);
        assert!(ByRank(big) > ByRank(small));
    }

    #[test]
    fn test_rank_cmp_ties_by_path() {
        let a = SizedEntry::new("/a", 100);
        let b = SizedEntry::new("/b", 100);
        assert_eq!(a.rank_cmp(&b), Ordering::Less);
        assert!(ByRank(a) > ByRank(b));
    }

    #[test]
    fn test_sort_ranked_truncates() {
        let mut entries = vec![
            SizedEntry::new("/c", 10),
            SizedEntry::new("/a", 30),
            SizedEntry::new("/b", 30),
            SizedEntry::new("/d", 20),
        ];
        sort_ranked(&mut entries, 3);
        let paths: Vec<_> = entries.iter().map(|e| e.path.to_str().unwrap()).collect();
        assert_eq!(paths, ["/a", "/b", "/d"]);
    }
}
