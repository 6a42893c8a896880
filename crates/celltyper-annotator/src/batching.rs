//! Batching of group signatures into bounded model requests

use celltyper_domain::GroupSignature;

/// A contiguous, ordered slice of groups sent in one request
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    /// Zero-based position of this batch
    pub index: usize,

    /// Groups in this batch, in input order
    pub signatures: &'a [GroupSignature],
}

impl<'a> Batch<'a> {
    /// Number of groups (and therefore expected labels)
    pub fn len(&self) -> usize {
        self.signatures.len()
    }

    /// True if the batch holds no groups
    pub fn is_empty(&self) -> bool {
        self.signatures.is_empty()
    }

    /// Group ids, in order
    pub fn group_ids(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.signatures.iter().map(|s| s.group_id())
    }
}

/// Splits signatures into batches of at most `max_batch_size`
pub struct Batcher {
    max_batch_size: usize,
}

impl Batcher {
    /// Create a new batcher; a zero size is treated as one
    pub fn new(max_batch_size: usize) -> Self {
        Self {
            max_batch_size: max_batch_size.max(1),
        }
    }

    /// Partition signatures into contiguous batches
    ///
    /// Every batch but the last holds exactly `max_batch_size` groups. No
    /// input yields no batches.
    pub fn partition<'a>(&self, signatures: &'a [GroupSignature]) -> Vec<Batch<'a>> {
        signatures
            .chunks(self.max_batch_size)
            .enumerate()
            .map(|(index, signatures)| Batch { index, signatures })
            .collect()
    }

    /// Number of batches `n` groups will need
    pub fn batch_count(&self, n: usize) -> usize {
        n.div_ceil(self.max_batch_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sigs(n: usize) -> Vec<GroupSignature> {
        (0..n)
            .map(|i| GroupSignature::new(i.to_string(), vec![format!("G{}", i)]))
            .collect()
    }

    #[test]
    fn test_no_groups_no_batches() {
        let batcher = Batcher::new(30);
        assert!(batcher.partition(&[]).is_empty());
        assert_eq!(batcher.batch_count(0), 0);
    }

    #[test]
    fn test_small_input_is_one_batch() {
        let batcher = Batcher::new(30);
        let groups = sigs(2);
        let batches = batcher.partition(&groups);
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
        assert_eq!(batches[0].index, 0);
    }

    #[test]
    fn test_exact_multiple() {
        let batcher = Batcher::new(30);
        let groups = sigs(60);
        let batches = batcher.partition(&groups);
        assert_eq!(batches.len(), 2);
        assert!(batches.iter().all(|b| b.len() == 30));
    }

    #[test]
    fn test_remainder_goes_last() {
        let batcher = Batcher::new(30);
        let groups = sigs(61);
        let batches = batcher.partition(&groups);
        let sizes: Vec<usize> = batches.iter().map(|b| b.len()).collect();
        assert_eq!(sizes, vec![30, 30, 1]);
        assert_eq!(batches[2].group_ids().collect::<Vec<_>>(), vec!["60"]);
    }

    #[test]
    fn test_zero_size_is_clamped() {
        let batcher = Batcher::new(0);
        let groups = sigs(3);
        assert_eq!(batcher.partition(&groups).len(), 3);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Property: batches cover every group once, in order, with
        /// ceil(n / size) batches all full except possibly the last
        #[test]
        fn test_partition_covers_input_in_order(n in 0usize..400, size in 1usize..50) {
            let groups: Vec<GroupSignature> = (0..n)
                .map(|i| GroupSignature::new(i.to_string(), Vec::new()))
                .collect();
            let batcher = Batcher::new(size);
            let batches = batcher.partition(&groups);

            prop_assert_eq!(batches.len(), n.div_ceil(size));
            prop_assert_eq!(batches.len(), batcher.batch_count(n));

            for (i, batch) in batches.iter().enumerate() {
                prop_assert_eq!(batch.index, i);
                if i + 1 < batches.len() {
                    prop_assert_eq!(batch.len(), size);
                } else {
                    prop_assert!(batch.len() >= 1 && batch.len() <= size);
                }
            }

            let flattened: Vec<&str> = batches.iter().flat_map(|b| b.group_ids()).collect();
            let expected: Vec<String> = (0..n).map(|i| i.to_string()).collect();
            prop_assert_eq!(flattened, expected.iter().map(String::as_str).collect::<Vec<_>>());
        }
    }
}
