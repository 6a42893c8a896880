//! Signature extraction: reduce raw input to one marker string per group

use crate::error::AnnotatorError;
use celltyper_domain::{AnnotationInput, DifferentialRow, GeneList, GroupSignature};
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Rows above this adjusted p-value are not markers
pub const P_VAL_ADJ_THRESHOLD: f64 = 0.05;

/// Turn any input into ordered group signatures
///
/// Groups keep input order: first-appearance order of clusters for tables,
/// list order for gene lists.
pub fn extract_signatures(
    input: &AnnotationInput,
    top_gene_number: usize,
) -> Result<Vec<GroupSignature>, AnnotatorError> {
    let signatures = match input {
        AnnotationInput::DifferentialTable(rows) => from_differential_table(rows, top_gene_number),
        AnnotationInput::GeneLists(lists) => from_gene_lists(lists)?,
    };
    debug!(
        "Extracted {} signatures from {}",
        signatures.len(),
        input.kind()
    );
    Ok(signatures)
}

/// True if a row counts as a positive, significant marker
pub fn is_positive_marker(row: &DifferentialRow) -> bool {
    row.p_val_adj <= P_VAL_ADJ_THRESHOLD && row.avg_log2fc > 0.0
}

/// Build signatures from a differential-expression table
///
/// Keeps positive significant markers, ranks each cluster by descending
/// fold change and keeps the top `top_gene_number`. A cluster with no
/// passing rows still gets an (empty) signature.
pub fn from_differential_table(
    rows: &[DifferentialRow],
    top_gene_number: usize,
) -> Vec<GroupSignature> {
    let mut order: Vec<(&str, Vec<&DifferentialRow>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for row in rows {
        let slot = *index.entry(row.cluster.as_str()).or_insert_with(|| {
            order.push((row.cluster.as_str(), Vec::new()));
            order.len() - 1
        });
        if is_positive_marker(row) && !row.gene.trim().is_empty() {
            order[slot].1.push(row);
        }
    }

    order
        .into_iter()
        .map(|(cluster, mut markers)| {
            // Stable: ties keep table order
            markers.sort_by(|a, b| b.avg_log2fc.total_cmp(&a.avg_log2fc));
            let genes = markers
                .into_iter()
                .take(top_gene_number)
                .map(|row| row.gene.trim().to_string())
                .collect();
            GroupSignature::new(cluster, genes)
        })
        .collect()
}

/// Build signatures from named gene lists
///
/// Unnamed lists are identified by their 1-based position.
pub fn from_gene_lists(lists: &[GeneList]) -> Result<Vec<GroupSignature>, AnnotatorError> {
    let mut seen = HashSet::new();
    let mut signatures = Vec::with_capacity(lists.len());

    for (idx, list) in lists.iter().enumerate() {
        let name = list.name.trim();
        let group_id = if name.is_empty() {
            (idx + 1).to_string()
        } else {
            name.to_string()
        };

        if !seen.insert(group_id.clone()) {
            return Err(AnnotatorError::DuplicateGroup(group_id));
        }

        let genes = list
            .genes
            .iter()
            .map(|g| g.trim())
            .filter(|g| !g.is_empty())
            .map(str::to_string)
            .collect();
        signatures.push(GroupSignature::new(group_id, genes));
    }

    Ok(signatures)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(gene: &str, cluster: &str, fc: f64, p: f64) -> DifferentialRow {
        DifferentialRow::new(gene, cluster, fc, p)
    }

    #[test]
    fn test_one_signature_per_cluster_in_first_appearance_order() {
        let rows = vec![
            row("MS4A1", "2", 2.0, 0.0),
            row("CD3E", "0", 1.5, 0.0),
            row("CD79A", "2", 1.0, 0.0),
            row("LYZ", "1", 3.0, 0.0),
        ];
        let sigs = from_differential_table(&rows, 20);
        let ids: Vec<&str> = sigs.iter().map(|s| s.group_id()).collect();
        assert_eq!(ids, vec!["2", "0", "1"]);
        assert_eq!(sigs[0].joined(), "MS4A1,CD79A");
    }

    #[test]
    fn test_filters_non_significant_and_negative_markers() {
        let rows = vec![
            row("KEEP", "0", 1.0, 0.05),
            row("HIGHP", "0", 5.0, 0.051),
            row("NEG", "0", -2.0, 0.0),
            row("ZERO", "0", 0.0, 0.0),
        ];
        let sigs = from_differential_table(&rows, 20);
        assert_eq!(sigs.len(), 1);
        assert_eq!(sigs[0].joined(), "KEEP");
    }

    #[test]
    fn test_sorted_by_fold_change_and_truncated() {
        let rows = vec![
            row("G1", "0", 0.5, 0.01),
            row("G2", "0", 3.0, 0.01),
            row("G3", "0", 1.5, 0.01),
            row("G4", "0", 2.0, 0.01),
        ];
        let sigs = from_differential_table(&rows, 3);
        assert_eq!(sigs[0].joined(), "G2,G4,G3");
    }

    #[test]
    fn test_ties_keep_table_order() {
        let rows = vec![
            row("A", "0", 1.0, 0.01),
            row("B", "0", 1.0, 0.01),
            row("C", "0", 1.0, 0.01),
        ];
        let sigs = from_differential_table(&rows, 20);
        assert_eq!(sigs[0].joined(), "A,B,C");
    }

    #[test]
    fn test_fewer_genes_than_requested_has_no_placeholders() {
        let rows = vec![row("CD14", "mono", 2.0, 0.0)];
        let sigs = from_differential_table(&rows, 20);
        assert_eq!(sigs[0].joined(), "CD14");
        assert!(!sigs[0].joined().contains("NA"));
    }

    #[test]
    fn test_cluster_without_passing_genes_is_kept_empty() {
        let rows = vec![
            row("CD3E", "0", 1.0, 0.01),
            row("NOISE", "1", 1.0, 0.9),
            row("CD19", "2", 1.0, 0.01),
        ];
        let sigs = from_differential_table(&rows, 20);
        assert_eq!(sigs.len(), 3);
        assert_eq!(sigs[1].group_id(), "1");
        assert!(sigs[1].is_empty());
    }

    #[test]
    fn test_nan_rows_are_excluded() {
        let rows = vec![
            row("NANFC", "0", f64::NAN, 0.0),
            row("NANP", "0", 1.0, f64::NAN),
            row("OK", "0", 1.0, 0.0),
        ];
        let sigs = from_differential_table(&rows, 20);
        assert_eq!(sigs[0].joined(), "OK");
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let input = AnnotationInput::DifferentialTable(vec![
            row("CD3E", "0", 1.0, 0.01),
            row("CD4", "0", 2.0, 0.01),
            row("CD19", "1", 1.0, 0.01),
        ]);
        let first = extract_signatures(&input, 20).unwrap();
        let second = extract_signatures(&input, 20).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_gene_lists_join_directly() {
        let lists = vec![
            GeneList::new("A", ["CD3", "CD4"]),
            GeneList::new("B", ["CD19"]),
        ];
        let sigs = from_gene_lists(&lists).unwrap();
        assert_eq!(sigs[0].to_string(), "A:CD3,CD4");
        assert_eq!(sigs[1].to_string(), "B:CD19");
    }

    #[test]
    fn test_unnamed_gene_lists_use_position() {
        let lists = vec![
            GeneList::unnamed(["CD3"]),
            GeneList::new("custom", ["CD19"]),
            GeneList::unnamed(["LYZ", " ", "CD14"]),
        ];
        let sigs = from_gene_lists(&lists).unwrap();
        let ids: Vec<&str> = sigs.iter().map(|s| s.group_id()).collect();
        assert_eq!(ids, vec!["1", "custom", "3"]);
        assert_eq!(sigs[2].joined(), "LYZ,CD14");
    }

    #[test]
    fn test_duplicate_group_names_are_rejected() {
        let lists = vec![GeneList::new("A", ["CD3"]), GeneList::new("A", ["CD19"])];
        let result = from_gene_lists(&lists);
        assert!(matches!(result, Err(AnnotatorError::DuplicateGroup(id)) if id == "A"));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_rows() -> impl Strategy<Value = Vec<DifferentialRow>> {
        prop::collection::vec(
            (0u8..6, -4.0f64..4.0, prop_oneof![Just(0.05f64), 0.0f64..0.2]),
            0..200,
        )
        .prop_map(|specs| {
            specs
                .into_iter()
                .enumerate()
                .map(|(i, (cluster, fc, p))| {
                    DifferentialRow::new(format!("G{}", i), cluster.to_string(), fc, p)
                })
                .collect()
        })
    }

    proptest! {
        /// Property: each cluster appears once in first-appearance order,
        /// every kept gene passes the filter, and signatures are ranked
        /// and bounded
        #[test]
        fn test_table_signature_invariants(rows in arb_rows(), top in 1usize..25) {
            let sigs = from_differential_table(&rows, top);

            let mut clusters: Vec<&str> = Vec::new();
            for r in &rows {
                if !clusters.contains(&r.cluster.as_str()) {
                    clusters.push(&r.cluster);
                }
            }
            let ids: Vec<&str> = sigs.iter().map(|s| s.group_id()).collect();
            prop_assert_eq!(ids, clusters);

            for sig in &sigs {
                prop_assert!(sig.markers().len() <= top);

                let kept: Vec<&DifferentialRow> = sig
                    .markers()
                    .iter()
                    .filter_map(|gene| rows.iter().find(|r| &r.gene == gene))
                    .collect();
                prop_assert_eq!(kept.len(), sig.markers().len());
                for pair in kept.windows(2) {
                    prop_assert!(pair[0].avg_log2fc >= pair[1].avg_log2fc);
                }
                for r in &kept {
                    prop_assert!(is_positive_marker(r));
                    prop_assert_eq!(r.cluster.as_str(), sig.group_id());
                }

                let passing = rows
                    .iter()
                    .filter(|r| r.cluster == sig.group_id() && is_positive_marker(r))
                    .count();
                prop_assert_eq!(sig.markers().len(), passing.min(top));
            }
        }
    }
}
