//! Normalise free-text model output into labels

use crate::batching::Batch;
use celltyper_domain::LabelResult;

/// Split a model reply into raw label lines
///
/// Carriage returns are tolerated and trailing blank lines (a terminating
/// newline, for instance) are dropped; blank lines elsewhere are kept
/// because they still occupy a group's slot.
pub fn split_reply(reply: &str) -> Vec<&str> {
    let mut lines: Vec<&str> = reply
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    while lines.last().is_some_and(|line| line.trim().is_empty()) {
        lines.pop();
    }
    lines
}

/// Clean one raw line into a label
///
/// Strips a leading `<digits>.` enumeration and the whitespace after it,
/// trims, then drops a single trailing comma.
pub fn normalize_label(raw: &str) -> String {
    let label = strip_enumeration(raw.trim_start()).trim();
    label
        .strip_suffix(',')
        .unwrap_or(label)
        .trim_end()
        .to_string()
}

fn strip_enumeration(line: &str) -> &str {
    let digits = line.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return line;
    }
    match line[digits..].strip_prefix('.') {
        Some(rest) => rest.trim_start(),
        None => line,
    }
}

/// Pair accepted lines with the batch's group ids, in order
///
/// The caller guarantees `lines.len() == batch.len()`.
pub fn label_batch(batch: &Batch<'_>, lines: &[String]) -> Vec<LabelResult> {
    batch
        .group_ids()
        .zip(lines)
        .map(|(group_id, line)| LabelResult::new(group_id, normalize_label(line)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use celltyper_domain::GroupSignature;

    #[test]
    fn test_strips_enumeration() {
        assert_eq!(normalize_label("1. T cells"), "T cells");
        assert_eq!(normalize_label(" 2.  B cells "), "B cells");
        assert_eq!(normalize_label("12.NK cells"), "NK cells");
    }

    #[test]
    fn test_leaves_unnumbered_labels_alone() {
        assert_eq!(normalize_label("CD8+ T cells"), "CD8+ T cells");
        assert_eq!(normalize_label("10x B cells"), "10x B cells");
        assert_eq!(normalize_label(""), "");
    }

    #[test]
    fn test_strips_single_trailing_comma_per_label() {
        assert_eq!(normalize_label("Monocytes,"), "Monocytes");
        assert_eq!(normalize_label("3. Monocytes, "), "Monocytes");
        assert_eq!(normalize_label("Odd,,"), "Odd,");
        // Commas inside a label are content
        assert_eq!(normalize_label("T cells, activated"), "T cells, activated");
    }

    #[test]
    fn test_trailing_comma_is_trimmed_per_label_not_once_overall() {
        // Trimming the joined output once would leave "T cell," on the
        // first label; per-label trimming cleans every line.
        let labels: Vec<String> = split_reply("T cell,\nB cell,")
            .into_iter()
            .map(normalize_label)
            .collect();
        assert_eq!(labels, vec!["T cell", "B cell"]);
    }

    #[test]
    fn test_split_reply_counts_lines() {
        assert_eq!(split_reply("T cell\nB cell"), vec!["T cell", "B cell"]);
        assert_eq!(split_reply("T cell\r\nB cell\r\n"), vec!["T cell", "B cell"]);
        assert_eq!(split_reply("T cell\n\nB cell"), vec!["T cell", "", "B cell"]);
        assert!(split_reply("").is_empty());
        assert!(split_reply("\n\n").is_empty());
    }

    #[test]
    fn test_label_batch_zips_in_order() {
        let groups = vec![
            GroupSignature::new("A", vec!["CD3".to_string()]),
            GroupSignature::new("B", vec!["CD19".to_string()]),
        ];
        let batch = Batch { index: 0, signatures: &groups };
        let lines = vec!["1. T cell".to_string(), "2. B cell,".to_string()];

        let labels = label_batch(&batch, &lines);
        assert_eq!(
            labels,
            vec![LabelResult::new("A", "T cell"), LabelResult::new("B", "B cell")]
        );
    }
}
