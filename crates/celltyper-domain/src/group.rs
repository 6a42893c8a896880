//! Group signatures - the compact marker representation of one group

use std::fmt;

/// Separator used between marker genes in a signature
pub const MARKER_SEPARATOR: &str = ",";

/// The marker signature of a single group
///
/// Created once by signature extraction and immutable afterwards. The
/// joined form is computed eagerly so that prompt rendering never has to
/// re-join the markers.
///
/// # Examples
///
/// ```
/// use celltyper_domain::GroupSignature;
///
/// let sig = GroupSignature::new("0", vec!["CD3E".to_string(), "CD4".to_string()]);
/// assert_eq!(sig.joined(), "CD3E,CD4");
/// assert_eq!(sig.to_string(), "0:CD3E,CD4");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSignature {
    group_id: String,
    markers: Vec<String>,
    joined: String,
}

impl GroupSignature {
    /// Create a signature from a group id and its ordered markers
    pub fn new(group_id: impl Into<String>, markers: Vec<String>) -> Self {
        let joined = markers.join(MARKER_SEPARATOR);
        Self {
            group_id: group_id.into(),
            markers,
            joined,
        }
    }

    /// Group identifier (cluster name or gene-set name)
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Ordered marker genes
    pub fn markers(&self) -> &[String] {
        &self.markers
    }

    /// Comma-joined marker string
    pub fn joined(&self) -> &str {
        &self.joined
    }

    /// True when no marker survived extraction
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

impl fmt::Display for GroupSignature {
    /// Prompt line form: `<group_id>:<signature>`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.group_id, self.joined)
    }
}
