//! Annotation results

/// The label assigned to one group
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelResult {
    /// Group identifier, as it appeared in the input
    pub group_id: String,

    /// Cell-type label returned by the model
    pub label: String,
}

impl LabelResult {
    /// Create a new label result
    pub fn new(group_id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            label: label.into(),
        }
    }
}

/// Outcome of an annotation run
///
/// Without a configured chat provider the run stops after prompt rendering
/// and hands back the prompt itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Annotation {
    /// Prompt-only mode: the full, unbatched prompt
    Prompt(String),

    /// Queried mode: one label per input group, in input order
    Labels(Vec<LabelResult>),
}

impl Annotation {
    /// The rendered prompt, if this is a prompt-only result
    pub fn as_prompt(&self) -> Option<&str> {
        match self {
            Annotation::Prompt(prompt) => Some(prompt),
            Annotation::Labels(_) => None,
        }
    }

    /// The labels, if this is a queried result
    pub fn labels(&self) -> Option<&[LabelResult]> {
        match self {
            Annotation::Prompt(_) => None,
            Annotation::Labels(labels) => Some(labels),
        }
    }

    /// Look up the label of a group
    pub fn label_for(&self, group_id: &str) -> Option<&str> {
        self.labels()?
            .iter()
            .find(|r| r.group_id == group_id)
            .map(|r| r.label.as_str())
    }
}
