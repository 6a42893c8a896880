//! Prompt rendering for cell-type identification

use celltyper_domain::GroupSignature;

/// Builds the instruction prompt for a set of groups
pub struct PromptBuilder<'a> {
    signatures: &'a [GroupSignature],
    tissue: String,
}

impl<'a> PromptBuilder<'a> {
    /// Create a new prompt builder over the given groups
    pub fn new(signatures: &'a [GroupSignature]) -> Self {
        Self {
            signatures,
            tissue: String::new(),
        }
    }

    /// Name the tissue the cells come from; `None` leaves it blank
    pub fn with_tissue(mut self, tissue: Option<&str>) -> Self {
        self.tissue = tissue.unwrap_or_default().to_string();
        self
    }

    /// Build the complete prompt
    ///
    /// One `<group_id>:<signature>` line per group follows the preamble, in
    /// group order.
    pub fn build(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(&format!(
            "Identify cell types of {} cells using the following markers separately for each row. \
             Only provide the cell type name. Do not show numbers before the name.\n",
            self.tissue
        ));
        prompt.push_str(MIXTURE_NOTE);

        for signature in self.signatures {
            prompt.push('\n');
            prompt.push_str(&signature.to_string());
        }

        prompt
    }
}

const MIXTURE_NOTE: &str = "Some can be a mixture of multiple cell types.";
