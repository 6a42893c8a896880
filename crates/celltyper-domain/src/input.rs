//! Annotation inputs
//!
//! The two accepted input shapes are modelled as one tagged union so the
//! entry point resolves the shape once and nothing downstream re-checks it.

/// One row of a differential-expression table
///
/// Mirrors the columns produced by Seurat's `FindAllMarkers`: only the
/// fields the annotator reads are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct DifferentialRow {
    /// Gene symbol
    pub gene: String,

    /// Cluster (group) identifier
    pub cluster: String,

    /// Average log2 fold change of the gene in this cluster
    pub avg_log2fc: f64,

    /// Adjusted p-value, in [0, 1]
    pub p_val_adj: f64,
}

impl DifferentialRow {
    /// Create a new row
    pub fn new(
        gene: impl Into<String>,
        cluster: impl Into<String>,
        avg_log2fc: f64,
        p_val_adj: f64,
    ) -> Self {
        Self {
            gene: gene.into(),
            cluster: cluster.into(),
            avg_log2fc,
            p_val_adj,
        }
    }
}

/// A named collection of marker genes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneList {
    /// Group name; an empty name falls back to the 1-based position
    pub name: String,

    /// Marker genes, in the order given
    pub genes: Vec<String>,
}

impl GeneList {
    /// Create a named gene list
    pub fn new<I, S>(name: impl Into<String>, genes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            genes: genes.into_iter().map(Into::into).collect(),
        }
    }

    /// Create an unnamed gene list (identified by position)
    pub fn unnamed<I, S>(genes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(String::new(), genes)
    }
}

/// Input to an annotation run
#[derive(Debug, Clone, PartialEq)]
pub enum AnnotationInput {
    /// Raw marker-gene sets, one per group
    GeneLists(Vec<GeneList>),

    /// Differential-expression table, one row per gene per cluster
    DifferentialTable(Vec<DifferentialRow>),
}

impl AnnotationInput {
    /// Short name of the input shape, for log messages
    pub fn kind(&self) -> &'static str {
        match self {
            AnnotationInput::GeneLists(_) => "gene lists",
            AnnotationInput::DifferentialTable(_) => "differential table",
        }
    }
}
