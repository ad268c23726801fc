use thiserror::Error;

/// Flat error enumeration covering every way a trace can fail to
/// categorize.
///
/// The numeric codes returned by [`CategorizerError::code`] are stable and
/// shared with the recording front-end: capacity overflows and structural
/// failures (codes 2–8) discard the current trace, while codes 10–18 flag
/// internal invariant violations that indicate a bug rather than bad input.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CategorizerError {
    /// Reserved for the external trace verifier; never produced here.
    #[error("trace checksum mismatch")]
    ChecksumMismatch,
    /// An untrusted subsequence was not a quadruple or a quintuple.
    #[error("untrusted subsequence length is not 4 or 5")]
    SubsequenceLength,
    #[error("too many clusters")]
    TooManyClusters,
    #[error("too many aggregations")]
    TooManyAggregations,
    #[error("too many outliers")]
    TooManyOutliers,
    #[error("too many first-hit records in one histogram pass")]
    TooManyHits,
    #[error("no cluster found")]
    NoCluster,
    /// Reserved: cluster overlap is reported as a flag on the result so the
    /// categorized output stays printable; the corrector is suppressed.
    #[error("overlapping clusters")]
    OverlappingClusters,
    #[error("histogram bin index out of range")]
    HistogramBinRange,
    #[error("cluster start bin out of range")]
    ClusterStartBin,
    #[error("cluster scan ended without a stop bin")]
    ClusterScan,
    #[error("cluster stop bin out of range")]
    ClusterStopBin,
    #[error("histogram bins not empty between passes")]
    BinsNotEmpty,
    #[error("outlier recount mismatch")]
    OutlierRecount,
    #[error("merged outlier table overflow")]
    MergedOutlierOverflow,
    #[error("aggregator scan out of step")]
    AggregatorScan,
    #[error("resorber triple sum above duration ceiling")]
    ResorberTripleSum,
}

impl CategorizerError {
    /// Stable numeric return code, as documented for the recorder glue.
    pub fn code(&self) -> u8 {
        match self {
            CategorizerError::ChecksumMismatch => 1,
            CategorizerError::SubsequenceLength => 2,
            CategorizerError::TooManyClusters => 3,
            CategorizerError::TooManyAggregations => 4,
            CategorizerError::TooManyOutliers => 5,
            CategorizerError::TooManyHits => 6,
            CategorizerError::NoCluster => 7,
            CategorizerError::OverlappingClusters => 8,
            CategorizerError::HistogramBinRange => 10,
            CategorizerError::ClusterStartBin => 11,
            CategorizerError::ClusterScan => 12,
            CategorizerError::ClusterStopBin => 13,
            CategorizerError::BinsNotEmpty => 14,
            CategorizerError::OutlierRecount => 15,
            CategorizerError::MergedOutlierOverflow => 16,
            CategorizerError::AggregatorScan => 17,
            CategorizerError::ResorberTripleSum => 18,
        }
    }

    /// True for codes 10–18: failures that should never occur on any input
    /// and indicate a defect in the categorizer itself.
    pub fn is_internal(&self) -> bool {
        self.code() >= 10
    }
}
