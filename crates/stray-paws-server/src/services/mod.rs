pub(crate) mod enrichment;
pub(crate) mod placement;
