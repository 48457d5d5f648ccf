mod columns;
mod normalize;
mod table;

pub(crate) use normalize::{Normalized, Normalizer};
pub(crate) use table::RawTable;
