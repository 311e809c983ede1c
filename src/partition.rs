use crate::model::{Category, Record};

/// An entity's records split into the two pricing categories.
///
/// Category membership is an exact match on the record's category field;
/// values outside the two known categories were already logged and dropped
/// at ingest, so the partition is exact by construction: the two subsets
/// are disjoint and their union is the input.
#[derive(Debug, Clone)]
pub struct Partitioned<'a> {
    pub basement: Vec<&'a Record>,
    pub attic: Vec<&'a Record>,
}

/// Splits the record subset by pricing category, preserving input order.
pub fn partition<'a>(records: &[&'a Record]) -> Partitioned<'a> {
    let (basement, attic) = records
        .iter()
        .copied()
        .partition(|record| record.category == Category::Basement);
    Partitioned { basement, attic }
}
