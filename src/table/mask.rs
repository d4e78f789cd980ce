//! Boolean mask reduction and filtering

use arrow::array::{Array, BooleanArray};
use arrow::compute::prep_null_mask_filter;

use super::Column;
use crate::scalar::Scalar;

/// Replaces null slots with `false`.
pub fn settle(mask: BooleanArray) -> BooleanArray {
    if mask.null_count() > 0 {
        prep_null_mask_filter(&mask)
    } else {
        mask
    }
}

/// True if any slot is set.
pub fn any(mask: &BooleanArray) -> bool {
    mask.true_count() > 0
}

/// Number of set slots.
pub fn sum(mask: &BooleanArray) -> usize {
    mask.true_count()
}

/// Positions of set slots, in row order.
pub fn positions(mask: &BooleanArray) -> Vec<usize> {
    mask.iter()
        .enumerate()
        .filter_map(|(i, v)| (v == Some(true)).then_some(i))
        .collect()
}

/// First `limit` set rows as (row label, value) pairs.
pub fn filter_head<C: Column + ?Sized>(
    column: &C,
    mask: &BooleanArray,
    limit: usize,
) -> Vec<(usize, Scalar)> {
    positions(mask)
        .into_iter()
        .take(limit)
        .map(|pos| (column.row_label(pos), column.value(pos)))
        .collect()
}
