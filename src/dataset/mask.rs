//! In-batch negative masks.
//!
//! With in-batch negatives every other row's tail is treated as a negative for
//! the current row. Tails that are actually correct for the row's
//! (head, relation) must be masked out, or the loss pushes true facts apart.

use candle_core::{Device, Tensor};

use crate::data::TripletDict;
use crate::dataset::example::Example;
use crate::error::Result;

/// `[rows, cols]` u8 mask, 1 where column j's tail is a valid negative for row i.
///
/// With `col_exs == None` the columns are the rows themselves and the diagonal
/// (each row's own positive) is kept at 1.
pub fn construct_mask(
    row_exs: &[Example],
    col_exs: Option<&[Example]>,
    triplets: &TripletDict,
    device: &Device,
) -> Result<Tensor> {
    let positive_on_diagonal = col_exs.is_none();
    let col_exs = col_exs.unwrap_or(row_exs);
    let (num_row, num_col) = (row_exs.len(), col_exs.len());

    let mut mask = vec![0u8; num_row * num_col];
    for (i, row) in row_exs.iter().enumerate() {
        let known_tails = triplets
            .get_neighbors(&row.head_id, &row.relation)
            .filter(|tails| tails.len() > 1);

        for (j, col) in col_exs.iter().enumerate() {
            let valid = if positive_on_diagonal && i == j {
                true
            } else if row.tail_id == col.tail_id {
                false
            } else {
                !known_tails.is_some_and(|tails| tails.contains(&col.tail_id))
            };
            mask[i * num_col + j] = valid as u8;
        }
    }

    Ok(Tensor::from_vec(mask, (num_row, num_col), device)?)
}

/// `[rows]` u8 mask, 0 where the row's head is itself a known tail of its
/// (head, relation), so using the head as a negative would be wrong.
pub fn construct_self_negative_mask(
    exs: &[Example],
    triplets: &TripletDict,
    device: &Device,
) -> Result<Tensor> {
    let mask: Vec<u8> = exs
        .iter()
        .map(|ex| {
            let self_linked = triplets
                .get_neighbors(&ex.head_id, &ex.relation)
                .is_some_and(|tails| tails.contains(&ex.head_id));
            (!self_linked) as u8
        })
        .collect();
    let len = mask.len();
    Ok(Tensor::from_vec(mask, len, device)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Triplet;

    fn dict() -> TripletDict {
        TripletDict::from_triplets(&[
            Triplet::new("h1", "r", "t1"),
            Triplet::new("h1", "r", "t2"),
            Triplet::new("h2", "r", "t3"),
            Triplet::new("h3", "r", "h3"),
        ])
    }

    #[test]
    fn test_known_tails_masked() {
        let rows = vec![
            Example::new("h1", "r", "t1"),
            Example::new("h1", "r", "t2"),
            Example::new("h2", "r", "t3"),
        ];
        let mask = construct_mask(&rows, None, &dict(), &Device::Cpu).unwrap();
        let mask: Vec<Vec<u8>> = mask.to_vec2().unwrap();

        // t2 is also a true tail of (h1, r), so rows 0 and 1 mask each other
        assert_eq!(mask[0], vec![1, 0, 1]);
        assert_eq!(mask[1], vec![0, 1, 1]);
        // (h2, r) has a single tail, exact matches only
        assert_eq!(mask[2], vec![1, 1, 1]);
    }

    #[test]
    fn test_duplicate_tail_masked_off_diagonal() {
        let rows = vec![Example::new("h2", "r", "t3"), Example::new("hx", "q", "t3")];
        let mask = construct_mask(&rows, None, &dict(), &Device::Cpu).unwrap();
        let mask: Vec<Vec<u8>> = mask.to_vec2().unwrap();
        assert_eq!(mask, vec![vec![1, 0], vec![0, 1]]);
    }

    #[test]
    fn test_explicit_columns_have_no_diagonal() {
        let rows = vec![Example::new("h2", "r", "t3")];
        let cols = vec![Example::new("h2", "r", "t3"), Example::new("h1", "r", "t1")];
        let mask = construct_mask(&rows, Some(&cols), &dict(), &Device::Cpu).unwrap();
        let mask: Vec<Vec<u8>> = mask.to_vec2().unwrap();
        assert_eq!(mask, vec![vec![0, 1]]);
    }

    #[test]
    fn test_self_negative_mask() {
        let exs = vec![Example::new("h3", "r", "h3"), Example::new("h1", "r", "t1")];
        let mask = construct_self_negative_mask(&exs, &dict(), &Device::Cpu).unwrap();
        let mask: Vec<u8> = mask.to_vec1().unwrap();
        assert_eq!(mask, vec![0, 1]);
    }
}
