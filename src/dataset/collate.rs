//! Padding vectorized examples into model-ready tensors.

use candle_core::{Device, Tensor};

use crate::dataset::example::{Example, VectorizedExample};
use crate::dataset::mask::{construct_mask, construct_self_negative_mask};
use crate::error::{CakeError, Result};
use crate::hub::DataHub;

/// One padded batch. Token tensors are `[batch, max_len]` u32, masks are u8.
#[derive(Debug, Clone)]
pub struct Batch {
    pub hr_token_ids: Tensor,
    pub hr_mask: Tensor,
    pub hr_token_type_ids: Tensor,
    pub tail_token_ids: Tensor,
    pub tail_mask: Tensor,
    pub tail_token_type_ids: Tensor,
    pub head_token_ids: Tensor,
    pub head_mask: Tensor,
    pub head_token_type_ids: Tensor,
    pub batch_data: Vec<Example>,
    /// `[batch, batch]`; None in evaluation mode
    pub triplet_mask: Option<Tensor>,
    /// `[batch]`; None in evaluation mode
    pub self_negative_mask: Option<Tensor>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.batch_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batch_data.is_empty()
    }
}

/// Pad every field of `batch_data` to the batch maximum and attach negative masks.
pub fn collate(batch_data: &[VectorizedExample], hub: &DataHub) -> Result<Batch> {
    if batch_data.is_empty() {
        return Err(CakeError::EmptyBatch);
    }
    let pad_token_id = hub.tokenizer().pad_token_id();
    let device = hub.device();

    let (hr_token_ids, hr_mask) = to_indices_and_mask(
        &column(batch_data, |ex| ex.hr.input_ids.as_slice()),
        pad_token_id,
        device,
    )?;
    let hr_token_type_ids = to_indices(
        &column(batch_data, |ex| ex.hr.token_type_ids.as_slice()),
        0,
        device,
    )?;

    let (tail_token_ids, tail_mask) = to_indices_and_mask(
        &column(batch_data, |ex| ex.tail.input_ids.as_slice()),
        pad_token_id,
        device,
    )?;
    let tail_token_type_ids = to_indices(
        &column(batch_data, |ex| ex.tail.token_type_ids.as_slice()),
        0,
        device,
    )?;

    let (head_token_ids, head_mask) = to_indices_and_mask(
        &column(batch_data, |ex| ex.head.input_ids.as_slice()),
        pad_token_id,
        device,
    )?;
    let head_token_type_ids = to_indices(
        &column(batch_data, |ex| ex.head.token_type_ids.as_slice()),
        0,
        device,
    )?;

    let batch_exs: Vec<Example> = batch_data.iter().map(|ex| ex.example.clone()).collect();
    let (triplet_mask, self_negative_mask) = if hub.config().is_test {
        (None, None)
    } else {
        (
            Some(construct_mask(&batch_exs, None, hub.triplet_dict(), device)?),
            Some(construct_self_negative_mask(
                &batch_exs,
                hub.triplet_dict(),
                device,
            )?),
        )
    };

    Ok(Batch {
        hr_token_ids,
        hr_mask,
        hr_token_type_ids,
        tail_token_ids,
        tail_mask,
        tail_token_type_ids,
        head_token_ids,
        head_mask,
        head_token_type_ids,
        batch_data: batch_exs,
        triplet_mask,
        self_negative_mask,
    })
}

/// Collate a batch that arrives pre-grouped, as with the relation sampler:
/// only the first group is used.
pub fn collate_grouped(batch_data: &[Vec<VectorizedExample>], hub: &DataHub) -> Result<Batch> {
    let group = batch_data.first().ok_or(CakeError::EmptyBatch)?;
    collate(group, hub)
}

/// Pad sequences to `[n, max_len]` with `pad_token_id` and build a u8 mask that
/// is 1 on real tokens.
pub fn to_indices_and_mask<S: AsRef<[u32]>>(
    batch: &[S],
    pad_token_id: u32,
    device: &Device,
) -> Result<(Tensor, Tensor)> {
    let (indices, mask, mx_len) = pad_rows(batch, pad_token_id)?;
    let shape = (batch.len(), mx_len);
    Ok((
        Tensor::from_vec(indices, shape, device)?,
        Tensor::from_vec(mask, shape, device)?,
    ))
}

/// Pad sequences to `[n, max_len]` without a mask.
pub fn to_indices<S: AsRef<[u32]>>(batch: &[S], pad_token_id: u32, device: &Device) -> Result<Tensor> {
    let (indices, _, mx_len) = pad_rows(batch, pad_token_id)?;
    Ok(Tensor::from_vec(indices, (batch.len(), mx_len), device)?)
}

fn column<'a>(
    batch: &'a [VectorizedExample],
    field: impl Fn(&'a VectorizedExample) -> &'a [u32],
) -> Vec<&'a [u32]> {
    batch.iter().map(field).collect()
}

fn pad_rows<S: AsRef<[u32]>>(batch: &[S], pad_token_id: u32) -> Result<(Vec<u32>, Vec<u8>, usize)> {
    let mx_len = batch
        .iter()
        .map(|t| t.as_ref().len())
        .max()
        .ok_or(CakeError::EmptyBatch)?;

    let mut indices = vec![pad_token_id; batch.len() * mx_len];
    let mut mask = vec![0u8; batch.len() * mx_len];
    for (i, t) in batch.iter().enumerate() {
        let t = t.as_ref();
        let row = i * mx_len;
        indices[row..row + t.len()].copy_from_slice(t);
        mask[row..row + t.len()].fill(1);
    }
    Ok((indices, mask, mx_len))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DataConfig;
    use crate::dataset::test_support::{sample_hub, sample_triplets};

    #[test]
    fn test_to_indices_and_mask_prefix() {
        let seqs: Vec<Vec<u32>> = vec![vec![5, 6, 7], vec![8], vec![], vec![9, 10]];
        let (ids, mask) = to_indices_and_mask(&seqs, 0, &Device::Cpu).unwrap();
        assert_eq!(ids.dims(), &[4, 3]);

        let ids: Vec<Vec<u32>> = ids.to_vec2().unwrap();
        let mask: Vec<Vec<u8>> = mask.to_vec2().unwrap();
        for (i, seq) in seqs.iter().enumerate() {
            assert_eq!(&ids[i][..seq.len()], seq.as_slice());
            assert!(ids[i][seq.len()..].iter().all(|&t| t == 0));
            assert!(mask[i][..seq.len()].iter().all(|&m| m == 1));
            assert!(mask[i][seq.len()..].iter().all(|&m| m == 0));
        }
    }

    #[test]
    fn test_custom_pad_id() {
        let seqs = [vec![1u32], vec![1, 2]];
        let ids: Vec<Vec<u32>> = to_indices(&seqs, 99, &Device::Cpu)
            .unwrap()
            .to_vec2()
            .unwrap();
        assert_eq!(ids, vec![vec![1, 99], vec![1, 2]]);
    }

    #[test]
    fn test_empty_batch_rejected() {
        let seqs: Vec<Vec<u32>> = Vec::new();
        assert!(matches!(
            to_indices(&seqs, 0, &Device::Cpu),
            Err(CakeError::EmptyBatch)
        ));
        let hub = sample_hub(DataConfig::default());
        assert!(matches!(collate(&[], &hub), Err(CakeError::EmptyBatch)));
        assert!(matches!(collate_grouped(&[], &hub), Err(CakeError::EmptyBatch)));
    }

    fn vectorized(hub: &DataHub) -> Vec<VectorizedExample> {
        sample_triplets()
            .into_iter()
            .map(|t| Example::from(t).vectorize(hub).unwrap())
            .collect()
    }

    #[test]
    fn test_collate_training_batch() {
        let hub = sample_hub(DataConfig::default());
        let data = vectorized(&hub);
        let batch = collate(&data, &hub).unwrap();

        let max_hr = data.iter().map(|ex| ex.hr.len()).max().unwrap();
        assert_eq!(batch.len(), 3);
        assert_eq!(batch.hr_token_ids.dims(), &[3, max_hr]);
        assert_eq!(batch.hr_token_type_ids.dims(), batch.hr_token_ids.dims());
        assert_eq!(batch.triplet_mask.as_ref().unwrap().dims(), &[3, 3]);
        assert_eq!(batch.self_negative_mask.as_ref().unwrap().dims(), &[3]);
    }

    #[test]
    fn test_collate_eval_has_no_masks() {
        let hub = sample_hub(DataConfig::default().with_test_mode(true));
        let data = vectorized(&hub);
        let batch = collate(&data, &hub).unwrap();
        assert!(batch.triplet_mask.is_none());
        assert!(batch.self_negative_mask.is_none());
    }

    #[test]
    fn test_collate_grouped_unwraps_first_group() {
        let hub = sample_hub(DataConfig::default());
        let data = vectorized(&hub);
        let grouped = collate_grouped(&[data.clone()], &hub).unwrap();
        let flat = collate(&data, &hub).unwrap();

        assert_eq!(grouped.batch_data, flat.batch_data);
        let a: Vec<Vec<u32>> = grouped.tail_token_ids.to_vec2().unwrap();
        let b: Vec<Vec<u32>> = flat.tail_token_ids.to_vec2().unwrap();
        assert_eq!(a, b);
    }
}
