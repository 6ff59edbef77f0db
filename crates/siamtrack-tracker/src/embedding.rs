use rayon::prelude::*;

use crate::{error::TrackerError, features::FeatureMap};

/// A function mapping an image tensor to a feature map.
///
/// The same function is applied to the exemplar and to every search patch, so its
/// output for a patch of side `exemplar_size` must be smaller than or equal to its
/// output for a patch of side `instance_size`.
pub trait Embedding {
    /// Embed a single channel-first tensor.
    fn embed(&self, input: &FeatureMap) -> Result<FeatureMap, TrackerError>;

    /// Embed a batch of tensors, returning the outputs in input order.
    fn embed_batch(&self, inputs: &[FeatureMap]) -> Result<Vec<FeatureMap>, TrackerError> {
        inputs.iter().map(|input| self.embed(input)).collect()
    }
}

impl<E: Embedding + ?Sized> Embedding for Box<E> {
    fn embed(&self, input: &FeatureMap) -> Result<FeatureMap, TrackerError> {
        (**self).embed(input)
    }

    fn embed_batch(&self, inputs: &[FeatureMap]) -> Result<Vec<FeatureMap>, TrackerError> {
        (**self).embed_batch(inputs)
    }
}

/// Fixed-function embedding: per-channel `stride x stride` average pooling.
///
/// Trailing rows and columns that do not fill a whole cell are dropped. With the default
/// tracker geometry (127 / 255 / stride 8) it produces 15x15 and 31x31 maps, whose
/// correlation is 17x17.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PooledEmbedding {
    stride: usize,
}

impl PooledEmbedding {
    /// Create a pooling embedding with the given cell side. A zero stride is treated as 1.
    pub fn new(stride: usize) -> Self {
        Self {
            stride: stride.max(1),
        }
    }

    /// The pooling cell side.
    pub fn stride(&self) -> usize {
        self.stride
    }
}

impl Embedding for PooledEmbedding {
    fn embed(&self, input: &FeatureMap) -> Result<FeatureMap, TrackerError> {
        let [channels, rows, cols] = input.shape();
        let s = self.stride;
        let (out_rows, out_cols) = (rows / s, cols / s);
        let norm = 1.0 / (s * s) as f32;

        let mut data = vec![0f32; channels * out_rows * out_cols];
        if out_rows > 0 && out_cols > 0 {
            data.par_chunks_exact_mut(out_rows * out_cols)
                .enumerate()
                .for_each(|(c, out_plane)| {
                    let plane = input.plane(c);
                    for (oy, out_row) in out_plane.chunks_exact_mut(out_cols).enumerate() {
                        for (ox, out) in out_row.iter_mut().enumerate() {
                            let mut acc = 0f32;
                            for row in plane[oy * s * cols..(oy + 1) * s * cols].chunks_exact(cols)
                            {
                                acc += row[ox * s..(ox + 1) * s].iter().sum::<f32>();
                            }
                            *out = acc * norm;
                        }
                    }
                });
        }

        FeatureMap::new([channels, out_rows, out_cols], data)
    }
}

#[cfg(test)]
mod tests {
    use super::{Embedding, PooledEmbedding};
    use crate::{error::TrackerError, features::FeatureMap};

    #[test]
    fn pooled_embedding_averages_cells() -> Result<(), TrackerError> {
        #[rustfmt::skip]
        let input = FeatureMap::new([1, 2, 5], vec![
            1., 3., 5., 7., 100.,
            1., 3., 5., 7., 100.,
        ])?;
        let out = PooledEmbedding::new(2).embed(&input)?;
        assert_eq!(out.shape(), [1, 1, 2]);
        assert_eq!(out.as_slice(), &[2.0, 6.0]);
        Ok(())
    }

    #[test]
    fn pooled_embedding_default_geometry() -> Result<(), TrackerError> {
        let embedding = PooledEmbedding::new(8);
        let batch = vec![
            FeatureMap::zeros([3, 127, 127]),
            FeatureMap::zeros([3, 255, 255]),
        ];
        let out = embedding.embed_batch(&batch)?;
        assert_eq!(out[0].shape(), [3, 15, 15]);
        assert_eq!(out[1].shape(), [3, 31, 31]);
        Ok(())
    }

    #[test]
    fn boxed_embedding_delegates() -> Result<(), TrackerError> {
        let boxed: Box<dyn Embedding> = Box::new(PooledEmbedding::new(1));
        let input = FeatureMap::new([1, 1, 2], vec![4.0, 5.0])?;
        assert_eq!(boxed.embed(&input)?, input);
        Ok(())
    }
}
