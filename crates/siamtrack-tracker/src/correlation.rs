use rayon::prelude::*;
use siamtrack_image::{Image, ImageSize};

use crate::{error::TrackerError, features::FeatureMap};

/// Cross-correlate a reference embedding with each search embedding.
///
/// The reference is slid over every valid position of a search map and the dot product
/// over all channels is recorded, giving a response of `(H - h + 1) x (W - w + 1)`.
/// Responses are returned in the order of `searches`.
///
/// # Errors
///
/// Returns [`TrackerError::ShapeMismatch`] if the channel counts differ or the reference
/// is larger than a search map.
pub fn correlate(
    reference: &FeatureMap,
    searches: &[FeatureMap],
) -> Result<Vec<Image<f32, 1>>, TrackerError> {
    searches
        .iter()
        .map(|search| correlate_single(reference, search))
        .collect()
}

fn correlate_single(
    reference: &FeatureMap,
    search: &FeatureMap,
) -> Result<Image<f32, 1>, TrackerError> {
    let [channels, kh, kw] = reference.shape();
    let [search_channels, sh, sw] = search.shape();

    if channels != search_channels {
        return Err(TrackerError::ShapeMismatch(format!(
            "reference has {channels} channels, search has {search_channels}"
        )));
    }
    if kh == 0 || kw == 0 || kh > sh || kw > sw {
        return Err(TrackerError::ShapeMismatch(format!(
            "reference {kh}x{kw} does not fit in search {sh}x{sw}"
        )));
    }

    let (out_rows, out_cols) = (sh - kh + 1, sw - kw + 1);
    let mut data = vec![0f32; out_rows * out_cols];

    data.par_chunks_exact_mut(out_cols)
        .enumerate()
        .for_each(|(y, out_row)| {
            for (x, out) in out_row.iter_mut().enumerate() {
                let mut acc = 0f32;
                for c in 0..channels {
                    let kernel = reference.plane(c);
                    let plane = search.plane(c);
                    for i in 0..kh {
                        let k_row = &kernel[i * kw..(i + 1) * kw];
                        let s_start = (y + i) * sw + x;
                        let s_row = &plane[s_start..s_start + kw];
                        acc += k_row.iter().zip(s_row).map(|(a, b)| a * b).sum::<f32>();
                    }
                }
                *out = acc;
            }
        });

    Ok(Image::new(
        ImageSize {
            width: out_cols,
            height: out_rows,
        },
        data,
    )?)
}

#[cfg(test)]
mod tests {
    use super::correlate;
    use crate::{error::TrackerError, features::FeatureMap};

    #[test]
    fn correlate_known_values() -> Result<(), TrackerError> {
        let reference = FeatureMap::new([1, 1, 2], vec![1.0, 2.0])?;
        let search = FeatureMap::new([1, 2, 3], vec![1., 2., 3., 4., 5., 6.])?;
        let out = correlate(&reference, &[search])?;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].rows(), 2);
        assert_eq!(out[0].cols(), 2);
        assert_eq!(out[0].as_slice(), &[5.0, 8.0, 14.0, 17.0]);
        Ok(())
    }

    #[test]
    fn correlate_sums_channels() -> Result<(), TrackerError> {
        let reference = FeatureMap::new([2, 1, 1], vec![1.0, 10.0])?;
        let search = FeatureMap::new([2, 1, 2], vec![1., 2., 3., 4.])?;
        let out = correlate(&reference, &[search])?;
        assert_eq!(out[0].as_slice(), &[31.0, 42.0]);
        Ok(())
    }

    #[test]
    fn self_correlation_peaks_at_center() -> Result<(), TrackerError> {
        // a blob at the centre of a 9x9 map, reference is the central 5x5 window
        let mut search = vec![0f32; 81];
        for y in 3..6 {
            for x in 3..6 {
                search[y * 9 + x] = 1.0 + (y + x) as f32 * 0.1;
            }
        }
        let reference = (2..7)
            .flat_map(|y| (2..7).map(move |x| (y, x)))
            .map(|(y, x)| search[y * 9 + x])
            .collect();
        let reference = FeatureMap::new([1, 5, 5], reference)?;
        let search = FeatureMap::new([1, 9, 9], search)?;

        let out = correlate(&reference, &[search])?;
        let (argmax, _) = out[0]
            .as_slice()
            .iter()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, &v)| if v > best.1 { (i, v) } else { best });
        assert_eq!(argmax, 2 * 5 + 2);
        Ok(())
    }

    #[test]
    fn correlate_preserves_order() -> Result<(), TrackerError> {
        let reference = FeatureMap::new([1, 1, 1], vec![1.0])?;
        let searches = (0..4)
            .map(|i| FeatureMap::new([1, 1, 1], vec![i as f32]))
            .collect::<Result<Vec<_>, _>>()?;
        let out = correlate(&reference, &searches)?;
        let values = out.iter().map(|m| m.as_slice()[0]).collect::<Vec<_>>();
        assert_eq!(values, vec![0.0, 1.0, 2.0, 3.0]);
        Ok(())
    }

    #[test]
    fn correlate_shape_mismatch() -> Result<(), TrackerError> {
        let reference = FeatureMap::zeros([2, 3, 3]);
        assert!(correlate(&reference, &[FeatureMap::zeros([1, 5, 5])]).is_err());
        assert!(correlate(&reference, &[FeatureMap::zeros([2, 2, 5])]).is_err());
        Ok(())
    }
}
