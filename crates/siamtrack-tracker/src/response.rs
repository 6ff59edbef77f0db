use siamtrack_image::{Image, ImageSize};
use siamtrack_imgproc::{interpolation::InterpolationMode, resize::resize_native, window::hann2d};

use crate::{config::TrackerConfig, error::TrackerError, exemplar::ScaleFactors};

const NORM_EPS: f32 = 1e-12;

/// Outcome of resolving the response maps of one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Resolution {
    /// Index of the selected scale hypothesis.
    pub scale_index: usize,
    /// Peak of the final response as `[row, col]` in the upsampled grid.
    pub peak: [usize; 2],
    /// Target displacement `[dx, dy]` in frame pixels.
    pub displacement: [f32; 2],
}

/// Square Hann window of side `upscale_size`, normalized to sum to one.
///
/// # Errors
///
/// Returns an error if the window cannot be allocated.
pub fn cosine_window(upscale_size: usize) -> Result<Image<f32, 1>, TrackerError> {
    let mut window = hann2d(ImageSize {
        width: upscale_size,
        height: upscale_size,
    })?;

    let sum = window.as_slice().iter().map(|&v| v as f64).sum::<f64>();
    if sum > 0.0 {
        window
            .as_slice_mut()
            .iter_mut()
            .for_each(|v| *v = (*v as f64 / sum) as f32);
    }

    Ok(window)
}

/// Turn the per-scale response maps of one frame into a scale choice and a displacement.
///
/// Every map is upsampled bicubically to `upscale_size`, the off-centre scales are
/// discounted by `scale_penalty`, and the map holding the highest value is kept. That map
/// is shifted to a zero minimum, normalized to unit sum, blended with `cosine_window` and
/// its first maximum in row-major order gives the peak. The peak offset from the grid
/// centre is mapped back to frame pixels through the embedding stride and the search
/// region size at the chosen scale.
///
/// Degenerate maps (constant, all zero) resolve deterministically to the window peak.
///
/// # Errors
///
/// Returns [`TrackerError::ShapeMismatch`] when the number of maps differs from the number
/// of scales or the window does not have the upsampled size.
pub fn resolve(
    maps: &[Image<f32, 1>],
    scales: &ScaleFactors,
    cosine_window: &Image<f32, 1>,
    config: &TrackerConfig,
    search_size: f32,
) -> Result<Resolution, TrackerError> {
    if maps.len() != scales.len() || maps.is_empty() {
        return Err(TrackerError::ShapeMismatch(format!(
            "got {} response maps for {} scales",
            maps.len(),
            scales.len()
        )));
    }

    let up = config.upscale_size;
    let up_size = ImageSize {
        width: up,
        height: up,
    };
    if cosine_window.size() != up_size {
        return Err(TrackerError::ShapeMismatch(format!(
            "cosine window is {}, expected {}",
            cosine_window.size(),
            up_size
        )));
    }

    let middle = scales.middle_index();
    let mut upsampled = Vec::with_capacity(maps.len());
    for (i, map) in maps.iter().enumerate() {
        let mut dst = Image::from_size_val(up_size, 0.0f32)?;
        resize_native(map, &mut dst, InterpolationMode::Bicubic)?;
        if i != middle {
            dst.as_slice_mut()
                .iter_mut()
                .for_each(|v| *v *= config.scale_penalty);
        }
        upsampled.push(dst);
    }

    let mut scale_index = 0;
    let mut best = f32::NEG_INFINITY;
    for (i, map) in upsampled.iter().enumerate() {
        let peak = max_value(map.as_slice());
        if peak > best {
            best = peak;
            scale_index = i;
        }
    }

    let response = upsampled.swap_remove(scale_index);
    let min = response
        .as_slice()
        .iter()
        .copied()
        .fold(f32::INFINITY, f32::min);
    let min = if min.is_finite() { min } else { 0.0 };
    let sum = response.as_slice().iter().map(|&v| v - min).sum::<f32>();
    let norm = 1.0 / (sum + NORM_EPS);

    let w = config.window_influence;
    let mut peak_index = 0;
    let mut peak_value = f32::NEG_INFINITY;
    for (i, (&r, &c)) in response
        .as_slice()
        .iter()
        .zip(cosine_window.as_slice())
        .enumerate()
    {
        let v = (1.0 - w) * (r - min) * norm + w * c;
        if v > peak_value {
            peak_value = v;
            peak_index = i;
        }
    }
    let peak = [peak_index / up, peak_index % up];

    let origin = (up as f32 - 1.0) / 2.0;
    let scale = scales.get(scale_index).unwrap_or(1.0);
    let map_size = maps[scale_index].size();
    let to_frame = |offset: f32, score_size: usize| {
        offset / up as f32 * score_size as f32 * config.stride as f32
            / config.instance_size as f32
            * search_size
            * scale
    };
    let displacement = [
        to_frame(peak[1] as f32 - origin, map_size.width),
        to_frame(peak[0] as f32 - origin, map_size.height),
    ];

    Ok(Resolution {
        scale_index,
        peak,
        displacement,
    })
}

fn max_value(values: &[f32]) -> f32 {
    values.iter().copied().fold(f32::NEG_INFINITY, f32::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(up: usize) -> TrackerConfig {
        TrackerConfig {
            upscale_size: up,
            ..Default::default()
        }
    }

    fn map_with_peak(
        side: usize,
        row: usize,
        col: usize,
        value: f32,
    ) -> Result<Image<f32, 1>, TrackerError> {
        let mut data = vec![0f32; side * side];
        data[row * side + col] = value;
        Ok(Image::new([side, side].into(), data)?)
    }

    #[test]
    fn cosine_window_sums_to_one() -> Result<(), TrackerError> {
        let window = cosine_window(16)?;
        let sum = window.as_slice().iter().sum::<f32>();
        approx::assert_relative_eq!(sum, 1.0, epsilon = 1e-5);
        assert_eq!(window.as_slice()[0], 0.0);
        Ok(())
    }

    #[test]
    fn resolve_zero_maps_is_deterministic() -> Result<(), TrackerError> {
        let cfg = config(17);
        let scales = ScaleFactors::new(3, cfg.scale_step)?;
        let window = cosine_window(17)?;
        let maps = vec![Image::<f32, 1>::from_size_val([17, 17].into(), 0.0)?; 3];

        let a = resolve(&maps, &scales, &window, &cfg, 100.0)?;
        let b = resolve(&maps, &scales, &window, &cfg, 100.0)?;
        assert_eq!(a, b);
        assert_eq!(a.scale_index, 0);
        assert_eq!(a.peak, [8, 8]);
        assert!(a.displacement.iter().all(|d| d.is_finite()));
        approx::assert_relative_eq!(a.displacement[0], 0.0);
        approx::assert_relative_eq!(a.displacement[1], 0.0);
        Ok(())
    }

    #[test]
    fn resolve_even_grid_tie_takes_first_centre_cell() -> Result<(), TrackerError> {
        let cfg = TrackerConfig::default();
        let up = cfg.upscale_size;
        assert_eq!(up, 272);
        let scales = ScaleFactors::new(3, cfg.scale_step)?;
        let window = cosine_window(up)?;
        let maps = vec![Image::<f32, 1>::from_size_val([17, 17].into(), 0.0)?; 3];

        let res = resolve(&maps, &scales, &window, &cfg, 100.0)?;
        assert_eq!(res.scale_index, 0);
        assert_eq!(res.peak, [135, 135]);

        // half a cell up-left of the grid centre, back-projected to the frame
        let expected = -0.5f32 / 272.0 * 17.0 * 8.0 / 255.0 * 100.0;
        approx::assert_relative_eq!(res.displacement[0], expected, epsilon = 1e-4);
        approx::assert_relative_eq!(res.displacement[1], expected, epsilon = 1e-4);
        Ok(())
    }

    #[test]
    fn resolve_picks_strongest_scale() -> Result<(), TrackerError> {
        let cfg = config(17);
        let scales = ScaleFactors::new(3, cfg.scale_step)?;
        let window = cosine_window(17)?;
        let maps = vec![
            map_with_peak(17, 8, 8, 1.0)?,
            map_with_peak(17, 8, 8, 1.0)?,
            map_with_peak(17, 8, 8, 5.0)?,
        ];
        let res = resolve(&maps, &scales, &window, &cfg, 100.0)?;
        assert_eq!(res.scale_index, 2);
        Ok(())
    }

    #[test]
    fn resolve_penalty_favours_unscaled_map() -> Result<(), TrackerError> {
        let cfg = config(17);
        let scales = ScaleFactors::new(3, cfg.scale_step)?;
        let window = cosine_window(17)?;
        let maps = vec![map_with_peak(17, 8, 8, 1.0)?; 3];
        let res = resolve(&maps, &scales, &window, &cfg, 100.0)?;
        assert_eq!(res.scale_index, 1);
        Ok(())
    }

    #[test]
    fn resolve_displacement_direction() -> Result<(), TrackerError> {
        // peak right of and below the centre, no window, no resampling
        let cfg = TrackerConfig {
            upscale_size: 17,
            window_influence: 0.0,
            ..Default::default()
        };
        let scales = ScaleFactors::new(1, cfg.scale_step)?;
        let window = cosine_window(17)?;
        let maps = vec![map_with_peak(17, 10, 12, 1.0)?];
        let search = 255.0;

        let res = resolve(&maps, &scales, &window, &cfg, search)?;
        assert_eq!(res.peak, [10, 12]);
        // one response cell is one stride in instance pixels, instance == search here
        approx::assert_relative_eq!(res.displacement[0], 4.0 * 8.0, epsilon = 1e-3);
        approx::assert_relative_eq!(res.displacement[1], 2.0 * 8.0, epsilon = 1e-3);
        Ok(())
    }

    #[test]
    fn resolve_shape_mismatch() -> Result<(), TrackerError> {
        let cfg = config(17);
        let scales = ScaleFactors::new(3, cfg.scale_step)?;
        let window = cosine_window(17)?;
        let maps = vec![Image::<f32, 1>::from_size_val([17, 17].into(), 0.0)?; 2];
        assert!(resolve(&maps, &scales, &window, &cfg, 100.0).is_err());

        let maps = vec![Image::<f32, 1>::from_size_val([17, 17].into(), 0.0)?; 3];
        let small = cosine_window(9)?;
        assert!(resolve(&maps, &scales, &small, &cfg, 100.0).is_err());
        Ok(())
    }
}
