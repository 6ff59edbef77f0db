use siamtrack_image::{Image, ImageError, ImageSize};

/// Create a 1D Hann window of `len` samples.
///
/// Follows the symmetric definition `0.5 - 0.5 * cos(2 * pi * n / (len - 1))`, so both
/// end points are zero. A single-sample window is `[1.0]`.
///
/// # Example
///
/// ```
/// use siamtrack_imgproc::window::hanning;
///
/// let w = hanning(5);
/// assert_eq!(w.len(), 5);
/// assert_eq!(w[0], 0.0);
/// assert_eq!(w[2], 1.0);
/// ```
pub fn hanning(len: usize) -> Vec<f32> {
    match len {
        0 => vec![],
        1 => vec![1.0],
        _ => {
            let denom = (len - 1) as f64;
            (0..len)
                .map(|n| {
                    let phase = 2.0 * std::f64::consts::PI * n as f64 / denom;
                    (0.5 - 0.5 * phase.cos()) as f32
                })
                .collect()
        }
    }
}

/// Create a 2D Hann window as the outer product of two 1D windows.
///
/// # Errors
///
/// Returns an error if the window cannot be allocated with the given size.
pub fn hann2d(size: ImageSize) -> Result<Image<f32, 1>, ImageError> {
    let hann_rows = hanning(size.height);
    let hann_cols = hanning(size.width);

    let data = hann_rows
        .iter()
        .flat_map(|&r| hann_cols.iter().map(move |&c| r * c))
        .collect();

    Image::new(size, data)
}

#[cfg(test)]
mod tests {
    use siamtrack_image::{ImageError, ImageSize};

    #[test]
    fn hanning_is_symmetric() {
        let w = super::hanning(8);
        for i in 0..4 {
            approx::assert_relative_eq!(w[i], w[7 - i], epsilon = 1e-6);
        }
        assert!(super::hanning(0).is_empty());
        assert_eq!(super::hanning(1), vec![1.0]);
    }

    #[test]
    fn hann2d_outer_product() -> Result<(), ImageError> {
        let window = super::hann2d(ImageSize {
            width: 5,
            height: 3,
        })?;
        assert_eq!(window.size(), [5, 3].into());
        // the centre row of a 3-sample window is 1.0, so it equals the column window
        let expected = super::hanning(5);
        for x in 0..5 {
            approx::assert_relative_eq!(*window.get_pixel(x, 1, 0)?, expected[x]);
        }
        assert_eq!(*window.get_pixel(0, 0, 0)?, 0.0);
        Ok(())
    }
}
