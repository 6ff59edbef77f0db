use super::bicubic::bicubic_interpolation;
use super::bilinear::bilinear_interpolation;
use siamtrack_image::Image;

/// Interpolation mode for the resize operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationMode {
    /// Bilinear interpolation
    Bilinear,
    /// Bicubic interpolation
    Bicubic,
}

/// Kernel for interpolating a pixel value
///
/// Coordinates outside the image are resolved by replicating the border.
///
/// # Arguments
///
/// * `image` - The input image container with shape (height, width, C).
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
/// * `c` - The channel of the pixel to interpolate.
/// * `interpolation` - The interpolation mode to use.
///
/// # Returns
///
/// The interpolated pixel value.
pub fn interpolate_pixel<const C: usize>(
    image: &Image<f32, C>,
    u: f32,
    v: f32,
    c: usize,
    interpolation: InterpolationMode,
) -> f32 {
    match interpolation {
        InterpolationMode::Bilinear => bilinear_interpolation(image, u, v, c),
        InterpolationMode::Bicubic => bicubic_interpolation(image, u, v, c),
    }
}

#[cfg(test)]
mod tests {
    use super::{interpolate_pixel, InterpolationMode};
    use siamtrack_image::{Image, ImageError, ImageSize};

    fn ramp() -> Result<Image<f32, 1>, ImageError> {
        Image::new(
            ImageSize {
                width: 4,
                height: 2,
            },
            vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0],
        )
    }

    #[test]
    fn sample_points_are_exact() -> Result<(), ImageError> {
        let image = ramp()?;
        for mode in [InterpolationMode::Bilinear, InterpolationMode::Bicubic] {
            assert_eq!(interpolate_pixel(&image, 2.0, 1.0, 0, mode), 6.0);
            assert_eq!(interpolate_pixel(&image, 0.0, 0.0, 0, mode), 0.0);
        }
        Ok(())
    }

    #[test]
    fn bilinear_midpoint() -> Result<(), ImageError> {
        let image = ramp()?;
        let val = interpolate_pixel(&image, 1.5, 0.5, 0, InterpolationMode::Bilinear);
        approx::assert_relative_eq!(val, 3.5);
        Ok(())
    }

    #[test]
    fn border_is_replicated() -> Result<(), ImageError> {
        let image = ramp()?;
        for mode in [InterpolationMode::Bilinear, InterpolationMode::Bicubic] {
            approx::assert_relative_eq!(interpolate_pixel(&image, -3.0, -2.0, 0, mode), 0.0);
            approx::assert_relative_eq!(interpolate_pixel(&image, 9.0, 5.0, 0, mode), 7.0);
        }
        Ok(())
    }
}
