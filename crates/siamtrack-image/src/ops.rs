use crate::{Image, ImageError};

/// Cast the pixel data of an image to a wider type and scale it.
///
/// Typical use is turning an 8-bit camera frame into the `[0, 1]` float frame the
/// tracker works on.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image.
/// * `scale` - The scale to multiply the pixel data with.
///
/// Example:
///
/// ```
/// use siamtrack_image::{Image, ImageSize};
/// use siamtrack_image::ops::cast_and_scale;
///
/// let image = Image::<u8, 1>::new(
///     ImageSize {
///         width: 2,
///         height: 1,
///     },
///     vec![0u8, 255],
/// )
/// .unwrap();
///
/// let mut image_f32 = Image::from_size_val(image.size(), 0.0f32).unwrap();
///
/// cast_and_scale(&image, &mut image_f32, 1. / 255.0).unwrap();
///
/// assert_eq!(image_f32.get_pixel(0, 0, 0).unwrap(), &0.0f32);
/// assert_eq!(image_f32.get_pixel(1, 0, 0).unwrap(), &1.0f32);
/// ```
pub fn cast_and_scale<T, U, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<U, C>,
    scale: U,
) -> Result<(), ImageError>
where
    T: Copy + Into<U>,
    U: Copy + std::ops::Mul<U, Output = U>,
{
    if src.size() != dst.size() {
        return Err(ImageError::InvalidImageSize(
            src.width(),
            src.height(),
            dst.width(),
            dst.height(),
        ));
    }

    dst.as_slice_mut()
        .iter_mut()
        .zip(src.as_slice().iter())
        .for_each(|(out, &inp)| *out = inp.into() * scale);

    Ok(())
}

/// Compute the per-channel mean of an image.
///
/// The sum is accumulated in `f64`. An empty image yields a zero mean.
///
/// # Example
///
/// ```
/// use siamtrack_image::{Image, ImageSize};
/// use siamtrack_image::ops::channel_mean;
///
/// let image = Image::<u8, 3>::new(
///     ImageSize {
///         width: 2,
///         height: 2,
///     },
///     vec![0, 1, 2, 253, 254, 255, 128, 129, 130, 64, 65, 66],
/// )
/// .unwrap();
///
/// assert_eq!(channel_mean(&image), [111.25, 112.25, 113.25]);
/// ```
pub fn channel_mean<T, const C: usize>(image: &Image<T, C>) -> [f64; C]
where
    T: Copy + Into<f64>,
{
    let mut sum = [0f64; C];

    for pixel in image.as_slice().chunks_exact(C) {
        for (acc, &val) in sum.iter_mut().zip(pixel.iter()) {
            *acc += val.into();
        }
    }

    let n = (image.width() * image.height()) as f64;
    if n > 0.0 {
        sum.iter_mut().for_each(|s| *s /= n);
    }

    sum
}
