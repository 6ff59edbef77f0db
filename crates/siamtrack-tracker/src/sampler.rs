use siamtrack_image::{ops::channel_mean, Image, ImageSize};
use siamtrack_imgproc::{
    crop::crop_with_fill, interpolation::InterpolationMode, resize::resize_native,
};

use crate::{bbox::Center, error::TrackerError};

/// Extract a square region of side `size` centred at `center` and resample it to
/// `out_size x out_size` pixels.
///
/// Parts of the region that fall outside the image are filled with the per-channel mean
/// of the image. The region is resampled with bilinear interpolation.
///
/// # Arguments
///
/// * `image` - The source image.
/// * `center` - The centre of the region in pixel coordinates.
/// * `size` - The side of the region in source pixels.
/// * `out_size` - The side of the output patch.
///
/// # Errors
///
/// Returns [`TrackerError::InvalidGeometry`] if `size` is not a positive finite number or
/// `out_size` is zero.
///
/// # Example
///
/// ```
/// use siamtrack_image::{Image, ImageSize};
/// use siamtrack_tracker::{sampler::sample, Center};
///
/// let image = Image::<f32, 1>::from_size_val(ImageSize { width: 10, height: 10 }, 1.0).unwrap();
/// let patch = sample(&image, Center::new(0.0, 0.0), 20.0, 5).unwrap();
///
/// assert_eq!(patch.size(), ImageSize { width: 5, height: 5 });
/// ```
pub fn sample<const C: usize>(
    image: &Image<f32, C>,
    center: Center,
    size: f32,
    out_size: usize,
) -> Result<Image<f32, C>, TrackerError> {
    if !(size > 0.0 && size.is_finite()) || out_size == 0 {
        return Err(TrackerError::InvalidGeometry { size, out_size });
    }

    let half = (size - 1.0) / 2.0;
    let (width, height) = (image.width() as f32, image.height() as f32);

    // distance the region reaches past the nearest image border
    let overhang = [
        half - center.x,
        half + center.x - width,
        half - center.y,
        half + center.y - height,
    ]
    .into_iter()
    .fold(-1.0f32, f32::max);
    let pad = (overhang.trunc() as i64 + 1).max(0) as usize;

    // the region is placed in the frame of an image padded by `pad` on every side,
    // then read back from the unpadded image with out-of-image pixels set to the mean
    let (x0, x1) = crop_span(center.x - half + pad as f32, size, image.width() + 2 * pad);
    let (y0, y1) = crop_span(center.y - half + pad as f32, size, image.height() + 2 * pad);

    let fill = if pad > 0 {
        channel_mean(image).map(|m| m as f32)
    } else {
        [0.0; C]
    };

    let mut crop = Image::from_size_val(
        ImageSize {
            width: x1 - x0,
            height: y1 - y0,
        },
        0.0,
    )?;
    crop_with_fill(
        image,
        &mut crop,
        x0 as isize - pad as isize,
        y0 as isize - pad as isize,
        fill,
    );

    let mut patch = Image::from_size_val(
        ImageSize {
            width: out_size,
            height: out_size,
        },
        0.0,
    )?;
    resize_native(&crop, &mut patch, InterpolationMode::Bilinear)?;

    Ok(patch)
}

/// Integer `[start, end)` span of a crop along one axis, at least one pixel wide and
/// inside `[0, len)`.
fn crop_span(start: f32, size: f32, len: usize) -> (usize, usize) {
    let start_px = (start.floor().max(0.0) as usize).min(len.saturating_sub(1));
    let end_px = ((start + size).floor().max(0.0) as usize)
        .min(len)
        .max(start_px + 1);
    (start_px, end_px)
}
