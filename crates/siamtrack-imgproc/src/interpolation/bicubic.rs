use siamtrack_image::Image;

// Keys kernel coefficient, same as the one used by OpenCV's INTER_CUBIC.
const CUBIC_A: f32 = -0.75;

/// Weights of the four taps at offsets -1, 0, 1, 2 for a fractional position `x`.
fn cubic_weights(x: f32) -> [f32; 4] {
    let a = CUBIC_A;
    let w0 = ((a * (x + 1.0) - 5.0 * a) * (x + 1.0) + 8.0 * a) * (x + 1.0) - 4.0 * a;
    let w1 = ((a + 2.0) * x - (a + 3.0)) * x * x + 1.0;
    let w2 = ((a + 2.0) * (1.0 - x) - (a + 3.0)) * (1.0 - x) * (1.0 - x) + 1.0;
    [w0, w1, w2, 1.0 - w0 - w1 - w2]
}

/// Kernel for bicubic interpolation
///
/// Samples the 4x4 neighbourhood around `(u, v)`, replicating the border pixels
/// for taps that fall outside the image.
///
/// # Arguments
///
/// * `image` - The input image container.
/// * `u` - The x coordinate of the pixel to interpolate.
/// * `v` - The y coordinate of the pixel to interpolate.
/// * `c` - The channel of the pixel to interpolate.
///
/// # Returns
///
/// The interpolated pixel value.
pub(crate) fn bicubic_interpolation<const C: usize>(
    image: &Image<f32, C>,
    u: f32,
    v: f32,
    c: usize,
) -> f32 {
    let (rows, cols) = (image.rows() as isize, image.cols() as isize);
    let data = image.as_slice();

    let (u0, v0) = (u.floor(), v.floor());
    let wx = cubic_weights(u - u0);
    let wy = cubic_weights(v - v0);
    let (u0, v0) = (u0 as isize, v0 as isize);

    let mut acc = 0.0;
    for (j, wyj) in wy.iter().enumerate() {
        let iv = (v0 + j as isize - 1).clamp(0, rows - 1) as usize;
        let row = &data[iv * cols as usize * C..(iv + 1) * cols as usize * C];

        let mut row_acc = 0.0;
        for (i, wxi) in wx.iter().enumerate() {
            let iu = (u0 + i as isize - 1).clamp(0, cols - 1) as usize;
            row_acc += wxi * row[iu * C + c];
        }
        acc += wyj * row_acc;
    }

    acc
}

#[cfg(test)]
mod tests {
    #[test]
    fn weights_partition_unity() {
        for x in [0.0, 0.25, 0.5, 0.9] {
            let w = super::cubic_weights(x);
            approx::assert_relative_eq!(w.iter().sum::<f32>(), 1.0, epsilon = 1e-6);
        }
        assert_eq!(super::cubic_weights(0.0), [0.0, 1.0, 0.0, 0.0]);
    }
}
