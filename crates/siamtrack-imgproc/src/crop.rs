use rayon::{
    iter::{IndexedParallelIterator, ParallelIterator},
    slice::ParallelSliceMut,
};
use siamtrack_image::Image;

/// Copy the window of `src` whose top-left corner is `(x, y)` into `dst`.
///
/// The window has the size of `dst` and may extend past any border of `src`, or miss it
/// entirely. Pixels of the window outside `src` are set to `fill`. Only the window is
/// touched, so the cost does not depend on how far it lies from the image.
///
/// # Arguments
///
/// * `src` - The source image.
/// * `dst` - The destination image, sized as the window.
/// * `x` - Column of the window's top-left corner in `src` coordinates.
/// * `y` - Row of the window's top-left corner in `src` coordinates.
/// * `fill` - Per-channel value written outside `src`.
///
/// # Example
///
/// ```
/// use siamtrack_image::{Image, ImageSize};
/// use siamtrack_imgproc::crop::crop_with_fill;
///
/// let image = Image::<u8, 1>::new(ImageSize { width: 2, height: 2 }, vec![1, 2, 3, 4]).unwrap();
/// let mut window = Image::<u8, 1>::from_size_val(ImageSize { width: 3, height: 2 }, 0).unwrap();
///
/// crop_with_fill(&image, &mut window, -1, 1, [9]);
///
/// assert_eq!(window.as_slice(), &[9, 3, 4, 9, 9, 9]);
/// ```
pub fn crop_with_fill<T, const C: usize>(
    src: &Image<T, C>,
    dst: &mut Image<T, C>,
    x: isize,
    y: isize,
    fill: [T; C],
) where
    T: Copy + Send + Sync,
{
    let dst_cols = dst.cols();
    if dst_cols == 0 {
        return;
    }

    let (src_cols, src_rows) = (src.cols() as isize, src.rows() as isize);

    // window columns [inside_start, inside_end) overlap the source
    let inside_start = (-x).clamp(0, dst_cols as isize) as usize;
    let inside_end = ((src_cols - x).clamp(0, dst_cols as isize) as usize).max(inside_start);

    dst.as_slice_mut()
        .par_chunks_exact_mut(dst_cols * C)
        .enumerate()
        .for_each(|(i, dst_row)| {
            let src_y = y + i as isize;
            if src_y < 0 || src_y >= src_rows || inside_start == inside_end {
                dst_row
                    .chunks_exact_mut(C)
                    .for_each(|pixel| pixel.copy_from_slice(&fill));
                return;
            }

            let (left, rest) = dst_row.split_at_mut(inside_start * C);
            let (inside, right) = rest.split_at_mut((inside_end - inside_start) * C);

            left.chunks_exact_mut(C)
                .chain(right.chunks_exact_mut(C))
                .for_each(|pixel| pixel.copy_from_slice(&fill));

            let offset = (src_y as usize * src.cols() + (x + inside_start as isize) as usize) * C;
            inside.copy_from_slice(&src.as_slice()[offset..offset + inside.len()]);
        });
}
