//! Trimming and blackening of unpacked RGBA samples.
//!
//! Both operations assume alpha is the last channel of each pixel and are
//! only applied to encodings that have one.

fn find_trim_edges(mut min: isize, mut max: isize, is_transparent: impl Fn(usize) -> bool) -> (isize, isize) {
    while min <= max && is_transparent(min as usize) {
        min += 1;
    }
    while min <= max && is_transparent(max as usize) {
        max -= 1;
    }
    (min, max)
}

/// Remove fully transparent rows and columns from the edges of the image.
///
/// The search starts from `given_width` x `given_height` rather than the full
/// size, so anything right of or below those bounds is always dropped.  A
/// row or column counts as transparent when every alpha sample along its
/// full length is zero.  Returns the new width, height and samples.
pub fn trim_transparent_edges(
    pixels: Vec<u8>,
    width: u32,
    height: u32,
    channels_per_pixel: usize,
    given_width: u32,
    given_height: u32,
) -> (u32, u32, Vec<u8>) {
    let cpp = channels_per_pixel;
    let (w, h) = (width as usize, height as usize);
    if cpp == 0 || pixels.len() < w * h * cpp {
        return (width, height, pixels);
    }
    let alpha = |x: usize, y: usize| pixels[(y * w + x) * cpp + cpp - 1];
    let row_is_transparent = |y: usize| (0..w).all(|x| alpha(x, y) == 0);
    let column_is_transparent = |x: usize| (0..h).all(|y| alpha(x, y) == 0);

    let bound_width = given_width.min(width) as isize;
    let bound_height = given_height.min(height) as isize;
    let (top, bottom) = find_trim_edges(0, bound_height - 1, row_is_transparent);
    let (left, right) = find_trim_edges(0, bound_width - 1, column_is_transparent);

    let trimmed_width = (right - left + 1) as usize;
    let trimmed_height = (bottom - top + 1) as usize;
    if trimmed_width == 0 || trimmed_height == 0 {
        return (trimmed_width as u32, trimmed_height as u32, Vec::new());
    }

    let (top, left) = (top as usize, left as usize);
    let mut trimmed = Vec::with_capacity(trimmed_width * trimmed_height * cpp);
    for y in top..top + trimmed_height {
        let start = (y * w + left) * cpp;
        trimmed.extend_from_slice(&pixels[start..start + trimmed_width * cpp]);
    }
    (trimmed_width as u32, trimmed_height as u32, trimmed)
}

/// Zero the color channels of every pixel whose alpha is zero.
pub fn blacken_transparent_pixels(pixels: &mut [u8], channels_per_pixel: usize) {
    if channels_per_pixel < 2 {
        return;
    }
    for pixel in pixels.chunks_exact_mut(channels_per_pixel) {
        let (color, alpha) = pixel.split_at_mut(channels_per_pixel - 1);
        if alpha[0] == 0 {
            color.fill(0);
        }
    }
}
