//! Spatial stride helpers.
//!
//! A stride of `n` keeps every `n`th row and column starting at index 0, so a
//! dimension of length `len` becomes `ceil(len / n)` long.

/// Floor a raw stride to a usable value.
///
/// Non-finite values and anything below 1 become 1; fractional strides are
/// truncated.
pub fn sanitize_stride(raw: f64) -> usize {
    if !raw.is_finite() || raw < 1.0 {
        1
    } else {
        raw.floor() as usize
    }
}

/// Length of a dimension after striding.
#[inline]
pub fn strided_len(len: usize, stride: usize) -> usize {
    let stride = stride.max(1);
    len.div_ceil(stride)
}

/// Pick every `stride`th element of a vector.
pub fn strided_values<T: Copy>(values: &[T], stride: usize) -> Vec<T> {
    values.iter().step_by(stride.max(1)).copied().collect()
}

/// Subsample a row-major 2D buffer on both axes.
///
/// Returns the strided buffer with dimensions `(strided_len(height), strided_len(width))`.
pub fn stride_2d<T: Copy>(values: &[T], height: usize, width: usize, stride: usize) -> Vec<T> {
    let stride = stride.max(1);
    let out_h = strided_len(height, stride);
    let out_w = strided_len(width, stride);
    let mut out = Vec::with_capacity(out_h * out_w);

    for y in (0..height).step_by(stride) {
        let row = &values[y * width..(y + 1) * width];
        out.extend(row.iter().step_by(stride).copied());
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_stride() {
        assert_eq!(sanitize_stride(8.0), 8);
        assert_eq!(sanitize_stride(2.7), 2);
        assert_eq!(sanitize_stride(0.5), 1);
        assert_eq!(sanitize_stride(0.0), 1);
        assert_eq!(sanitize_stride(-4.0), 1);
        assert_eq!(sanitize_stride(f64::NAN), 1);
        assert_eq!(sanitize_stride(f64::INFINITY), 1);
    }

    #[test]
    fn test_strided_len_is_ceil() {
        for len in 0..50usize {
            for stride in 1..12usize {
                let expected = (len as f64 / stride as f64).ceil() as usize;
                assert_eq!(strided_len(len, stride), expected, "len={len} stride={stride}");
            }
        }
    }

    #[test]
    fn test_stride_2d() {
        // 3x5 grid holding row * 10 + col
        let data: Vec<i32> = (0..3).flat_map(|r| (0..5).map(move |c| r * 10 + c)).collect();
        let out = stride_2d(&data, 3, 5, 2);
        assert_eq!(out, vec![0, 2, 4, 20, 22, 24]);
    }

    #[test]
    fn test_strided_values() {
        let lat = [90.0, 89.0, 88.0, 87.0, 86.0];
        assert_eq!(strided_values(&lat, 2), vec![90.0, 88.0, 86.0]);
        assert_eq!(strided_values(&lat, 0), lat.to_vec());
    }
}
