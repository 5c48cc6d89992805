//! Dense vector helpers shared by the texture, fusion and embedding stages.
//!
//! Every helper treats a zero-norm vector as a legal value: normalizing it
//! returns it unchanged and similarities against it are 0, never NaN.

/// Norms at or below this value are treated as zero.
pub const NORM_EPSILON: f64 = 1e-12;

/// Dot product over the overlapping prefix of `a` and `b`.
///
/// Equivalent to zero-padding the shorter vector.
#[inline]
pub fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Euclidean (L2) norm.
#[inline]
pub fn l2_norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

/// Return a unit-norm copy of `v`, or `v` unchanged when its norm is zero.
pub fn normalize(v: &[f64]) -> Vec<f64> {
    let mut out = v.to_vec();
    normalize_in_place(&mut out);
    out
}

/// Scale `v` to unit norm in place. Zero vectors are left untouched.
pub fn normalize_in_place(v: &mut [f64]) {
    let norm = l2_norm(v);
    if norm <= NORM_EPSILON {
        return;
    }
    for x in v.iter_mut() {
        *x /= norm;
    }
}

/// Cosine similarity in [-1, 1].
///
/// Vectors of different length are compared as if the shorter one were
/// zero-padded. Returns 0 when either vector has zero norm.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> f64 {
    let na = l2_norm(a);
    let nb = l2_norm(b);
    if na <= NORM_EPSILON || nb <= NORM_EPSILON {
        return 0.0;
    }
    (dot(a, b) / (na * nb)).clamp(-1.0, 1.0)
}

/// Squared Euclidean distance, zero-padding the shorter vector.
pub fn euclidean_distance_squared(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().max(b.len());
    (0..n)
        .map(|i| {
            let d = a.get(i).copied().unwrap_or(0.0) - b.get(i).copied().unwrap_or(0.0);
            d * d
        })
        .sum()
}

/// Euclidean distance, zero-padding the shorter vector.
#[inline]
pub fn euclidean_distance(a: &[f64], b: &[f64]) -> f64 {
    euclidean_distance_squared(a, b).sqrt()
}

/// Truncate or zero-pad `v` to exactly `len` entries.
pub fn fit_to_length(v: &[f64], len: usize) -> Vec<f64> {
    let mut out: Vec<f64> = v.iter().copied().take(len).collect();
    out.resize(len, 0.0);
    out
}

/// Shrink `v` to `len` entries by averaging contiguous buckets, or zero-pad
/// it when it is already shorter.
pub fn mean_pool_to_length(v: &[f64], len: usize) -> Vec<f64> {
    let n = v.len();
    if n <= len {
        return fit_to_length(v, len);
    }
    (0..len)
        .map(|i| {
            let start = i * n / len;
            let end = ((i + 1) * n / len).max(start + 1);
            let bucket = &v[start..end];
            bucket.iter().sum::<f64>() / bucket.len() as f64
        })
        .collect()
}

/// Elementwise mean of equal-length rows, or `None` when `rows` is empty.
pub fn mean_vector<'a, I>(rows: I) -> Option<Vec<f64>>
where
    I: IntoIterator<Item = &'a [f64]>,
{
    let mut iter = rows.into_iter();
    let first = iter.next()?;
    let mut sum = first.to_vec();
    let mut count = 1usize;
    for row in iter {
        for (s, x) in sum.iter_mut().zip(row) {
            *s += x;
        }
        count += 1;
    }
    for s in sum.iter_mut() {
        *s /= count as f64;
    }
    Some(sum)
}
