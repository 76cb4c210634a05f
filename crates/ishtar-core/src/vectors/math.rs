//! Vector arithmetic and byte encoding

/// Norms below this are treated as zero when normalizing
pub const NORM_FLOOR: f32 = 1e-8;

/// L2 norm of a vector
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scale a vector to unit length in place. Zero vectors stay zero.
pub fn normalize_in_place(v: &mut [f32]) {
    let norm = l2_norm(v).max(NORM_FLOOR);
    for x in v.iter_mut() {
        *x /= norm;
    }
}

/// Unit-length copy of a vector
pub fn normalize(v: &[f32]) -> Vec<f32> {
    let mut out = v.to_vec();
    normalize_in_place(&mut out);
    out
}

/// Inner product; equals cosine similarity when both inputs are normalized
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Convert f32 values to bytes (little-endian)
pub fn embedding_to_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert little-endian bytes back to f32 values
pub fn bytes_to_embedding(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}
