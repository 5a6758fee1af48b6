/// Raw cosine similarity in [-1, 1].
///
/// `None` on a length mismatch or when either vector has zero norm.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Option<f64> {
    if a.len() != b.len() {
        tracing::warn!(
            a_len = a.len(),
            b_len = b.len(),
            "embedding dimension mismatch; no similarity"
        );
        return None;
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return None;
    }

    Some((dot / (norm_a * norm_b)).clamp(-1.0, 1.0))
}

/// Maps [-1, 1] linearly onto [0, 1].
pub fn rescale_cosine(cosine: f64) -> f64 {
    ((cosine + 1.0) / 2.0).clamp(0.0, 1.0)
}

/// Rescaled cosine, 0 when no similarity is defined.
pub fn semantic_similarity(a: &[f32], b: &[f32]) -> f64 {
    cosine_similarity(a, b).map(rescale_cosine).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_vectors_score_one() {
        let a = [1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &a).unwrap() - 1.0).abs() < 1e-12);
        assert!((semantic_similarity(&a, &a) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn opposite_and_orthogonal_vectors_rescale() {
        let a = [1.0, 0.0];
        assert_eq!(semantic_similarity(&a, &[-1.0, 0.0]), 0.0);
        assert_eq!(semantic_similarity(&a, &[0.0, 1.0]), 0.5);
    }

    #[test]
    fn zero_vectors_have_no_similarity() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), None);
        assert_eq!(semantic_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn dimension_mismatch_has_no_similarity() {
        assert_eq!(cosine_similarity(&[1.0, 0.0, 0.0], &[1.0, 0.0]), None);
    }
}
