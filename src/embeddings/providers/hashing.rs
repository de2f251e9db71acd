//! Offline feature-hashing embedder.
//!
//! Maps lower-cased word tokens and their character trigrams into a fixed
//! number of signed buckets (SHA-256 of the feature picks the bucket and the
//! sign), then L2-normalizes. Deterministic across runs and platforms, needs
//! no model files, and gives inflected forms ("asistencia" / "asistencias")
//! overlapping vectors through their shared trigrams.

use sha2::{Digest, Sha256};

/// Weight of a whole-word feature relative to one trigram.
const WORD_WEIGHT: f32 = 2.0;

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions: dimensions.max(1) }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn encode(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dimensions];
        let lowered = text.to_lowercase();

        for word in lowered.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            self.add_feature(&mut v, word, WORD_WEIGHT);

            let padded: Vec<char> = format!("#{word}#").chars().collect();
            for tri in padded.windows(3) {
                let tri: String = tri.iter().collect();
                self.add_feature(&mut v, &tri, 1.0);
            }
        }

        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut v {
                *x /= norm;
            }
        }
        v
    }

    fn add_feature(&self, v: &mut [f32], feature: &str, weight: f32) {
        let digest = Sha256::digest(feature.as_bytes());
        let mut idx_bytes = [0u8; 8];
        idx_bytes.copy_from_slice(&digest[..8]);
        let idx = (u64::from_le_bytes(idx_bytes) % self.dimensions as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        v[idx] += sign * weight;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::cosine_similarity;

    #[test]
    fn output_has_configured_dimensions() {
        let e = HashingEmbedder::new(48);
        assert_eq!(e.encode("hola mundo").len(), 48);
        assert_eq!(e.dimensions(), 48);
    }

    #[test]
    fn deterministic() {
        let e = HashingEmbedder::new(64);
        assert_eq!(e.encode("Carlos Rodríguez"), e.encode("Carlos Rodríguez"));
    }

    #[test]
    fn case_insensitive() {
        let e = HashingEmbedder::new(64);
        assert_eq!(e.encode("MATEMÁTICAS"), e.encode("matemáticas"));
    }

    #[test]
    fn unit_norm_for_non_empty_text() {
        let e = HashingEmbedder::new(64);
        let v = e.encode("Materia: Programación");
        let norm: f32 = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn empty_text_is_zero_vector() {
        let e = HashingEmbedder::new(16);
        assert!(e.encode("  ,; ").iter().all(|x| *x == 0.0));
    }

    #[test]
    fn related_text_scores_higher_than_unrelated() {
        let e = HashingEmbedder::new(256);
        let doc = e.encode("Course: Programación - Attendance: 40 - Absences: 7");
        let close = e.encode("programación asistencias");
        let far = e.encode("zzz qqq www");
        assert!(cosine_similarity(&doc, &close) > cosine_similarity(&doc, &far));
    }
}
