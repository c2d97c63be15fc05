use {
    crate::{
        search::{searcher::Searchable, phrase_query::PhrasePosition},
        Result,
    },
    once_cell::sync::Lazy,
};

static NORM_TABLE: Lazy<[f32; 256]> = Lazy::new(|| {
    let mut table = [0.0f32; 256];
    for (byte, slot) in table.iter_mut().enumerate() {
        *slot = byte_to_float(byte as u8);
    }
    table
});

fn byte_to_float(byte: u8) -> f32 {
    if byte == 0 {
        return 0.0;
    }
    let mut bits = (byte as u32) << (24 - 3);
    bits += (63 - 15) << 24;
    f32::from_bits(bits)
}

/// Encodes a norm into a single byte: three exponent bits, five mantissa bits. The encoding
/// is lossy, caps at ~7.5e9 and flushes tiny values to zero, but round-trips exactly from
/// the byte side: `encode_norm(decode_norm(b)) == b` for every byte value.
pub fn encode_norm(f: f32) -> u8 {
    let bits = f.to_bits() as i32;
    let smallfloat = bits >> (24 - 3);
    if smallfloat <= ((63 - 15) << 3) {
        return if bits <= 0 { 0 } else { 1 };
    }
    if smallfloat >= ((63 - 15) << 3) + 0x100 {
        return 255;
    }
    (smallfloat - ((63 - 15) << 3)) as u8
}

/// Decodes a norm byte back into the length-normalization factor.
pub fn decode_norm(byte: u8) -> f32 {
    NORM_TABLE[byte as usize]
}

/// The TF-IDF scoring primitives.
///
/// All functions are deterministic and total over their domains; degenerate inputs (zero
/// documents, zero overlap bound) are pinned to neutral values rather than producing NaN
/// or infinities.
#[derive(Clone, Copy, Debug, Default)]
pub struct Similarity;

impl Similarity {
    /// The length-normalization factor of a field with `num_terms` tokens.
    pub fn length_norm(&self, _field: &str, num_terms: u32) -> f32 {
        1.0 / (num_terms as f32).sqrt()
    }

    /// The query normalization factor for a weight sum.
    pub fn query_norm(&self, sum_of_squared_weights: f32) -> f32 {
        if sum_of_squared_weights <= 0.0 {
            1.0
        } else {
            1.0 / sum_of_squared_weights.sqrt()
        }
    }

    /// The term-frequency contribution of `freq` occurrences.
    pub fn tf(&self, freq: f32) -> f32 {
        freq.sqrt()
    }

    /// The frequency contribution of a sloppy phrase match at the given edit distance.
    pub fn sloppy_freq(&self, distance: i32) -> f32 {
        1.0 / (distance as f32 + 1.0)
    }

    /// The inverse document frequency of a term occurring in `doc_freq` of `num_docs`
    /// documents.
    pub fn idf(&self, doc_freq: usize, num_docs: usize) -> f32 {
        (num_docs.max(1) as f32 / (doc_freq as f32 + 1.0)).ln() + 1.0
    }

    /// Rewards documents matching `overlap` of the `max_overlap` coordinated clauses.
    pub fn coord(&self, overlap: usize, max_overlap: usize) -> f32 {
        if max_overlap == 0 {
            1.0
        } else {
            overlap as f32 / max_overlap as f32
        }
    }

    /// The idf of a single term, with statistics drawn from `searcher`.
    pub fn idf_term(&self, field: &str, term: &str, searcher: &dyn Searchable) -> Result<f32> {
        Ok(self.idf(searcher.doc_freq(field, term)?, searcher.max_doc() as usize))
    }

    /// The idf of a phrase: the sum of the idfs of every term at every position, alternatives
    /// included.
    pub fn idf_phrase(
        &self,
        field: &str,
        positions: &[PhrasePosition],
        searcher: &dyn Searchable,
    ) -> Result<f32> {
        let mut idf = 0.0;
        for position in positions {
            for term in &position.terms {
                idf += self.idf_term(field, term, searcher)?;
            }
        }
        Ok(idf)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, pretty_assertions::assert_eq, test_log::test};

    #[test]
    fn test_norm_byte_round_trip() {
        for byte in 0..=255u8 {
            assert_eq!(byte, encode_norm(decode_norm(byte)));
        }
    }

    #[test]
    fn test_norm_encoding_boundaries() {
        assert_eq!(encode_norm(0.0), 0);
        assert_eq!(decode_norm(0), 0.0);
        assert_eq!(encode_norm(-1.0), 0);
        assert_eq!(encode_norm(f32::MAX), 255);
        // values quantize downward onto the coarse byte grid
        assert_eq!(decode_norm(encode_norm(2.5)), 2.5);
        assert_eq!(decode_norm(encode_norm(2.4)), 2.0);
        assert_eq!(decode_norm(encode_norm(1.3)), 1.25);
    }

    #[test]
    fn test_similarity_primitives() {
        let sim = Similarity::default();
        assert_eq!(sim.length_norm("field", 16), 1.0 / 4.0);
        assert_eq!(sim.query_norm(16.0), 1.0 / 4.0);
        assert_eq!(sim.tf(9.0), 3.0);
        assert_eq!(sim.sloppy_freq(9), 1.0 / 10.0);
        assert_eq!(sim.idf(9, 10), 1.0);
        assert_eq!(sim.coord(12, 3), 4.0);
    }

    #[test]
    fn test_degenerate_inputs_stay_finite() {
        let sim = Similarity::default();
        assert_eq!(sim.query_norm(0.0), 1.0);
        assert_eq!(sim.coord(0, 0), 1.0);
        assert!(sim.idf(0, 0).is_finite());
    }
}
