// Copyright (c) 2026 rezky_nightky

use rand::Rng;

/// Half-open code point range `[low, high)` that rain glyphs are drawn from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GlyphRange {
    pub name: &'static str,
    pub low: u32,
    pub high: u32,
}

impl GlyphRange {
    pub const fn new(name: &'static str, low: u32, high: u32) -> Self {
        Self { name, low, high }
    }

    pub fn contains(&self, cp: u32) -> bool {
        cp >= self.low && cp < self.high
    }

    pub fn len(&self) -> u32 {
        self.high.saturating_sub(self.low)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub const GLYPH_RANGES: [GlyphRange; 5] = [
    GlyphRange::new("katakana", 0x30A0, 0x30FF),
    GlyphRange::new("cjk", 0x4E00, 0x4F80),
    GlyphRange::new("latin1-supplement", 0x00C0, 0x00FF),
    GlyphRange::new("latin-extended-additional", 0x1E00, 0x1EFF),
    GlyphRange::new("hangul", 0xAC00, 0xADFF),
];

const FALLBACK_GLYPH: char = '0';

/// Picks a range uniformly, then a code point uniformly inside it.
pub fn random_glyph<R: Rng + ?Sized>(rng: &mut R) -> char {
    let range = &GLYPH_RANGES[rng.random_range(0..GLYPH_RANGES.len())];
    if range.is_empty() {
        return FALLBACK_GLYPH;
    }
    let cp = range.low + rng.random_range(0..range.len());
    char::from_u32(cp).unwrap_or(FALLBACK_GLYPH)
}

#[allow(dead_code)]
pub fn range_of(ch: char) -> Option<&'static GlyphRange> {
    let cp = ch as u32;
    GLYPH_RANGES.iter().find(|r| r.contains(cp))
}

#[cfg(test)]
mod tests {
    use super::*;

    use proptest::prelude::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn ranges_do_not_overlap() {
        for (i, a) in GLYPH_RANGES.iter().enumerate() {
            for b in GLYPH_RANGES.iter().skip(i + 1) {
                assert!(a.high <= b.low || b.high <= a.low, "{} overlaps {}", a.name, b.name);
            }
        }
    }

    #[test]
    fn upper_bound_is_exclusive() {
        assert_eq!(range_of('\u{30A0}').map(|r| r.name), Some("katakana"));
        assert_eq!(range_of('\u{30FF}'), None);
        assert_eq!(range_of('A'), None);
    }

    #[test]
    fn every_range_gets_picked() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut seen = [0usize; GLYPH_RANGES.len()];
        for _ in 0..5000 {
            let ch = random_glyph(&mut rng);
            let idx = GLYPH_RANGES
                .iter()
                .position(|r| r.contains(ch as u32))
                .expect("glyph outside every range");
            seen[idx] += 1;
        }
        // 1000 expected per range
        for (range, n) in GLYPH_RANGES.iter().zip(seen) {
            assert!((800..1200).contains(&n), "{} picked {} times", range.name, n);
        }
    }

    proptest! {
        #[test]
        fn glyph_lies_in_exactly_one_range(seed in any::<u64>()) {
            let mut rng = StdRng::seed_from_u64(seed);
            for _ in 0..64 {
                let cp = random_glyph(&mut rng) as u32;
                let hits = GLYPH_RANGES.iter().filter(|r| r.contains(cp)).count();
                prop_assert_eq!(hits, 1);
            }
        }
    }
}
