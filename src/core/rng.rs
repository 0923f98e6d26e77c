//! Seeded pseudo-random source for battle resolution.
//!
//! A battle is replayable from its stored seed string alone, so the exact
//! bit mixing is part of the contract: two implementations sharing a seed
//! must produce the same sequence. Nothing here touches a platform RNG.

use rand::{Error, RngCore};

/// Initial hash words, one per state word.
const SEED_INIT: [u32; 3] = [0x6A09_E667, 0xBB67_AE85, 0x3C6E_F373];

/// Per-word multipliers applied while absorbing the seed.
const SEED_MUL: [u32; 3] = [0x85EB_CA77, 0xC2B2_AE3D, 0x27D4_EB2F];

const MIX_MUL_A: u32 = 0x7FEB_352D;
const MIX_MUL_B: u32 = 0x846C_A68B;

/// 2^32 as a float, the divisor that maps a `u32` into `[0, 1)`.
const U32_RANGE: f64 = 4_294_967_296.0;

fn avalanche(mut h: u32) -> u32 {
    h ^= h >> 16;
    h = h.wrapping_mul(MIX_MUL_A);
    h ^= h >> 15;
    h
}

/// Three-word generator state derived from a seed string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeededRng {
    state: [u32; 3],
}

impl SeededRng {
    /// Derives the generator state from a seed string.
    ///
    /// The seed is consumed as UTF-16 code units so that seeds containing
    /// non-ASCII characters hash identically to implementations that index
    /// strings by code unit.
    pub fn from_seed_str(seed: &str) -> Self {
        let [mut h1, mut h2, mut h3] = SEED_INIT;

        for unit in seed.encode_utf16() {
            let k = u32::from(unit);
            h1 = (h1 ^ k).wrapping_mul(SEED_MUL[0]);
            h2 = (h2 ^ (k << 1)).wrapping_mul(SEED_MUL[1]);
            h3 = (h3 ^ (k << 3)).wrapping_mul(SEED_MUL[2]);

            h1 ^= h2 >> 15;
            h2 ^= h3 >> 13;
            h3 ^= h1 >> 16;
        }

        let mut state = [avalanche(h1), avalanche(h2), avalanche(h3)];
        // An all-zero state would make the xorshift transform a fixed point
        if state == [0, 0, 0] {
            state[0] = 1;
        }

        Self { state }
    }

    /// Current state words. Exposed for diagnostics and tests.
    pub fn state(&self) -> [u32; 3] {
        self.state
    }

    /// Advances the state and returns the next mixed 32-bit output.
    pub fn next_word(&mut self) -> u32 {
        let [a, b, c] = self.state;

        let t0 = a ^ (a << 13) ^ (c >> 7);
        let t1 = b ^ (b >> 17) ^ (t0 << 3);
        let t2 = c ^ (c << 5) ^ (t1 >> 11);
        self.state = [t0, t1, t2];

        let mut x = t0.wrapping_add(t1).wrapping_add(t2);
        x ^= x >> 16;
        x = x.wrapping_mul(MIX_MUL_A);
        x ^= x >> 15;
        x = x.wrapping_mul(MIX_MUL_B);
        x ^= x >> 16;
        x
    }

    /// Returns the next float in `[0, 1)`.
    pub fn next_float(&mut self) -> f64 {
        f64::from(self.next_word()) / U32_RANGE
    }
}

impl RngCore for SeededRng {
    fn next_u32(&mut self) -> u32 {
        self.next_word()
    }

    fn next_u64(&mut self) -> u64 {
        let hi = u64::from(self.next_word());
        let lo = u64::from(self.next_word());
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let bytes = self.next_word().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

/// Draws a float in `[0, 1)` from any generator using one 32-bit word.
///
/// For a [`SeededRng`] this is identical to [`SeededRng::next_float`].
pub fn unit_float(rng: &mut impl RngCore) -> f64 {
    f64::from(rng.next_u32()) / U32_RANGE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = SeededRng::from_seed_str("battle-42");
        let mut b = SeededRng::from_seed_str("battle-42");

        for _ in 0..1000 {
            assert_eq!(a.next_float().to_bits(), b.next_float().to_bits());
        }
    }

    #[test]
    fn test_known_answer_vectors() {
        let cases: [(&str, [u32; 3], [u32; 4]); 4] = [
            (
                "",
                [0x18BA_4422, 0x7D1C_5883, 0x12FA_4CED],
                [0x07ED_B0FA, 0xD2A7_4ADD, 0xAAB2_E032, 0x9784_88F9],
            ),
            (
                "battle-42",
                [0x4D24_3BD6, 0x402E_33D2, 0x0A86_D696],
                [0x38A3_7479, 0x548C_C918, 0x36CB_328E, 0xA951_B966],
            ),
            (
                "3f2b8c1e-9d4a-4e6b-8f21-7c5d0a9e1b34",
                [0x963E_7CF3, 0x9229_A87F, 0x3D93_DB32],
                [0x3FF1_2A10, 0xEF25_7727, 0xCF20_B984, 0x4560_2D6F],
            ),
            (
                "é😀",
                [0xF639_C9F6, 0xE110_E95A, 0xBA8C_F120],
                [0xC179_2BC2, 0x06DF_F152, 0x3309_89A9, 0xEA18_5D03],
            ),
        ];

        for (seed, state, words) in cases {
            let mut rng = SeededRng::from_seed_str(seed);
            assert_eq!(rng.state(), state, "state for seed {:?}", seed);
            let drawn: Vec<u32> = (0..4).map(|_| rng.next_word()).collect();
            assert_eq!(drawn, words, "draws for seed {:?}", seed);
        }

        let r = SeededRng::from_seed_str("battle-42").next_float();
        assert_eq!(r, f64::from(0x38A3_7479u32) / 4_294_967_296.0);
    }

    #[test]
    fn test_different_seeds_diverge() {
        let mut a = SeededRng::from_seed_str("battle-42");
        let mut b = SeededRng::from_seed_str("battle-43");

        let seq_a: Vec<u32> = (0..8).map(|_| a.next_word()).collect();
        let seq_b: Vec<u32> = (0..8).map(|_| b.next_word()).collect();
        assert_ne!(seq_a, seq_b);
    }

    #[test]
    fn test_floats_in_unit_interval() {
        let mut rng = SeededRng::from_seed_str("range-check");
        for _ in 0..10_000 {
            let r = rng.next_float();
            assert!((0.0..1.0).contains(&r), "draw out of range: {}", r);
        }
    }

    #[test]
    fn test_empty_seed_is_usable() {
        let mut rng = SeededRng::from_seed_str("");
        assert_ne!(rng.state(), [0, 0, 0]);

        let first = rng.next_float();
        let second = rng.next_float();
        assert_ne!(first, second);
    }

    #[test]
    fn test_non_ascii_seed_hashes_code_units() {
        // "é" is one UTF-16 unit, "😀" is two
        let a = SeededRng::from_seed_str("é");
        let b = SeededRng::from_seed_str("😀");
        assert_ne!(a.state(), b.state());
    }

    #[test]
    fn test_unit_float_matches_next_float() {
        let mut a = SeededRng::from_seed_str("same");
        let mut b = SeededRng::from_seed_str("same");
        for _ in 0..100 {
            assert_eq!(unit_float(&mut a).to_bits(), b.next_float().to_bits());
        }
    }

    #[test]
    fn test_draws_are_roughly_uniform() {
        let mut rng = SeededRng::from_seed_str("uniformity");
        let mut buckets = [0u32; 10];
        for _ in 0..100_000 {
            let idx = (rng.next_float() * 10.0) as usize;
            buckets[idx] += 1;
        }
        for count in buckets {
            assert!(
                (9_000..11_000).contains(&count),
                "bucket count {} far from 10000",
                count
            );
        }
    }

    #[test]
    fn test_fill_bytes_handles_partial_chunks() {
        let mut rng = SeededRng::from_seed_str("bytes");
        let mut buf = [0u8; 7];
        rng.fill_bytes(&mut buf);
        assert!(buf.iter().any(|&b| b != 0));
    }
}
