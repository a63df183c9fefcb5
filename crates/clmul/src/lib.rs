//! Carry-less multiplication of 128-bit polynomials over GF(2), and reduction
//! modulo the GCM polynomial `x^128 + x^7 + x^2 + x + 1`.
//!
//! # Backends
//!
//! On `x86`/`x86_64` the `PCLMULQDQ` instruction is detected at runtime and used
//! when available. Otherwise a constant-time portable implementation based on
//! BearSSL's `ghash_ctmul64.c` is used.
//!
//! The portable backend can be forced with the `clmul_force_soft` cfg flag:
//!
//! ```text
//! $ RUSTFLAGS="--cfg clmul_force_soft" cargo test
//! ```
//!
//! Bytes are read as a little-endian integer, so bit `i` of the input is the
//! coefficient of `x^i`.

#![cfg_attr(not(test), no_std)]

mod backend;
pub use backend::Clmul;

#[cfg(test)]
mod tests {
    use super::backend::soft;
    use super::Clmul;
    use rand::Rng;
    use rand_chacha::{rand_core::SeedableRng, ChaCha12Rng};

    fn clmul_bytes(a: &[u8; 16], b: &[u8; 16]) -> ([u8; 16], [u8; 16]) {
        let (lo, hi) = Clmul::new(a).clmul(Clmul::new(b));
        (lo.into(), hi.into())
    }

    // Shift-and-add product of two 128-bit polynomials.
    fn reference_clmul(a: u128, b: u128) -> (u128, u128) {
        let (mut lo, mut hi) = (0u128, 0u128);
        for i in 0..128 {
            if (b >> i) & 1 == 1 {
                lo ^= a << i;
                if i > 0 {
                    hi ^= a >> (128 - i);
                }
            }
        }
        (lo, hi)
    }

    #[test]
    fn test_clmul_intel_vectors() {
        // Intel® Carry-Less Multiplication Instruction and its Usage for Computing
        // the GCM Mode, figure 5.
        let xmm1_high = 0x7b5b546573745665_u128.to_le_bytes();
        let xmm1_low = 0x63746f725d53475d_u128.to_le_bytes();
        let xmm2_high = 0x4869285368617929_u128.to_le_bytes();
        let xmm2_low = 0x5b477565726f6e5d_u128.to_le_bytes();
        let zero = [0u8; 16];

        assert_eq!(
            clmul_bytes(&xmm2_low, &xmm1_low),
            (0x1d4d84c85c3440c0929633d5d36f0451_u128.to_le_bytes(), zero)
        );
        assert_eq!(
            clmul_bytes(&xmm2_high, &xmm1_low),
            (0x1bd17c8d556ab5a17fa540ac2a281315_u128.to_le_bytes(), zero)
        );
        assert_eq!(
            clmul_bytes(&xmm2_low, &xmm1_high),
            (0x1a2bf6db3a30862fbabf262df4b7d5c9_u128.to_le_bytes(), zero)
        );
        assert_eq!(
            clmul_bytes(&xmm2_high, &xmm1_high),
            (0x1d1e1f2c592e7c45d66ee03e410fd4ed_u128.to_le_bytes(), zero)
        );
    }

    #[test]
    fn test_clmul_matches_reference() {
        let mut rng = ChaCha12Rng::from_seed([0; 32]);
        for _ in 0..256 {
            let a: u128 = rng.gen();
            let b: u128 = rng.gen();

            let (lo, hi) = reference_clmul(a, b);
            let (c, d) = clmul_bytes(&a.to_le_bytes(), &b.to_le_bytes());
            assert_eq!(u128::from_le_bytes(c), lo);
            assert_eq!(u128::from_le_bytes(d), hi);

            let (s0, s1) = soft::Clmul::new(&a.to_le_bytes())
                .clmul(soft::Clmul::new(&b.to_le_bytes()));
            assert_eq!(<[u8; 16]>::from(s0), c);
            assert_eq!(<[u8; 16]>::from(s1), d);
        }
    }

    #[test]
    fn test_reduce_matches_soft() {
        let mut rng = ChaCha12Rng::from_seed([1; 32]);
        for _ in 0..64 {
            let x: [u8; 16] = rng.gen();
            let y: [u8; 16] = rng.gen();

            let soft: [u8; 16] =
                soft::Clmul::reduce_gcm(soft::Clmul::new(&x), soft::Clmul::new(&y)).into();
            let dispatched: [u8; 16] = Clmul::reduce_gcm(Clmul::new(&x), Clmul::new(&y)).into();

            assert_eq!(soft, dispatched);
        }
    }

    #[test]
    fn test_reduce_folds_high_half() {
        // x^128 = x^7 + x^2 + x + 1
        let lo = Clmul::new(&[0u8; 16]);
        let hi = Clmul::new(&1u128.to_le_bytes());
        let r: [u8; 16] = Clmul::reduce_gcm(lo, hi).into();
        assert_eq!(u128::from_le_bytes(r), 0x87);
    }
}
