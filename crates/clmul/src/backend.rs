//! Backend selection, with fallback to the portable backend when CPU intrinsics
//! are unavailable.

use cfg_if::cfg_if;

pub(crate) mod soft;

impl soft::Clmul {
    /// Reduces the 256-bit polynomial `y·x^128 + x` modulo the GCM polynomial
    /// `x^128 + x^7 + x^2 + x + 1`.
    ///
    /// Page 16 of [Intel® Carry-Less Multiplication Instruction and its Usage for
    /// Computing the GCM Mode rev 2.02]
    /// (https://www.intel.com/content/dam/develop/external/us/en/documents/clmul-wp-rev-2-02-2014-04-20.pdf)
    pub fn reduce_gcm(x: Self, y: Self) -> Self {
        fn sep(x: u128) -> (u64, u64) {
            // (high, low)
            ((x >> 64) as u64, x as u64)
        }
        fn join(u: u64, l: u64) -> u128 {
            ((u as u128) << 64) | (l as u128)
        }

        let x: u128 = bytemuck::cast(x);
        let y: u128 = bytemuck::cast(y);

        let (x3, x2) = sep(y);
        let (x1, x0) = sep(x);
        let a = x3 >> 63;
        let b = x3 >> 62;
        let c = x3 >> 57;
        let d = x2 ^ a ^ b ^ c;
        let (e1, e0) = sep(join(x3, d) << 1);
        let (f1, f0) = sep(join(x3, d) << 2);
        let (g1, g0) = sep(join(x3, d) << 7);
        let h1 = x3 ^ e1 ^ f1 ^ g1;
        let h0 = d ^ e0 ^ f0 ^ g0;
        bytemuck::cast(join(x1 ^ h1, x0 ^ h0))
    }
}

cfg_if! {
    if #[cfg(all(any(target_arch = "x86_64", target_arch = "x86"), not(clmul_force_soft)))] {
        mod autodetect;
        mod pclmul;
        pub use autodetect::Clmul;
    } else {
        pub use soft::Clmul;
    }
}
