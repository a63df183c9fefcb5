//! `PCLMULQDQ`-accelerated implementation for x86/x86_64 CPUs (Intel Westmere
//! and newer).
//!
//! The reduction is adapted from EMP Toolkit's `gfmul`.

#[cfg(target_arch = "x86")]
use core::arch::x86::*;
#[cfg(target_arch = "x86_64")]
use core::arch::x86_64::*;

use core::ops::BitXor;

#[derive(Clone, Copy, Debug)]
pub(crate) struct Clmul(__m128i);

impl From<Clmul> for [u8; 16] {
    #[inline]
    fn from(m: Clmul) -> [u8; 16] {
        unsafe { core::mem::transmute(m.0) }
    }
}

impl BitXor for Clmul {
    type Output = Self;

    #[inline]
    fn bitxor(self, other: Self) -> Self::Output {
        unsafe { Self(_mm_xor_si128(self.0, other.0)) }
    }
}

impl PartialEq for Clmul {
    fn eq(&self, other: &Self) -> bool {
        <[u8; 16]>::from(*self) == <[u8; 16]>::from(*other)
    }
}

impl Clmul {
    #[inline]
    pub(crate) fn new(bytes: &[u8; 16]) -> Self {
        unsafe { Self(_mm_loadu_si128(bytes.as_ptr() as *const __m128i)) }
    }

    /// Must only be called when `pclmulqdq` is available.
    #[inline]
    pub(crate) fn clmul(self, x: Self) -> (Self, Self) {
        unsafe { clmul_unsafe(self.0, x.0) }
    }

    /// Must only be called when `pclmulqdq` is available.
    #[inline]
    pub(crate) fn reduce_gcm(x: Self, y: Self) -> Self {
        unsafe { reduce_gcm_unsafe(x.0, y.0) }
    }
}

#[inline]
#[target_feature(enable = "pclmulqdq,sse2")]
unsafe fn clmul_unsafe(a: __m128i, b: __m128i) -> (Clmul, Clmul) {
    let lo = _mm_clmulepi64_si128(a, b, 0x00);
    let hi = _mm_clmulepi64_si128(a, b, 0x11);
    let mid = _mm_xor_si128(
        _mm_clmulepi64_si128(a, b, 0x01),
        _mm_clmulepi64_si128(a, b, 0x10),
    );

    (
        Clmul(_mm_xor_si128(lo, _mm_slli_si128(mid, 8))),
        Clmul(_mm_xor_si128(hi, _mm_srli_si128(mid, 8))),
    )
}

#[inline]
#[target_feature(enable = "sse2")]
unsafe fn reduce_gcm_unsafe(x: __m128i, y: __m128i) -> Clmul {
    let xmmmask = _mm_setr_epi32(-1, 0x0, 0x0, 0x0);

    let tmp7 = _mm_srli_epi32(y, 31);
    let tmp8 = _mm_srli_epi32(y, 30);
    let tmp9 = _mm_srli_epi32(y, 25);
    let tmp7 = _mm_xor_si128(tmp7, tmp8);
    let tmp7 = _mm_xor_si128(tmp7, tmp9);

    let tmp8 = _mm_shuffle_epi32(tmp7, 147);
    let tmp7 = _mm_and_si128(xmmmask, tmp8);
    let tmp8 = _mm_andnot_si128(xmmmask, tmp8);

    let x = _mm_xor_si128(x, tmp8);
    let y = _mm_xor_si128(y, tmp7);

    let x = _mm_xor_si128(x, _mm_slli_epi32(y, 1));
    let x = _mm_xor_si128(x, _mm_slli_epi32(y, 2));
    let x = _mm_xor_si128(x, _mm_slli_epi32(y, 7));

    Clmul(_mm_xor_si128(x, y))
}
