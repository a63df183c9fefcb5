//! Runtime detection of `PCLMULQDQ`, with fallback to the portable backend.

use super::{pclmul, soft};

cpufeatures::new!(mul_intrinsics, "pclmulqdq");

/// Carry-less multiplication of 128-bit polynomials.
#[derive(Clone, Copy)]
pub struct Clmul {
    inner: Inner,
    token: mul_intrinsics::InitToken,
}

#[derive(Clone, Copy)]
union Inner {
    intrinsics: pclmul::Clmul,
    soft: soft::Clmul,
}

impl core::fmt::Debug for Clmul {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        unsafe {
            if self.token.get() {
                self.inner.intrinsics.fmt(f)
            } else {
                self.inner.soft.fmt(f)
            }
        }
    }
}

impl Clmul {
    /// Loads a polynomial from its little-endian bytes.
    #[inline]
    pub fn new(h: &[u8; 16]) -> Self {
        let (token, has_intrinsics) = mul_intrinsics::init_get();

        let inner = if has_intrinsics {
            Inner {
                intrinsics: pclmul::Clmul::new(h),
            }
        } else {
            Inner {
                soft: soft::Clmul::new(h),
            }
        };

        Self { inner, token }
    }

    /// Returns the low and high halves of the product.
    #[inline]
    pub fn clmul(self, x: Self) -> (Self, Self) {
        unsafe {
            let (lo, hi) = if self.token.get() {
                let (r0, r1) = self.inner.intrinsics.clmul(x.inner.intrinsics);
                (Inner { intrinsics: r0 }, Inner { intrinsics: r1 })
            } else {
                let (r0, r1) = self.inner.soft.clmul(x.inner.soft);
                (Inner { soft: r0 }, Inner { soft: r1 })
            };

            (
                Self {
                    inner: lo,
                    token: self.token,
                },
                Self {
                    inner: hi,
                    token: self.token,
                },
            )
        }
    }

    /// Reduces the 256-bit polynomial `y·x^128 + x` modulo the GCM polynomial
    /// `x^128 + x^7 + x^2 + x + 1`.
    #[inline]
    pub fn reduce_gcm(x: Self, y: Self) -> Self {
        unsafe {
            let inner = if x.token.get() {
                Inner {
                    intrinsics: pclmul::Clmul::reduce_gcm(x.inner.intrinsics, y.inner.intrinsics),
                }
            } else {
                Inner {
                    soft: soft::Clmul::reduce_gcm(x.inner.soft, y.inner.soft),
                }
            };

            Self {
                inner,
                token: x.token,
            }
        }
    }
}

impl From<Clmul> for [u8; 16] {
    #[inline]
    fn from(m: Clmul) -> [u8; 16] {
        unsafe {
            if m.token.get() {
                m.inner.intrinsics.into()
            } else {
                m.inner.soft.into()
            }
        }
    }
}

impl core::ops::BitXor for Clmul {
    type Output = Self;

    #[inline]
    fn bitxor(self, other: Self) -> Self::Output {
        unsafe {
            let inner = if self.token.get() {
                Inner {
                    intrinsics: self.inner.intrinsics ^ other.inner.intrinsics,
                }
            } else {
                Inner {
                    soft: self.inner.soft ^ other.inner.soft,
                }
            };

            Self {
                inner,
                token: self.token,
            }
        }
    }
}

impl PartialEq for Clmul {
    fn eq(&self, other: &Self) -> bool {
        <[u8; 16]>::from(*self) == <[u8; 16]>::from(*other)
    }
}
