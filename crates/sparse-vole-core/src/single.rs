//! Single-point correlation from one base correlation and one punctured tree.

use sparse_fields::Field;

/// Computes the receiver's correction `d = γ - Σ_i v[i]`.
#[inline]
pub(crate) fn receiver_correction<F: Field>(gamma: F, v: &[F]) -> F {
    gamma - v.iter().fold(F::zero(), |acc, &x| acc + x)
}

/// Completes the sender's vector in place.
///
/// `w` holds every leaf except `w[alpha]`, which must be zero on entry. On return
/// `w[alpha] = δ - (d + Σ_{i≠α} w[i])`.
#[inline]
pub(crate) fn complete_sender_vector<F: Field>(w: &mut [F], alpha: usize, delta_share: F, d: F) {
    debug_assert!(w[alpha].is_zero());
    let sum = w.iter().fold(F::zero(), |acc, &x| acc + x);
    w[alpha] = delta_share - (d + sum);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha12Rng;
    use sparse_fields::{ExtensionField, Gf2, Gf2_128, UniformRand};

    #[test]
    fn test_single_point_relation() {
        let mut rng = ChaCha12Rng::seed_from_u64(0);
        let n = 8;
        let alpha = 3;

        let delta = Gf2_128::rand(&mut rng);
        let beta = Gf2::new(true);
        let t = Gf2_128::rand(&mut rng);
        let gamma = Gf2_128::mixed_mul(beta, delta) + t;

        let v: Vec<Gf2_128> = (0..n).map(|_| Gf2_128::rand(&mut rng)).collect();
        let d = receiver_correction(gamma, &v);

        let mut w = v.clone();
        w[alpha] = Gf2_128::zero();
        complete_sender_vector(&mut w, alpha, t, d);

        for i in 0..n {
            let u = if i == alpha { beta } else { Gf2::zero() };
            assert_eq!(v[i], w[i] + Gf2_128::mixed_mul(u, delta));
        }
    }
}
