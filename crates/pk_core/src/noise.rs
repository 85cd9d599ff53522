//! Seeded 1D value noise used for procedural camera shake.

/// Smooth pseudo-random signal in `[-1, 1]`.
///
/// Lattice values come from an integer hash, blended with a quintic
/// smoothstep so the signal is continuous in value and slope.
#[derive(Debug, Clone, Copy)]
pub struct ValueNoise {
    pub seed: u32,
    pub frequency: f32,
}

impl ValueNoise {
    pub fn new(seed: u32, frequency: f32) -> Self {
        Self { seed, frequency }
    }

    pub fn sample(&self, t: f32) -> f32 {
        value_noise_1d(t * self.frequency, self.seed)
    }
}

fn hash_i(i: i32, seed: u32) -> f32 {
    // 1D integer hash → [0,1)
    let mut x = (i as u64).wrapping_mul(0x27d4_eb2d);
    x ^= (seed as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    let u = x ^ (x >> 33);
    (u as f64 / (u64::MAX as f64)) as f32
}

pub fn value_noise_1d(x: f32, seed: u32) -> f32 {
    let xi = x.floor() as i32;
    let tx = x - xi as f32;
    let sx = tx * tx * tx * (tx * (tx * 6.0 - 15.0) + 10.0);
    let a = hash_i(xi, seed);
    let b = hash_i(xi + 1, seed);
    ((a * (1.0 - sx) + b * sx) * 2.0) - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_is_deterministic() {
        let a = value_noise_1d(12.34, 42);
        let b = value_noise_1d(12.34, 42);
        assert!((a - b).abs() < 1e-6);
    }

    #[test]
    fn noise_stays_in_range() {
        let noise = ValueNoise::new(7, 35.0);
        for i in 0..2000 {
            let v = noise.sample(i as f32 * 0.013);
            assert!((-1.0..=1.0).contains(&v), "sample {i} out of range: {v}");
        }
    }

    #[test]
    fn different_seeds_decorrelate() {
        let differs = (0..50).any(|i| {
            let t = i as f32 * 0.37;
            (value_noise_1d(t, 1) - value_noise_1d(t, 2)).abs() > 1e-3
        });
        assert!(differs);
    }

    #[test]
    fn noise_is_continuous() {
        let step = 1e-3;
        for i in 0..1000 {
            let t = i as f32 * 0.01;
            let d = (value_noise_1d(t + step, 3) - value_noise_1d(t, 3)).abs();
            assert!(d < 0.05, "jump of {d} at {t}");
        }
    }
}
