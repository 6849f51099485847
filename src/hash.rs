/// Fast 2-value hash with xorshift
#[inline(always)]
pub fn hash2(a: u64, b: u64) -> u64 {
    let mut seed = a.wrapping_mul(2654435761).wrapping_add(b.wrapping_mul(2246822519));
    seed ^= seed << 13;
    seed ^= seed >> 7;
    seed ^= seed << 17;
    seed
}

/// Fast deterministic random in [0, 1) using splitmix64 - handles small seeds properly
#[inline(always)]
pub fn rand_simple(seed: u64) -> f64 {
    let mut x = seed.wrapping_mul(0x9e3779b97f4a7c15);
    x ^= x >> 30;
    x = x.wrapping_mul(0xbf58476d1ce4e5b9);
    x ^= x >> 27;
    x = x.wrapping_mul(0x94d049bb133111eb);
    x ^= x >> 31;
    (x >> 11) as f64 / 9007199254740992.0
}

/// Stable per-pixel threshold, so dithered fills don't shimmer between frames
#[inline(always)]
pub fn pixel_noise(x: i32, y: i32) -> f64 {
    rand_simple(hash2(x as u32 as u64, y as u32 as u64))
}
