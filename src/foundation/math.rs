/// SplitMix64 finaliser.
pub(crate) fn mix64(mut z: u64) -> u64 {
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Stateless per-pixel hash; the same `(seed, x, y, c)` always yields the same value.
pub(crate) fn hash_coords(seed: u64, x: u32, y: u32, c: u32) -> u64 {
    let mut h = mix64(seed ^ 0x51_7CC1_B727_220A);
    h = mix64(h ^ u64::from(x));
    h = mix64(h ^ (u64::from(y) << 21));
    mix64(h ^ (u64::from(c) << 42))
}

/// Quantise a `[0, 1]` sample to 8 bits (round half up, clamped).
pub(crate) fn to_u8(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0 + 0.5) as u8
}

pub(crate) fn from_u8(v: u8) -> f32 {
    f32::from(v) / 255.0
}
