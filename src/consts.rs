// Floating point comparisons
pub const FEQ_EPSILON: f64 = 0.0001;

// Offset applied along the normal for over/under points
pub const SURFACE_EPSILON: f64 = 0.00001;

// Below this, a direction component counts as parallel to a plane or slab.
pub const PARALLEL_EPSILON: f64 = 0.000001;

// Default recursion budget for reflected and refracted rays
pub const DEFAULT_MAX_BOUNCES: usize = 5;

// Default seed for area light jitter
pub const DEFAULT_SEED: u64 = 0x5eed;

// Common refraction indices
pub const VACUUM_RI: f64 = 1.0;
pub const AIR_RI: f64 = 1.00029;
pub const WATER_RI: f64 = 1.333;
pub const GLASS_RI: f64 = 1.5;
pub const DIAMOND_RI: f64 = 2.417;
