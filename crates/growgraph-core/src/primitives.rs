//! # Engine Primitives
//!
//! Hardcoded constants shared across the engine.
//!
//! These are compiled into the binary and are immutable at runtime. Anything
//! a benchmark author should tune lives in a schema definition instead.

/// Reference scale at which a scaling Zipf distribution's starting exponent
/// is defined.
///
/// A `ScalingBoundedZipf` keeps `mean / range` equal to what it was at this
/// scale with the configured starting exponent.
pub const ZIPF_REFERENCE_SCALE: u64 = 40;

/// Lower bound of the exponent search for a rescaled Zipf distribution.
pub const ZIPF_EXPONENT_LOWER_BOUND: f64 = 0.001;

/// Upper bound of the exponent search for a rescaled Zipf distribution.
pub const ZIPF_EXPONENT_UPPER_BOUND: f64 = 100.0;

/// Bisection steps used when re-solving a Zipf exponent.
///
/// 64 halvings of `[0.001, 100]` are well below f64 resolution.
pub const ZIPF_SOLVER_ITERATIONS: usize = 64;

/// Alphabet used by random string value providers.
pub const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Attempts a unique random string provider makes before it reports
/// exhaustion.
pub const MAX_UNIQUE_STRING_RETRIES: usize = 32;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for type and role labels.
///
/// Labels longer than this are rejected by strategy constructors and the
/// Ingestor.
pub const MAX_LABEL_LENGTH: usize = 256;

/// Maximum length for string attribute values accepted by the Ingestor.
pub const MAX_VALUE_LENGTH: usize = 65536;

/// Prefix of implicit attribute-ownership relation labels.
pub const OWNERSHIP_PREFIX: &str = "@has-";
