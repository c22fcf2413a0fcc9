//! Relaycast-Media: pure media quality analysis.
//!
//! Maps raw resource metadata (dimensions, duration, byte size, mime type)
//! into a resolution label, a derived bitrate with a coarse quality
//! classification, and a menu of playback-quality options. No I/O, no shared
//! state; everything here is a pure function over its inputs.

mod quality;

pub use quality::{
    analyze, BitrateClass, QualityOption, QualityReport, QualityScore, RawMediaInfo,
};
