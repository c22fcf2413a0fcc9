//! Quality classification and playback-option generation.
//!
//! Bitrate is derived as `byte_size * 8 / duration_secs`, which ignores
//! container overhead; the error is small for typical video and acceptable
//! for classification purposes. The classification thresholds are an
//! editorial table, not a contract — tune freely as long as each tier stays
//! monotonic (high > medium > low).

use relaycast_common::QualityLevel;
use serde::{Deserialize, Serialize};

/// Raw metadata as reported by the upstream store. All fields are optional in
/// practice; missing numerics are zero and a missing mime type is unknown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawMediaInfo {
    pub width: u32,
    pub height: u32,
    pub duration_millis: u64,
    pub byte_size: u64,
    pub mime_type: Option<String>,
}

/// Coarse bitrate quality bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityScore {
    High,
    Medium,
    Low,
}

/// Bitrate classification with display metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BitrateClass {
    pub level: QualityScore,
    pub label: String,
    pub color: String,
}

/// One entry of the playback-quality menu.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityOption {
    pub id: String,
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub bitrate_bps: u64,
    pub is_original: bool,
}

/// Full analysis result, serialized straight into API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QualityReport {
    pub resolution_label: String,
    pub width: u32,
    pub height: u32,
    pub duration_millis: u64,
    pub byte_size: u64,
    pub bitrate_bps: u64,
    pub classification: BitrateClass,
    pub options: Vec<QualityOption>,
}

impl QualityReport {
    /// Look up the option matching a quality selector, falling back to the
    /// original when the selector has no entry (e.g. a 1080p request against
    /// a 720p source).
    pub fn option_for(&self, level: QualityLevel) -> &QualityOption {
        self.options
            .iter()
            .find(|o| o.id == level.as_str())
            .unwrap_or_else(|| {
                self.options
                    .iter()
                    .find(|o| o.is_original)
                    .expect("options always contain original")
            })
    }
}

/// Bitrate thresholds per resolution tier, in Mbps.
struct Tier {
    min_height: u32,
    high_mbps: f64,
    medium_mbps: f64,
}

/// Ordered highest tier first. Heights below the last tier use its
/// thresholds.
const TIERS: &[Tier] = &[
    Tier { min_height: 2160, high_mbps: 45.0, medium_mbps: 20.0 },
    Tier { min_height: 1440, high_mbps: 24.0, medium_mbps: 10.0 },
    Tier { min_height: 1080, high_mbps: 12.0, medium_mbps: 5.0 },
    Tier { min_height: 720, high_mbps: 7.5, medium_mbps: 3.0 },
    Tier { min_height: 480, high_mbps: 4.0, medium_mbps: 1.5 },
    Tier { min_height: 360, high_mbps: 2.0, medium_mbps: 0.7 },
    Tier { min_height: 240, high_mbps: 1.0, medium_mbps: 0.3 },
];

/// Target bitrate per preset level, in bits per second.
const PRESETS: &[(QualityLevel, u32, u64)] = &[
    (QualityLevel::Q1080, 1080, 8_000_000),
    (QualityLevel::Q720, 720, 5_000_000),
    (QualityLevel::Q480, 480, 2_500_000),
    (QualityLevel::Q360, 360, 1_000_000),
];

/// Analyze raw metadata into a quality report.
pub fn analyze(info: &RawMediaInfo) -> QualityReport {
    let bitrate_bps = derive_bitrate(info.byte_size, info.duration_millis);
    QualityReport {
        resolution_label: resolution_label(info.width, info.height),
        width: info.width,
        height: info.height,
        duration_millis: info.duration_millis,
        byte_size: info.byte_size,
        bitrate_bps,
        classification: classify_bitrate(info.height, bitrate_bps),
        options: quality_options(info.width, info.height, bitrate_bps),
    }
}

fn resolution_label(width: u32, height: u32) -> String {
    let max_dim = width.max(height);
    match max_dim {
        0 => "Unknown".to_string(),
        d if d >= 3840 => "4K Ultra HD".to_string(),
        d if d >= 2560 => "1440p QHD".to_string(),
        d if d >= 1920 => "1080p Full HD".to_string(),
        d if d >= 1280 => "720p HD".to_string(),
        d if d >= 854 => "480p SD".to_string(),
        d if d >= 640 => "360p".to_string(),
        d if d >= 426 => "240p".to_string(),
        _ => format!("{width}x{height}"),
    }
}

/// Approximate stream bitrate in bits per second; 0 when duration is unknown.
fn derive_bitrate(byte_size: u64, duration_millis: u64) -> u64 {
    if duration_millis == 0 {
        return 0;
    }
    byte_size.saturating_mul(8).saturating_mul(1000) / duration_millis
}

fn classify_bitrate(height: u32, bitrate_bps: u64) -> BitrateClass {
    let tier = TIERS
        .iter()
        .find(|t| height >= t.min_height)
        .unwrap_or_else(|| TIERS.last().expect("tier table is non-empty"));

    let mbps = bitrate_bps as f64 / 1_000_000.0;
    let (level, label, color) = if mbps >= tier.high_mbps {
        (QualityScore::High, "High quality", "#22c55e")
    } else if mbps >= tier.medium_mbps {
        (QualityScore::Medium, "Medium quality", "#eab308")
    } else {
        (QualityScore::Low, "Low quality", "#ef4444")
    };

    BitrateClass {
        level,
        label: label.to_string(),
        color: color.to_string(),
    }
}

fn quality_options(width: u32, height: u32, bitrate_bps: u64) -> Vec<QualityOption> {
    let mut options = vec![QualityOption {
        id: QualityLevel::Original.as_str().to_string(),
        label: if width == 0 && height == 0 {
            "Original".to_string()
        } else {
            format!("Original ({width}x{height})")
        },
        width,
        height,
        bitrate_bps,
        is_original: true,
    }];

    if height == 0 {
        return options;
    }

    for (level, target_height, target_bitrate) in PRESETS {
        // Equal heights would duplicate the original entry; never upscale.
        if *target_height >= height {
            continue;
        }
        let bitrate = if bitrate_bps > 0 {
            (*target_bitrate).min(bitrate_bps)
        } else {
            *target_bitrate
        };
        options.push(QualityOption {
            id: level.as_str().to_string(),
            label: level.as_str().to_string(),
            width: scaled_width(width, height, *target_height),
            height: *target_height,
            bitrate_bps: bitrate,
            is_original: false,
        });
    }

    options
}

/// Width preserving the source aspect ratio, rounded to an even pixel count.
fn scaled_width(width: u32, height: u32, target_height: u32) -> u32 {
    if height == 0 {
        return 0;
    }
    let scaled = (width as u64 * target_height as u64 + height as u64 / 2) / height as u64;
    (scaled as u32) & !1
}
