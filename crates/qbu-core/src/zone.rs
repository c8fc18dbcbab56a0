//! # Shipping Zone Resolution
//!
//! Maps a free-text prefecture name to one of the nine shipping zones via a
//! fixed 47-entry table. Free text comes from the postal-lookup widget or a
//! hand-typed address, so the lookup tolerates a missing prefecture suffix
//! (県/府/都/道) but nothing fuzzier than that.
//!
//! Unmatched input resolves to `None`, never an error; the rate lookup
//! chain downstream decides what an unknown destination costs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

// =============================================================================
// Zone
// =============================================================================

/// A shipping-cost region, roughly ordered by distance from the Kanto hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Zone {
    Hokkaido,
    Tohoku,
    Kanto,
    Chubu,
    Kinki,
    Chugoku,
    Shikoku,
    Kyushu,
    Okinawa,
}

impl Zone {
    /// All nine zones. The rate matrix covers exactly these.
    pub const ALL: [Zone; 9] = [
        Zone::Hokkaido,
        Zone::Tohoku,
        Zone::Kanto,
        Zone::Chubu,
        Zone::Kinki,
        Zone::Chugoku,
        Zone::Shikoku,
        Zone::Kyushu,
        Zone::Okinawa,
    ];

    /// The wire/storage name ("kanto", "kinki", ...).
    pub const fn as_str(&self) -> &'static str {
        match self {
            Zone::Hokkaido => "hokkaido",
            Zone::Tohoku => "tohoku",
            Zone::Kanto => "kanto",
            Zone::Chubu => "chubu",
            Zone::Kinki => "kinki",
            Zone::Chugoku => "chugoku",
            Zone::Shikoku => "shikoku",
            Zone::Kyushu => "kyushu",
            Zone::Okinawa => "okinawa",
        }
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Zone {
    type Err = ();

    /// Parses a storage/wire zone name. Case- and whitespace-insensitive;
    /// this is the single normalization point for zone strings coming from
    /// config rows.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hokkaido" => Ok(Zone::Hokkaido),
            "tohoku" => Ok(Zone::Tohoku),
            "kanto" => Ok(Zone::Kanto),
            "chubu" => Ok(Zone::Chubu),
            "kinki" => Ok(Zone::Kinki),
            "chugoku" => Ok(Zone::Chugoku),
            "shikoku" => Ok(Zone::Shikoku),
            "kyushu" => Ok(Zone::Kyushu),
            "okinawa" => Ok(Zone::Okinawa),
            _ => Err(()),
        }
    }
}

// =============================================================================
// Prefecture Table
// =============================================================================

/// The fixed prefecture → zone table, all 47 prefectures.
const PREFECTURE_ZONES: [(&str, Zone); 47] = [
    ("北海道", Zone::Hokkaido),
    ("青森県", Zone::Tohoku),
    ("岩手県", Zone::Tohoku),
    ("宮城県", Zone::Tohoku),
    ("秋田県", Zone::Tohoku),
    ("山形県", Zone::Tohoku),
    ("福島県", Zone::Tohoku),
    ("茨城県", Zone::Kanto),
    ("栃木県", Zone::Kanto),
    ("群馬県", Zone::Kanto),
    ("埼玉県", Zone::Kanto),
    ("千葉県", Zone::Kanto),
    ("東京都", Zone::Kanto),
    ("神奈川県", Zone::Kanto),
    ("新潟県", Zone::Chubu),
    ("富山県", Zone::Chubu),
    ("石川県", Zone::Chubu),
    ("福井県", Zone::Chubu),
    ("山梨県", Zone::Chubu),
    ("長野県", Zone::Chubu),
    ("岐阜県", Zone::Chubu),
    ("静岡県", Zone::Chubu),
    ("愛知県", Zone::Chubu),
    ("三重県", Zone::Kinki),
    ("滋賀県", Zone::Kinki),
    ("京都府", Zone::Kinki),
    ("大阪府", Zone::Kinki),
    ("兵庫県", Zone::Kinki),
    ("奈良県", Zone::Kinki),
    ("和歌山県", Zone::Kinki),
    ("鳥取県", Zone::Chugoku),
    ("島根県", Zone::Chugoku),
    ("岡山県", Zone::Chugoku),
    ("広島県", Zone::Chugoku),
    ("山口県", Zone::Chugoku),
    ("徳島県", Zone::Shikoku),
    ("香川県", Zone::Shikoku),
    ("愛媛県", Zone::Shikoku),
    ("高知県", Zone::Shikoku),
    ("福岡県", Zone::Kyushu),
    ("佐賀県", Zone::Kyushu),
    ("長崎県", Zone::Kyushu),
    ("熊本県", Zone::Kyushu),
    ("大分県", Zone::Kyushu),
    ("宮崎県", Zone::Kyushu),
    ("鹿児島県", Zone::Kyushu),
    ("沖縄県", Zone::Okinawa),
];

/// Strips a trailing prefecture suffix character (県/府/都/道), if any.
fn strip_suffix(name: &str) -> &str {
    name.strip_suffix('県')
        .or_else(|| name.strip_suffix('府'))
        .or_else(|| name.strip_suffix('都'))
        .or_else(|| name.strip_suffix('道'))
        .unwrap_or(name)
}

/// Resolves a free-text prefecture name to its shipping zone.
///
/// ## Contract
/// - Exact match against the 47-entry table first
/// - On miss, retry suffix-insensitively ("神奈川" matches "神奈川県")
/// - Returns `None` when nothing matches; never errors
///
/// ## Example
/// ```rust
/// use qbu_core::zone::{resolve_zone, Zone};
///
/// assert_eq!(resolve_zone("神奈川県"), Some(Zone::Kanto));
/// assert_eq!(resolve_zone("神奈川"), Some(Zone::Kanto));
/// assert_eq!(resolve_zone("unknown prefecture"), None);
/// ```
pub fn resolve_zone(prefecture: &str) -> Option<Zone> {
    let name = prefecture.trim();
    if name.is_empty() {
        return None;
    }

    if let Some(&(_, zone)) = PREFECTURE_ZONES.iter().find(|(p, _)| *p == name) {
        return Some(zone);
    }

    let stripped = strip_suffix(name);
    PREFECTURE_ZONES
        .iter()
        .find(|(p, _)| strip_suffix(p) == stripped)
        .map(|&(_, zone)| zone)
}

// =============================================================================
// Unit Tests
// =============================================================================
