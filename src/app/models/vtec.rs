//! VTEC data models
//!
//! Valid Time Event Codes identify a specific hazard event, the action a
//! bulletin takes on it, and its validity window. Class, action, phenomena
//! and significance are closed enums with an explicit unknown variant so the
//! reconciler's transition table is an exhaustive match rather than string
//! comparison.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::Polygon;

// =============================================================================
// Code Vocabulary
// =============================================================================

/// VTEC product class
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VtecClass {
    /// Operational product ("O")
    Operational,
    /// Test product ("T") - never creates or mutates events
    Test,
    /// Experimental product ("E")
    Experimental,
    /// Experimental VTEC in an operational product ("X")
    ExperimentalVtec,
    /// Unrecognized class letter
    Unknown(String),
}

impl VtecClass {
    pub fn from_code(code: &str) -> Self {
        match code {
            "O" => Self::Operational,
            "T" => Self::Test,
            "E" => Self::Experimental,
            "X" => Self::ExperimentalVtec,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Operational => "O",
            Self::Test => "T",
            Self::Experimental => "E",
            Self::ExperimentalVtec => "X",
            Self::Unknown(code) => code,
        }
    }
}

/// VTEC action code, driving the reconciler's state machine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VtecAction {
    /// NEW - event begins
    New,
    /// CON - event continues
    Continues,
    /// EXT - event extended in time
    ExtendedTime,
    /// EXA - event extended in area
    ExtendedArea,
    /// EXB - event extended in both time and area
    ExtendedBoth,
    /// UPG - event upgraded (and thereby closed under its old key)
    Upgraded,
    /// CAN - event cancelled
    Cancelled,
    /// EXP - event expired
    Expired,
    /// COR - correction
    Correction,
    /// ROU - routine, never drives the state machine
    Routine,
    /// Unrecognized action code
    Unknown(String),
}

impl VtecAction {
    pub fn from_code(code: &str) -> Self {
        match code {
            "NEW" => Self::New,
            "CON" => Self::Continues,
            "EXT" => Self::ExtendedTime,
            "EXA" => Self::ExtendedArea,
            "EXB" => Self::ExtendedBoth,
            "UPG" => Self::Upgraded,
            "CAN" => Self::Cancelled,
            "EXP" => Self::Expired,
            "COR" => Self::Correction,
            "ROU" => Self::Routine,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::New => "NEW",
            Self::Continues => "CON",
            Self::ExtendedTime => "EXT",
            Self::ExtendedArea => "EXA",
            Self::ExtendedBoth => "EXB",
            Self::Upgraded => "UPG",
            Self::Cancelled => "CAN",
            Self::Expired => "EXP",
            Self::Correction => "COR",
            Self::Routine => "ROU",
            Self::Unknown(code) => code,
        }
    }

    /// Whether this action closes an open event
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Upgraded | Self::Expired)
    }
}

/// VTEC phenomena code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phenomena {
    Ashfall,
    AirStagnation,
    BeachHazard,
    BriskWind,
    Blizzard,
    CoastalFlood,
    DustStorm,
    BlowingDust,
    ExtremeCold,
    ExcessiveHeat,
    ExtremeWind,
    ArealFlood,
    FlashFlood,
    DenseFog,
    Flood,
    Frost,
    FireWeather,
    Freeze,
    Gale,
    HurricaneForceWind,
    Heat,
    Hurricane,
    HighWind,
    Hydrologic,
    HardFreeze,
    IceStorm,
    LakeEffectSnow,
    LowWater,
    LakeshoreFlood,
    LakeWind,
    Marine,
    SmallCraftRoughBar,
    RipCurrentRisk,
    SmallCraft,
    HazardousSeas,
    DenseSmoke,
    SnowSquall,
    Storm,
    StormSurge,
    HighSurf,
    SevereThunderstorm,
    SmallCraftHazardousSeas,
    Tornado,
    TropicalStorm,
    Tsunami,
    Typhoon,
    HeavyFreezingSpray,
    WindChill,
    Wind,
    WinterStorm,
    WinterWeather,
    FreezingFog,
    FreezingRain,
    /// Unrecognized phenomena code
    Unknown(String),
}

impl Phenomena {
    pub fn from_code(code: &str) -> Self {
        match code {
            "AF" => Self::Ashfall,
            "AS" => Self::AirStagnation,
            "BH" => Self::BeachHazard,
            "BW" => Self::BriskWind,
            "BZ" => Self::Blizzard,
            "CF" => Self::CoastalFlood,
            "DS" => Self::DustStorm,
            "DU" => Self::BlowingDust,
            "EC" => Self::ExtremeCold,
            "EH" => Self::ExcessiveHeat,
            "EW" => Self::ExtremeWind,
            "FA" => Self::ArealFlood,
            "FF" => Self::FlashFlood,
            "FG" => Self::DenseFog,
            "FL" => Self::Flood,
            "FR" => Self::Frost,
            "FW" => Self::FireWeather,
            "FZ" => Self::Freeze,
            "GL" => Self::Gale,
            "HF" => Self::HurricaneForceWind,
            "HT" => Self::Heat,
            "HU" => Self::Hurricane,
            "HW" => Self::HighWind,
            "HY" => Self::Hydrologic,
            "HZ" => Self::HardFreeze,
            "IS" => Self::IceStorm,
            "LE" => Self::LakeEffectSnow,
            "LO" => Self::LowWater,
            "LS" => Self::LakeshoreFlood,
            "LW" => Self::LakeWind,
            "MA" => Self::Marine,
            "RB" => Self::SmallCraftRoughBar,
            "RP" => Self::RipCurrentRisk,
            "SC" => Self::SmallCraft,
            "SE" => Self::HazardousSeas,
            "SM" => Self::DenseSmoke,
            "SQ" => Self::SnowSquall,
            "SR" => Self::Storm,
            "SS" => Self::StormSurge,
            "SU" => Self::HighSurf,
            "SV" => Self::SevereThunderstorm,
            "SW" => Self::SmallCraftHazardousSeas,
            "TO" => Self::Tornado,
            "TR" => Self::TropicalStorm,
            "TS" => Self::Tsunami,
            "TY" => Self::Typhoon,
            "UP" => Self::HeavyFreezingSpray,
            "WC" => Self::WindChill,
            "WI" => Self::Wind,
            "WS" => Self::WinterStorm,
            "WW" => Self::WinterWeather,
            "ZF" => Self::FreezingFog,
            "ZR" => Self::FreezingRain,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Ashfall => "AF",
            Self::AirStagnation => "AS",
            Self::BeachHazard => "BH",
            Self::BriskWind => "BW",
            Self::Blizzard => "BZ",
            Self::CoastalFlood => "CF",
            Self::DustStorm => "DS",
            Self::BlowingDust => "DU",
            Self::ExtremeCold => "EC",
            Self::ExcessiveHeat => "EH",
            Self::ExtremeWind => "EW",
            Self::ArealFlood => "FA",
            Self::FlashFlood => "FF",
            Self::DenseFog => "FG",
            Self::Flood => "FL",
            Self::Frost => "FR",
            Self::FireWeather => "FW",
            Self::Freeze => "FZ",
            Self::Gale => "GL",
            Self::HurricaneForceWind => "HF",
            Self::Heat => "HT",
            Self::Hurricane => "HU",
            Self::HighWind => "HW",
            Self::Hydrologic => "HY",
            Self::HardFreeze => "HZ",
            Self::IceStorm => "IS",
            Self::LakeEffectSnow => "LE",
            Self::LowWater => "LO",
            Self::LakeshoreFlood => "LS",
            Self::LakeWind => "LW",
            Self::Marine => "MA",
            Self::SmallCraftRoughBar => "RB",
            Self::RipCurrentRisk => "RP",
            Self::SmallCraft => "SC",
            Self::HazardousSeas => "SE",
            Self::DenseSmoke => "SM",
            Self::SnowSquall => "SQ",
            Self::Storm => "SR",
            Self::StormSurge => "SS",
            Self::HighSurf => "SU",
            Self::SevereThunderstorm => "SV",
            Self::SmallCraftHazardousSeas => "SW",
            Self::Tornado => "TO",
            Self::TropicalStorm => "TR",
            Self::Tsunami => "TS",
            Self::Typhoon => "TY",
            Self::HeavyFreezingSpray => "UP",
            Self::WindChill => "WC",
            Self::Wind => "WI",
            Self::WinterStorm => "WS",
            Self::WinterWeather => "WW",
            Self::FreezingFog => "ZF",
            Self::FreezingRain => "ZR",
            Self::Unknown(code) => code,
        }
    }

    /// Human-readable phenomena name used in event titles
    pub fn name(&self) -> &str {
        match self {
            Self::Ashfall => "Ashfall",
            Self::AirStagnation => "Air Stagnation",
            Self::BeachHazard => "Beach Hazard",
            Self::BriskWind => "Brisk Wind",
            Self::Blizzard => "Blizzard",
            Self::CoastalFlood => "Coastal Flood",
            Self::DustStorm => "Dust Storm",
            Self::BlowingDust => "Blowing Dust",
            Self::ExtremeCold => "Extreme Cold",
            Self::ExcessiveHeat => "Excessive Heat",
            Self::ExtremeWind => "Extreme Wind",
            Self::ArealFlood => "Flood",
            Self::FlashFlood => "Flash Flood",
            Self::DenseFog => "Dense Fog",
            Self::Flood => "Flood",
            Self::Frost => "Frost",
            Self::FireWeather => "Fire Weather",
            Self::Freeze => "Freeze",
            Self::Gale => "Gale",
            Self::HurricaneForceWind => "Hurricane Force Wind",
            Self::Heat => "Heat",
            Self::Hurricane => "Hurricane",
            Self::HighWind => "High Wind",
            Self::Hydrologic => "Hydrologic",
            Self::HardFreeze => "Hard Freeze",
            Self::IceStorm => "Ice Storm",
            Self::LakeEffectSnow => "Lake Effect Snow",
            Self::LowWater => "Low Water",
            Self::LakeshoreFlood => "Lakeshore Flood",
            Self::LakeWind => "Lake Wind",
            Self::Marine => "Marine",
            Self::SmallCraftRoughBar => "Small Craft",
            Self::RipCurrentRisk => "Rip Current Risk",
            Self::SmallCraft => "Small Craft",
            Self::HazardousSeas => "Hazardous Seas",
            Self::DenseSmoke => "Dense Smoke",
            Self::SnowSquall => "Snow Squall",
            Self::Storm => "Storm",
            Self::StormSurge => "Storm Surge",
            Self::HighSurf => "High Surf",
            Self::SevereThunderstorm => "Severe Thunderstorm",
            Self::SmallCraftHazardousSeas => "Small Craft",
            Self::Tornado => "Tornado",
            Self::TropicalStorm => "Tropical Storm",
            Self::Tsunami => "Tsunami",
            Self::Typhoon => "Typhoon",
            Self::HeavyFreezingSpray => "Heavy Freezing Spray",
            Self::WindChill => "Wind Chill",
            Self::Wind => "Wind",
            Self::WinterStorm => "Winter Storm",
            Self::WinterWeather => "Winter Weather",
            Self::FreezingFog => "Freezing Fog",
            Self::FreezingRain => "Freezing Rain",
            Self::Unknown(code) => code,
        }
    }
}

/// VTEC significance code
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Significance {
    Warning,
    Watch,
    Advisory,
    Statement,
    Forecast,
    Outlook,
    Synopsis,
    /// Unrecognized significance code
    Unknown(String),
}

impl Significance {
    pub fn from_code(code: &str) -> Self {
        match code {
            "W" => Self::Warning,
            "A" => Self::Watch,
            "Y" => Self::Advisory,
            "S" => Self::Statement,
            "F" => Self::Forecast,
            "O" => Self::Outlook,
            "N" => Self::Synopsis,
            other => Self::Unknown(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Warning => "W",
            Self::Watch => "A",
            Self::Advisory => "Y",
            Self::Statement => "S",
            Self::Forecast => "F",
            Self::Outlook => "O",
            Self::Synopsis => "N",
            Self::Unknown(code) => code,
        }
    }

    /// Human-readable significance name used in event titles
    pub fn name(&self) -> &str {
        match self {
            Self::Warning => "Warning",
            Self::Watch => "Watch",
            Self::Advisory => "Advisory",
            Self::Statement => "Statement",
            Self::Forecast => "Forecast",
            Self::Outlook => "Outlook",
            Self::Synopsis => "Synopsis",
            Self::Unknown(code) => code,
        }
    }
}

// =============================================================================
// VTEC Code
// =============================================================================

/// A decoded P-VTEC code line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VtecCode {
    /// The code exactly as matched, slashes included
    pub raw: String,

    pub class: VtecClass,
    pub action: VtecAction,

    /// Issuing office (e.g. "KFFC")
    pub office: String,

    pub phenomena: Phenomena,
    pub significance: Significance,

    /// Event tracking number, unique per office/phenomena/significance/year
    pub event_number: u32,

    /// Event year: the start time's year when the code carries one,
    /// otherwise the product's issuance year
    pub year: i32,

    /// Event begin time; `None` when encoded as all zeros (distinct from
    /// epoch zero)
    pub start: Option<DateTime<Utc>>,

    /// Event end time; `None` when encoded as all zeros
    pub end: Option<DateTime<Utc>>,
}

impl VtecCode {
    /// The identity key this code reconciles against
    pub fn key(&self) -> EventKey {
        EventKey {
            office: self.office.clone(),
            phenomena: self.phenomena.clone(),
            significance: self.significance.clone(),
            event_number: self.event_number,
            year: self.year,
        }
    }

    /// Event title derived from the phenomena and the segment's emergency
    /// declaration (e.g. "Tornado Warning", "Flash Flood Emergency")
    pub fn title(&self, is_emergency: bool) -> String {
        if is_emergency {
            format!("{} Emergency", self.phenomena.name())
        } else {
            format!("{} {}", self.phenomena.name(), self.significance.name())
        }
    }
}

impl fmt::Display for VtecCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

// =============================================================================
// Event Key & Event
// =============================================================================

/// The identity of a VTEC event: exactly one persisted event exists per key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventKey {
    pub office: String,
    pub phenomena: Phenomena,
    pub significance: Significance,
    pub event_number: u32,
    pub year: i32,
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{:04}.{}",
            self.office,
            self.phenomena.code(),
            self.significance.code(),
            self.event_number,
            self.year
        )
    }
}

/// A persisted VTEC event, owned by the repository
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VtecEvent {
    /// Repository-assigned row id; `None` before the first create
    pub id: Option<i64>,

    pub key: EventKey,

    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,

    /// Issuance instant of the bulletin that created the event
    pub issued: DateTime<Utc>,

    /// When the hazard begins
    pub starts: DateTime<Utc>,

    /// When the bulletin coverage expires
    pub expires: DateTime<Utc>,

    /// When the hazard ends
    pub ends: DateTime<Utc>,

    /// The end time as first issued, never updated afterwards
    pub end_initial: DateTime<Utc>,

    pub class: VtecClass,
    pub title: String,
    pub is_emergency: bool,
    pub is_pds: bool,

    /// Immutable snapshot of the warning polygon at creation time
    pub polygon_start: Option<Polygon>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn create_test_code() -> VtecCode {
        VtecCode {
            raw: "/O.NEW.KFFC.TO.W.0045.240601T1200Z-240601T1300Z/".to_string(),
            class: VtecClass::Operational,
            action: VtecAction::New,
            office: "KFFC".to_string(),
            phenomena: Phenomena::Tornado,
            significance: Significance::Warning,
            event_number: 45,
            year: 2024,
            start: Some(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()),
            end: Some(Utc.with_ymd_and_hms(2024, 6, 1, 13, 0, 0).unwrap()),
        }
    }

    #[test]
    fn test_action_round_trip() {
        for code in ["NEW", "CON", "EXT", "EXA", "EXB", "UPG", "CAN", "EXP", "COR", "ROU"] {
            assert_eq!(VtecAction::from_code(code).code(), code);
        }
        assert_eq!(VtecAction::from_code("ZZZ"), VtecAction::Unknown("ZZZ".to_string()));
    }

    #[test]
    fn test_terminal_actions() {
        assert!(VtecAction::Cancelled.is_terminal());
        assert!(VtecAction::Upgraded.is_terminal());
        assert!(VtecAction::Expired.is_terminal());
        assert!(!VtecAction::New.is_terminal());
        assert!(!VtecAction::Continues.is_terminal());
        assert!(!VtecAction::ExtendedTime.is_terminal());
    }

    #[test]
    fn test_phenomena_round_trip() {
        for code in ["TO", "SV", "FF", "FA", "WS", "HU", "SS", "ZR"] {
            assert_eq!(Phenomena::from_code(code).code(), code);
        }
        assert_eq!(Phenomena::from_code("TO").name(), "Tornado");
        assert_eq!(Phenomena::from_code("QQ"), Phenomena::Unknown("QQ".to_string()));
    }

    #[test]
    fn test_title_derivation() {
        let code = create_test_code();
        assert_eq!(code.title(false), "Tornado Warning");
        assert_eq!(code.title(true), "Tornado Emergency");
    }

    #[test]
    fn test_event_key_display() {
        let key = create_test_code().key();
        assert_eq!(key.to_string(), "KFFC.TO.W.0045.2024");
    }

    #[test]
    fn test_key_equality_is_identity() {
        let a = create_test_code().key();
        let mut b = create_test_code().key();
        assert_eq!(a, b);

        b.event_number = 46;
        assert_ne!(a, b);
    }
}
