//! Comfort and safety rules — pure functions, zero I/O.
//!
//! ```text
//!  Vent (first match wins)                 Dehumidifier (indoor RH > ideal and > 50%)
//!  ─────────────────────────────────────   ─────────────────────────────────────────────
//!  AQI > threshold        → OFF            outdoor cooler than ideal:
//!  outdoor temp off-range → OFF              venting ∧ closer ∧ indoor warm → OFF
//!  outdoor RH > max       → OFF (rain)       venting otherwise             → ON
//!  outdoor brings closer  → ON               not venting                   → ON
//!  hot or too cold        → quick-vent     indoor warmer than ideal:
//!  otherwise              → limited-vent     venting                       → OFF
//!                                            RH > 60%                      → ON
//!                                            otherwise                     → OFF
//!                                          neither                         → OFF
//! ```

use core::fmt;

use crate::config::SystemConfig;
use crate::control::cycling::PhaseState;

/// Outdoor air more than this far below ideal counts as "too cold".
pub const TOO_COLD_MARGIN_F: f32 = 15.0;

// ---------------------------------------------------------------------------
// Derived conditions
// ---------------------------------------------------------------------------

/// Boolean facts derived from the averaged temperatures each cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Conditions {
    /// Outdoor temperature within the allowed operating range.
    pub temp_in_range: bool,
    /// Outdoor air is closer to the ideal temperature than indoor air.
    pub temp_would_bring_closer: bool,
    pub outdoor_cooler_than_ideal: bool,
    /// Outdoor air is more than [`TOO_COLD_MARGIN_F`] below ideal.
    pub outdoor_too_cold: bool,
    pub outdoor_hotter_than_ideal: bool,
    pub indoor_warmer_than_ideal: bool,
}

impl Conditions {
    pub fn evaluate(outdoor_temp_f: f32, indoor_temp_f: f32, config: &SystemConfig) -> Self {
        let ideal = config.ideal_temperature_f;
        Self {
            temp_in_range: (config.min_outdoor_temp_f..=config.max_outdoor_temp_f)
                .contains(&outdoor_temp_f),
            temp_would_bring_closer: (outdoor_temp_f - ideal).abs()
                < (indoor_temp_f - ideal).abs(),
            outdoor_cooler_than_ideal: outdoor_temp_f < ideal,
            outdoor_too_cold: outdoor_temp_f < ideal - TOO_COLD_MARGIN_F,
            outdoor_hotter_than_ideal: outdoor_temp_f > ideal,
            indoor_warmer_than_ideal: indoor_temp_f > ideal,
        }
    }
}

// ---------------------------------------------------------------------------
// Vent
// ---------------------------------------------------------------------------

/// Which vent rule fired this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VentRule {
    /// Averaged AQI above threshold — hard safety rule.
    AqiUnsafe,
    /// Outdoor temperature outside the allowed range.
    OutdoorTempOutOfRange,
    /// Outdoor humidity above the maximum; probably raining.
    RainGuard,
    /// Outdoor air moves indoor temperature toward ideal.
    BringsCloser,
    /// Outdoor air hotter than ideal or far colder; vent in short bursts.
    QuickVent,
    /// Outdoor temperature neutral; vent on the limited duty cycle.
    LimitedVent,
}

impl VentRule {
    /// Classify the cycle.  Priority order is fixed; first match wins.
    pub fn classify(
        avg_aqi: f32,
        avg_outdoor_humidity: f32,
        conditions: &Conditions,
        config: &SystemConfig,
    ) -> Self {
        if avg_aqi > config.aqi_threshold {
            Self::AqiUnsafe
        } else if !conditions.temp_in_range {
            Self::OutdoorTempOutOfRange
        } else if avg_outdoor_humidity > config.max_outdoor_humidity {
            Self::RainGuard
        } else if conditions.temp_would_bring_closer {
            Self::BringsCloser
        } else if conditions.outdoor_hotter_than_ideal || conditions.outdoor_too_cold {
            Self::QuickVent
        } else {
            Self::LimitedVent
        }
    }
}

impl fmt::Display for VentRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AqiUnsafe => write!(f, "AQI above threshold, vent forced closed"),
            Self::OutdoorTempOutOfRange => write!(f, "outdoor temp outside allowed range"),
            Self::RainGuard => write!(f, "outdoor humidity above max"),
            Self::BringsCloser => write!(f, "outdoor temp brings indoor closer to ideal"),
            Self::QuickVent => write!(f, "quick-vent cycle for hot/cold outdoor air"),
            Self::LimitedVent => write!(f, "limited-vent cycle for neutral outdoor air"),
        }
    }
}

/// Desired vent state plus the rule (and cycle phase) that produced it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VentDecision {
    pub on: bool,
    pub rule: VentRule,
    /// Present when a cycling rule decided.
    pub phase: Option<PhaseState>,
}

// ---------------------------------------------------------------------------
// Dehumidifier
// ---------------------------------------------------------------------------

/// Every branch of the dehumidifier decision table, named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DehumRule {
    /// Indoor humidity not above ideal and the consideration floor.
    HumidityAcceptable,
    /// Outdoor cooler, already venting toward ideal while indoor is warm.
    CoolOutdoorVentingSuffices,
    /// Outdoor cooler and venting humid air in; dehumidifier heat is welcome.
    CoolOutdoorWhileVenting,
    /// Outdoor cooler but vent closed; nothing else is drying the room.
    CoolOutdoorVentClosed,
    /// Indoor warm and venting warmer, drier air already.
    WarmIndoorVentingSuffices,
    /// Indoor warm, not venting, humidity high enough to justify the heat.
    WarmIndoorVeryHumid,
    /// Indoor warm, not venting, humidity only mildly elevated.
    WarmIndoorAvoidHeat,
    /// Outdoor not cooler and indoor not warmer than ideal.
    NoComfortRuleApplies,
}

impl DehumRule {
    pub const fn wants_on(self) -> bool {
        matches!(
            self,
            Self::CoolOutdoorWhileVenting | Self::CoolOutdoorVentClosed | Self::WarmIndoorVeryHumid
        )
    }
}

impl fmt::Display for DehumRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HumidityAcceptable => write!(f, "indoor humidity within ideal range"),
            Self::CoolOutdoorVentingSuffices => {
                write!(f, "high humidity but venting cooler air is enough")
            }
            Self::CoolOutdoorWhileVenting => {
                write!(f, "high humidity while venting cooler humid air")
            }
            Self::CoolOutdoorVentClosed => write!(f, "high humidity with vent closed"),
            Self::WarmIndoorVentingSuffices => {
                write!(f, "high humidity but venting warmer drier air")
            }
            Self::WarmIndoorVeryHumid => write!(f, "very high humidity and not venting"),
            Self::WarmIndoorAvoidHeat => {
                write!(f, "high humidity but avoiding extra heat indoors")
            }
            Self::NoComfortRuleApplies => write!(f, "no comfort rule calls for drying"),
        }
    }
}

/// Walk the dehumidifier decision table.  `vent_on` is the vent decision
/// already made this cycle.
pub fn decide_dehumidifier(
    indoor_humidity: f32,
    vent_on: bool,
    conditions: &Conditions,
    config: &SystemConfig,
) -> DehumRule {
    let elevated =
        indoor_humidity > config.ideal_humidity && indoor_humidity > config.dehum_min_humidity;
    if !elevated {
        return DehumRule::HumidityAcceptable;
    }

    if conditions.outdoor_cooler_than_ideal {
        let venting_suffices =
            conditions.temp_would_bring_closer && conditions.indoor_warmer_than_ideal;
        return match (vent_on, venting_suffices) {
            (true, true) => DehumRule::CoolOutdoorVentingSuffices,
            (true, false) => DehumRule::CoolOutdoorWhileVenting,
            (false, _) => DehumRule::CoolOutdoorVentClosed,
        };
    }

    if conditions.indoor_warmer_than_ideal {
        return if vent_on {
            DehumRule::WarmIndoorVentingSuffices
        } else if indoor_humidity > config.dehum_without_vent_humidity {
            DehumRule::WarmIndoorVeryHumid
        } else {
            DehumRule::WarmIndoorAvoidHeat
        };
    }

    DehumRule::NoComfortRuleApplies
}
