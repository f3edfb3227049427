//! Wizard form answers — the user's description of the talk they want to build.

use serde::{Deserialize, Serialize};

/// Minimum length for every free-text answer, in characters.
/// Short answers produce generic outlines, so the form rejects them outright.
pub const MIN_ANSWER_CHARS: usize = 50;

/// Talk duration in minutes. Only the enumerated values are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u16", into = "u16")]
pub enum TalkDuration {
    Min15,
    Min30,
    Min45,
    Min60,
    Min90,
}

impl TalkDuration {
    pub fn minutes(self) -> u16 {
        match self {
            TalkDuration::Min15 => 15,
            TalkDuration::Min30 => 30,
            TalkDuration::Min45 => 45,
            TalkDuration::Min60 => 60,
            TalkDuration::Min90 => 90,
        }
    }
}

impl TryFrom<u16> for TalkDuration {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            15 => Ok(TalkDuration::Min15),
            30 => Ok(TalkDuration::Min30),
            45 => Ok(TalkDuration::Min45),
            60 => Ok(TalkDuration::Min60),
            90 => Ok(TalkDuration::Min90),
            other => Err(format!(
                "duration must be one of 15, 30, 45, 60, 90 minutes (got {other})"
            )),
        }
    }
}

impl From<TalkDuration> for u16 {
    fn from(value: TalkDuration) -> Self {
        value.minutes()
    }
}

/// The full set of wizard answers. Immutable once handed to generation —
/// a revised form starts a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormAnswers {
    pub idea: String,
    pub speaker_background: String,
    pub audience_profile: String,
    pub duration: TalkDuration,
    pub common_objections: String,
    pub service_or_product: String,
    pub call_to_action: String,
}

impl FormAnswers {
    /// Returns the list of violated form constraints (empty = valid).
    pub fn validate(&self) -> Vec<String> {
        let fields = [
            ("idea", &self.idea),
            ("speaker_background", &self.speaker_background),
            ("audience_profile", &self.audience_profile),
            ("common_objections", &self.common_objections),
            ("service_or_product", &self.service_or_product),
            ("call_to_action", &self.call_to_action),
        ];

        fields
            .iter()
            .filter(|(_, value)| value.trim().chars().count() < MIN_ANSWER_CHARS)
            .map(|(name, _)| format!("'{name}' must be at least {MIN_ANSWER_CHARS} characters"))
            .collect()
    }
}
