//! The flat parameter set the voice reads every block.
//!
//! Control surfaces address parameters by a two-part path, `group.name`
//! (for example `filter.cutoff` or `ampEnvelope.attack`). Paths are resolved
//! to a [`ParamId`] on the control side so the audio thread only ever sees a
//! small `Copy` enum.

use std::{fmt, str::FromStr};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::dsp::{envelope::EnvelopeParams, filter::MIN_RESONANCE, oscillator::OscillatorParams};

/// Lowest accepted base cutoff in Hz.
pub const MIN_CUTOFF_HZ: f32 = 1.0;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParamError {
    #[error("unknown parameter group `{0}`")]
    UnknownGroup(String),
    #[error("unknown parameter `{name}` in group `{group}`")]
    UnknownName { group: String, name: String },
    #[error("malformed parameter path `{0}`, expected `group.name`")]
    Malformed(String),
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamGroup {
    Osc,
    Filter,
    AmpEnvelope,
    FilterEnvelope,
}

impl ParamGroup {
    pub const ALL: [ParamGroup; 4] = [
        ParamGroup::Osc,
        ParamGroup::Filter,
        ParamGroup::AmpEnvelope,
        ParamGroup::FilterEnvelope,
    ];

    /// Path segment, e.g. `ampEnvelope`.
    pub fn key(self) -> &'static str {
        match self {
            ParamGroup::Osc => "osc",
            ParamGroup::Filter => "filter",
            ParamGroup::AmpEnvelope => "ampEnvelope",
            ParamGroup::FilterEnvelope => "filterEnvelope",
        }
    }

    /// Human readable heading.
    pub fn label(self) -> &'static str {
        match self {
            ParamGroup::Osc => "Oscillator",
            ParamGroup::Filter => "Filter",
            ParamGroup::AmpEnvelope => "Amp Envelope",
            ParamGroup::FilterEnvelope => "Filter Envelope",
        }
    }

    fn parse(segment: &str) -> Result<Self, ParamError> {
        match segment {
            "osc" => Ok(ParamGroup::Osc),
            "filter" => Ok(ParamGroup::Filter),
            "ampEnvelope" | "amp_envelope" => Ok(ParamGroup::AmpEnvelope),
            "filterEnvelope" | "filter_envelope" => Ok(ParamGroup::FilterEnvelope),
            other => Err(ParamError::UnknownGroup(other.to_string())),
        }
    }
}

/// Envelope field, shared by both envelope groups.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnvField {
    Attack,
    Decay,
    Sustain,
    Release,
}

impl EnvField {
    fn key(self) -> &'static str {
        match self {
            EnvField::Attack => "attack",
            EnvField::Decay => "decay",
            EnvField::Sustain => "sustain",
            EnvField::Release => "release",
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamId {
    OscShape,
    OscWaveFold,
    OscClip,
    FilterCutoff,
    FilterResonance,
    FilterEnvelope,
    AmpEnvelope(EnvField),
    FilterEnvelopeShape(EnvField),
}

/// Display metadata for one parameter: label, unit and the knob's travel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamInfo {
    pub label: &'static str,
    pub unit: Option<&'static str>,
    pub ui_min: f32,
    pub ui_max: f32,
}

const ENV_FIELDS: [EnvField; 4] = [
    EnvField::Attack,
    EnvField::Decay,
    EnvField::Sustain,
    EnvField::Release,
];

impl ParamId {
    pub const ALL: [ParamId; 14] = [
        ParamId::OscShape,
        ParamId::OscWaveFold,
        ParamId::OscClip,
        ParamId::FilterCutoff,
        ParamId::FilterResonance,
        ParamId::FilterEnvelope,
        ParamId::AmpEnvelope(EnvField::Attack),
        ParamId::AmpEnvelope(EnvField::Decay),
        ParamId::AmpEnvelope(EnvField::Sustain),
        ParamId::AmpEnvelope(EnvField::Release),
        ParamId::FilterEnvelopeShape(EnvField::Attack),
        ParamId::FilterEnvelopeShape(EnvField::Decay),
        ParamId::FilterEnvelopeShape(EnvField::Sustain),
        ParamId::FilterEnvelopeShape(EnvField::Release),
    ];

    /// Resolve a `["group", "name"]` path.
    pub fn from_path<S: AsRef<str>>(path: &[S]) -> Result<Self, ParamError> {
        match path {
            [group, name] => Self::from_parts(group.as_ref(), name.as_ref()),
            _ => Err(ParamError::Malformed(
                path.iter()
                    .map(|segment| segment.as_ref())
                    .collect::<Vec<&str>>()
                    .join("."),
            )),
        }
    }

    fn from_parts(group: &str, name: &str) -> Result<Self, ParamError> {
        let parsed_group = ParamGroup::parse(group)?;
        let unknown = || ParamError::UnknownName {
            group: group.to_string(),
            name: name.to_string(),
        };

        match parsed_group {
            ParamGroup::Osc => match name {
                "shape" => Ok(ParamId::OscShape),
                "waveFold" | "wave_fold" => Ok(ParamId::OscWaveFold),
                "clip" => Ok(ParamId::OscClip),
                _ => Err(unknown()),
            },
            ParamGroup::Filter => match name {
                "cutoff" => Ok(ParamId::FilterCutoff),
                "resonance" => Ok(ParamId::FilterResonance),
                "envelope" => Ok(ParamId::FilterEnvelope),
                _ => Err(unknown()),
            },
            ParamGroup::AmpEnvelope => Self::env_field(name)
                .map(ParamId::AmpEnvelope)
                .ok_or_else(unknown),
            ParamGroup::FilterEnvelope => Self::env_field(name)
                .map(ParamId::FilterEnvelopeShape)
                .ok_or_else(unknown),
        }
    }

    fn env_field(name: &str) -> Option<EnvField> {
        ENV_FIELDS.into_iter().find(|field| field.key() == name)
    }

    pub fn group(self) -> ParamGroup {
        match self {
            ParamId::OscShape | ParamId::OscWaveFold | ParamId::OscClip => ParamGroup::Osc,
            ParamId::FilterCutoff | ParamId::FilterResonance | ParamId::FilterEnvelope => {
                ParamGroup::Filter
            }
            ParamId::AmpEnvelope(_) => ParamGroup::AmpEnvelope,
            ParamId::FilterEnvelopeShape(_) => ParamGroup::FilterEnvelope,
        }
    }

    /// Name segment of the path, e.g. `waveFold`.
    pub fn name(self) -> &'static str {
        match self {
            ParamId::OscShape => "shape",
            ParamId::OscWaveFold => "waveFold",
            ParamId::OscClip => "clip",
            ParamId::FilterCutoff => "cutoff",
            ParamId::FilterResonance => "resonance",
            ParamId::FilterEnvelope => "envelope",
            ParamId::AmpEnvelope(field) | ParamId::FilterEnvelopeShape(field) => field.key(),
        }
    }

    pub fn info(self) -> ParamInfo {
        match self {
            ParamId::OscShape => info("Shape", None, 0.0, 1.0),
            ParamId::OscWaveFold => info("Fold", None, 1.0, 2.0),
            ParamId::OscClip => info("Clip", None, 1.0, 5.0),
            ParamId::FilterCutoff => info("Cutoff", Some("Hz"), 1.0, 2_000.0),
            ParamId::FilterResonance => info("Resonance", None, 0.5, 10.0),
            ParamId::FilterEnvelope => info("Envelope", None, 0.0, 1.0),
            ParamId::AmpEnvelope(field) | ParamId::FilterEnvelopeShape(field) => match field {
                EnvField::Attack => info("Attack", Some("ms"), 0.0, 2_000.0),
                EnvField::Decay => info("Decay", Some("ms"), 0.0, 2_000.0),
                EnvField::Sustain => info("Sustain", None, 0.0, 1.0),
                EnvField::Release => info("Release", Some("ms"), 1.0, 2_000.0),
            },
        }
    }

    /// Nearest legal value. Non-finite input is not handled here.
    pub fn clamp(self, value: f32) -> f32 {
        match self {
            ParamId::OscShape => value.clamp(0.0, 1.0),
            ParamId::OscWaveFold | ParamId::OscClip => value.max(0.0),
            ParamId::FilterCutoff => value.max(MIN_CUTOFF_HZ),
            ParamId::FilterResonance => value.max(MIN_RESONANCE),
            ParamId::FilterEnvelope => value,
            ParamId::AmpEnvelope(field) | ParamId::FilterEnvelopeShape(field) => match field {
                EnvField::Sustain => value.clamp(0.0, 1.0),
                EnvField::Attack | EnvField::Decay | EnvField::Release => value.max(0.0),
            },
        }
    }
}

fn info(label: &'static str, unit: Option<&'static str>, ui_min: f32, ui_max: f32) -> ParamInfo {
    ParamInfo {
        label,
        unit,
        ui_min,
        ui_max,
    }
}

impl fmt::Display for ParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.group().key(), self.name())
    }
}

impl FromStr for ParamId {
    type Err = ParamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('.') {
            Some((group, name)) if !name.contains('.') => Self::from_parts(group, name),
            _ => Err(ParamError::Malformed(s.to_string())),
        }
    }
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FilterParams {
    /// Base cutoff in Hz before envelope modulation.
    pub cutoff: f32,
    pub resonance: f32,
    /// Filter envelope depth; 1.0 sweeps up to 2 kHz above the base cutoff.
    pub envelope: f32,
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            cutoff: 2_000.0,
            resonance: 0.7,
            envelope: 1.0,
        }
    }
}

/// Every value the voice reads while rendering.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ParamSet {
    pub osc: OscillatorParams,
    pub filter: FilterParams,
    pub amp_envelope: EnvelopeParams,
    pub filter_envelope: EnvelopeParams,
}

impl ParamSet {
    pub fn get(&self, id: ParamId) -> f32 {
        match id {
            ParamId::OscShape => self.osc.shape,
            ParamId::OscWaveFold => self.osc.wave_fold,
            ParamId::OscClip => self.osc.clip,
            ParamId::FilterCutoff => self.filter.cutoff,
            ParamId::FilterResonance => self.filter.resonance,
            ParamId::FilterEnvelope => self.filter.envelope,
            ParamId::AmpEnvelope(field) => env_get(&self.amp_envelope, field),
            ParamId::FilterEnvelopeShape(field) => env_get(&self.filter_envelope, field),
        }
    }

    /// Store `value` clamped to the parameter's legal range and return what
    /// was stored. Non-finite values leave the set untouched.
    pub fn set(&mut self, id: ParamId, value: f32) -> f32 {
        if !value.is_finite() {
            return self.get(id);
        }
        let value = id.clamp(value);
        let slot = match id {
            ParamId::OscShape => &mut self.osc.shape,
            ParamId::OscWaveFold => &mut self.osc.wave_fold,
            ParamId::OscClip => &mut self.osc.clip,
            ParamId::FilterCutoff => &mut self.filter.cutoff,
            ParamId::FilterResonance => &mut self.filter.resonance,
            ParamId::FilterEnvelope => &mut self.filter.envelope,
            ParamId::AmpEnvelope(field) => env_slot(&mut self.amp_envelope, field),
            ParamId::FilterEnvelopeShape(field) => env_slot(&mut self.filter_envelope, field),
        };
        *slot = value;
        value
    }
}

fn env_get(env: &EnvelopeParams, field: EnvField) -> f32 {
    match field {
        EnvField::Attack => env.attack,
        EnvField::Decay => env.decay,
        EnvField::Sustain => env.sustain,
        EnvField::Release => env.release,
    }
}

fn env_slot(env: &mut EnvelopeParams, field: EnvField) -> &mut f32 {
    match field {
        EnvField::Attack => &mut env.attack,
        EnvField::Decay => &mut env.decay,
        EnvField::Sustain => &mut env.sustain,
        EnvField::Release => &mut env.release,
    }
}
