use flocksim_core::sampler::CorrelationProfile;
use flocksim_data::Species;
use serde::Serialize;

/// Things that happened during one step, in the order they happened.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AppEvent {
    // Predation
    Caught {
        tick: u64,
        count: usize,
        remaining: usize,
    },
    AllCaught {
        tick: u64,
    },

    // Manual removal
    Killed {
        tick: u64,
        count: usize,
        remaining: usize,
    },

    // Observables
    Polarization {
        tick: u64,
        species: Species,
        value: f64,
    },
    Spacing {
        tick: u64,
        species: Species,
        value: f64,
    },
    Correlation(CorrelationProfile),
}

impl AppEvent {
    #[must_use]
    pub fn tick(&self) -> u64 {
        match self {
            Self::Caught { tick, .. }
            | Self::AllCaught { tick }
            | Self::Killed { tick, .. }
            | Self::Polarization { tick, .. }
            | Self::Spacing { tick, .. } => *tick,
            Self::Correlation(profile) => profile.tick,
        }
    }

    /// One-line human readable form, used for log output.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Caught {
                count, remaining, ..
            } => format!("{count} prey caught, {remaining} left"),
            Self::AllCaught { .. } => "every prey has been caught".to_string(),
            Self::Killed {
                count, remaining, ..
            } => format!("{count} prey removed, {remaining} left"),
            Self::Polarization { species, value, .. } => {
                format!("{species} polarization {value:.4}")
            }
            Self::Spacing { species, value, .. } => {
                format!("{species} mean spacing {value:.2}")
            }
            Self::Correlation(profile) => format!(
                "{} correlation averaged over {} samples",
                profile.species, profile.samples
            ),
        }
    }
}
