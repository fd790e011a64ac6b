use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{StepSize, StepSizeErr, strategies::*};

/// Every available step size strategy, used to pick one from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepSizeKind {
    Fixed,
    Ghs,
    #[serde(rename = "mcclain")]
    McClain,
    Stc,
    #[serde(rename = "rprop")]
    RProp,
    Autostep,
    AlphaBounds,
    AdagradFull,
    AdagradDiagonal,
    Almeida,
    #[serde(rename = "vsgd")]
    VSgd,
    InvMaxEigen,
}

impl StepSizeKind {
    pub const ALL: [StepSizeKind; 12] = [
        StepSizeKind::Fixed,
        StepSizeKind::Ghs,
        StepSizeKind::McClain,
        StepSizeKind::Stc,
        StepSizeKind::RProp,
        StepSizeKind::Autostep,
        StepSizeKind::AlphaBounds,
        StepSizeKind::AdagradFull,
        StepSizeKind::AdagradDiagonal,
        StepSizeKind::Almeida,
        StepSizeKind::VSgd,
        StepSizeKind::InvMaxEigen,
    ];

    /// The display name of the strategy, as reported by `StepSize::name`.
    pub fn name(self) -> &'static str {
        match self {
            StepSizeKind::Fixed => Fixed::NAME,
            StepSizeKind::Ghs => Ghs::NAME,
            StepSizeKind::McClain => McClain::NAME,
            StepSizeKind::Stc => Stc::NAME,
            StepSizeKind::RProp => RProp::NAME,
            StepSizeKind::Autostep => Autostep::NAME,
            StepSizeKind::AlphaBounds => AlphaBounds::NAME,
            StepSizeKind::AdagradFull => AdagradFull::NAME,
            StepSizeKind::AdagradDiagonal => AdagradDiagonal::NAME,
            StepSizeKind::Almeida => Almeida::NAME,
            StepSizeKind::VSgd => VSgd::NAME,
            StepSizeKind::InvMaxEigen => InvMaxEigen::NAME,
        }
    }

    /// Creates a new, uninitialized strategy of this kind with its default configuration.
    pub fn build(self) -> Box<dyn StepSize> {
        match self {
            StepSizeKind::Fixed => Box::new(Fixed::new()),
            StepSizeKind::Ghs => Box::new(Ghs::new()),
            StepSizeKind::McClain => Box::new(McClain::new()),
            StepSizeKind::Stc => Box::new(Stc::new()),
            StepSizeKind::RProp => Box::new(RProp::new()),
            StepSizeKind::Autostep => Box::new(Autostep::new()),
            StepSizeKind::AlphaBounds => Box::new(AlphaBounds::new()),
            StepSizeKind::AdagradFull => Box::new(AdagradFull::new()),
            StepSizeKind::AdagradDiagonal => Box::new(AdagradDiagonal::new()),
            StepSizeKind::Almeida => Box::new(Almeida::new()),
            StepSizeKind::VSgd => Box::new(VSgd::new()),
            StepSizeKind::InvMaxEigen => Box::new(InvMaxEigen::new()),
        }
    }
}

impl fmt::Display for StepSizeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StepSizeKind {
    type Err = StepSizeErr;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StepSizeKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| StepSizeErr::UnknownStrategy(s.to_string()))
    }
}
