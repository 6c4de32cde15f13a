//! Character ascension material costs.

use serde::{Deserialize, Serialize};
use std::ops::AddAssign;

use pagestate_core::error::AppError;

pub const MIN_LEVEL: u32 = 1;
pub const MAX_LEVEL: u32 = 90;

/// Materials for one or more ascension phases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AscensionCost {
    pub mora: u64,
    pub gem_sliver: u32,
    pub gem_fragment: u32,
    pub gem_chunk: u32,
    pub gemstone: u32,
    pub boss_material: u32,
    pub local_specialty: u32,
    pub common_t1: u32,
    pub common_t2: u32,
    pub common_t3: u32,
}

impl AddAssign for AscensionCost {
    fn add_assign(&mut self, o: Self) {
        self.mora += o.mora;
        self.gem_sliver += o.gem_sliver;
        self.gem_fragment += o.gem_fragment;
        self.gem_chunk += o.gem_chunk;
        self.gemstone += o.gemstone;
        self.boss_material += o.boss_material;
        self.local_specialty += o.local_specialty;
        self.common_t1 += o.common_t1;
        self.common_t2 += o.common_t2;
        self.common_t3 += o.common_t3;
    }
}

impl AscensionCost {
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }

    /// Non-zero materials as `(label, amount)` pairs, for display.
    pub fn lines(&self) -> Vec<(&'static str, u64)> {
        [
            ("Mora", self.mora),
            ("Gem sliver", u64::from(self.gem_sliver)),
            ("Gem fragment", u64::from(self.gem_fragment)),
            ("Gem chunk", u64::from(self.gem_chunk)),
            ("Gemstone", u64::from(self.gemstone)),
            ("Boss material", u64::from(self.boss_material)),
            ("Local specialty", u64::from(self.local_specialty)),
            ("Common material T1", u64::from(self.common_t1)),
            ("Common material T2", u64::from(self.common_t2)),
            ("Common material T3", u64::from(self.common_t3)),
        ]
        .into_iter()
        .filter(|(_, n)| *n > 0)
        .collect()
    }
}

const fn phase(
    mora: u64,
    gems: [u32; 4],
    boss_material: u32,
    local_specialty: u32,
    common: [u32; 3],
) -> AscensionCost {
    AscensionCost {
        mora,
        gem_sliver: gems[0],
        gem_fragment: gems[1],
        gem_chunk: gems[2],
        gemstone: gems[3],
        boss_material,
        local_specialty,
        common_t1: common[0],
        common_t2: common[1],
        common_t3: common[2],
    }
}

/// Level cap reached before each ascension, and what that ascension costs.
pub const PHASES: [(u32, AscensionCost); 6] = [
    (20, phase(20_000, [1, 0, 0, 0], 0, 3, [3, 0, 0])),
    (40, phase(40_000, [0, 3, 0, 0], 2, 10, [15, 0, 0])),
    (50, phase(60_000, [0, 6, 0, 0], 4, 20, [0, 12, 0])),
    (60, phase(80_000, [0, 0, 3, 0], 8, 30, [0, 18, 0])),
    (70, phase(100_000, [0, 0, 6, 0], 12, 45, [0, 0, 12])),
    (80, phase(120_000, [0, 0, 0, 6], 20, 60, [0, 0, 24])),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AscensionGoal {
    pub current_level: u32,
    pub target_level: u32,
}

impl AscensionGoal {
    pub fn new(current_level: u32, target_level: u32) -> Result<Self, AppError> {
        ascension_cost(current_level, target_level)?;
        Ok(Self {
            current_level,
            target_level,
        })
    }

    pub fn cost(&self) -> AscensionCost {
        ascension_cost(self.current_level, self.target_level).unwrap_or_default()
    }
}

/// Sums every phase crossed going from level `from` to level `to`.
///
/// A phase at cap `L` is crossed when `from <= L < to`.
pub fn ascension_cost(from: u32, to: u32) -> Result<AscensionCost, AppError> {
    for level in [from, to] {
        if !(MIN_LEVEL..=MAX_LEVEL).contains(&level) {
            return Err(AppError::validation(format!(
                "level {level} is outside {MIN_LEVEL}-{MAX_LEVEL}"
            )));
        }
    }
    if from > to {
        return Err(AppError::validation(format!(
            "target level {to} is below current level {from}"
        )));
    }
    let mut total = AscensionCost::default();
    for (cap, cost) in PHASES {
        if from <= cap && cap < to {
            total += cost;
        }
    }
    Ok(total)
}
