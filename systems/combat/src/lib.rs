#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves ranged attacks between a soldier and an alien.
//!
//! The hit threshold lives in the byte domain of the roll. It is computed in
//! a wide integer and saturated into `u8`, so close shots pin at
//! `u8::MAX` and only long shots or heavy cover pull it down. A shot hits
//! when the random byte falls below the threshold.

use rand::Rng;
use serde::{Deserialize, Serialize};
use skirmish_core::{CellCoord, EntityKind, ShotOutcome, MAX_ENGAGEMENT_RANGE};
use skirmish_world::{Chunk, Entity, TerrainPool};

/// Tuning knobs of the hit formula.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatConfig {
    /// Largest Manhattan distance at which a shot can land.
    pub max_range: u32,
    /// Factor applied to the quotient before saturation.
    pub multiplier: u32,
    /// Distance below the threshold a roll must reach to crit.
    pub crit_margin: u8,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            max_range: MAX_ENGAGEMENT_RANGE,
            multiplier: 20,
            crit_margin: 192,
        }
    }
}

/// Everything the resolver decided about one shot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resolution {
    /// Hit chance the roll was compared against.
    pub threshold: u8,
    /// Random byte that decided the shot.
    pub roll: u8,
    /// Classification of the shot.
    pub outcome: ShotOutcome,
    /// Whether the target ran out of hitpoints and was cleared.
    pub downed: bool,
}

/// Combat resolver.
#[derive(Clone, Copy, Debug, Default)]
pub struct CombatResolver {
    config: CombatConfig,
}

impl CombatResolver {
    /// Creates a resolver using the supplied tuning.
    #[must_use]
    pub const fn new(config: CombatConfig) -> Self {
        Self { config }
    }

    /// Hit threshold for a shot from `actor` at `target`.
    ///
    /// Zero, which no roll can get under, once the target is out of range.
    #[must_use]
    pub fn to_hit(&self, chunk: &Chunk, actor: CellCoord, target: CellCoord) -> u8 {
        let distance = actor.manhattan_distance(target);
        if distance > self.config.max_range {
            return 0;
        }
        let cover = cover_score(chunk, actor, target);
        threshold(distance, cover, self.config.multiplier)
    }

    /// Draws a roll and classifies it against `threshold`.
    pub fn fire<R: Rng + ?Sized>(&self, threshold: u8, rng: &mut R) -> (u8, ShotOutcome) {
        let roll: u8 = rng.gen();
        (roll, self.classify(threshold, roll))
    }

    /// Classifies a roll against a threshold.
    #[must_use]
    pub fn classify(&self, threshold: u8, roll: u8) -> ShotOutcome {
        if roll >= threshold {
            return ShotOutcome::Missed;
        }
        if threshold - roll >= self.config.crit_margin {
            ShotOutcome::Crit
        } else {
            ShotOutcome::Hit
        }
    }

    /// Resolves a shot end to end: computes the threshold, rolls, applies the
    /// damage to the alien at `target`, and clears it with terrain from
    /// `ground` once it runs out of hitpoints.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        chunk: &mut Chunk,
        actor: CellCoord,
        target: CellCoord,
        ground: &mut TerrainPool,
        rng: &mut R,
    ) -> Resolution {
        let threshold = self.to_hit(chunk, actor, target);
        let (roll, outcome) = self.fire(threshold, rng);
        let downed = apply_damage(chunk, target, outcome.damage(), ground);

        log::info!(
            "shot {actor:?} -> {target:?}: distance {}, threshold {threshold}, roll {roll}, {outcome:?}",
            actor.manhattan_distance(target),
        );

        Resolution {
            threshold,
            roll,
            outcome,
            downed,
        }
    }
}

/// Raw hit threshold for a distance and cover score, saturated into a byte.
#[must_use]
pub fn threshold(distance: u32, cover: u32, multiplier: u32) -> u8 {
    let divisor = distance
        .saturating_add(1)
        .saturating_mul(cover.saturating_add(1));
    let raw = (u32::from(u8::MAX) / divisor).saturating_mul(multiplier);
    u8::try_from(raw).unwrap_or(u8::MAX)
}

/// Cover shielding `target` from `actor`.
///
/// For each axis the shot travels along, the cell next to the target on the
/// shooter's side is inspected; low cover there scores 1 and tall cover 2.
#[must_use]
pub fn cover_score(chunk: &Chunk, actor: CellCoord, target: CellCoord) -> u32 {
    let (dx, dy) = actor.offset_to(target);
    [(dx.signum(), 0), (0, dy.signum())]
        .into_iter()
        .filter(|&step| step != (0, 0))
        .filter_map(|(x, y)| target.translated(-x, -y))
        .filter_map(|cell| chunk.get(cell))
        .map(|entity| match *entity.borrow() {
            Entity::Cover(cover) => 1 + u32::from(cover.tall),
            _ => 0,
        })
        .sum()
}

fn apply_damage(
    chunk: &mut Chunk,
    target: CellCoord,
    damage: u8,
    ground: &mut TerrainPool,
) -> bool {
    if damage == 0 {
        return false;
    }
    let remaining = match chunk.get(target) {
        Some(entity) => match &mut *entity.borrow_mut() {
            Entity::Alien(alien) => alien.wound(damage),
            _ => return false,
        },
        None => return false,
    };
    if remaining > 0 {
        return false;
    }

    let fallen = chunk.replace(target, ground.share());
    debug_assert_eq!(fallen.kind(), EntityKind::Alien);
    log::debug!("alien at {target:?} is down");
    true
}
