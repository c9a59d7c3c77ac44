#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Procedural chunk generation.
//!
//! A chunk starts as pooled floor. One soldier and one alien are dropped on
//! distinct cells, then four Bresenham traces are cast from the soldier
//! toward the cells flanking the alien. Every open cell a trace crosses turns
//! into pooled grass unless it lies in the sightline corridor between the two
//! actors, which leaves a clear lane flanked by concealment. Finally the
//! remaining squads and cover are scattered at random.

mod line;

pub use line::BresenhamLine;

use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};
use skirmish_core::{CellCoord, ChunkDimensions, EntityKind};
use skirmish_world::{Blueprint, Chunk, EntityRef, TerrainPool};

/// Soldiers and aliens the generator always places.
const FIXED_ACTORS: usize = 2;

/// Bounds on the random population scattered after the shadow pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Upper bound on soldiers added beside the fixed one.
    pub extra_soldiers: u8,
    /// Upper bound on aliens added beside the fixed one.
    pub extra_aliens: u8,
    /// Upper bound on cover pieces; at least one is placed unless this is 0.
    pub cover: u32,
}

impl GeneratorConfig {
    /// Population bounds scaled to the provided chunk geometry.
    #[must_use]
    pub const fn for_dimensions(dimensions: ChunkDimensions) -> Self {
        let extra_soldiers = 1;
        let extra_aliens = 4;
        let reserved = FIXED_ACTORS + extra_soldiers as usize + extra_aliens as usize;
        let cover = dimensions.cell_count().saturating_sub(reserved) / 10;
        Self {
            extra_soldiers,
            extra_aliens,
            cover: cover as u32,
        }
    }

    /// No population beyond the fixed soldier, alien and shadow pass.
    #[must_use]
    pub const fn bare() -> Self {
        Self {
            extra_soldiers: 0,
            extra_aliens: 0,
            cover: 0,
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self::for_dimensions(ChunkDimensions::REFERENCE)
    }
}

/// Chunk produced by the generator together with its anchor actors.
#[derive(Debug)]
pub struct Generated {
    /// The populated chunk.
    pub chunk: Chunk,
    /// Cell of the soldier the shadow was cast from.
    pub soldier: CellCoord,
    /// Cell of the alien the shadow was cast around.
    pub alien: CellCoord,
    /// Number of cells converted to grass by the shadow pass.
    pub grass: usize,
}

/// Chunk generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct Generator {
    config: GeneratorConfig,
}

impl Generator {
    /// Creates a generator using the supplied population bounds.
    #[must_use]
    pub const fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    /// Generates a chunk with the anchor actors on two distinct random cells.
    pub fn generate<R: Rng + ?Sized>(
        &self,
        dimensions: ChunkDimensions,
        rng: &mut R,
    ) -> Generated {
        let soldier = random_cell(dimensions, rng);
        let alien = loop {
            let candidate = random_cell(dimensions, rng);
            if candidate != soldier {
                break candidate;
            }
        };
        self.generate_around(dimensions, soldier, alien, rng)
    }

    /// Generates a chunk with the anchor actors on the provided cells.
    ///
    /// # Panics
    ///
    /// Panics when the cells coincide or lie outside the chunk.
    pub fn generate_around<R: Rng + ?Sized>(
        &self,
        dimensions: ChunkDimensions,
        soldier: CellCoord,
        alien: CellCoord,
        rng: &mut R,
    ) -> Generated {
        assert!(
            dimensions.contains(soldier) && dimensions.contains(alien),
            "anchor actors must lie inside the chunk"
        );
        assert_ne!(soldier, alien, "anchor actors need distinct cells");

        let mobility = dimensions.mobility();
        let mut chunk = Chunk::filled(dimensions, &mut TerrainPool::ground());

        let placed_soldier =
            chunk.place_at(soldier, || EntityRef::make(Blueprint::Soldier, mobility, rng));
        let placed_alien =
            chunk.place_at(alien, || EntityRef::make(Blueprint::Alien, mobility, rng));
        debug_assert!(placed_soldier && placed_alien, "anchor cells start as floor");

        let grass = cast_shadow(&mut chunk, soldier, alien, &mut TerrainPool::grass());

        let soldiers = scatter(
            &mut chunk,
            Blueprint::Soldier,
            0..=u32::from(self.config.extra_soldiers),
            rng,
        );
        let aliens = scatter(
            &mut chunk,
            Blueprint::Alien,
            0..=u32::from(self.config.extra_aliens),
            rng,
        );
        let cover_range = self.config.cover.min(1)..=self.config.cover;
        let cover = scatter(&mut chunk, Blueprint::Cover, cover_range, rng);

        log::debug!(
            "generated {}x{} chunk: soldier at {soldier:?}, alien at {alien:?}, \
             {grass} grass, {soldiers} extra soldiers, {aliens} extra aliens, {cover} cover",
            dimensions.columns(),
            dimensions.rows(),
        );

        Generated {
            chunk,
            soldier,
            alien,
            grass,
        }
    }
}

fn scatter<R: Rng + ?Sized>(
    chunk: &mut Chunk,
    blueprint: Blueprint,
    range: RangeInclusive<u32>,
    rng: &mut R,
) -> usize {
    let drawn = rng.gen_range(range) as usize;
    let count = drawn.min(chunk.open_cells());
    let mobility = chunk.dimensions().mobility();
    for _ in 0..count {
        let entity = EntityRef::make(blueprint, mobility, rng);
        let _ = chunk.place_random(rng, || entity);
    }
    count
}

fn random_cell<R: Rng + ?Sized>(dimensions: ChunkDimensions, rng: &mut R) -> CellCoord {
    CellCoord::new(
        rng.gen_range(0..dimensions.columns()),
        rng.gen_range(0..dimensions.rows()),
    )
}

/// Cells flanking `alien` on both axes, which the shadow traces aim for.
///
/// Flanks may fall outside the chunk; the traces only use them as a heading.
#[must_use]
pub fn shadow_endpoints(alien: CellCoord) -> [(i64, i64); 4] {
    let (x, y) = (i64::from(alien.column()), i64::from(alien.row()));
    [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)]
}

/// Reports whether `cell` lies in the sightline corridor between the actors.
///
/// On an axis where the actors differ the cell must lie strictly between
/// them; on an axis they share the cell must share it too.
#[must_use]
pub fn in_sightline(cell: CellCoord, soldier: CellCoord, alien: CellCoord) -> bool {
    between(cell.column(), soldier.column(), alien.column())
        && between(cell.row(), soldier.row(), alien.row())
}

fn between(value: u32, a: u32, b: u32) -> bool {
    if a == b {
        value == a
    } else {
        a.min(b) < value && value < a.max(b)
    }
}

/// Casts the four shadow traces and converts the open cells they cross into
/// grass shared from `grass`. Returns how many cells changed.
pub fn cast_shadow(
    chunk: &mut Chunk,
    soldier: CellCoord,
    alien: CellCoord,
    grass: &mut TerrainPool,
) -> usize {
    let dimensions = chunk.dimensions();
    let origin = (i64::from(soldier.column()), i64::from(soldier.row()));
    let mut converted = 0;

    for endpoint in shadow_endpoints(alien) {
        let Some(trace) = BresenhamLine::through(origin, endpoint) else {
            continue;
        };
        for (x, y) in trace {
            let cell = match (u32::try_from(x), u32::try_from(y)) {
                (Ok(column), Ok(row)) => CellCoord::new(column, row),
                _ => break,
            };
            if !dimensions.contains(cell) {
                break;
            }
            if chunk.is_full(cell) || in_sightline(cell, soldier, alien) {
                continue;
            }
            if chunk.kind_at(cell) == Some(EntityKind::Grass) {
                continue;
            }
            if chunk.place_at(cell, || grass.share()) {
                converted += 1;
            }
        }
    }

    converted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reference_population_bounds() {
        let config = GeneratorConfig::default();
        assert_eq!(config.extra_soldiers, 1);
        assert_eq!(config.extra_aliens, 4);
        assert_eq!(config.cover, (38 * 22 - 7) / 10);
    }

    #[test]
    fn sightline_corridor_is_open_on_differing_axes() {
        let soldier = CellCoord::new(2, 2);
        let alien = CellCoord::new(6, 5);
        assert!(in_sightline(CellCoord::new(3, 3), soldier, alien));
        assert!(in_sightline(CellCoord::new(5, 4), soldier, alien));
        assert!(!in_sightline(CellCoord::new(2, 3), soldier, alien));
        assert!(!in_sightline(CellCoord::new(6, 4), soldier, alien));
        assert!(!in_sightline(CellCoord::new(3, 2), soldier, alien));
    }

    #[test]
    fn sightline_corridor_collapses_onto_a_shared_axis() {
        let soldier = CellCoord::new(2, 2);
        let alien = CellCoord::new(10, 2);
        assert!(in_sightline(CellCoord::new(3, 2), soldier, alien));
        assert!(in_sightline(CellCoord::new(9, 2), soldier, alien));
        assert!(!in_sightline(CellCoord::new(5, 1), soldier, alien));
        assert!(!in_sightline(CellCoord::new(11, 2), soldier, alien));
    }

    #[test]
    fn endpoints_flank_the_alien() {
        assert_eq!(
            shadow_endpoints(CellCoord::new(0, 4)),
            [(-1, 4), (1, 4), (0, 3), (0, 5)]
        );
    }
}
