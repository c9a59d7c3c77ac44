//! Fixed-size grid of entity handles.

use rand::Rng;
use skirmish_core::{CellCoord, ChunkDimensions, Direction, EntityKind};

use crate::{
    arena::ChunkId,
    entity::{EntityRef, TerrainPool},
};

/// One playable area: every cell holds a live entity handle.
#[derive(Debug)]
pub struct Chunk {
    dimensions: ChunkDimensions,
    cells: Vec<EntityRef>,
    neighbors: [Option<ChunkId>; 4],
}

impl Chunk {
    /// Creates a chunk whose every cell shares terrain from `pool`.
    #[must_use]
    pub fn filled(dimensions: ChunkDimensions, pool: &mut TerrainPool) -> Self {
        let cells = (0..dimensions.cell_count()).map(|_| pool.share()).collect();
        Self {
            dimensions,
            cells,
            neighbors: [None; 4],
        }
    }

    /// Size of the chunk.
    #[must_use]
    pub const fn dimensions(&self) -> ChunkDimensions {
        self.dimensions
    }

    /// Handle stored at the cell, if the cell lies inside the chunk.
    #[must_use]
    pub fn get(&self, cell: CellCoord) -> Option<&EntityRef> {
        self.dimensions
            .index(cell)
            .and_then(|index| self.cells.get(index))
    }

    /// Kind of the entity stored at the cell.
    #[must_use]
    pub fn kind_at(&self, cell: CellCoord) -> Option<EntityKind> {
        self.get(cell).map(EntityRef::kind)
    }

    /// Reports whether the cell holds anything other than open terrain.
    ///
    /// Cells outside the chunk count as full.
    #[must_use]
    pub fn is_full(&self, cell: CellCoord) -> bool {
        self.kind_at(cell).map_or(true, EntityKind::is_full)
    }

    /// Stores the entity minted by `factory` unless the cell is full.
    ///
    /// Returns whether the entity was placed; the factory is not called for
    /// full cells.
    pub fn place_at<F>(&mut self, cell: CellCoord, factory: F) -> bool
    where
        F: FnOnce() -> EntityRef,
    {
        if self.is_full(cell) {
            return false;
        }
        let Some(index) = self.dimensions.index(cell) else {
            return false;
        };
        self.cells[index] = factory();
        true
    }

    /// Places the entity minted by `factory` on the first open cell found by
    /// a raster scan that starts at a uniformly drawn cell and wraps around.
    ///
    /// # Panics
    ///
    /// Panics when no open cell is left.
    pub fn place_random<R, F>(&mut self, rng: &mut R, factory: F) -> CellCoord
    where
        R: Rng + ?Sized,
        F: FnOnce() -> EntityRef,
    {
        assert!(
            self.open_cells() > 0,
            "place_random requires at least one open cell"
        );

        let count = self.cells.len();
        let start = rng.gen_range(0..count);
        let index = (start..count)
            .chain(0..start)
            .find(|&index| !self.cells[index].kind().is_full())
            .expect("an open cell exists");
        self.cells[index] = factory();
        self.dimensions.cell_at(index)
    }

    /// Swaps in a new entity regardless of what the cell holds and hands back
    /// the previous handle.
    ///
    /// # Panics
    ///
    /// Panics when the cell lies outside the chunk.
    pub fn replace(&mut self, cell: CellCoord, entity: EntityRef) -> EntityRef {
        let index = self
            .dimensions
            .index(cell)
            .unwrap_or_else(|| panic!("{cell:?} lies outside the chunk"));
        std::mem::replace(&mut self.cells[index], entity)
    }

    /// Number of cells that can still receive a placement.
    #[must_use]
    pub fn open_cells(&self) -> usize {
        self.cells
            .iter()
            .filter(|entity| !entity.kind().is_full())
            .count()
    }

    /// Cells and their handles in raster order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &EntityRef)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(|(index, entity)| (self.dimensions.cell_at(index), entity))
    }

    /// Chunk linked toward `direction`, if any.
    #[must_use]
    pub fn neighbor(&self, direction: Direction) -> Option<ChunkId> {
        self.neighbors[direction.slot()]
    }

    pub(crate) fn set_neighbor(
        &mut self,
        direction: Direction,
        neighbor: Option<ChunkId>,
    ) -> Option<ChunkId> {
        std::mem::replace(&mut self.neighbors[direction.slot()], neighbor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{Blueprint, Entity};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn small_chunk() -> Chunk {
        let dimensions = ChunkDimensions::new(4, 3).expect("valid");
        Chunk::filled(dimensions, &mut TerrainPool::ground())
    }

    #[test]
    fn filled_chunk_shares_one_ground_instance() {
        let chunk = small_chunk();
        let first = chunk.get(CellCoord::new(0, 0)).expect("cell");
        for (_, entity) in chunk.iter() {
            assert!(entity.same_instance(first));
            assert_eq!(entity.kind(), EntityKind::Ground);
        }
        assert_eq!(usize::from(first.shares()), chunk.dimensions().cell_count());
    }

    #[test]
    fn place_at_skips_full_cells() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let mut chunk = small_chunk();
        let cell = CellCoord::new(1, 1);

        assert!(chunk.place_at(cell, || EntityRef::make(Blueprint::Soldier, 1, &mut rng)));
        assert!(chunk.is_full(cell));

        let mut called = false;
        assert!(!chunk.place_at(cell, || {
            called = true;
            EntityRef::new(Entity::Ground)
        }));
        assert!(!called, "factory must not run for a full cell");
        assert_eq!(chunk.kind_at(cell), Some(EntityKind::Soldier));
    }

    #[test]
    fn out_of_bounds_counts_as_full() {
        let mut chunk = small_chunk();
        assert!(chunk.is_full(CellCoord::new(4, 0)));
        assert!(!chunk.place_at(CellCoord::new(0, 3), || EntityRef::new(Entity::Ground)));
    }

    #[test]
    fn place_random_finds_the_last_open_cell() {
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let mut chunk = small_chunk();
        let last_open = CellCoord::new(2, 2);
        let cells: Vec<CellCoord> = chunk.iter().map(|(cell, _)| cell).collect();
        for cell in cells.into_iter().filter(|cell| *cell != last_open) {
            let _ = chunk.replace(cell, EntityRef::make(Blueprint::Cover, 1, &mut rng));
        }

        let placed = chunk.place_random(&mut rng, || EntityRef::new(Entity::Grass { fire: true }));
        assert_eq!(placed, last_open);
        assert_eq!(chunk.open_cells(), 1, "grass keeps the cell open");
    }

    #[test]
    #[should_panic(expected = "place_random requires at least one open cell")]
    fn place_random_without_room_panics() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut chunk = small_chunk();
        let cells: Vec<CellCoord> = chunk.iter().map(|(cell, _)| cell).collect();
        for cell in cells {
            let _ = chunk.replace(cell, EntityRef::make(Blueprint::Alien, 1, &mut rng));
        }
        let _ = chunk.place_random(&mut rng, || EntityRef::new(Entity::Ground));
    }

    #[test]
    fn dropping_a_chunk_frees_its_terrain() {
        let chunk = small_chunk();
        let watch = chunk.get(CellCoord::new(0, 0)).expect("cell").watch();
        assert!(watch.is_alive());
        drop(chunk);
        assert!(!watch.is_alive());
    }
}
