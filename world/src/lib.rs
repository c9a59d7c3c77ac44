#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative terrain and actor state for Skirmish.
//!
//! Cells hold counted [`EntityRef`] handles. Stateless terrain is pooled
//! through a [`TerrainPool`] so a whole chunk of floor shares a handful of
//! instances, while actors and cover are minted once per cell. Chunks live in
//! a [`ChunkArena`] that keeps neighbor links symmetric by identifier.

mod arena;
mod chunk;
mod entity;

pub use arena::{ChunkArena, ChunkId, LinkError};
pub use chunk::Chunk;
pub use entity::{Actor, Blueprint, Cover, Entity, EntityError, EntityRef, EntityWatch, TerrainPool};

/// Query functions that provide read-only access to chunk contents.
pub mod query {
    use skirmish_core::{CellCoord, EntityKind};

    use super::Chunk;

    /// Kind of every cell in raster order, for a full redraw.
    #[must_use]
    pub fn kinds(chunk: &Chunk) -> Vec<EntityKind> {
        chunk.iter().map(|(_, entity)| entity.kind()).collect()
    }

    /// Kind of a single cell, for an incremental redraw.
    #[must_use]
    pub fn kind_at(chunk: &Chunk, cell: CellCoord) -> Option<EntityKind> {
        chunk.kind_at(cell)
    }

    /// Cells holding the requested kind, in raster order.
    #[must_use]
    pub fn cells_of(chunk: &Chunk, kind: EntityKind) -> Vec<CellCoord> {
        chunk
            .iter()
            .filter(|(_, entity)| entity.kind() == kind)
            .map(|(cell, _)| cell)
            .collect()
    }

    /// Share count of the entity at the cell.
    #[must_use]
    pub fn shares_at(chunk: &Chunk, cell: CellCoord) -> Option<u8> {
        chunk.get(cell).map(super::EntityRef::shares)
    }
}
