//! Uniform-grid spatial index for neighbour queries.
//!
//! The world is cut into square cells of [`CELL_SIZE`] units. A query returns
//! everything in the 3×3 block of cells around an entity, so the true nearest
//! neighbour can be missed when it sits just across the block boundary.
//! Entities whose cell falls outside the grid are not indexed at all and stay
//! invisible to queries until they move back inside.

use ndarray::Array1;
use std::collections::HashMap;

use super::detectable::{Detectable, EntityId};

/// Edge length of a grid cell in world units.
pub const CELL_SIZE: f32 = 100.0;

/// Integer cell coordinate. May lie outside the grid.
pub type Cell = (i64, i64);

/// Uniform grid bucketing nodes and resources by position.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    world_width: f32,
    world_height: f32,
    cols: usize,
    rows: usize,
    /// Row-major buckets, `rows * cols` long.
    cells: Vec<Vec<EntityId>>,
    /// Cell each entity was last placed in, including out-of-grid cells.
    placed: HashMap<EntityId, Cell>,
}

impl SpatialGrid {
    /// Creates an empty grid covering a world centred on the origin.
    pub fn new(world_width: f32, world_height: f32) -> Self {
        let mut grid = Self {
            world_width,
            world_height,
            cols: 0,
            rows: 0,
            cells: Vec::new(),
            placed: HashMap::new(),
        };
        grid.resize(world_width, world_height);
        grid
    }

    /// Recomputes grid dimensions for new world dimensions and clears all cells.
    pub fn resize(&mut self, world_width: f32, world_height: f32) {
        self.world_width = world_width;
        self.world_height = world_height;
        self.cols = (world_width / CELL_SIZE).floor().max(0.0) as usize;
        self.rows = (world_height / CELL_SIZE).floor().max(0.0) as usize;
        self.cells = vec![Vec::new(); self.cols * self.rows];
        self.placed.clear();
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Cell coordinate of a position; pure.
    pub fn cell_coordinates(&self, pos: &Array1<f32>) -> Cell {
        let x = self.cols as f32 * (pos[0] + self.world_width / 2.0) / self.world_width;
        let y = self.rows as f32 * (pos[1] + self.world_height / 2.0) / self.world_height;
        (x.floor() as i64, y.floor() as i64)
    }

    /// Clears every cell and repopulates the grid from `entities`.
    pub fn rebuild<'a, I>(&mut self, entities: I)
    where
        I: IntoIterator<Item = &'a dyn Detectable>,
    {
        for cell in &mut self.cells {
            cell.clear();
        }
        self.placed.clear();

        for entity in entities {
            self.insert(entity.entity_id(), entity.pos());
        }
    }

    /// Adds a single entity at `pos`, replacing any earlier placement.
    pub fn insert(&mut self, id: EntityId, pos: &Array1<f32>) {
        self.remove(id);
        let cell = self.cell_coordinates(pos);
        if let Some(index) = self.index_of(cell) {
            self.cells[index].push(id);
        }
        self.placed.insert(id, cell);
    }

    /// Removes an entity from the grid. Returns false when it was not present.
    pub fn remove(&mut self, id: EntityId) -> bool {
        let Some(cell) = self.placed.remove(&id) else {
            return false;
        };
        if let Some(index) = self.index_of(cell) {
            self.cells[index].retain(|&other| other != id);
        }
        true
    }

    /// True if the entity has been placed, even outside the grid.
    pub fn contains(&self, id: EntityId) -> bool {
        self.placed.contains_key(&id)
    }

    /// Cell an entity was placed in.
    pub fn cell_of(&self, id: EntityId) -> Option<Cell> {
        self.placed.get(&id).copied()
    }

    /// Everything in the 3×3 block around the entity's cell, itself included.
    ///
    /// Returns nothing for entities that were never placed.
    pub fn neighbors_of(&self, id: EntityId) -> Vec<EntityId> {
        self.cell_of(id)
            .map(|cell| self.neighbors_around(cell).collect())
            .unwrap_or_default()
    }

    /// Iterates the 3×3 block centred on `cell`, skipping cells off the grid.
    ///
    /// Order is column-major over the block, then insertion order per cell.
    pub fn neighbors_around(&self, cell: Cell) -> impl Iterator<Item = EntityId> + '_ {
        (-1..=1)
            .flat_map(move |dx| (-1..=1).map(move |dy| (cell.0 + dx, cell.1 + dy)))
            .filter_map(|c| self.index_of(c))
            .flat_map(|index| self.cells[index].iter().copied())
    }

    /// Number of indexed entities (out-of-grid entities excluded).
    pub fn indexed_len(&self) -> usize {
        self.cells.iter().map(Vec::len).sum()
    }

    fn index_of(&self, (x, y): Cell) -> Option<usize> {
        if x < 0 || y < 0 {
            return None;
        }
        let (x, y) = (x as usize, y as usize);
        if x >= self.cols || y >= self.rows {
            return None;
        }
        Some(y * self.cols + x)
    }
}
