//! Tile collision layers and the kinematic body that moves through them.
//!
//! Gameplay truth lives in a simplified grid of solid cells. The world uses
//! screen-style coordinates: +X is right, **+Y is down**, so a floor is hit
//! while moving toward +Y.
//!
//! The core algorithm is **axis-separable move-and-slide**: resolve X movement
//! first against the grid, then resolve Y using the already-corrected X position.
//! This prevents diagonal tunneling and produces the "slide along walls" behavior
//! players expect from platformers. After the move, short probes report floor
//! and wall contact even when the body rests against a surface without
//! penetrating it, which is what the movement state machine keys off.

use std::collections::HashSet;

use glam::Vec2;
use serde::Deserialize;

/// Distance used to probe for resting contact after a move.
const CONTACT_PROBE: f32 = 0.5;

#[derive(Debug, Deserialize, Clone)]
pub struct TileLayerFile {
    pub name: String,
    pub cell_size: i32,
    #[serde(default)]
    pub origin: GridOrigin,
    pub width: i32,
    pub height: i32,
    pub solids: Vec<GridCell>,
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
pub struct GridOrigin {
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub x: i32,
    pub y: i32,
}

/// Rectangle of cells in grid coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CellRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl CellRect {
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Grow (or shrink, for negative `by`) every side by `by` cells.
    pub fn grow(&self, by: i32) -> Self {
        Self {
            x: self.x - by,
            y: self.y - by,
            width: self.width + 2 * by,
            height: self.height + 2 * by,
        }
    }

    pub fn end_x(&self) -> i32 {
        self.x + self.width
    }

    pub fn end_y(&self) -> i32 {
        self.y + self.height
    }
}

/// Read-only view of a tile layer, as needed for camera bounds.
pub trait TileLayer {
    /// Bounding rectangle of all occupied cells; empty when the layer has none.
    fn used_rect(&self) -> CellRect;
    fn cell_size(&self) -> Vec2;
    /// World position of cell (0, 0).
    fn origin(&self) -> Vec2 {
        Vec2::ZERO
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub center_x: f32,
    pub center_y: f32,
    pub half_w: f32,
    pub half_h: f32,
}

impl Aabb {
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.center_x, self.center_y)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CollisionMoveResult {
    pub aabb: Aabb,
    pub collided_x: bool,
    pub collided_y: bool,
    pub blocked_left: bool,
    pub blocked_right: bool,
    pub blocked_down: bool,
    pub blocked_up: bool,
}

#[derive(Debug, Clone)]
pub struct CollisionGrid {
    pub name: String,
    pub cell_size: i32,
    pub origin: GridOrigin,
    pub width: i32,
    pub height: i32,
    solids: HashSet<GridCell>,
}

impl CollisionGrid {
    pub fn from_file(file: TileLayerFile) -> Self {
        let solids = file.solids.into_iter().collect();
        Self {
            name: file.name,
            cell_size: file.cell_size,
            origin: file.origin,
            width: file.width,
            height: file.height,
            solids,
        }
    }

    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return false;
        }
        self.solids.contains(&GridCell { x, y })
    }

    pub fn move_and_collide(&self, aabb: Aabb, dx: f32, dy: f32) -> Aabb {
        self.move_and_collide_detailed(aabb, dx, dy).aabb
    }

    pub fn move_and_collide_detailed(&self, aabb: Aabb, dx: f32, dy: f32) -> CollisionMoveResult {
        const EPS: f32 = 0.0001;

        // Axis-separable move-and-slide:
        // resolve X first, then resolve Y using updated X position.
        let resolved_x = self.resolve_axis_x(aabb, dx);
        let x_expected = aabb.center_x + dx;
        let collided_x = (resolved_x - x_expected).abs() > EPS;

        let mut moved = aabb;
        moved.center_x = resolved_x;
        let resolved_y = self.resolve_axis_y(moved, dy);
        let y_expected = aabb.center_y + dy;
        let collided_y = (resolved_y - y_expected).abs() > EPS;
        moved.center_y = resolved_y;

        CollisionMoveResult {
            aabb: moved,
            collided_x,
            collided_y,
            blocked_left: collided_x && dx < 0.0,
            blocked_right: collided_x && dx > 0.0,
            blocked_down: collided_y && dy > 0.0,
            blocked_up: collided_y && dy < 0.0,
        }
    }

    /// True when moving `aabb` by (`dx`, `dy`) would be stopped by a solid cell.
    pub fn touches(&self, aabb: Aabb, dx: f32, dy: f32) -> bool {
        let probe = self.move_and_collide_detailed(aabb, dx, dy);
        probe.collided_x || probe.collided_y
    }

    fn resolve_axis_x(&self, aabb: Aabb, dx: f32) -> f32 {
        if dx == 0.0 {
            return aabb.center_x;
        }

        const EPS: f32 = 0.001;
        let mut candidate_x = aabb.center_x + dx;
        let min_y = aabb.center_y - aabb.half_h + EPS;
        let max_y = aabb.center_y + aabb.half_h - EPS;
        let y0 = self.world_to_cell_y(min_y);
        let y1 = self.world_to_cell_y(max_y);

        if dx > 0.0 {
            let max_x = candidate_x + aabb.half_w - EPS;
            let x_cell = self.world_to_cell_x(max_x);
            for y in y0..=y1 {
                if self.is_solid(x_cell, y) {
                    candidate_x = candidate_x.min(self.cell_min_x(x_cell) - aabb.half_w);
                }
            }
            // Guardrail: never push opposite direction during resolution.
            candidate_x = candidate_x.max(aabb.center_x);
        } else {
            let min_x = candidate_x - aabb.half_w + EPS;
            let x_cell = self.world_to_cell_x(min_x);
            for y in y0..=y1 {
                if self.is_solid(x_cell, y) {
                    candidate_x = candidate_x.max(self.cell_max_x(x_cell) + aabb.half_w);
                }
            }
            candidate_x = candidate_x.min(aabb.center_x);
        }

        candidate_x
    }

    fn resolve_axis_y(&self, aabb: Aabb, dy: f32) -> f32 {
        if dy == 0.0 {
            return aabb.center_y;
        }

        const EPS: f32 = 0.001;
        let mut candidate_y = aabb.center_y + dy;
        let min_x = aabb.center_x - aabb.half_w + EPS;
        let max_x = aabb.center_x + aabb.half_w - EPS;
        let x0 = self.world_to_cell_x(min_x);
        let x1 = self.world_to_cell_x(max_x);

        if dy > 0.0 {
            let max_y = candidate_y + aabb.half_h - EPS;
            let y_cell = self.world_to_cell_y(max_y);
            for x in x0..=x1 {
                if self.is_solid(x, y_cell) {
                    candidate_y = candidate_y.min(self.cell_min_y(y_cell) - aabb.half_h);
                }
            }
            candidate_y = candidate_y.max(aabb.center_y);
        } else {
            let min_y = candidate_y - aabb.half_h + EPS;
            let y_cell = self.world_to_cell_y(min_y);
            for x in x0..=x1 {
                if self.is_solid(x, y_cell) {
                    candidate_y = candidate_y.max(self.cell_max_y(y_cell) + aabb.half_h);
                }
            }
            candidate_y = candidate_y.min(aabb.center_y);
        }

        candidate_y
    }

    fn world_to_cell_x(&self, world_x: f32) -> i32 {
        ((world_x - self.origin.x as f32) / self.cell_size as f32).floor() as i32
    }

    fn world_to_cell_y(&self, world_y: f32) -> i32 {
        ((world_y - self.origin.y as f32) / self.cell_size as f32).floor() as i32
    }

    fn cell_min_x(&self, x: i32) -> f32 {
        self.origin.x as f32 + (x * self.cell_size) as f32
    }

    fn cell_max_x(&self, x: i32) -> f32 {
        self.origin.x as f32 + ((x + 1) * self.cell_size) as f32
    }

    fn cell_min_y(&self, y: i32) -> f32 {
        self.origin.y as f32 + (y * self.cell_size) as f32
    }

    fn cell_max_y(&self, y: i32) -> f32 {
        self.origin.y as f32 + ((y + 1) * self.cell_size) as f32
    }
}

impl TileLayer for CollisionGrid {
    fn used_rect(&self) -> CellRect {
        let mut cells = self.solids.iter();
        let Some(first) = cells.next() else {
            return CellRect::default();
        };
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for cell in cells {
            min_x = min_x.min(cell.x);
            min_y = min_y.min(cell.y);
            max_x = max_x.max(cell.x);
            max_y = max_y.max(cell.y);
        }
        CellRect {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        }
    }

    fn cell_size(&self) -> Vec2 {
        Vec2::splat(self.cell_size as f32)
    }

    fn origin(&self) -> Vec2 {
        Vec2::new(self.origin.x as f32, self.origin.y as f32)
    }
}

pub(crate) fn validate_layer_file(file: &TileLayerFile) -> Result<(), String> {
    if file.cell_size <= 0 {
        return Err(format!(
            "Layer '{}' validation failed: cell_size must be > 0",
            file.name
        ));
    }
    if file.width <= 0 || file.height <= 0 {
        return Err(format!(
            "Layer '{}' validation failed: width and height must be > 0",
            file.name
        ));
    }

    let mut seen = HashSet::new();
    for cell in &file.solids {
        if cell.x < 0 || cell.x >= file.width || cell.y < 0 || cell.y >= file.height {
            return Err(format!(
                "Layer '{}' validation failed: solid cell out of bounds ({}, {})",
                file.name, cell.x, cell.y
            ));
        }
        if !seen.insert(*cell) {
            return Err(format!(
                "Layer '{}' validation failed: duplicate solid cell ({}, {})",
                file.name, cell.x, cell.y
            ));
        }
    }
    Ok(())
}

/// Outcome of one `move_and_slide` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsResult {
    /// Velocity after collision response (blocked axes zeroed).
    pub velocity: Vec2,
    pub on_floor: bool,
    pub on_wall: bool,
    /// Unit normal of the touched wall, zero when `on_wall` is false.
    pub wall_normal: Vec2,
}

impl Default for PhysicsResult {
    fn default() -> Self {
        Self {
            velocity: Vec2::ZERO,
            on_floor: false,
            on_wall: false,
            wall_normal: Vec2::ZERO,
        }
    }
}

/// Physics collaborator for the movement controllers.
pub trait MotionBody {
    /// Move with the desired velocity for `dt` seconds and report contacts.
    fn move_and_slide(&mut self, velocity: Vec2, dt: f32) -> PhysicsResult;
    fn position(&self) -> Vec2;
}

/// Kinematic box moving through a [`CollisionGrid`].
#[derive(Debug, Clone, Copy)]
pub struct GridBody<'g> {
    pub aabb: Aabb,
    grid: &'g CollisionGrid,
}

impl<'g> GridBody<'g> {
    pub fn new(grid: &'g CollisionGrid, aabb: Aabb) -> Self {
        Self { aabb, grid }
    }
}

impl MotionBody for GridBody<'_> {
    fn move_and_slide(&mut self, velocity: Vec2, dt: f32) -> PhysicsResult {
        let result = self
            .grid
            .move_and_collide_detailed(self.aabb, velocity.x * dt, velocity.y * dt);
        self.aabb = result.aabb;

        let mut out = velocity;
        if result.blocked_left || result.blocked_right {
            out.x = 0.0;
        }
        if result.blocked_down || result.blocked_up {
            out.y = 0.0;
        }

        // A body moving upward is never on the floor, even when a probe
        // would still touch the ledge it just left.
        let on_floor = result.blocked_down
            || (velocity.y >= 0.0 && self.grid.touches(self.aabb, 0.0, CONTACT_PROBE));

        // Wall contact needs horizontal intent toward the wall.
        let pushing = if velocity.x > 0.0 {
            1.0
        } else if velocity.x < 0.0 {
            -1.0
        } else {
            0.0
        };
        let on_wall = result.blocked_left
            || result.blocked_right
            || (pushing != 0.0 && self.grid.touches(self.aabb, pushing * CONTACT_PROBE, 0.0));
        let wall_normal = if on_wall {
            Vec2::new(-pushing, 0.0)
        } else {
            Vec2::ZERO
        };

        PhysicsResult {
            velocity: out,
            on_floor,
            on_wall,
            wall_normal,
        }
    }

    fn position(&self) -> Vec2 {
        self.aabb.center()
    }
}
