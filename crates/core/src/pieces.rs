//! Pieces module - piece shapes and SRS rotation system
//!
//! Implements the Super Rotation System (SRS) with wall kick tables.
//! Reference: https://tetris.wiki/SRS
//!
//! Kick data is stored for the top-down grid used by [`Board`](crate::Board):
//! a positive `dy` moves a piece down, so every vertical offset is the
//! published value with its sign inverted.

use crate::board::Gravity;
use crate::types::{PieceKind, Rotation};

/// Offset of a single mino relative to piece origin
pub type MinoOffset = (i8, i8);

/// Shape of a piece - mino offsets from piece origin
pub type PieceShape = &'static [MinoOffset];

/// Get the shape (mino offsets) for a piece kind and rotation
pub fn get_shape(kind: PieceKind, rotation: Rotation) -> PieceShape {
    let r = rotation.index() as usize;
    match kind {
        PieceKind::I => &I_SHAPES[r],
        PieceKind::O => &O_SHAPE,
        PieceKind::T => &T_SHAPES[r],
        PieceKind::S => &S_SHAPES[r],
        PieceKind::Z => &Z_SHAPES[r],
        PieceKind::J => &J_SHAPES[r],
        PieceKind::L => &L_SHAPES[r],
        PieceKind::Mono => &MONO_SHAPE,
        PieceKind::V => &V_SHAPES[r],
        PieceKind::Plus => &PLUS_SHAPE,
        PieceKind::U => &U_SHAPES[r],
    }
}

// N: horizontal on row 1, E: vertical right, S: horizontal on row 2, W: vertical left
static I_SHAPES: [[MinoOffset; 4]; 4] = [
    [(0, 1), (1, 1), (2, 1), (3, 1)],
    [(2, 0), (2, 1), (2, 2), (2, 3)],
    [(0, 2), (1, 2), (2, 2), (3, 2)],
    [(1, 0), (1, 1), (1, 2), (1, 3)],
];

static O_SHAPE: [MinoOffset; 4] = [(1, 0), (2, 0), (1, 1), (2, 1)];

static T_SHAPES: [[MinoOffset; 4]; 4] = [
    [(1, 0), (0, 1), (1, 1), (2, 1)],
    [(1, 0), (1, 1), (2, 1), (1, 2)],
    [(0, 1), (1, 1), (2, 1), (1, 2)],
    [(1, 0), (0, 1), (1, 1), (1, 2)],
];

static S_SHAPES: [[MinoOffset; 4]; 4] = [
    [(1, 0), (2, 0), (0, 1), (1, 1)],
    [(1, 0), (1, 1), (2, 1), (2, 2)],
    [(1, 1), (2, 1), (0, 2), (1, 2)],
    [(0, 0), (0, 1), (1, 1), (1, 2)],
];

static Z_SHAPES: [[MinoOffset; 4]; 4] = [
    [(0, 0), (1, 0), (1, 1), (2, 1)],
    [(2, 0), (1, 1), (2, 1), (1, 2)],
    [(0, 1), (1, 1), (1, 2), (2, 2)],
    [(1, 0), (0, 1), (1, 1), (0, 2)],
];

static J_SHAPES: [[MinoOffset; 4]; 4] = [
    [(0, 0), (0, 1), (1, 1), (2, 1)],
    [(1, 0), (2, 0), (1, 1), (1, 2)],
    [(0, 1), (1, 1), (2, 1), (2, 2)],
    [(1, 0), (1, 1), (0, 2), (1, 2)],
];

static L_SHAPES: [[MinoOffset; 4]; 4] = [
    [(2, 0), (0, 1), (1, 1), (2, 1)],
    [(1, 0), (1, 1), (1, 2), (2, 2)],
    [(0, 1), (1, 1), (2, 1), (0, 2)],
    [(0, 0), (1, 0), (1, 1), (1, 2)],
];

static MONO_SHAPE: [MinoOffset; 1] = [(1, 0)];

static V_SHAPES: [[MinoOffset; 3]; 4] = [
    [(0, 0), (0, 1), (1, 1)],
    [(1, 0), (2, 0), (1, 1)],
    [(1, 1), (2, 1), (2, 2)],
    [(1, 1), (0, 2), (1, 2)],
];

static PLUS_SHAPE: [MinoOffset; 5] = [(1, 0), (0, 1), (1, 1), (2, 1), (1, 2)];

static U_SHAPES: [[MinoOffset; 5]; 4] = [
    [(0, 0), (2, 0), (0, 1), (1, 1), (2, 1)],
    [(1, 0), (2, 0), (1, 1), (1, 2), (2, 2)],
    [(0, 1), (1, 1), (2, 1), (0, 2), (2, 2)],
    [(0, 0), (1, 0), (1, 1), (0, 2), (1, 2)],
];

/// Wall kick data: 8 transitions x 5 tests
pub type KickTable = [[(i8, i8); 5]; 8];

/// Get the kick table for a piece kind
///
/// Symmetric shapes (O, Mono, Plus) never kick.
pub fn get_kick_table(kind: PieceKind) -> &'static KickTable {
    match kind {
        PieceKind::I => &I_KICKS,
        PieceKind::O | PieceKind::Mono | PieceKind::Plus => &NO_KICKS,
        PieceKind::T
        | PieceKind::S
        | PieceKind::Z
        | PieceKind::J
        | PieceKind::L
        | PieceKind::V
        | PieceKind::U => &JLSTZ_KICKS,
    }
}

// Row order: 0->R, 0->L, R->0, R->2, 2->R, 2->L, L->2, L->0
static JLSTZ_KICKS: KickTable = [
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    [(0, 0), (1, 0), (1, 1), (0, -2), (1, -2)],
    [(0, 0), (-1, 0), (-1, -1), (0, 2), (-1, 2)],
    [(0, 0), (1, 0), (1, -1), (0, 2), (1, 2)],
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
    [(0, 0), (-1, 0), (-1, 1), (0, -2), (-1, -2)],
];

static I_KICKS: KickTable = [
    [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
    [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
    [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
    [(0, 0), (-1, 0), (2, 0), (-1, -2), (2, 1)],
    [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
    [(0, 0), (2, 0), (-1, 0), (2, -1), (-1, 2)],
    [(0, 0), (-2, 0), (1, 0), (-2, 1), (1, -2)],
    [(0, 0), (1, 0), (-2, 0), (1, 2), (-2, -1)],
];

static NO_KICKS: KickTable = [[(0, 0); 5]; 8];

/// Row of the kick table for a rotation transition
fn get_kick_index(from: Rotation, clockwise: bool) -> usize {
    match (from, clockwise) {
        (Rotation::North, true) => 0,
        (Rotation::North, false) => 1,
        (Rotation::East, false) => 2,
        (Rotation::East, true) => 3,
        (Rotation::South, false) => 4,
        (Rotation::South, true) => 5,
        (Rotation::West, true) => 6,
        (Rotation::West, false) => 7,
    }
}

/// Try to rotate a piece with SRS wall kicks
///
/// Tests the five kick offsets in order and returns the first placement
/// where `is_valid` accepts every mino, as (shape, new rotation, kick).
pub fn try_rotate(
    kind: PieceKind,
    rotation: Rotation,
    x: i8,
    y: i8,
    clockwise: bool,
    is_valid: impl Fn(i8, i8) -> bool,
) -> Option<(PieceShape, Rotation, (i8, i8))> {
    let new_rotation = if clockwise {
        rotation.rotate_cw()
    } else {
        rotation.rotate_ccw()
    };

    let new_shape = get_shape(kind, new_rotation);
    let kicks = &get_kick_table(kind)[get_kick_index(rotation, clockwise)];

    for &(dx, dy) in kicks.iter() {
        let new_x = x + dx;
        let new_y = y + dy;

        let valid = new_shape
            .iter()
            .all(|&(mx, my)| is_valid(new_x + mx, new_y + my));

        if valid {
            return Some((new_shape, new_rotation, (dx, dy)));
        }
    }

    None
}

/// Width of the box the piece rotates in
pub fn bounding_size(kind: PieceKind) -> i8 {
    match kind {
        PieceKind::I | PieceKind::O => 4,
        _ => 3,
    }
}

/// Spawn origin for `kind` on a board of the given size.
///
/// Pieces are centred horizontally. Under normal gravity they enter at the
/// top; under flipped gravity the spawn shape sits flush with the bottom row.
pub fn spawn_position(kind: PieceKind, width: u8, height: u8, gravity: Gravity) -> (i8, i8) {
    let x = (width as i8 - bounding_size(kind)) / 2;
    let y = match gravity {
        Gravity::Down => 0,
        Gravity::Up => {
            let max_dy = get_shape(kind, Rotation::North)
                .iter()
                .map(|&(_, dy)| dy)
                .max()
                .unwrap_or(0);
            height as i8 - 1 - max_dy
        }
    };
    (x, y)
}
