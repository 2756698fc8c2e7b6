//! Piece definitions and shape geometry
//!
//! The 7 pieces live in a fixed data table: one immutable [`Shape`] per kind,
//! holding a square occupancy matrix for each of the 4 rotation states.
//! Insets and spawn geometry are derived from the matrices at compile time,
//! so nothing is recomputed per tick.

use ratatui::style::Color;

/// Color component bounds shared by every piece color, chosen so the
/// renderer can still shade lighter and darker variants.
const COLOR_MIN: u8 = 35;
const COLOR_MAX: u8 = 220;

/// The 7 piece kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PieceKind {
    I,
    J,
    L,
    O,
    S,
    T,
    Z,
}

impl PieceKind {
    /// Stable integer id used by the snapshot format (0-6)
    pub fn type_id(self) -> i32 {
        match self {
            PieceKind::I => 0,
            PieceKind::J => 1,
            PieceKind::L => 2,
            PieceKind::O => 3,
            PieceKind::S => 4,
            PieceKind::T => 5,
            PieceKind::Z => 6,
        }
    }

    /// Inverse of [`type_id`](Self::type_id); `None` for out-of-range ids
    pub fn from_type_id(id: i32) -> Option<PieceKind> {
        match id {
            0 => Some(PieceKind::I),
            1 => Some(PieceKind::J),
            2 => Some(PieceKind::L),
            3 => Some(PieceKind::O),
            4 => Some(PieceKind::S),
            5 => Some(PieceKind::T),
            6 => Some(PieceKind::Z),
            _ => None,
        }
    }

    /// Get the base color for this kind
    pub fn color(self) -> Color {
        match self {
            PieceKind::I => Color::Rgb(COLOR_MIN, COLOR_MAX, COLOR_MAX),
            PieceKind::J => Color::Rgb(COLOR_MIN, COLOR_MIN, COLOR_MAX),
            PieceKind::L => Color::Rgb(COLOR_MAX, 127, COLOR_MIN),
            PieceKind::O => Color::Rgb(COLOR_MAX, COLOR_MAX, COLOR_MIN),
            PieceKind::S => Color::Rgb(COLOR_MIN, COLOR_MAX, COLOR_MIN),
            PieceKind::T => Color::Rgb(128, COLOR_MIN, 128),
            PieceKind::Z => Color::Rgb(COLOR_MAX, COLOR_MIN, COLOR_MIN),
        }
    }

    /// Get the shape record for this kind
    pub fn shape(self) -> &'static Shape {
        &SHAPES[self.type_id() as usize]
    }

    /// Get all kinds in type-id order
    pub fn all() -> [PieceKind; 7] {
        [
            PieceKind::I,
            PieceKind::J,
            PieceKind::L,
            PieceKind::O,
            PieceKind::S,
            PieceKind::T,
            PieceKind::Z,
        ]
    }
}

/// Number of rotation states every shape carries
pub const ROTATION_COUNT: u8 = 4;

/// Empty leading/trailing rows and columns of a shape matrix for one
/// rotation state.
///
/// `left`/`top` are the index of the first occupied column/row. `right` and
/// `bottom` are `dimension - last occupied index`, matching how the board
/// bounds check consumes them: `origin + dimension - right` is the last
/// occupied absolute column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insets {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

/// An immutable piece shape: a `dimension x dimension` occupancy matrix per
/// rotation state, stored as bit rows (leftmost column in the highest bit).
#[derive(Debug)]
pub struct Shape {
    dimension: i32,
    rows: [&'static [u8]; 4],
    insets: [Insets; 4],
    spawn_col: i32,
    spawn_row: i32,
}

impl Shape {
    const fn new(rows: [&'static [u8]; 4]) -> Shape {
        let dimension = rows[0].len() as i32;
        let insets = [
            compute_insets(rows[0]),
            compute_insets(rows[1]),
            compute_insets(rows[2]),
            compute_insets(rows[3]),
        ];
        Shape {
            dimension,
            rows,
            insets,
            // Spawn centered on the 10-wide board, first occupied row just
            // inside the hidden buffer.
            spawn_col: 5 - dimension / 2,
            spawn_row: insets[0].top,
        }
    }

    /// The bounding-box dimension (2, 3 or 4)
    pub fn dimension(&self) -> i32 {
        self.dimension
    }

    /// Whether the matrix cell at (col, row) is occupied for the rotation
    pub fn occupied(&self, rotation: u8, col: i32, row: i32) -> bool {
        debug_assert!(rotation < ROTATION_COUNT);
        debug_assert!(col >= 0 && col < self.dimension && row >= 0 && row < self.dimension);
        self.rows[rotation as usize][row as usize] & (1 << (self.dimension - 1 - col)) != 0
    }

    /// The precomputed insets for a rotation state
    pub fn insets(&self, rotation: u8) -> Insets {
        self.insets[rotation as usize]
    }

    /// The column this shape spawns in
    pub fn spawn_column(&self) -> i32 {
        self.spawn_col
    }

    /// The row this shape spawns in
    pub fn spawn_row(&self) -> i32 {
        self.spawn_row
    }
}

/// Scan a rotation's bit rows for its insets. Runs in const context so the
/// whole table is baked into [`SHAPES`].
const fn compute_insets(rows: &[u8]) -> Insets {
    let dim = rows.len() as i32;

    let mut mask = 0u8;
    let mut i = 0;
    while i < rows.len() {
        mask |= rows[i];
        i += 1;
    }
    // Every shape occupies at least one cell in every rotation, so the
    // scans below always land on an occupied row/column.
    let mut left = 0;
    while left < dim && mask & (1 << (dim - 1 - left)) == 0 {
        left += 1;
    }
    let mut last_col = dim - 1;
    while last_col > 0 && mask & (1 << (dim - 1 - last_col)) == 0 {
        last_col -= 1;
    }

    let mut top = 0;
    while top < dim && rows[top as usize] == 0 {
        top += 1;
    }
    let mut last_row = dim - 1;
    while last_row > 0 && rows[last_row as usize] == 0 {
        last_row -= 1;
    }

    Insets {
        left,
        right: dim - last_col,
        top,
        bottom: dim - last_row,
    }
}

/// The shape table, indexed by [`PieceKind::type_id`]. Bit rows read
/// left-to-right like the matrices they encode.
static SHAPES: [Shape; 7] = [
    // I
    Shape::new([
        &[0b0000, 0b1111, 0b0000, 0b0000],
        &[0b0010, 0b0010, 0b0010, 0b0010],
        &[0b0000, 0b0000, 0b1111, 0b0000],
        &[0b0100, 0b0100, 0b0100, 0b0100],
    ]),
    // J
    Shape::new([
        &[0b100, 0b111, 0b000],
        &[0b011, 0b010, 0b010],
        &[0b000, 0b111, 0b001],
        &[0b010, 0b010, 0b110],
    ]),
    // L
    Shape::new([
        &[0b001, 0b111, 0b000],
        &[0b010, 0b010, 0b011],
        &[0b000, 0b111, 0b100],
        &[0b110, 0b010, 0b010],
    ]),
    // O
    Shape::new([
        &[0b11, 0b11],
        &[0b11, 0b11],
        &[0b11, 0b11],
        &[0b11, 0b11],
    ]),
    // S
    Shape::new([
        &[0b011, 0b110, 0b000],
        &[0b010, 0b011, 0b001],
        &[0b000, 0b011, 0b110],
        &[0b100, 0b110, 0b010],
    ]),
    // T
    Shape::new([
        &[0b010, 0b111, 0b000],
        &[0b010, 0b011, 0b010],
        &[0b000, 0b111, 0b010],
        &[0b010, 0b110, 0b010],
    ]),
    // Z
    Shape::new([
        &[0b110, 0b011, 0b000],
        &[0b001, 0b011, 0b010],
        &[0b000, 0b110, 0b011],
        &[0b010, 0b110, 0b100],
    ]),
];
