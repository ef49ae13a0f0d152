use std::fmt::{self, Debug};

pub const DIMS: Point = Point { x: 64, y: 32 };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Point {
    pub x: u8,
    pub y: u8,
}

impl From<(u8, u8)> for Point {
    fn from((x, y): (u8, u8)) -> Self {
        Self { x, y }
    }
}

impl Point {
    /// Add an offset, wrapping around the screen edges.
    #[must_use]
    pub fn wrapping_add(self, (dx, dy): (usize, usize)) -> Self {
        Self {
            x: ((self.x as usize + dx) % DIMS.x as usize) as u8,
            y: ((self.y as usize + dy) % DIMS.y as usize) as u8,
        }
    }

    pub fn in_bounds(self) -> bool {
        self.x < DIMS.x && self.y < DIMS.y
    }
}

const WIDTH: usize = DIMS.x as usize;
const HEIGHT: usize = DIMS.y as usize;

/// The 64x32 monochrome display.
#[derive(Clone, PartialEq, Eq)]
pub struct FrameBuffer {
    rows: [[bool; WIDTH]; HEIGHT],
}

impl FrameBuffer {
    pub const WIDTH: usize = WIDTH;
    pub const HEIGHT: usize = HEIGHT;

    pub fn new() -> Self {
        Self {
            rows: [[false; WIDTH]; HEIGHT],
        }
    }

    pub fn clear(&mut self) {
        *self = Self::new();
    }

    /// XOR `sprite` onto the screen with its top-left corner at `top_left`.
    ///
    /// Each byte is one row, most significant bit leftmost. Pixels past an
    /// edge wrap to the opposite side. Returns true if any lit pixel was
    /// turned off.
    pub fn draw_sprite(&mut self, top_left: Point, sprite: &[u8]) -> bool {
        let top_left = top_left.wrapping_add((0, 0));
        let mut collision = false;

        for (dy, &row) in sprite.iter().enumerate() {
            for dx in 0..8 {
                let bit = 0x80 >> dx;
                if row & bit != 0 && self.flip(top_left.wrapping_add((dx, dy))) {
                    collision = true;
                }
            }
        }

        collision
    }

    pub fn pixel(&self, p: Point) -> bool {
        assert!(p.in_bounds());
        self.rows[p.y as usize][p.x as usize]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool; WIDTH]> {
        self.rows.iter()
    }

    /// Return true if the pixel was lit, i.e. there's a collision.
    fn flip(&mut self, p: Point) -> bool {
        assert!(p.in_bounds());

        let pixel = &mut self.rows[p.y as usize][p.x as usize];
        let was_high = *pixel;
        *pixel ^= true;

        was_high
    }
}

impl Default for FrameBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Debug for FrameBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        for row in &self.rows {
            for &lit in row {
                let c = if lit { '#' } else { '.' };
                write!(f, "{c}")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
