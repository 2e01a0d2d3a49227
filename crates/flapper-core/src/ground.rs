//! Scrolling ground made of two alternating tiles

/// Lower world boundary; cosmetic except for its y
#[derive(Debug, Clone)]
pub struct Ground {
    pub y: f32,
    pub x1: f32,
    pub x2: f32,
    tile_width: f32,
    velocity: f32,
}

impl Ground {
    pub fn new(y: f32, tile_width: f32, velocity: f32) -> Self {
        Self {
            y,
            x1: 0.0,
            x2: tile_width,
            tile_width,
            velocity,
        }
    }

    pub fn tile_width(&self) -> f32 {
        self.tile_width
    }

    /// Scroll left; a tile that leaves the screen re-enters behind the other
    pub fn tick(&mut self) {
        self.x1 -= self.velocity;
        self.x2 -= self.velocity;

        // Loop so that any velocity keeps the tiles contiguous
        while self.x1 + self.tile_width < 0.0 || self.x2 + self.tile_width < 0.0 {
            if self.x1 + self.tile_width < 0.0 {
                self.x1 = self.x2 + self.tile_width;
            }
            if self.x2 + self.tile_width < 0.0 {
                self.x2 = self.x1 + self.tile_width;
            }
        }
    }

    /// Whether the two tiles cover `[0, width)` without a gap
    pub fn covers(&self, width: f32) -> bool {
        let (left, right) = if self.x1 <= self.x2 {
            (self.x1, self.x2)
        } else {
            (self.x2, self.x1)
        };
        left <= 0.0 && right <= left + self.tile_width && right + self.tile_width >= width
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_tiles_adjacent() {
        let ground = Ground::new(570.0, 672.0, 5.0);
        assert_eq!(ground.x1, 0.0);
        assert_eq!(ground.x2, 672.0);
        assert!(ground.covers(480.0));
    }

    #[test]
    fn test_tile_wraps_behind_other() {
        let mut ground = Ground::new(570.0, 672.0, 5.0);
        // x1 + 672 < 0 first happens at x1 = -675
        for _ in 0..135 {
            ground.tick();
        }
        assert_eq!(ground.x2, -3.0);
        assert_eq!(ground.x1, 669.0);
        assert_eq!(ground.x1 - ground.x2, 672.0);
    }

    #[test]
    fn test_offset_difference_invariant() {
        let mut ground = Ground::new(570.0, 672.0, 5.0);
        for _ in 0..10_000 {
            ground.tick();
            let diff = (ground.x2 - ground.x1).rem_euclid(672.0);
            assert_eq!(diff, 0.0);
            assert!(ground.covers(480.0));
        }
    }

    #[test]
    fn test_large_velocity_stays_contiguous() {
        let mut ground = Ground::new(570.0, 100.0, 450.0);
        for _ in 0..100 {
            ground.tick();
            assert!(ground.covers(40.0));
            assert_eq!((ground.x2 - ground.x1).abs(), 100.0);
        }
    }
}
