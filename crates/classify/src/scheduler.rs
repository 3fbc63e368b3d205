use geo::{RasterSize, Window};

use crate::{Error, Result};

/// Nominal tile dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileSize {
    pub width: i64,
    pub height: i64,
}

impl TileSize {
    pub const fn new(width: i64, height: i64) -> Self {
        TileSize { width, height }
    }

    pub const fn square(size: i64) -> Self {
        TileSize { width: size, height: size }
    }

    /// Tile dimensions of zero or less are a configuration error
    pub fn validate(&self) -> Result {
        if self.width <= 0 || self.height <= 0 {
            return Err(Error::Config(format!("Invalid tile size: {self}, dimensions must be positive")));
        }

        Ok(())
    }
}

impl Default for TileSize {
    fn default() -> Self {
        TileSize::square(256)
    }
}

impl std::fmt::Display for TileSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for TileSize {
    type Err = Error;

    /// Parses `WxH` or a single number for square tiles
    fn from_str(s: &str) -> Result<Self> {
        let parse = |v: &str| {
            v.trim()
                .parse::<i64>()
                .map_err(|err| Error::Config(format!("Invalid tile size '{s}': {err}")))
        };

        let tile_size = match s.split_once(['x', 'X']) {
            Some((width, height)) => TileSize::new(parse(width)?, parse(height)?),
            None => TileSize::square(parse(s)?),
        };

        tile_size.validate()?;
        Ok(tile_size)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    Iterating { x: usize, y: usize },
    Done,
}

/// Partitions a raster extent in non overlapping windows of the nominal tile size.
/// Windows are produced in row-major order, the last window of every row and column is shrunk
/// to fit the raster extent.
#[derive(Debug, Clone)]
pub struct TileScheduler {
    raster_size: RasterSize,
    tile_width: usize,
    tile_height: usize,
    state: State,
}

impl TileScheduler {
    pub fn new(raster_size: RasterSize, tile_size: TileSize) -> Result<Self> {
        tile_size.validate()?;

        let to_usize = |v: i64| usize::try_from(v).map_err(|_| Error::Config(format!("Tile size {tile_size} is too large")));
        Ok(TileScheduler {
            raster_size,
            tile_width: to_usize(tile_size.width)?,
            tile_height: to_usize(tile_size.height)?,
            state: State::Start,
        })
    }

    pub fn raster_size(&self) -> RasterSize {
        self.raster_size
    }

    /// The total number of windows of a complete run
    pub fn window_count(&self) -> usize {
        self.raster_size.cols.div_ceil(self.tile_width) * self.raster_size.rows.div_ceil(self.tile_height)
    }

    fn window_at(&self, x: usize, y: usize) -> Window {
        Window::new(
            x,
            y,
            self.tile_width.min(self.raster_size.cols - x),
            self.tile_height.min(self.raster_size.rows - y),
        )
    }

    fn next_position(&self, x: usize, y: usize) -> State {
        let next_x = x.saturating_add(self.tile_width);
        if next_x < self.raster_size.cols {
            return State::Iterating { x: next_x, y };
        }

        let next_y = y.saturating_add(self.tile_height);
        if next_y < self.raster_size.rows {
            State::Iterating { x: 0, y: next_y }
        } else {
            State::Done
        }
    }
}

impl Iterator for TileScheduler {
    type Item = Window;

    fn next(&mut self) -> Option<Window> {
        if self.state == State::Start {
            self.state = if self.raster_size.is_empty() {
                State::Done
            } else {
                State::Iterating { x: 0, y: 0 }
            };
        }

        match self.state {
            State::Iterating { x, y } => {
                self.state = self.next_position(x, y);
                Some(self.window_at(x, y))
            }
            State::Start | State::Done => None,
        }
    }
}
