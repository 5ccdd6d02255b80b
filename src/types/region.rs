//! Regions of interest over a raster.
//!
//! A region is either the whole raster, an axis-aligned rectangle, or a
//! polygon mask. Rectangles are clipped to the raster when resolved; polygons
//! contribute both their clipped bounding box and a point-inclusion test.

use std::str::FromStr;

use crate::error::{PxError, Result};

use super::Raster;

/// An axis-aligned rectangle in raster coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Exclusive right edge.
    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// Exclusive bottom edge.
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Intersect with a `width`x`height` raster. Returns `None` when empty.
    pub fn clip(&self, width: u32, height: u32) -> Option<Rect> {
        let right = self.right().min(width as u64);
        let bottom = self.bottom().min(height as u64);
        if self.x as u64 >= right || self.y as u64 >= bottom {
            return None;
        }
        Some(Rect::new(
            self.x,
            self.y,
            (right - self.x as u64) as u32,
            (bottom - self.y as u64) as u32,
        ))
    }
}

impl FromStr for Rect {
    type Err = PxError;

    /// Parse `x,y,w,h`.
    fn from_str(s: &str) -> Result<Self> {
        let values = parse_list::<u32>(s, 4, "x,y,w,h (e.g. 0,0,64,64)")?;
        Ok(Rect::new(values[0], values[1], values[2], values[3]))
    }
}

/// A closed polygon given by its vertices in raster coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    vertices: Vec<(i64, i64)>,
}

impl Polygon {
    /// Create a polygon. At least three vertices are required.
    pub fn new(vertices: Vec<(i64, i64)>) -> Result<Self> {
        if vertices.len() < 3 {
            return Err(PxError::InvalidRegion {
                message: format!("polygon needs at least 3 vertices, got {}", vertices.len()),
                help: Some("Close the contour with three or more points".to_string()),
            });
        }
        Ok(Self { vertices })
    }

    pub fn vertices(&self) -> &[(i64, i64)] {
        &self.vertices
    }

    /// Ray-casting point-in-polygon test.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        let n = self.vertices.len();
        let mut inside = false;
        let mut j = n - 1;

        for i in 0..n {
            let (xi, yi) = (self.vertices[i].0 as f64, self.vertices[i].1 as f64);
            let (xj, yj) = (self.vertices[j].0 as f64, self.vertices[j].1 as f64);

            if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
                inside = !inside;
            }
            j = i;
        }

        inside
    }

    /// Bounding box as (min_x, min_y, max_x, max_y).
    pub fn bounds(&self) -> (i64, i64, i64, i64) {
        let xs = self.vertices.iter().map(|v| v.0);
        let ys = self.vertices.iter().map(|v| v.1);
        (
            xs.clone().min().unwrap_or(0),
            ys.clone().min().unwrap_or(0),
            xs.max().unwrap_or(0),
            ys.max().unwrap_or(0),
        )
    }
}

impl FromStr for Polygon {
    type Err = PxError;

    /// Parse whitespace- or `;`-separated `x,y` pairs.
    fn from_str(s: &str) -> Result<Self> {
        let vertices = s
            .split(|c: char| c.is_whitespace() || c == ';')
            .filter(|p| !p.is_empty())
            .map(|pair| {
                let v = parse_list::<i64>(pair, 2, "x,y pairs (e.g. \"0,0 32,0 16,24\")")?;
                Ok((v[0], v[1]))
            })
            .collect::<Result<Vec<_>>>()?;
        Polygon::new(vertices)
    }
}

/// Region of interest handed to the detector and transformer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Region {
    #[default]
    Full,
    Rect(Rect),
    Polygon(Polygon),
}

impl Region {
    /// Clipped bounding rectangle of this region within `raster`.
    pub fn bounds(&self, raster: &Raster) -> Result<Rect> {
        let (w, h) = (raster.width(), raster.height());
        let rect = match self {
            Region::Full => Some(Rect::new(0, 0, w, h)),
            Region::Rect(r) => r.clip(w, h),
            Region::Polygon(p) => {
                let (min_x, min_y, max_x, max_y) = p.bounds();
                let x0 = min_x.clamp(0, w as i64);
                let y0 = min_y.clamp(0, h as i64);
                let x1 = max_x.clamp(0, w as i64);
                let y1 = max_y.clamp(0, h as i64);
                if x1 > x0 && y1 > y0 {
                    Some(Rect::new(
                        x0 as u32,
                        y0 as u32,
                        (x1 - x0) as u32,
                        (y1 - y0) as u32,
                    ))
                } else {
                    None
                }
            }
        };

        rect.ok_or_else(|| PxError::InvalidRegion {
            message: format!("region does not overlap the {}x{} raster", w, h),
            help: Some("Select an area inside the image".to_string()),
        })
    }

    /// Polygon mask, when the region is not rectangular.
    pub fn mask(&self) -> Option<&Polygon> {
        match self {
            Region::Polygon(p) => Some(p),
            _ => None,
        }
    }

    /// Whether the pixel at (x, y) is inside the mask. Rectangular regions
    /// accept everything; callers restrict to the bounds themselves.
    pub fn includes(&self, x: u32, y: u32) -> bool {
        match self {
            Region::Polygon(p) => p.contains(x as f64, y as f64),
            _ => true,
        }
    }
}

fn parse_list<T: FromStr>(s: &str, count: usize, expected: &str) -> Result<Vec<T>> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<T>())
        .collect::<std::result::Result<Vec<T>, _>>()
        .map_err(|_| PxError::Parse {
            message: format!("Invalid coordinates '{}'", s),
            help: Some(format!("Expected {}", expected)),
        })?;

    if values.len() != count {
        return Err(PxError::Parse {
            message: format!("Expected {} values in '{}', got {}", count, s, values.len()),
            help: Some(format!("Expected {}", expected)),
        });
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Colour;

    fn raster(w: u32, h: u32) -> Raster {
        Raster::filled(w, h, Colour::BLACK).unwrap()
    }

    #[test]
    fn test_rect_clip() {
        assert_eq!(Rect::new(4, 4, 10, 10).clip(8, 8), Some(Rect::new(4, 4, 4, 4)));
        assert_eq!(Rect::new(8, 0, 4, 4).clip(8, 8), None);
        assert_eq!(Rect::new(0, 0, 0, 4).clip(8, 8), None);
    }

    #[test]
    fn test_rect_from_str() {
        assert_eq!("1, 2,3,4".parse::<Rect>().unwrap(), Rect::new(1, 2, 3, 4));
        assert!("1,2,3".parse::<Rect>().is_err());
        assert!("a,b,c,d".parse::<Rect>().is_err());
    }

    #[test]
    fn test_polygon_needs_three_vertices() {
        assert!(matches!(
            Polygon::new(vec![(0, 0), (4, 4)]),
            Err(PxError::InvalidRegion { .. })
        ));
    }

    #[test]
    fn test_polygon_contains() {
        let triangle = Polygon::new(vec![(0, 0), (10, 0), (0, 10)]).unwrap();
        assert!(triangle.contains(2.0, 2.0));
        assert!(!triangle.contains(8.0, 8.0));
        assert!(!triangle.contains(-1.0, 2.0));
    }

    #[test]
    fn test_polygon_from_str() {
        let p: Polygon = "0,0 8,0; 8,8 0,8".parse().unwrap();
        assert_eq!(p.vertices(), &[(0, 0), (8, 0), (8, 8), (0, 8)]);
        assert!("0,0 8".parse::<Polygon>().is_err());
    }

    #[test]
    fn test_region_bounds() {
        let r = raster(16, 8);
        assert_eq!(Region::Full.bounds(&r).unwrap(), Rect::new(0, 0, 16, 8));
        assert_eq!(
            Region::Rect(Rect::new(10, 2, 20, 20)).bounds(&r).unwrap(),
            Rect::new(10, 2, 6, 6)
        );

        let poly = Polygon::new(vec![(-4, 2), (12, 2), (4, 30)]).unwrap();
        assert_eq!(
            Region::Polygon(poly).bounds(&r).unwrap(),
            Rect::new(0, 2, 12, 6)
        );
    }

    #[test]
    fn test_region_outside_raster() {
        let r = raster(8, 8);
        assert!(matches!(
            Region::Rect(Rect::new(20, 20, 4, 4)).bounds(&r),
            Err(PxError::InvalidRegion { .. })
        ));
    }
}
