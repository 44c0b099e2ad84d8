//! Sizes and positions of the drawer container and its children.
//!
//! All coordinates are local to the container, with the origin at its top-left corner.

use std::collections::HashMap;

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size {
    pub w: i32,
    pub h: i32,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Self { x, y }
    }
}

impl Size {
    pub const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }
}

impl From<(i32, i32)> for Size {
    fn from((w, h): (i32, i32)) -> Self {
        Self { w, h }
    }
}

impl Rect {
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Whether the point lies inside, with the right and bottom edges excluded.
    pub fn contains(&self, point: Point) -> bool {
        let (x, y) = (point.x.floor(), point.y.floor());
        f64::from(self.x) <= x
            && x < f64::from(self.x) + f64::from(self.w)
            && f64::from(self.y) <= y
            && y < f64::from(self.y) + f64::from(self.h)
    }
}

/// Layout information the controller reads from its host.
pub trait Geometry {
    fn container_size(&self) -> Size;

    /// Size of the child with the given id, or `None` if there is no such child.
    fn child_size(&self, id: &str) -> Option<Size>;
}

/// Geometry with explicitly set sizes.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StaticGeometry {
    container: Size,
    children: HashMap<String, Size>,
}

impl StaticGeometry {
    pub fn new(container: Size) -> Self {
        Self {
            container,
            children: HashMap::new(),
        }
    }

    pub fn with_child(mut self, id: impl Into<String>, size: Size) -> Self {
        self.set_child_size(id, size);
        self
    }

    pub fn set_container_size(&mut self, size: Size) {
        self.container = size;
    }

    pub fn set_child_size(&mut self, id: impl Into<String>, size: Size) {
        self.children.insert(id.into(), size);
    }
}

impl Geometry for StaticGeometry {
    fn container_size(&self) -> Size {
        self.container
    }

    fn child_size(&self, id: &str) -> Option<Size> {
        self.children.get(id).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_contains_excludes_far_edges() {
        let rect = Rect::new(10, 20, 30, 40);
        assert!(rect.contains(Point::new(10., 20.)));
        assert!(rect.contains(Point::new(39.9, 59.9)));
        assert!(!rect.contains(Point::new(40., 30.)));
        assert!(!rect.contains(Point::new(20., 60.)));
        assert!(!rect.contains(Point::new(9.5, 30.)));
    }

    #[test]
    fn static_geometry_lookup() {
        let geometry = StaticGeometry::new(Size::new(300, 200))
            .with_child("handle", Size::new(50, 100))
            .with_child("content", Size::new(250, 200));

        assert_eq!(geometry.container_size(), Size::new(300, 200));
        assert_eq!(geometry.child_size("handle"), Some(Size::new(50, 100)));
        assert_eq!(geometry.child_size("missing"), None);
    }
}
