use crate::geo::LatLng;

/// Geographic bounding box in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    pub fn of_point(p: LatLng) -> Self {
        Self {
            south: p.lat,
            west: p.lng,
            north: p.lat,
            east: p.lng,
        }
    }

    /// Union bounds over `points`; `None` when the iterator is empty.
    pub fn from_points(points: impl IntoIterator<Item = LatLng>) -> Option<Self> {
        let mut iter = points.into_iter();
        let mut bounds = Self::of_point(iter.next()?);
        for p in iter {
            bounds.extend(p);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, p: LatLng) {
        self.south = self.south.min(p.lat);
        self.west = self.west.min(p.lng);
        self.north = self.north.max(p.lat);
        self.east = self.east.max(p.lng);
    }

    pub fn center(&self) -> LatLng {
        LatLng::new(
            (self.south + self.north) * 0.5,
            (self.west + self.east) * 0.5,
        )
    }

    /// A single point spans no area; framing a fit over it is meaningless.
    pub fn is_degenerate(&self) -> bool {
        self.south == self.north && self.west == self.east
    }

    /// Grows each side outward by `fraction` of the corresponding span, so
    /// markers at the edge of a fitted view are not clipped.
    pub fn padded(&self, fraction: f64) -> Self {
        let dlat = (self.north - self.south) * fraction;
        let dlng = (self.east - self.west) * fraction;
        Self {
            south: self.south - dlat,
            west: self.west - dlng,
            north: self.north + dlat,
            east: self.east + dlng,
        }
    }

    pub fn contains(&self, p: LatLng) -> bool {
        p.lat >= self.south && p.lat <= self.north && p.lng >= self.west && p.lng <= self.east
    }
}

#[cfg(test)]
mod tests {
    use super::GeoBounds;
    use crate::geo::LatLng;

    #[test]
    fn from_points_unions_all() {
        let bounds = GeoBounds::from_points([
            LatLng::new(10.0, 20.0),
            LatLng::new(-5.0, 25.0),
            LatLng::new(12.0, 18.0),
        ])
        .expect("bounds");
        assert_eq!(bounds.south, -5.0);
        assert_eq!(bounds.west, 18.0);
        assert_eq!(bounds.north, 12.0);
        assert_eq!(bounds.east, 25.0);
    }

    #[test]
    fn from_points_empty_is_none() {
        assert!(GeoBounds::from_points([]).is_none());
    }

    #[test]
    fn single_point_is_degenerate() {
        let bounds = GeoBounds::of_point(LatLng::new(1.0, 2.0));
        assert!(bounds.is_degenerate());

        let mut extended = bounds;
        extended.extend(LatLng::new(1.5, 2.0));
        assert!(!extended.is_degenerate());
    }

    #[test]
    fn padded_grows_each_side() {
        let bounds = GeoBounds::from_points([LatLng::new(0.0, 0.0), LatLng::new(10.0, 20.0)])
            .expect("bounds");
        let padded = bounds.padded(0.3);
        assert_eq!(padded.south, -3.0);
        assert_eq!(padded.north, 13.0);
        assert_eq!(padded.west, -6.0);
        assert_eq!(padded.east, 26.0);
    }

    #[test]
    fn contains_is_inclusive_at_edges() {
        let bounds = GeoBounds::from_points([LatLng::new(0.0, 0.0), LatLng::new(10.0, 10.0)])
            .expect("bounds");
        assert!(bounds.contains(LatLng::new(0.0, 10.0)));
        assert!(bounds.contains(LatLng::new(5.0, 5.0)));
        assert!(!bounds.contains(LatLng::new(-0.1, 5.0)));
    }
}
