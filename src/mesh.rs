use crate::error::Error;

/// A 1D mesh of equally spaced zones covering `[x0, x0 + length]`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UniformMesh {
    /// Number of zones
    pub num_zones: usize,
    /// Left coordinate edge of the domain
    pub x0: f64,
    /// Extent of the domain
    pub length: f64,
}

impl UniformMesh {
    /// Creates a mesh on the unit interval with the given number of zones.
    pub fn unit_interval(num_zones: usize) -> Self {
        Self {
            num_zones,
            x0: 0.0,
            length: 1.0,
        }
    }

    /// Returns an `InvalidConfig` error for an empty mesh or a domain with
    /// non-positive extent.
    pub fn validate(&self) -> Result<(), Error> {
        if self.num_zones == 0 {
            return Err(Error::InvalidConfig("the mesh must have at least one zone".into()));
        }
        if !(self.length > 0.0) || !self.length.is_finite() || !self.x0.is_finite() {
            return Err(Error::InvalidConfig(format!(
                "the domain [{}, {}+{}] is invalid",
                self.x0, self.x0, self.length
            )));
        }
        Ok(())
    }

    /// Zone spacing
    pub fn dx(&self) -> f64 {
        self.length / self.num_zones as f64
    }

    /// Coordinate reported for zone `i` in output tables, `x0 + i dx`.
    pub fn cell_coordinate(&self, i: usize) -> f64 {
        self.x0 + i as f64 * self.dx()
    }

    /// Coordinate of the center of zone `i`, where initial data is sampled.
    pub fn cell_center(&self, i: usize) -> f64 {
        self.x0 + (i as f64 + 0.5) * self.dx()
    }
}
