//! Gaussian densities used to spread a point's key mass over nearby keys.

use std::f32::consts::PI;

#[derive(Debug, Clone, Copy)]
pub struct NormalDistribution {
    mean: f32,
    variance: f32,
    scale: f32,
}

impl NormalDistribution {
    pub fn new(mean: f32, std_dev: f32) -> Self {
        let variance = std_dev * std_dev;
        Self {
            mean,
            variance,
            scale: 1.0 / (2.0 * PI * variance).sqrt(),
        }
    }

    #[inline(always)]
    pub fn density(&self, x: f32) -> f32 {
        let d = x - self.mean;
        self.scale * (-(d * d) / (2.0 * self.variance)).exp()
    }
}

/// Two independent normals on axes rotated by `theta` around `(ux, uy)`.
#[derive(Debug, Clone, Copy)]
pub struct NormalDistribution2D {
    ux: f32,
    uy: f32,
    sin_theta: f32,
    cos_theta: f32,
    x_dist: NormalDistribution,
    y_dist: NormalDistribution,
}

impl NormalDistribution2D {
    pub fn new(ux: f32, sigma_x: f32, uy: f32, sigma_y: f32, theta: f32) -> Self {
        Self {
            ux,
            uy,
            sin_theta: theta.sin(),
            cos_theta: theta.cos(),
            x_dist: NormalDistribution::new(0.0, sigma_x),
            y_dist: NormalDistribution::new(0.0, sigma_y),
        }
    }

    pub fn density(&self, x: f32, y: f32) -> f32 {
        let dx = x - self.ux;
        let dy = y - self.uy;
        let rx = self.cos_theta * dx + self.sin_theta * dy;
        let ry = -self.sin_theta * dx + self.cos_theta * dy;
        self.x_dist.density(rx) * self.y_dist.density(ry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn peak_is_at_the_mean() {
        let d = NormalDistribution2D::new(10.0, 5.0, 20.0, 3.0, 0.7);
        let peak = d.density(10.0, 20.0);
        assert!(peak > d.density(11.0, 20.0));
        assert!(peak > d.density(10.0, 21.0));
    }

    #[test]
    fn rotation_swaps_axes_at_right_angle() {
        let d = NormalDistribution2D::new(0.0, 10.0, 0.0, 2.0, PI / 2.0);
        // The wide axis now points along y.
        assert!(d.density(0.0, 8.0) > d.density(8.0, 0.0));
    }
}
