use cgmath::{Vector3, Vector4};

/// Homogeneous particle position, laid out for upload as `vec4<f32>`.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
}

impl Position {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z, w: 1.0 }
    }

    /// Weighted form, so `amount == 1` lands exactly on `other`.
    pub fn lerp(&self, other: &Position, amount: f32) -> Position {
        (Vector4::from(*self) * (1.0 - amount) + Vector4::from(*other) * amount).into()
    }
}

impl From<Vector3<f32>> for Position {
    fn from(v: Vector3<f32>) -> Self {
        Self::new(v.x, v.y, v.z)
    }
}

impl From<Position> for Vector4<f32> {
    fn from(p: Position) -> Self {
        Vector4::new(p.x, p.y, p.z, p.w)
    }
}

impl From<Vector4<f32>> for Position {
    fn from(v: Vector4<f32>) -> Self {
        Self {
            x: v.x,
            y: v.y,
            z: v.z,
            w: v.w,
        }
    }
}

#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Rgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Rgb {
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Relative luminance (Rec. 709 weights), in `[0, 1]` for in-gamut colors.
    pub fn luminance(&self) -> f32 {
        0.2126 * self.r + 0.7152 * self.g + 0.0722 * self.b
    }

    /// Hue, saturation and value all in `[0, 1]`.
    pub fn from_hsv(h: f32, s: f32, v: f32) -> Self {
        let sector = (h * 6.0).floor();
        let f = h * 6.0 - sector;
        let p = v * (1.0 - s);
        let q = v * (1.0 - f * s);
        let t = v * (1.0 - (1.0 - f) * s);

        match (sector as i64).rem_euclid(6) {
            0 => Self::new(v, t, p),
            1 => Self::new(q, v, p),
            2 => Self::new(p, v, t),
            3 => Self::new(p, q, v),
            4 => Self::new(t, p, v),
            _ => Self::new(v, p, q),
        }
    }
}
