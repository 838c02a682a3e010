
use glam::{Mat4, Vec3};

/// Position, rotation and scale for a single drawable.
///
/// Rotation is given in degrees per axis. The default transform is the
/// identity: zero position and rotation, unit scale.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub fn new() -> Transform {
        Transform {
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
        }
    }

    /// The model matrix for this transform:
    /// `Translate(position) * RotateX * RotateY * RotateZ`, with the
    /// rotations converted from degrees and applied in x, y, z order. The
    /// composition order is part of the draw contract. Scale is carried as
    /// state for the application but is not folded into the matrix.
    pub fn matrix(&self) -> Mat4 {
        let rotate_x = Mat4::from_rotation_x(self.rotation.x.to_radians());
        let rotate_y = Mat4::from_rotation_y(self.rotation.y.to_radians());
        let rotate_z = Mat4::from_rotation_z(self.rotation.z.to_radians());

        Mat4::from_translation(self.position) * rotate_x * rotate_y * rotate_z
    }
}

impl Default for Transform {
    fn default() -> Transform {
        Transform::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_identity() {
        let transform = Transform::default();

        assert_eq!(transform.position, Vec3::ZERO);
        assert_eq!(transform.rotation, Vec3::ZERO);
        assert_eq!(transform.scale, Vec3::ONE);
        assert!(transform.matrix().abs_diff_eq(Mat4::IDENTITY, 1e-6));
    }

    #[test]
    fn rotation_axes_are_not_interchangeable() {
        let mut around_x = Transform::new();
        around_x.rotation = Vec3::new(90.0, 0.0, 0.0);

        let mut around_y = Transform::new();
        around_y.rotation = Vec3::new(0.0, 90.0, 0.0);

        assert!(!around_x.matrix().abs_diff_eq(around_y.matrix(), 1e-6));
    }

    #[test]
    fn rotations_compose_in_x_y_z_order() {
        let mut transform = Transform::new();
        transform.rotation = Vec3::new(90.0, 90.0, 0.0);

        let expected = Mat4::from_rotation_x(90f32.to_radians())
            * Mat4::from_rotation_y(90f32.to_radians());
        assert!(transform.matrix().abs_diff_eq(expected, 1e-6));
    }

    #[test]
    fn z_rotation_turns_x_into_y() {
        let mut transform = Transform::new();
        transform.rotation = Vec3::new(0.0, 0.0, 90.0);

        let rotated = transform.matrix().transform_point3(Vec3::X);
        assert!(rotated.abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn translation_ends_up_in_the_last_column() {
        let mut transform = Transform::new();
        transform.position = Vec3::new(1.0, 2.0, 3.0);

        let matrix = transform.matrix();
        assert_eq!(matrix.w_axis.truncate(), Vec3::new(1.0, 2.0, 3.0));
    }
}
