//! Seams to the systems this core drives but does not own.
//!
//! - Movement: receives knockback displacement and respawn teleports
//! - Presentation: receives the sampled shake/vignette/aberration once per frame

use bevy::prelude::*;
use serde::Serialize;

/// Character movement collaborator
pub trait MovementCollaborator {
    fn apply_displacement(&mut self, displacement: Vec3);
    fn teleport(&mut self, position: Vec3);
}

/// Renderer / post-process collaborator
pub trait PresentationCollaborator {
    fn set_shake_offset(&mut self, offset: Vec3);
    fn set_vignette(&mut self, intensity: f32, color: LinearRgba);
    fn set_chromatic_aberration(&mut self, intensity: f32);
}

/// `Transform` is the movement collaborator inside a Bevy world.
impl MovementCollaborator for Transform {
    fn apply_displacement(&mut self, displacement: Vec3) {
        self.translation += displacement;
    }

    fn teleport(&mut self, position: Vec3) {
        self.translation = position;
    }
}

/// Movement requests accumulated over one frame, for hosts that apply them
/// later (FFI, batched ticking).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct FrameMovement {
    pub displacement: [f32; 3],
    pub teleport: Option<[f32; 3]>,
}

impl MovementCollaborator for FrameMovement {
    fn apply_displacement(&mut self, displacement: Vec3) {
        let total = Vec3::from_array(self.displacement) + displacement;
        self.displacement = total.to_array();
    }

    fn teleport(&mut self, position: Vec3) {
        self.teleport = Some(position.to_array());
        // A teleport supersedes any displacement queued before it
        self.displacement = [0.0; 3];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transform_collaborator() {
        let mut tf = Transform::from_xyz(1.0, 0.0, 0.0);
        tf.apply_displacement(Vec3::new(0.5, 0.0, -1.0));
        assert_eq!(tf.translation, Vec3::new(1.5, 0.0, -1.0));
        tf.teleport(Vec3::new(10.0, 2.0, 3.0));
        assert_eq!(tf.translation, Vec3::new(10.0, 2.0, 3.0));
    }

    #[test]
    fn test_frame_movement_accumulates() {
        let mut frame = FrameMovement::default();
        frame.apply_displacement(Vec3::X);
        frame.apply_displacement(Vec3::Z);
        assert_eq!(frame.displacement, [1.0, 0.0, 1.0]);
        frame.teleport(Vec3::new(4.0, 0.0, 4.0));
        assert_eq!(frame.teleport, Some([4.0, 0.0, 4.0]));
        assert_eq!(frame.displacement, [0.0; 3]);
    }
}
