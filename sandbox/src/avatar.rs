use kcc_controller::{TransformSink, Vec3};

/// Stand-in for a rendered avatar: records the committed pose.
#[derive(Debug, Default)]
pub struct Avatar {
    pub position: Vec3,
    pub yaw: f32,
    pub commits: u64,
}

impl TransformSink for Avatar {
    fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.commits += 1;
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_yaw(&mut self, yaw: f32) {
        self.yaw = yaw;
    }
}
