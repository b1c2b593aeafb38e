use std::collections::HashMap;

use crate::types::Vector2D;

/// Device-independent intents for one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct InputSnapshot {
    /// Desired movement on the ground plane; longer than 1 is normalized.
    pub movement: Vector2D,
    pub fire: bool,
    pub melee: bool,
    pub reload: bool,
    pub respawn: bool,
    pub quit: bool,
}

impl InputSnapshot {
    pub fn idle() -> Self {
        InputSnapshot::default()
    }

    pub fn moving(x: f64, z: f64) -> Self {
        InputSnapshot {
            movement: Vector2D::new(x, z),
            ..InputSnapshot::default()
        }
    }

    /// Movement clamped to unit length.
    pub fn clamped_movement(&self) -> Vector2D {
        if self.movement.length() > 1.0 {
            self.movement.normalized().unwrap_or(Vector2D::ZERO)
        } else {
            self.movement
        }
    }
}

// --- ScriptedInput for headless debug runs ---
pub struct ScriptedInput {
    events: HashMap<u64, InputSnapshot>,
}

impl ScriptedInput {
    pub fn new(events: HashMap<u64, InputSnapshot>) -> Self {
        ScriptedInput { events }
    }

    /// A short scripted session: walk, shoot, swing, then quit.
    pub fn demo() -> Self {
        let mut events = HashMap::new();
        for frame in 1..30 {
            events.insert(frame, InputSnapshot::moving(0.0, 1.0));
        }
        events.insert(30, InputSnapshot { fire: true, ..InputSnapshot::default() });
        events.insert(45, InputSnapshot { melee: true, ..InputSnapshot::default() });
        events.insert(60, InputSnapshot { reload: true, ..InputSnapshot::default() });
        events.insert(240, InputSnapshot { quit: true, ..InputSnapshot::default() });
        ScriptedInput::new(events)
    }

    pub fn poll(&mut self, frame_count: u64) -> InputSnapshot {
        self.events.remove(&frame_count).unwrap_or_default()
    }
}
