//! Vertical motion: gravity, jumping and the two jump forgiveness windows.
//!
//! The integrator owns `velocity.y` and the jump timers. Rules, applied in order every tick:
//!
//! 1. Jump buffer: refreshed to its maximum when jump is requested, otherwise counted down
//!    (floored at zero).
//! 2. Grounded and not rising: vertical velocity is held at zero.
//! 3. Airborne: gravity is integrated and the fall speed clamped to the terminal speed.
//! 4. Jump: fires when the buffer is live, the avatar is grounded or inside coyote time,
//!    it is not moving upward and no earlier jump is still waiting for a landing.
//!
//! Coyote time lets a jump through briefly after walking off a ledge; the jump buffer
//! remembers a press made slightly before landing. Both exist because matching input to
//! the exact frame of a ground transition is unreliable at variable frame rates.

use crate::config::ControllerConfig;
use crate::types::CharacterState;

/// How a jump was allowed through.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum JumpKind {
    /// Standing on walkable ground.
    Grounded,
    /// Airborne, but inside the coyote window.
    Coyote,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct VerticalMotionIntegrator;

impl VerticalMotionIntegrator {
    /// Advance vertical velocity and jump timers by `dt`.
    ///
    /// Returns the kind of jump that fired this tick, if any.
    pub fn integrate(
        &self,
        cfg: &ControllerConfig,
        state: &mut CharacterState,
        jump_requested: bool,
        dt: f32,
    ) -> Option<JumpKind> {
        // 1) Jump buffer.
        state.jump_buffer_timer = if jump_requested {
            cfg.jump_buffer_time
        } else {
            (state.jump_buffer_timer - dt).max(0.0)
        };

        // 2) Resting on ground.
        if state.is_grounded && state.velocity.y <= 0.0 && !state.is_jumping {
            state.velocity.y = 0.0;
        }

        // 3) Gravity with terminal fall speed.
        if !state.is_grounded {
            state.velocity.y -= cfg.gravity * dt;
            state.velocity.y = state.velocity.y.max(-cfg.max_fall_speed);
        }

        // 4) Jump.
        let supported = state.is_grounded || state.coyote_timer > 0.0;
        if state.jump_buffer_timer > 0.0
            && supported
            && state.velocity.y <= 0.0
            && !state.jump_locked
        {
            let kind = if state.is_grounded {
                JumpKind::Grounded
            } else {
                JumpKind::Coyote
            };

            state.velocity.y = cfg.jump_speed;
            state.jump_buffer_timer = 0.0;
            state.coyote_timer = 0.0;
            state.jump_locked = true;
            state.is_jumping = true;

            log::debug!("jump ({kind:?}) at y={:.3}", state.position.y);
            return Some(kind);
        }

        None
    }
}
