use serde::{Deserialize, Serialize};

/// Delays between auto-play steps, in milliseconds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Timing {
    pub card_reveal_ms: u64,
    pub box_break_ms: u64,
    pub auto_step_ms: u64,
    pub wait_after_break_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        let box_break_ms = 420;
        Self {
            card_reveal_ms: 420,
            box_break_ms,
            auto_step_ms: 420,
            wait_after_break_ms: box_break_ms + 160,
        }
    }
}

impl Timing {
    pub fn reduced_motion() -> Self {
        Self {
            card_reveal_ms: 40,
            box_break_ms: 0,
            auto_step_ms: 80,
            wait_after_break_ms: 80,
        }
    }

    pub fn instant() -> Self {
        Self {
            card_reveal_ms: 0,
            box_break_ms: 0,
            auto_step_ms: 0,
            wait_after_break_ms: 0,
        }
    }
}
