//! In-band chat commands.

/// Message that clears the conversation instead of being sent to the model.
pub const RESET_COMMAND: &str = "/reset";

/// Confirmation shown after a reset.
pub const RESET_CONFIRMATION: &str = "Chat history has been reset.";

/// Whether `message` is the reset command (trimmed, case-insensitive).
pub fn is_reset_command(message: &str) -> bool {
    message.trim().eq_ignore_ascii_case(RESET_COMMAND)
}
