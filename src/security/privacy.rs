// src/security/privacy.rs
use crate::enums::FocusEvent;

/// Tracks window focus; secrets are obscured while the window is not in front
#[derive(Debug, Clone, Copy)]
pub struct PrivacyBlur {
    enabled: bool,
    focused: bool,
    minimized: bool,
}

impl PrivacyBlur {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            focused: true,
            minimized: false,
        }
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn on_focus(&mut self, event: FocusEvent) {
        match event {
            FocusEvent::Focused => {
                self.focused = true;
                self.minimized = false;
            }
            FocusEvent::Blurred => self.focused = false,
            FocusEvent::Minimized => {
                self.focused = false;
                self.minimized = true;
            }
            FocusEvent::Restored => self.minimized = false,
        }
    }

    pub fn obscure(&self) -> bool {
        self.enabled && (!self.focused || self.minimized)
    }
}
