//! Light/dark theme preference and the design tokens for each mode.
//!
//! The preference is persisted as a JSON boolean under
//! [`crate::THEME_STORAGE_KEY`]; `true` means dark.

use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

impl ThemeMode {
    #[must_use]
    pub const fn from_dark_flag(dark: bool) -> Self {
        if dark {
            Self::Dark
        } else {
            Self::Light
        }
    }

    #[must_use]
    pub const fn is_dark(self) -> bool {
        matches!(self, Self::Dark)
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    #[must_use]
    pub fn tokens(self) -> ThemeTokens {
        match self {
            Self::Light => ThemeTokens {
                color_text_base: "#1A1A1A".into(),
                color_bg_base: "#FFFFFF".into(),
                ..ThemeTokens::shared()
            },
            Self::Dark => ThemeTokens {
                color_text_base: "#FFFFFF".into(),
                color_bg_base: "#1A1A1A".into(),
                ..ThemeTokens::shared()
            },
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ThemeTokens {
    pub color_primary: String,
    pub color_success: String,
    pub color_warning: String,
    pub color_error: String,
    pub color_text_base: String,
    pub color_bg_base: String,
    pub border_radius: u8,
    pub font_family: String,
}

impl ThemeTokens {
    fn shared() -> Self {
        Self {
            color_primary: "#40E0D0".into(),
            color_success: "#32D74B".into(),
            color_warning: "#FFA500".into(),
            color_error: "#FF453A".into(),
            color_text_base: String::new(),
            color_bg_base: String::new(),
            border_radius: 8,
            font_family: "'Roboto', sans-serif".into(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ThemeState {
    pub mode: ThemeMode,
    /// Set once the stored preference has been read (or found missing).
    pub restored: bool,
}

impl ThemeState {
    /// Applies the stored preference. A toggle made before the stored value
    /// arrived wins over it.
    pub fn restore(&mut self, stored_dark: Option<bool>) {
        if !self.restored {
            if let Some(dark) = stored_dark {
                self.mode = ThemeMode::from_dark_flag(dark);
            }
        }
        self.restored = true;
    }

    /// Flips the mode and returns the flag to persist.
    pub fn toggle(&mut self) -> bool {
        self.mode = self.mode.toggled();
        self.restored = true;
        self.mode.is_dark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_light() {
        let state = ThemeState::default();
        assert_eq!(state.mode, ThemeMode::Light);
        assert!(!state.restored);
    }

    #[test]
    fn restores_stored_dark_preference() {
        let mut state = ThemeState::default();
        state.restore(Some(true));
        assert_eq!(state.mode, ThemeMode::Dark);
        assert!(state.restored);
    }

    #[test]
    fn missing_preference_keeps_light() {
        let mut state = ThemeState::default();
        state.restore(None);
        assert_eq!(state.mode, ThemeMode::Light);
        assert!(state.restored);
    }

    #[test]
    fn toggle_before_restore_wins() {
        let mut state = ThemeState::default();
        assert!(state.toggle());
        state.restore(Some(false));
        assert_eq!(state.mode, ThemeMode::Dark);
    }

    #[test]
    fn toggle_flips_both_ways() {
        let mut state = ThemeState::default();
        assert!(state.toggle());
        assert!(!state.toggle());
        assert_eq!(state.mode, ThemeMode::Light);
    }

    #[test]
    fn tokens_follow_mode() {
        let light = ThemeMode::Light.tokens();
        let dark = ThemeMode::Dark.tokens();
        assert_eq!(light.color_bg_base, "#FFFFFF");
        assert_eq!(dark.color_bg_base, "#1A1A1A");
        assert_eq!(dark.color_text_base, "#FFFFFF");
        assert_eq!(light.color_primary, dark.color_primary);
        assert_eq!(light.border_radius, 8);
        assert_eq!(light.font_family, "'Roboto', sans-serif");
    }
}
