//! Theme preference.

/// Persisted UI theme. Light unless the stored flag says dark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Value written to local storage.
    pub fn as_stored(self) -> &'static str {
        match self {
            Theme::Light => "light-theme",
            Theme::Dark => "dark-theme",
        }
    }

    /// Parse a stored flag; anything but the dark flag means light.
    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some("dark-theme") => Theme::Dark,
            _ => Theme::Light,
        }
    }
}
