use thiserror::Error;

use crate::geometry::DEFAULT_PADDING;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid browsing offset '{0}', it must be a positive integer")]
    InvalidOffset(String),
}

/// Thickness of a shown annotation, always within `[MIN, MAX]`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineThickness(u32);

impl LineThickness {
    pub const MIN: u32 = 1;
    pub const MAX: u32 = 10;
    pub const DEFAULT: u32 = 2;

    pub fn new(value: i64) -> Self {
        Self(value.clamp(Self::MIN as i64, Self::MAX as i64) as u32)
    }

    /// Parse user input; anything that is not an integer gives the default
    pub fn parse(input: &str) -> Self {
        match input.trim().parse::<i64>() {
            Ok(value) => Self::new(value),
            Err(_) => {
                tracing::warn!(
                    "Invalid line thickness '{}', using {}",
                    input,
                    Self::DEFAULT
                );
                Self(Self::DEFAULT)
            }
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }
}

impl Default for LineThickness {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

/// Number of frames skipped by one browsing step, at least 1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BrowsingOffset(usize);

impl BrowsingOffset {
    pub fn new(value: i64) -> Self {
        Self(value.max(1) as usize)
    }

    pub fn parse(input: &str) -> Result<Self, ConfigError> {
        input
            .trim()
            .parse::<i64>()
            .map(Self::new)
            .map_err(|_| ConfigError::InvalidOffset(input.to_string()))
    }

    pub fn get(self) -> usize {
        self.0
    }
}

impl Default for BrowsingOffset {
    fn default() -> Self {
        Self(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Largest displayed frame width before downscaling kicks in
    pub max_width: u32,
    pub max_height: u32,
    /// Padding of the display surface, removed from pointer coordinates
    pub padding: i32,
    pub line_thickness: LineThickness,
    pub browsing_offset: BrowsingOffset,
}

impl Default for SessionConfig {
    fn default() -> Self {
        // a 1920x1080 screen minus the side panel and title bars
        Self {
            max_width: 1720,
            max_height: 960,
            padding: DEFAULT_PADDING,
            line_thickness: LineThickness::default(),
            browsing_offset: BrowsingOffset::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{BrowsingOffset, ConfigError, LineThickness};

    #[test]
    fn thickness_is_clamped() {
        assert_eq!(LineThickness::parse("0").get(), 1);
        assert_eq!(LineThickness::parse("-7").get(), 1);
        assert_eq!(LineThickness::parse(" 4 ").get(), 4);
        assert_eq!(LineThickness::parse("25").get(), 10);
    }

    #[test]
    fn thickness_falls_back_on_garbage() {
        assert_eq!(LineThickness::parse("thick").get(), LineThickness::DEFAULT);
        assert_eq!(LineThickness::parse("").get(), LineThickness::DEFAULT);
        assert_eq!(LineThickness::parse("2.5").get(), LineThickness::DEFAULT);
    }

    #[test]
    fn offset_is_at_least_one() {
        assert_eq!(BrowsingOffset::parse("0").map(BrowsingOffset::get), Ok(1));
        assert_eq!(BrowsingOffset::parse("-3").map(BrowsingOffset::get), Ok(1));
        assert_eq!(BrowsingOffset::parse("25").map(BrowsingOffset::get), Ok(25));
        assert_eq!(
            BrowsingOffset::parse("ten"),
            Err(ConfigError::InvalidOffset("ten".to_string()))
        );
    }
}
