//! Status banner shown above the widget.

use serde::{Deserialize, Serialize};

/// Banner heading, as a translation key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BannerTitle {
    /// No signed-in buyer.
    NotLoggedIn,
    /// Prompt to pick lines to save.
    SaveCart,
    /// Last save succeeded.
    Saved,
    /// Last save failed.
    Failed,
}

impl BannerTitle {
    /// Translation key for this title.
    #[must_use]
    pub const fn translation_key(self) -> &'static str {
        match self {
            Self::NotLoggedIn => "notLoggedIn",
            Self::SaveCart => "saveCart",
            Self::Saved => "saved",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for BannerTitle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.translation_key())
    }
}

/// Banner tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BannerStatus {
    Info,
    Success,
    Critical,
}

/// Banner title and tone together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Banner {
    pub title: BannerTitle,
    pub status: BannerStatus,
}

impl Banner {
    #[must_use]
    pub const fn new(title: BannerTitle, status: BannerStatus) -> Self {
        Self { title, status }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_translation_keys() {
        assert_eq!(BannerTitle::NotLoggedIn.translation_key(), "notLoggedIn");
        assert_eq!(BannerTitle::SaveCart.translation_key(), "saveCart");
        assert_eq!(BannerTitle::Saved.to_string(), "saved");
        assert_eq!(BannerTitle::Failed.to_string(), "failed");
    }

    #[test]
    fn test_serialized_names_match_keys() {
        for title in [
            BannerTitle::NotLoggedIn,
            BannerTitle::SaveCart,
            BannerTitle::Saved,
            BannerTitle::Failed,
        ] {
            let json = serde_json::to_string(&title).unwrap();
            assert_eq!(json, format!("\"{}\"", title.translation_key()));
        }
        assert_eq!(
            serde_json::to_string(&BannerStatus::Critical).unwrap(),
            "\"critical\""
        );
    }
}
