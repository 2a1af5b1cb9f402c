//! The message relayed to the opener once an OAuth callback completes.

use serde::{Deserialize, Serialize};
use viralbites_core::SocialPlatform;

/// `{type: "AUTH_SUCCESS", platform, token}` or
/// `{type: "AUTH_ERROR", platform, error}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AuthMessage {
    #[serde(rename = "AUTH_SUCCESS")]
    Success { platform: String, token: String },
    #[serde(rename = "AUTH_ERROR")]
    Error { platform: String, error: String },
}

impl AuthMessage {
    #[must_use]
    pub fn success(platform: SocialPlatform, token: impl Into<String>) -> Self {
        AuthMessage::Success {
            platform: platform.to_string(),
            token: token.into(),
        }
    }

    #[must_use]
    pub fn error(platform: SocialPlatform, error: impl Into<String>) -> Self {
        AuthMessage::Error {
            platform: platform.to_string(),
            error: error.into(),
        }
    }

    #[must_use]
    pub fn platform(&self) -> &str {
        match self {
            AuthMessage::Success { platform, .. } | AuthMessage::Error { platform, .. } => platform,
        }
    }

    /// Whether this message is about `platform`, compared case-insensitively.
    #[must_use]
    pub fn is_for(&self, platform: SocialPlatform) -> bool {
        self.platform().eq_ignore_ascii_case(&platform.to_string())
    }
}

/// Renders the callback page that posts `message` to the window opener and
/// closes itself. Values are JSON-encoded, and `</` is escaped so a token
/// cannot terminate the script element.
///
/// The message is only posted to `target_origin`. Without one, the page
/// closes without posting.
#[must_use]
pub fn callback_page(message: &AuthMessage, target_origin: Option<&str>) -> String {
    let payload = script_json(message);
    let origin = script_json(&target_origin);
    let heading = match message {
        AuthMessage::Success { .. } => "Connected. You can close this window.",
        AuthMessage::Error { .. } => "Authentication failed. You can close this window.",
    };

    format!(
        "<!DOCTYPE html>\n<html>\n<body>\n<p>{heading}</p>\n<script>\n  \
         const targetOrigin = {origin};\n  \
         if (window.opener && targetOrigin) {{ window.opener.postMessage({payload}, targetOrigin); }}\n  \
         window.close();\n</script>\n</body>\n</html>\n"
    )
}

fn script_json<T: Serialize + ?Sized>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_serializes_with_type_tag() {
        let json = serde_json::to_value(AuthMessage::success(SocialPlatform::YouTube, "tok")).unwrap();
        assert_eq!(json["type"], "AUTH_SUCCESS");
        assert_eq!(json["platform"], "YouTube");
        assert_eq!(json["token"], "tok");
        assert!(json.get("error").is_none());
    }

    #[test]
    fn error_serializes_with_type_tag() {
        let json =
            serde_json::to_value(AuthMessage::error(SocialPlatform::Instagram, "denied")).unwrap();
        assert_eq!(json["type"], "AUTH_ERROR");
        assert_eq!(json["error"], "denied");
    }

    #[test]
    fn is_for_matches_platform_display_name() {
        let msg = AuthMessage::success(SocialPlatform::Instagram, "t");
        assert!(msg.is_for(SocialPlatform::Instagram));
        assert!(!msg.is_for(SocialPlatform::YouTube));
    }

    #[test]
    fn callback_page_escapes_script_breakout() {
        let page = callback_page(
            &AuthMessage::success(SocialPlatform::YouTube, "abc</script><script>alert(1)"),
            Some("http://localhost:5173"),
        );
        assert!(!page.contains("abc</script>"));
        assert!(page.contains("abc<\\/script>"));
        assert!(page.contains("\"type\":\"AUTH_SUCCESS\""));
        assert!(page.contains("window.close()"));
    }

    #[test]
    fn callback_page_posts_only_to_the_configured_origin() {
        let page = callback_page(
            &AuthMessage::success(SocialPlatform::Instagram, "tok"),
            Some("https://app.viralbites.test"),
        );
        assert!(page.contains("const targetOrigin = \"https://app.viralbites.test\";"));
        assert!(page.contains("postMessage({\"type\":\"AUTH_SUCCESS\""));
        assert!(!page.contains("'*'"));
        assert!(!page.contains("\"*\""));
    }

    #[test]
    fn callback_page_without_origin_does_not_post() {
        let page = callback_page(&AuthMessage::error(SocialPlatform::YouTube, "denied"), None);
        assert!(page.contains("const targetOrigin = null;"));
        assert!(!page.contains("'*'"));
        assert!(page.contains("window.close()"));
    }
}
