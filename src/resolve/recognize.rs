use crate::platform::Platform;
use crate::resolve::Target;
use regex::Regex;
use std::sync::OnceLock;

fn wall_screen_name() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"vk\.com/([a-z0-9_\-.]+)").expect("valid wall link regex"))
}

fn wall_numeric_community() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:club|public|event)(\d+)").expect("valid wall community regex")
    })
}

fn feed_group_or_profile() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"ok\.ru/(?:group|profile)/(\d+)").expect("valid feed link regex")
    })
}

fn stream_channel() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:telegram\.me|t\.me)/(\w+)").expect("valid stream link regex")
    })
}

fn bare_handle() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[a-z0-9_\-.]+$").expect("valid bare handle regex"))
}

/// Resolves a free-form link string into a typed [`Target`]
///
/// The link is trimmed and lowercased, then matched against an ordered list
/// of platform recognizers: wall-platform forms (`vk.com/<name>`,
/// `club<id>`/`public<id>`/`event<id>`), feed-platform group/profile forms
/// (`ok.ru/group/<id>`, `ok.ru/profile/<id>`), message-stream forms
/// (`t.me/<name>`, `telegram.me/<name>`), and finally a bare handle with no
/// host marker, which is taken as a wall-platform screen name. The first
/// matching recognizer wins and its platform prefix tags the canonical
/// `platform_id`.
///
/// Protocol prefixes (`http://`, `https://`, bare domain) do not change the
/// result. Returns `None` for empty or unrecognized input.
///
/// # Examples
///
/// ```
/// use seine::resolve::resolve;
/// use seine::platform::Platform;
///
/// let target = resolve("https://vk.com/mygroup", "My Group").unwrap();
/// assert_eq!(target.platform, Platform::Vk);
/// assert_eq!(target.platform_id, "vk_mygroup");
///
/// assert!(resolve("ftp://somewhere/else", "x").is_none());
/// ```
pub fn resolve(raw_link: &str, display_name: &str) -> Option<Target> {
    let trimmed = raw_link.trim();
    if trimmed.is_empty() {
        return None;
    }
    let link = trimmed.to_lowercase();

    let recognized = recognize(&link)?;

    Some(Target {
        original_link: trimmed.to_string(),
        platform: recognized.0,
        platform_id: format!("{}{}", recognized.0.id_prefix(), recognized.1),
        display_name: display_name.trim().to_string(),
    })
}

/// Runs the ordered recognizer list against a normalized link
fn recognize(link: &str) -> Option<(Platform, String)> {
    if let Some(caps) = wall_screen_name().captures(link) {
        return Some((Platform::Vk, caps[1].to_string()));
    }
    if let Some(caps) = wall_numeric_community().captures(link) {
        return Some((Platform::Vk, caps[0].to_string()));
    }
    if let Some(caps) = feed_group_or_profile().captures(link) {
        return Some((Platform::Ok, caps[1].to_string()));
    }
    if let Some(caps) = stream_channel().captures(link) {
        return Some((Platform::Tg, caps[1].to_string()));
    }
    // No host marker at all: treat as a wall-platform screen name.
    if bare_handle().is_match(link) {
        return Some((Platform::Vk, link.to_string()));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_wall_screen_name() {
        let t = resolve("https://vk.com/mygroup", "Group").unwrap();
        assert_eq!(t.platform, Platform::Vk);
        assert_eq!(t.platform_id, "vk_mygroup");
        assert_eq!(t.display_name, "Group");
    }

    #[test]
    fn test_resolve_protocol_prefix_does_not_matter() {
        let https = resolve("https://vk.com/mygroup", "g").unwrap();
        let http = resolve("http://vk.com/mygroup", "g").unwrap();
        let bare = resolve("vk.com/mygroup", "g").unwrap();

        assert_eq!(https.platform_id, http.platform_id);
        assert_eq!(http.platform_id, bare.platform_id);
    }

    #[test]
    fn test_resolve_wall_numeric_forms() {
        for form in ["club123", "public123", "event123"] {
            let t = resolve(form, "g").unwrap();
            assert_eq!(t.platform, Platform::Vk);
            assert_eq!(t.platform_id, format!("vk_{form}"));
        }
    }

    #[test]
    fn test_resolve_wall_numeric_form_inside_link() {
        let t = resolve("https://vk.com/club987", "g").unwrap();
        assert_eq!(t.platform, Platform::Vk);
        assert_eq!(t.platform_id, "vk_club987");
    }

    #[test]
    fn test_resolve_feed_group_and_profile() {
        let group = resolve("https://ok.ru/group/5512345", "g").unwrap();
        assert_eq!(group.platform, Platform::Ok);
        assert_eq!(group.platform_id, "ok_5512345");

        let profile = resolve("ok.ru/profile/777", "p").unwrap();
        assert_eq!(profile.platform, Platform::Ok);
        assert_eq!(profile.platform_id, "ok_777");
    }

    #[test]
    fn test_resolve_stream_channel_forms() {
        let short = resolve("https://t.me/somechannel", "c").unwrap();
        assert_eq!(short.platform, Platform::Tg);
        assert_eq!(short.platform_id, "tg_somechannel");

        let long = resolve("telegram.me/somechannel", "c").unwrap();
        assert_eq!(long.platform_id, "tg_somechannel");
    }

    #[test]
    fn test_resolve_stream_channel_with_message_suffix() {
        let t = resolve("https://t.me/somechannel/4821", "c").unwrap();
        assert_eq!(t.platform_id, "tg_somechannel");
    }

    #[test]
    fn test_resolve_bare_handle_falls_back_to_wall() {
        let t = resolve("my_group.name", "g").unwrap();
        assert_eq!(t.platform, Platform::Vk);
        assert_eq!(t.platform_id, "vk_my_group.name");
    }

    #[test]
    fn test_resolve_trims_and_lowercases() {
        let t = resolve("  VK.com/MyGroup  ", "  Group  ").unwrap();
        assert_eq!(t.platform_id, "vk_mygroup");
        assert_eq!(t.original_link, "VK.com/MyGroup");
        assert_eq!(t.display_name, "Group");
    }

    #[test]
    fn test_resolve_empty_input() {
        assert!(resolve("", "g").is_none());
        assert!(resolve("   ", "g").is_none());
    }

    #[test]
    fn test_resolve_unrecognized_input() {
        assert!(resolve("https://example.com/something", "g").is_none());
        assert!(resolve("not a link at all", "g").is_none());
    }
}
