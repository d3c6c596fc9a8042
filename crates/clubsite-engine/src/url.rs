//! URL policy for every externally supplied block URL.
//!
//! [`normalize_external_url`] is applied both when an author commits a URL
//! field and when the renderer resolves one for navigation or framing.

use url::Url;

const BLOCKED_SCHEMES: [&str; 3] = ["javascript:", "data:", "vbscript:"];

/// Normalizes an author-supplied URL, or rejects it.
///
/// - empty / whitespace, `javascript:`, `data:`, `vbscript:` → `None`
/// - `//host/path` → `https://host/path`
/// - `http(s)://`, `mailto:`, `tel:` → unchanged (trimmed)
/// - anything else → prefixed with `https://` so it can never resolve as a
///   same-origin relative path
pub fn normalize_external_url(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    let lower = s.to_ascii_lowercase();
    if BLOCKED_SCHEMES.iter().any(|scheme| lower.starts_with(scheme)) {
        return None;
    }

    if s.starts_with("//") {
        return Some(format!("https:{s}"));
    }

    if ["http://", "https://", "mailto:", "tel:"]
        .iter()
        .any(|prefix| lower.starts_with(prefix))
    {
        return Some(s.to_string());
    }

    Some(format!("https://{s}"))
}

fn host_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed.host_str().map(|h| h.to_ascii_lowercase())
}

fn host_matches(host: &str, domain: &str) -> bool {
    host == domain || host.ends_with(&format!(".{domain}"))
}

/// Video hosts whose links can be shown as an embedded player.
const VIDEO_HOSTS: [&str; 4] = ["youtube.com", "youtu.be", "youtube-nocookie.com", "vimeo.com"];

/// Whether `url` points at a recognized video host.
pub fn is_video_host(url: &str) -> bool {
    host_of(url).is_some_and(|host| VIDEO_HOSTS.iter().any(|d| host_matches(&host, d)))
}

/// Whether `url` points at a recognized map host.
pub fn is_map_host(url: &str) -> bool {
    let Some(parsed) = Url::parse(url).ok() else {
        return false;
    };
    let Some(host) = parsed.host_str().map(|h| h.to_ascii_lowercase()) else {
        return false;
    };
    if host_matches(&host, "map.naver.com") || host_matches(&host, "map.kakao.com") {
        return true;
    }
    if host_matches(&host, "maps.google.com") {
        return true;
    }
    (host == "google.com" || host == "www.google.com") && parsed.path().starts_with("/maps")
}

/// Whether `url` is allow-listed for framing (video or map hosts).
pub fn is_frameable(url: &str) -> bool {
    is_video_host(url) || is_map_host(url)
}

/// Rewrites a video-host page link to its player URL.
///
/// Unrecognized shapes are returned as-is; an embed URL stays an embed URL.
pub fn video_embed_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return url.to_string();
    };
    let Some(host) = parsed.host_str().map(|h| h.to_ascii_lowercase()) else {
        return url.to_string();
    };
    let segments: Vec<&str> = parsed
        .path_segments()
        .map(|s| s.filter(|seg| !seg.is_empty()).collect())
        .unwrap_or_default();

    fn youtube(id: &str) -> String {
        format!("https://www.youtube.com/embed/{id}")
    }

    if host_matches(&host, "youtu.be") {
        if let Some(id) = segments.first() {
            return youtube(id);
        }
    } else if host_matches(&host, "youtube.com") {
        match segments.as_slice() {
            ["watch"] => {
                if let Some((_, id)) = parsed.query_pairs().find(|(k, _)| k == "v") {
                    return youtube(&id);
                }
            }
            ["shorts", id] | ["live", id] => return youtube(id),
            _ => {}
        }
    } else if host == "vimeo.com" || host == "www.vimeo.com" {
        if let [id] = segments.as_slice()
            && id.bytes().all(|b| b.is_ascii_digit())
        {
            return format!("https://player.vimeo.com/video/{id}");
        }
    }

    url.to_string()
}
