use url::Url;

use super::types::BlockType;

/// MIME sent when a file has no usable type.
pub const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// Block type an uploaded file becomes, by MIME prefix.
pub fn infer_block_type(mime: &str) -> BlockType {
    if mime.starts_with("image/") {
        BlockType::Image
    } else if mime.starts_with("video/") {
        BlockType::Video
    } else {
        BlockType::File
    }
}

/// The percent-decoded last path segment of an absolute URL.
///
/// Falls back to `"file"` when the URL does not parse or has no segment.
pub fn file_label(file_url: &str) -> String {
    const FALLBACK: &str = "file";
    let Ok(parsed) = Url::parse(file_url) else {
        return FALLBACK.to_string();
    };
    let last = parsed
        .path_segments()
        .and_then(|mut segments| segments.next_back())
        .filter(|s| !s.is_empty());
    match last {
        Some(segment) => urlencoding::decode(segment)
            .map(|s| s.into_owned())
            .unwrap_or_else(|_| segment.to_string()),
        None => FALLBACK.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("image/png", BlockType::Image)]
    #[case("video/mp4", BlockType::Video)]
    #[case("application/pdf", BlockType::File)]
    #[case("", BlockType::File)]
    fn mime_prefixes(#[case] mime: &str, #[case] expected: BlockType) {
        assert_eq!(infer_block_type(mime), expected);
    }

    #[rstest]
    #[case("https://cdn.example.com/posts/1/%EB%AA%A8%EC%A7%91.pdf", "모집.pdf")]
    #[case("https://cdn.example.com/a/b.txt?x=1", "b.txt")]
    #[case("https://cdn.example.com/", "file")]
    #[case("not a url", "file")]
    fn labels(#[case] url: &str, #[case] expected: &str) {
        assert_eq!(file_label(url), expected);
    }
}
