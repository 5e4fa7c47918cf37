//! User facing texts.

/// Reply to a message without a usable link (MarkdownV2).
pub(super) const INVALID_LINK_MD2: &str = "Please provide a valid video link\\.\n\
\n\
Examples:\n\
\\- `https://www\\.youtube\\.com/watch?v=dQw4w9WgXcQ`\n\
\\- `youtu\\.be/dQw4w9WgXcQ`\n\
\n\
You can also share a link to an Instagram reel, TikTok video, or any other video you'd like to download\\. \
Hundreds of sites are supported, so feel free to give it a try\\!";

pub(super) const DOWNLOAD_FAILED: &str = "❌ Failed to download video";

pub(super) const FILE_UNAVAILABLE: &str = "❌ Downloaded video file not available";

pub(super) const UPLOAD_FAILED: &str = "❌ Failed to upload video to file hosting";

pub(super) const TEST_REPLY: &str = "Just send me a video URL or forward a message containing a link, \
and I'll download it - that would be the perfect test!";

pub(super) fn greeting(first_name: &str) -> String {
    format!(
        "Hello {first_name}! I can help you download videos from hundreds of websites.\n\
         \n\
         Please send or forward me a video URL, and I'll do my best to download it for you!"
    )
}

pub(super) fn inline_failed(size_mb: f64, reason: &str) -> String {
    format!("❌ Failed to send video ({size_mb:.2} MB): {reason}")
}
