use crate::discovery::models::Reference;
use crate::models::models::PageModel;
use crate::playback::plan::PlaybackPlan;

const PLAYER_SCRIPT: &str = include_str!("player.js");

const STYLE: &str = r#"
  body{margin:0;font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,Arial;background:linear-gradient(180deg,#fff7f0,#fff);display:flex;align-items:center;justify-content:center;min-height:100vh;padding:10px}
  .card{width:96vw;max-width:540px;background:#fff;border-radius:14px;box-shadow:0 10px 30px rgba(0,0,0,0.12);overflow:hidden}
  .media{position:relative;width:100%;height:0;padding-bottom:177.78%;background:#000}
  video,img{position:absolute;top:0;left:0;width:100%;height:100%;object-fit:cover}
  .placeholder{position:absolute;inset:0;display:flex;align-items:center;justify-content:center;color:#fff;font-size:64px}
  .content{padding:16px;text-align:center}
  h1{margin:8px 0;font-size:20px}
  p{margin:6px 0 14px;color:#333}
  .btn{display:inline-block;padding:12px 20px;border-radius:12px;background:#ff6b6b;color:#fff;text-decoration:none;font-weight:700}
  .hint{font-size:12px;color:#666;margin-top:10px}
  .overlay{position:absolute;top:50%;left:50%;transform:translate(-50%,-50%);z-index:6}
  .overlay button{background:rgba(0,0,0,0.55);color:#fff;border:0;padding:14px 18px;border-radius:999px;font-size:18px}
  .asset-list{font-size:12px;color:#666;margin-top:10px;text-align:left;padding:0 12px 12px}
  .asset-list code{display:block;background:#f6f6f6;padding:6px;border-radius:6px}
"#;

#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    pub show_asset_panel: bool,
}

/// Render the wish page. All interpolated text is escaped here.
pub fn render_page(
    model: &PageModel,
    plan: &PlaybackPlan,
    options: RenderOptions,
) -> serde_json::Result<String> {
    let plan_json = plan.to_embedded_json()?;
    let assets = &model.assets;

    let mut html = String::with_capacity(8 * 1024);
    html.push_str(&format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8"/>
<meta name="viewport" content="width=device-width,initial-scale=1">
<title>Happy Birthday, {name}</title>
<style>{STYLE}</style>
</head>
<body data-phase="init">
  <div class="card" role="main">
    <div class="media" id="mediaWrap">
      {media}
      <div class="overlay" id="overlay" style="display:none">
        <button id="overlayBtn">▶ Play Wish</button>
      </div>
    </div>

    <div class="content">
      <h1>{headline}</h1>
      <p id="msg">{message}</p>
"#,
        name = escape_html(&model.name_display),
        media = media_markup(model),
        headline = escape_html(&model.headline_text),
        message = escape_html(&model.message_text),
    ));

    if let Some(audio) = &assets.audio {
        html.push_str(&format!(
            "      <audio id=\"wishAudio\" preload=\"auto\" src=\"{}\"></audio>\n",
            escape_html(audio.as_str())
        ));
    }

    html.push_str(
        r##"
      <div id="controls">
        <a href="#" id="playBtn" class="btn">▶ Play Wish</a>
        <div class="hint">If audio doesn't start automatically, tap Play. Works inside in-app browsers too.</div>
      </div>
"##,
    );

    if options.show_asset_panel {
        html.push_str(&format!(
            r#"
      <div class="asset-list">
        <strong>Assets detected:</strong>
        <div>
          <code>video_url: {}</code>
          <code>audio_url: {}</code>
          <code>img_url: {}</code>
        </div>
      </div>
"#,
            panel_value(assets.video.as_ref()),
            panel_value(assets.audio.as_ref()),
            panel_value(assets.image.as_ref()),
        ));
    }

    html.push_str(&format!(
        r#"    </div>
  </div>

<script type="application/json" id="playbackPlan">{plan_json}</script>
<script>
{PLAYER_SCRIPT}</script>
</body>
</html>
"#
    ));

    Ok(html)
}

fn media_markup(model: &PageModel) -> String {
    let assets = &model.assets;
    if let Some(video) = &assets.video {
        format!(
            r#"<video id="wishMedia" loop playsinline muted preload="auto" src="{}"></video>"#,
            escape_html(video.as_str())
        )
    } else if let Some(image) = assets.display_image() {
        format!(
            r#"<img id="wishMedia" src="{}" alt="Happy Birthday">"#,
            escape_html(image.as_str())
        )
    } else {
        r#"<div class="placeholder" id="wishPlaceholder">🎉</div>"#.to_string()
    }
}

fn panel_value(reference: Option<&Reference>) -> String {
    reference
        .map(|r| escape_html(r.as_str()))
        .unwrap_or_else(|| "NONE".to_string())
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::models::AssetSet;
    use crate::models::models::{PageTemplates, WishRequest};
    use crate::service::composer::compose;

    const PANEL: RenderOptions = RenderOptions {
        show_asset_panel: true,
    };

    fn render(name: &str, assets: AssetSet, options: RenderOptions) -> String {
        let model = compose(&WishRequest::named(name), assets, &PageTemplates::default());
        let plan = PlaybackPlan::for_media(model.assets.presence());
        render_page(&model, &plan, options).unwrap()
    }

    fn media(name: &str) -> Option<Reference> {
        Some(Reference::new("/static/media", name))
    }

    #[test]
    fn test_video_takes_priority_over_image() {
        let html = render(
            "Ana",
            AssetSet {
                video: media("wish.mp4"),
                audio: None,
                image: media("cake.png"),
            },
            RenderOptions {
                show_asset_panel: false,
            },
        );
        assert!(html.contains(r#"<video id="wishMedia""#));
        assert!(html.contains(r#"src="/static/media/wish.mp4""#));
        assert!(!html.contains("<img"));
        assert!(!html.contains("cake.png"));
    }

    #[test]
    fn test_image_shown_without_video() {
        let html = render(
            "Ana",
            AssetSet {
                video: None,
                audio: None,
                image: media("cake.png"),
            },
            PANEL,
        );
        assert!(html.contains(r#"<img id="wishMedia" src="/static/media/cake.png""#));
        assert!(!html.contains("<video"));
    }

    #[test]
    fn test_placeholder_without_media_references() {
        let html = render("Ana", AssetSet::default(), PANEL);
        assert!(html.contains("wishPlaceholder"));
        assert!(!html.contains("<video"));
        assert!(!html.contains("<img"));
        assert!(!html.contains("<audio"));
        assert!(!html.contains("/static/"));
        assert!(html.contains("video_url: NONE"));
    }

    #[test]
    fn test_audio_element_only_when_present() {
        let html = render(
            "Ana",
            AssetSet {
                video: None,
                audio: Some(Reference::new("/static/audio", "song.mp3")),
                image: None,
            },
            PANEL,
        );
        assert!(html.contains(r#"<audio id="wishAudio" preload="auto" src="/static/audio/song.mp3">"#));
    }

    #[test]
    fn test_name_is_escaped() {
        let html = render("<script>alert(1)</script>", AssetSet::default(), PANEL);
        assert!(!html.contains("<script>alert(1)"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn test_asset_panel_can_be_hidden() {
        let html = render(
            "Ana",
            AssetSet::default(),
            RenderOptions {
                show_asset_panel: false,
            },
        );
        assert!(!html.contains("Assets detected"));
    }

    #[test]
    fn test_page_is_written_in_full() {
        let html = render(
            "Ana",
            AssetSet {
                video: media("wish.mp4"),
                audio: Some(Reference::new("/static/audio", "song.mp3")),
                image: None,
            },
            PANEL,
        );
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("src=\"/static/audio/song.mp3\"></audio>\n"));
        assert!(html.contains("Assets detected"));
        assert!(html.ends_with("</body>\n</html>\n"));
    }

    #[test]
    fn test_plan_and_player_are_embedded() {
        let html = render("Ana", AssetSet::default(), PANEL);
        assert!(html.contains(r#"<script type="application/json" id="playbackPlan">{"#));
        assert!(html.contains("dispatch('page_loaded')"));
    }
}
