//! Offline rendering of a saved scene

use anyhow::{Context, Result};
use easel_canvas::Scene;
use serde::Deserialize;
use std::path::Path;
use tracing::info;

/// Either a full `/api/canvas/state` response or the bare scene
#[derive(Deserialize)]
#[serde(untagged)]
enum SceneFile {
    Wrapped { canvas: Scene },
    Bare(Scene),
}

impl SceneFile {
    fn into_scene(self) -> Scene {
        match self {
            Self::Wrapped { canvas } => canvas,
            Self::Bare(scene) => scene,
        }
    }
}

/// Output format chosen from the file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Format {
    Png,
    Pdf,
}

impl Format {
    fn for_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("png") => Self::Png,
            _ => Self::Pdf,
        }
    }
}

fn parse_scene(json: &str) -> Result<Scene> {
    let file: SceneFile = serde_json::from_str(json).context("Invalid scene JSON")?;
    let scene = file.into_scene();
    // Re-check dimensions and every element as the store would
    Scene::new(i64::from(scene.width), i64::from(scene.height))?;
    for element in &scene.elements {
        element
            .shape
            .validate()
            .with_context(|| format!("Element {} is invalid", element.id))?;
    }
    Ok(scene)
}

/// Render `scene_path` into `output`
pub async fn run(scene_path: &Path, output: &Path) -> Result<()> {
    let json = tokio::fs::read_to_string(scene_path)
        .await
        .with_context(|| format!("Failed to read {}", scene_path.display()))?;
    let scene = parse_scene(&json)?;

    let config = crate::server::load_config().context("Failed to load configuration")?;
    let pipeline = crate::server::build_pipeline(&config)?;

    let format = Format::for_path(output);
    let bytes = match format {
        Format::Png => pipeline.render_png(&scene).await?,
        Format::Pdf => pipeline.export_pdf(&scene).await?,
    };

    tokio::fs::write(output, &bytes)
        .await
        .with_context(|| format!("Failed to write {}", output.display()))?;

    info!(
        "Rendered {} element(s) at {}x{} to {} ({:?}, {} bytes)",
        scene.element_count(),
        scene.width,
        scene.height,
        output.display(),
        format,
        bytes.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(Format::for_path(Path::new("out.PNG")), Format::Png);
        assert_eq!(Format::for_path(Path::new("out.pdf")), Format::Pdf);
        assert_eq!(Format::for_path(Path::new("out")), Format::Pdf);
    }

    #[test]
    fn test_accepts_state_response_and_bare_scene() {
        let wrapped = r##"{"success":true,"canvas":{"width":50,"height":40,"elements":[
            {"type":"circle","id":1,"x":0,"y":0,"radius":10,
             "fillColor":"#ff0000","strokeColor":"#000000","strokeWidth":1}]}}"##;
        let scene = parse_scene(wrapped).unwrap();
        assert_eq!((scene.width, scene.height), (50, 40));
        assert_eq!(scene.element_count(), 1);

        let bare = r#"{"width":10,"height":10}"#;
        assert_eq!(parse_scene(bare).unwrap().element_count(), 0);
    }

    #[test]
    fn test_rejects_invalid_elements() {
        let json = r##"{"width":10,"height":10,"elements":[
            {"type":"text","id":1,"x":0,"y":0,"text":"","fontSize":12,
             "fontFamily":"Arial","color":"#000000"}]}"##;
        assert!(parse_scene(json).is_err());

        assert!(parse_scene(r#"{"width":0,"height":10}"#).is_err());
    }
}
