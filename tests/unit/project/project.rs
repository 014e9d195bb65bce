use super::*;
use crate::layers::model::LayerId;

const DOC: &str = r##"{
    "name": "walk",
    "engine": { "canvas": { "width": 320, "height": 240 }, "zoom_percent": 120 },
    "image": "photo.png",
    "detections": [
        { "label": "dog", "confidence": 0.9, "bbox": [10, 20, 100, 80] },
        { "class": "cat", "confidence": 0.3, "bbox": [0, 0, 5, 5] }
    ],
    "layers": [
        {
            "id": "caption",
            "content": { "type": "text", "content": "hello" },
            "x": 160, "y": 220, "width": 200, "height": 20
        }
    ],
    "settings": {
        "dog-0": {
            "rotate": { "enabled": true, "speed": 1.5 },
            "bounce": { "enabled": true },
            "fade": { "enabled": false }
        }
    }
}"##;

#[test]
fn parses_and_builds_store() {
    let p = Project::from_json_str(DOC).unwrap();
    assert_eq!(p.name, "walk");
    assert_eq!(p.engine.canvas.width, 320);
    assert_eq!(p.engine.zoom_percent, 120);
    assert_eq!(p.engine.max_tick_secs, 0.25);
    assert_eq!(p.min_confidence, 0.5);

    let store = p.build_store().unwrap();
    let ids: Vec<&str> = store.ids().map(LayerId::as_str).collect();
    assert_eq!(ids, ["dog-0", "caption"]);
}

#[test]
fn export_request_labels_enabled_effects() {
    let p = Project::from_json_str(DOC).unwrap();
    let req = p.export_request().unwrap();
    assert_eq!(req.image_path, "photo.png");
    assert_eq!(req.animation_type, "bounce+rotate");
    assert_eq!(req.objects.len(), 2);
}

#[test]
fn detections_without_image_are_rejected() {
    let p = Project::from_json_str(
        r#"{ "detections": [{ "label": "x", "confidence": 1, "bbox": [0, 0, 1, 1] }] }"#,
    )
    .unwrap();
    assert!(p.build_store().is_err());
    assert!(p.export_request().is_err());
}

#[test]
fn malformed_json_is_a_serde_error() {
    assert!(matches!(
        Project::from_json_str("{ nope"),
        Err(MotionError::Serde(_))
    ));
}

#[test]
fn from_path_resolves_assets_root_next_to_file() {
    let dir = std::env::temp_dir().join(format!("layermotion-project-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let file = dir.join("project.json");
    std::fs::write(&file, DOC).unwrap();

    let p = Project::from_path(&file).unwrap();
    assert_eq!(p.engine.assets_root, dir.join("."));
    assert!(Project::from_path(dir.join("missing.json")).is_err());
    std::fs::remove_dir_all(&dir).unwrap();
}
