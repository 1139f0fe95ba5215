#[cfg(test)]
mod tests {
    use crate::screenshot::*;
    use image::{Rgba, RgbaImage};
    use pretty_assertions::assert_eq;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

    fn is_safe(c: char) -> bool {
        c.is_ascii_alphanumeric() || c == '_' || c == '-'
    }

    #[test]
    fn sanitize_replaces_everything_outside_the_safe_set() {
        assert_eq!(sanitize_scenario_name("Login é ! test"), "Login_____test");
        assert_eq!(
            sanitize_scenario_name("Login with valid credentials"),
            "Login_with_valid_credentials"
        );
        assert_eq!(sanitize_scenario_name("already_safe-123"), "already_safe-123");
        assert_eq!(sanitize_scenario_name(""), "");
    }

    #[test]
    fn artifact_names_use_only_safe_characters() {
        let path = artifact_path("Connexion échouée !", false);
        let file_name = path.file_name().unwrap().to_str().unwrap();

        assert!(file_name.ends_with(".png"));
        let stem = file_name.strip_suffix(".png").unwrap();
        assert!(
            stem.chars().all(is_safe),
            "unsafe character in {}",
            file_name
        );
        assert!(path.starts_with(SCREENSHOT_DIR));
    }

    #[test]
    fn annotated_artifacts_carry_the_suffix_before_the_timestamp() {
        let path = artifact_path("Login failed", true);
        let file_name = path.file_name().unwrap().to_str().unwrap();

        assert!(file_name.starts_with("Login_failed_ANNOTATED_"));
        assert!(file_name.ends_with(".png"));
    }

    #[test]
    fn persist_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");

        assert!(persist(&path, b"first").is_some());
        // Same path again: refused, not replaced
        assert!(persist(&path, b"second").is_none());
        assert_eq!(std::fs::read(&path).unwrap(), b"first");
    }

    #[test]
    fn persist_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("shot.png");

        let written = persist(&path, b"bytes").unwrap();
        assert_eq!(std::fs::read(written).unwrap(), b"bytes");
    }

    #[test]
    fn outline_is_drawn_at_the_box_edges() {
        let mut img = RgbaImage::from_pixel(100, 80, BLACK);
        draw_outline(&mut img, 10, 10, 40, 30);

        // Corners of the box are painted
        assert_eq!(img.get_pixel(10, 10), &RED);
        assert_eq!(img.get_pixel(49, 10), &RED);
        assert_eq!(img.get_pixel(10, 39), &RED);
        assert_eq!(img.get_pixel(49, 39), &RED);

        // Interior and exterior stay untouched
        assert_eq!(img.get_pixel(30, 25), &BLACK);
        assert_eq!(img.get_pixel(5, 5), &BLACK);
        assert_eq!(img.get_pixel(60, 50), &BLACK);
    }

    #[test]
    fn outline_is_clamped_to_the_image() {
        let mut img = RgbaImage::from_pixel(50, 50, BLACK);
        // Box hangs off every edge; must not panic
        draw_outline(&mut img, -10, -10, 200, 200);
        assert_eq!(img.get_pixel(0, 0), &RED);
    }
}
