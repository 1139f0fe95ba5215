use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Local;
use image::{ImageFormat, Rgba, RgbaImage};
use tracing::{error, info};

use crate::session::Session;
use crate::wait::Target;

/// Where failure screenshots accumulate. No rotation policy.
pub const SCREENSHOT_DIR: &str = "target/screenshots";

const OUTLINE_COLOR: Rgba<u8> = Rgba([255, 0, 0, 255]);
const OUTLINE_WIDTH: i64 = 5;

/// Persist a viewport snapshot of the session under a timestamped name.
///
/// Fails soft: capture or persistence errors are logged with their cause and
/// reported as "no artifact". A missing screenshot must never mask the test
/// failure that triggered it.
pub async fn capture(session: &Session, scenario_name: &str) -> Option<PathBuf> {
    let bytes = match session.client().screenshot().await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Session {} cannot produce a screenshot: {}", session.id(), e);
            return None;
        }
    };
    persist(&artifact_path(scenario_name, false), &bytes)
}

/// Like [`capture`], with a red outline drawn around the target element's
/// on-screen bounding box, resolved at capture time. Same soft-fail policy
/// for geometry, decoding, and drawing failures.
pub async fn capture_annotated(
    session: &Session,
    target: &Target,
    scenario_name: &str,
) -> Option<PathBuf> {
    let element = match session.client().find(target.as_locator()).await {
        Ok(element) => element,
        Err(e) => {
            error!("Cannot annotate {}: element not found: {}", target, e);
            return None;
        }
    };
    let (x, y, width, height) = match element.rectangle().await {
        Ok(rect) => rect,
        Err(e) => {
            error!("Could not resolve bounding box for {}: {}", target, e);
            return None;
        }
    };

    let bytes = match session.client().screenshot().await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("Session {} cannot produce a screenshot: {}", session.id(), e);
            return None;
        }
    };
    let mut img = match image::load_from_memory(&bytes) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            error!("Could not decode screenshot: {}", e);
            return None;
        }
    };

    draw_outline(
        &mut img,
        x.round() as i64,
        y.round() as i64,
        width.round() as i64,
        height.round() as i64,
    );

    let mut encoded = Vec::new();
    if let Err(e) = image::DynamicImage::ImageRgba8(img)
        .write_to(&mut std::io::Cursor::new(&mut encoded), ImageFormat::Png)
    {
        error!("Could not encode annotated screenshot: {}", e);
        return None;
    }
    persist(&artifact_path(scenario_name, true), &encoded)
}

/// Replace every character outside `[A-Za-z0-9_-]` with `_` so scenario
/// display names become filesystem-safe.
pub fn sanitize_scenario_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub(crate) fn artifact_path(scenario_name: &str, annotated: bool) -> PathBuf {
    let timestamp = Local::now().format("%Y%m%d_%H%M%S");
    let clean = sanitize_scenario_name(scenario_name);
    let file_name = if annotated {
        format!("{}_ANNOTATED_{}.png", clean, timestamp)
    } else {
        format!("{}_{}.png", clean, timestamp)
    };
    Path::new(SCREENSHOT_DIR).join(file_name)
}

pub(crate) fn persist(path: &Path, bytes: &[u8]) -> Option<PathBuf> {
    if let Some(parent) = path.parent() {
        if let Err(e) = fs::create_dir_all(parent) {
            error!("Could not create {}: {}", parent.display(), e);
            return None;
        }
    }
    // Refuse to overwrite: a second-resolution name collision is a loud
    // failure, not a silent replacement.
    let mut file = match fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
    {
        Ok(file) => file,
        Err(e) => {
            error!("Could not create artifact {}: {}", path.display(), e);
            return None;
        }
    };
    if let Err(e) = file.write_all(bytes) {
        error!("Could not write artifact {}: {}", path.display(), e);
        return None;
    }
    let absolute = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
    info!("Screenshot saved to {}", absolute.display());
    Some(absolute)
}

pub(crate) fn draw_outline(img: &mut RgbaImage, x: i64, y: i64, width: i64, height: i64) {
    let bands = [
        (x, y, width, OUTLINE_WIDTH),                        // top
        (x, y + height - OUTLINE_WIDTH, width, OUTLINE_WIDTH), // bottom
        (x, y, OUTLINE_WIDTH, height),                       // left
        (x + width - OUTLINE_WIDTH, y, OUTLINE_WIDTH, height), // right
    ];
    for (bx, by, bw, bh) in bands {
        fill_band(img, bx, by, bw, bh);
    }
}

fn fill_band(img: &mut RgbaImage, x: i64, y: i64, width: i64, height: i64) {
    let (img_w, img_h) = img.dimensions();
    for py in y.max(0)..(y + height).min(img_h as i64) {
        for px in x.max(0)..(x + width).min(img_w as i64) {
            img.put_pixel(px as u32, py as u32, OUTLINE_COLOR);
        }
    }
}

#[cfg(test)]
#[path = "screenshot_test.rs"]
mod screenshot_test;
