// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CLI tool: measure a wall from a photo, its label map and a category table
//!
//! Prints the measurement as JSON on stdout. Exit status is 0 on success,
//! 2 when the photo cannot be measured and 1 on usage or I/O errors.
//!
//! Usage:
//!   wall-measure <image> <label-map.png> <categories.json> [--debug] [--out-dir DIR]

use image::{DynamicImage, ImageReader};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use wallscale_measure::image_ops::encode_png;
use wallscale_measure::{
    label_map_from_luma16, label_map_from_luma8, measure_with_config, CategoryTable, DebugImages, LabelMap,
    MeasureConfig,
};

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 4 || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        process::exit(if args.len() > 1 && (args[1] == "--help" || args[1] == "-h") { 0 } else { 1 });
    }

    let image_path = &args[1];
    let labels_path = &args[2];
    let categories_path = &args[3];

    let mut debug_mode = false;
    let mut out_dir: Option<PathBuf> = None;

    let mut i = 4;
    while i < args.len() {
        match args[i].as_str() {
            "--debug" => {
                debug_mode = true;
            }
            "--out-dir" => {
                i += 1;
                let Some(dir) = args.get(i) else {
                    fail_usage("--out-dir needs a directory");
                };
                out_dir = Some(PathBuf::from(dir));
                debug_mode = true;
            }
            other => fail_usage(&format!("Unknown option: {}", other)),
        }
        i += 1;
    }

    eprintln!("[1/3] Loading inputs");
    let photo = open_image(image_path).to_rgb8();
    let label_map = load_label_map(labels_path);
    let categories = load_categories(categories_path);
    eprintln!(
        "  Image {}x{}, {} categories",
        photo.width(),
        photo.height(),
        categories.len()
    );

    eprintln!("[2/3] Measuring");
    let config = MeasureConfig::default();
    let result = match measure_with_config(&photo, &label_map, &categories, &config, debug_mode) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("  {}", e.user_message());
            println!("{}", serde_json::json!({ "error": e.to_failure() }));
            process::exit(if e.is_user_actionable() { 2 } else { 1 });
        }
    };

    eprintln!("[3/3] Writing output");
    if let (Some(dir), Some(images)) = (
        out_dir.as_deref(),
        result.debug.as_ref().and_then(|d| d.images.as_ref()),
    ) {
        if let Err(e) = write_debug_images(dir, images) {
            eprintln!("Error: Cannot write debug images to '{}': {}", dir.display(), e);
            process::exit(1);
        }
        eprintln!("  Debug images written to {}", dir.display());
    }

    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error: Cannot serialize result: {}", e);
            process::exit(1);
        }
    }
}

fn open_image(path: &str) -> DynamicImage {
    ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .unwrap_or_else(|e| {
            eprintln!("Error: Cannot open image '{}': {}", path, e);
            process::exit(1);
        })
        .decode()
        .unwrap_or_else(|e| {
            eprintln!("Error: Cannot decode image '{}': {}", path, e);
            process::exit(1);
        })
}

fn load_label_map(path: &str) -> LabelMap {
    match open_image(path) {
        DynamicImage::ImageLuma8(gray) => label_map_from_luma8(&gray),
        DynamicImage::ImageLuma16(gray) => label_map_from_luma16(&gray),
        other => {
            eprintln!(
                "Error: Label map '{}' must be a single-channel 8 or 16-bit image, got {:?}",
                path,
                other.color()
            );
            process::exit(1);
        }
    }
}

fn load_categories(path: &str) -> CategoryTable {
    let text = fs::read_to_string(path).unwrap_or_else(|e| {
        eprintln!("Error: Cannot read categories '{}': {}", path, e);
        process::exit(1);
    });
    CategoryTable::from_json(&text).unwrap_or_else(|e| {
        eprintln!("Error: Invalid categories JSON '{}': {}", path, e);
        process::exit(1);
    })
}

fn write_debug_images(dir: &Path, images: &DebugImages) -> Result<(), Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)?;
    let files = [
        ("mask_wall.png", encode_png(images.wall_mask.clone())?),
        ("mask_window.png", encode_png(images.window_mask.clone())?),
        ("mask_attached.png", encode_png(images.attached_mask.clone())?),
        ("mask_combined.png", encode_png(images.combined_mask.clone())?),
        ("a4_overlay.png", encode_png(images.overlay.clone())?),
    ];
    for (name, bytes) in files {
        fs::write(dir.join(name), bytes)?;
    }
    Ok(())
}

fn fail_usage(message: &str) -> ! {
    eprintln!("{}", message);
    print_usage();
    process::exit(1);
}

fn print_usage() {
    eprintln!("Usage: wall-measure <image> <label-map.png> <categories.json> [options]");
    eprintln!();
    eprintln!("Measures a wall using an A4 sheet visible on it as the scale reference.");
    eprintln!();
    eprintln!("Arguments:");
    eprintln!("  <image>             Photo of the wall (PNG or JPEG)");
    eprintln!("  <label-map.png>     Per-pixel category indices, same size as the photo");
    eprintln!("  <categories.json>   Object mapping label index to category name");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --debug             Include sheet corners, wall bounds and scale in the output");
    eprintln!("  --out-dir <DIR>     Also write mask and overlay PNGs to DIR (implies --debug)");
    eprintln!("  -h, --help          Show this help");
}
