use std::fs;
use std::path::{Path, PathBuf};

use time::{OffsetDateTime, macros::format_description};

fn main() {
    let icon_dir = Path::new("icons");
    let out_dir = PathBuf::from(std::env::var("OUT_DIR").unwrap());
    let out_path = out_dir.join("icons.rs");

    let icons = [("BATTERY", icon_dir.join("battery.svg"), 32, 16)];

    for (_, path, _, _) in &icons {
        println!("cargo:rerun-if-changed={}", path.display());
    }

    let mut output = String::new();

    for (name, path, width, height) in icons {
        let mask = render_svg_mask(&path, width, height);
        output.push_str(&format!("pub const ICON_{}_WIDTH: u32 = {};\n", name, width));
        output.push_str(&format!("pub const ICON_{}_HEIGHT: u32 = {};\n", name, height));
        output.push_str(&format!("pub const ICON_{}_MASK: &[u8] = &[\n", name));
        for chunk in mask.chunks(16) {
            output.push_str("    ");
            for byte in chunk {
                output.push_str(&format!("0x{:02X}, ", byte));
            }
            output.push('\n');
        }
        output.push_str("];\n\n");
    }

    fs::write(&out_path, output).unwrap();

    let format = format_description!("[year]-[month]-[day] [hour]:[minute] UTC");
    let build_time = OffsetDateTime::now_utc().format(&format).unwrap();
    let build_path = out_dir.join("build_info.rs");
    fs::write(
        &build_path,
        format!("pub const BUILD_TIME: &str = \"{}\";\n", build_time),
    )
    .unwrap();
}

fn render_svg_mask(path: &Path, width: u32, height: u32) -> Vec<u8> {
    let data = fs::read(path).unwrap();
    let options = usvg::Options::default();
    // Icons carry no text, so an empty font database is enough.
    let fontdb = usvg::fontdb::Database::new();
    let tree = usvg::Tree::from_data(&data, &options, &fontdb).unwrap();
    let mut pixmap = tiny_skia::Pixmap::new(width, height).unwrap();
    let mut pixmap_mut = pixmap.as_mut();
    let size = tree.size();
    let transform = tiny_skia::Transform::from_scale(
        width as f32 / size.width(),
        height as f32 / size.height(),
    );
    resvg::render(&tree, transform, &mut pixmap_mut);

    let mut mask = vec![0u8; ((width * height) as usize).div_ceil(8)];
    for y in 0..height {
        for x in 0..width {
            let idx = (y * width + x) as usize;
            let byte = idx / 8;
            let bit = 7 - (idx % 8);
            let px = pixmap.pixel(x, y).unwrap();
            if px.alpha() > 127 {
                mask[byte] |= 1 << bit;
            }
        }
    }
    mask
}
