//! Command-line front end
//!
//!   layering -o out.png a.jpg b.png
//!   layering -o out.png --width 800 --height 600 --crop 100,100,400,300 photo.jpg
//!   layering -o out.png --erase 400,300 --erase 420,300 --opacity 0.5 a.png b.png

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use layering_config::{DisplayConfig, EditorConfig, DEFAULT_HEIGHT, DEFAULT_WIDTH};
use layering_io::{decode_file, export_png, import_layer, CropProvider, FixedCrop, FullFrame};
use painting::{Editor, PixelRect, PointerEvent, PointerKind, Tool, Vec2};
use tracing::{info, warn};

/// Composite images as layers and export the flattened result.
#[derive(Parser, Debug)]
#[command(name = "layering", version, about = "Headless layer compositor")]
pub struct CliArgs {
    /// Images to import, bottom layer first
    #[arg(required = true, num_args = 1..)]
    pub inputs: Vec<PathBuf>,

    /// PNG file to write
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Viewport width in logical pixels
    #[arg(long, default_value_t = DEFAULT_WIDTH)]
    pub width: u32,

    /// Viewport height in logical pixels
    #[arg(long, default_value_t = DEFAULT_HEIGHT)]
    pub height: u32,

    /// Device pixel ratio of the export
    #[arg(long, default_value_t = 1.0)]
    pub scale: f32,

    /// Export crop in physical pixels: x,y,w,h
    #[arg(long, value_name = "X,Y,W,H", value_parser = parse_rect)]
    pub crop: Option<PixelRect>,

    /// Crop applied to every imported image, in source pixels: x,y,w,h
    #[arg(long, value_name = "X,Y,W,H", value_parser = parse_rect)]
    pub import_crop: Option<PixelRect>,

    /// Erase one brush dab on the top layer at a viewport point (repeatable)
    #[arg(long, value_name = "X,Y", value_parser = parse_point)]
    pub erase: Vec<Vec2>,

    /// Opacity of the top layer, 0-1
    #[arg(long)]
    pub opacity: Option<f32>,

    /// Mirror the top layer left-right
    #[arg(long)]
    pub flip_horizontal: bool,

    /// Editor config JSON. Defaults to $LAYERING_CONFIG, then built-ins.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Verbose logging (honours LAYERING_LOG)
    #[arg(short, long)]
    pub debug: bool,
}

fn parse_numbers<const N: usize, T: std::str::FromStr>(s: &str) -> Result<[T; N], String> {
    let parts: Vec<T> = s
        .split(',')
        .map(|p| p.trim().parse::<T>())
        .collect::<Result<_, _>>()
        .map_err(|_| format!("'{s}' is not a list of {N} numbers"))?;
    parts
        .try_into()
        .map_err(|_| format!("expected {N} comma-separated numbers, got '{s}'"))
}

pub fn parse_rect(s: &str) -> Result<PixelRect, String> {
    let [x, y, w, h] = parse_numbers::<4, u32>(s)?;
    if w == 0 || h == 0 {
        return Err(format!("crop '{s}' has zero size"));
    }
    Ok(PixelRect::new(x, y, w, h))
}

pub fn parse_point(s: &str) -> Result<Vec2, String> {
    let [x, y] = parse_numbers::<2, f32>(s)?;
    Ok(Vec2::new(x, y))
}

fn load_config(args: &CliArgs) -> Result<EditorConfig> {
    match &args.config {
        Some(path) => EditorConfig::load(path)
            .with_context(|| format!("could not load config '{}'", path.display())),
        None => Ok(EditorConfig::from_env()),
    }
}

pub fn run(args: CliArgs) -> Result<()> {
    let config = load_config(&args)?;
    let mut display = DisplayConfig::new(args.width, args.height);
    display.scale = args.scale;
    let mut editor = Editor::new(config, display);

    let mut crop: Box<dyn CropProvider> = match args.import_crop {
        Some(rect) => Box::new(FixedCrop(rect)),
        None => Box::new(FullFrame),
    };

    // A bad input is reported and skipped; the rest still composite
    for path in &args.inputs {
        let imported = decode_file(path).and_then(|img| import_layer(&mut editor, img, &mut *crop));
        if let Err(e) = imported {
            warn!("Skipping '{}': {e}", path.display());
        }
    }
    if editor.stack().is_empty() {
        bail!("none of the {} input(s) could be imported", args.inputs.len());
    }

    apply_edits(&mut editor, &args);

    export_png(&mut editor, args.crop, &args.output)
        .with_context(|| format!("could not export '{}'", args.output.display()))?;
    info!(
        "Exported {} layer(s), {} undoable edit(s)",
        editor.stack().len(),
        editor.history().undo_len()
    );
    Ok(())
}

/// Edits are applied to the top layer, which is active after import
fn apply_edits(editor: &mut Editor, args: &CliArgs) {
    if let Some(opacity) = args.opacity {
        editor.set_active_opacity(opacity);
        editor.commit_opacity_edit();
    }
    if args.flip_horizontal {
        editor.flip_active_horizontal();
    }
    if !args.erase.is_empty() {
        editor.set_tool(Tool::Erase);
        for (i, &pos) in args.erase.iter().enumerate() {
            let id = i as u64;
            editor.handle_pointer(PointerEvent::Down { id, pos, kind: PointerKind::Mouse });
            editor.handle_pointer(PointerEvent::Up { id });
        }
        editor.set_tool(Tool::Move);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rect() {
        assert_eq!(parse_rect("1, 2,30,40"), Ok(PixelRect::new(1, 2, 30, 40)));
        assert!(parse_rect("1,2,3").is_err());
        assert!(parse_rect("1,2,0,4").is_err());
        assert!(parse_rect("a,b,c,d").is_err());
    }

    #[test]
    fn test_parse_point() {
        assert_eq!(parse_point("10.5,-3"), Ok(Vec2::new(10.5, -3.0)));
        assert!(parse_point("10").is_err());
    }

    #[test]
    fn test_args() {
        let args = CliArgs::try_parse_from([
            "layering", "-o", "out.png", "--erase", "5,5", "--erase", "6,5", "--crop", "0,0,10,10", "a.png", "b.png",
        ])
        .unwrap();
        assert_eq!(args.inputs.len(), 2);
        assert_eq!(args.erase.len(), 2);
        assert_eq!(args.crop, Some(PixelRect::new(0, 0, 10, 10)));
        assert_eq!(args.width, DEFAULT_WIDTH);
    }

    #[test]
    fn test_args_require_output() {
        assert!(CliArgs::try_parse_from(["layering", "a.png"]).is_err());
    }

    #[test]
    fn test_run_with_no_readable_input_fails() {
        let args = CliArgs::try_parse_from(["layering", "-o", "out.png", "/nonexistent/x.png"]).unwrap();
        assert!(run(args).is_err());
    }
}
