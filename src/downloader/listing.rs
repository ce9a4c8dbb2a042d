// Format listing - plain-text table of a source's format catalog

use super::models::{FormatDescriptor, MediaInfo};

const HEADERS: [&str; 9] = [
    "ID", "EXT", "RESOLUTION", "FPS", "FILESIZE", "TBR", "VCODEC", "ACODEC", "MORE INFO",
];

/// Column index after which a group separator is drawn
const GROUP_ENDS: [usize; 2] = [3, 5];

/// Render all formats of `info` in catalog order (worst to best)
pub fn render_table(info: &MediaInfo) -> String {
    let rows: Vec<[String; 9]> = info.formats.iter().map(row_cells).collect();

    let mut widths = HEADERS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = format!("[info] Available formats for {}:\n", info.id);
    let header: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    out.push_str(&render_line(&header, &widths));

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&render_line(&rule, &widths));

    for row in &rows {
        out.push_str(&render_line(row, &widths));
    }
    out
}

fn render_line(cells: &[String], widths: &[usize; 9]) -> String {
    let mut line = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            line.push(' ');
        }
        line.push_str(&format!("{:<width$}", cell, width = widths[i]));
        if GROUP_ENDS.contains(&i) {
            line.push_str(" |");
        }
    }
    let mut line = line.trim_end().to_string();
    line.push('\n');
    line
}

fn row_cells(f: &FormatDescriptor) -> [String; 9] {
    let resolution = match &f.resolution {
        Some(r) => r.clone(),
        None if f.is_audio_only() => "audio only".to_string(),
        None => String::new(),
    };

    let vcodec = if f.is_audio_only() {
        "audio only".to_string()
    } else {
        f.video_codec.clone()
    };
    let acodec = if f.is_video_only() {
        "video only".to_string()
    } else {
        f.audio_codec.clone()
    };

    [
        f.id.clone(),
        f.extension.clone(),
        resolution,
        f.fps.map(format_fps).unwrap_or_default(),
        f.effective_size()
            .map(|(bytes, approx)| format_size(bytes, approx))
            .unwrap_or_default(),
        f.tbr.map(|t| format!("{:.0}k", t)).unwrap_or_default(),
        vcodec,
        acodec,
        f.format_note.clone().unwrap_or_default(),
    ]
}

fn format_fps(fps: f64) -> String {
    if fps.fract() == 0.0 {
        format!("{:.0}", fps)
    } else {
        format!("{}", fps)
    }
}

/// Format file size for display (binary units, `~` for estimates)
fn format_size(bytes: u64, approx: bool) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];

    let prefix = if approx { "~" } else { "" };
    if bytes < 1024 {
        return format!("{}{}B", prefix, bytes);
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{}{:.2}{}", prefix, value, UNITS[unit])
}
