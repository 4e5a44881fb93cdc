use console::Style;
use proppixapp::api::PhotoView;
use proppixapp::sync::SyncReport;

const PRIMARY_MARKER: &str = "★";

fn format_size(bytes: Option<u64>) -> String {
    match bytes {
        None => "-".to_string(),
        Some(b) if b < 1024 => format!("{} B", b),
        Some(b) if b < 1024 * 1024 => format!("{:.1} KB", b as f64 / 1024.0),
        Some(b) => format!("{:.1} MB", b as f64 / (1024.0 * 1024.0)),
    }
}

pub(super) fn render_photo_list(photos: &[PhotoView]) -> String {
    if photos.is_empty() {
        return "No photos for this property.".to_string();
    }

    let marker = Style::new().yellow();
    let muted = Style::new().dim();
    let mut out = String::new();
    for view in photos {
        let prefix = if view.is_primary() {
            format!("{} ", marker.apply_to(PRIMARY_MARKER))
        } else {
            "  ".to_string()
        };
        out.push_str(&format!(
            "{}{:>2}. {}  {}  {}\n",
            prefix,
            view.position + 1,
            view.photo.label(),
            muted.apply_to(format_size(view.photo.file_size)),
            muted.apply_to(view.photo.mime_type.as_deref().unwrap_or("-")),
        ));
        out.push_str(&format!("      {}\n", muted.apply_to(&view.url)));
    }
    out
}

pub(super) fn print_photo_list(photos: &[PhotoView]) {
    print!("{}", render_photo_list(photos));
    if photos.is_empty() {
        println!();
    }
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

pub(super) fn render_report(report: &SyncReport) -> Vec<String> {
    let success = Style::new().green();
    let warning = Style::new().yellow();
    let mut lines = Vec::new();

    if !report.inserted.is_empty() {
        let n = report.inserted.len();
        lines.push(success.apply_to(format!("Uploaded {} photo{}", n, plural(n))).to_string());
    }
    if !report.deleted.is_empty() {
        let n = report.deleted.len();
        lines.push(success.apply_to(format!("Deleted {} photo{}", n, plural(n))).to_string());
    }
    if report.updated > 0 {
        lines.push(
            success
                .apply_to(format!("Reordered {} photo{}", report.updated, plural(report.updated)))
                .to_string(),
        );
    }
    for failure in &report.drain_failures {
        lines.push(
            warning
                .apply_to(format!(
                    "Could not fully delete {}: {}",
                    failure.bucket_path, failure.error
                ))
                .to_string(),
        );
    }
    if lines.is_empty() {
        lines.push("Nothing to change".to_string());
    }
    lines
}

pub(super) fn print_report(report: &SyncReport) {
    for line in render_report(report) {
        println!("{}", line);
    }
}
