
use crate::domain::models::{ListingDocument, ListingEntry};

const STYLE: &str = "body{font-family:-apple-system,BlinkMacSystemFont,'Segoe UI',Roboto,Arial,sans-serif;margin:0;padding:2rem;background:#f4f7f9;color:#333}\
.container{max-width:960px;margin:0 auto;background:#fff;padding:2rem;border-radius:8px;box-shadow:0 4px 6px rgba(0,0,0,.1)}\
h1,h2{color:#2c3e50;border-bottom:2px solid #3498db;padding-bottom:.5rem}\
table{width:100%;border-collapse:collapse;margin-top:1.5rem}\
th,td{padding:.75rem;text-align:left;border-bottom:1px solid #ddd}\
th{background:#ecf0f1}\
a{color:#3498db;text-decoration:none}\
.download-btn{padding:.4rem 1rem;background:#27ae60;color:#fff;border-radius:4px}\
.upload-form{margin-top:2rem;padding:1.5rem;border:1px dashed #ccc;border-radius:8px;background:#fafafa}\
#upload-status{margin-top:1rem;font-weight:bold}";

const UPLOAD_SCRIPT: &str = r#"document.getElementById('upload-form').addEventListener('submit', async (event) => {
  event.preventDefault();
  const file = document.getElementById('file-input').files[0];
  const status = document.getElementById('upload-status');
  if (!file) { status.textContent = 'Please select a file to upload.'; return; }
  status.textContent = 'Getting upload URL...';
  try {
    const res = await fetch(UPLOAD_ENDPOINT + '?filename=' + encodeURIComponent(file.name));
    if (!res.ok) throw new Error('Failed to get upload URL: ' + res.statusText);
    const { url } = await res.json();
    status.textContent = 'Uploading...';
    const put = await fetch(url, { method: 'PUT', body: file, headers: { 'Content-Type': file.type || 'application/octet-stream' } });
    if (!put.ok) throw new Error('Upload failed: ' + put.statusText);
    status.textContent = 'Upload successful! Page will reload shortly.';
    setTimeout(() => location.reload(), 2000);
  } catch (error) {
    status.textContent = 'An error occurred: ' + error.message;
  }
});"#;

/// Escape text for HTML element content and quoted attributes
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Percent-encode each segment of a key, keeping the separators
pub fn encode_path(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// Render a listing as a standalone HTML page.
///
/// Output depends only on the document and the two endpoint paths.
pub fn render_listing_html(doc: &ListingDocument, upload_path: &str, download_path: &str) -> String {
    let mut html = String::new();
    let title = format!("/{}", doc.prefix);

    html.push_str(&format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
<title>File Portal - {title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
<div class=\"container\">\n<h1>File Portal</h1>\n<h2>Index of {title}</h2>\n",
        title = escape_html(&title),
    ));

    if let Some(parent) = &doc.parent {
        html.push_str(&format!(
            "<p><a class=\"parent\" href=\"/{}\">&larr; Parent directory</a></p>\n",
            escape_html(&encode_path(parent))
        ));
    }

    html.push_str(
        "<table>\n<thead><tr><th>Name</th><th>Size (Bytes)</th><th>Last Modified</th><th>Download</th></tr></thead>\n<tbody>\n",
    );

    if doc.entries.is_empty() {
        html.push_str("<tr><td colspan=\"4\" style=\"text-align:center;\">No files here.</td></tr>\n");
    }

    for entry in &doc.entries {
        match entry {
            ListingEntry::File {
                name,
                key,
                size,
                last_modified,
                ..
            } => {
                let href = escape_html(&encode_path(key));
                html.push_str(&format!(
                    "<tr class=\"file\"><td><a href=\"/{href}\">{name}</a></td><td>{size}</td><td>{modified}</td>\
<td><a class=\"download-btn\" href=\"{download}/{href}\">Download</a></td></tr>\n",
                    name = escape_html(name),
                    modified = last_modified.format("%Y-%m-%d %H:%M:%S"),
                    download = escape_html(download_path),
                ));
            }
            ListingEntry::Directory {
                name,
                prefix,
                total_size,
                last_modified,
                ..
            } => {
                html.push_str(&format!(
                    "<tr class=\"directory\"><td><a href=\"/{href}\">{name}/</a></td><td>{total_size}</td><td>{modified}</td><td></td></tr>\n",
                    href = escape_html(&encode_path(prefix)),
                    name = escape_html(name),
                    modified = last_modified.format("%Y-%m-%d %H:%M:%S"),
                ));
            }
        }
    }

    html.push_str("</tbody>\n</table>\n");

    html.push_str(&format!(
        "<div class=\"upload-form\">\n<h2>Upload a file</h2>\n<form id=\"upload-form\">\n\
<input type=\"file\" id=\"file-input\" required />\n<button type=\"submit\">Upload</button>\n</form>\n\
<p id=\"upload-status\"></p>\n</div>\n</div>\n\
<script>\nconst UPLOAD_ENDPOINT = \"{endpoint}\";\n{UPLOAD_SCRIPT}\n</script>\n</body>\n</html>\n",
        endpoint = escape_html(upload_path),
    ));

    html
}
