//! HTML for the editor shell and the file-manager sidebar.

use std::fmt::Write as _;

use sanctuary_core::{DirectoryEntry, DirectoryListing};

const SHELL_TEMPLATE: &str = r##"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<title>Sanctuary</title>
<style>
body { margin: 0; background: #232629; color: #eff0f1; font-family: monospace; display: flex; height: 100vh; overflow: hidden; }
#sidebar { width: 0; transition: 0.3s ease; background: #1b1e20; overflow: hidden; }
#sidebar.open { width: 400px; border-right: 2px solid #3daee9; }
.workspace { flex-grow: 1; display: flex; flex-direction: column; }
.header { padding: 10px; background: #31363b; display: flex; align-items: center; gap: 15px; border-bottom: 1px solid #3daee9; }
.editor-container { flex-grow: 1; position: relative; display: flex; flex-direction: column; }
textarea, #preview-frame { flex-grow: 1; border: none; outline: none; width: 100%; height: 100%; }
textarea { background: transparent; color: #eff0f1; padding: 20px; font-size: 16px; line-height: 1.5; resize: none; }
#preview-frame { background: #fff; display: none; }
button { background: #3daee9; color: white; border: none; padding: 5px 12px; cursor: pointer; font-weight: bold; font-family: monospace; }
.btn-save { background: #27ae60; }
.btn-check { background: #8e44ad; }
.btn-preview { background: #fdbc4b; color: #232629; margin-left: auto; }
.btn-preview.running { background: #ed1515; color: white; }
#file-path { color: #fdbc4b; font-size: 12px; }
</style>
</head>
<body>
<div id="sidebar"><iframe src="/fm" style="width:400px; height:100%; border:none;"></iframe></div>
<div class="workspace">
<div class="header">
<button onclick="toggleSidebar()">&#9776; MENU</button>
<span id="file-path">No file open</span>
<button class="btn-check" onclick="checkFile()">CHECK</button>
<button class="btn-preview" onclick="togglePreview()" id="preview-btn">START PREVIEW</button>
<button class="btn-save" onclick="saveFile()">SAVE</button>
</div>
<div class="editor-container">
<textarea id="editor" spellcheck="false"></textarea>
<iframe id="preview-frame"></iframe>
</div>
</div>
<script>
const PREVIEW_ORIGIN = "{{PREVIEW_ORIGIN}}";
let openPath = null;
let previewRunning = false;

window.addEventListener('beforeunload', () => navigator.sendBeacon('/quit'));

function toggleSidebar() { document.getElementById('sidebar').classList.toggle('open'); }

window.addEventListener('message', e => {
  if (e.data && e.data.type === 'open') openFile(e.data.path);
});

async function openFile(path) {
  const res = await fetch('/read?path=' + encodeURIComponent(path));
  document.getElementById('editor').value = await res.text();
  document.getElementById('file-path').innerText = path;
  openPath = path;
  if (previewRunning) showPreview();
}

async function checkFile() {
  if (openPath === null) return;
  const res = await fetch('/check?path=' + encodeURIComponent(openPath));
  const report = await res.text();
  alert(report === "" ? "Clean: no issues found." : "Analysis report:\n\n" + report);
}

function setPreviewUi(running) {
  previewRunning = running;
  const btn = document.getElementById('preview-btn');
  btn.innerText = running ? "STOP PREVIEW" : "START PREVIEW";
  btn.classList.toggle('running', running);
  document.getElementById('editor').style.display = running ? 'none' : 'block';
  document.getElementById('preview-frame').style.display = running ? 'block' : 'none';
}

function showPreview() {
  const name = openPath === null ? '' : openPath.split('/').pop();
  document.getElementById('preview-frame').src = PREVIEW_ORIGIN + '/' + encodeURIComponent(name);
}

async function togglePreview() {
  if (!previewRunning) {
    const res = await fetch('/start-server');
    if (!res.ok) {
      const body = await res.json().catch(() => ({ error: 'preview unavailable' }));
      alert(body.error);
      return;
    }
    setPreviewUi(true);
    showPreview();
  } else {
    await fetch('/stop-server');
    setPreviewUi(false);
  }
}

async function saveFile() {
  if (openPath === null) return;
  const content = document.getElementById('editor').value;
  await fetch('/save', {
    method: 'POST',
    headers: { 'Content-Type': 'application/x-www-form-urlencoded' },
    body: 'path=' + encodeURIComponent(openPath) + '&content=' + encodeURIComponent(content)
  });
  if (previewRunning) document.getElementById('preview-frame').contentWindow.location.reload();
}

fetch('/preview/status').then(r => r.json()).then(s => { if (s.state === 'running') setPreviewUi(true); });

document.addEventListener('keydown', e => {
  if (e.ctrlKey && e.key === 's') { e.preventDefault(); saveFile(); }
  if (e.ctrlKey && e.key === 'b') { e.preventDefault(); toggleSidebar(); }
});
</script>
</body>
</html>
"##;

const LISTING_HEAD: &str = r##"<!DOCTYPE html>
<html>
<head>
<meta charset="utf-8">
<style>
body { font-family: monospace; background: #1b1e20; color: #eff0f1; padding: 15px; margin: 0; display: flex; flex-direction: column; height: 100vh; box-sizing: border-box; }
.nav-bar { margin-bottom: 15px; border-bottom: 1px solid #3daee9; padding-bottom: 10px; display: flex; align-items: center; gap: 8px; }
.nav-btn { color: #fdbc4b; text-decoration: none; font-weight: bold; font-size: 12px; }
.path-input { background: #232629; color: #eff0f1; border: 1px solid #4d5052; padding: 3px 6px; font-family: monospace; font-size: 11px; flex-grow: 1; outline: none; }
.list { flex-grow: 1; overflow-y: auto; }
.file-row { display: flex; gap: 8px; padding: 4px 0; border-bottom: 1px solid #31363b; }
.name-link { color: #3daee9; text-decoration: none; cursor: pointer; flex-grow: 1; overflow: hidden; text-overflow: ellipsis; white-space: nowrap; }
.is-file { color: #eff0f1; }
.meta { color: #7f8c8d; font-size: 0.8em; white-space: nowrap; }
.btn-del { color: #ed1515; text-decoration: none; font-size: 0.8em; }
.create-bar { margin-top: 20px; padding-top: 15px; border-top: 1px solid #4d5052; display: flex; flex-direction: column; gap: 10px; }
input { background: #232629; color: #fdbc4b; border: 1px solid #4d5052; padding: 5px; outline: none; }
button { border: none; padding: 5px; cursor: pointer; color: white; font-weight: bold; }
</style>
<script>
function openEntry(el) { parent.postMessage({ type: 'open', path: el.dataset.path }, '*'); }
</script>
</head>
<body>
"##;

const LISTING_TAIL: &str = r##"</div>
<div class="create-bar">
<form action="/newfolder" method="GET" style="display:flex; gap:5px;">
<input type="text" name="name" placeholder="Folder..." required style="flex-grow:1;">
<button type="submit" style="background: #3daee9;">+DIR</button>
</form>
<form action="/newfile" method="GET" style="display:flex; gap:5px;">
<input type="text" name="name" placeholder="File..." required style="flex-grow:1;">
<button type="submit" style="background: #27ae60;">+FILE</button>
</form>
</div>
</body>
</html>
"##;

/// Main editor page. `preview_origin` is e.g. `http://127.0.0.1:8081`.
pub fn shell(preview_origin: &str) -> String {
    SHELL_TEMPLATE.replace("{{PREVIEW_ORIGIN}}", &escape_js(preview_origin))
}

/// Sidebar page for the cursor directory.
pub fn listing(listing: &DirectoryListing) -> String {
    let path = listing.path.to_string_lossy();
    let mut html = String::from(LISTING_HEAD);

    let _ = write!(
        html,
        r#"<div class="nav-bar">
<a href="/home" class="nav-btn">[H]</a>
<a href="/cd?path=.." class="nav-btn">[U]</a>
<form action="/cd" method="GET" style="display:contents;">
<input type="text" name="path" class="path-input" value="{}" spellcheck="false" autocomplete="off">
</form>
</div>
<div class="list">
"#,
        html_escape::encode_double_quoted_attribute(&path)
    );

    for entry in &listing.entries {
        push_row(&mut html, entry);
    }

    html.push_str(LISTING_TAIL);
    html
}

fn push_row(html: &mut String, entry: &DirectoryEntry) {
    let name = html_escape::encode_text(&entry.name);
    let encoded = urlencoding::encode(&entry.name);
    let modified = entry
        .modified_at
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();

    html.push_str("<div class=\"file-row\">\n");
    if entry.is_dir {
        let _ = writeln!(
            html,
            r#"<a href="/cd?path={encoded}" class="name-link">{name}/</a>"#
        );
    } else {
        let _ = writeln!(
            html,
            r#"<span class="name-link is-file" data-path="{}" onclick="openEntry(this)">{name}</span>"#,
            html_escape::encode_double_quoted_attribute(&entry.path.to_string_lossy())
        );
        let _ = writeln!(
            html,
            r#"<span class="meta">{}</span>"#,
            human_size(entry.size_bytes)
        );
    }
    let _ = writeln!(html, r#"<span class="meta">{modified}</span>"#);
    let _ = writeln!(
        html,
        r#"<a href="/delete?name={encoded}" class="btn-del" onclick="return confirm('Delete {}?')">del</a>"#,
        html_escape::encode_double_quoted_attribute(&escape_js(&entry.name))
    );
    html.push_str("</div>\n");
}

fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "K", "M", "G"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes}B")
    } else {
        format!("{size:.1}{}", UNITS[unit])
    }
}

/// Escape for embedding inside a single- or double-quoted JS string literal.
fn escape_js(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '"' => out.push_str("\\\""),
            '<' => out.push_str("\\u003c"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            _ => out.push(c),
        }
    }
    out
}
