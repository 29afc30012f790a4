//! The single-page app shell served by the gateway.

use serde::Serialize;

use crate::html::{esc, render_result};
use crate::view::ResultView;

/// Everything the page needs from the current session.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageModel {
    pub file_name: Option<String>,
    /// Source for the preview `<img>`, usually the gateway's `/preview` route.
    pub preview_url: Option<String>,
    pub analyzing: bool,
    pub error: Option<String>,
    pub result: Option<ResultView>,
    /// Name shown while analysis runs ("Analyzing with ...").
    pub provider: String,
    /// Upload limit in bytes, if one is enforced.
    pub max_upload_bytes: Option<usize>,
}

impl PageModel {
    fn upload_hint(&self) -> String {
        match self.max_upload_bytes {
            Some(bytes) => format!("PNG, JPG, JPEG up to {}MB", bytes.div_ceil(1024 * 1024)),
            None => "PNG, JPG, JPEG".to_string(),
        }
    }

    fn images_pending(&self) -> bool {
        self.result
            .as_ref()
            .is_some_and(|view| view.medication_rows().iter().any(|row| !row.image.is_settled()))
    }
}

const STYLE: &str = r#"
body{font-family:system-ui,sans-serif;background:#f8fafc;color:#0f172a;margin:0}
header{background:#0f766e;color:#fff;padding:1rem 2rem}
header h1{margin:0;font-size:1.4rem}header p{margin:.2rem 0 0;opacity:.85}
main{max-width:960px;margin:1.5rem auto;padding:0 1rem}
.panel{background:#fff;border:1px solid #e2e8f0;border-radius:.75rem;padding:1rem;margin-bottom:1rem}
.identity{display:grid;grid-template-columns:1fr 1fr;gap:1rem}
.rejection,.error{border-color:#fca5a5;background:#fef2f2}
.badge{display:inline-block;background:#e0f2f1;border-radius:999px;padding:0 .6rem;margin-right:.3rem;font-size:.85rem}
.medications ul{list-style:none;padding:0;margin:0}
.medication{display:grid;grid-template-columns:96px 1fr 1fr;gap:1rem;border-top:1px solid #e2e8f0;padding:.75rem 0}
.med-image img{max-width:96px;max-height:96px;border-radius:.5rem}
.preview img{max-width:100%;max-height:360px}
button{background:#0f766e;color:#fff;border:0;border-radius:.5rem;padding:.5rem 1rem;cursor:pointer}
button[disabled]{opacity:.6;cursor:default}
"#;

const IMAGE_POLL_SCRIPT: &str = r#"
(function(){
  function paint(el, cell){
    el.dataset.status = cell.status;
    if (cell.status === 'found') {
      var img = document.createElement('img');
      img.src = cell.url; img.loading = 'lazy';
      el.replaceChildren(img);
    } else if (cell.status === 'notFound') {
      var span = document.createElement('span');
      span.className = 'no-image'; span.textContent = 'No image found ';
      var a = document.createElement('a');
      a.href = el.dataset.searchUrl; a.target = '_blank'; a.rel = 'noopener noreferrer';
      a.textContent = 'Search images';
      el.replaceChildren(span, a);
    }
  }
  function poll(){
    fetch('/api/images').then(function(r){ return r.json(); }).then(function(body){
      var pending = false;
      (body.images || []).forEach(function(cell, i){
        var el = document.getElementById('med-image-' + i);
        if (!el) return;
        if (cell.status === 'loading') { pending = true; return; }
        if (el.dataset.status !== cell.status) paint(el, cell);
      });
      if (pending) setTimeout(poll, 1000);
    }).catch(function(){ setTimeout(poll, 3000); });
  }
  poll();
})();
"#;

pub fn render_page(model: &PageModel) -> String {
    let mut body = String::new();

    match (&model.file_name, &model.result) {
        (None, _) => body.push_str(&format!(
            "<section class=\"panel upload\">\n\
<form method=\"post\" action=\"/upload\" enctype=\"multipart/form-data\">\n\
<label>Upload a prescription image <input type=\"file\" name=\"image\" accept=\"image/*\" required></label>\n\
<p class=\"hint\">{}</p>\n<button type=\"submit\">Upload</button>\n</form>\n</section>\n",
            esc(&model.upload_hint())
        )),
        (Some(name), result) => {
            body.push_str("<section class=\"panel preview\">\n");
            if let Some(url) = &model.preview_url {
                body.push_str(&format!("<img src=\"{}\" alt=\"Prescription preview\">\n", esc(url)));
            }
            body.push_str(&format!("<p class=\"file-name\">{}</p>\n", esc(name)));
            if model.analyzing {
                body.push_str(&format!(
                    "<button type=\"button\" disabled>Analyzing with {}...</button>\n",
                    esc(&model.provider)
                ));
            } else if result.is_none() {
                body.push_str(
                    "<form method=\"post\" action=\"/analyze\" style=\"display:inline\"><button type=\"submit\">Analyze Prescription</button></form>\n\
<form method=\"post\" action=\"/reset\" style=\"display:inline\"><button type=\"submit\">Remove</button></form>\n",
                );
            }
            body.push_str("</section>\n");
        }
    }

    if let Some(message) = &model.error {
        body.push_str(&format!(
            "<section class=\"panel error\">\n<h3>Analysis Failed</h3>\n<p>{}</p>\n</section>\n",
            esc(message)
        ));
    }

    if let Some(view) = &model.result {
        body.push_str(
            "<div class=\"result-header\"><h2>Analysis Results</h2>\
<form method=\"post\" action=\"/reset\"><button type=\"submit\">Analyze Another</button></form></div>\n",
        );
        body.push_str(&render_result(view));
    }

    let refresh = if model.analyzing {
        "<meta http-equiv=\"refresh\" content=\"2\">\n"
    } else {
        ""
    };
    let script = if model.images_pending() {
        format!("<script>{IMAGE_POLL_SCRIPT}</script>\n")
    } else {
        String::new()
    };

    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n{refresh}\
<title>ScriptScan</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
<header><h1>ScriptScan</h1><p>AI Medical Prescription Parser</p></header>\n\
<main>\n{body}</main>\n{script}</body>\n</html>\n"
    )
}
