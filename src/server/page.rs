use crate::session::{RUNNING_MESSAGE, VALIDATION_WARNING};

/// Renders the single-page summarizer UI.
///
/// The page drives the submission flow against the JSON API: the submit
/// button validates locally (mirroring the server-side check), shows the
/// transient status line while the request is in flight, and then fills
/// either the summary block or the error block from the response
/// envelope. One input, one trigger, one status area, one result area.
pub fn render_index() -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Text Summarizer</title>
<style>
  body {{ font-family: sans-serif; max-width: 46rem; margin: 2rem auto; padding: 0 1rem; }}
  textarea {{ width: 100%; height: 18rem; font: inherit; padding: 0.5rem; box-sizing: border-box; }}
  button {{ margin-top: 0.75rem; padding: 0.5rem 1.25rem; font: inherit; cursor: pointer; }}
  #status {{ color: #555; margin-top: 0.75rem; }}
  #warning {{ color: #8a6d00; margin-top: 0.75rem; }}
  #error {{ color: #a00; margin-top: 0.75rem; white-space: pre-wrap; }}
  #summary {{ background: #f4f4f4; padding: 1rem; margin-top: 0.75rem; white-space: pre-wrap; }}
  .hidden {{ display: none; }}
</style>
</head>
<body>
<h1>Text Summarizer</h1>
<p>Paste a <strong>blog, article, or long conversation</strong> and generate a clean, concise summary.</p>
<textarea id="input" placeholder="Enter blog or dialogue text here..."></textarea>
<br>
<button id="generate">Generate Summary</button>
<div id="status" class="hidden">{running}</div>
<div id="warning" class="hidden">{warning}</div>
<div id="error" class="hidden"></div>
<div id="summary" class="hidden"></div>
<script>
const show = (id, text) => {{
  const el = document.getElementById(id);
  if (text !== undefined) el.textContent = text;
  el.classList.remove('hidden');
}};
const hideAll = () => ['status', 'warning', 'error', 'summary']
  .forEach(id => document.getElementById(id).classList.add('hidden'));

document.getElementById('generate').addEventListener('click', async () => {{
  hideAll();
  const text = document.getElementById('input').value;
  if (!text.trim()) {{ show('warning'); return; }}
  show('status');
  try {{
    const resp = await fetch('/api/v1/summarize', {{
      method: 'POST',
      headers: {{ 'Content-Type': 'application/json' }},
      body: JSON.stringify({{ text }}),
    }});
    const body = await resp.json();
    hideAll();
    if (body.status === 'success') {{
      show('summary', body.data.summary);
    }} else if (body.status === 'warning') {{
      show('warning', body.message);
    }} else {{
      show('error', body.message);
    }}
  }} catch (e) {{
    hideAll();
    show('error', 'Request failed: ' + e);
  }}
}});
</script>
</body>
</html>
"#,
        running = RUNNING_MESSAGE,
        warning = VALIDATION_WARNING,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_has_form_status_and_result_areas() {
        let page = render_index();
        assert!(page.contains("<textarea id=\"input\""));
        assert!(page.contains("id=\"generate\""));
        assert!(page.contains("id=\"status\""));
        assert!(page.contains("id=\"summary\""));
        assert!(page.contains("id=\"error\""));
    }

    #[test]
    fn test_page_posts_to_summarize_endpoint() {
        let page = render_index();
        assert!(page.contains("/api/v1/summarize"));
    }

    #[test]
    fn test_page_embeds_shared_messages() {
        let page = render_index();
        assert!(page.contains(RUNNING_MESSAGE));
        assert!(page.contains(VALIDATION_WARNING));
    }
}
