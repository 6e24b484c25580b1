use axum::{response::Html, routing::get, Router};

use crate::formatter::escape_html;
use crate::session::{Role, Session};

pub fn router() -> Router {
    Router::new().route("/", get(index))
}

/// Render the turn log as an HTML fragment.
///
/// User text is escaped here; assistant content is already formatter output.
pub fn render_transcript(session: &Session) -> String {
    let mut html = String::from("<div class=\"transcript\">\n");
    for turn in session.turns() {
        let (class, body) = match turn.role() {
            Role::User => ("user", escape_html(turn.content())),
            Role::Assistant => ("assistant", turn.content().to_string()),
        };
        html.push_str(&format!(
            "<div class=\"turn {class}\"><div class=\"content\">{body}</div><div class=\"time\">{time}</div></div>\n",
            time = turn.time(),
        ));
    }
    html.push_str("</div>");
    html
}

async fn index() -> Html<&'static str> {
    Html(r#"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1" />
  <title>File Chat Assistant</title>
  <style>
    body { font-family: Arial, sans-serif; margin: 0; color: #1d1d1f; display: flex; min-height: 100vh; }
    #sidebar { width: 280px; padding: 1.5rem; border-right: 1px solid #ddd; background: #fafafa; }
    #sidebar.collapsed { display: none; }
    main { flex: 1; padding: 1.5rem 2rem; display: flex; flex-direction: column; }
    h1 { margin: 0 0 0.5rem 0; }
    #toggleBtn { display: none; margin-bottom: 1rem; width: fit-content; }
    #transcript { flex: 1; overflow-y: auto; }
    .turn { border-radius: 8px; padding: 0.6rem 0.9rem; margin: 0.5rem 0; max-width: 80%; }
    .turn.user { background: #e8f0fe; margin-left: auto; }
    .turn.assistant { background: #f1f1f1; }
    .turn .content { white-space: pre-wrap; }
    .turn .time { font-size: 0.75rem; color: #888; text-align: right; margin-top: 0.25rem; }
    table { border-collapse: collapse; }
    th, td { border: 1px solid #ccc; padding: 0.3rem 0.6rem; }
    #chatForm { display: flex; gap: 0.5rem; margin-top: 1rem; }
    #message { flex: 1; padding: 0.6rem; }
    #status { color: #666; min-height: 1.2rem; margin-top: 0.5rem; }
    .error { color: #b00020; }
  </style>
</head>
<body>
  <aside id="sidebar">
    <h2>Upload</h2>
    <p>PDF, DOCX, TXT, CSV, XLSX or XLS</p>
    <input id="fileInput" type="file" accept=".pdf,.docx,.txt,.csv,.xlsx,.xls" />
    <div id="fileStatus"></div>
  </aside>

  <main>
    <button id="toggleBtn">Toggle sidebar</button>
    <h1>File Chat Assistant</h1>
    <p>Upload a file, then ask questions about it in English or Romanized Hindi.</p>
    <div id="transcript"></div>
    <div id="status"></div>
    <form id="chatForm">
      <input id="message" placeholder="Ask about your file..." autocomplete="off" />
      <button type="submit">Send</button>
    </form>
  </main>

  <script>
    const HINDI_KEYWORDS = ['ky', 'hai', 'kya', 'ye', 'kaun', 'kahan', 'karo', 'kare', 'nahi', 'hai kya'];
    const fileInput = document.getElementById('fileInput');
    const fileStatus = document.getElementById('fileStatus');
    const sidebar = document.getElementById('sidebar');
    const toggleBtn = document.getElementById('toggleBtn');
    const transcript = document.getElementById('transcript');
    const status = document.getElementById('status');
    const chatForm = document.getElementById('chatForm');
    const messageInput = document.getElementById('message');
    let sessionId = null;

    async function ensureSession() {
      if (sessionId) return sessionId;
      const res = await fetch('/api/sessions', { method: 'POST' });
      const json = await res.json();
      sessionId = json.session_id;
      return sessionId;
    }

    async function refreshTranscript() {
      const id = await ensureSession();
      const res = await fetch(`/api/sessions/${id}/transcript`);
      transcript.innerHTML = await res.text();
      transcript.scrollTop = transcript.scrollHeight;
    }

    async function sendTurn(message) {
      const id = await ensureSession();
      const formData = new FormData();
      formData.append('file', fileInput.files[0]);
      if (message) formData.append('message', message);
      const res = await fetch(`/api/sessions/${id}/turns`, { method: 'POST', body: formData });
      const json = await res.json();
      if (!res.ok) throw new Error(json.error || 'Request failed');
      return json;
    }

    function waitingLabel(text) {
      const lowered = text.toLowerCase();
      return HINDI_KEYWORDS.some(k => lowered.includes(k)) ? 'Thinking ..' : 'Generating response...';
    }

    fileInput.addEventListener('change', async () => {
      if (!fileInput.files.length) return;
      toggleBtn.style.display = 'block';
      fileStatus.textContent = 'Checking file...';
      fileStatus.className = '';
      try {
        const json = await sendTurn(null);
        fileStatus.textContent = `${json.file.name} ready (${json.file.characters} characters)`;
      } catch (err) {
        fileStatus.textContent = err.message;
        fileStatus.className = 'error';
      }
    });

    toggleBtn.addEventListener('click', async () => {
      const id = await ensureSession();
      const res = await fetch(`/api/sessions/${id}/sidebar`, { method: 'POST' });
      const json = await res.json();
      sidebar.classList.toggle('collapsed', json.sidebar === 'collapsed');
    });

    chatForm.addEventListener('submit', async (event) => {
      event.preventDefault();
      const message = messageInput.value;
      if (!message.trim()) return;
      if (!fileInput.files.length) {
        status.textContent = 'Upload a file first.';
        return;
      }
      messageInput.value = '';
      status.textContent = waitingLabel(message);
      status.className = '';
      try {
        await sendTurn(message);
        status.textContent = '';
      } catch (err) {
        status.textContent = err.message;
        status.className = 'error';
      }
      await refreshTranscript();
    });

    ensureSession().then(refreshTranscript);
  </script>
</body>
</html>"#)
}
