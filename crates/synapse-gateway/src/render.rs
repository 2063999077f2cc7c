//! Neuro-Lab page rendering: header, sidebar, trace form, result tabs and inline notices.
//! Every model-produced string goes through `html_escape` before it reaches the page.

use synapse_core::{
    extract_mermaid_chart, reference, Facts, TraceError, TraceOutcome, QUICK_STIMULI,
};

const SELECT_PLACEHOLDER: &str = "— Select —";
const KEY_HINT: &str = "Make sure your SYNAPSE_API_KEY (or GITHUB_TOKEN) is set in a .env file.";

const FEATURES: &[(&str, &str, &str)] = &[
    (
        "🧬",
        "5-Step Reasoning",
        "Traces the neural signal from receptor to cortex in exactly 5 logical, NCERT-aligned steps.",
    ),
    (
        "📊",
        "Live Flowchart",
        "Generates a real-time Mermaid.js neural circuit diagram with dark-mode neon styling.",
    ),
    (
        "✅",
        "NCERT Grounded",
        "Every pathway is cross-checked against NCERT Class 10-12 biology standards.",
    ),
];

/// Inline message shown above the page body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Error,
    Warning,
    Info,
    Success,
}

impl NoticeKind {
    fn class(self) -> &'static str {
        match self {
            NoticeKind::Error => "error",
            NoticeKind::Warning => "warning",
            NoticeKind::Info => "info",
            NoticeKind::Success => "success",
        }
    }
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn notice(kind: NoticeKind, text: &str) -> String {
    format!(
        r#"<div class="notice {}">{}</div>"#,
        kind.class(),
        html_escape(text)
    )
}

/// Landing page, optionally with a notice (e.g. "enter a stimulus").
pub fn landing_page(notice_msg: Option<(NoticeKind, &str)>) -> String {
    let mut body = trace_form("");
    if let Some((kind, text)) = notice_msg {
        body.push_str(&notice(kind, text));
    }
    body.push_str("<hr>");
    body.push_str(&feature_cards());
    page(&body)
}

/// Result page for a validated trace.
pub fn result_page(outcome: &TraceOutcome) -> String {
    let mut body = trace_form(&outcome.stimulus);
    body.push_str("<hr>");
    body.push_str(&result_tabs(outcome));
    page(&body)
}

/// Validation failed: list the errors and dump the raw reply.
pub fn rejected_page(outcome: &TraceOutcome) -> String {
    let mut body = trace_form(&outcome.stimulus);
    body.push_str(&notice(
        NoticeKind::Error,
        &format!(
            "⚠️ Response validation failed: {}",
            outcome.validation.error_summary()
        ),
    ));
    let raw = serde_json::to_string_pretty(&outcome.trace).unwrap_or_else(|_| outcome.trace.to_string());
    body.push_str(&format!(r#"<pre class="raw">{}</pre>"#, html_escape(&raw)));
    page(&body)
}

/// The trace could not be produced at all.
pub fn failure_page(stimulus: &str, err: &TraceError) -> String {
    let mut body = trace_form(stimulus);
    if err.is_client_error() {
        body.push_str(&notice(NoticeKind::Warning, &format!("⚠️ {}", err)));
    } else {
        body.push_str(&notice(
            NoticeKind::Error,
            &format!("❌ Error during neural trace: {}", err),
        ));
        body.push_str(&notice(NoticeKind::Info, &format!("💡 {}", KEY_HINT)));
    }
    page(&body)
}

fn page(body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>Synapse-Architect | Neuro-Lab</title>
<link rel="icon" href="data:image/svg+xml,<svg xmlns=%22http://www.w3.org/2000/svg%22 viewBox=%220 0 100 100%22><text y=%22.9em%22 font-size=%2290%22>🧠</text></svg>">
<link rel="stylesheet" href="/static/neuro_lab.css">
</head>
<body>
{sidebar}
<main>
<div class="neuro-header">
    <h1>🧠 SYNAPSE-ARCHITECT</h1>
    <p>Autonomous Neuro-Reasoning Agent &nbsp;|&nbsp; NCERT-Grounded &nbsp;|&nbsp; Real-Time Visualization</p>
</div>
{body}
</main>
{scripts}
</body>
</html>"#,
        sidebar = sidebar(),
        body = body,
        scripts = SCRIPTS,
    )
}

fn sidebar() -> String {
    let r = reference();
    let options: String = std::iter::once(SELECT_PLACEHOLDER)
        .chain(QUICK_STIMULI.iter().copied())
        .map(|s| format!("<option>{}</option>", html_escape(s)))
        .collect();

    format!(
        r#"<aside class="sidebar">
<h2>⚡ Control Panel</h2>
<hr>
<h3>📡 Quick Stimuli</h3>
<label for="quick-stimulus">Choose a pre-set stimulus:</label>
<select id="quick-stimulus">{options}</select>
<hr>
<h3>📚 NCERT Reference</h3>
{receptors}
{regions}
{neurons}
<hr>
<p class="footer">Built with 🧬 Synapse-Architect<br>v{version}</p>
</aside>"#,
        options = options,
        receptors = reference_panel("Receptor Types", &r.receptor_types),
        regions = reference_panel("Brain Regions", &r.key_brain_regions),
        neurons = reference_panel("Neuron Types", &r.neuron_types),
        version = synapse_core::version(),
    )
}

fn reference_panel(title: &str, facts: &Facts) -> String {
    let items: String = facts
        .iter()
        .map(|(name, desc)| format!("<p><strong>{}</strong>: {}</p>", name, desc))
        .collect();
    format!("<details><summary>{}</summary>{}</details>", title, items)
}

fn trace_form(stimulus: &str) -> String {
    format!(
        r#"<form class="trace-form" method="post" action="/trace">
<div class="field">
<label for="stimulus">🔬 Enter a stimulus to trace:</label>
<input type="text" id="stimulus" name="stimulus" value="{}" placeholder="e.g., Stubbing a toe, Touching a hot surface...">
</div>
<button type="submit">⚡ TRACE</button>
</form>"#,
        html_escape(stimulus)
    )
}

fn feature_cards() -> String {
    let cards: String = FEATURES
        .iter()
        .map(|(icon, title, desc)| {
            format!(
                r#"<div class="step-card feature"><div class="icon">{}</div><div class="step-title">{}</div><div class="step-desc">{}</div></div>"#,
                icon, title, desc
            )
        })
        .collect();
    format!(r#"<div class="features">{}</div>"#, cards)
}

fn result_tabs(outcome: &TraceOutcome) -> String {
    format!(
        r#"<div class="tabs">
<input type="radio" name="tab" id="tab-pathway" checked><label for="tab-pathway">🧬 Neural Pathway</label>
<input type="radio" name="tab" id="tab-flowchart"><label for="tab-flowchart">📊 Flowchart</label>
<input type="radio" name="tab" id="tab-accuracy"><label for="tab-accuracy">✅ NCERT Accuracy</label>
<section class="tab-panel panel-pathway">{}</section>
<section class="tab-panel panel-flowchart">{}</section>
<section class="tab-panel panel-accuracy">{}</section>
</div>"#,
        pathway_panel(outcome),
        flowchart_panel(outcome),
        accuracy_panel(outcome),
    )
}

fn pathway_panel(outcome: &TraceOutcome) -> String {
    let trace = outcome.typed();
    let shown_stimulus = if trace.stimulus.trim().is_empty() {
        outcome.stimulus.as_str()
    } else {
        trace.stimulus.as_str()
    };

    let mut html = format!(
        "<h3>Signal Trace: <em>{}</em></h3>",
        html_escape(shown_stimulus)
    );
    for step in &trace.steps {
        html.push_str(&format!(
            r#"<div class="step-card">
<span class="step-number">{}</span>
<span class="step-title">{}</span>
<div class="step-desc">{}</div>
<div class="step-meta">🏗️ <strong>Structure:</strong> {} &nbsp;&nbsp;|&nbsp;&nbsp; 📖 <strong>NCERT:</strong> {}</div>
</div>"#,
            html_escape(&step.number_label()),
            html_escape(step.title_or_default()),
            html_escape(step.description_or_default()),
            html_escape(step.structure_or_default()),
            html_escape(step.ncert_reference_or_default()),
        ));
    }

    if let Some(note) = &trace.reflex_arc_note {
        html.push_str("<hr>");
        html.push_str(&notice(
            NoticeKind::Info,
            &format!("⚡ Reflex Arc Note: {}", note),
        ));
    }
    html
}

fn flowchart_panel(outcome: &TraceOutcome) -> String {
    let chart = html_escape(&extract_mermaid_chart(&outcome.trace));
    format!(
        r#"<h3>📊 Neural Circuit Flowchart</h3>
<div class="mermaid-frame"><pre class="mermaid">
{chart}
</pre></div>
<details><summary>📝 View Mermaid Source Code</summary><pre class="source">{chart}</pre></details>"#,
        chart = chart
    )
}

fn accuracy_panel(outcome: &TraceOutcome) -> String {
    let trace = outcome.typed();
    let notes = if trace.ncert_accuracy_notes.trim().is_empty() {
        "No accuracy notes generated.".to_string()
    } else {
        trace.ncert_accuracy_notes
    };

    let mut html = format!(
        r#"<div class="accuracy-badge"><h3>✅ NCERT Accuracy Cross-Check</h3><p>{}</p></div>"#,
        html_escape(&notes)
    );

    if outcome.validation.warnings.is_empty() {
        html.push_str(&notice(NoticeKind::Success, "✅ All validation checks passed!"));
    } else {
        html.push_str(&notice(
            NoticeKind::Warning,
            &format!("⚠️ Warnings: {}", outcome.validation.warning_summary()),
        ));
    }

    html.push_str("<h4>📚 Referenced NCERT Chapters</h4><ul>");
    for chapter in reference().ncert_chapters {
        html.push_str(&format!("<li>{}</li>", chapter));
    }
    html.push_str("</ul>");
    html
}

const SCRIPTS: &str = r#"<script src="https://cdn.jsdelivr.net/npm/mermaid@10/dist/mermaid.min.js"></script>
<script>
    const select = document.getElementById('quick-stimulus');
    if (select) {
        select.addEventListener('change', () => {
            if (select.selectedIndex > 0) {
                document.getElementById('stimulus').value = select.value;
            }
        });
    }
    if (window.mermaid) {
        mermaid.initialize({
            startOnLoad: false,
            theme: 'dark',
            themeVariables: {
                primaryColor: '#1a1a2e',
                primaryTextColor: '#39FF14',
                primaryBorderColor: '#39FF14',
                lineColor: '#39FF14',
                secondaryColor: '#0d0d1a',
                tertiaryColor: '#1a1a2e',
                fontFamily: 'JetBrains Mono, monospace',
                fontSize: '14px',
                edgeLabelBackground: '#0a0a0a',
                nodeTextColor: '#e0e0e0'
            }
        });
        // Hidden panels have no size; render the chart when its tab opens.
        const tab = document.getElementById('tab-flowchart');
        if (tab) {
            tab.addEventListener('change', () => mermaid.run({ querySelector: '.mermaid:not([data-processed])' }));
        }
    }
</script>"#;
