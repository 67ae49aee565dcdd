use crate::client::{DurationSource, FormState, ResolvedClientConfig, ValidationError, ValidationErrors};

/// Renders the submission page. `errors` switches on the inline message for
/// each failing field; the rest of the form is refilled from `form`.
pub fn render_index(
    config: &ResolvedClientConfig,
    form: &FormState,
    errors: Option<&ValidationErrors>,
) -> String {
    let duration = form.duration();
    let source = duration.source();
    let minutes = duration.minutes();
    let slider_value = minutes
        .unwrap_or(config.slider.min)
        .clamp(config.slider.min, config.slider.max.max(config.slider.min));

    let member_options: String = config
        .members
        .iter()
        .enumerate()
        .map(|(index, member)| {
            format!(
                r#"<option value="{index}" data-cwid="{cwid}"{selected}>{name}</option>"#,
                cwid = html_escape(&member.cwid),
                name = html_escape(&member.name),
                selected = selected_attr(form.member() == Some(index)),
            )
        })
        .collect();

    let activity_options: String = config
        .activities
        .iter()
        .map(|activity| {
            format!(
                r#"<option value="{value}"{selected}>{value}</option>"#,
                value = html_escape(activity),
                selected = selected_attr(form.activity() == activity.as_str()),
            )
        })
        .collect();

    let duration_buttons: String = config
        .durations
        .iter()
        .map(|choice| {
            let active = source == Some(DurationSource::Choice) && minutes == Some(*choice);
            format!(
                r#"<button type="button" class="duration-btn{class}" data-duration="{choice}">{choice} min</button>"#,
                class = if active { " selected" } else { "" },
            )
        })
        .collect();

    let cwid = form
        .member()
        .and_then(|index| config.member(index))
        .map(|member| format!("CWID: {}", html_escape(&member.cwid)))
        .unwrap_or_default();

    INDEX_HTML
        .replace("{{TEAM}}", &html_escape(&config.team))
        .replace("{{MEMBER_OPTIONS}}", &member_options)
        .replace("{{CWID}}", &cwid)
        .replace("{{ACTIVITY_OPTIONS}}", &activity_options)
        .replace("{{DURATION_BUTTONS}}", &duration_buttons)
        .replace("{{CHOICE}}", &choice_value(source, minutes))
        .replace("{{MANUAL}}", &minutes.unwrap_or(slider_value).to_string())
        .replace("{{SLIDER}}", &slider_value.to_string())
        .replace("{{SLIDER_MIN}}", &config.slider.min.to_string())
        .replace("{{SLIDER_MAX}}", &config.slider.max.to_string())
        .replace("{{SLIDER_STEP}}", &config.slider.step.max(1).to_string())
        .replace("{{SOURCE}}", source.map(DurationSource::as_str).unwrap_or(""))
        .replace("{{MEMBER_ERROR}}", &error_display(errors, ValidationError::Member))
        .replace("{{ACTIVITY_ERROR}}", &error_display(errors, ValidationError::Activity))
        .replace("{{DURATION_ERROR}}", &error_display(errors, ValidationError::Duration))
}

fn choice_value(source: Option<DurationSource>, minutes: Option<u32>) -> String {
    match (source, minutes) {
        (Some(DurationSource::Choice), Some(minutes)) => minutes.to_string(),
        _ => String::new(),
    }
}

fn selected_attr(selected: bool) -> &'static str {
    if selected { " selected" } else { "" }
}

fn error_display(errors: Option<&ValidationErrors>, kind: ValidationError) -> String {
    let shown = errors.is_some_and(|errors| errors.contains(kind));
    format!(
        r#"style="display: {}">{}"#,
        if shown { "block" } else { "none" },
        html_escape(&kind.to_string())
    )
}

/// Minimal HTML escaping for text and attribute values.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Activity Log</title>
  <style>
    :root {
      --bg-1: #f8f3e6;
      --bg-2: #f5d3a7;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.86);
      --shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(560px, 100%);
      background: var(--card);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 20px;
    }

    h1 {
      font-family: "Georgia", serif;
      margin: 0;
    }

    .team-name {
      margin: 0;
      color: #5f5c57;
    }

    label {
      display: grid;
      gap: 6px;
      font-weight: 600;
    }

    select,
    input[type="number"] {
      font: inherit;
      padding: 10px 12px;
      border-radius: 12px;
      border: 1px solid rgba(47, 72, 88, 0.2);
    }

    .hint {
      font-size: 13px;
      color: #666;
      min-height: 1em;
    }

    .error {
      color: var(--accent);
      font-size: 0.9rem;
    }

    .duration-buttons {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
    }

    .duration-btn {
      font: inherit;
      border: 1px solid var(--accent-2);
      background: white;
      border-radius: 999px;
      padding: 8px 14px;
      cursor: pointer;
    }

    .duration-btn.selected {
      background: var(--accent-2);
      color: white;
    }

    .submit {
      font: inherit;
      font-weight: 600;
      border: none;
      border-radius: 16px;
      padding: 14px;
      background: var(--accent);
      color: white;
      cursor: pointer;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Activity Log</h1>
      <p class="team-name" id="teamName">{{TEAM}}</p>
    </header>

    <form id="logForm" method="post" action="/submit" target="_blank">
      <label>
        Member
        <select id="member" name="member">
          <option value="">-- Choose a member --</option>
          {{MEMBER_OPTIONS}}
        </select>
      </label>
      <div class="hint" id="cwid">{{CWID}}</div>
      <div class="error" id="memberError" {{MEMBER_ERROR}}</div>

      <label>
        Activity
        <select id="activity" name="activity">
          <option value="">-- Choose an activity --</option>
          {{ACTIVITY_OPTIONS}}
        </select>
      </label>
      <div class="error" id="activityError" {{ACTIVITY_ERROR}}</div>

      <label>Duration</label>
      <div class="duration-buttons">{{DURATION_BUTTONS}}</div>
      <input type="hidden" id="durationChoice" name="duration_choice" value="{{CHOICE}}" />
      <input type="hidden" id="durationSource" name="duration_source" value="{{SOURCE}}" />
      <label>
        Minutes
        <input type="number" id="manualDuration" name="duration_manual" min="1" value="{{MANUAL}}" />
      </label>
      <input type="range" id="durationSlider" name="duration_slider"
        min="{{SLIDER_MIN}}" max="{{SLIDER_MAX}}" step="{{SLIDER_STEP}}" value="{{SLIDER}}" />
      <div class="error" id="durationError" {{DURATION_ERROR}}</div>

      <button type="submit" class="submit" id="copyBtn">Log &amp; open form</button>
    </form>
  </main>

  <script>
    const memberSelect = document.getElementById('member');
    const cwidEl = document.getElementById('cwid');
    const choiceInput = document.getElementById('durationChoice');
    const sourceInput = document.getElementById('durationSource');
    const manual = document.getElementById('manualDuration');
    const slider = document.getElementById('durationSlider');
    const buttons = document.querySelectorAll('.duration-btn');

    const clearButtons = () => buttons.forEach((b) => b.classList.remove('selected'));
    const hide = (id) => { document.getElementById(id).style.display = 'none'; };

    memberSelect.addEventListener('change', () => {
      const opt = memberSelect.selectedOptions[0];
      cwidEl.textContent = opt && opt.dataset.cwid ? `CWID: ${opt.dataset.cwid}` : '';
      if (memberSelect.value !== '') hide('memberError');
    });

    document.getElementById('activity').addEventListener('change', (e) => {
      if (e.target.value) hide('activityError');
    });

    buttons.forEach((btn) => {
      btn.addEventListener('click', () => {
        clearButtons();
        btn.classList.add('selected');
        const d = btn.dataset.duration;
        choiceInput.value = d;
        sourceInput.value = 'choice';
        manual.value = d;
        slider.value = d;
        hide('durationError');
      });
    });

    manual.addEventListener('input', () => {
      clearButtons();
      sourceInput.value = 'manual';
      if (Number(manual.value) > 0) {
        slider.value = manual.value;
        hide('durationError');
      }
    });

    slider.addEventListener('input', () => {
      clearButtons();
      sourceInput.value = 'slider';
      manual.value = slider.value;
      hide('durationError');
    });
  </script>
</body>
</html>
"#;
