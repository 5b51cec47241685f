pub const MANIFEST_JSON: &str = r##"{
  "name": "Patient Tally",
  "short_name": "Tally",
  "start_url": "/",
  "display": "standalone",
  "background_color": "#f8f3e6",
  "theme_color": "#2f4858",
  "icons": [
    { "src": "/icons/icon-192.svg", "sizes": "192x192", "type": "image/svg+xml" },
    { "src": "/icons/icon-512.svg", "sizes": "512x512", "type": "image/svg+xml" }
  ]
}
"##;

pub const ICON_192_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="192" height="192" viewBox="0 0 192 192">
  <rect width="192" height="192" rx="40" fill="#2f4858"/>
  <path d="M84 44h24v40h40v24h-40v40H84v-40H44V84h40z" fill="#ff6b4a"/>
</svg>
"##;

pub const ICON_512_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="512" height="512" viewBox="0 0 512 512">
  <rect width="512" height="512" rx="104" fill="#2f4858"/>
  <path d="M224 116h64v108h108v64H288v108h-64V288H116v-64h108z" fill="#ff6b4a"/>
</svg>
"##;

pub const SHELL_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <meta name="theme-color" content="#2f4858" />
  <link rel="manifest" href="/manifest.webmanifest" />
  <link rel="icon" href="/icons/icon-192.svg" />
  <title>Patient Tally</title>
  <style>
    :root {
      --bg-1: #f8f3e6;
      --ink: #2b2a28;
      --accent: #ff6b4a;
      --accent-2: #2f4858;
      --card: rgba(255, 255, 255, 0.9);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(135deg, var(--bg-1), #ffe9d4 60%, #f9f2e9 100%);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 24px 14px 40px;
    }

    .app {
      width: min(760px, 100%);
      background: var(--card);
      border-radius: 24px;
      box-shadow: 0 24px 60px rgba(47, 72, 88, 0.18);
      padding: 28px;
      display: grid;
      gap: 22px;
    }

    h1, h2 {
      margin: 0;
      color: var(--accent-2);
    }

    .row {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      align-items: center;
    }

    .counter {
      flex: 1 1 200px;
      background: white;
      border-radius: 18px;
      padding: 16px;
      display: grid;
      gap: 10px;
      text-align: center;
    }

    .counter .value {
      font-size: 2.4rem;
      font-weight: 600;
    }

    button, select, input {
      font: inherit;
      border-radius: 12px;
      border: 1px solid rgba(47, 72, 88, 0.2);
      padding: 8px 12px;
    }

    button {
      cursor: pointer;
      background: var(--accent-2);
      color: white;
      border: none;
    }

    button.primary {
      background: var(--accent);
    }

    table {
      width: 100%;
      border-collapse: collapse;
    }

    td, th {
      padding: 6px;
      border-bottom: 1px solid rgba(47, 72, 88, 0.1);
      text-align: left;
    }

    #status {
      min-height: 1.2em;
      color: #8b857d;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Patient Tally</h1>
      <p id="status"></p>
    </header>

    <section class="row">
      <input type="date" id="date" />
      <select id="location"></select>
      <span id="lock"></span>
    </section>

    <section class="row">
      <div class="counter">
        <span>New</span>
        <span class="value" id="new-count">0</span>
        <div class="row">
          <button data-counter="new" data-action="decrement">-</button>
          <button data-counter="new" data-action="increment">+</button>
          <button data-counter="new" data-action="reset">Reset</button>
        </div>
      </div>
      <div class="counter">
        <span>Old</span>
        <span class="value" id="old-count">0</span>
        <div class="row">
          <button data-counter="old" data-action="decrement">-</button>
          <button data-counter="old" data-action="increment">+</button>
          <button data-counter="old" data-action="reset">Reset</button>
        </div>
      </div>
    </section>

    <section class="row">
      <strong>Total: <span id="total">0</span></strong>
      <button class="primary" id="finish">Finish</button>
    </section>

    <section>
      <h2>History</h2>
      <div class="row">
        <select id="f-location"><option value="ALL">All locations</option></select>
        <select id="f-year"><option value="ALL">All years</option></select>
        <select id="f-month"></select>
        <input type="date" id="f-from" />
        <input type="date" id="f-to" />
        <a id="export" href="/api/export?scope=ALL">Export</a>
      </div>
      <table>
        <thead><tr><th>Date</th><th>Location</th><th>Total</th></tr></thead>
        <tbody id="rows"></tbody>
      </table>
      <p>Grand total: <span id="grand">0</span></p>
    </section>
  </main>

  <script>
    const $ = (id) => document.getElementById(id);
    const setStatus = (message) => { $('status').textContent = message || ''; };

    const api = async (method, path, body) => {
      const response = await fetch(path, {
        method,
        headers: body ? { 'Content-Type': 'application/json' } : {},
        body: body ? JSON.stringify(body) : undefined,
      });
      if (!response.ok) {
        throw new Error(await response.text());
      }
      return response.status === 204 ? null : response.json();
    };

    const months = ['All months', 'Jan', 'Feb', 'Mar', 'Apr', 'May', 'Jun', 'Jul', 'Aug', 'Sep', 'Oct', 'Nov', 'Dec'];
    $('f-month').innerHTML = months.map((name, i) => `<option value="${i}">${name}</option>`).join('');

    const renderCurrent = (current) => {
      $('date').value = current.date || '';
      $('location').value = current.location || '';
      $('date').disabled = current.locked;
      $('location').disabled = current.locked;
      $('lock').textContent = current.locked ? 'Counting' : '';
      $('new-count').textContent = current.new_count;
      $('old-count').textContent = current.old_count;
      $('total').textContent = current.total;
    };

    const filterQuery = () => new URLSearchParams({
      location: $('f-location').value,
      year: $('f-year').value,
      month: $('f-month').value,
      from: $('f-from').value,
      to: $('f-to').value,
    }).toString();

    const fillSelect = (el, first, values) => {
      const selected = el.value;
      el.innerHTML = `<option value="ALL">${first}</option>` +
        values.map((value) => `<option value="${value}">${value}</option>`).join('');
      el.value = values.map(String).includes(selected) ? selected : 'ALL';
    };

    const loadHistory = async () => {
      const history = await api('GET', `/api/sessions?${filterQuery()}`);
      fillSelect($('f-location'), 'All locations', history.locations);
      fillSelect($('f-year'), 'All years', history.years);
      $('rows').innerHTML = history.sessions
        .map((s) => `<tr><td>${s.date}</td><td>${s.location}</td><td>${s.total}</td></tr>`)
        .join('');
      $('grand').textContent = history.grand_total;
      $('export').href = `/api/export?scope=FILTERED&${filterQuery()}`;
    };

    const loadLocations = async () => {
      const labels = await api('GET', '/api/locations');
      $('location').innerHTML = '<option value="">Select location</option>' +
        labels.map((label) => `<option value="${label}">${label}</option>`).join('');
    };

    document.querySelectorAll('button[data-counter]').forEach((button) => {
      button.addEventListener('click', async () => {
        try {
          renderCurrent(await api('POST', '/api/current/counter', {
            counter: button.dataset.counter,
            action: button.dataset.action,
          }));
        } catch (err) {
          setStatus(err.message);
        }
      });
    });

    $('date').addEventListener('change', async (event) => {
      renderCurrent(await api('POST', '/api/current/date', { date: event.target.value || null }));
    });

    $('location').addEventListener('change', async (event) => {
      renderCurrent(await api('POST', '/api/current/location', { location: event.target.value || null }));
    });

    $('finish').addEventListener('click', async () => {
      const result = await api('POST', '/api/current/finish');
      renderCurrent(result.current);
      setStatus(result.session ? `Saved ${result.session.total} for ${result.session.location}` : 'Nothing to save');
      await loadHistory();
    });

    ['f-location', 'f-year', 'f-month', 'f-from', 'f-to'].forEach((id) => {
      $(id).addEventListener('change', () => loadHistory().catch((err) => setStatus(err.message)));
    });

    (async () => {
      try {
        await loadLocations();
        renderCurrent(await api('GET', '/api/current'));
        await loadHistory();
      } catch (err) {
        setStatus('Offline');
      }
    })();
  </script>
</body>
</html>
"##;
