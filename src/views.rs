//! HTML pages. Kept as plain string building; every interpolated value
//! goes through [`escape`].

use crate::{config::RateMode, currency::Currency, exchange_rate::RateTable, vehicles::Vehicle};

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn layout(prefix: &str, title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title}</title>
</head>
<body>
<nav>
<a href="{prefix}/">Home</a> |
<a href="{prefix}/exchange">Exchange rates</a> |
<a href="{prefix}/vehicles">Vehicles</a>
</nav>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape(title),
        prefix = escape(prefix),
    )
}

fn error_block(error: &str) -> String {
    format!(r#"<p class="error" role="alert">{}</p>"#, escape(error))
}

pub fn home(prefix: &str) -> String {
    let body = format!(
        r#"<h1>Autocambio</h1>
<ul>
<li><a href="{p}/exchange">Currency exchange rates</a></li>
<li><a href="{p}/vehicles">Vehicle catalog</a></li>
</ul>"#,
        p = escape(prefix)
    );
    layout(prefix, "Autocambio", &body)
}

pub fn exchange(
    prefix: &str,
    mode: RateMode,
    base: Currency,
    rates: Result<&RateTable, &str>,
) -> String {
    let p = escape(prefix);
    let mut body = String::from("<h1>Exchange rates</h1>\n");

    if mode == RateMode::Derived {
        body.push_str("<p>Base currency:");
        for c in Currency::ALL {
            if c == base {
                body.push_str(&format!(" <strong>{c}</strong>"));
            } else {
                body.push_str(&format!(r#" <a href="{p}/exchange?base={c}">{c}</a>"#));
            }
        }
        body.push_str("</p>\n");
    }

    match rates {
        Ok(table) => {
            body.push_str(&format!(
                "<p>1 {} equals (as of {}):</p>\n<table id=\"rates\" data-base=\"{}\">\n\
                 <tr><th>Currency</th><th>Rate</th></tr>\n",
                table.base,
                escape(&table.date),
                table.base
            ));
            for currency in Currency::ALL {
                let rate = table.rate(currency);
                body.push_str(&format!(
                    "<tr><td>{currency}</td><td data-rate=\"{rate}\">{rate:.4}</td></tr>\n"
                ));
            }
            body.push_str("</table>\n");
            body.push_str(&converter(&p, table));
        }
        Err(error) => body.push_str(&error_block(error)),
    }

    layout(prefix, "Exchange rates", &body)
}

fn converter(prefix: &str, table: &RateTable) -> String {
    let options: String = Currency::ALL
        .iter()
        .map(|c| format!(r#"<option value="{c}">{c}</option>"#))
        .collect();
    let rates_json: String = table
        .rates
        .iter()
        .map(|(c, r)| format!(r#""{c}":{r}"#))
        .collect::<Vec<_>>()
        .join(",");

    format!(
        r#"<h2>Converter</h2>
<form id="converter">
<input id="amount" type="number" step="any" min="0" value="1">
<select id="from">{options}</select> to <select id="to">{options}</select>
<button type="submit">Convert</button>
</form>
<p id="result"></p>
<h2>History</h2>
<ul id="history"></ul>
<script>
const RATES = {{{rates_json}}};
const BASE = "{base}";
const API = "{prefix}/api/conversions";
function convert(amount, from, to) {{
  if (!RATES[from]) return 0;
  return amount / RATES[from] * RATES[to];
}}
function remember(entry) {{
  const saved = JSON.parse(localStorage.getItem("conversions") || "[]");
  saved.unshift(entry);
  localStorage.setItem("conversions", JSON.stringify(saved.slice(0, 100)));
}}
function show(list) {{
  const ul = document.getElementById("history");
  ul.innerHTML = "";
  for (const c of list) {{
    const li = document.createElement("li");
    const converted = Number(c.converted_amount).toFixed(2);
    li.textContent = `${{c.amount}} ${{c.from_currency}} = ${{converted}} ${{c.to_currency}}`;
    ul.appendChild(li);
  }}
}}
async function loadHistory() {{
  try {{
    const resp = await fetch(API + "?limit=10");
    const data = await resp.json();
    if (data.success) return show(data.conversions);
  }} catch (e) {{}}
  show(JSON.parse(localStorage.getItem("conversions") || "[]").slice(0, 10));
}}
document.getElementById("converter").addEventListener("submit", async (ev) => {{
  ev.preventDefault();
  const amount = parseFloat(document.getElementById("amount").value) || 0;
  const from = document.getElementById("from").value;
  const to = document.getElementById("to").value;
  const entry = {{amount, from_currency: from, to_currency: to,
    converted_amount: convert(amount, from, to), base_currency: BASE}};
  document.getElementById("result").textContent =
    `${{amount}} ${{from}} = ${{entry.converted_amount.toFixed(2)}} ${{to}}`;
  try {{
    const resp = await fetch(API, {{method: "POST",
      headers: {{"Content-Type": "application/json"}}, body: JSON.stringify(entry)}});
    const data = await resp.json();
    if (!data.success && data.use_localStorage) remember(entry);
  }} catch (e) {{
    remember(entry);
  }}
  loadHistory();
}});
loadHistory();
</script>"#,
        base = table.base,
    )
}

pub fn vehicles(prefix: &str, vehicles: &[Vehicle], error: Option<&str>) -> String {
    let mut body = String::from("<h1>Vehicle catalog</h1>\n");

    if let Some(error) = error {
        body.push_str(&error_block(error));
    } else if vehicles.is_empty() {
        body.push_str("<p>No vehicles available.</p>\n");
    } else {
        body.push_str(
            "<table id=\"vehicles\">\n<tr><th>Brand</th><th>Model</th><th>Year</th>\
             <th>Price</th><th>Availability</th></tr>\n",
        );
        for v in vehicles {
            body.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>${}</td><td>{}</td></tr>\n",
                escape(&v.brand),
                escape(&v.model),
                v.year,
                v.price_formatted,
                if v.available { "Available" } else { "Not available" }
            ));
        }
        body.push_str("</table>\n");
    }

    layout(prefix, "Vehicle catalog", &body)
}
