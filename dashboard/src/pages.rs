//! Server-rendered HTML pages
//!
//! Pages are plain HTML with the charts inlined as SVG. The cluster selector
//! is a GET form, so a selection is just a `?cluster=` query.

use crate::captions::{hunt_captions, hunt_fit_captions, our_captions, Caption};
use crate::view::{CompareView, HuntView};

const STYLE: &str = "body{font-family:sans-serif;margin:0;background:#fff;color:#222}\
nav{background:#262730;padding:8px 16px}nav a{color:#fff;margin-right:16px;text-decoration:none}\
.layout{display:flex}aside{width:280px;padding:16px;background:#f0f2f6;min-height:100vh}\
main{flex:1;padding:16px}.row{display:flex;flex-wrap:wrap;gap:16px}\
.chart{flex:1;min-width:320px}.chart svg{width:100%;height:auto}\
.caption{margin:6px 0}.note{color:#555;font-size:90%}";

/// Escape text for HTML element content and attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn layout(title: &str, sidebar: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\"><head><meta charset=\"utf-8\">\
<title>{title}</title><style>{STYLE}</style></head><body>\
<nav><a href=\"/hunt\">Hunt Catalog</a><a href=\"/compare\">Compare Catalogs</a></nav>\
<div class=\"layout\"><aside>{sidebar}</aside><main>{body}</main></div></body></html>",
        title = escape(title),
    )
}

fn selector<'a>(
    action: &str,
    label: &str,
    names: impl Iterator<Item = &'a str>,
    selected: &str,
) -> String {
    let options: String = names
        .map(|name| {
            let mark = if name == selected { " selected" } else { "" };
            format!(
                "<option value=\"{v}\"{mark}>{v}</option>",
                v = escape(name)
            )
        })
        .collect();
    format!(
        "<form method=\"get\" action=\"{action}\"><label>{label}<br>\
<select name=\"cluster\" onchange=\"this.form.submit()\">{options}</select></label>\
<noscript><button type=\"submit\">Show</button></noscript></form>",
        label = escape(label),
    )
}

fn captions(heading: &str, captions: &[Caption]) -> String {
    let items: String = captions
        .iter()
        .map(|c| {
            let unit = c.unit.map(|u| format!(" ({u})")).unwrap_or_default();
            format!(
                "<div class=\"caption\">{} = {}{}</div>",
                escape(c.label),
                escape(&c.value),
                escape(&unit)
            )
        })
        .collect();
    format!("<h3>{}</h3>{items}", escape(heading))
}

fn chart(caption: &str, svg: &str) -> String {
    format!(
        "<div class=\"chart\"><div class=\"note\">{}</div>{svg}</div>",
        escape(caption)
    )
}

/// Charts of the Hunt page, already rendered
pub struct HuntCharts {
    pub cmd: String,
    pub sky: String,
}

/// Download link of a cluster's member table, name percent-encoded
pub fn members_href(name: &str) -> String {
    format!("/hunt/members/{}.parquet", urlencoding::encode(name))
}

pub fn hunt_page<'a>(
    names: impl Iterator<Item = &'a str>,
    view: &HuntView,
    charts: &HuntCharts,
) -> String {
    let name = view.record.name.as_str();
    let sidebar = format!(
        "{}<p><a href=\"{href}\" download>Download</a></p>\
<p class=\"note\">Download the .parquet file of the open cluster</p>{}",
        selector("/hunt", "Select open cluster:", names, name),
        captions("Fundamental parameters:", &hunt_captions(&view.record)),
        href = escape(&members_href(name)),
    );
    let body = format!(
        "<h2>{}</h2><div class=\"row\">{}{}</div>\
<p class=\"note\">We use the Padova PARSEC version 1.2S database of stellar evolutionary \
tracks and isochrones (Bressan et al. 2012), which is scaled to solar metal content with \
Z☉ = 0.0152 to perform the adjustment.</p>",
        escape(name),
        chart("CMD", &charts.cmd),
        chart("Distribution RA and DEC", &charts.sky),
    );
    layout(&format!("Hunt Catalog: {name}"), &sidebar, &body)
}

/// Charts of the comparison page, already rendered
pub struct CompareCharts {
    pub hunt_cmd: String,
    pub our_cmd: String,
    pub parameters: String,
    /// (caption, svg) per cross-catalog scatter
    pub catalogs: Vec<(&'static str, String)>,
}

pub fn compare_page<'a>(
    names: impl Iterator<Item = &'a str>,
    view: &CompareView,
    charts: &CompareCharts,
) -> String {
    let name = view.ours.name.as_str();
    let sidebar = format!(
        "{}{}{}",
        selector("/compare", "Select open cluster:", names, name),
        captions("Our Fundamental parameters:", &our_captions(&view.ours)),
        captions("Hunt Fundamental parameters:", &hunt_fit_captions(view.hunt.as_ref())),
    );
    let catalogs: String = charts
        .catalogs
        .iter()
        .map(|(caption, svg)| chart(caption, svg))
        .collect();
    let body = format!(
        "<h2>{}</h2><div class=\"row\">{}{}{}</div><div class=\"row\">{catalogs}</div>",
        escape(name),
        chart("CMD Hunt", &charts.hunt_cmd),
        chart("CMD our", &charts.our_cmd),
        chart("Comparison of fundamental parameters", &charts.parameters),
    );
    layout(&format!("Compare Catalogs: {name}"), &sidebar, &body)
}
