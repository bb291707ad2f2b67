// src/chart/dashboard.rs

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info};

use super::options;
use crate::aggregate::{
    aggregate_by_age_group, aggregate_by_field, aggregate_by_time_homeless, aggregate_by_year,
    AgeGroupCounts, CrossTab, YearGenderCounts,
};
use crate::record::{Condition, Record, TextField};

const DEFAULT_SURFACE_HEIGHT: u32 = 400;

/// The four dashboard charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChartId {
    AgeGroup,
    TimeHomeless,
    Historical,
    Location,
}

impl ChartId {
    pub const ALL: [ChartId; 4] = [
        ChartId::AgeGroup,
        ChartId::TimeHomeless,
        ChartId::Historical,
        ChartId::Location,
    ];

    /// Page element the chart is drawn into.
    pub fn element_id(self) -> &'static str {
        match self {
            ChartId::AgeGroup => "barChart",
            ChartId::TimeHomeless => "barChart2",
            ChartId::Historical => "barChartHistorical",
            ChartId::Location => "barChartLocation",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            ChartId::AgeGroup => "Condição de saúde por faixa etária",
            ChartId::TimeHomeless => "Tempo em situação de rua x condições de saúde",
            ChartId::Historical => "Cadastros por ano e sexo",
            ChartId::Location => "Raça/cor por localidade",
        }
    }
}

/// A named drawing surface. `width: None` means "fill the container".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    pub element_id: &'static str,
    pub width: Option<u32>,
    pub height: u32,
}

/// Registry entry: a surface plus what is currently drawn on it.
#[derive(Debug, Clone)]
pub struct ChartHandle {
    pub surface: Surface,
    pub option: Value,
    pub draws: u32,
    pub resizes: u32,
}

/// Option objects for every selectable value, keyed by selection key.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionViews {
    pub conditions: BTreeMap<&'static str, Value>,
    pub locations: BTreeMap<&'static str, Value>,
}

/// Every aggregation for the current selections.
#[derive(Debug, Clone, Serialize)]
pub struct AggregateSnapshot {
    pub records: usize,
    pub location_field: TextField,
    pub age_group: AgeGroupCounts,
    pub time_homeless: CrossTab,
    pub historical: YearGenderCounts,
    pub location: CrossTab,
}

/// Page-level settings for [`Dashboard::render_page`].
#[derive(Debug, Clone)]
pub struct PageSettings {
    pub title: String,
    pub echarts_url: String,
}

/// Owns the loaded records and the chart registry.
pub struct Dashboard {
    records: Vec<Record>,
    charts: BTreeMap<ChartId, ChartHandle>,
    condition: Condition,
    location: TextField,
}

impl Dashboard {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records,
            charts: BTreeMap::new(),
            condition: Condition::Hypertension,
            location: TextField::Municipality,
        }
    }

    pub fn condition(&self) -> Condition {
        self.condition
    }

    pub fn location(&self) -> TextField {
        self.location
    }

    pub fn chart(&self, id: ChartId) -> Option<&ChartHandle> {
        self.charts.get(&id)
    }

    /// Draw every chart for the given initial selections.
    pub fn init(&mut self, condition: Condition, location: TextField) {
        self.condition = condition;
        self.location = location;

        let option = options::time_homeless_option(&aggregate_by_time_homeless(&self.records));
        self.draw(ChartId::TimeHomeless, option);
        let option = options::historical_option(&aggregate_by_year(&self.records));
        self.draw(ChartId::Historical, option);
        self.redraw_location();
        self.redraw_age_group();

        info!(
            charts = self.charts.len(),
            records = self.records.len(),
            condition = %condition,
            location = %location,
            "dashboard initialised"
        );
    }

    /// Put `option` on the chart's surface, creating the surface on first
    /// use and reusing it afterwards.
    pub fn draw(&mut self, id: ChartId, option: Value) -> &ChartHandle {
        let handle = self.charts.entry(id).or_insert_with(|| {
            debug!(chart = id.element_id(), "creating surface");
            ChartHandle {
                surface: Surface {
                    element_id: id.element_id(),
                    width: None,
                    height: DEFAULT_SURFACE_HEIGHT,
                },
                option: Value::Null,
                draws: 0,
                resizes: 0,
            }
        });
        handle.option = option;
        handle.draws += 1;
        handle
    }

    /// Condition selector changed: recompute and redraw the age-group chart.
    pub fn select_condition(&mut self, key: &str) -> Result<()> {
        self.condition = key
            .parse()
            .with_context(|| format!("selecting condition `{}`", key))?;
        self.redraw_age_group();
        Ok(())
    }

    /// Location selector changed: recompute and redraw the location chart.
    pub fn select_location(&mut self, key: &str) -> Result<()> {
        self.location = key
            .parse()
            .with_context(|| format!("selecting location `{}`", key))?;
        self.redraw_location();
        Ok(())
    }

    /// Resize every registered surface. Options are left untouched.
    pub fn resize(&mut self, width: Option<u32>, height: u32) -> usize {
        for handle in self.charts.values_mut() {
            handle.surface.width = width;
            handle.surface.height = height;
            handle.resizes += 1;
        }
        debug!(charts = self.charts.len(), ?width, height, "resized");
        self.charts.len()
    }

    fn redraw_age_group(&mut self) {
        let option = options::age_group_option(&aggregate_by_age_group(&self.records, self.condition));
        self.draw(ChartId::AgeGroup, option);
    }

    fn redraw_location(&mut self) {
        let option = options::location_option(&aggregate_by_field(&self.records, self.location));
        self.draw(ChartId::Location, option);
    }

    /// Conditions the selector offers: the charted ones, plus the current
    /// selection when it is not among them.
    pub fn condition_choices(&self) -> Vec<Condition> {
        let mut choices = Condition::CHARTED.to_vec();
        if !choices.contains(&self.condition) {
            choices.push(self.condition);
        }
        choices
    }

    /// Options for every selectable condition and every location field.
    pub fn selection_views(&self) -> SelectionViews {
        SelectionViews {
            conditions: self
                .condition_choices()
                .iter()
                .map(|c| {
                    let agg = aggregate_by_age_group(&self.records, *c);
                    (c.key(), options::age_group_option(&agg))
                })
                .collect(),
            locations: TextField::LOCATIONS
                .iter()
                .map(|f| {
                    let tab = aggregate_by_field(&self.records, *f);
                    (f.key(), options::location_option(&tab))
                })
                .collect(),
        }
    }

    pub fn aggregates(&self) -> AggregateSnapshot {
        AggregateSnapshot {
            records: self.records.len(),
            location_field: self.location,
            age_group: aggregate_by_age_group(&self.records, self.condition),
            time_homeless: aggregate_by_time_homeless(&self.records),
            historical: aggregate_by_year(&self.records),
            location: aggregate_by_field(&self.records, self.location),
        }
    }

    /// Static page: selectors, one surface per registered chart, the
    /// embedded options, and the glue that wires selection and resize
    /// events to the charting library.
    pub fn render_page(&self, settings: &PageSettings) -> Result<String> {
        let charts: BTreeMap<&str, &Value> = self
            .charts
            .values()
            .map(|h| (h.surface.element_id, &h.option))
            .collect();
        let payload = serde_json::json!({
            "charts": charts,
            "views": self.selection_views(),
        });
        let payload = serde_json::to_string(&payload).context("serializing chart options")?;

        let condition_options: String = self
            .condition_choices()
            .iter()
            .map(|c| select_option(c.key(), &c.label(), *c == self.condition))
            .collect();
        let location_options: String = TextField::LOCATIONS
            .iter()
            .map(|f| select_option(f.key(), f.label(), *f == self.location))
            .collect();

        let surfaces: String = self
            .charts
            .iter()
            .map(|(id, h)| {
                let width = h
                    .surface
                    .width
                    .map_or_else(|| "100%".to_string(), |w| format!("{w}px"));
                format!(
                    "<section><h2>{}</h2><div id=\"{}\" style=\"width: {}; height: {}px;\"></div></section>\n",
                    escape_html(id.title()),
                    h.surface.element_id,
                    width,
                    h.surface.height
                )
            })
            .collect();

        let title = escape_html(&settings.title);
        let echarts_url = escape_html(&settings.echarts_url);
        // keep `</script>` inside JSON strings from closing the tag
        let payload = payload.replace("</", "<\\/");

        Ok(fill_template(PAGE_TEMPLATE, |name| match name {
            "TITLE" => Some(title.as_str()),
            "ECHARTS_URL" => Some(echarts_url.as_str()),
            "CONDITION_OPTIONS" => Some(condition_options.as_str()),
            "LOCATION_OPTIONS" => Some(location_options.as_str()),
            "SURFACES" => Some(surfaces.as_str()),
            "PAYLOAD" => Some(payload.as_str()),
            _ => None,
        }))
    }
}

/// Substitute every `@NAME@` in one pass; inserted text is never rescanned.
/// Unknown names are left as they are.
fn fill_template<'a>(template: &str, lookup: impl Fn(&str) -> Option<&'a str>) -> String {
    static PLACEHOLDER: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"@([A-Z_]+)@").expect("placeholder pattern is valid"));
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            lookup(&caps[1]).map_or_else(|| caps[0].to_string(), str::to_string)
        })
        .into_owned()
}

fn select_option(value: &str, label: &str, selected: bool) -> String {
    format!(
        "<option value=\"{}\"{}>{}</option>",
        escape_html(value),
        if selected { " selected" } else { "" },
        escape_html(label)
    )
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>@TITLE@</title>
<script src="@ECHARTS_URL@"></script>
</head>
<body>
<h1>@TITLE@</h1>
<label>Condição <select id="conditionFilter">@CONDITION_OPTIONS@</select></label>
<label>Localidade <select id="locationFilter">@LOCATION_OPTIONS@</select></label>
@SURFACES@<script>
const payload = @PAYLOAD@;
const charts = {};
function withLabels(option) {
  (option.series || []).forEach(s => {
    if (s.label && s.label.hideZero) {
      s.label.formatter = p => (p.value > 0 ? p.value : '');
    }
  });
  return option;
}
Object.entries(payload.charts).forEach(([id, option]) => {
  charts[id] = echarts.init(document.getElementById(id));
  charts[id].setOption(withLabels(option));
});
document.getElementById('conditionFilter').addEventListener('change', e => {
  charts.barChart.setOption(withLabels(payload.views.conditions[e.target.value]), true);
});
document.getElementById('locationFilter').addEventListener('change', e => {
  charts.barChartLocation.setOption(withLabels(payload.views.locations[e.target.value]), true);
});
window.addEventListener('resize', () => Object.values(charts).forEach(c => c.resize()));
</script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_records() -> Vec<Record> {
        let mk = |age: &str, bucket: &str, date: &str, gender: &str, mun: &str, race: &str| Record {
            age_group: age.into(),
            time_homeless: bucket.into(),
            registration_date: Some(date.into()),
            gender: gender.into(),
            municipality: mun.into(),
            region: format!("R-{mun}"),
            race_color: race.into(),
            ..Record::default()
        };
        vec![
            mk("18 a 29 anos", "1 a 5 anos", "01/02/2022", "MASCULINO", "GOIANIA", "PARDA")
                .with_condition(Condition::Hypertension),
            mk("30 a 39 anos", "mais de 5 anos", "05/06/2023", "FEMININO", "ANAPOLIS", "BRANCA")
                .with_condition(Condition::Diabetes),
            mk("30 a 39 anos", "mais de 5 anos", "07/08/2023", "MASCULINO", "GOIANIA", "PRETA")
                .with_condition(Condition::Diabetes)
                .with_condition(Condition::Hypertension),
        ]
    }

    fn settings() -> PageSettings {
        PageSettings {
            title: "Painel <teste>".into(),
            echarts_url: "echarts.min.js".into(),
        }
    }

    #[test]
    fn init_registers_all_four_charts() {
        let mut dash = Dashboard::new(sample_records());
        dash.init(Condition::Diabetes, TextField::Region);
        for id in ChartId::ALL {
            let handle = dash.chart(id).expect("chart registered");
            assert_eq!(handle.draws, 1);
            assert_eq!(handle.surface.element_id, id.element_id());
        }
        let age = &dash.chart(ChartId::AgeGroup).expect("age chart").option;
        assert_eq!(age["series"][0]["data"], serde_json::json!([0, 2]));
    }

    #[test]
    fn selection_redraws_only_its_chart_on_the_same_surface() -> Result<()> {
        let mut dash = Dashboard::new(sample_records());
        dash.init(Condition::Diabetes, TextField::Municipality);

        dash.select_condition("hipertenso")?;
        let age = dash.chart(ChartId::AgeGroup).expect("age chart");
        assert_eq!(age.draws, 2);
        assert_eq!(age.option["series"][0]["data"], serde_json::json!([1, 1]));
        assert_eq!(age.option["legend"]["data"], serde_json::json!(["Hipertenso"]));
        assert_eq!(dash.chart(ChartId::Location).map(|h| h.draws), Some(1));

        dash.select_location("regiao")?;
        let loc = dash.chart(ChartId::Location).expect("location chart");
        assert_eq!(loc.draws, 2);
        assert_eq!(
            loc.option["xAxis"]["data"],
            serde_json::json!(["R-ANAPOLIS", "R-GOIANIA"])
        );
        assert_eq!(dash.location(), TextField::Region);
        Ok(())
    }

    #[test]
    fn unknown_selection_is_an_error_and_keeps_state() {
        let mut dash = Dashboard::new(sample_records());
        dash.init(Condition::Diabetes, TextField::Municipality);
        assert!(dash.select_condition("pressao").is_err());
        assert!(dash.select_location("bairro").is_err());
        assert_eq!(dash.condition(), Condition::Diabetes);
        assert_eq!(dash.chart(ChartId::AgeGroup).map(|h| h.draws), Some(1));
    }

    #[test]
    fn resize_touches_every_surface_without_recomputing() {
        let mut dash = Dashboard::new(sample_records());
        dash.init(Condition::Diabetes, TextField::Municipality);
        let before = dash.chart(ChartId::TimeHomeless).map(|h| h.option.clone());

        assert_eq!(dash.resize(Some(800), 300), 4);
        for id in ChartId::ALL {
            let h = dash.chart(id).expect("chart registered");
            assert_eq!(h.surface.width, Some(800));
            assert_eq!(h.surface.height, 300);
            assert_eq!(h.resizes, 1);
            assert_eq!(h.draws, 1);
        }
        assert_eq!(dash.chart(ChartId::TimeHomeless).map(|h| h.option.clone()), before);
    }

    #[test]
    fn parsed_registry_feeds_every_chart() -> Result<()> {
        let raw = "a;b;c;d;e;f;g;h;i;j;k;l;m;n;o;p;q;r;s;t;u;v;w;x\n\
20230115;5208707;GOIANIA;CENTRAL;CENTRO-OESTE;FEMININO;6 a 12 meses;18 a 29 anos;PARDA;;;;;;;;;SIM;;;;;;\n\
20221103;5201108;ANAPOLIS;PIRINEUS;CENTRO-NORTE;MASCULINO;6 a 12 meses;40 a 49 anos;PRETA;;;;;;;;;;;;SIM;;;\n\
broken;row\n";
        let parsed = crate::process::parse_registry(raw)?;
        assert_eq!(parsed.records.len(), 2);

        let mut dash = Dashboard::new(parsed.records);
        dash.init(Condition::Hypertension, TextField::MacroRegion);

        let hist = &dash.chart(ChartId::Historical).expect("historical chart").option;
        assert_eq!(hist["xAxis"]["data"], serde_json::json!(["2022", "2023"]));
        assert_eq!(hist["series"][0]["data"], serde_json::json!([1, 0]));
        assert_eq!(hist["series"][1]["data"], serde_json::json!([0, 1]));

        let time = &dash.chart(ChartId::TimeHomeless).expect("time chart").option;
        assert_eq!(time["xAxis"]["data"][0], serde_json::json!("6 a 12 meses"));

        let loc = &dash.chart(ChartId::Location).expect("location chart").option;
        assert_eq!(
            loc["xAxis"]["data"],
            serde_json::json!(["CENTRO-NORTE", "CENTRO-OESTE"])
        );
        Ok(())
    }

    #[test]
    fn resize_before_init_is_a_no_op() {
        let mut dash = Dashboard::new(Vec::new());
        assert_eq!(dash.resize(None, 500), 0);
    }

    #[test]
    fn views_cover_every_selector_value() {
        let dash = Dashboard::new(sample_records());
        let views = dash.selection_views();
        assert_eq!(views.conditions.len(), Condition::CHARTED.len());
        assert_eq!(views.locations.len(), TextField::LOCATIONS.len());
        assert!(views.conditions.contains_key("tem_teve_cancer"));
        assert!(views.locations.contains_key("macrorregiao"));
    }

    #[test]
    fn snapshot_reflects_current_selection() {
        let mut dash = Dashboard::new(sample_records());
        dash.init(Condition::Hypertension, TextField::Municipality);
        let snap = dash.aggregates();
        assert_eq!(snap.records, 3);
        assert_eq!(snap.age_group.condition, Condition::Hypertension);
        assert_eq!(snap.historical.male, vec![1, 1]);
        assert_eq!(snap.location.categories, vec!["ANAPOLIS", "GOIANIA"]);
        assert_eq!(snap.time_homeless.categories[0], "mais de 5 anos");
    }

    #[test]
    fn page_contains_controls_surfaces_and_payload() -> Result<()> {
        let mut dash = Dashboard::new(sample_records());
        dash.init(Condition::Diabetes, TextField::Municipality);
        dash.resize(Some(640), 320);
        let html = dash.render_page(&settings())?;

        assert!(html.contains("<title>Painel &lt;teste&gt;</title>"));
        assert!(html.contains(r#"<select id="conditionFilter">"#));
        assert!(html.contains(r#"<option value="diabetico" selected>Diabético</option>"#));
        assert!(html.contains(r#"<option value="municipio" selected>Município</option>"#));
        for id in ChartId::ALL {
            assert!(html.contains(&format!(
                "id=\"{}\" style=\"width: 640px; height: 320px;\"",
                id.element_id()
            )));
        }
        assert!(html.contains(r#""barChartHistorical":"#));
        assert!(!html.contains("@PAYLOAD@"));
        Ok(())
    }

    #[test]
    fn uncharted_condition_is_offered_and_selected() -> Result<()> {
        let mut dash = Dashboard::new(sample_records());
        dash.init(Condition::Smoker, TextField::Municipality);

        let views = dash.selection_views();
        assert_eq!(views.conditions.len(), Condition::CHARTED.len() + 1);
        assert!(views.conditions.contains_key("fumante"));

        let html = dash.render_page(&settings())?;
        assert!(html.contains(r#"<option value="fumante" selected>Fumante</option>"#));
        assert_eq!(html.matches(" selected>").count(), 2);
        let age = &dash.chart(ChartId::AgeGroup).expect("age chart").option;
        assert_eq!(age["legend"]["data"], serde_json::json!(["Fumante"]));
        Ok(())
    }

    #[test]
    fn placeholder_text_in_title_is_not_expanded() -> Result<()> {
        let mut dash = Dashboard::new(sample_records());
        dash.init(Condition::Diabetes, TextField::Municipality);
        let html = dash.render_page(&PageSettings {
            title: "@PAYLOAD@ @SURFACES@".into(),
            echarts_url: "echarts.min.js".into(),
        })?;

        assert!(html.contains("<title>@PAYLOAD@ @SURFACES@</title>"));
        assert!(html.contains("<h1>@PAYLOAD@ @SURFACES@</h1>"));
        assert_eq!(html.matches("const payload = {").count(), 1);
        assert_eq!(html.matches("<section>").count(), ChartId::ALL.len());
        Ok(())
    }
}
