//! ECharts option objects for each dashboard chart. The charting library
//! itself runs in the page; these are the configuration objects handed to
//! its `setOption`.

use serde_json::{json, Value};

use crate::aggregate::{AgeGroupCounts, CrossTab, YearGenderCounts, YearKey};

const PRIMARY_COLOR: &str = "#4e96d1";
const FEMALE_COLOR: &str = "#f56c6c";

fn axis_tooltip() -> Value {
    json!({ "trigger": "axis", "axisPointer": { "type": "shadow" } })
}

fn quantity_axis() -> Value {
    json!({
        "type": "value",
        "name": "Quantidade",
        "nameLocation": "middle",
        "nameGap": 30
    })
}

fn grid(left: &str, right: &str, top: &str, bottom: &str) -> Value {
    json!({ "left": left, "right": right, "top": top, "bottom": bottom })
}

fn top_label() -> Value {
    json!({
        "show": true,
        "position": "top",
        "formatter": "{c}",
        "backgroundColor": "transparent",
        "borderColor": "transparent",
        "borderWidth": 0
    })
}

/// Single bar series: one condition per age group. Zero bars carry no label;
/// the page turns `hideZero` into a formatter.
pub fn age_group_option(agg: &AgeGroupCounts) -> Value {
    json!({
        "tooltip": axis_tooltip(),
        "legend": {
            "data": [agg.label],
            "top": "1%",
            "left": "center",
            "textStyle": { "fontSize": 14 },
            "orient": "horizontal"
        },
        "grid": grid("10%", "7%", "20%", "10%"),
        "xAxis": { "type": "category", "data": agg.categories },
        "yAxis": quantity_axis(),
        "series": [{
            "name": agg.label,
            "type": "bar",
            "itemStyle": { "color": PRIMARY_COLOR },
            "data": agg.counts,
            "label": {
                "show": true,
                "position": "top",
                "hideZero": true,
                "backgroundColor": "transparent",
                "borderColor": "transparent",
                "borderWidth": 0
            }
        }]
    })
}

fn stacked_series(tab: &CrossTab) -> Vec<Value> {
    tab.series
        .iter()
        .map(|s| {
            json!({
                "name": s.name,
                "type": "bar",
                "stack": "total",
                "data": s.data,
                "emphasis": { "focus": "series" }
            })
        })
        .collect()
}

fn legend_names(tab: &CrossTab) -> Vec<&str> {
    tab.series.iter().map(|s| s.name.as_str()).collect()
}

/// Stacked bars: charted conditions per time-homeless bucket.
pub fn time_homeless_option(tab: &CrossTab) -> Value {
    json!({
        "tooltip": axis_tooltip(),
        "legend": { "data": legend_names(tab), "top": "3%", "left": "7%" },
        "grid": grid("5%", "0%", "30%", "10%"),
        "xAxis": { "type": "category", "data": tab.categories },
        "yAxis": quantity_axis(),
        "series": stacked_series(tab)
    })
}

/// Stacked bars: registrations per year, male and female.
pub fn historical_option(agg: &YearGenderCounts) -> Value {
    let years: Vec<&str> = agg.categories.iter().map(YearKey::label).collect();
    json!({
        "tooltip": axis_tooltip(),
        "legend": {
            "data": ["Masculino", "Feminino"],
            "top": "5%",
            "left": "center",
            "textStyle": { "fontSize": 14 },
            "orient": "horizontal"
        },
        "grid": grid("15%", "10%", "20%", "10%"),
        "xAxis": { "type": "category", "data": years },
        "yAxis": quantity_axis(),
        "series": [
            {
                "name": "Masculino",
                "type": "bar",
                "stack": "total",
                "data": agg.male,
                "itemStyle": { "color": PRIMARY_COLOR },
                "label": top_label()
            },
            {
                "name": "Feminino",
                "type": "bar",
                "stack": "total",
                "data": agg.female,
                "itemStyle": { "color": FEMALE_COLOR },
                "label": top_label()
            }
        ]
    })
}

/// Stacked bars: race/color per location value.
pub fn location_option(tab: &CrossTab) -> Value {
    json!({
        "tooltip": axis_tooltip(),
        "legend": {
            "data": legend_names(tab),
            "top": "1%",
            "left": "center",
            "textStyle": { "fontSize": 14 },
            "orient": "horizontal"
        },
        "grid": grid("12%", "10%", "20%", "10%"),
        "xAxis": { "type": "category", "data": tab.categories },
        "yAxis": quantity_axis(),
        "series": stacked_series(tab)
    })
}
