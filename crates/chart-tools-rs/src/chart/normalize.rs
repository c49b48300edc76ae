use chart_error_rs::{Error, Result};
use serde_json::{Map, Value, json};

use crate::chart::types::{ChartConfig, ChartData, ChartType, ColorSpec, DataPoint, Dataset, Label};

/// Validates a caller-supplied chart description and completes it into a
/// [`ChartConfig`] ready for QuickChart. Pure; performs no I/O.
///
/// `labels` and dataset lengths are deliberately not cross-checked:
/// QuickChart tolerates mismatches.
pub fn normalize(input: &Value) -> Result<ChartConfig> {
    let obj = input
        .as_object()
        .ok_or_else(|| Error::validation("chart_input", "an object", shape_of(input)))?;

    let chart_type = parse_chart_type(obj)?;
    let labels = parse_labels(obj.get("labels"))?;
    let datasets = parse_datasets(obj.get("datasets"), chart_type)?;
    let mut options = parse_options(obj.get("options"))?;

    apply_title(&mut options, obj.get("title"))?;

    if chart_type.is_gauge() {
        // Gauges render a single value and need the datalabels plugin to
        // show it.
        let first_has_value = datasets
            .first()
            .map(|d| !d.data.is_empty())
            .unwrap_or(false);
        if !first_has_value {
            return Err(Error::validation(
                "datasets",
                format!("a dataset with at least one numeric value for {}", chart_type.as_str()),
                "no data",
            ));
        }
        options.entry("plugins".to_string()).or_insert_with(|| {
            json!({
                "datalabels": {
                    "display": true,
                    "formatter": "(value) => value",
                }
            })
        });
    }

    Ok(ChartConfig {
        chart_type,
        data: ChartData { labels, datasets },
        options,
    })
}

fn parse_chart_type(obj: &Map<String, Value>) -> Result<ChartType> {
    let value = obj.get("type").ok_or_else(|| {
        Error::validation(
            "type",
            format!("one of [{}]", ChartType::allowed_names()),
            "missing field",
        )
    })?;
    let name = value
        .as_str()
        .ok_or_else(|| Error::validation("type", "a string", shape_of(value)))?;
    ChartType::from_name(name).ok_or_else(|| {
        Error::validation(
            "type",
            format!("one of [{}]", ChartType::allowed_names()),
            format!("\"{name}\""),
        )
    })
}

fn parse_labels(value: Option<&Value>) -> Result<Vec<Label>> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(Error::validation(
                "labels",
                "an array of strings or numbers",
                shape_of(other),
            ));
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| match item {
            Value::String(s) => Ok(Label::Text(s.clone())),
            Value::Number(n) => Ok(Label::Number(n.as_f64().unwrap_or(0.0))),
            other => Err(Error::validation(
                format!("labels[{i}]"),
                "a string or number",
                shape_of(other),
            )),
        })
        .collect()
}

fn parse_datasets(value: Option<&Value>, chart_type: ChartType) -> Result<Vec<Dataset>> {
    let items = match value {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Array(items)) => items,
        Some(other) => {
            return Err(Error::validation(
                "datasets",
                "an array of dataset objects",
                shape_of(other),
            ));
        }
    };

    items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_dataset(i, item, chart_type))
        .collect()
}

fn parse_dataset(index: usize, value: &Value, chart_type: ChartType) -> Result<Dataset> {
    let field = |suffix: &str| format!("datasets[{index}]{suffix}");

    let obj = value
        .as_object()
        .ok_or_else(|| Error::validation(field(""), "an object", shape_of(value)))?;

    let label = match obj.get("label") {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => {
            return Err(Error::validation(field(".label"), "a string", shape_of(other)));
        }
    };

    let data_value = obj
        .get("data")
        .ok_or_else(|| Error::validation(field(".data"), "an array of values", "missing field"))?;
    let data = parse_data(&field(".data"), data_value, chart_type)?;

    let background_color = parse_color(&field(".backgroundColor"), obj.get("backgroundColor"))?;
    let border_color = parse_color(&field(".borderColor"), obj.get("borderColor"))?;

    let fill = match obj.get("fill") {
        None | Some(Value::Null) => None,
        Some(Value::Bool(b)) => Some(*b),
        Some(other) => {
            return Err(Error::validation(field(".fill"), "a boolean", shape_of(other)));
        }
    };

    // Unmodeled styling keys are forwarded untouched; an `additionalConfig`
    // mapping is flattened into the dataset itself.
    let mut extra = Map::new();
    for (key, val) in obj {
        match key.as_str() {
            "label" | "data" | "backgroundColor" | "borderColor" | "fill" => {}
            "additionalConfig" => match val {
                Value::Null => {}
                Value::Object(more) => {
                    for (k, v) in more {
                        extra.insert(k.clone(), v.clone());
                    }
                }
                other => {
                    return Err(Error::validation(
                        field(".additionalConfig"),
                        "a mapping",
                        shape_of(other),
                    ));
                }
            },
            _ => {
                extra.insert(key.clone(), val.clone());
            }
        }
    }

    Ok(Dataset {
        label,
        data,
        background_color,
        border_color,
        fill,
        extra,
    })
}

fn parse_data(field: &str, value: &Value, chart_type: ChartType) -> Result<Vec<DataPoint>> {
    let items = value
        .as_array()
        .ok_or_else(|| Error::validation(field, "an array of values", shape_of(value)))?;
    if items.is_empty() {
        return Err(Error::validation(field, "a non-empty array of values", "an empty array"));
    }

    items
        .iter()
        .enumerate()
        .map(|(i, item)| parse_data_point(&format!("{field}[{i}]"), item, chart_type))
        .collect()
}

fn parse_data_point(field: &str, value: &Value, chart_type: ChartType) -> Result<DataPoint> {
    match value {
        Value::Number(n) if !chart_type.wants_points() => {
            Ok(DataPoint::Number(n.as_f64().unwrap_or(0.0)))
        }
        Value::Number(_) => {
            let format = point_format(chart_type);
            Err(Error::validation(
                field,
                format!("a {format} point for {}", chart_type.as_str()),
                "a number",
            ))
        }
        Value::Array(coords) => {
            if !chart_type.wants_points() {
                return Err(Error::validation(
                    field,
                    format!("a number for {}", chart_type.as_str()),
                    "a coordinate point",
                ));
            }
            let max_len = if chart_type == ChartType::Bubble { 3 } else { 2 };
            if coords.len() < 2 || coords.len() > max_len {
                return Err(Error::validation(
                    field,
                    format!("a {} point", point_format(chart_type)),
                    format!("an array of {} values", coords.len()),
                ));
            }
            let point = coords
                .iter()
                .map(|c| {
                    c.as_f64().ok_or_else(|| {
                        Error::validation(field, "numeric coordinates", shape_of(c))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            Ok(DataPoint::Point(point))
        }
        other => Err(Error::validation(
            field,
            "a number or coordinate point",
            shape_of(other),
        )),
    }
}

fn point_format(chart_type: ChartType) -> &'static str {
    if chart_type == ChartType::Bubble {
        "[x, y] or [x, y, r]"
    } else {
        "[x, y]"
    }
}

fn parse_color(field: &str, value: Option<&Value>) -> Result<Option<ColorSpec>> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(ColorSpec::One(s.clone()))),
        Some(Value::Array(items)) => {
            let colors = items
                .iter()
                .map(|item| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        Error::validation(field, "a color string or array of color strings", shape_of(item))
                    })
                })
                .collect::<Result<Vec<String>>>()?;
            Ok(Some(ColorSpec::Many(colors)))
        }
        Some(other) => Err(Error::validation(
            field,
            "a color string or array of color strings",
            shape_of(other),
        )),
    }
}

fn parse_options(value: Option<&Value>) -> Result<Map<String, Value>> {
    match value {
        None | Some(Value::Null) => Ok(Map::new()),
        Some(Value::Object(map)) => Ok(map.clone()),
        Some(other) => Err(Error::validation("options", "a mapping", shape_of(other))),
    }
}

/// A shorthand `title` string becomes `options.title` unless the caller set
/// one explicitly.
fn apply_title(options: &mut Map<String, Value>, title: Option<&Value>) -> Result<()> {
    match title {
        None | Some(Value::Null) => Ok(()),
        Some(Value::String(text)) => {
            options.entry("title".to_string()).or_insert_with(|| {
                json!({
                    "display": true,
                    "text": text,
                })
            });
            Ok(())
        }
        Some(other) => Err(Error::validation("title", "a string", shape_of(other))),
    }
}

fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
