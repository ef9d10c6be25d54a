//! Line commands driving one [`DateField`].

use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDateTime;
use fieldcore_config::FieldConfig;
use fieldcore_engine::{
    AcceptPayload, DateField, DateFieldOptions, DEFAULT_TIME_PICKER_RESOLUTION, FieldPart,
    FixedClock, Key, KeyPress, Locale, Modifiers, NeverScrolled, RawValue,
};
use serde_json::{Value, json};

pub enum Outcome {
    /// JSON lines to print.
    Output(Vec<String>),
    Quit,
}

pub struct Session {
    field: DateField,
}

/// Builds the field options from the `[field]` config section.
pub fn options(config: &FieldConfig) -> Result<DateFieldOptions> {
    let locale = match config.locale.as_deref() {
        Some(tag) => Locale::from_tag(tag).ok_or_else(|| anyhow!("unknown locale: {tag}"))?,
        None => Locale::default(),
    };
    let mut options = DateFieldOptions {
        locale,
        date_pattern: config.date_pattern.clone(),
        time_pattern: config.time_pattern.clone(),
        has_date: config.has_date,
        has_time: config.has_time,
        time_picker_resolution: config
            .time_picker_resolution
            .unwrap_or(DEFAULT_TIME_PICKER_RESOLUTION as i32),
        auto_date: config.auto_date,
        allowed_dates: config.allowed_dates.clone(),
        embedded: config.embedded,
        ..DateFieldOptions::default()
    };
    // FIELDCORE_NOW pins "now" for reproducible sessions.
    if let Ok(now) = std::env::var("FIELDCORE_NOW") {
        let now = parse_timestamp(&now).with_context(|| format!("bad FIELDCORE_NOW: {now}"))?;
        options.clock = std::sync::Arc::new(FixedClock(now));
    }
    Ok(options)
}

impl Session {
    pub fn new(config: &FieldConfig) -> Result<Self> {
        let field = DateField::new(options(config)?).context("invalid field pattern")?;
        Ok(Self { field })
    }

    /// Run one command line.
    pub fn execute(&mut self, line: &str) -> Result<Outcome> {
        let line = line.trim_end_matches(['\r', '\n']);
        let (command, rest) = line.trim_start().split_once(' ').unwrap_or((line.trim(), ""));
        match command {
            "" => return Ok(Outcome::Output(Vec::new())),
            "quit" | "exit" => return Ok(Outcome::Quit),
            "state" => return Ok(Outcome::Output(vec![self.state().to_string()])),
            "focus" => self.field.focus(part(rest)?),
            "type" => {
                // The text is everything after the part name, spaces included.
                let (name, text) = rest.split_once(' ').unwrap_or((rest, ""));
                self.field.input(part(name)?, text);
            }
            "key" => {
                let mut args = rest.split_whitespace();
                let target = part(args.next().unwrap_or_default())?;
                let press = key_press(args.next().context("key needs a key name")?)?;
                let outcome = self.field.key(target, press);
                tracing::debug!(?outcome, "key");
            }
            "blur" => self.field.blur(part(rest)?),
            "clear" => match rest.trim() {
                "" => self.field.clear(),
                "date" => self.field.clear_date_part(),
                "time" => self.field.clear_time_part(),
                other => bail!("unknown part: {other}"),
            },
            "pick" => {
                let mut args = rest.split_whitespace();
                let target = part(args.next().unwrap_or_default())?;
                match args.next() {
                    Some(at) => {
                        let at = parse_timestamp(at)?;
                        match target {
                            FieldPart::Date => self.field.pick_date(at),
                            FieldPart::Time => self.field.pick_time(at),
                        }
                    }
                    None => {
                        if !self.field.pick_selected(target) {
                            bail!("no {target} selection to pick");
                        }
                    }
                }
            }
            "set" => match rest.trim() {
                "" | "null" => self.field.set_raw_value(RawValue::Null),
                text => self.field.set_raw_value(RawValue::Text(text.to_owned())),
            },
            "save" => self.field.pipeline_mut().mark_as_saved(),
            "reset" => self.field.pipeline_mut().reset_value(),
            "has-date" => self.field.set_has_date(switch(rest)?),
            "has-time" => self.field.set_has_time(switch(rest)?),
            "tick" => {
                let millis: u64 = rest.trim().parse().context("tick needs milliseconds")?;
                self.field.tick(Duration::from_millis(millis), &NeverScrolled);
            }
            other => bail!("unknown command: {other}"),
        }
        Ok(Outcome::Output(self.drain()))
    }

    fn drain(&mut self) -> Vec<String> {
        let mut accepted: Vec<AcceptPayload> = Vec::new();
        self.field.sync(&mut accepted);
        accepted
            .iter()
            .map(|payload| json!({ "accept": payload }).to_string())
            .collect()
    }

    fn state(&self) -> Value {
        let field = &self.field;
        let part_state = |part: FieldPart| {
            let sub = field.part(part);
            let picker = field.picker_state(part);
            json!({
                "text": sub.text(),
                "overlay": sub.overlay(),
                "focused": sub.is_focused(),
                "valid": field.is_part_valid(part),
                "picker": {
                    "open": picker.is_open,
                    "selected": picker.selected,
                    "preselected": picker.preselected,
                },
            })
        };
        json!({
            "displayText": field.display_text(),
            "value": field.value(),
            "saveNeeded": field.pipeline().save_needed(),
            "errorStatus": field.error_status(),
            "date": part_state(FieldPart::Date),
            "time": part_state(FieldPart::Time),
        })
    }
}

fn part(name: &str) -> Result<FieldPart> {
    match name.trim() {
        "date" => Ok(FieldPart::Date),
        "time" => Ok(FieldPart::Time),
        other => bail!("unknown part: {other:?}"),
    }
}

fn switch(arg: &str) -> Result<bool> {
    match arg.trim() {
        "on" | "true" => Ok(true),
        "off" | "false" => Ok(false),
        other => bail!("expected on or off, got {other:?}"),
    }
}

/// `shift+down`, `ctrl+page_up`, `enter`.
fn key_press(spec: &str) -> Result<KeyPress> {
    let mut modifiers = Modifiers::NONE;
    let mut parts = spec.split('+').peekable();
    let mut key = None;
    while let Some(part) = parts.next() {
        if parts.peek().is_none() {
            key = Key::from_name(part);
            break;
        }
        match part.to_ascii_lowercase().as_str() {
            "shift" => modifiers.shift = true,
            "ctrl" => modifiers.ctrl = true,
            "alt" => modifiers.alt = true,
            "meta" | "cmd" => modifiers.meta = true,
            other => bail!("unknown modifier: {other}"),
        }
    }
    let key = key.ok_or_else(|| anyhow!("unknown key: {spec}"))?;
    Ok(KeyPress::new(key).with_modifiers(modifiers))
}

fn parse_timestamp(text: &str) -> Result<NaiveDateTime> {
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            chrono::NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(chrono::NaiveTime::MIN))
        })
        .with_context(|| format!("not a timestamp: {text}"))
}
