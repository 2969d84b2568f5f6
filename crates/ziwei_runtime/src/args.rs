//! Command line
//!
//! ```text
//! ziwei [--settings FILE] [--on YYYY-MM-DD] NAME GENDER YYYY-MM-DD HH:MM [--lunar] [--location PLACE]
//! ziwei [--settings FILE] [--on YYYY-MM-DD] --last
//! ```

use anyhow::{anyhow, bail, Context, Result};
use chrono::{Datelike, NaiveDate, NaiveTime, Timelike};
use std::path::PathBuf;
use ziwei_services::BirthProfile;

pub const USAGE: &str = "usage: ziwei [--settings FILE] [--on YYYY-MM-DD] \
NAME GENDER YYYY-MM-DD HH:MM [--lunar] [--location PLACE]\n       \
ziwei [--settings FILE] [--on YYYY-MM-DD] --last";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Calculate a chart for a new profile.
    Calculate(BirthProfile),
    /// Reload the last saved chart and recalculate it.
    Last,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Args {
    pub settings: Option<PathBuf>,
    /// Date the fortune lookups are run for; today when unset.
    pub on: Option<NaiveDate>,
    pub command: Command,
}

impl Args {
    pub fn parse(args: impl IntoIterator<Item = String>) -> Result<Self> {
        let mut settings = None;
        let mut on = None;
        let mut last = false;
        let mut lunar = false;
        let mut location = None;
        let mut positional = Vec::new();

        let mut args = args.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--settings" => settings = Some(PathBuf::from(value(&mut args, &arg)?)),
                "--on" => on = Some(parse_date(&value(&mut args, &arg)?)?),
                "--location" => location = Some(value(&mut args, &arg)?),
                "--lunar" => lunar = true,
                "--last" => last = true,
                flag if flag.starts_with("--") => bail!("unknown option {flag}\n{USAGE}"),
                _ => positional.push(arg),
            }
        }

        let command = if last {
            if !positional.is_empty() {
                bail!("--last takes no profile\n{USAGE}");
            }
            Command::Last
        } else {
            let [name, gender, date, time] = <[String; 4]>::try_from(positional)
                .map_err(|_| anyhow!("expected NAME GENDER DATE TIME\n{USAGE}"))?;
            let (birth_year, birth_month, birth_day) = if lunar {
                parse_lunar_date(&date)?
            } else {
                let solar = parse_date(&date)?;
                (solar.year(), solar.month(), solar.day())
            };
            let time = NaiveTime::parse_from_str(&time, "%H:%M")
                .with_context(|| format!("bad time {time:?}"))?;
            let profile = BirthProfile {
                name,
                gender: gender.to_lowercase(),
                birth_year,
                birth_month,
                birth_day,
                birth_hour: time.hour(),
                birth_minute: time.minute(),
                birth_location: location,
                is_lunar_date: lunar,
            };
            profile.validate()?;
            Command::Calculate(profile)
        };

        Ok(Self {
            settings,
            on,
            command,
        })
    }
}

fn value(args: &mut impl Iterator<Item = String>, flag: &str) -> Result<String> {
    args.next()
        .ok_or_else(|| anyhow!("{flag} needs a value\n{USAGE}"))
}

fn parse_date(text: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").with_context(|| format!("bad date {text:?}"))
}

/// Lunar dates are not Gregorian (2-30 exists), so only the shape is
/// checked here; `BirthProfile::validate` checks the ranges.
fn parse_lunar_date(text: &str) -> Result<(i32, u32, u32)> {
    let mut parts = text.splitn(3, '-');
    let mut next = || parts.next().with_context(|| format!("bad date {text:?}"));
    let year = next()?.parse().with_context(|| format!("bad year in {text:?}"))?;
    let month = next()?.parse().with_context(|| format!("bad month in {text:?}"))?;
    let day = next()?.parse().with_context(|| format!("bad day in {text:?}"))?;
    Ok((year, month, day))
}
