// Copyright 2026 the Livestamp Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `Intl.DateTimeFormat` date formatting.
//!
//! Both formatters use the browser's default locale and time zone, so the
//! labels read the way the rest of the page does.

use alloc::string::String;

use chrono::{DateTime, FixedOffset};
use js_sys::{Array, Date, Intl, Object, Reflect};
use livestamp_core::format::DateFormatter;
use wasm_bindgen::JsValue;

/// [`DateFormatter`] backed by `Intl.DateTimeFormat`.
pub struct IntlFormatter {
    time_of_day: Intl::DateTimeFormat,
    date_time: Intl::DateTimeFormat,
}

impl core::fmt::Debug for IntlFormatter {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("IntlFormatter").finish_non_exhaustive()
    }
}

impl IntlFormatter {
    /// Creates both formatters for the default locale.
    #[must_use]
    pub fn new() -> Self {
        let locales = Array::new();
        Self {
            time_of_day: Intl::DateTimeFormat::new(
                &locales,
                &options(&[("hour", "2-digit"), ("minute", "2-digit"), ("second", "2-digit")]),
            ),
            date_time: Intl::DateTimeFormat::new(
                &locales,
                &options(&[
                    ("year", "numeric"),
                    ("month", "2-digit"),
                    ("day", "2-digit"),
                    ("hour", "2-digit"),
                    ("minute", "2-digit"),
                    ("second", "2-digit"),
                    ("weekday", "short"),
                ]),
            ),
        }
    }
}

impl Default for IntlFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl DateFormatter for IntlFormatter {
    fn time_of_day(&self, at: DateTime<FixedOffset>) -> String {
        format_with(&self.time_of_day, at)
    }

    fn date_time(&self, at: DateTime<FixedOffset>) -> String {
        format_with(&self.date_time, at)
    }
}

fn options(pairs: &[(&str, &str)]) -> Object {
    let options = Object::new();
    for (key, value) in pairs {
        let _ = Reflect::set(&options, &JsValue::from_str(key), &JsValue::from_str(value));
    }
    options
}

fn format_with(formatter: &Intl::DateTimeFormat, at: DateTime<FixedOffset>) -> String {
    // Epoch milliseconds stay far below 2^53 for any broadcast date.
    let millis = at.timestamp_millis() as f64;
    let date = Date::new(&JsValue::from_f64(millis));
    formatter
        .format()
        .call1(formatter, &date)
        .ok()
        .and_then(|value| value.as_string())
        .unwrap_or_default()
}
