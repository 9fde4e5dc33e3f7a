// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use chrono::{DateTime, Locale, Utc};

/// Locale used for every published date on the site
pub const DISPLAY_LOCALE: Locale = Locale::pt_BR;

/// Day, abbreviated month and two-digit year, e.g. `25 abr 22`
const DISPLAY_PATTERN: &str = "%-d %b %y";

/// Format a publish timestamp for display.
///
/// Formatting happens in UTC with a fixed locale so the result never depends
/// on where the page is generated or viewed.
pub fn format_published_at(published_at: &DateTime<Utc>) -> String {
    published_at
        .format_localized(DISPLAY_PATTERN, DISPLAY_LOCALE)
        .to_string()
}
